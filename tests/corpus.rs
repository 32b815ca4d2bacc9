//! End-to-end tests over a generated documentation corpus.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use doc_atlas::config::Config;
use doc_atlas::index::{build_index, BuildReport, DocIndex, IndexHandle};
use doc_atlas::model::{DocumentStatus, DocumentType};
use doc_atlas::ops;
use doc_atlas::search::{MatchField, SearchEngine, SearchQuery};

fn write_doc(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A small corpus with three payments documents, two inventory documents,
/// two inadmissible files, and one unparseable file.
fn setup_corpus() -> (TempDir, Config) {
    let tmp = TempDir::new().unwrap();
    let docs = tmp.path().join("docs");

    write_doc(
        &docs,
        "technical/payments/payment-processing.md",
        r#"---
title: Payment Processing
document_type: feature-design
module: payments
status: approved
version: 1.2.0
last_updated: 2025-06-01
author: "@erik"
keywords: [payment, stripe, checkout]
related_docs:
  schema: docs://technical/payments/payment-schema
  api: docs://technical/payments/payment-api
---
# Payment Processing

The payment retry logic lives in the charge worker.

Declined cards are retried twice before the charge fails.
"#,
    );

    write_doc(
        &docs,
        "technical/payments/payment-schema.md",
        r#"---
title: Payments Schema
document_type: database-schema
module: payments
status: approved
version: 1.0.0
last_updated: 2025-03-10
author: "@erik"
keywords: [payment, postgres]
related_docs:
  api: docs://technical/payments/payment-api
doc_metadata:
  type: database
  data:
    tables: [charges, refunds]
---
# Payments Schema

Tables for charges and refunds.
"#,
    );

    write_doc(
        &docs,
        "technical/payments/payment-api.md",
        r#"---
title: Payment API
document_type: api-design
module: payments
status: draft
version: 0.3.0
last_updated: 2025-05-20
author: "@sana"
keywords: [payment, rest]
---
# Payment API

POST /charges creates a charge.
"#,
    );

    write_doc(
        &docs,
        "technical/inventory/stock-tracking.md",
        r#"---
title: Stock Tracking
document_type: feature-design
module: inventory
status: draft
version: 0.1.0
last_updated: 2024-11-05
author: "@sana"
keywords: [inventory, stock]
---
# Stock Tracking

Counts are adjusted on every sale.
"#,
    );

    write_doc(
        &docs,
        "technical/inventory/stock-sync.md",
        r#"---
title: Stock Sync
document_type: sync-strategy
module: inventory
status: review
version: 0.2.0
last_updated: 2025-01-15
author: "@sana"
keywords: [inventory, sync]
---
# Stock Sync

Offline devices reconcile on reconnect.
"#,
    );

    // No module: normalizes fine but never admitted.
    write_doc(
        &docs,
        "invalid/no-module.md",
        "---\ntitle: Floating Note\nstatus: draft\n---\n# Floating\n",
    );

    // Unknown type: present but not defaultable.
    write_doc(
        &docs,
        "invalid/bad-type.md",
        "---\nmodule: payments\ndocument_type: blog-post\n---\n# Wrong kind\n",
    );

    // Front matter that is not valid YAML.
    write_doc(
        &docs,
        "invalid/broken.md",
        "---\nmodule: [unterminated\n---\nbody\n",
    );

    // Outside the scan: hidden dir, dependency dir, non-markdown.
    write_doc(&docs, ".archive/old.md", "---\nmodule: payments\n---\nold\n");
    write_doc(&docs, "node_modules/pkg/readme.md", "readme\n");
    write_doc(&docs, "notes.txt", "not markdown\n");

    (tmp, Config::with_root(docs))
}

fn build(config: &Config) -> (DocIndex, BuildReport) {
    build_index(config).unwrap()
}

#[test]
fn build_admits_valid_documents_only() {
    let (_tmp, config) = setup_corpus();
    let (index, report) = build(&config);

    assert_eq!(report.scanned, 8);
    assert_eq!(index.len(), 5);
    assert_eq!(report.indexed, 5);
    assert_eq!(report.rejected, 2);
    assert_eq!(report.parse_failures, 1);

    // Dropped documents appear nowhere.
    assert!(index.get("docs://invalid/no-module").is_none());
    assert!(index.get("docs://invalid/bad-type").is_none());
    assert!(index.documents_by_module("payments").len() == 3);
}

#[test]
fn uris_are_stable_and_extensionless() {
    let (_tmp, config) = setup_corpus();
    let (index, _) = build(&config);

    let doc = index
        .get("docs://technical/payments/payment-processing")
        .expect("document indexed under derived URI");
    assert_eq!(doc.title, "Payment Processing");
    assert_eq!(doc.document_type, DocumentType::FeatureDesign);
    assert_eq!(doc.version, "1.2.0");

    // Unique per path.
    let uris: Vec<&str> = index.all_documents().map(|d| d.uri.as_str()).collect();
    let mut deduped = uris.clone();
    deduped.dedup();
    assert_eq!(uris, deduped);
}

#[test]
fn rebuild_from_unchanged_corpus_is_idempotent() {
    let (_tmp, config) = setup_corpus();
    let (first, _) = build(&config);
    let (second, _) = build(&config);

    let a = first.stats();
    let b = second.stats();
    assert_eq!(a.total_documents, b.total_documents);
    assert_eq!(a.documents_by_type, b.documents_by_type);
    assert_eq!(a.documents_by_module, b.documents_by_module);
    assert_eq!(a.documents_by_status, b.documents_by_status);
    assert_eq!(a.avg_keywords_per_doc, b.avg_keywords_per_doc);
    assert_eq!(a.avg_related_docs_per_doc, b.avg_related_docs_per_doc);
}

#[test]
fn handle_rebuild_swaps_snapshots() {
    let (_tmp, config) = setup_corpus();
    let handle = IndexHandle::new(DocIndex::empty());
    let stale = handle.load();

    handle.rebuild(&config).unwrap();

    assert_eq!(stale.len(), 0);
    assert_eq!(handle.load().len(), 5);
}

#[test]
fn side_metadata_is_preserved() {
    let (_tmp, config) = setup_corpus();
    let (index, _) = build(&config);

    let schema = index.get("docs://technical/payments/payment-schema").unwrap();
    match schema.extra.as_ref().expect("doc_metadata parsed") {
        doc_atlas::model::DocExtra::Database(db) => {
            assert_eq!(db.tables, vec!["charges", "refunds"]);
        }
        other => panic!("expected database payload, got {:?}", other),
    }
}

#[test]
fn module_query_with_related_documents() {
    let (_tmp, config) = setup_corpus();
    let (index, _) = build(&config);

    let result = ops::query_by_module(&index, "payments", true).unwrap();
    assert_eq!(result.total_documents, 3);

    // Union of the three documents' relation targets, deduplicated.
    let related = result.related_documents.unwrap();
    let uris: Vec<&str> = related.iter().map(|r| r.uri.as_str()).collect();
    assert_eq!(
        uris,
        vec![
            "docs://technical/payments/payment-api",
            "docs://technical/payments/payment-schema",
        ]
    );
}

#[test]
fn unknown_module_reports_known_modules() {
    let (_tmp, config) = setup_corpus();
    let (index, _) = build(&config);

    let err = ops::query_by_module(&index, "pos", false).unwrap_err();
    match err {
        ops::QueryError::ModuleNotFound { available, .. } => {
            assert_eq!(available, vec!["inventory", "payments"]);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn type_query_conjunction() {
    let (_tmp, config) = setup_corpus();
    let (index, _) = build(&config);

    let designs = ops::query_by_type(&index, DocumentType::FeatureDesign, None, None).unwrap();
    assert_eq!(designs.total_documents, 2);

    let approved_designs = ops::query_by_type(
        &index,
        DocumentType::FeatureDesign,
        Some(DocumentStatus::Approved),
        Some("payments"),
    )
    .unwrap();
    assert_eq!(approved_designs.total_documents, 1);

    // api-design exists only as draft; approved must be a miss.
    assert!(ops::query_by_type(
        &index,
        DocumentType::ApiDesign,
        Some(DocumentStatus::Approved),
        None,
    )
    .is_err());
}

#[test]
fn doc_context_reaches_direct_neighbors() {
    let (_tmp, config) = setup_corpus();
    let (index, _) = build(&config);

    let context = ops::get_doc_context(
        &index,
        "docs://technical/payments/payment-processing",
        1,
        false,
    )
    .unwrap();

    assert_eq!(context.total_related_documents, 2);
    assert_eq!(context.related.database.len(), 1);
    assert_eq!(context.related.api.len(), 1);
    assert!(context.related.feature.is_empty());
}

#[test]
fn doc_context_missing_uri_fails() {
    let (_tmp, config) = setup_corpus();
    let (index, _) = build(&config);

    let err = ops::get_doc_context(&index, "docs://missing", 1, false).unwrap_err();
    assert!(matches!(err, ops::QueryError::DocumentNotFound { .. }));
}

#[test]
fn doc_context_includes_content_from_disk() {
    let (_tmp, config) = setup_corpus();
    let (index, _) = build(&config);

    let context = ops::get_doc_context(
        &index,
        "docs://technical/payments/payment-processing",
        1,
        true,
    )
    .unwrap();

    let content = context.content.expect("file is readable");
    assert!(content.contains("payment retry logic"));
    assert!(context.content_error.is_none());
}

#[test]
fn search_returns_snippets_from_source_files() {
    let (_tmp, config) = setup_corpus();
    let (index, _) = build(&config);

    let params = ops::SearchParams {
        text: "payment".to_string(),
        include_snippets: true,
        ..ops::SearchParams::default()
    };
    let results = ops::search_docs(&index, &config.search, &params);
    let top = &results.results[0];
    assert!(!top.highlights.is_empty());
    assert!(top.matched_fields.contains(&MatchField::Content));
}

#[test]
fn search_typo_matches_below_exact() {
    let (_tmp, config) = setup_corpus();
    let (index, _) = build(&config);

    let exact = ops::search_docs(
        &index,
        &config.search,
        &ops::SearchParams {
            text: "payment".to_string(),
            include_snippets: false,
            ..ops::SearchParams::default()
        },
    );
    let typo = ops::search_docs(
        &index,
        &config.search,
        &ops::SearchParams {
            text: "paiment".to_string(),
            include_snippets: false,
            ..ops::SearchParams::default()
        },
    );

    assert!(typo
        .results
        .iter()
        .any(|r| r.document.uri == "docs://technical/payments/payment-processing"));
    assert!(exact.results[0].score > typo.results[0].score);
}

#[test]
fn search_facets_are_a_conjunction() {
    let (_tmp, config) = setup_corpus();
    let (index, _) = build(&config);

    let params = ops::SearchParams {
        text: "payment".to_string(),
        document_types: Some(vec![DocumentType::ApiDesign]),
        statuses: Some(vec![DocumentStatus::Approved]),
        include_snippets: false,
        ..ops::SearchParams::default()
    };
    let results = ops::search_docs(&index, &config.search, &params);
    assert_eq!(results.pagination.total, 0);
    assert!(results.results.is_empty());
}

#[test]
fn aggregations_ignore_pagination() {
    let (_tmp, config) = setup_corpus();
    let (index, _) = build(&config);

    let params = ops::SearchParams {
        text: "payment".to_string(),
        limit: Some(1),
        include_snippets: false,
        ..ops::SearchParams::default()
    };
    let results = ops::search_docs(&index, &config.search, &params);

    assert_eq!(results.results.len(), 1);
    assert_eq!(results.aggregations.by_module.get("payments"), Some(&3));
    let payment = results
        .aggregations
        .top_keywords
        .iter()
        .find(|k| k.keyword == "payment")
        .unwrap();
    assert_eq!(payment.count, 3);
}

#[test]
fn pagination_arithmetic_over_25_documents() {
    let tmp = TempDir::new().unwrap();
    let docs = tmp.path().join("docs");
    for i in 0..25 {
        write_doc(
            &docs,
            &format!("bulk/doc-{:02}.md", i),
            &format!(
                "---\ntitle: Bulk {0:02}\nmodule: bulk\nstatus: draft\nlast_updated: 2025-01-01\n---\n# Bulk {0:02}\n",
                i
            ),
        );
    }
    let config = Config::with_root(docs);
    let (index, _) = build_index(&config).unwrap();
    assert_eq!(index.len(), 25);

    let engine = SearchEngine::new(&index, &config.search);
    let results = engine.search(&SearchQuery::new().paginate(3, 10));

    assert_eq!(results.results.len(), 5);
    assert_eq!(results.pagination.total, 25);
    assert!(!results.pagination.has_next);
    assert!(results.pagination.has_prev);
}

#[test]
fn missing_root_builds_an_empty_index() {
    let config = Config::with_root(PathBuf::from("/definitely/not/a/docs/root"));
    let (index, report) = build_index(&config).unwrap();
    assert!(index.is_empty());
    assert_eq!(report.scanned, 0);
    assert_eq!(index.stats().avg_keywords_per_doc, 0.0);
}

#[test]
fn health_report_flags_known_issues() {
    let tmp = TempDir::new().unwrap();
    let docs = tmp.path().join("docs");

    write_doc(
        &docs,
        "a.md",
        r#"---
title: A
module: payments
status: approved
document_type: feature-design
version: 1.0.0
author: "@erik"
keywords: [pay]
last_updated: 2025-06-01
related_docs:
  ghost: docs://nowhere
---
# A
"#,
    );
    // Orphan with defaulted author/version/keywords.
    write_doc(
        &docs,
        "b.md",
        "---\ntitle: B\nmodule: payments\nstatus: draft\nlast_updated: 2020-01-01\n---\n# B\n",
    );

    let config = Config::with_root(docs);
    let (index, _) = build_index(&config).unwrap();
    let report = doc_atlas::health::health_report(&index, &config.health);

    assert_eq!(report.issues.broken_references.len(), 1);
    assert_eq!(report.issues.broken_references[0].target, "docs://nowhere");
    assert_eq!(report.issues.orphaned_docs, vec!["docs://b"]);
    assert_eq!(report.issues.stale_drafts.len(), 1);
    assert!(report
        .issues
        .incomplete_metadata
        .iter()
        .any(|m| m.uri == "docs://b" && m.missing_fields.contains(&"author")));
    assert!(report.coverage.get("payments").is_some());
    assert!(!report.recommendations.is_empty());
}
