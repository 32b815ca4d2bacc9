//! In-memory documentation index: primary map, secondary groupings,
//! relationship graph, and stats.
//!
//! A [`DocIndex`] is built in one full pass and never mutated afterwards.
//! Rebuilds construct a fresh index off to the side; [`IndexHandle`]
//! swaps the shared `Arc` so concurrent readers observe either the old
//! or the new snapshot, never a mix.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use anyhow::Result;
use chrono::Utc;

use crate::config::Config;
use crate::markdown;
use crate::model::{DocumentMetadata, DocumentStatus, DocumentType, IndexStats};
use crate::normalize;
use crate::scan;

/// Immutable index over one scan of the documentation corpus.
#[derive(Debug)]
pub struct DocIndex {
    /// Primary map: URI -> document.
    documents: BTreeMap<String, DocumentMetadata>,
    by_type: HashMap<DocumentType, Vec<String>>,
    by_module: HashMap<String, Vec<String>>,
    by_status: HashMap<DocumentStatus, Vec<String>>,
    /// Case-folded keyword -> URIs. Keywords are canonicalized (trim +
    /// lowercase) and de-duplicated per document at insertion.
    by_keyword: HashMap<String, Vec<String>>,
    /// URI -> outgoing relation targets.
    graph: HashMap<String, BTreeSet<String>>,
    stats: IndexStats,
}

impl DocIndex {
    /// An index over no documents.
    pub fn empty() -> Self {
        Self::from_documents(Vec::new())
    }

    /// Build the secondary groupings, graph, and stats from a set of
    /// admitted documents in one pass.
    pub fn from_documents(docs: Vec<DocumentMetadata>) -> Self {
        let mut documents = BTreeMap::new();
        for doc in docs {
            documents.insert(doc.uri.clone(), doc);
        }

        let mut by_type: HashMap<DocumentType, Vec<String>> = HashMap::new();
        let mut by_module: HashMap<String, Vec<String>> = HashMap::new();
        let mut by_status: HashMap<DocumentStatus, Vec<String>> = HashMap::new();
        let mut by_keyword: HashMap<String, Vec<String>> = HashMap::new();
        let mut graph: HashMap<String, BTreeSet<String>> = HashMap::new();

        for (uri, doc) in &documents {
            by_type.entry(doc.document_type).or_default().push(uri.clone());
            by_module
                .entry(doc.module.clone())
                .or_default()
                .push(uri.clone());
            by_status.entry(doc.status).or_default().push(uri.clone());

            let canonical: BTreeSet<String> = doc
                .keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect();
            for keyword in canonical {
                by_keyword.entry(keyword).or_default().push(uri.clone());
            }

            graph.insert(
                uri.clone(),
                doc.related_docs.values().cloned().collect(),
            );
        }

        let stats = compute_stats(&documents, &by_type, &by_module, &by_status);

        Self {
            documents,
            by_type,
            by_module,
            by_status,
            by_keyword,
            graph,
            stats,
        }
    }

    pub fn get(&self, uri: &str) -> Option<&DocumentMetadata> {
        self.documents.get(uri)
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.documents.contains_key(uri)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// All documents in URI order.
    pub fn all_documents(&self) -> impl Iterator<Item = &DocumentMetadata> {
        self.documents.values()
    }

    pub fn documents_by_type(&self, document_type: DocumentType) -> Vec<&DocumentMetadata> {
        self.resolve(self.by_type.get(&document_type))
    }

    pub fn documents_by_module(&self, module: &str) -> Vec<&DocumentMetadata> {
        self.resolve(self.by_module.get(module))
    }

    pub fn documents_by_status(&self, status: DocumentStatus) -> Vec<&DocumentMetadata> {
        self.resolve(self.by_status.get(&status))
    }

    /// Keyword lookup; the key is case-folded before the bucket lookup.
    pub fn documents_by_keyword(&self, keyword: &str) -> Vec<&DocumentMetadata> {
        self.resolve(self.by_keyword.get(&keyword.trim().to_lowercase()))
    }

    /// Outgoing relation targets for a URI.
    pub fn neighbors(&self, uri: &str) -> Option<&BTreeSet<String>> {
        self.graph.get(uri)
    }

    /// Known module names, sorted.
    pub fn modules(&self) -> Vec<String> {
        let mut modules: Vec<String> = self.by_module.keys().cloned().collect();
        modules.sort();
        modules
    }

    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }

    fn resolve(&self, uris: Option<&Vec<String>>) -> Vec<&DocumentMetadata> {
        uris.map(|list| {
            list.iter()
                .filter_map(|uri| self.documents.get(uri))
                .collect()
        })
        .unwrap_or_default()
    }
}

fn compute_stats(
    documents: &BTreeMap<String, DocumentMetadata>,
    by_type: &HashMap<DocumentType, Vec<String>>,
    by_module: &HashMap<String, Vec<String>>,
    by_status: &HashMap<DocumentStatus, Vec<String>>,
) -> IndexStats {
    let total = documents.len();

    let mut total_keywords = 0usize;
    let mut total_related = 0usize;
    for doc in documents.values() {
        total_keywords += doc.keywords.len();
        total_related += doc.related_docs.len();
    }

    let (avg_keywords, avg_related) = if total > 0 {
        (
            total_keywords as f64 / total as f64,
            total_related as f64 / total as f64,
        )
    } else {
        (0.0, 0.0)
    };

    IndexStats {
        total_documents: total,
        documents_by_type: by_type
            .iter()
            .map(|(t, uris)| (*t, uris.len()))
            .collect(),
        documents_by_module: by_module
            .iter()
            .map(|(m, uris)| (m.clone(), uris.len()))
            .collect(),
        documents_by_status: by_status
            .iter()
            .map(|(s, uris)| (*s, uris.len()))
            .collect(),
        avg_keywords_per_doc: avg_keywords,
        avg_related_docs_per_doc: avg_related,
        last_indexed: Utc::now(),
    }
}

/// Counters from one build pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildReport {
    pub scanned: usize,
    pub indexed: usize,
    /// Files that failed to read or whose front matter failed to parse.
    pub parse_failures: usize,
    /// Candidates rejected by the admission rule.
    pub rejected: usize,
}

/// Scan the configured root and build a fresh index.
///
/// One bad file never aborts the build: read and parse failures are
/// logged and skipped; admission rejections are dropped quietly and only
/// counted.
pub fn build_index(config: &Config) -> Result<(DocIndex, BuildReport)> {
    let started = Instant::now();
    let files = scan::scan_markdown(&config.docs.root, &config.scan.exclude_globs)?;

    let mut report = BuildReport {
        scanned: files.len(),
        ..BuildReport::default()
    };
    let mut docs = Vec::new();

    for path in &files {
        match load_candidate(path, &config.docs.uri_root_segment) {
            Ok(candidate) => match candidate.admit() {
                Ok(meta) => docs.push(meta),
                Err(_) => report.rejected += 1,
            },
            Err(err) => {
                eprintln!("[index] failed to parse {}: {}", path.display(), err);
                report.parse_failures += 1;
            }
        }
    }

    let index = DocIndex::from_documents(docs);
    report.indexed = index.len();

    println!(
        "[index] indexed {} of {} files ({} parse failures, {} rejected) in {}ms",
        report.indexed,
        report.scanned,
        report.parse_failures,
        report.rejected,
        started.elapsed().as_millis()
    );

    Ok((index, report))
}

fn load_candidate(path: &Path, root_segment: &str) -> Result<normalize::Candidate> {
    let content = std::fs::read_to_string(path)?;
    let (front_raw, _body) = markdown::split_front_matter(&content);
    let front: Option<serde_yaml::Value> = match front_raw {
        Some(raw) => Some(serde_yaml::from_str(raw)?),
        None => None,
    };
    Ok(normalize::normalize(front.as_ref(), path, root_segment))
}

/// Shared handle over the current index snapshot.
///
/// Readers clone the `Arc` and run against a consistent snapshot;
/// [`IndexHandle::rebuild`] builds the replacement off to the side and
/// swaps the pointer under a short write lock.
pub struct IndexHandle {
    inner: RwLock<Arc<DocIndex>>,
}

impl IndexHandle {
    pub fn new(index: DocIndex) -> Self {
        Self {
            inner: RwLock::new(Arc::new(index)),
        }
    }

    /// The current snapshot.
    pub fn load(&self) -> Arc<DocIndex> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Replace the snapshot atomically.
    pub fn swap(&self, index: DocIndex) {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(index);
    }

    /// Full rebuild from the corpus: scan, build, swap. There is no
    /// partial or incremental path.
    pub fn rebuild(&self, config: &Config) -> Result<BuildReport> {
        let (index, report) = build_index(config)?;
        self.swap(index);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DocumentStatus;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn doc(uri: &str, module: &str, keywords: &[&str], related: &[&str]) -> DocumentMetadata {
        let mut related_docs = BTreeMap::new();
        for (i, target) in related.iter().enumerate() {
            related_docs.insert(format!("rel-{}", i), target.to_string());
        }
        DocumentMetadata {
            uri: uri.to_string(),
            file_path: PathBuf::from(format!("/docs/{}.md", module)),
            title: format!("{} doc", module),
            document_type: DocumentType::General,
            module: module.to_string(),
            status: DocumentStatus::Draft,
            version: "0.0.0".to_string(),
            last_updated: chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            author: "@dev".to_string(),
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            related_docs,
            extra: None,
        }
    }

    #[test]
    fn groupings_cover_every_document() {
        let index = DocIndex::from_documents(vec![
            doc("docs://a", "payments", &["Stripe"], &["docs://b"]),
            doc("docs://b", "payments", &["stripe"], &[]),
            doc("docs://c", "inventory", &[], &[]),
        ]);

        assert_eq!(index.len(), 3);
        assert_eq!(index.documents_by_module("payments").len(), 2);
        assert_eq!(index.documents_by_module("inventory").len(), 1);
        assert_eq!(index.documents_by_status(DocumentStatus::Draft).len(), 3);
        assert_eq!(index.documents_by_type(DocumentType::General).len(), 3);
    }

    #[test]
    fn keywords_are_case_folded_and_deduped_per_doc() {
        let index = DocIndex::from_documents(vec![doc(
            "docs://a",
            "payments",
            &["Stripe", "stripe", " STRIPE "],
            &[],
        )]);

        // All three case variants collapse to one bucket entry.
        assert_eq!(index.documents_by_keyword("stripe").len(), 1);
        assert_eq!(index.documents_by_keyword("Stripe").len(), 1);
        // The stored metadata keeps the authored casing.
        assert_eq!(index.get("docs://a").unwrap().keywords.len(), 3);
    }

    #[test]
    fn graph_holds_edge_targets_only() {
        let index = DocIndex::from_documents(vec![
            doc("docs://a", "payments", &[], &["docs://b", "docs://c"]),
            doc("docs://b", "payments", &[], &[]),
        ]);

        let neighbors = index.neighbors("docs://a").unwrap();
        assert!(neighbors.contains("docs://b"));
        assert!(neighbors.contains("docs://c"));
        assert!(index.neighbors("docs://b").unwrap().is_empty());
    }

    #[test]
    fn stats_averages_handle_empty_index() {
        let index = DocIndex::empty();
        let stats = index.stats();
        assert_eq!(stats.total_documents, 0);
        assert_eq!(stats.avg_keywords_per_doc, 0.0);
        assert_eq!(stats.avg_related_docs_per_doc, 0.0);
    }

    #[test]
    fn stats_count_types_modules_statuses() {
        let index = DocIndex::from_documents(vec![
            doc("docs://a", "payments", &["a", "b"], &["docs://b"]),
            doc("docs://b", "inventory", &["c"], &[]),
        ]);
        let stats = index.stats();
        assert_eq!(stats.total_documents, 2);
        assert_eq!(stats.documents_by_module.get("payments"), Some(&1));
        assert_eq!(stats.documents_by_module.get("inventory"), Some(&1));
        assert!((stats.avg_keywords_per_doc - 1.5).abs() < 1e-9);
        assert!((stats.avg_related_docs_per_doc - 0.5).abs() < 1e-9);
    }

    #[test]
    fn handle_swap_is_observed_by_new_loads() {
        let handle = IndexHandle::new(DocIndex::empty());
        let before = handle.load();
        assert_eq!(before.len(), 0);

        handle.swap(DocIndex::from_documents(vec![doc(
            "docs://a",
            "payments",
            &[],
            &[],
        )]));

        // The old snapshot is still intact for readers that hold it.
        assert_eq!(before.len(), 0);
        assert_eq!(handle.load().len(), 1);
    }
}
