//! # doc-atlas CLI (`atlas`)
//!
//! The `atlas` binary builds the documentation index from a corpus root
//! and answers queries against it.
//!
//! ## Usage
//!
//! ```bash
//! atlas --docs-root ./docs <command>
//! atlas --config ./atlas.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `atlas stats` | Index the corpus and print aggregate statistics |
//! | `atlas search "<query>"` | Fuzzy full-text search with facet filters |
//! | `atlas module <name>` | List a module's documents |
//! | `atlas type <document-type>` | List documents of one type |
//! | `atlas context <uri>` | Related-document context around one document |
//! | `atlas check <file>` | Validate one file's front matter |
//! | `atlas health` | Corpus health report |

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use doc_atlas::config::{self, Config};
use doc_atlas::health;
use doc_atlas::index::{build_index, DocIndex};
use doc_atlas::markdown;
use doc_atlas::model::{DocumentStatus, DocumentType};
use doc_atlas::normalize;
use doc_atlas::ops;

/// doc-atlas: index and query a markdown documentation corpus.
///
/// Either point `--docs-root` at a corpus directory or supply a TOML
/// configuration file via `--config`.
#[derive(Parser)]
#[command(
    name = "atlas",
    about = "doc-atlas — a local-first documentation indexing and retrieval engine",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./atlas.toml")]
    config: PathBuf,

    /// Documentation root; overrides the config file entirely.
    #[arg(long, global = true)]
    docs_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Index the corpus and print aggregate statistics.
    Stats,

    /// Fuzzy full-text search over the indexed corpus.
    ///
    /// Matches against title, keywords, module, and document type, with
    /// typo tolerance. Facet flags narrow the result set; all supplied
    /// filters must hold at once.
    Search {
        /// The search query string.
        query: String,

        /// Filter by document type (repeatable).
        #[arg(long = "type")]
        document_type: Vec<DocumentType>,

        /// Filter by module (repeatable).
        #[arg(long)]
        module: Vec<String>,

        /// Filter by status (repeatable).
        #[arg(long)]
        status: Vec<DocumentStatus>,

        /// 1-based page number.
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Results per page (max 50).
        #[arg(long)]
        limit: Option<usize>,

        /// Skip reading source files for content snippets.
        #[arg(long)]
        no_snippets: bool,

        /// Print the full response as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List every document grouped under a module.
    Module {
        /// Module name (e.g. payments, inventory, pos).
        name: String,

        /// Also list the documents referenced by this module's documents.
        #[arg(long)]
        related: bool,

        #[arg(long)]
        json: bool,
    },

    /// List documents of one type, optionally narrowed by status/module.
    Type {
        /// Document type (e.g. adr, api-design, feature-design).
        document_type: DocumentType,

        #[arg(long)]
        status: Option<DocumentStatus>,

        #[arg(long)]
        module: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Show the related-document context around one document.
    ///
    /// Walks the relationship graph breadth-first from the given URI and
    /// buckets reachable documents by kind.
    Context {
        /// Document URI (e.g. docs://technical/backend/payments).
        uri: String,

        /// Traversal depth (1-3).
        #[arg(long, default_value_t = 1)]
        depth: usize,

        /// Include the primary document's full content.
        #[arg(long)]
        include_content: bool,

        #[arg(long)]
        json: bool,
    },

    /// Validate one file's front matter against the expected fields.
    Check {
        /// Path to a markdown file.
        file: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// Report structural corpus issues: orphans, broken references,
    /// stale drafts, metadata gaps, and per-module coverage.
    Health {
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = match &cli.docs_root {
        Some(root) => Config::with_root(root.clone()),
        None => config::load_config(&cli.config)?,
    };

    // `check` works on a single file and needs no index.
    if let Commands::Check { file, json } = &cli.command {
        return run_check(&cfg, file, *json);
    }

    let (index, _report) = build_index(&cfg)?;

    match cli.command {
        Commands::Stats => run_stats(&index),
        Commands::Search {
            query,
            document_type,
            module,
            status,
            page,
            limit,
            no_snippets,
            json,
        } => {
            let params = ops::SearchParams {
                text: query,
                document_types: (!document_type.is_empty()).then_some(document_type),
                modules: (!module.is_empty()).then_some(module),
                statuses: (!status.is_empty()).then_some(status),
                page: Some(page),
                limit,
                include_snippets: !no_snippets,
            };
            run_search(&index, &cfg, &params, json)
        }
        Commands::Module { name, related, json } => run_module(&index, &name, related, json),
        Commands::Type {
            document_type,
            status,
            module,
            json,
        } => run_type(&index, document_type, status, module.as_deref(), json),
        Commands::Context {
            uri,
            depth,
            include_content,
            json,
        } => run_context(&index, &uri, depth, include_content, json),
        Commands::Check { .. } => unreachable!(),
        Commands::Health { json } => run_health(&index, &cfg, json),
    }
}

fn run_stats(index: &DocIndex) -> Result<()> {
    let stats = index.stats();

    println!("doc-atlas — Index Stats");
    println!("=======================");
    println!();
    println!("  Documents:   {}", stats.total_documents);
    println!("  Avg keywords/doc:     {:.2}", stats.avg_keywords_per_doc);
    println!("  Avg related/doc:      {:.2}", stats.avg_related_docs_per_doc);
    println!("  Last indexed:         {}", stats.last_indexed.format("%Y-%m-%d %H:%M:%S UTC"));

    if !stats.documents_by_type.is_empty() {
        println!();
        println!("  By type:");
        for (t, count) in &stats.documents_by_type {
            println!("    {:<22} {:>5}", t.as_str(), count);
        }
    }

    if !stats.documents_by_module.is_empty() {
        println!();
        println!("  By module:");
        for (m, count) in &stats.documents_by_module {
            println!("    {:<22} {:>5}", m, count);
        }
    }

    if !stats.documents_by_status.is_empty() {
        println!();
        println!("  By status:");
        for (s, count) in &stats.documents_by_status {
            println!("    {:<22} {:>5}", s.as_str(), count);
        }
    }

    Ok(())
}

fn run_search(
    index: &DocIndex,
    cfg: &Config,
    params: &ops::SearchParams,
    json: bool,
) -> Result<()> {
    let results = ops::search_docs(index, &cfg.search, params);

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, result) in results.results.iter().enumerate() {
        let doc = &result.document;
        println!(
            "{}. [{:.2}] {} — {}",
            (results.pagination.page - 1) * results.pagination.limit + i + 1,
            result.score,
            doc.module,
            doc.title
        );
        println!("    uri:     {}", doc.uri);
        println!(
            "    type:    {} / {} / updated {}",
            doc.document_type, doc.status, doc.last_updated
        );
        if !result.matched_fields.is_empty() {
            let fields: Vec<String> = result
                .matched_fields
                .iter()
                .map(|f| format!("{:?}", f).to_lowercase())
                .collect();
            println!("    matched: {}", fields.join(", "));
        }
        for highlight in &result.highlights {
            println!(
                "    excerpt: \"{}\"",
                highlight.text.replace('\n', " ").trim()
            );
        }
        println!();
    }

    let p = &results.pagination;
    println!(
        "page {}/{} — {} result(s) in {}ms",
        p.page,
        p.total_pages.max(1),
        p.total,
        results.query_time_ms
    );

    Ok(())
}

fn run_module(index: &DocIndex, name: &str, related: bool, json: bool) -> Result<()> {
    let result = match ops::query_by_module(index, name, related) {
        Ok(r) => r,
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!(
        "module '{}' — {} document(s)",
        result.module, result.total_documents
    );
    println!();
    for doc in &result.documents {
        println!(
            "  {:<18} {:<10} {}",
            doc.document_type.as_str(),
            doc.status.as_str(),
            doc.uri
        );
    }

    if let Some(related_docs) = &result.related_documents {
        println!();
        println!("related ({}):", related_docs.len());
        for r in related_docs {
            println!("  {:<18} {:<12} {}", r.document_type.as_str(), r.module, r.uri);
        }
    }

    Ok(())
}

fn run_type(
    index: &DocIndex,
    document_type: DocumentType,
    status: Option<DocumentStatus>,
    module: Option<&str>,
    json: bool,
) -> Result<()> {
    let result = match ops::query_by_type(index, document_type, status, module) {
        Ok(r) => r,
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!(
        "type '{}' — {} document(s)",
        result.document_type, result.total_documents
    );
    println!();
    for doc in &result.documents {
        println!(
            "  {:<14} {:<10} {:<8} {}",
            doc.module,
            doc.status.as_str(),
            doc.version,
            doc.uri
        );
    }

    Ok(())
}

fn run_context(
    index: &DocIndex,
    uri: &str,
    depth: usize,
    include_content: bool,
    json: bool,
) -> Result<()> {
    let context = match ops::get_doc_context(index, uri, depth, include_content) {
        Ok(c) => c,
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&context)?);
        return Ok(());
    }

    let p = &context.primary;
    println!("--- Primary ---");
    println!("uri:     {}", p.uri);
    println!("title:   {}", p.title);
    println!("module:  {}", p.module);
    println!("type:    {} / {}", p.document_type, p.status);
    println!();
    println!(
        "--- Related (depth {}, {} document(s)) ---",
        context.depth, context.total_related_documents
    );

    let buckets = [
        ("architecture", &context.related.architecture),
        ("database", &context.related.database),
        ("api", &context.related.api),
        ("ux", &context.related.ux),
        ("testing", &context.related.testing),
        ("feature", &context.related.feature),
        ("other", &context.related.other),
    ];
    for (label, docs) in buckets {
        if docs.is_empty() {
            continue;
        }
        println!("{}:", label);
        for d in docs {
            println!("  {} — {} ({})", d.uri, d.title, d.module);
        }
    }

    if let Some(content) = &context.content {
        println!();
        println!("--- Content ---");
        println!("{}", content);
    } else if let Some(err) = &context.content_error {
        println!();
        println!("(content unavailable: {})", err);
    }

    Ok(())
}

fn run_check(cfg: &Config, file: &Path, json: bool) -> Result<()> {
    let content = std::fs::read_to_string(file)?;
    let (front_raw, _body) = markdown::split_front_matter(&content);
    let front: Option<serde_yaml::Value> = match front_raw {
        Some(raw) => Some(serde_yaml::from_str(raw)?),
        None => None,
    };

    let report = normalize::validate(front.as_ref(), file, &cfg.docs.uri_root_segment);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", report.uri);
    if report.is_valid {
        println!("  front matter ok");
    }
    for error in &report.errors {
        println!("  error [{}]: {}", error.field, error.message);
    }
    for warning in &report.warnings {
        println!("  warning [{}]: {}", warning.field, warning.message);
    }

    if !report.is_valid {
        std::process::exit(1);
    }

    Ok(())
}

fn run_health(index: &DocIndex, cfg: &Config, json: bool) -> Result<()> {
    let report = health::health_report(index, &cfg.health);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("doc-atlas — Corpus Health");
    println!("=========================");
    println!();
    println!("  Documents: {}", report.overview.total_documents);

    println!();
    println!("  Issues:");
    println!(
        "    orphaned docs:        {}",
        report.issues.orphaned_docs.len()
    );
    println!(
        "    broken references:    {}",
        report.issues.broken_references.len()
    );
    println!(
        "    stale drafts:         {}",
        report.issues.stale_drafts.len()
    );
    println!(
        "    outdated docs:        {}",
        report.issues.outdated_docs.len()
    );
    println!(
        "    incomplete metadata:  {}",
        report.issues.incomplete_metadata.len()
    );

    for broken in &report.issues.broken_references {
        println!(
            "      {} -> {} ({})",
            broken.source, broken.target, broken.reference_type
        );
    }

    if !report.coverage.is_empty() {
        println!();
        println!("  Coverage:");
        println!("    {:<20} {:>12}", "MODULE", "COMPLETENESS");
        for (module, coverage) in &report.coverage {
            println!(
                "    {:<20} {:>11.0}%",
                module,
                coverage.completeness * 100.0
            );
        }
    }

    println!();
    println!("  Recommendations:");
    for rec in &report.recommendations {
        println!("    - {}", rec);
    }

    Ok(())
}
