//! The query operations exposed to callers.
//!
//! These four functions are the boundary of the core: a transport layer
//! (CLI here, anything else elsewhere) adapts them to its protocol.
//! Input bounds (traversal depth, page size) are clamped at this layer;
//! the index itself never validates caller input.

use std::fmt;

use serde::Serialize;

use crate::config::SearchConfig;
use crate::graph;
use crate::index::DocIndex;
use crate::model::{DocumentMetadata, DocumentStatus, DocumentType};
use crate::search::{PaginatedResults, SearchEngine, SearchQuery};

/// Traversal depth bounds for [`get_doc_context`].
pub const MIN_DEPTH: usize = 1;
pub const MAX_DEPTH: usize = 3;

/// Why a query could not be answered. Every variant carries enough
/// context for the caller to self-correct; none is fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    ModuleNotFound {
        module: String,
        available: Vec<String>,
    },
    TypeNotFound {
        document_type: DocumentType,
        status: Option<DocumentStatus>,
        module: Option<String>,
    },
    DocumentNotFound {
        uri: String,
    },
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::ModuleNotFound { module, available } => write!(
                f,
                "no documents found for module '{}'. Available modules: {}",
                module,
                if available.is_empty() {
                    "(none)".to_string()
                } else {
                    available.join(", ")
                }
            ),
            QueryError::TypeNotFound {
                document_type,
                status,
                module,
            } => {
                write!(f, "no documents found for type '{}'", document_type)?;
                if let Some(status) = status {
                    write!(f, " with status '{}'", status)?;
                }
                if let Some(module) = module {
                    write!(f, " in module '{}'", module)?;
                }
                Ok(())
            }
            QueryError::DocumentNotFound { uri } => {
                write!(f, "document not found: {}", uri)
            }
        }
    }
}

impl std::error::Error for QueryError {}

/// Compact projection of a document for listings.
#[derive(Debug, Clone, Serialize)]
pub struct DocSummary {
    pub uri: String,
    pub title: String,
    pub module: String,
    #[serde(rename = "type")]
    pub document_type: DocumentType,
    pub status: DocumentStatus,
    pub version: String,
    pub last_updated: chrono::NaiveDate,
    pub author: String,
    pub keywords: Vec<String>,
}

impl From<&DocumentMetadata> for DocSummary {
    fn from(doc: &DocumentMetadata) -> Self {
        Self {
            uri: doc.uri.clone(),
            title: doc.title.clone(),
            module: doc.module.clone(),
            document_type: doc.document_type,
            status: doc.status,
            version: doc.version.clone(),
            last_updated: doc.last_updated,
            author: doc.author.clone(),
            keywords: doc.keywords.clone(),
        }
    }
}

/// A relation target, resolved against the index when possible. Targets
/// that dangle are still listed so callers can spot broken references.
#[derive(Debug, Clone, Serialize)]
pub struct RelatedRef {
    pub uri: String,
    pub title: String,
    pub module: String,
    #[serde(rename = "type")]
    pub document_type: DocumentType,
}

impl RelatedRef {
    fn resolve(index: &DocIndex, uri: &str) -> Self {
        match index.get(uri) {
            Some(doc) => Self {
                uri: doc.uri.clone(),
                title: doc.title.clone(),
                module: doc.module.clone(),
                document_type: doc.document_type,
            },
            None => Self {
                uri: uri.to_string(),
                title: "Unknown".to_string(),
                module: "unknown".to_string(),
                document_type: DocumentType::General,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleDocs {
    pub module: String,
    pub total_documents: usize,
    pub documents: Vec<DocSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_documents: Option<Vec<RelatedRef>>,
}

/// All documents grouped under a module, optionally with the
/// de-duplicated set of documents they reference.
pub fn query_by_module(
    index: &DocIndex,
    module: &str,
    include_related: bool,
) -> Result<ModuleDocs, QueryError> {
    let docs = index.documents_by_module(module);
    if docs.is_empty() {
        return Err(QueryError::ModuleNotFound {
            module: module.to_string(),
            available: index.modules(),
        });
    }

    let related_documents = include_related.then(|| {
        let mut targets: std::collections::BTreeSet<&str> = std::collections::BTreeSet::new();
        for doc in &docs {
            for target in doc.related_docs.values() {
                targets.insert(target);
            }
        }
        targets
            .into_iter()
            .map(|uri| RelatedRef::resolve(index, uri))
            .collect()
    });

    Ok(ModuleDocs {
        module: module.to_string(),
        total_documents: docs.len(),
        documents: docs.iter().map(|d| DocSummary::from(*d)).collect(),
        related_documents,
    })
}

/// The filters a type query ran with, echoed back on success and failure.
#[derive(Debug, Clone, Serialize)]
pub struct TypeFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DocumentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeDocs {
    #[serde(rename = "type")]
    pub document_type: DocumentType,
    pub filters: TypeFilters,
    pub total_documents: usize,
    pub documents: Vec<DocSummary>,
}

/// Documents of one type, narrowed by optional status and module filters.
pub fn query_by_type(
    index: &DocIndex,
    document_type: DocumentType,
    status: Option<DocumentStatus>,
    module: Option<&str>,
) -> Result<TypeDocs, QueryError> {
    let docs: Vec<&DocumentMetadata> = index
        .documents_by_type(document_type)
        .into_iter()
        .filter(|doc| status.map_or(true, |s| doc.status == s))
        .filter(|doc| module.map_or(true, |m| doc.module == m))
        .collect();

    if docs.is_empty() {
        return Err(QueryError::TypeNotFound {
            document_type,
            status,
            module: module.map(str::to_string),
        });
    }

    Ok(TypeDocs {
        document_type,
        filters: TypeFilters {
            status,
            module: module.map(str::to_string),
        },
        total_documents: docs.len(),
        documents: docs.iter().map(|d| DocSummary::from(*d)).collect(),
    })
}

/// Related documents bucketed by kind, projected for responses.
#[derive(Debug, Clone, Serialize)]
pub struct ContextBuckets {
    pub architecture: Vec<RelatedRef>,
    pub database: Vec<RelatedRef>,
    pub api: Vec<RelatedRef>,
    pub ux: Vec<RelatedRef>,
    pub testing: Vec<RelatedRef>,
    pub feature: Vec<RelatedRef>,
    pub other: Vec<RelatedRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocContext {
    pub primary: DocSummary,
    pub related: ContextBuckets,
    pub depth: usize,
    pub total_related_documents: usize,
    /// Full document body, when requested and readable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_error: Option<String>,
}

fn project_bucket(docs: &[DocumentMetadata]) -> Vec<RelatedRef> {
    docs.iter()
        .map(|d| RelatedRef {
            uri: d.uri.clone(),
            title: d.title.clone(),
            module: d.module.clone(),
            document_type: d.document_type,
        })
        .collect()
}

/// The context bundle around one document. Depth is clamped to
/// [`MIN_DEPTH`]..=[`MAX_DEPTH`]; a missing URI is a NotFound failure,
/// never an empty-but-successful context.
pub fn get_doc_context(
    index: &DocIndex,
    uri: &str,
    depth: usize,
    include_content: bool,
) -> Result<DocContext, QueryError> {
    let depth = depth.clamp(MIN_DEPTH, MAX_DEPTH);

    let context =
        graph::document_context(index, uri, depth).ok_or_else(|| QueryError::DocumentNotFound {
            uri: uri.to_string(),
        })?;

    let (content, content_error) = if include_content {
        match std::fs::read_to_string(&context.primary.file_path) {
            Ok(body) => (Some(body), None),
            Err(_) => (None, Some("failed to read file content".to_string())),
        }
    } else {
        (None, None)
    };

    Ok(DocContext {
        primary: DocSummary::from(&context.primary),
        related: ContextBuckets {
            architecture: project_bucket(&context.related.architecture),
            database: project_bucket(&context.related.database),
            api: project_bucket(&context.related.api),
            ux: project_bucket(&context.related.ux),
            testing: project_bucket(&context.related.testing),
            feature: project_bucket(&context.related.feature),
            other: project_bucket(&context.related.other),
        },
        depth,
        total_related_documents: context.total_documents,
        content,
        content_error,
    })
}

/// Caller-facing search parameters; the engine's richer query surface
/// (keywords, date ranges, sort specs) is reachable through
/// [`SearchQuery`] directly.
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub text: String,
    pub document_types: Option<Vec<DocumentType>>,
    pub modules: Option<Vec<String>>,
    pub statuses: Option<Vec<DocumentStatus>>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub include_snippets: bool,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            text: String::new(),
            document_types: None,
            modules: None,
            statuses: None,
            page: None,
            limit: None,
            include_snippets: true,
        }
    }
}

/// Full-text search with pagination bounds applied at the boundary:
/// page >= 1, 1 <= limit <= `config.max_limit`.
pub fn search_docs(
    index: &DocIndex,
    config: &SearchConfig,
    params: &SearchParams,
) -> PaginatedResults {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params
        .limit
        .unwrap_or(config.default_limit)
        .clamp(1, config.max_limit);

    let mut query = SearchQuery::new().text(params.text.clone()).paginate(page, limit);

    if let Some(types) = params.document_types.clone().filter(|v| !v.is_empty()) {
        query = query.of_types(types);
    }
    if let Some(modules) = params.modules.clone().filter(|v| !v.is_empty()) {
        query = query.in_modules(modules);
    }
    if let Some(statuses) = params.statuses.clone().filter(|v| !v.is_empty()) {
        query = query.with_statuses(statuses);
    }

    let mut results = SearchEngine::new(index, config).search(&query);

    if !params.include_snippets {
        for result in &mut results.results {
            result.highlights.clear();
        }
    }

    results
}
