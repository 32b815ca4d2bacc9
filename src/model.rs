//! Core data models for doc-atlas.
//!
//! These types represent the normalized documents that flow through the
//! index builder and out of the query operations. A document's identity is
//! its URI, derived deterministically from its file path.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Closed set of document kinds carried in front matter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentType {
    General,
    FeatureDesign,
    Adr,
    DatabaseSchema,
    ApiDesign,
    SyncStrategy,
    UxFlow,
    TestingStrategy,
    DeploymentRunbook,
    SecurityAudit,
}

impl DocumentType {
    pub const ALL: [DocumentType; 10] = [
        DocumentType::General,
        DocumentType::FeatureDesign,
        DocumentType::Adr,
        DocumentType::DatabaseSchema,
        DocumentType::ApiDesign,
        DocumentType::SyncStrategy,
        DocumentType::UxFlow,
        DocumentType::TestingStrategy,
        DocumentType::DeploymentRunbook,
        DocumentType::SecurityAudit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::General => "general",
            DocumentType::FeatureDesign => "feature-design",
            DocumentType::Adr => "adr",
            DocumentType::DatabaseSchema => "database-schema",
            DocumentType::ApiDesign => "api-design",
            DocumentType::SyncStrategy => "sync-strategy",
            DocumentType::UxFlow => "ux-flow",
            DocumentType::TestingStrategy => "testing-strategy",
            DocumentType::DeploymentRunbook => "deployment-runbook",
            DocumentType::SecurityAudit => "security-audit",
        }
    }

    /// Parse a front-matter value. Values outside the closed set yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        DocumentType::ALL.iter().copied().find(|t| t.as_str() == s)
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentType::parse(s).ok_or_else(|| {
            format!(
                "unknown document type '{}'. Valid types: {}",
                s,
                DocumentType::ALL
                    .iter()
                    .map(|t| t.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        })
    }
}

/// Closed set of document lifecycle states.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Draft,
    Review,
    Approved,
    Accepted,
    Deprecated,
    Superseded,
}

impl DocumentStatus {
    pub const ALL: [DocumentStatus; 6] = [
        DocumentStatus::Draft,
        DocumentStatus::Review,
        DocumentStatus::Approved,
        DocumentStatus::Accepted,
        DocumentStatus::Deprecated,
        DocumentStatus::Superseded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Review => "review",
            DocumentStatus::Approved => "approved",
            DocumentStatus::Accepted => "accepted",
            DocumentStatus::Deprecated => "deprecated",
            DocumentStatus::Superseded => "superseded",
        }
    }

    /// Parse a front-matter value. Values outside the closed set yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        DocumentStatus::ALL.iter().copied().find(|t| t.as_str() == s)
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentStatus::parse(s).ok_or_else(|| {
            format!(
                "unknown status '{}'. Valid statuses: {}",
                s,
                DocumentStatus::ALL
                    .iter()
                    .map(|t| t.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        })
    }
}

/// Normalized metadata for one indexed document.
///
/// Every field is populated after normalization; optional front-matter
/// fields receive defaults. `keywords` preserves the authored casing,
/// while keyword-bucket lookups are case-folded.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentMetadata {
    /// Stable logical identifier derived from the file path.
    pub uri: String,
    pub file_path: PathBuf,
    pub title: String,
    pub document_type: DocumentType,
    /// Free-text grouping label; required for admission into the index.
    pub module: String,
    pub status: DocumentStatus,
    pub version: String,
    pub last_updated: NaiveDate,
    pub author: String,
    pub keywords: Vec<String>,
    /// Relation label -> target URI. The values form the outgoing edges
    /// of the relationship graph.
    pub related_docs: BTreeMap<String, String>,
    /// Typed side metadata, preserved for downstream consumers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<DocExtra>,
}

/// Per-type side-metadata payload, tagged by the same discriminant the
/// document kinds use. Not consulted by search; carried through verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum DocExtra {
    Database(DatabaseExtra),
    Api(ApiExtra),
    Ux(UxExtra),
    Testing(TestingExtra),
    Adr(AdrExtra),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseExtra {
    #[serde(default)]
    pub tables: Vec<String>,
    #[serde(default)]
    pub relationships: Vec<String>,
    #[serde(default)]
    pub indexes: Vec<String>,
    #[serde(default)]
    pub custom_types: Vec<String>,
    #[serde(default)]
    pub triggers: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiExtra {
    #[serde(default)]
    pub endpoints: Vec<ApiEndpoint>,
    #[serde(default)]
    pub dtos: Vec<String>,
    #[serde(default)]
    pub status_codes: Vec<u16>,
    #[serde(default)]
    pub requires_auth: bool,
    #[serde(default)]
    pub allowed_roles: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEndpoint {
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UxExtra {
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub screens: Vec<String>,
    #[serde(default)]
    pub user_actions: Vec<String>,
    #[serde(default)]
    pub states: Vec<String>,
    #[serde(default)]
    pub components: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestingExtra {
    #[serde(default)]
    pub test_types: Vec<String>,
    #[serde(default)]
    pub coverage_target: Option<f64>,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub critical_paths: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdrExtra {
    #[serde(default)]
    pub decision_status: Option<String>,
    #[serde(default)]
    pub supersedes: Vec<String>,
    #[serde(default)]
    pub related_decisions: Vec<String>,
    #[serde(default)]
    pub decision_date: Option<String>,
}

/// Aggregate snapshot computed once per build.
#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    pub total_documents: usize,
    pub documents_by_type: BTreeMap<DocumentType, usize>,
    pub documents_by_module: BTreeMap<String, usize>,
    pub documents_by_status: BTreeMap<DocumentStatus, usize>,
    pub avg_keywords_per_doc: f64,
    pub avg_related_docs_per_doc: f64,
    pub last_indexed: DateTime<Utc>,
}
