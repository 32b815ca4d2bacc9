//! Corpus health report: structural issues a search index can see but a
//! reader easily misses.
//!
//! The report is computed from one index snapshot and covers orphaned
//! documents, dangling relation targets, metadata gaps, stale drafts,
//! and per-module coverage of the core design-document kinds.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::config::HealthConfig;
use crate::index::DocIndex;
use crate::model::{DocumentStatus, DocumentType};
use crate::normalize::{DEFAULT_AUTHOR, DEFAULT_VERSION};

/// The five kinds a fully documented module is expected to carry.
const COVERAGE_KINDS: [DocumentType; 5] = [
    DocumentType::FeatureDesign,
    DocumentType::DatabaseSchema,
    DocumentType::ApiDesign,
    DocumentType::UxFlow,
    DocumentType::TestingStrategy,
];

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub generated_at: DateTime<Utc>,
    pub overview: Overview,
    pub issues: Issues,
    pub coverage: BTreeMap<String, ModuleCoverage>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub total_documents: usize,
    pub by_status: BTreeMap<DocumentStatus, usize>,
    pub by_type: BTreeMap<DocumentType, usize>,
    pub by_module: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Issues {
    /// Documents with no outgoing relations and no incoming references.
    pub orphaned_docs: Vec<String>,
    pub incomplete_metadata: Vec<IncompleteMetadata>,
    pub broken_references: Vec<BrokenReference>,
    pub stale_drafts: Vec<StaleDoc>,
    pub outdated_docs: Vec<StaleDoc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IncompleteMetadata {
    pub uri: String,
    pub missing_fields: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BrokenReference {
    pub source: String,
    pub target: String,
    pub reference_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StaleDoc {
    pub uri: String,
    pub last_updated: NaiveDate,
    pub days_old: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleCoverage {
    pub has_feature_design: bool,
    pub has_database_schema: bool,
    pub has_api_design: bool,
    pub has_ux_flow: bool,
    pub has_testing_strategy: bool,
    /// Fraction of the five coverage kinds present.
    pub completeness: f64,
}

/// Compute the full report for one snapshot.
pub fn health_report(index: &DocIndex, config: &HealthConfig) -> HealthReport {
    let today = Utc::now().date_naive();
    let stats = index.stats();

    let overview = Overview {
        total_documents: stats.total_documents,
        by_status: stats.documents_by_status.clone(),
        by_type: stats.documents_by_type.clone(),
        by_module: stats.documents_by_module.clone(),
    };

    // Incoming-reference set for orphan detection.
    let mut referenced: HashSet<&str> = HashSet::new();
    for doc in index.all_documents() {
        for target in doc.related_docs.values() {
            referenced.insert(target.as_str());
        }
    }

    let mut orphaned_docs = Vec::new();
    let mut incomplete_metadata = Vec::new();
    let mut broken_references = Vec::new();
    let mut stale_drafts = Vec::new();
    let mut outdated_docs = Vec::new();

    for doc in index.all_documents() {
        if doc.related_docs.is_empty() && !referenced.contains(doc.uri.as_str()) {
            orphaned_docs.push(doc.uri.clone());
        }

        let mut missing = Vec::new();
        if doc.author == DEFAULT_AUTHOR {
            missing.push("author");
        }
        if doc.version == DEFAULT_VERSION {
            missing.push("version");
        }
        if doc.keywords.is_empty() {
            missing.push("keywords");
        }
        if !missing.is_empty() {
            incomplete_metadata.push(IncompleteMetadata {
                uri: doc.uri.clone(),
                missing_fields: missing,
            });
        }

        for (label, target) in &doc.related_docs {
            if !index.contains(target) {
                broken_references.push(BrokenReference {
                    source: doc.uri.clone(),
                    target: target.clone(),
                    reference_type: label.clone(),
                });
            }
        }

        let days_old = today.signed_duration_since(doc.last_updated).num_days();
        if doc.status == DocumentStatus::Draft && days_old > config.stale_draft_days {
            stale_drafts.push(StaleDoc {
                uri: doc.uri.clone(),
                last_updated: doc.last_updated,
                days_old,
            });
        }
        if days_old > config.outdated_days {
            outdated_docs.push(StaleDoc {
                uri: doc.uri.clone(),
                last_updated: doc.last_updated,
                days_old,
            });
        }
    }

    let mut coverage: BTreeMap<String, ModuleCoverage> = BTreeMap::new();
    for module in index.modules() {
        let kinds: HashSet<DocumentType> = index
            .documents_by_module(&module)
            .iter()
            .map(|d| d.document_type)
            .collect();
        let present = COVERAGE_KINDS.iter().filter(|k| kinds.contains(k)).count();
        coverage.insert(
            module,
            ModuleCoverage {
                has_feature_design: kinds.contains(&DocumentType::FeatureDesign),
                has_database_schema: kinds.contains(&DocumentType::DatabaseSchema),
                has_api_design: kinds.contains(&DocumentType::ApiDesign),
                has_ux_flow: kinds.contains(&DocumentType::UxFlow),
                has_testing_strategy: kinds.contains(&DocumentType::TestingStrategy),
                completeness: present as f64 / COVERAGE_KINDS.len() as f64,
            },
        );
    }

    let issues = Issues {
        orphaned_docs,
        incomplete_metadata,
        broken_references,
        stale_drafts,
        outdated_docs,
    };

    let recommendations = recommend(&issues, &coverage);

    HealthReport {
        generated_at: Utc::now(),
        overview,
        issues,
        coverage,
        recommendations,
    }
}

fn recommend(issues: &Issues, coverage: &BTreeMap<String, ModuleCoverage>) -> Vec<String> {
    let mut recs = Vec::new();

    if !issues.broken_references.is_empty() {
        recs.push(format!(
            "{} broken reference(s): fix related_docs targets or remove the entries",
            issues.broken_references.len()
        ));
    }
    if !issues.orphaned_docs.is_empty() {
        recs.push(format!(
            "{} orphaned document(s): link them from related material or archive them",
            issues.orphaned_docs.len()
        ));
    }
    if !issues.stale_drafts.is_empty() {
        recs.push(format!(
            "{} stale draft(s): review and promote or drop them",
            issues.stale_drafts.len()
        ));
    }
    if !issues.incomplete_metadata.is_empty() {
        recs.push(format!(
            "{} document(s) with incomplete front matter: fill in author, version, and keywords",
            issues.incomplete_metadata.len()
        ));
    }

    let weak_modules: Vec<&str> = coverage
        .iter()
        .filter(|(_, c)| c.completeness < 0.6)
        .map(|(m, _)| m.as_str())
        .collect();
    if !weak_modules.is_empty() {
        recs.push(format!(
            "low design-doc coverage in: {}",
            weak_modules.join(", ")
        ));
    }

    if recs.is_empty() {
        recs.push("documentation corpus looks healthy".to_string());
    }

    recs
}
