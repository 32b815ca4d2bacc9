//! Front-matter normalization and the admission rule.
//!
//! [`normalize`] turns one file's raw front matter into a [`Candidate`]
//! with every field populated: absent optional fields receive defaults,
//! and the stable URI is derived from the file path. Normalization never
//! fails for absent fields; only [`Candidate::admit`] decides whether a
//! document enters the index, rejecting candidates whose required pieces
//! are missing or carry values outside the closed enumerations.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use chrono::NaiveDate;
use serde_yaml::Value;

use crate::model::{DocExtra, DocumentMetadata, DocumentStatus, DocumentType};

pub const DEFAULT_VERSION: &str = "0.0.0";
pub const DEFAULT_AUTHOR: &str = "@unknown";
/// Scheme prefix for derived document URIs.
pub const URI_SCHEME: &str = "docs://";

/// Normalized front matter awaiting the admission check.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub metadata: DocumentMetadata,
    /// `document_type` value that was present but outside the closed set.
    pub invalid_type: Option<String>,
    /// `status` value that was present but outside the closed set.
    pub invalid_status: Option<String>,
}

/// Why a candidate was kept out of the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    MissingModule,
    UnknownDocumentType(String),
    UnknownStatus(String),
}

impl fmt::Display for AdmissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdmissionError::MissingModule => write!(f, "front matter has no module"),
            AdmissionError::UnknownDocumentType(t) => {
                write!(f, "unknown document_type '{}'", t)
            }
            AdmissionError::UnknownStatus(s) => write!(f, "unknown status '{}'", s),
        }
    }
}

impl std::error::Error for AdmissionError {}

impl Candidate {
    /// Apply the admission rule: `document_type`, `module`, `status`,
    /// `uri`, and `file_path` must all be present and valid. URI and file
    /// path are derived and always present; the other three can reject.
    pub fn admit(self) -> Result<DocumentMetadata, AdmissionError> {
        if let Some(raw) = self.invalid_type {
            return Err(AdmissionError::UnknownDocumentType(raw));
        }
        if let Some(raw) = self.invalid_status {
            return Err(AdmissionError::UnknownStatus(raw));
        }
        if self.metadata.module.trim().is_empty() {
            return Err(AdmissionError::MissingModule);
        }
        Ok(self.metadata)
    }
}

/// Normalize raw front matter for the file at `path`.
///
/// `front` is the parsed YAML mapping, or `None` when the file carried no
/// front-matter block at all.
pub fn normalize(front: Option<&Value>, path: &Path, root_segment: &str) -> Candidate {
    let type_raw = str_field(front, "document_type");
    let status_raw = str_field(front, "status");

    let (document_type, invalid_type) = match type_raw {
        None => (DocumentType::General, None),
        Some(raw) => match DocumentType::parse(&raw) {
            Some(t) => (t, None),
            None => (DocumentType::General, Some(raw)),
        },
    };

    let (status, invalid_status) = match status_raw {
        None => (DocumentStatus::Draft, None),
        Some(raw) => match DocumentStatus::parse(&raw) {
            Some(s) => (s, None),
            None => (DocumentStatus::Draft, Some(raw)),
        },
    };

    let last_updated = str_field(front, "last_updated")
        .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok())
        .unwrap_or_else(|| chrono::Utc::now().date_naive());

    let metadata = DocumentMetadata {
        uri: path_to_uri(path, root_segment),
        file_path: path.to_path_buf(),
        title: resolve_title(front, path),
        document_type,
        module: str_field(front, "module").unwrap_or_default(),
        status,
        version: str_field(front, "version").unwrap_or_else(|| DEFAULT_VERSION.to_string()),
        last_updated,
        author: str_field(front, "author").unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
        keywords: keywords_field(front),
        related_docs: related_field(front),
        extra: extra_field(front),
    };

    Candidate {
        metadata,
        invalid_type,
        invalid_status,
    }
}

/// Derive the stable document URI from a file path.
///
/// Everything up to and including the last `/{root_segment}/` component
/// is stripped, the `.md` suffix is dropped, and the result is prefixed
/// with the `docs://` scheme. Paths outside the root segment fall back to
/// their full (root-relative) path.
pub fn path_to_uri(path: &Path, root_segment: &str) -> String {
    let full = path.to_string_lossy().replace('\\', "/");
    let needle = format!("/{}/", root_segment);
    let prefix = format!("{}/", root_segment);

    let rel = if let Some(pos) = full.rfind(&needle) {
        &full[pos + needle.len()..]
    } else if let Some(stripped) = full.strip_prefix(&prefix) {
        stripped
    } else {
        full.trim_start_matches('/')
    };

    let rel = rel.strip_suffix(".md").unwrap_or(rel);
    format!("{}{}", URI_SCHEME, rel)
}

/// Title resolution: explicit `title` field, else the file name with the
/// extension stripped and hyphens replaced by spaces.
fn resolve_title(front: Option<&Value>, path: &Path) -> String {
    if let Some(title) = str_field(front, "title") {
        return title;
    }
    path.file_stem()
        .map(|s| s.to_string_lossy().replace('-', " "))
        .unwrap_or_else(|| "unknown".to_string())
}

fn str_field(front: Option<&Value>, key: &str) -> Option<String> {
    let value = front?.get(key)?;
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Keywords accept either a sequence or a single scalar string.
fn keywords_field(front: Option<&Value>) -> Vec<String> {
    match front.and_then(|f| f.get("keywords")) {
        Some(Value::Sequence(seq)) => seq
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// `related_docs` must be a mapping of relation label -> URI; any other
/// shape is treated as empty. Non-string entries are skipped.
fn related_field(front: Option<&Value>) -> BTreeMap<String, String> {
    let mut related = BTreeMap::new();
    if let Some(Value::Mapping(map)) = front.and_then(|f| f.get("related_docs")) {
        for (k, v) in map {
            if let (Some(label), Some(target)) = (k.as_str(), v.as_str()) {
                related.insert(label.to_string(), target.to_string());
            }
        }
    }
    related
}

/// Typed side metadata; a malformed payload is dropped rather than
/// failing the document.
fn extra_field(front: Option<&Value>) -> Option<DocExtra> {
    let value = front?.get("doc_metadata")?;
    serde_yaml::from_value(value.clone()).ok()
}

/// One finding from [`validate`].
#[derive(Debug, Clone, serde::Serialize)]
pub struct ValidationIssue {
    pub field: &'static str,
    pub message: String,
}

/// Per-file front-matter report used by `atlas check` and the health
/// report.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ValidationReport {
    pub uri: String,
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub missing: Vec<&'static str>,
}

const REQUIRED_FIELDS: [&str; 8] = [
    "document_type",
    "module",
    "status",
    "version",
    "last_updated",
    "author",
    "keywords",
    "related_docs",
];

/// Report which expected front-matter fields are present in `front`.
pub fn validate(front: Option<&Value>, path: &Path, root_segment: &str) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut missing = Vec::new();

    for field in REQUIRED_FIELDS {
        let present = front.and_then(|f| f.get(field)).is_some();
        if !present {
            missing.push(field);
            errors.push(ValidationIssue {
                field,
                message: format!("required field '{}' is missing", field),
            });
        }
    }

    if matches!(
        front.and_then(|f| f.get("keywords")),
        Some(Value::Sequence(seq)) if seq.is_empty()
    ) {
        warnings.push(ValidationIssue {
            field: "keywords",
            message: "no keywords defined; add keywords for better searchability".to_string(),
        });
    }

    let candidate = normalize(front, path, root_segment);
    if let Some(raw) = &candidate.invalid_type {
        errors.push(ValidationIssue {
            field: "document_type",
            message: format!("'{}' is not a known document type", raw),
        });
    }
    if let Some(raw) = &candidate.invalid_status {
        errors.push(ValidationIssue {
            field: "status",
            message: format!("'{}' is not a known status", raw),
        });
    }

    ValidationReport {
        uri: candidate.metadata.uri,
        is_valid: errors.is_empty(),
        errors,
        warnings,
        missing,
    }
}
