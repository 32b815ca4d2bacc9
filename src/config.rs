//! TOML configuration for doc-atlas.
//!
//! All settings have defaults except the documentation root. A config
//! file is optional: `Config::with_root` builds a default configuration
//! around a root passed on the command line.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub docs: DocsConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub health: HealthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DocsConfig {
    /// Root directory of the documentation corpus.
    pub root: PathBuf,
    /// Path segment that anchors URI derivation (`docs://...` is relative
    /// to the last occurrence of this segment).
    #[serde(default = "default_root_segment")]
    pub uri_root_segment: String,
}

fn default_root_segment() -> String {
    "docs".to_string()
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ScanConfig {
    /// Additional glob patterns to exclude, on top of hidden and
    /// dependency-manager directories.
    #[serde(default)]
    pub exclude_globs: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Per-field fuzzy match weights.
    #[serde(default = "default_title_weight")]
    pub title_weight: f64,
    #[serde(default = "default_keyword_weight")]
    pub keyword_weight: f64,
    #[serde(default = "default_module_weight")]
    pub module_weight: f64,
    #[serde(default = "default_type_weight")]
    pub type_weight: f64,
    /// Scoring bonus applied when the query matched document content.
    #[serde(default = "default_content_weight")]
    pub content_weight: f64,
    /// Weight of the exponential recency bonus; 0 disables it.
    #[serde(default)]
    pub recency_boost: f64,
    /// Maximum allowed fuzzy distance: a document matches when its best
    /// field similarity is at least `1 - fuzzy_threshold`.
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,
    /// Query tokens shorter than this are ignored.
    #[serde(default = "default_min_match_len")]
    pub min_match_len: usize,
    /// Lines of context on either side of a snippet match.
    #[serde(default = "default_snippet_context")]
    pub snippet_context_lines: usize,
    #[serde(default = "default_page_limit")]
    pub default_limit: usize,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
}

fn default_title_weight() -> f64 {
    0.4
}
fn default_keyword_weight() -> f64 {
    0.3
}
fn default_module_weight() -> f64 {
    0.2
}
fn default_type_weight() -> f64 {
    0.1
}
fn default_content_weight() -> f64 {
    0.2
}
fn default_fuzzy_threshold() -> f64 {
    0.3
}
fn default_min_match_len() -> usize {
    2
}
fn default_snippet_context() -> usize {
    2
}
fn default_page_limit() -> usize {
    10
}
fn default_max_limit() -> usize {
    50
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            title_weight: default_title_weight(),
            keyword_weight: default_keyword_weight(),
            module_weight: default_module_weight(),
            type_weight: default_type_weight(),
            content_weight: default_content_weight(),
            recency_boost: 0.0,
            fuzzy_threshold: default_fuzzy_threshold(),
            min_match_len: default_min_match_len(),
            snippet_context_lines: default_snippet_context(),
            default_limit: default_page_limit(),
            max_limit: default_max_limit(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HealthConfig {
    /// A draft untouched for this many days counts as stale.
    #[serde(default = "default_stale_draft_days")]
    pub stale_draft_days: i64,
    /// Any document untouched for this many days counts as outdated.
    #[serde(default = "default_outdated_days")]
    pub outdated_days: i64,
}

fn default_stale_draft_days() -> i64 {
    30
}
fn default_outdated_days() -> i64 {
    180
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            stale_draft_days: default_stale_draft_days(),
            outdated_days: default_outdated_days(),
        }
    }
}

impl Config {
    /// All-defaults configuration for a docs root given on the command
    /// line.
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            docs: DocsConfig {
                root,
                uri_root_segment: default_root_segment(),
            },
            scan: ScanConfig::default(),
            search: SearchConfig::default(),
            health: HealthConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    for (name, weight) in [
        ("search.title_weight", config.search.title_weight),
        ("search.keyword_weight", config.search.keyword_weight),
        ("search.module_weight", config.search.module_weight),
        ("search.type_weight", config.search.type_weight),
        ("search.content_weight", config.search.content_weight),
        ("search.fuzzy_threshold", config.search.fuzzy_threshold),
    ] {
        if !(0.0..=1.0).contains(&weight) {
            anyhow::bail!("{} must be in [0.0, 1.0]", name);
        }
    }

    if config.search.recency_boost < 0.0 {
        anyhow::bail!("search.recency_boost must be >= 0");
    }

    if config.search.default_limit < 1 {
        anyhow::bail!("search.default_limit must be >= 1");
    }

    if config.search.max_limit < config.search.default_limit {
        anyhow::bail!("search.max_limit must be >= search.default_limit");
    }

    if config.docs.uri_root_segment.trim().is_empty() {
        anyhow::bail!("docs.uri_root_segment must not be empty");
    }

    Ok(config)
}
