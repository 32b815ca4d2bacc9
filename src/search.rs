//! Search over the documentation index: retrieval, filtering, scoring,
//! sorting, pagination, and aggregations.
//!
//! # Pipeline
//!
//! 1. Retrieve candidates by mode precedence: free text (fuzzy match over
//!    title/keywords/module/type), else explicit keywords (bucket union
//!    at a fixed baseline score), else every document (browse).
//! 2. Filter: conjunction of the supplied facet constraints and the
//!    date range (inclusive bounds, open on omitted sides).
//! 3. Score: add field-match bonuses and the optional recency boost,
//!    clamped to 1.0.
//! 4. Sort: explicit sort spec, else score descending. Ties keep the
//!    retrieval order (stable sort).
//! 5. Paginate: 1-based page slice.
//! 6. Aggregate over the entire filtered set, independent of the page.

use std::collections::HashMap;
use std::time::Instant;

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::SearchConfig;
use crate::fuzzy;
use crate::index::DocIndex;
use crate::markdown;
use crate::model::{DocumentMetadata, DocumentStatus, DocumentType};

/// Baseline score for exact-keyword retrieval.
const KEYWORD_BASELINE: f64 = 0.8;
/// Baseline score for the unfiltered browse mode.
const BROWSE_BASELINE: f64 = 0.5;
/// Recency half-life style constant: score decays with age in days over
/// roughly one year.
const RECENCY_DECAY_DAYS: f64 = 365.0;
/// Number of keyword aggregation entries reported.
const TOP_KEYWORDS: usize = 10;

/// Inclusive date range; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Per-query overrides for the scoring bonuses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub title: f64,
    pub keyword: f64,
    pub content: f64,
    pub recency_boost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Score,
    Title,
    Module,
    Status,
    DocumentType,
    LastUpdated,
    Version,
    Author,
    Uri,
}

impl std::str::FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "score" | "relevance" => Ok(SortField::Score),
            "title" => Ok(SortField::Title),
            "module" => Ok(SortField::Module),
            "status" => Ok(SortField::Status),
            "type" | "document_type" => Ok(SortField::DocumentType),
            "last_updated" | "updated" => Ok(SortField::LastUpdated),
            "version" => Ok(SortField::Version),
            "author" => Ok(SortField::Author),
            "uri" => Ok(SortField::Uri),
            other => Err(format!("unknown sort field '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order '{}' (use asc or desc)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SortSpec {
    pub field: SortField,
    pub order: SortOrder,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSpec {
    /// 1-based page number.
    pub page: usize,
    pub limit: usize,
}

/// Immutable query value. Assemble with the fluent constructors; a built
/// query is safe to reuse across repeated searches.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub text: Option<String>,
    pub document_types: Option<Vec<DocumentType>>,
    pub modules: Option<Vec<String>>,
    pub statuses: Option<Vec<DocumentStatus>>,
    pub keywords: Option<Vec<String>>,
    pub date_range: Option<DateRange>,
    pub scoring: Option<ScoringWeights>,
    pub sort: Option<SortSpec>,
    pub pagination: Option<PageSpec>,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn of_types(mut self, types: Vec<DocumentType>) -> Self {
        self.document_types = Some(types);
        self
    }

    pub fn in_modules(mut self, modules: Vec<String>) -> Self {
        self.modules = Some(modules);
        self
    }

    pub fn with_statuses(mut self, statuses: Vec<DocumentStatus>) -> Self {
        self.statuses = Some(statuses);
        self
    }

    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = Some(keywords);
        self
    }

    pub fn updated_after(mut self, date: NaiveDate) -> Self {
        self.date_range.get_or_insert_with(DateRange::default).from = Some(date);
        self
    }

    pub fn updated_before(mut self, date: NaiveDate) -> Self {
        self.date_range.get_or_insert_with(DateRange::default).to = Some(date);
        self
    }

    pub fn scoring(mut self, weights: ScoringWeights) -> Self {
        self.scoring = Some(weights);
        self
    }

    pub fn sort_by(mut self, field: SortField, order: SortOrder) -> Self {
        self.sort = Some(SortSpec { field, order });
        self
    }

    pub fn paginate(mut self, page: usize, limit: usize) -> Self {
        self.pagination = Some(PageSpec { page, limit });
        self
    }
}

/// Which parts of a document the query matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchField {
    Title,
    Keywords,
    Module,
    Content,
}

/// A snippet extracted from the matched document's source file.
#[derive(Debug, Clone, Serialize)]
pub struct Highlight {
    pub text: String,
    pub matched_terms: Vec<String>,
}

/// One scored search result.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub document: DocumentMetadata,
    pub score: f64,
    pub matched_fields: Vec<MatchField>,
    pub highlights: Vec<Highlight>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PageInfo {
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: usize,
}

/// Facet counts over the entire filtered result set.
#[derive(Debug, Clone, Serialize)]
pub struct Aggregations {
    pub by_type: std::collections::BTreeMap<DocumentType, usize>,
    pub by_module: std::collections::BTreeMap<String, usize>,
    pub by_status: std::collections::BTreeMap<DocumentStatus, usize>,
    pub top_keywords: Vec<KeywordCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResults {
    pub results: Vec<SearchResult>,
    pub pagination: PageInfo,
    pub aggregations: Aggregations,
    pub query_time_ms: u64,
}

/// Read-only search engine over one index snapshot.
pub struct SearchEngine<'a> {
    index: &'a DocIndex,
    config: &'a SearchConfig,
}

impl<'a> SearchEngine<'a> {
    pub fn new(index: &'a DocIndex, config: &'a SearchConfig) -> Self {
        Self { index, config }
    }

    /// Run the full pipeline for one query.
    pub fn search(&self, query: &SearchQuery) -> PaginatedResults {
        let started = Instant::now();

        let mut hits = self.retrieve(query);
        hits.retain(|hit| self.passes_filters(&hit.document, query));
        self.score(&mut hits, query);
        self.sort(&mut hits, query);

        let aggregations = self.aggregate(&hits);

        let total = hits.len();
        let page = query.pagination.map(|p| p.page.max(1)).unwrap_or(1);
        let limit = query
            .pagination
            .map(|p| p.limit.max(1))
            .unwrap_or(self.config.default_limit);

        let start = (page - 1) * limit;
        let end = (start + limit).min(total);
        let results = if start < total {
            hits[start..end].to_vec()
        } else {
            Vec::new()
        };

        PaginatedResults {
            results,
            pagination: PageInfo {
                total,
                page,
                limit,
                total_pages: total.div_ceil(limit),
                has_next: start + limit < total,
                has_prev: page > 1,
            },
            aggregations,
            query_time_ms: started.elapsed().as_millis() as u64,
        }
    }

    /// Mode precedence: free text, explicit keywords, browse.
    fn retrieve(&self, query: &SearchQuery) -> Vec<SearchResult> {
        if let Some(text) = query.text.as_deref().filter(|t| !t.trim().is_empty()) {
            return self
                .index
                .all_documents()
                .filter_map(|doc| {
                    fuzzy::score_document(doc, text, self.config).map(|score| {
                        let mut matched_fields = matched_fields(doc, text);
                        let highlights = self.extract_highlights(doc, text, &mut matched_fields);
                        SearchResult {
                            document: doc.clone(),
                            score,
                            matched_fields,
                            highlights,
                        }
                    })
                })
                .collect();
        }

        if let Some(keywords) = query.keywords.as_ref().filter(|k| !k.is_empty()) {
            let mut seen: HashMap<&str, &DocumentMetadata> = HashMap::new();
            for keyword in keywords {
                for doc in self.index.documents_by_keyword(keyword) {
                    seen.entry(doc.uri.as_str()).or_insert(doc);
                }
            }
            let mut docs: Vec<&DocumentMetadata> = seen.into_values().collect();
            docs.sort_by(|a, b| a.uri.cmp(&b.uri));
            return docs
                .into_iter()
                .map(|doc| SearchResult {
                    document: doc.clone(),
                    score: KEYWORD_BASELINE,
                    matched_fields: vec![MatchField::Keywords],
                    highlights: Vec::new(),
                })
                .collect();
        }

        self.index
            .all_documents()
            .map(|doc| SearchResult {
                document: doc.clone(),
                score: BROWSE_BASELINE,
                matched_fields: Vec::new(),
                highlights: Vec::new(),
            })
            .collect()
    }

    /// Conjunction of every supplied constraint.
    fn passes_filters(&self, doc: &DocumentMetadata, query: &SearchQuery) -> bool {
        if let Some(types) = &query.document_types {
            if !types.contains(&doc.document_type) {
                return false;
            }
        }
        if let Some(modules) = &query.modules {
            if !modules.iter().any(|m| m == &doc.module) {
                return false;
            }
        }
        if let Some(statuses) = &query.statuses {
            if !statuses.contains(&doc.status) {
                return false;
            }
        }
        if let Some(range) = &query.date_range {
            if let Some(from) = range.from {
                if doc.last_updated < from {
                    return false;
                }
            }
            if let Some(to) = range.to {
                if doc.last_updated > to {
                    return false;
                }
            }
        }
        true
    }

    fn score(&self, hits: &mut [SearchResult], query: &SearchQuery) {
        let weights = query.scoring.unwrap_or(ScoringWeights {
            title: self.config.title_weight,
            keyword: self.config.keyword_weight,
            content: self.config.content_weight,
            recency_boost: self.config.recency_boost,
        });

        let today = chrono::Utc::now().date_naive();

        for hit in hits.iter_mut() {
            let mut score = hit.score;

            if hit.matched_fields.contains(&MatchField::Title) {
                score += weights.title;
            }
            if hit.matched_fields.contains(&MatchField::Keywords) {
                score += weights.keyword;
            }
            if hit.matched_fields.contains(&MatchField::Content) {
                score += weights.content;
            }

            if weights.recency_boost > 0.0 {
                let age_days = today
                    .signed_duration_since(hit.document.last_updated)
                    .num_days()
                    .max(0) as f64;
                score += (-age_days / RECENCY_DECAY_DAYS).exp() * weights.recency_boost;
            }

            hit.score = score.min(1.0);
        }
    }

    fn sort(&self, hits: &mut [SearchResult], query: &SearchQuery) {
        match query.sort {
            Some(spec) => {
                hits.sort_by(|a, b| {
                    let ordering = match spec.field {
                        SortField::Score => a
                            .score
                            .partial_cmp(&b.score)
                            .unwrap_or(std::cmp::Ordering::Equal),
                        SortField::Title => a.document.title.cmp(&b.document.title),
                        SortField::Module => a.document.module.cmp(&b.document.module),
                        SortField::Status => a
                            .document
                            .status
                            .as_str()
                            .cmp(b.document.status.as_str()),
                        SortField::DocumentType => a
                            .document
                            .document_type
                            .as_str()
                            .cmp(b.document.document_type.as_str()),
                        SortField::LastUpdated => {
                            a.document.last_updated.cmp(&b.document.last_updated)
                        }
                        SortField::Version => a.document.version.cmp(&b.document.version),
                        SortField::Author => a.document.author.cmp(&b.document.author),
                        SortField::Uri => a.document.uri.cmp(&b.document.uri),
                    };
                    match spec.order {
                        SortOrder::Asc => ordering,
                        SortOrder::Desc => ordering.reverse(),
                    }
                });
            }
            None => {
                hits.sort_by(|a, b| {
                    b.score
                        .partial_cmp(&a.score)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
            }
        }
    }

    fn aggregate(&self, hits: &[SearchResult]) -> Aggregations {
        let mut by_type = std::collections::BTreeMap::new();
        let mut by_module = std::collections::BTreeMap::new();
        let mut by_status = std::collections::BTreeMap::new();
        let mut keyword_counts: HashMap<String, usize> = HashMap::new();

        for hit in hits {
            let doc = &hit.document;
            *by_type.entry(doc.document_type).or_insert(0) += 1;
            *by_module.entry(doc.module.clone()).or_insert(0) += 1;
            *by_status.entry(doc.status).or_insert(0) += 1;

            // Canonical form, de-duplicated per document, so counts agree
            // with the keyword buckets.
            let canonical: std::collections::BTreeSet<String> = doc
                .keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect();
            for keyword in canonical {
                *keyword_counts.entry(keyword).or_insert(0) += 1;
            }
        }

        let mut top_keywords: Vec<KeywordCount> = keyword_counts
            .into_iter()
            .map(|(keyword, count)| KeywordCount { keyword, count })
            .collect();
        top_keywords.sort_by(|a, b| b.count.cmp(&a.count).then(a.keyword.cmp(&b.keyword)));
        top_keywords.truncate(TOP_KEYWORDS);

        Aggregations {
            by_type,
            by_module,
            by_status,
            top_keywords,
        }
    }

    /// Read the source file and pull a window around the first query hit.
    /// Unreadable files silently yield no snippet; an actual content hit
    /// also records a content match for scoring.
    fn extract_highlights(
        &self,
        doc: &DocumentMetadata,
        text: &str,
        matched_fields: &mut Vec<MatchField>,
    ) -> Vec<Highlight> {
        let content = match std::fs::read_to_string(&doc.file_path) {
            Ok(c) => c,
            Err(_) => return Vec::new(),
        };

        let snippet = markdown::extract_snippet(&content, text, self.config.snippet_context_lines);
        if snippet.matched && !matched_fields.contains(&MatchField::Content) {
            matched_fields.push(MatchField::Content);
        }

        vec![Highlight {
            text: snippet.text,
            matched_terms: vec![text.to_string()],
        }]
    }
}

/// Plain substring field matching, case-insensitive, for match reporting
/// and score bonuses.
fn matched_fields(doc: &DocumentMetadata, text: &str) -> Vec<MatchField> {
    let needle = text.to_lowercase();
    let mut matched = Vec::new();

    if doc.title.to_lowercase().contains(&needle) {
        matched.push(MatchField::Title);
    }
    if doc
        .keywords
        .iter()
        .any(|k| k.to_lowercase().contains(&needle))
    {
        matched.push(MatchField::Keywords);
    }
    if doc.module.to_lowercase().contains(&needle) {
        matched.push(MatchField::Module);
    }

    matched
}
