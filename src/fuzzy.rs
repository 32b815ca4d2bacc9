//! Field-weighted fuzzy matching over document metadata.
//!
//! A query is tokenized, each token scored against the tokens of a field
//! (exact, containment, or Levenshtein similarity), and per-field scores
//! are blended by weight into a relevance score in `[0, 1]`. A document
//! matches when its best field similarity clears `1 - threshold`, so a
//! strong hit on a low-weight field (say, module) still surfaces with a
//! proportionally low relevance.

use crate::config::SearchConfig;
use crate::model::DocumentMetadata;

/// Minimum similarity for a Levenshtein pairing to count at all. Below
/// this, two tokens are considered unrelated rather than fuzzy-equal.
const MIN_TOKEN_SIMILARITY: f64 = 0.6;

/// Split into lowercase alphanumeric tokens, dropping short ones.
pub fn tokenize(text: &str, min_len: usize) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|s| s.len() >= min_len)
        .map(str::to_lowercase)
        .collect()
}

/// Levenshtein edit distance.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let (a_len, b_len) = (a_chars.len(), b_chars.len());

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for i in 1..=a_len {
        curr[0] = i;
        for j in 1..=b_len {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);
            curr[j] = (prev[j] + 1)
                .min(curr[j - 1] + 1)
                .min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

/// Similarity of two tokens in `[0, 1]`: 1.0 for equality, a
/// length-ratio-discounted score for containment, otherwise normalized
/// edit distance gated by [`MIN_TOKEN_SIMILARITY`].
pub fn token_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }

    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if longer.contains(shorter) {
        return 0.6 + 0.4 * (shorter.len() as f64 / longer.len() as f64);
    }

    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 0.0;
    }
    let sim = 1.0 - levenshtein(a, b) as f64 / max_len as f64;
    if sim >= MIN_TOKEN_SIMILARITY {
        sim
    } else {
        0.0
    }
}

/// Score a field: for each query token, the best similarity against any
/// field token, averaged over the query tokens.
fn field_score(field_tokens: &[String], query_tokens: &[String]) -> f64 {
    if query_tokens.is_empty() || field_tokens.is_empty() {
        return 0.0;
    }
    let total: f64 = query_tokens
        .iter()
        .map(|q| {
            field_tokens
                .iter()
                .map(|t| token_similarity(t, q))
                .fold(0.0, f64::max)
        })
        .sum();
    total / query_tokens.len() as f64
}

/// Weighted fuzzy relevance of a document for `query`, or `None` when no
/// field clears the match threshold.
pub fn score_document(
    doc: &DocumentMetadata,
    query: &str,
    config: &SearchConfig,
) -> Option<f64> {
    let query_tokens = tokenize(query, config.min_match_len);
    if query_tokens.is_empty() {
        return None;
    }

    let title_tokens = tokenize(&doc.title, 1);
    let keyword_tokens: Vec<String> = doc
        .keywords
        .iter()
        .flat_map(|k| tokenize(k, 1))
        .collect();
    let module_tokens = tokenize(&doc.module, 1);
    let type_tokens = tokenize(doc.document_type.as_str(), 1);

    let fields = [
        (config.title_weight, field_score(&title_tokens, &query_tokens)),
        (
            config.keyword_weight,
            field_score(&keyword_tokens, &query_tokens),
        ),
        (
            config.module_weight,
            field_score(&module_tokens, &query_tokens),
        ),
        (config.type_weight, field_score(&type_tokens, &query_tokens)),
    ];

    let best = fields.iter().map(|(_, s)| *s).fold(0.0, f64::max);
    if best < 1.0 - config.fuzzy_threshold {
        return None;
    }

    let weight_sum: f64 = fields.iter().map(|(w, _)| *w).sum();
    if weight_sum <= f64::EPSILON {
        return None;
    }
    let blended: f64 = fields.iter().map(|(w, s)| w * s).sum::<f64>() / weight_sum;
    Some(blended.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DocumentStatus, DocumentType};
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn doc(title: &str, module: &str, keywords: &[&str]) -> DocumentMetadata {
        DocumentMetadata {
            uri: format!("docs://{}", title),
            file_path: PathBuf::from("/docs/x.md"),
            title: title.to_string(),
            document_type: DocumentType::FeatureDesign,
            module: module.to_string(),
            status: DocumentStatus::Approved,
            version: "1.0.0".to_string(),
            last_updated: chrono::NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            author: "@dev".to_string(),
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            related_docs: BTreeMap::new(),
            extra: None,
        }
    }

    #[test]
    fn levenshtein_basics() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("abc", "abc"), 0);
        assert_eq!(levenshtein("abc", "ab"), 1);
        assert_eq!(levenshtein("abc", "adc"), 1);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
    }

    #[test]
    fn token_similarity_orders_match_quality() {
        let exact = token_similarity("payment", "payment");
        let typo = token_similarity("payment", "paiment");
        let unrelated = token_similarity("payment", "kubernetes");
        assert!((exact - 1.0).abs() < 1e-9);
        assert!(typo > 0.7 && typo < 1.0);
        assert!(unrelated < 1e-9);
    }

    #[test]
    fn containment_scores_between_typo_and_exact() {
        let contained = token_similarity("pay", "payment");
        assert!(contained > 0.6 && contained < 1.0);
    }

    #[test]
    fn exact_title_match_outranks_typo() {
        let d = doc("Payment Processing", "payments", &["payment", "stripe"]);
        let config = SearchConfig::default();

        let exact = score_document(&d, "payment", &config).unwrap();
        let typo = score_document(&d, "paiment", &config).unwrap();
        assert!(exact > typo, "exact {} should beat typo {}", exact, typo);
        assert!(exact <= 1.0);
    }

    #[test]
    fn single_typo_still_matches() {
        let d = doc("Payment Processing", "payments", &["payment"]);
        let config = SearchConfig::default();
        assert!(score_document(&d, "paiment", &config).is_some());
    }

    #[test]
    fn unrelated_query_does_not_match() {
        let d = doc("Payment Processing", "payments", &["payment"]);
        let config = SearchConfig::default();
        assert!(score_document(&d, "zzzzqqqq", &config).is_none());
    }

    #[test]
    fn module_only_match_surfaces_with_low_relevance() {
        let d = doc("Checkout flow", "inventory", &["cart"]);
        let config = SearchConfig::default();
        let score = score_document(&d, "inventory", &config).unwrap();
        assert!(score > 0.0 && score < 0.5);
    }

    #[test]
    fn short_tokens_are_ignored() {
        let d = doc("Payment Processing", "payments", &[]);
        let config = SearchConfig::default();
        assert!(score_document(&d, "a", &config).is_none());
    }
}
