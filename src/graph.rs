//! Bounded traversal of the document relationship graph.
//!
//! Traversal is an explicit-queue breadth-first walk with a visited set;
//! the depth bound is a hard cutoff regardless of fan-out, and cycles
//! terminate naturally. The starting document is excluded from the
//! result set; it is returned separately as the primary document.

use std::collections::{BTreeSet, HashSet, VecDeque};

use serde::Serialize;

use crate::index::DocIndex;
use crate::model::{DocumentMetadata, DocumentType};

/// Related documents partitioned by kind for downstream rendering.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RelatedBuckets {
    pub architecture: Vec<DocumentMetadata>,
    pub database: Vec<DocumentMetadata>,
    pub api: Vec<DocumentMetadata>,
    pub ux: Vec<DocumentMetadata>,
    pub testing: Vec<DocumentMetadata>,
    pub feature: Vec<DocumentMetadata>,
    pub other: Vec<DocumentMetadata>,
}

impl RelatedBuckets {
    pub fn total(&self) -> usize {
        self.architecture.len()
            + self.database.len()
            + self.api.len()
            + self.ux.len()
            + self.testing.len()
            + self.feature.len()
            + self.other.len()
    }
}

/// A primary document with its reachable neighborhood.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentContext {
    pub primary: DocumentMetadata,
    pub related: RelatedBuckets,
    pub depth: usize,
    pub total_documents: usize,
}

/// URIs reachable from `start` within `max_depth` hops, excluding
/// `start` itself. Targets that are not indexed are still reported;
/// resolution is the caller's concern.
pub fn reachable(index: &DocIndex, start: &str, max_depth: usize) -> BTreeSet<String> {
    let mut visited: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<(String, usize)> = VecDeque::new();
    queue.push_back((start.to_string(), 0));

    while let Some((uri, depth)) = queue.pop_front() {
        if visited.contains(&uri) || depth > max_depth {
            continue;
        }
        visited.insert(uri.clone());

        if let Some(neighbors) = index.neighbors(&uri) {
            for neighbor in neighbors {
                if !visited.contains(neighbor) {
                    queue.push_back((neighbor.clone(), depth + 1));
                }
            }
        }
    }

    visited.remove(start);
    visited.into_iter().collect()
}

/// Assemble the context bundle for a document, or `None` when the URI is
/// not indexed.
pub fn document_context(index: &DocIndex, uri: &str, depth: usize) -> Option<DocumentContext> {
    let primary = index.get(uri)?.clone();

    let mut related = RelatedBuckets::default();
    for reached in reachable(index, uri, depth) {
        let doc = match index.get(&reached) {
            Some(d) => d.clone(),
            // Dangling relation target; nothing to show for it here.
            None => continue,
        };
        match doc.document_type {
            DocumentType::Adr => related.architecture.push(doc),
            DocumentType::DatabaseSchema => related.database.push(doc),
            DocumentType::ApiDesign => related.api.push(doc),
            DocumentType::UxFlow => related.ux.push(doc),
            DocumentType::TestingStrategy => related.testing.push(doc),
            DocumentType::FeatureDesign => related.feature.push(doc),
            _ => related.other.push(doc),
        }
    }

    let total_documents = related.total();
    Some(DocumentContext {
        primary,
        related,
        depth,
        total_documents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DocumentStatus;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn doc(uri: &str, document_type: DocumentType, related: &[&str]) -> DocumentMetadata {
        let mut related_docs = BTreeMap::new();
        for (i, target) in related.iter().enumerate() {
            related_docs.insert(format!("rel-{}", i), target.to_string());
        }
        DocumentMetadata {
            uri: uri.to_string(),
            file_path: PathBuf::from("/docs/x.md"),
            title: uri.to_string(),
            document_type,
            module: "payments".to_string(),
            status: DocumentStatus::Approved,
            version: "1.0.0".to_string(),
            last_updated: chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            author: "@dev".to_string(),
            keywords: Vec::new(),
            related_docs,
            extra: None,
        }
    }

    fn diamond() -> DocIndex {
        // a -> b, b -> c, a -> c
        DocIndex::from_documents(vec![
            doc("docs://a", DocumentType::FeatureDesign, &["docs://b", "docs://c"]),
            doc("docs://b", DocumentType::ApiDesign, &["docs://c"]),
            doc("docs://c", DocumentType::DatabaseSchema, &[]),
        ])
    }

    #[test]
    fn depth_one_reaches_direct_neighbors() {
        let index = diamond();
        let reached = reachable(&index, "docs://a", 1);
        assert_eq!(
            reached.into_iter().collect::<Vec<_>>(),
            vec!["docs://b".to_string(), "docs://c".to_string()]
        );
    }

    #[test]
    fn start_is_excluded() {
        let index = diamond();
        assert!(!reachable(&index, "docs://a", 2).contains("docs://a"));
    }

    #[test]
    fn depth_bound_is_a_hard_cutoff() {
        // chain a -> b -> c -> d
        let index = DocIndex::from_documents(vec![
            doc("docs://a", DocumentType::General, &["docs://b"]),
            doc("docs://b", DocumentType::General, &["docs://c"]),
            doc("docs://c", DocumentType::General, &["docs://d"]),
            doc("docs://d", DocumentType::General, &[]),
        ]);
        let reached = reachable(&index, "docs://a", 2);
        assert!(reached.contains("docs://b"));
        assert!(reached.contains("docs://c"));
        assert!(!reached.contains("docs://d"));
    }

    #[test]
    fn cycles_terminate() {
        let index = DocIndex::from_documents(vec![
            doc("docs://a", DocumentType::General, &["docs://b"]),
            doc("docs://b", DocumentType::General, &["docs://a"]),
        ]);
        let reached = reachable(&index, "docs://a", 3);
        assert_eq!(reached.len(), 1);
        assert!(reached.contains("docs://b"));
    }

    #[test]
    fn context_buckets_by_document_type() {
        let index = diamond();
        let context = document_context(&index, "docs://a", 1).unwrap();
        assert_eq!(context.primary.uri, "docs://a");
        assert_eq!(context.related.api.len(), 1);
        assert_eq!(context.related.database.len(), 1);
        assert!(context.related.architecture.is_empty());
        assert_eq!(context.total_documents, 2);
        assert_eq!(context.depth, 1);
    }

    #[test]
    fn missing_start_uri_yields_none() {
        let index = diamond();
        assert!(document_context(&index, "docs://missing", 1).is_none());
    }

    #[test]
    fn dangling_targets_are_skipped_in_context() {
        let index = DocIndex::from_documents(vec![doc(
            "docs://a",
            DocumentType::General,
            &["docs://ghost"],
        )]);
        let context = document_context(&index, "docs://a", 1).unwrap();
        assert_eq!(context.total_documents, 0);
    }
}
