//! # doc-atlas
//!
//! A local-first documentation indexing and retrieval engine for AI tools.
//!
//! doc-atlas scans a markdown corpus carrying YAML front matter, builds an
//! in-memory multi-key index plus a cross-document relationship graph, and
//! answers facet lookups, fuzzy full-text search, and bounded graph-context
//! queries over it.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   ┌─────────────┐
//! │  Corpus  │──▶│ Normalize  │──▶│   DocIndex   │
//! │ (*.md)   │   │ front      │   │ maps+graph  │
//! └──────────┘   │ matter     │   └──────┬──────┘
//!                └───────────┘          │
//!                        ┌──────────────┼──────────────┐
//!                        ▼              ▼              ▼
//!                  ┌──────────┐  ┌───────────┐  ┌──────────┐
//!                  │  Search  │  │ Traversal │  │  Health  │
//!                  └──────────┘  └───────────┘  └──────────┘
//! ```
//!
//! ## Data Flow
//!
//! 1. [`scan`] discovers markdown files under the configured root.
//! 2. [`markdown`] splits front matter from the body; [`normalize`] turns
//!    it into a [`model::DocumentMetadata`] candidate and the admission
//!    rule decides whether it enters the index.
//! 3. [`index`] builds the primary URI map, the by-type/module/status/
//!    keyword groupings, the relationship graph, and the stats snapshot
//!    in one pass. The built index is immutable; rebuilds swap a fresh
//!    snapshot through [`index::IndexHandle`].
//! 4. [`search`] and [`graph`] are read-only consumers; [`ops`] adapts
//!    them into the four caller-facing query operations, and [`health`]
//!    reports structural corpus issues.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`model`] | Core data types |
//! | [`markdown`] | Front matter, sections, code blocks, snippets |
//! | [`normalize`] | Metadata normalization and admission |
//! | [`scan`] | Markdown discovery under the docs root |
//! | [`index`] | Index construction and snapshot handle |
//! | [`graph`] | Bounded relationship traversal |
//! | [`fuzzy`] | Field-weighted fuzzy matching |
//! | [`search`] | Query pipeline: filter, score, sort, paginate |
//! | [`ops`] | Caller-facing query operations |
//! | [`health`] | Corpus health report |

pub mod config;
pub mod fuzzy;
pub mod graph;
pub mod health;
pub mod index;
pub mod markdown;
pub mod model;
pub mod normalize;
pub mod ops;
pub mod scan;
pub mod search;
