//! # elrc-catalog
//!
//! Catalogue builder for ELRC-SHARE parallel corpora.
//!
//! Given the repository's per-resource JSON exports and the downloaded
//! archives, decides which corpora are usable, resolves duplicate and
//! derived-version relations between them, cross-checks declared
//! languages against the TMX files actually shipped, and emits one
//! normalized record per usable (corpus, language pair).
pub mod archive;
pub mod classify;
pub mod cli;
pub mod corpus;
pub mod error;
pub mod graph;
pub mod lang;
pub mod metadata;
pub mod overrides;
pub mod pipeline;
pub mod records;
