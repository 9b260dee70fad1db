//! # Blog Indexer Repository
//!
//! This crate provides the trait and implementation for interacting with the
//! search index. It includes error definitions, the provider interface, and a
//! concrete implementation for OpenSearch.

pub mod errors;
pub mod interfaces;
pub mod opensearch;

pub use errors::SearchError;
pub use interfaces::SearchIndexProvider;
pub use opensearch::{IndexConfig, OpenSearchIndex};
