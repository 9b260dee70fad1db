//! OpenSearch backend for the search index.

mod client;
mod index_config;

pub use client::OpenSearchIndex;
pub use index_config::{IndexConfig, DEFAULT_INDEX_NAME};
