//! Search index provider trait definition.
//!
//! This module defines the abstract interface for search index operations,
//! allowing for different backend implementations (OpenSearch, mocks, etc.).

use async_trait::async_trait;

use crate::errors::SearchError;
use blog_indexer_shared::PostDocument;

/// Abstracts the underlying search index implementation.
///
/// The synchronization pipeline only talks to this trait; the concrete
/// backend is injected at startup, which keeps the pipeline testable with
/// mock implementations.
///
/// All implementations must be `Send + Sync` so they can be shared across
/// async tasks, and all methods return `Result<T, SearchError>` for
/// consistent error handling.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Ensure the search index exists with the configured settings and
    /// mappings.
    ///
    /// If the index already exists it is left untouched; existing mappings
    /// are never rewritten. Called once during startup.
    async fn ensure_index_exists(&self) -> Result<(), SearchError>;

    /// Check if the search engine is healthy and reachable.
    ///
    /// Returns `Ok(false)` for a reachable but unhealthy cluster and an
    /// error if the check itself cannot be executed.
    async fn health_check(&self) -> Result<bool, SearchError>;

    /// Index a single document.
    ///
    /// If a document with the same id already exists it is replaced.
    async fn index_document(&self, document: &PostDocument) -> Result<(), SearchError>;

    /// Index multiple documents in a single bulk request.
    ///
    /// More efficient than calling [`Self::index_document`] per document.
    /// Returns `Err(SearchError::BulkIndexError)` if any item in the bulk
    /// response reports a failure.
    async fn bulk_index(&self, documents: &[PostDocument]) -> Result<(), SearchError>;

    /// Delete the document for the given post id.
    ///
    /// Deleting a document that does not exist is not an error.
    async fn delete_document(&self, post_id: i64) -> Result<(), SearchError>;

    /// Delete every document whose id is NOT in `live_ids`.
    ///
    /// Used after a full synchronization run to remove documents for posts
    /// that are no longer published. Returns the number of deleted documents.
    async fn delete_stale(&self, live_ids: &[i64]) -> Result<u64, SearchError>;
}
