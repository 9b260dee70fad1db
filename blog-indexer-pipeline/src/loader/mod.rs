//! Loader module for the blog indexer pipeline.
//!
//! Batches processed documents and loads them into the search index.

use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::errors::PipelineError;
use blog_indexer_repository::SearchIndexProvider;
use blog_indexer_shared::PostDocument;

/// Configuration for the search loader.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Number of documents to batch before flushing.
    pub batch_size: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self { batch_size: 50 }
    }
}

/// Loader that indexes documents into the search engine.
///
/// Documents are buffered until the batch size is reached, then written in
/// one bulk request. Callers must [`flush`](Self::flush) at the end of a run
/// to push any partial batch.
pub struct SearchLoader {
    provider: Arc<dyn SearchIndexProvider>,
    config: LoaderConfig,
    pending_docs: Vec<PostDocument>,
}

impl SearchLoader {
    /// Create a new search loader with the default batch size.
    pub fn new(provider: Arc<dyn SearchIndexProvider>) -> Self {
        Self::with_config(provider, LoaderConfig::default())
    }

    /// Create a new search loader with custom configuration.
    pub fn with_config(provider: Arc<dyn SearchIndexProvider>, config: LoaderConfig) -> Self {
        let batch_size = config.batch_size;
        Self {
            provider,
            config,
            pending_docs: Vec::with_capacity(batch_size),
        }
    }

    /// Queue documents for indexing, flushing whenever a full batch is ready.
    #[instrument(skip(self, documents), fields(document_count = documents.len()))]
    pub async fn load(&mut self, documents: Vec<PostDocument>) -> Result<(), PipelineError> {
        for doc in documents {
            self.pending_docs.push(doc);

            if self.pending_docs.len() >= self.config.batch_size {
                self.flush().await?;
            }
        }

        Ok(())
    }

    /// Flush all pending documents to the search index.
    #[instrument(skip(self))]
    pub async fn flush(&mut self) -> Result<(), PipelineError> {
        if self.pending_docs.is_empty() {
            return Ok(());
        }

        let docs: Vec<PostDocument> = self.pending_docs.drain(..).collect();
        let count = docs.len();

        debug!(count = count, "Flushing documents to search index");

        match self.provider.bulk_index(&docs).await {
            Ok(()) => {
                debug!(count = count, "Successfully indexed documents");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, count = count, "Failed to bulk index documents");

                // On bulk failure, try indexing individually
                warn!("Attempting individual document indexing");
                let mut success_count = 0;
                let mut error_count = 0;

                for doc in docs {
                    match self.provider.index_document(&doc).await {
                        Ok(()) => success_count += 1,
                        Err(e) => {
                            error!(
                                post_id = doc.id,
                                slug = %doc.slug,
                                error = %e,
                                "Failed to index individual document"
                            );
                            error_count += 1;
                        }
                    }
                }

                info!(
                    success = success_count,
                    errors = error_count,
                    "Individual indexing completed"
                );

                if error_count > 0 {
                    Err(PipelineError::loader(format!(
                        "Failed to index {} documents",
                        error_count
                    )))
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Remove every document whose post id is not in `live_ids`.
    pub async fn delete_stale(&self, live_ids: &[i64]) -> Result<u64, PipelineError> {
        let pruned = self.provider.delete_stale(live_ids).await?;
        if pruned > 0 {
            info!(pruned = pruned, "Removed stale documents");
        }
        Ok(pruned)
    }

    /// Ensure the search index exists.
    pub async fn ensure_index(&self) -> Result<(), PipelineError> {
        self.provider
            .ensure_index_exists()
            .await
            .map_err(PipelineError::from)
    }

    /// Check if the search engine is healthy.
    pub async fn health_check(&self) -> Result<bool, PipelineError> {
        self.provider.health_check().await.map_err(PipelineError::from)
    }
}
