//! Error types for the blog indexer pipeline.

use blog_indexer_repository::SearchError;
use thiserror::Error;

/// Errors that can occur in the blog indexer pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Error reading posts from the content store.
    #[error("Source error: {0}")]
    SourceError(String),

    /// Error from the processor component.
    #[error("Processor error: {0}")]
    ProcessorError(String),

    /// A record passed the eligibility filter but cannot be mapped to a
    /// document (e.g., a post whose author row is missing).
    #[error("Data integrity error: {0}")]
    IntegrityError(String),

    /// Error from the loader component.
    #[error("Loader error: {0}")]
    LoaderError(String),

    /// Error from the search index.
    #[error("Search error: {0}")]
    SearchError(#[from] SearchError),
}

impl PipelineError {
    /// Create a source error.
    pub fn source(msg: impl Into<String>) -> Self {
        Self::SourceError(msg.into())
    }

    /// Create a processor error.
    pub fn processor(msg: impl Into<String>) -> Self {
        Self::ProcessorError(msg.into())
    }

    /// Create a data integrity error.
    pub fn integrity(msg: impl Into<String>) -> Self {
        Self::IntegrityError(msg.into())
    }

    /// Create a loader error.
    pub fn loader(msg: impl Into<String>) -> Self {
        Self::LoaderError(msg.into())
    }
}

impl From<sqlx::Error> for PipelineError {
    fn from(err: sqlx::Error) -> Self {
        Self::SourceError(err.to_string())
    }
}
