//! Processor module for the blog indexer pipeline.

mod post_processor;

pub use post_processor::{PostProcessor, ProcessedBatch, ProcessingFailure};
