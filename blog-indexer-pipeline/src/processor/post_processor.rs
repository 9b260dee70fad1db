//! Post processor implementation.
//!
//! Transforms posts from the content store into PostDocument structures for
//! indexing.

use tracing::{debug, instrument};

use crate::errors::PipelineError;
use crate::source::Post;
use blog_indexer_shared::PostDocument;

/// A post that could not be mapped to a document.
#[derive(Debug)]
pub struct ProcessingFailure {
    /// The offending post's id.
    pub post_id: i64,
    /// The offending post's slug.
    pub slug: String,
    /// Why the mapping failed.
    pub error: PipelineError,
}

/// Result of processing one batch of posts.
#[derive(Debug)]
pub struct ProcessedBatch {
    /// Documents ready for loading.
    pub documents: Vec<PostDocument>,
    /// Posts that could not be mapped, surfaced to the driver.
    pub failures: Vec<ProcessingFailure>,
}

/// Processor that maps posts to search documents.
///
/// Stateless; the same post state always yields a field-for-field identical
/// document, so it is safe to call concurrently and repeatedly.
pub struct PostProcessor {
    // Could hold per-field transform configuration in the future
}

impl PostProcessor {
    /// Create a new post processor.
    pub fn new() -> Self {
        Self {}
    }

    /// Process a batch of posts.
    ///
    /// Posts that fail the integrity check are collected as failures rather
    /// than aborting the batch; one bad record never blocks the rest.
    #[instrument(skip(self, posts), fields(post_count = posts.len()))]
    pub fn process_batch(&self, posts: Vec<Post>) -> ProcessedBatch {
        let mut documents = Vec::with_capacity(posts.len());
        let mut failures = Vec::new();

        for post in posts {
            match self.to_document(&post) {
                Ok(doc) => documents.push(doc),
                Err(error) => failures.push(ProcessingFailure {
                    post_id: post.id,
                    slug: post.slug.clone(),
                    error,
                }),
            }
        }

        debug!(
            document_count = documents.len(),
            failure_count = failures.len(),
            "Processed post batch"
        );

        ProcessedBatch {
            documents,
            failures,
        }
    }

    /// Map one post to its search document.
    ///
    /// Scalar fields pass through unchanged; the author relationship is
    /// projected to the username only, and the tag labels collapse into a
    /// single text blob. A post without a resolvable author is a
    /// data-integrity error, never a document with a blank author field.
    pub fn to_document(&self, post: &Post) -> Result<PostDocument, PipelineError> {
        let author = match post.author_username.as_deref() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => {
                return Err(PipelineError::integrity(format!(
                    "Post {} ({}) has no resolvable author",
                    post.id, post.slug
                )))
            }
        };

        Ok(PostDocument {
            id: post.id,
            title: post.title.clone(),
            slug: post.slug.clone(),
            body: post.body.clone(),
            author,
            tags: Self::tags_text(&post.tag_names),
            publish: post.publish,
            created: post.created,
            updated: post.updated,
            status: post.status,
        })
    }

    /// Collapse tag labels into the indexed text blob.
    ///
    /// Labels are deduplicated, sorted, and joined with ", " so the blob is
    /// independent of the order the store returned them in.
    fn tags_text(tag_names: &[String]) -> String {
        let mut names: Vec<&str> = tag_names.iter().map(String::as_str).collect();
        names.sort_unstable();
        names.dedup();
        names.join(", ")
    }
}

impl Default for PostProcessor {
    fn default() -> Self {
        Self::new()
    }
}
