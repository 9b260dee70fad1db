//! Source module for the blog indexer pipeline.
//!
//! Defines the post record as read from the content store and the store
//! abstraction the rest of the pipeline consumes.

mod postgres;

pub use postgres::PostgresPostStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::PipelineError;
use blog_indexer_shared::PostStatus;

/// A blog post as read from the content store.
///
/// The store resolves the author relationship and the associated tag labels
/// at query time; the pipeline never goes back to the database for them.
#[derive(Debug, Clone)]
pub struct Post {
    /// Primary key; forwarded as the search document id.
    pub id: i64,
    /// Post title.
    pub title: String,
    /// Unique short identifier.
    pub slug: String,
    /// Post body.
    pub body: String,
    /// When the post was published.
    pub publish: DateTime<Utc>,
    /// When the post row was created.
    pub created: DateTime<Utc>,
    /// When the post row was last updated.
    pub updated: DateTime<Utc>,
    /// Publication status.
    pub status: PostStatus,
    /// Username of the related author; `None` if the relationship is broken.
    pub author_username: Option<String>,
    /// Labels of associated tags, unordered and possibly duplicated.
    pub tag_names: Vec<String>,
}

/// Abstract interface to the content store.
///
/// Implementations must be `Send + Sync`. The only read the pipeline needs
/// is the eligible-posts query: published posts in a stable order, fetched
/// in fixed-size pages.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Fetch one page of published posts, ordered by id ascending.
    ///
    /// Pure read with no side effects; paging through with a fixed `limit`
    /// and increasing `offset` yields the same sequence as one unbounded
    /// fetch, with no duplicates or omissions.
    async fn fetch_published(&self, limit: i64, offset: i64) -> Result<Vec<Post>, PipelineError>;
}
