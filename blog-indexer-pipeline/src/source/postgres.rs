//! PostgreSQL implementation of the post store.
//!
//! Reads published posts with their author username and tag labels resolved
//! in a single query.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use sqlx::FromRow;
use tracing::debug;

use crate::errors::PipelineError;
use crate::source::{Post, PostStore};
use blog_indexer_shared::PostStatus;

/// Published posts page query.
///
/// The author join is a LEFT JOIN on purpose: a post with a dangling
/// author_id still comes back (with a NULL username) so the processor can
/// surface it as a data-integrity error instead of the row silently
/// disappearing from the sync.
const FETCH_PUBLISHED: &str = r#"
SELECT
    p.id,
    p.title,
    p.slug,
    p.body,
    p.publish,
    p.created,
    p.updated,
    p.status,
    u.username AS author_username,
    COALESCE(
        ARRAY_AGG(DISTINCT t.name) FILTER (WHERE t.name IS NOT NULL),
        ARRAY[]::text[]
    ) AS tag_names
FROM posts p
LEFT JOIN users u ON u.id = p.author_id
LEFT JOIN post_tags pt ON pt.post_id = p.id
LEFT JOIN tags t ON t.id = pt.tag_id
WHERE p.status = 'published'
GROUP BY p.id, u.username
ORDER BY p.id
LIMIT $1 OFFSET $2
"#;

/// Row shape returned by [`FETCH_PUBLISHED`].
#[derive(Debug, FromRow)]
struct PostRow {
    id: i64,
    title: String,
    slug: String,
    body: String,
    publish: DateTime<Utc>,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
    status: String,
    author_username: Option<String>,
    tag_names: Vec<String>,
}

impl TryFrom<PostRow> for Post {
    type Error = PipelineError;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        let status: PostStatus = row
            .status
            .parse()
            .map_err(|e| PipelineError::source(format!("Post {}: {}", row.id, e)))?;

        Ok(Post {
            id: row.id,
            title: row.title,
            slug: row.slug,
            body: row.body,
            publish: row.publish,
            created: row.created,
            updated: row.updated,
            status,
            author_username: row.author_username,
            tag_names: row.tag_names,
        })
    }
}

/// Post store backed by a PostgreSQL connection pool.
pub struct PostgresPostStore {
    pool: PgPool,
}

impl PostgresPostStore {
    /// Create a new store over an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PostgresPostStore {
    async fn fetch_published(&self, limit: i64, offset: i64) -> Result<Vec<Post>, PipelineError> {
        let rows: Vec<PostRow> = sqlx::query_as(FETCH_PUBLISHED)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = rows.len(), offset = offset, "Fetched published posts");

        rows.into_iter().map(Post::try_from).collect()
    }
}
