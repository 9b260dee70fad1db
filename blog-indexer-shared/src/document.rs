//! The document shape stored in the search index.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::PostStatus;

/// A post as it is stored in the `blog_posts` search index.
///
/// Derived from a source post, never authoritative. Field analysis (full-text
/// vs. exact-match sub-fields) is declared in the index mappings, not here;
/// this struct only carries the values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDocument {
    /// The source post's primary key, reused as the document id.
    pub id: i64,
    /// Post title, analyzed for full-text search.
    pub title: String,
    /// Unique short identifier, exact-match only.
    pub slug: String,
    /// Post body, analyzed for full-text search.
    pub body: String,
    /// The author's username, not the full author record.
    pub author: String,
    /// Tag labels joined into a single text blob.
    pub tags: String,
    /// When the post was published.
    pub publish: DateTime<Utc>,
    /// When the post row was created.
    pub created: DateTime<Utc>,
    /// When the post row was last updated.
    pub updated: DateTime<Utc>,
    /// Publication status; always `published` for indexed documents.
    pub status: PostStatus,
}

impl PostDocument {
    /// The identifier under which this document is stored in the index.
    pub fn document_id(&self) -> String {
        self.id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> PostDocument {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        PostDocument {
            id: 7,
            title: "Hello World".to_string(),
            slug: "hello-world".to_string(),
            body: "First post.".to_string(),
            author: "alice".to_string(),
            tags: "django, python".to_string(),
            publish: ts,
            created: ts,
            updated: ts,
            status: PostStatus::Published,
        }
    }

    #[test]
    fn test_document_id() {
        assert_eq!(sample().document_id(), "7");
    }

    #[test]
    fn test_serde_round_trip() {
        let doc = sample();
        let json = serde_json::to_string(&doc).unwrap();
        let back: PostDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_status_serialized_as_string() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["status"], "published");
        assert_eq!(value["author"], "alice");
    }
}
