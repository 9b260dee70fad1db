//! Post publication status.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Publication state of a post.
///
/// Only `Published` posts are eligible for indexing; everything else is
/// excluded at the source query and pruned from the index on the next
/// synchronization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    /// Visible on the site and eligible for indexing.
    Published,
    /// Work in progress, never indexed.
    Draft,
}

impl PostStatus {
    /// The wire/database representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Published => "published",
            PostStatus::Draft => "draft",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a status string is not recognized.
#[derive(Debug, Clone, Error)]
#[error("Unknown post status: {0}")]
pub struct StatusParseError(pub String);

impl FromStr for PostStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "published" => Ok(PostStatus::Published),
            "draft" => Ok(PostStatus::Draft),
            other => Err(StatusParseError(other.to_string())),
        }
    }
}
