//! # Blog Indexer Shared
//!
//! Shared types for the blog search indexer: the post status enum and the
//! document shape stored in the search index.

pub mod document;
pub mod status;

pub use document::PostDocument;
pub use status::{PostStatus, StatusParseError};
