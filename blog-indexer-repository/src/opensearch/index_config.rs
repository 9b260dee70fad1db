//! OpenSearch index configuration and mappings.
//!
//! This module defines the index settings and field mappings for the
//! `blog_posts` index.

use serde_json::{json, Value};

/// The default name of the search index.
pub const DEFAULT_INDEX_NAME: &str = "blog_posts";

/// Configuration for the blog post index.
///
/// Shard and replica counts are deployment-time parameters; the defaults
/// (one shard, no replicas) fit a single-node development cluster and are
/// expected to be overridden per environment.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Name of the index all post documents live in.
    pub name: String,
    /// Number of primary shards.
    pub shards: u32,
    /// Number of replicas per shard.
    pub replicas: u32,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_INDEX_NAME.to_string(),
            shards: 1,
            replicas: 0,
        }
    }
}

impl IndexConfig {
    /// Create a config for a named index with explicit shard/replica counts.
    pub fn new(name: impl Into<String>, shards: u32, replicas: u32) -> Self {
        Self {
            name: name.into(),
            shards,
            replicas,
        }
    }

    /// The index creation body: settings plus field mappings.
    ///
    /// Field analysis:
    /// - `title`: `standard`-analyzed text, with a `raw` keyword sub-field
    ///   for exact matches and a `suggest` sub-field using the `simple`
    ///   analyzer (whitespace/punctuation tokenization, no stemming).
    /// - `body`: `standard`-analyzed text with a `raw` keyword sub-field.
    /// - `author`, `tags`: text with a `raw` keyword sub-field; the keyword
    ///   variant is what filtering and aggregations use.
    /// - `slug`, `status`: keyword only.
    /// - `publish`, `created`, `updated`: date.
    pub fn creation_body(&self) -> Value {
        json!({
            "settings": {
                "number_of_shards": self.shards,
                "number_of_replicas": self.replicas
            },
            "mappings": {
                "properties": {
                    "id": {
                        "type": "long"
                    },
                    "title": {
                        "type": "text",
                        "analyzer": "standard",
                        "fields": {
                            "raw": {
                                "type": "keyword"
                            },
                            "suggest": {
                                "type": "text",
                                "analyzer": "simple"
                            }
                        }
                    },
                    "body": {
                        "type": "text",
                        "analyzer": "standard",
                        "fields": {
                            "raw": {
                                "type": "keyword"
                            }
                        }
                    },
                    "author": {
                        "type": "text",
                        "fields": {
                            "raw": {
                                "type": "keyword"
                            }
                        }
                    },
                    "tags": {
                        "type": "text",
                        "fields": {
                            "raw": {
                                "type": "keyword"
                            }
                        }
                    },
                    "slug": {
                        "type": "keyword"
                    },
                    "status": {
                        "type": "keyword"
                    },
                    "publish": {
                        "type": "date"
                    },
                    "created": {
                        "type": "date"
                    },
                    "updated": {
                        "type": "date"
                    }
                }
            }
        })
    }
}
