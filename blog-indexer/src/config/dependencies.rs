//! Dependency initialization and wiring for the blog indexer.

use std::env;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::IndexingError;
use blog_indexer_pipeline::{
    loader::{LoaderConfig, SearchLoader},
    orchestrator::{SyncConfig, SyncDriver},
    processor::PostProcessor,
    source::PostgresPostStore,
};
use blog_indexer_repository::{IndexConfig, OpenSearchIndex, SearchIndexProvider};

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default page size for the published-posts query.
const DEFAULT_PAGE_SIZE: i64 = 50;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured synchronization driver ready to run.
    pub driver: SyncDriver,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DATABASE_URL`: PostgreSQL connection string (required)
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `INDEX_NAME`: Search index name (default: blog_posts)
    /// - `INDEX_SHARDS`: Primary shard count (default: 1)
    /// - `INDEX_REPLICAS`: Replica count (default: 0)
    /// - `SYNC_PAGE_SIZE`: Posts fetched per page (default: 50)
    pub async fn new() -> Result<Self, IndexingError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| IndexingError::config("DATABASE_URL is not set"))?;
        let opensearch_url =
            env::var("OPENSEARCH_URL").unwrap_or_else(|_| DEFAULT_OPENSEARCH_URL.to_string());

        let index_config = index_config_from_env()?;
        let page_size = env_parse("SYNC_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;

        info!(
            opensearch_url = %opensearch_url,
            index = %index_config.name,
            page_size = page_size,
            "Initializing dependencies"
        );

        // Initialize the content store
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await
            .map_err(|e| IndexingError::config(format!("Failed to connect to database: {}", e)))?;

        info!("Database connection verified");

        // Initialize the search index client
        let search_index = OpenSearchIndex::new(&opensearch_url, index_config)
            .map_err(|e| IndexingError::config(format!("Failed to create OpenSearch client: {}", e)))?;

        // Verify OpenSearch is reachable
        let healthy = search_index
            .health_check()
            .await
            .map_err(|e| IndexingError::config(format!("OpenSearch health check failed: {}", e)))?;

        if !healthy {
            return Err(IndexingError::config("OpenSearch cluster is unhealthy"));
        }

        info!("OpenSearch connection verified");

        let store = Arc::new(PostgresPostStore::new(pool));
        let processor = PostProcessor::new();
        let loader = SearchLoader::with_config(
            Arc::new(search_index),
            LoaderConfig {
                batch_size: page_size as usize,
            },
        );

        let driver = SyncDriver::with_config(
            store,
            processor,
            loader,
            SyncConfig {
                page_size,
                prune_stale: true,
            },
        );

        Ok(Self { driver })
    }
}

/// Build the index configuration from the environment, falling back to the
/// development defaults (one shard, no replicas).
fn index_config_from_env() -> Result<IndexConfig, IndexingError> {
    let defaults = IndexConfig::default();

    let name = env::var("INDEX_NAME").unwrap_or(defaults.name);
    let shards = env_parse("INDEX_SHARDS", defaults.shards)?;
    let replicas = env_parse("INDEX_REPLICAS", defaults.replicas)?;

    Ok(IndexConfig::new(name, shards, replicas))
}

/// Read an environment variable and parse it, keeping the default when the
/// variable is unset.
fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T, IndexingError> {
    match env::var(key) {
        Ok(value) => value
            .parse()
            .map_err(|_| IndexingError::config(format!("Invalid value for {}: {}", key, value))),
        Err(_) => Ok(default),
    }
}
