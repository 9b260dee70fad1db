//! Entry point for the blog search indexer.
//!
//! Runs one full synchronization pass of published posts into the search
//! index and exits.

use tracing::info;
use tracing_subscriber::EnvFilter;

use blog_indexer::{Dependencies, IndexingError};

#[tokio::main]
async fn main() -> Result<(), IndexingError> {
    dotenv::dotenv().ok();

    init_tracing();

    let mut deps = Dependencies::new().await?;
    let summary = deps.driver.run().await?;

    info!(
        fetched = summary.fetched,
        indexed = summary.indexed,
        failed = summary.failed,
        pruned = summary.pruned,
        "Indexing finished"
    );

    Ok(())
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` controls filtering (default `info`); setting `LOG_JSON`
/// switches to JSON output for log shipping.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if std::env::var("LOG_JSON").is_ok() {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
