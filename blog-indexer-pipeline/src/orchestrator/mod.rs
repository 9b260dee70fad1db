//! Orchestrator module for the blog indexer pipeline.
//!
//! Drives a full synchronization run: page through eligible posts, map them
//! to documents, bulk-load them, then prune documents whose posts are no
//! longer published.

use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::errors::PipelineError;
use crate::loader::SearchLoader;
use crate::processor::PostProcessor;
use crate::source::PostStore;

/// Configuration for the synchronization driver.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Number of posts fetched from the store per page. Also the loader's
    /// default batch size.
    pub page_size: i64,
    /// Whether to prune documents for posts that are no longer published.
    pub prune_stale: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_size: 50,
            prune_stale: true,
        }
    }
}

/// Outcome of a synchronization run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    /// Posts fetched from the store.
    pub fetched: usize,
    /// Documents submitted to the index.
    pub indexed: usize,
    /// Posts skipped due to data-integrity failures.
    pub failed: usize,
    /// Stale documents removed from the index.
    pub pruned: u64,
}

/// Driver that coordinates the source, processor, and loader.
///
/// One driver owns one full pass over the eligible posts. Integrity
/// failures are logged and counted but never abort the run; store and
/// index connectivity failures do.
pub struct SyncDriver {
    store: Arc<dyn PostStore>,
    processor: PostProcessor,
    loader: SearchLoader,
    config: SyncConfig,
}

impl SyncDriver {
    /// Create a new driver with the default configuration.
    pub fn new(store: Arc<dyn PostStore>, processor: PostProcessor, loader: SearchLoader) -> Self {
        Self::with_config(store, processor, loader, SyncConfig::default())
    }

    /// Create a new driver with custom configuration.
    pub fn with_config(
        store: Arc<dyn PostStore>,
        processor: PostProcessor,
        loader: SearchLoader,
        config: SyncConfig,
    ) -> Self {
        Self {
            store,
            processor,
            loader,
            config,
        }
    }

    /// Run one full synchronization pass.
    #[instrument(skip(self))]
    pub async fn run(&mut self) -> Result<SyncSummary, PipelineError> {
        info!(page_size = self.config.page_size, "Starting synchronization run");

        self.loader.ensure_index().await?;

        let mut fetched = 0;
        let mut indexed = 0;
        let mut failed = 0;
        // Every post that is currently published stays in the index, even
        // ones we failed to re-map this run: pruning only removes documents
        // for posts that dropped out of the eligible set.
        let mut live_ids: Vec<i64> = Vec::new();

        let mut offset = 0;
        loop {
            let posts = self
                .store
                .fetch_published(self.config.page_size, offset)
                .await?;

            if posts.is_empty() {
                break;
            }

            let page_len = posts.len();
            fetched += page_len;
            offset += page_len as i64;
            live_ids.extend(posts.iter().map(|p| p.id));

            let batch = self.processor.process_batch(posts);

            for failure in &batch.failures {
                error!(
                    post_id = failure.post_id,
                    slug = %failure.slug,
                    error = %failure.error,
                    "Skipping post that cannot be mapped"
                );
            }
            failed += batch.failures.len();
            indexed += batch.documents.len();

            self.loader.load(batch.documents).await?;

            if page_len < self.config.page_size as usize {
                break;
            }
        }

        self.loader.flush().await?;

        let pruned = if self.config.prune_stale {
            self.loader.delete_stale(&live_ids).await?
        } else {
            0
        };

        let summary = SyncSummary {
            fetched,
            indexed,
            failed,
            pruned,
        };

        info!(
            fetched = summary.fetched,
            indexed = summary.indexed,
            failed = summary.failed,
            pruned = summary.pruned,
            "Synchronization run complete"
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Post;
    use async_trait::async_trait;
    use blog_indexer_repository::{SearchError, SearchIndexProvider};
    use blog_indexer_shared::{PostDocument, PostStatus};
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory store mimicking the published filter and id ordering of
    /// the SQL query.
    struct InMemoryPostStore {
        posts: Mutex<Vec<Post>>,
        fetch_calls: AtomicUsize,
    }

    impl InMemoryPostStore {
        fn new(posts: Vec<Post>) -> Self {
            Self {
                posts: Mutex::new(posts),
                fetch_calls: AtomicUsize::new(0),
            }
        }

        fn set_status(&self, post_id: i64, status: PostStatus) {
            let mut posts = self.posts.lock().unwrap();
            if let Some(post) = posts.iter_mut().find(|p| p.id == post_id) {
                post.status = status;
            }
        }
    }

    #[async_trait]
    impl PostStore for InMemoryPostStore {
        async fn fetch_published(
            &self,
            limit: i64,
            offset: i64,
        ) -> Result<Vec<Post>, PipelineError> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);

            let mut published: Vec<Post> = self
                .posts
                .lock()
                .unwrap()
                .iter()
                .filter(|p| p.status == PostStatus::Published)
                .cloned()
                .collect();
            published.sort_by_key(|p| p.id);

            Ok(published
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .collect())
        }
    }

    /// Mock index that records documents keyed by post id.
    struct RecordingIndex {
        documents: Mutex<HashMap<i64, PostDocument>>,
    }

    impl RecordingIndex {
        fn new() -> Self {
            Self {
                documents: Mutex::new(HashMap::new()),
            }
        }

        fn ids(&self) -> Vec<i64> {
            let mut ids: Vec<i64> = self.documents.lock().unwrap().keys().copied().collect();
            ids.sort_unstable();
            ids
        }
    }

    #[async_trait]
    impl SearchIndexProvider for RecordingIndex {
        async fn ensure_index_exists(&self) -> Result<(), SearchError> {
            Ok(())
        }

        async fn health_check(&self) -> Result<bool, SearchError> {
            Ok(true)
        }

        async fn index_document(&self, doc: &PostDocument) -> Result<(), SearchError> {
            self.documents.lock().unwrap().insert(doc.id, doc.clone());
            Ok(())
        }

        async fn bulk_index(&self, docs: &[PostDocument]) -> Result<(), SearchError> {
            let mut documents = self.documents.lock().unwrap();
            for doc in docs {
                documents.insert(doc.id, doc.clone());
            }
            Ok(())
        }

        async fn delete_document(&self, post_id: i64) -> Result<(), SearchError> {
            self.documents.lock().unwrap().remove(&post_id);
            Ok(())
        }

        async fn delete_stale(&self, live_ids: &[i64]) -> Result<u64, SearchError> {
            let mut documents = self.documents.lock().unwrap();
            let before = documents.len();
            documents.retain(|id, _| live_ids.contains(id));
            Ok((before - documents.len()) as u64)
        }
    }

    fn post(id: i64, slug: &str, status: PostStatus) -> Post {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        Post {
            id,
            title: format!("Post {}", id),
            slug: slug.to_string(),
            body: "Body".to_string(),
            publish: ts,
            created: ts,
            updated: ts,
            status,
            author_username: Some("alice".to_string()),
            tag_names: vec!["python".to_string(), "django".to_string()],
        }
    }

    fn driver(
        store: Arc<InMemoryPostStore>,
        index: Arc<RecordingIndex>,
        config: SyncConfig,
    ) -> SyncDriver {
        SyncDriver::with_config(
            store,
            PostProcessor::new(),
            SearchLoader::new(index),
            config,
        )
    }

    #[tokio::test]
    async fn test_only_published_posts_indexed() {
        let store = Arc::new(InMemoryPostStore::new(vec![
            post(1, "hello-world", PostStatus::Published),
            post(2, "wip", PostStatus::Draft),
            post(3, "second", PostStatus::Published),
        ]));
        let index = Arc::new(RecordingIndex::new());

        let summary = driver(store, index.clone(), SyncConfig::default())
            .run()
            .await
            .unwrap();

        assert_eq!(summary.fetched, 2);
        assert_eq!(summary.indexed, 2);
        assert_eq!(summary.failed, 0);
        assert_eq!(index.ids(), vec![1, 3]);
    }

    #[tokio::test]
    async fn test_document_content_scenario() {
        let store = Arc::new(InMemoryPostStore::new(vec![post(
            1,
            "hello-world",
            PostStatus::Published,
        )]));
        let index = Arc::new(RecordingIndex::new());

        driver(store, index.clone(), SyncConfig::default())
            .run()
            .await
            .unwrap();

        let documents = index.documents.lock().unwrap();
        let doc = documents.get(&1).unwrap();
        assert_eq!(doc.slug, "hello-world");
        assert_eq!(doc.status, PostStatus::Published);
        assert_eq!(doc.author, "alice");
        assert_eq!(doc.tags, "django, python");
    }

    #[tokio::test]
    async fn test_pagination_covers_all_posts() {
        let posts: Vec<Post> = (1..=7)
            .map(|id| post(id, &format!("post-{}", id), PostStatus::Published))
            .collect();
        let store = Arc::new(InMemoryPostStore::new(posts));
        let index = Arc::new(RecordingIndex::new());

        let config = SyncConfig {
            page_size: 2,
            prune_stale: true,
        };
        let summary = driver(store.clone(), index.clone(), config)
            .run()
            .await
            .unwrap();

        // Four pages (2+2+2+1), every post exactly once
        assert_eq!(store.fetch_calls.load(Ordering::SeqCst), 4);
        assert_eq!(summary.fetched, 7);
        assert_eq!(index.ids(), (1..=7).collect::<Vec<i64>>());
    }

    #[tokio::test]
    async fn test_unpublished_post_pruned_on_next_sync() {
        let store = Arc::new(InMemoryPostStore::new(vec![
            post(1, "hello-world", PostStatus::Published),
            post(2, "retracted", PostStatus::Published),
        ]));
        let index = Arc::new(RecordingIndex::new());

        driver(store.clone(), index.clone(), SyncConfig::default())
            .run()
            .await
            .unwrap();
        assert_eq!(index.ids(), vec![1, 2]);

        // Post 2 transitions published -> draft
        store.set_status(2, PostStatus::Draft);

        let summary = driver(store, index.clone(), SyncConfig::default())
            .run()
            .await
            .unwrap();

        assert_eq!(summary.pruned, 1);
        assert_eq!(index.ids(), vec![1]);
    }

    #[tokio::test]
    async fn test_integrity_failure_skips_post_but_keeps_run_alive() {
        let mut orphaned = post(2, "orphaned", PostStatus::Published);
        orphaned.author_username = None;
        let store = Arc::new(InMemoryPostStore::new(vec![
            post(1, "hello-world", PostStatus::Published),
            orphaned,
            post(3, "second", PostStatus::Published),
        ]));
        let index = Arc::new(RecordingIndex::new());

        let summary = driver(store, index.clone(), SyncConfig::default())
            .run()
            .await
            .unwrap();

        assert_eq!(summary.fetched, 3);
        assert_eq!(summary.indexed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(index.ids(), vec![1, 3]);
    }

    #[tokio::test]
    async fn test_empty_store_yields_empty_summary() {
        let store = Arc::new(InMemoryPostStore::new(Vec::new()));
        let index = Arc::new(RecordingIndex::new());

        let summary = driver(store, index.clone(), SyncConfig::default())
            .run()
            .await
            .unwrap();

        assert_eq!(
            summary,
            SyncSummary {
                fetched: 0,
                indexed: 0,
                failed: 0,
                pruned: 0,
            }
        );
        assert!(index.ids().is_empty());
    }
}
