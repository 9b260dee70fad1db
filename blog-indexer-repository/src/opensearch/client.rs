//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! using the OpenSearch Rust client.

use async_trait::async_trait;
use opensearch::{
    cluster::ClusterHealthParts,
    http::request::JsonBody,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsParts},
    BulkParts, DeleteByQueryParts, DeleteParts, IndexParts, OpenSearch,
};
use serde_json::{json, Value};
use tracing::{debug, error, info};
use url::Url;

use crate::errors::SearchError;
use crate::interfaces::SearchIndexProvider;
use crate::opensearch::index_config::IndexConfig;
use blog_indexer_shared::PostDocument;

/// OpenSearch-backed post index.
///
/// # Example
///
/// ```ignore
/// use blog_indexer_repository::{IndexConfig, OpenSearchIndex};
///
/// let index = OpenSearchIndex::new("http://localhost:9200", IndexConfig::default())?;
/// index.ensure_index_exists().await?;
/// index.bulk_index(&documents).await?;
/// ```
pub struct OpenSearchIndex {
    client: OpenSearch,
    config: IndexConfig,
}

impl OpenSearchIndex {
    /// Create a new client connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    /// * `config` - Index name and shard/replica settings
    pub fn new(url: &str, config: IndexConfig) -> Result<Self, SearchError> {
        let parsed_url = Url::parse(url).map_err(|e| SearchError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %url,
            index = %config.name,
            shards = config.shards,
            replicas = config.replicas,
            "Created OpenSearch client"
        );

        Ok(Self { client, config })
    }

    /// Build the query matching every document whose id is NOT in `live_ids`.
    fn stale_filter_query(live_ids: &[i64]) -> Value {
        let ids: Vec<String> = live_ids.iter().map(|id| id.to_string()).collect();
        json!({
            "query": {
                "bool": {
                    "must_not": [
                        { "ids": { "values": ids } }
                    ]
                }
            }
        })
    }

    /// Extract a failure description from a bulk response body, if any item
    /// failed.
    fn bulk_failure(body: &Value) -> Option<String> {
        if !body["errors"].as_bool().unwrap_or(false) {
            return None;
        }

        let failed: Vec<String> = body["items"]
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|item| {
                let result = &item["index"];
                result["error"].as_object().map(|err| {
                    format!(
                        "{}: {}",
                        result["_id"].as_str().unwrap_or("?"),
                        err.get("reason").and_then(Value::as_str).unwrap_or("unknown")
                    )
                })
            })
            .collect();

        Some(format!(
            "{} items failed: {}",
            failed.len(),
            failed.join("; ")
        ))
    }
}

#[async_trait]
impl SearchIndexProvider for OpenSearchIndex {
    async fn ensure_index_exists(&self) -> Result<(), SearchError> {
        let exists = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[&self.config.name]))
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        if exists.status_code().is_success() {
            debug!(index = %self.config.name, "Index already exists");
            return Ok(());
        }

        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(&self.config.name))
            .body(self.config.creation_body())
            .send()
            .await
            .map_err(|e| SearchError::index_creation(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Index creation failed");
            return Err(SearchError::index_creation(format!(
                "Index creation failed with status {}: {}",
                status, error_body
            )));
        }

        info!(index = %self.config.name, "Created search index");
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        let status = body["status"].as_str().unwrap_or("red");
        Ok(status == "green" || status == "yellow")
    }

    async fn index_document(&self, document: &PostDocument) -> Result<(), SearchError> {
        let doc_id = document.document_id();

        let response = self
            .client
            .index(IndexParts::IndexId(&self.config.name, &doc_id))
            .body(document)
            .send()
            .await
            .map_err(|e| SearchError::index(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Index request failed");
            return Err(SearchError::index(format!(
                "Index failed with status {}: {}",
                status, error_body
            )));
        }

        debug!(doc_id = %doc_id, "Document indexed");
        Ok(())
    }

    async fn bulk_index(&self, documents: &[PostDocument]) -> Result<(), SearchError> {
        if documents.is_empty() {
            return Ok(());
        }

        let mut body: Vec<JsonBody<Value>> = Vec::with_capacity(documents.len() * 2);
        for document in documents {
            body.push(json!({ "index": { "_id": document.document_id() } }).into());
            let value = serde_json::to_value(document)
                .map_err(|e| SearchError::SerializationError(e.to_string()))?;
            body.push(value.into());
        }

        let response = self
            .client
            .bulk(BulkParts::Index(&self.config.name))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchError::bulk_index(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Bulk request failed");
            return Err(SearchError::bulk_index(format!(
                "Bulk failed with status {}: {}",
                status, error_body
            )));
        }

        let response_body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        if let Some(failure) = Self::bulk_failure(&response_body) {
            error!(failure = %failure, "Bulk response reported item failures");
            return Err(SearchError::bulk_index(failure));
        }

        debug!(count = documents.len(), "Bulk indexed documents");
        Ok(())
    }

    async fn delete_document(&self, post_id: i64) -> Result<(), SearchError> {
        let doc_id = post_id.to_string();

        let response = self
            .client
            .delete(DeleteParts::IndexId(&self.config.name, &doc_id))
            .send()
            .await
            .map_err(|e| SearchError::delete(e.to_string()))?;

        let status = response.status_code();

        // 404 is acceptable - document may not exist
        if !status.is_success() && status.as_u16() != 404 {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Delete request failed");
            return Err(SearchError::delete(format!(
                "Delete failed with status {}: {}",
                status, error_body
            )));
        }

        debug!(doc_id = %doc_id, "Document deleted");
        Ok(())
    }

    async fn delete_stale(&self, live_ids: &[i64]) -> Result<u64, SearchError> {
        let response = self
            .client
            .delete_by_query(DeleteByQueryParts::Index(&[&self.config.name]))
            .body(Self::stale_filter_query(live_ids))
            .send()
            .await
            .map_err(|e| SearchError::delete(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Delete-by-query failed");
            return Err(SearchError::delete(format!(
                "Delete-by-query failed with status {}: {}",
                status, error_body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        let deleted = body["deleted"].as_u64().unwrap_or(0);
        debug!(deleted = deleted, "Pruned stale documents");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_filter_query() {
        let query = OpenSearchIndex::stale_filter_query(&[1, 2, 42]);

        let values = query["query"]["bool"]["must_not"][0]["ids"]["values"]
            .as_array()
            .unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(values[2], "42");
    }

    #[test]
    fn test_stale_filter_query_empty_live_set() {
        // With no live posts, the query must match every document
        let query = OpenSearchIndex::stale_filter_query(&[]);

        let values = query["query"]["bool"]["must_not"][0]["ids"]["values"]
            .as_array()
            .unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn test_bulk_failure_none_on_success() {
        let body = json!({
            "errors": false,
            "items": [ { "index": { "_id": "1", "status": 201 } } ]
        });

        assert!(OpenSearchIndex::bulk_failure(&body).is_none());
    }

    #[test]
    fn test_bulk_failure_reports_failed_items() {
        let body = json!({
            "errors": true,
            "items": [
                { "index": { "_id": "1", "status": 201 } },
                {
                    "index": {
                        "_id": "2",
                        "status": 400,
                        "error": { "reason": "mapper_parsing_exception" }
                    }
                }
            ]
        });

        let failure = OpenSearchIndex::bulk_failure(&body).unwrap();
        assert!(failure.contains("1 items failed"));
        assert!(failure.contains("2: mapper_parsing_exception"));
    }
}
