//! The graph loader (spec §4.4) — fetches the whole-graph snapshot from
//! the external key-value store under a configured key.
//!
//! Modeled as a narrow trait, the same shape as the teacher's
//! `r402::facilitator::Facilitator`: a single async method abstracting a
//! remote dependency, so the scoring handler and its tests don't care
//! whether the snapshot came over HTTP or from an in-memory fixture.

use async_trait::async_trait;
use trustgate_core::model::GraphSnapshot;

/// Errors fetching or parsing the graph snapshot.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("snapshot did not parse: {0}")]
    Parse(String),
}

/// Fetches the current graph snapshot. No partial reads — the snapshot is
/// opaque and atomic (spec §4.4).
#[async_trait]
pub trait GraphStore: Send + Sync {
    async fn snapshot(&self) -> Result<GraphSnapshot, StoreError>;
}

/// Production binding: fetches the snapshot as JSON from a configured URL,
/// passing the graph key as a query parameter.
#[derive(Debug, Clone)]
pub struct HttpGraphStore {
    client: reqwest::Client,
    url: String,
    key: String,
}

impl HttpGraphStore {
    #[must_use]
    pub fn new(url: String, key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            key,
        }
    }
}

#[async_trait]
impl GraphStore for HttpGraphStore {
    #[tracing::instrument(skip_all, fields(key = %self.key))]
    async fn snapshot(&self) -> Result<GraphSnapshot, StoreError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("key", self.key.as_str())])
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StoreError::Status(response.status().as_u16()));
        }

        response
            .json::<GraphSnapshot>()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))
    }
}

/// Test/reference binding holding a fixed snapshot in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGraphStore {
    snapshot: GraphSnapshot,
}

impl InMemoryGraphStore {
    #[must_use]
    pub fn new(snapshot: GraphSnapshot) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn snapshot(&self) -> Result<GraphSnapshot, StoreError> {
        Ok(self.snapshot.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trustgate_core::model::Entity;
    use chrono::Utc;

    #[tokio::test]
    async fn in_memory_store_returns_fixed_snapshot() {
        let snapshot = GraphSnapshot {
            entities: vec![Entity {
                name: "a".into(),
                entity_type: "agent".into(),
                created: Utc::now(),
                updated: None,
                observations: vec![],
            }],
            relations: vec![],
        };
        let store = InMemoryGraphStore::new(snapshot);
        let loaded = store.snapshot().await.unwrap();
        assert_eq!(loaded.entities.len(), 1);
    }

    #[tokio::test]
    async fn http_store_surfaces_non_success_status() {
        let mock_server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let store = HttpGraphStore::new(mock_server.uri(), "agent-graph:v1".into());
        let result = store.snapshot().await;
        assert!(matches!(result, Err(StoreError::Status(500))));
    }

    #[tokio::test]
    async fn http_store_parses_valid_snapshot() {
        let mock_server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "entities": [],
                "relations": []
            })))
            .mount(&mock_server)
            .await;

        let store = HttpGraphStore::new(mock_server.uri(), "agent-graph:v1".into());
        let snapshot = store.snapshot().await.unwrap();
        assert!(snapshot.entities.is_empty());
    }
}
