//! Shared application state handed to every Axum handler.

use std::sync::Arc;

use crate::cache::ReputationCache;
use crate::config::Config;
use crate::facilitator_client::FacilitatorClient;
use crate::graph_store::GraphStore;
use crate::kv::{InMemoryKvStore, KvStore};

/// Everything a handler needs, cheaply cloneable (an `Arc` around the
/// expensive bits) so Axum's `State` extractor can hand out copies freely.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub graph_store: Arc<dyn GraphStore>,
    pub kv: Arc<dyn KvStore>,
    pub reputation_cache: Arc<ReputationCache>,
    pub facilitator: Arc<FacilitatorClient>,
}

impl AppState {
    /// Builds production state from configuration: an HTTP-backed graph
    /// store, an in-process KV store, and a facilitator client pointed at
    /// the configured base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the facilitator base URL fails to parse.
    pub fn from_config(config: Config) -> Result<Self, url::ParseError> {
        let facilitator = FacilitatorClient::new(&config.facilitator_url)?;
        let graph_store = crate::graph_store::HttpGraphStore::new(
            config.graph_url.clone(),
            config.graph_key.clone(),
        );

        Ok(Self {
            graph_store: Arc::new(graph_store),
            kv: Arc::new(InMemoryKvStore::new()),
            reputation_cache: Arc::new(ReputationCache::new()),
            facilitator: Arc::new(facilitator),
            config: Arc::new(config),
        })
    }
}
