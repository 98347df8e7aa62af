//! The reputation cache — TTL-wraps `trustgate_core::reputation::compute`
//! (spec §4.5). Grounded on `r402-http::server::facilitator_client`'s
//! `SupportedCache`: a `tokio::sync::RwLock`-guarded optional cache entry
//! with an expiry instant, read-heavy-friendly.

use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use trustgate_core::model::GraphSnapshot;
use trustgate_core::reputation::{self, ReputationVector};

/// TTL for a computed reputation vector.
pub const TTL: Duration = Duration::from_secs(8 * 3600);

/// The cache key is a constant — there is exactly one reputation vector in
/// flight at a time, scoped to the whole graph (spec §3). Bumping this
/// when the vector's schema changes discards any still-live cached value.
pub const CACHE_KEY: &str = "reputation:v1";

struct CachedVector {
    vector: ReputationVector,
    expires_at: Instant,
}

/// An in-process TTL cache for the reputation vector.
///
/// Cache read/write failures are non-fatal (spec §4.5, §7) — this type
/// simply falls through to a fresh [`reputation::compute`] call on any miss.
#[derive(Default)]
pub struct ReputationCache {
    state: RwLock<Option<CachedVector>>,
}

impl ReputationCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached vector if present and unexpired, computing and
    /// caching a fresh one on miss.
    ///
    /// Consistency note (spec §4.5): because the snapshot is fetched
    /// independently on every request while this cache is write-through-
    /// on-miss, a request can observe a fresh graph against a reputation
    /// vector computed from an older one, for up to [`TTL`]. Accepted:
    /// reputation is an opinion, not a key invariant.
    #[tracing::instrument(skip_all)]
    pub async fn get_or_compute(&self, snapshot: &GraphSnapshot) -> ReputationVector {
        {
            let guard = self.state.read().await;
            if let Some(cached) = guard.as_ref() {
                if Instant::now() < cached.expires_at {
                    tracing::debug!("reputation cache hit");
                    return cached.vector.clone();
                }
            }
        }

        tracing::debug!(entities = snapshot.entities.len(), "recomputing reputation vector");
        let vector = reputation::compute(snapshot);

        let mut guard = self.state.write().await;
        *guard = Some(CachedVector {
            vector: vector.clone(),
            expires_at: Instant::now() + TTL,
        });

        vector
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trustgate_core::model::Entity;
    use chrono::Utc;

    fn snapshot() -> GraphSnapshot {
        GraphSnapshot {
            entities: vec![Entity {
                name: "a".into(),
                entity_type: "agent".into(),
                created: Utc::now(),
                updated: None,
                observations: vec![],
            }],
            relations: vec![],
        }
    }

    #[tokio::test]
    async fn second_call_returns_cached_value() {
        let cache = ReputationCache::new();
        let snap = snapshot();
        let first = cache.get_or_compute(&snap).await;
        let second = cache.get_or_compute(&snap).await;
        assert_eq!(first.get("a"), second.get("a"));
    }
}
