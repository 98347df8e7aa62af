//! A narrow async key-value abstraction standing in for "the external
//! key-value store" spec §1 treats as an out-of-scope collaborator.
//!
//! Grounded on the teacher's habit of putting a remote dependency behind a
//! narrow trait (`r402::facilitator::Facilitator`) and providing an
//! in-process reference implementation backed by `dashmap`
//! (`r402-evm::exact::facilitator`'s nonce cache uses the same crate for
//! the same reason: cheap concurrent reads under a request-driven worker).

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Minimal KV contract used by the rate limiter's counters: a read-only
/// peek and an atomic increment-with-ttl.
///
/// Counter read and write failures are non-fatal by design (spec §7) — the
/// only failure mode modeled here is "counter absent or expired".
pub trait KvStore: Send + Sync {
    /// Reads a counter's current value without mutating it, or `None` if
    /// absent or expired. Must observe exactly the same underlying counter
    /// `incr_with_ttl` maintains — this is a peek, not a mirrored copy.
    fn peek_counter(&self, key: &str) -> Option<u64>;

    /// Increments a counter, creating it with `ttl` if it doesn't exist or
    /// has expired, and returns the counter's new value.
    ///
    /// The TTL is fixed at creation time for a window and is **not**
    /// refreshed by subsequent increments within that window (spec §4.2:
    /// "renewed on first increment of a new window").
    fn incr_with_ttl(&self, key: &str, ttl: Duration) -> u64;
}

#[derive(Debug)]
struct CounterEntry {
    count: u64,
    expires_at: Instant,
}

/// An in-memory, TTL-expiring counter store. This is the reference binding
/// for the rate-limit counters (spec §3's "Lifecycles"); a production
/// deployment swaps in a real KV client behind the same [`KvStore`] trait
/// without touching call sites.
#[derive(Debug, Default, Clone)]
pub struct InMemoryKvStore {
    counters: Arc<DashMap<String, CounterEntry>>,
}

impl InMemoryKvStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for InMemoryKvStore {
    fn peek_counter(&self, key: &str) -> Option<u64> {
        let entry = self.counters.get(key)?;
        if Instant::now() >= entry.expires_at {
            return None;
        }
        Some(entry.count)
    }

    fn incr_with_ttl(&self, key: &str, ttl: Duration) -> u64 {
        let now = Instant::now();
        let mut entry = self.counters.entry(key.to_owned()).or_insert_with(|| CounterEntry {
            count: 0,
            expires_at: now + ttl,
        });

        if now >= entry.expires_at {
            entry.count = 0;
            entry.expires_at = now + ttl;
        }

        entry.count += 1;
        entry.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peek_counter_returns_none_for_missing_key() {
        let store = InMemoryKvStore::new();
        assert_eq!(store.peek_counter("nope"), None);
    }

    #[test]
    fn peek_counter_reflects_incr_without_mutating() {
        let store = InMemoryKvStore::new();
        store.incr_with_ttl("c", Duration::from_secs(3600));
        store.incr_with_ttl("c", Duration::from_secs(3600));
        assert_eq!(store.peek_counter("c"), Some(2));
        assert_eq!(store.peek_counter("c"), Some(2));
    }

    #[test]
    fn peek_counter_reads_as_absent_after_expiry() {
        let store = InMemoryKvStore::new();
        store.incr_with_ttl("c", Duration::from_millis(1));
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(store.peek_counter("c"), None);
    }

    #[test]
    fn incr_creates_counter_starting_at_one() {
        let store = InMemoryKvStore::new();
        assert_eq!(store.incr_with_ttl("c", Duration::from_secs(3600)), 1);
        assert_eq!(store.incr_with_ttl("c", Duration::from_secs(3600)), 2);
    }

    #[test]
    fn incr_resets_after_ttl_expires() {
        let store = InMemoryKvStore::new();
        store.incr_with_ttl("c", Duration::from_millis(1));
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(store.incr_with_ttl("c", Duration::from_millis(1)), 1);
    }
}
