//! Per-client-IP hourly rate limiting (spec §4.2).

use std::collections::HashSet;
use std::time::Duration;

use crate::kv::KvStore;

/// Permits granted per rolling hour per client key.
pub const LIMIT_PER_HOUR: u64 = 100;
/// Window length for the counter's TTL.
pub const WINDOW: Duration = Duration::from_secs(3600);
/// Fallback key when the edge proxy supplies no client IP.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The request may proceed.
    Allowed,
    /// The request must be rejected; the counter was **not** incremented
    /// further (spec §4.2: "does not increment further").
    Exceeded,
}

/// Checks and (if allowed) consumes one permit for `client_ip`.
///
/// Bypassed IPs in `bypass` are never limited and never touch the counter
/// store at all.
pub fn check(store: &dyn KvStore, bypass: &HashSet<String>, client_ip: &str) -> Decision {
    if bypass.contains(client_ip) {
        return Decision::Allowed;
    }

    let key = format!("ratelimit:{client_ip}");
    // Peek the same counter `incr_with_ttl` maintains, not a mirrored copy
    // with its own TTL — a mirror's expiry would slide forward on every
    // allowed request instead of anchoring to the window's first one.
    if let Some(current) = store.peek_counter(&key) {
        if current >= LIMIT_PER_HOUR {
            return Decision::Exceeded;
        }
    }

    let count = store.incr_with_ttl(&key, WINDOW);

    if count > LIMIT_PER_HOUR {
        Decision::Exceeded
    } else {
        Decision::Allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::InMemoryKvStore;

    #[test]
    fn bypassed_ip_is_always_allowed() {
        let store = InMemoryKvStore::new();
        let mut bypass = HashSet::new();
        bypass.insert("1.2.3.4".to_owned());
        for _ in 0..200 {
            assert_eq!(check(&store, &bypass, "1.2.3.4"), Decision::Allowed);
        }
    }

    #[test]
    fn hundred_and_first_request_is_exceeded() {
        let store = InMemoryKvStore::new();
        let bypass = HashSet::new();
        for _ in 0..LIMIT_PER_HOUR {
            assert_eq!(check(&store, &bypass, "9.9.9.9"), Decision::Allowed);
        }
        assert_eq!(check(&store, &bypass, "9.9.9.9"), Decision::Exceeded);
    }

    #[test]
    fn exceeded_requests_do_not_keep_incrementing_the_counter() {
        let store = InMemoryKvStore::new();
        let bypass = HashSet::new();
        for _ in 0..LIMIT_PER_HOUR {
            check(&store, &bypass, "5.5.5.5");
        }
        check(&store, &bypass, "5.5.5.5");
        check(&store, &bypass, "5.5.5.5");
        let key = "ratelimit:5.5.5.5";
        assert_eq!(store.peek_counter(key), Some(LIMIT_PER_HOUR));
    }

    #[test]
    fn counter_ttl_is_anchored_to_first_request_not_slid_by_later_ones() {
        // Regression for the mirrored-copy bug: the real counter's TTL must
        // be set once, at the window's first increment, and never pushed
        // forward by later requests within the same window (spec §4.2:
        // "renewed on first increment of a new window", not perpetually).
        let store = InMemoryKvStore::new();
        let bypass = HashSet::new();
        let key = "ratelimit:7.7.7.7";
        store.incr_with_ttl(key, Duration::from_millis(5));
        std::thread::sleep(Duration::from_millis(2));
        check(&store, &bypass, "7.7.7.7");
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(store.peek_counter(key), None);
    }

    #[test]
    fn distinct_ips_have_independent_quotas() {
        let store = InMemoryKvStore::new();
        let bypass = HashSet::new();
        for _ in 0..LIMIT_PER_HOUR {
            check(&store, &bypass, "1.1.1.1");
        }
        assert_eq!(check(&store, &bypass, "1.1.1.1"), Decision::Exceeded);
        assert_eq!(check(&store, &bypass, "2.2.2.2"), Decision::Allowed);
    }
}
