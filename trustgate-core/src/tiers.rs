//! Tier labels, recommendations, and reputation-based ranking (spec §4.8).

use serde::Serialize;

use crate::reputation::ReputationVector;
use crate::screener::Verdict;

/// Coarse reputation tier. Cutoffs (spec §4.8):
/// `< 0.20` unknown, `< 0.40` new, `< 0.60` emerging, `< 0.80` established,
/// `< 0.95` trusted, else verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Unknown,
    New,
    Emerging,
    Established,
    Trusted,
    Verified,
}

/// Resolves the tier for a composite score. Total function of `score`.
#[must_use]
pub fn tier_for(score: f64) -> Tier {
    if score < 0.20 {
        Tier::Unknown
    } else if score < 0.40 {
        Tier::New
    } else if score < 0.60 {
        Tier::Emerging
    } else if score < 0.80 {
        Tier::Established
    } else if score < 0.95 {
        Tier::Trusted
    } else {
        Tier::Verified
    }
}

/// Actionable recommendation in `{PROCEED, CAUTION, INSUFFICIENT_DATA, AVOID}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    Proceed,
    Caution,
    InsufficientData,
    Avoid,
}

/// Resolves the recommendation from the composite score and safety verdict.
/// `AVOID` is returned if and only if the safety verdict is `MALICIOUS`
/// (spec §8's tested double-coupling invariant).
#[must_use]
pub fn recommendation_for(score: f64, safety_verdict: Option<Verdict>) -> Recommendation {
    if safety_verdict == Some(Verdict::Malicious) {
        return Recommendation::Avoid;
    }
    if score >= 0.50 {
        Recommendation::Proceed
    } else if score >= 0.25 {
        Recommendation::Caution
    } else {
        Recommendation::InsufficientData
    }
}

/// A 1-based rank among all entities, sorted by reputation descending.
/// Ties are broken by the entity list's iteration order.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Rank {
    pub position: usize,
    pub total: usize,
}

/// Computes `name`'s rank among `ordered_names` (the graph's entity order)
/// by reputation descending.
#[must_use]
pub fn rank_of(name: &str, ordered_names: &[String], reputation: &ReputationVector) -> Option<Rank> {
    let total = ordered_names.len();
    if total == 0 {
        return None;
    }

    let mut indexed: Vec<(usize, &str)> = ordered_names
        .iter()
        .enumerate()
        .map(|(i, n)| (i, n.as_str()))
        .collect();

    indexed.sort_by(|(ia, a), (ib, b)| {
        reputation
            .get(b)
            .partial_cmp(&reputation.get(a))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(ia.cmp(ib))
    });

    indexed
        .iter()
        .position(|(_, n)| *n == name)
        .map(|pos| Rank {
            position: pos + 1,
            total,
        })
}
