//! The composite trust scorer — combines reputation, temporal, attestation,
//! on-chain-activity, connectedness, and safety signals into one scalar
//! plus a per-component breakdown (spec §4.6).

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{Entity, GraphSnapshot, NormalizedObservation};
use crate::reputation::ReputationVector;
use crate::screener::{ScreenResult, Verdict};

/// Component weights. Sum to `1.0`; kept as named constants so property
/// tests can reference them without duplicating the literals (spec §9).
pub const WEIGHT_PAGERANK: f64 = 0.25;
pub const WEIGHT_OBSERVATION_DENSITY: f64 = 0.15;
pub const WEIGHT_AGE: f64 = 0.15;
pub const WEIGHT_WALLET_ACTIVITY: f64 = 0.20;
pub const WEIGHT_ATTESTATION: f64 = 0.10;
pub const WEIGHT_RELATIONS: f64 = 0.10;
pub const WEIGHT_SAFETY: f64 = 0.05;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Per-component breakdown, each entry already weighted? No — these are the
/// *raw* (unweighted) component values in `[0, 1]`, rounded to four
/// decimals, matching the wire shape spec §4.6 describes ("a per-component
/// breakdown ... all rounded to four decimals").
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Breakdown {
    pub pagerank: f64,
    pub observation_density: f64,
    pub age_factor: f64,
    pub wallet_activity: f64,
    pub attestation_factor: f64,
    pub relation_factor: f64,
    pub safety_factor: f64,
}

impl Breakdown {
    /// The weighted sum of all components — this is the composite score
    /// before its own independent rounding (spec §4.6's final step rounds
    /// the composite separately from the breakdown).
    #[must_use]
    pub fn weighted_sum(&self) -> f64 {
        self.pagerank * WEIGHT_PAGERANK
            + self.observation_density * WEIGHT_OBSERVATION_DENSITY
            + self.age_factor * WEIGHT_AGE
            + self.wallet_activity * WEIGHT_WALLET_ACTIVITY
            + self.attestation_factor * WEIGHT_ATTESTATION
            + self.relation_factor * WEIGHT_RELATIONS
            + self.safety_factor * WEIGHT_SAFETY
    }
}

/// Raw, unnormalized signal counts backing the breakdown — surfaced
/// verbatim in responses per spec §4.6.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RawSignals {
    pub observations: usize,
    pub age_days: f64,
    pub signed_observations: usize,
    pub trust_relations_in: usize,
    pub trust_relations_out: usize,
    pub total_relations: usize,
}

/// The full composite-scoring result for one entity.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CompositeScore {
    pub score: f64,
    pub breakdown: Breakdown,
    pub raw: RawSignals,
}

/// Scores a single entity already known to exist in `snapshot`.
#[must_use]
pub fn score_entity(
    entity: &Entity,
    snapshot: &GraphSnapshot,
    reputation: &ReputationVector,
    safety: Option<&ScreenResult>,
    now: DateTime<Utc>,
) -> CompositeScore {
    let active = entity.active_observations(now);

    let pagerank = reputation.get(&entity.name);
    let observation_density = 1.0 - (-(active.len() as f64) / 8.0).exp();
    let age_days = ((now - entity.created).num_seconds() as f64 / SECONDS_PER_DAY).max(0.0);
    let age_factor = 1.0 - (-age_days / 25.0).exp();

    let signed_count = active.iter().filter(|o| o.signed).count();
    let attestation_factor = if signed_count == 0 {
        0.0
    } else {
        (0.5 + 0.1 * signed_count as f64).min(1.0)
    };

    let trust_in = snapshot.trusted_by(&entity.name).len();
    let trust_out = snapshot.trusts(&entity.name).len();
    let total_relations = snapshot.total_relations_for(&entity.name);
    let relation_factor = (total_relations as f64 / 10.0).min(1.0);

    let safety_factor = match safety.map(|s| s.verdict) {
        None => 1.0,
        Some(Verdict::Malicious) => 0.0,
        Some(Verdict::Suspicious) => 0.3,
        Some(Verdict::Clean) => 1.0,
    };

    let wallet_activity = wallet_activity_signal(&active, now);

    let breakdown = Breakdown {
        pagerank: round4(pagerank),
        observation_density: round4(observation_density),
        age_factor: round4(age_factor),
        wallet_activity: round4(wallet_activity),
        attestation_factor: round4(attestation_factor),
        relation_factor: round4(relation_factor),
        safety_factor: round4(safety_factor),
    };

    CompositeScore {
        score: round4(breakdown.weighted_sum()),
        breakdown,
        raw: RawSignals {
            observations: active.len(),
            age_days,
            signed_observations: signed_count,
            trust_relations_in: trust_in,
            trust_relations_out: trust_out,
            total_relations,
        },
    }
}

/// Extracts the wallet-activity subcomponent from active observation text
/// by substring pattern matching (spec §4.6). Defensive: malformed or
/// absent signals contribute zero rather than erroring.
fn wallet_activity_signal(observations: &[NormalizedObservation], now: DateTime<Utc>) -> f64 {
    let mut total = 0.0;

    if let Some(tx_count) = find_transaction_count(observations) {
        total += (1.0 - (-(tx_count as f64) / 50.0).exp()) * 0.7;
    }

    if has_balance_mention(observations) {
        total += 0.15;
    }

    if let Some(first_tx_days) = find_first_tx_age_days(observations, now) {
        total += (first_tx_days / 730.0).min(0.15);
    }

    total.clamp(0.0, 1.0)
}

fn find_transaction_count(observations: &[NormalizedObservation]) -> Option<u64> {
    let text = observations
        .iter()
        .find(|o| o.text.contains("on-chain activity:") && o.text.contains("transactions"))?;
    parse_leading_number_before(&text.text, "transactions")
}

fn has_balance_mention(observations: &[NormalizedObservation]) -> bool {
    observations.iter().any(|o| {
        o.text.contains("on-chain") && (o.text.contains("ETH balance") || o.text.contains("USDC balance"))
    })
}

fn find_first_tx_age_days(observations: &[NormalizedObservation], now: DateTime<Utc>) -> Option<f64> {
    let text = observations
        .iter()
        .find(|o| o.text.contains("first on-chain transaction:"))?;
    let date_str = extract_date_after(&text.text, "first on-chain transaction:")?;
    let date = chrono::NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").ok()?;
    let date_utc = date.and_hms_opt(0, 0, 0)?.and_utc();
    let days = (now - date_utc).num_seconds() as f64 / SECONDS_PER_DAY;
    Some(days.max(0.0))
}

/// Parses the integer immediately preceding the first occurrence of
/// `marker` in `text`, e.g. `"...: 42 transactions"` with marker
/// `"transactions"` yields `42`.
fn parse_leading_number_before(text: &str, marker: &str) -> Option<u64> {
    let marker_pos = text.find(marker)?;
    let prefix = &text[..marker_pos];
    let digits: String = prefix
        .trim_end()
        .chars()
        .rev()
        .take_while(char::is_ascii_digit)
        .collect::<String>()
        .chars()
        .rev()
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Extracts a `YYYY-MM-DD`-shaped token immediately following `marker`.
fn extract_date_after(text: &str, marker: &str) -> Option<String> {
    let after = text.split_once(marker)?.1;
    let trimmed = after.trim_start();
    let candidate: String = trimmed
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '-')
        .collect();
    if candidate.len() == 10 {
        Some(candidate)
    } else {
        None
    }
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}
