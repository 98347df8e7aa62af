//! Response assembly: tier/recommendation/rank/neighborhood composition and
//! envelope shaping for a scoring result (spec §4.8).

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use trustgate_core::model::{GraphSnapshot, Relation};
use trustgate_core::payment::PaymentEcho;
use trustgate_core::reputation::ReputationVector;
use trustgate_core::screener::ScreenResult;
use trustgate_core::scorer::{self, Breakdown, RawSignals};
use trustgate_core::tiers::{self, Rank, Recommendation, Tier};

#[derive(Debug, Clone, Serialize)]
pub struct RelationView {
    pub source: String,
    pub target: String,
    pub relation: String,
}

impl From<&Relation> for RelationView {
    fn from(relation: &Relation) -> Self {
        Self {
            source: relation.source.clone(),
            target: relation.target.clone(),
            relation: relation.relation.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TrustNetwork {
    pub trusted_by: Vec<RelationView>,
    pub trusts: Vec<RelationView>,
}

/// The full scoring envelope (spec §4.8).
#[derive(Debug, Clone, Serialize)]
pub struct ScoreResponse {
    pub entity: String,
    pub found: bool,
    pub trust_score: f64,
    pub tier: Tier,
    pub recommendation: Recommendation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<Breakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<RawSignals>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<Rank>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trust_network: Option<TrustNetwork>,
    pub safety: Option<ScreenResult>,
    pub payment: PaymentEcho,
}

/// Score a known entity, assembling the full envelope (spec §4.6, §4.8).
#[must_use]
pub fn assemble_found(
    entity_name: &str,
    snapshot: &GraphSnapshot,
    reputation: &ReputationVector,
    safety: Option<ScreenResult>,
    payer: Option<String>,
    now: DateTime<Utc>,
) -> ScoreResponse {
    let entity = snapshot
        .entity(entity_name)
        .expect("caller verified entity exists in snapshot");

    let composite = scorer::score_entity(entity, snapshot, reputation, safety.as_ref(), now);

    let tier = tiers::tier_for(composite.score);
    let recommendation =
        tiers::recommendation_for(composite.score, safety.as_ref().map(|s| s.verdict));

    let ordered_names: Vec<String> = snapshot.entities.iter().map(|e| e.name.clone()).collect();
    let rank = tiers::rank_of(entity_name, &ordered_names, reputation);

    let trust_network = TrustNetwork {
        trusted_by: snapshot
            .trusted_by(entity_name)
            .into_iter()
            .map(RelationView::from)
            .collect(),
        trusts: snapshot
            .trusts(entity_name)
            .into_iter()
            .map(RelationView::from)
            .collect(),
    };

    ScoreResponse {
        entity: entity_name.to_owned(),
        found: true,
        trust_score: composite.score,
        tier,
        recommendation,
        breakdown: Some(composite.breakdown),
        raw: Some(composite.raw),
        rank,
        trust_network: Some(trust_network),
        safety,
        payment: PaymentEcho::new(payer),
    }
}

/// Score an entity absent from the snapshot (spec §4.8's unknown-entity
/// branch): score is `0` under a malicious verdict, `0.05` otherwise; no
/// breakdown, raw signals, rank, or neighborhood are included.
#[must_use]
pub fn assemble_unknown(
    entity_name: &str,
    safety: Option<ScreenResult>,
    payer: Option<String>,
) -> ScoreResponse {
    let malicious = safety
        .as_ref()
        .is_some_and(|s| s.verdict == trustgate_core::screener::Verdict::Malicious);

    let score = if malicious { 0.0 } else { 0.05 };
    let recommendation = tiers::recommendation_for(score, safety.as_ref().map(|s| s.verdict));

    ScoreResponse {
        entity: entity_name.to_owned(),
        found: false,
        trust_score: score,
        tier: Tier::Unknown,
        recommendation,
        breakdown: None,
        raw: None,
        rank: None,
        trust_network: None,
        safety,
        payment: PaymentEcho::new(payer),
    }
}

/// Header marking payment as confirmed on every successful scoring response
/// (spec §4.8).
pub const PAYMENT_CONFIRMED_HEADER: &str = "X-Payment-Confirmed";

/// Extracts the free-text health/info `Accept`-negotiation payload used by
/// `GET /`'s JSON branch (spec §6). Kept here (not in a dedicated module)
/// since it shares the "service description" concern with the scoring
/// envelope rather than routing.
#[must_use]
pub fn service_info_document(entities: usize, relations: usize) -> Value {
    serde_json::json!({
        "service": "trustgate",
        "description": "Paid trust-scoring service for a knowledge graph of software agents.",
        "pricing": { "amount": "0.01", "currency": "USDC", "per": "score query" },
        "endpoints": {
            "score": { "method": "POST", "path": "/v1/score" },
            "health": { "method": "GET", "path": "/health" }
        },
        "tiers": ["unknown", "new", "emerging", "established", "trusted", "verified"],
        "graph": { "entities": entities, "relations": relations },
        "author": "trustgate"
    })
}
