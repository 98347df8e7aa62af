//! The knowledge-graph data model.
//!
//! Entities and relations are owned by the external graph store; this crate
//! only ever reads an immutable [`GraphSnapshot`]. All mutation happens
//! upstream of this service.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The fixed set of relation labels the reputation engine treats as
/// trust-bearing, paired with their propagation weight.
///
/// Order matters only for readability; lookups are by label.
pub const TRUST_RELATION_WEIGHTS: &[(&str, f64)] = &[
    ("trusts", 1.0),
    ("endorsed_by", 0.9),
    ("verified_by", 0.9),
    ("collaborates_with", 0.7),
    ("depends_on", 0.6),
    ("implements", 0.6),
    ("built", 0.8),
    ("uses", 0.5),
];

/// Returns the propagation weight for a relation label, if it is
/// trust-bearing.
#[must_use]
pub fn trust_weight(relation: &str) -> Option<f64> {
    TRUST_RELATION_WEIGHTS
        .iter()
        .find(|(label, _)| *label == relation)
        .map(|(_, weight)| *weight)
}

/// A raw observation as it appears on the wire: either a bare string or a
/// record carrying expiry and signature metadata.
///
/// Corresponds to spec §3's "either a plain string or a record" shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Observation {
    /// A plain-text observation with no expiry or signature.
    Plain(String),
    /// A structured observation.
    Rich {
        /// The observation body. Accepts either `text` or `observation` as
        /// the wire key.
        #[serde(alias = "observation")]
        text: String,
        /// Instant after which the observation is no longer active.
        #[serde(default)]
        expires_at: Option<DateTime<Utc>>,
        /// Signature metadata, if the observation was attested.
        #[serde(default)]
        signature: Option<Signature>,
    },
}

/// Signature metadata attached to a signed observation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signature {
    /// Hex-encoded signature bytes. Presence (non-empty) makes the
    /// observation "signed" per spec §3.
    #[serde(default)]
    pub signature_hex: String,
}

/// A normalized observation, flattened at snapshot-load time so every
/// downstream consumer (composite scorer, attestation factor) works from
/// one shape instead of re-matching the wire variant.
#[derive(Debug, Clone)]
pub struct NormalizedObservation {
    /// The observation text.
    pub text: String,
    /// Expiry instant, if any.
    pub expires_at: Option<DateTime<Utc>>,
    /// Whether this observation carries a non-empty signature.
    pub signed: bool,
}

impl Observation {
    /// Normalizes this observation into its flat internal form.
    #[must_use]
    pub fn normalize(&self) -> NormalizedObservation {
        match self {
            Self::Plain(text) => NormalizedObservation {
                text: text.clone(),
                expires_at: None,
                signed: false,
            },
            Self::Rich {
                text,
                expires_at,
                signature,
            } => NormalizedObservation {
                text: text.clone(),
                expires_at: *expires_at,
                signed: signature
                    .as_ref()
                    .is_some_and(|s| !s.signature_hex.is_empty()),
            },
        }
    }
}

impl NormalizedObservation {
    /// An observation is active iff it has no expiry or its expiry is
    /// strictly after `now`.
    #[must_use]
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|expiry| expiry > now)
    }
}

/// A node in the knowledge graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Unique identifier.
    pub name: String,
    /// Opaque entity-type tag (e.g. `"agent"`, `"service"`, `"model"`).
    #[serde(rename = "entityType")]
    pub entity_type: String,
    /// When the entity was first recorded.
    pub created: DateTime<Utc>,
    /// When the entity was last updated, if ever.
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
    /// Ordered observation history.
    #[serde(default)]
    pub observations: Vec<Observation>,
}

impl Entity {
    /// Observations normalized and filtered to those active at `now`.
    #[must_use]
    pub fn active_observations(&self, now: DateTime<Utc>) -> Vec<NormalizedObservation> {
        self.observations
            .iter()
            .map(Observation::normalize)
            .filter(|obs| obs.is_active(now))
            .collect()
    }
}

/// A labeled directed edge between two entities, named by entity name
/// (not a resolved reference — unknown endpoints are tolerated and simply
/// skipped by the reputation engine).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relation {
    /// Source entity name.
    pub source: String,
    /// Target entity name.
    pub target: String,
    /// Relation label.
    pub relation: String,
}

impl Relation {
    /// Whether this relation's label is in the trust-bearing set.
    #[must_use]
    pub fn is_trust_typed(&self) -> bool {
        trust_weight(&self.relation).is_some()
    }
}

/// An atomic, whole-graph view fetched from the external store.
///
/// Invariant: entity names are unique within a snapshot. Relations
/// referring to unknown source/target names are tolerated.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GraphSnapshot {
    /// All entities in the graph.
    pub entities: Vec<Entity>,
    /// All relations, in store order.
    pub relations: Vec<Relation>,
}

impl GraphSnapshot {
    /// Builds a name-indexed lookup for entities. Call once per request;
    /// don't rebuild it per entity (spec §9 Design Notes).
    #[must_use]
    pub fn entity_index(&self) -> HashMap<&str, &Entity> {
        self.entities
            .iter()
            .map(|e| (e.name.as_str(), e))
            .collect()
    }

    /// Looks up a single entity by name.
    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Total relations (any label) where `name` is source or target.
    #[must_use]
    pub fn total_relations_for(&self, name: &str) -> usize {
        self.relations
            .iter()
            .filter(|r| r.source == name || r.target == name)
            .count()
    }

    /// Trust-typed relations with `name` as target ("trusted by").
    #[must_use]
    pub fn trusted_by(&self, name: &str) -> Vec<&Relation> {
        self.relations
            .iter()
            .filter(|r| r.target == name && r.is_trust_typed())
            .collect()
    }

    /// Trust-typed relations with `name` as source ("trusts").
    #[must_use]
    pub fn trusts(&self, name: &str) -> Vec<&Relation> {
        self.relations
            .iter()
            .filter(|r| r.source == name && r.is_trust_typed())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trust_weight_known_and_unknown() {
        assert_eq!(trust_weight("trusts"), Some(1.0));
        assert_eq!(trust_weight("uses"), Some(0.5));
        assert_eq!(trust_weight("mentions"), None);
    }

    #[test]
    fn observation_normalizes_plain_string() {
        let obs: Observation = serde_json::from_str("\"hello\"").unwrap();
        let norm = obs.normalize();
        assert_eq!(norm.text, "hello");
        assert!(!norm.signed);
        assert!(norm.expires_at.is_none());
    }

    #[test]
    fn observation_normalizes_rich_record_with_signature() {
        let obs: Observation = serde_json::from_value(serde_json::json!({
            "text": "on-chain activity: 12 transactions",
            "signature": { "signature_hex": "deadbeef" }
        }))
        .unwrap();
        let norm = obs.normalize();
        assert!(norm.signed);
        assert_eq!(norm.text, "on-chain activity: 12 transactions");
    }

    #[test]
    fn observation_accepts_observation_alias() {
        let obs: Observation =
            serde_json::from_value(serde_json::json!({ "observation": "alt key" })).unwrap();
        assert_eq!(obs.normalize().text, "alt key");
    }

    #[test]
    fn active_observation_respects_expiry() {
        let now = Utc::now();
        let past = now - chrono::Duration::days(1);
        let future = now + chrono::Duration::days(1);

        let expired = NormalizedObservation {
            text: String::new(),
            expires_at: Some(past),
            signed: false,
        };
        let active = NormalizedObservation {
            text: String::new(),
            expires_at: Some(future),
            signed: false,
        };
        let unbounded = NormalizedObservation {
            text: String::new(),
            expires_at: None,
            signed: false,
        };

        assert!(!expired.is_active(now));
        assert!(active.is_active(now));
        assert!(unbounded.is_active(now));
    }

    #[test]
    fn relation_labels_partition_trust_typed() {
        let trust = Relation {
            source: "a".into(),
            target: "b".into(),
            relation: "trusts".into(),
        };
        let other = Relation {
            source: "a".into(),
            target: "b".into(),
            relation: "mentions".into(),
        };
        assert!(trust.is_trust_typed());
        assert!(!other.is_trust_typed());
    }
}
