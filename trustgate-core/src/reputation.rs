//! Damped random-walk reputation propagation over trust-typed edges.
//!
//! Implements the fixed-point procedure from spec §4.5: a PageRank-flavored
//! propagation with damping factor `d`, bounded iteration count, and
//! min-max normalization to `[0, 1]`. The graph snapshot is immutable for
//! the duration of one compute — `outDeg`/`inEdges` are built once, not
//! per entity (spec §9 Design Notes).

use std::collections::HashMap;

use crate::model::GraphSnapshot;

/// Damping factor `d`.
pub const DAMPING: f64 = 0.85;
/// Maximum propagation iterations `I`.
pub const MAX_ITERATIONS: usize = 50;
/// Convergence tolerance `ε`.
pub const TOLERANCE: f64 = 0.001;
/// Degenerate-range threshold below which every entity resolves to 0.5.
const DEGENERATE_RANGE: f64 = 1e-4;

/// Per-entity reputation in `[0, 1]`, keyed by entity name.
///
/// Entities absent from this map resolve to `0` by convention (spec §4.5
/// point 5); callers should use [`ReputationVector::get`] rather than
/// indexing directly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReputationVector(HashMap<String, f64>);

impl ReputationVector {
    /// Looks up an entity's reputation, defaulting to `0` if absent.
    #[must_use]
    pub fn get(&self, name: &str) -> f64 {
        self.0.get(name).copied().unwrap_or(0.0)
    }

    /// Iterates over all scored entities.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of scored entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the vector has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Computes the reputation vector for `snapshot` from scratch.
///
/// Pure function: callers own caching (see `trustgate-server`'s reputation
/// cache, which wraps this with an 8-hour TTL per spec §4.5).
#[must_use]
pub fn compute(snapshot: &GraphSnapshot) -> ReputationVector {
    let names: Vec<&str> = snapshot.entities.iter().map(|e| e.name.as_str()).collect();
    if names.is_empty() {
        return ReputationVector::default();
    }

    // inEdges[v] = [(source, weight)]; outDeg[v] = count of trust-typed
    // outgoing edges whose target is also in the entity set. Built once.
    let known: std::collections::HashSet<&str> = names.iter().copied().collect();
    let mut out_deg: HashMap<&str, u32> = names.iter().map(|&n| (n, 0)).collect();
    let mut in_edges: HashMap<&str, Vec<(&str, f64)>> = names.iter().map(|&n| (n, Vec::new())).collect();

    for relation in &snapshot.relations {
        let Some(weight) = crate::model::trust_weight(&relation.relation) else {
            continue;
        };
        let source = relation.source.as_str();
        let target = relation.target.as_str();
        if !known.contains(source) || !known.contains(target) {
            continue;
        }
        *out_deg.entry(source).or_insert(0) += 1;
        in_edges.entry(target).or_default().push((source, weight));
    }

    let mut score: HashMap<&str, f64> = names.iter().map(|&n| (n, 1.0)).collect();

    for _ in 0..MAX_ITERATIONS {
        let mut new_score: HashMap<&str, f64> = HashMap::with_capacity(names.len());
        let mut max_delta: f64 = 0.0;

        for &v in &names {
            let inbound: f64 = in_edges
                .get(v)
                .into_iter()
                .flatten()
                .copied()
                .map(|(u, w)| {
                    let deg = (*out_deg.get(u).unwrap_or(&0)).max(1) as f64;
                    (score[u] / deg) * w
                })
                .sum();
            let updated = (1.0 - DAMPING) + DAMPING * inbound;
            max_delta = max_delta.max((updated - score[v]).abs());
            new_score.insert(v, updated);
        }

        score = new_score;
        if max_delta < TOLERANCE {
            break;
        }
    }

    ReputationVector(normalize(score, &names))
}

/// Min-max normalizes raw scores to `[0, 1]`, rounded to four decimals.
/// Degenerate (near-zero) range collapses every entity to `0.5`.
fn normalize(score: HashMap<&str, f64>, names: &[&str]) -> HashMap<String, f64> {
    let min = score.values().copied().fold(f64::INFINITY, f64::min);
    let max = score.values().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if range < DEGENERATE_RANGE {
        return names.iter().map(|&n| (n.to_owned(), 0.5)).collect();
    }

    names
        .iter()
        .map(|&n| {
            let normalized = (score[n] - min) / range;
            (n.to_owned(), round4(normalized))
        })
        .collect()
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Entity, Relation};
    use chrono::Utc;

    fn entity(name: &str) -> Entity {
        Entity {
            name: name.to_owned(),
            entity_type: "agent".into(),
            created: Utc::now(),
            updated: None,
            observations: Vec::new(),
        }
    }

    fn relation(source: &str, target: &str, label: &str) -> Relation {
        Relation {
            source: source.into(),
            target: target.into(),
            relation: label.into(),
        }
    }

    #[test]
    fn empty_trust_graph_is_uniformly_half() {
        let snapshot = GraphSnapshot {
            entities: vec![entity("a"), entity("b"), entity("c")],
            relations: vec![relation("a", "b", "mentions")],
        };
        let rep = compute(&snapshot);
        assert_eq!(rep.get("a"), 0.5);
        assert_eq!(rep.get("b"), 0.5);
        assert_eq!(rep.get("c"), 0.5);
    }

    #[test]
    fn absent_entity_resolves_to_zero() {
        let snapshot = GraphSnapshot {
            entities: vec![entity("a")],
            relations: vec![],
        };
        let rep = compute(&snapshot);
        assert_eq!(rep.get("nonexistent"), 0.0);
    }

    #[test]
    fn results_stay_within_unit_interval() {
        let snapshot = GraphSnapshot {
            entities: vec![entity("a"), entity("b"), entity("c"), entity("d")],
            relations: vec![
                relation("a", "b", "trusts"),
                relation("b", "c", "endorsed_by"),
                relation("c", "a", "depends_on"),
                relation("d", "a", "uses"),
            ],
        };
        let rep = compute(&snapshot);
        for (_, v) in rep.iter() {
            assert!((0.0..=1.0).contains(&v), "score {v} out of range");
        }
    }

    #[test]
    fn compute_is_idempotent() {
        let snapshot = GraphSnapshot {
            entities: vec![entity("a"), entity("b"), entity("c")],
            relations: vec![
                relation("a", "b", "trusts"),
                relation("b", "c", "collaborates_with"),
            ],
        };
        let first = compute(&snapshot);
        let second = compute(&snapshot);
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_endpoints_are_skipped_not_errored() {
        let snapshot = GraphSnapshot {
            entities: vec![entity("a"), entity("b")],
            relations: vec![relation("a", "ghost", "trusts"), relation("a", "b", "trusts")],
        };
        let rep = compute(&snapshot);
        assert_eq!(rep.len(), 2);
    }

    #[test]
    fn more_inbound_trust_yields_higher_reputation() {
        let snapshot = GraphSnapshot {
            entities: vec![entity("popular"), entity("lonely"), entity("x"), entity("y"), entity("z")],
            relations: vec![
                relation("x", "popular", "trusts"),
                relation("y", "popular", "trusts"),
                relation("z", "popular", "trusts"),
            ],
        };
        let rep = compute(&snapshot);
        assert!(rep.get("popular") > rep.get("lonely"));
    }
}
