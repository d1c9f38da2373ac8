//! Pairwise collision resolution
//!
//! Iterates over all node pairs, pushing apart any pair whose centers sit
//! closer than the sum of their radii plus a padding gap, then clamping
//! both back inside canvas bounds. The pass is bounded and stops early
//! once a sweep finds no collisions; re-running it on an already resolved
//! layout moves nothing.

use super::{LayoutConfig, Position};
use crate::graph::{CardId, Graph};
use std::collections::HashMap;
use tracing::debug;

/// Extra separation added on top of half the deficit, so resolved pairs
/// clear the threshold instead of landing exactly on it
const SEPARATION_NUDGE: f64 = 1.0;

/// Resolve overlaps among the graph's nodes in `positions`.
///
/// Returns the number of sweeps executed (at most
/// `config.collision_iterations`).
pub(crate) fn resolve(
    positions: &mut HashMap<CardId, Position>,
    graph: &Graph,
    config: &LayoutConfig,
) -> usize {
    let nodes: Vec<(&CardId, f64)> = graph.nodes().map(|n| (&n.id, n.diameter())).collect();
    if nodes.len() < 2 {
        return 0;
    }

    let mut sweeps = 0;
    for _ in 0..config.collision_iterations {
        sweeps += 1;
        let mut collisions = 0;

        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                let (id_a, diameter_a) = nodes[i];
                let (id_b, diameter_b) = nodes[j];
                let (Some(&a), Some(&b)) = (positions.get(id_a), positions.get(id_b)) else {
                    continue;
                };

                let min_distance = (diameter_a + diameter_b) / 2.0 + config.collision_padding;
                let distance = a.distance_to(&b);
                if distance >= min_distance {
                    continue;
                }
                collisions += 1;

                // Push both nodes apart along the connecting line. For
                // coincident centers the direction comes from the pair
                // indices so the result stays deterministic.
                let (ux, uy) = if distance > f64::EPSILON {
                    ((b.x - a.x) / distance, (b.y - a.y) / distance)
                } else {
                    let angle = (i * 31 + j) as f64;
                    (angle.cos(), angle.sin())
                };
                let push = (min_distance - distance) / 2.0 + SEPARATION_NUDGE;

                positions.insert(
                    id_a.clone(),
                    config.bounds.clamp(
                        Position::new(a.x - ux * push, a.y - uy * push),
                        diameter_a / 2.0,
                    ),
                );
                positions.insert(
                    id_b.clone(),
                    config.bounds.clamp(
                        Position::new(b.x + ux * push, b.y + uy * push),
                        diameter_b / 2.0,
                    ),
                );
            }
        }

        if collisions == 0 {
            break;
        }
        debug!(sweeps, collisions, "collision sweep");
    }
    sweeps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{
        build_graph, Card, CardCategory, EdgeFilter, MetricWeights, NodeFilter,
    };
    use chrono::Utc;

    fn graph_of(ids: &[&str]) -> Graph {
        let cards: Vec<Card> = ids
            .iter()
            .map(|id| Card::new(*id, *id, CardCategory::Insight))
            .collect();
        build_graph(
            &cards,
            &[],
            &NodeFilter::all(),
            &EdgeFilter::all(),
            &MetricWeights::default(),
            Utc::now(),
        )
    }

    fn min_distance(graph: &Graph, config: &LayoutConfig, a: &CardId, b: &CardId) -> f64 {
        (graph.node(a).unwrap().diameter() + graph.node(b).unwrap().diameter()) / 2.0
            + config.collision_padding
    }

    #[test]
    fn test_overlapping_pair_separates() {
        let graph = graph_of(&["a", "b"]);
        let config = LayoutConfig::default();
        let mut positions = HashMap::from([
            (CardId::from("a"), Position::new(800.0, 500.0)),
            (CardId::from("b"), Position::new(805.0, 500.0)),
        ]);

        resolve(&mut positions, &graph, &config);

        let required = min_distance(&graph, &config, &"a".into(), &"b".into());
        let distance = positions[&CardId::from("a")].distance_to(&positions[&CardId::from("b")]);
        assert!(distance >= required - 1e-6);
    }

    #[test]
    fn test_coincident_pair_separates_deterministically() {
        let graph = graph_of(&["a", "b"]);
        let config = LayoutConfig::default();
        let start = HashMap::from([
            (CardId::from("a"), Position::new(800.0, 500.0)),
            (CardId::from("b"), Position::new(800.0, 500.0)),
        ]);

        let mut first = start.clone();
        let mut second = start;
        resolve(&mut first, &graph, &config);
        resolve(&mut second, &graph, &config);

        assert_eq!(first[&CardId::from("a")], second[&CardId::from("a")]);
        let distance = first[&CardId::from("a")].distance_to(&first[&CardId::from("b")]);
        let required = min_distance(&graph, &config, &"a".into(), &"b".into());
        assert!(distance >= required - 1e-6);
    }

    #[test]
    fn test_resolved_layout_is_a_no_op() {
        let graph = graph_of(&["a", "b", "c", "d"]);
        let config = LayoutConfig::default();
        let mut positions = HashMap::new();
        for (index, node) in graph.nodes().enumerate() {
            positions.insert(
                node.id.clone(),
                Position::new(200.0 + 300.0 * index as f64 % 1200.0, 300.0 + 200.0 * (index / 4) as f64),
            );
        }

        resolve(&mut positions, &graph, &config);
        let settled = positions.clone();
        let sweeps = resolve(&mut positions, &graph, &config);

        assert_eq!(sweeps, 1);
        for (id, position) in &settled {
            assert_eq!(positions[id], *position);
        }
    }

    #[test]
    fn test_positions_stay_in_bounds() {
        let graph = graph_of(&["a", "b", "c"]);
        let mut config = LayoutConfig::default();
        config.bounds.width = 300.0;
        config.bounds.height = 300.0;
        // All piled in a corner
        let mut positions = HashMap::from([
            (CardId::from("a"), Position::new(10.0, 10.0)),
            (CardId::from("b"), Position::new(12.0, 11.0)),
            (CardId::from("c"), Position::new(11.0, 12.0)),
        ]);

        resolve(&mut positions, &graph, &config);
        for position in positions.values() {
            assert!(config.bounds.contains(position));
        }
    }
}
