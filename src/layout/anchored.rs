//! Cluster-anchored radial placement
//!
//! Distributes detected clusters evenly on a circle around the canvas
//! center. Each cluster's most important node sits at the cluster anchor
//! with the remaining members ringed around it; isolated nodes are
//! grouped and placed as one additional virtual cluster. Graphs with no
//! detectable clusters fall back to importance-ranked concentric
//! placement.

use super::{LayoutConfig, Position};
use crate::cluster::ClusterPartition;
use crate::graph::{CardId, Graph};
use std::collections::HashMap;
use std::f64::consts::{PI, TAU};

/// Anchor circle radius as a fraction of the smaller canvas extent
const ANCHOR_RADIUS_FRACTION: f64 = 0.32;
/// Minimum radius of a cluster's member ring
const MEMBER_RING_BASE: f64 = 90.0;
/// Arc length reserved per member on the ring
const MEMBER_SPACING: f64 = 70.0;
/// Inner ring radius of the no-cluster concentric fallback
const INNER_RING_RADIUS: f64 = 180.0;
/// Outer ring radius of the no-cluster concentric fallback
const OUTER_RING_RADIUS: f64 = 360.0;
/// Inner ring capacity of the concentric fallback
const INNER_RING_CAPACITY: usize = 6;

/// Place every node of the graph according to the cluster partition
pub(crate) fn place_clusters(
    config: &LayoutConfig,
    graph: &Graph,
    partition: &ClusterPartition,
    positions: &mut HashMap<CardId, Position>,
) {
    if graph.is_empty() {
        return;
    }

    if partition.clusters.is_empty() {
        concentric_fallback(config, graph, positions);
        return;
    }

    let center = config.bounds.center();
    let anchor_radius =
        ANCHOR_RADIUS_FRACTION * config.bounds.width.min(config.bounds.height);

    // Clusters first, isolated nodes appended as one virtual cluster
    let mut groups: Vec<Vec<CardId>> = partition
        .clusters
        .iter()
        .map(|c| c.members.clone())
        .collect();
    if !partition.isolated.is_empty() {
        groups.push(partition.isolated.clone());
    }

    let group_count = groups.len();
    for (index, mut members) in groups.into_iter().enumerate() {
        let anchor = if group_count == 1 {
            center
        } else {
            let angle = index as f64 * TAU / group_count as f64 - PI / 2.0;
            Position::new(
                center.x + anchor_radius * angle.cos(),
                center.y + anchor_radius * angle.sin(),
            )
        };

        // Most important member claims the anchor
        members.sort_by(|a, b| {
            let ia = graph.node(a).map(|n| n.importance).unwrap_or(0.0);
            let ib = graph.node(b).map(|n| n.importance).unwrap_or(0.0);
            ib.total_cmp(&ia)
        });

        let ring_count = members.len().saturating_sub(1);
        let ring_radius = MEMBER_RING_BASE.max(ring_count as f64 * MEMBER_SPACING / TAU);

        for (rank, id) in members.into_iter().enumerate() {
            let radius = graph.node(&id).map(|n| n.diameter() / 2.0).unwrap_or(20.0);
            let position = if rank == 0 {
                anchor
            } else {
                let angle = (rank - 1) as f64 * TAU / ring_count as f64 - PI / 2.0;
                Position::new(
                    anchor.x + ring_radius * angle.cos(),
                    anchor.y + ring_radius * angle.sin(),
                )
            };
            positions.insert(id, config.bounds.clamp(position, radius));
        }
    }

    // A stale partition must not lose nodes: ring any stragglers
    let stragglers: Vec<CardId> = graph
        .node_ids()
        .filter(|id| !positions.contains_key(*id))
        .cloned()
        .collect();
    for (index, id) in stragglers.into_iter().enumerate() {
        let radius = graph.node(&id).map(|n| n.diameter() / 2.0).unwrap_or(20.0);
        let angle = index as f64 * TAU / 8.0;
        let position = Position::new(
            center.x + OUTER_RING_RADIUS * angle.cos(),
            center.y + OUTER_RING_RADIUS * angle.sin(),
        );
        positions.insert(id, config.bounds.clamp(position, radius));
    }
}

/// Importance-ranked concentric placement: the top node at the canvas
/// center, the next six on an inner ring, the remainder on an outer ring
fn concentric_fallback(
    config: &LayoutConfig,
    graph: &Graph,
    positions: &mut HashMap<CardId, Position>,
) {
    let center = config.bounds.center();

    let mut ranked: Vec<&CardId> = graph.node_ids().collect();
    ranked.sort_by(|a, b| {
        let ia = graph.node(a).map(|n| n.importance).unwrap_or(0.0);
        let ib = graph.node(b).map(|n| n.importance).unwrap_or(0.0);
        ib.total_cmp(&ia)
    });

    let inner_count = ranked.len().saturating_sub(1).min(INNER_RING_CAPACITY);
    let outer_count = ranked.len().saturating_sub(1 + inner_count);

    for (rank, id) in ranked.into_iter().enumerate() {
        let radius = graph.node(id).map(|n| n.diameter() / 2.0).unwrap_or(20.0);
        let position = if rank == 0 {
            center
        } else if rank <= inner_count {
            let angle = (rank - 1) as f64 * TAU / inner_count as f64 - PI / 2.0;
            Position::new(
                center.x + INNER_RING_RADIUS * angle.cos(),
                center.y + INNER_RING_RADIUS * angle.sin(),
            )
        } else {
            let angle = (rank - 1 - inner_count) as f64 * TAU / outer_count as f64 - PI / 2.0;
            Position::new(
                center.x + OUTER_RING_RADIUS * angle.cos(),
                center.y + OUTER_RING_RADIUS * angle.sin(),
            )
        };
        positions.insert(id.clone(), config.bounds.clamp(position, radius));
    }
}
