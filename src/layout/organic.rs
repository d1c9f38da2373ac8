//! Organic scatter placement
//!
//! Samples random positions in progressively larger concentric bands
//! around the canvas center, rejecting candidates that crowd already
//! placed nodes. High-importance nodes are pulled toward the center after
//! sampling. When every attempt collides, placement falls back to a
//! rotating edge-of-canvas slot so it always terminates.

use super::{LayoutConfig, Position};
use crate::graph::{CardId, Graph};
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::HashMap;
use std::f64::consts::TAU;
use tracing::debug;

/// Inner radius of the first sampling band
const BAND_BASE_RADIUS: f64 = 80.0;
/// Radial width of each sampling band
const BAND_WIDTH: f64 = 120.0;
/// Failed attempts before sampling widens to the next band
const ATTEMPTS_PER_BAND: usize = 10;
/// Inset of the fallback slots from the canvas edge
const EDGE_MARGIN: f64 = 60.0;
/// Spacing between consecutive fallback slots on one side
const FALLBACK_SPACING: f64 = 70.0;

/// Scatter-place every node of the graph, in insertion order
pub(crate) fn place_all(
    rng: &mut StdRng,
    config: &LayoutConfig,
    graph: &Graph,
    positions: &mut HashMap<CardId, Position>,
    fallback_slot: &mut usize,
) {
    let mut placed: Vec<(Position, f64)> = Vec::with_capacity(graph.node_count());
    for node in graph.nodes() {
        let position = place_node(
            rng,
            config,
            node.diameter(),
            node.importance,
            &placed,
            fallback_slot,
        );
        placed.push((position, node.diameter()));
        positions.insert(node.id.clone(), position);
    }
}

/// Find a position for one node against the nodes placed so far.
///
/// Up to `config.placement_attempts` candidates are sampled; a candidate
/// is rejected when its distance to any placed node falls below
/// `max((d_other + d_self)/2 + padding, self_spacing_factor * d_self)`.
pub(crate) fn place_node(
    rng: &mut StdRng,
    config: &LayoutConfig,
    diameter: f64,
    importance: f64,
    placed: &[(Position, f64)],
    fallback_slot: &mut usize,
) -> Position {
    let center = config.bounds.center();
    let radius = diameter / 2.0;

    for attempt in 0..config.placement_attempts {
        let band = (attempt / ATTEMPTS_PER_BAND) as f64;
        let distance = BAND_BASE_RADIUS + band * BAND_WIDTH + rng.gen_range(0.0..BAND_WIDTH);
        let angle = rng.gen_range(0.0..TAU);
        let candidate = config.bounds.clamp(
            Position::new(
                center.x + distance * angle.cos(),
                center.y + distance * angle.sin(),
            ),
            radius,
        );

        let clear = placed.iter().all(|(other, other_diameter)| {
            let required = ((other_diameter + diameter) / 2.0 + config.placement_padding)
                .max(config.self_spacing_factor * diameter);
            candidate.distance_to(other) >= required
        });

        if clear {
            let position = if importance > config.center_pull_cutoff {
                config
                    .bounds
                    .clamp(candidate.pulled_toward(&center, config.center_pull), radius)
            } else {
                candidate
            };
            return position;
        }
    }

    let slot = *fallback_slot;
    *fallback_slot += 1;
    debug!(slot, "organic placement exhausted attempts, using edge slot");
    edge_slot(config, slot, radius)
}

/// Deterministic edge-of-canvas slot, rotating top/right/bottom/left
fn edge_slot(config: &LayoutConfig, slot: usize, radius: f64) -> Position {
    let bounds = &config.bounds;
    let side = slot % 4;
    let step = (slot / 4 + 1) as f64;

    let along_width =
        EDGE_MARGIN + (step * FALLBACK_SPACING) % (bounds.width - 2.0 * EDGE_MARGIN).max(1.0);
    let along_height =
        EDGE_MARGIN + (step * FALLBACK_SPACING) % (bounds.height - 2.0 * EDGE_MARGIN).max(1.0);

    let position = match side {
        0 => Position::new(along_width, EDGE_MARGIN),
        1 => Position::new(bounds.width - EDGE_MARGIN, along_height),
        2 => Position::new(along_width, bounds.height - EDGE_MARGIN),
        _ => Position::new(EDGE_MARGIN, along_height),
    };
    bounds.clamp(position, radius)
}
