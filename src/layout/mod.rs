//! 2D layout engine
//!
//! Assigns canvas coordinates to every node of a graph snapshot. Two
//! strategies produce a full position map: organic scatter placement
//! (first display and explicit reset) and cluster-anchored radial
//! placement (explicit auto-layout). Both are followed by a bounded
//! pairwise collision-resolution pass.
//!
//! Layout never fails and never drops a node: placement degrades to
//! deterministic edge-of-canvas slots when sampling cannot find room.
//! All layout state lives in an explicit [`LayoutSession`]: the position
//! map survives graph rebuilds so unaffected nodes do not jump, and is
//! replaced wholesale only by the explicit reset and auto-layout
//! commands.

pub mod anchored;
pub mod collision;
pub mod organic;

use crate::cluster::ClusterPartition;
use crate::graph::{CardId, Graph};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A point on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }

    pub fn distance_to(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Move this point `fraction` of the way toward `target`
    pub fn pulled_toward(&self, target: &Position, fraction: f64) -> Position {
        Position {
            x: self.x + (target.x - self.x) * fraction,
            y: self.y + (target.y - self.y) * fraction,
        }
    }
}

/// Canvas extent; positions are kept inside it at all times
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasBounds {
    pub width: f64,
    pub height: f64,
}

impl CanvasBounds {
    pub fn center(&self) -> Position {
        Position::new(self.width / 2.0, self.height / 2.0)
    }

    /// Clamp a point so a node of radius `margin` stays fully inside
    pub fn clamp(&self, position: Position, margin: f64) -> Position {
        Position {
            x: position.x.clamp(margin, (self.width - margin).max(margin)),
            y: position.y.clamp(margin, (self.height - margin).max(margin)),
        }
    }

    pub fn contains(&self, position: &Position) -> bool {
        position.x >= 0.0
            && position.x <= self.width
            && position.y >= 0.0
            && position.y <= self.height
    }
}

impl Default for CanvasBounds {
    fn default() -> Self {
        CanvasBounds {
            width: 1600.0,
            height: 1000.0,
        }
    }
}

/// Layout tuning constants.
///
/// All values are product tuning, adjustable per deployment; the defaults
/// match the shipped analysis view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub bounds: CanvasBounds,
    /// Sampling attempts per node before the edge-of-canvas fallback
    pub placement_attempts: usize,
    /// Minimum gap added to the pairwise radius sum during placement
    pub placement_padding: f64,
    /// A candidate must also clear this multiple of the node's own diameter
    pub self_spacing_factor: f64,
    /// Importance above which a node is pulled toward the canvas center
    pub center_pull_cutoff: f64,
    /// Fraction of the way toward center the pull moves a node
    pub center_pull: f64,
    /// Upper bound on collision-resolution sweeps
    pub collision_iterations: usize,
    /// Minimum gap enforced between node perimeters by collision resolution
    pub collision_padding: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            bounds: CanvasBounds::default(),
            placement_attempts: 50,
            placement_padding: 15.0,
            self_spacing_factor: 1.5,
            center_pull_cutoff: 2.5,
            center_pull: 0.3,
            collision_iterations: 20,
            collision_padding: 25.0,
        }
    }
}

/// Mutable layout state: the position map plus everything placement needs.
///
/// Single-writer: only the engine mutates a session; the rendering
/// collaborator reads positions through [`LayoutSession::positions`].
#[derive(Debug)]
pub struct LayoutSession {
    config: LayoutConfig,
    rng: StdRng,
    positions: HashMap<CardId, Position>,
    /// Rotating edge-of-canvas slot counter for placement fallbacks
    fallback_slot: usize,
    has_initial_layout: bool,
}

impl LayoutSession {
    /// Create a session with an explicit seed so layouts are reproducible
    pub fn new(config: LayoutConfig, seed: u64) -> Self {
        LayoutSession {
            config,
            rng: StdRng::seed_from_u64(seed),
            positions: HashMap::new(),
            fallback_slot: 0,
            has_initial_layout: false,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// The position map. May retain entries for nodes currently filtered
    /// out of the graph, so a card returning after a filter change lands
    /// where the operator last saw it.
    pub fn positions(&self) -> &HashMap<CardId, Position> {
        &self.positions
    }

    pub fn position(&self, id: &CardId) -> Option<Position> {
        self.positions.get(id).copied()
    }

    pub fn has_initial_layout(&self) -> bool {
        self.has_initial_layout
    }

    /// Organic scatter placement of the whole graph, replacing the map
    pub fn reset_organic(&mut self, graph: &Graph) {
        self.positions.clear();
        self.fallback_slot = 0;
        organic::place_all(
            &mut self.rng,
            &self.config,
            graph,
            &mut self.positions,
            &mut self.fallback_slot,
        );
        collision::resolve(&mut self.positions, graph, &self.config);
        self.has_initial_layout = true;
    }

    /// Cluster-anchored radial placement, replacing the map
    pub fn auto_layout(&mut self, graph: &Graph, partition: &ClusterPartition) {
        self.positions.clear();
        self.fallback_slot = 0;
        anchored::place_clusters(&self.config, graph, partition, &mut self.positions);
        collision::resolve(&mut self.positions, graph, &self.config);
        self.has_initial_layout = true;
    }

    /// Bring the map in sync with a rebuilt graph: nodes that already
    /// have a position keep it, new nodes are scatter-placed against the
    /// existing layout, then one collision pass settles the result.
    ///
    /// The first call on a fresh session performs the full organic
    /// placement instead.
    pub fn ensure_positions(&mut self, graph: &Graph) {
        if !self.has_initial_layout {
            self.reset_organic(graph);
            return;
        }

        let missing: Vec<CardId> = graph
            .node_ids()
            .filter(|id| !self.positions.contains_key(*id))
            .cloned()
            .collect();
        if missing.is_empty() {
            return;
        }

        for id in missing {
            if let Some(node) = graph.node(&id) {
                let placed: Vec<(Position, f64)> = graph
                    .nodes()
                    .filter(|n| n.id != id)
                    .filter_map(|n| self.positions.get(&n.id).map(|p| (*p, n.diameter())))
                    .collect();
                let position = organic::place_node(
                    &mut self.rng,
                    &self.config,
                    node.diameter(),
                    node.importance,
                    &placed,
                    &mut self.fallback_slot,
                );
                self.positions.insert(id, position);
            }
        }
        collision::resolve(&mut self.positions, graph, &self.config);
    }
}
