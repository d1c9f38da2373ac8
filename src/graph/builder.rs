//! Graph builder
//!
//! Projects the board's cards and relationships, under the active
//! filters, into one immutable-for-its-lifetime `Graph` snapshot with
//! per-node derived metrics. Rebuilt from scratch on every relevant input
//! change; snapshots are never shared or mutated.

use super::card::{Card, Relationship};
use super::edge::GraphEdge;
use super::node::GraphNode;
use super::types::{CardCategory, CardId, RelationshipType, SizeClass};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Node-type filter: only cards whose category is in `types` survive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeFilter {
    pub types: HashSet<CardCategory>,
}

impl NodeFilter {
    /// Filter that keeps every category
    pub fn all() -> Self {
        NodeFilter {
            types: CardCategory::ALL.into_iter().collect(),
        }
    }

    pub fn allows(&self, category: CardCategory) -> bool {
        self.types.contains(&category)
    }
}

impl Default for NodeFilter {
    fn default() -> Self {
        NodeFilter::all()
    }
}

/// Edge filter: strength floor plus an enabled relationship-type set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeFilter {
    /// Minimum strength in `[0, 1]`
    pub min_strength: f64,
    pub types: HashSet<RelationshipType>,
}

impl EdgeFilter {
    pub fn all() -> Self {
        EdgeFilter {
            min_strength: 0.0,
            types: RelationshipType::ALL.into_iter().collect(),
        }
    }

    pub fn allows(&self, relationship: &Relationship) -> bool {
        relationship.strength >= self.min_strength
            && self.types.contains(&relationship.relationship_type)
    }
}

impl Default for EdgeFilter {
    fn default() -> Self {
        EdgeFilter::all()
    }
}

/// Tuning constants behind the derived metrics.
///
/// These are product-tuning values, not invariants: newer cards and more
/// synthesized categories rank higher, and the exact coefficients are
/// adjustable per deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricWeights {
    /// Importance share of centrality
    pub centrality_weight: f64,
    /// Importance share of content density
    pub density_weight: f64,
    /// Importance share of the category weight
    pub category_weight: f64,
    /// Importance share of the recency weight
    pub recency_weight: f64,
    /// Discount applied to 2-hop neighbors in the centrality sum
    pub two_hop_discount: f64,
    /// Content-density coefficients (per title char / body char / tag)
    pub title_char_weight: f64,
    pub content_char_weight: f64,
    pub tag_weight: f64,
    /// Recency weight is `max(floor, 1 - days / window)`
    pub recency_floor: f64,
    pub recency_window_days: f64,
    /// Ascending cut points between the four size classes
    pub size_bands: [f64; 3],
}

impl Default for MetricWeights {
    fn default() -> Self {
        MetricWeights {
            centrality_weight: 0.4,
            density_weight: 0.01,
            category_weight: 0.3,
            recency_weight: 0.3,
            two_hop_discount: 0.3,
            title_char_weight: 2.0,
            content_char_weight: 0.5,
            tag_weight: 10.0,
            recency_floor: 0.2,
            recency_window_days: 30.0,
            size_bands: [1.2, 2.2, 3.2],
        }
    }
}

impl MetricWeights {
    /// Recency weight for a card last updated `days` ago
    pub fn recency(&self, days: f64) -> f64 {
        (1.0 - days / self.recency_window_days).max(self.recency_floor)
    }
}

/// Aggregate metrics of one graph snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphMetrics {
    pub total_nodes: usize,
    pub total_edges: usize,
    /// Edge density `2E / N(N-1)`, 0 for graphs with fewer than two nodes
    pub density: f64,
}

/// One immutable graph snapshot produced by the builder
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: IndexMap<CardId, GraphNode>,
    edges: Vec<GraphEdge>,
    metrics: GraphMetrics,
}

impl Graph {
    /// The empty graph
    pub fn empty() -> Self {
        Graph {
            nodes: IndexMap::new(),
            edges: Vec::new(),
            metrics: GraphMetrics {
                total_nodes: 0,
                total_edges: 0,
                density: 0.0,
            },
        }
    }

    pub fn node(&self, id: &CardId) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &CardId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    /// Node ids in insertion order
    pub fn node_ids(&self) -> impl Iterator<Item = &CardId> {
        self.nodes.keys()
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn metrics(&self) -> &GraphMetrics {
        &self.metrics
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Direct neighbors of a node, in edge order
    pub fn neighbors(&self, id: &CardId) -> Vec<&CardId> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        for edge in &self.edges {
            if let Some(other) = edge.other_end(id) {
                if seen.insert(other) {
                    out.push(other);
                }
            }
        }
        out
    }
}

/// Build one graph snapshot from raw board inputs.
///
/// Cards are filtered first; relationships survive only if they pass the
/// edge filter and both endpoints passed the card filter. Relationships
/// referencing unknown cards are dropped with a debug log rather than
/// failing the build, since a partial graph is still useful.
pub fn build_graph(
    cards: &[Card],
    relationships: &[Relationship],
    node_filter: &NodeFilter,
    edge_filter: &EdgeFilter,
    weights: &MetricWeights,
    now: DateTime<Utc>,
) -> Graph {
    // 1. Filter cards
    let visible: Vec<&Card> = cards
        .iter()
        .filter(|c| node_filter.allows(c.category))
        .collect();
    let visible_ids: FxHashSet<&CardId> = visible.iter().map(|c| &c.id).collect();

    // 2. Filter edges: strength/type pass plus both endpoints surviving
    let mut edges = Vec::new();
    for rel in relationships {
        if rel.card_id == rel.related_card_id {
            debug!(card = %rel.card_id, "dropping self-referencing relationship");
            continue;
        }
        if !edge_filter.allows(rel) {
            continue;
        }
        if !visible_ids.contains(&rel.card_id) || !visible_ids.contains(&rel.related_card_id) {
            debug!(
                source = %rel.card_id,
                target = %rel.related_card_id,
                "dropping relationship with missing or filtered endpoint"
            );
            continue;
        }
        edges.push(GraphEdge::new(
            rel.card_id.clone(),
            rel.related_card_id.clone(),
            rel.relationship_type,
            rel.strength,
        ));
    }

    // 3. 1-hop adjacency over the filtered edge set
    let mut adjacency: FxHashMap<&CardId, FxHashSet<&CardId>> = FxHashMap::default();
    for edge in &edges {
        adjacency.entry(&edge.source).or_default().insert(&edge.target);
        adjacency.entry(&edge.target).or_default().insert(&edge.source);
    }

    // 4. Derive per-node metrics
    let mut nodes = IndexMap::with_capacity(visible.len());
    for card in &visible {
        let connection_count = edges.iter().filter(|e| e.touches(&card.id)).count();
        let centrality = centrality_of(&card.id, &adjacency, weights.two_hop_discount);
        let content_density = weights.title_char_weight * card.title.chars().count() as f64
            + weights.content_char_weight * card.content.chars().count() as f64
            + weights.tag_weight * card.tags.len() as f64;
        let recency = weights.recency(card.days_since_update(now));

        let importance = weights.centrality_weight * centrality
            + weights.density_weight * content_density
            + weights.category_weight * card.category.weight()
            + weights.recency_weight * recency;

        nodes.insert(
            card.id.clone(),
            GraphNode {
                id: card.id.clone(),
                title: card.title.clone(),
                content: card.content.clone(),
                category: card.category,
                tags: card.tags.clone(),
                connection_count,
                centrality,
                content_density,
                importance,
                size_class: SizeClass::from_importance(importance, weights.size_bands),
            },
        );
    }

    let total_nodes = nodes.len();
    let total_edges = edges.len();
    let density = if total_nodes < 2 {
        0.0
    } else {
        2.0 * total_edges as f64 / (total_nodes as f64 * (total_nodes as f64 - 1.0))
    };

    Graph {
        nodes,
        edges,
        metrics: GraphMetrics {
            total_nodes,
            total_edges,
            density,
        },
    }
}

/// `|1-hop| + discount * |2-hop|`, 2-hop excluding self and 1-hop members
fn centrality_of(
    id: &CardId,
    adjacency: &FxHashMap<&CardId, FxHashSet<&CardId>>,
    discount: f64,
) -> f64 {
    let Some(one_hop) = adjacency.get(id) else {
        return 0.0;
    };

    let mut two_hop: FxHashSet<&CardId> = FxHashSet::default();
    for neighbor in one_hop {
        if let Some(theirs) = adjacency.get(*neighbor) {
            for candidate in theirs {
                if *candidate != id && !one_hop.contains(*candidate) {
                    two_hop.insert(*candidate);
                }
            }
        }
    }

    one_hop.len() as f64 + discount * two_hop.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: &str, category: CardCategory) -> Card {
        Card::new(id, format!("Card {}", id), category)
    }

    fn rel(a: &str, b: &str, strength: f64) -> Relationship {
        Relationship::new(a, b, strength, RelationshipType::RelatesTo)
    }

    fn build(cards: &[Card], rels: &[Relationship]) -> Graph {
        build_graph(
            cards,
            rels,
            &NodeFilter::all(),
            &EdgeFilter::all(),
            &MetricWeights::default(),
            Utc::now(),
        )
    }

    #[test]
    fn test_empty_input_is_nan_safe() {
        let graph = build(&[], &[]);
        assert!(graph.is_empty());
        assert_eq!(graph.metrics().total_nodes, 0);
        assert_eq!(graph.metrics().total_edges, 0);
        assert_eq!(graph.metrics().density, 0.0);
    }

    #[test]
    fn test_dangling_edges_dropped() {
        let cards = vec![card("a", CardCategory::Insight), card("b", CardCategory::Insight)];
        let rels = vec![rel("a", "b", 0.8), rel("a", "ghost", 0.9), rel("a", "a", 0.9)];
        let graph = build(&cards, &rels);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_node_filter_removes_touching_edges() {
        let cards = vec![
            card("a", CardCategory::Insight),
            card("b", CardCategory::Reference),
        ];
        let rels = vec![rel("a", "b", 0.8)];

        let mut filter = NodeFilter::all();
        filter.types.remove(&CardCategory::Reference);

        let graph = build_graph(
            &cards,
            &rels,
            &filter,
            &EdgeFilter::all(),
            &MetricWeights::default(),
            Utc::now(),
        );
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.contains(&"a".into()));
    }

    #[test]
    fn test_edge_filter_strength_floor() {
        let cards = vec![card("a", CardCategory::Insight), card("b", CardCategory::Insight)];
        let rels = vec![rel("a", "b", 0.2)];

        let mut filter = EdgeFilter::all();
        filter.min_strength = 0.3;

        let graph = build_graph(
            &cards,
            &rels,
            &NodeFilter::all(),
            &filter,
            &MetricWeights::default(),
            Utc::now(),
        );
        assert_eq!(graph.edge_count(), 0);
        // Nodes survive even when all their edges are filtered away
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.node(&"a".into()).unwrap().connection_count, 0);
    }

    #[test]
    fn test_centrality_counts_discounted_two_hop() {
        // Chain a - b - c - d: from a, 1-hop {b}, 2-hop {c}
        let cards = vec![
            card("a", CardCategory::Insight),
            card("b", CardCategory::Insight),
            card("c", CardCategory::Insight),
            card("d", CardCategory::Insight),
        ];
        let rels = vec![rel("a", "b", 0.9), rel("b", "c", 0.9), rel("c", "d", 0.9)];
        let graph = build(&cards, &rels);

        let a = graph.node(&"a".into()).unwrap();
        assert!((a.centrality - (1.0 + 0.3)).abs() < 1e-9);

        let b = graph.node(&"b".into()).unwrap();
        // 1-hop {a, c}, 2-hop {d}
        assert!((b.centrality - (2.0 + 0.3)).abs() < 1e-9);
        assert_eq!(b.connection_count, 2);
    }

    #[test]
    fn test_importance_prefers_connected_synthesis() {
        let cards = vec![
            card("hub", CardCategory::Synthesis),
            card("leaf", CardCategory::Reference),
            card("x", CardCategory::Reference),
            card("y", CardCategory::Reference),
        ];
        let rels = vec![rel("hub", "x", 0.9), rel("hub", "y", 0.9), rel("hub", "leaf", 0.9)];
        let graph = build(&cards, &rels);

        let hub = graph.node(&"hub".into()).unwrap();
        let leaf = graph.node(&"leaf".into()).unwrap();
        assert!(hub.importance > leaf.importance);
        assert!(hub.size_class >= leaf.size_class);
    }

    #[test]
    fn test_density() {
        let cards = vec![
            card("a", CardCategory::Insight),
            card("b", CardCategory::Insight),
            card("c", CardCategory::Insight),
        ];
        // 2 of 3 possible undirected edges
        let rels = vec![rel("a", "b", 0.9), rel("b", "c", 0.9)];
        let graph = build(&cards, &rels);
        assert!((graph.metrics().density - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_neighbors() {
        let cards = vec![
            card("a", CardCategory::Insight),
            card("b", CardCategory::Insight),
            card("c", CardCategory::Insight),
        ];
        let rels = vec![rel("a", "b", 0.9), rel("c", "a", 0.9)];
        let graph = build(&cards, &rels);
        let neighbors = graph.neighbors(&"a".into());
        assert_eq!(neighbors.len(), 2);
    }
}
