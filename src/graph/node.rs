//! Graph node with derived metrics
//!
//! A node is one visualized card plus the metrics the builder derives for
//! it. Positions are deliberately absent here: the layout engine owns them
//! exclusively in its position map.

use super::types::{CardCategory, CardId, SizeClass};
use serde::{Deserialize, Serialize};

/// One visualized card inside a graph snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: CardId,
    pub title: String,
    pub content: String,
    pub category: CardCategory,
    pub tags: Vec<String>,

    /// Edges touching this node, within the filtered edge set
    pub connection_count: usize,
    /// Weighted 1-hop + discounted 2-hop neighbor count
    pub centrality: f64,
    /// Weighted sum of title/body/tag lengths
    pub content_density: f64,
    /// Composite ranking metric driving size and placement priority
    pub importance: f64,
    pub size_class: SizeClass,
}

impl GraphNode {
    /// Node diameter in canvas units
    pub fn diameter(&self) -> f64 {
        self.size_class.diameter()
    }
}

impl PartialEq for GraphNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for GraphNode {}

impl std::hash::Hash for GraphNode {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
