//! Graph edge with derived render width
//!
//! Edges keep their stored `source`/`target` direction for provenance but
//! are treated as undirected by clustering and layout.

use super::types::{CardId, CardPair, RelationshipType};
use serde::{Deserialize, Serialize};

/// Base stroke width in canvas units
const WIDTH_BASE: f64 = 1.0;
/// Additional width at strength 1.0
const WIDTH_SPAN: f64 = 3.0;

/// One weighted relationship inside a graph snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: CardId,
    pub target: CardId,
    pub relationship_type: RelationshipType,
    /// Strength in `[0, 1]`
    pub strength: f64,
    /// Stroke width derived from strength, for the rendering collaborator
    pub width: f64,
}

impl GraphEdge {
    pub fn new(
        source: CardId,
        target: CardId,
        relationship_type: RelationshipType,
        strength: f64,
    ) -> Self {
        let strength = strength.clamp(0.0, 1.0);
        GraphEdge {
            source,
            target,
            relationship_type,
            strength,
            width: WIDTH_BASE + WIDTH_SPAN * strength,
        }
    }

    /// Canonical unordered endpoint pair
    pub fn pair(&self) -> CardPair {
        CardPair::new(self.source.clone(), self.target.clone())
    }

    /// Whether the edge touches the given node
    pub fn touches(&self, id: &CardId) -> bool {
        &self.source == id || &self.target == id
    }

    /// The endpoint opposite to `id`, if `id` is an endpoint
    pub fn other_end(&self, id: &CardId) -> Option<&CardId> {
        if &self.source == id {
            Some(&self.target)
        } else if &self.target == id {
            Some(&self.source)
        } else {
            None
        }
    }
}
