//! Transient view state
//!
//! Pan/zoom transform, node selection, and hover highlighting. This is
//! presentation state only: it never changes the graph, the layout, or
//! the suggestion list, and the host forwards operator gestures as
//! discrete commands.

use crate::graph::{CardId, Graph};
use serde::{Deserialize, Serialize};

/// Zoom clamp range
const MIN_SCALE: f64 = 0.25;
const MAX_SCALE: f64 = 3.0;

/// Pan/zoom transform applied by the rendering collaborator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        ViewTransform {
            offset_x: 0.0,
            offset_y: 0.0,
            scale: 1.0,
        }
    }
}

/// Transient interaction state of the analysis view
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewState {
    pub transform: ViewTransform,
    pub selected: Option<CardId>,
    pub hovered: Option<CardId>,
}

impl ViewState {
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.transform.offset_x += dx;
        self.transform.offset_y += dy;
    }

    /// Set the zoom scale, clamped to the supported range
    pub fn set_zoom(&mut self, scale: f64) {
        self.transform.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
    }

    pub fn zoom_by(&mut self, factor: f64) {
        self.set_zoom(self.transform.scale * factor);
    }

    pub fn select(&mut self, id: Option<CardId>) {
        self.selected = id;
    }

    pub fn hover(&mut self, id: Option<CardId>) {
        self.hovered = id;
    }

    /// Reset pan, zoom, selection, and hover
    pub fn reset(&mut self) {
        *self = ViewState::default();
    }

    /// The hovered node and its direct neighbors, for highlight rendering
    pub fn highlighted<'a>(&'a self, graph: &'a Graph) -> Vec<&'a CardId> {
        let Some(hovered) = self.hovered.as_ref() else {
            return Vec::new();
        };
        if !graph.contains(hovered) {
            return Vec::new();
        }
        let mut ids = vec![hovered];
        ids.extend(graph.neighbors(hovered));
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{
        build_graph, Card, CardCategory, EdgeFilter, MetricWeights, NodeFilter, Relationship,
        RelationshipType,
    };
    use chrono::Utc;

    #[test]
    fn test_zoom_clamped() {
        let mut view = ViewState::default();
        view.set_zoom(10.0);
        assert_eq!(view.transform.scale, MAX_SCALE);
        view.set_zoom(0.0);
        assert_eq!(view.transform.scale, MIN_SCALE);
        view.set_zoom(1.5);
        view.zoom_by(0.5);
        assert_eq!(view.transform.scale, 0.75);
    }

    #[test]
    fn test_pan_accumulates() {
        let mut view = ViewState::default();
        view.pan_by(10.0, -5.0);
        view.pan_by(2.0, 3.0);
        assert_eq!(view.transform.offset_x, 12.0);
        assert_eq!(view.transform.offset_y, -2.0);
        view.reset();
        assert_eq!(view.transform, ViewTransform::default());
    }

    #[test]
    fn test_highlight_covers_neighbors() {
        let cards = vec![
            Card::new("a", "a", CardCategory::Insight),
            Card::new("b", "b", CardCategory::Insight),
            Card::new("c", "c", CardCategory::Insight),
        ];
        let rels = vec![Relationship::new("a", "b", 0.9, RelationshipType::RelatesTo)];
        let graph = build_graph(
            &cards,
            &rels,
            &NodeFilter::all(),
            &EdgeFilter::all(),
            &MetricWeights::default(),
            Utc::now(),
        );

        let mut view = ViewState::default();
        assert!(view.highlighted(&graph).is_empty());

        view.hover(Some("a".into()));
        let highlighted = view.highlighted(&graph);
        assert_eq!(highlighted.len(), 2);
        assert!(highlighted.contains(&&CardId::from("b")));

        view.hover(Some("ghost".into()));
        assert!(view.highlighted(&graph).is_empty());
    }
}
