//! Graph model and builder
//!
//! Turns the board's cards and weighted relationships, under the active
//! filters, into a typed node/edge graph with per-node derived metrics
//! (connection count, centrality, importance, size class).

pub mod builder;
pub mod card;
pub mod edge;
pub mod node;
pub mod types;

// Re-export main types
pub use builder::{build_graph, EdgeFilter, Graph, GraphMetrics, MetricWeights, NodeFilter};
pub use card::{Card, NewRelationship, Relationship};
pub use edge::GraphEdge;
pub use node::GraphNode;
pub use types::{
    AnalysisMethod, BoardId, CardCategory, CardId, CardPair, RelationshipType, SizeClass,
};
