//! Cardlens Analysis Engine
//!
//! The computational core behind a collaboration board's "Analysis"
//! view. Given a board's content cards and weighted pairwise
//! relationships, the engine produces:
//!
//! - a typed node/edge graph with per-node derived metrics (connection
//!   count, centrality, importance score, size class),
//! - a partition of the graph into connected clusters under a tunable
//!   strength threshold, plus the isolated-node remainder,
//! - an overlap-free, visually stable 2D layout (organic scatter
//!   placement or cluster-anchored radial placement, both followed by a
//!   bounded collision-resolution pass),
//! - a deduplicated, confidence-ranked list of candidate relationships
//!   merged from three independent analysis methods, with per-pair,
//!   per-method, and global accept/reject.
//!
//! Storage, embedding computation, and rendering are external
//! collaborators: the storage row store and the analysis methods are
//! reached through the [`storage::CardStore`] and
//! [`suggest::AnalysisProvider`] traits, and the rendering surface reads
//! positions from the layout session. The engine itself is a pure
//! in-process core driven through discrete commands on
//! [`engine::AnalysisEngine`].
//!
//! # Example
//!
//! ```no_run
//! use cardlens::engine::AnalysisEngine;
//! use cardlens::graph::BoardId;
//! use cardlens::suggest::AnalysisMode;
//! # use std::sync::Arc;
//! # async fn run(store: Arc<impl cardlens::storage::CardStore>,
//! #              provider: impl cardlens::suggest::AnalysisProvider) {
//! let mut engine = AnalysisEngine::new(store, BoardId::new("board-1"));
//! engine.rebuild_graph().await.unwrap();
//! engine.auto_layout();
//!
//! let found = engine.run_analysis(&provider, AnalysisMode::Full).await.unwrap();
//! println!("{} candidate relationships", found);
//! # }
//! ```

#![warn(clippy::all)]

pub mod cluster;
pub mod engine;
pub mod graph;
pub mod layout;
pub mod storage;
pub mod suggest;

// Re-export main types for convenience
pub use cluster::{detect_clusters, Cluster, ClusterPartition};
pub use engine::{
    AnalysisEngine, ApprovalReport, EngineError, EngineOptions, EngineResult, ViewConfig,
    ViewMode, ViewState, ViewTransform,
};
pub use graph::{
    build_graph, AnalysisMethod, BoardId, Card, CardCategory, CardId, CardPair, EdgeFilter,
    Graph, GraphEdge, GraphMetrics, GraphNode, MetricWeights, NewRelationship, NodeFilter,
    Relationship, RelationshipType, SizeClass,
};
pub use layout::{CanvasBounds, LayoutConfig, LayoutSession, Position};
pub use storage::{CardStore, StoreError, StoreResult};
pub use suggest::{
    gather_candidates, AnalysisCallError, AnalysisCallResult, AnalysisCandidate, AnalysisError,
    AnalysisMode, AnalysisOutcome, AnalysisProvider, AnalysisRequest, Suggestion,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
