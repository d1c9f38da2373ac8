//! Analysis engine
//!
//! The interaction controller of the analysis view: owns the current
//! graph snapshot, cluster partition, layout session, candidate
//! suggestions, and transient view state, and exposes the discrete
//! command surface the host drives. Layout and clustering are
//! recomputed only on demand, never implicitly after the first stable
//! layout. Analysis runs carry a generation token so responses from
//! superseded runs are discarded.

pub mod view;

use crate::cluster::{detect_clusters, Cluster, ClusterPartition};
use crate::graph::{
    build_graph, AnalysisMethod, BoardId, Card, CardId, CardPair, EdgeFilter, Graph,
    MetricWeights, NewRelationship, NodeFilter, Relationship,
};
use crate::layout::{LayoutConfig, LayoutSession, Position};
use crate::storage::{CardStore, StoreError};
use crate::suggest::{
    aggregator, gather_candidates, AnalysisError, AnalysisMode, AnalysisOutcome, AnalysisProvider,
    AnalysisRequest, Suggestion,
};
use chrono::Utc;
use futures::future::join_all;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

pub use view::{ViewState, ViewTransform};

/// Errors surfaced by engine commands
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Rendering mode of the analysis view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Network,
    Clusters,
}

/// The engine's accepted configuration shape
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewConfig {
    pub view_mode: ViewMode,
    pub edge_filter: EdgeFilter,
    pub node_filter: NodeFilter,
}

/// Construction-time options
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub view: ViewConfig,
    pub weights: MetricWeights,
    pub layout: LayoutConfig,
    /// Seed for the layout's random source, so placements are reproducible
    pub layout_seed: u64,
    pub cluster_threshold: f64,
    pub threshold_filtering: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            view: ViewConfig::default(),
            weights: MetricWeights::default(),
            layout: LayoutConfig::default(),
            layout_seed: 0,
            cluster_threshold: 0.3,
            threshold_filtering: true,
        }
    }
}

/// Result of a bulk approval: which pairs were persisted, which failed.
///
/// A partially failed batch is not an opaque whole-batch failure: the
/// report carries both sides so the host can say "7 created, 2 failed".
#[derive(Debug, Default)]
pub struct ApprovalReport {
    pub created: Vec<Relationship>,
    pub failed: Vec<(CardPair, StoreError)>,
}

impl ApprovalReport {
    pub fn approved_count(&self) -> usize {
        self.created.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// The analysis-view engine
pub struct AnalysisEngine<S: CardStore> {
    store: Arc<S>,
    board_id: BoardId,
    config: ViewConfig,
    weights: MetricWeights,
    layout: LayoutSession,
    cluster_threshold: f64,
    threshold_filtering: bool,

    /// Latest inputs fetched from the store
    cards: Vec<Card>,
    relationships: Vec<Relationship>,

    graph: Graph,
    partition: ClusterPartition,
    suggestions: Vec<Suggestion>,
    view: ViewState,

    /// Monotonic analysis generation; bumped on every run start and on
    /// every card-set refresh so stale outcomes are discarded
    generation: u64,
    last_analysis_at: Option<chrono::DateTime<Utc>>,
}

impl<S: CardStore> AnalysisEngine<S> {
    pub fn new(store: Arc<S>, board_id: BoardId) -> Self {
        Self::with_options(store, board_id, EngineOptions::default())
    }

    pub fn with_options(store: Arc<S>, board_id: BoardId, options: EngineOptions) -> Self {
        AnalysisEngine {
            store,
            board_id,
            config: options.view,
            weights: options.weights,
            layout: LayoutSession::new(options.layout, options.layout_seed),
            cluster_threshold: options.cluster_threshold.clamp(0.0, 1.0),
            threshold_filtering: options.threshold_filtering,
            cards: Vec::new(),
            relationships: Vec::new(),
            graph: Graph::empty(),
            partition: ClusterPartition::default(),
            suggestions: Vec::new(),
            view: ViewState::default(),
            generation: 0,
            last_analysis_at: None,
        }
    }

    // ----- read surface -----

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.partition.clusters
    }

    pub fn isolated(&self) -> &[CardId] {
        &self.partition.isolated
    }

    pub fn partition(&self) -> &ClusterPartition {
        &self.partition
    }

    pub fn positions(&self) -> &HashMap<CardId, Position> {
        self.layout.positions()
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn cluster_threshold(&self) -> f64 {
        self.cluster_threshold
    }

    pub fn threshold_filtering(&self) -> bool {
        self.threshold_filtering
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewState {
        &mut self.view
    }

    // ----- graph commands -----

    /// Refetch cards and relationships from the store and rebuild the
    /// graph. Surviving nodes keep their positions; pending analysis
    /// outcomes become stale.
    pub async fn rebuild_graph(&mut self) -> EngineResult<()> {
        let cards = self.store.list_cards(&self.board_id).await?;
        let relationships = self.store.list_relationships(&self.board_id).await?;
        self.cards = cards;
        self.relationships = relationships;
        self.generation += 1;
        self.rebuild_from_cache();
        Ok(())
    }

    /// Scatter-place the whole graph anew (explicit reset command)
    pub fn reset_layout(&mut self) {
        self.layout.reset_organic(&self.graph);
    }

    /// Cluster-anchored placement of the current graph (explicit command)
    pub fn auto_layout(&mut self) {
        self.recluster();
        self.layout.auto_layout(&self.graph, &self.partition);
    }

    /// Set the cluster strength threshold, clamped to `[0, 1]`, and
    /// recompute the partition. Safe to call repeatedly (slider drags);
    /// each call fully replaces the previous partition.
    pub fn set_cluster_threshold(&mut self, value: f64) {
        self.cluster_threshold = value.clamp(0.0, 1.0);
        self.recluster();
    }

    pub fn toggle_threshold_filtering(&mut self, enabled: bool) {
        self.threshold_filtering = enabled;
        self.recluster();
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.config.view_mode = mode;
    }

    pub fn set_node_filter(&mut self, filter: NodeFilter) {
        self.config.node_filter = filter;
        self.rebuild_from_cache();
    }

    pub fn set_edge_filter(&mut self, filter: EdgeFilter) {
        self.config.edge_filter = filter;
        self.rebuild_from_cache();
    }

    fn rebuild_from_cache(&mut self) {
        self.graph = build_graph(
            &self.cards,
            &self.relationships,
            &self.config.node_filter,
            &self.config.edge_filter,
            &self.weights,
            Utc::now(),
        );
        self.layout.ensure_positions(&self.graph);
        self.recluster();
        if let Some(selected) = &self.view.selected {
            if !self.graph.contains(selected) {
                self.view.selected = None;
            }
        }
    }

    fn recluster(&mut self) {
        self.partition =
            detect_clusters(&self.graph, self.cluster_threshold, self.threshold_filtering);
    }

    // ----- analysis commands -----

    /// Start an analysis run: bump the generation and snapshot the
    /// inputs. Incremental mode covers only cards updated since the last
    /// applied run; the first run is always effectively full.
    pub fn analysis_request(&mut self, mode: AnalysisMode) -> AnalysisRequest {
        self.generation += 1;
        let cards = match (mode, self.last_analysis_at) {
            (AnalysisMode::Incremental, Some(since)) => self
                .cards
                .iter()
                .filter(|card| card.updated_at > since)
                .cloned()
                .collect(),
            _ => self.cards.clone(),
        };
        AnalysisRequest {
            generation: self.generation,
            mode,
            cards,
            relationships: self.relationships.clone(),
        }
    }

    /// Apply the outcome of an analysis run.
    ///
    /// Outcomes from superseded generations are rejected; a run where
    /// all three methods failed surfaces as one terminal error. On
    /// success the candidate list is replaced with the merged, ranked,
    /// already-filtered suggestions and the count is returned.
    pub fn apply_analysis(&mut self, outcome: AnalysisOutcome) -> Result<usize, AnalysisError> {
        if outcome.generation != self.generation {
            return Err(AnalysisError::Superseded {
                requested: outcome.generation,
                current: self.generation,
            });
        }
        if outcome.all_failed() {
            return Err(AnalysisError::AllMethodsFailed(outcome.failure_summary()));
        }

        let suggestions = aggregator::assemble(outcome, &self.relationships);
        info!(
            count = suggestions.len(),
            generation = self.generation,
            "analysis run applied"
        );
        self.suggestions = suggestions;
        self.last_analysis_at = Some(Utc::now());
        Ok(self.suggestions.len())
    }

    /// Convenience wrapper: request, gather concurrently, apply
    pub async fn run_analysis<A: AnalysisProvider>(
        &mut self,
        provider: &A,
        mode: AnalysisMode,
    ) -> Result<usize, AnalysisError> {
        let request = self.analysis_request(mode);
        let outcome = gather_candidates(provider, &request).await;
        self.apply_analysis(outcome)
    }

    // ----- suggestion commands -----

    /// Approve one suggestion: persist it and drop it from the list.
    /// Returns `None` when no candidate matches the pair. On a storage
    /// failure the candidate stays in the list.
    pub async fn approve_suggestion(
        &mut self,
        pair: &CardPair,
    ) -> Result<Option<Relationship>, StoreError> {
        let Some(index) = self.suggestions.iter().position(|s| &s.pair() == pair) else {
            return Ok(None);
        };
        let request = self.creation_request(&self.suggestions[index]);
        let created = self.store.create_relationship(request).await?;
        self.suggestions.remove(index);
        self.relationships.push(created.clone());
        Ok(Some(created))
    }

    /// Approve every candidate currently in the list
    pub async fn approve_all_suggestions(&mut self) -> ApprovalReport {
        self.approve_batch(|_| true).await
    }

    /// Approve every candidate produced by one method
    pub async fn approve_method_suggestions(&mut self, method: AnalysisMethod) -> ApprovalReport {
        self.approve_batch(|s| s.method == method).await
    }

    /// Remove one candidate without persisting it
    pub fn reject_suggestion(&mut self, pair: &CardPair) -> bool {
        let before = self.suggestions.len();
        self.suggestions.retain(|s| &s.pair() != pair);
        self.suggestions.len() != before
    }

    /// Remove every candidate produced by one method
    pub fn reject_method_suggestions(&mut self, method: AnalysisMethod) -> usize {
        let before = self.suggestions.len();
        self.suggestions.retain(|s| s.method != method);
        before - self.suggestions.len()
    }

    /// Clear the candidate list
    pub fn reject_all_suggestions(&mut self) -> usize {
        let count = self.suggestions.len();
        self.suggestions.clear();
        count
    }

    /// Issue the creation calls for the selected candidates concurrently
    /// and wait for the whole batch before touching the candidate list:
    /// successes leave the list, failures stay for another attempt.
    async fn approve_batch(&mut self, select: impl Fn(&Suggestion) -> bool) -> ApprovalReport {
        let selected: Vec<Suggestion> =
            self.suggestions.iter().filter(|s| select(s)).cloned().collect();
        if selected.is_empty() {
            return ApprovalReport::default();
        }

        let calls = selected.iter().map(|suggestion| {
            let store = Arc::clone(&self.store);
            let request = self.creation_request(suggestion);
            async move { store.create_relationship(request).await }
        });
        let results = join_all(calls).await;

        let mut report = ApprovalReport::default();
        let mut persisted: FxHashSet<CardPair> = FxHashSet::default();
        for (suggestion, result) in selected.iter().zip(results) {
            match result {
                Ok(created) => {
                    persisted.insert(suggestion.pair());
                    self.relationships.push(created.clone());
                    report.created.push(created);
                }
                Err(error) => report.failed.push((suggestion.pair(), error)),
            }
        }
        self.suggestions.retain(|s| !persisted.contains(&s.pair()));

        info!(
            approved = report.approved_count(),
            failed = report.failed_count(),
            "bulk approval settled"
        );
        report
    }

    fn creation_request(&self, suggestion: &Suggestion) -> NewRelationship {
        NewRelationship {
            board_id: self.board_id.clone(),
            source_card_id: suggestion.source_card_id.clone(),
            target_card_id: suggestion.target_card_id.clone(),
            relationship_type: suggestion.relationship_type,
            strength: suggestion.suggested_strength,
            confidence: suggestion.confidence,
            metadata: json!({
                "method": suggestion.method,
                "similarity": suggestion.similarity,
                "explanation": suggestion.explanation,
            }),
        }
    }
}
