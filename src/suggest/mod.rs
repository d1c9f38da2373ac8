//! Relationship suggestions
//!
//! Candidate relationships arrive from three independent analysis
//! collaborators (embedding similarity, tag-overlap similarity,
//! rule-based derivation). This module defines the collaborator boundary,
//! issues the three calls concurrently with settle-independently
//! semantics, and carries the generation token that lets the engine
//! discard responses from superseded runs. The merge itself lives in
//! [`aggregator`].

pub mod aggregator;

use crate::graph::{AnalysisMethod, Card, CardId, CardPair, Relationship, RelationshipType};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Failure of one analysis method call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisCallError {
    /// Analysis API error
    #[error("analysis API error: {0}")]
    Api(String),

    /// Network error
    #[error("network error: {0}")]
    Network(String),

    /// Response did not match the expected shape
    #[error("malformed analysis response: {0}")]
    Malformed(String),
}

pub type AnalysisCallResult<T> = Result<T, AnalysisCallError>;

/// Analysis-run failures surfaced to the host
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// Every method failed; surfaced as one terminal error, not three
    #[error("all analysis methods failed: {0}")]
    AllMethodsFailed(String),

    /// The outcome belongs to a run that a newer run replaced
    #[error("analysis run {requested} superseded by run {current}")]
    Superseded { requested: u64, current: u64 },
}

/// How much of the board an analysis run covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// Only cards updated since the last applied run
    Incremental,
    /// The whole board
    Full,
}

/// One raw candidate as returned by an analysis collaborator.
///
/// `similarity` and `confidence` may be absent; defaults are filled in
/// per method during aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisCandidate {
    pub source_card_id: CardId,
    pub target_card_id: CardId,
    pub relationship_type: RelationshipType,
    #[serde(default)]
    pub similarity: Option<f64>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub explanation: String,
}

/// Input snapshot handed to the analysis collaborators.
///
/// Stamped with the generation that was current when the run started;
/// outcomes carrying an older generation are discarded by the engine.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub generation: u64,
    pub mode: AnalysisMode,
    /// Cards in scope for this run (already mode-filtered)
    pub cards: Vec<Card>,
    /// The board's full relationship set, for rule derivation
    pub relationships: Vec<Relationship>,
}

/// The three analysis collaborators.
///
/// Each method is independent: the engine issues all three concurrently
/// and accepts whatever subset succeeded.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    async fn embedding_candidates(
        &self,
        request: &AnalysisRequest,
    ) -> AnalysisCallResult<Vec<AnalysisCandidate>>;

    async fn tag_similarity_candidates(
        &self,
        request: &AnalysisRequest,
    ) -> AnalysisCallResult<Vec<AnalysisCandidate>>;

    async fn derived_candidates(
        &self,
        request: &AnalysisRequest,
    ) -> AnalysisCallResult<Vec<AnalysisCandidate>>;
}

/// Per-method results of one analysis run
#[derive(Debug)]
pub struct AnalysisOutcome {
    pub generation: u64,
    pub embedding: AnalysisCallResult<Vec<AnalysisCandidate>>,
    pub tag_similarity: AnalysisCallResult<Vec<AnalysisCandidate>>,
    pub derived: AnalysisCallResult<Vec<AnalysisCandidate>>,
}

impl AnalysisOutcome {
    /// Results in fixed method order
    pub fn methods(
        &self,
    ) -> [(AnalysisMethod, &AnalysisCallResult<Vec<AnalysisCandidate>>); 3] {
        [
            (AnalysisMethod::Embedding, &self.embedding),
            (AnalysisMethod::TagSimilarity, &self.tag_similarity),
            (AnalysisMethod::Derived, &self.derived),
        ]
    }

    pub fn all_failed(&self) -> bool {
        self.methods().iter().all(|(_, result)| result.is_err())
    }

    /// One line per failed method, for the terminal all-failed error
    pub fn failure_summary(&self) -> String {
        self.methods()
            .iter()
            .filter_map(|(method, result)| {
                result
                    .as_ref()
                    .err()
                    .map(|error| format!("{}: {}", method, error))
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Issue the three analysis calls concurrently.
///
/// The calls settle independently: one method failing neither blocks nor
/// invalidates the other two. Failures are logged here; deciding whether
/// the run as a whole failed is the caller's job.
pub async fn gather_candidates<A: AnalysisProvider + ?Sized>(
    provider: &A,
    request: &AnalysisRequest,
) -> AnalysisOutcome {
    let (embedding, tag_similarity, derived) = tokio::join!(
        provider.embedding_candidates(request),
        provider.tag_similarity_candidates(request),
        provider.derived_candidates(request),
    );

    for (method, result) in [
        (AnalysisMethod::Embedding, &embedding),
        (AnalysisMethod::TagSimilarity, &tag_similarity),
        (AnalysisMethod::Derived, &derived),
    ] {
        if let Err(error) = result {
            warn!(%method, %error, "analysis method failed");
        }
    }

    AnalysisOutcome {
        generation: request.generation,
        embedding,
        tag_similarity,
        derived,
    }
}

/// An unconfirmed candidate relationship awaiting operator review.
///
/// Lives only in memory: approval forwards it to the storage collaborator
/// and removes it from the candidate list; rejection just removes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub source_card_id: CardId,
    pub target_card_id: CardId,
    pub method: AnalysisMethod,
    /// Display label of the originating method
    pub method_label: String,
    /// Icon name of the originating method
    pub method_icon: String,
    pub relationship_type: RelationshipType,
    pub similarity: f64,
    /// Confidence in `[0, 1]`
    pub confidence: f64,
    pub suggested_strength: f64,
    pub explanation: String,
}

impl Suggestion {
    /// Build a suggestion from a raw candidate, stamping the method and
    /// filling per-method defaults for absent scores
    pub fn from_candidate(method: AnalysisMethod, candidate: AnalysisCandidate) -> Self {
        let confidence = candidate
            .confidence
            .unwrap_or_else(|| method.default_confidence())
            .clamp(0.0, 1.0);
        let similarity = candidate.similarity.unwrap_or(confidence).clamp(0.0, 1.0);
        Suggestion {
            source_card_id: candidate.source_card_id,
            target_card_id: candidate.target_card_id,
            method,
            method_label: method.label().to_string(),
            method_icon: method.icon().to_string(),
            relationship_type: candidate.relationship_type,
            similarity,
            confidence,
            suggested_strength: similarity,
            explanation: candidate.explanation,
        }
    }

    /// Canonical unordered endpoint pair
    pub fn pair(&self) -> CardPair {
        CardPair::new(self.source_card_id.clone(), self.target_card_id.clone())
    }
}
