//! Core type definitions for the analysis graph

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a card (opaque, assigned by the storage collaborator)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct CardId(String);

impl CardId {
    pub fn new(id: impl Into<String>) -> Self {
        CardId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CardId {
    fn from(id: String) -> Self {
        CardId(id)
    }
}

impl From<&str> for CardId {
    fn from(id: &str) -> Self {
        CardId(id.to_string())
    }
}

/// Unique identifier for a board
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct BoardId(String);

impl BoardId {
    pub fn new(id: impl Into<String>) -> Self {
        BoardId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BoardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BoardId {
    fn from(id: &str) -> Self {
        BoardId(id.to_string())
    }
}

/// Canonical unordered pair of card ids.
///
/// `(a, b)` and `(b, a)` normalize to the same value, so this is the key
/// for suggestion deduplication, existing-relationship checks, and
/// approval commands.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct CardPair(CardId, CardId);

impl CardPair {
    pub fn new(a: CardId, b: CardId) -> Self {
        if a <= b {
            CardPair(a, b)
        } else {
            CardPair(b, a)
        }
    }

    pub fn first(&self) -> &CardId {
        &self.0
    }

    pub fn second(&self) -> &CardId {
        &self.1
    }

    pub fn contains(&self, id: &CardId) -> bool {
        &self.0 == id || &self.1 == id
    }
}

impl fmt::Display for CardPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.0, self.1)
    }
}

/// Card category (board column type).
///
/// Closed set: the five column types a board can hold. Category weight
/// feeds the importance score; the most-synthesized category ranks
/// highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum CardCategory {
    Synthesis,
    Insight,
    Question,
    Observation,
    Reference,
}

impl CardCategory {
    pub const ALL: [CardCategory; 5] = [
        CardCategory::Synthesis,
        CardCategory::Insight,
        CardCategory::Question,
        CardCategory::Observation,
        CardCategory::Reference,
    ];

    /// Importance weight for this category (product tuning, see `MetricWeights`)
    pub fn weight(&self) -> f64 {
        match self {
            CardCategory::Synthesis => 5.0,
            CardCategory::Insight => 4.0,
            CardCategory::Question => 3.0,
            CardCategory::Observation => 2.0,
            CardCategory::Reference => 1.0,
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            CardCategory::Synthesis => "Synthesis",
            CardCategory::Insight => "Insight",
            CardCategory::Question => "Question",
            CardCategory::Observation => "Observation",
            CardCategory::Reference => "Reference",
        }
    }

    /// Node color for the rendering collaborator
    pub fn color(&self) -> &'static str {
        match self {
            CardCategory::Synthesis => "#8b5cf6",
            CardCategory::Insight => "#f59e0b",
            CardCategory::Question => "#3b82f6",
            CardCategory::Observation => "#10b981",
            CardCategory::Reference => "#6b7280",
        }
    }
}

impl fmt::Display for CardCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Relationship type between two cards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    Supports,
    Contradicts,
    RelatesTo,
    Duplicates,
    Elaborates,
}

impl RelationshipType {
    pub const ALL: [RelationshipType; 5] = [
        RelationshipType::Supports,
        RelationshipType::Contradicts,
        RelationshipType::RelatesTo,
        RelationshipType::Duplicates,
        RelationshipType::Elaborates,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RelationshipType::Supports => "supports",
            RelationshipType::Contradicts => "contradicts",
            RelationshipType::RelatesTo => "relates to",
            RelationshipType::Duplicates => "duplicates",
            RelationshipType::Elaborates => "elaborates",
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Analysis method that produced a relationship suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMethod {
    Embedding,
    TagSimilarity,
    Derived,
}

impl AnalysisMethod {
    pub const ALL: [AnalysisMethod; 3] = [
        AnalysisMethod::Embedding,
        AnalysisMethod::TagSimilarity,
        AnalysisMethod::Derived,
    ];

    /// Display label shown next to a suggestion
    pub fn label(&self) -> &'static str {
        match self {
            AnalysisMethod::Embedding => "Semantic similarity",
            AnalysisMethod::TagSimilarity => "Shared tags",
            AnalysisMethod::Derived => "Rule derivation",
        }
    }

    /// Icon name for the rendering collaborator
    pub fn icon(&self) -> &'static str {
        match self {
            AnalysisMethod::Embedding => "sparkles",
            AnalysisMethod::TagSimilarity => "tags",
            AnalysisMethod::Derived => "git-branch",
        }
    }

    /// Confidence assigned when the analysis result omits one
    pub fn default_confidence(&self) -> f64 {
        match self {
            AnalysisMethod::Embedding => 0.7,
            AnalysisMethod::TagSimilarity => 0.6,
            AnalysisMethod::Derived => 0.6,
        }
    }
}

impl fmt::Display for AnalysisMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnalysisMethod::Embedding => "embedding",
            AnalysisMethod::TagSimilarity => "tag_similarity",
            AnalysisMethod::Derived => "derived",
        };
        write!(f, "{}", name)
    }
}

/// Node size class, a step function of the importance score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SizeClass {
    Small,
    Medium,
    Large,
    ExtraLarge,
}

impl SizeClass {
    /// Band the importance score into one of the four classes.
    ///
    /// `bands` are the three ascending cut points between the classes.
    pub fn from_importance(score: f64, bands: [f64; 3]) -> Self {
        if score < bands[0] {
            SizeClass::Small
        } else if score < bands[1] {
            SizeClass::Medium
        } else if score < bands[2] {
            SizeClass::Large
        } else {
            SizeClass::ExtraLarge
        }
    }

    /// Node diameter in canvas units
    pub fn diameter(&self) -> f64 {
        match self {
            SizeClass::Small => 40.0,
            SizeClass::Medium => 55.0,
            SizeClass::Large => 70.0,
            SizeClass::ExtraLarge => 85.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_id() {
        let id = CardId::new("card-42");
        assert_eq!(id.as_str(), "card-42");
        assert_eq!(format!("{}", id), "card-42");

        let id2: CardId = "card-100".into();
        assert_ne!(id, id2);
    }

    #[test]
    fn test_card_pair_is_unordered() {
        let ab = CardPair::new(CardId::new("a"), CardId::new("b"));
        let ba = CardPair::new(CardId::new("b"), CardId::new("a"));
        assert_eq!(ab, ba);
        assert_eq!(ab.first().as_str(), "a");
        assert_eq!(ab.second().as_str(), "b");
        assert!(ab.contains(&CardId::new("a")));
        assert!(!ab.contains(&CardId::new("c")));
    }

    #[test]
    fn test_category_weights_descend() {
        let weights: Vec<f64> = CardCategory::ALL.iter().map(|c| c.weight()).collect();
        for pair in weights.windows(2) {
            assert!(pair[0] > pair[1]);
        }
        assert_eq!(CardCategory::Synthesis.weight(), 5.0);
        assert_eq!(CardCategory::Reference.weight(), 1.0);
    }

    #[test]
    fn test_method_defaults() {
        assert_eq!(AnalysisMethod::Embedding.default_confidence(), 0.7);
        assert_eq!(AnalysisMethod::TagSimilarity.default_confidence(), 0.6);
        assert_eq!(AnalysisMethod::Derived.default_confidence(), 0.6);
        assert_eq!(format!("{}", AnalysisMethod::TagSimilarity), "tag_similarity");
    }

    #[test]
    fn test_size_class_bands() {
        let bands = [1.2, 2.2, 3.2];
        assert_eq!(SizeClass::from_importance(0.5, bands), SizeClass::Small);
        assert_eq!(SizeClass::from_importance(1.2, bands), SizeClass::Medium);
        assert_eq!(SizeClass::from_importance(2.9, bands), SizeClass::Large);
        assert_eq!(SizeClass::from_importance(9.0, bands), SizeClass::ExtraLarge);
        assert!(SizeClass::Small.diameter() < SizeClass::ExtraLarge.diameter());
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&CardCategory::Insight).unwrap();
        assert_eq!(json, "\"insight\"");
        let method: AnalysisMethod = serde_json::from_str("\"tag_similarity\"").unwrap();
        assert_eq!(method, AnalysisMethod::TagSimilarity);
    }
}
