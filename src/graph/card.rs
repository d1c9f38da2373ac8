//! Wire shapes exchanged with the storage collaborator
//!
//! Cards and relationships are owned by the row store; the engine only
//! reads them and, on suggestion approval, asks the store to create new
//! relationships.

use super::types::{BoardId, CardCategory, CardId, CardPair, RelationshipType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A content card as returned by `CardStore::list_cards`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub title: String,
    pub content: String,
    /// Board column the card lives in
    #[serde(rename = "columnType")]
    pub category: CardCategory,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    pub fn new(id: impl Into<CardId>, title: impl Into<String>, category: CardCategory) -> Self {
        let now = Utc::now();
        Card {
            id: id.into(),
            title: title.into(),
            content: String::new(),
            category,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Whole days since the card was last touched, floored at zero
    pub fn days_since_update(&self, now: DateTime<Utc>) -> f64 {
        let secs = (now - self.updated_at).num_seconds().max(0) as f64;
        secs / 86_400.0
    }
}

/// A persisted relationship between two cards.
///
/// Stored directionally (`card_id` -> `related_card_id`) for provenance;
/// clustering and layout treat it as undirected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    pub card_id: CardId,
    pub related_card_id: CardId,
    /// Strength in `[0, 1]`
    pub strength: f64,
    pub relationship_type: RelationshipType,
}

impl Relationship {
    pub fn new(
        card_id: impl Into<CardId>,
        related_card_id: impl Into<CardId>,
        strength: f64,
        relationship_type: RelationshipType,
    ) -> Self {
        Relationship {
            card_id: card_id.into(),
            related_card_id: related_card_id.into(),
            strength: strength.clamp(0.0, 1.0),
            relationship_type,
        }
    }

    /// Canonical unordered endpoint pair
    pub fn pair(&self) -> CardPair {
        CardPair::new(self.card_id.clone(), self.related_card_id.clone())
    }
}

/// Payload for `CardStore::create_relationship`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRelationship {
    pub board_id: BoardId,
    pub source_card_id: CardId,
    pub target_card_id: CardId,
    pub relationship_type: RelationshipType,
    pub strength: f64,
    pub confidence: f64,
    /// Free-form provenance forwarded to the store (e.g. method, explanation)
    pub metadata: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_days_since_update() {
        let mut card = Card::new("c1", "Title", CardCategory::Insight);
        let now = Utc::now();
        card.updated_at = now - Duration::days(3);
        let days = card.days_since_update(now);
        assert!((days - 3.0).abs() < 0.01);

        // Updated "in the future" floors at zero
        card.updated_at = now + Duration::days(1);
        assert_eq!(card.days_since_update(now), 0.0);
    }

    #[test]
    fn test_relationship_strength_clamped() {
        let rel = Relationship::new("a", "b", 1.7, RelationshipType::Supports);
        assert_eq!(rel.strength, 1.0);
        let rel = Relationship::new("a", "b", -0.2, RelationshipType::Supports);
        assert_eq!(rel.strength, 0.0);
    }

    #[test]
    fn test_relationship_pair_is_canonical() {
        let fwd = Relationship::new("x", "y", 0.5, RelationshipType::RelatesTo);
        let rev = Relationship::new("y", "x", 0.5, RelationshipType::RelatesTo);
        assert_eq!(fwd.pair(), rev.pair());
    }

    #[test]
    fn test_card_column_type_field_name() {
        let card = Card::new("c1", "Title", CardCategory::Question);
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["columnType"], "question");
    }
}
