//! Storage collaborator boundary
//!
//! Cards and relationships live in an external row store reachable
//! through a data-access API. The engine only lists them and, on
//! suggestion approval, asks for new relationships to be created. No
//! retries happen here: retry policy, if any, belongs to the
//! collaborator, and errors propagate typed so the host can render them.

use crate::graph::{BoardId, Card, NewRelationship, Relationship};
use async_trait::async_trait;
use thiserror::Error;

/// Storage-call failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("board {0} not found")]
    BoardNotFound(BoardId),

    #[error("card {0} not found")]
    CardNotFound(crate::graph::CardId),

    #[error("storage API error: {0}")]
    Api(String),

    #[error("network error: {0}")]
    Network(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Data-access API of the row store
#[async_trait]
pub trait CardStore: Send + Sync {
    /// All cards of a board
    async fn list_cards(&self, board_id: &BoardId) -> StoreResult<Vec<Card>>;

    /// All persisted relationships of a board
    async fn list_relationships(&self, board_id: &BoardId) -> StoreResult<Vec<Relationship>>;

    /// Persist one new relationship and return the stored row
    async fn create_relationship(&self, request: NewRelationship) -> StoreResult<Relationship>;
}
