//! Storage collaborator.
//!
//! The simulator is the authority for decisions; storage is the record of
//! their effects. Each committed operation hands the backend one batch of
//! per-entity changes.

mod memory;

pub use memory::MemoryStore;

use futures_util::future::BoxFuture;
use protocol::{
    CellId, CellRecord, FoodId, FoodRecord, PlayerId, PlayerRecord, RoomId, RoomRecord, Timestamp,
};
use std::time::Duration;
use thiserror::Error;

/// One row-level change.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    PutRoom(RoomRecord),
    /// Cascades to the room's players, their cells, and its food.
    DeleteRoom(RoomId),
    PutPlayer(PlayerRecord),
    /// Cascades to the player's cells.
    DeletePlayer(PlayerId),
    PutCell(CellRecord),
    DeleteCell(CellId),
    PutFood(FoodRecord),
    DeleteFood(FoodId),
    /// Position update. A no-op when the cell row is already gone.
    MoveCell { id: CellId, x: f32, y: f32 },
    /// Activity stamp. A no-op when the player row is already gone.
    TouchPlayer { id: PlayerId, last_active: Timestamp },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorageError {
    #[error("write timed out after {0:?}")]
    Timeout(Duration),

    #[error("{entity} {id} references a missing {parent}")]
    MissingParent {
        entity: &'static str,
        id: uuid::Uuid,
        parent: &'static str,
    },

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// Durable record of room state.
pub trait Storage: Send + Sync {
    /// Apply a batch atomically: either every change lands or none does.
    fn persist<'a>(&'a self, changes: &'a [Change]) -> BoxFuture<'a, Result<(), StorageError>>;
}

/// Persist `changes`, giving up after `timeout`.
pub async fn persist_with_timeout(
    storage: &dyn Storage,
    changes: &[Change],
    timeout: Duration,
) -> Result<(), StorageError> {
    if changes.is_empty() {
        return Ok(());
    }
    match tokio::time::timeout(timeout, storage.persist(changes)).await {
        Ok(result) => result,
        Err(_) => Err(StorageError::Timeout(timeout)),
    }
}
