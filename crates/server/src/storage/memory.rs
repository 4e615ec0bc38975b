//! In-process storage backend.
//!
//! Keeps the four tables in ordered maps and enforces the same foreign keys
//! and cascades a relational schema would.

use super::{Change, Storage, StorageError};
use futures_util::future::BoxFuture;
use protocol::{
    CellId, CellRecord, FoodId, FoodRecord, PlayerId, PlayerRecord, RoomId, RoomRecord,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Clone, Default)]
struct Tables {
    rooms: BTreeMap<RoomId, RoomRecord>,
    players: BTreeMap<PlayerId, PlayerRecord>,
    cells: BTreeMap<CellId, CellRecord>,
    food: BTreeMap<FoodId, FoodRecord>,
}

impl Tables {
    fn apply(&mut self, change: &Change) -> Result<(), StorageError> {
        match change {
            Change::PutRoom(room) => {
                self.rooms.insert(room.id, room.clone());
            }
            Change::DeleteRoom(id) => {
                self.rooms.remove(id);
                let players: Vec<PlayerId> = self
                    .players
                    .values()
                    .filter(|p| p.room_id == *id)
                    .map(|p| p.id)
                    .collect();
                for player in players {
                    self.delete_player(player);
                }
                self.food.retain(|_, f| f.room_id != *id);
            }
            Change::PutPlayer(player) => {
                if !self.rooms.contains_key(&player.room_id) {
                    return Err(StorageError::MissingParent { entity: "player", id: player.id, parent: "room" });
                }
                self.players.insert(player.id, player.clone());
            }
            Change::DeletePlayer(id) => self.delete_player(*id),
            Change::PutCell(cell) => {
                if !self.players.contains_key(&cell.player_id) {
                    return Err(StorageError::MissingParent { entity: "cell", id: cell.id, parent: "player" });
                }
                self.cells.insert(cell.id, cell.clone());
            }
            Change::DeleteCell(id) => {
                self.cells.remove(id);
            }
            Change::PutFood(food) => {
                if !self.rooms.contains_key(&food.room_id) {
                    return Err(StorageError::MissingParent { entity: "food", id: food.id, parent: "room" });
                }
                self.food.insert(food.id, food.clone());
            }
            Change::DeleteFood(id) => {
                self.food.remove(id);
            }
            Change::MoveCell { id, x, y } => {
                if let Some(cell) = self.cells.get_mut(id) {
                    cell.x = *x;
                    cell.y = *y;
                }
            }
            Change::TouchPlayer { id, last_active } => {
                if let Some(player) = self.players.get_mut(id) {
                    player.last_active = player.last_active.max(*last_active);
                }
            }
        }
        Ok(())
    }

    fn delete_player(&mut self, id: PlayerId) {
        self.players.remove(&id);
        self.cells.retain(|_, c| c.player_id != id);
    }
}

/// Storage backed by process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    failing: AtomicBool,
    latency_ms: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following write fail with `Unavailable`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Delay every following write by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms.store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        // A panic mid-apply never leaves partial state: batches are applied to a copy.
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn room(&self, id: RoomId) -> Option<RoomRecord> {
        self.tables().rooms.get(&id).cloned()
    }

    pub fn rooms(&self) -> Vec<RoomRecord> {
        self.tables().rooms.values().cloned().collect()
    }

    pub fn player(&self, id: PlayerId) -> Option<PlayerRecord> {
        self.tables().players.get(&id).cloned()
    }

    pub fn players(&self) -> Vec<PlayerRecord> {
        self.tables().players.values().cloned().collect()
    }

    pub fn cells(&self) -> Vec<CellRecord> {
        self.tables().cells.values().cloned().collect()
    }

    pub fn food(&self) -> Vec<FoodRecord> {
        self.tables().food.values().cloned().collect()
    }
}

impl Storage for MemoryStore {
    fn persist<'a>(&'a self, changes: &'a [Change]) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            let latency = self.latency_ms.load(Ordering::SeqCst);
            if latency > 0 {
                tokio::time::sleep(Duration::from_millis(latency)).await;
            }
            if self.failing.load(Ordering::SeqCst) {
                return Err(StorageError::Unavailable("memory store set to fail".into()));
            }

            let mut tables = self.tables();
            let mut next = tables.clone();
            for change in changes {
                next.apply(change)?;
            }
            *tables = next;
            Ok(())
        })
    }
}
