//! Persisted and externally visible records.
//!
//! These mirror the storage schema one-to-one; the server keeps richer
//! in-memory types and converts at the boundary.

use serde::{Deserialize, Serialize};

use crate::{CellId, Color, FoodId, PlayerId, RoomId, Timestamp};

/// A game room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomRecord {
    pub id: RoomId,
    pub name: String,
    pub max_players: u32,
    pub is_active: bool,
    pub created_at: Timestamp,
}

/// A player inside a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub room_id: RoomId,
    pub name: String,
    pub color: Color,
    pub score: u64,
    pub is_alive: bool,
    pub last_active: Timestamp,
    pub created_at: Timestamp,
}

/// One cell owned by a player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellRecord {
    pub id: CellId,
    pub player_id: PlayerId,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    /// `None` when the cell has no pending merge cooldown.
    pub can_merge_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// A food pellet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodRecord {
    pub id: FoodId,
    pub room_id: RoomId,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub color: Color,
    pub created_at: Timestamp,
}

/// A leaderboard row. Derived on every snapshot, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player_id: PlayerId,
    pub name: String,
    pub score: u64,
}

/// Full externally visible state of a room at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub room: RoomRecord,
    pub players: Vec<PlayerRecord>,
    pub cells: Vec<CellRecord>,
    pub food: Vec<FoodRecord>,
    /// Sorted by score descending, ties by earliest join.
    pub leaderboard: Vec<LeaderboardEntry>,
}
