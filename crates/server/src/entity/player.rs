//! Player session state inside a room.

use protocol::{Color, PlayerId, PlayerRecord, RoomId, Timestamp};

/// A player in a room. Cells are owned through the world's owner index.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Unique player ID.
    pub id: PlayerId,
    /// Player name.
    pub name: String,
    /// Player color.
    pub color: Color,
    /// Accumulated score. Only ever increases.
    pub score: u64,
    pub is_alive: bool,
    /// Last time the player acted.
    pub last_active: Timestamp,
    pub created_at: Timestamp,
    /// Join order within the room, breaks `created_at` ties.
    pub join_seq: u64,
}

impl Player {
    pub fn new(name: String, color: Color, now: Timestamp, join_seq: u64) -> Self {
        Self {
            id: PlayerId::new_v4(),
            name,
            color,
            score: 0,
            is_alive: true,
            last_active: now,
            created_at: now,
            join_seq,
        }
    }

    /// Credit score, saturating rather than wrapping.
    #[inline]
    pub fn award(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
    }

    #[inline]
    pub fn touch(&mut self, now: Timestamp) {
        self.last_active = self.last_active.max(now);
    }

    pub fn to_record(&self, room_id: RoomId) -> PlayerRecord {
        PlayerRecord {
            id: self.id,
            room_id,
            name: self.name.clone(),
            color: self.color,
            score: self.score,
            is_alive: self.is_alive,
            last_active: self.last_active,
            created_at: self.created_at,
        }
    }
}
