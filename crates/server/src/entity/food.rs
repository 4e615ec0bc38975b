//! Food pellet.

use crate::collision::Circle;
use glam::Vec2;
use protocol::{Color, FoodId, FoodRecord, RoomId, Timestamp};

/// A food pellet that can be eaten by players.
#[derive(Debug, Clone, PartialEq)]
pub struct Food {
    pub id: FoodId,
    pub position: Vec2,
    pub size: f32,
    pub color: Color,
    pub created_at: Timestamp,
}

impl Food {
    /// Create a new food pellet.
    pub fn new(position: Vec2, size: f32, color: Color, now: Timestamp) -> Self {
        Self {
            id: FoodId::new_v4(),
            position,
            size,
            color,
            created_at: now,
        }
    }

    #[inline]
    pub fn circle(&self) -> Circle {
        Circle::new(self.position, self.size)
    }

    pub fn to_record(&self, room_id: RoomId) -> FoodRecord {
        FoodRecord {
            id: self.id,
            room_id,
            x: self.position.x,
            y: self.position.y,
            size: self.size,
            color: self.color,
            created_at: self.created_at,
        }
    }
}
