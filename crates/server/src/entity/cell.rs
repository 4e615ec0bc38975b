//! Player cell.

use crate::collision::{size_to_radius, Circle};
use glam::Vec2;
use protocol::{CellId, CellRecord, PlayerId, Timestamp};

/// A cell controlled by a player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerCell {
    /// Unique cell ID.
    pub id: CellId,
    /// Owning player. Fixed for the cell's lifetime.
    owner: PlayerId,
    /// Position in world coordinates.
    pub position: Vec2,
    /// Cell mass.
    pub size: f32,
    /// When this cell may merge with a sibling (`None` = no pending cooldown).
    pub can_merge_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl PlayerCell {
    /// Create a new player cell with no merge cooldown.
    pub fn new(owner: PlayerId, position: Vec2, size: f32, now: Timestamp) -> Self {
        Self {
            id: CellId::new_v4(),
            owner,
            position,
            size,
            can_merge_at: None,
            created_at: now,
        }
    }

    #[inline]
    pub fn owner(&self) -> PlayerId {
        self.owner
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        size_to_radius(self.size)
    }

    #[inline]
    pub fn circle(&self) -> Circle {
        Circle::new(self.position, self.size)
    }

    /// Whether this cell may pair with a sibling at `now`. A cell without a
    /// pending cooldown is always ready; a lone cell still has nothing to
    /// pair with.
    #[inline]
    pub fn is_merge_ready(&self, now: Timestamp) -> bool {
        self.can_merge_at.is_none_or(|at| now >= at)
    }

    /// Calculate movement speed based on cell size.
    /// Bigger cells are slower: 2.2 * size^-0.439 * 40, scaled by `player_speed / 30`.
    pub fn calculate_speed(&self, player_speed: f32) -> f32 {
        let base_speed = 2.2 * self.size.powf(-0.439) * 40.0;
        base_speed * (player_speed / 30.0)
    }

    pub fn to_record(&self) -> CellRecord {
        CellRecord {
            id: self.id,
            player_id: self.owner,
            x: self.position.x,
            y: self.position.y,
            size: self.size,
            can_merge_at: self.can_merge_at,
            created_at: self.created_at,
        }
    }
}
