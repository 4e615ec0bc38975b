//! Mutation operations.
//!
//! Each operation reads and writes one room's [`World`](crate::world::World)
//! and reports what it did. Player bookkeeping (score, life state, activity)
//! is applied by the room simulator from the returned outcome.

mod consume;
mod food;
mod merge;
mod movement;
mod respawn;
mod split;

pub use consume::{consume_food, consume_player, FoodMeal, PlayerMeal};
pub use food::generate_food;
pub use merge::{merge, MergeOutcome};
pub use movement::move_toward;
pub use respawn::{find_spawn_point, spawn_cell};
pub use split::{split, SplitOutcome};

use crate::entity::PlayerCell;
use std::cmp::Ordering;

/// Largest cell first, then lowest id.
pub(crate) fn largest_first(a: &&PlayerCell, b: &&PlayerCell) -> Ordering {
    b.size
        .partial_cmp(&a.size)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.id.cmp(&b.id))
}
