//! Food spawning.

use crate::config::FoodConfig;
use crate::entity::Food;
use crate::world::World;
use protocol::{FoodId, Timestamp};
use rand::Rng;
use rand::seq::IndexedRandom;

/// Spawn `count` pellets at random positions inside the arena.
///
/// Each pellet takes a color from the configured palette. Returns the new ids
/// in spawn order.
pub fn generate_food<R: Rng + ?Sized>(
    world: &mut World,
    count: usize,
    config: &FoodConfig,
    rng: &mut R,
    now: Timestamp,
) -> Vec<FoodId> {
    let size = config.size as f32;
    let mut spawned = Vec::with_capacity(count);
    for _ in 0..count {
        let position = world.border.random_position(size, rng);
        let color = config.colors.choose(rng).copied().unwrap_or_default();
        spawned.push(world.add_food(Food::new(position, size, color, now)));
    }
    spawned
}
