//! Spawn placement for joining and respawning players.

use crate::collision::Circle;
use crate::config::PlayerConfig;
use crate::entity::PlayerCell;
use crate::world::World;
use glam::Vec2;
use protocol::{CellId, PlayerId, Timestamp};
use rand::Rng;

/// Pick a spawn position for a cell of `size`.
///
/// Tries up to `attempts` random positions and takes the first one that
/// overlaps no existing cell. When every candidate is crowded the first
/// candidate is used anyway, so a spawn never fails.
pub fn find_spawn_point<R: Rng + ?Sized>(world: &World, size: f32, attempts: usize, rng: &mut R) -> Vec2 {
    let first = world.border.random_position(size, rng);
    if !world.overlaps_any_cell(Circle::new(first, size)) {
        return first;
    }
    for _ in 1..attempts {
        let candidate = world.border.random_position(size, rng);
        if !world.overlaps_any_cell(Circle::new(candidate, size)) {
            return candidate;
        }
    }
    first
}

/// Place a fresh spawn-size cell for `owner`.
pub fn spawn_cell<R: Rng + ?Sized>(
    world: &mut World,
    owner: PlayerId,
    config: &PlayerConfig,
    rng: &mut R,
    now: Timestamp,
) -> CellId {
    let size = config.spawn_size as f32;
    let position = find_spawn_point(world, size, config.spawn_attempts, rng);
    world.add_cell(PlayerCell::new(owner, position, size, now))
}
