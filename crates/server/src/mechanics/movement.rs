//! Cell movement toward a target point.

use crate::collision::clamp_to_arena;
use crate::world::World;
use glam::Vec2;
use protocol::{CellId, PlayerId};

/// Step every cell of `owner` toward `target` by at most its own speed, then
/// clamp it to the arena. Returns the cells whose position changed.
pub fn move_toward(world: &mut World, owner: PlayerId, target: Vec2, player_speed: f32) -> Vec<CellId> {
    let border = world.border;
    let mut moved = Vec::new();

    for id in world.cell_ids_of(owner) {
        let Some(cell) = world.get_cell_mut(id) else {
            continue;
        };

        let delta = target - cell.position;
        let distance = delta.length();
        let step = cell.calculate_speed(player_speed);
        let next = if distance <= step {
            target
        } else {
            cell.position + delta / distance * step
        };
        let next = clamp_to_arena(next, cell.size, &border);

        if next != cell.position {
            cell.position = next;
            moved.push(id);
        }
    }

    moved
}
