//! Split: halve eligible cells and eject the halves along a direction.

use super::largest_first;
use crate::collision::clamp_to_arena;
use crate::config::PlayerConfig;
use crate::entity::PlayerCell;
use crate::error::GameError;
use crate::world::World;
use glam::Vec2;
use protocol::{CellId, PlayerId, Timestamp};

/// Parent/child pairs created by a split.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitOutcome {
    pub created: Vec<(CellId, CellId)>,
}

/// Split every cell of `owner` with size at least `min_split_size`, largest
/// first, while the owner stays under `max_cells`.
///
/// Each parent keeps half its mass and the new sibling takes the other half,
/// placed `split_distance` away along `direction` and clamped to the arena.
/// Both get a merge cooldown of `merge_cooldown` from `now`.
pub fn split(
    world: &mut World,
    owner: PlayerId,
    direction: Vec2,
    config: &PlayerConfig,
    now: Timestamp,
) -> Result<SplitOutcome, GameError> {
    if !direction.is_finite() || direction.length_squared() == 0.0 {
        return Err(GameError::InvalidDirection);
    }
    let direction = direction.normalize();

    let max_cells = config.max_cells;
    let min_split_size = config.min_split_size as f32;
    let split_distance = config.split_distance as f32;
    let can_merge_at = now + config.merge_cooldown_duration().as_millis() as Timestamp;

    let mut cell_count = world.cell_count_of(owner);
    if cell_count >= max_cells {
        return Err(GameError::SplitNotAllowed);
    }

    // Collect cells that can split
    let mut eligible: Vec<&PlayerCell> = world
        .cells_of(owner)
        .filter(|c| c.size >= min_split_size)
        .collect();
    eligible.sort_by(largest_first);
    let eligible: Vec<CellId> = eligible.into_iter().map(|c| c.id).collect();

    if eligible.is_empty() {
        return Err(GameError::SplitNotAllowed);
    }

    let border = world.border;
    let mut outcome = SplitOutcome::default();

    for parent_id in eligible {
        if cell_count >= max_cells {
            break;
        }

        let Some(parent) = world.get_cell_mut(parent_id) else {
            continue;
        };

        let parent_size = parent.size / 2.0;
        let child_size = parent.size - parent_size;
        parent.size = parent_size;
        parent.can_merge_at = Some(can_merge_at);

        let ejected = parent.position + direction * split_distance;
        let position = clamp_to_arena(ejected, child_size, &border);

        let mut child = PlayerCell::new(owner, position, child_size, now);
        child.can_merge_at = Some(can_merge_at);
        let child_id = world.add_cell(child);

        outcome.created.push((parent_id, child_id));
        cell_count += 1;
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PlayerConfig {
        PlayerConfig::default()
    }

    #[test]
    fn test_split_conserves_mass_and_sets_cooldown() {
        let mut world = World::new(2000.0, 2000.0);
        let owner = PlayerId::new_v4();
        let parent = world.add_cell(PlayerCell::new(owner, Vec2::ZERO, 50.0, 0));

        let outcome = split(&mut world, owner, Vec2::new(1.0, 0.0), &config(), 1_000).unwrap();
        assert_eq!(outcome.created.len(), 1);
        let (p, child) = outcome.created[0];
        assert_eq!(p, parent);

        assert_eq!(world.cell_count_of(owner), 2);
        assert_eq!(world.mass_of(owner), 50.0);

        let parent = world.get_cell(parent).unwrap();
        let child = world.get_cell(child).unwrap();
        assert_eq!(parent.size, 25.0);
        assert_eq!(child.size, 25.0);
        assert_eq!(parent.can_merge_at, Some(16_000));
        assert_eq!(child.can_merge_at, Some(16_000));
        assert_eq!(child.position, Vec2::new(120.0, 0.0));
    }

    #[test]
    fn test_direction_is_normalized() {
        let mut world = World::new(2000.0, 2000.0);
        let owner = PlayerId::new_v4();
        world.add_cell(PlayerCell::new(owner, Vec2::ZERO, 50.0, 0));
        let outcome = split(&mut world, owner, Vec2::new(0.3, 0.4), &config(), 0).unwrap();
        let child = world.get_cell(outcome.created[0].1).unwrap();
        assert!((child.position - Vec2::new(72.0, 96.0)).length() < 1e-3);
    }

    #[test]
    fn test_zero_direction_is_rejected() {
        let mut world = World::new(2000.0, 2000.0);
        let owner = PlayerId::new_v4();
        world.add_cell(PlayerCell::new(owner, Vec2::ZERO, 50.0, 0));
        let before = world.clone();
        assert!(matches!(
            split(&mut world, owner, Vec2::ZERO, &config(), 0),
            Err(GameError::InvalidDirection)
        ));
        assert_eq!(world, before);
    }

    #[test]
    fn test_small_cells_cannot_split() {
        let mut world = World::new(2000.0, 2000.0);
        let owner = PlayerId::new_v4();
        world.add_cell(PlayerCell::new(owner, Vec2::ZERO, 20.0, 0));
        assert!(matches!(
            split(&mut world, owner, Vec2::X, &config(), 0),
            Err(GameError::SplitNotAllowed)
        ));
    }

    #[test]
    fn test_split_stops_at_max_cells() {
        let mut world = World::new(4000.0, 4000.0);
        let owner = PlayerId::new_v4();
        let mut config = config();
        config.max_cells = 3;
        let big = world.add_cell(PlayerCell::new(owner, Vec2::new(-500.0, 0.0), 400.0, 0));
        world.add_cell(PlayerCell::new(owner, Vec2::new(500.0, 0.0), 100.0, 0));

        let outcome = split(&mut world, owner, Vec2::Y, &config, 0).unwrap();
        // only room for one more cell, and the largest goes first
        assert_eq!(outcome.created.len(), 1);
        assert_eq!(outcome.created[0].0, big);
        assert_eq!(world.cell_count_of(owner), 3);
        assert_eq!(world.mass_of(owner), 500.0);

        assert!(matches!(
            split(&mut world, owner, Vec2::Y, &config, 0),
            Err(GameError::SplitNotAllowed)
        ));
    }

    #[test]
    fn test_child_is_clamped_into_arena() {
        let mut world = World::new(400.0, 400.0);
        let owner = PlayerId::new_v4();
        world.add_cell(PlayerCell::new(owner, Vec2::new(100.0, 0.0), 50.0, 0));
        let outcome = split(&mut world, owner, Vec2::X, &config(), 0).unwrap();
        let child = world.get_cell(outcome.created[0].1).unwrap();
        // radius of 25 is 50
        assert_eq!(child.position, Vec2::new(150.0, 0.0));
    }
}
