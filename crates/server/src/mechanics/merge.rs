//! Merge: recombine sibling cells whose cooldowns have run out.

use crate::collision::{clamp_to_arena, overlaps};
use crate::world::World;
use protocol::{CellId, PlayerId, Timestamp};

/// Survivor/absorbed pairs combined by a merge pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeOutcome {
    pub merged: Vec<(CellId, CellId)>,
}

impl MergeOutcome {
    #[inline]
    pub fn is_noop(&self) -> bool {
        self.merged.is_empty()
    }
}

/// One merge pass over `owner`'s cells.
///
/// Only cells whose split cooldown has elapsed (or that have none) take
/// part. They are visited in ascending id order; each unpaired cell is paired with the first later
/// unpaired cell it overlaps. The lower id
/// survives at the size-weighted centroid with the combined size and no
/// cooldown. Pairs are disjoint, so a cell merges at most once per pass.
pub fn merge(world: &mut World, owner: PlayerId, now: Timestamp) -> MergeOutcome {
    let candidates: Vec<_> = world
        .cells_of(owner)
        .filter(|c| c.is_merge_ready(now))
        .map(|c| (c.id, c.circle()))
        .collect();

    let mut paired = vec![false; candidates.len()];
    let mut pairs = Vec::new();
    for i in 0..candidates.len() {
        if paired[i] {
            continue;
        }
        for j in (i + 1)..candidates.len() {
            if paired[j] || !overlaps(candidates[i].1, candidates[j].1) {
                continue;
            }
            paired[i] = true;
            paired[j] = true;
            pairs.push((candidates[i].0, candidates[j].0));
            break;
        }
    }

    let border = world.border;
    let mut outcome = MergeOutcome::default();
    for (survivor_id, absorbed_id) in pairs {
        let Some(absorbed) = world.remove_cell(absorbed_id) else {
            continue;
        };
        let Some(survivor) = world.get_cell_mut(survivor_id) else {
            continue;
        };

        let size = survivor.size + absorbed.size;
        let centroid = (survivor.position * survivor.size + absorbed.position * absorbed.size) / size;
        survivor.size = size;
        survivor.position = clamp_to_arena(centroid, size, &border);
        survivor.can_merge_at = None;

        outcome.merged.push((survivor_id, absorbed_id));
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::PlayerCell;
    use glam::Vec2;

    fn cell(owner: PlayerId, x: f32, size: f32, can_merge_at: Option<Timestamp>) -> PlayerCell {
        let mut cell = PlayerCell::new(owner, Vec2::new(x, 0.0), size, 0);
        cell.can_merge_at = can_merge_at;
        cell
    }

    #[test]
    fn test_cooldown_blocks_merge() {
        let mut world = World::new(2000.0, 2000.0);
        let owner = PlayerId::new_v4();
        world.add_cell(cell(owner, 0.0, 25.0, Some(15_000)));
        world.add_cell(cell(owner, 10.0, 25.0, Some(15_000)));
        let before = world.clone();

        assert!(merge(&mut world, owner, 14_999).is_noop());
        assert_eq!(world, before);
    }

    #[test]
    fn test_merge_uses_weighted_centroid() {
        let mut world = World::new(2000.0, 2000.0);
        let owner = PlayerId::new_v4();
        let a = world.add_cell(cell(owner, 0.0, 30.0, Some(10)));
        let b = world.add_cell(cell(owner, 40.0, 10.0, Some(10)));

        let outcome = merge(&mut world, owner, 10);
        let survivor = a.min(b);
        assert_eq!(outcome.merged, vec![(survivor, a.max(b))]);

        let merged = world.get_cell(survivor).unwrap();
        assert_eq!(merged.size, 40.0);
        assert_eq!(merged.position, Vec2::new(10.0, 0.0));
        assert_eq!(merged.can_merge_at, None);
        assert_eq!(world.cell_count_of(owner), 1);
    }

    #[test]
    fn test_apart_cells_stay_split() {
        let mut world = World::new(2000.0, 2000.0);
        let owner = PlayerId::new_v4();
        // radii 50 + 50 < 120
        world.add_cell(cell(owner, 0.0, 25.0, Some(0)));
        world.add_cell(cell(owner, 120.0, 25.0, Some(0)));
        assert!(merge(&mut world, owner, 1).is_noop());
        assert_eq!(world.cell_count_of(owner), 2);
    }

    #[test]
    fn test_pairs_are_disjoint_and_idempotent_at_rest() {
        let mut world = World::new(4000.0, 4000.0);
        let owner = PlayerId::new_v4();
        for x in [0.0, 5.0, 10.0, 1000.0] {
            world.add_cell(cell(owner, x, 10.0, Some(0)));
        }

        let first = merge(&mut world, owner, 0);
        // three stacked cells form one pair; the leftover and the far cell stay
        assert_eq!(first.merged.len(), 1);
        assert_eq!(world.cell_count_of(owner), 3);
        assert_eq!(world.mass_of(owner), 40.0);

        // the survivor picks up the leftover on the next pass
        assert_eq!(merge(&mut world, owner, 0).merged.len(), 1);
        assert_eq!(world.cell_count_of(owner), 2);

        let settled = world.clone();
        assert!(merge(&mut world, owner, 0).is_noop());
        assert_eq!(world, settled);
    }

    #[test]
    fn test_single_cell_is_noop() {
        let mut world = World::new(2000.0, 2000.0);
        let owner = PlayerId::new_v4();
        world.add_cell(cell(owner, 0.0, 50.0, Some(0)));
        assert!(merge(&mut world, owner, 0).is_noop());
    }

    #[test]
    fn test_cell_without_cooldown_waits_for_sibling() {
        let mut world = World::new(2000.0, 2000.0);
        let owner = PlayerId::new_v4();
        world.add_cell(cell(owner, 0.0, 25.0, None));
        world.add_cell(cell(owner, 10.0, 25.0, Some(500)));
        assert!(merge(&mut world, owner, 100).is_noop());

        assert_eq!(merge(&mut world, owner, 500).merged.len(), 1);
        assert_eq!(world.cell_count_of(owner), 1);
    }

    #[test]
    fn test_survivors_keep_merging() {
        let mut world = World::new(2000.0, 2000.0);
        let owner = PlayerId::new_v4();
        for x in [0.0, 1.0, 4.0, 5.0] {
            world.add_cell(cell(owner, x, 10.0, Some(0)));
        }

        assert_eq!(merge(&mut world, owner, 0).merged.len(), 2);
        assert_eq!(world.cell_count_of(owner), 2);
        assert!(world.cells_of(owner).all(|c| c.can_merge_at.is_none()));

        assert_eq!(merge(&mut world, owner, 0).merged.len(), 1);
        assert_eq!(world.cell_count_of(owner), 1);
        assert_eq!(world.mass_of(owner), 40.0);
        assert!(merge(&mut world, owner, u64::MAX).is_noop());
    }
}
