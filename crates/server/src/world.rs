//! World state management.
//!
//! Holds one room's cells and food. Cells are indexed by id and grouped by
//! owner; food is indexed by id. Ordered maps keep every scan deterministic.
//! Candidate searches are linear over a player's cells or the food field,
//! which is fine at tens of entities per room and is the scalability ceiling
//! of this store.

use crate::collision::{overlaps, size_to_radius, Circle};
use crate::entity::{Food, PlayerCell};
use glam::Vec2;
use protocol::{CellId, FoodId, PlayerId};
use rand::Rng;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// The cells and food of one room.
#[derive(Debug, Clone, PartialEq)]
pub struct World {
    /// All player cells by ID.
    cells: BTreeMap<CellId, PlayerCell>,
    /// Cell IDs grouped by owning player.
    by_owner: HashMap<PlayerId, BTreeSet<CellId>>,
    /// Food pellets by ID.
    food: BTreeMap<FoodId, Food>,
    /// World border.
    pub border: WorldBorder,
}

/// World border bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBorder {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
    pub width: f32,
    pub height: f32,
}

impl WorldBorder {
    pub fn new(width: f32, height: f32) -> Self {
        let half_w = width / 2.0;
        let half_h = height / 2.0;
        Self {
            min_x: -half_w,
            min_y: -half_h,
            max_x: half_w,
            max_y: half_h,
            width,
            height,
        }
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    /// Get a random position where a circle of `size` fits entirely inside.
    pub fn random_position<R: Rng + ?Sized>(&self, size: f32, rng: &mut R) -> Vec2 {
        let r = size_to_radius(size);
        let axis = |rng: &mut R, min: f32, max: f32| {
            if max - min <= 2.0 * r {
                (min + max) / 2.0
            } else {
                rng.random_range((min + r)..=(max - r))
            }
        };
        let x = axis(rng, self.min_x, self.max_x);
        let y = axis(rng, self.min_y, self.max_y);
        Vec2::new(x, y)
    }
}

impl World {
    /// Create an empty world with the given border size.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            cells: BTreeMap::new(),
            by_owner: HashMap::new(),
            food: BTreeMap::new(),
            border: WorldBorder::new(width, height),
        }
    }

    /// Get a cell by ID.
    #[inline]
    pub fn get_cell(&self, id: CellId) -> Option<&PlayerCell> {
        self.cells.get(&id)
    }

    /// Get a mutable cell by ID.
    #[inline]
    pub fn get_cell_mut(&mut self, id: CellId) -> Option<&mut PlayerCell> {
        self.cells.get_mut(&id)
    }

    /// Add a player cell to the world.
    pub fn add_cell(&mut self, cell: PlayerCell) -> CellId {
        let id = cell.id;
        self.by_owner.entry(cell.owner()).or_default().insert(id);
        self.cells.insert(id, cell);
        id
    }

    /// Remove a cell from the world.
    pub fn remove_cell(&mut self, id: CellId) -> Option<PlayerCell> {
        let cell = self.cells.remove(&id)?;
        if let Some(owned) = self.by_owner.get_mut(&cell.owner()) {
            owned.remove(&id);
            if owned.is_empty() {
                self.by_owner.remove(&cell.owner());
            }
        }
        Some(cell)
    }

    /// IDs of the cells owned by `owner`, ascending.
    pub fn cell_ids_of(&self, owner: PlayerId) -> Vec<CellId> {
        self.by_owner
            .get(&owner)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Cells owned by `owner`, in ascending id order.
    pub fn cells_of(&self, owner: PlayerId) -> impl Iterator<Item = &PlayerCell> {
        self.by_owner
            .get(&owner)
            .into_iter()
            .flatten()
            .filter_map(|id| self.cells.get(id))
    }

    #[inline]
    pub fn cell_count_of(&self, owner: PlayerId) -> usize {
        self.by_owner.get(&owner).map_or(0, BTreeSet::len)
    }

    /// Total mass across a player's cells.
    pub fn mass_of(&self, owner: PlayerId) -> f32 {
        self.cells_of(owner).map(|c| c.size).sum()
    }

    /// Remove every cell a player owns.
    pub fn remove_cells_of(&mut self, owner: PlayerId) -> Vec<PlayerCell> {
        self.cell_ids_of(owner)
            .into_iter()
            .filter_map(|id| self.remove_cell(id))
            .collect()
    }

    /// Iterate over all cells in id order.
    #[inline]
    pub fn iter_cells(&self) -> impl Iterator<Item = &PlayerCell> {
        self.cells.values()
    }

    /// True if `circle` overlaps any existing cell.
    pub fn overlaps_any_cell(&self, circle: Circle) -> bool {
        self.cells.values().any(|c| overlaps(c.circle(), circle))
    }

    /// Add a food pellet to the world.
    pub fn add_food(&mut self, food: Food) -> FoodId {
        let id = food.id;
        self.food.insert(id, food);
        id
    }

    /// Remove a food pellet.
    #[inline]
    pub fn remove_food(&mut self, id: FoodId) -> Option<Food> {
        self.food.remove(&id)
    }

    #[inline]
    pub fn get_food(&self, id: FoodId) -> Option<&Food> {
        self.food.get(&id)
    }

    /// Iterate over all food in id order.
    #[inline]
    pub fn iter_food(&self) -> impl Iterator<Item = &Food> {
        self.food.values()
    }

    /// Get the count of each entity type.
    #[inline]
    pub fn counts(&self) -> WorldCounts {
        WorldCounts {
            cells: self.cells.len(),
            food: self.food.len(),
            players: self.by_owner.len(),
        }
    }

    /// Mass of every cell and pellet combined.
    pub fn total_mass(&self) -> f32 {
        self.cells.values().map(|c| c.size).sum::<f32>() + self.food.values().map(|f| f.size).sum::<f32>()
    }
}

/// Entity count statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorldCounts {
    pub cells: usize,
    pub food: usize,
    /// Players that currently own at least one cell.
    pub players: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::Color;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_owner_index_tracks_add_and_remove() {
        let mut world = World::new(1000.0, 1000.0);
        let a = PlayerId::new_v4();
        let b = PlayerId::new_v4();
        let a1 = world.add_cell(PlayerCell::new(a, Vec2::ZERO, 10.0, 0));
        let a2 = world.add_cell(PlayerCell::new(a, Vec2::ONE, 20.0, 0));
        world.add_cell(PlayerCell::new(b, Vec2::ONE, 5.0, 0));

        assert_eq!(world.cell_count_of(a), 2);
        assert_eq!(world.mass_of(a), 30.0);
        assert_eq!(world.counts(), WorldCounts { cells: 3, food: 0, players: 2 });

        let mut expected = vec![a1, a2];
        expected.sort();
        assert_eq!(world.cell_ids_of(a), expected);

        world.remove_cell(a1);
        world.remove_cell(a2);
        assert_eq!(world.cell_count_of(a), 0);
        assert_eq!(world.counts().players, 1);
        assert!(world.remove_cell(a1).is_none());
    }

    #[test]
    fn test_food_field() {
        let mut world = World::new(1000.0, 1000.0);
        let id = world.add_food(Food::new(Vec2::ZERO, 5.0, Color::new(1, 2, 3), 0));
        assert_eq!(world.total_mass(), 5.0);
        assert!(world.get_food(id).is_some());
        assert!(world.remove_food(id).is_some());
        assert!(world.remove_food(id).is_none());
    }

    #[test]
    fn test_random_position_fits_circle() {
        let border = WorldBorder::new(400.0, 300.0);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let p = border.random_position(50.0, &mut rng);
            let r = size_to_radius(50.0);
            assert!(p.x - r >= border.min_x && p.x + r <= border.max_x);
            assert!(p.y - r >= border.min_y && p.y + r <= border.max_y);
        }
    }
}
