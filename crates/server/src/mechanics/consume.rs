//! Consume: eat a food pellet or another player's cell.

use super::largest_first;
use crate::collision::{can_consume, overlaps};
use crate::entity::PlayerCell;
use crate::error::GameError;
use crate::world::World;
use protocol::{CellId, FoodId, PlayerId};

/// Result of eating a pellet.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodMeal {
    pub cell_id: CellId,
    pub food_id: FoodId,
    pub gained: f32,
}

/// Result of eating another player's cell.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerMeal {
    pub predator_cell: CellId,
    pub prey_cell: CellId,
    pub gained: f32,
    /// Cells the prey still owns afterwards.
    pub prey_cells_left: usize,
}

/// Feed `food_id` to the largest of `predator`'s cells that overlaps it.
pub fn consume_food(world: &mut World, predator: PlayerId, food_id: FoodId) -> Result<FoodMeal, GameError> {
    let food = world.get_food(food_id).ok_or(GameError::TargetNotFound)?.circle();

    let mut cells: Vec<&PlayerCell> = world.cells_of(predator).collect();
    cells.sort_by(largest_first);
    let cell_id = cells
        .into_iter()
        .find(|c| overlaps(c.circle(), food))
        .map(|c| c.id)
        .ok_or(GameError::NotInRange)?;

    let food = world.remove_food(food_id).ok_or(GameError::TargetNotFound)?;
    let cell = world.get_cell_mut(cell_id).ok_or(GameError::NotInRange)?;
    cell.size += food.size;

    Ok(FoodMeal {
        cell_id,
        food_id,
        gained: food.size,
    })
}

/// Let `predator` eat one of `prey`'s cells.
///
/// Predator cells are tried largest first, prey cells in ascending id order;
/// the first pair passing [`can_consume`] is resolved and the whole prey cell
/// moves into the predator cell.
pub fn consume_player(
    world: &mut World,
    predator: PlayerId,
    prey: PlayerId,
    eat_ratio: f32,
) -> Result<PlayerMeal, GameError> {
    if predator == prey {
        return Err(GameError::SelfTarget);
    }
    if world.cell_count_of(prey) == 0 {
        return Err(GameError::TargetNotFound);
    }

    let mut hunters: Vec<&PlayerCell> = world.cells_of(predator).collect();
    hunters.sort_by(largest_first);
    let targets: Vec<&PlayerCell> = world.cells_of(prey).collect();

    let (predator_cell, prey_cell) = hunters
        .iter()
        .find_map(|hunter| {
            targets
                .iter()
                .find(|target| can_consume(hunter.circle(), target.circle(), eat_ratio))
                .map(|target| (hunter.id, target.id))
        })
        .ok_or(GameError::NotEligible)?;

    let eaten = world.remove_cell(prey_cell).ok_or(GameError::TargetNotFound)?;
    let cell = world.get_cell_mut(predator_cell).ok_or(GameError::NotEligible)?;
    cell.size += eaten.size;

    Ok(PlayerMeal {
        predator_cell,
        prey_cell,
        gained: eaten.size,
        prey_cells_left: world.cell_count_of(prey),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::DEFAULT_EAT_RATIO;
    use crate::entity::Food;
    use glam::Vec2;
    use protocol::Color;

    #[test]
    fn test_food_in_range_is_eaten() {
        let mut world = World::new(2000.0, 2000.0);
        let owner = PlayerId::new_v4();
        let cell = world.add_cell(PlayerCell::new(owner, Vec2::ZERO, 50.0, 0));
        let food = world.add_food(Food::new(Vec2::new(30.0, 0.0), 5.0, Color::new(1, 2, 3), 0));

        let meal = consume_food(&mut world, owner, food).unwrap();
        assert_eq!(meal.cell_id, cell);
        assert_eq!(meal.gained, 5.0);
        assert_eq!(world.get_cell(cell).unwrap().size, 55.0);
        assert!(world.get_food(food).is_none());

        assert!(matches!(consume_food(&mut world, owner, food), Err(GameError::TargetNotFound)));
    }

    #[test]
    fn test_food_out_of_range() {
        let mut world = World::new(2000.0, 2000.0);
        let owner = PlayerId::new_v4();
        world.add_cell(PlayerCell::new(owner, Vec2::ZERO, 50.0, 0));
        let food = world.add_food(Food::new(Vec2::new(500.0, 0.0), 5.0, Color::new(1, 2, 3), 0));
        let before = world.clone();

        assert!(matches!(consume_food(&mut world, owner, food), Err(GameError::NotInRange)));
        assert_eq!(world, before);
    }

    #[test]
    fn test_largest_overlapping_cell_eats_food() {
        let mut world = World::new(2000.0, 2000.0);
        let owner = PlayerId::new_v4();
        world.add_cell(PlayerCell::new(owner, Vec2::new(-20.0, 0.0), 20.0, 0));
        let big = world.add_cell(PlayerCell::new(owner, Vec2::new(20.0, 0.0), 40.0, 0));
        let food = world.add_food(Food::new(Vec2::ZERO, 5.0, Color::new(1, 2, 3), 0));
        assert_eq!(consume_food(&mut world, owner, food).unwrap().cell_id, big);
    }

    #[test]
    fn test_ratio_gate_between_players() {
        let mut world = World::new(2000.0, 2000.0);
        let a = PlayerId::new_v4();
        let b = PlayerId::new_v4();
        let a_cell = world.add_cell(PlayerCell::new(a, Vec2::ZERO, 100.0, 0));
        let b_cell = world.add_cell(PlayerCell::new(b, Vec2::new(10.0, 0.0), 95.0, 0));

        assert!(matches!(
            consume_player(&mut world, a, b, DEFAULT_EAT_RATIO),
            Err(GameError::NotEligible)
        ));

        world.get_cell_mut(a_cell).unwrap().size = 120.0;
        let mass_before = world.total_mass();
        let meal = consume_player(&mut world, a, b, DEFAULT_EAT_RATIO).unwrap();
        assert_eq!(meal.prey_cell, b_cell);
        assert_eq!(meal.gained, 95.0);
        assert_eq!(meal.prey_cells_left, 0);
        assert_eq!(world.get_cell(a_cell).unwrap().size, 215.0);
        assert!(world.get_cell(b_cell).is_none());
        assert_eq!(world.total_mass(), mass_before);
    }

    #[test]
    fn test_self_and_missing_targets() {
        let mut world = World::new(2000.0, 2000.0);
        let a = PlayerId::new_v4();
        world.add_cell(PlayerCell::new(a, Vec2::ZERO, 100.0, 0));
        assert!(matches!(consume_player(&mut world, a, a, 1.25), Err(GameError::SelfTarget)));
        assert!(matches!(
            consume_player(&mut world, a, PlayerId::new_v4(), 1.25),
            Err(GameError::TargetNotFound)
        ));
    }

    #[test]
    fn test_prey_with_several_cells_survives() {
        let mut world = World::new(2000.0, 2000.0);
        let a = PlayerId::new_v4();
        let b = PlayerId::new_v4();
        world.add_cell(PlayerCell::new(a, Vec2::ZERO, 200.0, 0));
        world.add_cell(PlayerCell::new(b, Vec2::new(5.0, 0.0), 20.0, 0));
        world.add_cell(PlayerCell::new(b, Vec2::new(900.0, 0.0), 20.0, 0));

        let meal = consume_player(&mut world, a, b, 1.25).unwrap();
        assert_eq!(meal.prey_cells_left, 1);
        assert_eq!(world.mass_of(a), 220.0);
    }
}
