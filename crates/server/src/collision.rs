//! Geometry and collision kernel.
//!
//! Pure functions over circles. A cell's `size` is its mass; the radius is
//! derived from it, so every test here takes sizes and converts internally.

use crate::world::WorldBorder;
use glam::Vec2;

pub const MASS_CONVERSION: f32 = 100.0; // radius = sqrt(size * 100)
pub const DEFAULT_EAT_RATIO: f32 = 1.25; // Predator needs 25% more mass

/// Calculate the collision radius for a mass.
#[inline]
pub fn size_to_radius(size: f32) -> f32 {
    (MASS_CONVERSION * size.max(0.0)).sqrt()
}

/// A circle described by its center and mass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub size: f32,
}

impl Circle {
    #[inline]
    pub fn new(center: Vec2, size: f32) -> Self {
        Self { center, size }
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        size_to_radius(self.size)
    }
}

/// True if the two circles intersect (touching does not count).
#[inline]
pub fn overlaps(a: Circle, b: Circle) -> bool {
    let r = a.radius() + b.radius();
    a.center.distance_squared(b.center) < r * r
}

/// True if `point` lies strictly inside `circle`.
#[inline]
pub fn covers_point(circle: Circle, point: Vec2) -> bool {
    let r = circle.radius();
    circle.center.distance_squared(point) < r * r
}

/// True if `predator` may eat `prey`: it must outweigh the prey by `ratio`
/// and its circle must cover the prey's center.
#[inline]
pub fn can_consume(predator: Circle, prey: Circle, ratio: f32) -> bool {
    predator.size >= prey.size * ratio && covers_point(predator, prey.center)
}

/// Clamp a position so the whole circle of `size` stays inside the border.
/// On an axis narrower than the circle the center is pinned to the middle.
#[inline]
pub fn clamp_to_arena(position: Vec2, size: f32, border: &WorldBorder) -> Vec2 {
    let r = size_to_radius(size);
    let clamp_axis = |value: f32, min: f32, max: f32| {
        if max - min <= 2.0 * r {
            (min + max) / 2.0
        } else {
            value.clamp(min + r, max - r)
        }
    };
    Vec2::new(
        clamp_axis(position.x, border.min_x, border.max_x),
        clamp_axis(position.y, border.min_y, border.max_y),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_radius_grows_with_size() {
        assert_eq!(size_to_radius(1.0), 10.0);
        assert_eq!(size_to_radius(100.0), 100.0);
        assert_eq!(size_to_radius(-3.0), 0.0);
    }

    #[test]
    fn test_overlap() {
        // radii 10 + 10 = 20, distance 15
        let a = Circle::new(Vec2::new(0.0, 0.0), 1.0);
        let b = Circle::new(Vec2::new(15.0, 0.0), 1.0);
        assert!(overlaps(a, b));
        assert!(overlaps(b, a));
    }

    #[test]
    fn test_no_overlap_when_touching() {
        let a = Circle::new(Vec2::new(0.0, 0.0), 1.0);
        let b = Circle::new(Vec2::new(20.0, 0.0), 1.0);
        assert!(!overlaps(a, b));
    }

    #[test]
    fn test_consume_requires_ratio() {
        let prey = Circle::new(Vec2::new(5.0, 0.0), 95.0);
        assert!(!can_consume(Circle::new(Vec2::ZERO, 100.0), prey, DEFAULT_EAT_RATIO));
        assert!(can_consume(Circle::new(Vec2::ZERO, 120.0), prey, DEFAULT_EAT_RATIO));
    }

    #[test]
    fn test_consume_requires_containment_not_graze() {
        // radius of 200 is ~141; the prey overlaps but its center is outside
        let predator = Circle::new(Vec2::ZERO, 200.0);
        let prey = Circle::new(Vec2::new(150.0, 0.0), 10.0);
        assert!(overlaps(predator, prey));
        assert!(!can_consume(predator, prey, DEFAULT_EAT_RATIO));
    }

    #[test]
    fn test_clamp_keeps_circle_inside() {
        let border = WorldBorder::new(200.0, 200.0);
        // radius 10
        let clamped = clamp_to_arena(Vec2::new(500.0, -500.0), 1.0, &border);
        assert_eq!(clamped, Vec2::new(90.0, -90.0));
        let untouched = clamp_to_arena(Vec2::new(3.0, 4.0), 1.0, &border);
        assert_eq!(untouched, Vec2::new(3.0, 4.0));
    }

    #[test]
    fn test_clamp_oversized_circle_centers() {
        let border = WorldBorder::new(100.0, 1000.0);
        // radius 100 is wider than the 100-wide x axis
        let clamped = clamp_to_arena(Vec2::new(40.0, 900.0), 100.0, &border);
        assert_eq!(clamped, Vec2::new(0.0, 400.0));
    }

    proptest! {
        #[test]
        fn eat_ratio_is_never_bypassed(
            predator_size in 0.1f32..5000.0,
            prey_size in 0.1f32..5000.0,
            dx in -10.0f32..10.0,
            dy in -10.0f32..10.0,
        ) {
            let predator = Circle::new(Vec2::ZERO, predator_size);
            let prey = Circle::new(Vec2::new(dx, dy), prey_size);
            if predator_size < prey_size * DEFAULT_EAT_RATIO {
                prop_assert!(!can_consume(predator, prey, DEFAULT_EAT_RATIO));
            }
        }

        #[test]
        fn clamped_positions_stay_in_bounds(
            x in -1.0e6f32..1.0e6,
            y in -1.0e6f32..1.0e6,
            size in 0.1f32..500.0,
        ) {
            let border = WorldBorder::new(2000.0, 2000.0);
            let p = clamp_to_arena(Vec2::new(x, y), size, &border);
            prop_assert!(border.contains(p));
        }
    }
}
