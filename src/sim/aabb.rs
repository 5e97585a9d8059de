//! Axis-aligned bounding boxes on the xy plane
//!
//! Stored as center + half-extents; min/max corners are derived. Boxes are
//! immutable value types, recomputed each frame from entity transforms.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::less_eq;

/// An axis-aligned 2d bounding box
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Aabb {
    center: Vec2,
    half_extents: Vec2,
}

impl Aabb {
    /// Build from min/max corners. `min <= max` on both axes
    /// (epsilon-tolerant) is a construction contract.
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        debug_assert!(less_eq(min.x, max.x) && less_eq(min.y, max.y));

        let half_extents = (max - min) * 0.5;
        let center = min + half_extents;
        Self::from_center_half_extents(center, half_extents)
    }

    /// Build from center and half-extents. Both half-extent components
    /// must be strictly positive.
    pub fn from_center_half_extents(center: Vec2, half_extents: Vec2) -> Self {
        debug_assert!(half_extents.x > 0.0 && half_extents.y > 0.0);
        Self { center, half_extents }
    }

    /// Tight bounding box of a point cloud. Zero points yield the
    /// degenerate empty-box sentinel.
    pub fn from_points(points: &[Vec2]) -> Self {
        let Some(&first) = points.first() else {
            return Self::default();
        };

        let (min, max) = points
            .iter()
            .fold((first, first), |(min, max), &p| (min.min(p), max.max(p)));

        Self::from_min_max(min, max)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.center
    }

    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        self.half_extents
    }

    /// Minimum corner
    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.half_extents
    }

    /// Maximum corner
    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.half_extents
    }

    /// Inclusive overlap test: on both axes, the center distance must not
    /// exceed the sum of half-extents (epsilon-tolerant).
    pub fn intersects(&self, other: &Aabb) -> bool {
        let delta = (self.center - other.center).abs();
        let reach = self.half_extents + other.half_extents;

        less_eq(delta.x, reach.x) && less_eq(delta.y, reach.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_from_min_max_matches_corners() {
        let aabb = Aabb::from_min_max(Vec2::new(-2.0, -1.0), Vec2::new(4.0, 3.0));
        assert_eq!(aabb.center(), Vec2::new(1.0, 1.0));
        assert_eq!(aabb.half_extents(), Vec2::new(3.0, 2.0));
        assert_eq!(aabb.min(), Vec2::new(-2.0, -1.0));
        assert_eq!(aabb.max(), Vec2::new(4.0, 3.0));
    }

    #[test]
    fn test_from_points_tight_bounds() {
        let points = [
            Vec2::new(1.0, 5.0),
            Vec2::new(-3.0, 2.0),
            Vec2::new(0.0, -4.0),
        ];
        let aabb = Aabb::from_points(&points);
        assert_eq!(aabb.min(), Vec2::new(-3.0, -4.0));
        assert_eq!(aabb.max(), Vec2::new(1.0, 5.0));
    }

    #[test]
    fn test_from_points_empty_is_degenerate() {
        let aabb = Aabb::from_points(&[]);
        assert_eq!(aabb.center(), Vec2::ZERO);
        assert_eq!(aabb.half_extents(), Vec2::ZERO);
    }

    #[test]
    fn test_touching_edges_intersect() {
        let a = Aabb::from_center_half_extents(Vec2::ZERO, Vec2::ONE);
        let b = Aabb::from_center_half_extents(Vec2::new(2.0, 0.0), Vec2::ONE);
        assert!(a.intersects(&b));

        let c = Aabb::from_center_half_extents(Vec2::new(2.0 + 0.001, 0.0), Vec2::ONE);
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_overlap_on_one_axis_only_is_no_hit() {
        let a = Aabb::from_center_half_extents(Vec2::ZERO, Vec2::ONE);
        let b = Aabb::from_center_half_extents(Vec2::new(0.5, 10.0), Vec2::ONE);
        assert!(!a.intersects(&b));
    }

    proptest! {
        #[test]
        fn prop_intersects_symmetric(
            ax in -100.0f32..100.0, ay in -100.0f32..100.0,
            bx in -100.0f32..100.0, by in -100.0f32..100.0,
            aw in 0.1f32..50.0, ah in 0.1f32..50.0,
            bw in 0.1f32..50.0, bh in 0.1f32..50.0,
        ) {
            let a = Aabb::from_center_half_extents(Vec2::new(ax, ay), Vec2::new(aw, ah));
            let b = Aabb::from_center_half_extents(Vec2::new(bx, by), Vec2::new(bw, bh));
            prop_assert_eq!(a.intersects(&b), b.intersects(&a));
        }

        #[test]
        fn prop_intersects_reflexive(
            x in -100.0f32..100.0, y in -100.0f32..100.0,
            w in 0.1f32..50.0, h in 0.1f32..50.0,
        ) {
            let a = Aabb::from_center_half_extents(Vec2::new(x, y), Vec2::new(w, h));
            prop_assert!(a.intersects(&a));
        }
    }
}
