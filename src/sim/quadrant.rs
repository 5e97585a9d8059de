//! A single fixed-size cell of the quadtree
//!
//! A quadrant only stores its minimum corner; its size is shared by every
//! sibling at the same depth and is looked up by the tree, so the caller
//! passes it in.

use glam::Vec2;

use crate::less_eq;

/// One cell of the quadtree at a given depth
#[derive(Debug, Clone, Copy, Default)]
pub struct Quadrant {
    min: Vec2,
}

impl Quadrant {
    pub fn new(min: Vec2) -> Self {
        Self { min }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.min
    }

    pub(crate) fn set_min(&mut self, min: Vec2) {
        self.min = min;
    }

    /// True iff the candidate AABB fits entirely inside this quadrant
    /// (inclusive boundaries, epsilon-tolerant).
    pub fn contains(&self, aabb_min: Vec2, aabb_max: Vec2, quadrant_size: Vec2) -> bool {
        let max = self.min + quadrant_size;

        less_eq(self.min.x, aabb_min.x)
            && less_eq(aabb_max.x, max.x)
            && less_eq(self.min.y, aabb_min.y)
            && less_eq(aabb_max.y, max.y)
    }

    /// True iff the candidate AABB is disjoint from this quadrant.
    /// Strict comparisons: a box touching the boundary is not outside.
    pub fn outside(&self, aabb_min: Vec2, aabb_max: Vec2, quadrant_size: Vec2) -> bool {
        let max = self.min + quadrant_size;

        aabb_max.x < self.min.x
            || max.x < aabb_min.x
            || aabb_max.y < self.min.y
            || max.y < aabb_min.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: Vec2 = Vec2::new(10.0, 10.0);

    #[test]
    fn test_contains_fully_inside() {
        let q = Quadrant::new(Vec2::ZERO);
        assert!(q.contains(Vec2::new(1.0, 1.0), Vec2::new(9.0, 9.0), SIZE));
    }

    #[test]
    fn test_contains_boundary_is_inclusive() {
        let q = Quadrant::new(Vec2::ZERO);
        assert!(q.contains(Vec2::ZERO, Vec2::new(10.0, 10.0), SIZE));
    }

    #[test]
    fn test_straddling_box_not_contained() {
        let q = Quadrant::new(Vec2::ZERO);
        assert!(!q.contains(Vec2::new(8.0, 1.0), Vec2::new(12.0, 3.0), SIZE));
        // ...but it is not outside either
        assert!(!q.outside(Vec2::new(8.0, 1.0), Vec2::new(12.0, 3.0), SIZE));
    }

    #[test]
    fn test_outside_is_strict() {
        let q = Quadrant::new(Vec2::ZERO);
        assert!(q.outside(Vec2::new(11.0, 0.0), Vec2::new(13.0, 2.0), SIZE));
        // touching the right edge is not outside
        assert!(!q.outside(Vec2::new(10.0, 0.0), Vec2::new(12.0, 2.0), SIZE));
    }
}
