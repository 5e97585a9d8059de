//! Brick Rush - a breakout-style arcade core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (AABBs, quadtree broad phase, game state, tick)
//! - `atlas`: Texture-atlas descriptor parsing for per-entity UV tiles
//! - `render`: Per-instance buffers handed to an external renderer

pub mod atlas;
pub mod render;
pub mod sim;

/// Game configuration constants
pub mod consts {
    use glam::Vec2;

    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;

    /// Arena dimensions, centered at the origin
    pub const ARENA_WIDTH: f32 = 40.0;
    pub const ARENA_HEIGHT: f32 = 60.0;
    pub const ARENA_MIN_X: f32 = -ARENA_WIDTH / 2.0;
    pub const ARENA_MAX_X: f32 = ARENA_WIDTH / 2.0;
    pub const ARENA_MIN_Y: f32 = -ARENA_HEIGHT / 2.0;
    pub const ARENA_MAX_Y: f32 = ARENA_HEIGHT / 2.0;

    /// Sentinel x for destroyed/inactive entities. Far enough outside the
    /// arena that no query AABB ever reaches it.
    pub const OUT_OF_ARENA_X: f32 = ARENA_MAX_X * 10.0;

    /// Brick defaults
    pub const BRICKS_COUNT: usize = 120;
    pub const BRICK_WIDTH: f32 = 4.0;
    pub const BRICK_HEIGHT: f32 = 2.0;
    pub const BRICK_HALF_EXTENTS: Vec2 = Vec2::new(BRICK_WIDTH / 2.0, BRICK_HEIGHT / 2.0);

    /// Paddle defaults
    pub const PADDLE_HALF_EXTENTS: Vec2 = Vec2::new(3.0, 0.5);
    pub const PADDLE_SPEED: f32 = 24.0;

    /// Ball defaults
    pub const BALL_HALF_EXTENTS: Vec2 = Vec2::new(1.0, 1.0);
    pub const BALL_SPEED: f32 = 35.0;
    /// Launch direction before normalization
    pub const BALL_START_DIR: Vec2 = Vec2::new(0.5, 1.0);

    /// Bonus defaults
    pub const BONUS_HALF_EXTENTS: Vec2 = Vec2::new(1.0, 0.5);
    pub const BONUS_FALL_SPEED: f32 = 8.0;
    /// A bonus spawns after 1..=MAX_BONUS_HIT_INTERVAL destroyed bricks
    pub const MAX_BONUS_HIT_INTERVAL: u32 = 5;

    /// Ball below this line loses the level
    pub const GAME_OVER_Y: f32 = ARENA_MIN_Y - 15.0;
    /// Bonus below this line is missed
    pub const BONUS_DESTROY_Y: f32 = ARENA_MIN_Y - 1.0;

    /// Quadtree depth used for the brick broad phase (21-node tree)
    pub const QUADTREE_MAX_DEPTH: usize = 2;

    /// Brick types: hits to destroy, strongest first
    pub const BRICK_TYPE_HITS: [u32; 3] = [3, 2, 1];
    /// Brick type colors (rgb), parallel to `BRICK_TYPE_HITS`
    pub const BRICK_TYPE_COLORS: [[f32; 3]; 3] =
        [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
}

/// Comparison tolerance for world-space coordinates
pub const EPSILON: f32 = 1e-6;

/// Epsilon-tolerant float equality
#[inline]
pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() <= EPSILON
}

/// Epsilon-tolerant `a <= b`
#[inline]
pub fn less_eq(a: f32, b: f32) -> bool {
    a < b || approx_eq(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approx_eq_within_tolerance() {
        assert!(approx_eq(1.0, 1.0));
        assert!(approx_eq(1.0, 1.0 + EPSILON * 0.5));
        assert!(!approx_eq(1.0, 1.0 + EPSILON * 10.0));
    }

    #[test]
    fn test_less_eq_boundary() {
        assert!(less_eq(1.0, 2.0));
        assert!(less_eq(2.0, 2.0));
        assert!(less_eq(2.0 + EPSILON * 0.5, 2.0));
        assert!(!less_eq(2.1, 2.0));
    }
}
