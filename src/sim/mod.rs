//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by instance slot)
//! - No rendering or platform dependencies

pub mod aabb;
pub mod quadrant;
pub mod quadtree;
pub mod state;
pub mod tick;

pub use aabb::Aabb;
pub use quadrant::Quadrant;
pub use quadtree::{OccupiedPolicy, Quadtree, SubdivisionPolicy, quadrant_count};
pub use state::{
    BrickLayout, GameState, RngState, ARENA_SLOT, BALL_SLOT, BONUS_SLOT, BRICKS_START_SLOT,
    INSTANCE_COUNT, PADDLE_SLOT,
};
pub use tick::{HitDirections, TickInput, classify_hit, tick};
