//! Fixed timestep simulation tick
//!
//! Advances the game deterministically: move the paddle, bonus, and ball,
//! then resolve wall, bonus, paddle, and brick collisions in that order.
//! Brick collisions go through the quadtree broad phase and resolve at
//! most one brick per frame.

use super::aabb::Aabb;
use super::state::{BONUS_SLOT, BRICKS_START_SLOT, GameState};
use crate::consts::*;
use crate::less_eq;

/// Input state for a single tick, queried as plain booleans
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    /// Reserved by the input contract; nothing is wired to it
    pub fire: bool,
    /// Re-deal the bricks (level restart)
    pub shuffle: bool,
}

/// Which edges of a target AABB the ball's box swept across this frame.
/// The four tests are independent; a corner clip can set both axes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HitDirections {
    pub from_top: bool,
    pub from_bottom: bool,
    pub from_left: bool,
    pub from_right: bool,
}

/// Classify the direction the ball hit `target` from, using the ball's
/// AABB before and after the movement step. "From top" means the ball's
/// bottom edge crossed the target's top edge between the two samples;
/// the other three are symmetric.
pub fn classify_hit(target: &Aabb, curr_ball: &Aabb, last_ball: &Aabb) -> HitDirections {
    let target_min = target.min();
    let target_max = target.max();
    let curr_min = curr_ball.min();
    let curr_max = curr_ball.max();
    let last_min = last_ball.min();
    let last_max = last_ball.max();

    HitDirections {
        from_top: less_eq(target_max.y, last_min.y) && less_eq(curr_min.y, target_max.y),
        from_bottom: less_eq(last_max.y, target_min.y) && less_eq(target_min.y, curr_max.y),
        from_right: less_eq(target_max.x, last_min.x) && less_eq(curr_min.x, target_max.x),
        from_left: less_eq(last_max.x, target_min.x) && less_eq(target_min.x, curr_max.x),
    }
}

/// Advance the game by one timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.shuffle {
        state.restart_level();
    }

    move_paddle(state, input, dt);
    move_bonus(state, dt);

    let last_ball_pos = state.ball_center();
    move_ball(state, dt);
    let ball_pos = state.ball_center();

    if ball_pos.y < GAME_OVER_Y {
        log::info!("ball out of bounds at y={:.1}", ball_pos.y);
        state.restart_level();
        return;
    }

    let paddle_pos = state.paddle_center();
    let paddle_aabb = Aabb::from_center_half_extents(paddle_pos, PADDLE_HALF_EXTENTS);
    let curr_ball_aabb = Aabb::from_center_half_extents(ball_pos, BALL_HALF_EXTENTS);

    check_bounds(state, &paddle_aabb, &curr_ball_aabb);
    check_bonus_pickup(state, &paddle_aabb);

    let last_ball_aabb = Aabb::from_center_half_extents(last_ball_pos, BALL_HALF_EXTENTS);

    if paddle_aabb.intersects(&curr_ball_aabb) {
        resolve_paddle_hit(state, &paddle_aabb, &curr_ball_aabb, &last_ball_aabb);
    } else {
        check_bricks_collision(state, &curr_ball_aabb, &last_ball_aabb);
    }
}

fn move_paddle(state: &mut GameState, input: &TickInput, dt: f32) {
    let mut dx = 0.0;
    if input.left {
        dx -= PADDLE_SPEED * dt;
    }
    if input.right {
        dx += PADDLE_SPEED * dt;
    }
    state.paddle_mut().pos[0] += dx;
}

fn move_ball(state: &mut GameState, dt: f32) {
    let velocity = state.ball_velocity;
    let ball = state.ball_mut();
    ball.pos[0] += velocity.x * dt;
    ball.pos[1] += velocity.y * dt;
}

fn move_bonus(state: &mut GameState, dt: f32) {
    if state.bonus_alive {
        state.bonus_mut().pos[1] -= BONUS_FALL_SPEED * dt;
    }
}

/// Keep the paddle inside the arena and reflect the ball off the side
/// walls and ceiling, clamping its position back in on the axis that
/// triggered.
fn check_bounds(state: &mut GameState, paddle_aabb: &Aabb, ball_aabb: &Aabb) {
    if paddle_aabb.min().x < ARENA_MIN_X {
        state.paddle_mut().pos[0] = ARENA_MIN_X + PADDLE_HALF_EXTENTS.x;
    }
    if paddle_aabb.max().x > ARENA_MAX_X {
        state.paddle_mut().pos[0] = ARENA_MAX_X - PADDLE_HALF_EXTENTS.x;
    }

    let out_left = ball_aabb.min().x < ARENA_MIN_X;
    let out_right = ball_aabb.max().x > ARENA_MAX_X;
    let out_top = ball_aabb.max().y > ARENA_MAX_Y;

    if out_left || out_right {
        state.ball_velocity.x = -state.ball_velocity.x;
    }
    if out_top {
        state.ball_velocity.y = -state.ball_velocity.y;
    }

    if out_left {
        state.ball_mut().pos[0] = ARENA_MIN_X + BALL_HALF_EXTENTS.x;
    }
    if out_right {
        state.ball_mut().pos[0] = ARENA_MAX_X - BALL_HALF_EXTENTS.x;
    }
    if out_top {
        state.ball_mut().pos[1] = ARENA_MAX_Y - BALL_HALF_EXTENTS.y;
    }
}

/// A falling bonus dies when it drops past the destroy line or touches
/// the paddle; either way it is parked back outside the arena.
fn check_bonus_pickup(state: &mut GameState, paddle_aabb: &Aabb) {
    let bonus_center = state.bonus_center();
    let missed = bonus_center.y < BONUS_DESTROY_Y;
    let bonus_aabb = Aabb::from_center_half_extents(bonus_center, BONUS_HALF_EXTENTS);
    let taken = bonus_aabb.intersects(paddle_aabb);

    if missed || taken {
        state.bonus_alive = false;
    }
    if !state.bonus_alive {
        state.translate_out_of_arena(BONUS_SLOT);
    }
}

/// Ball/paddle response: reflect vertically when the ball swept the
/// paddle's top or bottom edge, and set the horizontal velocity from how
/// far off-center the ball landed. The horizontal rewrite fires on any
/// paddle contact, side clips included; that is the observed arcade
/// behavior, not an oversight here.
fn resolve_paddle_hit(
    state: &mut GameState,
    paddle_aabb: &Aabb,
    curr_ball_aabb: &Aabb,
    last_ball_aabb: &Aabb,
) {
    let hit = classify_hit(paddle_aabb, curr_ball_aabb, last_ball_aabb);

    if hit.from_top || hit.from_bottom {
        state.ball_velocity.y = -state.ball_velocity.y;
    }

    // Ball edge nearest the paddle center, as a signed offset in
    // paddle-half-widths: full-edge hits bounce at the steepest angle
    let paddle_x = paddle_aabb.center().x;
    let nearest_edge_x = if curr_ball_aabb.center().x < paddle_x {
        curr_ball_aabb.max().x
    } else {
        curr_ball_aabb.min().x
    };
    let offset = (nearest_edge_x - paddle_x) / PADDLE_HALF_EXTENTS.x;

    state.ball_velocity.x = BALL_SPEED * offset;
}

/// Narrow phase over the quadtree candidates, in traversal order. The
/// first brick whose AABB truly intersects the ball is resolved and the
/// scan stops: one brick per frame at most.
fn check_bricks_collision(state: &mut GameState, curr_ball_aabb: &Aabb, last_ball_aabb: &Aabb) {
    let collider_count = state.find_brick_colliders(curr_ball_aabb);

    for collider in 0..collider_count {
        let brick = state.colliders[collider] as usize;
        assert!(brick < BRICKS_COUNT);

        let brick_center = state.brick_center(brick);
        let brick_aabb = Aabb::from_center_half_extents(brick_center, BRICK_HALF_EXTENTS);

        // Stale tree entries (destroyed bricks) fail this test: their
        // game-side AABB has been sentinel-relocated far away
        if !curr_ball_aabb.intersects(&brick_aabb) {
            continue;
        }

        let hit = classify_hit(&brick_aabb, curr_ball_aabb, last_ball_aabb);

        if hit.from_right || hit.from_left {
            state.ball_velocity.x = -state.ball_velocity.x;
        }
        if hit.from_top || hit.from_bottom {
            state.ball_velocity.y = -state.ball_velocity.y;
        }

        // Push the ball just outside the brick on each axis that was
        // crossed; on a corner clip the later write wins
        if hit.from_right {
            state.ball_mut().pos[0] = brick_center.x + BRICK_HALF_EXTENTS.x + BALL_HALF_EXTENTS.x;
        }
        if hit.from_left {
            state.ball_mut().pos[0] = brick_center.x - BRICK_HALF_EXTENTS.x - BALL_HALF_EXTENTS.x;
        }
        if hit.from_top {
            state.ball_mut().pos[1] = brick_center.y + BRICK_HALF_EXTENTS.y + BALL_HALF_EXTENTS.y;
        }
        if hit.from_bottom {
            state.ball_mut().pos[1] = brick_center.y - BRICK_HALF_EXTENTS.y - BALL_HALF_EXTENTS.y;
        }

        debug_assert!(state.bricks_remaining_hits[brick] > 0);
        state.bricks_remaining_hits[brick] -= 1;
        if state.bricks_remaining_hits[brick] == 0 {
            state.translate_out_of_arena(BRICKS_START_SLOT + brick);
            state.handle_spawn_bonus(brick_center);
        }

        break;
    }
}
