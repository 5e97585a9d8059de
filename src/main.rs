//! Brick Rush entry point
//!
//! Headless driver: runs the fixed-timestep simulation with a trivial
//! ball-chasing controller and logs progress. Rendering is external; this
//! binary exists to exercise the simulation end to end.

use std::time::{SystemTime, UNIX_EPOCH};

use brick_rush::consts::SIM_DT;
use brick_rush::sim::{GameState, TickInput, tick};

fn main() {
    env_logger::init();

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|t| t.as_millis() as u64)
        .unwrap_or(0);
    log::info!("Brick Rush starting with seed {seed}");

    let mut state = GameState::new(seed);
    let mut input = TickInput::default();

    // 60 simulated seconds
    let total_ticks = (60.0 / SIM_DT) as u64;
    for step in 0..total_ticks {
        // Chase the ball
        let ball_x = state.ball_center().x;
        let paddle_x = state.paddle_center().x;
        input.left = ball_x < paddle_x;
        input.right = ball_x > paddle_x;

        tick(&mut state, &input, SIM_DT);

        if step % 120 == 0 {
            let ball = state.ball_center();
            log::info!(
                "t={:.0}s ball=({:.1}, {:.1}) bricks={}",
                step as f32 * SIM_DT,
                ball.x,
                ball.y,
                state.live_bricks()
            );
        }
    }

    log::info!("Done: {} bricks left", state.live_bricks());
}
