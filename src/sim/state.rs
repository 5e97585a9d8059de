//! Game state: entity transforms, brick bookkeeping, level setup
//!
//! Everything lives in fixed-capacity, entity-indexed buffers so the
//! renderer-facing slices never reallocate. Entities are never destroyed:
//! a dead brick or bonus is translated far outside the arena and its slot
//! stays put.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::quadtree::Quadtree;
use crate::atlas::{AtlasLayout, EntityClass};
use crate::consts::*;
use crate::render::{ENTITY_CLASS_COUNT, InstanceTint, InstanceTransform, UvTransform};

/// Instance-slot layout: arena first, then all bricks, then the movers
pub const ARENA_SLOT: usize = 0;
pub const BRICKS_START_SLOT: usize = ARENA_SLOT + 1;
pub const BALL_SLOT: usize = BRICKS_START_SLOT + BRICKS_COUNT;
pub const PADDLE_SLOT: usize = BALL_SLOT + 1;
pub const BONUS_SLOT: usize = PADDLE_SLOT + 1;
pub const INSTANCE_COUNT: usize = BONUS_SLOT + 1;

/// Brick layout generators, one picked at random per level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrickLayout {
    RowByRow,
    Diamond,
    Columns,
}

impl BrickLayout {
    pub const ALL: [BrickLayout; 3] =
        [BrickLayout::RowByRow, BrickLayout::Diamond, BrickLayout::Columns];
}

/// Seeded RNG state that survives serialization
///
/// Draws are replayed from the seed on every pull, so a restored snapshot
/// continues the exact same stream. The game draws a couple of values per
/// level, so the replay stays cheap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub draws: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, draws: 0 }
    }

    /// Next value of the seeded Pcg32 stream
    pub fn next_u32(&mut self) -> u32 {
        let mut rng = Pcg32::seed_from_u64(self.seed);
        let mut value = 0;
        for _ in 0..=self.draws {
            value = rng.random();
        }
        self.draws += 1;
        value
    }
}

/// Complete collision-controller state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng_state: RngState,
    /// Per-instance translation + half-extents, read by the renderer
    pub transforms: Vec<InstanceTransform>,
    /// Per-instance color and UV-transform index
    pub tints: Vec<InstanceTint>,
    /// One UV tile per entity class
    pub uv_transforms: Vec<UvTransform>,
    pub ball_velocity: Vec2,
    pub bricks_remaining_hits: Vec<u32>,
    /// Layout picked for the current level
    pub layout: BrickLayout,
    /// Bricks actually placed by the layout (the rest are hidden)
    pub placed_bricks: usize,
    /// Tight bounds of the placed bricks, the quadtree's area
    pub bricks_bounds: Aabb,
    pub bonus_alive: bool,
    pub bonus_bricks_hit: u32,
    pub next_bonus_hit_count: u32,
    /// Broad-phase index over brick slots; rebuilt per level and lazily
    /// after a snapshot restore
    #[serde(skip)]
    pub quadtree: Option<Quadtree<u32>>,
    /// Scratch buffer for broad-phase results
    #[serde(skip)]
    pub colliders: Vec<u32>,
}

impl GameState {
    /// Create a fresh state and set up the first level
    pub fn new(seed: u64) -> Self {
        let mut state = Self {
            seed,
            rng_state: RngState::new(seed),
            transforms: vec![InstanceTransform::default(); INSTANCE_COUNT],
            tints: vec![InstanceTint::default(); INSTANCE_COUNT],
            uv_transforms: vec![UvTransform::default(); ENTITY_CLASS_COUNT],
            ball_velocity: Vec2::ZERO,
            bricks_remaining_hits: vec![0; BRICKS_COUNT],
            layout: BrickLayout::RowByRow,
            placed_bricks: 0,
            bricks_bounds: Aabb::default(),
            bonus_alive: false,
            bonus_bricks_hit: 0,
            next_bonus_hit_count: 0,
            quadtree: None,
            colliders: Vec::with_capacity(BRICKS_COUNT),
        };

        state.setup_level();
        state
    }

    /// Reset every transform, velocity, and bonus counter, re-place the
    /// bricks, and rebuild the quadtree over them.
    pub fn setup_level(&mut self) {
        self.place_bricks();

        // Ball
        *self.ball_mut() = InstanceTransform::new(
            0.0,
            ARENA_MIN_Y + 2.0,
            BALL_HALF_EXTENTS.x,
            BALL_HALF_EXTENTS.y,
        );
        self.tints[BALL_SLOT] = InstanceTint::new([1.0; 3], EntityClass::Ball.uv_slot());
        self.ball_velocity = BALL_START_DIR.normalize() * BALL_SPEED;

        // Paddle
        *self.paddle_mut() = InstanceTransform::new(
            0.0,
            ARENA_MIN_Y,
            PADDLE_HALF_EXTENTS.x,
            PADDLE_HALF_EXTENTS.y,
        );
        self.tints[PADDLE_SLOT] = InstanceTint::new([1.0; 3], EntityClass::Paddle.uv_slot());

        // Arena backdrop, slightly larger than the play area
        self.transforms[ARENA_SLOT] =
            InstanceTransform::new(0.0, 0.0, ARENA_MAX_X + 1.5, ARENA_MAX_Y + 1.5);
        self.tints[ARENA_SLOT] = InstanceTint::new([1.0; 3], EntityClass::Arena.uv_slot());

        // Bonus starts dead, parked outside the arena
        *self.bonus_mut() = InstanceTransform::new(
            OUT_OF_ARENA_X,
            0.0,
            BONUS_HALF_EXTENTS.x,
            BONUS_HALF_EXTENTS.y,
        );
        self.tints[BONUS_SLOT] = InstanceTint::new([1.0; 3], EntityClass::Bonus.uv_slot());

        self.bonus_alive = false;
        self.bonus_bricks_hit = 0;
        self.next_bonus_hit_count = self.generate_next_bonus_hit_count();

        log::info!(
            "level set up: layout={:?}, bricks={}, quadtree nodes={}",
            self.layout,
            self.placed_bricks,
            self.quadtree.as_ref().map_or(0, Quadtree::node_count),
        );
    }

    /// Restart after a lost ball or a shuffle request
    pub fn restart_level(&mut self) {
        log::info!("restarting level");
        self.setup_level();
    }

    /// Pick a layout at random, run it, hide the unplaced bricks, and
    /// rebuild the quadtree over the placed ones.
    fn place_bricks(&mut self) {
        let pick = self.rng_state.next_u32() as usize % BrickLayout::ALL.len();
        self.layout = BrickLayout::ALL[pick];

        let (placed, bounds) = match self.layout {
            BrickLayout::RowByRow => self.place_row_by_row(),
            BrickLayout::Diamond => self.place_diamond(),
            BrickLayout::Columns => self.place_columns(),
        };
        self.placed_bricks = placed;
        self.bricks_bounds = bounds;

        for hidden in placed..BRICKS_COUNT {
            self.translate_out_of_arena(BRICKS_START_SLOT + hidden);
        }

        self.rebuild_quadtree();
    }

    /// Construct a fresh tree over the brick bounds and insert every
    /// placed brick by index. A destroyed brick re-enters at its sentinel
    /// position; the narrow phase filters it out.
    pub fn rebuild_quadtree(&mut self) {
        let mut tree = Quadtree::new(&self.bricks_bounds, BRICK_HALF_EXTENTS, QUADTREE_MAX_DEPTH);
        for brick in 0..self.placed_bricks {
            tree.insert(self.brick_center(brick), brick as u32);
        }
        self.quadtree = Some(tree);
    }

    /// Broad phase for the ball: fill the scratch buffer with brick
    /// indices whose tree cells the ball touches.
    pub(crate) fn find_brick_colliders(&mut self, ball_aabb: &Aabb) -> usize {
        if self.quadtree.is_none() {
            self.rebuild_quadtree();
        }
        match self.quadtree.as_ref() {
            Some(tree) => tree.find_potential_colliders(ball_aabb, &mut self.colliders),
            None => 0,
        }
    }

    fn assign_brick_type(&mut self, brick: usize, type_index: usize) {
        self.tints[BRICKS_START_SLOT + brick] =
            InstanceTint::new(BRICK_TYPE_COLORS[type_index], EntityClass::Brick.uv_slot());
        self.bricks_remaining_hits[brick] = BRICK_TYPE_HITS[type_index];
    }

    fn place_brick_at(&mut self, brick: usize, pos: Vec2, type_index: usize) {
        assert!(brick < BRICKS_COUNT);
        self.transforms[BRICKS_START_SLOT + brick] =
            InstanceTransform::new(pos.x, pos.y, BRICK_HALF_EXTENTS.x, BRICK_HALF_EXTENTS.y);
        self.assign_brick_type(brick, type_index);
    }

    /// Full rows from the top down, each row mirrored about x = 0
    fn place_row_by_row(&mut self) -> (usize, Aabb) {
        const COLUMNS: usize = (ARENA_WIDTH / BRICK_WIDTH) as usize;
        const ROWS: usize = BRICKS_COUNT / COLUMNS;

        let mut pos = Vec2::new(BRICK_HALF_EXTENTS.x, ARENA_MAX_Y - BRICK_HEIGHT * 2.0);
        let mut brick = 0;

        for row in 0..ROWS {
            let type_index = row % BRICK_TYPE_HITS.len();

            for _ in 0..COLUMNS / 2 {
                self.place_brick_at(brick, pos, type_index);
                brick += 1;

                // Mirror about the y axis
                self.place_brick_at(brick, Vec2::new(-pos.x, pos.y), type_index);
                brick += 1;

                pos.x += BRICK_WIDTH;
            }
            pos.x = BRICK_HALF_EXTENTS.x;
            pos.y -= BRICK_HEIGHT;
        }

        let bounds = Aabb::from_min_max(
            Vec2::new(ARENA_MIN_X, pos.y),
            Vec2::new(ARENA_MAX_X, ARENA_MAX_Y - BRICK_HEIGHT),
        );
        (brick, bounds)
    }

    /// Two mirrored half-diamonds narrowing away from the middle
    fn place_diamond(&mut self) -> (usize, Aabb) {
        const COLUMNS: usize = (ARENA_WIDTH / BRICK_WIDTH) as usize;
        const ROWS: usize = BRICKS_COUNT / COLUMNS;
        const HALF_ROWS: usize = ROWS / 2;

        let start = Vec2::new(
            BRICK_HALF_EXTENTS.x,
            ARENA_MAX_Y - BRICK_HEIGHT * (HALF_ROWS as f32 + 2.0),
        );

        let mut brick = 0;
        let mut place_half = |state: &mut Self, mut pos: Vec2, row_step: f32| -> f32 {
            let mut columns = COLUMNS;
            for row in 0..HALF_ROWS {
                if columns == 0 {
                    break;
                }
                let type_index = row % BRICK_TYPE_HITS.len();

                for _ in 0..columns / 2 {
                    state.place_brick_at(brick, pos, type_index);
                    brick += 1;

                    state.place_brick_at(brick, Vec2::new(-pos.x, pos.y), type_index);
                    brick += 1;

                    pos.x += BRICK_WIDTH;
                }
                pos.x = BRICK_HALF_EXTENTS.x;
                pos.y += row_step * BRICK_HEIGHT;
                columns -= 2;
            }
            pos.y
        };

        let top_y = place_half(self, start, 1.0);
        let bottom_y = place_half(self, start - Vec2::new(0.0, BRICK_HEIGHT), -1.0);

        let bounds = Aabb::from_min_max(
            Vec2::new(ARENA_MIN_X, bottom_y),
            Vec2::new(ARENA_MAX_X, top_y),
        );
        (brick, bounds)
    }

    /// Six evenly spaced columns spanning the arena width
    fn place_columns(&mut self) -> (usize, Aabb) {
        const AVAILABLE_COLUMNS: usize = (ARENA_WIDTH / BRICK_WIDTH) as usize;
        const COLUMNS: usize = 6;
        const ROWS: usize = BRICKS_COUNT / COLUMNS;

        let spacing =
            BRICK_WIDTH * ((AVAILABLE_COLUMNS - COLUMNS) as f32 / (COLUMNS - 1) as f32 + 1.0);
        let start_x = ARENA_MIN_X + BRICK_HALF_EXTENTS.x;

        let mut pos = Vec2::new(start_x, ARENA_MAX_Y - BRICK_HEIGHT * 2.0);
        let mut brick = 0;

        for row in 0..ROWS {
            let type_index = row % BRICK_TYPE_HITS.len();

            for _ in 0..COLUMNS {
                self.place_brick_at(brick, pos, type_index);
                brick += 1;
                pos.x += spacing;
            }
            pos.x = start_x;
            pos.y -= BRICK_HEIGHT;
        }

        let bounds = Aabb::from_min_max(
            Vec2::new(ARENA_MIN_X, pos.y),
            Vec2::new(ARENA_MAX_X, ARENA_MAX_Y - BRICK_HEIGHT),
        );
        (brick, bounds)
    }

    /// A bonus spawns after this many destroyed bricks
    pub(crate) fn generate_next_bonus_hit_count(&mut self) -> u32 {
        self.rng_state.next_u32() % MAX_BONUS_HIT_INTERVAL + 1
    }

    /// Bonus-spawn accounting: called when a brick is destroyed. Once the
    /// counter reaches its target, (re)activate the bonus at the destroyed
    /// brick's position unless one is already falling.
    pub(crate) fn handle_spawn_bonus(&mut self, spawn_position: Vec2) {
        self.bonus_bricks_hit += 1;

        if self.bonus_bricks_hit == self.next_bonus_hit_count {
            self.bonus_bricks_hit = 0;
            self.next_bonus_hit_count = self.generate_next_bonus_hit_count();

            if !self.bonus_alive {
                self.bonus_mut().pos = [spawn_position.x, spawn_position.y];
            }
            self.bonus_alive = true;
        }
    }

    /// Sentinel relocation: park an instance far outside the play area
    /// instead of removing it from the fixed buffers.
    pub(crate) fn translate_out_of_arena(&mut self, slot: usize) {
        self.transforms[slot].pos[0] = OUT_OF_ARENA_X;
    }

    /// Write the per-class UV tiles into the renderer-facing buffer
    pub fn apply_atlas(&mut self, layout: &AtlasLayout) {
        for class in EntityClass::ALL {
            let tile = layout.tile(class.uv_slot());
            self.uv_transforms[class.uv_slot()] = UvTransform {
                offset: [tile.x, tile.y],
                scale: [tile.width, tile.height],
            };
        }
    }

    // Entity accessors over the flat instance buffer

    pub fn ball(&self) -> &InstanceTransform {
        &self.transforms[BALL_SLOT]
    }

    pub fn ball_mut(&mut self) -> &mut InstanceTransform {
        &mut self.transforms[BALL_SLOT]
    }

    pub fn paddle(&self) -> &InstanceTransform {
        &self.transforms[PADDLE_SLOT]
    }

    pub fn paddle_mut(&mut self) -> &mut InstanceTransform {
        &mut self.transforms[PADDLE_SLOT]
    }

    pub fn bonus(&self) -> &InstanceTransform {
        &self.transforms[BONUS_SLOT]
    }

    pub fn bonus_mut(&mut self) -> &mut InstanceTransform {
        &mut self.transforms[BONUS_SLOT]
    }

    pub fn brick(&self, brick: usize) -> &InstanceTransform {
        assert!(brick < BRICKS_COUNT);
        &self.transforms[BRICKS_START_SLOT + brick]
    }

    pub fn brick_center(&self, brick: usize) -> Vec2 {
        let pos = self.brick(brick).pos;
        Vec2::new(pos[0], pos[1])
    }

    pub fn ball_center(&self) -> Vec2 {
        Vec2::new(self.ball().pos[0], self.ball().pos[1])
    }

    pub fn paddle_center(&self) -> Vec2 {
        Vec2::new(self.paddle().pos[0], self.paddle().pos[1])
    }

    pub fn bonus_center(&self) -> Vec2 {
        Vec2::new(self.bonus().pos[0], self.bonus().pos[1])
    }

    /// Read-only renderer snapshot: all instance transforms
    pub fn transforms(&self) -> &[InstanceTransform] {
        &self.transforms
    }

    /// Read-only renderer snapshot: colors and UV indices
    pub fn tints(&self) -> &[InstanceTint] {
        &self.tints
    }

    /// Read-only renderer snapshot: per-class UV tiles
    pub fn uv_transforms(&self) -> &[UvTransform] {
        &self.uv_transforms
    }

    /// Bricks still inside the arena with hits left
    pub fn live_bricks(&self) -> usize {
        (0..self.placed_bricks)
            .filter(|&brick| self.bricks_remaining_hits[brick] > 0)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::parse_atlas;
    use crate::less_eq;

    #[test]
    fn test_instance_slot_layout() {
        assert_eq!(ARENA_SLOT, 0);
        assert_eq!(BALL_SLOT, 121);
        assert_eq!(PADDLE_SLOT, 122);
        assert_eq!(BONUS_SLOT, 123);
        assert_eq!(INSTANCE_COUNT, 124);
    }

    #[test]
    fn test_new_state_has_moving_ball_and_parked_bonus() {
        let state = GameState::new(7);

        assert_eq!(state.ball_center(), Vec2::new(0.0, ARENA_MIN_Y + 2.0));
        assert!((state.ball_velocity.length() - BALL_SPEED).abs() < 1e-3);
        assert!(!state.bonus_alive);
        assert!(state.bonus_center().x >= OUT_OF_ARENA_X);
        assert!(state.next_bonus_hit_count >= 1);
        assert!(state.next_bonus_hit_count <= MAX_BONUS_HIT_INTERVAL);
    }

    #[test]
    fn test_layouts_place_bricks_inside_bounds() {
        let mut state = GameState::new(0);

        for layout in BrickLayout::ALL {
            let (placed, bounds) = match layout {
                BrickLayout::RowByRow => state.place_row_by_row(),
                BrickLayout::Diamond => state.place_diamond(),
                BrickLayout::Columns => state.place_columns(),
            };

            assert!(placed > 0 && placed <= BRICKS_COUNT, "{layout:?}");
            let min = bounds.min();
            let max = bounds.max();
            for brick in 0..placed {
                let center = state.brick_center(brick);
                assert!(
                    less_eq(min.x, center.x - BRICK_HALF_EXTENTS.x)
                        && less_eq(center.x + BRICK_HALF_EXTENTS.x, max.x),
                    "{layout:?} brick {brick} x"
                );
                assert!(
                    less_eq(min.y, center.y - BRICK_HALF_EXTENTS.y)
                        && less_eq(center.y + BRICK_HALF_EXTENTS.y, max.y),
                    "{layout:?} brick {brick} y"
                );
            }
        }
    }

    #[test]
    fn test_row_by_row_mirrors_about_center() {
        let mut state = GameState::new(0);
        let (placed, _) = state.place_row_by_row();
        assert_eq!(placed, BRICKS_COUNT);

        // Bricks are placed in mirrored pairs
        for pair in 0..placed / 2 {
            let a = state.brick_center(pair * 2);
            let b = state.brick_center(pair * 2 + 1);
            assert_eq!(a.x, -b.x);
            assert_eq!(a.y, b.y);
        }
    }

    #[test]
    fn test_hidden_bricks_are_out_of_arena() {
        let mut state = GameState::new(3);

        // The diamond layout places fewer than the full brick count
        let (placed, bounds) = state.place_diamond();
        assert!(placed < BRICKS_COUNT);
        state.placed_bricks = placed;
        state.bricks_bounds = bounds;
        for hidden in placed..BRICKS_COUNT {
            state.translate_out_of_arena(BRICKS_START_SLOT + hidden);
        }

        for hidden in placed..BRICKS_COUNT {
            assert!(state.brick_center(hidden).x >= OUT_OF_ARENA_X);
        }
    }

    #[test]
    fn test_bonus_spawn_accounting() {
        let mut state = GameState::new(11);
        state.next_bonus_hit_count = 2;
        state.bonus_bricks_hit = 0;

        state.handle_spawn_bonus(Vec2::new(3.0, 10.0));
        assert!(!state.bonus_alive);

        state.handle_spawn_bonus(Vec2::new(3.0, 10.0));
        assert!(state.bonus_alive);
        assert_eq!(state.bonus_center(), Vec2::new(3.0, 10.0));
        assert_eq!(state.bonus_bricks_hit, 0);
    }

    #[test]
    fn test_spawn_while_alive_keeps_bonus_position() {
        let mut state = GameState::new(11);
        state.bonus_alive = true;
        state.bonus_mut().pos = [1.0, 2.0];
        state.next_bonus_hit_count = 1;
        state.bonus_bricks_hit = 0;

        state.handle_spawn_bonus(Vec2::new(9.0, 9.0));
        assert!(state.bonus_alive);
        assert_eq!(state.bonus_center(), Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_rng_replay_is_deterministic() {
        let mut a = RngState::new(42);
        let mut b = RngState::new(42);
        let first: Vec<u32> = (0..5).map(|_| a.next_u32()).collect();
        let second: Vec<u32> = (0..5).map(|_| b.next_u32()).collect();
        assert_eq!(first, second);

        // Restoring mid-stream continues where it left off
        let mut c = RngState { seed: 42, draws: 3 };
        assert_eq!(c.next_u32(), first[3]);
    }

    #[test]
    fn test_apply_atlas_fills_uv_buffer() {
        let descriptor = "\
arena: 0 0 256 256
brick: 0 0 64 32
ball: 64 0 32 32
paddle: 96 0 96 16
bonus: 192 0 32 16
";
        let layout = parse_atlas(descriptor, 256, 256).unwrap();
        let mut state = GameState::new(1);
        state.apply_atlas(&layout);

        let brick_uv = state.uv_transforms()[EntityClass::Brick.uv_slot()];
        assert_eq!(brick_uv.scale, [0.25, 0.125]);
    }
}
