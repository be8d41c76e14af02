//! Game state and core simulation types
//!
//! Everything one round needs lives in [`GameState`]: bodies, the grid, the
//! round counters and the seeded RNG. Nothing here is global.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::body::{Ball, Bounds, Laser, Paddle, Pickup};
use super::grid::{Block, Grid};
use crate::Aabb;
use crate::progression::{PickupEffect, RoundModifiers, UpgradeKind};
use crate::tuning::{Tuning, Variant};

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Ball locked on the paddle, waiting for launch input
    Serve,
    /// Ball(s) in motion, collisions live
    Playing,
    /// Grid cleared, waiting for an upgrade choice
    RoundWon,
    /// Lives exhausted; the session records the score next
    RoundLost,
    /// Score recorded, physics halted until restart
    GameOver,
}

/// Discrete things that happened during a tick, for audio and visuals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Launch,
    PaddleHit,
    WallHit,
    BlockHit { id: u32, remaining: i32 },
    BlockDestroyed { id: u32, pos: Vec2, tint: u8 },
    ItemSpawned { pos: Vec2 },
    ItemCollected { effect: PickupEffect },
    LaserFired,
    BallLost,
    LifeLost { remaining: u32 },
    LevelCleared { level: u32 },
    UpgradeApplied { kind: UpgradeKind },
    GameOver { score: u64, rank: Option<usize> },
}

/// Per-round counters and modifiers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundState {
    pub score: u64,
    pub lives: u32,
    /// 1-based level number
    pub level: u32,
    /// Upgrades currently active (laser enables firing)
    pub upgrades: Vec<UpgradeKind>,
    pub laser_level: u32,
    /// Clock time (ms) of the last automatic laser volley
    pub last_fired_ms: f64,
    /// Damage new balls are spawned with
    pub ball_damage: i32,
    /// Radius new balls are spawned with
    pub ball_radius: f32,
    /// Multiplier on every launch and spawn velocity
    pub speed_scale: f32,
    /// Extra balls that launch with the next serve
    pub pending_balls: u32,
    /// Currency collected this round, not yet banked
    pub gold_earned: u64,
}

impl RoundState {
    pub fn new(tuning: &Tuning, modifiers: RoundModifiers) -> Self {
        Self {
            score: 0,
            lives: tuning.starting_lives,
            level: 1,
            upgrades: Vec::new(),
            laser_level: 0,
            last_fired_ms: 0.0,
            ball_damage: modifiers.damage.max(1),
            ball_radius: tuning.ball_radius,
            speed_scale: modifiers.speed_scale,
            pending_balls: 0,
            gold_earned: 0,
        }
    }

    pub fn has_upgrade(&self, kind: UpgradeKind) -> bool {
        self.upgrades.contains(&kind)
    }
}

/// Complete state of one round
#[derive(Debug, Clone)]
pub struct GameState {
    pub tuning: Tuning,
    pub bounds: Bounds,
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub round: RoundState,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Simulation clock in milliseconds
    pub clock_ms: f64,
    pub paddle: Paddle,
    /// Balls, sorted by id
    pub balls: Vec<Ball>,
    pub grid: Grid,
    pub lasers: Vec<Laser>,
    pub pickups: Vec<Pickup>,
    /// Upgrade choices on offer while in `RoundWon`
    pub offered: Vec<UpgradeKind>,
    /// Events since the last drain
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a fresh round at level 1 with one locked ball
    pub fn new(tuning: Tuning, seed: u64, modifiers: RoundModifiers) -> Self {
        let bounds = Bounds::new(tuning.world_width, tuning.world_height);
        let paddle = Paddle::new(
            tuning.world_width / 2.0,
            tuning.paddle_y,
            tuning.paddle_half_width,
            tuning.paddle_half_height,
        );
        let round = RoundState::new(&tuning, modifiers);

        let mut state = Self {
            tuning,
            bounds,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            round,
            phase: GamePhase::Serve,
            time_ticks: 0,
            clock_ms: 0.0,
            paddle,
            balls: Vec::new(),
            grid: Grid::default(),
            lasers: Vec::new(),
            pickups: Vec::new(),
            offered: Vec::new(),
            events: Vec::new(),
            next_id: 1,
        };

        state.load_level(1);
        state.spawn_ball_locked();
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Rebuild the grid for `level`
    pub fn load_level(&mut self, level: u32) {
        let tint_count = self.tuning.tint_count.max(1);
        let layout = self.tuning.grid;
        let curve = self.tuning.health_curve;
        let width = self.tuning.world_width;

        self.grid = if self.tuning.variant == Variant::Classic {
            Grid::build(level, &layout, width, curve, |row, _| (row % tint_count as u32) as u8)
        } else {
            let rng = &mut self.rng;
            Grid::build(level, &layout, width, curve, |_, _| rng.random_range(0..tint_count))
        };
    }

    /// Spawn a ball resting on the paddle
    pub fn spawn_ball_locked(&mut self) {
        let id = self.next_entity_id();
        let mut ball = Ball::new(id, self.round.ball_radius, self.round.ball_damage);
        ball.follow(&self.paddle, self.tuning.ball_rest_offset);
        self.balls.push(ball);
    }

    /// Spawn a free ball at `pos` moving with `vel`
    pub fn spawn_ball_free(&mut self, pos: Vec2, vel: Vec2) {
        let id = self.next_entity_id();
        let mut ball = Ball::new(id, self.round.ball_radius, self.round.ball_damage);
        ball.locked = false;
        ball.pos = pos;
        ball.vel = vel;
        self.balls.push(ball);
    }

    /// Leave `RoundWon` for the next level's serve
    pub fn advance_level(&mut self) {
        self.round.level += 1;
        self.balls.clear();
        self.lasers.clear();
        self.offered.clear();
        self.load_level(self.round.level);
        self.spawn_ball_locked();
        self.phase = GamePhase::Serve;
        log::info!("Advanced to level {}", self.round.level);
    }

    pub fn push_event(&mut self, event: GameEvent) {
        log::debug!("event: {:?}", event);
        self.events.push(event);
    }

    /// Take every event emitted since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Ensure deterministic iteration order
    pub fn normalize_order(&mut self) {
        self.balls.sort_by_key(|b| b.id);
        self.lasers.sort_by_key(|l| l.id);
        self.pickups.sort_by_key(|p| p.id);
    }

    /// Read-only view for a renderer
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            score: self.round.score,
            lives: self.round.lives,
            level: self.round.level,
            laser_level: self.round.laser_level,
            paddle: self.paddle.aabb(),
            balls: self
                .balls
                .iter()
                .map(|b| BallView {
                    id: b.id,
                    pos: b.pos,
                    radius: b.radius,
                    locked: b.locked,
                })
                .collect(),
            blocks: self.grid.live_blocks().cloned().collect(),
            lasers: self.lasers.iter().map(|l| l.aabb()).collect(),
            pickups: self.pickups.iter().map(|p| p.aabb()).collect(),
            offered: self.offered.clone(),
        }
    }
}

/// Ball as seen by a renderer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BallView {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    pub locked: bool,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub score: u64,
    pub lives: u32,
    pub level: u32,
    pub laser_level: u32,
    pub paddle: Aabb,
    pub balls: Vec<BallView>,
    pub blocks: Vec<Block>,
    pub lasers: Vec<Aabb>,
    pub pickups: Vec<Aabb>,
    pub offered: Vec<UpgradeKind>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_serves_one_locked_ball() {
        let state = GameState::new(Tuning::default(), 7, RoundModifiers::default());
        assert_eq!(state.phase, GamePhase::Serve);
        assert_eq!(state.balls.len(), 1);
        assert!(state.balls[0].locked);
        assert_eq!(state.balls[0].pos.y, state.paddle.pos.y - 25.0);
        assert_eq!(state.round.lives, 3);
        assert_eq!(state.round.level, 1);
        assert_eq!(state.grid.live_count(), 50);
    }

    #[test]
    fn test_classic_ball_rests_above_paddle_face() {
        let tuning = Tuning::preset(Variant::Classic);
        let state = GameState::new(tuning.clone(), 7, RoundModifiers::default());
        let ball = &state.balls[0];
        let face = state.paddle.pos.y - tuning.paddle_half_height;
        assert_eq!(ball.pos.y, face - tuning.ball_radius - 2.0);
        assert_eq!(ball.pos.y, state.paddle.pos.y - 17.0);
    }

    #[test]
    fn test_same_seed_same_tints() {
        let a = GameState::new(Tuning::default(), 42, RoundModifiers::default());
        let b = GameState::new(Tuning::default(), 42, RoundModifiers::default());
        let tints_a: Vec<u8> = a.grid.blocks.iter().map(|b| b.tint).collect();
        let tints_b: Vec<u8> = b.grid.blocks.iter().map(|b| b.tint).collect();
        assert_eq!(tints_a, tints_b);
        assert!(tints_a.iter().all(|&t| t < 4));
    }

    #[test]
    fn test_classic_tints_by_row() {
        let state = GameState::new(Tuning::preset(Variant::Classic), 1, RoundModifiers::default());
        assert_eq!(state.grid.blocks.len(), 35);
        assert!(state.grid.blocks[..7].iter().all(|b| b.tint == 0));
        assert!(state.grid.blocks[28..].iter().all(|b| b.tint == 4));
    }

    #[test]
    fn test_modifiers_seed_round() {
        let mods = RoundModifiers {
            damage: 3,
            speed_scale: 1.2,
        };
        let state = GameState::new(Tuning::preset(Variant::Meta), 1, mods);
        assert_eq!(state.round.ball_damage, 3);
        assert_eq!(state.balls[0].damage, 3);
        assert!((state.round.speed_scale - 1.2).abs() < f32::EPSILON);
    }

    #[test]
    fn test_advance_level_rebuilds() {
        let mut state = GameState::new(Tuning::preset(Variant::Meta), 1, RoundModifiers::default());
        state.phase = GamePhase::RoundWon;
        state.offered = vec![UpgradeKind::Life];
        state.advance_level();
        assert_eq!(state.round.level, 2);
        assert_eq!(state.phase, GamePhase::Serve);
        assert_eq!(state.balls.len(), 1);
        assert!(state.offered.is_empty());
        assert!(state.grid.blocks.iter().all(|b| b.health == 2));
    }

    #[test]
    fn test_snapshot_lists_only_live_blocks() {
        let mut state = GameState::new(Tuning::default(), 3, RoundModifiers::default());
        state.grid.apply_damage(1, 1);
        let snap = state.snapshot();
        assert_eq!(snap.blocks.len(), 49);
        assert_eq!(snap.balls.len(), 1);
        assert!(serde_json::to_string(&snap).is_ok());
    }

    #[test]
    fn test_drain_events_empties_queue() {
        let mut state = GameState::new(Tuning::default(), 3, RoundModifiers::default());
        state.push_event(GameEvent::Launch);
        assert_eq!(state.drain_events(), vec![GameEvent::Launch]);
        assert!(state.drain_events().is_empty());
    }
}
