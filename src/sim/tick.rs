//! Fixed timestep simulation tick
//!
//! One call per frame. Within a playing tick the order is fixed:
//! paddle, firing, integration, then ball–paddle, ball–block, laser–block
//! and paddle–pickup resolution, then culling and the lost-ball check.
//! Resolving the paddle first keeps a ball from being deflected twice.

use glam::Vec2;
use rand::Rng;

use super::body::{Laser, Pickup};
use super::collision::{aabb_overlap, block_bounce, circle_aabb_collision, paddle_bounce};
use super::state::{GameEvent, GamePhase, GameState};
use crate::progression::{self, multiball_velocity};

/// Input latched for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Absolute paddle x (pointer); wins over keyboard drive
    pub target_x: Option<f32>,
    /// Keyboard direction: -1 left, 0 idle, 1 right
    pub move_dir: f32,
    /// Launch ball (click/tap/key)
    pub launch: bool,
    /// Manual laser fire
    pub fire: bool,
    /// Idle/demo mode - autopilot plays the game
    pub idle_mode: bool,
}

/// Advance the round by one timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    match state.phase {
        GamePhase::RoundWon | GamePhase::RoundLost | GamePhase::GameOver => return,
        GamePhase::Serve | GamePhase::Playing => {}
    }

    let mut input = input.clone();
    if input.idle_mode {
        autopilot(state, &mut input);
    }
    let input = &input;

    state.time_ticks += 1;
    state.clock_ms += dt as f64 * 1000.0;

    // Paddle
    if let Some(x) = input.target_x {
        state.paddle.set_target_x(x, &state.bounds);
    } else {
        let speed = state.tuning.paddle_key_speed;
        state.paddle.drive(input.move_dir, speed, dt, &state.bounds);
    }

    match state.phase {
        GamePhase::Serve => {
            let rest = state.tuning.ball_rest_offset;
            for ball in state.balls.iter_mut() {
                ball.follow(&state.paddle, rest);
            }

            // Drops from the previous life keep falling
            for pickup in state.pickups.iter_mut() {
                pickup.integrate(dt);
            }
            collect_pickups(state);
            let bounds = state.bounds;
            state.pickups.retain(|p| !bounds.has_exited(p.pos.y));

            if input.launch {
                launch(state);
            }
        }
        GamePhase::Playing => step_playing(state, input, dt),
        _ => {}
    }

    // Ensure deterministic ordering
    state.normalize_order();
}

/// Release every locked ball plus any deferred multiball spawns
fn launch(state: &mut GameState) {
    let jitter = state.tuning.launch_jitter.abs();
    let speed = state.tuning.launch_speed;
    let scale = state.round.speed_scale;

    let mut origin = None;
    for ball in state.balls.iter_mut().filter(|b| b.locked) {
        let vx = state.rng.random_range(-jitter..=jitter);
        ball.launch(Vec2::new(vx, -speed) * scale);
        origin.get_or_insert(ball.pos);
    }

    if let Some(pos) = origin {
        for _ in 0..std::mem::take(&mut state.round.pending_balls) {
            let vel = multiball_velocity(&state.tuning, scale, &mut state.rng);
            state.spawn_ball_free(pos, vel);
        }
    }

    state.phase = GamePhase::Playing;
    state.push_event(GameEvent::Launch);
    log::debug!("Launched {} ball(s)", state.balls.len());
}

fn step_playing(state: &mut GameState, input: &TickInput, dt: f32) {
    // Firing: manual shots are immediate, the auto-fire volley is rate limited
    if state.round.has_upgrade(progression::UpgradeKind::Laser) {
        let mut fired = false;
        if input.fire {
            fire_lasers(state);
            fired = true;
        }
        if state.clock_ms > state.round.last_fired_ms + state.tuning.fire_cooldown_ms {
            if !fired {
                fire_lasers(state);
            }
            state.round.last_fired_ms = state.clock_ms;
        }
    }

    // Integrate
    let bounds = state.bounds;
    let mut wall_hits = 0;
    for ball in state.balls.iter_mut() {
        if bounds.advance_ball(ball, dt) {
            wall_hits += 1;
        }
    }
    for _ in 0..wall_hits {
        state.push_event(GameEvent::WallHit);
    }
    for laser in state.lasers.iter_mut() {
        laser.integrate(dt);
    }
    for pickup in state.pickups.iter_mut() {
        pickup.integrate(dt);
    }

    // (a) ball–paddle
    resolve_paddle(state);

    // (b) ball–block
    if resolve_ball_blocks(state) {
        return;
    }

    // (c) laser–block
    if resolve_lasers(state) {
        return;
    }

    // (d) paddle–pickup
    collect_pickups(state);

    // Cull
    let before = state.balls.len();
    state.balls.retain(|b| !bounds.has_exited(b.pos.y));
    for _ in state.balls.len()..before {
        state.push_event(GameEvent::BallLost);
    }
    state.lasers.retain(|l| !l.out_of_bounds());
    state.pickups.retain(|p| !bounds.has_exited(p.pos.y));

    if state.balls.is_empty() {
        lose_life(state);
    }
}

fn resolve_paddle(state: &mut GameState) {
    let paddle_box = state.paddle.aabb();
    let steering = state.tuning.paddle_steering;
    let nudge = state.tuning.center_nudge;

    let mut hits = 0;
    for ball in state.balls.iter_mut().filter(|b| !b.locked) {
        if ball.vel.y <= 0.0 {
            continue;
        }
        if !circle_aabb_collision(ball.pos, ball.radius, &paddle_box).hit {
            continue;
        }
        let nudge = if state.rng.random_bool(0.5) { nudge } else { -nudge };
        ball.vel = paddle_bounce(ball.vel, ball.pos.x, paddle_box.center.x, steering, nudge);
        ball.pos.y = ball.pos.y.min(paddle_box.min().y - ball.radius);
        hits += 1;
    }
    for _ in 0..hits {
        state.push_event(GameEvent::PaddleHit);
    }
}

/// Returns true once the grid is cleared
fn resolve_ball_blocks(state: &mut GameState) -> bool {
    for i in 0..state.balls.len() {
        let (pos, radius) = (state.balls[i].pos, state.balls[i].radius);
        if state.balls[i].locked {
            continue;
        }

        // Every overlapping block counts, in discovery order
        let hits: Vec<_> = state
            .grid
            .live_blocks()
            .filter(|b| circle_aabb_collision(pos, radius, &b.aabb()).hit)
            .map(|b| (b.id, b.aabb()))
            .collect();

        for (block_id, aabb) in hits {
            let ball = &mut state.balls[i];
            block_bounce(&mut ball.pos, &mut ball.vel, ball.radius, &aabb);
            let damage = ball.damage;
            if damage_block(state, block_id, damage) {
                return true;
            }
        }
    }
    false
}

/// Returns true once the grid is cleared
fn resolve_lasers(state: &mut GameState) -> bool {
    let damage = state.round.ball_damage;
    let mut i = 0;
    while i < state.lasers.len() {
        let laser_box = state.lasers[i].aabb();
        let target = state
            .grid
            .live_blocks()
            .find(|b| aabb_overlap(&laser_box, &b.aabb()))
            .map(|b| b.id);

        match target {
            Some(block_id) => {
                // One shot: the laser goes whether or not the block survives
                state.lasers.remove(i);
                if damage_block(state, block_id, damage) {
                    return true;
                }
            }
            None => i += 1,
        }
    }
    false
}

/// Shared damage, score and drop path. Returns true if this cleared the grid.
fn damage_block(state: &mut GameState, block_id: u32, damage: i32) -> bool {
    let Some(outcome) = state.grid.apply_damage(block_id, damage) else {
        return false;
    };

    if !outcome.destroyed {
        state.push_event(GameEvent::BlockHit {
            id: block_id,
            remaining: outcome.remaining_health,
        });
        return false;
    }

    let Some((pos, tint)) = state.grid.get(block_id).map(|b| (b.pos, b.tint)) else {
        return false;
    };
    state.round.score += state.tuning.block_reward;
    state.round.gold_earned += state.tuning.gold_per_block;
    state.push_event(GameEvent::BlockDestroyed { id: block_id, pos, tint });

    if state.grid.is_cleared() {
        win_round(state);
        return true;
    }

    if state.rng.random_bool(state.tuning.drop_chance.clamp(0.0, 1.0)) {
        spawn_pickup(state, pos);
    }
    false
}

fn win_round(state: &mut GameState) {
    for ball in state.balls.iter_mut() {
        ball.vel = Vec2::ZERO;
    }
    let pool = state.tuning.upgrade_pool.clone();
    let count = state.tuning.offer_count;
    state.offered = progression::offer_choices(&pool, count, &mut state.rng);
    state.phase = GamePhase::RoundWon;
    let level = state.round.level;
    state.push_event(GameEvent::LevelCleared { level });
    log::info!("Level {} cleared, score {}", level, state.round.score);
}

fn lose_life(state: &mut GameState) {
    state.round.lives = state.round.lives.saturating_sub(1);
    let remaining = state.round.lives;
    state.push_event(GameEvent::LifeLost { remaining });

    if remaining == 0 {
        state.phase = GamePhase::RoundLost;
        log::info!("Out of lives, final score {}", state.round.score);
    } else {
        state.balls.clear();
        state.lasers.clear();
        state.spawn_ball_locked();
        state.phase = GamePhase::Serve;
        log::info!("Life lost, {} remaining", remaining);
    }
}

fn spawn_pickup(state: &mut GameState, pos: Vec2) {
    let id = state.next_entity_id();
    let half = Vec2::splat(state.tuning.pickup_half_size);
    let vel = Vec2::new(0.0, state.tuning.pickup_fall_speed);
    state.pickups.push(Pickup { id, pos, vel, half });
    state.push_event(GameEvent::ItemSpawned { pos });
}

fn collect_pickups(state: &mut GameState) {
    let paddle_box = state.paddle.aabb();
    let (caught, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut state.pickups)
        .into_iter()
        .partition(|p| aabb_overlap(&p.aabb(), &paddle_box));
    state.pickups = kept;

    for _ in caught {
        let effect = progression::roll_pickup_effect(state);
        progression::apply_pickup_effect(state, effect);
    }
}

/// Spawn a laser pair at the paddle edges
fn fire_lasers(state: &mut GameState) {
    let level = state.round.laser_level as f32;
    let speed = state.tuning.laser_base_speed + level * state.tuning.laser_speed_per_level;
    let half = Vec2::new(
        state.tuning.laser_half_width * (1.0 + level * state.tuning.laser_scale_per_level),
        state.tuning.laser_half_height,
    );
    let paddle = state.paddle.pos;
    let offset = state.tuning.laser_offset_x;

    for dx in [-offset, offset] {
        let id = state.next_entity_id();
        state.lasers.push(Laser {
            id,
            pos: Vec2::new(paddle.x + dx, paddle.y - 10.0),
            vel: Vec2::new(0.0, -speed),
            half,
        });
    }
    state.push_event(GameEvent::LaserFired);
}

/// Demo autopilot: launch immediately, chase the lowest descending ball,
/// otherwise go for a falling pickup. Lasers are left to the auto-fire.
fn autopilot(state: &GameState, input: &mut TickInput) {
    if state.phase == GamePhase::Serve {
        input.launch = true;
    }

    let threat = state
        .balls
        .iter()
        .filter(|b| !b.locked && b.vel.y > 0.0)
        .max_by(|a, b| a.pos.y.partial_cmp(&b.pos.y).unwrap_or(std::cmp::Ordering::Equal));

    let target = match threat {
        Some(ball) => {
            // Oscillating offset so the ball is not returned dead-center
            let t = state.time_ticks as f32 * 0.01;
            let offset = (t.sin() * 0.5 + (t * 0.7).sin() * 0.25) * state.paddle.half.x;
            Some(ball.pos.x + offset)
        }
        None => state
            .pickups
            .iter()
            .max_by(|a, b| a.pos.y.partial_cmp(&b.pos.y).unwrap_or(std::cmp::Ordering::Equal))
            .map(|p| p.pos.x),
    };

    if target.is_some() {
        input.target_x = target;
    }
}
