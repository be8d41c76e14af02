//! Moving actors and their kinematics
//!
//! Left, right and top edges of the world are walls. The bottom edge is an
//! exit: anything crossing it leaves play.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Aabb;

/// Velocity axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Playfield extents, origin at top-left, +y down
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Advance a ball by `dt`, reflecting off the side and top walls.
    ///
    /// Walls are tested against the *next* position so a fast ball turns
    /// around before it can sink into a wall. Returns true on a wall bounce.
    pub fn advance_ball(&self, ball: &mut Ball, dt: f32) -> bool {
        let r = ball.radius;
        let next = ball.pos + ball.vel * dt;
        let mut bounced = false;

        if (next.x < r && ball.vel.x < 0.0) || (next.x > self.width - r && ball.vel.x > 0.0) {
            ball.reflect(Axis::X);
            bounced = true;
        }
        if next.y < r && ball.vel.y < 0.0 {
            ball.reflect(Axis::Y);
            bounced = true;
        }

        ball.integrate(dt);
        ball.pos.x = ball.pos.x.clamp(r, (self.width - r).max(r));
        ball.pos.y = ball.pos.y.max(r);
        bounced
    }

    /// True once a center has crossed the bottom exit
    #[inline]
    pub fn has_exited(&self, y: f32) -> bool {
        y > self.height
    }
}

/// A ball entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Damage dealt per block contact
    pub damage: i32,
    /// Resting on the paddle, waiting for launch
    pub locked: bool,
}

impl Ball {
    pub fn new(id: u32, radius: f32, damage: i32) -> Self {
        Self {
            id,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            radius,
            damage: damage.max(1),
            locked: true,
        }
    }

    #[inline]
    pub fn integrate(&mut self, dt: f32) {
        self.pos += self.vel * dt;
    }

    #[inline]
    pub fn reflect(&mut self, axis: Axis) {
        match axis {
            Axis::X => self.vel.x = -self.vel.x,
            Axis::Y => self.vel.y = -self.vel.y,
        }
    }

    /// Keep a locked ball riding on the paddle
    pub fn follow(&mut self, paddle: &Paddle, rest_offset: f32) {
        if self.locked {
            self.pos = Vec2::new(paddle.pos.x, paddle.pos.y - rest_offset);
        }
    }

    /// Release a locked ball with the given velocity
    pub fn launch(&mut self, vel: Vec2) {
        if self.locked {
            self.locked = false;
            self.vel = vel;
        }
    }

    /// Scale speed while keeping direction
    pub fn scale_speed(&mut self, factor: f32) {
        self.vel *= factor;
    }
}

/// The player's paddle. Only x moves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    pub pos: Vec2,
    pub half: Vec2,
    /// Half width before any widening
    pub base_half_width: f32,
    /// Effective widenings applied so far
    pub width_level: u32,
    /// Horizontal velocity from keyboard drive (px/s)
    pub vel_x: f32,
}

impl Paddle {
    pub fn new(x: f32, y: f32, half_width: f32, half_height: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            half: Vec2::new(half_width, half_height),
            base_half_width: half_width,
            width_level: 0,
            vel_x: 0.0,
        }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, self.half)
    }

    /// Multiply width by `growth` unless `cap` widenings already happened.
    /// Returns whether the width changed; capped calls are no-ops, not errors.
    pub fn widen(&mut self, growth: f32, cap: u32) -> bool {
        if self.width_level >= cap {
            return false;
        }
        self.half.x *= growth;
        self.width_level += 1;
        true
    }

    /// Jump to an absolute pointer target, kept fully on screen
    pub fn set_target_x(&mut self, x: f32, bounds: &Bounds) {
        self.pos.x = self.clamp_x(x, bounds);
        self.vel_x = 0.0;
    }

    /// Drive with a keyboard direction (-1, 0, 1)
    pub fn drive(&mut self, direction: f32, speed: f32, dt: f32, bounds: &Bounds) {
        self.vel_x = if direction == 0.0 {
            0.0
        } else {
            direction.signum() * speed
        };
        let x = self.pos.x + self.vel_x * dt;
        self.pos.x = self.clamp_x(x, bounds);
    }

    fn clamp_x(&self, x: f32, bounds: &Bounds) -> f32 {
        let lo = self.half.x;
        let hi = (bounds.width - self.half.x).max(lo);
        x.clamp(lo, hi)
    }
}

/// An upward laser bolt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Laser {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub half: Vec2,
}

impl Laser {
    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, self.half)
    }

    #[inline]
    pub fn integrate(&mut self, dt: f32) {
        self.pos += self.vel * dt;
    }

    /// Gone once its center passes the top edge
    pub fn out_of_bounds(&self) -> bool {
        self.pos.y < 0.0
    }
}

/// A falling collectible dropped by a destroyed block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub half: Vec2,
}

impl Pickup {
    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, self.half)
    }

    #[inline]
    pub fn integrate(&mut self, dt: f32) {
        self.pos += self.vel * dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ball_at(pos: Vec2, vel: Vec2) -> Ball {
        let mut ball = Ball::new(1, 8.0, 1);
        ball.locked = false;
        ball.pos = pos;
        ball.vel = vel;
        ball
    }

    #[test]
    fn test_laser_culled_by_center() {
        let mut laser = Laser {
            id: 1,
            pos: Vec2::new(50.0, 0.0),
            vel: Vec2::new(0.0, -800.0),
            half: Vec2::new(3.0, 10.0),
        };
        // Still half visible at the edge
        assert!(!laser.out_of_bounds());
        laser.pos.y = -0.1;
        assert!(laser.out_of_bounds());
    }

    #[test]
    fn test_integrate_and_reflect() {
        let mut ball = ball_at(Vec2::new(100.0, 100.0), Vec2::new(60.0, -120.0));
        ball.integrate(0.5);
        assert_eq!(ball.pos, Vec2::new(130.0, 40.0));
        ball.reflect(Axis::Y);
        assert_eq!(ball.vel, Vec2::new(60.0, 120.0));
        ball.reflect(Axis::X);
        assert_eq!(ball.vel, Vec2::new(-60.0, 120.0));
    }

    #[test]
    fn test_side_wall_checked_against_next_position() {
        let bounds = Bounds::new(400.0, 600.0);
        // One step would put the ball 12px past the right wall
        let mut ball = ball_at(Vec2::new(388.0, 300.0), Vec2::new(1200.0, 0.0));
        assert!(bounds.advance_ball(&mut ball, 1.0 / 60.0));
        assert!(ball.vel.x < 0.0);
        assert!(ball.pos.x <= 400.0 - ball.radius);
    }

    #[test]
    fn test_top_wall_reflects_bottom_does_not() {
        let bounds = Bounds::new(400.0, 600.0);
        let mut ball = ball_at(Vec2::new(200.0, 10.0), Vec2::new(0.0, -600.0));
        assert!(bounds.advance_ball(&mut ball, 1.0 / 60.0));
        assert!(ball.vel.y > 0.0);
        assert!(ball.pos.y >= ball.radius);

        let mut falling = ball_at(Vec2::new(200.0, 595.0), Vec2::new(0.0, 600.0));
        assert!(!bounds.advance_ball(&mut falling, 1.0 / 60.0));
        assert!(bounds.has_exited(falling.pos.y));
    }

    #[test]
    fn test_penetration_never_grows() {
        let bounds = Bounds::new(400.0, 600.0);
        let mut ball = ball_at(Vec2::new(200.0, 300.0), Vec2::new(-3000.0, 0.0));
        for _ in 0..200 {
            bounds.advance_ball(&mut ball, 1.0 / 120.0);
            assert!(ball.pos.x >= ball.radius);
            assert!(ball.pos.x <= bounds.width - ball.radius);
        }
    }

    #[test]
    fn test_locked_ball_follows_paddle() {
        let paddle = Paddle::new(321.0, 1770.0, 50.0, 10.0);
        let mut ball = Ball::new(1, 8.0, 1);
        ball.follow(&paddle, 25.0);
        assert_eq!(ball.pos, Vec2::new(321.0, 1745.0));

        ball.launch(Vec2::new(10.0, -600.0));
        assert!(!ball.locked);
        ball.follow(&paddle, 25.0);
        // Unlocked balls no longer track the paddle
        ball.integrate(1.0);
        assert_eq!(ball.pos, Vec2::new(331.0, 1145.0));
    }

    #[test]
    fn test_widen_respects_cap() {
        let mut paddle = Paddle::new(540.0, 1770.0, 50.0, 10.0);
        let results: Vec<bool> = (0..5).map(|_| paddle.widen(1.25, 3)).collect();
        assert_eq!(results, vec![true, true, true, false, false]);
        assert_eq!(paddle.width_level, 3);
        assert!((paddle.half.x - 50.0 * 1.25_f32.powi(3)).abs() < 0.001);
    }

    #[test]
    fn test_paddle_stays_on_screen() {
        let bounds = Bounds::new(1080.0, 1920.0);
        let mut paddle = Paddle::new(540.0, 1770.0, 50.0, 10.0);
        paddle.set_target_x(-40.0, &bounds);
        assert_eq!(paddle.pos.x, 50.0);
        paddle.set_target_x(5000.0, &bounds);
        assert_eq!(paddle.pos.x, 1030.0);

        paddle.drive(-1.0, 600.0, 0.5, &bounds);
        assert_eq!(paddle.pos.x, 730.0);
        assert_eq!(paddle.vel_x, -600.0);
        paddle.drive(0.0, 600.0, 0.5, &bounds);
        assert_eq!(paddle.vel_x, 0.0);
    }
}
