//! Collision detection and response
//!
//! Circle-vs-box tests for balls, box-vs-box tests for lasers and pickups,
//! and the two bounce rules: steerable paddle bounces and the flat vertical
//! flip used for blocks.

use glam::Vec2;

use crate::Aabb;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Closest point on the box to the circle center
    pub point: Vec2,
    /// Surface normal pointing toward the circle center
    pub normal: Vec2,
    /// Penetration depth
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check a circle against an axis-aligned box
pub fn circle_aabb_collision(center: Vec2, radius: f32, aabb: &Aabb) -> CollisionResult {
    let closest = aabb.closest_point(center);
    let delta = center - closest;
    let dist_sq = delta.length_squared();

    if dist_sq > radius * radius {
        return CollisionResult::miss();
    }

    if dist_sq > 1e-6 {
        let dist = dist_sq.sqrt();
        return CollisionResult {
            hit: true,
            point: closest,
            normal: delta / dist,
            penetration: radius - dist,
        };
    }

    // Center is inside the box: push out along the shallowest axis
    let from_center = center - aabb.center;
    let overlap = aabb.half - from_center.abs();
    let (normal, depth) = if overlap.x < overlap.y {
        (Vec2::new(from_center.x.signum(), 0.0), overlap.x)
    } else {
        (Vec2::new(0.0, from_center.y.signum()), overlap.y)
    };
    CollisionResult {
        hit: true,
        point: center,
        normal,
        penetration: depth + radius,
    }
}

/// Box-vs-box overlap (lasers, pickups)
#[inline]
pub fn aabb_overlap(a: &Aabb, b: &Aabb) -> bool {
    let d = (a.center - b.center).abs();
    d.x <= a.half.x + b.half.x && d.y <= a.half.y + b.half.y
}

/// Velocity after a ball meets the paddle.
///
/// Vertical speed is always sent upward. With `steering = Some(k)` the
/// horizontal speed becomes `k * (ball_x - paddle_x)`; a dead-center hit uses
/// `nudge` as the offset so the ball never settles into a vertical loop.
/// With `None` the horizontal speed is left alone.
pub fn paddle_bounce(vel: Vec2, ball_x: f32, paddle_x: f32, steering: Option<f32>, nudge: f32) -> Vec2 {
    let vy = -vel.y.abs();
    let vx = match steering {
        Some(k) => {
            let offset = ball_x - paddle_x;
            let offset = if offset == 0.0 { nudge } else { offset };
            k * offset
        }
        None => vel.x,
    };
    Vec2::new(vx, vy)
}

/// Flat block response: only the vertical component changes.
///
/// The ball is sent away from the block's vertical center and lifted clear
/// of the block's top or bottom face. No normal-based reflection happens, so
/// side and corner hits still bounce vertically.
pub fn block_bounce(pos: &mut Vec2, vel: &mut Vec2, radius: f32, block: &Aabb) {
    if pos.y < block.center.y {
        vel.y = -vel.y.abs();
        pos.y = pos.y.min(block.min().y - radius);
    } else {
        vel.y = vel.y.abs();
        pos.y = pos.y.max(block.max().y + radius);
    }
}
