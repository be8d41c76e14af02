//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod body;
pub mod collision;
pub mod grid;
pub mod state;
pub mod tick;

pub use body::{Axis, Ball, Bounds, Laser, Paddle, Pickup};
pub use collision::{CollisionResult, aabb_overlap, block_bounce, circle_aabb_collision, paddle_bounce};
pub use grid::{Block, DamageOutcome, Grid};
pub use state::{BallView, GameEvent, GamePhase, GameState, RoundState, Snapshot};
pub use tick::{TickInput, tick};
