//! Neon Breaker - an engine-agnostic block breaker core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, kinematics, collisions, round flow)
//! - `progression`: Upgrades, persistent currency and permanent levels
//! - `session`: Top-level state machine owning one round at a time
//! - `persistence`: Flat key/value save blobs
//! - `tuning`: Data-driven game balance
//!
//! Nothing here draws. A renderer reads [`sim::Snapshot`]s and maps
//! [`sim::GameEvent`]s to effects.

pub mod audio;
pub mod highscores;
pub mod persistence;
pub mod progression;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use highscores::HighScores;
pub use session::Session;
pub use settings::Settings;
pub use tuning::{Tuning, Variant};

use glam::Vec2;

/// Default geometry (the Neon playfield)
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// World dimensions (portrait 1080p)
    pub const WORLD_WIDTH: f32 = 1080.0;
    pub const WORLD_HEIGHT: f32 = 1920.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 100.0;
    pub const PADDLE_HEIGHT: f32 = 20.0;
    pub const PADDLE_FLOOR_OFFSET: f32 = 150.0;
    pub const PADDLE_KEY_SPEED: f32 = 600.0;
    /// Bounce steering factor (horizontal px/s per px of offset)
    pub const PADDLE_STEERING: f32 = 10.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 8.0;
    pub const BALL_LAUNCH_SPEED: f32 = 600.0;

    /// Points per destroyed block
    pub const BLOCK_REWARD: u64 = 10;
}

/// Axis-aligned box by center and half extents
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Aabb {
    pub center: Vec2,
    pub half: Vec2,
}

impl Aabb {
    #[inline]
    pub fn new(center: Vec2, half: Vec2) -> Self {
        Self { center, half }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.half
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.half
    }

    /// Closest point inside the box to `p`
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min(), self.max())
    }
}
