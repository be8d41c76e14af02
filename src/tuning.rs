//! Data-driven game balance
//!
//! Every gameplay constant lives in [`Tuning`]. One preset exists per game
//! variant; a host can also load a JSON override with [`Tuning::from_json`].

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::progression::UpgradeKind;

/// Which flavor of block breaker the core plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Variant {
    /// Upgrade menus, lasers and scripted power-ups
    #[default]
    Neon,
    /// Persistent gold and permanent upgrade levels across sessions
    Meta,
    /// Bare canvas rules: no drops, no upgrades
    Classic,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Neon => "Neon",
            Variant::Meta => "Meta",
            Variant::Classic => "Classic",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "neon" => Some(Variant::Neon),
            "meta" => Some(Variant::Meta),
            "classic" => Some(Variant::Classic),
            _ => None,
        }
    }
}

/// How block health scales with the level number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthCurve {
    /// Every block dies in one hit
    Flat,
    /// `1 + floor(level / n)`
    Stepped(u32),
}

impl HealthCurve {
    pub fn health_for_level(&self, level: u32) -> i32 {
        match *self {
            HealthCurve::Flat => 1,
            HealthCurve::Stepped(0) => 1,
            HealthCurve::Stepped(n) => 1 + (level / n) as i32,
        }
    }
}

/// What a collected pickup does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupPolicy {
    /// Weighted laser / multiball / bonus-score roll
    Scripted,
    /// Uniform pick from the variant's upgrade pool
    RandomUpgrade,
}

/// Block grid layout parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    pub columns: u32,
    pub rows: u32,
    pub cell_width: f32,
    pub cell_height: f32,
    pub padding: f32,
    /// Y of the first row's center
    pub top: f32,
}

/// Complete balance sheet for one variant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tuning {
    pub variant: Variant,

    // === World ===
    pub world_width: f32,
    pub world_height: f32,

    // === Paddle ===
    pub paddle_y: f32,
    pub paddle_half_width: f32,
    pub paddle_half_height: f32,
    /// Keyboard paddle speed (px/s)
    pub paddle_key_speed: f32,
    /// Width multiplier applied per widening upgrade
    pub paddle_growth: f32,
    /// Maximum number of effective widenings
    pub paddle_growth_cap: u32,
    /// `vx = k * (ball.x - paddle.x)`; `None` keeps a plain vertical reflection
    pub paddle_steering: Option<f32>,
    /// Offset used in place of zero for a dead-center paddle hit (px)
    pub center_nudge: f32,

    // === Ball ===
    pub ball_radius: f32,
    /// Distance above the paddle center a locked ball rests at
    pub ball_rest_offset: f32,
    pub launch_speed: f32,
    /// Horizontal launch jitter, uniform in `[-jitter, jitter]`
    pub launch_jitter: f32,

    // === Blocks ===
    pub grid: GridLayout,
    pub health_curve: HealthCurve,
    pub block_reward: u64,
    pub drop_chance: f64,
    /// Number of cosmetic tints a block can be assigned
    pub tint_count: u8,

    // === Pickups ===
    pub pickup_fall_speed: f32,
    pub pickup_half_size: f32,
    pub pickup_policy: PickupPolicy,
    pub bonus_score: u64,

    // === Upgrades ===
    pub upgrade_pool: Vec<UpgradeKind>,
    pub offer_count: usize,
    pub multiball_spread_x: f32,
    pub multiball_speed_y: f32,
    pub size_growth: f32,
    pub speed_growth: f32,

    // === Lasers ===
    pub fire_cooldown_ms: f64,
    pub laser_base_speed: f32,
    pub laser_speed_per_level: f32,
    pub laser_offset_x: f32,
    pub laser_half_width: f32,
    pub laser_half_height: f32,
    pub laser_scale_per_level: f32,

    // === Round / meta ===
    pub starting_lives: u32,
    pub gold_per_block: u64,
    pub meta_speed_step: f32,
    pub shop_base_cost: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self::neon()
    }
}

impl Tuning {
    /// Balance sheet for a variant
    pub fn preset(variant: Variant) -> Self {
        match variant {
            Variant::Neon => Self::neon(),
            Variant::Meta => Self::meta(),
            Variant::Classic => Self::classic(),
        }
    }

    fn neon() -> Self {
        Self {
            variant: Variant::Neon,
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,
            paddle_y: WORLD_HEIGHT - PADDLE_FLOOR_OFFSET,
            paddle_half_width: PADDLE_WIDTH / 2.0,
            paddle_half_height: PADDLE_HEIGHT / 2.0,
            paddle_key_speed: PADDLE_KEY_SPEED,
            paddle_growth: 1.25,
            paddle_growth_cap: 3,
            paddle_steering: Some(PADDLE_STEERING),
            center_nudge: 1.0,
            ball_radius: BALL_RADIUS,
            ball_rest_offset: 25.0,
            launch_speed: BALL_LAUNCH_SPEED,
            launch_jitter: 50.0,
            grid: GridLayout {
                columns: 10,
                rows: 5,
                cell_width: 80.0,
                cell_height: 40.0,
                padding: 20.0,
                top: 350.0,
            },
            health_curve: HealthCurve::Flat,
            block_reward: BLOCK_REWARD,
            drop_chance: 0.2,
            tint_count: 4,
            pickup_fall_speed: 150.0,
            pickup_half_size: 12.0,
            pickup_policy: PickupPolicy::Scripted,
            bonus_score: 100,
            upgrade_pool: vec![
                UpgradeKind::Multiball,
                UpgradeKind::Laser,
                UpgradeKind::Width,
                UpgradeKind::Life,
            ],
            offer_count: 3,
            multiball_spread_x: 200.0,
            multiball_speed_y: 300.0,
            size_growth: 1.2,
            speed_growth: 1.1,
            fire_cooldown_ms: 400.0,
            laser_base_speed: 600.0,
            laser_speed_per_level: 100.0,
            laser_offset_x: 20.0,
            laser_half_width: 3.0,
            laser_half_height: 15.0,
            laser_scale_per_level: 0.5,
            starting_lives: 3,
            gold_per_block: 0,
            meta_speed_step: 0.1,
            shop_base_cost: 50,
        }
    }

    fn meta() -> Self {
        Self {
            variant: Variant::Meta,
            health_curve: HealthCurve::Stepped(2),
            pickup_policy: PickupPolicy::RandomUpgrade,
            upgrade_pool: vec![
                UpgradeKind::Damage,
                UpgradeKind::Size,
                UpgradeKind::Speed,
                UpgradeKind::Life,
                UpgradeKind::Multiball,
            ],
            gold_per_block: 1,
            ..Self::neon()
        }
    }

    fn classic() -> Self {
        let height = 320.0;
        Self {
            variant: Variant::Classic,
            world_width: 480.0,
            world_height: height,
            paddle_y: height - 5.0,
            paddle_half_width: 37.5,
            paddle_half_height: 5.0,
            paddle_key_speed: 420.0,
            paddle_steering: None,
            ball_radius: 10.0,
            ball_rest_offset: 17.0,
            launch_speed: 360.0,
            launch_jitter: 180.0,
            grid: GridLayout {
                columns: 7,
                rows: 5,
                cell_width: 50.0,
                cell_height: 15.0,
                padding: 8.0,
                top: 47.5,
            },
            block_reward: 1,
            drop_chance: 0.0,
            tint_count: 5,
            upgrade_pool: Vec::new(),
            offer_count: 0,
            ..Self::neon()
        }
    }

    /// Parse a JSON override. Unknown variants, malformed input and values
    /// the simulation cannot run with are rejected.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate().map_err(<serde_json::Error as serde::de::Error>::custom)?;
        Ok(tuning)
    }

    /// First out-of-range value, if any
    fn validate(&self) -> Result<(), String> {
        let non_negative = [
            ("launch_jitter", self.launch_jitter),
            ("multiball_spread_x", self.multiball_spread_x),
            ("center_nudge", self.center_nudge),
        ];
        for (name, value) in non_negative {
            if value.is_nan() || value < 0.0 {
                return Err(format!("{} must be non-negative, got {}", name, value));
            }
        }

        let positive = [
            ("world_width", self.world_width),
            ("world_height", self.world_height),
            ("ball_radius", self.ball_radius),
            ("launch_speed", self.launch_speed),
            ("paddle_half_width", self.paddle_half_width),
        ];
        for (name, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(format!("{} must be positive, got {}", name, value));
            }
        }

        if !(0.0..=1.0).contains(&self.drop_chance) {
            return Err(format!("drop_chance must be within 0..=1, got {}", self.drop_chance));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_curve() {
        assert_eq!(HealthCurve::Flat.health_for_level(9), 1);
        let curve = HealthCurve::Stepped(2);
        assert_eq!(curve.health_for_level(1), 1);
        assert_eq!(curve.health_for_level(2), 2);
        assert_eq!(curve.health_for_level(5), 3);
        assert_eq!(HealthCurve::Stepped(0).health_for_level(7), 1);
    }

    #[test]
    fn test_presets_differ_where_expected() {
        let neon = Tuning::preset(Variant::Neon);
        let meta = Tuning::preset(Variant::Meta);
        let classic = Tuning::preset(Variant::Classic);

        assert_eq!(neon.paddle_steering, Some(10.0));
        assert_eq!(meta.world_width, neon.world_width);
        assert_eq!(meta.gold_per_block, 1);
        assert!(classic.paddle_steering.is_none());
        assert_eq!(classic.drop_chance, 0.0);
        assert!(classic.upgrade_pool.is_empty());
    }

    #[test]
    fn test_json_round_trip_keeps_variant() {
        let json = serde_json::to_string(&Tuning::preset(Variant::Meta)).unwrap();
        let parsed = Tuning::from_json(&json).unwrap();
        assert_eq!(parsed.variant, Variant::Meta);
        assert_eq!(parsed.health_curve, HealthCurve::Stepped(2));
    }

    #[test]
    fn test_from_json_rejects_negative_spread() {
        let mut tuning = Tuning::default();
        tuning.launch_jitter = -5.0;
        let json = serde_json::to_string(&tuning).unwrap();
        let err = Tuning::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("launch_jitter"));

        let mut tuning = Tuning::preset(Variant::Meta);
        tuning.multiball_spread_x = -1.0;
        let json = serde_json::to_string(&tuning).unwrap();
        assert!(Tuning::from_json(&json).is_err());

        let mut tuning = Tuning::default();
        tuning.drop_chance = 1.5;
        let json = serde_json::to_string(&tuning).unwrap();
        assert!(Tuning::from_json(&json).is_err());
    }

    #[test]
    fn test_presets_pass_validation() {
        for variant in [Variant::Neon, Variant::Meta, Variant::Classic] {
            assert_eq!(Tuning::preset(variant).validate(), Ok(()));
        }
    }

    #[test]
    fn test_variant_from_str() {
        assert_eq!(Variant::from_str("CLASSIC"), Some(Variant::Classic));
        assert_eq!(Variant::from_str("arcade"), None);
        assert_eq!(Variant::Meta.as_str(), "Meta");
    }
}
