//! Upgrades and meta progression
//!
//! Round upgrades mutate a [`GameState`] directly. Permanent progress
//! (gold and bought levels) lives in [`PersistentProgress`] and turns into
//! [`RoundModifiers`] when a round starts.

use std::fmt;

use glam::Vec2;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::persistence::{self, PersistError, Storage};
use crate::sim::state::{GameEvent, GameState};
use crate::tuning::Tuning;

/// Upgrade kinds across all variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeKind {
    /// Two extra balls
    Multiball,
    /// Laser level up, auto-fire, paddle widening
    Laser,
    /// Paddle widening
    Width,
    /// One extra life
    Life,
    /// +1 ball damage
    Damage,
    /// Larger ball
    Size,
    /// Faster ball
    Speed,
}

impl UpgradeKind {
    pub fn name(&self) -> &'static str {
        match self {
            UpgradeKind::Multiball => "MULTI-BALL",
            UpgradeKind::Laser => "LASER PADDLE",
            UpgradeKind::Width => "WIDER PADDLE",
            UpgradeKind::Life => "EXTRA LIFE",
            UpgradeKind::Damage => "HEAVY BALL",
            UpgradeKind::Size => "BIG BALL",
            UpgradeKind::Speed => "FAST BALL",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            UpgradeKind::Multiball => "Spawn 2 extra balls",
            UpgradeKind::Laser => "Shoot lasers on click",
            UpgradeKind::Width => "Increase paddle size",
            UpgradeKind::Life => "+1 Heart",
            UpgradeKind::Damage => "Balls deal +1 damage",
            UpgradeKind::Size => "Bigger ball, bigger hits",
            UpgradeKind::Speed => "Ball moves faster",
        }
    }
}

/// What an upgrade menu shows for one offer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpgradeCard {
    pub kind: UpgradeKind,
    pub name: &'static str,
    pub description: &'static str,
}

impl From<UpgradeKind> for UpgradeCard {
    fn from(kind: UpgradeKind) -> Self {
        Self {
            kind,
            name: kind.name(),
            description: kind.description(),
        }
    }
}

/// Menu cards for the current offers, in offer order
pub fn offer_cards(offered: &[UpgradeKind]) -> Vec<UpgradeCard> {
    offered.iter().copied().map(UpgradeCard::from).collect()
}

/// What a collected pickup turned into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupEffect {
    Laser,
    Multiball,
    BonusScore(u64),
    Upgrade(UpgradeKind),
}

/// Starting multipliers derived from permanent progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundModifiers {
    pub damage: i32,
    pub speed_scale: f32,
}

impl Default for RoundModifiers {
    fn default() -> Self {
        Self {
            damage: 1,
            speed_scale: 1.0,
        }
    }
}

/// Uniformly sample `n` distinct upgrades from `pool`
pub fn offer_choices<R: Rng>(pool: &[UpgradeKind], n: usize, rng: &mut R) -> Vec<UpgradeKind> {
    let mut choices = pool.to_vec();
    choices.shuffle(rng);
    choices.truncate(n);
    choices
}

/// Map a uniform roll in `[0, 1)` to the scripted pickup table
pub fn scripted_effect(roll: f32, bonus_score: u64) -> PickupEffect {
    if roll < 0.4 {
        PickupEffect::Laser
    } else if roll < 0.7 {
        PickupEffect::Multiball
    } else {
        PickupEffect::BonusScore(bonus_score)
    }
}

/// Resolve a collected pickup into an effect using the round's RNG
pub fn roll_pickup_effect(state: &mut GameState) -> PickupEffect {
    use crate::tuning::PickupPolicy;

    match state.tuning.pickup_policy {
        PickupPolicy::Scripted => {
            let roll: f32 = state.rng.random();
            scripted_effect(roll, state.tuning.bonus_score)
        }
        PickupPolicy::RandomUpgrade => {
            let pool = state.tuning.upgrade_pool.clone();
            match offer_choices(&pool, 1, &mut state.rng).first() {
                Some(&kind) => PickupEffect::Upgrade(kind),
                None => PickupEffect::BonusScore(state.tuning.bonus_score),
            }
        }
    }
}

/// Apply a pickup's effect to the round
pub fn apply_pickup_effect(state: &mut GameState, effect: PickupEffect) {
    match effect {
        PickupEffect::Laser => {
            apply_upgrade(state, UpgradeKind::Laser);
        }
        PickupEffect::Multiball => {
            apply_upgrade(state, UpgradeKind::Multiball);
        }
        PickupEffect::BonusScore(points) => state.round.score += points,
        PickupEffect::Upgrade(kind) => {
            apply_upgrade(state, kind);
        }
    }
    state.push_event(GameEvent::ItemCollected { effect });
}

/// Apply one upgrade. Returns false when it had no effect (e.g. a capped
/// widening); that is not an error.
pub fn apply_upgrade(state: &mut GameState, kind: UpgradeKind) -> bool {
    let tuning = &state.tuning;
    let (growth, cap) = (tuning.paddle_growth, tuning.paddle_growth_cap);

    let changed = match kind {
        UpgradeKind::Multiball => spawn_multiball(state),
        UpgradeKind::Laser => {
            state.round.laser_level += 1;
            if !state.round.has_upgrade(UpgradeKind::Laser) {
                state.round.upgrades.push(UpgradeKind::Laser);
            }
            state.paddle.widen(growth, cap);
            true
        }
        UpgradeKind::Width => state.paddle.widen(growth, cap),
        UpgradeKind::Life => {
            state.round.lives += 1;
            true
        }
        UpgradeKind::Damage => {
            state.round.ball_damage += 1;
            for ball in state.balls.iter_mut() {
                ball.damage += 1;
            }
            true
        }
        UpgradeKind::Size => {
            let factor = state.tuning.size_growth;
            state.round.ball_radius *= factor;
            for ball in state.balls.iter_mut() {
                ball.radius *= factor;
            }
            true
        }
        UpgradeKind::Speed => {
            let factor = state.tuning.speed_growth;
            state.round.speed_scale *= factor;
            for ball in state.balls.iter_mut().filter(|b| !b.locked) {
                ball.scale_speed(factor);
            }
            true
        }
    };

    if changed {
        log::info!("Upgrade applied: {}", kind.name());
        state.push_event(GameEvent::UpgradeApplied { kind });
    } else {
        log::debug!("Upgrade {} had no effect", kind.name());
    }
    changed
}

/// Velocity for a multiball spawn: random sideways, always upward
pub fn multiball_velocity<R: Rng>(tuning: &Tuning, speed_scale: f32, rng: &mut R) -> Vec2 {
    let spread = tuning.multiball_spread_x.abs();
    Vec2::new(rng.random_range(-spread..=spread), -tuning.multiball_speed_y) * speed_scale
}

/// Clone two balls off the first free ball, or defer them to the next serve
fn spawn_multiball(state: &mut GameState) -> bool {
    let origin = state.balls.iter().find(|b| !b.locked).map(|b| b.pos);
    match origin {
        Some(pos) => {
            for _ in 0..2 {
                let vel = multiball_velocity(&state.tuning, state.round.speed_scale, &mut state.rng);
                state.spawn_ball_free(pos, vel);
            }
        }
        None => state.round.pending_balls += 2,
    }
    true
}

/// Permanent purchasable upgrades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShopItem {
    Attack,
    Speed,
}

/// Why a purchase failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShopError {
    /// Not enough gold for the item
    InsufficientGold { cost: u64, balance: u64 },
    /// Saving the new balance failed
    Persist(String),
}

impl fmt::Display for ShopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShopError::InsufficientGold { cost, balance } => {
                write!(f, "Insufficient gold: need {}, have {}", cost, balance)
            }
            ShopError::Persist(msg) => write!(f, "Could not save progress: {}", msg),
        }
    }
}

impl std::error::Error for ShopError {}

impl From<PersistError> for ShopError {
    fn from(err: PersistError) -> Self {
        ShopError::Persist(err.to_string())
    }
}

/// Progress that survives rounds and sessions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistentProgress {
    pub gold: u64,
    pub attack_level: u32,
    pub speed_level: u32,
}

impl PersistentProgress {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "blockBreakerProgress";

    /// Load saved progress, falling back to zeroed progress on bad data
    pub fn load(storage: &dyn Storage) -> Self {
        persistence::load_or_default(storage, Self::STORAGE_KEY)
    }

    /// Overwrite the saved blob
    pub fn save(&self, storage: &mut dyn Storage) -> Result<(), PersistError> {
        persistence::save_json(storage, Self::STORAGE_KEY, self)?;
        log::info!(
            "Progress saved (gold {}, attack {}, speed {})",
            self.gold,
            self.attack_level,
            self.speed_level
        );
        Ok(())
    }

    /// Multipliers a new round starts with
    pub fn modifiers(&self, tuning: &Tuning) -> RoundModifiers {
        RoundModifiers {
            damage: 1 + self.attack_level as i32,
            speed_scale: 1.0 + tuning.meta_speed_step * self.speed_level as f32,
        }
    }

    pub fn level_of(&self, item: ShopItem) -> u32 {
        match item {
            ShopItem::Attack => self.attack_level,
            ShopItem::Speed => self.speed_level,
        }
    }

    /// Price of the next level of `item`
    pub fn cost(&self, item: ShopItem, tuning: &Tuning) -> u64 {
        tuning.shop_base_cost * (self.level_of(item) as u64 + 1)
    }

    /// Spend gold on the next level of `item`, returning the new level
    pub fn purchase(&mut self, item: ShopItem, tuning: &Tuning) -> Result<u32, ShopError> {
        let cost = self.cost(item, tuning);
        if self.gold < cost {
            return Err(ShopError::InsufficientGold {
                cost,
                balance: self.gold,
            });
        }
        self.gold -= cost;
        let level = match item {
            ShopItem::Attack => {
                self.attack_level += 1;
                self.attack_level
            }
            ShopItem::Speed => {
                self.speed_level += 1;
                self.speed_level
            }
        };
        log::info!("Bought {:?} level {} for {} gold", item, level, cost);
        Ok(level)
    }
}
