//! Top-level game state machine
//!
//! A [`Session`] owns exactly one round at a time plus the long-lived
//! collaborators: the leaderboard, permanent progress and the storage they
//! save to. It turns `RoundLost` into `GameOver`, applies the upgrade chosen
//! at `RoundWon`, and replaces the round wholesale on restart.

use rand::Rng;

use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::highscores::HighScores;
use crate::persistence::Storage;
use crate::progression::{self, PersistentProgress, RoundModifiers, ShopError, ShopItem, UpgradeKind};
use crate::sim::{GameEvent, GamePhase, GameState, Snapshot, TickInput, tick};
use crate::tuning::{Tuning, Variant};

/// Restart input is ignored for this long after game over
pub const RESTART_DELAY_MS: f64 = 500.0;

pub struct Session<S: Storage> {
    storage: S,
    tuning: Tuning,
    state: GameState,
    high_scores: HighScores,
    progress: PersistentProgress,
    games_played: u32,
    /// Time spent in `GameOver` (ms)
    game_over_ms: f64,
    accumulator: f32,
}

impl<S: Storage> Session<S> {
    /// Load saved data from `storage` and start a round at level 1
    pub fn new(tuning: Tuning, seed: u64, storage: S) -> Self {
        let high_scores = HighScores::load(&storage);
        let progress = PersistentProgress::load(&storage);
        let modifiers = round_modifiers(&tuning, &progress);
        log::info!(
            "Session start: variant={}, seed={}, best={:?}",
            tuning.variant.as_str(),
            seed,
            high_scores.top_score()
        );

        Self {
            state: GameState::new(tuning.clone(), seed, modifiers),
            storage,
            tuning,
            high_scores,
            progress,
            games_played: 0,
            game_over_ms: 0.0,
            accumulator: 0.0,
        }
    }

    /// Run as many fixed steps as `frame_dt` covers. One-shot inputs
    /// (`launch`, `fire`) are cleared by the first step that sees them, so
    /// a frame shorter than `SIM_DT` leaves them latched for the next one.
    pub fn update(&mut self, frame_dt: f32, input: &mut TickInput) {
        let dt = frame_dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.tick(input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            input.launch = false;
            input.fire = false;
        }
    }

    /// Advance one fixed step and run any phase transition it caused
    pub fn tick(&mut self, input: &TickInput, dt: f32) {
        match self.state.phase {
            GamePhase::GameOver => {
                self.game_over_ms += dt as f64 * 1000.0;
                let wants_restart = input.launch || input.idle_mode;
                if wants_restart && self.game_over_ms >= RESTART_DELAY_MS {
                    self.restart();
                }
                return;
            }
            GamePhase::RoundWon => {
                if input.idle_mode {
                    self.auto_choose();
                }
                return;
            }
            GamePhase::RoundLost => {}
            GamePhase::Serve | GamePhase::Playing => tick(&mut self.state, input, dt),
        }

        match self.state.phase {
            GamePhase::RoundWon => self.bank_gold(),
            GamePhase::RoundLost => self.finish_game(),
            _ => {}
        }
    }

    /// Pick one of the offered upgrades and move on to the next level.
    /// Returns false outside `RoundWon` or for a kind that was not offered.
    pub fn choose_upgrade(&mut self, kind: UpgradeKind) -> bool {
        if self.state.phase != GamePhase::RoundWon || !self.state.offered.contains(&kind) {
            log::debug!("Ignoring upgrade choice {:?} in {:?}", kind, self.state.phase);
            return false;
        }

        // Next level first, so a multiball has no free ball to clone and
        // waits for the serve
        self.state.advance_level();
        progression::apply_upgrade(&mut self.state, kind);
        true
    }

    /// Move on to the next level without an upgrade
    pub fn continue_level(&mut self) -> bool {
        if self.state.phase != GamePhase::RoundWon {
            return false;
        }
        self.state.advance_level();
        true
    }

    /// Throw the current round away and start a fresh one at level 1
    pub fn restart(&mut self) {
        let seed = self.state.rng.random::<u64>();
        let modifiers = round_modifiers(&self.tuning, &self.progress);
        self.state = GameState::new(self.tuning.clone(), seed, modifiers);
        self.game_over_ms = 0.0;
        self.accumulator = 0.0;
        log::info!("Restarted with seed {}", seed);
    }

    /// Buy a permanent level. Takes effect from the next round. Nothing
    /// changes in memory unless the new balance was saved.
    pub fn purchase(&mut self, item: ShopItem) -> Result<u32, ShopError> {
        let mut progress = self.progress.clone();
        let level = progress.purchase(item, &self.tuning)?;
        progress.save(&mut self.storage)?;
        self.progress = progress;
        Ok(level)
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state.drain_events()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    pub fn is_high_score(&self, score: u64) -> bool {
        self.high_scores.is_high_score(score)
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    pub fn progress(&self) -> &PersistentProgress {
        &self.progress
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn games_played(&self) -> u32 {
        self.games_played
    }

    /// Whether a restart would be accepted now
    pub fn can_restart(&self) -> bool {
        self.state.phase == GamePhase::GameOver && self.game_over_ms >= RESTART_DELAY_MS
    }

    /// RoundLost -> GameOver: record the score and halt
    fn finish_game(&mut self) {
        let score = self.state.round.score;
        let rank = self.high_scores.add_score(score);
        if let Err(e) = self.high_scores.save(&mut self.storage) {
            log::warn!("Failed to save high scores: {}", e);
        }
        self.bank_gold();

        self.games_played += 1;
        self.game_over_ms = 0.0;
        self.state.phase = GamePhase::GameOver;
        self.state.push_event(GameEvent::GameOver { score, rank });
        log::info!("Game over: score {}, rank {:?}", score, rank);
    }

    /// Move this round's gold into permanent progress
    fn bank_gold(&mut self) {
        let earned = std::mem::take(&mut self.state.round.gold_earned);
        if earned == 0 {
            return;
        }
        self.progress.gold += earned;
        if let Err(e) = self.progress.save(&mut self.storage) {
            log::warn!("Failed to save progress: {}", e);
        }
    }

    /// Demo mode: take the first offer, or just continue
    fn auto_choose(&mut self) {
        match self.state.offered.first().copied() {
            Some(kind) => {
                self.choose_upgrade(kind);
            }
            None => {
                self.continue_level();
            }
        }
    }
}

fn round_modifiers(tuning: &Tuning, progress: &PersistentProgress) -> RoundModifiers {
    if tuning.variant == Variant::Meta {
        progress.modifiers(tuning)
    } else {
        RoundModifiers::default()
    }
}
