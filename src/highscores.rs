//! High score leaderboard
//!
//! Top three scores, stored as a bare JSON array. A fresh ledger starts
//! with three placeholder scores of 100.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, PersistError, Storage};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 3;

/// Placeholder score a fresh leaderboard is filled with
pub const DEFAULT_SCORE: u64 = 100;

/// High score leaderboard, sorted descending
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HighScores {
    pub entries: Vec<u64>,
}

impl Default for HighScores {
    fn default() -> Self {
        Self {
            entries: vec![DEFAULT_SCORE; MAX_HIGH_SCORES],
        }
    }
}

impl HighScores {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "blockBreakerScores";

    /// Create a leaderboard with placeholder scores
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the board has room or `score` beats the lowest entry
    pub fn is_high_score(&self, score: u64) -> bool {
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|&lowest| score > lowest).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.is_high_score(score) {
            return None;
        }
        let rank = self.entries.iter().position(|&e| score > e);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Merge `score` in, keep the best three, and return the new list
    pub fn record_score(&mut self, score: u64) -> Vec<u64> {
        self.entries.push(score);
        // Stable sort: an equal newcomer lands after existing entries
        self.entries.sort_by(|a, b| b.cmp(a));
        self.entries.truncate(MAX_HIGH_SCORES);
        self.entries.clone()
    }

    /// Record a score and report the rank it reached, if any
    pub fn add_score(&mut self, score: u64) -> Option<usize> {
        let rank = self.potential_rank(score);
        self.record_score(score);
        rank
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().copied()
    }

    /// Load high scores, falling back to placeholders on bad data
    pub fn load(storage: &dyn Storage) -> Self {
        let mut scores: Self = persistence::load_or_default(storage, Self::STORAGE_KEY);
        scores.entries.sort_by(|a, b| b.cmp(a));
        scores.entries.truncate(MAX_HIGH_SCORES);
        log::info!("Loaded {} high scores", scores.entries.len());
        scores
    }

    /// Overwrite the saved list
    pub fn save(&self, storage: &mut dyn Storage) -> Result<(), PersistError> {
        persistence::save_json(storage, Self::STORAGE_KEY, self)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}
