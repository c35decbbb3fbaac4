//! Fewest-steps leaderboard
//!
//! Keeps the best 10 completions of each area, persisted alongside the
//! save under its own key.

use serde::{Deserialize, Serialize};

use crate::persistence::{HIGHSCORES_KEY, SaveStore, load_json, save_json};

/// Maximum number of runs kept per area
pub const MAX_RUNS_PER_MAP: usize = 10;

/// A single area completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunEntry {
    pub map_id: String,
    /// Steps taken to clear the area
    pub steps: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// Leaderboard, sorted ascending by steps within each area
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HighScores {
    pub entries: Vec<RunEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs for one area, best first
    pub fn board(&self, map_id: &str) -> Vec<&RunEntry> {
        self.entries.iter().filter(|e| e.map_id == map_id).collect()
    }

    /// Check if a run would make the area's board
    pub fn qualifies(&self, map_id: &str, steps: u32) -> bool {
        if steps == 0 {
            return false;
        }
        let board = self.board(map_id);
        if board.len() < MAX_RUNS_PER_MAP {
            return true;
        }
        board.last().is_none_or(|worst| steps < worst.steps)
    }

    /// Rank a run would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, map_id: &str, steps: u32) -> Option<usize> {
        if !self.qualifies(map_id, steps) {
            return None;
        }
        let board = self.board(map_id);
        let rank = board.iter().position(|e| steps < e.steps);
        Some(rank.unwrap_or(board.len()) + 1)
    }

    /// Record a run. Returns the rank achieved, or None if it didn't place.
    /// Ties rank behind earlier runs.
    pub fn add_run(&mut self, map_id: &str, steps: u32, timestamp: f64) -> Option<usize> {
        let rank = self.potential_rank(map_id, steps)?;

        let entry = RunEntry {
            map_id: map_id.to_string(),
            steps,
            timestamp,
        };
        let pos = self
            .entries
            .iter()
            .position(|e| e.map_id == map_id && steps < e.steps)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);

        // Trim the area's board
        let mut seen = 0;
        self.entries.retain(|e| {
            if e.map_id != map_id {
                return true;
            }
            seen += 1;
            seen <= MAX_RUNS_PER_MAP
        });

        log::info!("New #{} run for '{}': {} steps", rank, map_id, steps);
        Some(rank)
    }

    /// Fewest steps recorded for an area
    pub fn best_for(&self, map_id: &str) -> Option<u32> {
        self.board(map_id).first().map(|e| e.steps)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load the leaderboard, or start fresh when missing or unreadable
    pub fn load<S: SaveStore + ?Sized>(store: &S) -> Self {
        match load_json::<Self, S>(store, HIGHSCORES_KEY) {
            Ok(Some(scores)) => {
                log::info!("Loaded {} runs", scores.entries.len());
                scores
            }
            Ok(None) => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
            Err(err) => {
                log::warn!("Ignoring stored high scores: {}", err);
                Self::new()
            }
        }
    }

    pub fn save<S: SaveStore + ?Sized>(&self, store: &S) {
        match save_json(store, HIGHSCORES_KEY, self) {
            Ok(()) => log::info!("High scores saved ({} entries)", self.entries.len()),
            Err(err) => log::warn!("Failed to save high scores: {}", err),
        }
    }
}
