//! High score leaderboard
//!
//! Top 10 finished sessions, persisted as JSON through a [`StoredRecorder`](crate::persistence::StoredRecorder).

use serde::{Deserialize, Serialize};

use crate::persistence::Tally;
use crate::platform::now_ms;
use crate::sim::GameEvent;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Level reached when the session ended
    pub level: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// High score leaderboard, sorted by score descending
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert a score if it qualifies. Returns the rank achieved (1-indexed).
    /// Ties rank below existing entries.
    pub fn add_score(&mut self, score: u64, level: u32, timestamp: f64) -> Option<usize> {
        let rank = self.potential_rank(score)?;
        self.entries.insert(
            rank - 1,
            HighScoreEntry {
                score,
                level,
                timestamp,
            },
        );
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}

impl Tally for HighScores {
    const STORAGE_KEY: &'static str = "shape_catcher_highscores";

    fn apply(&mut self, event: &GameEvent) {
        if let GameEvent::GameOver { score, level } = *event {
            if let Some(rank) = self.add_score(score, level, now_ms()) {
                log::info!("New high score #{}: {} (level {})", rank, score, level);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scores_sorted_and_capped() {
        let mut board = HighScores::new();
        for score in [50, 300, 10, 200, 100, 90, 80, 70, 60, 40, 30, 20] {
            board.add_score(score, 1, 0.0);
        }
        assert_eq!(board.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(board.top_score(), Some(300));
        assert_eq!(board.entries.last().map(|e| e.score), Some(30));
        assert!(board.entries.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_qualification() {
        let mut board = HighScores::new();
        assert!(!board.qualifies(0));
        assert_eq!(board.add_score(100, 3, 0.0), Some(1));
        assert_eq!(board.add_score(100, 4, 0.0), Some(2));
        assert_eq!(board.potential_rank(150), Some(1));

        for _ in 0..8 {
            board.add_score(500, 9, 0.0);
        }
        assert!(!board.qualifies(100));
        assert_eq!(board.add_score(50, 1, 0.0), None);
    }

    #[test]
    fn test_game_over_event_records_entry() {
        let mut board = HighScores::new();
        board.apply(&GameEvent::LevelStarted { level: 2 });
        assert!(board.is_empty());
        board.apply(&GameEvent::GameOver { score: 420, level: 6 });
        assert_eq!(board.entries[0].score, 420);
        assert_eq!(board.entries[0].level, 6);
    }
}
