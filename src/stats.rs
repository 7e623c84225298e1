//! Lifetime play statistics

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::persistence::Tally;
use crate::sim::{GameEvent, Grade};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionStatistics {
    pub games_played: u32,
    pub total_score: u64,
    pub best_score: u64,
    pub highest_level: u32,
    pub shapes_caught: u64,
    pub shapes_missed: u64,
    pub bombs_hit: u64,
    /// Catches per special kind, keyed by its snake_case name
    pub specials_caught: BTreeMap<String, u64>,
    pub max_combo: u32,
    pub levels_completed: u32,
    pub best_grade: Option<Grade>,
    pub combo_tiers_reached: u64,
}

impl SessionStatistics {
    /// Catches over everything that reached the catcher
    pub fn accuracy(&self) -> f64 {
        let total = self.shapes_caught + self.shapes_missed + self.bombs_hit;
        if total == 0 {
            0.0
        } else {
            self.shapes_caught as f64 / total as f64
        }
    }

    pub fn average_score(&self) -> f64 {
        if self.games_played == 0 {
            0.0
        } else {
            self.total_score as f64 / f64::from(self.games_played)
        }
    }
}

impl Tally for SessionStatistics {
    const STORAGE_KEY: &'static str = "shape_catcher_statistics";

    fn apply(&mut self, event: &GameEvent) {
        match *event {
            GameEvent::Caught { kind, combo, .. } => {
                self.shapes_caught += 1;
                self.max_combo = self.max_combo.max(combo);
                if let Some(special) = kind.special_kind() {
                    *self
                        .specials_caught
                        .entry(special.as_str().to_string())
                        .or_default() += 1;
                }
            }
            GameEvent::Missed { .. } => self.shapes_missed += 1,
            GameEvent::BombHit { .. } => self.bombs_hit += 1,
            GameEvent::ComboTierReached(_) => self.combo_tiers_reached += 1,
            GameEvent::LevelComplete { level, grade, .. } => {
                self.levels_completed += 1;
                self.highest_level = self.highest_level.max(level);
                self.best_grade = self.best_grade.max(Some(grade));
            }
            GameEvent::LevelStarted { level } => {
                self.highest_level = self.highest_level.max(level);
            }
            GameEvent::GameOver { score, level } => {
                self.games_played += 1;
                self.total_score = self.total_score.saturating_add(score);
                self.best_score = self.best_score.max(score);
                self.highest_level = self.highest_level.max(level);
            }
            GameEvent::PowerUpActivated { .. }
            | GameEvent::PowerUpExpired
            | GameEvent::TimeExtended { .. } => {}
        }
    }
}
