//! Timed power-ups granted by special shapes

use serde::{Deserialize, Serialize};

/// Score factor granted by a Multiplier pickup
pub const SCORE_MULTIPLIER_FACTOR: f64 = 2.0;
/// How long a Multiplier pickup lasts (ms)
pub const SCORE_MULTIPLIER_DURATION_MS: f64 = 10_000.0;

/// Active score power-up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUps {
    score_multiplier: f64,
    /// Milliseconds left; zero when inactive
    remaining_ms: f64,
}

impl Default for PowerUps {
    fn default() -> Self {
        Self {
            score_multiplier: 1.0,
            remaining_ms: 0.0,
        }
    }
}

impl PowerUps {
    /// Start (or refresh) the score multiplier. Returns true if it was not already running.
    pub fn activate_score_multiplier(&mut self, factor: f64, duration_ms: f64) -> bool {
        let was_active = self.is_active();
        self.score_multiplier = factor.max(1.0);
        self.remaining_ms = duration_ms.max(0.0);
        !was_active
    }

    /// Count down by `dt` seconds. Returns true on the step the effect runs out.
    pub fn update(&mut self, dt: f32) -> bool {
        if !self.is_active() {
            return false;
        }
        self.remaining_ms -= f64::from(dt) * 1000.0;
        if self.remaining_ms <= 0.0 {
            self.clear();
            return true;
        }
        false
    }

    pub fn score_multiplier(&self) -> f64 {
        self.score_multiplier
    }

    pub fn remaining_ms(&self) -> f64 {
        self.remaining_ms
    }

    pub fn is_active(&self) -> bool {
        self.remaining_ms > 0.0
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
