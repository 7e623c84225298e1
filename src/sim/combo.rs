//! Combo streak with tiered multipliers
//!
//! A catch bumps the count and refills the timer; the timer drains with elapsed
//! time and the streak collapses when it runs out or on any miss/bomb.

use serde::{Deserialize, Serialize};

use crate::consts::COMBO_TIMEOUT;

/// A named streak bracket
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComboTier {
    pub threshold: u32,
    pub name: &'static str,
    pub multiplier: f64,
    pub color: &'static str,
    pub message: &'static str,
}

/// Tier table, ascending by threshold
pub const COMBO_TIERS: [ComboTier; 6] = [
    ComboTier { threshold: 3, name: "Nice!", multiplier: 1.1, color: "#22c55e", message: "Nice!" },
    ComboTier { threshold: 5, name: "Great!", multiplier: 1.2, color: "#3b82f6", message: "Great!" },
    ComboTier { threshold: 10, name: "Awesome!", multiplier: 1.5, color: "#a855f7", message: "Awesome!" },
    ComboTier { threshold: 15, name: "Amazing!", multiplier: 2.0, color: "#f59e0b", message: "Amazing!" },
    ComboTier { threshold: 20, name: "Legendary!", multiplier: 3.0, color: "#ef4444", message: "LEGENDARY!" },
    ComboTier { threshold: 30, name: "GODLIKE!", multiplier: 5.0, color: "#ffd700", message: "GODLIKE!" },
];

/// Highest tier whose threshold `count` has reached
pub fn tier_index_for(count: u32) -> Option<usize> {
    COMBO_TIERS.iter().rposition(|tier| count >= tier.threshold)
}

/// Multiplier for a streak length (1.0 below the first tier)
pub fn multiplier_for(count: u32) -> f64 {
    tier_index_for(count).map_or(1.0, |i| COMBO_TIERS[i].multiplier)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboSystem {
    count: u32,
    max_count: u32,
    /// Milliseconds until the streak expires; zero exactly when `count` is zero
    timer: f64,
    tier_index: Option<usize>,
    multiplier: f64,
}

impl Default for ComboSystem {
    fn default() -> Self {
        Self {
            count: 0,
            max_count: 0,
            timer: 0.0,
            tier_index: None,
            multiplier: 1.0,
        }
    }
}

impl ComboSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a catch. Returns the tier if this catch crossed into a new one.
    pub fn increment(&mut self) -> Option<&'static ComboTier> {
        self.count += 1;
        self.max_count = self.max_count.max(self.count);
        self.timer = COMBO_TIMEOUT;

        let new_tier = tier_index_for(self.count);
        if new_tier > self.tier_index {
            self.tier_index = new_tier;
            let tier = new_tier.map(|i| &COMBO_TIERS[i])?;
            self.multiplier = tier.multiplier;
            log::debug!("Combo tier reached: {} at {}", tier.name, self.count);
            return Some(tier);
        }
        None
    }

    /// Break the streak. `max_count` survives.
    pub fn reset(&mut self) {
        self.count = 0;
        self.timer = 0.0;
        self.tier_index = None;
        self.multiplier = 1.0;
    }

    /// Drain the timer by `dt` seconds. Returns true if the streak expired.
    pub fn update(&mut self, dt: f32) -> bool {
        if self.count == 0 {
            return false;
        }
        self.timer -= f64::from(dt) * 1000.0;
        if self.timer <= 0.0 {
            self.reset();
            return true;
        }
        false
    }

    /// Clear everything including the high-water mark (new session)
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn max_count(&self) -> u32 {
        self.max_count
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn timer(&self) -> f64 {
        self.timer
    }

    pub fn is_active(&self) -> bool {
        self.count > 0
    }

    pub fn tier_index(&self) -> Option<usize> {
        self.tier_index
    }

    pub fn current_tier(&self) -> Option<&'static ComboTier> {
        self.tier_index.map(|i| &COMBO_TIERS[i])
    }

    pub fn next_tier(&self) -> Option<&'static ComboTier> {
        let next = self.tier_index.map_or(0, |i| i + 1);
        COMBO_TIERS.get(next)
    }

    /// Remaining timer as a 0-1 fraction
    pub fn timer_percent(&self) -> f64 {
        (self.timer / COMBO_TIMEOUT).max(0.0)
    }

    /// 0-1 progress from the current tier threshold to the next one
    pub fn progress_to_next_tier(&self) -> f64 {
        let Some(next) = self.next_tier() else {
            return 1.0;
        };
        let floor = self.current_tier().map_or(0, |t| t.threshold);
        f64::from(self.count - floor) / f64::from(next.threshold - floor)
    }

    /// Apply the streak multiplier to a point value (floored)
    pub fn calculate_bonus_score(&self, base: f64) -> i64 {
        (base * self.multiplier).floor() as i64
    }

    pub fn message(&self) -> &'static str {
        self.current_tier().map_or("", |t| t.message)
    }

    pub fn color(&self) -> &'static str {
        self.current_tier().map_or("#ffffff", |t| t.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_tier_multiplier_at_thresholds() {
        assert_eq!(multiplier_for(0), 1.0);
        assert_eq!(multiplier_for(2), 1.0);
        assert_eq!(multiplier_for(3), 1.1);
        assert_eq!(multiplier_for(5), 1.2);
        assert_eq!(multiplier_for(10), 1.5);
        assert_eq!(multiplier_for(15), 2.0);
        assert_eq!(multiplier_for(20), 3.0);
        assert_eq!(multiplier_for(30), 5.0);
        assert_eq!(multiplier_for(500), 5.0);

        let mut last = 1.0;
        for count in 0..100 {
            let m = multiplier_for(count);
            assert!(m >= last);
            last = m;
        }
    }

    #[test]
    fn test_tier_notification_fires_once_per_crossing() {
        let mut combo = ComboSystem::new();
        let mut reached = Vec::new();
        for _ in 0..12 {
            if let Some(tier) = combo.increment() {
                reached.push(tier.threshold);
            }
        }
        assert_eq!(reached, vec![3, 5, 10]);
        assert_eq!(combo.multiplier(), 1.5);
        assert_eq!(combo.tier_index(), Some(2));
    }

    #[test]
    fn test_timeout_resets_streak() {
        let mut combo = ComboSystem::new();
        combo.increment();
        combo.increment();
        assert!(!combo.update(2.9));
        assert_eq!(combo.count(), 2);
        assert!(combo.update(0.2));
        assert_eq!(combo.count(), 0);
        assert_eq!(combo.timer(), 0.0);
        assert_eq!(combo.tier_index(), None);
        assert_eq!(combo.max_count(), 2);

        combo.increment();
        assert_eq!(combo.count(), 1);
    }

    #[test]
    fn test_reset_clears_tier() {
        let mut combo = ComboSystem::new();
        for _ in 0..5 {
            combo.increment();
        }
        combo.reset();
        assert_eq!(combo.multiplier(), 1.0);
        assert_eq!(combo.message(), "");
        assert_eq!(combo.max_count(), 5);
        // Tier is re-announced on the next streak
        let announced: Vec<_> = (0..3).filter_map(|_| combo.increment()).collect();
        assert_eq!(announced.len(), 1);
    }

    #[test]
    fn test_progress_to_next_tier() {
        let mut combo = ComboSystem::new();
        assert_eq!(combo.progress_to_next_tier(), 0.0);
        for _ in 0..4 {
            combo.increment();
        }
        // Halfway from 3 to 5
        assert!((combo.progress_to_next_tier() - 0.5).abs() < 1e-9);
        for _ in 0..30 {
            combo.increment();
        }
        assert_eq!(combo.progress_to_next_tier(), 1.0);
        assert!(combo.next_tier().is_none());
    }

    #[test]
    fn test_bonus_score_floors() {
        let mut combo = ComboSystem::new();
        for _ in 0..3 {
            combo.increment();
        }
        // 15 * 1.1 = 16.5
        assert_eq!(combo.calculate_bonus_score(15.0), 16);
    }

    proptest! {
        #[test]
        fn prop_count_bounded_by_max(gaps in proptest::collection::vec(0.0f32..4.0, 1..60)) {
            let mut combo = ComboSystem::new();
            for gap in gaps {
                combo.update(gap);
                combo.increment();
                prop_assert!(combo.count() <= combo.max_count());
                prop_assert!(combo.count() >= 1);
                prop_assert!(combo.timer() > 0.0);
            }
        }

        #[test]
        fn prop_streak_survives_short_gaps(n in 1u32..80, gap in 0.0f32..2.9) {
            let mut combo = ComboSystem::new();
            for _ in 0..n {
                combo.update(gap);
                combo.increment();
            }
            prop_assert_eq!(combo.count(), n);
            prop_assert_eq!(combo.multiplier(), multiplier_for(n));
        }
    }
}
