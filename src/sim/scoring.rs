//! Score composition and level grades

use serde::{Deserialize, Serialize};

use super::collision::score_multiplier;
use super::shape::{ShapeKind, SpecialShape};
use crate::consts::{BASE_POINTS, BONUS_PICKUP_POINTS};

/// Points before any multiplier. Bombs score nothing here; their penalty is separate.
pub fn base_points(kind: &ShapeKind) -> u32 {
    match kind {
        ShapeKind::Regular { .. } => BASE_POINTS,
        ShapeKind::Special(special) => match special {
            SpecialShape::Diamond { .. }
            | SpecialShape::Rainbow { .. }
            | SpecialShape::GoldenStar { .. } => BASE_POINTS,
            SpecialShape::TimeBonus | SpecialShape::Multiplier => BONUS_PICKUP_POINTS,
            SpecialShape::Bomb => 0,
        },
    }
}

/// Points awarded for a successful catch.
///
/// All multipliers compose multiplicatively and the product is floored once:
/// `floor(base * shape * combo * powerup)`.
pub fn catch_points(kind: &ShapeKind, combo_multiplier: f64, powerup_multiplier: f64) -> u64 {
    let raw = f64::from(base_points(kind))
        * score_multiplier(kind)
        * combo_multiplier
        * powerup_multiplier;
    raw.max(0.0).floor() as u64
}

/// End-of-level grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    Bronze,
    Silver,
    Gold,
    Diamond,
    Master,
}

impl Grade {
    /// Best first
    const LADDER: [(Grade, f64, u32); 4] = [
        (Grade::Master, 1.0, 20),
        (Grade::Diamond, 0.95, 15),
        (Grade::Gold, 0.85, 10),
        (Grade::Silver, 0.7, 5),
    ];

    /// Grade from accuracy (0-1) and best streak. Anything below Silver is Bronze.
    pub fn calculate(accuracy: f64, max_combo: u32) -> Self {
        Self::LADDER
            .iter()
            .find(|(_, min_accuracy, min_combo)| accuracy >= *min_accuracy && max_combo >= *min_combo)
            .map_or(Grade::Bronze, |(grade, _, _)| *grade)
    }

    pub fn bonus_points(&self) -> u64 {
        match self {
            Grade::Bronze => 100,
            Grade::Silver => 300,
            Grade::Gold => 500,
            Grade::Diamond => 1000,
            Grade::Master => 2000,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::Bronze => "Bronze",
            Grade::Silver => "Silver",
            Grade::Gold => "Gold",
            Grade::Diamond => "Diamond",
            Grade::Master => "Master",
        }
    }
}

/// Per-level counters used for grading
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelPerformance {
    pub catches: u32,
    pub misses: u32,
    pub bombs: u32,
    pub max_combo: u32,
}

impl LevelPerformance {
    /// Catches over resolved shapes. Zero when nothing has resolved yet.
    pub fn accuracy(&self) -> f64 {
        let resolved = self.catches + self.misses + self.bombs;
        if resolved == 0 {
            return 0.0;
        }
        f64::from(self.catches) / f64::from(resolved)
    }

    pub fn grade(&self) -> Grade {
        Grade::calculate(self.accuracy(), self.max_combo)
    }
}
