//! Level tuning and difficulty progression
//!
//! Levels 1-20 come from a hand-tuned table. Past the end of the table the
//! difficulty is extrapolated from the last row with capped growth ("endless").

use serde::{Deserialize, Serialize};

use super::shape::{ShapeColor, ShapeType};
use crate::error::ConfigError;

/// Endless-mode growth caps
pub const ENDLESS_MAX_FALL_SPEED: f32 = 10.0;
pub const ENDLESS_MIN_SPAWN_INTERVAL: f64 = 300.0;
pub const ENDLESS_MAX_SPECIAL_CHANCE: f64 = 0.8;
pub const ENDLESS_MAX_BOMB_CHANCE: f64 = 0.4;

/// Presentation-only level styling, passed through untouched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelTheme {
    pub background: String,
    pub animation: String,
    pub music: String,
    pub particle_color: String,
}

/// Immutable tuning for one level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub level: u32,
    /// Pixels per 60 Hz frame
    pub fall_speed: f32,
    /// Milliseconds between spawns
    pub spawn_interval: f64,
    pub color_count: u32,
    pub shape_type_count: u32,
    pub special_shape_chance: f64,
    pub bomb_chance: f64,
    pub target_catches: u32,
    pub theme: LevelTheme,
}

impl LevelConfig {
    /// Clamp a row into playable ranges
    fn sanitized(mut self) -> Self {
        let original = self.clone();

        self.level = self.level.max(1);
        self.fall_speed = self.fall_speed.max(0.0);
        self.spawn_interval = self.spawn_interval.max(1.0);
        self.color_count = self.color_count.clamp(1, ShapeColor::ALL.len() as u32);
        self.shape_type_count = self.shape_type_count.clamp(1, ShapeType::ALL.len() as u32);
        self.bomb_chance = self.bomb_chance.clamp(0.0, 1.0);
        self.special_shape_chance = self
            .special_shape_chance
            .clamp(0.0, 1.0)
            .min(1.0 - self.bomb_chance);
        self.target_catches = self.target_catches.max(1);

        if self != original {
            log::warn!("Level {} config clamped into playable range", self.level);
        }
        self
    }

    /// Shape palette for this level (first N types in enumeration order)
    pub fn shape_palette(&self) -> &'static [ShapeType] {
        &ShapeType::ALL[..self.shape_type_count as usize]
    }

    /// Color palette for this level (first N colors in enumeration order)
    pub fn color_palette(&self) -> &'static [ShapeColor] {
        &ShapeColor::ALL[..self.color_count as usize]
    }
}

struct LevelRow {
    fall_speed: f32,
    spawn_interval: f64,
    color_count: u32,
    shape_type_count: u32,
    special_shape_chance: f64,
    bomb_chance: f64,
    target_catches: u32,
    background: (&'static str, &'static str),
    animation: &'static str,
    music: &'static str,
}

macro_rules! row {
    ($fall:expr, $spawn:expr, $colors:expr, $shapes:expr, $special:expr, $bomb:expr, $target:expr,
     $bg_from:expr, $bg_to:expr, $anim:expr, $music:expr) => {
        LevelRow {
            fall_speed: $fall,
            spawn_interval: $spawn,
            color_count: $colors,
            shape_type_count: $shapes,
            special_shape_chance: $special,
            bomb_chance: $bomb,
            target_catches: $target,
            background: ($bg_from, $bg_to),
            animation: $anim,
            music: $music,
        }
    };
}

#[rustfmt::skip]
const AUTHORED_LEVELS: [LevelRow; 20] = [
    // 1-5: tutorial
    row!(1.5, 2500.0, 2, 2, 0.00, 0.00, 15, "#667eea", "#764ba2", "none", "peaceful"),
    row!(1.8, 2200.0, 3, 3, 0.00, 0.00, 18, "#f093fb", "#f5576c", "pulse", "gentle"),
    row!(2.0, 2000.0, 3, 4, 0.05, 0.00, 20, "#4facfe", "#00f2fe", "waves", "upbeat"),
    row!(2.2, 1800.0, 4, 4, 0.08, 0.02, 22, "#43e97b", "#38f9d7", "float", "energetic"),
    row!(2.5, 1600.0, 4, 4, 0.10, 0.03, 25, "#fa709a", "#fee140", "sparkle", "cheerful"),
    // 6-10
    row!(2.8, 1500.0, 5, 4, 0.12, 0.04, 25, "#667eea", "#764ba2", "meteor", "intense"),
    row!(3.0, 1400.0, 5, 4, 0.15, 0.05, 28, "#f093fb", "#f5576c", "storm", "dramatic"),
    row!(3.2, 1300.0, 6, 4, 0.18, 0.06, 30, "#ff9a9e", "#fecfef", "aurora", "epic"),
    row!(3.5, 1200.0, 6, 4, 0.20, 0.07, 32, "#a8edea", "#fed6e3", "lightning", "tension"),
    row!(3.8, 1100.0, 6, 4, 0.22, 0.08, 35, "#ffecd2", "#fcb69f", "volcano", "boss"),
    // 11-15
    row!(4.0, 1000.0, 6, 4, 0.25, 0.10, 35, "#667eea", "#764ba2", "chaos", "frantic"),
    row!(4.2, 950.0, 6, 4, 0.28, 0.11, 38, "#74b9ff", "#0984e3", "tornado", "extreme"),
    row!(4.5, 900.0, 6, 4, 0.30, 0.12, 40, "#e17055", "#fdcb6e", "inferno", "hellish"),
    row!(4.8, 850.0, 6, 4, 0.32, 0.13, 42, "#a29bfe", "#6c5ce7", "vortex", "nightmare"),
    row!(5.0, 800.0, 6, 4, 0.35, 0.15, 45, "#fd79a8", "#e84393", "apocalypse", "final_boss"),
    // 16-20
    row!(5.2, 750.0, 6, 4, 0.38, 0.16, 45, "#636e72", "#2d3436", "shadow_realm", "dark_souls"),
    row!(5.5, 700.0, 6, 4, 0.40, 0.18, 48, "#2d3436", "#000000", "void", "cosmic_horror"),
    row!(5.8, 650.0, 6, 4, 0.42, 0.20, 50, "#ff6b6b", "#ee5a24", "hell_fire", "demon_lord"),
    row!(6.0, 600.0, 6, 4, 0.45, 0.22, 52, "#ffeaa7", "#fdcb6e", "golden_chaos", "god_mode"),
    row!(6.5, 550.0, 6, 4, 0.50, 0.25, 55, "#00cec9", "#55a3ff", "rainbow_explosion", "transcendence"),
];

impl LevelRow {
    fn to_config(&self, level: u32) -> LevelConfig {
        let (from, to) = self.background;
        LevelConfig {
            level,
            fall_speed: self.fall_speed,
            spawn_interval: self.spawn_interval,
            color_count: self.color_count,
            shape_type_count: self.shape_type_count,
            special_shape_chance: self.special_shape_chance,
            bomb_chance: self.bomb_chance,
            target_catches: self.target_catches,
            theme: LevelTheme {
                background: format!("linear-gradient(135deg, {from} 0%, {to} 100%)"),
                animation: self.animation.to_string(),
                music: self.music.to_string(),
                particle_color: from.to_string(),
            },
        }
    }
}

/// Ordered table of authored levels (never empty)
///
/// Deserialization goes through [`LevelTable::from_levels`], so a table read
/// as part of a larger document is clamped the same way as [`LevelTable::from_json`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "Vec<LevelConfig>", try_from = "Vec<LevelConfig>")]
pub struct LevelTable {
    levels: Vec<LevelConfig>,
}

impl Default for LevelTable {
    fn default() -> Self {
        Self::authored()
    }
}

impl TryFrom<Vec<LevelConfig>> for LevelTable {
    type Error = ConfigError;

    fn try_from(levels: Vec<LevelConfig>) -> Result<Self, Self::Error> {
        Self::from_levels(levels)
    }
}

impl From<LevelTable> for Vec<LevelConfig> {
    fn from(table: LevelTable) -> Self {
        table.levels
    }
}

impl LevelTable {
    /// The built-in 20-level campaign
    pub fn authored() -> Self {
        let levels = AUTHORED_LEVELS
            .iter()
            .zip(1..)
            .map(|(row, level)| row.to_config(level))
            .collect();
        Self { levels }
    }

    /// Build from explicit rows. Rows are renumbered 1..=N and clamped.
    pub fn from_levels(levels: Vec<LevelConfig>) -> Result<Self, ConfigError> {
        if levels.is_empty() {
            return Err(ConfigError::EmptyLevelTable);
        }
        let levels = levels
            .into_iter()
            .zip(1..)
            .map(|(mut config, level)| {
                config.level = level;
                config.sanitized()
            })
            .collect();
        Ok(Self { levels })
    }

    /// Parse a JSON array of level configs
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let levels: Vec<LevelConfig> = serde_json::from_str(json)?;
        Self::from_levels(levels)
    }

    pub fn len(&self) -> u32 {
        self.levels.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn is_endless(&self, level: u32) -> bool {
        level > self.len()
    }

    /// Config for any level number: table row (clamped to >= 1) or endless synthesis
    pub fn config_for(&self, level: u32) -> LevelConfig {
        if self.is_endless(level) {
            return self.endless_config(level);
        }
        let index = level.clamp(1, self.len()) as usize - 1;
        self.levels[index].clone()
    }

    /// Extrapolate from the last authored row with capped growth
    pub fn endless_config(&self, level: u32) -> LevelConfig {
        let Some(base) = self.levels.last() else {
            return LevelTable::authored().endless_config(level);
        };
        let extra = level.saturating_sub(self.len());
        let extra_f = f64::from(extra);

        let hue = (f64::from(level) * 137.508) % 360.0;
        let hue_dark = ((f64::from(level) + 180.0) * 137.508) % 360.0;

        LevelConfig {
            level,
            fall_speed: (base.fall_speed + extra as f32 * 0.3).min(ENDLESS_MAX_FALL_SPEED),
            spawn_interval: (base.spawn_interval - extra_f * 20.0).max(ENDLESS_MIN_SPAWN_INTERVAL),
            color_count: base.color_count,
            shape_type_count: base.shape_type_count,
            special_shape_chance: (base.special_shape_chance + extra_f * 0.02)
                .min(ENDLESS_MAX_SPECIAL_CHANCE),
            bomb_chance: (base.bomb_chance + extra_f * 0.01).min(ENDLESS_MAX_BOMB_CHANCE),
            target_catches: base.target_catches.saturating_add(extra.saturating_mul(2)),
            theme: LevelTheme {
                background: format!(
                    "linear-gradient(135deg, hsl({hue:.0}, 70%, 60%) 0%, hsl({hue_dark:.0}, 70%, 40%) 100%)"
                ),
                particle_color: format!("hsl({hue:.0}, 70%, 60%)"),
                ..base.theme.clone()
            },
        }
        .sanitized_quiet()
    }
}

impl LevelConfig {
    /// Keep `special + bomb <= 1` without logging; deep endless levels always hit it
    fn sanitized_quiet(mut self) -> Self {
        self.special_shape_chance = self.special_shape_chance.min(1.0 - self.bomb_chance);
        self
    }
}

/// Tracks the current level and its config
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "StoredLevel")]
pub struct LevelManager {
    table: LevelTable,
    current_level: u32,
    current_config: LevelConfig,
}

/// Persisted form of [`LevelManager`]; the config is re-derived from the table
#[derive(Deserialize)]
struct StoredLevel {
    table: LevelTable,
    current_level: u32,
}

impl From<StoredLevel> for LevelManager {
    fn from(stored: StoredLevel) -> Self {
        Self::new(stored.table, stored.current_level)
    }
}

impl Default for LevelManager {
    fn default() -> Self {
        Self::new(LevelTable::authored(), 1)
    }
}

impl LevelManager {
    pub fn new(table: LevelTable, start_level: u32) -> Self {
        let current_level = start_level.max(1);
        let current_config = table.config_for(current_level);
        Self {
            table,
            current_level,
            current_config,
        }
    }

    pub fn current_level(&self) -> u32 {
        self.current_level
    }

    pub fn current_config(&self) -> &LevelConfig {
        &self.current_config
    }

    /// Advance one level and load its config
    pub fn next_level(&mut self) -> &LevelConfig {
        self.set_level(self.current_level.saturating_add(1));
        &self.current_config
    }

    pub fn set_level(&mut self, level: u32) {
        self.current_level = level.max(1);
        self.current_config = self.table.config_for(self.current_level);
    }

    pub fn is_endless_mode(&self) -> bool {
        self.table.is_endless(self.current_level)
    }

    pub fn max_classic_level(&self) -> u32 {
        self.table.len()
    }

    pub fn check_level_complete(&self, catches: u32) -> bool {
        catches >= self.current_config.target_catches
    }

    /// 0-1 fraction of the catch target reached
    pub fn level_progress(&self, catches: u32) -> f64 {
        (f64::from(catches) / f64::from(self.current_config.target_catches)).min(1.0)
    }

    pub fn remaining_catches(&self, catches: u32) -> u32 {
        self.current_config.target_catches.saturating_sub(catches)
    }

    pub fn difficulty_description(&self) -> &'static str {
        match self.current_level {
            0..=5 => "Beginner",
            6..=10 => "Intermediate",
            11..=15 => "Advanced",
            16..=20 => "Expert",
            _ => "Insane",
        }
    }

    pub fn reset(&mut self) {
        self.set_level(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_level_one_config() {
        let manager = LevelManager::default();
        let config = manager.current_config();
        assert_eq!(config.level, 1);
        assert_eq!(config.fall_speed, 1.5);
        assert_eq!(config.spawn_interval, 2500.0);
        assert_eq!(config.color_count, 2);
        assert_eq!(config.shape_type_count, 2);
        assert_eq!(config.special_shape_chance, 0.0);
        assert_eq!(config.bomb_chance, 0.0);
        assert_eq!(config.target_catches, 15);
        assert_eq!(config.shape_palette(), &[ShapeType::Square, ShapeType::Triangle]);
        assert_eq!(config.color_palette(), &[ShapeColor::Red, ShapeColor::Blue]);
    }

    #[test]
    fn test_authored_curve_is_monotonic() {
        let table = LevelTable::authored();
        for level in 2..=table.len() {
            let prev = table.config_for(level - 1);
            let next = table.config_for(level);
            assert!(next.fall_speed > prev.fall_speed, "fall speed at {level}");
            assert!(next.spawn_interval < prev.spawn_interval, "spawn interval at {level}");
            assert!(next.special_shape_chance >= prev.special_shape_chance);
            assert!(next.bomb_chance >= prev.bomb_chance);
            assert!(next.special_shape_chance + next.bomb_chance <= 1.0);
        }
    }

    #[test]
    fn test_out_of_range_levels_clamped() {
        let table = LevelTable::authored();
        assert_eq!(table.config_for(0).level, 1);
        assert!(!table.is_endless(20));
        assert!(table.is_endless(21));
    }

    #[test]
    fn test_endless_first_level() {
        let table = LevelTable::authored();
        let config = table.config_for(21);
        assert_eq!(config.level, 21);
        assert!((config.fall_speed - 6.8).abs() < 1e-5);
        assert_eq!(config.spawn_interval, 530.0);
        assert!((config.special_shape_chance - 0.52).abs() < 1e-9);
        assert!((config.bomb_chance - 0.26).abs() < 1e-9);
        assert_eq!(config.target_catches, 57);
        assert_eq!(config.theme.music, "transcendence");
    }

    #[test]
    fn test_next_level_enters_endless() {
        let mut manager = LevelManager::new(LevelTable::authored(), 20);
        assert!(!manager.is_endless_mode());
        assert_eq!(manager.difficulty_description(), "Expert");
        manager.next_level();
        assert!(manager.is_endless_mode());
        assert_eq!(manager.current_level(), 21);
        assert_eq!(manager.difficulty_description(), "Insane");
        manager.reset();
        assert_eq!(manager.current_level(), 1);
    }

    #[test]
    fn test_progress_queries() {
        let manager = LevelManager::default();
        assert!(!manager.check_level_complete(14));
        assert!(manager.check_level_complete(15));
        assert_eq!(manager.remaining_catches(10), 5);
        assert_eq!(manager.remaining_catches(40), 0);
        assert_eq!(manager.level_progress(30), 1.0);
    }

    #[test]
    fn test_custom_table_sanitized() {
        let json = r##"[{
            "level": 7,
            "fall_speed": 2.0,
            "spawn_interval": 900.0,
            "color_count": 12,
            "shape_type_count": 0,
            "special_shape_chance": 0.9,
            "bomb_chance": 0.3,
            "target_catches": 10,
            "theme": {"background": "#000", "animation": "none", "music": "calm", "particle_color": "#fff"}
        }]"##;
        let table = LevelTable::from_json(json).unwrap();
        let config = table.config_for(1);
        assert_eq!(config.level, 1);
        assert_eq!(config.color_count, 6);
        assert_eq!(config.shape_type_count, 1);
        assert!((config.special_shape_chance - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_deserialized_table_sanitized() {
        let json = r##"[{
            "level": 3,
            "fall_speed": -1.0,
            "spawn_interval": 0.0,
            "color_count": 9,
            "shape_type_count": 4,
            "special_shape_chance": 0.9,
            "bomb_chance": 0.5,
            "target_catches": 0,
            "theme": {"background": "#000", "animation": "none", "music": "calm", "particle_color": "#fff"}
        }]"##;
        let table: LevelTable = serde_json::from_str(json).unwrap();
        let config = table.config_for(1);
        assert_eq!(config.color_count, 6);
        assert_eq!(config.color_palette().len(), 6);
        assert_eq!(config.target_catches, 1);
        assert!(config.special_shape_chance + config.bomb_chance <= 1.0);

        assert!(serde_json::from_str::<LevelTable>("[]").is_err());
    }

    #[test]
    fn test_table_serializes_as_rows() {
        let table = LevelTable::authored();
        let json = serde_json::to_string(&table).unwrap();
        assert!(json.starts_with('['));
        let restored: LevelTable = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, table);
    }

    #[test]
    fn test_empty_table_rejected() {
        assert!(matches!(
            LevelTable::from_json("[]"),
            Err(ConfigError::EmptyLevelTable)
        ));
        assert!(matches!(LevelTable::from_json("{"), Err(ConfigError::Json(_))));
    }

    proptest! {
        #[test]
        fn prop_endless_caps(level in 21u32..1_000_000) {
            let config = LevelTable::authored().config_for(level);
            prop_assert!(config.fall_speed <= ENDLESS_MAX_FALL_SPEED);
            prop_assert!(config.spawn_interval >= ENDLESS_MIN_SPAWN_INTERVAL);
            prop_assert!(config.special_shape_chance <= ENDLESS_MAX_SPECIAL_CHANCE);
            prop_assert!(config.bomb_chance <= ENDLESS_MAX_BOMB_CHANCE);
            prop_assert!(config.special_shape_chance + config.bomb_chance <= 1.0 + 1e-12);
            prop_assert!(config.target_catches >= 55);
        }
    }
}
