//! Game session state and core simulation types
//!
//! Everything a running session needs lives in [`GameState`]. It is owned by the
//! engine, mutated only by [`tick`](super::tick::tick) and the discrete status
//! transitions below, and serializable so two runs can be compared for determinism.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::catcher::Catcher;
use super::combo::{ComboSystem, ComboTier};
use super::level::{LevelManager, LevelTable};
use super::physics::{PhysicsConfig, PhysicsEngine};
use super::powerup::PowerUps;
use super::scoring::{Grade, LevelPerformance};
use super::shape::{Shape, ShapeKind};
use super::spawn;
use crate::consts::*;

/// High-level session status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// Session created, not started
    Menu,
    /// Active gameplay
    Playing,
    /// Frozen by the player
    Paused,
    /// Between a completed level and the next one
    LevelTransition,
    /// Session ended
    GameOver,
}

/// Session rules
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum GameMode {
    /// Lives-limited, levels continue into endless mode
    #[default]
    Classic,
    /// Ends only when the clock runs out. No lives, no level progression, 1.5x score.
    TimeAttack { limit_ms: f64 },
}

impl GameMode {
    pub fn time_attack() -> Self {
        Self::TimeAttack {
            limit_ms: TIME_ATTACK_DEFAULT_MS,
        }
    }

    /// Misses and bombs cost lives, and running out ends the session
    pub fn has_lives_limit(&self) -> bool {
        matches!(self, Self::Classic)
    }

    /// Reaching the catch target completes the level
    pub fn has_level_progression(&self) -> bool {
        matches!(self, Self::Classic)
    }

    /// Applied to every catch alongside the combo and power-up multipliers
    pub fn score_multiplier(&self) -> f64 {
        match self {
            Self::Classic => 1.0,
            Self::TimeAttack { .. } => TIME_ATTACK_SCORE_MULTIPLIER,
        }
    }
}

/// Parameters for a new session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// RNG seed; identical seeds and inputs replay identically
    pub seed: u64,
    #[serde(default)]
    pub mode: GameMode,
    #[serde(default = "default_starting_level")]
    pub starting_level: u32,
    #[serde(default)]
    pub physics: PhysicsConfig,
    #[serde(default)]
    pub levels: LevelTable,
}

fn default_starting_level() -> u32 {
    1
}

impl SessionConfig {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            mode: GameMode::Classic,
            starting_level: 1,
            physics: PhysicsConfig::default(),
            levels: LevelTable::authored(),
        }
    }
}

/// Outcomes produced by a tick or status transition, in the order they happened
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A shape matched the catcher
    Caught {
        id: u32,
        kind: ShapeKind,
        points: u64,
        combo: u32,
    },
    /// A shape touched the catcher without matching
    Missed { id: u32, kind: ShapeKind },
    /// A bomb touched the catcher. `penalty` is what was actually deducted.
    BombHit { id: u32, penalty: u64 },
    /// The combo crossed into a new tier
    ComboTierReached(ComboTier),
    PowerUpActivated { multiplier: f64, duration_ms: f64 },
    PowerUpExpired,
    /// Time-Attack clock extended by a Time-Bonus pickup
    TimeExtended { ms: f64 },
    LevelComplete {
        level: u32,
        grade: Grade,
        bonus: u64,
    },
    LevelStarted { level: u32 },
    GameOver { score: u64, level: u32 },
}

/// Complete session state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub config: SessionConfig,
    pub status: GameStatus,
    pub score: u64,
    pub lives: u32,
    /// Elapsed simulated time (ms)
    pub game_time: f64,
    /// Elapsed simulated time on the current level (ms)
    pub level_time: f64,
    /// Simulation steps taken while playing
    pub time_ticks: u64,
    /// Simulated ms since the last spawn
    pub spawn_timer: f64,
    /// Remaining pause before the next level starts (ms)
    pub transition_timer: f64,
    /// Time-Attack clock (ms); `None` in Classic
    pub time_remaining: Option<f64>,
    pub levels: LevelManager,
    pub combo: ComboSystem,
    pub catcher: Catcher,
    /// Active shapes (ascending id)
    pub shapes: Vec<Shape>,
    pub powerups: PowerUps,
    pub physics: PhysicsEngine,
    /// Counters for the level in progress
    pub level_stats: LevelPerformance,
    /// Grade of the most recently completed level
    pub last_grade: Option<Grade>,
    rng: Pcg32,
    next_id: u32,
}

impl GameState {
    /// Create a session in the `Menu` status
    pub fn new(config: SessionConfig) -> Self {
        let levels = LevelManager::new(config.levels.clone(), config.starting_level);
        let level = levels.current_config();
        let catcher = Catcher::with_palettes(level.shape_palette(), level.color_palette());
        let time_remaining = match config.mode {
            GameMode::Classic => None,
            GameMode::TimeAttack { limit_ms } => Some(limit_ms),
        };

        Self {
            rng: Pcg32::seed_from_u64(config.seed),
            physics: PhysicsEngine::new(config.physics),
            status: GameStatus::Menu,
            score: 0,
            lives: INITIAL_LIVES,
            game_time: 0.0,
            level_time: 0.0,
            time_ticks: 0,
            spawn_timer: 0.0,
            transition_timer: 0.0,
            time_remaining,
            levels,
            combo: ComboSystem::new(),
            catcher,
            shapes: Vec::new(),
            powerups: PowerUps::default(),
            level_stats: LevelPerformance::default(),
            last_grade: None,
            next_id: 1,
            config,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Spawn one shape for the current level. Returns its id.
    pub fn spawn_shape(&mut self) -> u32 {
        let id = self.next_entity_id();
        let shape = spawn::spawn_shape(&mut self.rng, id, self.levels.current_config());
        self.shapes.push(shape);
        id
    }

    pub fn level(&self) -> u32 {
        self.levels.current_level()
    }

    /// Menu -> Playing. No-op from any other status.
    pub fn start(&mut self) -> Option<GameEvent> {
        if self.status != GameStatus::Menu {
            return None;
        }
        self.status = GameStatus::Playing;
        self.begin_level();
        log::info!(
            "Session started: seed={}, mode={:?}, level={}",
            self.config.seed,
            self.config.mode,
            self.level()
        );
        Some(GameEvent::LevelStarted { level: self.level() })
    }

    /// Fresh session with the same config, already playing
    pub fn restart(&mut self) -> Option<GameEvent> {
        *self = Self::new(self.config.clone());
        self.start()
    }

    /// Playing <-> Paused. Returns true if the status changed.
    pub fn toggle_pause(&mut self) -> bool {
        match self.status {
            GameStatus::Playing => self.status = GameStatus::Paused,
            GameStatus::Paused => self.status = GameStatus::Playing,
            _ => return false,
        }
        log::info!("Status: {:?}", self.status);
        true
    }

    /// Reset per-level bookkeeping for the current level config
    fn begin_level(&mut self) {
        let config = self.levels.current_config();
        self.catcher.set_available_shapes(config.shape_palette());
        self.catcher.set_available_colors(config.color_palette());
        self.shapes.clear();
        self.level_time = 0.0;
        self.level_stats = LevelPerformance::default();
        // First spawn lands on the first step
        self.spawn_timer = config.spawn_interval;
        self.combo.reset();
        log::info!(
            "Level {} ({}){}",
            config.level,
            self.levels.difficulty_description(),
            if self.levels.is_endless_mode() { " [endless]" } else { "" }
        );
    }

    /// Playing -> LevelTransition: grade the level and award its bonus
    pub fn complete_level(&mut self) -> Option<GameEvent> {
        if self.status != GameStatus::Playing {
            return None;
        }
        let grade = self.level_stats.grade();
        let bonus = grade.bonus_points();
        self.score = self.score.saturating_add(bonus);
        self.last_grade = Some(grade);
        self.status = GameStatus::LevelTransition;
        self.transition_timer = LEVEL_TRANSITION_MS;
        log::info!(
            "Level {} complete: grade={}, bonus={}, score={}",
            self.level(),
            grade.as_str(),
            bonus,
            self.score
        );
        Some(GameEvent::LevelComplete {
            level: self.level(),
            grade,
            bonus,
        })
    }

    /// LevelTransition -> Playing on the next level
    pub fn advance_level(&mut self) -> Option<GameEvent> {
        if self.status != GameStatus::LevelTransition {
            return None;
        }
        self.levels.next_level();
        self.begin_level();
        self.status = GameStatus::Playing;
        Some(GameEvent::LevelStarted { level: self.level() })
    }

    /// Take one life. Returns the game-over event when this was the last one.
    /// Modes without a lives limit never lose one.
    pub fn lose_life(&mut self) -> Option<GameEvent> {
        if !self.config.mode.has_lives_limit() || self.lives == 0 {
            return None;
        }
        self.lives -= 1;
        if self.lives == 0 {
            return self.end_game();
        }
        None
    }

    /// Any status -> GameOver, exactly once
    pub fn end_game(&mut self) -> Option<GameEvent> {
        if self.status == GameStatus::GameOver {
            return None;
        }
        self.status = GameStatus::GameOver;
        log::info!("Game over: score={}, level={}", self.score, self.level());
        Some(GameEvent::GameOver {
            score: self.score,
            level: self.level(),
        })
    }

    pub fn is_time_up(&self) -> bool {
        self.time_remaining.is_some_and(|ms| ms <= 0.0)
    }
}
