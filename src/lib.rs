//! Shape Catcher - a falling-shape matching arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, physics, collisions, combo, levels)
//! - `game_loop`: Fixed-timestep scheduler with render interpolation
//! - `engine`: Orchestrator wiring the loop, session state and collaborators
//! - `platform`: Input action vocabulary and held-key polling
//! - `audio`: Fire-and-forget audio collaborator
//! - `persistence`: Outcome recorders and key/value storage helpers
//! - `highscores`, `stats`: Persisted records fed by game events
//! - `settings`: Player preferences

pub mod audio;
pub mod engine;
pub mod error;
pub mod game_loop;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod stats;

pub use engine::{Engine, RenderSnapshot};
pub use error::{ConfigError, EngineError, RecordError};
pub use game_loop::GameLoop;
pub use highscores::HighScores;
pub use settings::Settings;
pub use stats::SessionStatistics;

/// Game configuration constants
pub mod consts {
    /// Playfield dimensions (logical pixels)
    pub const CANVAS_WIDTH: f32 = 800.0;
    pub const CANVAS_HEIGHT: f32 = 600.0;

    /// Simulation rate
    pub const FPS: f64 = 60.0;
    /// Fixed simulation step in milliseconds
    pub const FRAME_TIME: f64 = 1000.0 / FPS;
    /// Fixed simulation step in seconds (what update callbacks receive)
    pub const SIM_DT: f32 = (FRAME_TIME / 1000.0) as f32;
    /// Maximum simulation steps drained per host frame to prevent spiral of death
    pub const MAX_CATCH_UP_STEPS: u32 = 8;

    /// Catcher defaults
    pub const CATCHER_WIDTH: f32 = 60.0;
    pub const CATCHER_HEIGHT: f32 = 60.0;
    pub const CATCHER_Y: f32 = 550.0;
    /// Horizontal distance per move action (pixels)
    pub const CATCHER_SPEED: f32 = 12.5;

    /// Shape defaults
    pub const SHAPE_SIZE: f32 = 40.0;
    pub const SHAPE_SPAWN_MARGIN: f32 = 20.0;
    /// Cosmetic spin (radians/sec)
    pub const ROTATION_SPEED: f32 = 2.0;

    /// Combo streak expires after this long without a catch (ms)
    pub const COMBO_TIMEOUT: f64 = 3000.0;

    pub const INITIAL_LIVES: u32 = 3;

    /// Forgiving hitbox padding on every side (pixels)
    pub const COLLISION_BUFFER: f32 = 5.0;

    /// Points before any multiplier
    pub const BASE_POINTS: u32 = 10;
    /// Flat points for Time-Bonus and Multiplier pickups
    pub const BONUS_PICKUP_POINTS: u32 = 5;
    /// Fixed score penalty for catching a bomb
    pub const BOMB_PENALTY: u64 = 5;
    /// Catcher stun after a bomb hit (seconds)
    pub const BOMB_STUN_SECS: f32 = 1.0;
    /// Explosion pushed onto nearby shapes by a bomb
    pub const BOMB_BLAST_RADIUS: f32 = 150.0;
    pub const BOMB_BLAST_FORCE: f32 = 6.0;

    /// Time-Bonus extension for the Time-Attack clock (ms)
    pub const TIME_BONUS_MS: f64 = 10_000.0;
    /// Default Time-Attack session length (ms)
    pub const TIME_ATTACK_DEFAULT_MS: f64 = 180_000.0;
    /// Time-Attack score multiplier
    pub const TIME_ATTACK_SCORE_MULTIPLIER: f64 = 1.5;

    /// Pause between a completed level and the next one (ms)
    pub const LEVEL_TRANSITION_MS: f64 = 2000.0;
}
