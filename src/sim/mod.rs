//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod catcher;
pub mod collision;
pub mod combo;
pub mod level;
pub mod physics;
pub mod powerup;
pub mod scoring;
pub mod shape;
pub mod spawn;
pub mod state;
pub mod tick;

pub use catcher::{Catcher, CatcherState};
pub use collision::{CollisionResult, check_collision, collision_priority, is_match, score_multiplier};
pub use combo::{COMBO_TIERS, ComboSystem, ComboTier};
pub use level::{LevelConfig, LevelManager, LevelTable, LevelTheme};
pub use physics::{PhysicsConfig, PhysicsEngine};
pub use powerup::PowerUps;
pub use scoring::{Grade, LevelPerformance, catch_points};
pub use shape::{Bounds, Shape, ShapeColor, ShapeKind, ShapeType, SpecialKind, SpecialShape};
pub use state::{GameEvent, GameMode, GameState, GameStatus, SessionConfig};
pub use tick::{TickInput, tick};
