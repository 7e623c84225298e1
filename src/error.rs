//! Error types
//!
//! Only initialisation and collaborator boundaries are fallible. The simulation
//! itself resolves bad input by clamping.

use thiserror::Error;

/// Engine lifecycle failures
#[derive(Debug, Error)]
pub enum EngineError {
    /// The rendering surface (canvas, context) could not be obtained
    #[error("rendering surface unavailable: {0}")]
    SurfaceUnavailable(String),
    /// `start` was called before a successful `initialize`
    #[error("engine started before initialization")]
    NotInitialized,
}

/// Configuration documents that failed to load
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("level table has no levels")]
    EmptyLevelTable,
}

/// Persistence collaborator failures. Logged by the engine, never propagated into a tick.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("storage unavailable: {0}")]
    Storage(String),
    #[error("serialize failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
