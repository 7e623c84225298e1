//! Game settings and preferences
//!
//! Persisted separately from records under their own storage key.

use serde::{Deserialize, Serialize};

use crate::audio::Volume;
use crate::error::{ConfigError, RecordError};
use crate::persistence::{KeyValueStore, load_json, save_json};
use crate::sim::{GameMode, SessionConfig};

/// Shortest Time-Attack session a player can pick (ms)
const MIN_TIME_ATTACK_MS: f64 = 30_000.0;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
    /// Mute when window loses focus
    pub mute_on_blur: bool,

    // === Accessibility ===
    /// Reduced motion (no explosion shake, no theme animation)
    pub reduced_motion: bool,
    pub high_contrast: bool,

    // === HUD ===
    pub show_fps: bool,

    // === Session ===
    /// Mode used when starting from the menu
    pub mode: GameMode,
    /// Level new sessions start on (21+ starts directly in endless mode)
    pub starting_level: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            mute_on_blur: true,

            reduced_motion: false,
            high_contrast: false,

            show_fps: false,

            mode: GameMode::Classic,
            starting_level: 1,
        }
    }
}

impl Settings {
    /// LocalStorage key
    pub const STORAGE_KEY: &'static str = "shape_catcher_settings";

    /// Parse a settings document, clamping out-of-range values
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    fn sanitized(mut self) -> Self {
        self.master_volume = clamp_unit(self.master_volume);
        self.sfx_volume = clamp_unit(self.sfx_volume);
        self.starting_level = self.starting_level.max(1);
        if let GameMode::TimeAttack { limit_ms } = &mut self.mode {
            if !limit_ms.is_finite() || *limit_ms < MIN_TIME_ATTACK_MS {
                log::warn!("Time-Attack limit {} ms raised to {}", limit_ms, MIN_TIME_ATTACK_MS);
                *limit_ms = MIN_TIME_ATTACK_MS;
            }
        }
        self
    }

    /// Audio gains for the synthesiser
    pub fn volume(&self) -> Volume {
        let mut volume = Volume {
            muted: self.muted,
            ..Volume::default()
        };
        volume.set_master(self.master_volume);
        volume.set_sfx(self.sfx_volume);
        volume
    }

    /// Session parameters for a new run with these preferences
    pub fn session_config(&self, seed: u64) -> SessionConfig {
        SessionConfig {
            mode: self.mode,
            starting_level: self.starting_level,
            ..SessionConfig::new(seed)
        }
    }

    /// Load settings, falling back to defaults on a missing or corrupt entry
    pub fn load(store: &dyn KeyValueStore) -> Self {
        load_json::<Self>(store, Self::STORAGE_KEY).sanitized()
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), RecordError> {
        save_json(store, Self::STORAGE_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}

/// NaN counts as silent
fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_round_trip_through_store() {
        let mut store = MemoryStore::default();
        let settings = Settings {
            muted: true,
            mode: GameMode::time_attack(),
            starting_level: 21,
            ..Settings::default()
        };
        settings.save(&mut store).unwrap();
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let settings = Settings::from_json(r#"{"master_volume": 3.0, "starting_level": 0}"#).unwrap();
        assert_eq!(settings.master_volume, 1.0);
        assert_eq!(settings.starting_level, 1);
        assert_eq!(settings.sfx_volume, Settings::default().sfx_volume);
    }

    #[test]
    fn test_short_time_attack_raised() {
        let settings =
            Settings::from_json(r#"{"mode": {"TimeAttack": {"limit_ms": 10.0}}}"#).unwrap();
        assert_eq!(
            settings.mode,
            GameMode::TimeAttack {
                limit_ms: MIN_TIME_ATTACK_MS
            }
        );
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let settings =
            Settings::from_json(r#"{"music_volume": 0.3, "sfx_volume": 0.4}"#).unwrap();
        assert_eq!(settings.sfx_volume, 0.4);
        assert_eq!(settings.master_volume, Settings::default().master_volume);
    }

    #[test]
    fn test_invalid_document_is_config_error() {
        assert!(matches!(
            Settings::from_json("[1, 2"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_volume_and_session_config() {
        let settings = Settings {
            master_volume: 0.5,
            sfx_volume: 0.5,
            starting_level: 4,
            ..Settings::default()
        };
        assert_eq!(settings.volume().effective(), 0.25);

        let config = settings.session_config(9);
        assert_eq!(config.seed, 9);
        assert_eq!(config.starting_level, 4);
        assert_eq!(config.mode, GameMode::Classic);
    }
}
