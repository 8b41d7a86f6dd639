//! Tempo and audio settings
//!
//! Supplied once at startup (JSON from the host page or the defaults) and
//! validated before a course is built.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{DEFAULT_MS_PER_TILE, NOTE_WAVE_LIFETIME_MS};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("ms_per_tile must be positive and finite, got {0}")]
    NonPositiveTempo(f64),
    #[error("note_wave_lifetime_ms must be positive and finite, got {0}")]
    NonPositiveLifetime(f64),
    #[error("{name} volume must be within 0.0..=1.0, got {value}")]
    VolumeOutOfRange { name: &'static str, value: f32 },
    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Course and audio settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Timing ===
    /// Milliseconds for the pulse to cross one normal tile
    pub ms_per_tile: f64,
    /// How long a note wave ping stays on screen
    pub note_wave_lifetime_ms: f64,
    /// Emit a click cue on every full beat
    pub click_track: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Bell and cue volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ms_per_tile: DEFAULT_MS_PER_TILE,
            note_wave_lifetime_ms: NOTE_WAVE_LIFETIME_MS,
            click_track: true,

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

impl Settings {
    /// Parse and validate settings; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.ms_per_tile.is_finite() && self.ms_per_tile > 0.0) {
            return Err(SettingsError::NonPositiveTempo(self.ms_per_tile));
        }
        if !(self.note_wave_lifetime_ms.is_finite() && self.note_wave_lifetime_ms > 0.0) {
            return Err(SettingsError::NonPositiveLifetime(
                self.note_wave_lifetime_ms,
            ));
        }
        for (name, value) in [("master", self.master_volume), ("sfx", self.sfx_volume)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SettingsError::VolumeOutOfRange { name, value });
            }
        }
        Ok(())
    }

    /// Beats per minute implied by the tempo
    pub fn bpm(&self) -> f64 {
        60_000.0 / self.ms_per_tile
    }

    /// Effective output volume (respects mute)
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }
}
