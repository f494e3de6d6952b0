//! Settings domain types, validation and JSON loading.
//!
//! Navigation timing (swipe distance, wheel windows, pagination lock) is not
//! configurable; those constants live in `hark-nav`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default chars-per-second used to estimate synthesized speech duration.
pub const DEFAULT_CHARS_PER_SECOND: f64 = 10.0;

/// Default relative seek step of the transport buttons.
pub const DEFAULT_SEEK_STEP_SECS: f64 = 15.0;

/// Default progress tick for synthesized speech.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 100;

/// Environment variable overriding the settings file location.
pub const CONFIG_ENV_VAR: &str = "HARK_CONFIG";

/// Voice parameters for on-device synthesis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SpeechSettings {
    /// Locale of the narration content.
    pub locale: String,

    /// Speaking rate multiplier (1.0 = natural).
    pub rate: f32,

    /// Pitch multiplier (1.0 = natural).
    pub pitch: f32,

    /// Output volume (0.0–1.0).
    pub volume: f32,

    /// Characters spoken per second, used for duration estimates and seeking.
    pub chars_per_second: f64,

    /// Re-derive `chars_per_second` from the first uninterrupted utterance.
    pub calibrate_rate: bool,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            locale: "en-US".to_string(),
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
            chars_per_second: DEFAULT_CHARS_PER_SECOND,
            calibrate_rate: false,
        }
    }
}

/// Application settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub speech: SpeechSettings,

    /// Seconds moved by the seek forward/backward buttons.
    pub seek_step_secs: f64,

    /// Progress tick for synthesized speech, in milliseconds.
    pub tick_interval_ms: u64,

    /// Whether the platform requires a user gesture before audio may start.
    pub require_gesture: bool,

    /// Start narration automatically when a card becomes active.
    pub auto_start: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            speech: SpeechSettings::default(),
            seek_step_secs: DEFAULT_SEEK_STEP_SECS,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            require_gesture: true,
            auto_start: true,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No settings file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(SettingsError::Io(e)),
        };

        let settings: Self = serde_json::from_str(&raw)?;
        validate_settings(&settings)?;
        Ok(settings)
    }

    /// Resolve the settings path: explicit path, then `HARK_CONFIG`, then
    /// `<config_dir>/hark/settings.json`.
    #[must_use]
    pub fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR).filter(|v| !v.is_empty()) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("hark").join("settings.json"))
    }
}

/// Settings validation error.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Speech rate must be between 0.1 and 10, got {0}")]
    InvalidRate(f32),

    #[error("Speech pitch must be between 0 and 2, got {0}")]
    InvalidPitch(f32),

    #[error("Speech volume must be between 0 and 1, got {0}")]
    InvalidVolume(f32),

    #[error("Characters per second must be positive, got {0}")]
    InvalidCharsPerSecond(f64),

    #[error("Seek step must be positive, got {0}")]
    InvalidSeekStep(f64),

    #[error("Tick interval must be between 10 and 1000 ms, got {0}")]
    InvalidTickInterval(u64),

    #[error("Locale cannot be empty")]
    EmptyLocale,

    #[error("Failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    let speech = &settings.speech;

    if !(0.1..=10.0).contains(&speech.rate) {
        return Err(SettingsError::InvalidRate(speech.rate));
    }
    if !(0.0..=2.0).contains(&speech.pitch) {
        return Err(SettingsError::InvalidPitch(speech.pitch));
    }
    if !(0.0..=1.0).contains(&speech.volume) {
        return Err(SettingsError::InvalidVolume(speech.volume));
    }
    if !(speech.chars_per_second.is_finite() && speech.chars_per_second > 0.0) {
        return Err(SettingsError::InvalidCharsPerSecond(speech.chars_per_second));
    }
    if speech.locale.trim().is_empty() {
        return Err(SettingsError::EmptyLocale);
    }
    if !(settings.seek_step_secs.is_finite() && settings.seek_step_secs > 0.0) {
        return Err(SettingsError::InvalidSeekStep(settings.seek_step_secs));
    }
    if !(10..=1000).contains(&settings.tick_interval_ms) {
        return Err(SettingsError::InvalidTickInterval(settings.tick_interval_ms));
    }

    Ok(())
}
