//! Playback state machine labels and progress telemetry.

use serde::{Deserialize, Serialize};

/// State of the active narration session.
///
/// ```text
///   Idle → Starting/Unlocking → Playing ⇄ Paused → Stopped
///                   │
///                   └──────→ Errored
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackState {
    /// Session loaded, nothing requested yet.
    Idle,

    /// First start requested from inside an unlock tap.
    Unlocking,

    /// Start requested, waiting for the backend to confirm.
    Starting,

    /// Backend is producing audio.
    Playing,

    /// Paused by the user, by a permission denial, or by a synthesis error.
    Paused,

    /// Explicitly stopped or finished naturally.
    Stopped,

    /// Unrecoverable backend failure for this session.
    Errored,
}

impl PlaybackState {
    /// `Stopped` and `Errored` end a session.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped | Self::Errored)
    }

    /// Whether the backend is (or is about to be) producing audio.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Unlocking | Self::Starting | Self::Playing)
    }
}

/// Elapsed time, duration and derived percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// Seconds elapsed.
    pub current_time: f64,

    /// Total seconds, `None` until the backend reports (or the engine estimates) it.
    pub duration: Option<f64>,

    /// `current_time / duration * 100`, clamped to `[0, 100]`.
    pub percent: f64,
}

impl Progress {
    /// Compute progress. Unknown, non-finite or non-positive durations give 0 %.
    #[must_use]
    pub fn new(current_time: f64, duration: Option<f64>) -> Self {
        let duration = duration.filter(|d| d.is_finite() && *d > 0.0);
        let current_time = if current_time.is_finite() {
            current_time.max(0.0)
        } else {
            0.0
        };
        let percent = duration.map_or(0.0, |d| (current_time / d * 100.0).clamp(0.0, 100.0));
        Self {
            current_time,
            duration,
            percent,
        }
    }

    /// Zero progress with an optionally known duration.
    #[must_use]
    pub fn zero(duration: Option<f64>) -> Self {
        Self::new(0.0, duration)
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::zero(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_is_clamped() {
        assert!((Progress::new(5.0, Some(20.0)).percent - 25.0).abs() < f64::EPSILON);
        assert!((Progress::new(40.0, Some(20.0)).percent - 100.0).abs() < f64::EPSILON);
        assert!(Progress::new(-3.0, Some(20.0)).percent.abs() < f64::EPSILON);
    }

    #[test]
    fn nan_duration_is_unknown() {
        let progress = Progress::new(3.0, Some(f64::NAN));
        assert_eq!(progress.duration, None);
        assert!(progress.percent.abs() < f64::EPSILON);
    }

    #[test]
    fn terminal_and_active_states() {
        assert!(PlaybackState::Stopped.is_terminal());
        assert!(PlaybackState::Errored.is_terminal());
        assert!(!PlaybackState::Paused.is_terminal());
        assert!(PlaybackState::Unlocking.is_active());
        assert!(!PlaybackState::Idle.is_active());
    }
}
