//! Error types for playback backends and content loading.

use serde::{Deserialize, Serialize};

/// Errors raised by narration backends.
///
/// None of these propagate past the playback engine: the engine logs them and
/// maps them to a session state (`Paused` for recoverable ones, `Errored`
/// otherwise).
#[derive(Debug, Clone, thiserror::Error)]
pub enum PlaybackError {
    /// The platform refused to start audio outside a user gesture.
    #[error("Playback not allowed until the user interacts with the page")]
    PermissionDenied,

    /// The narration file could not be fetched or decoded.
    #[error("Failed to load narration audio: {0}")]
    MediaLoad(String),

    /// No speech synthesis engine is available on this device.
    #[error("Speech synthesis is not supported on this device")]
    SynthesisUnsupported,

    /// The synthesis engine failed mid-utterance.
    #[error("Speech synthesis failed: {0}")]
    SynthesisRuntime(String),

    /// Failed to open the audio output device.
    #[error("Failed to open audio output stream: {0}")]
    OutputStream(String),

    /// The dedicated media thread is gone.
    #[error("Media thread exited unexpectedly")]
    AudioThreadDied,
}

/// Wire-friendly discriminant of [`PlaybackError`], carried in UI events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackErrorKind {
    PermissionDenied,
    MediaLoad,
    SynthesisUnsupported,
    SynthesisRuntime,
    OutputStream,
}

impl PlaybackError {
    #[must_use]
    pub const fn kind(&self) -> PlaybackErrorKind {
        match self {
            Self::PermissionDenied => PlaybackErrorKind::PermissionDenied,
            Self::MediaLoad(_) => PlaybackErrorKind::MediaLoad,
            Self::SynthesisUnsupported => PlaybackErrorKind::SynthesisUnsupported,
            Self::SynthesisRuntime(_) => PlaybackErrorKind::SynthesisRuntime,
            Self::OutputStream(_) | Self::AudioThreadDied => PlaybackErrorKind::OutputStream,
        }
    }

    /// Recoverable errors leave the session `Paused` with manual controls.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::PermissionDenied | Self::SynthesisRuntime(_))
    }
}

/// Errors from a [`ContentSource`](crate::ports::ContentSource).
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("Content id is required")]
    MissingId,

    #[error("Content '{0}' not found")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid content file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_classes() {
        assert!(PlaybackError::PermissionDenied.is_recoverable());
        assert!(PlaybackError::SynthesisRuntime("x".into()).is_recoverable());
        assert!(!PlaybackError::MediaLoad("404".into()).is_recoverable());
        assert!(!PlaybackError::SynthesisUnsupported.is_recoverable());
    }

    #[test]
    fn kind_maps_thread_death_to_output() {
        assert_eq!(
            PlaybackError::AudioThreadDied.kind(),
            PlaybackErrorKind::OutputStream
        );
    }
}
