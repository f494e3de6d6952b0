//! Asynchronous completions reported by backends.

use tokio::sync::mpsc;

use crate::domain::SessionId;

/// Identity of the backend run that produced a signal.
///
/// `generation` increases every time the engine (re)starts or cancels a
/// backend within a session, so a late "ended" from a cancelled utterance
/// never matches the utterance that replaced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BackendTag {
    pub session: SessionId,
    pub generation: u32,
}

/// Why a play request was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayRejection {
    /// Autoplay policy: playback must start inside a user gesture.
    NotAllowed,
    /// Anything else (decode failure, unreachable URL, no output device).
    Failed(String),
}

/// Native media element notifications.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Duration became known.
    LoadedMetadata { duration: f64 },
    /// Playback position advanced.
    TimeUpdate { current_time: f64 },
    /// A `play()` request resolved.
    PlayResolved(Result<(), PlayRejection>),
    /// Playback reached the end of the file.
    Ended,
    /// Network or decode failure after the source was attached.
    Error(String),
}

/// Speech synthesis notifications. Synthesis reports no progress of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    Started,
    Ended,
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    Media(MediaEvent),
    Speech(SpeechEvent),
}

/// A tagged backend notification.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendSignal {
    pub tag: BackendTag,
    pub event: BackendEvent,
}

/// Sending half handed to backends.
#[derive(Debug, Clone)]
pub struct SignalSender {
    tx: mpsc::UnboundedSender<BackendSignal>,
}

impl SignalSender {
    pub fn media(&self, tag: BackendTag, event: MediaEvent) {
        self.send(BackendSignal {
            tag,
            event: BackendEvent::Media(event),
        });
    }

    pub fn speech(&self, tag: BackendTag, event: SpeechEvent) {
        self.send(BackendSignal {
            tag,
            event: BackendEvent::Speech(event),
        });
    }

    fn send(&self, signal: BackendSignal) {
        if self.tx.send(signal).is_err() {
            tracing::debug!("Backend signal receiver dropped");
        }
    }
}

/// Create the backend signal channel.
#[must_use]
pub fn signal_channel() -> (SignalSender, mpsc::UnboundedReceiver<BackendSignal>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (SignalSender { tx }, rx)
}
