//! Events emitted from the core to the UI shell.
//!
//! These map one-to-one onto the shell callbacks: state changes, progress,
//! card index changes, unlock prompts, plus a failure notice so the shell can
//! swap in a manual play button or a disabled control.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::domain::{PlaybackState, Progress, SessionId};
use crate::error::PlaybackErrorKind;

/// Event delivered to the UI shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum ReaderEvent {
    /// The active session changed state.
    StateChanged {
        session: SessionId,
        state: PlaybackState,
    },

    /// Progress telemetry for the active session.
    Progress {
        session: SessionId,
        #[serde(flatten)]
        progress: Progress,
    },

    /// The visible card changed.
    IndexChanged { index: usize },

    /// The session would auto-start but audio is still locked.
    UnlockPromptNeeded { session: SessionId },

    /// A backend failed; `recoverable` tells the shell whether to offer retry.
    PlaybackFailed {
        session: SessionId,
        kind: PlaybackErrorKind,
        recoverable: bool,
        message: String,
    },
}

/// Best-effort emitter for [`ReaderEvent`]s.
///
/// Cloning shares the same channel. If the receiver is gone the event is
/// dropped with a warning; emitting never fails the caller.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: Option<mpsc::UnboundedSender<ReaderEvent>>,
}

impl EventSink {
    /// Create a sink and the receiver the shell reads from.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ReaderEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A sink that discards everything.
    #[must_use]
    pub const fn noop() -> Self {
        Self { tx: None }
    }

    pub fn emit(&self, event: ReaderEvent) {
        let Some(tx) = &self.tx else {
            return;
        };
        if tx.send(event).is_err() {
            tracing::warn!("Reader event receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_delivers_in_order() {
        let (sink, mut rx) = EventSink::channel();
        sink.emit(ReaderEvent::IndexChanged { index: 1 });
        sink.emit(ReaderEvent::IndexChanged { index: 2 });

        assert_eq!(rx.try_recv().unwrap(), ReaderEvent::IndexChanged { index: 1 });
        assert_eq!(rx.try_recv().unwrap(), ReaderEvent::IndexChanged { index: 2 });
    }

    #[test]
    fn dropped_receiver_does_not_panic() {
        let (sink, rx) = EventSink::channel();
        drop(rx);
        sink.emit(ReaderEvent::IndexChanged { index: 0 });
        EventSink::noop().emit(ReaderEvent::IndexChanged { index: 0 });
    }

    #[test]
    fn progress_event_serializes_flat() {
        let event = ReaderEvent::Progress {
            session: crate::domain::SessionId::next(),
            progress: Progress::new(5.0, Some(20.0)),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "progress");
        assert_eq!(json["percent"], 25.0);
    }
}
