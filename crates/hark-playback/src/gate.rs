//! Autoplay unlock gate: the one-time, gesture-bound audio permission.
//!
//! Some platforms refuse to start audio unless the start happens
//! synchronously inside a user tap. The gate records whether that has
//! happened during this page load. It never blocks: the UI decides whether
//! to show a "tap to enable audio" prompt based on [`needs_prompt`].
//!
//! [`needs_prompt`]: AutoplayUnlockGate::needs_prompt

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use hark_core::{NarrationSession, PlaybackState};

use crate::engine::PlaybackEngine;

/// Result of an unlock tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnlockOutcome {
    /// Session state right after the start attempt, `None` if nothing is loaded.
    ///
    /// Streamed audio reports `Unlocking` until the play request resolves;
    /// a permission-class rejection then leaves the session `Paused`.
    pub state: Option<PlaybackState>,

    /// `true` if this tap is the one that unlocked audio.
    pub first_unlock: bool,
}

/// Shared unlock flag.
///
/// `locked → unlocked` happens at most once; there is no way back. Clones
/// share the same flag.
#[derive(Debug, Clone)]
pub struct AutoplayUnlockGate {
    unlocked: Arc<AtomicBool>,
}

impl AutoplayUnlockGate {
    /// Create a gate. Without a gesture requirement it starts unlocked.
    #[must_use]
    pub fn new(require_gesture: bool) -> Self {
        Self {
            unlocked: Arc::new(AtomicBool::new(!require_gesture)),
        }
    }

    #[must_use]
    pub fn is_unlocked(&self) -> bool {
        self.unlocked.load(Ordering::SeqCst)
    }

    /// Whether the UI should prompt for a tap before `session` can auto-start.
    #[must_use]
    pub fn needs_prompt(&self, session: Option<&NarrationSession>, auto_start: bool) -> bool {
        auto_start && session.is_some() && !self.is_unlocked()
    }

    /// Handle an unlock tap. Must be called directly from the tap handler.
    ///
    /// Starts (or resumes) the engine's pending session synchronously. The
    /// gate is marked unlocked whatever the outcome, so a rejected start
    /// degrades to manual controls instead of prompting again.
    pub fn request_unlock(&self, engine: &mut PlaybackEngine) -> UnlockOutcome {
        let first_unlock = !self.unlocked.swap(true, Ordering::SeqCst);
        if first_unlock {
            tracing::info!("Audio unlocked by user gesture");
        }

        let state = engine.start_from_gesture();
        tracing::debug!(?state, first_unlock, "Unlock tap handled");

        UnlockOutcome {
            state,
            first_unlock,
        }
    }
}

impl Default for AutoplayUnlockGate {
    fn default() -> Self {
        Self::new(true)
    }
}
