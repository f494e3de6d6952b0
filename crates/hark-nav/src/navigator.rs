//! The single entry point for pagination input.

use std::time::Instant;

use crate::TRACKPAD_DELTA_LIMIT;
use crate::pagination::{Direction, IndexChange, PaginationState};
use crate::touch::{TouchTracker, swipe_direction};
use crate::wheel::WheelAccumulator;

/// A raw wheel event as the shell receives it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelInput {
    /// Positive scrolls down the page (towards the next card).
    pub delta_y: f64,
    /// A zoom modifier (ctrl) was held.
    pub modifier: bool,
}

impl WheelInput {
    #[must_use]
    pub const fn new(delta_y: f64) -> Self {
        Self {
            delta_y,
            modifier: false,
        }
    }

    /// Small deltas without a modifier come from a trackpad, not a notched
    /// mouse wheel.
    #[must_use]
    pub fn is_trackpad(&self) -> bool {
        self.delta_y.abs() < TRACKPAD_DELTA_LIMIT && !self.modifier
    }
}

/// What the shell should do with a wheel event it forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelDisposition {
    /// Part of a trackpad gesture; suppress native scrolling.
    Captured,
    /// Dropped because a touch or a transition is in progress.
    Ignored,
    /// Not a trackpad gesture; let it scroll natively.
    PassThrough,
}

/// Turns touch and wheel input into one-card index changes.
///
/// Touch and wheel gestures exclude each other: a touch sequence drops wheel
/// events, and a pending wheel burst rejects new touches.
#[derive(Debug, Clone)]
pub struct GestureNavigator {
    pages: PaginationState,
    touch: TouchTracker,
    wheel: WheelAccumulator,
}

impl GestureNavigator {
    #[must_use]
    pub const fn new(card_count: usize) -> Self {
        Self {
            pages: PaginationState::new(card_count),
            touch: TouchTracker::new(),
            wheel: WheelAccumulator::new(),
        }
    }

    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.pages.current_index()
    }

    #[must_use]
    pub const fn card_count(&self) -> usize {
        self.pages.card_count()
    }

    #[must_use]
    pub fn is_transitioning(&self, now: Instant) -> bool {
        self.pages.is_transitioning(now)
    }

    #[must_use]
    pub const fn is_touching(&self) -> bool {
        self.touch.is_active()
    }

    pub fn set_card_count(&mut self, card_count: usize) {
        self.pages.set_card_count(card_count);
    }

    // ── Touch ──────────────────────────────────────────────────────────

    /// Begin a touch sequence at `y`.
    ///
    /// Returns `false` when the touch is not tracked: it started inside the
    /// playback controls, another touch is live, a transition is running, or
    /// a wheel burst is pending.
    pub fn touch_start(&mut self, y: f64, in_controls: bool, now: Instant) -> bool {
        if in_controls
            || self.touch.is_active()
            || self.pages.is_transitioning(now)
            || self.wheel.is_pending()
        {
            return false;
        }
        self.touch.start(y);
        true
    }

    pub const fn touch_move(&mut self, y: f64) {
        self.touch.update(y);
    }

    /// End the touch sequence; a long enough vertical swipe moves one card.
    pub fn touch_end(&mut self, now: Instant) -> Option<IndexChange> {
        let distance = self.touch.finish()?;
        if self.pages.is_transitioning(now) {
            return None;
        }
        let direction = swipe_direction(distance)?;
        tracing::debug!(distance, ?direction, "Swipe");
        self.pages.advance(direction, now)
    }

    // ── Wheel ──────────────────────────────────────────────────────────

    pub fn wheel(&mut self, input: WheelInput, now: Instant) -> WheelDisposition {
        if self.touch.is_active() || self.pages.is_transitioning(now) {
            self.wheel.reset();
            return WheelDisposition::Ignored;
        }
        if !input.is_trackpad() {
            self.wheel.reset();
            return WheelDisposition::PassThrough;
        }
        self.wheel.push(input.delta_y, now);
        WheelDisposition::Captured
    }

    // ── Clock ──────────────────────────────────────────────────────────

    /// Run due timers: release an elapsed transition lock, then judge a
    /// quiet wheel burst.
    pub fn poll(&mut self, now: Instant) -> Option<IndexChange> {
        if self.pages.release_if_elapsed(now) {
            tracing::trace!("Transition lock released");
        }
        let direction = self.wheel.take_due(now)?;
        if self.pages.is_transitioning(now) {
            return None;
        }
        tracing::debug!(?direction, "Wheel gesture");
        self.pages.advance(direction, now)
    }

    /// The earliest instant at which [`poll`](Self::poll) has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.wheel.commit_at(), self.pages.transition_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Show `index` without a transition; clamped to the card list.
    pub fn jump_to(&mut self, index: usize) -> Option<IndexChange> {
        self.touch.cancel();
        self.wheel.reset();
        self.pages.jump_to(index)
    }

    /// Move one card directly (keyboard, buttons). Subject to the same lock
    /// and bounds as gestures.
    pub fn advance(&mut self, direction: Direction, now: Instant) -> Option<IndexChange> {
        self.pages.advance(direction, now)
    }
}
