//! Bounded card index with a fixed-length transition lock.

use std::cmp::Ordering;
use std::time::Instant;

use crate::TRANSITION_LOCK;

/// Which way to move through the cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Next card (swipe up, scroll down).
    Forward,
    /// Previous card (swipe down, scroll up).
    Backward,
}

impl Direction {
    /// Direction of a vertical delta where positive means "further down".
    /// Zero has no direction.
    #[must_use]
    pub fn from_delta(delta: f64) -> Option<Self> {
        if delta > 0.0 {
            Some(Self::Forward)
        } else if delta < 0.0 {
            Some(Self::Backward)
        } else {
            None
        }
    }
}

/// A committed navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexChange {
    pub from: usize,
    pub to: usize,
    pub direction: Direction,
}

/// `current_index` in `[0, card_count - 1]` plus the transition lock.
///
/// While the lock is held every advance is dropped, not queued.
#[derive(Debug, Clone)]
pub struct PaginationState {
    current_index: usize,
    card_count: usize,
    transition_until: Option<Instant>,
}

impl PaginationState {
    #[must_use]
    pub const fn new(card_count: usize) -> Self {
        Self {
            current_index: 0,
            card_count,
            transition_until: None,
        }
    }

    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub const fn card_count(&self) -> usize {
        self.card_count
    }

    #[must_use]
    pub fn is_transitioning(&self, now: Instant) -> bool {
        self.transition_until.is_some_and(|until| now < until)
    }

    /// When the current transition lock ends, if one is held.
    #[must_use]
    pub const fn transition_deadline(&self) -> Option<Instant> {
        self.transition_until
    }

    /// Move one card. Dropped while transitioning and at either end (no
    /// wraparound).
    pub fn advance(&mut self, direction: Direction, now: Instant) -> Option<IndexChange> {
        if self.is_transitioning(now) {
            tracing::debug!(?direction, "Navigation dropped: transition in progress");
            return None;
        }

        let from = self.current_index;
        let to = match direction {
            Direction::Forward => from.checked_add(1).filter(|to| *to < self.card_count)?,
            Direction::Backward => from.checked_sub(1)?,
        };

        self.current_index = to;
        self.transition_until = Some(now + TRANSITION_LOCK);
        tracing::debug!(from, to, ?direction, "Card index changed");

        Some(IndexChange {
            from,
            to,
            direction,
        })
    }

    /// Show `index` directly (initial card, deep link). Not a gesture: the
    /// lock is neither consulted nor taken. Out-of-range targets are clamped.
    pub fn jump_to(&mut self, index: usize) -> Option<IndexChange> {
        let from = self.current_index;
        let to = index.min(self.card_count.saturating_sub(1));
        let direction = match to.cmp(&from) {
            Ordering::Greater => Direction::Forward,
            Ordering::Less => Direction::Backward,
            Ordering::Equal => return None,
        };
        self.current_index = to;
        Some(IndexChange {
            from,
            to,
            direction,
        })
    }

    /// Clear an elapsed transition lock. Returns `true` if one was released.
    pub fn release_if_elapsed(&mut self, now: Instant) -> bool {
        match self.transition_until {
            Some(until) if now >= until => {
                self.transition_until = None;
                true
            }
            _ => false,
        }
    }

    /// Replace the card list length, keeping the index in range.
    pub fn set_card_count(&mut self, card_count: usize) {
        self.card_count = card_count;
        self.current_index = self.current_index.min(card_count.saturating_sub(1));
    }
}
