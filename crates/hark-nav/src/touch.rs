//! Vertical swipe tracking.

use crate::MIN_SWIPE_DISTANCE;
use crate::pagination::Direction;

/// One touch sequence, from start to end.
#[derive(Debug, Clone, Default)]
pub struct TouchTracker {
    start_y: Option<f64>,
    last_y: f64,
}

impl TouchTracker {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            start_y: None,
            last_y: 0.0,
        }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.start_y.is_some()
    }

    pub const fn start(&mut self, y: f64) {
        self.start_y = Some(y);
        self.last_y = y;
    }

    /// Record the latest position. Ignored outside a sequence.
    pub const fn update(&mut self, y: f64) {
        if self.start_y.is_some() {
            self.last_y = y;
        }
    }

    /// Finish the sequence and return its travel `start - end`, positive
    /// when the finger moved up.
    pub const fn finish(&mut self) -> Option<f64> {
        match self.start_y.take() {
            Some(start) => Some(start - self.last_y),
            None => None,
        }
    }

    /// Abandon the sequence without evaluating it.
    pub const fn cancel(&mut self) {
        self.start_y = None;
    }
}

/// Swipe direction for a travel distance, or `None` below the threshold.
///
/// Swiping up (positive distance) moves to the next card.
#[must_use]
pub fn swipe_direction(distance: f64) -> Option<Direction> {
    if distance.abs() >= MIN_SWIPE_DISTANCE {
        Direction::from_delta(distance)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_reports_upward_travel_as_positive() {
        let mut touch = TouchTracker::new();
        touch.start(400.0);
        touch.update(350.0);
        touch.update(320.0);
        assert_eq!(touch.finish(), Some(80.0));
        assert!(!touch.is_active());
    }

    #[test]
    fn tap_has_zero_travel() {
        let mut touch = TouchTracker::new();
        touch.start(200.0);
        assert_eq!(touch.finish(), Some(0.0));
    }

    #[test]
    fn update_outside_sequence_is_ignored() {
        let mut touch = TouchTracker::new();
        touch.update(10.0);
        assert_eq!(touch.finish(), None);
    }

    #[test]
    fn threshold_is_inclusive() {
        assert_eq!(swipe_direction(50.0), Some(Direction::Forward));
        assert_eq!(swipe_direction(-50.0), Some(Direction::Backward));
        assert_eq!(swipe_direction(49.9), None);
        assert_eq!(swipe_direction(0.0), None);
    }
}
