//! Trackpad scroll accumulation.
//!
//! A two-finger swipe arrives as a burst of small wheel deltas. They are
//! summed while they keep arriving within [`WHEEL_ACCUMULATION_WINDOW`] of
//! each other, and the sum is judged once the burst has been quiet for
//! [`WHEEL_QUIET_PERIOD`].

use std::time::Instant;

use crate::pagination::Direction;
use crate::{WHEEL_ACCUMULATION_WINDOW, WHEEL_COMMIT_THRESHOLD, WHEEL_QUIET_PERIOD};

#[derive(Debug, Clone, Default)]
pub struct WheelAccumulator {
    sum: f64,
    last_event: Option<Instant>,
    commit_at: Option<Instant>,
}

impl WheelAccumulator {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sum: 0.0,
            last_event: None,
            commit_at: None,
        }
    }

    #[must_use]
    pub const fn sum(&self) -> f64 {
        self.sum
    }

    /// When the pending burst will be judged, if one is pending.
    #[must_use]
    pub const fn commit_at(&self) -> Option<Instant> {
        self.commit_at
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.commit_at.is_some()
    }

    /// Add one trackpad delta and push the quiet-period deadline out.
    pub fn push(&mut self, delta_y: f64, now: Instant) {
        let lapsed = self
            .last_event
            .is_none_or(|last| now.saturating_duration_since(last) > WHEEL_ACCUMULATION_WINDOW);
        if lapsed {
            self.sum = delta_y;
        } else {
            self.sum += delta_y;
        }
        self.last_event = Some(now);
        self.commit_at = Some(now + WHEEL_QUIET_PERIOD);
    }

    /// Drop the running sum and any pending judgement.
    pub const fn reset(&mut self) {
        self.sum = 0.0;
        self.commit_at = None;
    }

    /// Judge the burst once its quiet period has passed.
    ///
    /// Returns `None` while still waiting, or when the sum stays within the
    /// threshold. Either way the burst is consumed once due.
    pub fn take_due(&mut self, now: Instant) -> Option<Direction> {
        let due = self.commit_at.is_some_and(|at| now >= at);
        if !due {
            return None;
        }
        let sum = self.sum;
        self.reset();

        if sum > WHEEL_COMMIT_THRESHOLD {
            Some(Direction::Forward)
        } else if sum < -WHEEL_COMMIT_THRESHOLD {
            Some(Direction::Backward)
        } else {
            tracing::trace!(sum, "Wheel burst below threshold");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn burst_sums_within_window() {
        let t0 = Instant::now();
        let mut wheel = WheelAccumulator::new();
        wheel.push(10.0, t0);
        wheel.push(12.0, t0 + ms(40));
        wheel.push(15.0, t0 + ms(80));
        assert!((wheel.sum() - 37.0).abs() < f64::EPSILON);
        assert_eq!(wheel.commit_at(), Some(t0 + ms(80) + WHEEL_QUIET_PERIOD));
    }

    #[test]
    fn lapsed_window_restarts_sum() {
        let t0 = Instant::now();
        let mut wheel = WheelAccumulator::new();
        wheel.push(25.0, t0);
        wheel.push(-8.0, t0 + ms(301));
        assert!((wheel.sum() + 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn judgement_waits_for_quiet_period() {
        let t0 = Instant::now();
        let mut wheel = WheelAccumulator::new();
        wheel.push(40.0, t0);

        assert_eq!(wheel.take_due(t0 + ms(149)), None);
        assert!(wheel.is_pending());
        assert_eq!(wheel.take_due(t0 + ms(150)), Some(Direction::Forward));
        assert!(!wheel.is_pending());
        assert_eq!(wheel.take_due(t0 + ms(400)), None);
    }

    #[test]
    fn threshold_is_exclusive() {
        let t0 = Instant::now();
        let mut wheel = WheelAccumulator::new();
        wheel.push(30.0, t0);
        assert_eq!(wheel.take_due(t0 + ms(200)), None);

        wheel.push(-31.0, t0 + ms(1000));
        assert_eq!(wheel.take_due(t0 + ms(1200)), Some(Direction::Backward));
    }
}
