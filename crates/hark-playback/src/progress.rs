//! Progress timer for synthesized speech.
//!
//! Speech engines report start and end only, so the engine advances the
//! position itself on every tick. The timer is owned by exactly one backend
//! run: it is armed with that run's [`BackendTag`] and a tick only counts
//! while the tag still matches the active session.

use std::time::Duration;

use hark_core::BackendTag;

#[derive(Debug, Clone)]
pub struct ProgressTimer {
    owner: Option<BackendTag>,
    step: f64,
}

impl ProgressTimer {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            owner: None,
            step: interval.as_secs_f64(),
        }
    }

    /// Start counting on behalf of `tag`.
    pub fn arm(&mut self, tag: BackendTag) {
        self.owner = Some(tag);
    }

    pub fn disarm(&mut self) {
        self.owner = None;
    }

    #[must_use]
    pub fn is_armed_for(&self, tag: BackendTag) -> bool {
        self.owner == Some(tag)
    }

    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.owner.is_some()
    }

    /// Seconds added per tick.
    #[must_use]
    pub const fn step_secs(&self) -> f64 {
        self.step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hark_core::SessionId;

    #[test]
    fn armed_only_for_owner() {
        let session = SessionId::next();
        let tag = BackendTag {
            session,
            generation: 1,
        };
        let stale = BackendTag {
            session,
            generation: 0,
        };

        let mut timer = ProgressTimer::new(Duration::from_millis(100));
        assert!(!timer.is_armed());

        timer.arm(tag);
        assert!(timer.is_armed_for(tag));
        assert!(!timer.is_armed_for(stale));

        timer.disarm();
        assert!(!timer.is_armed_for(tag));
    }

    #[test]
    fn step_matches_interval() {
        let timer = ProgressTimer::new(Duration::from_millis(250));
        assert!((timer.step_secs() - 0.25).abs() < f64::EPSILON);
    }
}
