#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

use std::time::Duration;

pub mod navigator;
pub mod pagination;
pub mod touch;
pub mod wheel;

pub use navigator::{GestureNavigator, WheelDisposition, WheelInput};
pub use pagination::{Direction, IndexChange, PaginationState};
pub use touch::{TouchTracker, swipe_direction};
pub use wheel::WheelAccumulator;

/// Minimum vertical travel (px) for a touch to count as a swipe.
pub const MIN_SWIPE_DISTANCE: f64 = 50.0;

/// Wheel deltas below this magnitude (without a modifier) are trackpad scroll.
pub const TRACKPAD_DELTA_LIMIT: f64 = 50.0;

/// A gap longer than this between wheel events starts a new gesture.
pub const WHEEL_ACCUMULATION_WINDOW: Duration = Duration::from_millis(300);

/// Silence after the last wheel event before the gesture is evaluated.
pub const WHEEL_QUIET_PERIOD: Duration = Duration::from_millis(150);

/// Accumulated wheel delta needed to move one card.
pub const WHEEL_COMMIT_THRESHOLD: f64 = 30.0;

/// Length of the card transition; navigation is locked meanwhile.
pub const TRANSITION_LOCK: Duration = Duration::from_millis(600);
