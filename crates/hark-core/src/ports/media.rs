//! Streamed-audio backend port.

use crate::error::PlaybackError;
use crate::ports::signal::{BackendTag, SignalSender};

/// A progressive audio player modelled on a browser media element.
///
/// The engine owns exactly one instance for the life of the process.
/// `play` is a request: its outcome arrives as
/// [`MediaEvent::PlayResolved`](crate::ports::MediaEvent::PlayResolved),
/// possibly before `play` returns.
pub trait MediaElement: Send {
    /// Point the element at `url` and start loading. Any previous source is
    /// released first. Signals for this source carry `tag`.
    fn attach(&mut self, tag: BackendTag, url: &str, signals: SignalSender)
    -> Result<(), PlaybackError>;

    /// Retag signals without reloading (the engine bumps generations on restarts).
    fn retag(&mut self, tag: BackendTag);

    /// Request playback from the current position.
    fn play(&mut self);

    fn pause(&mut self);

    /// Jump to an absolute position in seconds.
    fn seek_to(&mut self, seconds: f64);

    /// Current position in seconds.
    fn current_time(&self) -> f64;

    /// Duration in seconds, `None` until metadata has loaded.
    fn duration(&self) -> Option<f64>;

    /// Pause and drop the source entirely.
    fn detach(&mut self);

    /// Whether the element is producing audio right now.
    fn is_active(&self) -> bool;
}
