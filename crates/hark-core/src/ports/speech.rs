//! Speech-synthesis backend port.

use serde::{Deserialize, Serialize};

use crate::error::PlaybackError;
use crate::ports::signal::{BackendTag, SignalSender};

/// One synthesis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Utterance {
    pub text: String,
    /// BCP 47 locale, e.g. `en-US`.
    pub locale: String,
    /// 1.0 is the engine's natural rate.
    pub rate: f32,
    /// 1.0 is the engine's natural pitch.
    pub pitch: f32,
    /// 0.0–1.0.
    pub volume: f32,
}

/// On-device speech synthesis with a single-utterance queue.
///
/// There is no native seek and no progress reporting; the engine estimates
/// both. `speak` replaces whatever is queued.
pub trait SpeechSynthesizer: Send {
    /// Begin speaking. `Started`, `Ended` and `Error` arrive tagged with `tag`.
    fn speak(
        &mut self,
        tag: BackendTag,
        utterance: Utterance,
        signals: SignalSender,
    ) -> Result<(), PlaybackError>;

    fn pause(&mut self);

    fn resume(&mut self);

    /// Drop the current utterance. No `Ended` is reported for it.
    fn cancel(&mut self);

    /// Whether an utterance is audibly in progress (not paused, not cancelled).
    fn is_speaking(&self) -> bool;
}
