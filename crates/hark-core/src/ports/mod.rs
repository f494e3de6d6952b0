//! Port definitions: the seams between the core and platform resources.
//!
//! # Design Rules
//!
//! - The playback engine is the only caller of [`MediaElement`] and
//!   [`SpeechSynthesizer`]. Nothing else may start audio.
//! - Port methods never block on I/O. Anything asynchronous (loading a URL,
//!   resolving a play request, an utterance finishing) is reported later as a
//!   [`BackendSignal`] on the [`SignalSender`] handed to the backend.
//! - Tests substitute these traits with in-memory fakes.

mod content;
mod media;
mod signal;
mod speech;

pub use content::ContentSource;
pub use media::MediaElement;
pub use signal::{
    BackendEvent, BackendSignal, BackendTag, MediaEvent, PlayRejection, SignalSender, SpeechEvent,
    signal_channel,
};
pub use speech::{SpeechSynthesizer, Utterance};
