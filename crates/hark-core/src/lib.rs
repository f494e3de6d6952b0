#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

pub mod clock;
pub mod domain;
pub mod error;
pub mod events;
pub mod ports;
pub mod settings;

// Re-export commonly used types for convenience
pub use clock::format_clock;
pub use domain::{
    ContentCard, NarrationMode, NarrationSession, NarrationSource, PlaybackState, Progress,
    SessionId,
};
pub use error::{ContentError, PlaybackError, PlaybackErrorKind};
pub use events::{EventSink, ReaderEvent};
pub use ports::{
    BackendEvent, BackendSignal, BackendTag, ContentSource, MediaElement, MediaEvent,
    PlayRejection, SignalSender, SpeechEvent, SpeechSynthesizer, Utterance, signal_channel,
};
pub use settings::{Settings, SettingsError, SpeechSettings, validate_settings};

// Used only by the integration tests under tests/
#[cfg(test)]
use tokio_test as _;
