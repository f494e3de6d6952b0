#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]

pub mod backend;
pub mod engine;
pub mod gate;
pub mod progress;
pub mod rate;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export key types for convenience
pub use backend::{ProcessSpeechSynthesizer, RodioMediaElement, SpeechCommand};
pub use engine::{EngineConfig, PlaybackEngine};
pub use gate::{AutoplayUnlockGate, UnlockOutcome};
pub use rate::{SpeechRate, char_offset_for};
