//! Concrete narration backends.
//!
//! - [`RodioMediaElement`]: streamed audio, decoded and played by `rodio` on
//!   a dedicated media thread.
//! - [`ProcessSpeechSynthesizer`]: on-device synthesis through a local
//!   `espeak-ng`, `espeak` or `say` process.

pub mod speech;
pub mod streamed;

pub use speech::{ProcessSpeechSynthesizer, SpeechCommand};
pub use streamed::RodioMediaElement;
