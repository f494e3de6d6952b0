//! Domain types shared by the playback engine, the navigator and the reader.

mod card;
mod playback;
mod session;

pub use card::ContentCard;
pub use playback::{PlaybackState, Progress};
pub use session::{NarrationMode, NarrationSession, NarrationSource, SessionId};
