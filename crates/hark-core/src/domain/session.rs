//! Narration sessions: one playable unit per active card.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use super::card::ContentCard;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a narration session.
///
/// Ids are allocated monotonically and never reused, so a backend callback
/// carrying an old id can always be told apart from the active session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(u64);

impl SessionId {
    /// Allocate the next id.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value (for logs and wire shapes).
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Which backend narrates a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NarrationMode {
    /// A pre-rendered audio file played progressively.
    StreamedAudio,
    /// On-device speech synthesis over the narration text.
    SynthesizedSpeech,
}

/// The narration payload, resolved once when the session is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "mode")]
pub enum NarrationSource {
    StreamedAudio { url: String },
    SynthesizedSpeech { text: String },
}

impl NarrationSource {
    #[must_use]
    pub const fn mode(&self) -> NarrationMode {
        match self {
            Self::StreamedAudio { .. } => NarrationMode::StreamedAudio,
            Self::SynthesizedSpeech { .. } => NarrationMode::SynthesizedSpeech,
        }
    }
}

/// One playable unit: title plus an immutable narration source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrationSession {
    id: SessionId,
    title: String,
    source: NarrationSource,
}

impl NarrationSession {
    /// Create a session with a fresh id. Only the first line of `title` is kept.
    #[must_use]
    pub fn new(title: &str, source: NarrationSource) -> Self {
        Self {
            id: SessionId::next(),
            title: title.lines().next().unwrap_or_default().trim().to_string(),
            source,
        }
    }

    /// Build a session for a card, or `None` if the card has no narration.
    #[must_use]
    pub fn from_card(card: &ContentCard) -> Option<Self> {
        card.narration_source()
            .map(|source| Self::new(card.display_title(), source))
    }

    /// A new session over the same title and source, with a new id.
    ///
    /// Used to play a stopped session again: stopped sessions are terminal.
    #[must_use]
    pub fn renewed(&self) -> Self {
        Self {
            id: SessionId::next(),
            title: self.title.clone(),
            source: self.source.clone(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub const fn source(&self) -> &NarrationSource {
        &self.source
    }

    #[must_use]
    pub const fn mode(&self) -> NarrationMode {
        self.source.mode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_increasing() {
        let a = SessionId::next();
        let b = SessionId::next();
        assert!(b > a);
    }

    #[test]
    fn title_keeps_first_line() {
        let session = NarrationSession::new(
            "Headline\nsubtitle",
            NarrationSource::SynthesizedSpeech { text: "x".into() },
        );
        assert_eq!(session.title(), "Headline");
        assert_eq!(session.mode(), NarrationMode::SynthesizedSpeech);
    }

    #[test]
    fn renewed_session_gets_new_id_same_source() {
        let session = NarrationSession::new(
            "T",
            NarrationSource::StreamedAudio { url: "u".into() },
        );
        let renewed = session.renewed();
        assert_ne!(session.id(), renewed.id());
        assert_eq!(session.source(), renewed.source());
    }
}
