//! Cards loaded from a JSON file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;

use hark_core::{ContentCard, ContentError, ContentSource};

/// Accepted layouts of a content file.
#[derive(Deserialize)]
#[serde(untagged)]
enum CardFile {
    List(Vec<ContentCard>),
    Wrapped { cards: Vec<ContentCard> },
}

impl CardFile {
    fn into_cards(self) -> Vec<ContentCard> {
        match self {
            Self::List(cards) | Self::Wrapped { cards } => cards,
        }
    }
}

/// [`ContentSource`] reading a JSON file on every call.
#[derive(Debug, Clone)]
pub struct JsonContentSource {
    path: PathBuf,
}

impl JsonContentSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse cards from JSON text.
    pub fn parse(json: &str) -> Result<Vec<ContentCard>, ContentError> {
        let file: CardFile = serde_json::from_str(json)?;
        Ok(file.into_cards())
    }
}

#[async_trait]
impl ContentSource for JsonContentSource {
    async fn list_cards(&self) -> Result<Vec<ContentCard>, ContentError> {
        let json = tokio::fs::read_to_string(&self.path).await?;
        let cards = Self::parse(&json)?;
        tracing::debug!(path = %self.path.display(), count = cards.len(), "Loaded content cards");
        Ok(cards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_bare_array() {
        let cards = JsonContentSource::parse(
            r#"[{"id":"a","title":"A","narrationText":"hello"}]"#,
        )
        .unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].narration_text.as_deref(), Some("hello"));
    }

    #[test]
    fn parses_wrapped_object() {
        let cards = JsonContentSource::parse(
            r#"{"cards":[{"id":"a","title":"A"},{"id":"b","title":"B","narrationAudioUrl":"x.mp3"}]}"#,
        )
        .unwrap();
        assert_eq!(cards[1].narration_audio_url.as_deref(), Some("x.mp3"));
    }

    #[test]
    fn rejects_garbage() {
        let err = JsonContentSource::parse(r#"{"items":[]}"#).unwrap_err();
        assert!(matches!(err, ContentError::Parse(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn reads_file_and_looks_up_by_id() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id":"one","title":"One"}},{{"id":"two","title":"Two"}}]"#
        )
        .unwrap();

        let source = JsonContentSource::new(file.path());
        assert_eq!(source.list_cards().await.unwrap().len(), 2);
        assert_eq!(source.card("two").await.unwrap().title, "Two");
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonContentSource::new(dir.path().join("nope.json"));
        let err = source.list_cards().await.unwrap_err();
        assert!(matches!(err, ContentError::Io(_)), "got {err:?}");
    }
}
