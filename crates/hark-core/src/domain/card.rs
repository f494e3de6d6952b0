//! Content cards handed to the reader by the content source.

use serde::{Deserialize, Serialize};

use super::session::NarrationSource;

/// One card in the reader: a newsletter issue or article with optional narration.
///
/// The core does not know how cards were fetched; it only reads the title and
/// the two narration fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentCard {
    /// Stable identifier (used by `ContentSource::card`).
    pub id: String,

    /// Display title. May span several lines; only the first is shown.
    pub title: String,

    /// Author byline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Text to synthesize when no pre-rendered audio exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narration_text: Option<String>,

    /// URL of a pre-rendered narration file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narration_audio_url: Option<String>,
}

impl ContentCard {
    /// First line of the title, trimmed.
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title.lines().next().unwrap_or_default().trim()
    }

    /// Resolve which backend should narrate this card.
    ///
    /// A non-blank audio URL always wins over narration text. Returns `None`
    /// when the card has nothing to narrate.
    #[must_use]
    pub fn narration_source(&self) -> Option<NarrationSource> {
        if let Some(url) = non_blank(self.narration_audio_url.as_deref()) {
            return Some(NarrationSource::StreamedAudio {
                url: url.to_string(),
            });
        }
        non_blank(self.narration_text.as_deref()).map(|text| NarrationSource::SynthesizedSpeech {
            text: text.to_string(),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(text: Option<&str>, url: Option<&str>) -> ContentCard {
        ContentCard {
            id: "1".into(),
            title: "Line one\nLine two".into(),
            author: None,
            narration_text: text.map(str::to_string),
            narration_audio_url: url.map(str::to_string),
        }
    }

    #[test]
    fn display_title_is_first_line() {
        assert_eq!(card(None, None).display_title(), "Line one");
    }

    #[test]
    fn audio_url_takes_priority_over_text() {
        let source = card(Some("hello"), Some("https://cdn/a.mp3")).narration_source();
        assert_eq!(
            source,
            Some(NarrationSource::StreamedAudio {
                url: "https://cdn/a.mp3".into()
            })
        );
    }

    #[test]
    fn blank_url_falls_back_to_text() {
        let source = card(Some("hello"), Some("  ")).narration_source();
        assert_eq!(
            source,
            Some(NarrationSource::SynthesizedSpeech {
                text: "hello".into()
            })
        );
    }

    #[test]
    fn no_narration_yields_none() {
        assert_eq!(card(None, None).narration_source(), None);
        assert_eq!(card(Some(""), None).narration_source(), None);
    }

    #[test]
    fn deserializes_camel_case_fields() {
        let json = r#"{"id":"a","title":"T","narrationAudioUrl":"u"}"#;
        let card: ContentCard = serde_json::from_str(json).unwrap();
        assert_eq!(card.narration_audio_url.as_deref(), Some("u"));
        assert!(card.narration_text.is_none());
    }
}
