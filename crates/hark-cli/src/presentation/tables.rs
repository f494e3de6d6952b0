//! Card table for `hark cards`.

use hark_core::{ContentCard, NarrationSource, format_clock};
use hark_playback::SpeechRate;

const TITLE_WIDTH: usize = 44;

/// Truncates a string to a maximum number of characters, adding "..." if
/// needed.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// One printed row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRow {
    pub index: usize,
    pub title: String,
    pub mode: &'static str,
    /// `m:ss` estimate for synthesized speech; `-` when unknown.
    pub duration: String,
}

/// Build table rows. Streamed audio has no length until it is decoded.
pub fn card_rows(cards: &[ContentCard], chars_per_second: f64) -> Vec<CardRow> {
    let rate = SpeechRate::new(chars_per_second, false);
    cards
        .iter()
        .enumerate()
        .map(|(index, card)| {
            let (mode, duration) = match card.narration_source() {
                Some(NarrationSource::StreamedAudio { .. }) => ("audio", "-".to_string()),
                Some(NarrationSource::SynthesizedSpeech { text }) => (
                    "speech",
                    format_clock(rate.estimate_duration(text.chars().count())),
                ),
                None => ("none", "-".to_string()),
            };
            CardRow {
                index,
                title: truncate_string(card.display_title(), TITLE_WIDTH),
                mode,
                duration,
            }
        })
        .collect()
}

pub fn print_card_table(cards: &[ContentCard], chars_per_second: f64) {
    if cards.is_empty() {
        println!("No cards.");
        return;
    }

    println!("{:<4} {:<TITLE_WIDTH$} {:<7} {:>6}", "#", "Title", "Mode", "Length");
    println!("{}", "-".repeat(4 + 1 + TITLE_WIDTH + 1 + 7 + 1 + 6));
    for row in card_rows(cards, chars_per_second) {
        println!(
            "{:<4} {:<TITLE_WIDTH$} {:<7} {:>6}",
            row.index, row.title, row.mode, row.duration
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(title: &str, text: Option<&str>, url: Option<&str>) -> ContentCard {
        ContentCard {
            id: title.to_lowercase(),
            title: title.into(),
            author: None,
            narration_text: text.map(str::to_string),
            narration_audio_url: url.map(str::to_string),
        }
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("héllo wörld", 8), "héllo...");
    }

    #[test]
    fn test_rows_show_mode_and_estimate() {
        let cards = [
            card("Spoken\nsubtitle", Some(&"x".repeat(750)), None),
            card("Recorded", Some("ignored"), Some("https://cdn.example/a.mp3")),
            card("Silent", None, None),
        ];
        let rows = card_rows(&cards, 10.0);

        assert_eq!(rows[0].title, "Spoken");
        assert_eq!(rows[0].mode, "speech");
        assert_eq!(rows[0].duration, "1:15");
        assert_eq!(rows[1].mode, "audio");
        assert_eq!(rows[1].duration, "-");
        assert_eq!(rows[2].mode, "none");
    }
}
