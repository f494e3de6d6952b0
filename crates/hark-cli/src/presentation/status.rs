//! Status lines for the interactive reader.

use hark_core::{ContentCard, PlaybackState, ReaderEvent, format_clock};

/// Turns [`ReaderEvent`]s into printable lines.
///
/// Progress arrives every tick; a line is only produced when the displayed
/// clock changes.
#[derive(Debug)]
pub struct StatusRenderer {
    titles: Vec<String>,
    last_clock: Option<String>,
}

impl StatusRenderer {
    pub fn new(cards: &[ContentCard]) -> Self {
        Self {
            titles: cards.iter().map(|c| c.display_title().to_string()).collect(),
            last_clock: None,
        }
    }

    pub fn render(&mut self, event: &ReaderEvent) -> Option<String> {
        match event {
            ReaderEvent::IndexChanged { index } => {
                self.last_clock = None;
                let title = self.titles.get(*index).map_or("", String::as_str);
                Some(format!("[{}/{}] {title}", index + 1, self.titles.len()))
            }
            ReaderEvent::StateChanged { state, .. } => Some(format!("  {}", state_label(*state))),
            ReaderEvent::Progress { progress, .. } => {
                let clock = format!(
                    "  {} / {}  {:>3.0}%",
                    format_clock(progress.current_time),
                    progress.duration.map_or_else(|| "-:--".to_string(), format_clock),
                    progress.percent
                );
                if self.last_clock.as_ref() == Some(&clock) {
                    return None;
                }
                self.last_clock = Some(clock.clone());
                Some(clock)
            }
            ReaderEvent::UnlockPromptNeeded { .. } => {
                Some("  Audio is locked. Press 'u' to enable narration.".to_string())
            }
            ReaderEvent::PlaybackFailed {
                message,
                recoverable,
                ..
            } => {
                let hint = if *recoverable {
                    " (press 'p' to retry)"
                } else {
                    ""
                };
                Some(format!("  ! {message}{hint}"))
            }
        }
    }
}

const fn state_label(state: PlaybackState) -> &'static str {
    match state {
        PlaybackState::Idle => "ready",
        PlaybackState::Unlocking | PlaybackState::Starting => "starting...",
        PlaybackState::Playing => "playing",
        PlaybackState::Paused => "paused",
        PlaybackState::Stopped => "stopped",
        PlaybackState::Errored => "unavailable",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hark_core::{PlaybackErrorKind, Progress, SessionId};

    fn cards() -> Vec<ContentCard> {
        ["First\nsub", "Second"]
            .iter()
            .enumerate()
            .map(|(i, title)| ContentCard {
                id: i.to_string(),
                title: (*title).to_string(),
                author: None,
                narration_text: None,
                narration_audio_url: None,
            })
            .collect()
    }

    #[test]
    fn index_line_shows_position_and_title() {
        let mut renderer = StatusRenderer::new(&cards());
        assert_eq!(
            renderer.render(&ReaderEvent::IndexChanged { index: 1 }).as_deref(),
            Some("[2/2] Second")
        );
    }

    #[test]
    fn progress_lines_are_deduplicated_by_clock() {
        let mut renderer = StatusRenderer::new(&cards());
        let session = SessionId::next();
        let progress = |t| ReaderEvent::Progress {
            session,
            progress: Progress::new(t, Some(100.0)),
        };

        assert_eq!(
            renderer.render(&progress(1.0)).as_deref(),
            Some("  0:01 / 1:40    1%")
        );
        assert_eq!(renderer.render(&progress(1.2)), None);
        assert!(renderer.render(&progress(2.0)).is_some());
    }

    #[test]
    fn recoverable_failure_offers_retry() {
        let mut renderer = StatusRenderer::new(&cards());
        let line = renderer
            .render(&ReaderEvent::PlaybackFailed {
                session: SessionId::next(),
                kind: PlaybackErrorKind::PermissionDenied,
                recoverable: true,
                message: "blocked".into(),
            })
            .unwrap();
        assert_eq!(line, "  ! blocked (press 'p' to retry)");
    }
}
