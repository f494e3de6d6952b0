//! Speaking-rate estimate for synthesized speech.
//!
//! Speech engines expose neither a duration nor a seek, so both are derived
//! from a single chars-per-second figure: duration is `chars / rate`, and a
//! time position maps back to a character offset with the same ratio. The
//! figure is a coarse heuristic, not calibrated to voice or language, unless
//! calibration is enabled.

/// How far back (in chars) a seek offset may snap to reach a word start.
const MAX_WORD_SNAP_CHARS: usize = 24;

/// Shortest utterance (seconds) trusted for calibration.
const MIN_CALIBRATION_SECS: f64 = 2.0;

/// Chars-per-second estimator.
#[derive(Debug, Clone)]
pub struct SpeechRate {
    chars_per_second: f64,
    calibrate: bool,
    calibrated: bool,
}

impl SpeechRate {
    #[must_use]
    pub const fn new(chars_per_second: f64, calibrate: bool) -> Self {
        Self {
            chars_per_second,
            calibrate,
            calibrated: false,
        }
    }

    #[must_use]
    pub const fn chars_per_second(&self) -> f64 {
        self.chars_per_second
    }

    /// Estimated seconds to speak `char_count` characters.
    #[must_use]
    pub fn estimate_duration(&self, char_count: usize) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let chars = char_count as f64;
        chars / self.chars_per_second
    }

    /// Byte offset into `text` at which speech resumes for `at_time`.
    #[must_use]
    pub fn char_offset(&self, text: &str, at_time: f64) -> usize {
        char_offset_for(text, at_time, self.chars_per_second)
    }

    /// Feed an utterance that ran from the first character to the end without
    /// pause or seek. The first such observation replaces the configured rate
    /// when calibration is on; later sessions use it.
    pub fn observe(&mut self, char_count: usize, spoken_secs: f64) {
        if !self.calibrate || self.calibrated || char_count == 0 {
            return;
        }
        if !spoken_secs.is_finite() || spoken_secs < MIN_CALIBRATION_SECS {
            return;
        }

        #[allow(clippy::cast_precision_loss)]
        let observed = char_count as f64 / spoken_secs;
        tracing::info!(
            configured = self.chars_per_second,
            observed,
            "Calibrated speech rate from completed utterance"
        );
        self.chars_per_second = observed;
        self.calibrated = true;
    }
}

/// Translate a time position into a byte offset of `text`.
///
/// The raw position is `floor(at_time * chars_per_second)` characters,
/// clamped to the text. It then snaps back to the start of the word it falls
/// in (at most [`MAX_WORD_SNAP_CHARS`] back) so synthesis never restarts
/// mid-word. The result is always a `char` boundary.
#[must_use]
pub fn char_offset_for(text: &str, at_time: f64, chars_per_second: f64) -> usize {
    if !at_time.is_finite() || at_time <= 0.0 || chars_per_second <= 0.0 {
        return 0;
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let target_chars = (at_time * chars_per_second).floor() as usize;

    let Some((byte_idx, _)) = text.char_indices().nth(target_chars) else {
        return text.len();
    };

    let head = &text[..byte_idx];
    head.char_indices()
        .rev()
        .take(MAX_WORD_SNAP_CHARS)
        .find(|(_, c)| c.is_whitespace())
        .map_or(byte_idx, |(ws_idx, ws)| ws_idx + ws.len_utf8())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_is_chars_over_rate() {
        let rate = SpeechRate::new(10.0, false);
        assert!((rate.estimate_duration(200) - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn offset_without_spaces_is_raw() {
        let text = "A".repeat(200);
        assert_eq!(char_offset_for(&text, 5.0, 10.0), 50);
        assert_eq!(char_offset_for(&text, 0.0, 10.0), 0);
    }

    #[test]
    fn offset_past_end_clamps_to_len() {
        assert_eq!(char_offset_for("short", 100.0, 10.0), 5);
    }

    #[test]
    fn offset_snaps_to_word_start() {
        let text = "hello wonderful world";
        // 1.0s * 10 cps = char 10, inside "wonderful" which starts at 6.
        assert_eq!(char_offset_for(text, 1.0, 10.0), 6);
        assert_eq!(&text[char_offset_for(text, 1.0, 10.0)..], "wonderful world");
    }

    #[test]
    fn offset_respects_multibyte_chars() {
        let text = "ééééé";
        let offset = char_offset_for(text, 0.2, 10.0);
        assert!(text.is_char_boundary(offset));
        assert_eq!(offset, 4);
    }

    #[test]
    fn calibration_applies_once_when_enabled() {
        let mut rate = SpeechRate::new(10.0, true);
        rate.observe(300, 20.0);
        assert!((rate.chars_per_second() - 15.0).abs() < f64::EPSILON);

        rate.observe(300, 10.0);
        assert!((rate.chars_per_second() - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn calibration_disabled_keeps_rate() {
        let mut rate = SpeechRate::new(10.0, false);
        rate.observe(300, 20.0);
        assert!((rate.chars_per_second() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn short_utterances_do_not_calibrate() {
        let mut rate = SpeechRate::new(10.0, true);
        rate.observe(10, 0.5);
        assert!((rate.chars_per_second() - 10.0).abs() < f64::EPSILON);
    }
}
