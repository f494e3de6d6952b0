//! Reader key lines.
//!
//! The terminal has no touch surface, so swipes are emulated as an 80 px
//! touch sequence and wheel events carry the typed delta.

use hark_nav::WheelInput;
use hark_reader::UiInput;

/// Vertical travel of an emulated swipe.
const EMULATED_SWIPE_PX: f64 = 80.0;

/// Where an emulated swipe starts, well clear of the playback controls.
const EMULATED_SWIPE_START_Y: f64 = 400.0;

/// What one typed line asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyCommand {
    /// Inputs to forward to the reader, in order.
    Inputs(Vec<UiInput>),
    Help,
    Quit,
}

/// Parse one line of reader input. `None` for anything unrecognised.
pub fn parse_key_line(line: &str) -> Option<KeyCommand> {
    let line = line.trim_end_matches(['\r', '\n']);
    if !line.is_empty() && line.trim().is_empty() {
        return Some(KeyCommand::Inputs(vec![UiInput::Toggle]));
    }

    let mut parts = line.split_whitespace();
    let key = parts.next()?;
    let command = match key {
        "t" => KeyCommand::Inputs(vec![UiInput::Toggle]),
        "p" => KeyCommand::Inputs(vec![UiInput::Play]),
        "s" => KeyCommand::Inputs(vec![UiInput::Stop]),
        "f" => KeyCommand::Inputs(vec![UiInput::SeekForward]),
        "b" => KeyCommand::Inputs(vec![UiInput::SeekBackward]),
        "u" => KeyCommand::Inputs(vec![UiInput::UnlockTap]),
        "n" => KeyCommand::Inputs(swipe(-EMULATED_SWIPE_PX)),
        "N" => KeyCommand::Inputs(swipe(EMULATED_SWIPE_PX)),
        "w" => {
            let delta_y: f64 = parts.next()?.parse().ok()?;
            if !delta_y.is_finite() {
                return None;
            }
            KeyCommand::Inputs(vec![UiInput::Wheel(WheelInput::new(delta_y))])
        }
        "h" | "?" => KeyCommand::Help,
        "q" => KeyCommand::Quit,
        _ => return None,
    };
    Some(command)
}

/// Touch sequence moving the finger by `dy` (negative is up).
fn swipe(dy: f64) -> Vec<UiInput> {
    let start = EMULATED_SWIPE_START_Y;
    vec![
        UiInput::TouchStart {
            y: start,
            in_controls: false,
        },
        UiInput::TouchMove { y: start + dy / 2.0 },
        UiInput::TouchMove { y: start + dy },
        UiInput::TouchEnd,
    ]
}

pub const HELP: &str = "\
keys: t/space toggle, p play, s stop, f/b seek, n/N next/previous card,
      w <dy> wheel, u enable audio, h help, q quit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_toggles() {
        assert_eq!(
            parse_key_line(" \n"),
            Some(KeyCommand::Inputs(vec![UiInput::Toggle]))
        );
    }

    #[test]
    fn empty_line_is_ignored() {
        assert_eq!(parse_key_line("\n"), None);
    }

    #[test]
    fn swipe_up_ends_above_start() {
        let Some(KeyCommand::Inputs(inputs)) = parse_key_line("n") else {
            panic!("expected inputs");
        };
        assert_eq!(inputs.len(), 4);
        assert_eq!(inputs[2], UiInput::TouchMove { y: 320.0 });
        assert_eq!(inputs[3], UiInput::TouchEnd);
    }

    #[test]
    fn wheel_takes_delta() {
        assert_eq!(
            parse_key_line("w -12.5"),
            Some(KeyCommand::Inputs(vec![UiInput::Wheel(WheelInput::new(-12.5))]))
        );
        assert_eq!(parse_key_line("w"), None);
        assert_eq!(parse_key_line("w fast"), None);
        assert_eq!(parse_key_line("w inf"), None);
    }

    #[test]
    fn control_keys() {
        assert_eq!(parse_key_line("q"), Some(KeyCommand::Quit));
        assert_eq!(parse_key_line("?"), Some(KeyCommand::Help));
        assert_eq!(
            parse_key_line("u"),
            Some(KeyCommand::Inputs(vec![UiInput::UnlockTap]))
        );
        assert_eq!(parse_key_line("x"), None);
    }
}
