//! Raw input forwarded by a UI shell.

use hark_nav::{Direction, WheelInput};

/// One input event, in the order the shell received it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiInput {
    TouchStart {
        y: f64,
        /// The touch began on the playback controls.
        in_controls: bool,
    },
    TouchMove {
        y: f64,
    },
    TouchEnd,
    Wheel(WheelInput),

    /// A tap on the "enable audio" prompt.
    UnlockTap,

    Play,
    Pause,
    Toggle,
    Stop,
    SeekForward,
    SeekBackward,

    /// Keyboard or button navigation.
    Navigate(Direction),
}
