//! Text shown on the message row.

use skirmish_rendering::{Key, AIM_KEY, HELP_KEY, QUIT_KEY, RESTART_KEY};
use skirmish_system_session::Notice;

/// Message for a notice raised by the session.
pub(crate) fn notice_text(notice: Notice) -> String {
    match notice {
        Notice::Help => {
            format!("Arrow keys to move, '{AIM_KEY}' followed by arrow key to shoot.")
        }
        Notice::Died => {
            format!("You died. Press '{RESTART_KEY}' to restart or '{QUIT_KEY}' to quit")
        }
        Notice::AwaitingRestart => format!(
            "Unknown key. You died. Press '{RESTART_KEY}' to restart or '{QUIT_KEY}' to quit"
        ),
    }
}

/// Message for a key with no binding.
pub(crate) fn unknown_key_text(key: Key) -> String {
    match key {
        Key::Char(symbol) if !symbol.is_control() => format!(
            "Unknown key '{symbol}'. Press '{QUIT_KEY}' to quit or '{HELP_KEY}' for help"
        ),
        _ => format!("Unknown key. Press '{QUIT_KEY}' to quit or '{HELP_KEY}' for help"),
    }
}
