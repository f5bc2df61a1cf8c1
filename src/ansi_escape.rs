//! # ANSI escape sequences
//!
//! The small set of in-band escape sequences the terminal driver and the frame compositor need.
//! Kept as plain string/format-string constants rather than a dependency on a terminal-control
//! crate: the editor only ever emits this fixed vocabulary.

/// Clear the entire screen.
pub const CLEAR_SCREEN: &str = "\x1b[2J";
/// Move the cursor to the top-left corner (row 1, column 1).
pub const MOVE_CURSOR_TO_START: &str = "\x1b[H";
/// Erase from the cursor to the end of the current line.
pub const CLEAR_LINE_RIGHT_OF_CURSOR: &str = "\x1b[K";
/// Hide the cursor.
pub const HIDE_CURSOR: &str = "\x1b[?25l";
/// Show the cursor.
pub const SHOW_CURSOR: &str = "\x1b[?25h";
/// Turn on inverse video.
pub const REVERSE_VIDEO: &str = "\x1b[7m";
/// Reset all SGR attributes (inverse video, foreground color) to their defaults.
pub const RESET_FMT: &str = "\x1b[m";
/// Move the cursor far enough down and right that it lands on the bottom-right corner of any
/// real terminal; used as the first half of the cursor-position window-size fallback.
pub const MOVE_CURSOR_TO_BOTTOM_RIGHT: &str = "\x1b[999C\x1b[999B";
/// Ask the terminal to report the cursor position; the reply is `ESC [ rows ; cols R`.
pub const REQUEST_CURSOR_POSITION: &str = "\x1b[6n";

/// Build the escape sequence that moves the cursor to `row`, `col` (both 1-indexed).
pub fn move_cursor_to(row: usize, col: usize) -> String { format!("\x1b[{row};{col}H") }

/// Build the escape sequence that sets the foreground color to the given SGR code.
pub fn set_fg_color(sgr: u8) -> String { format!("\x1b[{sgr}m") }
