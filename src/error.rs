//! # Errors

use std::fmt;

/// Error type.
#[derive(Debug)]
pub enum Error {
    /// Wrapper around `std::io::Error`.
    Io(std::io::Error),
    /// Error returned when the window size obtained through a system call is invalid.
    InvalidWindowSize,
    /// The terminal did not answer a cursor-position request (`CSI 6 n`) with a well-formed
    /// `ESC [ rows ; cols R` reply.
    CursorPosition,
    /// Too many arguments given to the editor. The attribute is the total number of command
    /// line arguments.
    TooManyArguments(usize),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::InvalidWindowSize => write!(f, "could not determine terminal window size"),
            Self::CursorPosition => write!(f, "could not read cursor position from terminal"),
            Self::TooManyArguments(n) => write!(f, "expected at most one argument, got {n}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    /// Convert an IO Error into an editor `Error`.
    fn from(err: std::io::Error) -> Self { Self::Io(err) }
}
