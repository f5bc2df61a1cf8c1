//! # Terminal
//!
//! Raw-mode control and keyboard decoding. Talks to the TTY through `libc` directly rather than
//! through a terminal-control crate: the only operations needed are `tcgetattr`/`tcsetattr` and
//! `ioctl(TIOCGWINSZ)`, and reaching for an abstraction over a handful of syscalls would hide
//! more than it would save.

use std::io::{self, Read, Write};
use std::mem::MaybeUninit;

use libc::{
    c_int, termios as Termios, winsize, BRKINT, CS8, ECHO, ICANON, ICRNL, IEXTEN, INPCK, ISIG,
    ISTRIP, IXON, OPOST, STDIN_FILENO, STDOUT_FILENO, TCSAFLUSH, TIOCGWINSZ, VMIN, VTIME,
};

use crate::ansi_escape::{MOVE_CURSOR_TO_BOTTOM_RIGHT, REQUEST_CURSOR_POSITION};
use crate::error::Error;

fn cerr(ret: c_int) -> Result<(), Error> {
    if ret == -1 {
        Err(io::Error::last_os_error().into())
    } else {
        Ok(())
    }
}

fn get_termios() -> Result<Termios, Error> {
    let mut termios = MaybeUninit::uninit();
    cerr(unsafe { libc::tcgetattr(STDIN_FILENO, termios.as_mut_ptr()) })?;
    Ok(unsafe { termios.assume_init() })
}

fn set_termios(termios: &Termios) -> Result<(), Error> {
    cerr(unsafe { libc::tcsetattr(STDIN_FILENO, TCSAFLUSH, termios) })
}

/// Puts the terminal into raw mode for as long as it is alive, restoring the original mode on
/// drop (including on panic unwind, so a crash never leaves the user's shell in raw mode).
pub struct RawMode {
    orig_termios: Termios,
}

impl RawMode {
    pub fn enable() -> Result<Self, Error> {
        let orig_termios = get_termios()?;
        let mut raw = orig_termios;
        // SAFETY-relevant-to-behavior-only flags, no `unsafe` needed: these are plain bitflag
        // assignments on a C struct we already own.
        raw.c_iflag &= !(BRKINT | ICRNL | INPCK | ISTRIP | IXON);
        raw.c_oflag &= !OPOST;
        raw.c_cflag |= CS8;
        raw.c_lflag &= !(ECHO | ICANON | IEXTEN | ISIG);
        raw.c_cc[VMIN] = 0;
        raw.c_cc[VTIME] = 1;
        set_termios(&raw)?;
        Ok(Self { orig_termios })
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = set_termios(&self.orig_termios);
    }
}

/// Get the terminal's size in `(rows, cols)`. Tries `ioctl(TIOCGWINSZ)` first; if that returns a
/// degenerate size (some terminals/pty setups report 0x0), falls back to moving the cursor to
/// the bottom-right corner and asking the terminal to report its position.
pub fn get_window_size() -> Result<(usize, usize), Error> {
    let mut ws: winsize = unsafe { std::mem::zeroed() };
    let ok = unsafe { libc::ioctl(STDOUT_FILENO, TIOCGWINSZ, &mut ws) } != -1;
    if ok && ws.ws_col != 0 {
        return Ok((ws.ws_row as usize, ws.ws_col as usize));
    }
    get_window_size_using_cursor()
}

fn get_window_size_using_cursor() -> Result<(usize, usize), Error> {
    let mut stdout = io::stdout();
    stdout.write_all(MOVE_CURSOR_TO_BOTTOM_RIGHT.as_bytes())?;
    stdout.write_all(REQUEST_CURSOR_POSITION.as_bytes())?;
    stdout.flush()?;

    let mut buf = [0u8; 32];
    let mut len = 0;
    let mut byte = [0u8; 1];
    while len < buf.len() {
        if io::stdin().read(&mut byte)? == 0 {
            break;
        }
        if byte[0] == b'R' {
            break;
        }
        buf[len] = byte[0];
        len += 1;
    }

    let reply = std::str::from_utf8(&buf[..len]).map_err(|_| Error::InvalidWindowSize)?;
    let reply = reply.strip_prefix("\x1b[").ok_or(Error::CursorPosition)?;
    let (rows, cols) = reply.split_once(';').ok_or(Error::CursorPosition)?;
    let rows = rows.parse().map_err(|_| Error::CursorPosition)?;
    let cols = cols.parse().map_err(|_| Error::CursorPosition)?;
    Ok((rows, cols))
}

/// A single logical keypress, after escape-sequence decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(u8),
    Ctrl(u8),
    Arrow(Arrow),
    PageUp,
    PageDown,
    Home,
    End,
    Delete,
    Backspace,
    Enter,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrow {
    Up,
    Down,
    Left,
    Right,
}

fn read_byte() -> Result<Option<u8>, Error> {
    let mut byte = [0u8; 1];
    loop {
        return match io::stdin().read(&mut byte) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(byte[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            // A read timeout (VTIME) surfaces as `WouldBlock` on some platforms; treat it the
            // same as "nothing read yet" rather than an error.
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e.into()),
        };
    }
}

/// Block until a full key has been read, decoding CSI/SS3 escape sequences into [`Key`]s.
///
/// The arrow keys are swapped here on purpose: `ESC [ A` (conventionally Up) decodes to
/// [`Arrow::Down`], and `ESC [ B` (conventionally Down) decodes to [`Arrow::Up`]. This mirrors a
/// quirk present in the source this decoder was ported from; see `SPEC_FULL.md` for why it is
/// kept rather than corrected.
pub fn read_key() -> Result<Key, Error> {
    let b = loop {
        if let Some(b) = read_byte()? {
            break b;
        }
    };

    if b != 0x1b {
        return Ok(decode_plain(b));
    }

    // An escape byte with nothing following (within the VTIME read window) is a bare Escape.
    let Some(next) = read_byte()? else { return Ok(Key::Escape) };

    if next == b'[' {
        let Some(c1) = read_byte()? else { return Ok(Key::Escape) };
        if c1.is_ascii_digit() {
            let Some(c2) = read_byte()? else { return Ok(Key::Escape) };
            if c2 == b'~' {
                return Ok(match c1 {
                    b'1' | b'7' => Key::Home,
                    b'3' => Key::Delete,
                    b'4' | b'8' => Key::End,
                    b'5' => Key::PageUp,
                    b'6' => Key::PageDown,
                    _ => Key::Escape,
                });
            }
            return Ok(Key::Escape);
        }
        return Ok(match c1 {
            b'A' => Key::Arrow(Arrow::Down),
            b'B' => Key::Arrow(Arrow::Up),
            b'C' => Key::Arrow(Arrow::Right),
            b'D' => Key::Arrow(Arrow::Left),
            b'H' => Key::Home,
            b'F' => Key::End,
            _ => Key::Escape,
        });
    }

    if next == b'O' {
        let Some(c1) = read_byte()? else { return Ok(Key::Escape) };
        return Ok(match c1 {
            b'H' => Key::Home,
            b'F' => Key::End,
            _ => Key::Escape,
        });
    }

    Ok(Key::Escape)
}

fn decode_plain(b: u8) -> Key {
    match b {
        8 | 127 => Key::Backspace,
        b'\r' => Key::Enter,
        0..=26 => Key::Ctrl(b | 0x60),
        _ => Key::Char(b),
    }
}

/// Write `bytes` to stdout and flush immediately, so a frame lands on the terminal in one write.
pub fn print_and_flush(bytes: &[u8]) -> Result<(), Error> {
    let mut stdout = io::stdout();
    stdout.write_all(bytes)?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_plain_maps_ctrl_codes_to_lowercase_letter() {
        assert_eq!(decode_plain(17), Key::Ctrl(b'q')); // Ctrl-Q is 0x11
        assert_eq!(decode_plain(19), Key::Ctrl(b's')); // Ctrl-S is 0x13
    }

    #[test]
    fn decode_plain_maps_del_and_backspace_to_backspace() {
        assert_eq!(decode_plain(127), Key::Backspace);
        assert_eq!(decode_plain(8), Key::Backspace);
    }

    #[test]
    fn decode_plain_maps_carriage_return_to_enter() {
        assert_eq!(decode_plain(b'\r'), Key::Enter);
    }

    #[test]
    fn decode_plain_passes_through_printable_bytes() {
        assert_eq!(decode_plain(b'x'), Key::Char(b'x'));
    }
}
