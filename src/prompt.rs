//! # Prompt
//!
//! The bottom-bar text prompt used for "Save as" and incremental find. Both share the same
//! edit-a-line-of-text mechanics; what differs is what happens on each keystroke and on
//! confirm/cancel, which is why [`Prompt::step`] takes a per-mode callback rather than the two
//! flows duplicating the text-editing logic.

use crate::buffer::Buffer;
use crate::terminal::{Arrow, Key};
use crate::viewport::Viewport;

/// What the prompt loop should do after handling one keystroke.
pub enum PromptOutcome {
    /// Still editing; redraw and keep reading keys.
    Continue,
    /// The user confirmed (Enter) with the given text.
    Confirmed(String),
    /// The user cancelled (Esc).
    Cancelled,
}

/// A single-line text prompt shown on the message bar.
pub struct Prompt {
    pub message: &'static str,
    pub input: String,
}

impl Prompt {
    pub fn new(message: &'static str) -> Self { Self { message, input: String::new() } }

    pub fn status_line(&self) -> String { format!("{}{}", self.message, self.input) }

    /// Handle one keystroke. Editing keys (printable chars, Backspace) are handled here and
    /// never reach the caller; navigation/control keys are left to the caller by returning
    /// [`PromptOutcome::Continue`] after this call, so find's caller can additionally react to
    /// e.g. arrow keys to step between matches.
    pub fn handle_key(&mut self, key: Key) -> PromptOutcome {
        match key {
            Key::Enter => PromptOutcome::Confirmed(std::mem::take(&mut self.input)),
            Key::Escape | Key::Ctrl(b'q') => PromptOutcome::Cancelled,
            Key::Backspace => {
                self.input.pop();
                PromptOutcome::Continue
            }
            Key::Char(c) if c.is_ascii_graphic() || c == b' ' => {
                self.input.push(c as char);
                PromptOutcome::Continue
            }
            _ => PromptOutcome::Continue,
        }
    }
}

/// Incremental-search state: the cursor/scroll position to restore on cancel, and the position
/// of the most recently found match (so the next/previous search starts from there).
pub struct FindState {
    pub saved_cursor: crate::viewport::CursorState,
    pub saved_row_offset: usize,
    pub saved_col_offset: usize,
    pub last_match: Option<(usize, usize)>,
    pub direction: i8,
}

impl FindState {
    pub fn new(viewport: &Viewport) -> Self {
        Self {
            saved_cursor: viewport.cursor,
            saved_row_offset: viewport.row_offset,
            saved_col_offset: viewport.col_offset,
            last_match: None,
            direction: 1,
        }
    }

    pub fn restore(&self, viewport: &mut Viewport) {
        viewport.cursor = self.saved_cursor;
        viewport.row_offset = self.saved_row_offset;
        viewport.col_offset = self.saved_col_offset;
    }
}

/// Search `buffer` for `query`, starting just after `from` (or just before it, if `direction` is
/// negative) and wrapping around the whole buffer. Returns the `(row, col)` of the match start,
/// and paints the match on that row via [`crate::row::Row::set_match`]. Clears any previously
/// painted match first, across every row, so at most one row's match overlay is ever set.
pub fn find(buffer: &mut Buffer, query: &str, from: Option<(usize, usize)>, direction: i8) -> Option<(usize, usize)> {
    for row in &mut buffer.rows {
        row.clear_match();
    }
    if query.is_empty() {
        return None;
    }

    let n = buffer.num_rows();
    if n == 0 {
        return None;
    }
    let (start_row, start_col) = from.unwrap_or((0, 0));

    let mut row_idx = start_row as isize;
    let mut first = true;
    let mut search_from_col = Some(start_col as isize);

    for _ in 0..=n {
        if row_idx < 0 {
            row_idx = n as isize - 1;
        }
        if row_idx as usize >= n {
            row_idx = 0;
        }
        let row = &mut buffer.rows[row_idx as usize];
        let haystack = &row.render;

        let found = if first {
            find_from(haystack, query, search_from_col, direction)
        } else {
            find_from(haystack, query, None, direction)
        };
        first = false;
        search_from_col = None;

        if let Some(col) = found {
            row.set_match(col, query.len());
            return Some((row_idx as usize, col));
        }
        row_idx += direction as isize;
    }
    None
}

/// Find the first (or, for `direction < 0`, last) occurrence of `query` in `haystack`. `from`, if
/// given, restricts the search to start strictly after (forward) or before (backward) that
/// render column, used for stepping to the "next" match on the very row the previous match was
/// on.
fn find_from(haystack: &[u8], query: &str, from: Option<isize>, direction: i8) -> Option<usize> {
    let query = query.as_bytes();
    if query.len() > haystack.len() {
        return None;
    }
    let positions: Vec<usize> = (0..=haystack.len() - query.len())
        .filter(|&i| &haystack[i..i + query.len()] == query)
        .collect();

    match (direction >= 0, from) {
        (true, Some(from)) => positions.into_iter().find(|&p| p as isize > from),
        (true, None) => positions.into_iter().next(),
        (false, Some(from)) => positions.into_iter().rev().find(|&p| (p as isize) < from),
        (false, None) => positions.into_iter().next_back(),
    }
}

/// Map an arrow key pressed during find to a search direction, or `None` if it isn't one of the
/// keys find reacts to beyond normal text entry.
pub fn find_direction_for_key(key: Key) -> Option<i8> {
    match key {
        Key::Arrow(Arrow::Down) | Key::Arrow(Arrow::Right) => Some(1),
        Key::Arrow(Arrow::Up) | Key::Arrow(Arrow::Left) => Some(-1),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Buffer;

    fn buffer_with_rows(rows: &[&[u8]]) -> Buffer {
        let mut buffer = Buffer::new();
        for (i, row) in rows.iter().enumerate() {
            buffer.insert_row(i, row.to_vec());
        }
        buffer
    }

    #[test]
    fn finds_first_match_from_start() {
        let mut buffer = buffer_with_rows(&[b"hello world", b"goodbye"]);
        let found = find(&mut buffer, "world", None, 1);
        assert_eq!(found, Some((0, 6)));
    }

    #[test]
    fn find_wraps_around_to_earlier_rows() {
        let mut buffer = buffer_with_rows(&[b"needle here", b"nothing"]);
        let found = find(&mut buffer, "needle", Some((1, 0)), 1);
        assert_eq!(found, Some((0, 0)));
    }

    #[test]
    fn find_returns_none_for_missing_query() {
        let mut buffer = buffer_with_rows(&[b"abc"]);
        assert_eq!(find(&mut buffer, "xyz", None, 1), None);
    }

    #[test]
    fn backward_search_finds_previous_match_on_same_row() {
        let haystack = b"aXbXc";
        let first = find_from(haystack, "X", None, 1);
        assert_eq!(first, Some(1));
        let second = find_from(haystack, "X", Some(1), 1);
        assert_eq!(second, Some(3));
        let back = find_from(haystack, "X", Some(3), -1);
        assert_eq!(back, Some(1));
    }

    #[test]
    fn prompt_backspace_and_confirm() {
        let mut prompt = Prompt::new("Save as: ");
        prompt.handle_key(Key::Char(b'a'));
        prompt.handle_key(Key::Char(b'b'));
        prompt.handle_key(Key::Backspace);
        prompt.handle_key(Key::Char(b'c'));
        match prompt.handle_key(Key::Enter) {
            PromptOutcome::Confirmed(s) => assert_eq!(s, "ac"),
            _ => panic!("expected Confirmed"),
        }
    }

    #[test]
    fn prompt_escape_cancels() {
        let mut prompt = Prompt::new("Find: ");
        prompt.handle_key(Key::Char(b'x'));
        assert!(matches!(prompt.handle_key(Key::Escape), PromptOutcome::Cancelled));
    }
}
