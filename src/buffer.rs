//! # Buffer
//!
//! The in-memory rows of the file being edited, plus the bookkeeping that spans rows: the dirty
//! counter, the filename, and the syntax definition selected for it. Every mutation that touches
//! `chars` goes through a `Buffer` method so that the affected rows (and any rows after them,
//! for multi-line comment state) are always re-highlighted before the next draw.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::Error;
use crate::row::Row;
use crate::syntax::SyntaxConf;

pub struct Buffer {
    pub rows: Vec<Row>,
    pub filename: Option<PathBuf>,
    pub syntax: SyntaxConf,
    /// Incremented on every edit, reset to 0 on save. The spec calls for a counter rather than a
    /// boolean, so that multiple pending edits aren't conflated with "no edits" by the same
    /// comparison that distinguishes "dirty" from "clean".
    pub dirty: usize,
    /// The tab stop (and other tunables) this buffer was handed by its owner. Kept rather than
    /// reconstructed, so every component agrees on one `Config` instance.
    config: Config,
}

impl Buffer {
    pub fn new() -> Self { Self::with_config(Config::default()) }

    pub fn with_config(config: Config) -> Self {
        Self { rows: Vec::new(), filename: None, syntax: SyntaxConf::default(), dirty: 0, config }
    }

    /// Load `path` into a fresh buffer, selecting a syntax definition from its filename.
    pub fn load(path: &Path) -> Result<Self, Error> { Self::load_with_config(path, Config::default()) }

    /// Load `path` into a fresh buffer using `config`'s tunables (tab stop, in particular, which
    /// governs how the loaded rows are first rendered).
    pub fn load_with_config(path: &Path, config: Config) -> Result<Self, Error> {
        let contents = fs::read(path)?;
        let syntax = SyntaxConf::select(&path.to_string_lossy());
        let mut buffer =
            Self { rows: Vec::new(), filename: Some(path.to_path_buf()), syntax, dirty: 0, config };

        if contents.is_empty() {
            return Ok(buffer);
        }
        for line in split_lines(&contents) {
            buffer.rows.push(Row::new(line.to_vec(), buffer.rows.len()));
        }
        buffer.recompute_from(0);
        Ok(buffer)
    }

    /// Write the buffer's rows back to `filename`, joined with `\n`. Returns the number of bytes
    /// written. Fails with [`Error::Io`] if no filename is set; callers prompt for one first
    /// (the Save-As flow) rather than relying on this to fail.
    pub fn save(&mut self) -> Result<usize, Error> {
        let path = self.filename.clone().ok_or_else(|| {
            Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "no filename set"))
        })?;
        let mut out = Vec::new();
        for row in &self.rows {
            out.extend_from_slice(&row.chars);
            out.push(b'\n');
        }
        let mut file = fs::File::create(&path)?;
        file.write_all(&out)?;
        self.dirty = 0;
        Ok(out.len())
    }

    pub fn set_filename(&mut self, path: PathBuf) {
        self.syntax = SyntaxConf::select(&path.to_string_lossy());
        self.filename = Some(path);
        self.recompute_from(0);
    }

    pub fn display_filename(&self) -> String {
        match &self.filename {
            Some(path) => path.to_string_lossy().into_owned(),
            None => "[No Name]".to_string(),
        }
    }

    pub fn num_rows(&self) -> usize { self.rows.len() }

    /// Re-run the syntax classifier over `rows[from..]`, threading each row's open-comment state
    /// into the next. Stops as soon as a row past `from` keeps its prior `hl_open_comment`, since
    /// nothing past that point can change: each row's classification depends only on its
    /// predecessor.
    pub fn recompute_from(&mut self, from: usize) {
        let mut prev_open = if from == 0 { false } else { self.rows[from - 1].hl_open_comment };
        let syntax = self.syntax;
        let tab_stop = self.config.tab_stop;
        for (i, row) in self.rows.iter_mut().enumerate().skip(from) {
            let was_open = row.hl_open_comment;
            let already_highlighted = !row.chars.is_empty() && !row.render.is_empty();
            prev_open = row.update(&syntax, prev_open, tab_stop);
            if i > from && already_highlighted && was_open == prev_open {
                break;
            }
        }
    }

    pub fn insert_row(&mut self, at: usize, chars: Vec<u8>) {
        self.rows.insert(at, Row::new(chars, at));
        self.reindex_from(at);
        self.recompute_from(at);
        self.dirty += 1;
    }

    pub fn delete_row(&mut self, at: usize) {
        self.rows.remove(at);
        self.reindex_from(at);
        self.recompute_from(at.saturating_sub(1));
        self.dirty += 1;
    }

    /// Recompute `idx` for every row from `from` onward, after an insertion or removal has
    /// shifted positions. Recomputing from the affected point rather than incrementing/
    /// decrementing in place avoids off-by-one drift if this is ever called twice for the same
    /// edit.
    fn reindex_from(&mut self, from: usize) {
        for (i, row) in self.rows.iter_mut().enumerate().skip(from) {
            row.idx = i;
        }
    }

    /// Insert byte `c` at `(row, col)`, appending a new empty row first if `row == num_rows()`.
    pub fn insert_char(&mut self, row: usize, col: usize, c: u8) {
        if row == self.num_rows() {
            self.insert_row(row, Vec::new());
        }
        self.rows[row].insert_char(col, c);
        self.recompute_from(row);
        self.dirty += 1;
    }

    /// Split the row at `(row, col)` into two: `chars[..col]` stays, `chars[col..]` becomes a new
    /// row right after it.
    pub fn insert_newline(&mut self, row: usize, col: usize) {
        let tail = self.rows[row].split_off(col);
        self.insert_row(row + 1, tail);
        // insert_row already recomputes from row + 1; the row that was split also needs it.
        self.recompute_from(row);
        self.dirty += 1;
    }

    /// Delete the byte before `(row, col)`: the byte at `col - 1` if `col > 0`, or join this row
    /// onto the end of the previous one if `col == 0`. Does nothing at the very start of the
    /// buffer. Returns the cursor position the caller should move to.
    pub fn delete_char_before(&mut self, row: usize, col: usize) -> (usize, usize) {
        if row >= self.num_rows() {
            return (row, col);
        }
        if col > 0 {
            self.rows[row].delete_char(col - 1);
            self.recompute_from(row);
            self.dirty += 1;
            (row, col - 1)
        } else if row > 0 {
            let new_col = self.rows[row - 1].size();
            let tail = self.rows[row].chars.clone();
            self.rows[row - 1].append_string(&tail);
            self.delete_row(row);
            self.recompute_from(row - 1);
            (row - 1, new_col)
        } else {
            (row, col)
        }
    }
}

impl Default for Buffer {
    fn default() -> Self { Self::new() }
}

/// Split `contents` on `\n`, with any single trailing `\r` stripped from each line (tolerating
/// CRLF input without adopting it as the buffer's own line-ending convention). A final trailing
/// `\n` does not produce an extra empty row, matching the usual convention that a text file's
/// last line ends with a newline rather than containing a blank line after it.
fn split_lines(contents: &[u8]) -> Vec<&[u8]> {
    let trimmed = contents.strip_suffix(b"\n").unwrap_or(contents);
    trimmed
        .split(|&b| b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn load_splits_on_newlines_and_drops_trailing_empty_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"abc\ndef\n").unwrap();
        let buffer = Buffer::load(file.path()).unwrap();
        assert_eq!(buffer.num_rows(), 2);
        assert_eq!(buffer.rows[0].chars, b"abc");
        assert_eq!(buffer.rows[1].chars, b"def");
    }

    #[test]
    fn load_empty_file_has_no_rows() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let buffer = Buffer::load(file.path()).unwrap();
        assert_eq!(buffer.num_rows(), 0);
    }

    #[test]
    fn save_round_trips_content() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"one\ntwo\nthree").unwrap();
        let mut buffer = Buffer::load(file.path()).unwrap();
        buffer.insert_char(0, 3, b'!');
        buffer.save().unwrap();
        let reloaded = Buffer::load(file.path()).unwrap();
        assert_eq!(reloaded.rows[0].chars, b"one!");
        assert_eq!(reloaded.num_rows(), 3);
    }

    #[test]
    fn save_resets_dirty_counter() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"x").unwrap();
        let mut buffer = Buffer::load(file.path()).unwrap();
        buffer.insert_char(0, 1, b'y');
        assert_eq!(buffer.dirty, 1);
        buffer.save().unwrap();
        assert_eq!(buffer.dirty, 0);
    }

    #[test]
    fn insert_newline_splits_row_in_two() {
        let mut buffer = Buffer::new();
        buffer.insert_row(0, b"hello world".to_vec());
        buffer.insert_newline(0, 5);
        assert_eq!(buffer.num_rows(), 2);
        assert_eq!(buffer.rows[0].chars, b"hello");
        assert_eq!(buffer.rows[1].chars, b" world");
    }

    #[test]
    fn delete_char_before_at_column_zero_joins_rows() {
        let mut buffer = Buffer::new();
        buffer.insert_row(0, b"foo".to_vec());
        buffer.insert_row(1, b"bar".to_vec());
        let (row, col) = buffer.delete_char_before(1, 0);
        assert_eq!((row, col), (0, 3));
        assert_eq!(buffer.num_rows(), 1);
        assert_eq!(buffer.rows[0].chars, b"foobar");
    }

    #[test]
    fn reindex_keeps_idx_consistent_after_delete() {
        let mut buffer = Buffer::new();
        buffer.insert_row(0, b"a".to_vec());
        buffer.insert_row(1, b"b".to_vec());
        buffer.insert_row(2, b"c".to_vec());
        buffer.delete_row(0);
        for (i, row) in buffer.rows.iter().enumerate() {
            assert_eq!(row.idx, i);
        }
    }
}
