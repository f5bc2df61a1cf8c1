//! # Row
//!
//! A single line of the buffer: the authoritative bytes (`chars`), the tab-expanded bytes that
//! are actually drawn (`render`), and the per-render-byte syntax highlight tags (`hl`). All three
//! are kept in lockstep by [`Row::update`], the only place `render`/`hl` are ever written.

use crate::ansi_escape::{set_fg_color, REVERSE_VIDEO, RESET_FMT};
use crate::append_buffer::AppendBuffer;
use crate::syntax::SyntaxConf;

/// A byte that terminates an identifier for syntax-highlighting purposes.
pub fn is_separator(b: u8) -> bool {
    b.is_ascii_whitespace() || b == 0 || b",.()+-/*=~%<>[];".contains(&b)
}

fn is_control_byte(b: u8) -> bool { b < 32 || b == 127 }

/// One highlight class per rendered byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HlClass {
    Normal,
    Comment,
    MlComment,
    Keyword1,
    Keyword2,
    String,
    Number,
    Match,
}

impl HlClass {
    /// The SGR foreground color code used to draw this class.
    pub fn sgr(self) -> u8 {
        match self {
            Self::Comment | Self::MlComment => 36,
            Self::Keyword1 => 33,
            Self::Keyword2 => 32,
            Self::String => 35,
            Self::Number => 31,
            Self::Match => 34,
            Self::Normal => 39,
        }
    }
}

/// Expand tabs in `chars` into spaces, advancing to the next multiple of `tab_stop`.
fn expand_tabs(chars: &[u8], tab_stop: usize) -> Vec<u8> {
    let mut render = Vec::with_capacity(chars.len());
    let mut rx = 0usize;
    for &c in chars {
        if c == b'\t' {
            render.push(b' ');
            rx += 1;
            while rx % tab_stop != 0 {
                render.push(b' ');
                rx += 1;
            }
        } else {
            render.push(c);
            rx += 1;
        }
    }
    render
}

/// Build the `cx2rx`/`rx2cx` lookup tables for `chars` in one pass. `cx2rx[cx]` is the render
/// column of the character at cursor position `cx` (the vector has `chars.len() + 1` entries, so
/// the one-past-the-end cursor position is addressable). `rx2cx[rx]` is the cursor position that
/// owns render column `rx`.
fn build_tables(chars: &[u8], tab_stop: usize) -> (Vec<usize>, Vec<usize>) {
    let mut cx2rx = Vec::with_capacity(chars.len() + 1);
    let mut rx2cx = Vec::new();
    let mut rx = 0usize;
    for (cx, &c) in chars.iter().enumerate() {
        cx2rx.push(rx);
        let width = if c == b'\t' { (tab_stop - 1) - (rx % tab_stop) + 1 } else { 1 };
        for _ in 0..width {
            rx2cx.push(cx);
        }
        rx += width;
    }
    cx2rx.push(rx);
    (cx2rx, rx2cx)
}

/// Classify `render` into per-byte highlight tags, given the syntax definition and whether the
/// *previous* row ended inside an unterminated multi-line comment. Returns the tags and whether
/// *this* row ends inside an unterminated multi-line comment.
fn classify(render: &[u8], syntax: &SyntaxConf, prev_open_comment: bool) -> (Vec<HlClass>, bool) {
    let mut hl = vec![HlClass::Normal; render.len()];
    let scs = syntax.singleline_comment_start.as_bytes();
    let mcs = syntax.multiline_comment_start.as_bytes();
    let mce = syntax.multiline_comment_end.as_bytes();

    let mut i = 0usize;
    let mut prev_sep = true;
    let mut in_string: u8 = 0;
    let mut in_comment = prev_open_comment;

    while i < render.len() {
        let b = render[i];

        // Rule 1: single-line comment, only outside strings/multi-line comments.
        if in_string == 0 && !in_comment && !scs.is_empty() && render[i..].starts_with(scs) {
            for tag in &mut hl[i..] {
                *tag = HlClass::Comment;
            }
            break;
        }

        // Rule 2: inside a multi-line comment.
        if in_comment {
            hl[i] = HlClass::MlComment;
            if !mce.is_empty() && render[i..].starts_with(mce) {
                for tag in &mut hl[i..i + mce.len()] {
                    *tag = HlClass::MlComment;
                }
                in_comment = false;
                prev_sep = true;
                i += mce.len();
            } else {
                i += 1;
            }
            continue;
        }

        // Rule 3: opening a multi-line comment.
        if !mcs.is_empty() && render[i..].starts_with(mcs) {
            for tag in &mut hl[i..i + mcs.len()] {
                *tag = HlClass::MlComment;
            }
            in_comment = true;
            i += mcs.len();
            continue;
        }

        // Rules 4 and 5 are gated on HIGHLIGHT_NUMBERS rather than HIGHLIGHT_STRINGS: a
        // preserved quirk of the source this was ported from (see SPEC_FULL.md §9).
        if syntax.flags.contains(crate::syntax::HlFlags::NUMBERS) {
            if in_string != 0 {
                hl[i] = HlClass::String;
                if b == b'\\' && i + 1 < render.len() {
                    hl[i + 1] = HlClass::String;
                    i += 2;
                    continue;
                }
                if b == in_string {
                    in_string = 0;
                }
                i += 1;
                prev_sep = true;
                continue;
            } else if b == b'"' || b == b'\'' {
                in_string = b;
                hl[i] = HlClass::String;
                i += 1;
                continue;
            }
        }

        // Rule 6: numbers.
        if syntax.flags.contains(crate::syntax::HlFlags::NUMBERS) {
            let prev_was_number = i > 0 && hl[i - 1] == HlClass::Number;
            if (b.is_ascii_digit() && (prev_sep || prev_was_number))
                || (b == b'.' && prev_was_number)
            {
                hl[i] = HlClass::Number;
                prev_sep = false;
                i += 1;
                continue;
            }
        }

        // Rule 7: keywords, only right after a separator.
        if prev_sep {
            if let Some((len, is_type)) = syntax.match_keyword(&render[i..]) {
                let class = if is_type { HlClass::Keyword2 } else { HlClass::Keyword1 };
                for tag in &mut hl[i..i + len] {
                    *tag = class;
                }
                i += len;
                prev_sep = false;
                continue;
            }
        }

        // Rule 8: normal byte.
        hl[i] = HlClass::Normal;
        prev_sep = is_separator(b);
        i += 1;
    }

    (hl, in_comment)
}

/// A single line of the buffer.
pub struct Row {
    /// This row's current position in the buffer.
    pub idx: usize,
    /// The authoritative bytes (no trailing newline).
    pub chars: Vec<u8>,
    /// The tab-expanded bytes that are drawn.
    pub render: Vec<u8>,
    /// One highlight tag per byte of `render`.
    pub hl: Vec<HlClass>,
    /// `cx2rx[cx]` is the render column of cursor position `cx`.
    cx2rx: Vec<usize>,
    /// `rx2cx[rx]` is the cursor position owning render column `rx`.
    rx2cx: Vec<usize>,
    /// Whether this row ends inside an unterminated multi-line comment.
    pub hl_open_comment: bool,
    /// A transient `(start, len)` render-column span painted as [`HlClass::Match`] by an active
    /// incremental search, overriding `hl` at draw time. Cleared whenever the row is re-rendered.
    pub match_segment: Option<(usize, usize)>,
}

impl Row {
    /// Create a new row from raw bytes. `render`/`hl`/the lookup tables are left empty; call
    /// [`Row::update`] before drawing or navigating this row (the owning [`crate::buffer::Buffer`]
    /// always does so immediately after insertion).
    pub fn new(chars: Vec<u8>, idx: usize) -> Self {
        Self {
            idx,
            chars,
            render: Vec::new(),
            hl: Vec::new(),
            cx2rx: vec![0],
            rx2cx: Vec::new(),
            hl_open_comment: false,
            match_segment: None,
        }
    }

    pub fn size(&self) -> usize { self.chars.len() }

    pub fn render_size(&self) -> usize { self.render.len() }

    /// Insert `c` at byte offset `at`.
    pub fn insert_char(&mut self, at: usize, c: u8) { self.chars.insert(at, c); }

    /// Delete the byte at offset `at`.
    pub fn delete_char(&mut self, at: usize) { self.chars.remove(at); }

    /// Append raw bytes to the end of this row's chars (used when joining rows).
    pub fn append_string(&mut self, bytes: &[u8]) { self.chars.extend_from_slice(bytes); }

    /// Split off and return the bytes from `at` to the end, leaving this row holding `chars[..at]`.
    pub fn split_off(&mut self, at: usize) -> Vec<u8> { self.chars.split_off(at) }

    /// Rebuild `render`, `hl`, and the cursor/render lookup tables from `chars`. This is the
    /// Syntax Engine invocation described in §4.C/§4.E: called by the Buffer immediately after
    /// any mutation of `chars`, since the classification also depends on the previous row's
    /// open-comment state, which only the Buffer can supply. Returns the new `hl_open_comment`.
    pub fn update(&mut self, syntax: &SyntaxConf, prev_open_comment: bool, tab_stop: usize) -> bool {
        self.render = expand_tabs(&self.chars, tab_stop);
        let (cx2rx, rx2cx) = build_tables(&self.chars, tab_stop);
        self.cx2rx = cx2rx;
        self.rx2cx = rx2cx;
        let (hl, open_comment) = classify(&self.render, syntax, prev_open_comment);
        self.hl = hl;
        self.hl_open_comment = open_comment;
        self.match_segment = None;
        open_comment
    }

    /// The render column of cursor position `cx` (`cx` may be `self.size()`, the past-the-end
    /// position).
    pub fn cursor_x_to_render_x(&self, cx: usize) -> usize { self.cx2rx[cx] }

    /// The cursor position owning render column `rx`, or `self.size()` if `rx` is past the end
    /// of the row.
    pub fn render_x_to_cursor_x(&self, rx: usize) -> usize {
        self.rx2cx.get(rx).copied().unwrap_or_else(|| self.size())
    }

    /// Paint `render[start..start + len]` as [`HlClass::Match`] for the incremental search
    /// overlay. Cleared automatically the next time this row is [`Row::update`]d, and can also
    /// be cleared early with [`Row::clear_match`].
    pub fn set_match(&mut self, start: usize, len: usize) { self.match_segment = Some((start, len)); }

    pub fn clear_match(&mut self) { self.match_segment = None; }

    /// Draw `render[col_offset..]`, clipped to `screen_cols` columns, into `buf`. Non-printable
    /// bytes (control bytes and DEL) are shown as an inverse-video marker rather than the raw
    /// byte, matching the "operates on single bytes" design (no Unicode grapheme handling): `DEL`
    /// is shown as `?`, any other control byte `b` as `'@' + b` (so `Ctrl-A` shows as `^A`-ish
    /// `A`), following the classic kilo convention.
    pub fn draw(&self, col_offset: usize, screen_cols: usize, buf: &mut AppendBuffer) {
        let available = self.render.len().saturating_sub(col_offset);
        let len = available.min(screen_cols);
        if len == 0 {
            return;
        }
        let mut current_color: Option<u8> = None;
        for i in col_offset..col_offset + len {
            let b = self.render[i];
            let in_match = self.match_segment.is_some_and(|(start, seg_len)| {
                i >= start && i < start + seg_len
            });
            let class = if in_match { HlClass::Match } else { self.hl[i] };

            if is_control_byte(b) {
                if current_color.is_some() {
                    buf.append(RESET_FMT);
                    current_color = None;
                }
                buf.append(REVERSE_VIDEO);
                let symbol = if b == 127 { b'?' } else { b'@' + b };
                buf.append_byte(symbol);
                buf.append(RESET_FMT);
                continue;
            }

            let sgr = class.sgr();
            if current_color != Some(sgr) {
                buf.append(&set_fg_color(sgr));
                current_color = Some(sgr);
            }
            buf.append_byte(b);
        }
        if current_color.is_some() {
            buf.append(RESET_FMT);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::SyntaxConf;

    fn row(chars: &[u8]) -> Row {
        let mut row = Row::new(chars.to_vec(), 0);
        row.update(&SyntaxConf::default(), false, 8);
        row
    }

    #[test]
    fn tab_expansion_advances_to_multiple_of_tab_stop() {
        let r = row(b"\tcd");
        assert_eq!(r.render, b"        cd");
        assert_eq!(r.render_size(), 10);
    }

    #[test]
    fn cursor_render_maps_are_mutual_inverses() {
        let r = row(b"a\tbc");
        for cx in 0..=r.size() {
            let rx = r.cursor_x_to_render_x(cx);
            // render_x_to_cursor_x should map back to a position whose render_x is <= rx and
            // whose render span covers rx (i.e. re-deriving render_x from the mapped cx gives a
            // value <= rx, and the next char's render_x is > rx).
            let back = r.render_x_to_cursor_x(rx);
            assert!(r.cursor_x_to_render_x(back) <= rx);
        }
    }

    #[test]
    fn render_x_to_cursor_x_clamps_past_end() {
        let r = row(b"ab");
        assert_eq!(r.render_x_to_cursor_x(1000), r.size());
    }

    #[test]
    fn single_line_comment_paints_rest_of_row() {
        let c = SyntaxConf::select("a.c");
        let mut r = Row::new(b"int x; // hi".to_vec(), 0);
        r.update(&c, false, 8);
        assert_eq!(r.hl[0], HlClass::Keyword2); // "int"
        let comment_start = r.render.windows(2).position(|w| w == b"//").unwrap();
        assert!(r.hl[comment_start..].iter().all(|h| *h == HlClass::Comment));
    }

    #[test]
    fn multiline_comment_continues_across_rows() {
        let c = SyntaxConf::select("a.c");
        let mut first = Row::new(b"/* multi".to_vec(), 0);
        let open_after_first = first.update(&c, false, 8);
        assert!(open_after_first);
        assert!(first.hl_open_comment);

        let mut second = Row::new(b"still */ code".to_vec(), 1);
        second.update(&c, open_after_first, 8);
        assert!(!second.hl_open_comment);
        let close_at = second.render.windows(2).position(|w| w == b"*/").unwrap();
        assert!(second.hl[..=close_at + 1].iter().all(|h| *h == HlClass::MlComment));
        assert_eq!(second.hl[close_at + 2], HlClass::Normal);
    }

    #[test]
    fn number_highlighting_requires_separator_before() {
        let c = SyntaxConf::select("a.c");
        let mut r = Row::new(b"x1 12".to_vec(), 0);
        r.update(&c, false, 8);
        // "1" inside "x1" is not preceded by a separator: not a number.
        assert_ne!(r.hl[1], HlClass::Number);
        // "12" is preceded by a space: a number.
        assert_eq!(r.hl[3], HlClass::Number);
        assert_eq!(r.hl[4], HlClass::Number);
    }
}
