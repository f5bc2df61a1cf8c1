//! # Controller
//!
//! Ties the buffer, viewport, and terminal together: the frame compositor that turns their state
//! into one escape-sequence-laden byte string per refresh, and the keypress dispatch table that
//! drives the whole editor's main loop.

use std::path::PathBuf;
use std::time::Instant;

use crate::ansi_escape::{
    move_cursor_to, CLEAR_LINE_RIGHT_OF_CURSOR, HIDE_CURSOR, MOVE_CURSOR_TO_START, REVERSE_VIDEO,
    RESET_FMT, SHOW_CURSOR,
};
use crate::append_buffer::AppendBuffer;
use crate::buffer::Buffer;
use crate::config::Config;
use crate::error::Error;
use crate::prompt::{find, find_direction_for_key, FindState, Prompt, PromptOutcome};
use crate::terminal::{self, Arrow, Key, RawMode};
use crate::viewport::Viewport;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A message shown on the bottom status line, with the instant after which it should no longer
/// be drawn.
struct StatusMessage {
    text: String,
    expires_at: Instant,
}

/// What the main loop should do after one iteration.
enum Flow {
    Continue,
    Quit,
}

pub struct Controller {
    buffer: Buffer,
    viewport: Viewport,
    config: Config,
    status: Option<StatusMessage>,
    quit_times_remaining: usize,
    _raw_mode: RawMode,
}

impl Controller {
    /// Enable raw mode, probe the window size, and open `path` (or start with an empty unnamed
    /// buffer if `path` is `None`). Reserves the bottom two screen rows for the status bar and
    /// message bar, matching the classic kilo layout.
    pub fn new(path: Option<PathBuf>) -> Result<Self, Error> {
        let raw_mode = RawMode::enable()?;
        let (rows, cols) = terminal::get_window_size()?;
        if rows < 3 || cols == 0 {
            return Err(Error::InvalidWindowSize);
        }
        let config = Config::default();
        let buffer = match path {
            Some(path) if path.exists() => Buffer::load_with_config(&path, config)?,
            Some(path) => {
                let mut buffer = Buffer::with_config(config);
                buffer.set_filename(path);
                buffer
            }
            None => Buffer::with_config(config),
        };
        let viewport = Viewport::new(rows - 2, cols);
        Ok(Self {
            buffer,
            viewport,
            quit_times_remaining: config.quit_times,
            config,
            status: None,
            _raw_mode: raw_mode,
        })
    }

    fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage { text: text.into(), expires_at: Instant::now() + self.config.message_dur });
    }

    /// Run the editor until the user quits. The entry point called by `main`.
    pub fn run(&mut self) -> Result<(), Error> {
        self.set_status("HELP: Ctrl-S = save | Ctrl-Q = quit | Ctrl-F = find");
        loop {
            self.refresh_screen()?;
            match self.process_keypress()? {
                Flow::Continue => {}
                Flow::Quit => break,
            }
        }
        self.refresh_screen_for_exit()
    }

    fn refresh_screen_for_exit(&self) -> Result<(), Error> {
        let mut buf = AppendBuffer::new();
        buf.append(CLEAR_LINE_RIGHT_OF_CURSOR);
        buf.append(MOVE_CURSOR_TO_START);
        terminal::print_and_flush(buf.as_bytes())
    }

    fn process_keypress(&mut self) -> Result<Flow, Error> {
        let key = terminal::read_key()?;
        match key {
            Key::Ctrl(b'q') => {
                if self.buffer.dirty > 0 && self.quit_times_remaining > 0 {
                    let remaining = self.quit_times_remaining;
                    self.set_status(format!(
                        "WARNING!!! File has unsaved changes. Press Ctrl-Q {remaining} more time(s) to quit."
                    ));
                    self.quit_times_remaining -= 1;
                    return Ok(Flow::Continue);
                }
                return Ok(Flow::Quit);
            }
            Key::Ctrl(b's') => self.save()?,
            Key::Ctrl(b'f') => self.find_interactive()?,
            Key::Enter => {
                self.buffer.insert_newline(self.viewport.cursor.cy, self.viewport.cursor.cx);
                self.viewport.cursor.cy += 1;
                self.viewport.cursor.cx = 0;
            }
            Key::Backspace => self.delete_char(),
            Key::Delete => {
                self.viewport.move_right(&self.buffer);
                self.delete_char();
            }
            Key::Arrow(arrow) => self.move_cursor(arrow),
            Key::PageUp => {
                self.viewport.page_up();
                self.viewport.clamp_x(&self.buffer);
            }
            Key::PageDown => {
                self.viewport.page_down(&self.buffer);
                self.viewport.clamp_x(&self.buffer);
            }
            Key::Home => self.viewport.move_to_line_start(),
            Key::End => self.viewport.move_to_line_end(&self.buffer),
            Key::Escape | Key::Ctrl(_) => {}
            Key::Char(c) => self.insert_char(c),
        }
        self.quit_times_remaining = self.config.quit_times;
        Ok(Flow::Continue)
    }

    fn move_cursor(&mut self, arrow: Arrow) {
        match arrow {
            Arrow::Left => self.viewport.move_left(&self.buffer),
            Arrow::Right => self.viewport.move_right(&self.buffer),
            Arrow::Up => self.viewport.move_up(),
            Arrow::Down => self.viewport.move_down(&self.buffer),
        }
        self.viewport.clamp_x(&self.buffer);
    }

    fn insert_char(&mut self, c: u8) {
        self.buffer.insert_char(self.viewport.cursor.cy, self.viewport.cursor.cx, c);
        self.viewport.cursor.cx += 1;
    }

    fn delete_char(&mut self) {
        if self.viewport.cursor.cy == 0 && self.viewport.cursor.cx == 0 {
            return;
        }
        let (new_row, new_col) =
            self.buffer.delete_char_before(self.viewport.cursor.cy, self.viewport.cursor.cx);
        self.viewport.cursor.cy = new_row;
        self.viewport.cursor.cx = new_col;
    }

    fn save(&mut self) -> Result<(), Error> {
        if self.buffer.filename.is_none() {
            let mut prompt = Prompt::new("Save as: ");
            loop {
                self.refresh_screen_with_prompt(&prompt)?;
                let key = terminal::read_key()?;
                match prompt.handle_key(key) {
                    PromptOutcome::Continue => {}
                    PromptOutcome::Cancelled => {
                        self.set_status("Save aborted");
                        return Ok(());
                    }
                    PromptOutcome::Confirmed(name) => {
                        if name.is_empty() {
                            self.set_status("Save aborted");
                            return Ok(());
                        }
                        self.buffer.set_filename(PathBuf::from(name));
                        break;
                    }
                }
            }
        }
        match self.buffer.save() {
            Ok(n) => self.set_status(format!("{n} bytes written to disk")),
            Err(err) => self.set_status(format!("Can't save! I/O error: {err}")),
        }
        Ok(())
    }

    fn find_interactive(&mut self) -> Result<(), Error> {
        let mut state = FindState::new(&self.viewport);
        let mut prompt = Prompt::new("Search (Use ESC/Arrows/Enter): ");
        loop {
            self.refresh_screen_with_prompt(&prompt)?;
            let key = terminal::read_key()?;
            if let Some(direction) = find_direction_for_key(key) {
                state.direction = direction;
                self.step_find(&mut state, &prompt.input, direction);
                continue;
            }
            match prompt.handle_key(key) {
                PromptOutcome::Continue => {
                    // A text edit (as opposed to an arrow-key step) always searches forward from
                    // the current cursor rather than from the last match.
                    state.direction = 1;
                    state.last_match = None;
                    self.step_find(&mut state, &prompt.input, 1);
                }
                PromptOutcome::Cancelled => {
                    state.restore(&mut self.viewport);
                    self.clear_find_overlay();
                    return Ok(());
                }
                PromptOutcome::Confirmed(_) => {
                    self.clear_find_overlay();
                    return Ok(());
                }
            }
        }
    }

    fn step_find(&mut self, state: &mut FindState, query: &str, direction: i8) {
        let from = state.last_match.or_else(|| {
            let render_col = self.buffer.rows.get(self.viewport.cursor.cy)
                .map_or(0, |row| row.cursor_x_to_render_x(self.viewport.cursor.cx));
            Some((self.viewport.cursor.cy, render_col))
        });
        match find(&mut self.buffer, query, from, direction) {
            Some((row, render_col)) => {
                state.last_match = Some((row, render_col));
                self.viewport.cursor.cy = row;
                self.viewport.cursor.cx = self.buffer.rows[row].render_x_to_cursor_x(render_col);
            }
            None => state.last_match = None,
        }
    }

    fn clear_find_overlay(&mut self) {
        for row in &mut self.buffer.rows {
            row.clear_match();
        }
    }

    fn refresh_screen_with_prompt(&mut self, prompt: &Prompt) -> Result<(), Error> {
        self.viewport.scroll(&self.buffer);
        let mut buf = AppendBuffer::new();
        buf.append(HIDE_CURSOR);
        buf.append(MOVE_CURSOR_TO_START);
        self.draw_rows(&mut buf);
        self.draw_status_bar(&mut buf);
        buf.append(CLEAR_LINE_RIGHT_OF_CURSOR);
        buf.append(&prompt.status_line());
        buf.append(&move_cursor_to(self.viewport.screen_rows + 2, 1));
        buf.append(SHOW_CURSOR);
        terminal::print_and_flush(buf.as_bytes())
    }

    fn refresh_screen(&mut self) -> Result<(), Error> {
        self.viewport.scroll(&self.buffer);
        let mut buf = AppendBuffer::new();
        buf.append(HIDE_CURSOR);
        buf.append(MOVE_CURSOR_TO_START);

        self.draw_rows(&mut buf);
        self.draw_status_bar(&mut buf);
        self.draw_message_bar(&mut buf);

        let screen_row = self.viewport.cursor.cy - self.viewport.row_offset + 1;
        let screen_col = self.viewport.cursor.rx - self.viewport.col_offset + 1;
        buf.append(&move_cursor_to(screen_row, screen_col));
        buf.append(SHOW_CURSOR);
        terminal::print_and_flush(buf.as_bytes())
    }

    fn draw_rows(&self, buf: &mut AppendBuffer) {
        for screen_y in 0..self.viewport.screen_rows {
            let file_row = screen_y + self.viewport.row_offset;
            if file_row < self.buffer.num_rows() {
                self.buffer.rows[file_row].draw(self.viewport.col_offset, self.viewport.screen_cols, buf);
            } else if self.buffer.num_rows() == 0 && screen_y == self.viewport.screen_rows / 3 {
                self.draw_welcome(buf);
            } else {
                buf.append_byte(b'~');
            }
            buf.append(CLEAR_LINE_RIGHT_OF_CURSOR);
            buf.append("\r\n");
        }
    }

    fn draw_welcome(&self, buf: &mut AppendBuffer) {
        let message = format!("editor -- version {VERSION}");
        let mut padding = self.viewport.screen_cols.saturating_sub(message.len()) / 2;
        if padding > 0 {
            buf.append_byte(b'~');
            padding -= 1;
        }
        for _ in 0..padding {
            buf.append_byte(b' ');
        }
        let truncated = &message[..message.len().min(self.viewport.screen_cols)];
        buf.append(truncated);
    }

    fn draw_status_bar(&self, buf: &mut AppendBuffer) {
        buf.append(REVERSE_VIDEO);
        let dirty_marker = if self.buffer.dirty > 0 { "(modified)" } else { "" };
        let left = format!(
            "{:.20} - {} lines {}",
            self.buffer.display_filename(),
            self.buffer.num_rows(),
            dirty_marker
        );
        let right = format!("{} | {}/{}", self.buffer.syntax.name, self.viewport.cursor.cy + 1, self.buffer.num_rows());

        let cols = self.viewport.screen_cols;
        let left = &left[..left.len().min(cols)];
        buf.append(left);
        let remaining = cols.saturating_sub(left.len());
        if right.len() < remaining {
            for _ in 0..remaining - right.len() {
                buf.append_byte(b' ');
            }
            buf.append(&right);
        } else {
            for _ in 0..remaining {
                buf.append_byte(b' ');
            }
        }
        buf.append(RESET_FMT);
        buf.append("\r\n");
    }

    fn draw_message_bar(&self, buf: &mut AppendBuffer) {
        buf.append(CLEAR_LINE_RIGHT_OF_CURSOR);
        if let Some(status) = &self.status {
            if Instant::now() < status.expires_at {
                let text = &status.text[..status.text.len().min(self.viewport.screen_cols)];
                buf.append(text);
            }
        }
    }
}
