//! Cursor position and scrolling for `TextInput`.
//!
//! The text buffer is owned by `TextInput`; every method takes it explicitly.

use super::text_wrap::{BORDER_OFFSET, inner_width, row_of, row_spans, wrap_line_count};
use ratatui::layout::Rect;

pub(super) struct CursorState {
    /// Byte offset in the buffer (0..=buffer.len())
    pub pos: usize,
    /// First wrapped line shown (0 when content fits)
    pub scroll_offset: u16,
    /// Width from the last render, used for vertical movement
    pub last_content_width: u16,
}

impl CursorState {
    const DEFAULT_WIDTH: u16 = 80;

    pub fn new() -> Self {
        Self {
            pos: 0,
            scroll_offset: 0,
            last_content_width: Self::DEFAULT_WIDTH,
        }
    }

    pub fn reset(&mut self) {
        self.pos = 0;
        self.scroll_offset = 0;
    }

    /// Move one wrapped line up (`direction < 0`) or down, keeping the column.
    ///
    /// Returns `false` when already on the first or last line.
    pub fn move_vertically(&mut self, buffer: &str, direction: i16, content_width: u16) -> bool {
        let width = inner_width(content_width);
        if width == 0 || buffer.is_empty() {
            return false;
        }

        let spans = row_spans(buffer, width);
        let current = row_of(&spans, self.pos);
        let column = self.pos - spans[current].0;

        let target = if direction < 0 {
            match current.checked_sub(1) {
                Some(row) => row,
                None => return false,
            }
        } else if current + 1 < spans.len() {
            current + 1
        } else {
            return false;
        };

        let (start, end) = spans[target];
        let mut pos = (start + column).min(end);
        while !buffer.is_char_boundary(pos) {
            pos -= 1;
        }
        self.pos = pos;
        true
    }

    /// Wrapped line (0-based) holding the cursor.
    pub fn calculate_line(&self, buffer: &str, content_width: u16) -> u16 {
        let width = inner_width(content_width);
        if width == 0 {
            return 0;
        }
        row_of(&row_spans(buffer, width), self.pos) as u16
    }

    /// Keep the cursor line inside a window of `visible_lines`.
    pub fn update_scroll_offset(&mut self, buffer: &str, content_width: u16, visible_lines: u16) {
        let visible_lines = visible_lines.max(1);
        let total_lines = wrap_line_count(buffer, inner_width(content_width));

        if total_lines <= visible_lines {
            self.scroll_offset = 0;
            return;
        }

        let cursor_line = self.calculate_line(buffer, content_width);
        if cursor_line < self.scroll_offset {
            self.scroll_offset = cursor_line;
        } else if cursor_line >= self.scroll_offset + visible_lines {
            self.scroll_offset = cursor_line + 1 - visible_lines;
        }
    }

    /// Screen (column, row) of the cursor inside `area`.
    pub fn screen_pos(&self, buffer: &str, area: Rect) -> (u16, u16) {
        let width = inner_width(area.width);
        if width == 0 {
            return (area.x + BORDER_OFFSET, area.y + BORDER_OFFSET);
        }

        let spans = row_spans(buffer, width);
        let cursor_line = row_of(&spans, self.pos) as u16;
        let column = buffer[spans[cursor_line as usize].0..self.pos].chars().count() as u16;

        let row = cursor_line.saturating_sub(self.scroll_offset);
        (
            area.x + BORDER_OFFSET + column.min(width),
            area.y + BORDER_OFFSET + row,
        )
    }
}
