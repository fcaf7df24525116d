//! # TextInput Component
//!
//! Editable text field shared by the query bar (single line) and the
//! document editor (multi-line JSON).
//!
//! ## Responsibilities
//!
//! - Capture typed runes and bracketed paste
//! - Editing: backspace, delete, cursor movement, word jumps (Ctrl/Alt + Left/Right)
//! - Enter submits a single-line field and breaks the line in a multi-line one
//! - Scroll internally once content exceeds the visible lines
//!
//! Keys a binding already consumed never get here; `TextInput` only sees what
//! the dispatcher passed through.

mod cursor;
mod text_wrap;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, BorderType, Paragraph};

use crate::core::keys::{Key, Modifiers};
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

use cursor::CursorState;
use text_wrap::{
    VERTICAL_OVERHEAD, inner_width, line_end, line_start, next_char_boundary,
    next_word_boundary, prev_char_boundary, prev_word_boundary, wrap_line_count, wrap_options,
};

/// Spaces inserted by Tab in a multi-line field.
const TAB_WIDTH: usize = 2;

/// High-level events emitted by the TextInput
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Enter in a single-line field
    Submit(String),
    ContentChanged,
    CursorMoved,
}

pub struct TextInput {
    buffer: String,
    cursor: CursorState,
    multiline: bool,
    /// Upper bound on visible content lines
    max_lines: u16,
    /// Prop: block title
    pub title: String,
    /// Prop: draws the cursor and a highlighted border
    pub focused: bool,
}

impl TextInput {
    pub fn single_line(title: impl Into<String>) -> Self {
        Self::new(title, false, 1)
    }

    pub fn multi_line(title: impl Into<String>, max_lines: u16) -> Self {
        Self::new(title, true, max_lines.max(1))
    }

    fn new(title: impl Into<String>, multiline: bool, max_lines: u16) -> Self {
        Self {
            buffer: String::new(),
            cursor: CursorState::new(),
            multiline,
            max_lines,
            title: title.into(),
            focused: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Replace the content, cursor at the end.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
        if !self.multiline {
            self.buffer = self.buffer.replace('\n', " ");
        }
        self.cursor.reset();
        self.cursor.pos = self.buffer.len();
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor.reset();
    }

    /// Height needed for the current content, borders included.
    pub fn calculate_height(&self, content_width: u16) -> u16 {
        let lines = wrap_line_count(&self.buffer, inner_width(content_width));
        lines.min(self.max_lines) + VERTICAL_OVERHEAD
    }

    fn insert_str(&mut self, text: &str) -> Option<InputEvent> {
        if text.is_empty() {
            return None;
        }
        let text = if self.multiline {
            text.to_string()
        } else {
            text.replace(['\n', '\r'], " ")
        };
        self.buffer.insert_str(self.cursor.pos, &text);
        self.cursor.pos += text.len();
        Some(InputEvent::ContentChanged)
    }

    fn move_to(&mut self, pos: usize) -> Option<InputEvent> {
        (pos != self.cursor.pos).then(|| {
            self.cursor.pos = pos;
            InputEvent::CursorMoved
        })
    }

    fn visible_text(&self, content_width: u16, visible_lines: u16) -> String {
        let width = inner_width(content_width);
        if width == 0 {
            return String::new();
        }

        let lines = textwrap::wrap(&self.buffer, wrap_options(width));
        let start = (self.cursor.scroll_offset as usize).min(lines.len());
        let end = (start + visible_lines as usize).min(lines.len());
        lines[start..end].join("\n")
    }
}

impl Component for TextInput {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let visible_lines = area
            .height
            .saturating_sub(VERTICAL_OVERHEAD)
            .clamp(1, self.max_lines);
        self.cursor.last_content_width = area.width;
        self.cursor
            .update_scroll_offset(&self.buffer, area.width, visible_lines);

        let border_color = if self.focused { Color::Cyan } else { Color::DarkGray };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_color))
            .title(self.title.as_str());

        let input = Paragraph::new(self.visible_text(area.width, visible_lines)).block(block);
        frame.render_widget(input, area);

        if self.focused {
            frame.set_cursor_position(self.cursor.screen_pos(&self.buffer, area));
        }
    }
}

impl EventHandler for TextInput {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        let key = match event {
            TuiEvent::Paste(text) => return self.insert_str(text),
            TuiEvent::Key(key) => key,
            TuiEvent::Resize => return None,
        };
        let word_jump =
            key.modifiers.contains(Modifiers::CTRL) || key.modifiers.contains(Modifiers::ALT);

        match key.key {
            Key::Rune => {
                let c = key.rune?;
                let mut utf8 = [0u8; 4];
                self.insert_str(c.encode_utf8(&mut utf8))
            }
            Key::Enter if self.multiline => self.insert_str("\n"),
            Key::Enter => Some(InputEvent::Submit(self.buffer.clone())),
            Key::Tab if self.multiline => self.insert_str(&" ".repeat(TAB_WIDTH)),
            Key::Backspace => {
                if self.cursor.pos == 0 {
                    return None;
                }
                let prev = prev_char_boundary(&self.buffer, self.cursor.pos);
                self.buffer.drain(prev..self.cursor.pos);
                self.cursor.pos = prev;
                Some(InputEvent::ContentChanged)
            }
            Key::Delete => {
                if self.cursor.pos >= self.buffer.len() {
                    return None;
                }
                let next = next_char_boundary(&self.buffer, self.cursor.pos);
                self.buffer.drain(self.cursor.pos..next);
                Some(InputEvent::ContentChanged)
            }
            Key::Left if self.cursor.pos > 0 => {
                let pos = if word_jump {
                    prev_word_boundary(&self.buffer, self.cursor.pos)
                } else {
                    prev_char_boundary(&self.buffer, self.cursor.pos)
                };
                self.move_to(pos)
            }
            Key::Right if self.cursor.pos < self.buffer.len() => {
                let pos = if word_jump {
                    next_word_boundary(&self.buffer, self.cursor.pos)
                } else {
                    next_char_boundary(&self.buffer, self.cursor.pos)
                };
                self.move_to(pos)
            }
            Key::Home => self.move_to(line_start(&self.buffer, self.cursor.pos)),
            Key::End => self.move_to(line_end(&self.buffer, self.cursor.pos)),
            Key::Up if self.multiline => self
                .cursor
                .move_vertically(&self.buffer, -1, self.cursor.last_content_width)
                .then_some(InputEvent::CursorMoved),
            Key::Down if self.multiline => self
                .cursor
                .move_vertically(&self.buffer, 1, self.cursor.last_content_width)
                .then_some(InputEvent::CursorMoved),
            _ => None,
        }
    }
}
