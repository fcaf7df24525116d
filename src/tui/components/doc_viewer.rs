//! # DocViewer Component
//!
//! Read-only overlay with the pretty-printed selected document, scrollable in
//! both directions. Peeking shows it in a centered box; viewing takes the
//! whole screen.

use std::sync::mpsc::Sender;

use ratatui::Frame;
use ratatui::layout::{Rect, Size};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Clear, Paragraph};
use serde_json::Value;
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};
use unicode_width::UnicodeWidthStr;

use crate::core::dispatch::KeyDispatcher;
use crate::core::focus::ComponentId;
use crate::core::keymap::KeyMap;
use crate::core::keys::Key;
use crate::core::registry::BindingError;
use crate::tui::command::{Bindings, UiCommand};
use crate::tui::component::{Component, EventHandler, Movement};
use crate::tui::components::centered_rect;
use crate::tui::event::TuiEvent;

pub const ID: ComponentId = ComponentId::from_static("DocViewer");

pub fn register_keys(
    dispatcher: &KeyDispatcher,
    keys: &KeyMap,
    tx: &Sender<UiCommand>,
) -> Result<(), BindingError> {
    Bindings::new(ID, tx)
        .bind("close", &keys.viewer.close, UiCommand::CloseViewer)?
        .bind("edit", &keys.viewer.edit, UiCommand::EditViewed)?
        .register(dispatcher)
}

pub struct DocViewerState {
    pub document: Value,
    pub full_screen: bool,
    text: String,
    size: Size,
    scroll_state: ScrollViewState,
}

impl DocViewerState {
    pub fn new(document: Value) -> Self {
        let text = serde_json::to_string_pretty(&document).unwrap_or_else(|_| document.to_string());
        let width = text.lines().map(UnicodeWidthStr::width).max().unwrap_or(0);
        let height = text.lines().count().max(1);
        Self {
            document,
            full_screen: false,
            size: Size::new(
                u16::try_from(width).unwrap_or(u16::MAX),
                u16::try_from(height).unwrap_or(u16::MAX),
            ),
            text,
            scroll_state: ScrollViewState::default(),
        }
    }

    pub fn full_screen(document: Value) -> Self {
        Self {
            full_screen: true,
            ..Self::new(document)
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Vertical scroll position.
    pub fn offset(&self) -> u16 {
        self.scroll_state.offset().y
    }
}

impl EventHandler for DocViewerState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        let TuiEvent::Key(key) = event else {
            return None;
        };
        match key.key {
            Key::Left => self.scroll_state.scroll_left(),
            Key::Right => self.scroll_state.scroll_right(),
            _ => match Movement::from_key(key)? {
                Movement::Up => self.scroll_state.scroll_up(),
                Movement::Down => self.scroll_state.scroll_down(),
                Movement::PageUp => self.scroll_state.scroll_page_up(),
                Movement::PageDown => self.scroll_state.scroll_page_down(),
                Movement::First => self.scroll_state.scroll_to_top(),
                Movement::Last => self.scroll_state.scroll_to_bottom(),
            },
        }
        Some(())
    }
}

/// Transient render wrapper for the viewer overlay.
pub struct DocViewer<'a> {
    pub state: &'a mut DocViewerState,
}

impl Component for DocViewer<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let overlay = if self.state.full_screen {
            area
        } else {
            centered_rect(80, 80, area)
        };
        frame.render_widget(Clear, overlay);

        let block = Block::bordered()
            .title(" Document ")
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(overlay);
        frame.render_widget(block, overlay);

        let mut scroll_view = ScrollView::new(self.state.size)
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Automatic);
        scroll_view.render_widget(
            Paragraph::new(self.state.text.as_str()),
            Rect::new(0, 0, self.state.size.width, self.state.size.height),
        );
        frame.render_stateful_widget(scroll_view, inner, &mut self.state.scroll_state);
    }
}
