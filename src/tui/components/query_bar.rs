//! # QueryBar Component
//!
//! Single-line filter above the document list. Takes a JSON object such as
//! `{"status": "active"}`; applying it refetches from the first page.
//!
//! Applied filters are remembered for the session, newest first, and can be
//! picked again from the history list.

use std::sync::mpsc::Sender;

use ratatui::Frame;
use ratatui::layout::Rect;

use crate::core::dispatch::KeyDispatcher;
use crate::core::focus::ComponentId;
use crate::core::keymap::KeyMap;
use crate::core::registry::BindingError;
use crate::tui::command::{Bindings, UiCommand};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::text_input::{InputEvent, TextInput};
use crate::tui::event::TuiEvent;

pub const ID: ComponentId = ComponentId::from_static("QueryBar");

/// Rows taken by the bar when shown.
pub const HEIGHT: u16 = 3;

/// Filters kept in the history list.
pub const MAX_HISTORY: usize = 20;

pub fn register_keys(
    dispatcher: &KeyDispatcher,
    keys: &KeyMap,
    tx: &Sender<UiCommand>,
) -> Result<(), BindingError> {
    Bindings::new(ID, tx)
        .bind("apply", &keys.query_bar.apply, UiCommand::ApplyFilter)?
        .bind("clear", &keys.query_bar.clear, UiCommand::ClearFilter)?
        .bind("show_history", &keys.query_bar.show_history, UiCommand::ShowHistory)?
        .bind("close", &keys.query_bar.close, UiCommand::CloseQueryBar)?
        .register(dispatcher)
}

pub struct QueryBarState {
    pub input: TextInput,
    pub visible: bool,
    history: Vec<String>,
}

impl Default for QueryBarState {
    fn default() -> Self {
        Self {
            input: TextInput::single_line(" Filter "),
            visible: false,
            history: Vec::new(),
        }
    }
}

impl QueryBarState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the bar, editing the filter currently applied.
    pub fn open(&mut self, current_filter: &str) {
        self.visible = true;
        self.input.set_text(current_filter);
    }

    pub fn close(&mut self) {
        self.visible = false;
    }

    pub fn text(&self) -> &str {
        self.input.text()
    }

    /// Applied filters, newest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Put `filter` at the top of the history. Blank filters are skipped.
    pub fn remember(&mut self, filter: &str) {
        let filter = filter.trim();
        if filter.is_empty() {
            return;
        }
        self.history.retain(|entry| entry != filter);
        self.history.insert(0, filter.to_string());
        self.history.truncate(MAX_HISTORY);
    }
}

impl EventHandler for QueryBarState {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        self.input.handle_event(event)
    }
}

/// Transient render wrapper for the filter bar.
pub struct QueryBar<'a> {
    pub state: &'a mut QueryBarState,
    pub focused: bool,
}

impl Component for QueryBar<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.state.input.focused = self.focused;
        self.state.input.render(frame, area);
    }
}
