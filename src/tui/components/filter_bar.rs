//! # FilterBar Component
//!
//! Single-line input above the database tree. Enter narrows the tree to the
//! typed text; Esc closes the bar and leaves the tree as it was.

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

pub const ID: ComponentId = ComponentId::from_static("FilterBar");

/// Rows taken by the bar when shown.
pub const HEIGHT: u16 = 3;

pub fn register_keys(
    dispatcher: &KeyDispatcher,
    keys: &KeyMap,
    tx: &Sender<UiCommand>,
) -> Result<(), BindingError> {
    Bindings::new(ID, tx)
        .bind("apply", &keys.filter_bar.apply, UiCommand::ApplySidebarFilter)?
        .bind("close", &keys.filter_bar.close, UiCommand::CloseSidebarFilter)?
        .register(dispatcher)
}

pub struct FilterBarState {
    pub input: TextInput,
    pub visible: bool,
}

impl Default for FilterBarState {
    fn default() -> Self {
        Self {
            input: TextInput::single_line(" Filter "),
            visible: false,
        }
    }
}

impl FilterBarState {
    pub fn new() -> Self {
        Self::default()
    }

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
}

impl EventHandler for FilterBarState {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        self.input.handle_event(event)
    }
}

pub struct FilterBar<'a> {
    pub state: &'a mut FilterBarState,
    pub focused: bool,
}

impl Component for FilterBar<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.state.input.focused = self.focused;
        self.state.input.render(frame, area);
    }
}
