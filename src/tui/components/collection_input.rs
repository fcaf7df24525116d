//! # CollectionInput Component
//!
//! Name prompt for a new collection in the selected database. Opened from the
//! sidebar; Enter creates the collection, Esc drops the prompt.

use std::sync::mpsc::Sender;

use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::widgets::Clear;

use crate::core::dispatch::KeyDispatcher;
use crate::core::focus::ComponentId;
use crate::core::keymap::KeyMap;
use crate::core::registry::BindingError;
use crate::store::Namespace;
use crate::tui::command::{Bindings, UiCommand};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::text_input::{InputEvent, TextInput};
use crate::tui::event::TuiEvent;

pub const ID: ComponentId = ComponentId::from_static("CollectionInput");

pub fn register_keys(
    dispatcher: &KeyDispatcher,
    keys: &KeyMap,
    tx: &Sender<UiCommand>,
) -> Result<(), BindingError> {
    Bindings::new(ID, tx)
        .bind("create", &keys.collection_input.create, UiCommand::CreateCollection)?
        .bind("cancel", &keys.collection_input.cancel, UiCommand::CancelCreateCollection)?
        .register(dispatcher)
}

pub struct CollectionInputState {
    pub database: String,
    pub input: TextInput,
}

impl CollectionInputState {
    pub fn new(database: impl Into<String>) -> Self {
        let database = database.into();
        Self {
            input: TextInput::single_line(format!(" New collection in {database} ")),
            database,
        }
    }

    /// Namespace for the typed name, or `None` while it is blank.
    pub fn namespace(&self) -> Option<Namespace> {
        let name = self.input.text().trim();
        (!name.is_empty()).then(|| Namespace::new(&self.database, name))
    }
}

impl EventHandler for CollectionInputState {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        self.input.handle_event(event)
    }
}

pub struct CollectionInput<'a> {
    pub state: &'a mut CollectionInputState,
}

impl Component for CollectionInput<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [row] = Layout::vertical([Constraint::Length(3)])
            .flex(Flex::Center)
            .areas(area);
        let [overlay] = Layout::horizontal([Constraint::Percentage(50)])
            .flex(Flex::Center)
            .areas(row);
        frame.render_widget(Clear, overlay);
        self.state.input.focused = true;
        self.state.input.render(frame, overlay);
    }
}
