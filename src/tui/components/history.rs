//! # History Component
//!
//! List of filters applied this session, newest first. Picking one loads it
//! into the query bar for another look before applying.

use std::sync::mpsc::Sender;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Clear, List, ListItem, ListState};

use crate::core::dispatch::KeyDispatcher;
use crate::core::focus::ComponentId;
use crate::core::keymap::KeyMap;
use crate::core::registry::BindingError;
use crate::tui::command::{Bindings, UiCommand};
use crate::tui::component::{Component, EventHandler, Movement};
use crate::tui::components::centered_rect;
use crate::tui::event::TuiEvent;

pub const ID: ComponentId = ComponentId::from_static("History");

pub fn register_keys(
    dispatcher: &KeyDispatcher,
    keys: &KeyMap,
    tx: &Sender<UiCommand>,
) -> Result<(), BindingError> {
    Bindings::new(ID, tx)
        .bind("select", &keys.history.select, UiCommand::SelectHistory)?
        .bind("close", &keys.history.close, UiCommand::CloseHistory)?
        .register(dispatcher)
}

pub struct HistoryState {
    entries: Vec<String>,
    pub selected: usize,
    list_state: ListState,
}

impl HistoryState {
    pub fn new(entries: Vec<String>) -> Self {
        let mut list_state = ListState::default();
        list_state.select((!entries.is_empty()).then_some(0));
        Self {
            entries,
            selected: 0,
            list_state,
        }
    }

    pub fn selected_entry(&self) -> Option<&str> {
        self.entries.get(self.selected).map(String::as_str)
    }
}

impl EventHandler for HistoryState {
    /// New selected row.
    type Event = usize;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        let TuiEvent::Key(key) = event else {
            return None;
        };
        let next = Movement::from_key(key)?.apply(self.selected, self.entries.len(), 10)?;
        (next != self.selected).then(|| {
            self.selected = next;
            self.list_state.select(Some(next));
            next
        })
    }
}

pub struct History<'a> {
    pub state: &'a mut HistoryState,
}

impl Component for History<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let overlay = centered_rect(60, 50, area);
        frame.render_widget(Clear, overlay);

        let items: Vec<ListItem> = self
            .state
            .entries
            .iter()
            .map(|entry| ListItem::new(entry.as_str()))
            .collect();
        let list = List::new(items)
            .block(
                Block::bordered()
                    .title(" History ")
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        frame.render_stateful_widget(list, overlay, &mut self.state.list_state);
    }
}
