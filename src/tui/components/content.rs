//! # Content Component
//!
//! One page of documents from the selected collection, one compact JSON line
//! per document. Opens the viewer and editor, pages through results, and
//! arms/confirms deletes.

use std::sync::mpsc::Sender;

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, List, ListItem, ListState, Paragraph};
use serde_json::Value;
use unicode_width::UnicodeWidthChar;

use crate::core::dispatch::KeyDispatcher;
use crate::core::focus::ComponentId;
use crate::core::keymap::KeyMap;
use crate::core::registry::BindingError;
use crate::store::Namespace;
use crate::tui::command::{Bindings, UiCommand};
use crate::tui::component::{Component, EventHandler, Movement};
use crate::tui::event::TuiEvent;

pub const ID: ComponentId = ComponentId::from_static("Content");

pub fn register_keys(
    dispatcher: &KeyDispatcher,
    keys: &KeyMap,
    tx: &Sender<UiCommand>,
) -> Result<(), BindingError> {
    let content = &keys.content;
    Bindings::new(ID, tx)
        .bind("focus_next", &keys.root.focus_next, UiCommand::FocusNext)?
        .bind("peek_document", &content.peek_document, UiCommand::PeekDocument)?
        .bind("view_document", &content.view_document, UiCommand::ViewDocument)?
        .bind("edit_document", &content.edit_document, UiCommand::EditDocument)?
        .bind("add_document", &content.add_document, UiCommand::AddDocument)?
        .bind("duplicate_document", &content.duplicate_document, UiCommand::DuplicateDocument)?
        .bind("delete_document", &content.delete_document, UiCommand::DeleteDocument)?
        .bind("refresh", &content.refresh, UiCommand::Refresh)?
        .bind("focus_query", &content.focus_query, UiCommand::FocusQuery)?
        .bind("next_page", &content.next_page, UiCommand::NextPage)?
        .bind("previous_page", &content.previous_page, UiCommand::PreviousPage)?
        .register(dispatcher)
}

/// Persistent state for the document list.
#[derive(Default)]
pub struct ContentState {
    pub selected: usize,
    len: usize,
    /// Row armed by a first delete press
    pending_delete: Option<usize>,
    /// Rows visible in the last render, used for PgUp/PgDn
    page_rows: usize,
    list_state: ListState,
}

impl ContentState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sync with the number of documents on the current page.
    pub fn set_len(&mut self, len: usize) {
        if len != self.len {
            self.pending_delete = None;
        }
        self.len = len;
        self.select(self.selected.min(len.saturating_sub(1)));
    }

    /// Back to the first row, after a new page or collection.
    pub fn reset_selection(&mut self) {
        self.pending_delete = None;
        self.select(0);
    }

    /// First press arms the selected row, a second press on the same row
    /// confirms. Returns `true` when the delete should go ahead.
    pub fn request_delete(&mut self) -> bool {
        if self.len == 0 {
            return false;
        }
        if self.pending_delete == Some(self.selected) {
            self.pending_delete = None;
            true
        } else {
            self.pending_delete = Some(self.selected);
            false
        }
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub fn is_delete_pending(&self) -> bool {
        self.pending_delete.is_some()
    }

    fn select(&mut self, index: usize) {
        self.selected = index;
        self.list_state.select((self.len > 0).then_some(index));
    }
}

impl EventHandler for ContentState {
    /// New selected row.
    type Event = usize;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        let TuiEvent::Key(key) = event else {
            return None;
        };
        let movement = Movement::from_key(key)?;
        let next = movement.apply(self.selected, self.len, self.page_rows)?;
        (next != self.selected).then(|| {
            self.pending_delete = None;
            self.select(next);
            next
        })
    }
}

/// Transient render wrapper for the document list.
pub struct Content<'a> {
    pub state: &'a mut ContentState,
    pub documents: &'a [Value],
    pub namespace: Option<&'a Namespace>,
    /// "1-50 of 120"
    pub page_label: Option<String>,
    pub focused: bool,
}

impl Component for Content<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let border_color = if self.focused { Color::Cyan } else { Color::DarkGray };
        let title = match (self.namespace, &self.page_label) {
            (Some(ns), Some(label)) => format!(" {ns} ({label}) "),
            (Some(ns), None) => format!(" {ns} "),
            (None, _) => " Documents ".to_string(),
        };
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(border_color));

        let placeholder = match (self.namespace, self.documents.is_empty()) {
            (None, _) => Some("Select a collection in the sidebar"),
            (Some(_), true) => Some("No documents"),
            _ => None,
        };
        if let Some(text) = placeholder {
            let empty = Paragraph::new(text)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        self.state.page_rows = area.height.saturating_sub(2) as usize;
        let row_width = area.width.saturating_sub(2) as usize;

        let items: Vec<ListItem> = self
            .documents
            .iter()
            .enumerate()
            .map(|(index, doc)| {
                let line = truncate_to_width(&compact_json(doc), row_width);
                let style = if self.state.pending_delete == Some(index) {
                    Style::default().fg(Color::Red)
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(line)).style(style)
            })
            .collect();

        let highlight = if self.focused {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default().add_modifier(Modifier::UNDERLINED)
        };
        let list = List::new(items).block(block).highlight_style(highlight);
        frame.render_stateful_widget(list, area, &mut self.state.list_state);
    }
}

fn compact_json(doc: &Value) -> String {
    serde_json::to_string(doc).unwrap_or_else(|_| doc.to_string())
}

/// Cut `text` to at most `width` terminal columns, ending in "…" when cut.
fn truncate_to_width(text: &str, width: usize) -> String {
    let total: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}
