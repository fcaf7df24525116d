//! # Sidebar Component
//!
//! Database tree: each database expands into its collections. Opening a
//! collection selects it and hands focus to the document list.
//!
//! A filter narrows the tree to databases whose name matches, plus databases
//! holding a matching collection (only those collections are listed). Matching
//! is a case-insensitive substring test.
//!
//! Persistent state + transient wrapper:
//! - `SidebarState` lives in `TuiState`
//! - `Sidebar` is created each frame with borrowed state and props

use std::collections::BTreeSet;
use std::sync::mpsc::Sender;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, List, ListItem, ListState, Paragraph};

use crate::core::dispatch::KeyDispatcher;
use crate::core::focus::ComponentId;
use crate::core::keymap::KeyMap;
use crate::core::registry::BindingError;
use crate::store::{DatabaseInfo, Namespace};
use crate::tui::command::{Bindings, UiCommand};
use crate::tui::component::{Component, EventHandler, Movement};
use crate::tui::event::TuiEvent;

pub const ID: ComponentId = ComponentId::from_static("Sidebar");

pub fn register_keys(
    dispatcher: &KeyDispatcher,
    keys: &KeyMap,
    tx: &Sender<UiCommand>,
) -> Result<(), BindingError> {
    Bindings::new(ID, tx)
        .bind("focus_next", &keys.root.focus_next, UiCommand::FocusNext)?
        .bind("open", &keys.sidebar.open, UiCommand::OpenSidebarItem)?
        .bind("filter_bar", &keys.sidebar.filter_bar, UiCommand::FocusSidebarFilter)?
        .bind("expand_all", &keys.sidebar.expand_all, UiCommand::ExpandAll)?
        .bind("collapse_all", &keys.sidebar.collapse_all, UiCommand::CollapseAll)?
        .bind("toggle_expand", &keys.sidebar.toggle_expand, UiCommand::ToggleExpand)?
        .bind("add_collection", &keys.sidebar.add_collection, UiCommand::AddCollection)?
        .bind("delete_collection", &keys.sidebar.delete_collection, UiCommand::DropCollection)?
        .bind("refresh", &keys.sidebar.refresh, UiCommand::ReloadDatabases)?
        .register(dispatcher)
}

/// One visible line of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarRow {
    Database { name: String, expanded: bool },
    Collection(Namespace),
}

/// Persistent state for the database tree.
#[derive(Default)]
pub struct SidebarState {
    databases: Vec<DatabaseInfo>,
    expanded: BTreeSet<String>,
    filter: String,
    rows: Vec<SidebarRow>,
    pub selected: usize,
    /// Collection armed by a first drop press
    pending_drop: Option<Namespace>,
    list_state: ListState,
}

impl SidebarState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn databases(&self) -> &[DatabaseInfo] {
        &self.databases
    }

    pub fn rows(&self) -> &[SidebarRow] {
        &self.rows
    }

    pub fn selected_row(&self) -> Option<&SidebarRow> {
        self.rows.get(self.selected)
    }

    /// The selected database, or the database of the selected collection.
    pub fn selected_database(&self) -> Option<&str> {
        match self.selected_row()? {
            SidebarRow::Database { name, .. } => Some(name),
            SidebarRow::Collection(namespace) => Some(&namespace.database),
        }
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Narrow the tree. Every database left in view starts expanded; an empty
    /// filter shows everything again.
    pub fn set_filter(&mut self, text: &str) {
        self.filter = text.trim().to_string();
        if !self.filter.is_empty() {
            self.expanded = self.databases.iter().map(|db| db.name.clone()).collect();
        }
        self.selected = 0;
        self.rebuild();
    }

    /// Replace the tree, keeping databases that still exist expanded.
    pub fn set_databases(&mut self, databases: Vec<DatabaseInfo>) {
        self.expanded
            .retain(|name| databases.iter().any(|db| &db.name == name));
        self.databases = databases;
        self.rebuild();
    }

    /// Toggle a database, or return the collection under the selection.
    pub fn open(&mut self) -> Option<Namespace> {
        match self.selected_row()?.clone() {
            SidebarRow::Database { name, expanded } => {
                if expanded {
                    self.expanded.remove(&name);
                } else {
                    self.expanded.insert(name);
                }
                self.rebuild();
                None
            }
            SidebarRow::Collection(namespace) => Some(namespace),
        }
    }

    pub fn expand_all(&mut self) {
        let selected = self.selected_row().cloned();
        self.expanded = self.databases.iter().map(|db| db.name.clone()).collect();
        self.rebuild();
        self.reselect(selected);
    }

    /// Expand or collapse the database under the selection. On a collection,
    /// its database collapses and takes the selection.
    pub fn toggle_expand(&mut self) {
        let Some(row) = self.selected_row().cloned() else {
            return;
        };
        let name = match row {
            SidebarRow::Database { name, expanded: false } => {
                self.expanded.insert(name);
                self.rebuild();
                return;
            }
            SidebarRow::Database { name, expanded: true } => name,
            SidebarRow::Collection(namespace) => namespace.database,
        };
        self.expanded.remove(&name);
        self.rebuild();
        self.reselect(Some(SidebarRow::Database { name, expanded: false }));
    }

    /// First press arms the selected collection, a second press on the same
    /// collection confirms. Returns `true` when the drop should go ahead.
    pub fn request_drop(&mut self) -> bool {
        let Some(SidebarRow::Collection(namespace)) = self.selected_row().cloned() else {
            return false;
        };
        if self.pending_drop.as_ref() == Some(&namespace) {
            self.pending_drop = None;
            true
        } else {
            self.pending_drop = Some(namespace);
            false
        }
    }

    pub fn cancel_drop(&mut self) {
        self.pending_drop = None;
    }

    pub fn is_drop_pending(&self) -> bool {
        self.pending_drop.is_some()
    }

    pub fn collapse_all(&mut self) {
        // Selection falls back to the database owning the selected collection
        let selected = self.selected_row().map(|row| match row {
            SidebarRow::Collection(ns) => SidebarRow::Database {
                name: ns.database.clone(),
                expanded: false,
            },
            SidebarRow::Database { name, .. } => SidebarRow::Database {
                name: name.clone(),
                expanded: false,
            },
        });
        self.expanded.clear();
        self.rebuild();
        self.reselect(selected);
    }

    fn reselect(&mut self, row: Option<SidebarRow>) {
        let Some(row) = row else { return };
        let position = self.rows.iter().position(|candidate| match (candidate, &row) {
            (SidebarRow::Database { name: a, .. }, SidebarRow::Database { name: b, .. }) => a == b,
            (SidebarRow::Collection(a), SidebarRow::Collection(b)) => a == b,
            _ => false,
        });
        if let Some(index) = position {
            self.select(index);
        }
    }

    fn rebuild(&mut self) {
        self.rows.clear();
        let needle = self.filter.to_lowercase();
        let matches = |name: &str| name.to_lowercase().contains(&needle);
        for db in &self.databases {
            let whole_db = needle.is_empty() || matches(&db.name);
            let collections: Vec<&String> = db
                .collections
                .iter()
                .filter(|coll| whole_db || matches(coll))
                .collect();
            if !whole_db && collections.is_empty() {
                continue;
            }

            let expanded = self.expanded.contains(&db.name);
            self.rows.push(SidebarRow::Database {
                name: db.name.clone(),
                expanded,
            });
            if expanded {
                self.rows.extend(
                    collections
                        .into_iter()
                        .map(|coll| SidebarRow::Collection(Namespace::new(&db.name, coll))),
                );
            }
        }
        let selected = self.selected.min(self.rows.len().saturating_sub(1));
        self.select(selected);
    }

    fn select(&mut self, index: usize) {
        self.selected = index;
        self.list_state
            .select((!self.rows.is_empty()).then_some(index));
    }
}

impl EventHandler for SidebarState {
    /// New selected row.
    type Event = usize;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        let TuiEvent::Key(key) = event else {
            return None;
        };
        let movement = Movement::from_key(key)?;
        let next = movement.apply(self.selected, self.rows.len(), 10)?;
        (next != self.selected).then(|| {
            self.pending_drop = None;
            self.select(next);
            next
        })
    }
}

/// Transient render wrapper for the database tree.
pub struct Sidebar<'a> {
    pub state: &'a mut SidebarState,
    pub focused: bool,
    /// Collection currently shown in the document list
    pub active: Option<&'a Namespace>,
}

impl Component for Sidebar<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let border_color = if self.focused { Color::Cyan } else { Color::DarkGray };
        let title = if self.state.filter.is_empty() {
            " Databases ".to_string()
        } else {
            format!(" Databases /{} ", self.state.filter)
        };
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(border_color));

        if self.state.rows.is_empty() {
            let message = if self.state.filter.is_empty() {
                "No databases"
            } else {
                "No matches"
            };
            let empty = Paragraph::new(message)
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let items: Vec<ListItem> = self
            .state
            .rows
            .iter()
            .map(|row| match row {
                SidebarRow::Database { name, expanded } => {
                    let marker = if *expanded { "▾" } else { "▸" };
                    ListItem::new(format!("{marker} {name}"))
                        .style(Style::default().add_modifier(Modifier::BOLD))
                }
                SidebarRow::Collection(namespace) => {
                    let style = if self.state.pending_drop.as_ref() == Some(namespace) {
                        Style::default().fg(Color::Red)
                    } else if self.active == Some(namespace) {
                        Style::default().fg(Color::Green)
                    } else {
                        Style::default().fg(Color::Gray)
                    };
                    ListItem::new(format!("  {}", namespace.collection)).style(style)
                }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::keys::{Key, KeyEvent};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::sync::mpsc;

    fn databases() -> Vec<DatabaseInfo> {
        vec![
            DatabaseInfo {
                name: "logs".to_string(),
                collections: vec!["events".to_string()],
            },
            DatabaseInfo {
                name: "shop".to_string(),
                collections: vec!["customers".to_string(), "orders".to_string()],
            },
        ]
    }

    fn down() -> TuiEvent {
        TuiEvent::Key(KeyEvent::key(Key::Down))
    }

    #[test]
    fn test_databases_start_collapsed() {
        let mut state = SidebarState::new();
        state.set_databases(databases());
        assert_eq!(state.rows().len(), 2);
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn test_open_database_toggles_then_collection_selects() {
        let mut state = SidebarState::new();
        state.set_databases(databases());
        state.handle_event(&down());
        assert_eq!(state.open(), None);
        assert_eq!(state.rows().len(), 4);

        assert_eq!(state.handle_event(&TuiEvent::Key(KeyEvent::rune('j'))), Some(2));
        assert_eq!(state.open(), Some(Namespace::new("shop", "customers")));

        state.selected = 1;
        assert_eq!(state.open(), None);
        assert_eq!(state.rows().len(), 2);
    }

    #[test]
    fn test_expand_and_collapse_all() {
        let mut state = SidebarState::new();
        state.set_databases(databases());
        state.expand_all();
        assert_eq!(state.rows().len(), 5);

        // Select shop.orders, then collapse: selection lands on shop
        state.selected = 4;
        state.collapse_all();
        assert_eq!(state.rows().len(), 2);
        assert_eq!(
            state.selected_row(),
            Some(&SidebarRow::Database {
                name: "shop".to_string(),
                expanded: false
            })
        );
    }

    #[test]
    fn test_set_databases_keeps_expansion_and_clamps() {
        let mut state = SidebarState::new();
        state.set_databases(databases());
        state.expand_all();
        state.selected = 4;
        state.set_databases(databases());
        assert_eq!(state.rows().len(), 5);

        state.set_databases(vec![]);
        assert!(state.rows().is_empty());
        assert_eq!(state.selected, 0);
        assert_eq!(state.open(), None);
    }

    #[test]
    fn test_filter_matches_database_or_collection() {
        let mut state = SidebarState::new();
        state.set_databases(databases());

        // "ORD" only matches shop.orders
        state.set_filter("ORD");
        assert_eq!(
            state.rows(),
            [
                SidebarRow::Database { name: "shop".to_string(), expanded: true },
                SidebarRow::Collection(Namespace::new("shop", "orders")),
            ]
        );

        // A database name match lists all its collections
        state.set_filter("log");
        assert_eq!(state.rows().len(), 2);
        assert_eq!(state.selected_database(), Some("logs"));

        state.set_filter("nothing");
        assert!(state.rows().is_empty());

        state.set_filter("");
        assert_eq!(state.filter(), "");
        assert_eq!(state.rows().len(), 5);
    }

    #[test]
    fn test_filter_survives_reload() {
        let mut state = SidebarState::new();
        state.set_databases(databases());
        state.set_filter("events");
        state.set_databases(databases());
        assert_eq!(state.rows().len(), 2);
    }

    #[test]
    fn test_toggle_expand() {
        let mut state = SidebarState::new();
        state.set_databases(databases());
        state.selected = 1;
        state.toggle_expand();
        assert_eq!(state.rows().len(), 4);

        // On a collection: its database collapses and is selected
        state.selected = 3;
        state.toggle_expand();
        assert_eq!(state.rows().len(), 2);
        assert_eq!(state.selected, 1);
        assert_eq!(state.selected_database(), Some("shop"));
    }

    #[test]
    fn test_drop_needs_two_presses_on_a_collection() {
        let mut state = SidebarState::new();
        state.set_databases(databases());
        // Databases cannot be dropped
        assert!(!state.request_drop());
        assert!(!state.is_drop_pending());

        state.expand_all();
        state.selected = 1;
        assert!(!state.request_drop());
        assert!(state.is_drop_pending());
        assert!(state.request_drop());
        assert!(!state.is_drop_pending());

        // Moving away disarms
        assert!(!state.request_drop());
        state.handle_event(&down());
        assert!(!state.is_drop_pending());
    }

    #[test]
    fn test_navigation_stops_at_edges() {
        let mut state = SidebarState::new();
        state.set_databases(databases());
        assert_eq!(state.handle_event(&TuiEvent::Key(KeyEvent::key(Key::Up))), None);
        assert_eq!(state.handle_event(&down()), Some(1));
        assert_eq!(state.handle_event(&down()), None);
    }

    #[test]
    fn test_register_keys_binds_default_map() {
        let dispatcher = KeyDispatcher::new();
        let (tx, rx) = mpsc::channel();
        register_keys(&dispatcher, &KeyMap::default(), &tx).unwrap();

        dispatcher.push_focus(ID);
        assert!(dispatcher.dispatch(KeyEvent::key(Key::Enter)).is_consumed());
        assert!(dispatcher.dispatch(KeyEvent::rune(' ')).is_consumed());
        assert!(dispatcher.dispatch(KeyEvent::key(Key::Tab)).is_consumed());
        assert!(!dispatcher.dispatch(KeyEvent::rune('j')).is_consumed());
        for event in [KeyEvent::rune('/'), KeyEvent::rune('T'), KeyEvent::rune('A')] {
            assert!(dispatcher.dispatch(event).is_consumed());
        }
        assert!(dispatcher.dispatch(KeyEvent::ctrl('d')).is_consumed());
        assert_eq!(
            rx.try_iter().collect::<Vec<_>>(),
            [
                UiCommand::OpenSidebarItem,
                UiCommand::OpenSidebarItem,
                UiCommand::FocusNext,
                UiCommand::FocusSidebarFilter,
                UiCommand::ToggleExpand,
                UiCommand::AddCollection,
                UiCommand::DropCollection,
            ]
        );
    }

    #[test]
    fn test_render_tree() {
        let backend = TestBackend::new(30, 8);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut state = SidebarState::new();
        state.set_databases(databases());
        state.expand_all();
        let active = Namespace::new("shop", "orders");

        terminal
            .draw(|f| {
                let area = f.area();
                Sidebar {
                    state: &mut state,
                    focused: true,
                    active: Some(&active),
                }
                .render(f, area);
            })
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Databases"));
        assert!(text.contains("shop"));
        assert!(text.contains("orders"));
    }

    #[test]
    fn test_render_filter_in_title() {
        let backend = TestBackend::new(30, 8);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut state = SidebarState::new();
        state.set_databases(databases());
        state.set_filter("zzz");

        terminal
            .draw(|f| {
                let area = f.area();
                Sidebar {
                    state: &mut state,
                    focused: false,
                    active: None,
                }
                .render(f, area);
            })
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Databases /zzz"));
        assert!(text.contains("No matches"));
    }
}
