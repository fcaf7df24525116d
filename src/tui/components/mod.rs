//! # TUI Components
//!
//! Every focusable component owns a `ComponentId` (`ID`) and registers its
//! key map sections with the dispatcher through `register_keys`.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! - `StatusBar`: bottom line with namespace, page, status and fetch time
//!
//! ### Stateful Components (Event-Driven)
//!
//! Persistent `*State` lives in `TuiState`; a transient wrapper borrows it
//! each frame together with its props:
//! - `Sidebar`: database/collection tree
//! - `Content`: page of documents
//! - `QueryBar`: filter input, with `History` of applied filters
//! - `FilterBar`: filter over the database tree
//! - `DocViewer`, `DocEditor`, `CollectionInput`, `History`, `Help`: overlays
//!   pushed on top of the focus stack
//! - `TextInput`: editing widget shared by the query bar and the editor
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs          (this file)
//! ├── sidebar.rs
//! ├── filter_bar.rs
//! ├── collection_input.rs
//! ├── content.rs
//! ├── query_bar.rs
//! ├── history.rs
//! ├── doc_viewer.rs
//! ├── doc_editor.rs
//! ├── help.rs
//! ├── status_bar.rs
//! └── text_input/
//! ```

pub mod collection_input;
pub mod content;
pub mod doc_editor;
pub mod doc_viewer;
pub mod filter_bar;
pub mod help;
pub mod history;
pub mod query_bar;
pub mod sidebar;
pub mod status_bar;
pub mod text_input;

use std::sync::mpsc::Sender;

use ratatui::layout::{Constraint, Layout, Rect};

use crate::core::dispatch::KeyDispatcher;
use crate::core::focus::ComponentId;
use crate::core::keymap::KeyMap;
use crate::core::registry::BindingError;
use crate::tui::command::{Bindings, UiCommand};

pub use collection_input::{CollectionInput, CollectionInputState};
pub use content::{Content, ContentState};
pub use doc_editor::{DocEditor, DocEditorState};
pub use doc_viewer::{DocViewer, DocViewerState};
pub use filter_bar::{FilterBar, FilterBarState};
pub use help::{Help, HelpState};
pub use history::{History, HistoryState};
pub use query_bar::{QueryBar, QueryBarState};
pub use sidebar::{Sidebar, SidebarState};
pub use status_bar::StatusBar;

/// Bindings active under any focus.
pub fn register_global_keys(
    dispatcher: &KeyDispatcher,
    keys: &KeyMap,
    tx: &Sender<UiCommand>,
) -> Result<(), BindingError> {
    Bindings::new(ComponentId::GLOBAL, tx)
        .bind("quit", &keys.global.quit, UiCommand::Quit)?
        .bind("toggle_help", &keys.global.toggle_help, UiCommand::ToggleHelp)?
        .bind("toggle_sidebar", &keys.global.toggle_sidebar, UiCommand::ToggleSidebar)?
        .register(dispatcher)
}

/// Register the whole key map. Stops at the first invalid binding.
pub fn register_all_keys(
    dispatcher: &KeyDispatcher,
    keys: &KeyMap,
    tx: &Sender<UiCommand>,
) -> Result<(), BindingError> {
    register_global_keys(dispatcher, keys, tx)?;
    sidebar::register_keys(dispatcher, keys, tx)?;
    filter_bar::register_keys(dispatcher, keys, tx)?;
    collection_input::register_keys(dispatcher, keys, tx)?;
    content::register_keys(dispatcher, keys, tx)?;
    query_bar::register_keys(dispatcher, keys, tx)?;
    history::register_keys(dispatcher, keys, tx)?;
    doc_viewer::register_keys(dispatcher, keys, tx)?;
    doc_editor::register_keys(dispatcher, keys, tx)?;
    help::register_keys(dispatcher, keys, tx)?;
    Ok(())
}

/// Compute a centered rect using percentage of the outer rect.
pub fn centered_rect(percent_x: u16, percent_y: u16, outer: Rect) -> Rect {
    let [_, center_v, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(outer);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(center_v);
    center
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::keymap::KeySpec;
    use crate::core::keys::{Key, KeyEvent};
    use std::sync::mpsc;

    #[test]
    fn test_register_all_default_keys() {
        let dispatcher = KeyDispatcher::new();
        let (tx, _rx) = mpsc::channel();
        register_all_keys(&dispatcher, &KeyMap::default(), &tx).unwrap();

        assert_eq!(dispatcher.global_bindings().len(), 3);
        // focus_next (2) + open (2) + seven single-key operations
        assert_eq!(dispatcher.bindings_for(&sidebar::ID).len(), 11);
        assert_eq!(dispatcher.bindings_for(&history::ID).len(), 2);
        assert_eq!(dispatcher.bindings_for(&help::ID).len(), 1);
    }

    #[test]
    fn test_invalid_user_key_is_reported() {
        let dispatcher = KeyDispatcher::new();
        let (tx, _rx) = mpsc::channel();
        let mut keys = KeyMap::default();
        keys.viewer.close = KeySpec::keys(&["Escape", "Hyper+Q"], "Close");

        let err = register_all_keys(&dispatcher, &keys, &tx).unwrap_err();
        assert!(err.to_string().contains("close"));
        // Batches before the bad one are in, the bad batch is not
        assert!(!dispatcher.bindings_for(&content::ID).is_empty());
        assert!(dispatcher.bindings_for(&doc_viewer::ID).is_empty());
    }

    #[test]
    fn test_global_fires_under_any_focus() {
        let dispatcher = KeyDispatcher::new();
        let (tx, rx) = mpsc::channel();
        register_all_keys(&dispatcher, &KeyMap::default(), &tx).unwrap();

        dispatcher.push_focus(content::ID);
        dispatcher.push_focus(doc_viewer::ID);
        assert!(dispatcher.dispatch(KeyEvent::ctrl('k')).is_consumed());
        assert!(dispatcher.dispatch(KeyEvent::key(Key::Esc)).is_consumed());
        assert_eq!(
            rx.try_iter().collect::<Vec<_>>(),
            [UiCommand::ToggleHelp, UiCommand::CloseViewer]
        );
    }

    #[test]
    fn test_centered_rect() {
        let outer = Rect::new(0, 0, 100, 50);
        let rect = centered_rect(80, 60, outer);
        assert_eq!(rect.width, 80);
        assert_eq!(rect.height, 30);
        assert_eq!(rect.x, 10);
        assert_eq!(rect.y, 10);
    }
}
