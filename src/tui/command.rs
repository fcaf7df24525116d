//! # UI Commands
//!
//! Key actions run inside `KeyDispatcher::dispatch`, away from the TUI state.
//! Each one only sends a `UiCommand` down a channel; the event loop drains the
//! channel right after dispatch and applies the commands with full access to
//! `App`, `TuiState` and the focus stack.
//!
//! ```text
//! key → dispatch() → action closure → UiCommand ─┐
//!                                                 ▼
//!                          event loop: apply command → Action → update()
//! ```

use std::sync::Arc;
use std::sync::mpsc::Sender;

use log::warn;

use crate::core::dispatch::KeyDispatcher;
use crate::core::focus::ComponentId;
use crate::core::keymap::KeySpec;
use crate::core::keys::{KeyAction, KeyBinding};
use crate::core::registry::BindingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    // Global
    Quit,
    ToggleHelp,
    ToggleSidebar,
    // Main panels
    FocusNext,
    // Sidebar
    OpenSidebarItem,
    FocusSidebarFilter,
    ExpandAll,
    CollapseAll,
    ToggleExpand,
    AddCollection,
    DropCollection,
    ReloadDatabases,
    // Sidebar filter bar
    ApplySidebarFilter,
    CloseSidebarFilter,
    // New collection prompt
    CreateCollection,
    CancelCreateCollection,
    // Content
    PeekDocument,
    ViewDocument,
    EditDocument,
    AddDocument,
    DuplicateDocument,
    DeleteDocument,
    Refresh,
    FocusQuery,
    NextPage,
    PreviousPage,
    // Query bar
    ApplyFilter,
    ClearFilter,
    ShowHistory,
    CloseQueryBar,
    // Filter history
    SelectHistory,
    CloseHistory,
    // Viewer
    CloseViewer,
    EditViewed,
    // Editor
    SaveDocument,
    CancelEdit,
    // Help
    CloseHelp,
}

/// A key action that sends `command` to the event loop.
pub fn send_command(tx: &Sender<UiCommand>, command: UiCommand) -> KeyAction {
    let tx = tx.clone();
    Arc::new(move || {
        if tx.send(command).is_err() {
            warn!("Dropped {:?}: event loop is gone", command);
        }
    })
}

/// Collects one component's bindings from its key map sections, then
/// registers them as a single batch.
///
/// ```rust,ignore
/// Bindings::new(sidebar::ID, tx)
///     .bind("open", &keys.sidebar.open, UiCommand::OpenSidebarItem)?
///     .register(dispatcher)
/// ```
pub struct Bindings<'a> {
    component: ComponentId,
    tx: &'a Sender<UiCommand>,
    bindings: Vec<KeyBinding>,
}

impl<'a> Bindings<'a> {
    pub fn new(component: ComponentId, tx: &'a Sender<UiCommand>) -> Self {
        Self {
            component,
            tx,
            bindings: Vec::new(),
        }
    }

    pub fn bind(
        mut self,
        name: &str,
        spec: &KeySpec,
        command: UiCommand,
    ) -> Result<Self, BindingError> {
        let action = send_command(self.tx, command);
        self.bindings
            .extend(spec.bindings(&self.component, name, &action)?);
        Ok(self)
    }

    pub fn register(self, dispatcher: &KeyDispatcher) -> Result<(), BindingError> {
        dispatcher.register_all(self.component, self.bindings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::keys::KeyEvent;
    use std::sync::mpsc;

    #[test]
    fn test_bindings_register_as_one_component() {
        let (tx, rx) = mpsc::channel();
        let dispatcher = KeyDispatcher::new();
        let component = ComponentId::from_static("Pager");

        Bindings::new(component.clone(), &tx)
            .bind("next", &KeySpec::keys(&["Ctrl+N", "PgDn"], "Next"), UiCommand::NextPage)
            .unwrap()
            .bind("prev", &KeySpec::runes(&["b"], "Previous"), UiCommand::PreviousPage)
            .unwrap()
            .register(&dispatcher)
            .unwrap();

        assert_eq!(dispatcher.bindings_for(&component).len(), 3);

        dispatcher.push_focus(component);
        assert!(dispatcher.dispatch(KeyEvent::ctrl('n')).is_consumed());
        assert!(dispatcher.dispatch(KeyEvent::rune('b')).is_consumed());
        assert_eq!(
            rx.try_iter().collect::<Vec<_>>(),
            [UiCommand::NextPage, UiCommand::PreviousPage]
        );
    }

    #[test]
    fn test_bindings_reject_bad_key_name() {
        let (tx, _rx) = mpsc::channel();
        let result = Bindings::new(ComponentId::from_static("Pager"), &tx).bind(
            "next",
            &KeySpec::keys(&["Hyper+N"], "Next"),
            UiCommand::NextPage,
        );
        assert!(matches!(result, Err(BindingError::InvalidKey { .. })));
    }

    #[test]
    fn test_send_command_delivers_on_each_call() {
        let (tx, rx) = mpsc::channel();
        let action = send_command(&tx, UiCommand::NextPage);
        action();
        action();
        assert_eq!(
            rx.try_iter().collect::<Vec<_>>(),
            [UiCommand::NextPage, UiCommand::NextPage]
        );
    }

    #[test]
    fn test_send_command_after_receiver_dropped_does_not_panic() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        send_command(&tx, UiCommand::Quit)();
    }
}
