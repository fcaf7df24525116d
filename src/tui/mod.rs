//! # TUI Adapter
//!
//! The ratatui-specific layer. Owns the terminal, the `KeyDispatcher` and the
//! presentation state; turns key presses into `core::Action` values.
//!
//! ## Key Flow
//!
//! ```text
//! crossterm event → TuiEvent
//!   Key   → KeyDispatcher::dispatch
//!             Consumed     → UiCommand(s) on the command channel
//!             PassThrough  → focused component's EventHandler
//!   Paste → focused text input
//!
//! drain commands → apply_command → Action → update() → Effect → tokio task
//! ```
//!
//! Focus decides everything: the Sidebar and Content panels sit at the bottom
//! of the focus stack (switched, never stacked), overlays are pushed on top and
//! popped when they close.
//!
//! ## Redraw Strategy
//!
//! Frames are drawn only after input or a store result. While a store call is
//! in flight the loop polls faster so results show up promptly.

pub mod command;
pub mod component;
pub mod components;
pub mod event;
mod ui;

use log::{debug, info, warn};
use std::future::Future;
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::Duration;

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use serde_json::Value;

use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::dispatch::{DispatchOutcome, KeyDispatcher};
use crate::core::focus::ComponentId;
use crate::core::state::App;
use crate::store::{DocumentStore, StoreError, parse_filter};
use crate::tui::command::UiCommand;
use crate::tui::component::EventHandler;
use crate::tui::components::sidebar::SidebarRow;
use crate::tui::components::{
    CollectionInputState, ContentState, DocEditorState, DocViewerState, FilterBarState,
    HelpState, HistoryState, QueryBarState, SidebarState, collection_input, content, doc_editor,
    doc_viewer, filter_bar, help, history, query_bar, sidebar,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// TUI-specific presentation state (not part of core browser state)
pub struct TuiState {
    pub sidebar: SidebarState,
    pub filter_bar: FilterBarState,
    pub content: ContentState,
    pub query_bar: QueryBarState,
    // Overlays (None = hidden)
    pub viewer: Option<DocViewerState>,
    pub editor: Option<DocEditorState>,
    pub collection_input: Option<CollectionInputState>,
    pub history: Option<HistoryState>,
    pub help: Option<HelpState>,
    pub show_sidebar: bool,
    /// Namespace and offset of the page the content selection belongs to
    shown_page: Option<(String, usize)>,
}

impl TuiState {
    pub fn new(show_sidebar: bool) -> Self {
        Self {
            sidebar: SidebarState::new(),
            filter_bar: FilterBarState::new(),
            content: ContentState::new(),
            query_bar: QueryBarState::new(),
            viewer: None,
            editor: None,
            collection_input: None,
            history: None,
            help: None,
            show_sidebar,
            shown_page: None,
        }
    }

    /// Panel that gets focus at startup.
    pub fn root_focus(&self) -> ComponentId {
        if self.show_sidebar { sidebar::ID } else { content::ID }
    }

    /// Pull what the widgets navigate over out of `App`.
    pub fn sync(&mut self, app: &App) {
        if self.sidebar.databases() != app.databases.as_slice() {
            self.sidebar.set_databases(app.databases.clone());
        }

        let page = app
            .namespace
            .as_ref()
            .map(|ns| (ns.to_string(), app.page.as_ref().map_or(0, |p| p.skip)));
        if page != self.shown_page {
            self.content.reset_selection();
            self.shown_page = page;
        }
        self.content.set_len(app.documents().len());
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Disambiguated escape codes let Esc and Ctrl+<letter> arrive unambiguously;
        // terminals without the protocol ignore it
        execute!(
            stdout(),
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
        info!(
            "Terminal modes enabled (bracketed paste, steady block cursor, keyboard enhancement)"
        );
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableBracketedPaste,
            Hide
        );
    }
}

pub fn run(config: ResolvedConfig, store: Arc<dyn DocumentStore>) -> std::io::Result<()> {
    let dispatcher = KeyDispatcher::new();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    components::register_all_keys(&dispatcher, &config.keys, &cmd_tx).map_err(|e| {
        warn!("Key map rejected: {}", e);
        std::io::Error::other(e)
    })?;

    let mut app = App::new(store.name(), config.page_size);
    let mut tui = TuiState::new(config.show_sidebar);
    dispatcher.push_focus(tui.root_focus());

    // Channel for actions from store tasks
    let (tx, rx) = mpsc::channel();
    let effect = update(&mut app, Action::LoadDatabases);
    spawn_effect(effect, &store, &tx);

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = match TerminalModeGuard::new() {
        Ok(guard) => Some(guard),
        Err(e) => {
            warn!("Failed to enable terminal modes: {}", e);
            None
        }
    };

    let mut needs_redraw = true;
    let result = loop {
        if needs_redraw {
            let focus = dispatcher.current_focus();
            if let Err(e) = terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, focus.as_ref())) {
                break Err(e);
            }
            needs_redraw = false;
        }

        let timeout = if app.is_loading {
            Duration::from_millis(100)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);

        // Process first event + drain all pending events before next draw
        let mut should_quit = false;
        if first_event.is_some() {
            needs_redraw = true;
        }
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            for action in handle_event(&event, &dispatcher, &cmd_rx, &mut app, &mut tui) {
                should_quit |= apply_action(action, &mut app, &mut tui, &store, &tx);
            }
        }

        // Results from store tasks
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            should_quit |= apply_action(action, &mut app, &mut tui, &store, &tx);
        }

        if should_quit {
            break Ok(());
        }
    };

    ratatui::restore();
    info!("docterm shutting down");
    result
}

/// Dispatch one terminal event and apply the commands it produced.
fn handle_event(
    event: &TuiEvent,
    dispatcher: &KeyDispatcher,
    commands: &mpsc::Receiver<UiCommand>,
    app: &mut App,
    tui: &mut TuiState,
) -> Vec<Action> {
    match event {
        TuiEvent::Key(key) => {
            if let DispatchOutcome::PassThrough(_) = dispatcher.dispatch(*key) {
                route_to_focused(event, dispatcher.current_focus().as_ref(), tui);
            }
        }
        TuiEvent::Paste(_) => route_to_focused(event, dispatcher.current_focus().as_ref(), tui),
        TuiEvent::Resize => return Vec::new(),
    }

    let commands: Vec<UiCommand> = commands.try_iter().collect();
    // Deletes and drops need two presses in a row
    if !commands.contains(&UiCommand::DeleteDocument) && tui.content.is_delete_pending() {
        tui.content.cancel_delete();
        app.status_message.clear();
    }
    if !commands.contains(&UiCommand::DropCollection) && tui.sidebar.is_drop_pending() {
        tui.sidebar.cancel_drop();
        app.status_message.clear();
    }
    commands
        .into_iter()
        .filter_map(|command| apply_command(command, app, tui, dispatcher))
        .collect()
}

/// Give an unbound key (or a paste) to whichever component has focus.
fn route_to_focused(event: &TuiEvent, focus: Option<&ComponentId>, tui: &mut TuiState) {
    let Some(focus) = focus else {
        return;
    };
    if *focus == sidebar::ID {
        tui.sidebar.handle_event(event);
    } else if *focus == filter_bar::ID {
        tui.filter_bar.handle_event(event);
    } else if *focus == content::ID {
        tui.content.handle_event(event);
    } else if *focus == query_bar::ID {
        tui.query_bar.handle_event(event);
    } else if *focus == history::ID {
        if let Some(history) = tui.history.as_mut() {
            history.handle_event(event);
        }
    } else if *focus == collection_input::ID {
        if let Some(input) = tui.collection_input.as_mut() {
            input.handle_event(event);
        }
    } else if *focus == doc_viewer::ID {
        if let Some(viewer) = tui.viewer.as_mut() {
            viewer.handle_event(event);
        }
    } else if *focus == doc_editor::ID {
        if let Some(editor) = tui.editor.as_mut() {
            editor.handle_event(event);
        }
    } else if *focus == help::ID
        && let Some(help) = tui.help.as_mut()
    {
        help.handle_event(event);
    }
}

fn selected_document(app: &App, tui: &TuiState) -> Option<Value> {
    app.documents().get(tui.content.selected).cloned()
}

/// Carry out one command from a key action.
///
/// Focus and overlay changes happen here; anything touching browser state is
/// returned as an `Action` for `update`.
pub fn apply_command(
    command: UiCommand,
    app: &mut App,
    tui: &mut TuiState,
    dispatcher: &KeyDispatcher,
) -> Option<Action> {
    debug!("UI command: {:?}", command);
    match command {
        UiCommand::Quit => Some(Action::Quit),
        UiCommand::ToggleHelp => {
            if tui.help.take().is_some() {
                dispatcher.pop_focus();
            } else {
                let focus = dispatcher.current_focus();
                tui.help = Some(HelpState::new(dispatcher.legend(focus.as_ref())));
                dispatcher.push_focus(help::ID);
            }
            None
        }
        UiCommand::CloseHelp => {
            if tui.help.take().is_some() {
                dispatcher.pop_focus();
            }
            None
        }
        UiCommand::ToggleSidebar => {
            let focus = dispatcher.current_focus();
            // Only from the main panels; overlays keep the layout fixed
            if focus != Some(sidebar::ID) && focus != Some(content::ID) {
                return None;
            }
            tui.show_sidebar = !tui.show_sidebar;
            if !tui.show_sidebar && focus == Some(sidebar::ID) {
                dispatcher.switch_focus(content::ID);
            }
            None
        }
        UiCommand::FocusNext => {
            if dispatcher.is_focused(&sidebar::ID) {
                dispatcher.switch_focus(content::ID);
            } else if dispatcher.is_focused(&content::ID) && tui.show_sidebar {
                dispatcher.switch_focus(sidebar::ID);
            }
            None
        }
        UiCommand::OpenSidebarItem => {
            let namespace = tui.sidebar.open()?;
            dispatcher.switch_focus(content::ID);
            Some(Action::SelectCollection(namespace))
        }
        UiCommand::FocusSidebarFilter => {
            tui.filter_bar.open(tui.sidebar.filter());
            dispatcher.push_focus(filter_bar::ID);
            None
        }
        UiCommand::ApplySidebarFilter => {
            let text = tui.filter_bar.text().to_string();
            tui.sidebar.set_filter(&text);
            tui.filter_bar.close();
            dispatcher.pop_focus();
            None
        }
        UiCommand::CloseSidebarFilter => {
            tui.filter_bar.close();
            dispatcher.pop_focus();
            None
        }
        UiCommand::ExpandAll => {
            tui.sidebar.expand_all();
            None
        }
        UiCommand::CollapseAll => {
            tui.sidebar.collapse_all();
            None
        }
        UiCommand::ToggleExpand => {
            tui.sidebar.toggle_expand();
            None
        }
        UiCommand::AddCollection => {
            let Some(database) = tui.sidebar.selected_database() else {
                app.status_message = "Select a database first".to_string();
                return None;
            };
            tui.collection_input = Some(CollectionInputState::new(database));
            dispatcher.push_focus(collection_input::ID);
            None
        }
        UiCommand::CreateCollection => {
            let input = tui.collection_input.as_ref()?;
            let Some(namespace) = input.namespace() else {
                app.status_message = "Collection name is empty".to_string();
                return None;
            };
            tui.collection_input = None;
            dispatcher.pop_focus();
            Some(Action::CreateCollection(namespace))
        }
        UiCommand::CancelCreateCollection => {
            if tui.collection_input.take().is_some() {
                dispatcher.pop_focus();
            }
            None
        }
        UiCommand::DropCollection => {
            let Some(SidebarRow::Collection(namespace)) = tui.sidebar.selected_row().cloned()
            else {
                app.status_message = "Only collections can be deleted".to_string();
                return None;
            };
            if tui.sidebar.request_drop() {
                app.status_message.clear();
                Some(Action::DropCollection(namespace))
            } else {
                app.status_message = format!("Press delete again to drop {namespace}");
                None
            }
        }
        UiCommand::ReloadDatabases => Some(Action::LoadDatabases),
        UiCommand::PeekDocument => {
            let document = selected_document(app, tui)?;
            tui.viewer = Some(DocViewerState::new(document));
            dispatcher.push_focus(doc_viewer::ID);
            None
        }
        UiCommand::ViewDocument => {
            let document = selected_document(app, tui)?;
            tui.viewer = Some(DocViewerState::full_screen(document));
            dispatcher.push_focus(doc_viewer::ID);
            None
        }
        UiCommand::EditDocument => {
            let document = selected_document(app, tui)?;
            open_editor(DocEditorState::edit(&document), tui, dispatcher);
            None
        }
        UiCommand::DuplicateDocument => {
            let document = selected_document(app, tui)?;
            open_editor(DocEditorState::duplicate(&document), tui, dispatcher);
            None
        }
        UiCommand::AddDocument => {
            if app.namespace.is_none() {
                app.status_message = "Select a collection first".to_string();
                return None;
            }
            open_editor(DocEditorState::add(), tui, dispatcher);
            None
        }
        UiCommand::DeleteDocument => {
            let document = selected_document(app, tui)?;
            let Some(id) = document.get("_id").cloned() else {
                app.error = Some("document has no _id".to_string());
                return None;
            };
            if tui.content.request_delete() {
                app.status_message.clear();
                Some(Action::DeleteDocument(id))
            } else {
                app.status_message = "Press delete again to remove this document".to_string();
                None
            }
        }
        UiCommand::Refresh => Some(Action::Refresh),
        UiCommand::FocusQuery => {
            tui.query_bar.open(&app.filter_text);
            dispatcher.push_focus(query_bar::ID);
            None
        }
        UiCommand::NextPage => Some(Action::NextPage),
        UiCommand::PreviousPage => Some(Action::PreviousPage),
        UiCommand::ApplyFilter => {
            let text = tui.query_bar.text().to_string();
            // An unparsable filter keeps the bar open for fixing
            if parse_filter(&text).is_ok() {
                tui.query_bar.remember(&text);
                tui.query_bar.close();
                dispatcher.pop_focus();
            }
            Some(Action::ApplyFilter(text))
        }
        UiCommand::ClearFilter => {
            tui.query_bar.input.clear();
            Some(Action::ApplyFilter(String::new()))
        }
        UiCommand::ShowHistory => {
            if tui.query_bar.history().is_empty() {
                app.status_message = "No filters applied yet".to_string();
                return None;
            }
            tui.history = Some(HistoryState::new(tui.query_bar.history().to_vec()));
            dispatcher.push_focus(history::ID);
            None
        }
        UiCommand::SelectHistory => {
            let history = tui.history.take()?;
            dispatcher.pop_focus();
            if let Some(entry) = history.selected_entry() {
                tui.query_bar.input.set_text(entry);
            }
            None
        }
        UiCommand::CloseHistory => {
            if tui.history.take().is_some() {
                dispatcher.pop_focus();
            }
            None
        }
        UiCommand::CloseQueryBar => {
            tui.query_bar.close();
            dispatcher.pop_focus();
            None
        }
        UiCommand::CloseViewer => {
            if tui.viewer.take().is_some() {
                dispatcher.pop_focus();
            }
            None
        }
        UiCommand::EditViewed => {
            let viewer = tui.viewer.take()?;
            tui.editor = Some(DocEditorState::edit(&viewer.document));
            dispatcher.switch_focus(doc_editor::ID);
            None
        }
        UiCommand::SaveDocument => {
            let editor = tui.editor.as_mut()?;
            let document = editor.parse()?;
            let mode = editor.mode;
            tui.editor = None;
            dispatcher.pop_focus();
            Some(Action::SaveDocument { document, mode })
        }
        UiCommand::CancelEdit => {
            if tui.editor.take().is_some() {
                dispatcher.pop_focus();
            }
            None
        }
    }
}

fn open_editor(editor: DocEditorState, tui: &mut TuiState, dispatcher: &KeyDispatcher) {
    tui.editor = Some(editor);
    dispatcher.push_focus(doc_editor::ID);
}

/// Run `update`, sync the widgets, and start any store call. Returns `true` to quit.
fn apply_action(
    action: Action,
    app: &mut App,
    tui: &mut TuiState,
    store: &Arc<dyn DocumentStore>,
    tx: &mpsc::Sender<Action>,
) -> bool {
    let effect = update(app, action);
    tui.sync(app);
    if effect == Effect::Quit {
        return true;
    }
    spawn_effect(effect, store, tx);
    false
}

/// Start the store call an `Effect` asks for on a tokio task.
fn spawn_effect(effect: Effect, store: &Arc<dyn DocumentStore>, tx: &mpsc::Sender<Action>) {
    let store = Arc::clone(store);
    match effect {
        Effect::None | Effect::Quit => {}
        Effect::FetchDatabases => spawn_store_call("list databases", tx.clone(), async move {
            store.list_databases().await.map(Action::DatabasesLoaded)
        }),
        Effect::FetchDocuments(query) => {
            spawn_store_call("find", tx.clone(), async move {
                let page = store.find(&query).await?;
                Ok(Action::DocumentsLoaded { query, page })
            })
        }
        Effect::InsertDocument(namespace, document) => {
            spawn_store_call("insert", tx.clone(), async move {
                let stored = store.insert_document(&namespace, document).await?;
                Ok(Action::DocumentSaved(format!(
                    "Inserted {}",
                    stored.get("_id").map(Value::to_string).unwrap_or_default()
                )))
            })
        }
        Effect::UpdateDocument(namespace, document) => {
            spawn_store_call("update", tx.clone(), async move {
                store.update_document(&namespace, document).await?;
                Ok(Action::DocumentSaved("Document saved".to_string()))
            })
        }
        Effect::DeleteDocument(namespace, id) => {
            spawn_store_call("delete", tx.clone(), async move {
                store.delete_document(&namespace, &id).await?;
                Ok(Action::DocumentDeleted)
            })
        }
        Effect::CreateCollection(namespace) => {
            spawn_store_call("create collection", tx.clone(), async move {
                store.create_collection(&namespace).await?;
                Ok(Action::CollectionCreated(namespace))
            })
        }
        Effect::DropCollection(namespace) => {
            spawn_store_call("drop collection", tx.clone(), async move {
                store.drop_collection(&namespace).await?;
                Ok(Action::CollectionDropped(namespace))
            })
        }
    }
}

fn spawn_store_call<F>(label: &'static str, tx: mpsc::Sender<Action>, call: F)
where
    F: Future<Output = Result<Action, StoreError>> + Send + 'static,
{
    info!("Spawning store call: {}", label);
    tokio::spawn(async move {
        let action = match call.await {
            Ok(action) => action,
            Err(e) => {
                warn!("Store call '{}' failed: {}", label, e);
                Action::StoreFailed(format!("{label} failed: {e}"))
            }
        };
        if tx.send(action).is_err() {
            warn!("Failed to send result of '{}': receiver dropped", label);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::SaveMode;
    use crate::core::keymap::KeyMap;
    use crate::core::keys::{Key, KeyEvent};
    use crate::store::{DatabaseInfo, MemoryStore, Namespace};
    use crate::test_support::{page_loaded, test_app};
    use serde_json::json;

    struct Harness {
        app: App,
        tui: TuiState,
        dispatcher: KeyDispatcher,
        commands: mpsc::Receiver<UiCommand>,
        _tx: mpsc::Sender<UiCommand>,
    }

    impl Harness {
        /// Browser with shop.orders open on a two-document page, Content focused.
        fn new() -> Self {
            let dispatcher = KeyDispatcher::new();
            let (tx, commands) = mpsc::channel();
            components::register_all_keys(&dispatcher, &KeyMap::default(), &tx).unwrap();

            let mut app = test_app();
            let mut tui = TuiState::new(true);
            dispatcher.push_focus(tui.root_focus());

            update(
                &mut app,
                Action::DatabasesLoaded(vec![DatabaseInfo {
                    name: "shop".to_string(),
                    collections: vec!["orders".to_string()],
                }]),
            );
            update(&mut app, Action::SelectCollection(Namespace::new("shop", "orders")));
            let loaded = page_loaded(
                &app,
                vec![
                    json!({"_id": "o1", "status": "paid"}),
                    json!({"_id": "o2", "status": "pending"}),
                ],
                3,
            );
            update(&mut app, loaded);
            tui.sync(&app);
            dispatcher.switch_focus(content::ID);

            Self {
                app,
                tui,
                dispatcher,
                commands,
                _tx: tx,
            }
        }

        fn press(&mut self, key: KeyEvent) -> Vec<Action> {
            handle_event(
                &TuiEvent::Key(key),
                &self.dispatcher,
                &self.commands,
                &mut self.app,
                &mut self.tui,
            )
        }

        fn focus(&self) -> Option<ComponentId> {
            self.dispatcher.current_focus()
        }
    }

    #[test]
    fn test_tab_cycles_main_panels() {
        let mut h = Harness::new();
        h.press(KeyEvent::key(Key::Tab));
        assert_eq!(h.focus(), Some(sidebar::ID));
        h.press(KeyEvent::key(Key::Tab));
        assert_eq!(h.focus(), Some(content::ID));
        assert_eq!(h.dispatcher.focus_depth(), 1);
    }

    #[test]
    fn test_open_collection_focuses_content() {
        let mut h = Harness::new();
        h.dispatcher.switch_focus(sidebar::ID);
        // Expand "shop", move to "orders", open it
        assert!(h.press(KeyEvent::key(Key::Enter)).is_empty());
        h.press(KeyEvent::key(Key::Down));
        let actions = h.press(KeyEvent::key(Key::Enter));
        assert_eq!(
            actions,
            [Action::SelectCollection(Namespace::new("shop", "orders"))]
        );
        assert_eq!(h.focus(), Some(content::ID));
    }

    #[test]
    fn test_unbound_keys_move_selection() {
        let mut h = Harness::new();
        h.press(KeyEvent::rune('j'));
        assert_eq!(h.tui.content.selected, 1);
    }

    #[test]
    fn test_peek_then_close_restores_focus() {
        let mut h = Harness::new();
        h.press(KeyEvent::key(Key::Down));
        h.press(KeyEvent::key(Key::Enter));
        assert_eq!(h.focus(), Some(doc_viewer::ID));
        assert_eq!(
            h.tui.viewer.as_ref().map(|v| v.document.clone()),
            Some(json!({"_id": "o2", "status": "pending"}))
        );

        h.press(KeyEvent::key(Key::Esc));
        assert!(h.tui.viewer.is_none());
        assert_eq!(h.focus(), Some(content::ID));
    }

    #[test]
    fn test_edit_from_viewer_replaces_overlay() {
        let mut h = Harness::new();
        h.press(KeyEvent::key(Key::Enter));
        h.press(KeyEvent::rune('e'));
        assert!(h.tui.viewer.is_none());
        assert!(h.tui.editor.is_some());
        assert_eq!(h.focus(), Some(doc_editor::ID));
        assert_eq!(h.dispatcher.focus_depth(), 2);
    }

    #[test]
    fn test_editor_typing_and_save() {
        let mut h = Harness::new();
        h.press(KeyEvent::rune('a'));
        assert_eq!(h.focus(), Some(doc_editor::ID));
        h.tui.editor.as_mut().unwrap().input.set_text("{");

        // Runes are text in the editor, not content shortcuts
        for c in "\"x\": 1}".chars() {
            assert!(h.press(KeyEvent::rune(c)).is_empty());
        }
        assert!(h.tui.editor.as_ref().unwrap().input.text().contains("\"x\": 1}"));

        let actions = h.press(KeyEvent::ctrl('s'));
        assert_eq!(
            actions,
            [Action::SaveDocument {
                document: json!({"x": 1}),
                mode: SaveMode::Insert
            }]
        );
        assert!(h.tui.editor.is_none());
        assert_eq!(h.focus(), Some(content::ID));
        // Ctrl+S was the editor's, not the global sidebar toggle
        assert!(h.tui.show_sidebar);
    }

    #[test]
    fn test_invalid_save_keeps_editor_open() {
        let mut h = Harness::new();
        h.press(KeyEvent::rune('a'));
        h.press(KeyEvent::rune('{'));
        assert!(h.press(KeyEvent::ctrl('s')).is_empty());
        assert!(h.tui.editor.as_ref().unwrap().error.is_some());
        assert_eq!(h.focus(), Some(doc_editor::ID));
    }

    #[test]
    fn test_delete_needs_confirmation() {
        let mut h = Harness::new();
        assert!(h.press(KeyEvent::ctrl('d')).is_empty());
        assert!(h.tui.content.is_delete_pending());
        assert_eq!(
            h.press(KeyEvent::ctrl('d')),
            [Action::DeleteDocument(json!("o1"))]
        );
    }

    #[test]
    fn test_other_key_cancels_delete() {
        let mut h = Harness::new();
        h.press(KeyEvent::ctrl('d'));
        h.press(KeyEvent::rune('r'));
        assert!(!h.tui.content.is_delete_pending());
        assert!(h.press(KeyEvent::ctrl('d')).is_empty());
    }

    #[test]
    fn test_query_bar_apply() {
        let mut h = Harness::new();
        h.press(KeyEvent::rune('/'));
        assert_eq!(h.focus(), Some(query_bar::ID));

        handle_event(
            &TuiEvent::Paste(r#"{"status":"paid"}"#.to_string()),
            &h.dispatcher,
            &h.commands,
            &mut h.app,
            &mut h.tui,
        );
        let actions = h.press(KeyEvent::key(Key::Enter));
        assert_eq!(
            actions,
            [Action::ApplyFilter(r#"{"status":"paid"}"#.to_string())]
        );
        assert_eq!(h.focus(), Some(content::ID));
        assert!(!h.tui.query_bar.visible);
    }

    #[test]
    fn test_query_bar_invalid_filter_stays_open() {
        let mut h = Harness::new();
        h.press(KeyEvent::rune('/'));
        h.press(KeyEvent::rune('{'));
        let actions = h.press(KeyEvent::key(Key::Enter));
        assert_eq!(actions, [Action::ApplyFilter("{".to_string())]);
        assert_eq!(h.focus(), Some(query_bar::ID));
    }

    #[test]
    fn test_help_shows_focused_legend_and_closes() {
        let mut h = Harness::new();
        h.press(KeyEvent::ctrl('k'));
        assert_eq!(h.focus(), Some(help::ID));
        let sections = &h.tui.help.as_ref().unwrap().sections;
        assert_eq!(sections[0].component, content::ID);
        assert!(sections.last().unwrap().component.is_global());

        h.press(KeyEvent::ctrl('k'));
        assert!(h.tui.help.is_none());
        assert_eq!(h.focus(), Some(content::ID));
    }

    #[test]
    fn test_toggle_sidebar_moves_focus_off_hidden_panel() {
        let mut h = Harness::new();
        h.dispatcher.switch_focus(sidebar::ID);
        h.press(KeyEvent::ctrl('s'));
        assert!(!h.tui.show_sidebar);
        assert_eq!(h.focus(), Some(content::ID));

        // Tab has nowhere to go while the sidebar is hidden
        h.press(KeyEvent::key(Key::Tab));
        assert_eq!(h.focus(), Some(content::ID));
    }

    #[test]
    fn test_toggle_sidebar_ignored_under_overlay() {
        let mut h = Harness::new();
        h.press(KeyEvent::key(Key::Enter));
        h.press(KeyEvent::ctrl('s'));
        assert!(h.tui.show_sidebar);
    }

    #[test]
    fn test_quit_from_anywhere() {
        let mut h = Harness::new();
        h.press(KeyEvent::rune('/'));
        assert_eq!(h.press(KeyEvent::ctrl('c')), [Action::Quit]);
    }

    #[test]
    fn test_add_requires_collection() {
        let mut h = Harness::new();
        h.app.namespace = None;
        h.press(KeyEvent::rune('a'));
        assert!(h.tui.editor.is_none());
        assert_eq!(h.app.status_message, "Select a collection first");
    }

    fn type_text(h: &mut Harness, text: &str) {
        for c in text.chars() {
            h.press(KeyEvent::rune(c));
        }
    }

    #[test]
    fn test_sidebar_filter_applies_and_restores_focus() {
        let mut h = Harness::new();
        h.dispatcher.switch_focus(sidebar::ID);
        h.press(KeyEvent::rune('/'));
        assert_eq!(h.focus(), Some(filter_bar::ID));
        assert!(h.tui.filter_bar.visible);

        type_text(&mut h, "ord");
        h.press(KeyEvent::key(Key::Enter));
        assert_eq!(h.tui.sidebar.filter(), "ord");
        assert!(!h.tui.filter_bar.visible);
        assert_eq!(h.focus(), Some(sidebar::ID));
    }

    #[test]
    fn test_sidebar_filter_escape_keeps_tree() {
        let mut h = Harness::new();
        h.dispatcher.switch_focus(sidebar::ID);
        h.press(KeyEvent::rune('/'));
        type_text(&mut h, "zzz");
        h.press(KeyEvent::key(Key::Esc));
        assert_eq!(h.tui.sidebar.filter(), "");
        assert_eq!(h.focus(), Some(sidebar::ID));
    }

    #[test]
    fn test_toggle_expand_then_drop_collection_twice() {
        let mut h = Harness::new();
        h.dispatcher.switch_focus(sidebar::ID);
        h.press(KeyEvent::rune('T'));
        h.press(KeyEvent::key(Key::Down));

        assert!(h.press(KeyEvent::ctrl('d')).is_empty());
        assert_eq!(h.app.status_message, "Press delete again to drop shop.orders");
        assert_eq!(
            h.press(KeyEvent::ctrl('d')),
            [Action::DropCollection(Namespace::new("shop", "orders"))]
        );
    }

    #[test]
    fn test_other_key_cancels_drop() {
        let mut h = Harness::new();
        h.dispatcher.switch_focus(sidebar::ID);
        h.press(KeyEvent::rune('T'));
        h.press(KeyEvent::key(Key::Down));
        h.press(KeyEvent::ctrl('d'));
        h.press(KeyEvent::rune('E'));
        assert!(!h.tui.sidebar.is_drop_pending());
        assert!(h.app.status_message.is_empty());
    }

    #[test]
    fn test_drop_on_database_row_is_refused() {
        let mut h = Harness::new();
        h.dispatcher.switch_focus(sidebar::ID);
        assert!(h.press(KeyEvent::ctrl('d')).is_empty());
        assert_eq!(h.app.status_message, "Only collections can be deleted");
    }

    #[test]
    fn test_add_collection_prompt() {
        let mut h = Harness::new();
        h.dispatcher.switch_focus(sidebar::ID);
        h.press(KeyEvent::rune('A'));
        assert_eq!(h.focus(), Some(collection_input::ID));

        // A blank name keeps the prompt open
        assert!(h.press(KeyEvent::key(Key::Enter)).is_empty());
        assert_eq!(h.app.status_message, "Collection name is empty");
        assert_eq!(h.focus(), Some(collection_input::ID));

        type_text(&mut h, "returns");
        assert_eq!(
            h.press(KeyEvent::key(Key::Enter)),
            [Action::CreateCollection(Namespace::new("shop", "returns"))]
        );
        assert!(h.tui.collection_input.is_none());
        assert_eq!(h.focus(), Some(sidebar::ID));
    }

    #[test]
    fn test_add_collection_cancel() {
        let mut h = Harness::new();
        h.dispatcher.switch_focus(sidebar::ID);
        h.press(KeyEvent::rune('A'));
        h.press(KeyEvent::key(Key::Esc));
        assert!(h.tui.collection_input.is_none());
        assert_eq!(h.focus(), Some(sidebar::ID));
    }

    #[test]
    fn test_view_document_full_screen() {
        let mut h = Harness::new();
        h.press(KeyEvent::rune('v'));
        assert_eq!(h.focus(), Some(doc_viewer::ID));
        assert!(h.tui.viewer.as_ref().is_some_and(|v| v.full_screen));

        h.press(KeyEvent::key(Key::Esc));
        assert_eq!(h.focus(), Some(content::ID));
    }

    #[test]
    fn test_filter_history_recall() {
        let mut h = Harness::new();
        h.press(KeyEvent::rune('/'));
        h.press(KeyEvent::ctrl('y'));
        assert_eq!(h.app.status_message, "No filters applied yet");
        assert_eq!(h.focus(), Some(query_bar::ID));

        type_text(&mut h, "{a: 1}");
        h.press(KeyEvent::key(Key::Enter));
        assert_eq!(h.tui.query_bar.history(), ["{a: 1}"]);

        h.press(KeyEvent::rune('/'));
        h.tui.query_bar.input.clear();
        h.press(KeyEvent::ctrl('y'));
        assert_eq!(h.focus(), Some(history::ID));

        h.press(KeyEvent::key(Key::Enter));
        assert!(h.tui.history.is_none());
        assert_eq!(h.focus(), Some(query_bar::ID));
        assert_eq!(h.tui.query_bar.input.text(), "{a: 1}");
    }

    #[test]
    fn test_sync_resets_selection_on_new_page() {
        let mut h = Harness::new();
        h.tui.content.handle_event(&TuiEvent::Key(KeyEvent::key(Key::Down)));
        assert_eq!(h.tui.content.selected, 1);

        update(&mut h.app, Action::NextPage);
        let loaded = page_loaded(&h.app, vec![json!({"_id": "o3"})], 3);
        update(&mut h.app, loaded);
        h.tui.sync(&h.app);
        assert_eq!(h.tui.content.selected, 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_spawn_effect_reports_store_results() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::demo());
        let expected = store.list_databases().await.unwrap();
        let (tx, rx) = mpsc::channel();

        spawn_effect(Effect::FetchDatabases, &store, &tx);
        let action = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(action, Action::DatabasesLoaded(expected));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_spawn_effect_reports_failure() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new("empty"));
        let (tx, rx) = mpsc::channel();

        spawn_effect(
            Effect::DeleteDocument(Namespace::new("nope", "nope"), json!(1)),
            &store,
            &tx,
        );
        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            Action::StoreFailed(message) => assert!(message.starts_with("delete failed")),
            other => panic!("expected StoreFailed, got {other:?}"),
        }
    }
}
