//! # DocEditor Component
//!
//! Multi-line JSON editor overlay. Used for editing the selected document
//! (replace by `_id`) and for adding or duplicating one (insert).
//!
//! Saving parses the buffer first; a parse error keeps the editor open and is
//! shown under the text.

use std::sync::mpsc::Sender;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Clear, Paragraph};
use serde_json::Value;

use crate::core::action::SaveMode;
use crate::core::dispatch::KeyDispatcher;
use crate::core::focus::ComponentId;
use crate::core::keymap::KeyMap;
use crate::core::registry::BindingError;
use crate::tui::command::{Bindings, UiCommand};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::centered_rect;
use crate::tui::components::text_input::{InputEvent, TextInput};
use crate::tui::event::TuiEvent;

pub const ID: ComponentId = ComponentId::from_static("DocEditor");

const NEW_DOCUMENT: &str = "{\n  \n}";

pub fn register_keys(
    dispatcher: &KeyDispatcher,
    keys: &KeyMap,
    tx: &Sender<UiCommand>,
) -> Result<(), BindingError> {
    Bindings::new(ID, tx)
        .bind("save", &keys.editor.save, UiCommand::SaveDocument)?
        .bind("cancel", &keys.editor.cancel, UiCommand::CancelEdit)?
        .register(dispatcher)
}

pub struct DocEditorState {
    pub input: TextInput,
    pub mode: SaveMode,
    pub error: Option<String>,
}

impl DocEditorState {
    fn new(mode: SaveMode, text: String) -> Self {
        let title = match mode {
            SaveMode::Replace => " Edit document ",
            SaveMode::Insert => " New document ",
        };
        let mut input = TextInput::multi_line(title, u16::MAX);
        input.set_text(text);
        Self {
            input,
            mode,
            error: None,
        }
    }

    /// Edit `document` in place; saving replaces it by `_id`.
    pub fn edit(document: &Value) -> Self {
        Self::new(SaveMode::Replace, pretty(document))
    }

    /// Start from an empty object.
    pub fn add() -> Self {
        Self::new(SaveMode::Insert, NEW_DOCUMENT.to_string())
    }

    /// Copy of `document` without its `_id`, saved as a new document.
    pub fn duplicate(document: &Value) -> Self {
        let mut copy = document.clone();
        if let Some(object) = copy.as_object_mut() {
            object.remove("_id");
        }
        Self::new(SaveMode::Insert, pretty(&copy))
    }

    /// Parse the buffer as a JSON object, recording the error on failure.
    pub fn parse(&mut self) -> Option<Value> {
        let result = match serde_json::from_str::<Value>(self.input.text()) {
            Ok(value) if value.is_object() => Ok(value),
            Ok(_) => Err("document must be a JSON object".to_string()),
            Err(e) => Err(format!("invalid JSON: {e}")),
        };
        match result {
            Ok(value) => {
                self.error = None;
                Some(value)
            }
            Err(message) => {
                self.error = Some(message);
                None
            }
        }
    }
}

fn pretty(document: &Value) -> String {
    serde_json::to_string_pretty(document).unwrap_or_else(|_| document.to_string())
}

impl EventHandler for DocEditorState {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        let result = self.input.handle_event(event);
        if result == Some(InputEvent::ContentChanged) {
            self.error = None;
        }
        result
    }
}

/// Transient render wrapper for the editor overlay.
pub struct DocEditor<'a> {
    pub state: &'a mut DocEditorState,
}

impl Component for DocEditor<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let overlay = centered_rect(80, 80, area);
        frame.render_widget(Clear, overlay);

        let error_height = u16::from(self.state.error.is_some());
        let [input_area, error_area] =
            Layout::vertical([Constraint::Min(3), Constraint::Length(error_height)]).areas(overlay);

        self.state.input.focused = true;
        self.state.input.render(frame, input_area);

        if let Some(error) = &self.state.error {
            let line = Paragraph::new(error.as_str()).style(Style::default().fg(Color::Red));
            frame.render_widget(line, error_area);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::keys::{Key, KeyEvent};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use serde_json::json;
    use std::sync::mpsc;

    #[test]
    fn test_edit_round_trips_document() {
        let doc = json!({"_id": "o1", "total": 12});
        let mut state = DocEditorState::edit(&doc);
        assert_eq!(state.mode, SaveMode::Replace);
        assert_eq!(state.parse(), Some(doc));
        assert!(state.error.is_none());
    }

    #[test]
    fn test_duplicate_drops_id() {
        let mut state = DocEditorState::duplicate(&json!({"_id": "o1", "total": 12}));
        assert_eq!(state.mode, SaveMode::Insert);
        assert_eq!(state.parse(), Some(json!({"total": 12})));
    }

    #[test]
    fn test_add_starts_with_empty_object() {
        let mut state = DocEditorState::add();
        assert_eq!(state.mode, SaveMode::Insert);
        assert_eq!(state.parse(), Some(json!({})));
    }

    #[test]
    fn test_invalid_json_records_error_until_edited() {
        let mut state = DocEditorState::add();
        state.input.set_text("{\"a\": ");
        assert_eq!(state.parse(), None);
        assert!(state.error.as_deref().is_some_and(|e| e.starts_with("invalid JSON")));

        state.handle_event(&TuiEvent::Key(KeyEvent::rune('1')));
        assert!(state.error.is_none());
    }

    #[test]
    fn test_non_object_is_rejected() {
        let mut state = DocEditorState::add();
        state.input.set_text("[1, 2]");
        assert_eq!(state.parse(), None);
        assert_eq!(state.error.as_deref(), Some("document must be a JSON object"));
    }

    #[test]
    fn test_enter_breaks_line() {
        let mut state = DocEditorState::add();
        state.input.set_text("{");
        state.handle_event(&TuiEvent::Key(KeyEvent::key(Key::Enter)));
        assert_eq!(state.input.text(), "{\n");
    }

    #[test]
    fn test_ctrl_s_saves_instead_of_toggling_sidebar() {
        let dispatcher = KeyDispatcher::new();
        let (tx, rx) = mpsc::channel();
        register_keys(&dispatcher, &KeyMap::default(), &tx).unwrap();
        crate::tui::components::register_global_keys(&dispatcher, &KeyMap::default(), &tx)
            .unwrap();

        dispatcher.push_focus(ID);
        assert!(dispatcher.dispatch(KeyEvent::ctrl('s')).is_consumed());
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), [UiCommand::SaveDocument]);
    }

    #[test]
    fn test_render_shows_error() {
        let backend = TestBackend::new(60, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut state = DocEditorState::add();
        state.input.set_text("nope");
        state.parse();

        terminal
            .draw(|f| {
                let area = f.area();
                DocEditor { state: &mut state }.render(f, area);
            })
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("New document"));
        assert!(text.contains("invalid JSON"));
    }
}
