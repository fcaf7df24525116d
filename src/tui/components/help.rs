//! # Help Component
//!
//! Key legend overlay. Shows the bindings of the component that had focus
//! when help was opened, followed by the Global bindings.

use std::sync::mpsc::Sender;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Padding, Paragraph};

use crate::core::dispatch::{KeyDispatcher, LegendSection};
use crate::core::focus::ComponentId;
use crate::core::keymap::KeyMap;
use crate::core::registry::BindingError;
use crate::tui::command::{Bindings, UiCommand};
use crate::tui::component::{Component, EventHandler, Movement};
use crate::tui::components::centered_rect;
use crate::tui::event::TuiEvent;

pub const ID: ComponentId = ComponentId::from_static("Help");

pub fn register_keys(
    dispatcher: &KeyDispatcher,
    keys: &KeyMap,
    tx: &Sender<UiCommand>,
) -> Result<(), BindingError> {
    Bindings::new(ID, tx)
        .bind("close", &keys.help.close, UiCommand::CloseHelp)?
        .register(dispatcher)
}

pub struct HelpState {
    pub sections: Vec<LegendSection>,
    scroll: u16,
}

impl HelpState {
    pub fn new(sections: Vec<LegendSection>) -> Self {
        Self { sections, scroll: 0 }
    }

    fn lines(&self) -> Vec<Line<'_>> {
        let key_width = self
            .sections
            .iter()
            .flat_map(|section| &section.entries)
            .map(|entry| entry.keys.chars().count())
            .max()
            .unwrap_or(0);

        let mut lines = Vec::new();
        for (i, section) in self.sections.iter().enumerate() {
            if i > 0 {
                lines.push(Line::default());
            }
            lines.push(Line::styled(
                section.component.to_string(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ));
            for entry in &section.entries {
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("  {:<key_width$}  ", entry.keys),
                        Style::default().fg(Color::Cyan),
                    ),
                    Span::raw(entry.description.as_str()),
                ]));
            }
        }
        lines
    }
}

impl EventHandler for HelpState {
    /// New scroll offset.
    type Event = u16;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        let TuiEvent::Key(key) = event else {
            return None;
        };
        let rows = self.lines().len();
        let next = Movement::from_key(key)?.apply(self.scroll as usize, rows, 10)?;
        let next = u16::try_from(next).unwrap_or(u16::MAX);
        (next != self.scroll).then(|| {
            self.scroll = next;
            next
        })
    }
}

/// Transient render wrapper for the help overlay.
pub struct Help<'a> {
    pub state: &'a mut HelpState,
}

impl Component for Help<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let overlay = centered_rect(60, 70, area);
        frame.render_widget(Clear, overlay);

        let block = Block::bordered()
            .title(" Keys ")
            .border_style(Style::default().fg(Color::DarkGray))
            .padding(Padding::horizontal(1));

        let paragraph = Paragraph::new(self.state.lines())
            .block(block)
            .scroll((self.state.scroll, 0));
        frame.render_widget(paragraph, overlay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::keys::{Key, KeyEvent, LegendEntry};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn sections() -> Vec<LegendSection> {
        vec![
            LegendSection {
                component: ComponentId::from_static("DocEditor"),
                entries: vec![
                    LegendEntry {
                        keys: "Ctrl+S".to_string(),
                        description: "Save document".to_string(),
                    },
                    LegendEntry {
                        keys: "Esc".to_string(),
                        description: "Discard changes".to_string(),
                    },
                ],
            },
            LegendSection {
                component: ComponentId::GLOBAL,
                entries: vec![LegendEntry {
                    keys: "Ctrl+C".to_string(),
                    description: "Quit".to_string(),
                }],
            },
        ]
    }

    #[test]
    fn test_lines_group_by_component() {
        let state = HelpState::new(sections());
        // header, 2 entries, blank, header, 1 entry
        assert_eq!(state.lines().len(), 6);
    }

    #[test]
    fn test_scroll_is_bounded() {
        let mut state = HelpState::new(sections());
        assert_eq!(state.handle_event(&TuiEvent::Key(KeyEvent::key(Key::Up))), None);
        assert_eq!(state.handle_event(&TuiEvent::Key(KeyEvent::key(Key::End))), Some(5));
        assert_eq!(state.handle_event(&TuiEvent::Key(KeyEvent::rune('j'))), None);
    }

    #[test]
    fn test_render_lists_focused_then_global() {
        let backend = TestBackend::new(80, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut state = HelpState::new(sections());

        terminal
            .draw(|f| {
                let area = f.area();
                Help { state: &mut state }.render(f, area);
            })
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        let editor = text.find("DocEditor").unwrap();
        let global = text.find("Global").unwrap();
        assert!(editor < global);
        assert!(text.contains("Save document"));
        assert!(text.contains("Ctrl+C"));
    }
}
