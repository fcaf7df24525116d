use ratatui::Frame;
use ratatui::layout::Rect;

use crate::core::keys::{Key, KeyEvent};

/// A reusable UI component.
///
/// Components receive data via props (struct fields), may borrow persistent
/// state, and render to a `Frame` within a given `Rect`.
///
/// `render` takes `&mut self` so components can update presentation state
/// (scroll offsets, cached widths) during the render pass.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// A component with default handling for keys no binding consumed.
///
/// The dispatcher sees every key first; only `PassThrough` events reach
/// `handle_event`, and only for the focused component.
pub trait EventHandler {
    /// The type of high-level event this component emits.
    type Event;

    fn handle_event(&mut self, event: &super::event::TuiEvent) -> Option<Self::Event>;
}

/// List navigation shared by the sidebar and the document list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Up,
    Down,
    PageUp,
    PageDown,
    First,
    Last,
}

impl Movement {
    /// Arrow keys, Home/End, PgUp/PgDn and vi-style `j`/`k`/`g`/`G`.
    pub fn from_key(event: &KeyEvent) -> Option<Self> {
        match (event.key, event.rune) {
            (Key::Up, _) | (Key::Rune, Some('k')) => Some(Movement::Up),
            (Key::Down, _) | (Key::Rune, Some('j')) => Some(Movement::Down),
            (Key::PageUp, _) => Some(Movement::PageUp),
            (Key::PageDown, _) => Some(Movement::PageDown),
            (Key::Home, _) | (Key::Rune, Some('g')) => Some(Movement::First),
            (Key::End, _) | (Key::Rune, Some('G')) => Some(Movement::Last),
            _ => None,
        }
    }

    /// Apply to a selection in a list of `len` rows, `page` rows per screen.
    /// Returns the new index, or `None` when the list is empty.
    pub fn apply(self, selected: usize, len: usize, page: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let last = len - 1;
        let page = page.max(1);
        let next = match self {
            Movement::Up => selected.saturating_sub(1),
            Movement::Down => selected.saturating_add(1),
            Movement::PageUp => selected.saturating_sub(page),
            Movement::PageDown => selected.saturating_add(page),
            Movement::First => 0,
            Movement::Last => last,
        };
        Some(next.min(last))
    }
}
