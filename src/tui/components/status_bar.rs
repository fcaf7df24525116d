//! # StatusBar Component
//!
//! Bottom line: store name, selected namespace, page position, the latest
//! status or error, and when the page was fetched.
//!
//! Stateless: every field is a prop copied from `App` each frame.
//!
//! ```text
//!  memory │ shop.orders │ 1-50 of 120 │ Opened shop.orders      fetched 14:02:11
//! ```

use chrono::{DateTime, Local};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::core::state::App;
use crate::tui::component::Component;

pub struct StatusBar {
    pub store_name: String,
    pub namespace: Option<String>,
    pub page_label: Option<String>,
    pub status_message: String,
    /// Shown instead of the status message when set
    pub error: Option<String>,
    pub is_loading: bool,
    pub last_fetch: Option<DateTime<Local>>,
}

impl StatusBar {
    pub fn from_app(app: &App) -> Self {
        Self {
            store_name: app.store_name.clone(),
            namespace: app.namespace.as_ref().map(ToString::to_string),
            page_label: app.page_label(),
            status_message: app.status_message.clone(),
            error: app.error.clone(),
            is_loading: app.is_loading,
            last_fetch: app.last_fetch,
        }
    }

    fn left_spans(&self) -> Vec<Span<'_>> {
        let separator = || Span::styled(" │ ", Style::default().fg(Color::DarkGray));

        let mut spans = vec![Span::styled(
            format!(" {}", self.store_name),
            Style::default().add_modifier(Modifier::BOLD),
        )];
        if let Some(namespace) = &self.namespace {
            spans.push(separator());
            spans.push(Span::styled(namespace.as_str(), Style::default().fg(Color::Green)));
        }
        if let Some(label) = &self.page_label {
            spans.push(separator());
            spans.push(Span::raw(label.as_str()));
        }
        spans.push(separator());
        match &self.error {
            Some(error) => {
                spans.push(Span::styled(error.as_str(), Style::default().fg(Color::Red)));
            }
            None if self.is_loading => spans.push(Span::raw("Loading...")),
            None => spans.push(Span::raw(self.status_message.as_str())),
        }
        spans
    }

    fn right_text(&self) -> String {
        self.last_fetch
            .map(|at| format!("fetched {} ", at.format("%H:%M:%S")))
            .unwrap_or_default()
    }
}

impl Component for StatusBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let right = self.right_text();
        let [left_area, right_area] = Layout::horizontal([
            Constraint::Min(0),
            Constraint::Length(right.chars().count() as u16),
        ])
        .areas(area);

        frame.render_widget(Line::from(self.left_spans()), left_area);
        frame.render_widget(
            Paragraph::new(right).style(Style::default().fg(Color::DarkGray)),
            right_area,
        );
    }
}
