use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use crate::core::focus::ComponentId;
use crate::core::state::App;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{
    CollectionInput, Content, DocEditor, DocViewer, FilterBar, Help, History, QueryBar, Sidebar,
    StatusBar, content, filter_bar, query_bar, sidebar,
};

/// Sidebar width in columns.
const SIDEBAR_WIDTH: u16 = 28;

/// Draw one frame.
///
/// ```text
/// ┌ Databases ─┐┌ Filter ───────────────────┐
/// │ ▾ shop     ││ {"status": "pending"}     │
/// │   orders   │└───────────────────────────┘
/// │            │┌ shop.orders (1-2 of 2) ───┐
/// │            ││ {"_id":"o2",...}          │
/// └────────────┘└───────────────────────────┘
///  memory │ shop.orders │ 1-2 of 2 │ ...
/// ```
///
/// Overlays (viewer, editor, collection prompt, filter history, help) draw
/// over the panels in that order.
pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, focus: Option<&ComponentId>) {
    use Constraint::{Length, Min};
    let is_focused = |id: &ComponentId| focus == Some(id);

    let full_area = frame.area();
    let [main_area, status_area] = Layout::vertical([Min(0), Length(1)]).areas(full_area);

    let right_area = if tui.show_sidebar {
        let [mut sidebar_area, right_area] =
            Layout::horizontal([Length(SIDEBAR_WIDTH), Min(0)]).areas(main_area);
        if tui.filter_bar.visible {
            let [bar_area, tree_area] =
                Layout::vertical([Length(filter_bar::HEIGHT), Min(0)]).areas(sidebar_area);
            FilterBar {
                state: &mut tui.filter_bar,
                focused: is_focused(&filter_bar::ID),
            }
            .render(frame, bar_area);
            sidebar_area = tree_area;
        }
        Sidebar {
            state: &mut tui.sidebar,
            focused: is_focused(&sidebar::ID),
            active: app.namespace.as_ref(),
        }
        .render(frame, sidebar_area);
        right_area
    } else {
        main_area
    };

    let show_query_bar = tui.query_bar.visible || !app.filter_text.is_empty();
    let content_area = if show_query_bar {
        let [bar_area, content_area] =
            Layout::vertical([Length(query_bar::HEIGHT), Min(0)]).areas(right_area);
        QueryBar {
            state: &mut tui.query_bar,
            focused: is_focused(&query_bar::ID),
        }
        .render(frame, bar_area);
        content_area
    } else {
        right_area
    };

    Content {
        state: &mut tui.content,
        documents: app.documents(),
        namespace: app.namespace.as_ref(),
        page_label: app.page_label(),
        focused: is_focused(&content::ID),
    }
    .render(frame, content_area);

    StatusBar::from_app(app).render(frame, status_area);

    if let Some(viewer) = tui.viewer.as_mut() {
        DocViewer { state: viewer }.render(frame, main_area);
    }
    if let Some(editor) = tui.editor.as_mut() {
        DocEditor { state: editor }.render(frame, main_area);
    }
    if let Some(input) = tui.collection_input.as_mut() {
        CollectionInput { state: input }.render(frame, main_area);
    }
    if let Some(history) = tui.history.as_mut() {
        History { state: history }.render(frame, main_area);
    }
    if let Some(help) = tui.help.as_mut() {
        Help { state: help }.render(frame, full_area);
    }
}
