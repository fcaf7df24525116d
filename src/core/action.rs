//! # Actions
//!
//! Everything that changes browser state becomes an `Action`.
//! User picks a collection? That's `Action::SelectCollection(ns)`.
//! The store answers? That's `Action::DocumentsLoaded { query, page }`.
//!
//! `update()` applies an action to the `App` and returns an `Effect` describing
//! the store call (if any) the TUI should spawn. No I/O happens here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```

use chrono::Local;
use log::{debug, warn};
use serde_json::Value;

use crate::core::state::App;
use crate::store::{DatabaseInfo, DocumentPage, Namespace, Query, parse_filter};

/// How a document from the editor is written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// New document (add, duplicate).
    Insert,
    /// Replace the existing document with the same `_id`.
    Replace,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    LoadDatabases,
    DatabasesLoaded(Vec<DatabaseInfo>),
    SelectCollection(Namespace),
    ApplyFilter(String),
    NextPage,
    PreviousPage,
    Refresh,
    /// Result of `query`. Dropped unless `query` is still the current one.
    DocumentsLoaded { query: Query, page: DocumentPage },
    SaveDocument { document: Value, mode: SaveMode },
    DocumentSaved(String),
    DeleteDocument(Value),
    DocumentDeleted,
    CreateCollection(Namespace),
    CollectionCreated(Namespace),
    DropCollection(Namespace),
    CollectionDropped(Namespace),
    StoreFailed(String),
    Quit,
}

/// Side effect requested by `update`, carried out by the TUI on a tokio task.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Quit,
    FetchDatabases,
    FetchDocuments(Query),
    InsertDocument(Namespace, Value),
    UpdateDocument(Namespace, Value),
    DeleteDocument(Namespace, Value),
    CreateCollection(Namespace),
    DropCollection(Namespace),
}

pub fn update(app: &mut App, action: Action) -> Effect {
    debug!("update: {:?}", action);
    match action {
        Action::LoadDatabases => {
            app.is_loading = true;
            Effect::FetchDatabases
        }
        Action::DatabasesLoaded(databases) => {
            app.is_loading = false;
            app.status_message = format!("{} databases", databases.len());
            app.databases = databases;
            Effect::None
        }
        Action::SelectCollection(namespace) => {
            app.status_message = format!("Opened {namespace}");
            app.namespace = Some(namespace);
            app.filter.clear();
            app.filter_text.clear();
            app.skip = 0;
            app.page = None;
            fetch(app)
        }
        Action::ApplyFilter(text) => match parse_filter(&text) {
            Ok(filter) => {
                app.filter = filter;
                app.filter_text = text;
                app.skip = 0;
                app.error = None;
                if app.namespace.is_none() {
                    app.status_message = "Select a collection first".to_string();
                    return Effect::None;
                }
                fetch(app)
            }
            Err(e) => {
                app.error = Some(e.to_string());
                Effect::None
            }
        },
        Action::NextPage => {
            if app.page.as_ref().is_some_and(|page| page.has_next()) {
                app.skip += app.page_size;
                fetch(app)
            } else {
                Effect::None
            }
        }
        Action::PreviousPage => {
            if app.skip > 0 {
                app.skip = app.skip.saturating_sub(app.page_size);
                fetch(app)
            } else {
                Effect::None
            }
        }
        Action::Refresh => fetch(app),
        Action::DocumentsLoaded { query, page } => {
            if app.current_query().as_ref() != Some(&query) {
                debug!("Dropping stale page for {} (skip {})", query.namespace, query.skip);
                return Effect::None;
            }
            app.is_loading = false;
            app.error = None;
            app.last_fetch = Some(Local::now());
            // A delete can leave us past the last page
            if page.documents.is_empty() && page.skip > 0 && page.total > 0 {
                app.skip = page.skip.saturating_sub(app.page_size);
                return fetch(app);
            }
            app.page = Some(page);
            Effect::None
        }
        Action::SaveDocument { document, mode } => {
            let Some(namespace) = app.namespace.clone() else {
                app.error = Some("No collection selected".to_string());
                return Effect::None;
            };
            app.is_loading = true;
            match mode {
                SaveMode::Insert => Effect::InsertDocument(namespace, document),
                SaveMode::Replace => Effect::UpdateDocument(namespace, document),
            }
        }
        Action::DocumentSaved(message) => {
            app.status_message = message;
            fetch(app)
        }
        Action::DeleteDocument(id) => {
            let Some(namespace) = app.namespace.clone() else {
                return Effect::None;
            };
            app.is_loading = true;
            Effect::DeleteDocument(namespace, id)
        }
        Action::DocumentDeleted => {
            app.status_message = "Document deleted".to_string();
            fetch(app)
        }
        Action::CreateCollection(namespace) => {
            app.is_loading = true;
            Effect::CreateCollection(namespace)
        }
        Action::CollectionCreated(namespace) => {
            app.status_message = format!("Created {namespace}");
            app.is_loading = true;
            Effect::FetchDatabases
        }
        Action::DropCollection(namespace) => {
            app.is_loading = true;
            Effect::DropCollection(namespace)
        }
        Action::CollectionDropped(namespace) => {
            app.status_message = format!("Dropped {namespace}");
            if app.namespace.as_ref() == Some(&namespace) {
                app.namespace = None;
                app.page = None;
                app.filter.clear();
                app.filter_text.clear();
                app.skip = 0;
            }
            app.is_loading = true;
            Effect::FetchDatabases
        }
        Action::StoreFailed(message) => {
            warn!("Store call failed: {}", message);
            app.is_loading = false;
            app.error = Some(message);
            Effect::None
        }
        Action::Quit => Effect::Quit,
    }
}

fn fetch(app: &mut App) -> Effect {
    match app.current_query() {
        Some(query) => {
            app.is_loading = true;
            Effect::FetchDocuments(query)
        }
        None => Effect::None,
    }
}
