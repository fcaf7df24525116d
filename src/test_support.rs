//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::Value;

use crate::core::action::Action;
use crate::core::keys::KeyAction;
use crate::core::state::App;
use crate::store::DocumentPage;

/// Counts how many times its actions were invoked.
#[derive(Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    /// An action that bumps this counter.
    pub fn action(&self) -> KeyAction {
        let hits = Arc::clone(&self.0);
        Arc::new(move || {
            hits.fetch_add(1, Ordering::SeqCst);
        })
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Creates a test App with a page size of two.
pub fn test_app() -> App {
    App::new("test", 2)
}

/// The store's answer to whatever query `app` is waiting on.
pub fn page_loaded(app: &App, documents: Vec<Value>, total: usize) -> Action {
    let query = app.current_query().expect("a collection is selected");
    let page = DocumentPage {
        documents,
        total,
        skip: query.skip,
        limit: query.limit,
    };
    Action::DocumentsLoaded { query, page }
}
