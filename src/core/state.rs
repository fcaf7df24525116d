//! # Application State
//!
//! Browser state for docterm. Domain data only; presentation state (selection
//! cursors, open modals, text buffers) lives in the `tui` module.
//!
//! ```text
//! App
//! ├── store_name: String               // shown in the status bar
//! ├── databases: Vec<DatabaseInfo>     // sidebar contents
//! ├── namespace: Option<Namespace>     // selected collection
//! ├── filter_text / filter             // active query bar filter
//! ├── page: Option<DocumentPage>       // current page of documents
//! ├── page_size, skip                  // pagination
//! ├── is_loading: bool                 // a store call is in flight
//! ├── status_message, error            // status bar text
//! └── last_fetch: Option<DateTime>     // when the page was loaded
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use chrono::{DateTime, Local};
use serde_json::{Map, Value};

use crate::store::{DatabaseInfo, DocumentPage, Namespace, Query};

pub const DEFAULT_PAGE_SIZE: usize = 50;

pub struct App {
    pub store_name: String,
    pub databases: Vec<DatabaseInfo>,
    pub namespace: Option<Namespace>,
    pub filter_text: String,
    pub filter: Map<String, Value>,
    pub page: Option<DocumentPage>,
    pub page_size: usize,
    pub skip: usize,
    pub is_loading: bool,
    pub status_message: String,
    pub error: Option<String>,
    pub last_fetch: Option<DateTime<Local>>,
}

impl App {
    pub fn new(store_name: impl Into<String>, page_size: usize) -> Self {
        Self {
            store_name: store_name.into(),
            databases: Vec::new(),
            namespace: None,
            filter_text: String::new(),
            filter: Map::new(),
            page: None,
            page_size: page_size.max(1),
            skip: 0,
            is_loading: false,
            status_message: String::from("Welcome to docterm!"),
            error: None,
            last_fetch: None,
        }
    }

    /// Query for the current namespace, filter, and page offset.
    pub fn current_query(&self) -> Option<Query> {
        self.namespace.as_ref().map(|namespace| Query {
            namespace: namespace.clone(),
            filter: self.filter.clone(),
            skip: self.skip,
            limit: self.page_size,
        })
    }

    pub fn documents(&self) -> &[Value] {
        self.page
            .as_ref()
            .map(|page| page.documents.as_slice())
            .unwrap_or_default()
    }

    /// `"1-50 of 120"`, or `None` before the first page arrives.
    pub fn page_label(&self) -> Option<String> {
        let page = self.page.as_ref()?;
        if page.documents.is_empty() {
            return Some(format!("0 of {}", page.total));
        }
        Some(format!(
            "{}-{} of {}",
            page.skip + 1,
            page.skip + page.documents.len(),
            page.total
        ))
    }
}
