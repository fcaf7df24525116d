//! # Document Store
//!
//! The seam between the browser and a document database. The TUI only talks to
//! `dyn DocumentStore`; every call runs on a tokio task and reports back through
//! the action channel.
//!
//! [`MemoryStore`] is the in-process implementation, backed by a JSON data file
//! or a built-in demo dataset.

mod memory;

pub use memory::MemoryStore;

use std::fmt;

use async_trait::async_trait;
use serde_json::{Map, Value};

/// Errors that can occur during store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Database, collection, or document does not exist.
    NotFound(String),
    /// Document is not a JSON object, or lacks a required `_id`.
    InvalidDocument(String),
    /// Filter text could not be turned into a filter object.
    InvalidFilter(String),
    /// Collection name is empty or unusable.
    InvalidName(String),
    /// Collection already exists.
    AlreadyExists(String),
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(what) => write!(f, "not found: {what}"),
            StoreError::InvalidDocument(msg) => write!(f, "invalid document: {msg}"),
            StoreError::InvalidFilter(msg) => write!(f, "invalid filter: {msg}"),
            StoreError::InvalidName(msg) => write!(f, "invalid name: {msg}"),
            StoreError::AlreadyExists(what) => write!(f, "already exists: {what}"),
            StoreError::Io(e) => write!(f, "store I/O error: {e}"),
            StoreError::Parse(e) => write!(f, "store parse error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Parse(e)
    }
}

/// A database and the collections it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseInfo {
    pub name: String,
    pub collections: Vec<String>,
}

/// A `database.collection` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    pub database: String,
    pub collection: String,
}

impl Namespace {
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collection: collection.into(),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.collection)
    }
}

/// One paginated document query.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub namespace: Namespace,
    pub filter: Map<String, Value>,
    pub skip: usize,
    pub limit: usize,
}

/// A page of results plus the total number of matches.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentPage {
    pub documents: Vec<Value>,
    pub total: usize,
    pub skip: usize,
    pub limit: usize,
}

impl DocumentPage {
    pub fn has_next(&self) -> bool {
        self.skip + self.documents.len() < self.total
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short name shown in the status bar.
    fn name(&self) -> &str;

    async fn list_databases(&self) -> Result<Vec<DatabaseInfo>, StoreError>;

    async fn find(&self, query: &Query) -> Result<DocumentPage, StoreError>;

    /// Insert `document`, returning it as stored (with its `_id`).
    async fn insert_document(
        &self,
        namespace: &Namespace,
        document: Value,
    ) -> Result<Value, StoreError>;

    /// Replace the document whose `_id` matches `document["_id"]`.
    async fn update_document(&self, namespace: &Namespace, document: Value)
    -> Result<(), StoreError>;

    async fn delete_document(&self, namespace: &Namespace, id: &Value) -> Result<(), StoreError>;

    /// Create an empty collection, and its database if needed.
    async fn create_collection(&self, namespace: &Namespace) -> Result<(), StoreError>;

    /// Drop a collection and its documents. A database left empty goes too.
    async fn drop_collection(&self, namespace: &Namespace) -> Result<(), StoreError>;
}

/// Turn the query bar text into a filter object.
///
/// Empty input is the empty filter. Anything else must be a JSON object;
/// object keys may be left unquoted (`{status: "paid", meta.host: "api-1"}`).
pub fn parse_filter(text: &str) -> Result<Map<String, Value>, StoreError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Map::new());
    }
    let parsed = serde_json::from_str::<Value>(text).or_else(|strict| {
        let quoted = quote_bare_keys(text);
        if quoted == text {
            return Err(strict);
        }
        // Report the error against what the user typed
        serde_json::from_str::<Value>(&quoted).map_err(|_| strict)
    });
    match parsed {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(StoreError::InvalidFilter(format!(
            "expected an object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(StoreError::InvalidFilter(e.to_string())),
    }
}

fn is_bare_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$')
}

/// Quote identifiers that sit in key position: right after `{` or `,`, outside
/// strings, and followed by `:`.
fn quote_bare_keys(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut chars = text.char_indices().peekable();
    let mut in_string = false;
    let mut escaped = false;
    let mut key_position = false;

    while let Some((i, c)) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        if key_position && is_bare_key_char(c) {
            let mut end = i + c.len_utf8();
            while let Some(&(j, next)) = chars.peek() {
                if !is_bare_key_char(next) {
                    break;
                }
                end = j + next.len_utf8();
                chars.next();
            }
            let word = &text[i..end];
            if text[end..].trim_start().starts_with(':') {
                out.push('"');
                out.push_str(word);
                out.push('"');
            } else {
                out.push_str(word);
            }
            key_position = false;
            continue;
        }

        out.push(c);
        match c {
            '"' => {
                in_string = true;
                key_position = false;
            }
            '{' | ',' => key_position = true,
            _ if c.is_whitespace() => {}
            _ => key_position = false,
        }
    }
    out
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_filter_empty() {
        assert!(parse_filter("   ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_filter_object() {
        let filter = parse_filter(r#"{"status": "active", "age": 30}"#).unwrap();
        assert_eq!(filter.get("status"), Some(&json!("active")));
        assert_eq!(filter.len(), 2);
    }

    #[test]
    fn test_parse_filter_rejects_non_object() {
        let err = parse_filter("[1, 2]").unwrap_err();
        assert!(err.to_string().contains("expected an object, got an array"));
        assert!(matches!(parse_filter("{status:"), Err(StoreError::InvalidFilter(_))));
    }

    #[test]
    fn test_parse_filter_unquoted_keys() {
        let filter = parse_filter(r#"{status: "paid", meta.host: "api-1", total: 12}"#).unwrap();
        assert_eq!(filter.get("status"), Some(&json!("paid")));
        assert_eq!(filter.get("meta.host"), Some(&json!("api-1")));
        assert_eq!(filter.get("total"), Some(&json!(12)));

        let nested = parse_filter("{ items: { sku: \"kbd-01\" } }").unwrap();
        assert_eq!(nested.get("items"), Some(&json!({"sku": "kbd-01"})));
    }

    #[test]
    fn test_quote_bare_keys_leaves_strings_and_values_alone() {
        assert_eq!(
            quote_bare_keys(r#"{note: "a, b: c", ok: true}"#),
            r#"{"note": "a, b: c", "ok": true}"#
        );
        assert_eq!(quote_bare_keys(r#"{"done": 1}"#), r#"{"done": 1}"#);
        assert_eq!(quote_bare_keys(r#"{"esc\"aped, x: 1": 2}"#), r#"{"esc\"aped, x: 1": 2}"#);
        // Values are not keys
        assert_eq!(quote_bare_keys("{a: b}"), r#"{"a": b}"#);
    }

    #[test]
    fn test_parse_filter_unquoted_value_is_still_an_error() {
        let err = parse_filter("{status: paid}").unwrap_err();
        assert!(matches!(err, StoreError::InvalidFilter(_)));
    }

    #[test]
    fn test_page_has_next() {
        let page = DocumentPage {
            documents: vec![json!({}), json!({})],
            total: 5,
            skip: 2,
            limit: 2,
        };
        assert!(page.has_next());
        let last = DocumentPage { skip: 4, documents: vec![json!({})], ..page };
        assert!(!last.has_next());
    }

    #[test]
    fn test_namespace_display() {
        assert_eq!(Namespace::new("shop", "orders").to_string(), "shop.orders");
    }
}
