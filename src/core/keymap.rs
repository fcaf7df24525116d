//! # Key Map
//!
//! User-configurable key assignments, read from the `[keys.*]` tables of the
//! config file. Every operation is a [`KeySpec`]: named keys, runes, and the
//! description shown in help.
//!
//! Sections are sparse: an operation missing from the file keeps its default.
//!
//! ```toml
//! [keys.content]
//! edit_document = { runes = ["i"], description = "Edit document" }
//! next_page = { keys = ["Ctrl+F", "PgDn"], description = "Next page" }
//! ```

use serde::{Deserialize, Serialize};

use crate::core::focus::ComponentId;
use crate::core::keys::{KeyAction, KeyBinding, KeyChord, KeyParseError};
use crate::core::registry::BindingError;

/// Keys and runes that trigger one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct KeySpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub runes: Vec<String>,
    #[serde(default)]
    pub description: String,
}

impl KeySpec {
    pub fn keys(keys: &[&str], description: &str) -> Self {
        Self {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            runes: Vec::new(),
            description: description.to_string(),
        }
    }

    pub fn runes(runes: &[&str], description: &str) -> Self {
        Self {
            keys: Vec::new(),
            runes: runes.iter().map(|r| r.to_string()).collect(),
            description: description.to_string(),
        }
    }

    pub fn and_runes(mut self, runes: &[&str]) -> Self {
        self.runes.extend(runes.iter().map(|r| r.to_string()));
        self
    }

    /// Expand into one binding per key and rune, keys first, all sharing `action`.
    pub fn bindings(
        &self,
        component: &ComponentId,
        name: &str,
        action: &KeyAction,
    ) -> Result<Vec<KeyBinding>, BindingError> {
        let invalid = |source: KeyParseError| BindingError::InvalidKey {
            component: component.clone(),
            name: name.to_string(),
            source,
        };

        let mut chords = Vec::with_capacity(self.keys.len() + self.runes.len());
        for key in &self.keys {
            chords.push(key.parse::<KeyChord>().map_err(invalid)?);
        }
        for rune in &self.runes {
            chords.push(KeyChord::parse_rune(rune).map_err(invalid)?);
        }

        Ok(chords
            .into_iter()
            .map(|chord| {
                KeyBinding::new(chord, name, self.description.clone()).with_action(action.clone())
            })
            .collect())
    }
}

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct KeyMap {
    pub global: GlobalKeys,
    pub root: RootKeys,
    pub sidebar: SidebarKeys,
    pub content: ContentKeys,
    pub query_bar: QueryBarKeys,
    pub filter_bar: FilterBarKeys,
    pub collection_input: CollectionInputKeys,
    pub history: HistoryKeys,
    pub viewer: ViewerKeys,
    pub editor: EditorKeys,
    pub help: HelpKeys,
}

/// Active under any focus.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GlobalKeys {
    pub quit: KeySpec,
    pub toggle_help: KeySpec,
    pub toggle_sidebar: KeySpec,
}

impl Default for GlobalKeys {
    fn default() -> Self {
        Self {
            quit: KeySpec::keys(&["Ctrl+C"], "Quit"),
            toggle_help: KeySpec::keys(&["Ctrl+K"], "Toggle help"),
            toggle_sidebar: KeySpec::keys(&["Ctrl+S"], "Toggle sidebar"),
        }
    }
}

/// Shared by both main panels.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RootKeys {
    pub focus_next: KeySpec,
}

impl Default for RootKeys {
    fn default() -> Self {
        Self {
            focus_next: KeySpec::keys(&["Tab", "Backtab"], "Focus next panel"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SidebarKeys {
    pub open: KeySpec,
    pub filter_bar: KeySpec,
    pub expand_all: KeySpec,
    pub collapse_all: KeySpec,
    pub toggle_expand: KeySpec,
    pub add_collection: KeySpec,
    pub delete_collection: KeySpec,
    pub refresh: KeySpec,
}

impl Default for SidebarKeys {
    fn default() -> Self {
        Self {
            open: KeySpec::keys(&["Enter", "Space"], "Open database or collection"),
            filter_bar: KeySpec::runes(&["/"], "Filter databases"),
            expand_all: KeySpec::runes(&["E"], "Expand all"),
            collapse_all: KeySpec::runes(&["W"], "Collapse all"),
            toggle_expand: KeySpec::runes(&["T"], "Toggle expand"),
            add_collection: KeySpec::runes(&["A"], "Add collection"),
            delete_collection: KeySpec::keys(&["Ctrl+D"], "Delete collection (press twice)"),
            refresh: KeySpec::keys(&["Ctrl+R"], "Reload databases"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ContentKeys {
    pub peek_document: KeySpec,
    pub view_document: KeySpec,
    pub edit_document: KeySpec,
    pub add_document: KeySpec,
    pub duplicate_document: KeySpec,
    pub delete_document: KeySpec,
    pub refresh: KeySpec,
    pub focus_query: KeySpec,
    pub next_page: KeySpec,
    pub previous_page: KeySpec,
}

impl Default for ContentKeys {
    fn default() -> Self {
        Self {
            peek_document: KeySpec::keys(&["Enter"], "Peek document").and_runes(&["p"]),
            view_document: KeySpec::runes(&["v"], "View document full screen"),
            edit_document: KeySpec::runes(&["e"], "Edit document"),
            add_document: KeySpec::runes(&["a"], "Add document"),
            duplicate_document: KeySpec::runes(&["d"], "Duplicate document"),
            delete_document: KeySpec::keys(&["Ctrl+D"], "Delete document (press twice)"),
            refresh: KeySpec::keys(&["Ctrl+R"], "Refresh"),
            focus_query: KeySpec::runes(&["/"], "Filter documents"),
            next_page: KeySpec::keys(&["Ctrl+N"], "Next page"),
            previous_page: KeySpec::keys(&["Ctrl+B"], "Previous page"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct QueryBarKeys {
    pub apply: KeySpec,
    pub clear: KeySpec,
    pub show_history: KeySpec,
    pub close: KeySpec,
}

impl Default for QueryBarKeys {
    fn default() -> Self {
        Self {
            apply: KeySpec::keys(&["Enter"], "Apply filter"),
            clear: KeySpec::keys(&["Ctrl+D"], "Clear filter"),
            show_history: KeySpec::keys(&["Ctrl+Y"], "Show filter history"),
            close: KeySpec::keys(&["Esc"], "Close filter bar"),
        }
    }
}

/// Filter over the database tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterBarKeys {
    pub apply: KeySpec,
    pub close: KeySpec,
}

impl Default for FilterBarKeys {
    fn default() -> Self {
        Self {
            apply: KeySpec::keys(&["Enter"], "Filter databases"),
            close: KeySpec::keys(&["Esc"], "Close filter bar"),
        }
    }
}

/// Name prompt for a new collection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CollectionInputKeys {
    pub create: KeySpec,
    pub cancel: KeySpec,
}

impl Default for CollectionInputKeys {
    fn default() -> Self {
        Self {
            create: KeySpec::keys(&["Enter"], "Create collection"),
            cancel: KeySpec::keys(&["Esc"], "Cancel"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HistoryKeys {
    pub select: KeySpec,
    pub close: KeySpec,
}

impl Default for HistoryKeys {
    fn default() -> Self {
        Self {
            select: KeySpec::keys(&["Enter"], "Use filter"),
            close: KeySpec::keys(&["Esc"], "Close history"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ViewerKeys {
    pub close: KeySpec,
    pub edit: KeySpec,
}

impl Default for ViewerKeys {
    fn default() -> Self {
        Self {
            close: KeySpec::keys(&["Esc"], "Close").and_runes(&["q"]),
            edit: KeySpec::runes(&["e"], "Edit document"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EditorKeys {
    pub save: KeySpec,
    pub cancel: KeySpec,
}

impl Default for EditorKeys {
    fn default() -> Self {
        Self {
            save: KeySpec::keys(&["Ctrl+S"], "Save document"),
            cancel: KeySpec::keys(&["Esc"], "Discard changes"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HelpKeys {
    pub close: KeySpec,
}

impl Default for HelpKeys {
    fn default() -> Self {
        Self {
            close: KeySpec::keys(&["Esc"], "Close help"),
        }
    }
}
