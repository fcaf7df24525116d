//! # Keys and Bindings
//!
//! Terminal-independent key model. The TUI adapter translates crossterm events
//! into [`KeyEvent`]s; widgets describe what they listen for with [`KeyBinding`]s.
//!
//! Control chords arrive as their own key (`Key::Ctrl('s')`), printable input
//! arrives as the `Key::Rune` sentinel with the character in `KeyEvent::rune`.

use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;
use std::sync::Arc;

/// A non-printable key, or the `Rune` sentinel for printable input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Rune,
    Enter,
    Tab,
    BackTab,
    Esc,
    Backspace,
    Delete,
    Insert,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
    /// Ctrl + ASCII letter, always stored lowercase.
    Ctrl(char),
}

/// Modifier bitset reported alongside a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const SHIFT: Modifiers = Modifiers(1);
    pub const CTRL: Modifiers = Modifiers(1 << 1);
    pub const ALT: Modifiers = Modifiers(1 << 2);

    pub fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Self) -> Self::Output {
        Modifiers(self.0 | rhs.0)
    }
}

/// A single key press as seen by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub rune: Option<char>,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn key(key: Key) -> Self {
        Self {
            key,
            rune: None,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn rune(c: char) -> Self {
        Self {
            key: Key::Rune,
            rune: Some(c),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn ctrl(c: char) -> Self {
        Self {
            key: Key::Ctrl(c.to_ascii_lowercase()),
            rune: None,
            modifiers: Modifiers::CTRL,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

// ============================================================================
// Key names
// ============================================================================

/// A key name from the key map or a help legend that could not be understood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyParseError {
    Empty,
    UnknownKey(String),
    NotSingleRune(String),
}

impl fmt::Display for KeyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyParseError::Empty => write!(f, "empty key name"),
            KeyParseError::UnknownKey(name) => write!(f, "unknown key name: {name:?}"),
            KeyParseError::NotSingleRune(s) => {
                write!(f, "rune must be a single character, got {s:?}")
            }
        }
    }
}

impl std::error::Error for KeyParseError {}

/// What a parsed key name resolves to: a key, plus the rune when the key is `Rune`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyChord {
    pub key: Key,
    pub rune: Option<char>,
}

impl KeyChord {
    pub fn key(key: Key) -> Self {
        Self { key, rune: None }
    }

    pub fn rune(c: char) -> Self {
        Self {
            key: Key::Rune,
            rune: Some(c),
        }
    }

    /// Parse a single-character rune entry (`"e"`, `"/"`).
    pub fn parse_rune(s: &str) -> Result<Self, KeyParseError> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(Self::rune(c)),
            (None, _) => Err(KeyParseError::Empty),
            _ => Err(KeyParseError::NotSingleRune(s.to_string())),
        }
    }
}

impl FromStr for KeyChord {
    type Err = KeyParseError;

    /// Parse a key name such as `Enter`, `Ctrl+S`, `F5` or `Space`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.is_empty() {
            return Err(KeyParseError::Empty);
        }
        let lower = name.to_ascii_lowercase();

        if let Some(rest) = lower.strip_prefix("ctrl+").or_else(|| lower.strip_prefix("ctrl-")) {
            let mut chars = rest.chars();
            return match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphabetic() => Ok(Self::key(Key::Ctrl(c))),
                _ => Err(KeyParseError::UnknownKey(name.to_string())),
            };
        }

        if let Some(n) = lower.strip_prefix('f')
            && let Ok(n) = n.parse::<u8>()
            && (1..=12).contains(&n)
        {
            return Ok(Self::key(Key::F(n)));
        }

        let key = match lower.as_str() {
            "enter" => Key::Enter,
            "tab" => Key::Tab,
            "backtab" => Key::BackTab,
            "esc" | "escape" => Key::Esc,
            "backspace" => Key::Backspace,
            "delete" | "del" => Key::Delete,
            "insert" => Key::Insert,
            "up" => Key::Up,
            "down" => Key::Down,
            "left" => Key::Left,
            "right" => Key::Right,
            "home" => Key::Home,
            "end" => Key::End,
            "pgup" | "pageup" => Key::PageUp,
            "pgdn" | "pagedown" => Key::PageDown,
            "space" => return Ok(Self::rune(' ')),
            _ => return Err(KeyParseError::UnknownKey(name.to_string())),
        };
        Ok(Self::key(key))
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.key, self.rune) {
            (Key::Rune, Some(' ')) => f.write_str("Space"),
            (Key::Rune, Some(c)) => write!(f, "{c}"),
            (Key::Rune, None) => f.write_str("Rune"),
            (Key::Enter, _) => f.write_str("Enter"),
            (Key::Tab, _) => f.write_str("Tab"),
            (Key::BackTab, _) => f.write_str("Backtab"),
            (Key::Esc, _) => f.write_str("Esc"),
            (Key::Backspace, _) => f.write_str("Backspace"),
            (Key::Delete, _) => f.write_str("Delete"),
            (Key::Insert, _) => f.write_str("Insert"),
            (Key::Up, _) => f.write_str("Up"),
            (Key::Down, _) => f.write_str("Down"),
            (Key::Left, _) => f.write_str("Left"),
            (Key::Right, _) => f.write_str("Right"),
            (Key::Home, _) => f.write_str("Home"),
            (Key::End, _) => f.write_str("End"),
            (Key::PageUp, _) => f.write_str("PgUp"),
            (Key::PageDown, _) => f.write_str("PgDn"),
            (Key::F(n), _) => write!(f, "F{n}"),
            (Key::Ctrl(c), _) => write!(f, "Ctrl+{}", c.to_ascii_uppercase()),
        }
    }
}

// ============================================================================
// Bindings
// ============================================================================

/// Zero-argument operation run when a binding fires.
pub type KeyAction = Arc<dyn Fn() + Send + Sync>;

/// One key (or rune) owned by a component, with its help text and action.
#[derive(Clone)]
pub struct KeyBinding {
    pub key: Key,
    /// The rune to match when `key` is `Key::Rune`.
    pub rune: Option<char>,
    pub name: String,
    pub description: String,
    pub(crate) action: Option<KeyAction>,
}

impl KeyBinding {
    /// A binding with no action yet. Registering it as-is is rejected.
    pub fn new(chord: KeyChord, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: chord.key,
            rune: chord.rune,
            name: name.into(),
            description: description.into(),
            action: None,
        }
    }

    pub fn key(key: Key, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(KeyChord::key(key), name, description)
    }

    pub fn rune(c: char, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(KeyChord::rune(c), name, description)
    }

    pub fn action(mut self, action: impl Fn() + Send + Sync + 'static) -> Self {
        self.action = Some(Arc::new(action));
        self
    }

    pub fn with_action(mut self, action: KeyAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }

    pub fn chord(&self) -> KeyChord {
        KeyChord {
            key: self.key,
            rune: self.rune,
        }
    }

    /// A rune binding matches rune events carrying the same character;
    /// any other binding matches on the key alone.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        match self.key {
            Key::Rune => event.key == Key::Rune && self.rune.is_some() && event.rune == self.rune,
            key => event.key == key,
        }
    }
}

impl fmt::Debug for KeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyBinding")
            .field("key", &self.chord().to_string())
            .field("name", &self.name)
            .field("description", &self.description)
            .field("has_action", &self.action.is_some())
            .finish()
    }
}

/// A row of on-screen help: every key bound to one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    pub keys: String,
    pub description: String,
}

/// Collapse bindings sharing a `name` into one row, keeping first-seen order.
pub fn legend(bindings: &[KeyBinding]) -> Vec<LegendEntry> {
    let mut rows: Vec<(&str, LegendEntry)> = Vec::new();
    for binding in bindings {
        let label = binding.chord().to_string();
        match rows.iter_mut().find(|(name, _)| *name == binding.name) {
            Some((_, row)) => {
                row.keys.push_str(", ");
                row.keys.push_str(&label);
            }
            None => rows.push((
                &binding.name,
                LegendEntry {
                    keys: label,
                    description: binding.description.clone(),
                },
            )),
        }
    }
    rows.into_iter().map(|(_, row)| row).collect()
}
