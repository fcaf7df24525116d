//! # Focus Stack
//!
//! Tracks which logical UI unit currently owns keyboard input.
//!
//! ```text
//! push(Sidebar) → push(DocViewer) → pop() → current() == Sidebar
//! ```
//!
//! The stack only changes through `push`/`pop`. Neither operation can fail:
//! re-pushing the current top is a no-op, and popping an empty stack does nothing.

use std::borrow::Cow;
use std::fmt;

/// Opaque identifier naming a focusable UI unit.
///
/// Identity is the string itself; two ids are the same component iff their
/// names are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(Cow<'static, str>);

impl ComponentId {
    /// Bindings registered under this id apply regardless of focus.
    pub const GLOBAL: ComponentId = ComponentId::from_static("Global");

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_global(&self) -> bool {
        *self == Self::GLOBAL
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for ComponentId {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

/// Ordered stack of focused components. The last entry is current.
#[derive(Debug, Default, Clone)]
pub struct FocusStack {
    stack: Vec<ComponentId>,
}

impl FocusStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `component` unless it is already on top.
    ///
    /// Returns `true` if the stack grew.
    pub fn push(&mut self, component: ComponentId) -> bool {
        if self.stack.last() == Some(&component) {
            return false;
        }
        self.stack.push(component);
        true
    }

    /// Remove the top entry. Returns it, or `None` if the stack was empty.
    pub fn pop(&mut self) -> Option<ComponentId> {
        self.stack.pop()
    }

    /// The currently focused component, or `None` when nothing has focus.
    pub fn current(&self) -> Option<&ComponentId> {
        self.stack.last()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn contains(&self, component: &ComponentId) -> bool {
        self.stack.contains(component)
    }
}
