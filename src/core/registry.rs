//! # Binding Registry
//!
//! Per-component, append-only lists of key bindings plus the reserved
//! [`ComponentId::GLOBAL`] list. Registration order is the dispatch tie-break:
//! when two bindings of one component match the same key, the first one
//! registered wins and the later one is shadowed.

use std::collections::HashMap;
use std::fmt;

use crate::core::focus::ComponentId;
use crate::core::keys::{KeyBinding, KeyEvent, KeyParseError};

/// A binding that can never work as configured. Raised at registration time.
#[derive(Debug)]
pub enum BindingError {
    /// The binding has no action attached.
    MissingAction { component: ComponentId, name: String },
    /// A key map entry named a key that does not exist.
    InvalidKey {
        component: ComponentId,
        name: String,
        source: KeyParseError,
    },
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingError::MissingAction { component, name } => {
                write!(f, "key binding '{name}' for {component} has no action")
            }
            BindingError::InvalidKey {
                component,
                name,
                source,
            } => write!(f, "key binding '{name}' for {component}: {source}"),
        }
    }
}

impl std::error::Error for BindingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BindingError::InvalidKey { source, .. } => Some(source),
            BindingError::MissingAction { .. } => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct BindingRegistry {
    bindings: HashMap<ComponentId, Vec<KeyBinding>>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject a binding that could never fire.
    pub fn validate(component: &ComponentId, binding: &KeyBinding) -> Result<(), BindingError> {
        if binding.has_action() {
            Ok(())
        } else {
            Err(BindingError::MissingAction {
                component: component.clone(),
                name: binding.name.clone(),
            })
        }
    }

    /// Append `binding` to the list for `component`.
    pub fn register(
        &mut self,
        component: ComponentId,
        binding: KeyBinding,
    ) -> Result<(), BindingError> {
        Self::validate(&component, &binding)?;
        self.bindings.entry(component).or_default().push(binding);
        Ok(())
    }

    /// Bindings for `component` in registration order. Empty if none.
    pub fn bindings_for(&self, component: &ComponentId) -> &[KeyBinding] {
        self.bindings
            .get(component)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn global_bindings(&self) -> &[KeyBinding] {
        self.bindings_for(&ComponentId::GLOBAL)
    }

    /// First binding of `component` matching `event`.
    pub fn find(&self, component: &ComponentId, event: &KeyEvent) -> Option<&KeyBinding> {
        self.bindings_for(component)
            .iter()
            .find(|binding| binding.matches(event))
    }

    /// Total number of bindings across all components.
    pub fn len(&self) -> usize {
        self.bindings.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
