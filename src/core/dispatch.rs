//! # Key Dispatcher
//!
//! Process-wide service that owns the [`FocusStack`] and the [`BindingRegistry`]
//! and routes every key event to at most one action.
//!
//! ```text
//!   KeyEvent
//!      │
//!      ▼
//!  current focus ──► bindings_for(current) ──match──► action()   Consumed
//!      │                    │ no match
//!      │                    ▼
//!      └──────────► global_bindings() ─────match──► action()   Consumed
//!                           │ no match
//!                           ▼
//!                    PassThrough(event)  → focused widget's default handling
//! ```
//!
//! Both structures sit behind a single `RwLock`: focus changes and registration
//! take the write side, dispatch and help rendering take the read side. The
//! matching action is cloned out and run after the lock is released, so an
//! action may push or pop focus (or register more keys) itself.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, trace};

use crate::core::focus::{ComponentId, FocusStack};
use crate::core::keys::{KeyAction, KeyBinding, KeyEvent, LegendEntry, legend};
use crate::core::registry::{BindingError, BindingRegistry};

/// Result of routing one key event.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// An action fired; the event must not reach the focused widget.
    Consumed,
    /// Nothing matched; hand the event to the focused widget unchanged.
    PassThrough(KeyEvent),
}

impl DispatchOutcome {
    pub fn is_consumed(&self) -> bool {
        matches!(self, DispatchOutcome::Consumed)
    }
}

/// Help legend for one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendSection {
    pub component: ComponentId,
    pub entries: Vec<LegendEntry>,
}

#[derive(Debug, Default)]
struct DispatchState {
    focus: FocusStack,
    registry: BindingRegistry,
}

#[derive(Debug, Default)]
pub struct KeyDispatcher {
    state: RwLock<DispatchState>,
}

impl KeyDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, DispatchState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, DispatchState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ------------------------------------------------------------------------
    // Focus
    // ------------------------------------------------------------------------

    pub fn push_focus(&self, component: ComponentId) {
        let mut state = self.write();
        let label = component.to_string();
        if state.focus.push(component) {
            debug!("Focus pushed: {} (depth={})", label, state.focus.depth());
        }
    }

    pub fn pop_focus(&self) -> Option<ComponentId> {
        let mut state = self.write();
        let popped = state.focus.pop();
        if let Some(ref component) = popped {
            debug!("Focus popped: {} (depth={})", component, state.focus.depth());
        }
        popped
    }

    /// Replace the top of the stack, e.g. when moving between side-by-side panels.
    pub fn switch_focus(&self, component: ComponentId) {
        let mut state = self.write();
        state.focus.pop();
        let label = component.to_string();
        state.focus.push(component);
        debug!("Focus switched to {} (depth={})", label, state.focus.depth());
    }

    pub fn current_focus(&self) -> Option<ComponentId> {
        self.read().focus.current().cloned()
    }

    pub fn focus_depth(&self) -> usize {
        self.read().focus.depth()
    }

    pub fn is_focused(&self, component: &ComponentId) -> bool {
        self.read().focus.current() == Some(component)
    }

    // ------------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------------

    pub fn register(
        &self,
        component: ComponentId,
        binding: KeyBinding,
    ) -> Result<(), BindingError> {
        let mut state = self.write();
        debug!("Registering {} -> {:?}", component, binding);
        state.registry.register(component, binding)
    }

    /// Register a component's whole key set at once.
    ///
    /// Every binding is validated before any is added, so a rejected batch
    /// leaves the registry unchanged.
    pub fn register_all(
        &self,
        component: ComponentId,
        bindings: impl IntoIterator<Item = KeyBinding>,
    ) -> Result<(), BindingError> {
        let bindings: Vec<KeyBinding> = bindings.into_iter().collect();
        for binding in &bindings {
            BindingRegistry::validate(&component, binding)?;
        }

        let mut state = self.write();
        debug!("Registering {} bindings for {}", bindings.len(), component);
        for binding in bindings {
            state.registry.register(component.clone(), binding)?;
        }
        Ok(())
    }

    pub fn bindings_for(&self, component: &ComponentId) -> Vec<KeyBinding> {
        self.read().registry.bindings_for(component).to_vec()
    }

    pub fn global_bindings(&self) -> Vec<KeyBinding> {
        self.read().registry.global_bindings().to_vec()
    }

    /// Legend for `component` followed by the Global legend.
    ///
    /// Sections with no bindings are left out.
    pub fn legend(&self, component: Option<&ComponentId>) -> Vec<LegendSection> {
        let global = ComponentId::GLOBAL;
        let state = self.read();
        component
            .filter(|c| !c.is_global())
            .into_iter()
            .chain(std::iter::once(&global))
            .map(|c| LegendSection {
                component: c.clone(),
                entries: legend(state.registry.bindings_for(c)),
            })
            .filter(|section| !section.entries.is_empty())
            .collect()
    }

    // ------------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------------

    /// Route `event` to the focused component's bindings, then Global.
    pub fn dispatch(&self, event: KeyEvent) -> DispatchOutcome {
        let Some((component, name, action)) = self.resolve(&event) else {
            trace!("Key {:?} not bound, passing through", event.key);
            return DispatchOutcome::PassThrough(event);
        };
        trace!("Key {:?} -> {}::{}", event.key, component, name);
        action();
        DispatchOutcome::Consumed
    }

    fn resolve(&self, event: &KeyEvent) -> Option<(ComponentId, String, KeyAction)> {
        let global = ComponentId::GLOBAL;
        let state = self.read();
        let local = state
            .focus
            .current()
            .and_then(|current| Some((current, state.registry.find(current, event)?)));
        let (component, binding) = match local {
            Some(hit) => hit,
            None => (&global, state.registry.find(&global, event)?),
        };
        let action = binding.action.clone()?;
        Some((component.clone(), binding.name.clone(), action))
    }
}
