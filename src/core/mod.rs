//! # Core Application Logic
//!
//! Everything in docterm that knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌──────────────────────────┐
//!                    │          CORE            │
//!                    │                          │
//!                    │  • focus / keys          │
//!                    │  • registry / dispatch   │
//!                    │  • keymap / config       │
//!                    │  • state / action        │
//!                    │                          │
//!                    │  No terminal. No store.  │
//!                    └────────────┬─────────────┘
//!                                 │
//!                 ┌───────────────┴───────────────┐
//!                 ▼                               ▼
//!          ┌────────────┐                  ┌────────────┐
//!          │    TUI     │                  │   Store    │
//!          │  Adapter   │                  │ (effects)  │
//!          │ (ratatui)  │                  │            │
//!          └────────────┘                  └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`focus`]: `FocusStack` — which component owns keyboard input
//! - [`keys`]: `KeyEvent`, `KeyBinding` — the terminal-independent key model
//! - [`registry`]: `BindingRegistry` — per-component ordered bindings
//! - [`dispatch`]: `KeyDispatcher` — the shared service routing each key press
//! - [`keymap`]: `KeyMap` — user-configurable key assignments
//! - [`config`]: config file loading and resolution
//! - [`state`]: the `App` struct — browser state in one place
//! - [`action`]: the `Action` enum and the `update()` reducer

pub mod action;
pub mod config;
pub mod dispatch;
pub mod focus;
pub mod keymap;
pub mod keys;
pub mod registry;
pub mod state;

pub use dispatch::{DispatchOutcome, KeyDispatcher};
pub use focus::ComponentId;
pub use keys::{Key, KeyBinding, KeyEvent, Modifiers};
