//! Key gesture bindings and resolution.
//!
//! [`InputBindings`] maps key+modifier combinations to [`InputAction`]s. The
//! input manager consults it when a `KEY_DOWN` goes unhandled. The
//! `with_defaults()` constructor installs the standard focus navigation
//! gestures (Tab, Shift+Tab, arrow keys).

use std::collections::HashMap;

use super::input::{Key, KeyEvent, Modifiers};
use crate::focus::FocusNavigation;

// ---------------------------------------------------------------------------
// InputAction
// ---------------------------------------------------------------------------

/// Action to take when a key gesture is matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    /// Move focus to the next element in tab order.
    FocusNext,
    /// Move focus to the previous element in tab order.
    FocusPrevious,
    /// Move focus spatially.
    FocusDirection(FocusNavigation),
    /// A named application action, reported back to the caller.
    Custom(String),
}

impl InputAction {
    /// The focus navigation this action performs, if any.
    pub fn navigation(&self) -> Option<FocusNavigation> {
        match self {
            Self::FocusNext => Some(FocusNavigation::Next),
            Self::FocusPrevious => Some(FocusNavigation::Previous),
            Self::FocusDirection(d) => Some(*d),
            Self::Custom(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// InputBindings
// ---------------------------------------------------------------------------

/// Registry of key gestures, mapping (Key, Modifiers) -> InputAction.
#[derive(Debug, Clone)]
pub struct InputBindings {
    bindings: HashMap<(Key, Modifiers), InputAction>,
}

impl InputBindings {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Create a registry with the standard navigation gestures.
    ///
    /// Defaults:
    /// - `Tab` -> FocusNext
    /// - `Shift+Tab` -> FocusPrevious
    /// - arrow keys -> FocusDirection
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.bind(Key::Tab, Modifiers::NONE, InputAction::FocusNext);
        registry.bind(Key::Tab, Modifiers::SHIFT, InputAction::FocusPrevious);
        for (key, direction) in [
            (Key::Up, FocusNavigation::Up),
            (Key::Down, FocusNavigation::Down),
            (Key::Left, FocusNavigation::Left),
            (Key::Right, FocusNavigation::Right),
        ] {
            registry.bind(key, Modifiers::NONE, InputAction::FocusDirection(direction));
        }
        registry
    }

    /// Add or replace a binding.
    pub fn bind(&mut self, key: Key, modifiers: Modifiers, action: InputAction) {
        self.bindings.insert((key, modifiers), action);
    }

    /// Remove a binding. Returns the action that was bound.
    pub fn unbind(&mut self, key: Key, modifiers: Modifiers) -> Option<InputAction> {
        self.bindings.remove(&(key, modifiers))
    }

    /// Look up the action for a key event. Modifiers must match exactly.
    pub fn resolve(&self, event: &KeyEvent) -> Option<&InputAction> {
        self.bindings.get(&(event.key, event.modifiers))
    }

    /// Number of registered bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Default for InputBindings {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
