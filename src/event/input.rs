//! Platform input records.
//!
//! Defines [`InputEvent`] and the pointer, key and character records a
//! platform layer feeds into the input manager. Positions are in window
//! coordinates (logical pixels).

use std::ops::{BitAnd, BitOr};

use crate::geometry::Point;

// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

/// Keyboard key, independent of any platform key code table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Space,
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
    /// A key without a named variant, by platform key code.
    Other(u32),
}

// ---------------------------------------------------------------------------
// Modifiers
// ---------------------------------------------------------------------------

/// Modifier key bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(pub u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const SHIFT: Modifiers = Modifiers(1);
    pub const CTRL: Modifiers = Modifiers(2);
    pub const ALT: Modifiers = Modifiers(4);
    pub const META: Modifiers = Modifiers(8);

    /// Check whether `self` contains all the bits in `other`.
    pub fn contains(self, other: Modifiers) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check whether no modifier bits are set.
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

impl BitAnd for Modifiers {
    type Output = Modifiers;
    fn bitand(self, rhs: Self) -> Self::Output {
        Modifiers(self.0 & rhs.0)
    }
}

// ---------------------------------------------------------------------------
// KeyEvent / CharEvent
// ---------------------------------------------------------------------------

/// Key press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    Down,
    Up,
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub action: KeyAction,
    pub key: Key,
    pub scan_code: u32,
    pub modifiers: Modifiers,
    /// Auto-repeat of a held key.
    pub repeat: bool,
}

impl KeyEvent {
    pub fn down(key: Key, modifiers: Modifiers) -> Self {
        Self {
            action: KeyAction::Down,
            key,
            scan_code: 0,
            modifiers,
            repeat: false,
        }
    }

    pub fn up(key: Key, modifiers: Modifiers) -> Self {
        Self {
            action: KeyAction::Up,
            ..Self::down(key, modifiers)
        }
    }
}

/// A character produced by the keyboard layout or an input method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CharEvent {
    pub codepoint: char,
    pub modifiers: Modifiers,
}

// ---------------------------------------------------------------------------
// PointerButton / PointerAction / PointerEvent
// ---------------------------------------------------------------------------

/// Pointer button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PointerButton {
    #[default]
    Left,
    Right,
    Middle,
    Other(u8),
}

/// Pointer action kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerAction {
    Move,
    Down,
    Up,
    /// The pointer entered the surface.
    Enter,
    /// The pointer left the surface.
    Leave,
    Wheel,
}

/// A pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub action: PointerAction,
    pub position: Point,
    pub pointer_id: u32,
    pub button: PointerButton,
    pub modifiers: Modifiers,
    /// Scroll amount for [`PointerAction::Wheel`].
    pub wheel_delta: Point,
}

impl PointerEvent {
    pub fn new(action: PointerAction, position: Point) -> Self {
        Self {
            action,
            position,
            pointer_id: 0,
            button: PointerButton::Left,
            modifiers: Modifiers::NONE,
            wheel_delta: Point::ZERO,
        }
    }

    pub fn moved(position: Point) -> Self {
        Self::new(PointerAction::Move, position)
    }

    pub fn down(position: Point) -> Self {
        Self::new(PointerAction::Down, position)
    }

    pub fn up(position: Point) -> Self {
        Self::new(PointerAction::Up, position)
    }

    pub fn wheel(position: Point, delta: Point) -> Self {
        Self {
            wheel_delta: delta,
            ..Self::new(PointerAction::Wheel, position)
        }
    }

    /// Same event for another pointer id (builder pattern).
    pub fn with_pointer(mut self, pointer_id: u32) -> Self {
        self.pointer_id = pointer_id;
        self
    }

    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

// ---------------------------------------------------------------------------
// InputEvent
// ---------------------------------------------------------------------------

/// Top-level input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Pointer(PointerEvent),
    Key(KeyEvent),
    Char(CharEvent),
}

impl From<PointerEvent> for InputEvent {
    fn from(e: PointerEvent) -> Self {
        InputEvent::Pointer(e)
    }
}

impl From<KeyEvent> for InputEvent {
    fn from(e: KeyEvent) -> Self {
        InputEvent::Key(e)
    }
}

impl From<CharEvent> for InputEvent {
    fn from(e: CharEvent) -> Self {
        InputEvent::Char(e)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ── Modifiers ────────────────────────────────────────────────────

    #[test]
    fn modifiers_none_is_empty() {
        assert!(Modifiers::NONE.is_empty());
        assert!(!Modifiers::SHIFT.is_empty());
    }

    #[test]
    fn modifiers_combined() {
        let m = Modifiers::SHIFT | Modifiers::CTRL;
        assert!(m.contains(Modifiers::SHIFT));
        assert!(m.contains(Modifiers::CTRL));
        assert!(!m.contains(Modifiers::ALT));
        assert_eq!(m & Modifiers::CTRL, Modifiers::CTRL);
    }

    #[test]
    fn modifiers_contains_none() {
        assert!(Modifiers::ALT.contains(Modifiers::NONE));
    }

    // ── Records ──────────────────────────────────────────────────────

    #[test]
    fn key_up_keeps_key_and_modifiers() {
        let e = KeyEvent::up(Key::Tab, Modifiers::SHIFT);
        assert_eq!(e.action, KeyAction::Up);
        assert_eq!(e.key, Key::Tab);
        assert_eq!(e.modifiers, Modifiers::SHIFT);
        assert!(!e.repeat);
    }

    #[test]
    fn pointer_builders() {
        let e = PointerEvent::wheel(Point::new(1.0, 2.0), Point::new(0.0, -3.0))
            .with_pointer(4)
            .with_button(PointerButton::Middle);
        assert_eq!(e.action, PointerAction::Wheel);
        assert_eq!(e.pointer_id, 4);
        assert_eq!(e.wheel_delta.y, -3.0);
        assert!(matches!(InputEvent::from(e), InputEvent::Pointer(_)));
    }
}
