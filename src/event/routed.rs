//! Routed event identities, arguments and the built-in events.

use std::sync::Arc;

use super::input::{CharEvent, KeyEvent, PointerEvent};
use crate::tree::{ElementId, ElementTree};

/// How an event travels through the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoutingStrategy {
    /// Only the target sees it.
    Direct,
    /// Target first, then each parent up to the root.
    Bubble,
    /// Root first, down to the target.
    Tunnel,
}

/// Identity of a routed event. Two events are the same if their owner and
/// name match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoutedEvent {
    pub owner: &'static str,
    pub name: &'static str,
    pub strategy: RoutingStrategy,
}

impl RoutedEvent {
    pub const fn new(owner: &'static str, name: &'static str, strategy: RoutingStrategy) -> Self {
        Self {
            owner,
            name,
            strategy,
        }
    }
}

impl std::fmt::Display for RoutedEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.owner, self.name)
    }
}

// ---------------------------------------------------------------------------
// Built-in events
// ---------------------------------------------------------------------------

const UI: &str = "UIElement";

pub const PREVIEW_POINTER_DOWN: RoutedEvent =
    RoutedEvent::new(UI, "PreviewPointerDown", RoutingStrategy::Tunnel);
pub const POINTER_DOWN: RoutedEvent = RoutedEvent::new(UI, "PointerDown", RoutingStrategy::Bubble);
pub const POINTER_UP: RoutedEvent = RoutedEvent::new(UI, "PointerUp", RoutingStrategy::Bubble);
pub const POINTER_MOVE: RoutedEvent = RoutedEvent::new(UI, "PointerMove", RoutingStrategy::Bubble);
pub const POINTER_WHEEL: RoutedEvent = RoutedEvent::new(UI, "PointerWheel", RoutingStrategy::Bubble);
pub const POINTER_ENTER: RoutedEvent = RoutedEvent::new(UI, "PointerEnter", RoutingStrategy::Direct);
pub const POINTER_LEAVE: RoutedEvent = RoutedEvent::new(UI, "PointerLeave", RoutingStrategy::Direct);
pub const LOST_POINTER_CAPTURE: RoutedEvent =
    RoutedEvent::new(UI, "LostPointerCapture", RoutingStrategy::Direct);
pub const PREVIEW_KEY_DOWN: RoutedEvent = RoutedEvent::new(UI, "PreviewKeyDown", RoutingStrategy::Tunnel);
pub const KEY_DOWN: RoutedEvent = RoutedEvent::new(UI, "KeyDown", RoutingStrategy::Bubble);
pub const KEY_UP: RoutedEvent = RoutedEvent::new(UI, "KeyUp", RoutingStrategy::Bubble);
pub const TEXT_INPUT: RoutedEvent = RoutedEvent::new(UI, "TextInput", RoutingStrategy::Bubble);
pub const GOT_FOCUS: RoutedEvent = RoutedEvent::new(UI, "GotFocus", RoutingStrategy::Bubble);
pub const LOST_FOCUS: RoutedEvent = RoutedEvent::new(UI, "LostFocus", RoutingStrategy::Bubble);

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

/// Event payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EventData {
    #[default]
    None,
    Pointer(PointerEvent),
    Key(KeyEvent),
    Char(CharEvent),
    Focus {
        old: Option<ElementId>,
        new: Option<ElementId>,
    },
    Capture {
        pointer_id: u32,
    },
}

/// Arguments passed to every handler along a route.
#[derive(Debug, Clone)]
pub struct RoutedEventArgs {
    pub event: RoutedEvent,
    /// The element whose handlers are running.
    pub source: ElementId,
    /// The element the event was raised on.
    pub original_source: ElementId,
    /// Set by a handler to stop the route.
    pub handled: bool,
    pub data: EventData,
}

impl RoutedEventArgs {
    pub fn new(event: RoutedEvent, target: ElementId, data: EventData) -> Self {
        Self {
            event,
            source: target,
            original_source: target,
            handled: false,
            data,
        }
    }

    /// Pointer payload, if any.
    pub fn pointer(&self) -> Option<&PointerEvent> {
        match &self.data {
            EventData::Pointer(p) => Some(p),
            _ => None,
        }
    }

    /// Key payload, if any.
    pub fn key(&self) -> Option<&KeyEvent> {
        match &self.data {
            EventData::Key(k) => Some(k),
            _ => None,
        }
    }
}

/// A routed-event handler. Handlers get the whole tree, so they can change
/// properties, restructure and queue input requests.
pub type Handler = Arc<dyn Fn(&mut ElementTree, &mut RoutedEventArgs) + Send + Sync>;

/// Work a handler asks the input manager to do once routing finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRequest {
    Capture { element: ElementId, pointer_id: u32 },
    Release { element: ElementId, pointer_id: u32 },
    Focus(ElementId),
}
