//! Event system: platform input, routed events, key bindings, dispatch.

pub mod binding;
pub mod handler;
pub mod input;
pub mod manager;
pub mod routed;

pub use binding::{InputAction, InputBindings};
pub use input::{
    CharEvent, InputEvent, Key, KeyAction, KeyEvent, Modifiers, PointerAction, PointerButton,
    PointerEvent,
};
pub use manager::{InputConfig, InputManager};
pub use routed::{
    EventData, Handler, InputRequest, RoutedEvent, RoutedEventArgs, RoutingStrategy, GOT_FOCUS,
    KEY_DOWN, KEY_UP, LOST_FOCUS, LOST_POINTER_CAPTURE, POINTER_DOWN, POINTER_ENTER,
    POINTER_LEAVE, POINTER_MOVE, POINTER_UP, POINTER_WHEEL, PREVIEW_KEY_DOWN,
    PREVIEW_POINTER_DOWN, TEXT_INPUT,
};
