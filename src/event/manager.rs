//! Input manager: turns platform input records into routed events.
//!
//! One [`InputManager`] serves one surface (a window or a popup root). It
//! owns the surface's focus scope, pointer captures and mouse-over tracking.
//!
//! Per event:
//! - pointer down/up/move go to the captured element, else the hit-test
//!   result (up falls back to the element that saw the matching down);
//! - wheel goes to the hit-test result;
//! - key and text input go to the focused element, else the scope root;
//! - an unhandled `KEY_DOWN` is matched against the [`InputBindings`].
//!
//! Input requests queued by handlers (capture, release, focus) are applied
//! after each event finishes routing.

use std::collections::HashMap;

use log::{debug, trace};

use super::binding::{InputAction, InputBindings};
use super::input::{CharEvent, InputEvent, KeyAction, KeyEvent, PointerAction, PointerEvent};
use super::routed::{
    EventData, InputRequest, RoutedEvent, RoutedEventArgs, RoutingStrategy, KEY_DOWN, KEY_UP,
    LOST_POINTER_CAPTURE, POINTER_DOWN, POINTER_ENTER, POINTER_LEAVE, POINTER_MOVE, POINTER_UP,
    POINTER_WHEEL, PREVIEW_KEY_DOWN, PREVIEW_POINTER_DOWN, TEXT_INPUT,
};
use crate::focus::{FocusManager, FocusNavigation};
use crate::geometry::Point;
use crate::tree::{ElementId, ElementTree};

/// Rounds of request draining per event. Handlers of `LOST_POINTER_CAPTURE`
/// or focus events may queue further requests.
const MAX_REQUEST_ROUNDS: usize = 8;

// ---------------------------------------------------------------------------
// InputConfig
// ---------------------------------------------------------------------------

/// Behavior switches for an [`InputManager`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputConfig {
    /// Tab / Shift+Tab move focus.
    pub tab_navigation: bool,
    /// Arrow keys move focus spatially.
    pub arrow_navigation: bool,
    /// An unhandled pointer down focuses the nearest focusable element on
    /// its route.
    pub focus_on_pointer_down: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            tab_navigation: true,
            arrow_navigation: true,
            focus_on_pointer_down: true,
        }
    }
}

impl InputConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tab_navigation(mut self, enabled: bool) -> Self {
        self.tab_navigation = enabled;
        self
    }

    pub fn with_arrow_navigation(mut self, enabled: bool) -> Self {
        self.arrow_navigation = enabled;
        self
    }

    pub fn with_focus_on_pointer_down(mut self, enabled: bool) -> Self {
        self.focus_on_pointer_down = enabled;
        self
    }
}

// ---------------------------------------------------------------------------
// InputManager
// ---------------------------------------------------------------------------

/// Per-surface input state and dispatch.
#[derive(Debug, Default)]
pub struct InputManager {
    config: InputConfig,
    bindings: InputBindings,
    focus: FocusManager,
    captures: HashMap<u32, ElementId>,
    pointer_down_targets: HashMap<u32, ElementId>,
    mouse_over: Option<ElementId>,
    last_position: Option<Point>,
    actions: Vec<String>,
}

impl InputManager {
    pub fn new(config: InputConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    pub fn bindings(&self) -> &InputBindings {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut InputBindings {
        &mut self.bindings
    }

    pub fn focus(&self) -> &FocusManager {
        &self.focus
    }

    /// The focused element of this surface.
    pub fn focused(&self) -> Option<ElementId> {
        self.focus.focused()
    }

    /// The deepest element under the pointer after the last pointer event.
    pub fn mouse_over(&self) -> Option<ElementId> {
        self.mouse_over
    }

    /// Last pointer position seen, in surface coordinates.
    pub fn last_position(&self) -> Option<Point> {
        self.last_position
    }

    /// The element capturing `pointer_id`.
    pub fn captured(&self, pointer_id: u32) -> Option<ElementId> {
        self.captures.get(&pointer_id).copied()
    }

    /// Drain `Custom` binding actions triggered since the last call.
    pub fn take_actions(&mut self) -> Vec<String> {
        std::mem::take(&mut self.actions)
    }

    // ── Focus ────────────────────────────────────────────────────────

    pub fn set_focus(&mut self, tree: &mut ElementTree, id: ElementId) -> bool {
        self.focus.set_focus(tree, id)
    }

    pub fn clear_focus(&mut self, tree: &mut ElementTree) -> bool {
        self.focus.clear_focus(tree)
    }

    pub fn move_focus(
        &mut self,
        tree: &mut ElementTree,
        root: ElementId,
        direction: FocusNavigation,
    ) -> bool {
        self.focus.move_focus(tree, root, direction)
    }

    // ── Capture ──────────────────────────────────────────────────────

    /// Capture `pointer_id` for `id`. Refused for elements that are gone or
    /// not effectively visible and enabled. Replacing another element's
    /// capture raises `LOST_POINTER_CAPTURE` on it.
    pub fn capture(&mut self, tree: &mut ElementTree, id: ElementId, pointer_id: u32) -> bool {
        if !tree.contains(id) || !tree.is_effectively_visible(id) || !tree.is_effectively_enabled(id) {
            debug!("capture of pointer {pointer_id} refused for {id:?}");
            return false;
        }
        match self.captures.insert(pointer_id, id) {
            Some(old) if old != id => lost_capture(tree, old, pointer_id),
            _ => {}
        }
        true
    }

    /// Release whatever holds `pointer_id`. Returns the former holder.
    pub fn release_capture(&mut self, tree: &mut ElementTree, pointer_id: u32) -> Option<ElementId> {
        let old = self.captures.remove(&pointer_id)?;
        lost_capture(tree, old, pointer_id);
        Some(old)
    }

    /// Drop every reference to destroyed elements. Raises nothing.
    pub fn forget_destroyed(&mut self, destroyed: &[ElementId]) {
        if destroyed.is_empty() {
            return;
        }
        self.captures.retain(|_, e| !destroyed.contains(e));
        self.pointer_down_targets.retain(|_, e| !destroyed.contains(e));
        if self.mouse_over.is_some_and(|m| destroyed.contains(&m)) {
            self.mouse_over = None;
        }
    }

    fn prune(&mut self, tree: &mut ElementTree) {
        self.captures.retain(|_, e| tree.contains(*e));
        self.pointer_down_targets.retain(|_, e| tree.contains(*e));
        if self.mouse_over.is_some_and(|m| !tree.contains(m)) {
            self.mouse_over = None;
        }
        self.focus.validate(tree);
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    /// Route one platform event through `root`'s subtree. Returns whether a
    /// handler (or a key binding) handled it.
    pub fn process(&mut self, tree: &mut ElementTree, root: ElementId, event: &InputEvent) -> bool {
        self.prune(tree);
        let handled = match event {
            InputEvent::Pointer(p) => self.process_pointer(tree, root, p),
            InputEvent::Key(k) => self.process_key(tree, root, k),
            InputEvent::Char(c) => self.process_char(tree, root, c),
        };
        self.apply_requests(tree, root);
        handled
    }

    fn process_pointer(&mut self, tree: &mut ElementTree, root: ElementId, event: &PointerEvent) -> bool {
        let hit = tree.hit_test(root, event.position);
        let data = EventData::Pointer(*event);
        match event.action {
            PointerAction::Move => {
                self.last_position = Some(event.position);
                self.update_mouse_over(tree, hit, event);
                let target = self.captured(event.pointer_id).or(hit);
                target.is_some_and(|t| raise(tree, POINTER_MOVE, t, data))
            }
            PointerAction::Down => {
                self.last_position = Some(event.position);
                let Some(target) = self.captured(event.pointer_id).or(hit) else {
                    return false;
                };
                self.pointer_down_targets.insert(event.pointer_id, target);
                let handled = raise(tree, PREVIEW_POINTER_DOWN, target, data.clone())
                    || raise(tree, POINTER_DOWN, target, data);
                if !handled && self.config.focus_on_pointer_down {
                    self.focus_on_route(tree, root, target);
                }
                handled
            }
            PointerAction::Up => {
                self.last_position = Some(event.position);
                let down_target = self.pointer_down_targets.remove(&event.pointer_id);
                let target = self.captured(event.pointer_id).or(hit).or(down_target);
                target.is_some_and(|t| raise(tree, POINTER_UP, t, data))
            }
            PointerAction::Wheel => hit.is_some_and(|t| raise(tree, POINTER_WHEEL, t, data)),
            PointerAction::Enter => {
                self.last_position = Some(event.position);
                self.update_mouse_over(tree, hit, event);
                false
            }
            PointerAction::Leave => {
                self.last_position = None;
                self.update_mouse_over(tree, None, event);
                false
            }
        }
    }

    fn process_key(&mut self, tree: &mut ElementTree, root: ElementId, event: &KeyEvent) -> bool {
        let target = self.focus.focused().unwrap_or(root);
        let data = EventData::Key(*event);
        match event.action {
            KeyAction::Down => {
                let handled = raise(tree, PREVIEW_KEY_DOWN, target, data.clone())
                    || raise(tree, KEY_DOWN, target, data);
                handled || self.apply_binding(tree, root, event)
            }
            KeyAction::Up => raise(tree, KEY_UP, target, data),
        }
    }

    fn process_char(&mut self, tree: &mut ElementTree, root: ElementId, event: &CharEvent) -> bool {
        let target = self.focus.focused().unwrap_or(root);
        raise(tree, TEXT_INPUT, target, EventData::Char(*event))
    }

    fn apply_binding(&mut self, tree: &mut ElementTree, root: ElementId, event: &KeyEvent) -> bool {
        let Some(action) = self.bindings.resolve(event).cloned() else {
            return false;
        };
        trace!("key binding {:?} -> {action:?}", event.key);
        match action {
            InputAction::Custom(name) => {
                self.actions.push(name);
                true
            }
            InputAction::FocusNext | InputAction::FocusPrevious if !self.config.tab_navigation => false,
            InputAction::FocusDirection(_) if !self.config.arrow_navigation => false,
            nav => match nav.navigation() {
                Some(direction) => self.focus.move_focus(tree, root, direction),
                None => false,
            },
        }
    }

    fn focus_on_route(&mut self, tree: &mut ElementTree, root: ElementId, target: ElementId) {
        let candidate = tree
            .event_route(target, RoutingStrategy::Bubble)
            .into_iter()
            .take_while(|&id| tree.is_in_subtree(root, id))
            .find(|&id| FocusManager::is_focusable(tree, id));
        if let Some(id) = candidate {
            self.focus.set_focus(tree, id);
        }
    }

    /// Fire `POINTER_LEAVE` on elements that left the hover chain
    /// (child to parent), then `POINTER_ENTER` on elements that joined it
    /// (parent to child). Elements in both chains see neither.
    fn update_mouse_over(&mut self, tree: &mut ElementTree, new: Option<ElementId>, event: &PointerEvent) {
        let old = self.mouse_over;
        if old == new {
            return;
        }
        self.mouse_over = new;

        let chain = |id: Option<ElementId>| -> Vec<ElementId> {
            id.map(|e| tree.event_route(e, RoutingStrategy::Bubble))
                .unwrap_or_default()
        };
        let old_chain = chain(old);
        let new_chain = chain(new);

        let data = EventData::Pointer(*event);
        for &id in old_chain.iter().filter(|id| !new_chain.contains(id)) {
            raise(tree, POINTER_LEAVE, id, data.clone());
        }
        for &id in new_chain.iter().rev().filter(|id| !old_chain.contains(id)) {
            raise(tree, POINTER_ENTER, id, data.clone());
        }
    }

    /// Apply capture, release and focus requests queued by handlers.
    pub fn apply_requests(&mut self, tree: &mut ElementTree, root: ElementId) {
        for _ in 0..MAX_REQUEST_ROUNDS {
            let requests = tree.take_input_requests();
            if requests.is_empty() {
                return;
            }
            for request in requests {
                match request {
                    InputRequest::Capture { element, pointer_id } => {
                        self.capture(tree, element, pointer_id);
                    }
                    InputRequest::Release { element, pointer_id } => {
                        if self.captured(pointer_id) == Some(element) {
                            self.release_capture(tree, pointer_id);
                        }
                    }
                    InputRequest::Focus(element) => {
                        if tree.is_in_subtree(root, element) {
                            self.focus.set_focus(tree, element);
                        }
                    }
                }
            }
        }
        log::warn!("input requests still pending after {MAX_REQUEST_ROUNDS} rounds");
    }
}

fn raise(tree: &mut ElementTree, event: RoutedEvent, target: ElementId, data: EventData) -> bool {
    let mut args = RoutedEventArgs::new(event, target, data);
    tree.raise_event(target, &mut args)
}

fn lost_capture(tree: &mut ElementTree, element: ElementId, pointer_id: u32) {
    if tree.contains(element) {
        raise(tree, LOST_POINTER_CAPTURE, element, EventData::Capture { pointer_id });
    }
}

// ===========================================================================
// Tests
// ===========================================================================
