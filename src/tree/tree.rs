//! The element arena and its structural operations.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use slotmap::{SecondaryMap, SlotMap};

use super::node::{ChangeSubscriber, ElementData, ElementId, HandlerId, SubscriptionId};
use crate::dispatcher::{ThreadAccessPolicy, ThreadGuard};
use crate::error::{Result, UiError};
use crate::event::{Handler, InputRequest, RoutedEvent};
use crate::property::{PropertyChangedArgs, PropertyId, PropertyRegistry};
use crate::widget::Widget;

/// Empty slice constant for returning when an element has no children.
const EMPTY_CHILDREN: &[ElementId] = &[];

/// The element tree, backed by a slotmap arena.
///
/// All elements live in a single `SlotMap`. Visual and logical edges are kept
/// in secondary maps so structural changes are O(1) per edge and lookups are
/// O(1). Every element's visual parent may also be its logical parent; popup
/// content is a logical-only child and template roots are visual-only
/// children.
pub struct ElementTree {
    registry: Arc<PropertyRegistry>,
    pub(crate) nodes: SlotMap<ElementId, ElementData>,
    visual_children: SecondaryMap<ElementId, Vec<ElementId>>,
    visual_parent: SecondaryMap<ElementId, ElementId>,
    logical_children: SecondaryMap<ElementId, Vec<ElementId>>,
    logical_parent: SecondaryMap<ElementId, ElementId>,
    root: Option<ElementId>,
    pub(crate) guard: ThreadGuard,
    pub(crate) visual_dirty: Vec<ElementId>,
    pub(crate) popup_changes: Vec<ElementId>,
    pub(crate) destroyed: Vec<ElementId>,
    pub(crate) input_requests: Vec<InputRequest>,
    pub(crate) change_depth: u32,
    /// `(source element, source property)` to `(child, child property)` links.
    pub(crate) template_links: HashMap<(ElementId, PropertyId), Vec<(ElementId, PropertyId)>>,
    next_handler: u64,
    next_subscription: u64,
}

impl ElementTree {
    /// Create an empty tree bound to the current thread.
    pub fn new(registry: Arc<PropertyRegistry>) -> Self {
        Self::with_policy(registry, ThreadAccessPolicy::default())
    }

    /// Create an empty tree with an explicit cross-thread policy.
    pub fn with_policy(registry: Arc<PropertyRegistry>, policy: ThreadAccessPolicy) -> Self {
        Self {
            registry,
            nodes: SlotMap::with_key(),
            visual_children: SecondaryMap::new(),
            visual_parent: SecondaryMap::new(),
            logical_children: SecondaryMap::new(),
            logical_parent: SecondaryMap::new(),
            root: None,
            guard: ThreadGuard::new(policy),
            visual_dirty: Vec::new(),
            popup_changes: Vec::new(),
            destroyed: Vec::new(),
            input_requests: Vec::new(),
            change_depth: 0,
            template_links: HashMap::new(),
            next_handler: 0,
            next_subscription: 0,
        }
    }

    /// The shared property registry.
    pub fn registry(&self) -> &Arc<PropertyRegistry> {
        &self.registry
    }

    /// The active cross-thread policy.
    pub fn thread_policy(&self) -> ThreadAccessPolicy {
        self.guard.policy()
    }

    /// Change the cross-thread policy.
    pub fn set_thread_policy(&mut self, policy: ThreadAccessPolicy) {
        self.guard.set_policy(policy);
    }

    // ── Creation ─────────────────────────────────────────────────────

    /// Create a detached element.
    pub fn create(&mut self, widget: impl Widget) -> ElementId {
        self.create_boxed(Box::new(widget))
    }

    /// Create a detached element from a boxed widget.
    pub fn create_boxed(&mut self, widget: Box<dyn Widget>) -> ElementId {
        self.guard.verify("create");
        let id = self.nodes.insert(ElementData::new(widget));
        self.visual_children.insert(id, Vec::new());
        self.logical_children.insert(id, Vec::new());
        id
    }

    /// The root element, if set.
    pub fn root(&self) -> Option<ElementId> {
        self.root
    }

    /// Make `id` the root. It must not have a visual parent.
    pub fn set_root(&mut self, id: ElementId) {
        self.guard.verify("set_root");
        assert!(self.contains(id), "root element does not exist");
        assert!(
            self.visual_parent(id).is_none(),
            "root element must not have a visual parent"
        );
        self.root = Some(id);
    }

    // ── Visual edges ─────────────────────────────────────────────────

    /// Append `child` as an owned child of `parent`.
    ///
    /// If `child` has no logical parent, `parent` becomes its logical parent
    /// too.
    ///
    /// # Panics
    ///
    /// Panics if `child` already has a visual parent, if either element does
    /// not exist, or if the edge would create a cycle.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) {
        let index = self.visual_children(parent).len();
        self.link_visual(parent, index, child, true);
    }

    /// Insert `child` as an owned child of `parent` at `index`.
    ///
    /// # Panics
    ///
    /// Same conditions as [`append_child`](Self::append_child).
    pub fn insert_child(&mut self, parent: ElementId, index: usize, child: ElementId) {
        self.link_visual(parent, index, child, true);
    }

    /// Append `child` without transferring ownership.
    ///
    /// Destroying `parent` detaches `child` instead of destroying it.
    pub fn attach_child(&mut self, parent: ElementId, child: ElementId) {
        let index = self.visual_children(parent).len();
        self.link_visual(parent, index, child, false);
    }

    pub(crate) fn link_visual(
        &mut self,
        parent: ElementId,
        index: usize,
        child: ElementId,
        owned: bool,
    ) {
        self.guard.verify("add_child");
        assert!(self.contains(parent), "parent element does not exist");
        assert!(self.contains(child), "child element does not exist");
        assert!(
            self.visual_parent.get(child).is_none(),
            "element already has a visual parent"
        );
        assert!(
            parent != child && !self.is_ancestor(child, parent),
            "adding this child would create a cycle"
        );
        assert!(self.root != Some(child), "the root cannot become a child");

        self.visual_parent.insert(child, parent);
        if let Some(kids) = self.visual_children.get_mut(parent) {
            let index = index.min(kids.len());
            kids.insert(index, child);
        }
        if let Some(data) = self.nodes.get_mut(child) {
            data.owned = owned;
        }
        if self.logical_parent.get(child).is_none() && self.templated_parent(child).is_none() {
            self.logical_parent.insert(child, parent);
            if let Some(kids) = self.logical_children.get_mut(parent) {
                kids.push(child);
            }
        }

        log::debug!("attached {child:?} to {parent:?} (owned: {owned})");
        self.invalidate_measure(parent);
        self.invalidate_measure(child);
        self.register_subtree_names(child);
        self.refresh_bindings_in_subtree(child);
    }

    /// Detach `child` from `parent`. No-op (returns `false`) if it is not a
    /// child of `parent`. The child stays alive.
    pub fn remove_child(&mut self, parent: ElementId, child: ElementId) -> bool {
        self.guard.verify("remove_child");
        if self.visual_parent(child) != Some(parent) {
            return false;
        }
        self.unregister_subtree_names(child);

        self.visual_parent.remove(child);
        if let Some(kids) = self.visual_children.get_mut(parent) {
            kids.retain(|&c| c != child);
        }
        if self.logical_parent(child) == Some(parent) {
            self.unlink_logical(parent, child);
        }
        if let Some(data) = self.nodes.get_mut(child) {
            data.owned = false;
        }

        log::debug!("detached {child:?} from {parent:?}");
        self.invalidate_measure(parent);
        self.invalidate_measure(child);
        self.refresh_bindings_in_subtree(child);
        true
    }

    // ── Logical edges ────────────────────────────────────────────────

    /// Make `child` a logical-only child of `parent`.
    ///
    /// Logical-only children take part in inheritance, name lookup and tab
    /// order but are not rendered or hit-tested through `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `child` already has a logical parent or the edge would
    /// create a cycle.
    pub fn add_logical_child(&mut self, parent: ElementId, child: ElementId) {
        self.guard.verify("add_logical_child");
        assert!(self.contains(parent) && self.contains(child), "element does not exist");
        assert!(
            self.logical_parent.get(child).is_none(),
            "element already has a logical parent"
        );
        let mut cursor = Some(parent);
        while let Some(p) = cursor {
            assert!(p != child, "adding this logical child would create a cycle");
            cursor = self.inheritance_parent(p);
        }

        self.logical_parent.insert(child, parent);
        if let Some(kids) = self.logical_children.get_mut(parent) {
            kids.push(child);
        }
        self.register_subtree_names(child);
        self.refresh_bindings_in_subtree(child);
    }

    /// Remove a logical edge. Returns `false` if `child` is not a logical
    /// child of `parent`.
    pub fn remove_logical_child(&mut self, parent: ElementId, child: ElementId) -> bool {
        self.guard.verify("remove_logical_child");
        if self.logical_parent(child) != Some(parent) {
            return false;
        }
        self.unregister_subtree_names(child);
        self.unlink_logical(parent, child);
        self.refresh_bindings_in_subtree(child);
        true
    }

    fn unlink_logical(&mut self, parent: ElementId, child: ElementId) {
        self.logical_parent.remove(child);
        if let Some(kids) = self.logical_children.get_mut(parent) {
            kids.retain(|&c| c != child);
        }
    }

    // ── Destruction ──────────────────────────────────────────────────

    /// Destroy an element and everything it owns.
    ///
    /// Owned visual children and logical-only children are destroyed
    /// bottom-up; borrowed visual children are detached and survive.
    /// Templated-parent references to destroyed elements are cleared.
    pub fn destroy(&mut self, id: ElementId) {
        self.guard.verify("destroy");
        if !self.contains(id) {
            return;
        }
        if let Some(parent) = self.visual_parent(id) {
            self.remove_child(parent, id);
        }
        if let Some(parent) = self.logical_parent(id) {
            self.remove_logical_child(parent, id);
        }

        let mut doomed = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            doomed.push(current);
            for child in self.visual_children(current).to_vec() {
                let owned = self.nodes.get(child).is_some_and(|d| d.owned);
                if owned {
                    stack.push(child);
                } else {
                    self.visual_parent.remove(child);
                    if self.logical_parent(child) == Some(current) {
                        self.unregister_subtree_names(child);
                        self.unlink_logical(current, child);
                    }
                }
            }
            for child in self.logical_children(current).to_vec() {
                if self.logical_parent(child) == Some(current) && self.visual_parent(child).is_none() {
                    stack.push(child);
                }
            }
        }

        // Children first.
        for &dead in doomed.iter().rev() {
            self.nodes.remove(dead);
            self.visual_children.remove(dead);
            self.visual_parent.remove(dead);
            self.logical_children.remove(dead);
            self.logical_parent.remove(dead);
            self.destroyed.push(dead);
            if self.root == Some(dead) {
                self.root = None;
            }
        }

        for data in self.nodes.values_mut() {
            if data.templated_parent.is_some_and(|tp| doomed.contains(&tp)) {
                data.templated_parent = None;
            }
        }
        self.template_links.retain(|(source, _), targets| {
            targets.retain(|(t, _)| !doomed.contains(t));
            !doomed.contains(source) && !targets.is_empty()
        });
        self.visual_dirty.retain(|e| !doomed.contains(e));
        log::debug!("destroyed {} element(s) rooted at {id:?}", doomed.len());
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Whether the tree contains `id`.
    pub fn contains(&self, id: ElementId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no elements.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Immutable access to an element's record.
    pub fn element(&self, id: ElementId) -> Option<&ElementData> {
        self.nodes.get(id)
    }

    /// The element's widget type name.
    pub fn type_name(&self, id: ElementId) -> Option<&'static str> {
        self.nodes.get(id).map(|d| d.type_name)
    }

    pub fn visual_parent(&self, id: ElementId) -> Option<ElementId> {
        self.visual_parent.get(id).copied()
    }

    /// Visual children in insertion order.
    pub fn visual_children(&self, id: ElementId) -> &[ElementId] {
        self.visual_children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CHILDREN)
    }

    pub fn logical_parent(&self, id: ElementId) -> Option<ElementId> {
        self.logical_parent.get(id).copied()
    }

    /// Logical children in insertion order.
    pub fn logical_children(&self, id: ElementId) -> &[ElementId] {
        self.logical_children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CHILDREN)
    }

    /// The element whose template produced `id`, if it is still alive.
    pub fn templated_parent(&self, id: ElementId) -> Option<ElementId> {
        self.nodes.get(id).and_then(|d| d.templated_parent)
    }

    /// Parent used for inheritance and name-scope lookup: the logical parent,
    /// else the visual parent.
    pub fn inheritance_parent(&self, id: ElementId) -> Option<ElementId> {
        self.logical_parent(id).or_else(|| self.visual_parent(id))
    }

    /// Inverse of [`inheritance_parent`](Self::inheritance_parent): logical
    /// children, then visual children without a logical parent.
    pub fn inheritance_children(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = self.logical_children(id).to_vec();
        out.extend(
            self.visual_children(id)
                .iter()
                .copied()
                .filter(|&c| self.logical_parent(c).is_none()),
        );
        out
    }

    /// Visual ancestors of `id`, nearest first. Excludes `id`.
    pub fn ancestors(&self, id: ElementId) -> Vec<ElementId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(p) = self.visual_parent(current) {
            result.push(p);
            current = p;
        }
        result
    }

    /// Whether `ancestor` is a strict visual ancestor of `id`.
    pub fn is_ancestor(&self, ancestor: ElementId, id: ElementId) -> bool {
        let mut current = id;
        while let Some(p) = self.visual_parent(current) {
            if p == ancestor {
                return true;
            }
            current = p;
        }
        false
    }

    /// Whether `id` is `root` or visually below it.
    pub fn is_in_subtree(&self, root: ElementId, id: ElementId) -> bool {
        self.contains(id) && (root == id || self.is_ancestor(root, id))
    }

    /// Pre-order depth-first traversal of the visual tree from `start`.
    pub fn walk_visual(&self, start: ElementId) -> Vec<ElementId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.contains(current) {
                continue;
            }
            result.push(current);
            for &child in self.visual_children(current).iter().rev() {
                stack.push(child);
            }
        }
        result
    }

    /// Pre-order traversal along inheritance edges from `start`.
    pub fn walk_logical(&self, start: ElementId) -> Vec<ElementId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.contains(current) {
                continue;
            }
            result.push(current);
            for child in self.inheritance_children(current).into_iter().rev() {
                stack.push(child);
            }
        }
        result
    }

    // ── Widgets ──────────────────────────────────────────────────────

    /// The element's widget. `None` while one of its hooks is running.
    pub fn widget(&self, id: ElementId) -> Option<&dyn Widget> {
        self.nodes.get(id).and_then(|d| d.widget.as_deref())
    }

    /// Downcast the element's widget.
    pub fn widget_as<T: Widget>(&self, id: ElementId) -> Option<&T> {
        self.widget(id).and_then(|w| w.as_any().downcast_ref::<T>())
    }

    /// Mutate the element's widget in place, then invalidate its measure and
    /// visual.
    pub fn with_widget_mut<T: Widget, R>(
        &mut self,
        id: ElementId,
        f: impl FnOnce(&mut T) -> R,
    ) -> Option<R> {
        self.guard.verify("with_widget_mut");
        let widget = self.nodes.get_mut(id)?.widget.as_mut()?;
        let any: &mut dyn Any = widget.as_any_mut();
        let result = f(any.downcast_mut::<T>()?);
        self.invalidate_measure(id);
        self.invalidate_visual(id);
        Some(result)
    }

    pub(crate) fn take_widget(&mut self, id: ElementId) -> Option<Box<dyn Widget>> {
        self.nodes.get_mut(id).and_then(|d| d.widget.take())
    }

    pub(crate) fn restore_widget(&mut self, id: ElementId, widget: Box<dyn Widget>) {
        if let Some(data) = self.nodes.get_mut(id) {
            data.widget = Some(widget);
        }
    }

    // ── Handlers and subscribers ─────────────────────────────────────

    /// Register a routed-event handler on `id`.
    pub fn add_handler(
        &mut self,
        id: ElementId,
        event: RoutedEvent,
        handler: impl Fn(&mut ElementTree, &mut crate::event::RoutedEventArgs) + Send + Sync + 'static,
    ) -> Result<HandlerId> {
        self.guard.check("add_handler")?;
        let handler_id = HandlerId(self.next_handler);
        let data = self.nodes.get_mut(id).ok_or(UiError::ElementNotFound)?;
        data.handlers.push((handler_id, event, Arc::new(handler)));
        self.next_handler += 1;
        Ok(handler_id)
    }

    /// Remove a handler. Returns `false` if it was not registered on `id`.
    pub fn remove_handler(&mut self, id: ElementId, handler: HandlerId) -> bool {
        self.guard.verify("remove_handler");
        match self.nodes.get_mut(id) {
            Some(data) => {
                let before = data.handlers.len();
                data.handlers.retain(|(h, _, _)| *h != handler);
                data.handlers.len() != before
            }
            None => false,
        }
    }

    /// Handlers on `id` for `event`, in registration order.
    pub(crate) fn handlers_for(&self, id: ElementId, event: RoutedEvent) -> Vec<Handler> {
        self.nodes
            .get(id)
            .map(|d| {
                d.handlers
                    .iter()
                    .filter(|(_, e, _)| *e == event)
                    .map(|(_, _, h)| h.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Subscribe to every effective-value change on `id`.
    pub fn subscribe(
        &mut self,
        id: ElementId,
        subscriber: impl Fn(&mut ElementTree, &PropertyChangedArgs) + Send + Sync + 'static,
    ) -> Result<SubscriptionId> {
        self.guard.check("subscribe")?;
        let sub_id = SubscriptionId(self.next_subscription);
        let data = self.nodes.get_mut(id).ok_or(UiError::ElementNotFound)?;
        let subscriber: ChangeSubscriber = Arc::new(subscriber);
        data.subscribers.push((sub_id, subscriber));
        self.next_subscription += 1;
        Ok(sub_id)
    }

    /// Remove a subscriber. Returns `false` if it was not registered on `id`.
    pub fn unsubscribe(&mut self, id: ElementId, subscription: SubscriptionId) -> bool {
        match self.nodes.get_mut(id) {
            Some(data) => {
                let before = data.subscribers.len();
                data.subscribers.retain(|(s, _)| *s != subscription);
                data.subscribers.len() != before
            }
            None => false,
        }
    }

    // ── Host notifications ───────────────────────────────────────────

    /// Mark `id` as needing a redraw. The owning window forwards it to its
    /// render host on the next pump.
    pub fn invalidate_visual(&mut self, id: ElementId) {
        if self.contains(id) && !self.visual_dirty.contains(&id) {
            self.visual_dirty.push(id);
        }
    }

    /// Drain elements invalidated since the last call.
    pub fn take_visual_invalidations(&mut self) -> Vec<ElementId> {
        std::mem::take(&mut self.visual_dirty)
    }

    pub(crate) fn queue_popup_change(&mut self, popup: ElementId) {
        if !self.popup_changes.contains(&popup) {
            self.popup_changes.push(popup);
        }
    }

    /// Drain popups whose `IsOpen` changed since the last call.
    pub fn take_popup_changes(&mut self) -> Vec<ElementId> {
        std::mem::take(&mut self.popup_changes)
    }

    /// Drain ids destroyed since the last call.
    pub fn take_destroyed(&mut self) -> Vec<ElementId> {
        std::mem::take(&mut self.destroyed)
    }

    /// Ask the input manager to capture `pointer_id` for `id` once the
    /// current event finishes routing.
    pub fn request_pointer_capture(&mut self, id: ElementId, pointer_id: u32) {
        self.input_requests.push(InputRequest::Capture {
            element: id,
            pointer_id,
        });
    }

    /// Ask the input manager to release `id`'s capture of `pointer_id`.
    pub fn request_release_capture(&mut self, id: ElementId, pointer_id: u32) {
        self.input_requests.push(InputRequest::Release {
            element: id,
            pointer_id,
        });
    }

    /// Ask the focus manager to focus `id`.
    pub fn request_focus(&mut self, id: ElementId) {
        self.input_requests.push(InputRequest::Focus(id));
    }

    pub(crate) fn take_input_requests(&mut self) -> Vec<InputRequest> {
        std::mem::take(&mut self.input_requests)
    }
}

impl std::fmt::Debug for ElementTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementTree")
            .field("len", &self.nodes.len())
            .field("root", &self.root)
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::Panel;

    /// Build a small test tree:
    /// ```text
    ///       root
    ///      /    \
    ///    a        b
    ///   / \
    ///  c   d
    /// ```
    fn build_tree() -> (ElementTree, [ElementId; 5]) {
        let mut tree = ElementTree::new(Arc::new(PropertyRegistry::new()));
        let root = tree.create(Panel::new());
        tree.set_root(root);
        let a = tree.create(Panel::new());
        let b = tree.create(Panel::new());
        let c = tree.create(Panel::new());
        let d = tree.create(Panel::new());
        tree.append_child(root, a);
        tree.append_child(root, b);
        tree.append_child(a, c);
        tree.append_child(a, d);
        (tree, [root, a, b, c, d])
    }

    // ── Structure ────────────────────────────────────────────────────

    #[test]
    fn append_sets_both_parents() {
        let (tree, [root, a, _, c, _]) = build_tree();
        assert_eq!(tree.visual_parent(a), Some(root));
        assert_eq!(tree.logical_parent(a), Some(root));
        assert_eq!(tree.visual_children(a)[0], c);
        assert_eq!(tree.logical_children(a)[0], c);
    }

    #[test]
    #[should_panic(expected = "already has a visual parent")]
    fn double_parent_panics() {
        let (mut tree, [_, a, b, c, _]) = build_tree();
        let _ = a;
        tree.append_child(b, c);
    }

    #[test]
    #[should_panic(expected = "cycle")]
    fn cycle_panics() {
        let (mut tree, [_, a, _, c, _]) = build_tree();
        let extra = tree.create(Panel::new());
        tree.append_child(c, extra);
        tree.remove_child(tree.visual_parent(a).unwrap(), a);
        tree.append_child(extra, a);
    }

    #[test]
    fn insert_child_respects_index() {
        let (mut tree, [_, a, _, c, d]) = build_tree();
        let e = tree.create(Panel::new());
        tree.insert_child(a, 1, e);
        assert_eq!(tree.visual_children(a), &[c, e, d]);
    }

    #[test]
    fn remove_child_is_noop_for_non_child() {
        let (mut tree, [root, _, b, c, _]) = build_tree();
        assert!(!tree.remove_child(b, c));
        assert!(!tree.remove_child(root, c));
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn remove_child_detaches_but_keeps_alive() {
        let (mut tree, [_, a, _, c, d]) = build_tree();
        assert!(tree.remove_child(a, c));
        assert!(tree.contains(c));
        assert_eq!(tree.visual_parent(c), None);
        assert_eq!(tree.logical_parent(c), None);
        assert_eq!(tree.visual_children(a), &[d]);
    }

    #[test]
    fn walks_are_pre_order() {
        let (tree, [root, a, b, c, d]) = build_tree();
        assert_eq!(tree.walk_visual(root), vec![root, a, c, d, b]);
        assert_eq!(tree.walk_logical(root), vec![root, a, c, d, b]);
        assert_eq!(tree.ancestors(c), vec![a, root]);
        assert!(tree.is_ancestor(root, d));
        assert!(!tree.is_ancestor(b, d));
    }

    // ── Destruction ──────────────────────────────────────────────────

    #[test]
    fn destroy_removes_owned_subtree() {
        let (mut tree, [root, a, b, c, d]) = build_tree();
        tree.destroy(a);
        assert!(!tree.contains(a));
        assert!(!tree.contains(c));
        assert!(!tree.contains(d));
        assert_eq!(tree.visual_children(root), &[b]);
        let destroyed = tree.take_destroyed();
        assert_eq!(destroyed.len(), 3);
        // Children are reported before their parent.
        assert_eq!(destroyed.last(), Some(&a));
    }

    #[test]
    fn destroy_detaches_borrowed_children() {
        let (mut tree, [_, _, b, _, _]) = build_tree();
        let borrowed = tree.create(Panel::new());
        tree.attach_child(b, borrowed);
        tree.destroy(b);
        assert!(tree.contains(borrowed));
        assert_eq!(tree.visual_parent(borrowed), None);
        assert_eq!(tree.logical_parent(borrowed), None);
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn destroy_takes_logical_only_children() {
        let (mut tree, [_, _, b, _, _]) = build_tree();
        let content = tree.create(Panel::new());
        tree.add_logical_child(b, content);
        assert_eq!(tree.inheritance_parent(content), Some(b));
        tree.destroy(b);
        assert!(!tree.contains(content));
    }

    #[test]
    fn destroy_root_clears_root() {
        let (mut tree, [root, ..]) = build_tree();
        tree.destroy(root);
        assert!(tree.root().is_none());
        assert!(tree.is_empty());
    }

    // ── Widgets and handlers ─────────────────────────────────────────

    #[test]
    fn widget_downcast() {
        let (mut tree, [root, ..]) = build_tree();
        assert!(tree.widget_as::<Panel>(root).is_some());
        assert_eq!(tree.type_name(root), Some("Panel"));
        let touched = tree.with_widget_mut::<Panel, _>(root, |_| 7);
        assert_eq!(touched, Some(7));
    }

    #[test]
    fn handlers_register_and_remove() {
        let (mut tree, [root, ..]) = build_tree();
        let h = tree
            .add_handler(root, crate::event::POINTER_DOWN, |_, _| {})
            .unwrap();
        assert_eq!(tree.handlers_for(root, crate::event::POINTER_DOWN).len(), 1);
        assert!(tree.remove_handler(root, h));
        assert!(!tree.remove_handler(root, h));
    }

    #[test]
    fn invalidate_visual_dedupes() {
        let (mut tree, [root, a, ..]) = build_tree();
        tree.take_visual_invalidations();
        tree.invalidate_visual(a);
        tree.invalidate_visual(a);
        tree.invalidate_visual(root);
        assert_eq!(tree.take_visual_invalidations(), vec![a, root]);
        assert!(tree.take_visual_invalidations().is_empty());
    }
}
