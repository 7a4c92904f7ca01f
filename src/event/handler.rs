//! Routed event dispatch: route computation and handler invocation.
//!
//! [`ElementTree::event_route`] computes the traversal order for a routing
//! strategy. [`ElementTree::raise_event`] walks that route and invokes the
//! handlers registered on each element until one marks the event handled.

use log::trace;

use super::routed::{RoutedEventArgs, RoutingStrategy};
use crate::tree::{ElementId, ElementTree};

impl ElementTree {
    /// Next element up a bubble route: the visual parent, else the templated
    /// parent, else the logical parent (popup content bubbles to its popup).
    pub fn bubble_parent(&self, id: ElementId) -> Option<ElementId> {
        self.visual_parent(id)
            .or_else(|| self.templated_parent(id))
            .or_else(|| self.logical_parent(id))
    }

    /// Compute the route for `strategy` starting at `target`.
    ///
    /// `Direct` is `[target]`, `Bubble` is `[target, parent, ..., root]` and
    /// `Tunnel` is the reverse of `Bubble`. Returns an empty vec if `target`
    /// does not exist.
    pub fn event_route(&self, target: ElementId, strategy: RoutingStrategy) -> Vec<ElementId> {
        if !self.contains(target) {
            return Vec::new();
        }
        if strategy == RoutingStrategy::Direct {
            return vec![target];
        }
        let mut path = vec![target];
        let mut current = target;
        while let Some(parent) = self.bubble_parent(current) {
            // Guards against a malformed edge set looping forever.
            if path.contains(&parent) {
                break;
            }
            path.push(parent);
            current = parent;
        }
        if strategy == RoutingStrategy::Tunnel {
            path.reverse();
        }
        path
    }

    /// Raise `args.event` on `target`, routed by the event's strategy.
    ///
    /// `args.source` is updated to each element as its handlers run. Routing
    /// stops as soon as a handler sets `handled`. Elements destroyed by an
    /// earlier handler are skipped. Returns whether the event was handled.
    pub fn raise_event(&mut self, target: ElementId, args: &mut RoutedEventArgs) -> bool {
        self.guard.verify("raise_event");
        args.original_source = target;
        let route = self.event_route(target, args.event.strategy);
        trace!("raise {} on {:?} ({} elements)", args.event, target, route.len());

        for id in route {
            if !self.contains(id) {
                continue;
            }
            args.source = id;
            for handler in self.handlers_for(id, args.event) {
                handler(self, args);
                if args.handled {
                    return true;
                }
            }
        }
        args.handled
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::event::routed::{EventData, POINTER_DOWN, PREVIEW_POINTER_DOWN};
    use crate::event::{RoutedEvent, POINTER_ENTER};
    use crate::property::PropertyRegistry;
    use crate::widgets::{Panel, Popup};

    /// Build a small test tree:
    /// ```text
    ///       root
    ///      /    \
    ///    a        b
    ///   / \
    ///  c   d
    /// ```
    fn build_tree() -> (ElementTree, ElementId, ElementId, ElementId, ElementId, ElementId) {
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
        (tree, root, a, b, c, d)
    }

    type Log = Arc<Mutex<Vec<ElementId>>>;

    fn record(tree: &mut ElementTree, id: ElementId, event: RoutedEvent, log: &Log, handle: bool) {
        let log = log.clone();
        tree.add_handler(id, event, move |_, args| {
            log.lock().unwrap().push(args.source);
            if handle {
                args.handled = true;
            }
        })
        .unwrap();
    }

    // ── Routes ───────────────────────────────────────────────────────

    #[test]
    fn bubble_route_from_leaf() {
        let (tree, root, a, _, c, _) = build_tree();
        assert_eq!(tree.event_route(c, RoutingStrategy::Bubble), vec![c, a, root]);
    }

    #[test]
    fn tunnel_route_is_reversed() {
        let (tree, root, a, _, c, _) = build_tree();
        assert_eq!(tree.event_route(c, RoutingStrategy::Tunnel), vec![root, a, c]);
    }

    #[test]
    fn direct_route_is_target_only() {
        let (tree, _, _, b, ..) = build_tree();
        assert_eq!(tree.event_route(b, RoutingStrategy::Direct), vec![b]);
    }

    #[test]
    fn route_of_missing_element_is_empty() {
        let (mut tree, _, _, _, c, _) = build_tree();
        tree.destroy(c);
        assert!(tree.event_route(c, RoutingStrategy::Bubble).is_empty());
    }

    #[test]
    fn popup_content_bubbles_through_popup() {
        let (mut tree, root, a, ..) = build_tree();
        let popup = tree.create(Popup::new());
        tree.append_child(a, popup);
        let content = tree.create(Panel::new());
        Popup::set_child(&mut tree, popup, content);
        assert_eq!(
            tree.event_route(content, RoutingStrategy::Bubble),
            vec![content, popup, a, root]
        );
    }

    // ── Raising ──────────────────────────────────────────────────────

    #[test]
    fn bubble_visits_target_then_ancestors() {
        let (mut tree, root, a, _, c, _) = build_tree();
        let log: Log = Arc::default();
        for id in [root, a, c] {
            record(&mut tree, id, POINTER_DOWN, &log, false);
        }
        let mut args = RoutedEventArgs::new(POINTER_DOWN, c, EventData::None);
        assert!(!tree.raise_event(c, &mut args));
        assert_eq!(*log.lock().unwrap(), vec![c, a, root]);
        assert_eq!(args.original_source, c);
    }

    #[test]
    fn handled_stops_the_route() {
        let (mut tree, root, a, _, c, _) = build_tree();
        let log: Log = Arc::default();
        record(&mut tree, c, POINTER_DOWN, &log, false);
        record(&mut tree, a, POINTER_DOWN, &log, true);
        record(&mut tree, root, POINTER_DOWN, &log, false);
        let mut args = RoutedEventArgs::new(POINTER_DOWN, c, EventData::None);
        assert!(tree.raise_event(c, &mut args));
        assert_eq!(*log.lock().unwrap(), vec![c, a]);
    }

    #[test]
    fn tunnel_visits_root_first() {
        let (mut tree, root, a, _, c, _) = build_tree();
        let log: Log = Arc::default();
        for id in [c, a, root] {
            record(&mut tree, id, PREVIEW_POINTER_DOWN, &log, false);
        }
        let mut args = RoutedEventArgs::new(PREVIEW_POINTER_DOWN, c, EventData::None);
        tree.raise_event(c, &mut args);
        assert_eq!(*log.lock().unwrap(), vec![root, a, c]);
    }

    #[test]
    fn direct_event_does_not_reach_parent() {
        let (mut tree, _, a, _, c, _) = build_tree();
        let log: Log = Arc::default();
        record(&mut tree, a, POINTER_ENTER, &log, false);
        let mut args = RoutedEventArgs::new(POINTER_ENTER, c, EventData::None);
        tree.raise_event(c, &mut args);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn other_events_are_not_delivered() {
        let (mut tree, _, _, _, c, _) = build_tree();
        let log: Log = Arc::default();
        record(&mut tree, c, PREVIEW_POINTER_DOWN, &log, false);
        let mut args = RoutedEventArgs::new(POINTER_DOWN, c, EventData::None);
        tree.raise_event(c, &mut args);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn handler_destroying_parent_is_safe() {
        let (mut tree, root, a, _, c, _) = build_tree();
        let log: Log = Arc::default();
        tree.add_handler(c, POINTER_DOWN, move |tree, _| tree.destroy(a))
            .unwrap();
        record(&mut tree, root, POINTER_DOWN, &log, false);
        let mut args = RoutedEventArgs::new(POINTER_DOWN, c, EventData::None);
        tree.raise_event(c, &mut args);
        // The route was computed before `a` went away; the root still sees it.
        assert_eq!(*log.lock().unwrap(), vec![root]);
        assert!(!tree.contains(a));
    }
}
