//! Keyboard focus: one focused element per focus scope.
//!
//! A [`FocusManager`] belongs to a window (or popup root); the root element
//! passed to its operations bounds the scope. Focus changes raise
//! `LOST_FOCUS` on the old element and then `GOT_FOCUS` on the new one.

use log::debug;

use crate::event::{EventData, RoutedEventArgs, GOT_FOCUS, LOST_FOCUS};
use crate::geometry::Point;
use crate::property::core::{FOCUSABLE, TAB_INDEX};
use crate::tree::{ElementId, ElementTree};

/// Weight of the perpendicular offset when scoring directional candidates.
const PERPENDICULAR_WEIGHT: f32 = 100.0;

/// Direction for [`FocusManager::move_focus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusNavigation {
    Next,
    Previous,
    Up,
    Down,
    Left,
    Right,
}

/// Tracks the focused element of one scope.
#[derive(Debug, Clone, Default)]
pub struct FocusManager {
    focused: Option<ElementId>,
    last_change: Option<(Option<ElementId>, Option<ElementId>)>,
}

impl FocusManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently focused element.
    pub fn focused(&self) -> Option<ElementId> {
        self.focused
    }

    /// `(old, new)` of the most recent focus change.
    pub fn last_change(&self) -> Option<(Option<ElementId>, Option<ElementId>)> {
        self.last_change
    }

    /// Whether `id` can take focus: `Focusable`, effectively visible and
    /// enabled. Layout state plays no part; a field that resizes itself
    /// keeps focus.
    pub fn is_focusable(tree: &ElementTree, id: ElementId) -> bool {
        tree.contains(id)
            && tree.get(id, FOCUSABLE)
            && tree.is_effectively_visible(id)
            && tree.is_effectively_enabled(id)
    }

    /// Focus `id`. Returns `false` without any change if `id` is not
    /// focusable. Focusing the focused element is a no-op returning `true`.
    pub fn set_focus(&mut self, tree: &mut ElementTree, id: ElementId) -> bool {
        if !Self::is_focusable(tree, id) {
            return false;
        }
        if self.focused == Some(id) {
            return true;
        }
        self.change(tree, Some(id));
        true
    }

    /// Drop focus. Returns `false` if nothing was focused.
    pub fn clear_focus(&mut self, tree: &mut ElementTree) -> bool {
        if self.focused.is_none() {
            return false;
        }
        self.change(tree, None);
        true
    }

    /// Drop focus if the focused element was destroyed or can no longer take
    /// focus. `LOST_FOCUS` is raised only on an element that still exists.
    pub fn validate(&mut self, tree: &mut ElementTree) {
        let Some(current) = self.focused else {
            return;
        };
        if !tree.contains(current) {
            self.focused = None;
            self.last_change = Some((Some(current), None));
        } else if !Self::is_focusable(tree, current) {
            self.change(tree, None);
        }
    }

    fn change(&mut self, tree: &mut ElementTree, new: Option<ElementId>) {
        let old = self.focused;
        self.focused = new;
        self.last_change = Some((old, new));
        debug!("focus {old:?} -> {new:?}");

        let data = EventData::Focus { old, new };
        if let Some(old) = old.filter(|&o| tree.contains(o)) {
            let mut args = RoutedEventArgs::new(LOST_FOCUS, old, data.clone());
            tree.raise_event(old, &mut args);
        }
        if let Some(new) = new.filter(|&n| tree.contains(n)) {
            let mut args = RoutedEventArgs::new(GOT_FOCUS, new, data);
            tree.raise_event(new, &mut args);
        }
    }

    /// Focusable elements under `root` in tab order: logical pre-order,
    /// stably sorted by `TabIndex`. Elements outside `root`'s visual subtree
    /// (popup content) belong to another scope and are skipped.
    pub fn focusables(tree: &ElementTree, root: ElementId) -> Vec<ElementId> {
        let mut out: Vec<ElementId> = tree
            .walk_logical(root)
            .into_iter()
            .filter(|&id| tree.is_in_subtree(root, id) && Self::is_focusable(tree, id))
            .collect();
        out.sort_by_key(|&id| tree.get(id, TAB_INDEX));
        out
    }

    /// Move focus within `root`'s scope. Returns whether focus moved.
    ///
    /// `Next`/`Previous` wrap around. With nothing focused they pick the
    /// first/last element. Directional moves pick the closest candidate
    /// strictly in that direction from the focused element's center and
    /// never wrap.
    pub fn move_focus(
        &mut self,
        tree: &mut ElementTree,
        root: ElementId,
        direction: FocusNavigation,
    ) -> bool {
        let candidates = Self::focusables(tree, root);
        if candidates.is_empty() {
            return false;
        }
        let current = self.focused.and_then(|f| candidates.iter().position(|&c| c == f));

        let target = match direction {
            FocusNavigation::Next => match current {
                Some(i) => candidates[(i + 1) % candidates.len()],
                None => candidates[0],
            },
            FocusNavigation::Previous => match current {
                Some(i) => candidates[(i + candidates.len() - 1) % candidates.len()],
                None => candidates[candidates.len() - 1],
            },
            _ => {
                let Some(from) = self.focused.filter(|_| current.is_some()) else {
                    return false;
                };
                match directional_target(tree, from, &candidates, direction) {
                    Some(t) => t,
                    None => return false,
                }
            }
        };

        if Some(target) == self.focused {
            return false;
        }
        self.set_focus(tree, target)
    }
}

fn center_of(tree: &ElementTree, id: ElementId) -> Option<Point> {
    tree.absolute_bounds(id).map(|r| r.center())
}

fn directional_target(
    tree: &ElementTree,
    from: ElementId,
    candidates: &[ElementId],
    direction: FocusNavigation,
) -> Option<ElementId> {
    let origin = center_of(tree, from)?;
    let mut best: Option<(f32, ElementId)> = None;

    for &candidate in candidates {
        if candidate == from {
            continue;
        }
        let Some(c) = center_of(tree, candidate) else {
            continue;
        };
        let dx = c.x - origin.x;
        let dy = c.y - origin.y;
        let (along, across) = match direction {
            FocusNavigation::Right => (dx, dy),
            FocusNavigation::Left => (-dx, dy),
            FocusNavigation::Down => (dy, dx),
            FocusNavigation::Up => (-dy, dx),
            FocusNavigation::Next | FocusNavigation::Previous => return None,
        };
        if along <= 0.0 {
            continue;
        }
        let score = origin.distance(c) + PERPENDICULAR_WEIGHT * across.abs();
        if best.is_none_or(|(s, _)| score < s) {
            best = Some((score, candidate));
        }
    }
    best.map(|(_, id)| id)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::geometry::Size;
    use crate::layout::update_layout;
    use crate::property::core::{HEIGHT, IS_ENABLED, VISIBILITY, Visibility, WIDTH};
    use crate::property::PropertyRegistry;
    use crate::widgets::{Canvas, Panel, StackPanel};

    fn focusable(tree: &mut ElementTree) -> ElementId {
        let id = tree.create(Panel::new());
        tree.set_value(id, FOCUSABLE, true).unwrap();
        tree.set_value(id, HEIGHT, 20.0).unwrap();
        id
    }

    /// Vertical stack of three focusable panels.
    fn build_tree() -> (ElementTree, ElementId, [ElementId; 3]) {
        let mut tree = ElementTree::new(Arc::new(PropertyRegistry::new()));
        let root = tree.create(StackPanel::vertical());
        tree.set_root(root);
        let items = [focusable(&mut tree), focusable(&mut tree), focusable(&mut tree)];
        for id in items {
            tree.append_child(root, id);
        }
        update_layout(&mut tree, root, Size::new(100.0, 100.0));
        (tree, root, items)
    }

    /// 3x3 grid on a canvas. Cell (r, c) sits at x = c * 100, y = r * 100.
    fn build_grid() -> (ElementTree, ElementId, Vec<Vec<ElementId>>) {
        let mut tree = ElementTree::new(Arc::new(PropertyRegistry::new()));
        let props = Canvas::properties(tree.registry()).unwrap();
        let root = tree.create(Canvas::new());
        tree.set_root(root);
        let mut grid = Vec::new();
        for r in 0..3 {
            let mut row = Vec::new();
            for c in 0..3 {
                let id = tree.create(Panel::new());
                tree.set_value(id, FOCUSABLE, true).unwrap();
                tree.set_value(id, WIDTH, 80.0).unwrap();
                tree.set_value(id, HEIGHT, 40.0).unwrap();
                tree.set_value(id, props.left, c as f32 * 100.0).unwrap();
                tree.set_value(id, props.top, r as f32 * 100.0).unwrap();
                tree.append_child(root, id);
                row.push(id);
            }
            grid.push(row);
        }
        update_layout(&mut tree, root, Size::new(400.0, 400.0));
        (tree, root, grid)
    }

    // ── set_focus ────────────────────────────────────────────────────

    #[test]
    fn set_focus_raises_lost_then_got() {
        let (mut tree, root, [a, b, _]) = build_tree();
        let log = Arc::new(Mutex::new(Vec::new()));
        let l = log.clone();
        tree.add_handler(root, LOST_FOCUS, move |_, args| {
            l.lock().unwrap().push(("lost", args.original_source));
        })
        .unwrap();
        let l = log.clone();
        tree.add_handler(root, GOT_FOCUS, move |_, args| {
            l.lock().unwrap().push(("got", args.original_source));
        })
        .unwrap();

        let mut focus = FocusManager::new();
        assert!(focus.set_focus(&mut tree, a));
        assert!(focus.set_focus(&mut tree, b));
        assert_eq!(focus.focused(), Some(b));
        assert_eq!(focus.last_change(), Some((Some(a), Some(b))));
        assert_eq!(
            *log.lock().unwrap(),
            vec![("got", a), ("lost", a), ("got", b)]
        );
    }

    #[test]
    fn unfocusable_elements_are_refused() {
        let (mut tree, root, [a, b, c]) = build_tree();
        let mut focus = FocusManager::new();
        assert!(!focus.set_focus(&mut tree, root));
        tree.set_value(a, IS_ENABLED, false).unwrap();
        assert!(!focus.set_focus(&mut tree, a));
        tree.set_value(b, VISIBILITY, Visibility::Hidden).unwrap();
        assert!(!focus.set_focus(&mut tree, b));
        assert!(focus.set_focus(&mut tree, c));
    }

    #[test]
    fn validate_drops_destroyed_focus() {
        let (mut tree, _, [a, ..]) = build_tree();
        let mut focus = FocusManager::new();
        focus.set_focus(&mut tree, a);
        tree.destroy(a);
        focus.validate(&mut tree);
        assert_eq!(focus.focused(), None);
    }

    // ── Tab order ────────────────────────────────────────────────────

    #[test]
    fn next_wraps_around() {
        let (mut tree, root, [a, _, c]) = build_tree();
        let mut focus = FocusManager::new();
        assert!(focus.move_focus(&mut tree, root, FocusNavigation::Next));
        assert_eq!(focus.focused(), Some(a));
        focus.move_focus(&mut tree, root, FocusNavigation::Next);
        focus.move_focus(&mut tree, root, FocusNavigation::Next);
        assert_eq!(focus.focused(), Some(c));
        focus.move_focus(&mut tree, root, FocusNavigation::Next);
        assert_eq!(focus.focused(), Some(a));
        focus.move_focus(&mut tree, root, FocusNavigation::Previous);
        assert_eq!(focus.focused(), Some(c));
    }

    #[test]
    fn tab_index_orders_before_tree_order() {
        let (mut tree, root, [a, b, c]) = build_tree();
        tree.set_value(c, TAB_INDEX, 0).unwrap();
        assert_eq!(FocusManager::focusables(&tree, root), vec![c, a, b]);
    }

    #[test]
    fn empty_scope_returns_false() {
        let mut tree = ElementTree::new(Arc::new(PropertyRegistry::new()));
        let root = tree.create(Panel::new());
        update_layout(&mut tree, root, Size::new(10.0, 10.0));
        let mut focus = FocusManager::new();
        assert!(!focus.move_focus(&mut tree, root, FocusNavigation::Next));
        assert_eq!(focus.focused(), None);
    }

    // ── Directional ──────────────────────────────────────────────────

    #[test]
    fn directional_moves_in_grid() {
        let (mut tree, root, grid) = build_grid();
        let mut focus = FocusManager::new();
        focus.set_focus(&mut tree, grid[1][1]);
        assert!(focus.move_focus(&mut tree, root, FocusNavigation::Right));
        assert_eq!(focus.focused(), Some(grid[1][2]));

        focus.set_focus(&mut tree, grid[1][1]);
        assert!(focus.move_focus(&mut tree, root, FocusNavigation::Down));
        assert_eq!(focus.focused(), Some(grid[2][1]));

        focus.set_focus(&mut tree, grid[1][1]);
        assert!(focus.move_focus(&mut tree, root, FocusNavigation::Up));
        assert_eq!(focus.focused(), Some(grid[0][1]));
    }

    #[test]
    fn directional_at_edge_does_not_wrap() {
        let (mut tree, root, grid) = build_grid();
        let mut focus = FocusManager::new();
        focus.set_focus(&mut tree, grid[0][2]);
        assert!(!focus.move_focus(&mut tree, root, FocusNavigation::Right));
        assert_eq!(focus.focused(), Some(grid[0][2]));
    }

    #[test]
    fn directional_without_focus_is_noop() {
        let (mut tree, root, _) = build_grid();
        let mut focus = FocusManager::new();
        assert!(!focus.move_focus(&mut tree, root, FocusNavigation::Left));
    }
}
