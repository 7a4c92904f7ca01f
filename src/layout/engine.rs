//! Measure/arrange passes, invalidation and the settle loop.
//!
//! [`ElementTree::measure`] and [`ElementTree::arrange`] implement the
//! per-element framework contract (margins, explicit sizes, min/max clamps,
//! alignment, collapsed elements) around each widget's `measure_core` and
//! `arrange_core`. [`update_layout`] repeatedly re-runs the first invalid
//! element in pre-order until the tree is clean.

use crate::error::UiError;
use crate::geometry::{Rect, Size, Thickness};
use crate::property::core::{
    HEIGHT, HORIZONTAL_ALIGNMENT, MARGIN, MAX_HEIGHT, MAX_WIDTH, MIN_HEIGHT, MIN_WIDTH,
    VERTICAL_ALIGNMENT, VISIBILITY, WIDTH,
};
use crate::property::{HorizontalAlignment, Property, PropertyValue, VerticalAlignment, Visibility};
use crate::tree::{ElementId, ElementTree, LayoutState};

// ---------------------------------------------------------------------------
// LayoutCx
// ---------------------------------------------------------------------------

/// Context handed to `measure_core` / `arrange_core`.
pub struct LayoutCx<'a> {
    tree: &'a mut ElementTree,
    id: ElementId,
}

impl<'a> LayoutCx<'a> {
    pub(crate) fn new(tree: &'a mut ElementTree, id: ElementId) -> Self {
        Self { tree, id }
    }

    /// The element being laid out.
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Read-only access to the tree.
    pub fn tree(&self) -> &ElementTree {
        self.tree
    }

    /// Visual children of the element, in insertion order.
    pub fn children(&self) -> Vec<ElementId> {
        self.tree.visual_children(self.id).to_vec()
    }

    /// A property of the element being laid out.
    pub fn get<T: PropertyValue>(&self, property: Property<T>) -> T {
        self.tree.get(self.id, property)
    }

    /// A property of another element, typically a child's attached property.
    pub fn get_of<T: PropertyValue>(&self, id: ElementId, property: Property<T>) -> T {
        self.tree.get(id, property)
    }

    /// Measure a child; returns its margin-inclusive desired size.
    pub fn measure_child(&mut self, child: ElementId, available: Size) -> Size {
        self.tree.measure(child, available)
    }

    /// The child's desired size from its last measure.
    pub fn desired_size_of(&self, child: ElementId) -> Size {
        self.tree.desired_size(child).unwrap_or(Size::ZERO)
    }

    /// Arrange a child in `slot` (local coordinates of this element).
    pub fn arrange_child(&mut self, child: ElementId, slot: Rect) {
        self.tree.arrange(child, slot);
    }
}

/// Resolved `[min, max]` sizes, with an explicit `Width`/`Height` pinned
/// inside the min/max range.
#[derive(Debug, Clone, Copy)]
struct SizeBounds {
    min: Size,
    max: Size,
}

impl SizeBounds {
    fn clamp(&self, size: Size) -> Size {
        Size::new(
            size.width.max(self.min.width).min(self.max.width),
            size.height.max(self.min.height).min(self.max.height),
        )
    }
}

fn axis_bounds(explicit: f32, min: f32, max: f32) -> (f32, f32) {
    let max = max.max(min);
    if explicit.is_nan() {
        (min, max)
    } else {
        let pinned = explicit.max(min).min(max);
        (pinned, pinned)
    }
}

fn sanitize(size: Size) -> Size {
    let fix = |v: f32| if v.is_nan() { 0.0 } else { v.max(0.0) };
    Size::new(fix(size.width), fix(size.height))
}

impl ElementTree {
    // ── Queries ──────────────────────────────────────────────────────

    pub fn layout_state(&self, id: ElementId) -> Option<&LayoutState> {
        self.nodes.get(id).map(|d| &d.layout)
    }

    /// Margin-inclusive desired size. `None` unless measure-valid.
    pub fn desired_size(&self, id: ElementId) -> Option<Size> {
        self.layout_state(id)
            .filter(|l| l.measure_valid)
            .map(|l| l.desired)
    }

    /// The element's box in its parent's coordinates from the last arrange.
    /// Stays readable while arrange is invalid, so input between frames hits
    /// what is on screen. `None` if never arranged, and for collapsed
    /// elements.
    pub fn layout_rect(&self, id: ElementId) -> Option<Rect> {
        self.layout_state(id).and_then(|l| l.layout_rect)
    }

    /// The slot the parent offered in the last arrange.
    pub fn layout_slot(&self, id: ElementId) -> Option<Rect> {
        self.layout_state(id).and_then(|l| l.layout_slot)
    }

    /// Size returned by the last `arrange_core`.
    pub fn render_size(&self, id: ElementId) -> Size {
        self.layout_state(id)
            .map(|l| l.render_size)
            .unwrap_or(Size::ZERO)
    }

    pub fn is_measure_valid(&self, id: ElementId) -> bool {
        self.layout_state(id).is_some_and(|l| l.measure_valid)
    }

    pub fn is_arrange_valid(&self, id: ElementId) -> bool {
        self.layout_state(id).is_some_and(|l| l.arrange_valid)
    }

    // ── Invalidation ─────────────────────────────────────────────────

    /// Clear measure-valid and arrange-valid on `id`, and arrange-valid on
    /// every visual ancestor.
    pub fn invalidate_measure(&mut self, id: ElementId) {
        let Some(data) = self.nodes.get_mut(id) else {
            return;
        };
        data.layout.measure_valid = false;
        self.invalidate_arrange(id);
    }

    /// Clear arrange-valid on `id` and every visual ancestor.
    pub fn invalidate_arrange(&mut self, id: ElementId) {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if let Some(data) = self.nodes.get_mut(current) {
                data.layout.arrange_valid = false;
            }
            cursor = self.visual_parent(current);
        }
    }

    // ── Measure ──────────────────────────────────────────────────────

    fn size_bounds(&self, id: ElementId) -> SizeBounds {
        let (min_w, max_w) = axis_bounds(
            self.get(id, WIDTH),
            self.get(id, MIN_WIDTH),
            self.get(id, MAX_WIDTH),
        );
        let (min_h, max_h) = axis_bounds(
            self.get(id, HEIGHT),
            self.get(id, MIN_HEIGHT),
            self.get(id, MAX_HEIGHT),
        );
        SizeBounds {
            min: Size::new(min_w, min_h),
            max: Size::new(max_w, max_h),
        }
    }

    /// Measure `id` against `available` (margin-inclusive) and return its
    /// margin-inclusive desired size.
    pub fn measure(&mut self, id: ElementId, available: Size) -> Size {
        let Some(data) = self.nodes.get(id) else {
            return Size::ZERO;
        };
        if data.layout.measure_valid && data.layout.last_available == Some(available) {
            return data.layout.desired;
        }

        if self.get(id, VISIBILITY) == Visibility::Collapsed {
            self.store_measure(id, available, Size::ZERO);
            return Size::ZERO;
        }

        let margin: Thickness = self.get(id, MARGIN);
        let bounds = self.size_bounds(id);
        let constrained = bounds.clamp(available.deflate(margin).non_negative());

        let content = match self.take_widget(id) {
            Some(mut widget) => {
                let result = widget.measure_core(&mut LayoutCx::new(self, id), constrained);
                self.restore_widget(id, widget);
                match result {
                    Ok(size) => sanitize(size),
                    Err(err) => {
                        self.report_layout_failure(id, "measure", &err);
                        Size::ZERO
                    }
                }
            }
            None => Size::ZERO,
        };

        let desired = bounds.clamp(content).inflate(margin).non_negative();
        self.store_measure(id, available, desired);
        desired
    }

    fn store_measure(&mut self, id: ElementId, available: Size, desired: Size) {
        if let Some(data) = self.nodes.get_mut(id) {
            data.layout.desired = desired;
            data.layout.last_available = Some(available);
            data.layout.measure_valid = true;
        }
    }

    // ── Arrange ──────────────────────────────────────────────────────

    /// Arrange `id` in `slot` (parent coordinates, margin-inclusive).
    pub fn arrange(&mut self, id: ElementId, slot: Rect) {
        let Some(data) = self.nodes.get(id) else {
            return;
        };
        if data.layout.arrange_valid && data.layout.layout_slot == Some(slot) {
            return;
        }

        if self.get(id, VISIBILITY) == Visibility::Collapsed {
            if let Some(data) = self.nodes.get_mut(id) {
                data.layout.layout_rect = None;
                data.layout.layout_slot = Some(slot);
                data.layout.render_size = Size::ZERO;
                data.layout.arrange_valid = true;
            }
            return;
        }

        if !self.is_measure_valid(id) {
            let available = self
                .layout_state(id)
                .and_then(|l| l.last_available)
                .unwrap_or(slot.size());
            self.measure(id, available);
        }

        let margin: Thickness = self.get(id, MARGIN);
        let inner = slot.deflate(margin);
        let bounds = self.size_bounds(id);
        let desired = self
            .layout_state(id)
            .map(|l| l.desired)
            .unwrap_or(Size::ZERO)
            .deflate(margin)
            .non_negative();

        let h_align: HorizontalAlignment = self.get(id, HORIZONTAL_ALIGNMENT);
        let v_align: VerticalAlignment = self.get(id, VERTICAL_ALIGNMENT);
        let mut size = desired;
        if h_align == HorizontalAlignment::Stretch {
            size.width = size.width.max(inner.width);
        }
        if v_align == VerticalAlignment::Stretch {
            size.height = size.height.max(inner.height);
        }
        let size = bounds.clamp(size);

        let x = inner.x
            + match h_align {
                _ if size.width >= inner.width => 0.0,
                HorizontalAlignment::Left => 0.0,
                HorizontalAlignment::Center | HorizontalAlignment::Stretch => {
                    (inner.width - size.width) / 2.0
                }
                HorizontalAlignment::Right => inner.width - size.width,
            };
        let y = inner.y
            + match v_align {
                _ if size.height >= inner.height => 0.0,
                VerticalAlignment::Top => 0.0,
                VerticalAlignment::Center | VerticalAlignment::Stretch => {
                    (inner.height - size.height) / 2.0
                }
                VerticalAlignment::Bottom => inner.height - size.height,
            };

        let render_size = match self.take_widget(id) {
            Some(mut widget) => {
                let result = widget.arrange_core(&mut LayoutCx::new(self, id), size);
                self.restore_widget(id, widget);
                match result {
                    Ok(rendered) => sanitize(rendered),
                    Err(err) => {
                        self.report_layout_failure(id, "arrange", &err);
                        Size::ZERO
                    }
                }
            }
            None => size,
        };

        if let Some(data) = self.nodes.get_mut(id) {
            data.layout.layout_slot = Some(slot);
            data.layout.layout_rect = Some(Rect::new(x, y, render_size.width, render_size.height));
            data.layout.render_size = render_size;
            data.layout.arrange_valid = true;
        }
        self.invalidate_visual(id);
    }

    fn report_layout_failure(&mut self, id: ElementId, phase: &str, err: &UiError) {
        let Some(data) = self.nodes.get_mut(id) else {
            return;
        };
        if !data.layout.failure_reported {
            data.layout.failure_reported = true;
            log::error!("{phase} failed for {} {id:?}: {err}", data.type_name);
        }
    }

    /// Every element below `root` matching `pred`, in pre-order, from a
    /// single walk. Children of collapsed elements are never laid out and are
    /// skipped.
    pub(crate) fn dirty_in_layout_order(
        &self,
        root: ElementId,
        pred: impl Fn(&LayoutState) -> bool,
    ) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(current) = stack.pop() {
            let Some(data) = self.nodes.get(current) else {
                continue;
            };
            if pred(&data.layout) {
                out.push(current);
            }
            if self.get(current, VISIBILITY) == Visibility::Collapsed {
                continue;
            }
            stack.extend(self.visual_children(current).iter().rev().copied());
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Settle loop
// ---------------------------------------------------------------------------

/// Bring the subtree at `root` to a fully measured and arranged state.
///
/// `root` is measured with `available` and arranged at the origin; an
/// infinite axis is arranged at the root's desired size. Returns `true` if
/// any element was measured or arranged.
pub fn update_layout(tree: &mut ElementTree, root: ElementId, available: Size) -> bool {
    if !tree.contains(root) {
        return false;
    }
    if tree.layout_state(root).and_then(|l| l.last_available) != Some(available) {
        tree.invalidate_measure(root);
    }

    let budget = tree.len() * 4 + 16;
    let mut changed = false;
    for _ in 0..budget {
        let dirty = tree.dirty_in_layout_order(root, |l| !l.measure_valid);
        if !dirty.is_empty() {
            changed = true;
            for id in dirty {
                // An ancestor measured earlier in this round may have
                // re-measured it already.
                if tree.is_measure_valid(id) {
                    continue;
                }
                settle_measure(tree, root, id, available);
            }
            continue;
        }

        let dirty = tree.dirty_in_layout_order(root, |l| !l.arrange_valid);
        if !dirty.is_empty() {
            changed = true;
            for id in dirty {
                if tree.is_arrange_valid(id) || !tree.is_measure_valid(id) {
                    continue;
                }
                settle_arrange(tree, root, id, available);
            }
            continue;
        }

        return changed;
    }

    log::warn!("layout did not settle within {budget} passes for {root:?}");
    changed
}

fn settle_measure(tree: &mut ElementTree, root: ElementId, id: ElementId, available: Size) {
    let parent = tree.visual_parent(id).filter(|_| id != root);
    let before = tree.layout_state(id).map(|l| l.desired);
    let last = tree.layout_state(id).and_then(|l| l.last_available);
    match (parent, last) {
        (None, _) => {
            tree.measure(id, available);
        }
        (Some(parent), Some(last)) => {
            let after = tree.measure(id, last);
            if before != Some(after) {
                tree.invalidate_measure(parent);
            }
        }
        (Some(parent), None) => tree.invalidate_measure(parent),
    }
}

fn settle_arrange(tree: &mut ElementTree, root: ElementId, id: ElementId, available: Size) {
    if id == root {
        let desired = tree.desired_size(root).unwrap_or(Size::ZERO);
        let width = if available.width.is_finite() { available.width } else { desired.width };
        let height = if available.height.is_finite() {
            available.height
        } else {
            desired.height
        };
        tree.arrange(root, Rect::new(0.0, 0.0, width, height));
    } else {
        // An element its parent never arranged is parked at its desired
        // size.
        let slot = tree
            .layout_slot(id)
            .unwrap_or_else(|| tree.desired_size(id).unwrap_or(Size::ZERO).to_rect());
        tree.arrange(id, slot);
    }
}

// ===========================================================================
// Tests
// ===========================================================================
