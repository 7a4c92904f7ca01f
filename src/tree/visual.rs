//! Transforms, effective visibility and hit testing.

use super::node::ElementId;
use super::tree::ElementTree;
use crate::geometry::{Matrix3x2, Point, Rect};
use crate::property::core::{
    CLIP, IS_ENABLED, IS_HIT_TEST_VISIBLE, RENDER_TRANSFORM, RENDER_TRANSFORM_ORIGIN, VISIBILITY,
};
use crate::property::Visibility;

impl ElementTree {
    /// The render transform of `id` applied about its transform origin, in
    /// the element's own coordinate space.
    pub fn render_transform(&self, id: ElementId) -> Matrix3x2 {
        let Some(rt) = self.get(id, RENDER_TRANSFORM) else {
            return Matrix3x2::IDENTITY;
        };
        let size = self.render_size(id);
        let origin = self.get(id, RENDER_TRANSFORM_ORIGIN);
        let (ox, oy) = (origin.x * size.width, origin.y * size.height);
        Matrix3x2::translation(-ox, -oy)
            .then(&rt)
            .then(&Matrix3x2::translation(ox, oy))
    }

    /// Maps `id`'s local coordinates into its visual parent's coordinates:
    /// the render transform, then translation by the layout origin.
    pub fn local_transform(&self, id: ElementId) -> Matrix3x2 {
        let origin = self
            .layout_rect(id)
            .map(Rect::origin)
            .unwrap_or(Point::ZERO);
        self.render_transform(id)
            .then(&Matrix3x2::translation(origin.x, origin.y))
    }

    /// Maps `id`'s local coordinates into the coordinates of its visual root.
    pub fn absolute_transform(&self, id: ElementId) -> Matrix3x2 {
        let mut matrix = self.local_transform(id);
        for ancestor in self.ancestors(id) {
            matrix = matrix.then(&self.local_transform(ancestor));
        }
        matrix
    }

    /// Axis-aligned bounds of `id`'s render box in visual-root coordinates.
    /// Uses the last arranged box. `None` if the element was never arranged.
    pub fn absolute_bounds(&self, id: ElementId) -> Option<Rect> {
        self.layout_rect(id)?;
        let local = self.render_size(id).to_rect();
        Some(self.absolute_transform(id).transform_rect(local))
    }

    /// Map a visual-root point into `id`'s local coordinates.
    pub fn to_local(&self, id: ElementId, point: Point) -> Option<Point> {
        self.absolute_transform(id)
            .invert()
            .map(|inv| inv.transform_point(point))
    }

    /// `Visible` on `id` and every visual ancestor.
    pub fn is_effectively_visible(&self, id: ElementId) -> bool {
        self.contains(id)
            && std::iter::once(id)
                .chain(self.ancestors(id))
                .all(|e| self.get(e, VISIBILITY) == Visibility::Visible)
    }

    /// `IsEnabled` on `id` and every visual ancestor.
    pub fn is_effectively_enabled(&self, id: ElementId) -> bool {
        self.contains(id)
            && std::iter::once(id)
                .chain(self.ancestors(id))
                .all(|e| self.get(e, IS_ENABLED))
    }

    // ── Hit testing ──────────────────────────────────────────────────

    /// Deepest visible, enabled, hit-testable element under `point`, which is
    /// given in the coordinates of `root`'s visual parent (window
    /// coordinates when `root` is the window root).
    pub fn hit_test(&self, root: ElementId, point: Point) -> Option<ElementId> {
        self.hit_test_element(root, point)
    }

    fn hit_test_element(&self, id: ElementId, point: Point) -> Option<ElementId> {
        if !self.is_hit_candidate(id) {
            return None;
        }
        self.layout_rect(id)?;
        let local = self
            .local_transform(id)
            .invert()?
            .transform_point(point);

        let bounds = self.render_size(id).to_rect();
        if !bounds.contains(local) {
            return None;
        }
        let clip = self.get(id, CLIP);
        if !clip.is_empty() && !clip.contains(local) {
            return None;
        }

        for &child in self.visual_children(id).iter().rev() {
            if let Some(hit) = self.hit_test_element(child, local) {
                return Some(hit);
            }
        }

        let own = self
            .widget(id)
            .is_none_or(|w| w.hit_test_core(local, bounds));
        own.then_some(id)
    }

    fn is_hit_candidate(&self, id: ElementId) -> bool {
        self.contains(id)
            && self.get(id, VISIBILITY) == Visibility::Visible
            && self.get(id, IS_ENABLED)
            && self.get(id, IS_HIT_TEST_VISIBLE)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
