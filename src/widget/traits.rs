//! Widget trait: layout hooks, rendering, hit testing.
//!
//! The `Widget` trait is the per-type behavior attached to an element. The
//! element tree owns structure and property values; a widget only supplies
//! the virtual hooks that differ between element types. While a hook runs,
//! the widget is taken out of the tree, so hooks receive `&mut self` and a
//! context with full access to the tree.

use std::any::Any;

use crate::error::Result;
use crate::geometry::{Point, Rect, Size};
use crate::layout::LayoutCx;
use crate::render::RenderCx;

// ---------------------------------------------------------------------------
// Widget trait
// ---------------------------------------------------------------------------

/// Core trait implemented by all widgets.
///
/// Widget is object-safe; elements hold a `Box<dyn Widget>`.
pub trait Widget: Any + Send {
    /// The type name for this widget (e.g. "Panel", "Border").
    ///
    /// Used for diagnostics and render-list snapshots.
    fn type_name(&self) -> &'static str;

    /// Compute the content size for `available`, which has margins already
    /// removed and min/max constraints applied. Children are measured with
    /// [`LayoutCx::measure_child`].
    ///
    /// The default overlays all children: the result is the largest child.
    fn measure_core(&mut self, cx: &mut LayoutCx<'_>, available: Size) -> Result<Size> {
        let mut size = Size::ZERO;
        for child in cx.children() {
            size = size.max(cx.measure_child(child, available));
        }
        Ok(size)
    }

    /// Position children inside `size` (local coordinates) and return the
    /// element's render size.
    ///
    /// The default gives every child the full area.
    fn arrange_core(&mut self, cx: &mut LayoutCx<'_>, size: Size) -> Result<Size> {
        for child in cx.children() {
            cx.arrange_child(child, size.to_rect());
        }
        Ok(size)
    }

    /// Emit this element's own draw commands in local coordinates. Children
    /// are emitted by the builder afterwards.
    fn render(&self, _cx: &mut RenderCx<'_>) -> Result<()> {
        Ok(())
    }

    /// Whether `point` (local coordinates) hits this element, given that no
    /// child was hit and the point lies within `bounds`.
    fn hit_test_core(&self, point: Point, bounds: Rect) -> bool {
        bounds.contains(point)
    }

    /// Whether children are clipped to this element's bounds regardless of
    /// the `ClipToBounds` property.
    fn clip_to_bounds(&self) -> bool {
        false
    }

    /// Copy this widget for template instantiation.
    fn clone_widget(&self) -> Box<dyn Widget>;

    /// Downcast to `&dyn Any` for runtime type inspection.
    fn as_any(&self) -> &dyn Any;

    /// Downcast to `&mut dyn Any` for mutable runtime type inspection.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::error::UiError;
    use crate::layout::update_layout;
    use crate::property::PropertyRegistry;
    use crate::tree::ElementTree;
    use crate::widgets::Panel;

    // -----------------------------------------------------------------------
    // Test widgets
    // -----------------------------------------------------------------------

    #[derive(Clone)]
    struct Fixed(Size);

    impl Widget for Fixed {
        fn type_name(&self) -> &'static str {
            "Fixed"
        }

        fn measure_core(&mut self, _cx: &mut LayoutCx<'_>, _available: Size) -> Result<Size> {
            Ok(self.0)
        }

        fn clone_widget(&self) -> Box<dyn Widget> {
            Box::new(self.clone())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    /// Hits only the left half of its bounds.
    #[derive(Clone)]
    struct LeftHalf;

    impl Widget for LeftHalf {
        fn type_name(&self) -> &'static str {
            "LeftHalf"
        }

        fn hit_test_core(&self, point: Point, bounds: Rect) -> bool {
            point.x < bounds.width / 2.0
        }

        fn measure_core(&mut self, _cx: &mut LayoutCx<'_>, _available: Size) -> Result<Size> {
            Err(UiError::Widget("never measures".into()))
        }

        fn clone_widget(&self) -> Box<dyn Widget> {
            Box::new(self.clone())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    // -----------------------------------------------------------------------
    // Default hooks
    // -----------------------------------------------------------------------

    #[test]
    fn default_measure_overlays_children() {
        let mut tree = ElementTree::new(Arc::new(PropertyRegistry::new()));
        let root = tree.create(Panel::new());
        let a = tree.create(Fixed(Size::new(30.0, 10.0)));
        let b = tree.create(Fixed(Size::new(20.0, 40.0)));
        tree.append_child(root, a);
        tree.append_child(root, b);
        update_layout(&mut tree, root, Size::INFINITE);
        assert_eq!(tree.desired_size(root), Some(Size::new(30.0, 40.0)));
        assert_eq!(tree.layout_rect(a), Some(Rect::new(0.0, 0.0, 30.0, 40.0)));
    }

    #[test]
    fn custom_hit_test_and_failed_measure() {
        let mut tree = ElementTree::new(Arc::new(PropertyRegistry::new()));
        let root = tree.create(Panel::new());
        let half = tree.create(LeftHalf);
        tree.append_child(root, half);
        update_layout(&mut tree, root, Size::new(100.0, 100.0));
        // Failed measure counts as zero; stretch alignment still fills the slot.
        assert_eq!(tree.desired_size(half), Some(Size::ZERO));
        assert_eq!(tree.hit_test(root, Point::new(10.0, 10.0)), Some(half));
        assert_eq!(tree.hit_test(root, Point::new(90.0, 10.0)), Some(root));
    }

    #[test]
    fn clone_widget_preserves_type() {
        let fixed = Fixed(Size::new(1.0, 2.0));
        let copy = fixed.clone_widget();
        assert_eq!(copy.type_name(), "Fixed");
        assert!(copy.as_any().downcast_ref::<Fixed>().is_some());
    }
}
