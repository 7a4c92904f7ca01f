//! Canvas widget: absolute positioning through attached properties.

use std::any::Any;

use crate::error::Result;
use crate::geometry::{Rect, Size};
use crate::layout::LayoutCx;
use crate::property::{Property, PropertyChangedArgs, PropertyMetadata, PropertyRegistry};
use crate::tree::ElementTree;
use crate::widget::Widget;

/// Handles for `Canvas.Left` and `Canvas.Top`.
#[derive(Debug, Clone, Copy)]
pub struct CanvasProperties {
    pub left: Property<f32>,
    pub top: Property<f32>,
}

/// A position change moves the child inside its parent.
fn rearrange_parent(tree: &mut ElementTree, args: &PropertyChangedArgs) {
    if let Some(parent) = tree.visual_parent(args.element) {
        tree.invalidate_arrange(parent);
    }
}

// ---------------------------------------------------------------------------
// Canvas
// ---------------------------------------------------------------------------

/// Places each child at `(Canvas.Left, Canvas.Top)` with its desired size.
/// Children are measured with unbounded space and the canvas itself has no
/// content size.
///
/// # Examples
///
/// ```ignore
/// let props = Canvas::properties(tree.registry())?;
/// tree.set_value(child, props.left, 40.0)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Canvas;

impl Canvas {
    pub fn new() -> Self {
        Self
    }

    /// Look up the attached properties, registering them on first use.
    pub fn properties(registry: &PropertyRegistry) -> Result<CanvasProperties> {
        Ok(CanvasProperties {
            left: attached(registry, "Left")?,
            top: attached(registry, "Top")?,
        })
    }
}

fn attached(registry: &PropertyRegistry, name: &'static str) -> Result<Property<f32>> {
    if let Some(handle) = registry.lookup_typed("Canvas", name) {
        return Ok(handle);
    }
    registry.register_attached_typed(
        name,
        "Canvas",
        PropertyMetadata::new(0.0_f32)
            .with_validator(|v| v.as_float().is_some_and(f32::is_finite))
            .on_changed(rearrange_parent),
    )
}

impl Widget for Canvas {
    fn type_name(&self) -> &'static str {
        "Canvas"
    }

    fn measure_core(&mut self, cx: &mut LayoutCx<'_>, _available: Size) -> Result<Size> {
        for child in cx.children() {
            cx.measure_child(child, Size::INFINITE);
        }
        Ok(Size::ZERO)
    }

    fn arrange_core(&mut self, cx: &mut LayoutCx<'_>, size: Size) -> Result<Size> {
        let props = Canvas::properties(cx.tree().registry())?;
        for child in cx.children() {
            let desired = cx.desired_size_of(child);
            let slot = Rect::new(
                cx.get_of(child, props.left),
                cx.get_of(child, props.top),
                desired.width,
                desired.height,
            );
            cx.arrange_child(child, slot);
        }
        Ok(size)
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

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::layout::update_layout;
    use crate::property::core::{HEIGHT, WIDTH};
    use crate::widgets::Rectangle;

    #[test]
    fn properties_are_registered_once() {
        let registry = PropertyRegistry::new();
        let before = registry.len();
        let first = Canvas::properties(&registry).unwrap();
        let second = Canvas::properties(&registry).unwrap();
        assert_eq!(first.left, second.left);
        assert_eq!(registry.len(), before + 2);
    }

    #[test]
    fn children_are_placed_and_follow_changes() {
        let mut tree = ElementTree::new(Arc::new(PropertyRegistry::new()));
        let props = Canvas::properties(tree.registry()).unwrap();
        let canvas = tree.create(Canvas::new());
        let child = tree.create(Rectangle::new());
        tree.set_value(child, WIDTH, 10.0).unwrap();
        tree.set_value(child, HEIGHT, 20.0).unwrap();
        tree.append_child(canvas, child);
        tree.set_value(child, props.left, 30.0).unwrap();
        tree.set_value(child, props.top, 5.0).unwrap();
        update_layout(&mut tree, canvas, Size::new(100.0, 100.0));
        assert_eq!(tree.layout_rect(child), Some(Rect::new(30.0, 5.0, 10.0, 20.0)));

        tree.set_value(child, props.left, 60.0).unwrap();
        assert!(!tree.is_arrange_valid(canvas));
        update_layout(&mut tree, canvas, Size::new(100.0, 100.0));
        assert_eq!(tree.layout_rect(child), Some(Rect::new(60.0, 5.0, 10.0, 20.0)));
    }
}
