//! FlexPanel widget: a flexbox row or column computed by taffy.

use std::any::Any;

use crate::error::Result;
use crate::geometry::{Rect, Size};
use crate::layout::{compute_flex, FlexAlign, FlexDirection, FlexItem, FlexJustify, FlexParams, LayoutCx};
use crate::property::core::VISIBILITY;
use crate::property::{Property, PropertyChangedArgs, PropertyMetadata, PropertyRegistry, Visibility};
use crate::tree::ElementTree;
use crate::widget::Widget;

fn rearrange_parent(tree: &mut ElementTree, args: &PropertyChangedArgs) {
    if let Some(parent) = tree.visual_parent(args.element) {
        tree.invalidate_arrange(parent);
    }
}

// ---------------------------------------------------------------------------
// FlexPanel
// ---------------------------------------------------------------------------

/// Lays children out along one axis with flex grow, gaps, justification and
/// cross-axis alignment. Each child's basis is its desired size; the
/// attached `FlexPanel.Grow` property sets its share of free space.
///
/// # Examples
///
/// ```ignore
/// let row = tree.create(FlexPanel::row().with_gap(8.0));
/// let grow = FlexPanel::grow_property(tree.registry())?;
/// tree.set_value(child, grow, 1.0)?;
/// ```
#[derive(Debug, Default)]
pub struct FlexPanel {
    params: FlexParams,
}

impl FlexPanel {
    pub fn new(params: FlexParams) -> Self {
        Self { params }
    }

    pub fn row() -> Self {
        Self::new(FlexParams::default())
    }

    pub fn column() -> Self {
        Self::new(FlexParams {
            direction: FlexDirection::Column,
            ..FlexParams::default()
        })
    }

    pub fn with_gap(mut self, gap: f32) -> Self {
        self.params.gap = gap.max(0.0);
        self
    }

    pub fn with_justify(mut self, justify: FlexJustify) -> Self {
        self.params.justify = justify;
        self
    }

    pub fn with_align(mut self, align: FlexAlign) -> Self {
        self.params.align = align;
        self
    }

    pub fn params(&self) -> &FlexParams {
        &self.params
    }

    /// The attached grow factor, registered on first use.
    pub fn grow_property(registry: &PropertyRegistry) -> Result<Property<f32>> {
        if let Some(handle) = registry.lookup_typed("FlexPanel", "Grow") {
            return Ok(handle);
        }
        registry.register_attached_typed(
            "Grow",
            "FlexPanel",
            PropertyMetadata::new(0.0_f32)
                .with_validator(|v| v.as_float().is_some_and(|f| f >= 0.0 && f.is_finite()))
                .on_changed(rearrange_parent),
        )
    }

    fn is_row(&self) -> bool {
        self.params.direction == FlexDirection::Row
    }
}

impl Widget for FlexPanel {
    fn type_name(&self) -> &'static str {
        "FlexPanel"
    }

    fn measure_core(&mut self, cx: &mut LayoutCx<'_>, available: Size) -> Result<Size> {
        let child_available = if self.is_row() {
            Size::new(f32::INFINITY, available.height)
        } else {
            Size::new(available.width, f32::INFINITY)
        };
        let (mut main, mut cross) = (0.0_f32, 0.0_f32);
        let mut count = 0;
        for child in cx.children() {
            let desired = cx.measure_child(child, child_available);
            if cx.get_of(child, VISIBILITY) == Visibility::Collapsed {
                continue;
            }
            count += 1;
            let (m, c) = if self.is_row() {
                (desired.width, desired.height)
            } else {
                (desired.height, desired.width)
            };
            main += m;
            cross = cross.max(c);
        }
        if count > 1 {
            main += self.params.gap * (count - 1) as f32;
        }
        Ok(if self.is_row() {
            Size::new(main, cross)
        } else {
            Size::new(cross, main)
        })
    }

    fn arrange_core(&mut self, cx: &mut LayoutCx<'_>, size: Size) -> Result<Size> {
        let grow = FlexPanel::grow_property(cx.tree().registry())?;
        let mut placed = Vec::new();
        let mut items = Vec::new();
        for child in cx.children() {
            if cx.get_of(child, VISIBILITY) == Visibility::Collapsed {
                cx.arrange_child(child, Rect::EMPTY);
                continue;
            }
            placed.push(child);
            items.push(FlexItem {
                basis: cx.desired_size_of(child),
                grow: cx.get_of(child, grow),
                shrink: 1.0,
            });
        }
        let rects = compute_flex(&self.params, &items, size)?;
        for (child, rect) in placed.into_iter().zip(rects) {
            cx.arrange_child(child, rect);
        }
        Ok(size)
    }

    fn clone_widget(&self) -> Box<dyn Widget> {
        Box::new(FlexPanel::new(self.params))
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
    use crate::tree::ElementId;
    use crate::widgets::Rectangle;

    fn build_tree() -> (ElementTree, ElementId, ElementId, ElementId) {
        let mut tree = ElementTree::new(Arc::new(PropertyRegistry::new()));
        let panel = tree.create(FlexPanel::row().with_gap(10.0));
        let a = tree.create(Rectangle::new());
        let b = tree.create(Rectangle::new());
        for (child, w) in [(a, 30.0), (b, 20.0)] {
            tree.set_value(child, WIDTH, w).unwrap();
            tree.set_value(child, HEIGHT, 10.0).unwrap();
            tree.append_child(panel, child);
        }
        (tree, panel, a, b)
    }

    #[test]
    fn measure_sums_main_axis_with_gaps() {
        let (mut tree, panel, _, _) = build_tree();
        update_layout(&mut tree, panel, Size::INFINITE);
        assert_eq!(tree.desired_size(panel), Some(Size::new(60.0, 10.0)));
    }

    #[test]
    fn grow_stretches_slot() {
        let (mut tree, panel, a, b) = build_tree();
        let grow = FlexPanel::grow_property(tree.registry()).unwrap();
        tree.set_value(b, grow, 1.0).unwrap();
        update_layout(&mut tree, panel, Size::new(100.0, 40.0));
        assert_eq!(tree.layout_slot(a), Some(Rect::new(0.0, 0.0, 30.0, 40.0)));
        assert_eq!(tree.layout_slot(b), Some(Rect::new(40.0, 0.0, 60.0, 40.0)));
    }

    #[test]
    fn panel_can_move_between_threads() {
        fn assert_send<T: Send + 'static>() {}
        assert_send::<FlexPanel>();
        let panel = FlexPanel::row().with_gap(4.0);
        let handle = std::thread::spawn(move || panel.params().gap);
        assert_eq!(handle.join().unwrap(), 4.0);
    }

    #[test]
    fn clone_keeps_params() {
        let panel = FlexPanel::column().with_gap(3.0);
        let copy = panel.clone_widget();
        let copy = copy.as_any().downcast_ref::<FlexPanel>().unwrap();
        assert_eq!(copy.params(), panel.params());
    }
}
