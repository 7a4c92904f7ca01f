//! StackPanel widget: children in a single row or column.

use std::any::Any;

use crate::error::Result;
use crate::geometry::{Rect, Size};
use crate::layout::LayoutCx;
use crate::property::core::VISIBILITY;
use crate::property::Visibility;
use crate::widget::Widget;

/// Stacking direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

// ---------------------------------------------------------------------------
// StackPanel
// ---------------------------------------------------------------------------

/// Stacks children one after another. Each child is measured with the
/// panel's cross-axis size and an unbounded main axis, and gets a slot of
/// its desired main-axis length spanning the panel's cross axis.
///
/// # Examples
///
/// ```ignore
/// let column = tree.create(StackPanel::vertical().with_spacing(4.0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StackPanel {
    orientation: Orientation,
    spacing: f32,
}

impl StackPanel {
    pub fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            spacing: 0.0,
        }
    }

    pub fn vertical() -> Self {
        Self::new(Orientation::Vertical)
    }

    pub fn horizontal() -> Self {
        Self::new(Orientation::Horizontal)
    }

    /// Gap between consecutive visible children (builder pattern).
    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing.max(0.0);
        self
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    fn is_vertical(&self) -> bool {
        self.orientation == Orientation::Vertical
    }
}

impl Widget for StackPanel {
    fn type_name(&self) -> &'static str {
        "StackPanel"
    }

    fn measure_core(&mut self, cx: &mut LayoutCx<'_>, available: Size) -> Result<Size> {
        let child_available = if self.is_vertical() {
            Size::new(available.width, f32::INFINITY)
        } else {
            Size::new(f32::INFINITY, available.height)
        };
        let (mut main, mut cross) = (0.0_f32, 0.0_f32);
        let mut visible = 0;
        for child in cx.children() {
            let desired = cx.measure_child(child, child_available);
            if cx.get_of(child, VISIBILITY) == Visibility::Collapsed {
                continue;
            }
            if visible > 0 {
                main += self.spacing;
            }
            visible += 1;
            if self.is_vertical() {
                main += desired.height;
                cross = cross.max(desired.width);
            } else {
                main += desired.width;
                cross = cross.max(desired.height);
            }
        }
        Ok(if self.is_vertical() {
            Size::new(cross, main)
        } else {
            Size::new(main, cross)
        })
    }

    fn arrange_core(&mut self, cx: &mut LayoutCx<'_>, size: Size) -> Result<Size> {
        let mut offset = 0.0;
        let mut visible = 0;
        for child in cx.children() {
            let desired = cx.desired_size_of(child);
            let collapsed = cx.get_of(child, VISIBILITY) == Visibility::Collapsed;
            if !collapsed && visible > 0 {
                offset += self.spacing;
            }
            let slot = if self.is_vertical() {
                Rect::new(0.0, offset, size.width, desired.height)
            } else {
                Rect::new(offset, 0.0, desired.width, size.height)
            };
            cx.arrange_child(child, slot);
            if !collapsed {
                visible += 1;
                offset += if self.is_vertical() {
                    desired.height
                } else {
                    desired.width
                };
            }
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
