//! Popup widget: the in-tree anchor for content shown on its own surface.
//!
//! The popup element itself takes no space and draws nothing in its owner's
//! frame. Its content is a logical-only child, so it inherits values and
//! resolves names through the popup while being laid out, drawn and hit
//! tested by a [`PopupRoot`](crate::popup::PopupRoot).

use std::any::Any;

use crate::error::Result;
use crate::geometry::{Point, Rect, Size};
use crate::layout::LayoutCx;
use crate::tree::{ElementId, ElementTree};
use crate::widget::Widget;

/// See the module docs. Open and place it with the `Popup.*` properties in
/// [`crate::property::core`].
///
/// # Examples
///
/// ```ignore
/// let popup = tree.create(Popup::new());
/// tree.append_child(window_root, popup);
/// Popup::set_child(&mut tree, popup, menu);
/// tree.set_value(popup, PLACEMENT_TARGET, Some(button))?;
/// tree.set_value(popup, IS_OPEN, true)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Popup;

impl Popup {
    pub fn new() -> Self {
        Self
    }

    /// The popup's content element.
    pub fn child(tree: &ElementTree, popup: ElementId) -> Option<ElementId> {
        tree.logical_children(popup)
            .iter()
            .copied()
            .find(|&c| tree.visual_parent(c).is_none())
    }

    /// Replace the content. The previous content is detached and returned;
    /// it stays alive.
    pub fn set_child(tree: &mut ElementTree, popup: ElementId, child: ElementId) -> Option<ElementId> {
        let old = Popup::child(tree, popup);
        if old == Some(child) {
            return None;
        }
        if let Some(old) = old {
            tree.remove_logical_child(popup, old);
        }
        tree.add_logical_child(popup, child);
        tree.invalidate_measure(child);
        old
    }

    /// Detach the content and return it.
    pub fn clear_child(tree: &mut ElementTree, popup: ElementId) -> Option<ElementId> {
        let old = Popup::child(tree, popup)?;
        tree.remove_logical_child(popup, old);
        Some(old)
    }
}

impl Widget for Popup {
    fn type_name(&self) -> &'static str {
        "Popup"
    }

    fn measure_core(&mut self, _cx: &mut LayoutCx<'_>, _available: Size) -> Result<Size> {
        Ok(Size::ZERO)
    }

    fn arrange_core(&mut self, _cx: &mut LayoutCx<'_>, _size: Size) -> Result<Size> {
        Ok(Size::ZERO)
    }

    fn hit_test_core(&self, _point: Point, _bounds: Rect) -> bool {
        false
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
