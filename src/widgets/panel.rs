//! Panel widget: overlays its children, optionally over a background.

use std::any::Any;

use crate::error::Result;
use crate::geometry::Color;
use crate::render::RenderCx;
use crate::widget::Widget;

// ---------------------------------------------------------------------------
// Panel
// ---------------------------------------------------------------------------

/// The plain container. Every child gets the full content area and the
/// panel's desired size is the largest child's.
///
/// # Examples
///
/// ```ignore
/// use vellum::widgets::Panel;
///
/// let root = tree.create(Panel::new().with_background(Color::WHITE));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Panel {
    background: Option<Color>,
}

impl Panel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the panel's bounds before drawing children (builder pattern).
    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn background(&self) -> Option<Color> {
        self.background
    }

    pub fn set_background(&mut self, color: Option<Color>) {
        self.background = color;
    }
}

impl Widget for Panel {
    fn type_name(&self) -> &'static str {
        "Panel"
    }

    fn render(&self, cx: &mut RenderCx<'_>) -> Result<()> {
        if let Some(color) = self.background {
            cx.fill_rect(cx.bounds(), color);
        }
        Ok(())
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
    use crate::geometry::{Rect, Size};
    use crate::layout::update_layout;
    use crate::property::PropertyRegistry;
    use crate::render::{RenderCommand, RenderTreeBuilder};
    use crate::tree::ElementTree;

    #[test]
    fn background_fills_bounds() {
        let mut tree = ElementTree::new(Arc::new(PropertyRegistry::new()));
        let root = tree.create(Panel::new().with_background(Color::WHITE));
        update_layout(&mut tree, root, Size::new(20.0, 10.0));
        let list = RenderTreeBuilder::new().build(&tree, root);
        assert_eq!(
            list.commands()[1],
            RenderCommand::Rectangle {
                rect: Rect::new(0.0, 0.0, 20.0, 10.0),
                fill: Color::WHITE,
                stroke: Color::TRANSPARENT,
                stroke_width: 0.0,
                corner_radius: 0.0,
            }
        );
    }

    #[test]
    fn no_background_draws_nothing() {
        let mut tree = ElementTree::new(Arc::new(PropertyRegistry::new()));
        let root = tree.create(Panel::new());
        update_layout(&mut tree, root, Size::new(20.0, 10.0));
        let list = RenderTreeBuilder::new().build(&tree, root);
        assert_eq!(list.draw_count(), 0);
    }
}
