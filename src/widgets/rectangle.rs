//! Rectangle widget: a filled and stroked box.

use std::any::Any;

use crate::error::Result;
use crate::geometry::Color;
use crate::render::RenderCx;
use crate::widget::Widget;

/// A box that fills its render size. Its content size is zero, so it takes
/// its size from `Width`/`Height` or from stretch alignment.
#[derive(Debug, Clone)]
pub struct Rectangle {
    fill: Color,
    stroke: Color,
    stroke_width: f32,
    corner_radius: f32,
}

impl Default for Rectangle {
    fn default() -> Self {
        Self {
            fill: Color::TRANSPARENT,
            stroke: Color::TRANSPARENT,
            stroke_width: 0.0,
            corner_radius: 0.0,
        }
    }
}

impl Rectangle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = fill;
        self
    }

    pub fn with_stroke(mut self, stroke: Color, width: f32) -> Self {
        self.stroke = stroke;
        self.stroke_width = width.max(0.0);
        self
    }

    pub fn with_corner_radius(mut self, radius: f32) -> Self {
        self.corner_radius = radius.max(0.0);
        self
    }

    pub fn fill(&self) -> Color {
        self.fill
    }

    pub fn set_fill(&mut self, fill: Color) {
        self.fill = fill;
    }
}

impl Widget for Rectangle {
    fn type_name(&self) -> &'static str {
        "Rectangle"
    }

    fn render(&self, cx: &mut RenderCx<'_>) -> Result<()> {
        let stroked = self.stroke_width > 0.0 && !self.stroke.is_transparent();
        if self.fill.is_transparent() && !stroked {
            return Ok(());
        }
        cx.rectangle(
            cx.bounds(),
            self.fill,
            self.stroke,
            self.stroke_width,
            self.corner_radius,
        );
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
    fn stroke_only_rectangle_still_draws() {
        let mut tree = ElementTree::new(Arc::new(PropertyRegistry::new()));
        let rect = tree.create(Rectangle::new().with_stroke(Color::BLACK, 2.0).with_corner_radius(3.0));
        update_layout(&mut tree, rect, Size::new(10.0, 10.0));
        let list = RenderTreeBuilder::new().build(&tree, rect);
        assert_eq!(
            list.commands()[1],
            RenderCommand::Rectangle {
                rect: Rect::new(0.0, 0.0, 10.0, 10.0),
                fill: Color::TRANSPARENT,
                stroke: Color::BLACK,
                stroke_width: 2.0,
                corner_radius: 3.0,
            }
        );
    }

    #[test]
    fn invisible_rectangle_is_skipped() {
        let mut tree = ElementTree::new(Arc::new(PropertyRegistry::new()));
        let rect = tree.create(Rectangle::new());
        update_layout(&mut tree, rect, Size::new(10.0, 10.0));
        assert_eq!(RenderTreeBuilder::new().build(&tree, rect).draw_count(), 0);
    }
}
