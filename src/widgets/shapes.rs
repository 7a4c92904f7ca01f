//! Vector shapes: Polygon and PathShape.
//!
//! Both measure to the bounding box of their points (from the local origin)
//! and draw in local coordinates without scaling.

use std::any::Any;

use crate::error::Result;
use crate::geometry::{Color, Point, Rect, Size};
use crate::layout::LayoutCx;
use crate::render::{PathSegment, RenderCx};
use crate::widget::Widget;

/// Extent from the origin to the furthest point.
fn extent(points: impl Iterator<Item = Point>) -> Size {
    points.fold(Size::ZERO, |acc, p| {
        Size::new(acc.width.max(p.x), acc.height.max(p.y))
    })
}

/// Even-odd point-in-polygon test.
fn polygon_contains(points: &[Point], p: Point) -> bool {
    if points.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

// ---------------------------------------------------------------------------
// Polygon
// ---------------------------------------------------------------------------

/// A closed polygon. Hit testing follows the shape, not the bounding box.
#[derive(Debug, Clone)]
pub struct Polygon {
    points: Vec<Point>,
    fill: Color,
    stroke: Color,
    stroke_width: f32,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            points,
            fill: Color::BLACK,
            stroke: Color::TRANSPARENT,
            stroke_width: 0.0,
        }
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

    pub fn points(&self) -> &[Point] {
        &self.points
    }
}

impl Widget for Polygon {
    fn type_name(&self) -> &'static str {
        "Polygon"
    }

    fn measure_core(&mut self, _cx: &mut LayoutCx<'_>, _available: Size) -> Result<Size> {
        Ok(extent(self.points.iter().copied()))
    }

    fn render(&self, cx: &mut RenderCx<'_>) -> Result<()> {
        if self.points.len() >= 3 {
            cx.polygon(self.points.clone(), self.fill, self.stroke, self.stroke_width);
        }
        Ok(())
    }

    fn hit_test_core(&self, point: Point, _bounds: Rect) -> bool {
        polygon_contains(&self.points, point)
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

// ---------------------------------------------------------------------------
// PathShape
// ---------------------------------------------------------------------------

/// An open or closed path of lines and curves.
#[derive(Debug, Clone)]
pub struct PathShape {
    segments: Vec<PathSegment>,
    fill: Color,
    stroke: Color,
    stroke_width: f32,
    anti_aliased: bool,
}

impl PathShape {
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self {
            segments,
            fill: Color::TRANSPARENT,
            stroke: Color::BLACK,
            stroke_width: 1.0,
            anti_aliased: true,
        }
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

    pub fn with_anti_aliasing(mut self, enabled: bool) -> Self {
        self.anti_aliased = enabled;
        self
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }
}

impl Widget for PathShape {
    fn type_name(&self) -> &'static str {
        "Path"
    }

    fn measure_core(&mut self, _cx: &mut LayoutCx<'_>, _available: Size) -> Result<Size> {
        let size = extent(self.segments.iter().flat_map(PathSegment::points));
        let half = self.stroke_width / 2.0;
        Ok(Size::new(size.width + half, size.height + half))
    }

    fn render(&self, cx: &mut RenderCx<'_>) -> Result<()> {
        if !self.segments.is_empty() {
            cx.path(
                self.segments.clone(),
                self.fill,
                self.stroke,
                self.stroke_width,
                self.anti_aliased,
            );
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
    use crate::layout::update_layout;
    use crate::property::PropertyRegistry;
    use crate::render::{RenderCommand, RenderTreeBuilder};
    use crate::tree::ElementTree;
    use crate::widgets::Panel;

    fn triangle() -> Vec<Point> {
        vec![Point::new(0.0, 0.0), Point::new(40.0, 0.0), Point::new(0.0, 40.0)]
    }

    #[test]
    fn polygon_measures_bounding_box() {
        let mut tree = ElementTree::new(Arc::new(PropertyRegistry::new()));
        let poly = tree.create(Polygon::new(triangle()));
        update_layout(&mut tree, poly, Size::INFINITE);
        assert_eq!(tree.desired_size(poly), Some(Size::new(40.0, 40.0)));
    }

    #[test]
    fn polygon_hit_follows_shape() {
        let mut tree = ElementTree::new(Arc::new(PropertyRegistry::new()));
        let root = tree.create(Panel::new());
        let poly = tree.create(Polygon::new(triangle()));
        tree.append_child(root, poly);
        update_layout(&mut tree, root, Size::new(40.0, 40.0));
        assert_eq!(tree.hit_test(root, Point::new(5.0, 5.0)), Some(poly));
        assert_eq!(tree.hit_test(root, Point::new(35.0, 35.0)), Some(root));
    }

    #[test]
    fn path_emits_segments() {
        let mut tree = ElementTree::new(Arc::new(PropertyRegistry::new()));
        let segments = vec![
            PathSegment::MoveTo(Point::new(0.0, 0.0)),
            PathSegment::QuadTo {
                ctrl: Point::new(10.0, 20.0),
                to: Point::new(20.0, 0.0),
            },
        ];
        let path = tree.create(PathShape::new(segments.clone()).with_anti_aliasing(false));
        update_layout(&mut tree, path, Size::INFINITE);
        assert_eq!(tree.desired_size(path), Some(Size::new(20.5, 20.5)));
        let list = RenderTreeBuilder::new().build(&tree, path);
        assert_eq!(
            list.commands()[1],
            RenderCommand::Path {
                segments,
                fill: Color::TRANSPARENT,
                stroke: Color::BLACK,
                stroke_width: 1.0,
                anti_aliased: false,
            }
        );
    }
}
