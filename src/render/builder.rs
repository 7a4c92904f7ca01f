//! Render tree walk: element tree in, [`RenderList`] out.
//!
//! The builder visits the visual tree in pre-order. Each drawn element gets
//! a frame: a transform push, an optional layer for opacity below one, an
//! optional clip, the widget's own commands, its children's frames, then the
//! pops in reverse order. A widget whose `render` fails loses its whole frame
//! and the list stays balanced.

use std::collections::HashSet;

use super::list::{CornerRadius, Glyph, ImageSource, PathSegment, RenderCommand, RenderList};
use crate::geometry::{Color, Point, Rect, Size};
use crate::property::core::{CLIP, CLIP_TO_BOUNDS, OPACITY, VISIBILITY};
use crate::property::{Property, PropertyValue, Visibility};
use crate::tree::{ElementId, ElementTree};

// ---------------------------------------------------------------------------
// RenderCx
// ---------------------------------------------------------------------------

/// Context handed to [`Widget::render`](crate::widget::Widget::render).
///
/// Commands are in the element's local coordinates; `(0, 0)` is the top-left
/// of its render box.
pub struct RenderCx<'a> {
    tree: &'a ElementTree,
    id: ElementId,
    list: &'a mut RenderList,
    size: Size,
}

impl<'a> RenderCx<'a> {
    pub(crate) fn new(tree: &'a ElementTree, id: ElementId, list: &'a mut RenderList) -> Self {
        let size = tree.render_size(id);
        Self { tree, id, list, size }
    }

    /// The element being drawn.
    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn tree(&self) -> &ElementTree {
        self.tree
    }

    /// The element's render size.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Local bounds: `(0, 0, size)`.
    pub fn bounds(&self) -> Rect {
        self.size.to_rect()
    }

    /// A property of the element being drawn.
    pub fn get<T: PropertyValue>(&self, property: Property<T>) -> T {
        self.tree.get(self.id, property)
    }

    /// Append a raw command.
    pub fn push(&mut self, command: RenderCommand) {
        self.list.push(command);
    }

    pub fn fill_rect(&mut self, rect: Rect, fill: Color) {
        self.rectangle(rect, fill, Color::TRANSPARENT, 0.0, 0.0);
    }

    pub fn rectangle(&mut self, rect: Rect, fill: Color, stroke: Color, stroke_width: f32, corner_radius: f32) {
        self.push(RenderCommand::Rectangle {
            rect,
            fill,
            stroke,
            stroke_width,
            corner_radius,
        });
    }

    pub fn rounded_rect(&mut self, rect: Rect, fill: Color, stroke: Color, stroke_width: f32, radii: CornerRadius) {
        self.push(RenderCommand::RoundedRect {
            rect,
            fill,
            stroke,
            stroke_width,
            radii,
        });
    }

    pub fn polygon(&mut self, points: Vec<Point>, fill: Color, stroke: Color, stroke_width: f32) {
        self.push(RenderCommand::Polygon {
            points,
            fill,
            stroke,
            stroke_width,
        });
    }

    pub fn path(
        &mut self,
        segments: Vec<PathSegment>,
        fill: Color,
        stroke: Color,
        stroke_width: f32,
        anti_aliased: bool,
    ) {
        self.push(RenderCommand::Path {
            segments,
            fill,
            stroke,
            stroke_width,
            anti_aliased,
        });
    }

    pub fn text(&mut self, position: Point, run: Vec<Glyph>) {
        self.push(RenderCommand::Text { position, run });
    }

    pub fn image(&mut self, rect: Rect, source: ImageSource, tint: Color) {
        self.push(RenderCommand::Image { rect, source, tint });
    }
}

// ---------------------------------------------------------------------------
// RenderTreeBuilder
// ---------------------------------------------------------------------------

/// Builds render lists and remembers which elements already had a render
/// failure logged.
#[derive(Debug, Default)]
pub struct RenderTreeBuilder {
    reported: HashSet<ElementId>,
}

impl RenderTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk the visual subtree at `root` and return its command list.
    pub fn build(&mut self, tree: &ElementTree, root: ElementId) -> RenderList {
        let mut list = RenderList::new();
        self.reported.retain(|&id| tree.contains(id));
        self.emit(tree, root, &mut list);
        debug_assert!(list.is_balanced());
        list
    }

    fn emit(&mut self, tree: &ElementTree, id: ElementId, list: &mut RenderList) {
        if !tree.contains(id) || tree.get(id, VISIBILITY) != Visibility::Visible {
            return;
        }
        if tree.layout_rect(id).is_none() {
            return;
        }
        let mark = list.len();

        list.push(RenderCommand::PushTransform {
            matrix: tree.local_transform(id),
        });

        let opacity = tree.get(id, OPACITY);
        let layered = opacity < 1.0;
        if layered {
            list.push(RenderCommand::PushLayer { opacity });
        }
        if opacity <= 0.0 {
            list.push(RenderCommand::PopLayer);
            list.push(RenderCommand::PopTransform);
            return;
        }

        let clip = self.clip_for(tree, id);
        if let Some(rect) = clip {
            list.push(RenderCommand::PushClip { rect });
        }

        if let Some(widget) = tree.widget(id) {
            let result = widget.render(&mut RenderCx::new(tree, id, list));
            if let Err(err) = result {
                list.truncate(mark);
                if self.reported.insert(id) {
                    log::error!("render failed for {} {id:?}: {err}", widget.type_name());
                }
                return;
            }
        }

        for &child in tree.visual_children(id) {
            self.emit(tree, child, list);
        }

        if clip.is_some() {
            list.push(RenderCommand::PopClip);
        }
        if layered {
            list.push(RenderCommand::PopLayer);
        }
        list.push(RenderCommand::PopTransform);
    }

    /// Explicit clip first, then bounds when the element asks for it.
    fn clip_for(&self, tree: &ElementTree, id: ElementId) -> Option<Rect> {
        let clip = tree.get(id, CLIP);
        if !clip.is_empty() {
            return Some(clip);
        }
        let wants_bounds =
            tree.get(id, CLIP_TO_BOUNDS) || tree.widget(id).is_some_and(|w| w.clip_to_bounds());
        wants_bounds.then(|| tree.render_size(id).to_rect())
    }
}

// ===========================================================================
// Tests
// ===========================================================================
