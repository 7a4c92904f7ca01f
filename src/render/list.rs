//! Render commands and the flat per-frame command list.
//!
//! A [`RenderList`] is the only thing a renderer sees. Every command carries
//! its own parameters, so drawing never reaches back into the element tree.
//! Push commands open a frame that the matching pop closes; a list built by
//! the tree builder is always balanced.

use crate::geometry::{Color, Matrix3x2, Point, Rect};

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// One glyph of a text run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    pub codepoint: char,
    pub font_id: u32,
    pub size: f32,
    pub color: Color,
}

/// Segment of a vector path, in local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(Point),
    LineTo(Point),
    QuadTo { ctrl: Point, to: Point },
    CubicTo { ctrl1: Point, ctrl2: Point, to: Point },
    Close,
}

impl PathSegment {
    /// Every point the segment mentions, control points included.
    pub fn points(&self) -> Vec<Point> {
        match *self {
            PathSegment::MoveTo(p) | PathSegment::LineTo(p) => vec![p],
            PathSegment::QuadTo { ctrl, to } => vec![ctrl, to],
            PathSegment::CubicTo { ctrl1, ctrl2, to } => vec![ctrl1, ctrl2, to],
            PathSegment::Close => Vec::new(),
        }
    }
}

/// Where an image's pixels come from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageSource {
    /// A texture already uploaded by the renderer.
    Texture(u64),
    /// A file the renderer loads itself.
    Path(String),
}

/// Per-corner radii: top-left, top-right, bottom-right, bottom-left.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CornerRadius {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_right: f32,
    pub bottom_left: f32,
}

impl CornerRadius {
    pub const fn uniform(radius: f32) -> Self {
        Self {
            top_left: radius,
            top_right: radius,
            bottom_right: radius,
            bottom_left: radius,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.top_left == 0.0
            && self.top_right == 0.0
            && self.bottom_right == 0.0
            && self.bottom_left == 0.0
    }
}

// ---------------------------------------------------------------------------
// RenderCommand
// ---------------------------------------------------------------------------

/// A single tagged draw or state command.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    PushTransform { matrix: Matrix3x2 },
    PopTransform,
    PushClip { rect: Rect },
    PopClip,
    PushLayer { opacity: f32 },
    PopLayer,
    Rectangle {
        rect: Rect,
        fill: Color,
        stroke: Color,
        stroke_width: f32,
        corner_radius: f32,
    },
    RoundedRect {
        rect: Rect,
        fill: Color,
        stroke: Color,
        stroke_width: f32,
        radii: CornerRadius,
    },
    Polygon {
        points: Vec<Point>,
        fill: Color,
        stroke: Color,
        stroke_width: f32,
    },
    Path {
        segments: Vec<PathSegment>,
        fill: Color,
        stroke: Color,
        stroke_width: f32,
        anti_aliased: bool,
    },
    Text { position: Point, run: Vec<Glyph> },
    Image {
        rect: Rect,
        source: ImageSource,
        tint: Color,
    },
}

/// Which stack a push or pop command works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackKind {
    Transform,
    Clip,
    Layer,
}

impl RenderCommand {
    /// Short tag used in logs and snapshots.
    pub fn tag(&self) -> &'static str {
        match self {
            RenderCommand::PushTransform { .. } => "PushTransform",
            RenderCommand::PopTransform => "PopTransform",
            RenderCommand::PushClip { .. } => "PushClip",
            RenderCommand::PopClip => "PopClip",
            RenderCommand::PushLayer { .. } => "PushLayer",
            RenderCommand::PopLayer => "PopLayer",
            RenderCommand::Rectangle { .. } => "Rectangle",
            RenderCommand::RoundedRect { .. } => "RoundedRect",
            RenderCommand::Polygon { .. } => "Polygon",
            RenderCommand::Path { .. } => "Path",
            RenderCommand::Text { .. } => "Text",
            RenderCommand::Image { .. } => "Image",
        }
    }

    /// The stack this command pushes onto, if it is a push.
    pub fn pushes(&self) -> Option<StackKind> {
        match self {
            RenderCommand::PushTransform { .. } => Some(StackKind::Transform),
            RenderCommand::PushClip { .. } => Some(StackKind::Clip),
            RenderCommand::PushLayer { .. } => Some(StackKind::Layer),
            _ => None,
        }
    }

    /// The stack this command pops, if it is a pop.
    pub fn pops(&self) -> Option<StackKind> {
        match self {
            RenderCommand::PopTransform => Some(StackKind::Transform),
            RenderCommand::PopClip => Some(StackKind::Clip),
            RenderCommand::PopLayer => Some(StackKind::Layer),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// RenderList
// ---------------------------------------------------------------------------

/// An ordered command stream for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderList {
    commands: Vec<RenderCommand>,
}

impl RenderList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: RenderCommand) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RenderCommand> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Drop everything after the first `len` commands.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.commands.truncate(len);
    }

    /// Command tags in order.
    pub fn tags(&self) -> Vec<&'static str> {
        self.commands.iter().map(RenderCommand::tag).collect()
    }

    /// Whether every push has a matching pop in stack order.
    pub fn is_balanced(&self) -> bool {
        let mut stack = Vec::new();
        for command in &self.commands {
            if let Some(kind) = command.pushes() {
                stack.push(kind);
            } else if let Some(kind) = command.pops() {
                if stack.pop() != Some(kind) {
                    return false;
                }
            }
        }
        stack.is_empty()
    }

    /// Number of draw commands (everything that is not a push or pop).
    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| c.pushes().is_none() && c.pops().is_none())
            .count()
    }
}

impl<'a> IntoIterator for &'a RenderList {
    type Item = &'a RenderCommand;
    type IntoIter = std::slice::Iter<'a, RenderCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}

impl FromIterator<RenderCommand> for RenderList {
    fn from_iter<I: IntoIterator<Item = RenderCommand>>(iter: I) -> Self {
        Self {
            commands: iter.into_iter().collect(),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
