//! Snapshot rendering helpers.
//!
//! Functions for converting render lists into plain-text strings suitable
//! for snapshot testing and assertions.

use std::fmt::Write as _;

use crate::geometry::{Color, Matrix3x2, Point, Rect};
use crate::render::{ImageSource, RenderCommand, RenderList};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Render a list to text, one command per line.
///
/// Commands inside a push are indented by two spaces per open frame, so a
/// balanced list reads as a tree. Numbers use Rust's shortest `f32` form.
///
/// # Examples
///
/// ```ignore
/// use vellum::testing::render_list_to_string;
///
/// let text = render_list_to_string(&list);
/// assert!(text.starts_with("PushTransform translate(0, 0)"));
/// ```
pub fn render_list_to_string(list: &RenderList) -> String {
    let mut out = String::new();
    let mut depth = 0usize;
    for command in list {
        if command.pops().is_some() {
            depth = depth.saturating_sub(1);
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&"  ".repeat(depth));
        out.push_str(&command_to_string(command));
        if command.pushes().is_some() {
            depth += 1;
        }
    }
    out
}

/// One command on one line.
pub fn command_to_string(command: &RenderCommand) -> String {
    let tag = command.tag();
    match command {
        RenderCommand::PushTransform { matrix } => format!("{tag} {}", matrix_str(matrix)),
        RenderCommand::PushClip { rect } => format!("{tag} {}", rect_str(rect)),
        RenderCommand::PushLayer { opacity } => format!("{tag} {opacity}"),
        RenderCommand::PopTransform | RenderCommand::PopClip | RenderCommand::PopLayer => {
            tag.to_string()
        }
        RenderCommand::Rectangle { rect, fill, stroke, stroke_width, .. }
        | RenderCommand::RoundedRect { rect, fill, stroke, stroke_width, .. } => {
            let mut s = format!("{tag} {} fill={}", rect_str(rect), color_str(*fill));
            if *stroke_width > 0.0 {
                let _ = write!(s, " stroke={}/{stroke_width}", color_str(*stroke));
            }
            s
        }
        RenderCommand::Polygon { points, fill, .. } => {
            format!("{tag} {} points fill={}", points.len(), color_str(*fill))
        }
        RenderCommand::Path { segments, fill, .. } => {
            format!("{tag} {} segments fill={}", segments.len(), color_str(*fill))
        }
        RenderCommand::Text { position, run } => {
            let text: String = run.iter().map(|g| g.codepoint).collect();
            format!("{tag} {text:?} at {}", point_str(*position))
        }
        RenderCommand::Image { rect, source, .. } => {
            let source = match source {
                ImageSource::Texture(id) => format!("texture {id}"),
                ImageSource::Path(path) => format!("path {path:?}"),
            };
            format!("{tag} {} {source}", rect_str(rect))
        }
    }
}

// ---------------------------------------------------------------------------
// Internal
// ---------------------------------------------------------------------------

fn point_str(p: Point) -> String {
    format!("({}, {})", p.x, p.y)
}

fn rect_str(r: &Rect) -> String {
    format!("({}, {}, {}, {})", r.x, r.y, r.width, r.height)
}

fn matrix_str(m: &Matrix3x2) -> String {
    if m.m11 == 1.0 && m.m12 == 0.0 && m.m21 == 0.0 && m.m22 == 1.0 {
        format!("translate({}, {})", m.dx, m.dy)
    } else {
        format!(
            "matrix({}, {}, {}, {}, {}, {})",
            m.m11, m.m12, m.m21, m.m22, m.dx, m.dy
        )
    }
}

/// `#rrggbbaa`.
fn color_str(c: Color) -> String {
    let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "#{:02x}{:02x}{:02x}{:02x}",
        byte(c.r),
        byte(c.g),
        byte(c.b),
        byte(c.a)
    )
}

// ===========================================================================
// Tests
// ===========================================================================
