//! Border widget: background, outline and padding around its content.

use std::any::Any;

use crate::error::Result;
use crate::geometry::{Color, Rect, Size, Thickness};
use crate::layout::LayoutCx;
use crate::render::{CornerRadius, RenderCx};
use crate::widget::Widget;

// ---------------------------------------------------------------------------
// Border
// ---------------------------------------------------------------------------

/// Draws a background and an outline, then lays its children out inside the
/// border thickness plus padding.
///
/// A non-zero corner radius draws a `RoundedRect`; otherwise a `Rectangle`.
#[derive(Debug, Clone, Default)]
pub struct Border {
    background: Option<Color>,
    border_brush: Option<Color>,
    border_thickness: f32,
    corner_radius: CornerRadius,
    padding: Thickness,
}

impl Border {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    /// Outline color and width (builder pattern).
    pub fn with_border(mut self, brush: Color, thickness: f32) -> Self {
        self.border_brush = Some(brush);
        self.border_thickness = thickness.max(0.0);
        self
    }

    pub fn with_corner_radius(mut self, radius: f32) -> Self {
        self.corner_radius = CornerRadius::uniform(radius.max(0.0));
        self
    }

    pub fn with_corner_radii(mut self, radii: CornerRadius) -> Self {
        self.corner_radius = radii;
        self
    }

    pub fn with_padding(mut self, padding: Thickness) -> Self {
        self.padding = padding;
        self
    }

    pub fn background(&self) -> Option<Color> {
        self.background
    }

    pub fn set_background(&mut self, color: Option<Color>) {
        self.background = color;
    }

    pub fn padding(&self) -> Thickness {
        self.padding
    }

    /// Border thickness plus padding.
    fn chrome(&self) -> Thickness {
        let t = self.border_thickness;
        Thickness::new(
            self.padding.left + t,
            self.padding.top + t,
            self.padding.right + t,
            self.padding.bottom + t,
        )
    }
}

impl Widget for Border {
    fn type_name(&self) -> &'static str {
        "Border"
    }

    fn measure_core(&mut self, cx: &mut LayoutCx<'_>, available: Size) -> Result<Size> {
        let chrome = self.chrome();
        let inner = available.deflate(chrome);
        let mut content = Size::ZERO;
        for child in cx.children() {
            content = content.max(cx.measure_child(child, inner));
        }
        Ok(content.inflate(chrome))
    }

    fn arrange_core(&mut self, cx: &mut LayoutCx<'_>, size: Size) -> Result<Size> {
        let content = size.to_rect().deflate(self.chrome());
        for child in cx.children() {
            cx.arrange_child(child, content);
        }
        Ok(size)
    }

    fn render(&self, cx: &mut RenderCx<'_>) -> Result<()> {
        let stroke = self
            .border_brush
            .filter(|_| self.border_thickness > 0.0)
            .unwrap_or(Color::TRANSPARENT);
        let fill = self.background.unwrap_or(Color::TRANSPARENT);
        if fill.is_transparent() && stroke.is_transparent() {
            return Ok(());
        }
        // Stroke is centered on the outline, so inset by half its width.
        let half = self.border_thickness / 2.0;
        let size = cx.size();
        let rect = Rect::new(
            half,
            half,
            (size.width - self.border_thickness).max(0.0),
            (size.height - self.border_thickness).max(0.0),
        );
        if self.corner_radius.is_zero() {
            cx.rectangle(rect, fill, stroke, self.border_thickness, 0.0);
        } else {
            cx.rounded_rect(rect, fill, stroke, self.border_thickness, self.corner_radius);
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
