//! Image widget: a texture or file scaled uniformly into its box.

use std::any::Any;

use crate::error::Result;
use crate::geometry::{Color, Rect, Size};
use crate::layout::LayoutCx;
use crate::render::{ImageSource, RenderCx};
use crate::widget::Widget;

/// Shows an image at its natural size, scaled down uniformly when the
/// available space is smaller. The image is centered in its render box.
#[derive(Debug, Clone)]
pub struct Image {
    source: ImageSource,
    natural: Size,
    tint: Color,
}

impl Image {
    pub fn new(source: ImageSource, natural: Size) -> Self {
        Self {
            source,
            natural: natural.non_negative(),
            tint: Color::WHITE,
        }
    }

    pub fn with_tint(mut self, tint: Color) -> Self {
        self.tint = tint;
        self
    }

    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    /// Largest size with the natural aspect ratio that fits `bounds`.
    fn fit(&self, bounds: Size) -> Size {
        if self.natural.is_empty() {
            return Size::ZERO;
        }
        let sx = bounds.width / self.natural.width;
        let sy = bounds.height / self.natural.height;
        let scale = sx.min(sy).min(1.0);
        Size::new(self.natural.width * scale, self.natural.height * scale)
    }
}

impl Widget for Image {
    fn type_name(&self) -> &'static str {
        "Image"
    }

    fn measure_core(&mut self, _cx: &mut LayoutCx<'_>, available: Size) -> Result<Size> {
        Ok(self.fit(available))
    }

    fn render(&self, cx: &mut RenderCx<'_>) -> Result<()> {
        let size = cx.size();
        let drawn = self.fit(size);
        if drawn.is_empty() {
            return Ok(());
        }
        let rect = Rect::new(
            (size.width - drawn.width) / 2.0,
            (size.height - drawn.height) / 2.0,
            drawn.width,
            drawn.height,
        );
        cx.image(rect, self.source.clone(), self.tint);
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
