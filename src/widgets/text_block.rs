//! TextBlock widget: unshaped text with fixed-advance metrics.
//!
//! Glyph shaping and font loading belong to the renderer. Layout assumes
//! every character advances `0.6 * FontSize` and every line is
//! `1.2 * FontSize` tall. `Foreground` and `FontSize` are inherited, so a
//! TextBlock picks them up from its ancestors.

use std::any::Any;

use crate::error::Result;
use crate::geometry::{Point, Size};
use crate::layout::LayoutCx;
use crate::property::core::{FONT_SIZE, FOREGROUND};
use crate::render::{Glyph, RenderCx};
use crate::widget::Widget;

const ADVANCE: f32 = 0.6;
const LINE_HEIGHT: f32 = 1.2;

// ---------------------------------------------------------------------------
// TextBlock
// ---------------------------------------------------------------------------

/// Displays text split on `'\n'`, one `Text` command per non-empty line.
///
/// # Examples
///
/// ```ignore
/// let label = tree.create(TextBlock::new("Hello, world!"));
/// tree.set_value(label, FONT_SIZE, 20.0)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct TextBlock {
    text: String,
    font_id: u32,
}

impl TextBlock {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_id: 0,
        }
    }

    /// Renderer-defined font handle (builder pattern).
    pub fn with_font(mut self, font_id: u32) -> Self {
        self.font_id = font_id;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text. Use through
    /// [`ElementTree::with_widget_mut`](crate::tree::ElementTree::with_widget_mut)
    /// so the element is re-measured.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Size of the text block at `font_size`.
    pub fn text_size(&self, font_size: f32) -> Size {
        if self.text.is_empty() {
            return Size::ZERO;
        }
        let mut lines = 0;
        let mut widest = 0;
        for line in self.text.split('\n') {
            lines += 1;
            widest = widest.max(line.chars().count());
        }
        Size::new(
            widest as f32 * ADVANCE * font_size,
            lines as f32 * LINE_HEIGHT * font_size,
        )
    }
}

impl Widget for TextBlock {
    fn type_name(&self) -> &'static str {
        "TextBlock"
    }

    fn measure_core(&mut self, cx: &mut LayoutCx<'_>, _available: Size) -> Result<Size> {
        Ok(self.text_size(cx.get(FONT_SIZE)))
    }

    fn render(&self, cx: &mut RenderCx<'_>) -> Result<()> {
        let size = cx.get(FONT_SIZE);
        let color = cx.get(FOREGROUND);
        for (index, line) in self.text.split('\n').enumerate() {
            if line.is_empty() {
                continue;
            }
            let run = line
                .chars()
                .map(|codepoint| Glyph {
                    codepoint,
                    font_id: self.font_id,
                    size,
                    color,
                })
                .collect();
            cx.text(Point::new(0.0, index as f32 * LINE_HEIGHT * size), run);
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
    use crate::geometry::Color;
    use crate::layout::update_layout;
    use crate::property::PropertyRegistry;
    use crate::render::{RenderCommand, RenderTreeBuilder};
    use crate::tree::ElementTree;
    use crate::widgets::Panel;

    #[test]
    fn metrics_follow_font_size() {
        let block = TextBlock::new("abcd\nxy");
        assert_eq!(block.text_size(10.0), Size::new(24.0, 24.0));
        assert_eq!(TextBlock::new("").text_size(10.0), Size::ZERO);
    }

    #[test]
    fn inherits_foreground_and_font_size() {
        let mut tree = ElementTree::new(Arc::new(PropertyRegistry::new()));
        let root = tree.create(Panel::new());
        let text = tree.create(TextBlock::new("hi"));
        tree.append_child(root, text);
        tree.set_value(root, FONT_SIZE, 20.0).unwrap();
        tree.set_value(root, FOREGROUND, Color::WHITE).unwrap();
        update_layout(&mut tree, root, Size::INFINITE);
        assert_eq!(tree.desired_size(text), Some(Size::new(24.0, 24.0)));

        let list = RenderTreeBuilder::new().build(&tree, root);
        let Some(RenderCommand::Text { run, .. }) =
            list.iter().find(|c| matches!(c, RenderCommand::Text { .. }))
        else {
            panic!("no text command");
        };
        assert_eq!(run.len(), 2);
        assert_eq!(run[0].codepoint, 'h');
        assert_eq!(run[0].size, 20.0);
        assert_eq!(run[0].color, Color::WHITE);
    }

    #[test]
    fn font_size_change_remeasures() {
        let mut tree = ElementTree::new(Arc::new(PropertyRegistry::new()));
        let root = tree.create(Panel::new());
        let text = tree.create(TextBlock::new("ab"));
        tree.append_child(root, text);
        update_layout(&mut tree, root, Size::INFINITE);
        tree.set_value(root, FONT_SIZE, 10.0).unwrap();
        assert!(!tree.is_measure_valid(text));
        update_layout(&mut tree, root, Size::INFINITE);
        assert_eq!(tree.desired_size(text), Some(Size::new(12.0, 12.0)));
    }
}
