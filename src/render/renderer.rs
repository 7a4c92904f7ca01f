//! The backend contract: anything that can execute a [`RenderList`].

use raw_window_handle::{RawDisplayHandle, RawWindowHandle};

use super::list::RenderList;
use crate::error::Result;
use crate::geometry::Color;

/// Surface size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Parameters for [`Renderer::initialize`].
#[derive(Debug, Clone)]
pub struct RendererParams {
    /// Native window to draw into. `None` for headless renderers.
    pub window_handle: Option<RawWindowHandle>,
    pub display_handle: Option<RawDisplayHandle>,
    pub extent: Extent,
    pub pixel_ratio: f32,
    pub debug_layer: bool,
    /// Diagnostic only.
    pub name: String,
}

impl RendererParams {
    /// Parameters for a surface without a native window.
    pub fn headless(extent: Extent) -> Self {
        Self {
            window_handle: None,
            display_handle: None,
            extent,
            pixel_ratio: 1.0,
            debug_layer: false,
            name: "headless".to_owned(),
        }
    }
}

/// Per-frame timing and clear color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    pub elapsed: f64,
    pub delta: f64,
    pub clear_color: Color,
    pub frame_index: u64,
}

impl Default for FrameContext {
    fn default() -> Self {
        Self {
            elapsed: 0.0,
            delta: 0.0,
            clear_color: Color::WHITE,
            frame_index: 0,
        }
    }
}

/// A drawing backend.
///
/// Methods are called from the thread that owns the window. A frame is
/// always `begin_frame`, any number of `draw`, then `end_frame`.
pub trait Renderer {
    /// Backend name, for logs.
    fn name(&self) -> &str;

    fn initialize(&mut self, params: &RendererParams) -> Result<()>;

    fn resize(&mut self, extent: Extent) -> Result<()>;

    fn begin_frame(&mut self, ctx: &FrameContext) -> Result<()>;

    fn draw(&mut self, list: &RenderList) -> Result<()>;

    /// Present the frame.
    fn end_frame(&mut self) -> Result<()>;

    /// Release every backend resource. The renderer may be initialized again
    /// afterwards.
    fn shutdown(&mut self);
}
