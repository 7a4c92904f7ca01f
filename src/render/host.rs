//! RenderHost: owns a renderer, a dirty set and the pending-frame latch.

use std::collections::HashSet;

use super::builder::RenderTreeBuilder;
use super::list::RenderList;
use super::renderer::{Extent, FrameContext, Renderer, RendererParams};
use crate::error::{Result, UiError};
use crate::tree::{ElementId, ElementTree};

/// Drives one surface's renderer.
///
/// Any invalidation requests a full rebuild of the render list. The dirty
/// set is still tracked so callers can see what changed since the last
/// presented frame.
pub struct RenderHost {
    renderer: Box<dyn Renderer>,
    builder: RenderTreeBuilder,
    dirty: HashSet<ElementId>,
    render_pending: bool,
    initialized: bool,
    extent: Extent,
    last_error: Option<UiError>,
    last_list: Option<RenderList>,
    frames: u64,
}

impl RenderHost {
    pub fn new(renderer: Box<dyn Renderer>) -> Self {
        Self {
            renderer,
            builder: RenderTreeBuilder::new(),
            dirty: HashSet::new(),
            render_pending: true,
            initialized: false,
            extent: Extent::default(),
            last_error: None,
            last_list: None,
            frames: 0,
        }
    }

    /// Initialize the renderer. On failure the host stays uninitialized and
    /// the error is returned as [`UiError::SurfaceLost`].
    pub fn initialize(&mut self, params: &RendererParams) -> Result<()> {
        match self.renderer.initialize(params) {
            Ok(()) => {
                self.initialized = true;
                self.extent = params.extent;
                self.last_error = None;
                self.request_render();
                log::debug!(
                    "renderer {} initialized at {}x{}",
                    self.renderer.name(),
                    params.extent.width,
                    params.extent.height
                );
                Ok(())
            }
            Err(err) => Err(self.surface_lost(err)),
        }
    }

    /// Forward a resize. A failure leaves the host uninitialized.
    pub fn resize(&mut self, extent: Extent) -> Result<()> {
        if extent == self.extent {
            return Ok(());
        }
        match self.renderer.resize(extent) {
            Ok(()) => {
                self.extent = extent;
                self.request_render();
                Ok(())
            }
            Err(err) => Err(self.surface_lost(err)),
        }
    }

    fn surface_lost(&mut self, err: UiError) -> UiError {
        let err = match err {
            UiError::SurfaceLost(msg) => UiError::SurfaceLost(msg),
            other => UiError::SurfaceLost(other.to_string()),
        };
        log::error!("renderer {}: {err}", self.renderer.name());
        self.initialized = false;
        self.last_error = Some(err.clone());
        err
    }

    pub fn request_render(&mut self) {
        self.render_pending = true;
    }

    /// Add `id` to the dirty set and request a render.
    pub fn invalidate_element(&mut self, id: ElementId) {
        self.dirty.insert(id);
        self.request_render();
    }

    /// Build and present a frame for `root` if one is pending.
    ///
    /// Returns `true` only when a frame was presented. A failing renderer
    /// leaves the request latched so the caller can retry.
    pub fn render_frame(&mut self, tree: &ElementTree, root: ElementId, ctx: &FrameContext) -> bool {
        if !self.render_pending {
            return false;
        }
        if !self.initialized {
            log::debug!("render skipped: renderer {} not initialized", self.renderer.name());
            return false;
        }
        let list = self.builder.build(tree, root);
        if let Err(err) = self.present(&list, ctx) {
            log::error!("frame {} failed on {}: {err}", ctx.frame_index, self.renderer.name());
            self.last_error = Some(err);
            return false;
        }
        self.render_pending = false;
        self.dirty.clear();
        self.last_error = None;
        self.last_list = Some(list);
        self.frames += 1;
        true
    }

    /// A begun frame is always ended, even when `draw` fails.
    fn present(&mut self, list: &RenderList, ctx: &FrameContext) -> Result<()> {
        self.renderer.begin_frame(ctx)?;
        let drawn = self.renderer.draw(list);
        let ended = self.renderer.end_frame();
        drawn.and(ended)
    }

    pub fn shutdown(&mut self) {
        if self.initialized {
            self.renderer.shutdown();
            self.initialized = false;
        }
    }

    pub fn is_render_pending(&self) -> bool {
        self.render_pending
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn dirty(&self) -> &HashSet<ElementId> {
        &self.dirty
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// The error from the last failed initialize, resize or frame.
    pub fn last_error(&self) -> Option<&UiError> {
        self.last_error.as_ref()
    }

    /// The list of the last presented frame.
    pub fn last_render_list(&self) -> Option<&RenderList> {
        self.last_list.as_ref()
    }

    /// Number of frames presented.
    pub fn frames_presented(&self) -> u64 {
        self.frames
    }

    pub fn renderer_name(&self) -> &str {
        self.renderer.name()
    }
}

impl Drop for RenderHost {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for RenderHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderHost")
            .field("renderer", &self.renderer.name())
            .field("dirty", &self.dirty.len())
            .field("render_pending", &self.render_pending)
            .field("initialized", &self.initialized)
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
