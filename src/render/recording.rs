//! A headless renderer that records every frame.
//!
//! [`RecordingRenderer`] keeps its state behind a shared handle so tests can
//! inspect frames after the renderer has been moved into a host.

use std::sync::Arc;

use parking_lot::Mutex;

use super::list::RenderList;
use super::renderer::{Extent, FrameContext, Renderer, RendererParams};
use crate::error::{Result, UiError};

/// One presented frame.
#[derive(Debug, Clone)]
pub struct RecordedFrame {
    pub context: FrameContext,
    pub lists: Vec<RenderList>,
}

impl RecordedFrame {
    /// The first list drawn in this frame, or an empty list.
    pub fn list(&self) -> RenderList {
        self.lists.first().cloned().unwrap_or_default()
    }
}

/// Everything the recording renderer has seen.
#[derive(Debug, Default)]
pub struct RecordingState {
    pub initialized: bool,
    pub params: Option<RendererParams>,
    pub extent: Extent,
    pub frames: Vec<RecordedFrame>,
    pub resizes: Vec<Extent>,
    pub shutdowns: usize,
    /// Draws of unbalanced lists.
    pub unbalanced: usize,
    /// Frames closed by `end_frame` after a failed draw.
    pub aborted: usize,
    in_frame: Option<RecordedFrame>,
    draw_failed: bool,
    fail_init: bool,
    fail_frames: usize,
    fail_draws: usize,
}

/// Shared view of a [`RecordingRenderer`]'s state.
#[derive(Debug, Clone, Default)]
pub struct RecordingHandle {
    state: Arc<Mutex<RecordingState>>,
}

impl RecordingHandle {
    pub fn frame_count(&self) -> usize {
        self.state.lock().frames.len()
    }

    /// The last presented frame.
    pub fn last_frame(&self) -> Option<RecordedFrame> {
        self.state.lock().frames.last().cloned()
    }

    /// The first list of the last presented frame.
    pub fn last_list(&self) -> Option<RenderList> {
        self.last_frame().map(|f| f.list())
    }

    pub fn is_initialized(&self) -> bool {
        self.state.lock().initialized
    }

    pub fn extent(&self) -> Extent {
        self.state.lock().extent
    }

    pub fn resizes(&self) -> Vec<Extent> {
        self.state.lock().resizes.clone()
    }

    pub fn shutdowns(&self) -> usize {
        self.state.lock().shutdowns
    }

    pub fn unbalanced_draws(&self) -> usize {
        self.state.lock().unbalanced
    }

    /// Make the next `initialize` or `resize` fail.
    pub fn fail_next_init(&self) {
        self.state.lock().fail_init = true;
    }

    /// Make the next `count` frames fail in `begin_frame`.
    pub fn fail_frames(&self, count: usize) {
        self.state.lock().fail_frames = count;
    }

    /// Make the next `count` draws fail.
    pub fn fail_draws(&self, count: usize) {
        self.state.lock().fail_draws = count;
    }

    /// Frames that were begun, failed in `draw`, and were closed.
    pub fn aborted_frames(&self) -> usize {
        self.state.lock().aborted
    }

    /// Between `begin_frame` and `end_frame`.
    pub fn is_mid_frame(&self) -> bool {
        self.state.lock().in_frame.is_some()
    }

    /// Run `f` with the raw state.
    pub fn with_state<R>(&self, f: impl FnOnce(&RecordingState) -> R) -> R {
        f(&self.state.lock())
    }
}

/// In-memory [`Renderer`].
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    handle: RecordingHandle,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle that stays valid after the renderer is boxed.
    pub fn handle(&self) -> RecordingHandle {
        self.handle.clone()
    }
}

impl Renderer for RecordingRenderer {
    fn name(&self) -> &str {
        "recording"
    }

    fn initialize(&mut self, params: &RendererParams) -> Result<()> {
        let mut state = self.handle.state.lock();
        if std::mem::take(&mut state.fail_init) {
            state.initialized = false;
            return Err(UiError::SurfaceLost("recording renderer refused to initialize".into()));
        }
        state.initialized = true;
        state.extent = params.extent;
        state.params = Some(params.clone());
        Ok(())
    }

    fn resize(&mut self, extent: Extent) -> Result<()> {
        let mut state = self.handle.state.lock();
        if std::mem::take(&mut state.fail_init) {
            state.initialized = false;
            return Err(UiError::SurfaceLost(format!(
                "resize to {}x{} failed",
                extent.width, extent.height
            )));
        }
        state.extent = extent;
        state.resizes.push(extent);
        Ok(())
    }

    fn begin_frame(&mut self, ctx: &FrameContext) -> Result<()> {
        let mut state = self.handle.state.lock();
        if !state.initialized {
            return Err(UiError::SurfaceLost("renderer not initialized".into()));
        }
        if state.fail_frames > 0 {
            state.fail_frames -= 1;
            return Err(UiError::SurfaceLost("frame dropped".into()));
        }
        state.in_frame = Some(RecordedFrame {
            context: *ctx,
            lists: Vec::new(),
        });
        state.draw_failed = false;
        Ok(())
    }

    fn draw(&mut self, list: &RenderList) -> Result<()> {
        let mut state = self.handle.state.lock();
        if !list.is_balanced() {
            state.unbalanced += 1;
        }
        if state.in_frame.is_some() && state.fail_draws > 0 {
            state.fail_draws -= 1;
            state.draw_failed = true;
            return Err(UiError::SurfaceLost("draw failed".into()));
        }
        match state.in_frame.as_mut() {
            Some(frame) => {
                frame.lists.push(list.clone());
                Ok(())
            }
            None => Err(UiError::SurfaceLost("draw outside of a frame".into())),
        }
    }

    fn end_frame(&mut self) -> Result<()> {
        let mut state = self.handle.state.lock();
        match state.in_frame.take() {
            Some(_) if std::mem::take(&mut state.draw_failed) => {
                state.aborted += 1;
                Ok(())
            }
            Some(frame) => {
                state.frames.push(frame);
                Ok(())
            }
            None => Err(UiError::SurfaceLost("end_frame without begin_frame".into())),
        }
    }

    fn shutdown(&mut self) {
        let mut state = self.handle.state.lock();
        state.initialized = false;
        state.in_frame = None;
        state.shutdowns += 1;
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::list::RenderCommand;

    #[test]
    fn records_frames_through_handle() {
        let mut renderer = RecordingRenderer::new();
        let handle = renderer.handle();
        renderer.initialize(&RendererParams::headless(Extent::new(10, 10))).unwrap();
        renderer.begin_frame(&FrameContext::default()).unwrap();
        let mut list = RenderList::new();
        list.push(RenderCommand::PopClip);
        renderer.draw(&list).unwrap();
        renderer.end_frame().unwrap();
        assert_eq!(handle.frame_count(), 1);
        assert_eq!(handle.unbalanced_draws(), 1);
        assert_eq!(handle.last_list().unwrap().len(), 1);
    }

    #[test]
    fn uninitialized_renderer_refuses_frames() {
        let mut renderer = RecordingRenderer::new();
        let handle = renderer.handle();
        handle.fail_next_init();
        assert!(matches!(
            renderer.initialize(&RendererParams::headless(Extent::new(1, 1))),
            Err(UiError::SurfaceLost(_))
        ));
        assert!(renderer.begin_frame(&FrameContext::default()).is_err());
        renderer.initialize(&RendererParams::headless(Extent::new(1, 1))).unwrap();
        assert!(renderer.begin_frame(&FrameContext::default()).is_ok());
    }
}
