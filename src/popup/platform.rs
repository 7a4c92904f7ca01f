//! Platform services the popup subsystem needs, and a headless
//! implementation.
//!
//! A desktop backend implements [`Platform`] over its windowing library:
//! monitors, the pointer position and decoration-less, non-activating,
//! always-on-top surfaces. [`HeadlessPlatform`] keeps everything in memory
//! and exposes it through a [`HeadlessHandle`] for tests.

use std::sync::Arc;

use parking_lot::Mutex;
use raw_window_handle::{RawDisplayHandle, RawWindowHandle};

use super::placement::Monitor;
use crate::error::{Result, UiError};
use crate::geometry::{Point, Rect};
use crate::render::{RecordingHandle, RecordingRenderer, Renderer};

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// A top-level surface that hosts one popup.
pub trait PopupSurface {
    /// Move and resize, in screen coordinates.
    fn set_bounds(&mut self, bounds: Rect);

    fn bounds(&self) -> Rect;

    fn show(&mut self);

    fn hide(&mut self);

    fn is_visible(&self) -> bool;

    /// Whole-surface opacity, used by fade animations.
    fn set_opacity(&mut self, opacity: f32);

    /// A renderer bound to this surface.
    fn create_renderer(&mut self) -> Box<dyn Renderer>;

    fn window_handle(&self) -> Option<RawWindowHandle> {
        None
    }

    fn display_handle(&self) -> Option<RawDisplayHandle> {
        None
    }
}

/// Windowing services.
pub trait Platform {
    /// Connected monitors. May be empty.
    fn monitors(&self) -> Vec<Monitor>;

    /// Pointer position in screen coordinates, if known.
    fn pointer_position(&self) -> Option<Point>;

    /// Create a hidden popup surface.
    fn create_popup_surface(&mut self) -> Result<Box<dyn PopupSurface>>;
}

// ---------------------------------------------------------------------------
// Headless
// ---------------------------------------------------------------------------

/// State of one headless popup surface.
#[derive(Debug, Clone, Default)]
pub struct SurfaceRecord {
    pub bounds: Rect,
    pub visible: bool,
    pub opacity: f32,
    /// Frames drawn on this surface.
    pub renderer: RecordingHandle,
}

#[derive(Debug, Default)]
struct HeadlessState {
    monitors: Vec<Monitor>,
    pointer: Option<Point>,
    surfaces: Vec<SurfaceRecord>,
    fail_surfaces: bool,
}

/// Shared view of a [`HeadlessPlatform`].
#[derive(Debug, Clone, Default)]
pub struct HeadlessHandle {
    state: Arc<Mutex<HeadlessState>>,
}

impl HeadlessHandle {
    pub fn set_monitors(&self, monitors: Vec<Monitor>) {
        self.state.lock().monitors = monitors;
    }

    pub fn set_pointer_position(&self, position: Option<Point>) {
        self.state.lock().pointer = position;
    }

    /// Make surface creation fail until reset.
    pub fn fail_surface_creation(&self, fail: bool) {
        self.state.lock().fail_surfaces = fail;
    }

    /// Every surface created so far, in creation order.
    pub fn surfaces(&self) -> Vec<SurfaceRecord> {
        self.state.lock().surfaces.clone()
    }

    /// Surfaces currently shown.
    pub fn visible_surfaces(&self) -> Vec<SurfaceRecord> {
        self.state
            .lock()
            .surfaces
            .iter()
            .filter(|s| s.visible)
            .cloned()
            .collect()
    }
}

/// In-memory [`Platform`]. Defaults to one 1920x1080 monitor.
#[derive(Debug, Clone)]
pub struct HeadlessPlatform {
    handle: HeadlessHandle,
}

impl HeadlessPlatform {
    pub fn new() -> Self {
        let handle = HeadlessHandle::default();
        handle.set_monitors(vec![Monitor::new(Rect::new(0.0, 0.0, 1920.0, 1080.0))]);
        Self { handle }
    }

    pub fn handle(&self) -> HeadlessHandle {
        self.handle.clone()
    }
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for HeadlessPlatform {
    fn monitors(&self) -> Vec<Monitor> {
        self.handle.state.lock().monitors.clone()
    }

    fn pointer_position(&self) -> Option<Point> {
        self.handle.state.lock().pointer
    }

    fn create_popup_surface(&mut self) -> Result<Box<dyn PopupSurface>> {
        let mut state = self.handle.state.lock();
        if state.fail_surfaces {
            return Err(UiError::SurfaceLost(
                "headless platform refused to create a surface".into(),
            ));
        }
        let index = state.surfaces.len();
        state.surfaces.push(SurfaceRecord {
            opacity: 1.0,
            ..SurfaceRecord::default()
        });
        Ok(Box::new(HeadlessSurface {
            index,
            state: self.handle.state.clone(),
        }))
    }
}

struct HeadlessSurface {
    index: usize,
    state: Arc<Mutex<HeadlessState>>,
}

impl HeadlessSurface {
    fn with<R>(&self, f: impl FnOnce(&mut SurfaceRecord) -> R) -> Option<R> {
        self.state.lock().surfaces.get_mut(self.index).map(f)
    }
}

impl PopupSurface for HeadlessSurface {
    fn set_bounds(&mut self, bounds: Rect) {
        self.with(|s| s.bounds = bounds);
    }

    fn bounds(&self) -> Rect {
        self.with(|s| s.bounds).unwrap_or(Rect::EMPTY)
    }

    fn show(&mut self) {
        self.with(|s| s.visible = true);
    }

    fn hide(&mut self) {
        self.with(|s| s.visible = false);
    }

    fn is_visible(&self) -> bool {
        self.with(|s| s.visible).unwrap_or(false)
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.with(|s| s.opacity = opacity);
    }

    fn create_renderer(&mut self) -> Box<dyn Renderer> {
        let renderer = RecordingRenderer::new();
        let handle = renderer.handle();
        self.with(|s| s.renderer = handle);
        Box::new(renderer)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_one_monitor() {
        let platform = HeadlessPlatform::new();
        assert_eq!(platform.monitors().len(), 1);
        assert_eq!(platform.pointer_position(), None);
    }

    #[test]
    fn surfaces_are_visible_through_handle() {
        let mut platform = HeadlessPlatform::new();
        let handle = platform.handle();
        let mut surface = platform.create_popup_surface().unwrap();
        surface.set_bounds(Rect::new(10.0, 20.0, 30.0, 40.0));
        surface.show();
        assert!(surface.is_visible());
        assert_eq!(handle.visible_surfaces().len(), 1);
        assert_eq!(handle.surfaces()[0].bounds, Rect::new(10.0, 20.0, 30.0, 40.0));
        surface.hide();
        assert!(handle.visible_surfaces().is_empty());
    }

    #[test]
    fn creation_failure_is_surface_lost() {
        let mut platform = HeadlessPlatform::new();
        platform.handle().fail_surface_creation(true);
        assert!(matches!(
            platform.create_popup_surface(),
            Err(UiError::SurfaceLost(_))
        ));
    }
}
