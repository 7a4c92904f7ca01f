//! Application: windows, popups and the frame loop.
//!
//! [`Application`] owns the shared property registry, every [`Window`], the
//! [`PopupService`] and the [`Platform`]. Hosts feed it input with
//! [`Application::dispatch`] and drive it with [`Application::frame`]; the
//! headless constructor allows testing without a real window system.

use std::sync::Arc;

use log::{debug, info, warn};
use slotmap::SlotMap;

use crate::dispatcher::ThreadAccessPolicy;
use crate::error::{Result, UiError};
use crate::event::{InputConfig, InputEvent, PointerAction};
use crate::geometry::{Color, Point};
use crate::popup::{HeadlessPlatform, Platform, PopupService};
use crate::property::core::IS_OPEN;
use crate::property::PropertyRegistry;
use crate::render::{Extent, FrameContext, Renderer, RendererParams};
use crate::tree::ElementId;
use crate::window::{Window, WindowConfig, WindowId};

// ---------------------------------------------------------------------------
// AppConfig
// ---------------------------------------------------------------------------

/// Configuration for the application.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Policy for UI access from a foreign thread, applied to every window.
    pub thread_policy: ThreadAccessPolicy,
    /// Clear color passed to every frame.
    pub clear_color: Color,
    /// Pixel ratio for popup surfaces. Windows carry their own.
    pub pixel_ratio: f32,
    /// Ask renderers for a debug layer.
    pub debug_layer: bool,
    /// Diagnostic renderer name.
    pub renderer_name: String,
    pub input: InputConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            thread_policy: ThreadAccessPolicy::default(),
            clear_color: Color::WHITE,
            pixel_ratio: 1.0,
            debug_layer: false,
            renderer_name: String::from("vellum"),
            input: InputConfig::default(),
        }
    }
}

impl AppConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the thread access policy (builder).
    pub fn with_thread_policy(mut self, policy: ThreadAccessPolicy) -> Self {
        self.thread_policy = policy;
        self
    }

    /// Set the clear color (builder).
    pub fn with_clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    pub fn with_pixel_ratio(mut self, ratio: f32) -> Self {
        self.pixel_ratio = ratio;
        self
    }

    pub fn with_debug_layer(mut self, enabled: bool) -> Self {
        self.debug_layer = enabled;
        self
    }

    pub fn with_renderer_name(mut self, name: impl Into<String>) -> Self {
        self.renderer_name = name.into();
        self
    }

    /// Set the input configuration used by windows and popups (builder).
    pub fn with_input(mut self, input: InputConfig) -> Self {
        self.input = input;
        self
    }

    fn renderer_params(&self, extent: Extent, pixel_ratio: f32) -> RendererParams {
        RendererParams {
            window_handle: None,
            display_handle: None,
            extent,
            pixel_ratio,
            debug_layer: self.debug_layer,
            name: self.renderer_name.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// SurfaceId
// ---------------------------------------------------------------------------

/// A surface that receives platform input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceId {
    Window(WindowId),
    /// A popup of the given window, identified by its Popup element.
    Popup(WindowId, ElementId),
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

/// The application.
///
/// Owns the property registry shared by all windows, the windows, the popup
/// service and the platform.
pub struct Application {
    config: AppConfig,
    registry: Arc<PropertyRegistry>,
    windows: SlotMap<WindowId, Window>,
    popups: PopupService,
    platform: Box<dyn Platform>,
    elapsed: f64,
    frame_index: u64,
}

impl Application {
    pub fn new(config: AppConfig, platform: Box<dyn Platform>) -> Self {
        let popups = PopupService::new(
            config.renderer_params(Extent::new(1, 1), config.pixel_ratio),
            config.input.clone(),
        );
        info!("application started ({:?})", config.thread_policy);
        Self {
            config,
            registry: Arc::new(PropertyRegistry::new()),
            windows: SlotMap::with_key(),
            popups,
            platform,
            elapsed: 0.0,
            frame_index: 0,
        }
    }

    /// Create an application on a [`HeadlessPlatform`].
    pub fn headless(config: AppConfig) -> Self {
        Self::new(config, Box::new(HeadlessPlatform::new()))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The registry shared by every window's tree.
    pub fn registry(&self) -> &Arc<PropertyRegistry> {
        &self.registry
    }

    pub fn platform(&self) -> &dyn Platform {
        self.platform.as_ref()
    }

    pub fn popups(&self) -> &PopupService {
        &self.popups
    }

    /// Seconds accumulated by [`frame`](Self::frame).
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    // ── Windows ──────────────────────────────────────────────────────

    /// Create a window drawing through `renderer`.
    pub fn create_window(
        &mut self,
        config: WindowConfig,
        renderer: Box<dyn Renderer>,
    ) -> Result<WindowId> {
        let params = self.config.renderer_params(config.extent, config.pixel_ratio);
        let window = Window::new(
            self.registry.clone(),
            self.config.thread_policy,
            config,
            renderer,
            &params,
            self.config.input.clone(),
        )?;
        Ok(self.windows.insert(window))
    }

    /// Close a window, its popups and its renderer.
    pub fn close_window(&mut self, id: WindowId) -> bool {
        self.popups.close_window(id);
        match self.windows.remove(id) {
            Some(mut window) => {
                window.shutdown();
                debug!("window {:?} closed", window.title());
                true
            }
            None => false,
        }
    }

    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.windows.get(id)
    }

    pub fn window_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        self.windows.get_mut(id)
    }

    pub fn window_ids(&self) -> Vec<WindowId> {
        self.windows.keys().collect()
    }

    pub fn resize_window(&mut self, id: WindowId, extent: Extent) -> Result<()> {
        self.windows
            .get_mut(id)
            .ok_or(UiError::ElementNotFound)?
            .resize(extent)
    }

    // ── Input ────────────────────────────────────────────────────────

    /// The surface under `point` (screen coordinates). Popups are above
    /// windows.
    pub fn surface_at(&self, point: Point) -> Option<SurfaceId> {
        if let Some((window, popup)) = self.popups.popup_at(point) {
            return Some(SurfaceId::Popup(window, popup));
        }
        self.windows
            .iter()
            .find(|(_, w)| {
                let size = w.client_size();
                let origin = w.origin();
                point.x >= origin.x
                    && point.y >= origin.y
                    && point.x < origin.x + size.width
                    && point.y < origin.y + size.height
            })
            .map(|(id, _)| SurfaceId::Window(id))
    }

    /// Route a platform event given in `surface`'s coordinates.
    ///
    /// A pointer-down first closes every popup with `StaysOpen = false`
    /// unless it lands on an open popup surface. Returns whether a handler
    /// marked the event handled.
    pub fn dispatch(&mut self, surface: SurfaceId, event: &InputEvent) -> bool {
        if let InputEvent::Pointer(p) = event {
            if p.action == PointerAction::Down {
                if let Some(origin) = self.surface_origin(surface) {
                    self.dismiss_popups(origin + p.position);
                }
            }
        }

        match surface {
            SurfaceId::Window(id) => match self.windows.get_mut(id) {
                Some(window) => window.process_input(event),
                None => {
                    warn!("input for unknown window {id:?} dropped");
                    false
                }
            },
            SurfaceId::Popup(id, popup) => match self.windows.get_mut(id) {
                Some(window) => self.popups.process_input(id, popup, window.tree_mut(), event),
                None => false,
            },
        }
    }

    fn surface_origin(&self, surface: SurfaceId) -> Option<Point> {
        match surface {
            SurfaceId::Window(id) => self.windows.get(id).map(Window::origin),
            SurfaceId::Popup(id, popup) => self.popups.bounds(id, popup).map(|r| r.origin()),
        }
    }

    fn dismiss_popups(&mut self, screen_point: Point) {
        for (id, popup) in self.popups.dismiss_candidates(screen_point) {
            let Some(window) = self.windows.get_mut(id) else {
                continue;
            };
            debug!("pointer-down outside popup {popup:?}; dismissing");
            if let Err(err) = window.tree_mut().set_value(popup, IS_OPEN, false) {
                warn!("dismissing popup {popup:?}: {err}");
            }
        }
    }

    // ── Frame loop ───────────────────────────────────────────────────

    /// Run one frame, `delta` seconds after the previous one.
    ///
    /// For each window: prepare (destroyed elements, invalidations, layout),
    /// then bring its popups in line. Popup animations advance once, and
    /// finally every window and visible popup with a pending frame is drawn.
    /// Returns the number of frames presented.
    pub fn frame(&mut self, delta: f64) -> usize {
        self.elapsed += delta;
        self.frame_index += 1;
        let ctx = FrameContext {
            elapsed: self.elapsed,
            delta,
            clear_color: self.config.clear_color,
            frame_index: self.frame_index,
        };

        for (id, window) in self.windows.iter_mut() {
            let update = window.prepare_frame();
            self.popups.forget_destroyed(id, &update.destroyed);
            let origin = window.origin();
            self.popups.sync(
                self.platform.as_mut(),
                id,
                window.tree_mut(),
                origin,
                &update.popup_changes,
            );
            // Popup layout runs during sync and may invalidate more content.
            let mut foreign = update.foreign_invalidations;
            foreign.extend(window.route_invalidations());
            for element in foreign {
                self.popups.invalidate(id, window.tree(), element);
            }
        }

        self.popups.tick(delta);

        let mut presented = 0;
        for (id, window) in self.windows.iter_mut() {
            if window.render(&ctx) {
                presented += 1;
            }
            presented += self.popups.render(id, window.tree(), &ctx);
        }
        presented
    }
}

impl Drop for Application {
    fn drop(&mut self) {
        let ids: Vec<WindowId> = self.windows.keys().collect();
        for id in ids {
            self.close_window(id);
        }
    }
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("windows", &self.windows.len())
            .field("popups", &self.popups)
            .field("frame_index", &self.frame_index)
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::PointerEvent;
    use crate::property::core::{HEIGHT, PLACEMENT_TARGET, STAYS_OPEN, WIDTH};
    use crate::render::{RecordingHandle, RecordingRenderer};
    use crate::widgets::{Popup, Rectangle, StackPanel};

    fn app_with_window() -> (Application, WindowId, RecordingHandle) {
        let mut app = Application::headless(
            AppConfig::new().with_thread_policy(ThreadAccessPolicy::ThrowException),
        );
        let renderer = RecordingRenderer::new();
        let handle = renderer.handle();
        let id = app
            .create_window(
                WindowConfig::new().with_extent(400, 300).with_origin(Point::new(100.0, 100.0)),
                Box::new(renderer),
            )
            .unwrap();
        (app, id, handle)
    }

    /// Window content: a vertical stack holding a 100x30 anchor and a popup
    /// with 80x40 content placed below it.
    fn with_popup(app: &mut Application, id: WindowId) -> (ElementId, ElementId) {
        let window = app.window_mut(id).unwrap();
        let tree = window.tree_mut();
        let stack = tree.create(StackPanel::vertical());
        let anchor = tree.create(Rectangle::new().with_fill(Color::BLACK));
        tree.set_value(anchor, WIDTH, 100.0).unwrap();
        tree.set_value(anchor, HEIGHT, 30.0).unwrap();
        tree.append_child(stack, anchor);
        let popup = tree.create(Popup::new());
        tree.append_child(stack, popup);
        let content = tree.create(Rectangle::new().with_fill(Color::WHITE));
        tree.set_value(content, WIDTH, 80.0).unwrap();
        tree.set_value(content, HEIGHT, 40.0).unwrap();
        Popup::set_child(tree, popup, content);
        tree.set_value(popup, PLACEMENT_TARGET, Some(anchor)).unwrap();
        window.set_content(stack);
        (anchor, popup)
    }

    // ── Construction ─────────────────────────────────────────────────

    #[test]
    fn config_defaults() {
        let config = AppConfig::new();
        assert_eq!(config.clear_color, Color::WHITE);
        assert_eq!(config.pixel_ratio, 1.0);
        assert!(!config.debug_layer);
        assert_eq!(config.input, InputConfig::default());
    }

    #[test]
    fn config_builder() {
        let config = AppConfig::new()
            .with_thread_policy(ThreadAccessPolicy::Disabled)
            .with_clear_color(Color::BLACK)
            .with_debug_layer(true)
            .with_renderer_name("gl");
        assert_eq!(config.thread_policy, ThreadAccessPolicy::Disabled);
        assert_eq!(config.clear_color, Color::BLACK);
        assert!(config.debug_layer);
        assert_eq!(config.renderer_name, "gl");
    }

    #[test]
    fn windows_share_the_registry() {
        let (mut app, first, _) = app_with_window();
        let second = app
            .create_window(WindowConfig::new(), Box::new(RecordingRenderer::new()))
            .unwrap();
        let a = app.window(first).unwrap().tree().registry().clone();
        let b = app.window(second).unwrap().tree().registry().clone();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(app.window_ids().len(), 2);
    }

    #[test]
    fn failing_renderer_fails_window_creation() {
        let mut app = Application::headless(AppConfig::new());
        let renderer = RecordingRenderer::new();
        renderer.handle().fail_next_init();
        let result = app.create_window(WindowConfig::new(), Box::new(renderer));
        assert!(matches!(result, Err(UiError::SurfaceLost(_))));
    }

    // ── Frames ───────────────────────────────────────────────────────

    #[test]
    fn frame_presents_only_when_pending() {
        let (mut app, _, handle) = app_with_window();
        assert_eq!(app.frame(0.016), 1);
        assert_eq!(app.frame(0.016), 0);
        assert_eq!(handle.frame_count(), 1);
        assert_eq!(app.frame_index(), 2);
    }

    #[test]
    fn close_window_shuts_renderer_down() {
        let (mut app, id, handle) = app_with_window();
        assert!(app.close_window(id));
        assert!(!handle.is_initialized());
        assert!(app.window(id).is_none());
        assert!(!app.close_window(id));
    }

    // ── Popups ───────────────────────────────────────────────────────

    #[test]
    fn popup_renders_on_its_own_surface() {
        let (mut app, id, window_frames) = app_with_window();
        let (_, popup) = with_popup(&mut app, id);
        app.frame(0.016);
        let before = window_frames.frame_count();

        app.window_mut(id).unwrap().tree_mut().set_value(popup, IS_OPEN, true).unwrap();
        assert_eq!(app.frame(0.016), 1);
        assert!(app.popups().is_open(id, popup));
        // The owner window did not redraw for the popup.
        assert_eq!(window_frames.frame_count(), before);
    }

    #[test]
    fn surface_at_prefers_popups() {
        let (mut app, id, _) = app_with_window();
        let (_, popup) = with_popup(&mut app, id);
        app.frame(0.016);
        app.window_mut(id).unwrap().tree_mut().set_value(popup, IS_OPEN, true).unwrap();
        app.frame(0.016);

        let bounds = app.popups().bounds(id, popup).unwrap();
        assert_eq!(app.surface_at(bounds.center()), Some(SurfaceId::Popup(id, popup)));
        assert_eq!(app.surface_at(Point::new(110.0, 390.0)), Some(SurfaceId::Window(id)));
        assert_eq!(app.surface_at(Point::new(0.0, 0.0)), None);
    }

    #[test]
    fn outside_click_dismisses_light_popup() {
        let (mut app, id, _) = app_with_window();
        let (_, popup) = with_popup(&mut app, id);
        {
            let tree = app.window_mut(id).unwrap().tree_mut();
            tree.set_value(popup, STAYS_OPEN, false).unwrap();
            tree.set_value(popup, IS_OPEN, true).unwrap();
        }
        app.frame(0.016);
        assert!(app.popups().is_open(id, popup));

        let down = PointerEvent::down(Point::new(390.0, 290.0)).into();
        app.dispatch(SurfaceId::Window(id), &down);
        app.frame(0.016);
        assert!(!app.popups().is_open(id, popup));
        assert!(!app.window(id).unwrap().tree().get(popup, IS_OPEN));
    }

    #[test]
    fn click_inside_popup_keeps_it_open() {
        let (mut app, id, _) = app_with_window();
        let (_, popup) = with_popup(&mut app, id);
        {
            let tree = app.window_mut(id).unwrap().tree_mut();
            tree.set_value(popup, STAYS_OPEN, false).unwrap();
            tree.set_value(popup, IS_OPEN, true).unwrap();
        }
        app.frame(0.016);
        let down = PointerEvent::down(Point::new(5.0, 5.0)).into();
        app.dispatch(SurfaceId::Popup(id, popup), &down);
        app.frame(0.016);
        assert!(app.popups().is_open(id, popup));
    }

    #[test]
    fn closing_window_closes_its_popups() {
        let (mut app, id, _) = app_with_window();
        let (_, popup) = with_popup(&mut app, id);
        app.window_mut(id).unwrap().tree_mut().set_value(popup, IS_OPEN, true).unwrap();
        app.frame(0.016);
        app.close_window(id);
        assert!(app.popups().open_popups().is_empty());
    }
}
