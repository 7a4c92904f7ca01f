//! Pilot: programmatic interaction with a headless Application.
//!
//! The `Pilot` wraps an [`Application`] on a headless platform with one
//! window drawing into a [`RecordingRenderer`]. It provides methods to
//! simulate user input, run frames, and inspect what was drawn.

use crate::app::{AppConfig, Application, SurfaceId};
use crate::event::{CharEvent, InputEvent, Key, KeyEvent, Modifiers, PointerEvent};
use crate::geometry::{Point, Rect};
use crate::popup::{HeadlessHandle, HeadlessPlatform};
use crate::render::{RecordingHandle, RecordingRenderer, RenderList};
use crate::tree::{ElementId, ElementTree};
use crate::window::{Window, WindowConfig, WindowId};

/// Frame step used by [`Pilot::frame`] and [`Pilot::advance`].
pub const FRAME_DELTA: f64 = 1.0 / 60.0;

// ---------------------------------------------------------------------------
// Pilot
// ---------------------------------------------------------------------------

/// A headless application driver for testing.
///
/// Input methods only route events. Call [`frame`](Self::frame) after
/// changing the tree so layout is current before hit testing.
///
/// # Examples
///
/// ```ignore
/// use vellum::testing::Pilot;
/// use vellum::geometry::Point;
///
/// let mut pilot = Pilot::new(400, 300);
/// pilot.frame();
/// pilot.click(Point::new(10.0, 10.0));
/// ```
pub struct Pilot {
    app: Application,
    window: WindowId,
    renderer: RecordingHandle,
    platform: HeadlessHandle,
}

impl Pilot {
    /// Create a headless app with one window of the given client size.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_config(AppConfig::default(), WindowConfig::new().with_extent(width, height))
    }

    /// Create a Pilot from explicit configs.
    ///
    /// # Panics
    ///
    /// If the recording renderer fails to initialize, which only happens
    /// when told to.
    pub fn with_config(config: AppConfig, window: WindowConfig) -> Self {
        let platform = HeadlessPlatform::new();
        let platform_handle = platform.handle();
        let mut app = Application::new(config, Box::new(platform));
        let renderer = RecordingRenderer::new();
        let handle = renderer.handle();
        let window = app
            .create_window(window, Box::new(renderer))
            .expect("recording renderer initializes");
        Self {
            app,
            window,
            renderer: handle,
            platform: platform_handle,
        }
    }

    // ── Pointer input ────────────────────────────────────────────────

    /// Send a pointer event to the window. Returns whether it was handled.
    pub fn pointer(&mut self, event: PointerEvent) -> bool {
        self.app.dispatch(SurfaceId::Window(self.window), &event.into())
    }

    pub fn move_to(&mut self, position: Point) -> bool {
        self.pointer(PointerEvent::moved(position))
    }

    pub fn pointer_down(&mut self, position: Point) -> bool {
        self.pointer(PointerEvent::down(position))
    }

    pub fn pointer_up(&mut self, position: Point) -> bool {
        self.pointer(PointerEvent::up(position))
    }

    /// Move, press and release the primary button at `position`.
    pub fn click(&mut self, position: Point) {
        self.move_to(position);
        self.pointer_down(position);
        self.pointer_up(position);
    }

    pub fn wheel(&mut self, position: Point, delta: Point) -> bool {
        self.pointer(PointerEvent::wheel(position, delta))
    }

    /// Click inside an open popup, in the popup's surface coordinates.
    pub fn click_popup(&mut self, popup: ElementId, position: Point) {
        let surface = SurfaceId::Popup(self.window, popup);
        for event in [
            PointerEvent::moved(position),
            PointerEvent::down(position),
            PointerEvent::up(position),
        ] {
            self.app.dispatch(surface, &event.into());
        }
    }

    // ── Keyboard input ───────────────────────────────────────────────

    /// Press and release `key` with no modifiers. Returns whether the
    /// key-down was handled.
    pub fn press(&mut self, key: Key) -> bool {
        self.press_with(key, Modifiers::NONE)
    }

    pub fn press_with(&mut self, key: Key, modifiers: Modifiers) -> bool {
        let surface = SurfaceId::Window(self.window);
        let handled = self.app.dispatch(surface, &KeyEvent::down(key, modifiers).into());
        self.app.dispatch(surface, &KeyEvent::up(key, modifiers).into());
        handled
    }

    /// Send each character of `text` as a char event.
    pub fn type_text(&mut self, text: &str) {
        let surface = SurfaceId::Window(self.window);
        for codepoint in text.chars() {
            let event = InputEvent::from(CharEvent {
                codepoint,
                modifiers: Modifiers::NONE,
            });
            self.app.dispatch(surface, &event);
        }
    }

    // ── Frames ───────────────────────────────────────────────────────

    /// Run one frame. Returns the number of frames presented.
    pub fn frame(&mut self) -> usize {
        self.app.frame(FRAME_DELTA)
    }

    /// Run frames until `seconds` have passed. Returns the frames presented.
    pub fn advance(&mut self, seconds: f64) -> usize {
        let mut presented = 0;
        let mut remaining = seconds;
        while remaining > 0.0 {
            let step = remaining.min(FRAME_DELTA);
            presented += self.app.frame(step);
            remaining -= step;
        }
        presented
    }

    // ── Query ────────────────────────────────────────────────────────

    pub fn app(&self) -> &Application {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut Application {
        &mut self.app
    }

    pub fn window_id(&self) -> WindowId {
        self.window
    }

    /// The pilot's window.
    ///
    /// # Panics
    ///
    /// If the window was closed through [`app_mut`](Self::app_mut).
    pub fn window(&self) -> &Window {
        self.app.window(self.window).expect("pilot window is open")
    }

    pub fn window_mut(&mut self) -> &mut Window {
        self.app.window_mut(self.window).expect("pilot window is open")
    }

    pub fn tree(&self) -> &ElementTree {
        self.window().tree()
    }

    pub fn tree_mut(&mut self) -> &mut ElementTree {
        self.window_mut().tree_mut()
    }

    pub fn root(&self) -> ElementId {
        self.window().root()
    }

    /// Replace the window's content.
    pub fn set_content(&mut self, content: ElementId) {
        self.window_mut().set_content(content);
    }

    pub fn find(&self, name: &str) -> Option<ElementId> {
        self.window().find_name(name)
    }

    pub fn focused(&self) -> Option<ElementId> {
        self.window().input().focused()
    }

    /// The window's recording renderer.
    pub fn renderer(&self) -> &RecordingHandle {
        &self.renderer
    }

    /// Handle to the headless platform behind the app.
    pub fn platform(&self) -> &HeadlessHandle {
        &self.platform
    }

    /// The list of the window's last presented frame.
    pub fn last_list(&self) -> Option<RenderList> {
        self.renderer.last_list()
    }

    /// The last presented frame as text.
    pub fn snapshot(&self) -> String {
        self.last_list()
            .map(|list| super::snapshot::render_list_to_string(&list))
            .unwrap_or_default()
    }

    /// Screen rect of an open popup's surface.
    pub fn popup_bounds(&self, popup: ElementId) -> Option<Rect> {
        self.app
            .popups()
            .root(self.window, popup)
            .filter(|root| root.is_visible())
            .map(|root| root.bounds())
    }
}

// ===========================================================================
// Tests
// ===========================================================================
