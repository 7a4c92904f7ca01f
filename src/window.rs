//! Window: one top-level surface with its element tree, renderer and input.
//!
//! A [`Window`] owns an [`ElementTree`] whose root element carries a name
//! scope. Each frame the owning [`Application`](crate::app::Application)
//! calls [`Window::prepare_frame`] (destroyed elements, layout, visual
//! invalidations), lets the popup service react to popup changes,
//! and then calls [`Window::render`].

use std::sync::Arc;

use log::debug;
use slotmap::new_key_type;

use crate::dispatcher::ThreadAccessPolicy;
use crate::error::Result;
use crate::event::{InputConfig, InputEvent, InputManager};
use crate::geometry::{Point, Size};
use crate::layout::update_layout;
use crate::property::PropertyRegistry;
use crate::render::{Extent, FrameContext, RenderHost, Renderer, RendererParams};
use crate::tree::{ElementId, ElementTree};
use crate::widgets::Panel;

new_key_type! {
    /// Key of a window in an [`Application`](crate::app::Application).
    pub struct WindowId;
}

// ---------------------------------------------------------------------------
// WindowConfig
// ---------------------------------------------------------------------------

/// Configuration for a window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowConfig {
    pub title: String,
    /// Client size in physical pixels.
    pub extent: Extent,
    /// Client-area origin in screen coordinates.
    pub origin: Point,
    pub pixel_ratio: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: String::from("vellum"),
            extent: Extent::new(800, 600),
            origin: Point::ZERO,
            pixel_ratio: 1.0,
        }
    }
}

impl WindowConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title (builder).
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the client size (builder).
    pub fn with_extent(mut self, width: u32, height: u32) -> Self {
        self.extent = Extent::new(width, height);
        self
    }

    /// Set the screen position of the client area (builder).
    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_pixel_ratio(mut self, ratio: f32) -> Self {
        self.pixel_ratio = ratio;
        self
    }
}

// ---------------------------------------------------------------------------
// Window
// ---------------------------------------------------------------------------

/// What [`Window::prepare_frame`] found that the window cannot handle alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameUpdate {
    /// Popups whose `IsOpen` changed since the last frame.
    pub popup_changes: Vec<ElementId>,
    /// Invalidated elements outside the window's visual tree, such as popup
    /// content.
    pub foreign_invalidations: Vec<ElementId>,
    pub destroyed: Vec<ElementId>,
}

/// A top-level window.
pub struct Window {
    config: WindowConfig,
    tree: ElementTree,
    root: ElementId,
    host: RenderHost,
    input: InputManager,
}

impl Window {
    /// Create a window and initialize its renderer. `params` supplies the
    /// native handles and diagnostics; extent and pixel ratio come from
    /// `config`.
    pub fn new(
        registry: Arc<PropertyRegistry>,
        policy: ThreadAccessPolicy,
        config: WindowConfig,
        renderer: Box<dyn Renderer>,
        params: &RendererParams,
        input: InputConfig,
    ) -> Result<Self> {
        let mut tree = ElementTree::with_policy(registry, policy);
        let root = tree.create(Panel::new());
        tree.set_root(root);
        tree.create_name_scope(root);

        let mut host = RenderHost::new(renderer);
        host.initialize(&RendererParams {
            extent: config.extent,
            pixel_ratio: config.pixel_ratio,
            ..params.clone()
        })?;
        debug!("window {:?} created", config.title);

        Ok(Self {
            config,
            tree,
            root,
            host,
            input: InputManager::new(input),
        })
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    pub fn title(&self) -> &str {
        &self.config.title
    }

    /// Client-area origin in screen coordinates.
    pub fn origin(&self) -> Point {
        self.config.origin
    }

    pub fn set_origin(&mut self, origin: Point) {
        self.config.origin = origin;
    }

    pub fn tree(&self) -> &ElementTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ElementTree {
        &mut self.tree
    }

    /// The window's root element. It owns the window's name scope.
    pub fn root(&self) -> ElementId {
        self.root
    }

    /// Replace the root's children with `content`.
    pub fn set_content(&mut self, content: ElementId) {
        for child in self.tree.visual_children(self.root).to_vec() {
            self.tree.remove_child(self.root, child);
        }
        self.tree.append_child(self.root, content);
    }

    /// Look a name up in the window's scope.
    pub fn find_name(&self, name: &str) -> Option<ElementId> {
        self.tree.find_name(self.root, name)
    }

    pub fn host(&self) -> &RenderHost {
        &self.host
    }

    pub fn input(&self) -> &InputManager {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputManager {
        &mut self.input
    }

    /// Both the tree and the input manager, borrowed together.
    pub fn tree_and_input(&mut self) -> (&mut ElementTree, &mut InputManager) {
        (&mut self.tree, &mut self.input)
    }

    /// Logical client size.
    pub fn client_size(&self) -> Size {
        let ratio = if self.config.pixel_ratio > 0.0 {
            self.config.pixel_ratio
        } else {
            1.0
        };
        Size::new(
            self.config.extent.width as f32 / ratio,
            self.config.extent.height as f32 / ratio,
        )
    }

    /// Resize the client area. The renderer is resized and the root
    /// re-measured on the next frame.
    pub fn resize(&mut self, extent: Extent) -> Result<()> {
        if extent == self.config.extent {
            return Ok(());
        }
        self.config.extent = extent;
        self.tree.invalidate_measure(self.root);
        self.host.resize(extent)
    }

    /// Route an input event given in client coordinates.
    pub fn process_input(&mut self, event: &InputEvent) -> bool {
        self.input.process(&mut self.tree, self.root, event)
    }

    /// Handle destroyed elements, update layout, then forward visual
    /// invalidations.
    pub fn prepare_frame(&mut self) -> FrameUpdate {
        let destroyed = self.tree.take_destroyed();
        if !destroyed.is_empty() {
            self.input.forget_destroyed(&destroyed);
            self.host.request_render();
        }

        let size = self.client_size();
        if update_layout(&mut self.tree, self.root, size) {
            self.host.request_render();
        }

        FrameUpdate {
            popup_changes: self.tree.take_popup_changes(),
            foreign_invalidations: self.route_invalidations(),
            destroyed,
        }
    }

    /// Forward pending visual invalidations inside the window's visual tree
    /// to its render host. Returns the rest.
    pub fn route_invalidations(&mut self) -> Vec<ElementId> {
        let mut foreign = Vec::new();
        for id in self.tree.take_visual_invalidations() {
            if self.tree.is_in_subtree(self.root, id) {
                self.host.invalidate_element(id);
            } else {
                foreign.push(id);
            }
        }
        foreign
    }

    /// Present a frame if one is pending.
    pub fn render(&mut self, ctx: &FrameContext) -> bool {
        self.host.render_frame(&self.tree, self.root, ctx)
    }

    /// Ask for a frame even if nothing changed.
    pub fn request_render(&mut self) {
        self.host.request_render();
    }

    pub(crate) fn shutdown(&mut self) {
        self.host.shutdown();
    }
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window")
            .field("title", &self.config.title)
            .field("root", &self.root)
            .field("elements", &self.tree.len())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Color;
    use crate::property::core::{NAME, WIDTH};
    use crate::render::{RecordingHandle, RecordingRenderer};
    use crate::widgets::Rectangle;

    fn window() -> (Window, RecordingHandle) {
        let renderer = RecordingRenderer::new();
        let handle = renderer.handle();
        let window = Window::new(
            Arc::new(PropertyRegistry::new()),
            ThreadAccessPolicy::ThrowException,
            WindowConfig::new().with_extent(200, 100),
            Box::new(renderer),
            &RendererParams::headless(Extent::new(1, 1)),
            InputConfig::default(),
        )
        .unwrap();
        (window, handle)
    }

    #[test]
    fn renderer_gets_window_extent() {
        let (_window, handle) = window();
        assert!(handle.is_initialized());
        assert_eq!(handle.extent(), Extent::new(200, 100));
    }

    #[test]
    fn root_fills_client_area() {
        let (mut w, _) = window();
        w.prepare_frame();
        assert_eq!(w.tree().render_size(w.root()), Size::new(200.0, 100.0));
    }

    #[test]
    fn first_frame_is_presented_once() {
        let (mut w, handle) = window();
        let rect = w.tree_mut().create(Rectangle::new().with_fill(Color::BLACK));
        w.set_content(rect);
        w.prepare_frame();
        assert!(w.render(&FrameContext::default()));
        w.prepare_frame();
        assert!(!w.render(&FrameContext::default()));
        assert_eq!(handle.frame_count(), 1);
    }

    #[test]
    fn property_change_triggers_redraw() {
        let (mut w, handle) = window();
        let rect = w.tree_mut().create(Rectangle::new().with_fill(Color::BLACK));
        w.set_content(rect);
        w.prepare_frame();
        w.render(&FrameContext::default());

        w.tree_mut().set_value(rect, WIDTH, 50.0).unwrap();
        w.prepare_frame();
        assert!(w.render(&FrameContext::default()));
        assert_eq!(handle.frame_count(), 2);
    }

    #[test]
    fn names_resolve_in_window_scope() {
        let (mut w, _) = window();
        let rect = w.tree_mut().create(Rectangle::new());
        w.tree_mut().set_value(rect, NAME, "box".to_string()).unwrap();
        w.set_content(rect);
        assert_eq!(w.find_name("box"), Some(rect));
    }

    #[test]
    fn resize_remeasures_root() {
        let (mut w, handle) = window();
        w.prepare_frame();
        w.resize(Extent::new(300, 150)).unwrap();
        w.prepare_frame();
        assert_eq!(w.tree().render_size(w.root()), Size::new(300.0, 150.0));
        assert_eq!(handle.resizes(), vec![Extent::new(300, 150)]);
    }
}
