//! PopupRoot: the surface, renderer and input state of one popup.

use log::debug;

use super::placement::{place_popup, Monitor, PlacementRequest};
use super::platform::PopupSurface;
use crate::error::Result;
use crate::event::{InputConfig, InputEvent, InputManager};
use crate::geometry::{Point, Rect, Size};
use crate::layout::update_layout;
use crate::property::core::{HORIZONTAL_OFFSET, PLACEMENT_MODE, STAYS_OPEN, VERTICAL_OFFSET};
use crate::property::impl_enum_value;
use crate::render::{Extent, FrameContext, RenderHost, RendererParams};
use crate::tree::{ElementId, ElementTree};
use crate::widgets::Popup;

/// Seconds a fade-out takes.
pub const FADE_DURATION: f64 = 0.15;

/// Animation played when a popup closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PopupAnimation {
    #[default]
    None,
    Fade,
}

impl_enum_value!(PopupAnimation, "PopupAnimation", [None, Fade]);

#[derive(Debug, Clone, Copy, PartialEq)]
enum PopupState {
    Hidden,
    Open,
    Closing { elapsed: f64 },
}

/// An independent top-level surface showing one popup's content.
///
/// The content stays in the owner's [`ElementTree`]; the root lays it out,
/// draws it and routes its input in surface coordinates.
pub struct PopupRoot {
    popup: ElementId,
    surface: Box<dyn PopupSurface>,
    host: RenderHost,
    input: InputManager,
    input_config: InputConfig,
    state: PopupState,
    bounds: Rect,
    stays_open: bool,
    anchor_pointer: Option<Point>,
}

impl PopupRoot {
    /// Create the root for `popup` on `surface`. The surface's renderer is
    /// initialized with `params` (plus the surface's native handles).
    pub fn new(
        popup: ElementId,
        mut surface: Box<dyn PopupSurface>,
        params: &RendererParams,
        input_config: InputConfig,
    ) -> Result<Self> {
        let mut host = RenderHost::new(surface.create_renderer());
        let params = RendererParams {
            window_handle: surface.window_handle(),
            display_handle: surface.display_handle(),
            ..params.clone()
        };
        host.initialize(&params)?;
        Ok(Self {
            popup,
            surface,
            host,
            input: InputManager::new(input_config.clone()),
            input_config,
            state: PopupState::Hidden,
            bounds: Rect::EMPTY,
            stays_open: true,
            anchor_pointer: None,
        })
    }

    /// The Popup element this root serves.
    pub fn popup(&self) -> ElementId {
        self.popup
    }

    pub fn content(&self, tree: &ElementTree) -> Option<ElementId> {
        Popup::child(tree, self.popup)
    }

    pub fn is_open(&self) -> bool {
        self.state == PopupState::Open
    }

    pub fn is_closing(&self) -> bool {
        matches!(self.state, PopupState::Closing { .. })
    }

    /// Open or still fading out.
    pub fn is_visible(&self) -> bool {
        self.state != PopupState::Hidden
    }

    /// Surface rect in screen coordinates.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn stays_open(&self) -> bool {
        self.stays_open
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

    /// Whether `point` (screen coordinates) lies on this visible surface.
    pub fn contains_screen_point(&self, point: Point) -> bool {
        self.is_visible() && self.bounds.contains(point)
    }

    /// Lay out the content, place the surface and refresh cached
    /// properties. `target` is the placement target's screen rect.
    pub fn update(
        &mut self,
        tree: &mut ElementTree,
        target: Option<Rect>,
        monitors: &[Monitor],
    ) -> Result<()> {
        let size = match self.content(tree) {
            Some(content) => {
                if update_layout(tree, content, Size::INFINITE) {
                    self.host.request_render();
                }
                tree.desired_size(content).unwrap_or_default()
            }
            None => Size::ZERO,
        };

        let mut request = PlacementRequest::new(tree.get(self.popup, PLACEMENT_MODE), target, size)
            .with_offset(Point::new(
                tree.get(self.popup, HORIZONTAL_OFFSET),
                tree.get(self.popup, VERTICAL_OFFSET),
            ));
        if let Some(pointer) = self.anchor_pointer {
            request = request.with_pointer(pointer);
        }
        let bounds = Rect::from_origin_size(place_popup(&request, monitors), size);
        self.stays_open = tree.get(self.popup, STAYS_OPEN);

        if bounds != self.bounds {
            self.bounds = bounds;
            self.surface.set_bounds(bounds);
            self.host.resize(Extent::new(
                bounds.width.ceil() as u32,
                bounds.height.ceil() as u32,
            ))?;
            self.host.request_render();
        }
        Ok(())
    }

    /// Place and show the surface. `pointer` anchors `Mouse` placement.
    pub fn open(
        &mut self,
        tree: &mut ElementTree,
        target: Option<Rect>,
        monitors: &[Monitor],
        pointer: Option<Point>,
    ) -> Result<()> {
        self.anchor_pointer = pointer;
        self.update(tree, target, monitors)?;
        self.surface.set_opacity(1.0);
        self.surface.show();
        self.state = PopupState::Open;
        self.host.request_render();
        debug!("popup {:?} opened at {:?}", self.popup, self.bounds);
        Ok(())
    }

    /// Start closing. With [`PopupAnimation::Fade`] the surface stays
    /// visible until [`tick`](Self::tick) finishes the fade.
    pub fn close(&mut self, animation: PopupAnimation) {
        if self.state != PopupState::Open {
            return;
        }
        match animation {
            PopupAnimation::Fade => self.state = PopupState::Closing { elapsed: 0.0 },
            PopupAnimation::None => self.hide(),
        }
    }

    /// Hide immediately, cancelling any fade.
    pub fn hide(&mut self) {
        if self.state == PopupState::Hidden {
            return;
        }
        self.surface.hide();
        self.state = PopupState::Hidden;
        self.input = InputManager::new(self.input_config.clone());
        debug!("popup {:?} hidden", self.popup);
    }

    /// Advance the close animation by `delta` seconds.
    pub fn tick(&mut self, delta: f64) {
        let PopupState::Closing { elapsed } = self.state else {
            return;
        };
        let elapsed = elapsed + delta;
        if elapsed >= FADE_DURATION {
            self.hide();
        } else {
            self.state = PopupState::Closing { elapsed };
            self.surface.set_opacity((1.0 - elapsed / FADE_DURATION) as f32);
            self.host.request_render();
        }
    }

    pub fn invalidate(&mut self, id: ElementId) {
        self.host.invalidate_element(id);
    }

    /// Present a frame if one is pending and the surface is visible.
    pub fn render(&mut self, tree: &ElementTree, ctx: &FrameContext) -> bool {
        if !self.is_visible() {
            return false;
        }
        match self.content(tree) {
            Some(content) => self.host.render_frame(tree, content, ctx),
            None => false,
        }
    }

    /// Route an input event given in surface coordinates.
    pub fn process_input(&mut self, tree: &mut ElementTree, event: &InputEvent) -> bool {
        if !self.is_open() {
            return false;
        }
        match self.content(tree) {
            Some(content) => self.input.process(tree, content, event),
            None => false,
        }
    }

    pub(crate) fn shutdown(&mut self) {
        self.hide();
        self.host.shutdown();
    }
}

impl std::fmt::Debug for PopupRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PopupRoot")
            .field("popup", &self.popup)
            .field("state", &self.state)
            .field("bounds", &self.bounds)
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
