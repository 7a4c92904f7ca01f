//! PopupService: the open popups of every window.
//!
//! The service owns one [`PopupRoot`] per popup that has ever opened. It
//! opens and closes roots when `IsOpen` changes, keeps open roots placed
//! against their targets, closes popups whose target left the window, and
//! decides which popups a global pointer-down dismisses.

use log::{debug, error};

use super::platform::Platform;
use super::root::PopupRoot;
use crate::event::{InputConfig, InputEvent};
use crate::geometry::{Point, Rect};
use crate::property::core::{IS_OPEN, PLACEMENT_TARGET, POPUP_ANIMATION};
use crate::render::{FrameContext, RendererParams};
use crate::tree::{ElementId, ElementTree};
use crate::window::WindowId;

struct Entry {
    window: WindowId,
    root: PopupRoot,
}

/// Registry of popup roots across windows.
pub struct PopupService {
    entries: Vec<Entry>,
    params: RendererParams,
    input: InputConfig,
}

impl PopupService {
    /// `params` seeds each popup renderer; `input` configures each popup's
    /// input manager.
    pub fn new(params: RendererParams, input: InputConfig) -> Self {
        Self {
            entries: Vec::new(),
            params,
            input,
        }
    }

    fn find(&self, window: WindowId, popup: ElementId) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.window == window && e.root.popup() == popup)
    }

    /// The root serving `popup` in `window`.
    pub fn root(&self, window: WindowId, popup: ElementId) -> Option<&PopupRoot> {
        self.find(window, popup).map(|i| &self.entries[i].root)
    }

    pub fn is_open(&self, window: WindowId, popup: ElementId) -> bool {
        self.root(window, popup).is_some_and(PopupRoot::is_open)
    }

    /// Open popups in the order they opened.
    pub fn open_popups(&self) -> Vec<(WindowId, ElementId)> {
        self.entries
            .iter()
            .filter(|e| e.root.is_open())
            .map(|e| (e.window, e.root.popup()))
            .collect()
    }

    /// Bring `window`'s popups in line with its tree.
    ///
    /// `changes` are popups whose `IsOpen` changed. Popups that were
    /// destroyed are dropped, and open popups whose target (or the popup
    /// itself) left the window are closed. Open popups are then re-placed.
    /// `origin` is the window's client origin in screen coordinates.
    /// Failures are logged and affect only the failing popup.
    pub fn sync(
        &mut self,
        platform: &mut dyn Platform,
        window: WindowId,
        tree: &mut ElementTree,
        origin: Point,
        changes: &[ElementId],
    ) {
        self.entries.retain_mut(|e| {
            if e.window != window || tree.contains(e.root.popup()) {
                return true;
            }
            debug!("popup {:?} destroyed; dropping its surface", e.root.popup());
            e.root.shutdown();
            false
        });

        for &popup in changes {
            if !tree.contains(popup) {
                continue;
            }
            if tree.get(popup, IS_OPEN) {
                self.open(platform, window, tree, origin, popup);
            } else if let Some(i) = self.find(window, popup) {
                let animation = tree.get(popup, POPUP_ANIMATION);
                self.entries[i].root.close(animation);
            }
        }

        let monitors = platform.monitors();
        for entry in self.entries.iter_mut().filter(|e| e.window == window && e.root.is_open()) {
            let popup = entry.root.popup();
            if !attached(tree, popup) || tree.get(popup, PLACEMENT_TARGET).is_some_and(|t| !attached(tree, t)) {
                debug!("popup {popup:?} lost its placement target; closing");
                if let Err(err) = tree.set_value(popup, IS_OPEN, false) {
                    error!("closing popup {popup:?}: {err}");
                }
                // The change above is queued again; closing twice is a no-op.
                entry.root.close(tree.get(popup, POPUP_ANIMATION));
                continue;
            }
            let target = target_rect(tree, popup, origin);
            if let Err(err) = entry.root.update(tree, target, &monitors) {
                error!("placing popup {popup:?}: {err}");
            }
        }
    }

    fn open(
        &mut self,
        platform: &mut dyn Platform,
        window: WindowId,
        tree: &mut ElementTree,
        origin: Point,
        popup: ElementId,
    ) {
        let index = match self.find(window, popup) {
            Some(i) => i,
            None => {
                let root = platform
                    .create_popup_surface()
                    .and_then(|surface| PopupRoot::new(popup, surface, &self.params, self.input.clone()));
                match root {
                    Ok(root) => {
                        self.entries.push(Entry { window, root });
                        self.entries.len() - 1
                    }
                    Err(err) => {
                        error!("creating popup surface for {popup:?}: {err}");
                        return;
                    }
                }
            }
        };
        let target = target_rect(tree, popup, origin);
        let monitors = platform.monitors();
        let pointer = platform.pointer_position();
        if let Err(err) = self.entries[index].root.open(tree, target, &monitors, pointer) {
            error!("opening popup {popup:?}: {err}");
        }
    }

    /// Advance close animations.
    pub fn tick(&mut self, delta: f64) {
        for entry in &mut self.entries {
            entry.root.tick(delta);
        }
    }

    /// Present pending frames for `window`'s visible popups. Returns the
    /// number of frames presented.
    pub fn render(&mut self, window: WindowId, tree: &ElementTree, ctx: &FrameContext) -> usize {
        self.entries
            .iter_mut()
            .filter(|e| e.window == window)
            .map(|e| e.root.render(tree, ctx))
            .filter(|&presented| presented)
            .count()
    }

    /// Forward a visual invalidation to the popup whose content contains
    /// `id`. Returns `false` if no popup of `window` shows it.
    pub fn invalidate(&mut self, window: WindowId, tree: &ElementTree, id: ElementId) -> bool {
        for entry in self.entries.iter_mut().filter(|e| e.window == window) {
            if entry.root.content(tree).is_some_and(|c| tree.is_in_subtree(c, id)) {
                entry.root.invalidate(id);
                return true;
            }
        }
        false
    }

    /// The topmost visible popup under `point` (screen coordinates).
    pub fn popup_at(&self, point: Point) -> Option<(WindowId, ElementId)> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.root.contains_screen_point(point))
            .map(|e| (e.window, e.root.popup()))
    }

    /// Open popups a pointer-down at `point` (screen coordinates) should
    /// dismiss: if the point is outside every open popup surface, those
    /// with `StaysOpen = false`.
    pub fn dismiss_candidates(&self, point: Point) -> Vec<(WindowId, ElementId)> {
        if self.entries.iter().any(|e| e.root.is_open() && e.root.bounds().contains(point)) {
            return Vec::new();
        }
        self.entries
            .iter()
            .filter(|e| e.root.is_open() && !e.root.stays_open())
            .map(|e| (e.window, e.root.popup()))
            .collect()
    }

    /// Route an event given in the popup's surface coordinates.
    pub fn process_input(
        &mut self,
        window: WindowId,
        popup: ElementId,
        tree: &mut ElementTree,
        event: &InputEvent,
    ) -> bool {
        match self.find(window, popup) {
            Some(i) => self.entries[i].root.process_input(tree, event),
            None => false,
        }
    }

    /// Screen rect of the surface serving `popup`.
    pub fn bounds(&self, window: WindowId, popup: ElementId) -> Option<Rect> {
        self.root(window, popup).map(PopupRoot::bounds)
    }

    /// Drop every popup of a closing window.
    pub fn close_window(&mut self, window: WindowId) {
        self.entries.retain_mut(|e| {
            if e.window != window {
                return true;
            }
            e.root.shutdown();
            false
        });
    }

    /// Forget destroyed elements in every popup input manager of `window`.
    pub fn forget_destroyed(&mut self, window: WindowId, destroyed: &[ElementId]) {
        for entry in self.entries.iter_mut().filter(|e| e.window == window) {
            entry.root.input_mut().forget_destroyed(destroyed);
        }
    }
}

impl std::fmt::Debug for PopupService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PopupService")
            .field("popups", &self.entries.len())
            .field("open", &self.open_popups().len())
            .finish()
    }
}

/// Whether `id` is alive and visually under its tree's root.
fn attached(tree: &ElementTree, id: ElementId) -> bool {
    tree.root().is_some_and(|root| tree.is_in_subtree(root, id))
}

/// The placement target's screen rect, if it has one.
fn target_rect(tree: &ElementTree, popup: ElementId, origin: Point) -> Option<Rect> {
    let target = tree.get(popup, PLACEMENT_TARGET)?;
    if !attached(tree, target) {
        return None;
    }
    tree.absolute_bounds(target).map(|r| r.translate(origin))
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use slotmap::SlotMap;

    use super::*;
    use crate::geometry::{Color, Size};
    use crate::layout::update_layout;
    use crate::popup::platform::HeadlessPlatform;
    use crate::popup::PopupAnimation;
    use crate::property::core::{HEIGHT, STAYS_OPEN, WIDTH};
    use crate::property::PropertyRegistry;
    use crate::render::Extent;
    use crate::widgets::{Panel, Popup, Rectangle, StackPanel};

    struct Fixture {
        tree: ElementTree,
        window: WindowId,
        button: ElementId,
        popup: ElementId,
        platform: HeadlessPlatform,
        service: PopupService,
    }

    fn build() -> Fixture {
        let mut tree = ElementTree::new(Arc::new(PropertyRegistry::new()));
        let root = tree.create(StackPanel::vertical());
        tree.set_root(root);
        let button = tree.create(Panel::new());
        tree.set_value(button, HEIGHT, 30.0).unwrap();
        tree.set_value(button, WIDTH, 100.0).unwrap();
        tree.append_child(root, button);
        let popup = tree.create(Popup::new());
        tree.append_child(root, popup);
        let content = tree.create(Rectangle::new().with_fill(Color::BLACK));
        tree.set_value(content, WIDTH, 80.0).unwrap();
        tree.set_value(content, HEIGHT, 40.0).unwrap();
        Popup::set_child(&mut tree, popup, content);
        tree.set_value(popup, PLACEMENT_TARGET, Some(button)).unwrap();
        update_layout(&mut tree, root, Size::new(400.0, 300.0));

        let mut windows: SlotMap<WindowId, ()> = SlotMap::with_key();
        Fixture {
            tree,
            window: windows.insert(()),
            button,
            popup,
            platform: HeadlessPlatform::new(),
            service: PopupService::new(
                RendererParams::headless(Extent::new(1, 1)),
                InputConfig::default(),
            ),
        }
    }

    fn pump(f: &mut Fixture) {
        let changes = f.tree.take_popup_changes();
        f.service.sync(&mut f.platform, f.window, &mut f.tree, Point::new(50.0, 60.0), &changes);
    }

    #[test]
    fn opens_below_target_in_screen_space() {
        let mut f = build();
        f.tree.set_value(f.popup, IS_OPEN, true).unwrap();
        pump(&mut f);
        assert!(f.service.is_open(f.window, f.popup));
        // The button is centered in the 400 wide stack: (150,0)-(250,30).
        // The window sits at (50,60).
        assert_eq!(
            f.service.bounds(f.window, f.popup),
            Some(Rect::new(200.0, 90.0, 80.0, 40.0))
        );
        assert_eq!(f.platform.handle().visible_surfaces().len(), 1);
    }

    #[test]
    fn closing_hides_surface_and_reopen_reuses_it() {
        let mut f = build();
        f.tree.set_value(f.popup, IS_OPEN, true).unwrap();
        pump(&mut f);
        f.tree.set_value(f.popup, IS_OPEN, false).unwrap();
        pump(&mut f);
        assert!(!f.service.is_open(f.window, f.popup));
        assert!(f.platform.handle().visible_surfaces().is_empty());

        f.tree.set_value(f.popup, IS_OPEN, true).unwrap();
        pump(&mut f);
        assert_eq!(f.platform.handle().surfaces().len(), 1);
        assert!(f.service.is_open(f.window, f.popup));
    }

    #[test]
    fn fade_close_finishes_on_tick() {
        let mut f = build();
        f.tree.set_value(f.popup, POPUP_ANIMATION, PopupAnimation::Fade).unwrap();
        f.tree.set_value(f.popup, IS_OPEN, true).unwrap();
        pump(&mut f);
        f.tree.set_value(f.popup, IS_OPEN, false).unwrap();
        pump(&mut f);
        assert_eq!(f.platform.handle().visible_surfaces().len(), 1);
        f.service.tick(0.2);
        assert!(f.platform.handle().visible_surfaces().is_empty());
    }

    #[test]
    fn detached_target_closes_popup() {
        let mut f = build();
        f.tree.set_value(f.popup, IS_OPEN, true).unwrap();
        pump(&mut f);
        let root = f.tree.root().unwrap();
        f.tree.remove_child(root, f.button);
        pump(&mut f);
        assert!(!f.service.is_open(f.window, f.popup));
        assert!(!f.tree.get(f.popup, IS_OPEN));
    }

    #[test]
    fn destroyed_popup_is_dropped() {
        let mut f = build();
        f.tree.set_value(f.popup, IS_OPEN, true).unwrap();
        pump(&mut f);
        f.tree.destroy(f.popup);
        pump(&mut f);
        assert!(f.service.root(f.window, f.popup).is_none());
        assert!(f.platform.handle().visible_surfaces().is_empty());
    }

    #[test]
    fn dismissal_respects_stays_open() {
        let mut f = build();
        f.tree.set_value(f.popup, IS_OPEN, true).unwrap();
        pump(&mut f);
        let outside = Point::new(1000.0, 1000.0);
        assert!(f.service.dismiss_candidates(outside).is_empty());

        f.tree.set_value(f.popup, STAYS_OPEN, false).unwrap();
        pump(&mut f);
        assert_eq!(f.service.dismiss_candidates(outside), vec![(f.window, f.popup)]);
        // Inside the surface nothing is dismissed.
        assert!(f.service.dismiss_candidates(Point::new(210.0, 100.0)).is_empty());
        assert_eq!(f.service.popup_at(Point::new(210.0, 100.0)), Some((f.window, f.popup)));
    }

    #[test]
    fn surface_failure_leaves_popup_closed() {
        let mut f = build();
        f.platform.handle().fail_surface_creation(true);
        f.tree.set_value(f.popup, IS_OPEN, true).unwrap();
        pump(&mut f);
        assert!(!f.service.is_open(f.window, f.popup));
        assert!(f.service.open_popups().is_empty());
    }
}
