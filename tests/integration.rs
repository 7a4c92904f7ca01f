//! Integration tests for vellum.
//!
//! These tests exercise the public API from outside the crate, verifying that
//! the property system, layout, input routing, popups and the frame pipeline
//! work together correctly.

use std::sync::Arc;

use parking_lot::Mutex;
use pretty_assertions::assert_eq;

use vellum::app::SurfaceId;
use vellum::event::{PointerEvent, POINTER_DOWN, POINTER_ENTER, POINTER_LEAVE};
use vellum::focus::{FocusManager, FocusNavigation};
use vellum::geometry::{Color, Point, Rect, Size};
use vellum::layout::update_layout;
use vellum::popup::{place_popup, Monitor, PlacementMode, PlacementRequest};
use vellum::property::core::{
    object, CLIP, DATA_CONTEXT, FOCUSABLE, HEIGHT, IS_OPEN, OPACITY, PLACEMENT_TARGET, STAYS_OPEN,
    VISIBILITY, WIDTH,
};
use vellum::property::{PropertyRegistry, Visibility};
use vellum::render::{RenderCommand, RenderTreeBuilder};
use vellum::testing::{render_list_to_string, Pilot};
use vellum::tree::{ElementId, ElementTree};
use vellum::widgets::*;

type Log = Arc<Mutex<Vec<String>>>;

fn new_tree() -> ElementTree {
    ElementTree::new(Arc::new(PropertyRegistry::new()))
}

fn sized(tree: &mut ElementTree, widget: impl vellum::widget::Widget, w: f32, h: f32) -> ElementId {
    let id = tree.create(widget);
    tree.set_value(id, WIDTH, w).unwrap();
    tree.set_value(id, HEIGHT, h).unwrap();
    id
}

fn record(tree: &mut ElementTree, id: ElementId, event: vellum::event::RoutedEvent, name: &str, log: &Log) {
    let log = log.clone();
    let name = name.to_string();
    tree.add_handler(id, event, move |_, _| log.lock().push(name.clone()))
        .unwrap();
}

// ---------------------------------------------------------------------------
// Bubble routing
// ---------------------------------------------------------------------------

/// Root -> A -> B, each filling its parent.
fn chain(pilot: &mut Pilot) -> (ElementId, ElementId) {
    let tree = pilot.tree_mut();
    let a = tree.create(Panel::new());
    let b = tree.create(Rectangle::new().with_fill(Color::BLACK));
    tree.append_child(a, b);
    pilot.set_content(a);
    pilot.frame();
    (a, b)
}

#[test]
fn pointer_down_bubbles_from_target_to_root() {
    let mut pilot = Pilot::new(200, 100);
    let (a, b) = chain(&mut pilot);
    let root = pilot.root();
    let log: Log = Arc::default();
    let tree = pilot.tree_mut();
    record(tree, b, POINTER_DOWN, "B", &log);
    record(tree, a, POINTER_DOWN, "A", &log);
    record(tree, root, POINTER_DOWN, "Root", &log);

    pilot.pointer_down(Point::new(50.0, 50.0));
    assert_eq!(*log.lock(), vec!["B", "A", "Root"]);
}

#[test]
fn handled_stops_bubbling() {
    let mut pilot = Pilot::new(200, 100);
    let (a, b) = chain(&mut pilot);
    let root = pilot.root();
    let log: Log = Arc::default();
    let tree = pilot.tree_mut();
    record(tree, b, POINTER_DOWN, "B", &log);
    let l = log.clone();
    tree.add_handler(a, POINTER_DOWN, move |_, args| {
        l.lock().push("A".into());
        args.handled = true;
    })
    .unwrap();
    record(tree, root, POINTER_DOWN, "Root", &log);

    assert!(pilot.pointer_down(Point::new(50.0, 50.0)));
    assert_eq!(*log.lock(), vec!["B", "A"]);
}

// ---------------------------------------------------------------------------
// Enter/Leave delta
// ---------------------------------------------------------------------------

#[test]
fn enter_leave_fire_only_outside_common_ancestor() {
    // Root -> A (horizontal) -> {B -> C, D -> E}.
    let mut pilot = Pilot::new(200, 100);
    let tree = pilot.tree_mut();
    let a = tree.create(StackPanel::horizontal());
    let b = sized(tree, Panel::new(), 100.0, 100.0);
    let c = tree.create(Rectangle::new());
    let d = sized(tree, Panel::new(), 100.0, 100.0);
    let e = tree.create(Rectangle::new());
    tree.append_child(a, b);
    tree.append_child(b, c);
    tree.append_child(a, d);
    tree.append_child(d, e);
    pilot.set_content(a);
    pilot.frame();

    let root = pilot.root();
    let log: Log = Arc::default();
    let tree = pilot.tree_mut();
    for (id, name) in [(root, "Root"), (a, "A"), (b, "B"), (c, "C"), (d, "D"), (e, "E")] {
        record(tree, id, POINTER_ENTER, &format!("enter {name}"), &log);
        record(tree, id, POINTER_LEAVE, &format!("leave {name}"), &log);
    }

    pilot.move_to(Point::new(50.0, 50.0));
    log.lock().clear();
    pilot.move_to(Point::new(150.0, 50.0));
    assert_eq!(*log.lock(), vec!["leave C", "leave B", "enter D", "enter E"]);
}

// ---------------------------------------------------------------------------
// Directional focus
// ---------------------------------------------------------------------------

#[test]
fn directional_focus_on_grid() {
    let mut tree = new_tree();
    let canvas = tree.create(Canvas::new());
    tree.set_root(canvas);
    let props = Canvas::properties(tree.registry()).unwrap();
    let mut grid = [[None; 3]; 3];
    for (r, row) in grid.iter_mut().enumerate() {
        for (c, cell) in row.iter_mut().enumerate() {
            let button = sized(&mut tree, Border::new(), 80.0, 40.0);
            tree.set_value(button, FOCUSABLE, true).unwrap();
            tree.set_value(button, props.left, c as f32 * 100.0).unwrap();
            tree.set_value(button, props.top, r as f32 * 100.0).unwrap();
            tree.append_child(canvas, button);
            *cell = Some(button);
        }
    }
    let at = |r: usize, c: usize| grid[r][c].unwrap();
    update_layout(&mut tree, canvas, Size::new(400.0, 400.0));

    let mut focus = FocusManager::new();
    assert!(focus.set_focus(&mut tree, at(1, 1)));
    assert!(focus.move_focus(&mut tree, canvas, FocusNavigation::Right));
    assert_eq!(focus.focused(), Some(at(1, 2)));

    assert!(focus.set_focus(&mut tree, at(1, 1)));
    assert!(focus.move_focus(&mut tree, canvas, FocusNavigation::Down));
    assert_eq!(focus.focused(), Some(at(2, 1)));

    assert!(focus.set_focus(&mut tree, at(0, 2)));
    assert!(!focus.move_focus(&mut tree, canvas, FocusNavigation::Right));
    assert_eq!(focus.focused(), Some(at(0, 2)));
}

// ---------------------------------------------------------------------------
// Popup edge flip
// ---------------------------------------------------------------------------

#[test]
fn popup_flips_above_target_near_bottom_edge() {
    let monitors = [Monitor::new(Rect::new(0.0, 0.0, 1920.0, 1080.0))
        .with_work_area(Rect::new(0.0, 0.0, 1920.0, 1000.0))];
    let request = PlacementRequest::new(
        PlacementMode::Bottom,
        Some(Rect::new(100.0, 900.0, 200.0, 50.0)),
        Size::new(300.0, 200.0),
    );
    assert_eq!(place_popup(&request, &monitors), Point::new(100.0, 700.0));
}

#[test]
fn popup_opens_renders_and_dismisses_end_to_end() {
    let mut pilot = Pilot::new(400, 300);
    let tree = pilot.tree_mut();
    let stack = tree.create(StackPanel::vertical());
    let anchor = sized(tree, Rectangle::new().with_fill(Color::BLACK), 100.0, 30.0);
    tree.append_child(stack, anchor);
    let popup = tree.create(Popup::new());
    tree.append_child(stack, popup);
    let content = sized(tree, Rectangle::new().with_fill(Color::WHITE), 60.0, 20.0);
    Popup::set_child(tree, popup, content);
    tree.set_value(popup, PLACEMENT_TARGET, Some(anchor)).unwrap();
    tree.set_value(popup, STAYS_OPEN, false).unwrap();
    pilot.set_content(stack);
    pilot.frame();
    let window_frames = pilot.renderer().frame_count();

    pilot.tree_mut().set_value(popup, IS_OPEN, true).unwrap();
    pilot.frame();
    assert_eq!(pilot.popup_bounds(popup), Some(Rect::new(150.0, 30.0, 60.0, 20.0)));
    // The popup draws on its own surface; the window list never holds it.
    assert_eq!(pilot.renderer().frame_count(), window_frames);
    let surface = &pilot.platform().visible_surfaces()[0];
    let popup_list = surface.renderer.last_list().unwrap();
    assert!(popup_list.is_balanced());
    assert_eq!(popup_list.draw_count(), 1);

    // A click inside the popup keeps it; a click outside dismisses it.
    pilot.click_popup(popup, Point::new(5.0, 5.0));
    pilot.frame();
    assert!(pilot.popup_bounds(popup).is_some());
    pilot.click(Point::new(390.0, 290.0));
    pilot.frame();
    assert!(pilot.popup_bounds(popup).is_none());
    assert!(!pilot.tree().get(popup, IS_OPEN));
    assert!(pilot.platform().visible_surfaces().is_empty());
}

#[test]
fn popup_content_input_bubbles_to_popup() {
    let mut pilot = Pilot::new(400, 300);
    let tree = pilot.tree_mut();
    let popup = tree.create(Popup::new());
    let content = sized(tree, Rectangle::new(), 60.0, 20.0);
    Popup::set_child(tree, popup, content);
    tree.set_value(popup, IS_OPEN, true).unwrap();
    pilot.set_content(popup);
    pilot.frame();

    let log: Log = Arc::default();
    let tree = pilot.tree_mut();
    record(tree, content, POINTER_DOWN, "content", &log);
    record(tree, popup, POINTER_DOWN, "popup", &log);
    let window = pilot.window_id();
    pilot.app_mut().dispatch(
        SurfaceId::Popup(window, popup),
        &PointerEvent::down(Point::new(10.0, 10.0)).into(),
    );
    assert_eq!(*log.lock(), vec!["content", "popup"]);
}

// ---------------------------------------------------------------------------
// Clip balanced commands
// ---------------------------------------------------------------------------

#[test]
fn clip_wraps_self_and_children() {
    let mut tree = new_tree();
    let parent = sized(&mut tree, Panel::new().with_background(Color::WHITE), 100.0, 100.0);
    tree.set_root(parent);
    tree.set_value(parent, CLIP, Rect::new(0.0, 0.0, 100.0, 100.0)).unwrap();
    for _ in 0..2 {
        let child = sized(&mut tree, Rectangle::new().with_fill(Color::BLACK), 20.0, 20.0);
        tree.append_child(parent, child);
    }
    update_layout(&mut tree, parent, Size::new(100.0, 100.0));

    let list = RenderTreeBuilder::new().build(&tree, parent);
    assert_eq!(
        list.tags(),
        vec![
            "PushTransform",
            "PushClip",
            "Rectangle",
            "PushTransform",
            "Rectangle",
            "PopTransform",
            "PushTransform",
            "Rectangle",
            "PopTransform",
            "PopClip",
            "PopTransform",
        ]
    );
    assert_eq!(
        list.commands()[1],
        RenderCommand::PushClip {
            rect: Rect::new(0.0, 0.0, 100.0, 100.0)
        }
    );
}

#[test]
fn opacity_zero_keeps_layer_pair_only() {
    let mut tree = new_tree();
    let root = sized(&mut tree, Panel::new().with_background(Color::WHITE), 50.0, 50.0);
    tree.set_root(root);
    tree.set_value(root, OPACITY, 0.0).unwrap();
    update_layout(&mut tree, root, Size::new(50.0, 50.0));

    let list = RenderTreeBuilder::new().build(&tree, root);
    assert_eq!(
        render_list_to_string(&list),
        "PushTransform translate(0, 0)\n  PushLayer 0\n  PopLayer\nPopTransform"
    );
}

#[test]
fn collapsed_element_takes_no_space_and_draws_nothing() {
    let mut pilot = Pilot::new(200, 200);
    let tree = pilot.tree_mut();
    let stack = tree.create(StackPanel::vertical());
    let hidden = sized(tree, Rectangle::new().with_fill(Color::BLACK), 50.0, 50.0);
    let shown = sized(tree, Rectangle::new().with_fill(Color::WHITE), 50.0, 50.0);
    tree.append_child(stack, hidden);
    tree.append_child(stack, shown);
    tree.set_value(hidden, VISIBILITY, Visibility::Collapsed).unwrap();
    pilot.set_content(stack);
    pilot.frame();

    assert_eq!(pilot.tree().desired_size(hidden), Some(Size::ZERO));
    assert_eq!(pilot.tree().layout_rect(shown).map(|r| r.y), Some(0.0));
    assert_eq!(pilot.last_list().unwrap().draw_count(), 1);
}

// ---------------------------------------------------------------------------
// Property inheritance
// ---------------------------------------------------------------------------

#[test]
fn data_context_flows_down_and_notifies() {
    let mut tree = new_tree();
    let a = tree.create(Panel::new());
    let b = tree.create(Panel::new());
    let c = tree.create(Rectangle::new());
    tree.set_root(a);
    tree.append_child(a, b);
    tree.append_child(b, c);

    tree.set_value(a, DATA_CONTEXT, Some(object("X"))).unwrap();
    let read = |tree: &ElementTree| {
        tree.get(c, DATA_CONTEXT)
            .and_then(|o| o.downcast_ref::<&str>().copied())
    };
    assert_eq!(read(&tree), Some("X"));

    let seen: Arc<Mutex<Vec<(Option<&'static str>, Option<&'static str>)>>> = Arc::default();
    let s = seen.clone();
    tree.subscribe(c, move |_, args| {
        if args.property.name == "DataContext" {
            s.lock().push((
                args.old.downcast_ref::<&'static str>().copied(),
                args.new.downcast_ref::<&'static str>().copied(),
            ));
        }
    })
    .unwrap();

    tree.set_value(a, DATA_CONTEXT, Some(object("Y"))).unwrap();
    assert_eq!(*seen.lock(), vec![(Some("X"), Some("Y"))]);
    assert_eq!(read(&tree), Some("Y"));
}
