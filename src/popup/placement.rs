//! Popup placement: anchor, offset, monitor selection, edge flipping and
//! work-area clamping. All rectangles are in screen coordinates.

use crate::geometry::{Point, Rect, Size};
use crate::property::impl_enum_value;

/// Where a popup goes relative to its placement target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlacementMode {
    /// At the offset, in screen coordinates. Ignores the target.
    Absolute,
    /// Target's top-left corner.
    Relative,
    /// Below the target, left edges aligned.
    #[default]
    Bottom,
    /// Above the target.
    Top,
    /// Left of the target, top edges aligned.
    Left,
    /// Right of the target.
    Right,
    /// Centered on the target.
    Center,
    /// At the pointer position.
    Mouse,
}

impl_enum_value!(
    PlacementMode,
    "PlacementMode",
    [Absolute, Relative, Bottom, Top, Left, Right, Center, Mouse]
);

impl PlacementMode {
    fn needs_target(self) -> bool {
        !matches!(self, PlacementMode::Absolute | PlacementMode::Mouse)
    }

    fn opposite(self) -> Option<PlacementMode> {
        match self {
            PlacementMode::Bottom => Some(PlacementMode::Top),
            PlacementMode::Top => Some(PlacementMode::Bottom),
            PlacementMode::Left => Some(PlacementMode::Right),
            PlacementMode::Right => Some(PlacementMode::Left),
            _ => None,
        }
    }
}

/// A display and the part of it available to windows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Monitor {
    pub bounds: Rect,
    pub work_area: Rect,
}

impl Monitor {
    /// A monitor whose work area is its whole bounds.
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            work_area: bounds,
        }
    }

    pub fn with_work_area(mut self, work_area: Rect) -> Self {
        self.work_area = work_area;
        self
    }
}

/// Inputs to [`place_popup`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementRequest {
    pub mode: PlacementMode,
    /// Target bounds in screen coordinates, if the target is available.
    pub target: Option<Rect>,
    /// `(HorizontalOffset, VerticalOffset)`.
    pub offset: Point,
    /// Popup size.
    pub size: Size,
    /// Pointer position for [`PlacementMode::Mouse`].
    pub pointer: Option<Point>,
}

impl PlacementRequest {
    pub fn new(mode: PlacementMode, target: Option<Rect>, size: Size) -> Self {
        Self {
            mode,
            target,
            offset: Point::ZERO,
            size,
            pointer: None,
        }
    }

    pub fn with_offset(mut self, offset: Point) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_pointer(mut self, pointer: Point) -> Self {
        self.pointer = Some(pointer);
        self
    }
}

/// Screen position of the popup's top-left corner.
///
/// Modes that need a target fall back to `Absolute` when it is missing.
/// The monitor is the one whose work area contains the target center (else
/// the nearest by center distance). `Bottom/Top/Left/Right` flip to the
/// opposite side when that overflows the work area less. Finally the rect is
/// moved inside the work area. With no monitors, the unclamped position is
/// returned.
pub fn place_popup(request: &PlacementRequest, monitors: &[Monitor]) -> Point {
    let mode = match (request.mode.needs_target(), request.target) {
        (true, None) => PlacementMode::Absolute,
        _ => request.mode,
    };
    let candidate = |mode: PlacementMode| {
        Rect::from_origin_size(anchor(mode, request) + request.offset, request.size)
    };
    let mut rect = candidate(mode);

    let reference = request
        .target
        .filter(|_| mode.needs_target())
        .map(Rect::center)
        .unwrap_or_else(|| rect.center());
    let Some(monitor) = pick_monitor(monitors, reference) else {
        return rect.origin();
    };
    let area = monitor.work_area;

    let overflow = rect.overflow_outside(area);
    if overflow > 0.0 {
        if let Some(opposite) = mode.opposite() {
            let flipped = candidate(opposite);
            if flipped.overflow_outside(area) < overflow {
                rect = flipped;
            }
        }
    }

    clamp_into(rect, area)
}

fn anchor(mode: PlacementMode, request: &PlacementRequest) -> Point {
    let size = request.size;
    let target = request.target.unwrap_or(Rect::EMPTY);
    match mode {
        PlacementMode::Absolute => Point::ZERO,
        PlacementMode::Relative => target.origin(),
        PlacementMode::Bottom => Point::new(target.x, target.bottom()),
        PlacementMode::Top => Point::new(target.x, target.y - size.height),
        PlacementMode::Left => Point::new(target.x - size.width, target.y),
        PlacementMode::Right => Point::new(target.right(), target.y),
        PlacementMode::Center => {
            let c = target.center();
            Point::new(c.x - size.width / 2.0, c.y - size.height / 2.0)
        }
        PlacementMode::Mouse => request.pointer.unwrap_or(Point::ZERO),
    }
}

fn pick_monitor(monitors: &[Monitor], point: Point) -> Option<&Monitor> {
    monitors
        .iter()
        .find(|m| m.work_area.contains(point))
        .or_else(|| {
            monitors.iter().min_by(|a, b| {
                let da = a.work_area.center().distance(point);
                let db = b.work_area.center().distance(point);
                da.total_cmp(&db)
            })
        })
}

fn clamp_into(rect: Rect, area: Rect) -> Point {
    let clamp = |pos: f32, len: f32, start: f32, end: f32| {
        if len >= end - start {
            start
        } else {
            pos.max(start).min(end - len)
        }
    };
    Point::new(
        clamp(rect.x, rect.width, area.x, area.right()),
        clamp(rect.y, rect.height, area.y, area.bottom()),
    )
}

// ===========================================================================
// Tests
// ===========================================================================
