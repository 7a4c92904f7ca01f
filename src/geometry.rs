//! Core geometry types: Point, Size, Rect, Thickness, Matrix3x2, Color.
//!
//! These are the value types used throughout vellum for positioning, sizing,
//! transforming, and painting elements. All units are logical pixels.

use std::ops::{Add, Mul, Neg, Sub};

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// A 2D position or displacement in logical pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// The origin.
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    /// Create a new point.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Whether both coordinates are finite.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Point;
    #[inline]
    fn add(self, rhs: Point) -> Point {
        Point { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl Sub for Point {
    type Output = Point;
    #[inline]
    fn sub(self, rhs: Point) -> Point {
        Point { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl Neg for Point {
    type Output = Point;
    #[inline]
    fn neg(self) -> Point {
        Point { x: -self.x, y: -self.y }
    }
}

impl Mul<f32> for Point {
    type Output = Point;
    #[inline]
    fn mul(self, rhs: f32) -> Point {
        Point { x: self.x * rhs, y: self.y * rhs }
    }
}

// ---------------------------------------------------------------------------
// Size
// ---------------------------------------------------------------------------

/// A 2D extent in logical pixels (width x height).
///
/// Available sizes passed to measure may be infinite on either axis.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    /// A zero-sized size.
    pub const ZERO: Size = Size { width: 0.0, height: 0.0 };

    /// Unbounded on both axes.
    pub const INFINITE: Size = Size { width: f32::INFINITY, height: f32::INFINITY };

    /// Create a new size.
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Whether either dimension is zero or negative.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Clamp each dimension to be non-negative.
    #[inline]
    pub fn non_negative(self) -> Size {
        Size { width: self.width.max(0.0), height: self.height.max(0.0) }
    }

    /// Component-wise maximum.
    #[inline]
    pub fn max(self, other: Size) -> Size {
        Size { width: self.width.max(other.width), height: self.height.max(other.height) }
    }

    /// Component-wise minimum.
    #[inline]
    pub fn min(self, other: Size) -> Size {
        Size { width: self.width.min(other.width), height: self.height.min(other.height) }
    }

    /// Remove a [`Thickness`] from both axes, clamping at zero.
    #[inline]
    pub fn deflate(self, thickness: Thickness) -> Size {
        Size {
            width: (self.width - thickness.horizontal()).max(0.0),
            height: (self.height - thickness.vertical()).max(0.0),
        }
    }

    /// Add a [`Thickness`] to both axes.
    #[inline]
    pub fn inflate(self, thickness: Thickness) -> Size {
        Size {
            width: self.width + thickness.horizontal(),
            height: self.height + thickness.vertical(),
        }
    }

    /// Convert to a [`Rect`] positioned at the origin.
    #[inline]
    pub const fn to_rect(self) -> Rect {
        Rect { x: 0.0, y: 0.0, width: self.width, height: self.height }
    }
}

impl Add for Size {
    type Output = Size;
    #[inline]
    fn add(self, rhs: Size) -> Size {
        Size { width: self.width + rhs.width, height: self.height + rhs.height }
    }
}

impl Sub for Size {
    type Output = Size;
    #[inline]
    fn sub(self, rhs: Size) -> Size {
        Size { width: self.width - rhs.width, height: self.height - rhs.height }
    }
}

// ---------------------------------------------------------------------------
// Rect
// ---------------------------------------------------------------------------

/// An axis-aligned rectangle defined by its top-left corner and size.
///
/// An empty rect (zero width or height) is used by the clip property to mean
/// "no clip".
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// An empty rect at the origin.
    pub const EMPTY: Rect = Rect { x: 0.0, y: 0.0, width: 0.0, height: 0.0 };

    /// Create a new rect.
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Create a rect from an origin and a size.
    #[inline]
    pub const fn from_origin_size(origin: Point, size: Size) -> Self {
        Self { x: origin.x, y: origin.y, width: size.width, height: size.height }
    }

    /// The right edge (exclusive): `x + width`.
    #[inline]
    pub fn right(self) -> f32 {
        self.x + self.width
    }

    /// The bottom edge (exclusive): `y + height`.
    #[inline]
    pub fn bottom(self) -> f32 {
        self.y + self.height
    }

    /// The top-left corner.
    #[inline]
    pub const fn origin(self) -> Point {
        Point { x: self.x, y: self.y }
    }

    /// The dimensions.
    #[inline]
    pub const fn size(self) -> Size {
        Size { width: self.width, height: self.height }
    }

    /// The center point.
    #[inline]
    pub fn center(self) -> Point {
        Point { x: self.x + self.width / 2.0, y: self.y + self.height / 2.0 }
    }

    /// Whether the width or height is zero or negative.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Half-open containment: `[min, max)` on both axes.
    #[inline]
    pub fn contains(self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Whether `other` is entirely contained within this rect.
    #[inline]
    pub fn contains_rect(self, other: Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Intersection of two rects, or `None` when they do not overlap.
    #[inline]
    pub fn intersect(self, other: Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            None
        } else {
            Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
        }
    }

    /// The smallest rect containing both `self` and `other`.
    #[inline]
    pub fn union(self, other: Rect) -> Rect {
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        Rect::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// Translate the rect by `offset`.
    #[inline]
    pub fn translate(self, offset: Point) -> Rect {
        Rect { x: self.x + offset.x, y: self.y + offset.y, ..self }
    }

    /// Contract the rect inward by `thickness`, clamping dimensions at zero.
    #[inline]
    pub fn deflate(self, thickness: Thickness) -> Rect {
        Rect {
            x: self.x + thickness.left,
            y: self.y + thickness.top,
            width: (self.width - thickness.horizontal()).max(0.0),
            height: (self.height - thickness.vertical()).max(0.0),
        }
    }

    /// Total length by which this rect sticks out of `bounds` on all four sides.
    ///
    /// Zero when the rect lies entirely inside `bounds`.
    pub fn overflow_outside(self, bounds: Rect) -> f32 {
        let left = (bounds.x - self.x).max(0.0);
        let top = (bounds.y - self.y).max(0.0);
        let right = (self.right() - bounds.right()).max(0.0);
        let bottom = (self.bottom() - bounds.bottom()).max(0.0);
        left + top + right + bottom
    }
}

// ---------------------------------------------------------------------------
// Thickness
// ---------------------------------------------------------------------------

/// Widths of the four sides of a frame, used for margin, padding, and borders.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Thickness {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Thickness {
    /// Zero on all sides.
    pub const ZERO: Thickness = Thickness { left: 0.0, top: 0.0, right: 0.0, bottom: 0.0 };

    /// Explicit value for each side, in WPF order (left, top, right, bottom).
    #[inline]
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self { left, top, right, bottom }
    }

    /// All four sides set to the same value.
    #[inline]
    pub const fn uniform(value: f32) -> Self {
        Self { left: value, top: value, right: value, bottom: value }
    }

    /// `horizontal` for left/right, `vertical` for top/bottom.
    #[inline]
    pub const fn symmetric(horizontal: f32, vertical: f32) -> Self {
        Self { left: horizontal, top: vertical, right: horizontal, bottom: vertical }
    }

    /// `left + right`.
    #[inline]
    pub fn horizontal(self) -> f32 {
        self.left + self.right
    }

    /// `top + bottom`.
    #[inline]
    pub fn vertical(self) -> f32 {
        self.top + self.bottom
    }
}

impl Add for Thickness {
    type Output = Thickness;
    #[inline]
    fn add(self, rhs: Thickness) -> Thickness {
        Thickness {
            left: self.left + rhs.left,
            top: self.top + rhs.top,
            right: self.right + rhs.right,
            bottom: self.bottom + rhs.bottom,
        }
    }
}

// ---------------------------------------------------------------------------
// Matrix3x2
// ---------------------------------------------------------------------------

/// A 2D affine transform in row-vector form.
///
/// ```text
/// | m11 m12 0 |
/// | m21 m22 0 |
/// | dx  dy  1 |
/// ```
///
/// A point maps as `x' = x*m11 + y*m21 + dx`, `y' = x*m12 + y*m22 + dy`.
/// `a.then(b)` applies `a` first, then `b`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Matrix3x2 {
    pub m11: f32,
    pub m12: f32,
    pub m21: f32,
    pub m22: f32,
    pub dx: f32,
    pub dy: f32,
}

impl Default for Matrix3x2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix3x2 {
    /// The identity transform.
    pub const IDENTITY: Matrix3x2 =
        Matrix3x2 { m11: 1.0, m12: 0.0, m21: 0.0, m22: 1.0, dx: 0.0, dy: 0.0 };

    /// Create a matrix from its six components.
    #[inline]
    pub const fn new(m11: f32, m12: f32, m21: f32, m22: f32, dx: f32, dy: f32) -> Self {
        Self { m11, m12, m21, m22, dx, dy }
    }

    /// Pure translation.
    #[inline]
    pub const fn translation(dx: f32, dy: f32) -> Self {
        Self { m11: 1.0, m12: 0.0, m21: 0.0, m22: 1.0, dx, dy }
    }

    /// Scale about the origin.
    #[inline]
    pub const fn scale(sx: f32, sy: f32) -> Self {
        Self { m11: sx, m12: 0.0, m21: 0.0, m22: sy, dx: 0.0, dy: 0.0 }
    }

    /// Clockwise rotation (y-down) about the origin, in radians.
    #[inline]
    pub fn rotation(radians: f32) -> Self {
        let (s, c) = radians.sin_cos();
        Self { m11: c, m12: s, m21: -s, m22: c, dx: 0.0, dy: 0.0 }
    }

    /// Whether this is exactly the identity.
    #[inline]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Compose: apply `self`, then `next`.
    #[inline]
    pub fn then(&self, next: &Matrix3x2) -> Matrix3x2 {
        Matrix3x2 {
            m11: self.m11 * next.m11 + self.m12 * next.m21,
            m12: self.m11 * next.m12 + self.m12 * next.m22,
            m21: self.m21 * next.m11 + self.m22 * next.m21,
            m22: self.m21 * next.m12 + self.m22 * next.m22,
            dx: self.dx * next.m11 + self.dy * next.m21 + next.dx,
            dy: self.dx * next.m12 + self.dy * next.m22 + next.dy,
        }
    }

    /// Determinant of the linear part.
    #[inline]
    pub fn determinant(&self) -> f32 {
        self.m11 * self.m22 - self.m12 * self.m21
    }

    /// The inverse transform, or `None` when the matrix is singular.
    pub fn invert(&self) -> Option<Matrix3x2> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inv = 1.0 / det;
        Some(Matrix3x2 {
            m11: self.m22 * inv,
            m12: -self.m12 * inv,
            m21: -self.m21 * inv,
            m22: self.m11 * inv,
            dx: (self.m21 * self.dy - self.m22 * self.dx) * inv,
            dy: (self.m12 * self.dx - self.m11 * self.dy) * inv,
        })
    }

    /// Map a point through this transform.
    #[inline]
    pub fn transform_point(&self, p: Point) -> Point {
        Point {
            x: p.x * self.m11 + p.y * self.m21 + self.dx,
            y: p.x * self.m12 + p.y * self.m22 + self.dy,
        }
    }

    /// Axis-aligned bounds of a transformed rect.
    pub fn transform_rect(&self, r: Rect) -> Rect {
        let corners = [
            self.transform_point(Point::new(r.x, r.y)),
            self.transform_point(Point::new(r.right(), r.y)),
            self.transform_point(Point::new(r.x, r.bottom())),
            self.transform_point(Point::new(r.right(), r.bottom())),
        ];
        let mut min = corners[0];
        let mut max = corners[0];
        for c in &corners[1..] {
            min.x = min.x.min(c.x);
            min.y = min.y.min(c.y);
            max.x = max.x.max(c.x);
            max.y = max.y.max(c.y);
        }
        Rect::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }
}

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// A straight-alpha RGBA color with components in `[0, 1]`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 0.0 };
    /// Opaque black.
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };
    /// Opaque white.
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };

    /// Create a color from components.
    #[inline]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color.
    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create a color from 8-bit components.
    #[inline]
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: f32::from(r) / 255.0,
            g: f32::from(g) / 255.0,
            b: f32::from(b) / 255.0,
            a: f32::from(a) / 255.0,
        }
    }

    /// The same color with alpha multiplied by `opacity`.
    #[inline]
    pub fn with_opacity(self, opacity: f32) -> Self {
        Self { a: self.a * opacity, ..self }
    }

    /// Whether the color is fully transparent.
    #[inline]
    pub fn is_transparent(self) -> bool {
        self.a <= 0.0
    }

    /// Components as an `[r, g, b, a]` array.
    #[inline]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    // ── Rect ─────────────────────────────────────────────────────────

    #[test]
    fn rect_contains_is_half_open() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(Point::new(0.0, 0.0)));
        assert!(r.contains(Point::new(9.9, 9.9)));
        assert!(!r.contains(Point::new(10.0, 5.0)));
        assert!(!r.contains(Point::new(-0.1, 5.0)));
    }

    #[test]
    fn rect_intersect_overlapping() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert_eq!(a.intersect(b), Some(Rect::new(5.0, 5.0, 5.0, 5.0)));
    }

    #[test]
    fn rect_intersect_touching_is_none() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(a.intersect(b).is_none());
    }

    #[test]
    fn rect_union() {
        let a = Rect::new(0.0, 0.0, 5.0, 5.0);
        let b = Rect::new(10.0, 10.0, 5.0, 5.0);
        assert_eq!(a.union(b), Rect::new(0.0, 0.0, 15.0, 15.0));
    }

    #[test]
    fn rect_deflate_clamps() {
        let r = Rect::new(0.0, 0.0, 10.0, 4.0).deflate(Thickness::uniform(3.0));
        assert_eq!(r, Rect::new(3.0, 3.0, 4.0, 0.0));
    }

    #[test]
    fn rect_overflow_outside() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(Rect::new(10.0, 10.0, 20.0, 20.0).overflow_outside(bounds), 0.0);
        assert_eq!(Rect::new(90.0, -5.0, 20.0, 20.0).overflow_outside(bounds), 15.0);
    }

    // ── Size / Thickness ─────────────────────────────────────────────

    #[test]
    fn size_deflate_and_inflate() {
        let t = Thickness::new(1.0, 2.0, 3.0, 4.0);
        let s = Size::new(10.0, 10.0);
        assert_eq!(s.deflate(t), Size::new(6.0, 4.0));
        assert_eq!(s.deflate(t).inflate(t), s);
        assert_eq!(Size::new(1.0, 1.0).deflate(t), Size::ZERO);
    }

    #[test]
    fn thickness_totals() {
        let t = Thickness::symmetric(4.0, 2.0);
        assert_eq!(t.horizontal(), 8.0);
        assert_eq!(t.vertical(), 4.0);
    }

    // ── Matrix3x2 ────────────────────────────────────────────────────

    #[test]
    fn matrix_translation_maps_point() {
        let m = Matrix3x2::translation(5.0, -2.0);
        assert_eq!(m.transform_point(Point::new(1.0, 1.0)), Point::new(6.0, -1.0));
    }

    #[test]
    fn matrix_then_applies_in_order() {
        let scale = Matrix3x2::scale(2.0, 2.0);
        let shift = Matrix3x2::translation(10.0, 0.0);
        let p = Point::new(1.0, 1.0);
        assert_eq!(scale.then(&shift).transform_point(p), Point::new(12.0, 2.0));
        assert_eq!(shift.then(&scale).transform_point(p), Point::new(22.0, 2.0));
    }

    #[test]
    fn matrix_inverse_round_trips() {
        let m = Matrix3x2::rotation(0.7).then(&Matrix3x2::translation(3.0, 4.0));
        let inv = m.invert().unwrap();
        let p = Point::new(7.0, -3.0);
        let back = inv.transform_point(m.transform_point(p));
        assert!(approx(back.x, p.x) && approx(back.y, p.y));
    }

    #[test]
    fn matrix_singular_has_no_inverse() {
        assert!(Matrix3x2::scale(0.0, 1.0).invert().is_none());
    }

    #[test]
    fn matrix_transform_rect_bounds() {
        let m = Matrix3x2::scale(2.0, 3.0);
        assert_eq!(m.transform_rect(Rect::new(1.0, 1.0, 2.0, 2.0)), Rect::new(2.0, 3.0, 4.0, 6.0));
    }

    // ── Color ────────────────────────────────────────────────────────

    #[test]
    fn color_from_rgba8() {
        let c = Color::from_rgba8(255, 0, 255, 0);
        assert_eq!(c, Color::rgba(1.0, 0.0, 1.0, 0.0));
        assert!(c.is_transparent());
    }
}
