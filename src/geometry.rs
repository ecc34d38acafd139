//! Geometric primitives for layout and rendering.
//!
//! [`Rect`] is used in two spaces: figure fractions (origin bottom-left, y up)
//! for axes placement, and pixels (origin top-left, y down) for drawing. In
//! both, `(x, y)` is the corner with the smallest coordinates.

/// A 2D point with floating-point coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Linear interpolation between two points.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
    }
}

/// A line segment between two points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Line {
    /// Start point.
    pub start: Point,
    /// End point.
    pub end: Point,
}

impl Line {
    /// Create a new line segment.
    #[must_use]
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Create a line from coordinates.
    #[must_use]
    pub const fn from_coords(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self::new(Point::new(x0, y0), Point::new(x1, y1))
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Smallest x coordinate.
    pub x: f32,
    /// Smallest y coordinate.
    pub y: f32,
    /// Width of the rectangle.
    pub width: f32,
    /// Height of the rectangle.
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Create a rectangle from two corner points.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self::new(a.x.min(b.x), a.y.min(b.y), (b.x - a.x).abs(), (b.y - a.y).abs())
    }

    /// Largest x coordinate.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Largest y coordinate.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Check if a point is inside the rectangle.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Get the center point of the rectangle.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Get the area of the rectangle.
    #[must_use]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Split along x at fractions `f0 <= f1` of the width into three parts.
    #[must_use]
    pub fn split_x(&self, f0: f32, f1: f32) -> (Self, Self, Self) {
        let x0 = self.x + self.width * f0;
        let x1 = self.x + self.width * f1;
        (
            Self::new(self.x, self.y, x0 - self.x, self.height),
            Self::new(x0, self.y, x1 - x0, self.height),
            Self::new(x1, self.y, self.right() - x1, self.height),
        )
    }

    /// Split along y at fractions `f0 <= f1` of the height into three parts.
    #[must_use]
    pub fn split_y(&self, f0: f32, f1: f32) -> (Self, Self, Self) {
        let y0 = self.y + self.height * f0;
        let y1 = self.y + self.height * f1;
        (
            Self::new(self.x, self.y, self.width, y0 - self.y),
            Self::new(self.x, y0, self.width, y1 - y0),
            Self::new(self.x, y1, self.width, self.bottom() - y1),
        )
    }

    /// Scale the size by `(mx, my)` keeping the origin.
    #[must_use]
    pub fn shrunk(&self, mx: f32, my: f32) -> Self {
        Self::new(self.x, self.y, self.width * mx, self.height * my)
    }

    /// Place this rectangle's size inside `container` at the fractional
    /// `anchor` (`(0, 0)` is the minimum corner, `(1, 1)` the maximum).
    #[must_use]
    pub fn anchored(&self, anchor: (f32, f32), container: &Self) -> Self {
        Self::new(
            container.x + (container.width - self.width) * anchor.0,
            container.y + (container.height - self.height) * anchor.1,
            self.width,
            self.height,
        )
    }

    /// Shrink to the box aspect `height / width = aspect` within this
    /// rectangle, positioned by `anchor`.
    #[must_use]
    pub fn fit_aspect(&self, aspect: f32, anchor: (f32, f32)) -> Self {
        if self.width <= 0.0 || self.height <= 0.0 || aspect <= 0.0 {
            return *self;
        }
        let (width, height) = if self.height / self.width > aspect {
            (self.width, self.width * aspect)
        } else {
            (self.height / aspect, self.height)
        };
        Self::new(0.0, 0.0, width, height).anchored(anchor, self)
    }

    /// Smallest rectangle containing both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Self::new(x, y, self.right().max(other.right()) - x, self.bottom().max(other.bottom()) - y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_lerp() {
        let mid = Point::new(0.0, 0.0).lerp(Point::new(10.0, 10.0), 0.5);
        assert!((mid.x - 5.0).abs() < 0.001);
        assert!((mid.y - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_rect_contains() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains(Point::new(5.0, 5.0)));
        assert!(!rect.contains(Point::new(15.0, 5.0)));
        assert!((rect.area() - 100.0).abs() < 0.001);
    }

    #[test]
    fn test_from_corners_normalizes() {
        let rect = Rect::from_corners(Point::new(4.0, 6.0), Point::new(1.0, 2.0));
        assert_eq!(rect, Rect::new(1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn test_split_x() {
        let rect = Rect::new(0.0, 0.0, 1.0, 1.0);
        let (left, gap, right) = rect.split_x(0.8, 0.85);
        assert!((left.width - 0.8).abs() < 1e-6);
        assert!((gap.width - 0.05).abs() < 1e-6);
        assert!((right.x - 0.85).abs() < 1e-6);
        assert!((right.width - 0.15).abs() < 1e-6);
    }

    #[test]
    fn test_split_y() {
        let rect = Rect::new(0.0, 0.2, 1.0, 0.5);
        let (bottom, _, top) = rect.split_y(0.5, 0.6);
        assert!((bottom.height - 0.25).abs() < 1e-6);
        assert!((top.y - 0.5).abs() < 1e-6);
        assert!((top.bottom() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_shrunk_anchored() {
        let container = Rect::new(0.0, 0.0, 1.0, 1.0);
        let centered = container.shrunk(1.0, 0.5).anchored((0.5, 0.5), &container);
        assert!((centered.y - 0.25).abs() < 1e-6);
        assert!((centered.height - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_fit_aspect() {
        let tall = Rect::new(0.0, 0.0, 100.0, 100.0).fit_aspect(20.0, (0.0, 0.5));
        assert!((tall.width - 5.0).abs() < 1e-4);
        assert!((tall.height - 100.0).abs() < 1e-4);
        assert!(tall.x.abs() < 1e-4);

        let wide = Rect::new(0.0, 0.0, 100.0, 100.0).fit_aspect(0.05, (0.5, 1.0));
        assert!((wide.height - 5.0).abs() < 1e-4);
        assert!((wide.y - 95.0).abs() < 1e-4);
    }

    #[test]
    fn test_union() {
        let a = Rect::new(0.0, 0.0, 1.0, 1.0);
        let b = Rect::new(2.0, -1.0, 1.0, 1.0);
        assert_eq!(a.union(&b), Rect::new(0.0, -1.0, 3.0, 2.0));
    }
}
