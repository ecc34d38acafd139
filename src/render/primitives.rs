//! Primitive rendering functions.
//!
//! Implements rasterization for the shapes a colorbar is made of: solid
//! spans, strokes, and the triangular extension caps.

use crate::color::Rgba;
use crate::framebuffer::Framebuffer;
use crate::geometry::{Line, Point, Rect};

/// Trait for drawable primitives.
pub trait Drawable {
    /// Draw this primitive to a framebuffer.
    fn draw(&self, fb: &mut Framebuffer, color: Rgba);
}

// ============================================================================
// Line Drawing
// ============================================================================

/// Draw a line using Bresenham's algorithm (non-antialiased).
///
/// # Arguments
///
/// * `fb` - Target framebuffer
/// * `x0`, `y0` - Start coordinates
/// * `x1`, `y1` - End coordinates
/// * `color` - Line color
pub fn draw_line(fb: &mut Framebuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgba) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        if x >= 0 && y >= 0 {
            fb.blend_pixel(x as u32, y as u32, color);
        }

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Stroke the closed outline through `points`.
pub fn draw_polygon(fb: &mut Framebuffer, points: &[Point], color: Rgba) {
    for (i, &start) in points.iter().enumerate() {
        let end = points[(i + 1) % points.len()];
        Line::new(start, end).draw(fb, color);
    }
}

impl Drawable for Line {
    fn draw(&self, fb: &mut Framebuffer, color: Rgba) {
        draw_line(
            fb,
            self.start.x.round() as i32,
            self.start.y.round() as i32,
            self.end.x.round() as i32,
            self.end.y.round() as i32,
            color,
        );
    }
}

// ============================================================================
// Area Filling
// ============================================================================

impl Drawable for Rect {
    /// Fills pixels whose centers fall inside the rectangle.
    fn draw(&self, fb: &mut Framebuffer, color: Rgba) {
        let x0 = self.x.round().max(0.0) as u32;
        let y0 = self.y.round().max(0.0) as u32;
        let x1 = self.right().round().max(0.0) as u32;
        let y1 = self.bottom().round().max(0.0) as u32;
        fb.blend_rect(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0), color);
    }
}

/// Fill a triangle, sampling at pixel centers.
pub fn fill_triangle(fb: &mut Framebuffer, points: [Point; 3], color: Rgba) {
    let [a, b, c] = points;
    let area = edge(a, b, c);
    if area.abs() < f32::EPSILON {
        return;
    }

    let min_x = a.x.min(b.x).min(c.x).floor().max(0.0) as u32;
    let min_y = a.y.min(b.y).min(c.y).floor().max(0.0) as u32;
    let max_x = (a.x.max(b.x).max(c.x).ceil().max(0.0) as u32).min(fb.width());
    let max_y = (a.y.max(b.y).max(c.y).ceil().max(0.0) as u32).min(fb.height());

    for y in min_y..max_y {
        for x in min_x..max_x {
            let p = Point::new(x as f32 + 0.5, y as f32 + 0.5);
            let w0 = edge(b, c, p) / area;
            let w1 = edge(c, a, p) / area;
            let w2 = edge(a, b, p) / area;
            if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                fb.blend_pixel(x, y, color);
            }
        }
    }
}

/// Twice the signed area of `(a, b, p)`.
#[inline]
fn edge(a: Point, b: Point, p: Point) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}
