//! Rasterization of geometric primitives.
//!
//! # Algorithms
//!
//! - **Bresenham's Line**: Fast non-antialiased strokes for outlines, dividers and ticks
//! - **Edge functions**: Pixel-center coverage for filled triangles
//!
//! # References
//!
//! - Bresenham, J. E. (1965). "Algorithm for computer control of a digital plotter."
//! - Pineda, J. (1988). "A Parallel Algorithm for Polygon Rasterization." SIGGRAPH '88.

mod primitives;

pub use primitives::{draw_line, draw_polygon, fill_triangle, Drawable};
