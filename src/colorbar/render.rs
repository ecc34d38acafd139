//! Raster and vector drawing of a computed colorbar.

use super::{Colorbar, MeshProvider, TickLocation, EXTEND_FRACTION};
use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::framebuffer::Framebuffer;
use crate::geometry::{Line, Point, Rect};
use crate::mesh::Orientation;
use crate::output::{SvgEncoder, TextAnchor};
use crate::render::{draw_polygon, fill_triangle, Drawable};

const TICK_LENGTH: f32 = 4.0;
const FONT_SIZE: f32 = 10.0;
const LINE_COLOR: Rgba = Rgba::BLACK;

/// A horizontal span of equally colored visible tiles in one bin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Run {
    bin: usize,
    start: usize,
    end: usize,
    color: Rgba,
}

/// Maps long/short axis fractions to pixels inside the colorbar rectangle.
#[derive(Debug, Clone, Copy)]
struct PixelMap {
    inner: Rect,
    orientation: Orientation,
    inverted: bool,
}

impl PixelMap {
    fn new(rect: Rect, orientation: Orientation, inverted: bool, lower: bool, upper: bool) -> Self {
        let lower = if lower { EXTEND_FRACTION } else { 0.0 };
        let upper = if upper { EXTEND_FRACTION } else { 0.0 };
        let total = 1.0 + lower + upper;
        let inner = match orientation {
            Orientation::Vertical => {
                let h = rect.height / total;
                let top_margin = if inverted { lower } else { upper };
                Rect::new(rect.x, rect.y + top_margin * h, rect.width, h)
            }
            Orientation::Horizontal => {
                let w = rect.width / total;
                let left_margin = if inverted { upper } else { lower };
                Rect::new(rect.x + left_margin * w, rect.y, w, rect.height)
            }
        };
        Self { inner, orientation, inverted }
    }

    /// Pixel position of long fraction `l` and short fraction `s`.
    fn point(&self, l: f32, s: f32) -> Point {
        let l = if self.inverted { 1.0 - l } else { l };
        let r = self.inner;
        match self.orientation {
            Orientation::Vertical => Point::new(r.x + s * r.width, r.bottom() - l * r.height),
            Orientation::Horizontal => Point::new(r.x + l * r.width, r.bottom() - s * r.height),
        }
    }

    fn cell(&self, l0: f32, l1: f32, s0: f32, s1: f32) -> Rect {
        Rect::from_corners(self.point(l0, s0), self.point(l1, s1))
    }
}

impl<P: MeshProvider> Colorbar<P> {
    /// Merge visible tiles of equal color along the count axis.
    pub(crate) fn runs(&self) -> Vec<Run> {
        let Some(grid) = self.tile_grid() else {
            return Vec::new();
        };
        let colors = self.tile_colors();
        let width = grid.width();
        let mut runs = Vec::new();

        for bin in 0..grid.bins() {
            let row = &colors[bin * width..(bin + 1) * width];
            let mut current: Option<Run> = None;
            for (col, color) in row.iter().enumerate() {
                match (current.as_mut(), color) {
                    (Some(run), Some(c)) if run.color == *c && run.end == col => run.end = col + 1,
                    (_, Some(c)) => {
                        runs.extend(current.take());
                        current = Some(Run { bin, start: col, end: col + 1, color: *c });
                    }
                    (_, None) => runs.extend(current.take()),
                }
            }
            runs.extend(current);
        }
        runs
    }

    fn pixel_map(&self, rect: Rect) -> PixelMap {
        let (lower, upper) = self.extension_colors();
        PixelMap::new(rect, self.orientation(), self.long_inverted(), lower.is_some(), upper.is_some())
    }

    fn run_rect(&self, map: &PixelMap, run: &Run) -> Rect {
        let p = self.proportional();
        let width = self.tile_grid().map_or(1, |g| g.width()).max(1) as f32;
        map.cell(p[run.bin], p[run.bin + 1], run.start as f32 / width, run.end as f32 / width)
    }

    fn extension_triangles(&self, map: &PixelMap) -> Vec<([Point; 3], Rgba)> {
        let (lower, upper) = self.extension_colors();
        let mut triangles = Vec::new();
        if let Some(color) = lower {
            triangles.push(([map.point(0.0, 0.0), map.point(0.0, 1.0), map.point(-EXTEND_FRACTION, 0.5)], color));
        }
        if let Some(color) = upper {
            triangles.push(([map.point(1.0, 0.0), map.point(1.0, 1.0), map.point(1.0 + EXTEND_FRACTION, 0.5)], color));
        }
        triangles
    }

    fn outline(&self, map: &PixelMap) -> Vec<Point> {
        let (lower, upper) = self.extension_colors();
        let mut points = vec![map.point(0.0, 0.0)];
        if lower.is_some() {
            points.push(map.point(-EXTEND_FRACTION, 0.5));
        }
        points.push(map.point(0.0, 1.0));
        points.push(map.point(1.0, 1.0));
        if upper.is_some() {
            points.push(map.point(1.0 + EXTEND_FRACTION, 0.5));
        }
        points.push(map.point(1.0, 0.0));
        points
    }

    fn dividers(&self, map: &PixelMap) -> Vec<Line> {
        if !self.options().drawedges {
            return Vec::new();
        }
        let p = self.proportional();
        p.iter()
            .skip(1)
            .take(p.len().saturating_sub(2))
            .map(|&l| Line::new(map.point(l, 0.0), map.point(l, 1.0)))
            .collect()
    }

    /// Tick marks with the label anchor beyond each mark.
    fn tick_marks(&self, map: &PixelMap) -> Vec<(Line, Point, TextAnchor, &str)> {
        let side = self.options().resolved_tick_location();
        let (s, dx, dy, anchor) = match side {
            TickLocation::Left => (0.0, -TICK_LENGTH, 0.0, TextAnchor::End),
            TickLocation::Top => (1.0, 0.0, -TICK_LENGTH, TextAnchor::Middle),
            TickLocation::Bottom => (0.0, 0.0, TICK_LENGTH, TextAnchor::Middle),
            TickLocation::Right | TickLocation::Auto => (1.0, TICK_LENGTH, 0.0, TextAnchor::Start),
        };
        self.ticks()
            .iter()
            .map(|tick| {
                let start = map.point(tick.position, s);
                let end = Point::new(start.x + dx, start.y + dy);
                let text_y = match side {
                    TickLocation::Bottom => end.y + FONT_SIZE,
                    TickLocation::Top => end.y - 2.0,
                    _ => end.y + FONT_SIZE / 3.0,
                };
                let text = Point::new(end.x + dx / 2.0, text_y);
                (Line::new(start, end), text, anchor, tick.label.as_str())
            })
            .collect()
    }

    /// Rasterize the colorbar into `rect` (pixels) of `fb`.
    ///
    /// # Errors
    ///
    /// Returns an error if `rect` is empty.
    pub fn render(&self, fb: &mut Framebuffer, rect: Rect) -> Result<()> {
        if !(rect.width > 0.0 && rect.height > 0.0) {
            return Err(Error::Rendering(format!("empty colorbar rectangle {rect:?}")));
        }
        let map = self.pixel_map(rect);

        for run in self.runs() {
            self.run_rect(&map, &run).draw(fb, run.color);
        }

        for (points, color) in self.extension_triangles(&map) {
            fill_triangle(fb, points, color);
        }

        for divider in self.dividers(&map) {
            divider.draw(fb, LINE_COLOR);
        }

        draw_polygon(fb, &self.outline(&map), LINE_COLOR);

        for (mark, ..) in self.tick_marks(&map) {
            mark.draw(fb, LINE_COLOR);
        }
        Ok(())
    }

    /// Append the colorbar to an SVG document as vector elements.
    #[must_use]
    pub fn to_svg(&self, mut svg: SvgEncoder, rect: Rect) -> SvgEncoder {
        let map = self.pixel_map(rect);

        for run in self.runs() {
            svg = svg.rect(self.run_rect(&map, &run), run.color);
        }

        for (points, color) in self.extension_triangles(&map) {
            svg = svg.polygon(&points, color, None);
        }

        for divider in self.dividers(&map) {
            svg = svg.line(divider, LINE_COLOR, 1.0);
        }

        let mut outline = self.outline(&map);
        if let Some(&first) = outline.first() {
            outline.push(first);
        }
        svg = svg.polyline(&outline, LINE_COLOR, 1.0);

        for (mark, text, anchor, label) in self.tick_marks(&map) {
            svg = svg.line(mark, LINE_COLOR, 1.0).text(text, label, FONT_SIZE, LINE_COLOR, anchor);
        }

        let label = &self.options().label;
        if !label.is_empty() {
            let center = map.inner.center();
            let (at, rotation) = match self.options().resolved_tick_location() {
                TickLocation::Left => (Point::new(rect.x - 5.0 * FONT_SIZE, center.y), -90.0),
                TickLocation::Top => (Point::new(center.x, rect.y - 3.0 * FONT_SIZE), 0.0),
                TickLocation::Bottom => (Point::new(center.x, rect.bottom() + 3.0 * FONT_SIZE), 0.0),
                TickLocation::Right | TickLocation::Auto => {
                    (Point::new(rect.right() + 5.0 * FONT_SIZE, center.y), -90.0)
                }
            };
            svg = svg.text_rotated(at, label, FONT_SIZE, LINE_COLOR, TextAnchor::Middle, rotation);
        }
        svg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colorbar::{ColorbarOptions, FlatMesh};
    use crate::colormap::Colormap;
    use crate::figure::Axes;
    use crate::mappable::ScalarMappable;
    use crate::mesh::Extend;
    use crate::scale::Norm;

    fn flat(options: ColorbarOptions, segments: usize) -> Colorbar<FlatMesh> {
        let mut ax = Axes::new(Rect::new(0.0, 0.0, 0.1, 1.0));
        let mut m = ScalarMappable::new(vec![0.0, 1.0], Colormap::greyscale(), Norm::linear());
        Colorbar::new(FlatMesh::new(segments).unwrap(), &mut ax, &mut m, options, None).unwrap()
    }

    #[test]
    fn test_pixel_map_vertical() {
        let map = PixelMap::new(Rect::new(0.0, 0.0, 10.0, 100.0), Orientation::Vertical, false, false, false);
        assert_eq!(map.point(0.0, 0.0), Point::new(0.0, 100.0));
        assert_eq!(map.point(1.0, 1.0), Point::new(10.0, 0.0));

        let inverted = PixelMap::new(Rect::new(0.0, 0.0, 10.0, 100.0), Orientation::Vertical, true, false, false);
        assert_eq!(inverted.point(0.0, 0.0), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_pixel_map_extensions_shrink_interior() {
        let map = PixelMap::new(Rect::new(0.0, 0.0, 110.0, 10.0), Orientation::Horizontal, false, true, true);
        assert!((map.inner.width - 100.0).abs() < 1e-3);
        assert!((map.inner.x - 5.0).abs() < 1e-3);
        assert!((map.point(-EXTEND_FRACTION, 0.5).x).abs() < 1e-3);
    }

    #[test]
    fn test_runs_merge_columns() {
        let cb = flat(ColorbarOptions::new(), 4);
        let runs = cb.runs();
        assert_eq!(runs.len(), 4);
        assert!(runs.iter().all(|r| r.start == 0 && r.end == 1));
    }

    #[test]
    fn test_render_vertical_gradient() {
        let cb = flat(ColorbarOptions::new(), 2);
        let mut fb = Framebuffer::new(40, 120).unwrap();
        fb.clear(Rgba::rgb(255, 0, 255));
        cb.render(&mut fb, Rect::new(10.0, 10.0, 20.0, 100.0)).unwrap();

        // Lower half is the dark bin, upper half the light bin.
        let low = fb.get_pixel(20, 90).unwrap();
        let high = fb.get_pixel(20, 30).unwrap();
        assert!(low.r < high.r);
        assert_eq!(fb.get_pixel(2, 2), Some(Rgba::rgb(255, 0, 255)));
    }

    #[test]
    fn test_render_extensions_use_special_colors() {
        let cmap = Colormap::greyscale().with_under(Rgba::BLUE).with_over(Rgba::RED);
        let mut ax = Axes::new(Rect::new(0.0, 0.0, 0.1, 1.0));
        let mut m = ScalarMappable::new(vec![0.0, 1.0], cmap, Norm::linear());
        let cb = Colorbar::new(
            FlatMesh::new(4).unwrap(),
            &mut ax,
            &mut m,
            ColorbarOptions::new().extend(Extend::Both),
            None,
        )
        .unwrap();

        let mut fb = Framebuffer::new(40, 240).unwrap();
        fb.clear(Rgba::WHITE);
        cb.render(&mut fb, Rect::new(0.0, 10.0, 40.0, 220.0)).unwrap();
        // Interior spans y in [20, 220]; extensions are 10px deep.
        assert_eq!(fb.get_pixel(20, 224), Some(Rgba::BLUE));
        assert_eq!(fb.get_pixel(20, 16), Some(Rgba::RED));
    }

    #[test]
    fn test_render_rejects_empty_rect() {
        let cb = flat(ColorbarOptions::new(), 2);
        let mut fb = Framebuffer::new(10, 10).unwrap();
        assert!(cb.render(&mut fb, Rect::new(0.0, 0.0, 0.0, 5.0)).is_err());
    }

    #[test]
    fn test_svg_contains_ticks_and_label() {
        let cb = flat(ColorbarOptions::new().label("Temperature").drawedges(true), 4);
        let svg = cb.to_svg(SvgEncoder::new(100, 300), Rect::new(10.0, 10.0, 20.0, 280.0)).render();
        assert!(svg.contains("Temperature"));
        assert_eq!(svg.matches("<rect").count(), 1 + 4);
        assert!(svg.contains("<polyline"));
        assert!(svg.contains(">0.4<"));
    }

    #[test]
    fn test_horizontal_tick_marks_below() {
        let cb = flat(ColorbarOptions::new().orientation(Orientation::Horizontal), 2);
        let map = cb.pixel_map(Rect::new(0.0, 0.0, 100.0, 10.0));
        let marks = cb.tick_marks(&map);
        assert!(!marks.is_empty());
        assert!(marks.iter().all(|(line, ..)| line.end.y > line.start.y));
    }
}
