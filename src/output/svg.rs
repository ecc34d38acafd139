//! SVG output encoder.
//!
//! Colorbars can be emitted as vector elements or as an embedded PNG of a
//! rendered framebuffer. Colors are written as `#rrggbb` plus a separate
//! opacity attribute so translucent tiles survive SVG 1.1 viewers.

use crate::color::Rgba;
use crate::error::Result;
use crate::framebuffer::Framebuffer;
use crate::geometry::{Line, Point, Rect};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::fmt::{self, Write as FmtWrite};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// SVG document builder.
#[derive(Debug, Clone)]
pub struct SvgEncoder {
    width: u32,
    height: u32,
    /// Background color (None for transparent)
    background: Option<Rgba>,
    elements: Vec<SvgElement>,
}

/// A single SVG element.
#[derive(Debug, Clone, PartialEq)]
pub enum SvgElement {
    /// Filled rectangle.
    Rect {
        /// Pixel rectangle.
        rect: Rect,
        /// Fill color.
        fill: Rgba,
    },
    /// Stroked segment.
    Line {
        /// Endpoints.
        line: Line,
        /// Stroke color.
        stroke: Rgba,
        /// Stroke width.
        width: f32,
    },
    /// Open (`polyline`) or closed (`polygon`) vertex list.
    Path {
        /// Vertices.
        points: Vec<Point>,
        /// Emit as `<polygon>`.
        closed: bool,
        /// Fill color; `None` leaves the interior empty.
        fill: Option<Rgba>,
        /// Stroke color and width.
        stroke: Option<(Rgba, f32)>,
    },
    /// Text label.
    Text {
        /// Anchor point.
        at: Point,
        /// Unescaped content.
        text: String,
        /// Font size in pixels.
        font_size: f32,
        /// Text color.
        fill: Rgba,
        /// Horizontal alignment.
        anchor: TextAnchor,
        /// Rotation in degrees about `at`, clockwise.
        rotation: f32,
    },
    /// Raster image as a data URI.
    Image {
        /// Image width.
        width: f32,
        /// Image height.
        height: f32,
        /// `data:` URI.
        data: String,
    },
}

/// Text anchor position for SVG text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAnchor {
    /// Text starts at the anchor point.
    #[default]
    Start,
    /// Text is centered on the anchor point.
    Middle,
    /// Text ends at the anchor point.
    End,
}

impl TextAnchor {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

impl Default for SvgEncoder {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

impl SvgEncoder {
    /// Create a new SVG encoder with given dimensions and a white background.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, background: Some(Rgba::WHITE), elements: Vec::new() }
    }

    /// Create from a framebuffer (embeds as raster image).
    ///
    /// # Errors
    ///
    /// Returns an error if PNG encoding fails.
    pub fn from_framebuffer(fb: &Framebuffer) -> Result<Self> {
        let png_bytes = super::PngEncoder::to_bytes(fb)?;
        let data = format!("data:image/png;base64,{}", STANDARD.encode(&png_bytes));

        let mut encoder = Self::new(fb.width(), fb.height()).background(None);
        encoder.elements.push(SvgElement::Image {
            width: fb.width() as f32,
            height: fb.height() as f32,
            data,
        });
        Ok(encoder)
    }

    /// Set background color (None for transparent).
    #[must_use]
    pub fn background(mut self, color: Option<Rgba>) -> Self {
        self.background = color;
        self
    }

    /// Elements added so far.
    #[must_use]
    pub fn elements(&self) -> &[SvgElement] {
        &self.elements
    }

    /// Add a filled rectangle.
    #[must_use]
    pub fn rect(self, rect: Rect, fill: Rgba) -> Self {
        self.push(SvgElement::Rect { rect, fill })
    }

    /// Add a line.
    #[must_use]
    pub fn line(self, line: Line, stroke: Rgba, width: f32) -> Self {
        self.push(SvgElement::Line { line, stroke, width })
    }

    /// Add an open polyline.
    #[must_use]
    pub fn polyline(self, points: &[Point], stroke: Rgba, width: f32) -> Self {
        self.push(SvgElement::Path { points: points.to_vec(), closed: false, fill: None, stroke: Some((stroke, width)) })
    }

    /// Add a filled polygon, optionally stroked.
    #[must_use]
    pub fn polygon(self, points: &[Point], fill: Rgba, stroke: Option<(Rgba, f32)>) -> Self {
        self.push(SvgElement::Path { points: points.to_vec(), closed: true, fill: Some(fill), stroke })
    }

    /// Add horizontal text.
    #[must_use]
    pub fn text(self, at: Point, text: &str, font_size: f32, fill: Rgba, anchor: TextAnchor) -> Self {
        self.text_rotated(at, text, font_size, fill, anchor, 0.0)
    }

    /// Add text rotated about its anchor point.
    #[must_use]
    pub fn text_rotated(
        self,
        at: Point,
        text: &str,
        font_size: f32,
        fill: Rgba,
        anchor: TextAnchor,
        rotation: f32,
    ) -> Self {
        self.push(SvgElement::Text { at, text: text.to_string(), font_size, fill, anchor, rotation })
    }

    fn push(mut self, element: SvgElement) -> Self {
        self.elements.push(element);
        self
    }

    /// Render to SVG string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut svg = String::with_capacity(256 + 96 * self.elements.len());

        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );
        if let Some(bg) = self.background {
            let _ = writeln!(svg, r#"  <rect width="100%" height="100%"{}/>"#, Paint("fill", bg));
        }
        for element in &self.elements {
            let _ = writeln!(svg, "  {element}");
        }
        svg.push_str("</svg>\n");
        svg
    }

    /// Write to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if file writing fails.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(self.render().as_bytes())?;
        Ok(())
    }
}

/// `name="#rrggbb"` plus `name-opacity` when translucent.
struct Paint(&'static str, Rgba);

impl fmt::Display for Paint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self(name, color) = *self;
        write!(f, r#" {name}="{}""#, color.to_hex())?;
        if color.a < 255 {
            write!(f, r#" {name}-opacity="{:.3}""#, f32::from(color.a) / 255.0)?;
        }
        Ok(())
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

impl fmt::Display for SvgElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rect { rect, fill } => write!(
                f,
                r#"<rect x="{}" y="{}" width="{}" height="{}"{}/>"#,
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                Paint("fill", *fill)
            ),
            Self::Line { line, stroke, width } => write!(
                f,
                r#"<line x1="{}" y1="{}" x2="{}" y2="{}"{} stroke-width="{width}"/>"#,
                line.start.x,
                line.start.y,
                line.end.x,
                line.end.y,
                Paint("stroke", *stroke)
            ),
            Self::Path { points, closed, fill, stroke } => {
                let tag = if *closed { "polygon" } else { "polyline" };
                f.write_str("<")?;
                f.write_str(tag)?;
                f.write_str(r#" points=""#)?;
                for (i, p) in points.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{},{}", p.x, p.y)?;
                }
                f.write_str("\"")?;
                match fill {
                    Some(fill) => write!(f, "{}", Paint("fill", *fill))?,
                    None => f.write_str(r#" fill="none""#)?,
                }
                if let Some((stroke, width)) = stroke {
                    write!(f, r#"{} stroke-width="{width}""#, Paint("stroke", *stroke))?;
                }
                f.write_str("/>")
            }
            Self::Text { at, text, font_size, fill, anchor, rotation } => {
                write!(
                    f,
                    r#"<text x="{}" y="{}" font-size="{font_size}"{} text-anchor="{}" font-family="sans-serif""#,
                    at.x,
                    at.y,
                    Paint("fill", *fill),
                    anchor.as_str()
                )?;
                if *rotation != 0.0 {
                    write!(f, r#" transform="rotate({rotation} {} {})""#, at.x, at.y)?;
                }
                write!(f, ">{}</text>", escape(text))
            }
            Self::Image { width, height, data } => {
                write!(f, r#"<image x="0" y="0" width="{width}" height="{height}" xlink:href="{data}"/>"#)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> [Point; 3] {
        [Point::new(0.0, 0.0), Point::new(50.0, 100.0), Point::new(100.0, 0.0)]
    }

    #[test]
    fn test_svg_encoder_new() {
        let svg = SvgEncoder::new(120, 400).render();

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"width="120""#));
        assert!(svg.contains(r#"viewBox="0 0 120 400""#));
        assert!(svg.contains(r##"fill="#ffffff""##));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_svg_rect() {
        let svg = SvgEncoder::new(100, 100).rect(Rect::new(10.0, 20.0, 30.0, 40.0), Rgba::RED).render();

        assert!(svg.contains(r##"<rect x="10" y="20" width="30" height="40" fill="#ff0000"/>"##));
    }

    #[test]
    fn test_svg_translucent_fill() {
        let svg = SvgEncoder::new(10, 10)
            .background(None)
            .rect(Rect::new(0.0, 0.0, 5.0, 5.0), Rgba::new(0, 0, 255, 128))
            .render();

        assert!(svg.contains(r##"fill="#0000ff" fill-opacity="0.502""##));
        assert_eq!(svg.matches("<rect").count(), 1);
    }

    #[test]
    fn test_svg_line() {
        let svg = SvgEncoder::new(100, 100)
            .line(Line::from_coords(0.0, 0.0, 100.0, 50.0), Rgba::BLACK, 2.0)
            .render();

        assert!(svg.contains(r#"x1="0" y1="0" x2="100" y2="50""#));
        assert!(svg.contains(r#"stroke-width="2""#));
    }

    #[test]
    fn test_svg_polyline_and_polygon() {
        let svg = SvgEncoder::new(100, 100)
            .polyline(&triangle(), Rgba::GREEN, 1.5)
            .polygon(&triangle(), Rgba::RED, None)
            .render();

        assert!(svg.contains(r#"<polyline points="0,0 50,100 100,0" fill="none""#));
        assert!(svg.contains(r##"<polygon points="0,0 50,100 100,0" fill="#ff0000"/>"##));
    }

    #[test]
    fn test_svg_text_anchor_and_rotation() {
        let svg = SvgEncoder::new(100, 100)
            .text(Point::new(50.0, 90.0), "0.5", 10.0, Rgba::BLACK, TextAnchor::Middle)
            .text_rotated(Point::new(90.0, 50.0), "Counts", 10.0, Rgba::BLACK, TextAnchor::Middle, -90.0)
            .render();

        assert_eq!(svg.matches(r#"text-anchor="middle""#).count(), 2);
        assert_eq!(svg.matches("transform=").count(), 1);
        assert!(svg.contains(r#"transform="rotate(-90 90 50)""#));
    }

    #[test]
    fn test_svg_text_escaping() {
        let svg = SvgEncoder::new(100, 100)
            .text(Point::new(10.0, 50.0), "counts <n> & \"bins\"", 12.0, Rgba::BLACK, TextAnchor::Start)
            .render();

        assert!(svg.contains("counts &lt;n&gt; &amp; &quot;bins&quot;"));
    }

    #[test]
    fn test_svg_from_framebuffer() {
        let mut fb = Framebuffer::new(16, 64).unwrap();
        fb.clear(Rgba::RED);

        let encoder = SvgEncoder::from_framebuffer(&fb).unwrap();
        assert_eq!(encoder.elements().len(), 1);
        let svg = encoder.render();
        assert!(svg.contains("data:image/png;base64,"));
        assert_eq!(svg.matches("<rect").count(), 0);
    }

    #[test]
    fn test_svg_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("colorbar.svg");
        let svg = SvgEncoder::default().rect(Rect::new(10.0, 10.0, 80.0, 80.0), Rgba::BLUE);
        svg.write_to_file(&path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), svg.render());
    }
}
