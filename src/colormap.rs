//! Colormaps: gradients over `[0, 1]` with special under/over/bad colors.
//!
//! A colormap consumes normalized values. Values below 0 use the *under*
//! color, above 1 the *over* color, and missing values (NaN or `None`) the
//! *bad* color. Histogram colorbars repurpose the bad slot to carry the
//! histogram override color.
//!
//! # References
//!
//! - Borland, D., & Taylor, R. M. (2007). "Rainbow Color Map (Still) Considered Harmful."
//!   IEEE Computer Graphics and Applications.

use crate::color::Rgba;
use crate::error::{Error, Result};

/// Gradient colormap with special colors.
#[derive(Debug, Clone, PartialEq)]
pub struct Colormap {
    name: String,
    colors: Vec<Rgba>,
    under: Option<Rgba>,
    over: Option<Rgba>,
    bad: Rgba,
}

impl Colormap {
    /// Create a colormap from evenly spaced gradient stops.
    ///
    /// # Errors
    ///
    /// Returns an error if `colors` is empty.
    pub fn new(name: impl Into<String>, colors: Vec<Rgba>) -> Result<Self> {
        if colors.is_empty() {
            return Err(Error::InvalidOption("colormap requires at least one color".to_string()));
        }

        Ok(Self { name: name.into(), colors, under: None, over: None, bad: Rgba::TRANSPARENT })
    }

    fn builtin(name: &str, colors: Vec<Rgba>) -> Self {
        Self { name: name.to_string(), colors, under: None, over: None, bad: Rgba::TRANSPARENT }
    }

    /// Viridis (perceptually uniform, colorblind-safe).
    #[must_use]
    pub fn viridis() -> Self {
        Self::builtin(
            "viridis",
            vec![
                Rgba::rgb(68, 1, 84),
                Rgba::rgb(59, 82, 139),
                Rgba::rgb(33, 145, 140),
                Rgba::rgb(94, 201, 98),
                Rgba::rgb(253, 231, 37),
            ],
        )
    }

    /// Magma (sequential, perceptually uniform).
    #[must_use]
    pub fn magma() -> Self {
        Self::builtin(
            "magma",
            vec![
                Rgba::rgb(0, 0, 4),
                Rgba::rgb(81, 18, 124),
                Rgba::rgb(183, 55, 121),
                Rgba::rgb(252, 137, 97),
                Rgba::rgb(252, 253, 191),
            ],
        )
    }

    /// Sequential blues.
    #[must_use]
    pub fn blues() -> Self {
        Self::builtin(
            "blues",
            vec![
                Rgba::rgb(247, 251, 255),
                Rgba::rgb(198, 219, 239),
                Rgba::rgb(107, 174, 214),
                Rgba::rgb(33, 113, 181),
                Rgba::rgb(8, 48, 107),
            ],
        )
    }

    /// Diverging red-blue.
    #[must_use]
    pub fn red_blue() -> Self {
        Self::builtin(
            "red_blue",
            vec![
                Rgba::rgb(178, 24, 43),
                Rgba::rgb(239, 138, 98),
                Rgba::rgb(247, 247, 247),
                Rgba::rgb(103, 169, 207),
                Rgba::rgb(33, 102, 172),
            ],
        )
    }

    /// Greyscale (black to white).
    #[must_use]
    pub fn greyscale() -> Self {
        Self::builtin("greyscale", vec![Rgba::BLACK, Rgba::WHITE])
    }

    /// Heat (black-red-yellow-white).
    #[must_use]
    pub fn heat() -> Self {
        Self::builtin(
            "heat",
            vec![
                Rgba::rgb(0, 0, 0),
                Rgba::rgb(128, 0, 0),
                Rgba::rgb(255, 0, 0),
                Rgba::rgb(255, 128, 0),
                Rgba::rgb(255, 255, 0),
                Rgba::rgb(255, 255, 255),
            ],
        )
    }

    /// Look up a built-in colormap by name.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown names.
    pub fn by_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "viridis" => Ok(Self::viridis()),
            "magma" => Ok(Self::magma()),
            "blues" => Ok(Self::blues()),
            "red_blue" | "rdbu" => Ok(Self::red_blue()),
            "greyscale" | "grayscale" | "greys" => Ok(Self::greyscale()),
            "heat" => Ok(Self::heat()),
            other => Err(Error::InvalidOption(format!("unknown colormap '{other}'"))),
        }
    }

    /// Colormap name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the color used for values below the normalized range.
    #[must_use]
    pub fn with_under(mut self, color: Rgba) -> Self {
        self.under = Some(color);
        self
    }

    /// Set the color used for values above the normalized range.
    #[must_use]
    pub fn with_over(mut self, color: Rgba) -> Self {
        self.over = Some(color);
        self
    }

    /// Set the color used for missing values.
    #[must_use]
    pub fn with_bad(mut self, color: Rgba) -> Self {
        self.bad = color;
        self
    }

    /// Replace the bad color in place.
    pub fn set_bad(&mut self, color: Rgba) {
        self.bad = color;
    }

    /// Color for values below the range (defaults to the lowest stop).
    #[must_use]
    pub fn under(&self) -> Rgba {
        self.under.unwrap_or(self.colors[0])
    }

    /// Color for values above the range (defaults to the highest stop).
    #[must_use]
    pub fn over(&self) -> Rgba {
        self.over.unwrap_or(self.colors[self.colors.len() - 1])
    }

    /// Color for missing values.
    #[must_use]
    pub fn bad(&self) -> Rgba {
        self.bad
    }

    /// Map a normalized value to a color.
    #[must_use]
    pub fn map(&self, t: f32) -> Rgba {
        if t.is_nan() {
            return self.bad;
        }
        if t < 0.0 {
            return self.under();
        }
        if t > 1.0 {
            return self.over();
        }

        if self.colors.len() == 1 {
            return self.colors[0];
        }

        let segment_count = self.colors.len() - 1;
        let segment = (t * segment_count as f32).floor() as usize;
        let segment = segment.min(segment_count - 1);

        let local_t = t * segment_count as f32 - segment as f32;

        self.colors[segment].lerp(self.colors[segment + 1], local_t)
    }

    /// Map an optional normalized value; `None` is the missing-data sentinel.
    #[must_use]
    pub fn map_optional(&self, t: Option<f32>) -> Rgba {
        t.map_or(self.bad, |t| self.map(t))
    }
}

impl Default for Colormap {
    fn default() -> Self {
        Self::viridis()
    }
}
