//! Color types and parsing.
//!
//! Provides the RGBA representation used by colormaps and the framebuffer,
//! along with parsing of the color strings accepted for histogram overrides.

use crate::error::{Error, Result};
use std::str::FromStr;

/// RGBA color with 8-bit components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct Rgba {
    /// Red component (0-255).
    pub r: u8,
    /// Green component (0-255).
    pub g: u8,
    /// Blue component (0-255).
    pub b: u8,
    /// Alpha component (0-255, 255 = fully opaque).
    pub a: u8,
}

impl Rgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    /// Opaque red.
    pub const RED: Self = Self::new(255, 0, 0, 255);
    /// Opaque green.
    pub const GREEN: Self = Self::new(0, 255, 0, 255);
    /// Opaque blue.
    pub const BLUE: Self = Self::new(0, 0, 255, 255);
    /// Opaque mid grey.
    pub const GREY: Self = Self::new(128, 128, 128, 255);

    /// Create a new RGBA color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color (alpha = 255).
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Create a color with modified alpha.
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Create a color with alpha given as a fraction in `[0, 1]`.
    #[must_use]
    pub fn with_alpha_f32(self, alpha: f32) -> Self {
        self.with_alpha((alpha.clamp(0.0, 1.0) * 255.0).round() as u8)
    }

    /// Scale the existing alpha by `factor` (clamped to `[0, 1]`).
    #[must_use]
    pub fn fade(self, factor: f32) -> Self {
        let a = f32::from(self.a) * factor.clamp(0.0, 1.0);
        self.with_alpha(a.round() as u8)
    }

    /// Convert to array representation.
    #[must_use]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Create from array representation.
    #[must_use]
    pub const fn from_array(arr: [u8; 4]) -> Self {
        Self::new(arr[0], arr[1], arr[2], arr[3])
    }

    /// Linear interpolation between two colors.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let inv_t = 1.0 - t;

        Self::new(
            (f32::from(self.r) * inv_t + f32::from(other.r) * t) as u8,
            (f32::from(self.g) * inv_t + f32::from(other.g) * t) as u8,
            (f32::from(self.b) * inv_t + f32::from(other.b) * t) as u8,
            (f32::from(self.a) * inv_t + f32::from(other.a) * t) as u8,
        )
    }

    /// Format as `#rrggbb` (alpha dropped), the form used in SVG attributes.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Parse a color string.
    ///
    /// Accepts `#rgb`, `#rrggbb`, `#rrggbbaa`, and a small set of names
    /// (`black`, `white`, `red`, `green`, `blue`, `grey`/`gray`, `orange`,
    /// `none`/`transparent`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidColor`] if the string is not recognized.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| Error::InvalidColor(s.to_string()));
        }

        match s.to_ascii_lowercase().as_str() {
            "black" | "k" => Ok(Self::BLACK),
            "white" | "w" => Ok(Self::WHITE),
            "red" | "r" => Ok(Self::RED),
            "green" | "g" => Ok(Self::rgb(0, 128, 0)),
            "blue" | "b" => Ok(Self::BLUE),
            "grey" | "gray" => Ok(Self::GREY),
            "orange" => Ok(Self::rgb(255, 165, 0)),
            "none" | "transparent" => Ok(Self::TRANSPARENT),
            _ => Err(Error::InvalidColor(s.to_string())),
        }
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.is_ascii() {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        3 => {
            let nibble = |i: usize| {
                u8::from_str_radix(hex.get(i..=i)?, 16).ok().map(|v| v * 17)
            };
            Some(Rgba::rgb(nibble(0)?, nibble(1)?, nibble(2)?))
        }
        6 => Some(Rgba::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Rgba::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

impl FromStr for Rgba {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
