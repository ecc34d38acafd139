//! Core framebuffer for pixel rendering.
//!
//! Provides a SIMD-aligned RGBA pixel buffer. Translucent span fills go
//! through trueno vectors so the blend runs on the best available backend.

use crate::color::Rgba;
use crate::error::{Error, Result};
use trueno::Vector;

/// Alignment for SIMD operations (64 bytes for AVX-512).
const SIMD_ALIGNMENT: usize = 64;

/// SIMD-aligned framebuffer for efficient pixel operations.
///
/// Rows are padded to 64 bytes for wide SIMD architectures.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    /// Width in pixels.
    width: u32,
    /// Height in pixels.
    height: u32,
    /// RGBA pixels in row-major order, 4 bytes per pixel.
    pixels: Vec<u8>,
    /// Stride in bytes (may include padding for alignment).
    stride: usize,
}

impl Framebuffer {
    /// Create a new framebuffer with the given dimensions.
    ///
    /// # Errors
    ///
    /// Returns an error if width or height is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use histcolorbar::framebuffer::Framebuffer;
    ///
    /// let fb = Framebuffer::new(120, 400).unwrap();
    /// assert_eq!(fb.width(), 120);
    /// assert_eq!(fb.height(), 400);
    /// ```
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }

        let row_bytes = (width as usize) * 4;
        let stride = (row_bytes + SIMD_ALIGNMENT - 1) & !(SIMD_ALIGNMENT - 1);
        let pixels = vec![0; stride * (height as usize)];

        Ok(Self { width, height, pixels, stride })
    }

    /// Get the width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Get the height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Get the stride (row width in bytes, including any padding).
    #[must_use]
    pub const fn stride(&self) -> usize {
        self.stride
    }

    /// Get the total number of pixels.
    #[must_use]
    pub const fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Get a row of pixels as a slice.
    #[must_use]
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let start = (y as usize) * self.stride;
        let end = start + (self.width as usize) * 4;
        Some(&self.pixels[start..end])
    }

    /// Clear the framebuffer to a solid color.
    pub fn clear(&mut self, color: Rgba) {
        self.fill_rect(0, 0, self.width, self.height, color);
    }

    /// Fill a rectangular region with a solid color.
    ///
    /// Coordinates are clamped to framebuffer bounds.
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgba) {
        let Some((x1, y1, x2, y2)) = self.clip(x, y, w, h) else {
            return;
        };

        let pattern = color.to_array();
        let span = (x2 - x1) as usize * 4;
        for row_y in y1..y2 {
            let start = (row_y as usize) * self.stride + (x1 as usize) * 4;
            for chunk in self.pixels[start..start + span].chunks_exact_mut(4) {
                chunk.copy_from_slice(&pattern);
            }
        }
    }

    /// Composite a color over a rectangular region.
    ///
    /// Opaque colors take the [`fill_rect`](Self::fill_rect) path. Color
    /// channels are blended as `src * a + dst * (1 - a)`; the alpha channel
    /// accumulates coverage the same way.
    pub fn blend_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgba) {
        match color.a {
            0 => return,
            255 => return self.fill_rect(x, y, w, h, color),
            _ => {}
        }
        let Some((x1, y1, x2, y2)) = self.clip(x, y, w, h) else {
            return;
        };

        let alpha = f32::from(color.a) / 255.0;
        let span = (x2 - x1) as usize * 4;
        let src: Vec<f32> = [color.r, color.g, color.b, 255]
            .iter()
            .map(|&c| f32::from(c) * alpha)
            .cycle()
            .take(span)
            .collect();
        let src = Vector::from_vec(src);
        let keep = Vector::from_vec(vec![1.0 - alpha; span]);

        for row_y in y1..y2 {
            let start = (row_y as usize) * self.stride + (x1 as usize) * 4;
            let row = &mut self.pixels[start..start + span];
            let dst = Vector::from_vec(row.iter().map(|&b| f32::from(b)).collect());

            if let Ok(out) = dst.mul(&keep).and_then(|d| d.add(&src)) {
                for (byte, &v) in row.iter_mut().zip(out.as_slice()) {
                    *byte = v.round().clamp(0.0, 255.0) as u8;
                }
            }
        }
    }

    /// Get the color at a specific pixel coordinate.
    ///
    /// Returns `None` if the coordinates are out of bounds.
    #[must_use]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let idx = self.pixel_index(x, y);
        Some(Rgba::from_array([
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]))
    }

    /// Set the color at a specific pixel coordinate.
    ///
    /// Does nothing if the coordinates are out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if x >= self.width || y >= self.height {
            return;
        }

        let idx = self.pixel_index(x, y);
        self.pixels[idx..idx + 4].copy_from_slice(&color.to_array());
    }

    /// Blend a color at a specific pixel coordinate using alpha blending.
    ///
    /// Uses the standard "over" compositing operation:
    /// `out = src * src_alpha + dst * dst_alpha * (1 - src_alpha)`
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if x >= self.width || y >= self.height || color.a == 0 {
            return;
        }
        if color.a == 255 {
            return self.set_pixel(x, y, color);
        }

        let idx = self.pixel_index(x, y);
        let src_a = f32::from(color.a) / 255.0;
        let dst_a = f32::from(self.pixels[idx + 3]) / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);

        let blend = |src: u8, dst: u8| -> u8 {
            let out = (f32::from(src) * src_a + f32::from(dst) * dst_a * (1.0 - src_a)) / out_a;
            out.round().clamp(0.0, 255.0) as u8
        };

        self.pixels[idx] = blend(color.r, self.pixels[idx]);
        self.pixels[idx + 1] = blend(color.g, self.pixels[idx + 1]);
        self.pixels[idx + 2] = blend(color.b, self.pixels[idx + 2]);
        self.pixels[idx + 3] = (out_a * 255.0).round() as u8;
    }

    /// Get pixel data as a compact buffer without stride padding.
    ///
    /// PNG encoding expects tightly-packed rows.
    #[must_use]
    pub fn to_compact_pixels(&self) -> Vec<u8> {
        let row_bytes = (self.width as usize) * 4;
        if self.stride == row_bytes {
            return self.pixels.clone();
        }

        let mut compact = Vec::with_capacity(row_bytes * (self.height as usize));
        for y in 0..self.height {
            let start = (y as usize) * self.stride;
            compact.extend_from_slice(&self.pixels[start..start + row_bytes]);
        }
        compact
    }

    /// Calculate the byte index for a pixel coordinate.
    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        (y as usize) * self.stride + (x as usize) * 4
    }

    /// Clamp a region to the buffer; `None` when nothing remains.
    fn clip(&self, x: u32, y: u32, w: u32, h: u32) -> Option<(u32, u32, u32, u32)> {
        let x1 = x.min(self.width);
        let y1 = y.min(self.height);
        let x2 = x.saturating_add(w).min(self.width);
        let y2 = y.saturating_add(h).min(self.height);
        (x1 < x2 && y1 < y2).then_some((x1, y1, x2, y2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_framebuffer() {
        let fb = Framebuffer::new(100, 50).unwrap();
        assert_eq!(fb.width(), 100);
        assert_eq!(fb.height(), 50);
        assert_eq!(fb.pixel_count(), 5000);
        assert!(fb.stride() >= 400);
        assert_eq!(fb.stride() % SIMD_ALIGNMENT, 0);
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(Framebuffer::new(0, 100).is_err());
        assert!(Framebuffer::new(100, 0).is_err());
    }

    #[test]
    fn test_clear() {
        let mut fb = Framebuffer::new(37, 10).unwrap();
        fb.clear(Rgba::RED);
        assert_eq!(fb.get_pixel(0, 0), Some(Rgba::RED));
        assert_eq!(fb.get_pixel(36, 9), Some(Rgba::RED));
    }

    #[test]
    fn test_fill_rect_clamped() {
        let mut fb = Framebuffer::new(100, 100).unwrap();
        fb.clear(Rgba::WHITE);
        fb.fill_rect(90, 90, u32::MAX, 20, Rgba::RED);

        assert_eq!(fb.get_pixel(99, 99), Some(Rgba::RED));
        assert_eq!(fb.get_pixel(89, 95), Some(Rgba::WHITE));
    }

    #[test]
    fn test_blend_rect_half_alpha() {
        let mut fb = Framebuffer::new(8, 8).unwrap();
        fb.clear(Rgba::WHITE);
        fb.blend_rect(2, 2, 4, 4, Rgba::new(0, 0, 0, 128));

        let px = fb.get_pixel(3, 3).unwrap();
        assert!((126..=128).contains(&px.r));
        assert_eq!(px.a, 255);
        assert_eq!(fb.get_pixel(1, 1), Some(Rgba::WHITE));
    }

    #[test]
    fn test_blend_rect_transparent_is_noop() {
        let mut fb = Framebuffer::new(4, 4).unwrap();
        fb.clear(Rgba::WHITE);
        fb.blend_rect(0, 0, 4, 4, Rgba::TRANSPARENT);
        assert_eq!(fb.get_pixel(2, 2), Some(Rgba::WHITE));
    }

    #[test]
    fn test_set_get_pixel() {
        let mut fb = Framebuffer::new(10, 10).unwrap();
        fb.set_pixel(5, 5, Rgba::BLUE);
        assert_eq!(fb.get_pixel(5, 5), Some(Rgba::BLUE));
        assert_eq!(fb.get_pixel(100, 100), None);
    }

    #[test]
    fn test_blend_pixel() {
        let mut fb = Framebuffer::new(10, 10).unwrap();
        fb.clear(Rgba::WHITE);
        fb.blend_pixel(5, 5, Rgba::new(255, 0, 0, 128));

        let result = fb.get_pixel(5, 5).unwrap();
        assert_eq!(result.r, 255);
        assert!(result.g > 100 && result.g < 160);
    }

    #[test]
    fn test_blend_pixel_opaque_replaces() {
        let mut fb = Framebuffer::new(2, 2).unwrap();
        fb.clear(Rgba::WHITE);
        let color = Rgba::rgb(17, 130, 201);
        fb.blend_pixel(0, 0, color);
        assert_eq!(fb.get_pixel(0, 0), Some(color));
    }

    #[test]
    fn test_row_and_compact_pixels() {
        let mut fb = Framebuffer::new(3, 2).unwrap();
        fb.clear(Rgba::BLACK);
        fb.set_pixel(1, 1, Rgba::GREEN);

        assert_eq!(fb.row(1).map(<[u8]>::len), Some(12));
        assert!(fb.row(2).is_none());
        let compact = fb.to_compact_pixels();
        assert_eq!(compact.len(), 3 * 2 * 4);
        assert_eq!(&compact[16..20], &Rgba::GREEN.to_array());
    }
}
