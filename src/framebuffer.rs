//! RGBA pixel surface the raster renderer draws into.
//!
//! Pixels are tightly packed in row-major order, 4 bytes per pixel, which is the layout
//! both the PNG encoder and an HTML canvas `ImageData` expect.

use crate::color::Rgba;
use crate::error::{Error, Result};

/// Physical-pixel drawing surface.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    /// Width in pixels.
    width: u32,
    /// Height in pixels.
    height: u32,
    /// RGBA bytes, `width * height * 4` long.
    pixels: Vec<u8>,
}

impl Framebuffer {
    /// Create a transparent framebuffer.
    ///
    /// # Errors
    ///
    /// Returns an error if width or height is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use hexdot::framebuffer::Framebuffer;
    ///
    /// let fb = Framebuffer::new(800, 600).unwrap();
    /// assert_eq!(fb.width(), 800);
    /// assert_eq!(fb.height(), 600);
    /// ```
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        let size = (width as usize) * (height as usize) * 4;
        Ok(Self {
            width,
            height,
            pixels: vec![0; size],
        })
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

    /// Get the total number of pixels.
    #[must_use]
    pub const fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Raw RGBA bytes.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Clear the framebuffer to a solid color.
    pub fn clear(&mut self, color: Rgba) {
        let rgba = color.to_array();
        for chunk in self.pixels.chunks_exact_mut(4) {
            chunk.copy_from_slice(&rgba);
        }
    }

    /// Fill pixels `x0..x1` of row `y` with alpha blending. Out-of-range parts are cut.
    pub fn fill_span(&mut self, x0: i64, x1: i64, y: i64, color: Rgba) {
        if y < 0 || y >= i64::from(self.height) || color.a == 0 {
            return;
        }
        let start = x0.max(0);
        let end = x1.min(i64::from(self.width));
        if start >= end {
            return;
        }
        if color.a == 255 {
            let rgba = color.to_array();
            let row = (y as usize) * (self.width as usize);
            let from = (row + start as usize) * 4;
            let to = (row + end as usize) * 4;
            for chunk in self.pixels[from..to].chunks_exact_mut(4) {
                chunk.copy_from_slice(&rgba);
            }
        } else {
            for x in start..end {
                self.blend_pixel(x as u32, y as u32, color);
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
        if x >= self.width || y >= self.height {
            return;
        }

        let idx = self.pixel_index(x, y);
        let src_a = f32::from(color.a) / 255.0;
        let dst_a = f32::from(self.pixels[idx + 3]) / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);

        if out_a > 0.0 {
            let blend = |src: u8, dst: u8| -> u8 {
                let src_f = f32::from(src) / 255.0;
                let dst_f = f32::from(dst) / 255.0;
                let out = (src_f * src_a + dst_f * dst_a * (1.0 - src_a)) / out_a;
                (out * 255.0).round() as u8
            };

            self.pixels[idx] = blend(color.r, self.pixels[idx]);
            self.pixels[idx + 1] = blend(color.g, self.pixels[idx + 1]);
            self.pixels[idx + 2] = blend(color.b, self.pixels[idx + 2]);
            self.pixels[idx + 3] = (out_a * 255.0).round() as u8;
        }
    }

    /// Count pixels exactly equal to `color`.
    #[must_use]
    pub fn count_color(&self, color: Rgba) -> usize {
        let rgba = color.to_array();
        self.pixels
            .chunks_exact(4)
            .filter(|chunk| *chunk == rgba)
            .count()
    }

    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + x as usize) * 4
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
        assert_eq!(fb.pixels().len(), 20_000);
        assert_eq!(fb.get_pixel(0, 0), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(Framebuffer::new(0, 100).is_err());
        assert!(Framebuffer::new(100, 0).is_err());
    }

    #[test]
    fn test_clear() {
        let mut fb = Framebuffer::new(10, 10).unwrap();
        fb.clear(Rgba::RED);
        assert_eq!(fb.count_color(Rgba::RED), 100);
    }

    #[test]
    fn test_fill_span_clipped() {
        let mut fb = Framebuffer::new(10, 4).unwrap();
        fb.fill_span(-5, 3, 1, Rgba::BLUE);
        fb.fill_span(8, 50, 1, Rgba::BLUE);
        fb.fill_span(0, 10, -1, Rgba::BLUE);
        fb.fill_span(0, 10, 4, Rgba::BLUE);
        assert_eq!(fb.count_color(Rgba::BLUE), 5);
        assert_eq!(fb.get_pixel(2, 1), Some(Rgba::BLUE));
        assert_eq!(fb.get_pixel(3, 1), Some(Rgba::TRANSPARENT));
        assert_eq!(fb.get_pixel(9, 1), Some(Rgba::BLUE));
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
        assert!(result.g > 100 && result.g < 150);
        assert_eq!(result.a, 255);
    }

    #[test]
    fn test_translucent_span_blends() {
        let mut fb = Framebuffer::new(4, 1).unwrap();
        fb.clear(Rgba::BLACK);
        fb.fill_span(0, 4, 0, Rgba::WHITE.with_alpha(128));
        let p = fb.get_pixel(1, 0).unwrap();
        assert!(p.r > 100 && p.r < 150);
    }
}
