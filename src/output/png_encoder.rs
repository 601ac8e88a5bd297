//! PNG output encoder.
//!
//! Pure Rust PNG encoding using the `png` crate.

use crate::error::Result;
use crate::framebuffer::Framebuffer;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// PNG encoder for framebuffer output.
pub struct PngEncoder;

impl PngEncoder {
    /// Write a framebuffer to a PNG file.
    ///
    /// # Errors
    ///
    /// Returns an error if file creation or PNG encoding fails.
    pub fn write_to_file<P: AsRef<Path>>(fb: &Framebuffer, path: P) -> Result<()> {
        let file = File::create(path)?;
        Self::encode(fb, BufWriter::new(file))
    }

    /// Encode a framebuffer to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if PNG encoding fails.
    pub fn to_bytes(fb: &Framebuffer) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        Self::encode(fb, &mut buffer)?;
        Ok(buffer)
    }

    fn encode<W: Write>(fb: &Framebuffer, sink: W) -> Result<()> {
        let mut encoder = png::Encoder::new(sink, fb.width(), fb.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(fb.pixels())?;
        Ok(())
    }
}
