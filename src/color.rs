//! Color types and CSS color parsing.
//!
//! Map styles are carried as CSS color strings so they can be written verbatim into SVG
//! output. The raster renderer parses them into [`Rgba`] at draw time.

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

    /// Parse a CSS color.
    ///
    /// Accepts `#rgb`, `#rrggbb`, `#rrggbbaa`, `transparent` and the few named colors
    /// exposed as constants. `currentColor` (and the shorthand `current`) resolve to
    /// `current`, the foreground the caller draws with.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidColor`] for anything else.
    pub fn from_css(value: &str, current: Rgba) -> Result<Self> {
        let value = value.trim();
        match value.to_ascii_lowercase().as_str() {
            "transparent" | "none" => return Ok(Self::TRANSPARENT),
            "current" | "currentcolor" => return Ok(current),
            "black" => return Ok(Self::BLACK),
            "white" => return Ok(Self::WHITE),
            "red" => return Ok(Self::RED),
            "green" => return Ok(Self::GREEN),
            "blue" => return Ok(Self::BLUE),
            _ => {}
        }

        let hex = value
            .strip_prefix('#')
            .filter(|h| h.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or_else(|| Error::InvalidColor(value.to_string()))?;
        let channel = |s: &str| {
            u8::from_str_radix(s, 16).map_err(|_| Error::InvalidColor(value.to_string()))
        };

        match hex.len() {
            3 => {
                let mut out = [0u8; 3];
                for (slot, c) in out.iter_mut().zip(hex.chars()) {
                    let nibble = c
                        .to_digit(16)
                        .ok_or_else(|| Error::InvalidColor(value.to_string()))?;
                    *slot = (nibble * 17) as u8;
                }
                Ok(Self::rgb(out[0], out[1], out[2]))
            }
            6 => Ok(Self::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            8 => Ok(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                channel(&hex[6..8])?,
            )),
            _ => Err(Error::InvalidColor(value.to_string())),
        }
    }
}

impl FromStr for Rgba {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_css(s, Self::BLACK)
    }
}
