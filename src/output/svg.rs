//! SVG output encoder.
//!
//! Builds a scalable vector document from circles and polygons, or wraps a rendered
//! framebuffer as an embedded PNG image.

use crate::error::Result;
use crate::framebuffer::Framebuffer;
use base64::{engine::general_purpose::STANDARD, Engine};
use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// SVG encoder for vector shapes and embedded rasters.
#[derive(Debug, Clone)]
pub struct SvgEncoder {
    /// viewBox width.
    width: f64,
    /// viewBox height.
    height: f64,
    /// CSS background color (None for none).
    background: Option<String>,
    /// SVG elements.
    elements: Vec<SvgElement>,
}

/// An SVG element.
///
/// Field names match SVG attribute names. Colors are CSS color strings.
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub enum SvgElement {
    /// Circle
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        fill: String,
    },
    /// Closed polygon
    Polygon {
        id: Option<String>,
        points: Vec<(f64, f64)>,
        fill: String,
    },
    /// Embedded raster image (data URI)
    Image {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        data: String,
    },
}

impl SvgEncoder {
    /// Create an encoder with a `0 0 width height` viewBox.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            background: None,
            elements: Vec::new(),
        }
    }

    /// Wrap a framebuffer as an embedded PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if PNG encoding fails.
    pub fn from_framebuffer(fb: &Framebuffer) -> Result<Self> {
        let mut encoder = Self::new(f64::from(fb.width()), f64::from(fb.height()));

        let png_bytes = super::PngEncoder::to_bytes(fb)?;
        let base64_data = STANDARD.encode(&png_bytes);

        encoder.elements.push(SvgElement::Image {
            x: 0.0,
            y: 0.0,
            width: f64::from(fb.width()),
            height: f64::from(fb.height()),
            data: format!("data:image/png;base64,{base64_data}"),
        });

        Ok(encoder)
    }

    /// Set the CSS background color.
    #[must_use]
    pub fn background(mut self, color: Option<String>) -> Self {
        self.background = color;
        self
    }

    /// Add a circle.
    #[must_use]
    pub fn circle(mut self, cx: f64, cy: f64, r: f64, fill: &str) -> Self {
        self.add_element(SvgElement::Circle {
            cx,
            cy,
            r,
            fill: fill.to_string(),
        });
        self
    }

    /// Add a filled polygon.
    #[must_use]
    pub fn polygon(mut self, points: &[(f64, f64)], fill: &str, id: Option<String>) -> Self {
        self.add_element(SvgElement::Polygon {
            id,
            points: points.to_vec(),
            fill: fill.to_string(),
        });
        self
    }

    /// Add a raw element.
    pub fn add_element(&mut self, element: SvgElement) {
        self.elements.push(element);
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether no elements were added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Render to SVG string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut svg = String::with_capacity(64 * (self.elements.len() + 2));

        let style = self
            .background
            .as_ref()
            .map(|bg| format!(r#" style="background-color:{}""#, escape_attr(bg)))
            .unwrap_or_default();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" viewBox="0 0 {} {}"{style}>"#,
            self.width, self.height
        );

        for element in &self.elements {
            let _ = writeln!(svg, "  {}", element_to_svg(element));
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

/// Escape a value for use inside a double-quoted attribute.
fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn element_to_svg(element: &SvgElement) -> String {
    match element {
        SvgElement::Circle { cx, cy, r, fill } => {
            format!(
                r#"<circle cx="{cx}" cy="{cy}" r="{r}" fill="{}"/>"#,
                escape_attr(fill)
            )
        }
        SvgElement::Polygon { id, points, fill } => {
            let points_str = points
                .iter()
                .map(|(x, y)| format!("{x},{y}"))
                .collect::<Vec<_>>()
                .join(" ");
            let id_attr = id
                .as_ref()
                .map(|id| format!(r#" id="{}""#, escape_attr(id)))
                .unwrap_or_default();
            format!(
                r#"<polygon{id_attr} points="{points_str}" fill="{}"/>"#,
                escape_attr(fill)
            )
        }
        SvgElement::Image {
            x,
            y,
            width,
            height,
            data,
        } => {
            format!(
                r#"<image x="{x}" y="{y}" width="{width}" height="{height}" xlink:href="{data}"/>"#
            )
        }
    }
}
