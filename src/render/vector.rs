//! SVG rendering of a point registry.
//!
//! One element per registry cell inside a `0 0 width height` viewBox: background cells
//! in key order, then pins in key order so they paint on top. Pin styles override the
//! document defaults per point.

use super::primitives::Shape;
use crate::error::Result;
use crate::geometry::{hexagon_vertices, Point};
use crate::output::SvgEncoder;
use crate::projection::Projection;
use crate::registry::{GridPoint, PointRegistry};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Document-wide SVG defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SvgSettings {
    /// Dot shape.
    pub shape: Shape,
    /// Default fill color.
    pub color: String,
    /// Document background color.
    pub background_color: String,
    /// Default radius in grid units.
    pub radius: f64,
}

impl Default for SvgSettings {
    fn default() -> Self {
        Self {
            shape: Shape::Circle,
            color: "currentColor".to_string(),
            background_color: "transparent".to_string(),
            radius: 0.5,
        }
    }
}

/// Render every cell of `registry` as an SVG document.
///
/// # Example
///
/// ```
/// use hexdot::grid::{GridParameters, GridStyle, Region};
/// use hexdot::registry::PointRegistry;
/// use hexdot::render::{render_svg, SvgSettings};
///
/// let params = GridParameters::new(200, 100, -180.0, 90.0, 360.0, 180.0, 1.0, GridStyle::Diagonal)
///     .unwrap();
/// let registry = PointRegistry::new(params, Region::default());
/// let svg = render_svg(&registry, &SvgSettings::default());
/// assert!(svg.contains(r#"viewBox="0 0 200 100""#));
/// ```
#[must_use]
pub fn render_svg<P: Projection>(registry: &PointRegistry<P>, settings: &SvgSettings) -> String {
    let image = registry.image();
    let mut encoder = SvgEncoder::new(f64::from(image.width), f64::from(image.height))
        .background(Some(settings.background_color.clone()));

    // Later elements paint over earlier ones: background cells first, pins last.
    let (pins, cells): (Vec<&GridPoint>, Vec<&GridPoint>) =
        registry.get_points().into_iter().partition(|p| p.is_pin());
    for point in cells.iter().chain(&pins) {
        encoder = add_point(encoder, point, settings);
    }
    debug!(cells = cells.len(), pins = pins.len(), shape = ?settings.shape, "rendered svg");
    encoder.render()
}

/// Render `registry` and write the document to `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn render_svg_to_file<P: Projection, Q: AsRef<Path>>(
    registry: &PointRegistry<P>,
    settings: &SvgSettings,
    path: Q,
) -> Result<()> {
    std::fs::write(path, render_svg(registry, settings))?;
    Ok(())
}

fn add_point(encoder: SvgEncoder, point: &GridPoint, settings: &SvgSettings) -> SvgEncoder {
    let radius = point.radius().unwrap_or(settings.radius);
    let color = point.color().unwrap_or(&settings.color);

    match settings.shape {
        Shape::Circle => encoder.circle(point.x, point.y, radius, color),
        Shape::Hexagon => {
            let vertices: Vec<(f64, f64)> =
                hexagon_vertices(Point::new(point.x, point.y), radius)
                    .iter()
                    .map(|v| (v.x, v.y))
                    .collect();
            encoder.polygon(&vertices, color, Some(format!("hex-{}", point.key)))
        }
    }
}
