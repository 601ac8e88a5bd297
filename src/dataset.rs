//! Base grid dataset.
//!
//! The land-mass grid is produced offline (see [`crate::generate`]) and shipped as JSON:
//!
//! ```json
//! {
//!   "points": { "12;3": { "x": 12.5, "y": 2.598, "lat": 41.7, "lng": 44.8 } },
//!   "X_MIN": -19926188.85, "Y_MAX": 11068715.66,
//!   "X_RANGE": 39852377.7, "Y_RANGE": 18636549.68,
//!   "region": { "lat": { "min": -56, "max": 71 }, "lng": { "min": -179, "max": 179 } },
//!   "grid": "diagonal", "width": 268, "height": 125, "ystep": 0.866
//! }
//! ```
//!
//! The dataset is trusted input: beyond the [`GridParameters`] invariants nothing is
//! validated. Cell keys are recomputed from each point's position, so the string keys in
//! `points` only need to be unique.

use crate::error::{Error, Result};
use crate::grid::{GridParameters, GridStyle, Region};
use crate::registry::{GridPoint, PointKind, PointRegistry};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// A land cell as stored in the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DatasetPoint {
    /// Horizontal position in grid units.
    pub x: f64,
    /// Vertical position in grid units.
    pub y: f64,
    /// Latitude of the cell center.
    pub lat: f64,
    /// Longitude of the cell center.
    pub lng: f64,
}

/// Precomputed land-mass grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseGrid {
    /// Land cells keyed by `"col;row"`.
    pub points: BTreeMap<String, DatasetPoint>,
    /// Projected x of the left edge.
    #[serde(rename = "X_MIN")]
    pub x_min: f64,
    /// Projected y of the top edge.
    #[serde(rename = "Y_MAX")]
    pub y_max: f64,
    /// Projected width.
    #[serde(rename = "X_RANGE")]
    pub x_range: f64,
    /// Projected height.
    #[serde(rename = "Y_RANGE")]
    pub y_range: f64,
    /// Geographic extent.
    #[serde(default)]
    pub region: Region,
    /// Row offset pattern.
    #[serde(default)]
    pub grid: GridStyle,
    /// Width in grid units.
    #[serde(deserialize_with = "de_dimension")]
    pub width: u32,
    /// Height in grid units.
    #[serde(deserialize_with = "de_dimension")]
    pub height: u32,
    /// Row spacing in grid units.
    pub ystep: f64,
}

/// Dimensions are written by a JavaScript generator and may arrive as `125.0`.
fn de_dimension<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if value.is_finite() && value >= 0.0 && value <= f64::from(u32::MAX) {
        Ok(value.round() as u32)
    } else {
        Err(serde::de::Error::custom(format!(
            "invalid grid dimension {value}"
        )))
    }
}

impl BaseGrid {
    /// Parse a dataset from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let grid: Self = serde_json::from_str(json)?;
        grid.params()?;
        Ok(grid)
    }

    /// Read a dataset from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let grid = Self::from_json_str(&fs::read_to_string(path)?)?;
        info!(
            path = %path.display(),
            cells = grid.points.len(),
            width = grid.width,
            height = grid.height,
            "loaded base grid"
        );
        Ok(grid)
    }

    /// Serialize to JSON text.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Write the dataset as JSON.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    /// Validated grid parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGrid`] if the header would produce non-finite cells.
    pub fn params(&self) -> Result<GridParameters> {
        GridParameters::new(
            self.width,
            self.height,
            self.x_min,
            self.y_max,
            self.x_range,
            self.y_range,
            self.ystep,
            self.grid,
        )
    }

    /// Number of land cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the dataset has no land cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Build a registry holding every land cell as a background point.
    pub fn to_registry(&self) -> Result<PointRegistry> {
        let params = self.params()?;
        let mut registry = PointRegistry::new(params, self.region);
        for p in self.points.values() {
            if !(p.x.is_finite() && p.y.is_finite()) {
                return Err(Error::InvalidGrid(format!(
                    "dataset point ({}, {}) is not finite",
                    p.x, p.y
                )));
            }
            registry.insert(GridPoint {
                key: params.key_at(p.x, p.y),
                x: p.x,
                y: p.y,
                lat: p.lat,
                lng: p.lng,
                kind: PointKind::Background,
            });
        }
        Ok(registry)
    }
}
