//! Point registry.
//!
//! Holds at most one [`GridPoint`] per lattice cell. The base land-mass grid is loaded
//! first and pins are written over it: a pin that snaps onto an existing cell replaces
//! that cell (last write wins).

use crate::error::{Error, Result};
use crate::grid::{snap_to_grid, CellKey, GridParameters, Region};
use crate::projection::{GeoCoordinate, Projection, WebMercator};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Caller-defined payload attached to a pin.
pub type PinData = serde_json::Value;

/// Per-point style override. Unset fields fall back to the renderer defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PinStyle {
    /// CSS fill color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Radius in grid units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
}

impl PinStyle {
    /// Style with a color and radius.
    #[must_use]
    pub fn new(color: impl Into<String>, radius: f64) -> Self {
        Self {
            color: Some(color.into()),
            radius: Some(radius),
        }
    }
}

/// What a registry cell holds.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PointKind {
    /// Plain land cell from the base grid.
    #[default]
    Background,
    /// Caller-placed marker, drawn in the overlay pass.
    Pin {
        /// Opaque payload.
        data: Option<PinData>,
        /// Style override.
        style: PinStyle,
    },
}

/// A cell of the map.
#[derive(Debug, Clone, PartialEq)]
pub struct GridPoint {
    /// Lattice index; unique within a registry.
    pub key: CellKey,
    /// Horizontal center in grid units.
    pub x: f64,
    /// Vertical center in grid units.
    pub y: f64,
    /// Latitude of the cell center.
    pub lat: f64,
    /// Longitude of the cell center.
    pub lng: f64,
    /// Background cell or pin.
    pub kind: PointKind,
}

impl GridPoint {
    /// Whether this point is a pin.
    #[must_use]
    pub fn is_pin(&self) -> bool {
        matches!(self.kind, PointKind::Pin { .. })
    }

    /// Style override, if this is a pin.
    #[must_use]
    pub fn style(&self) -> Option<&PinStyle> {
        match &self.kind {
            PointKind::Pin { style, .. } => Some(style),
            PointKind::Background => None,
        }
    }

    /// Pin payload, if any.
    #[must_use]
    pub fn data(&self) -> Option<&PinData> {
        match &self.kind {
            PointKind::Pin { data, .. } => data.as_ref(),
            PointKind::Background => None,
        }
    }

    /// Fill color override.
    #[must_use]
    pub fn color(&self) -> Option<&str> {
        self.style().and_then(|s| s.color.as_deref())
    }

    /// Radius override.
    #[must_use]
    pub fn radius(&self) -> Option<f64> {
        self.style().and_then(|s| s.radius)
    }
}

/// Size and extent of the rendered map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapImage {
    /// Geographic extent.
    pub region: Region,
    /// Width in grid units.
    pub width: u32,
    /// Height in grid units.
    pub height: u32,
}

static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(1);

fn next_registry_id() -> u64 {
    NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed)
}

/// Cell-keyed store of map points.
#[derive(Debug)]
pub struct PointRegistry<P = WebMercator> {
    id: u64,
    params: GridParameters,
    region: Region,
    projection: P,
    points: HashMap<CellKey, GridPoint>,
    avoid_outer_pins: bool,
    collisions: usize,
    revision: u64,
}

impl<P: Clone> Clone for PointRegistry<P> {
    /// A clone is a distinct registry and gets its own [`id`](PointRegistry::id).
    fn clone(&self) -> Self {
        Self {
            id: next_registry_id(),
            params: self.params,
            region: self.region,
            projection: self.projection.clone(),
            points: self.points.clone(),
            avoid_outer_pins: self.avoid_outer_pins,
            collisions: self.collisions,
            revision: self.revision,
        }
    }
}

impl PointRegistry<WebMercator> {
    /// Create an empty Web Mercator registry.
    #[must_use]
    pub fn new(params: GridParameters, region: Region) -> Self {
        Self::with_projection(params, region, WebMercator)
    }
}

impl<P: Projection> PointRegistry<P> {
    /// Create an empty registry with a custom projection.
    #[must_use]
    pub fn with_projection(params: GridParameters, region: Region, projection: P) -> Self {
        Self {
            id: next_registry_id(),
            params,
            region,
            projection,
            points: HashMap::new(),
            avoid_outer_pins: false,
            collisions: 0,
            revision: 0,
        }
    }

    /// Reject pins that fall outside the map region instead of placing them on the edge.
    #[must_use]
    pub fn avoid_outer_pins(mut self, avoid: bool) -> Self {
        self.avoid_outer_pins = avoid;
        self
    }

    /// Grid parameters.
    #[must_use]
    pub fn params(&self) -> &GridParameters {
        &self.params
    }

    /// Geographic extent.
    #[must_use]
    pub fn region(&self) -> &Region {
        &self.region
    }

    /// Size and extent of the map.
    #[must_use]
    pub fn image(&self) -> MapImage {
        MapImage {
            region: self.region,
            width: self.params.width(),
            height: self.params.height(),
        }
    }

    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the registry has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of `add_pin` calls that replaced an existing pin.
    #[must_use]
    pub fn collisions(&self) -> usize {
        self.collisions
    }

    /// Process-unique identity of this registry. Together with
    /// [`revision`](Self::revision) it names one state of one registry.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Counter bumped on every write, for caches derived from the registry.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Cell at `key`.
    #[must_use]
    pub fn get(&self, key: CellKey) -> Option<&GridPoint> {
        self.points.get(&key)
    }

    /// Store a point, replacing whatever held its cell.
    pub fn insert(&mut self, point: GridPoint) -> Option<GridPoint> {
        self.revision += 1;
        self.points.insert(point.key, point)
    }

    /// Cell a coordinate would land in, without touching the registry.
    ///
    /// The returned `lat`/`lng` are those of the cell center, re-projected from the
    /// snapped position. Compare those, not the raw input, when checking whether two
    /// inputs refer to the same pin.
    pub fn get_pin(&self, geo: GeoCoordinate) -> Result<GridPoint> {
        geo.validate()?;
        let projected = self.projection.project(geo);
        if !projected.is_finite() {
            return Err(Error::OutOfDomain {
                lat: geo.lat,
                lng: geo.lng,
            });
        }
        let cell = snap_to_grid(projected, &self.params)?;
        let center = self
            .projection
            .unproject(self.params.to_projected(cell.x, cell.y));

        Ok(GridPoint {
            key: cell.key,
            x: cell.x,
            y: cell.y,
            lat: center.lat,
            lng: center.lng,
            kind: PointKind::Background,
        })
    }

    /// Place a pin, replacing any cell it snaps onto, and return the stored point.
    pub fn add_pin(
        &mut self,
        geo: GeoCoordinate,
        data: Option<PinData>,
        style: PinStyle,
    ) -> Result<GridPoint> {
        if self.avoid_outer_pins && !self.region.contains(geo.lat, geo.lng) {
            return Err(Error::OutsideRegion {
                lat: geo.lat,
                lng: geo.lng,
            });
        }

        let mut point = self.get_pin(geo)?;
        point.kind = PointKind::Pin { data, style };

        if let Some(previous) = self.insert(point.clone()) {
            if previous.is_pin() {
                self.collisions += 1;
                debug!(
                    cell = %point.key,
                    lat = geo.lat,
                    lng = geo.lng,
                    "pin replaced an existing pin in the same cell"
                );
            }
        }
        Ok(point)
    }

    /// All cells, ordered by row then column.
    #[must_use]
    pub fn get_points(&self) -> Vec<&GridPoint> {
        let mut points: Vec<&GridPoint> = self.points.values().collect();
        points.sort_unstable_by_key(|p| p.key);
        points
    }

    /// Pins only, ordered by row then column.
    #[must_use]
    pub fn pins(&self) -> Vec<&GridPoint> {
        let mut pins: Vec<&GridPoint> = self.points.values().filter(|p| p.is_pin()).collect();
        pins.sort_unstable_by_key(|p| p.key);
        pins
    }
}
