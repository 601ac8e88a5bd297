//! Geographic projection.
//!
//! Converts WGS84 latitude/longitude into the planar coordinates the grid is laid out in.
//! The map uses spherical Web Mercator (EPSG:3857), the projection behind common web map
//! tiles.
//!
//! The forward projection is singular at the poles: `project` at `lat = ±90` yields an
//! infinite `y`. That input is accepted here and rejected downstream by
//! [`crate::grid::snap_to_grid`], which refuses non-finite planar coordinates.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

/// Sphere radius used by Web Mercator, in meters.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    /// Latitude in `[-90, 90]`.
    pub lat: f64,
    /// Longitude in `[-180, 180]`.
    pub lng: f64,
}

impl GeoCoordinate {
    /// Create a coordinate, rejecting values outside the geographic domain.
    ///
    /// Out-of-range input is never clamped: a clamped coordinate would land in a
    /// different grid cell than the caller asked for.
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        let coord = Self { lat, lng };
        coord.validate()?;
        Ok(coord)
    }

    /// Check the domain of a coordinate built without [`GeoCoordinate::new`].
    pub fn validate(&self) -> Result<()> {
        if self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
        {
            Ok(())
        } else {
            Err(Error::OutOfDomain {
                lat: self.lat,
                lng: self.lng,
            })
        }
    }
}

/// A point on the projected plane (meters for Web Mercator, not pixels).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProjectedCoordinate {
    /// Easting.
    pub x: f64,
    /// Northing.
    pub y: f64,
}

impl ProjectedCoordinate {
    /// Create a projected coordinate.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether both components are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A cylindrical map projection.
pub trait Projection {
    /// Geographic to planar.
    fn project(&self, geo: GeoCoordinate) -> ProjectedCoordinate;

    /// Planar to geographic.
    fn unproject(&self, p: ProjectedCoordinate) -> GeoCoordinate;
}

/// Spherical Web Mercator (EPSG:3857).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WebMercator;

impl Projection for WebMercator {
    fn project(&self, geo: GeoCoordinate) -> ProjectedCoordinate {
        let x = EARTH_RADIUS * geo.lng.to_radians();
        // tan(π/2) is finite in floating point; report the pole as the limit instead.
        let y = if geo.lat.abs() >= 90.0 {
            f64::INFINITY.copysign(geo.lat)
        } else {
            EARTH_RADIUS * (FRAC_PI_4 + geo.lat.to_radians() / 2.0).tan().ln()
        };
        ProjectedCoordinate::new(x, y)
    }

    fn unproject(&self, p: ProjectedCoordinate) -> GeoCoordinate {
        let lng = (p.x / EARTH_RADIUS).to_degrees();
        let lat = (2.0 * (p.y / EARTH_RADIUS).exp().atan() - FRAC_PI_2).to_degrees();
        GeoCoordinate { lat, lng }
    }
}
