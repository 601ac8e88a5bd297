//! Offline base grid generation.
//!
//! Samples every lattice cell of a region, maps the cell center back to WGS84 and keeps
//! the cells that fall on land. Land is given as GeoJSON `Polygon`/`MultiPolygon`
//! features. This runs once to produce the dataset [`crate::dataset::BaseGrid`] loads;
//! it is never part of a render.

use crate::dataset::{BaseGrid, DatasetPoint};
use crate::error::{Error, Result};
use crate::grid::{CellKey, GridStyle, Region};
use crate::projection::{GeoCoordinate, Projection, WebMercator};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Property names checked when filtering features by country code.
const COUNTRY_KEYS: [&str; 3] = ["ISO_A3", "iso_a3", "ADM0_A3"];

/// A polygon with optional holes, in `[lng, lat]` degrees.
#[derive(Debug, Clone, PartialEq)]
struct Polygon {
    rings: Vec<Vec<[f64; 2]>>,
    /// `[min_lng, min_lat, max_lng, max_lat]` of the outer ring.
    bbox: [f64; 4],
}

impl Polygon {
    fn new(rings: Vec<Vec<[f64; 2]>>) -> Option<Self> {
        let outer = rings.first()?;
        if outer.len() < 3 {
            return None;
        }
        let mut bbox = [f64::MAX, f64::MAX, f64::MIN, f64::MIN];
        for [lng, lat] in outer {
            bbox[0] = bbox[0].min(*lng);
            bbox[1] = bbox[1].min(*lat);
            bbox[2] = bbox[2].max(*lng);
            bbox[3] = bbox[3].max(*lat);
        }
        Some(Self { rings, bbox })
    }

    /// Even-odd ray casting over all rings, so holes subtract.
    fn contains(&self, lng: f64, lat: f64) -> bool {
        if lng < self.bbox[0] || lng > self.bbox[2] || lat < self.bbox[1] || lat > self.bbox[3] {
            return false;
        }
        let mut inside = false;
        for ring in self.rings.iter().filter(|r| r.len() >= 3) {
            let mut j = ring.len() - 1;
            for i in 0..ring.len() {
                let [xi, yi] = ring[i];
                let [xj, yj] = ring[j];
                if (yi > lat) != (yj > lat) && lng < (xj - xi) * (lat - yi) / (yj - yi) + xi {
                    inside = !inside;
                }
                j = i;
            }
        }
        inside
    }
}

/// Land polygons used to decide which cells exist.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandMask {
    polygons: Vec<Polygon>,
}

impl LandMask {
    /// Parse a GeoJSON `FeatureCollection`, `Feature` or bare geometry.
    ///
    /// With `countries` set, only features whose ISO-A3 code is listed are kept.
    pub fn from_geojson_str(json: &str, countries: Option<&[String]>) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        let mut mask = Self::default();
        mask.collect(&value, countries)?;
        debug!(polygons = mask.polygons.len(), "parsed land mask");
        Ok(mask)
    }

    /// Read a GeoJSON file.
    pub fn from_file<P: AsRef<Path>>(path: P, countries: Option<&[String]>) -> Result<Self> {
        Self::from_geojson_str(&std::fs::read_to_string(path)?, countries)
    }

    /// Number of polygons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    /// Whether the mask has no polygons.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Whether a coordinate lies on land.
    #[must_use]
    pub fn contains(&self, geo: GeoCoordinate) -> bool {
        self.polygons.iter().any(|p| p.contains(geo.lng, geo.lat))
    }

    fn collect(&mut self, value: &Value, countries: Option<&[String]>) -> Result<()> {
        match value.get("type").and_then(Value::as_str) {
            Some("FeatureCollection") => {
                let features = value
                    .get("features")
                    .and_then(Value::as_array)
                    .ok_or_else(|| Error::GeoJson("FeatureCollection without features".into()))?;
                for feature in features {
                    self.collect(feature, countries)?;
                }
                Ok(())
            }
            Some("Feature") => {
                if let Some(wanted) = countries {
                    let code = value.get("properties").and_then(|props| {
                        COUNTRY_KEYS
                            .iter()
                            .find_map(|k| props.get(*k).and_then(Value::as_str))
                    });
                    if !code.is_some_and(|c| wanted.iter().any(|w| w.eq_ignore_ascii_case(c))) {
                        return Ok(());
                    }
                }
                match value.get("geometry") {
                    Some(Value::Null) | None => Ok(()),
                    Some(geometry) => self.collect(geometry, None),
                }
            }
            Some("Polygon") => {
                self.push_polygon(coordinates(value)?)?;
                Ok(())
            }
            Some("MultiPolygon") => {
                let polys = coordinates(value)?
                    .as_array()
                    .ok_or_else(|| Error::GeoJson("MultiPolygon coordinates".into()))?;
                for poly in polys {
                    self.push_polygon(poly)?;
                }
                Ok(())
            }
            // Points and lines carry no area.
            Some(_) => Ok(()),
            None => Err(Error::GeoJson("object without a type".into())),
        }
    }

    fn push_polygon(&mut self, rings: &Value) -> Result<()> {
        let rings = rings
            .as_array()
            .ok_or_else(|| Error::GeoJson("polygon rings must be an array".into()))?;
        let mut parsed = Vec::with_capacity(rings.len());
        for ring in rings {
            let ring = ring
                .as_array()
                .ok_or_else(|| Error::GeoJson("ring must be an array".into()))?;
            let mut positions = Vec::with_capacity(ring.len());
            for position in ring {
                let lng = position.get(0).and_then(Value::as_f64);
                let lat = position.get(1).and_then(Value::as_f64);
                match (lng, lat) {
                    (Some(lng), Some(lat)) => positions.push([lng, lat]),
                    _ => return Err(Error::GeoJson(format!("bad position {position}"))),
                }
            }
            parsed.push(positions);
        }
        if let Some(polygon) = Polygon::new(parsed) {
            self.polygons.push(polygon);
        }
        Ok(())
    }
}

fn coordinates(value: &Value) -> Result<&Value> {
    value
        .get("coordinates")
        .ok_or_else(|| Error::GeoJson("geometry without coordinates".into()))
}

/// Parameters of a generated grid.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenerateSettings {
    /// Height in grid units. Takes precedence over `width`.
    pub height: Option<u32>,
    /// Width in grid units, used when `height` is unset.
    pub width: Option<u32>,
    /// Geographic extent.
    pub region: Region,
    /// Row offset pattern.
    pub grid: GridStyle,
}

/// Build the base land-mass grid.
///
/// # Errors
///
/// Returns [`Error::InvalidGrid`] when neither dimension is set or the region is empty.
pub fn generate_base_grid(settings: &GenerateSettings, land: &LandMask) -> Result<BaseGrid> {
    let projection = WebMercator;
    let region = settings.region;
    let min = projection.project(GeoCoordinate::new(region.lat.min, region.lng.min)?);
    let max = projection.project(GeoCoordinate::new(region.lat.max, region.lng.max)?);
    let (x_min, y_max) = (min.x, max.y);
    let x_range = max.x - min.x;
    let y_range = max.y - min.y;
    if !(x_range > 0.0 && y_range > 0.0) || !(x_range.is_finite() && y_range.is_finite()) {
        return Err(Error::InvalidGrid(format!(
            "region spans no projected area: x_range={x_range}, y_range={y_range}"
        )));
    }

    let (width, height) = match (settings.height, settings.width) {
        (Some(h), _) if h > 0 => (((f64::from(h) * x_range / y_range).round()) as u32, h),
        (_, Some(w)) if w > 0 => (w, ((f64::from(w) * y_range / x_range).round()) as u32),
        _ => return Err(Error::InvalidGrid("height or width must be set".into())),
    };

    let ystep = settings.grid.default_y_step();
    let mut grid = BaseGrid {
        points: BTreeMap::new(),
        x_min,
        y_max,
        x_range,
        y_range,
        region,
        grid: settings.grid,
        width,
        height,
        ystep,
    };
    let params = grid.params()?;

    let mut row: i64 = 0;
    while (row as f64) * ystep < f64::from(height) {
        for col in 0..i64::from(width) {
            let key = CellKey::new(col, row);
            let (x, y) = params.cell_position(key);
            let geo = projection.unproject(params.to_projected(x, y));
            if land.contains(geo) {
                grid.points.insert(
                    key.to_string(),
                    DatasetPoint {
                        x,
                        y,
                        lat: geo.lat,
                        lng: geo.lng,
                    },
                );
            }
        }
        row += 1;
    }

    info!(
        width,
        height,
        rows = row,
        cells = grid.points.len(),
        "generated base grid"
    );
    Ok(grid)
}
