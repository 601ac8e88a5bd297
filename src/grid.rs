//! Grid snapping.
//!
//! A map is a lattice of `width x height` grid units laid over a rectangle of the
//! projected plane. Rows are `y_step` units apart. In a [`GridStyle::Diagonal`] grid every
//! even row is shifted half a unit to the right, which turns the lattice into the
//! brick/hex pattern the hexagon renderer tessellates.
//!
//! Cells are identified by their integer lattice index ([`CellKey`]); the float position
//! `(x, y)` of a cell is derived from the key and never used as a hash key.

use crate::error::{Error, Result};
use crate::projection::ProjectedCoordinate;
use serde::{Deserialize, Serialize};

/// Row offset pattern of the lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridStyle {
    /// Plain rectangular lattice.
    Vertical,
    /// Even rows offset by half a cell.
    #[default]
    Diagonal,
}

impl GridStyle {
    /// Vertical distance between rows for a freshly generated grid.
    ///
    /// Diagonal rows are packed at `√3/2` so neighbouring hexagons touch.
    #[must_use]
    pub fn default_y_step(self) -> f64 {
        match self {
            Self::Vertical => 1.0,
            Self::Diagonal => 3.0_f64.sqrt() / 2.0,
        }
    }
}

/// Inclusive numeric range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl Span {
    /// Whether `v` lies within the span.
    #[must_use]
    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }
}

/// Geographic extent a map covers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Latitude range in degrees.
    pub lat: Span,
    /// Longitude range in degrees.
    pub lng: Span,
}

impl Default for Region {
    /// The inhabited world: Antarctica and the far north are cut.
    fn default() -> Self {
        Self {
            lat: Span {
                min: -56.0,
                max: 71.0,
            },
            lng: Span {
                min: -179.0,
                max: 179.0,
            },
        }
    }
}

impl Region {
    /// Whether a coordinate lies inside the region.
    #[must_use]
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        self.lat.contains(lat) && self.lng.contains(lng)
    }
}

/// Integer lattice index of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    /// Row index (`y / y_step`). Ordered first so sorting walks rows.
    pub row: i64,
    /// Column index before the diagonal half-unit shift.
    pub col: i64,
}

impl CellKey {
    /// Create a key.
    #[must_use]
    pub const fn new(col: i64, row: i64) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for CellKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{};{}", self.col, self.row)
    }
}

/// A snapped cell: key plus its position in grid units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    /// Lattice index.
    pub key: CellKey,
    /// Horizontal center in grid units.
    pub x: f64,
    /// Vertical center in grid units.
    pub y: f64,
}

/// Affine mapping between the projected plane and grid units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridParameters {
    width: u32,
    height: u32,
    x_min: f64,
    y_max: f64,
    x_range: f64,
    y_range: f64,
    y_step: f64,
    style: GridStyle,
}

impl GridParameters {
    /// Build and validate grid parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGrid`] if any range or step is not strictly positive, the
    /// grid has zero area, or any value is non-finite. Such a grid would otherwise produce
    /// NaN or infinite cell coordinates.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        width: u32,
        height: u32,
        x_min: f64,
        y_max: f64,
        x_range: f64,
        y_range: f64,
        y_step: f64,
        style: GridStyle,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidGrid(format!(
                "grid must have a non-zero size, got {width}x{height}"
            )));
        }
        for (name, value) in [
            ("x_min", x_min),
            ("y_max", y_max),
            ("x_range", x_range),
            ("y_range", y_range),
            ("y_step", y_step),
        ] {
            if !value.is_finite() {
                return Err(Error::InvalidGrid(format!("{name} is not finite")));
            }
        }
        for (name, value) in [("x_range", x_range), ("y_range", y_range), ("y_step", y_step)] {
            if value <= 0.0 {
                return Err(Error::InvalidGrid(format!(
                    "{name} must be > 0, got {value}"
                )));
            }
        }

        Ok(Self {
            width,
            height,
            x_min,
            y_max,
            x_range,
            y_range,
            y_step,
            style,
        })
    }

    /// Grid width in units.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in units.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Projected x of the left edge.
    #[must_use]
    pub const fn x_min(&self) -> f64 {
        self.x_min
    }

    /// Projected y of the top edge.
    #[must_use]
    pub const fn y_max(&self) -> f64 {
        self.y_max
    }

    /// Projected width covered by the grid.
    #[must_use]
    pub const fn x_range(&self) -> f64 {
        self.x_range
    }

    /// Projected height covered by the grid.
    #[must_use]
    pub const fn y_range(&self) -> f64 {
        self.y_range
    }

    /// Distance between rows in grid units.
    #[must_use]
    pub const fn y_step(&self) -> f64 {
        self.y_step
    }

    /// Row offset pattern.
    #[must_use]
    pub const fn style(&self) -> GridStyle {
        self.style
    }

    /// Horizontal shift applied to every cell of `row`.
    #[must_use]
    pub fn row_shift(&self, row: i64) -> f64 {
        if self.style == GridStyle::Diagonal && row.rem_euclid(2) == 0 {
            0.5
        } else {
            0.0
        }
    }

    /// Position of a cell in grid units.
    #[must_use]
    pub fn cell_position(&self, key: CellKey) -> (f64, f64) {
        (
            key.col as f64 + self.row_shift(key.row),
            key.row as f64 * self.y_step,
        )
    }

    /// Recover the key of a cell from its position, as stored in a dataset.
    #[must_use]
    pub fn key_at(&self, x: f64, y: f64) -> CellKey {
        let row = round_half_up(y / self.y_step) as i64;
        let col = round_half_up(x - self.row_shift(row)) as i64;
        CellKey::new(col, row)
    }

    /// Map a position in grid units back onto the projected plane.
    #[must_use]
    pub fn to_projected(&self, x: f64, y: f64) -> ProjectedCoordinate {
        ProjectedCoordinate::new(
            x * self.x_range / f64::from(self.width) + self.x_min,
            self.y_max - y * self.y_range / f64::from(self.height),
        )
    }
}

/// Round half up, matching the rounding the base grid generator uses.
///
/// `f64::round` rounds ties away from zero, which would put negative ties in a
/// different cell than the one the dataset was generated with.
#[inline]
fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

/// Snap a projected coordinate to the nearest lattice cell.
///
/// Deterministic and pure: equal inputs always produce the same key, which is what
/// makes registry deduplication work.
///
/// # Errors
///
/// Returns [`Error::NonFiniteProjection`] for non-finite input (a projected pole).
pub fn snap_to_grid(p: ProjectedCoordinate, params: &GridParameters) -> Result<GridCell> {
    if !p.is_finite() {
        return Err(Error::NonFiniteProjection { x: p.x, y: p.y });
    }

    let raw_x = f64::from(params.width) * (p.x - params.x_min) / params.x_range;
    let raw_y = f64::from(params.height) * (params.y_max - p.y) / params.y_range;

    let row = round_half_up(raw_y / params.y_step) as i64;
    let shift = params.row_shift(row);
    let col = round_half_up(raw_x - shift) as i64;

    let key = CellKey::new(col, row);
    let (x, y) = params.cell_position(key);
    Ok(GridCell { key, x, y })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_grid(style: GridStyle) -> GridParameters {
        GridParameters::new(200, 100, -180.0, 90.0, 360.0, 180.0, 1.0, style).unwrap()
    }

    #[test]
    fn test_rejects_zero_step() {
        let err = GridParameters::new(10, 10, 0.0, 0.0, 1.0, 1.0, 0.0, GridStyle::Vertical);
        assert!(matches!(err, Err(Error::InvalidGrid(_))));
    }

    #[test]
    fn test_rejects_bad_ranges() {
        assert!(GridParameters::new(10, 10, 0.0, 0.0, 0.0, 1.0, 1.0, GridStyle::Vertical).is_err());
        assert!(GridParameters::new(10, 10, 0.0, 0.0, 1.0, -1.0, 1.0, GridStyle::Vertical).is_err());
        assert!(GridParameters::new(0, 10, 0.0, 0.0, 1.0, 1.0, 1.0, GridStyle::Vertical).is_err());
        assert!(
            GridParameters::new(10, 10, f64::NAN, 0.0, 1.0, 1.0, 1.0, GridStyle::Vertical).is_err()
        );
    }

    #[test]
    fn test_vertical_snap() {
        let params = unit_grid(GridStyle::Vertical);
        // x: 200 * (10 + 180) / 360 = 105.55.., y: 100 * (90 - 20) / 180 = 38.88..
        let cell = snap_to_grid(ProjectedCoordinate::new(10.0, 20.0), &params).unwrap();
        assert_eq!(cell.key, CellKey::new(106, 39));
        assert_eq!((cell.x, cell.y), (106.0, 39.0));
    }

    #[test]
    fn test_diagonal_even_row_shift() {
        let params = unit_grid(GridStyle::Diagonal);
        // raw_y = 40 (even row), raw_x = 105.55 -> 105.05 -> col 105, x 105.5
        let cell = snap_to_grid(ProjectedCoordinate::new(10.0, 18.0), &params).unwrap();
        assert_eq!(cell.key.row, 40);
        assert_eq!(cell.key.col, 105);
        assert!((cell.x - 105.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_diagonal_odd_row_no_shift() {
        let params = unit_grid(GridStyle::Diagonal);
        let cell = snap_to_grid(ProjectedCoordinate::new(10.0, 20.0), &params).unwrap();
        assert_eq!(cell.key.row, 39);
        assert!((cell.x - 106.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_key_at_inverts_cell_position() {
        let params =
            GridParameters::new(250, 125, -1.0e7, 1.0e7, 2.0e7, 2.0e7, 0.866, GridStyle::Diagonal)
                .unwrap();
        for row in -3..4 {
            for col in [0, 7, 120] {
                let key = CellKey::new(col, row);
                let (x, y) = params.cell_position(key);
                assert_eq!(params.key_at(x, y), key);
            }
        }
    }

    #[test]
    fn test_non_finite_rejected() {
        let params = unit_grid(GridStyle::Vertical);
        let p = ProjectedCoordinate::new(0.0, f64::INFINITY);
        assert!(matches!(
            snap_to_grid(p, &params),
            Err(Error::NonFiniteProjection { .. })
        ));
    }

    #[test]
    fn test_to_projected_corners() {
        let params = unit_grid(GridStyle::Vertical);
        assert_eq!(params.to_projected(0.0, 0.0), ProjectedCoordinate::new(-180.0, 90.0));
        assert_eq!(
            params.to_projected(200.0, 100.0),
            ProjectedCoordinate::new(180.0, -90.0)
        );
    }

    #[test]
    fn test_region_default_contains() {
        let region = Region::default();
        assert!(region.contains(41.7, 44.8));
        assert!(!region.contains(-80.0, 0.0));
        assert!(!region.contains(0.0, 179.5));
    }

    #[test]
    fn test_grid_style_serde() {
        let s: GridStyle = serde_json::from_str("\"diagonal\"").unwrap();
        assert_eq!(s, GridStyle::Diagonal);
        assert_eq!(serde_json::to_string(&GridStyle::Vertical).unwrap(), "\"vertical\"");
    }
}
