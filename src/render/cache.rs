//! Precomputed cell centers for the raster renderer.
//!
//! Centers are stored pre-scaled to the container height they were built for. A
//! width-only resize, a zoom or a pan only changes the affine transform applied at draw
//! time, so the cache survives them; a new container height, a different registry or a
//! modified one triggers a rebuild.

use crate::geometry::Point;
use crate::grid::CellKey;
use crate::projection::Projection;
use crate::registry::PointRegistry;
use tracing::debug;
use trueno::Vector;

/// Cell centers of one registry at one container height.
#[derive(Debug, Clone, Default)]
pub struct HexCache {
    reference_height: Option<u32>,
    registry: Option<(u64, u64)>,
    unit: f64,
    keys: Vec<CellKey>,
    xs: Vec<f32>,
    ys: Vec<f32>,
    rebuilds: usize,
}

impl HexCache {
    /// Empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Container height the cache was built for, if it is valid.
    #[must_use]
    pub fn reference_height(&self) -> Option<u32> {
        self.reference_height
    }

    /// Pixels per grid unit the stored centers are scaled by.
    #[must_use]
    pub fn unit(&self) -> f64 {
        self.unit
    }

    /// Number of times the cache has been (re)built.
    #[must_use]
    pub fn rebuilds(&self) -> usize {
        self.rebuilds
    }

    /// Number of cached cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether no cells are cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Cached cell keys, ordered by row then column.
    #[must_use]
    pub fn keys(&self) -> &[CellKey] {
        &self.keys
    }

    /// Drop the cached centers. The next [`ensure`](Self::ensure) rebuilds.
    pub fn invalidate(&mut self) {
        self.reference_height = None;
        self.registry = None;
        self.keys.clear();
        self.xs.clear();
        self.ys.clear();
    }

    /// Make the cache match `registry` at `container_height`. Returns `true` on rebuild.
    pub fn ensure<P: Projection>(
        &mut self,
        registry: &PointRegistry<P>,
        container_height: u32,
    ) -> bool {
        let source = (registry.id(), registry.revision());
        if self.reference_height == Some(container_height) && self.registry == Some(source) {
            return false;
        }

        let grid_height = f64::from(registry.params().height());
        self.unit = f64::from(container_height) / grid_height;
        self.invalidate();

        // The registry is keyed by cell, so each cell appears once.
        for point in registry.get_points() {
            self.keys.push(point.key);
            self.xs.push((point.x * self.unit) as f32);
            self.ys.push((point.y * self.unit) as f32);
        }

        self.reference_height = Some(container_height);
        self.registry = Some(source);
        self.rebuilds += 1;
        debug!(
            cells = self.keys.len(),
            height = container_height,
            rebuilds = self.rebuilds,
            "rebuilt hexagon cache"
        );
        true
    }

    /// Centers mapped through `p * scale + shift`.
    #[must_use]
    pub fn transformed(&self, scale: f64, shift: Point) -> Vec<Point> {
        let xs = affine(&self.xs, scale as f32, shift.x as f32);
        let ys = affine(&self.ys, scale as f32, shift.y as f32);
        xs.into_iter()
            .zip(ys)
            .map(|(x, y)| Point::new(f64::from(x), f64::from(y)))
            .collect()
    }
}

/// `values * scale + shift`, vectorised through trueno.
fn affine(values: &[f32], scale: f32, shift: f32) -> Vec<f32> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }
    let v = Vector::from_vec(values.to_vec());
    if let Ok(scaled) = v.mul(&Vector::from_vec(vec![scale; n])) {
        if let Ok(result) = scaled.add(&Vector::from_vec(vec![shift; n])) {
            return result.as_slice().to_vec();
        }
    }
    values.iter().map(|&x| x * scale + shift).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridParameters, GridStyle, Region};
    use crate::registry::{GridPoint, PointKind};

    fn registry() -> PointRegistry {
        let params =
            GridParameters::new(20, 10, 0.0, 10.0, 20.0, 10.0, 1.0, GridStyle::Vertical).unwrap();
        let mut registry = PointRegistry::new(params, Region::default());
        for (col, row) in [(2, 1), (4, 3), (19, 9)] {
            registry.insert(GridPoint {
                key: CellKey::new(col, row),
                x: col as f64,
                y: row as f64,
                lat: 0.0,
                lng: 0.0,
                kind: PointKind::Background,
            });
        }
        registry
    }

    #[test]
    fn test_build_scales_to_height() {
        let registry = registry();
        let mut cache = HexCache::new();
        assert!(cache.ensure(&registry, 100));
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.reference_height(), Some(100));
        assert_eq!(cache.unit(), 10.0);

        let centers = cache.transformed(1.0, Point::ORIGIN);
        assert_eq!(centers[0], Point::new(20.0, 10.0));
        assert_eq!(centers[2], Point::new(190.0, 90.0));
    }

    #[test]
    fn test_reused_for_same_height() {
        let registry = registry();
        let mut cache = HexCache::new();
        assert!(cache.ensure(&registry, 100));
        assert!(!cache.ensure(&registry, 100));
        assert_eq!(cache.rebuilds(), 1);
    }

    #[test]
    fn test_rebuilt_on_height_change() {
        let registry = registry();
        let mut cache = HexCache::new();
        cache.ensure(&registry, 100);
        assert!(cache.ensure(&registry, 50));
        assert_eq!(cache.rebuilds(), 2);
        assert_eq!(cache.unit(), 5.0);
    }

    #[test]
    fn test_rebuilt_on_registry_change() {
        let mut registry = registry();
        let mut cache = HexCache::new();
        cache.ensure(&registry, 100);
        registry.insert(GridPoint {
            key: CellKey::new(5, 5),
            x: 5.0,
            y: 5.0,
            lat: 0.0,
            lng: 0.0,
            kind: PointKind::Background,
        });
        assert!(cache.ensure(&registry, 100));
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn test_rebuilt_for_other_registry_at_same_revision() {
        let a = registry();
        let mut b = registry();
        b.insert(GridPoint {
            key: CellKey::new(7, 7),
            x: 7.0,
            y: 7.0,
            lat: 0.0,
            lng: 0.0,
            kind: PointKind::Background,
        });
        let mut c = PointRegistry::new(*a.params(), Region::default());
        for _ in 0..a.revision() {
            c.insert(GridPoint {
                key: CellKey::new(11, 2),
                x: 11.0,
                y: 2.0,
                lat: 0.0,
                lng: 0.0,
                kind: PointKind::Background,
            });
        }
        assert_eq!(a.revision(), c.revision());
        assert_ne!(a.id(), c.id());

        let mut cache = HexCache::new();
        cache.ensure(&a, 100);
        assert!(cache.ensure(&c, 100));
        assert_eq!(cache.keys(), &[CellKey::new(11, 2)]);
        assert!(cache.ensure(&b, 100));
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn test_clone_is_a_different_registry() {
        let a = registry();
        let copy = a.clone();
        assert_ne!(a.id(), copy.id());
        let mut cache = HexCache::new();
        cache.ensure(&a, 100);
        assert!(cache.ensure(&copy, 100));
    }

    #[test]
    fn test_invalidate() {
        let registry = registry();
        let mut cache = HexCache::new();
        cache.ensure(&registry, 100);
        cache.invalidate();
        assert!(cache.is_empty());
        assert_eq!(cache.reference_height(), None);
        assert!(cache.ensure(&registry, 100));
    }

    #[test]
    fn test_transformed_applies_affine() {
        let registry = registry();
        let mut cache = HexCache::new();
        cache.ensure(&registry, 10);
        let centers = cache.transformed(2.0, Point::new(5.0, -1.0));
        assert_eq!(centers[1], Point::new(13.0, 5.0));
    }

    #[test]
    fn test_affine_empty() {
        assert!(affine(&[], 2.0, 1.0).is_empty());
    }
}
