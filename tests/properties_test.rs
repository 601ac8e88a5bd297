//! Property-based tests for projection, snapping, the registry and the viewport.
//!
//! Run: cargo test --test properties_test

#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;
use std::f64::consts::PI;

use hexdot::geometry::{hexagon_vertices, Point};
use hexdot::grid::{CellKey, GridParameters, GridStyle, Region};
use hexdot::projection::{GeoCoordinate, Projection, WebMercator, EARTH_RADIUS};
use hexdot::registry::{PinStyle, PointRegistry};
use hexdot::render::{Viewport, ViewportLimits, MAX_ZOOM, MIN_ZOOM};
use proptest::prelude::*;

/// 200x100 world grid in Web Mercator meters, north edge near 66°N.
fn world_registry(style: GridStyle) -> PointRegistry {
    let half = PI * EARTH_RADIUS;
    let params =
        GridParameters::new(200, 100, -half, half / 2.0, 2.0 * half, half, 1.0, style).unwrap();
    PointRegistry::new(params, Region::default())
}

fn grid_style() -> impl Strategy<Value = GridStyle> {
    prop_oneof![Just(GridStyle::Diagonal), Just(GridStyle::Vertical)]
}

// ============================================================================
// Projection and snapping
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_projection_round_trip(lat in -85.0f64..85.0, lng in -180.0f64..180.0) {
        let geo = GeoCoordinate::new(lat, lng).unwrap();
        let back = WebMercator.unproject(WebMercator.project(geo));
        prop_assert!((back.lat - lat).abs() < 1e-6);
        prop_assert!((back.lng - lng).abs() < 1e-6);
    }

    #[test]
    fn prop_snap_is_deterministic(
        lat in -60.0f64..60.0,
        lng in -180.0f64..180.0,
        style in grid_style(),
    ) {
        let registry = world_registry(style);
        let geo = GeoCoordinate::new(lat, lng).unwrap();
        let a = registry.get_pin(geo).unwrap();
        let b = registry.get_pin(geo).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_cell_center_snaps_to_itself(
        lat in -60.0f64..60.0,
        lng in -179.0f64..179.0,
        style in grid_style(),
    ) {
        let registry = world_registry(style);
        let cell = registry.get_pin(GeoCoordinate::new(lat, lng).unwrap()).unwrap();
        let center = GeoCoordinate::new(cell.lat, cell.lng).unwrap();
        let again = registry.get_pin(center).unwrap();
        prop_assert_eq!(again.key, cell.key);
        prop_assert_eq!(registry.params().key_at(cell.x, cell.y), cell.key);
    }
}

// ============================================================================
// Registry
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_one_entry_per_cell_last_write_wins(
        coords in prop::collection::vec((-60.0f64..60.0, -180.0f64..180.0), 1..40),
    ) {
        let mut registry = world_registry(GridStyle::Diagonal);
        let mut expected: BTreeMap<CellKey, usize> = BTreeMap::new();

        for (i, (lat, lng)) in coords.iter().enumerate() {
            let geo = GeoCoordinate::new(*lat, *lng).unwrap();
            let pin = registry
                .add_pin(geo, Some(serde_json::json!(i)), PinStyle::default())
                .unwrap();
            expected.insert(pin.key, i);
        }

        prop_assert_eq!(registry.len(), expected.len());
        prop_assert_eq!(registry.collisions(), coords.len() - expected.len());
        for (key, i) in &expected {
            let stored = registry.get(*key).unwrap();
            prop_assert_eq!(stored.data().unwrap(), &serde_json::json!(*i));
        }

        let keys: Vec<CellKey> = registry.get_points().iter().map(|p| p.key).collect();
        let sorted: Vec<CellKey> = expected.keys().copied().collect();
        prop_assert_eq!(keys, sorted);
    }
}

// ============================================================================
// Geometry
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_hexagon_is_centrally_symmetric(
        x in -1000.0f64..1000.0,
        y in -1000.0f64..1000.0,
        r in 0.01f64..50.0,
    ) {
        let center = Point::new(x, y);
        let v = hexagon_vertices(center, r);
        for i in 0..3 {
            let opposite = v[i + 3];
            prop_assert!((v[i].x + opposite.x - 2.0 * x).abs() < 1e-9);
            prop_assert!((v[i].y + opposite.y - 2.0 * y).abs() < 1e-9);
        }
        for vertex in &v {
            prop_assert!((vertex.distance(center) - 2.0 * r).abs() < 1e-9 * (1.0 + r));
        }
    }
}

// ============================================================================
// Viewport
// ============================================================================

fn viewport(cw: f64, ch: f64) -> Viewport {
    let mut vp = Viewport::new(200.0, 100.0, ViewportLimits::default());
    vp.set_container(cw, ch);
    vp
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_zoom_stays_in_limits(steps in prop::collection::vec(any::<bool>(), 0..40)) {
        let mut vp = viewport(800.0, 400.0);
        for zoom_in in steps {
            let zoom = if zoom_in { vp.zoom_in() } else { vp.zoom_out() };
            prop_assert!((MIN_ZOOM..=MAX_ZOOM).contains(&zoom));
        }
        while vp.zoom() > MIN_ZOOM {
            vp.zoom_out();
        }
        let before = vp.state();
        prop_assert_eq!(vp.zoom_out(), MIN_ZOOM);
        prop_assert_eq!(vp.state(), before);
    }

    #[test]
    fn prop_pan_stays_in_bounds(
        zoom_steps in 0usize..8,
        pans in prop::collection::vec((-500.0f64..500.0, -500.0f64..500.0), 1..20),
        cw in 100.0f64..1200.0,
        ch in 100.0f64..800.0,
    ) {
        let mut vp = viewport(cw, ch);
        for _ in 0..zoom_steps {
            vp.zoom_in();
        }
        for (dx, dy) in pans {
            vp.pan_by(dx, dy);
            let (bx, by) = vp.offset_bounds();
            let offset = vp.offset();
            prop_assert!(offset.x.abs() <= bx + 1e-9);
            prop_assert!(offset.y.abs() <= by + 1e-9);
        }
        // Zooming out shrinks the bounds; the offset follows.
        vp.zoom_out();
        let (bx, by) = vp.offset_bounds();
        prop_assert!(vp.offset().x.abs() <= bx + 1e-9);
        prop_assert!(vp.offset().y.abs() <= by + 1e-9);
    }

    #[test]
    fn prop_screen_grid_round_trip(
        zoom_steps in 0usize..6,
        dx in -300.0f64..300.0,
        dy in -300.0f64..300.0,
        gx in 0.0f64..200.0,
        gy in 0.0f64..100.0,
    ) {
        let mut vp = viewport(640.0, 480.0);
        for _ in 0..zoom_steps {
            vp.zoom_in();
        }
        vp.pan_by(dx, dy);
        let p = Point::new(gx, gy);
        let back = vp.to_grid(vp.to_screen(p));
        prop_assert!((back.x - gx).abs() < 1e-9);
        prop_assert!((back.y - gy).abs() < 1e-9);
    }
}
