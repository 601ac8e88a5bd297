//! # hexdot
//!
//! Dotted world maps: geographic pins snapped onto a hexagonal land-mass grid.
//!
//! A precomputed base grid of land cells is loaded from JSON, pins are projected with
//! spherical Web Mercator and snapped onto the same lattice, and the result is rendered
//! as an SVG document or onto an RGBA framebuffer with pan, zoom and device-pixel-ratio
//! handling.
//!
//! ## Quick Start
//!
//! ```rust
//! use hexdot::prelude::*;
//!
//! let params = GridParameters::new(200, 100, -180.0, 90.0, 360.0, 180.0, 1.0, GridStyle::Diagonal)
//!     .unwrap();
//! let mut registry = PointRegistry::new(params, Region::default());
//!
//! let pin = registry
//!     .add_pin(GeoCoordinate::new(41.749, 44.799).unwrap(), None, PinStyle::new("#d6ff79", 0.25))
//!     .unwrap();
//! assert!(pin.is_pin());
//!
//! let svg = render_svg(&registry, &SvgSettings { shape: Shape::Hexagon, ..SvgSettings::default() });
//! assert!(svg.contains("<polygon"));
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): the `hexdot` command-line tool
//! - `wasm`: browser bindings (SVG markup, raster pixels, pointer gestures)

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only - banned in production code
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Core Modules
// ============================================================================

/// Color types and CSS color parsing.
pub mod color;

/// Error types.
pub mod error;

/// Screen-space points, rectangles and hexagon vertices.
pub mod geometry;

// ============================================================================
// Map Model
// ============================================================================

/// Geographic to planar projection.
pub mod projection;

/// Lattice parameters and grid snapping.
pub mod grid;

/// Cell-keyed store of background cells and pins.
pub mod registry;

/// Base grid dataset format.
pub mod dataset;

/// Offline base grid generation from land polygons.
pub mod generate;

/// YAML configuration.
pub mod config;

// ============================================================================
// Rendering Modules
// ============================================================================

/// Core framebuffer for pixel rendering.
pub mod framebuffer;

/// SVG and raster map renderers.
pub mod render;

/// Output encoders (PNG, SVG).
pub mod output;

/// WebAssembly bindings for browser usage.
#[cfg(feature = "wasm")]
#[cfg_attr(docsrs, doc(cfg(feature = "wasm")))]
pub mod wasm;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::color::Rgba;
    pub use crate::config::{MapConfig, PinSpec};
    pub use crate::dataset::BaseGrid;
    pub use crate::error::{Error, Result};
    pub use crate::framebuffer::Framebuffer;
    pub use crate::generate::{generate_base_grid, GenerateSettings, LandMask};
    pub use crate::grid::{snap_to_grid, CellKey, GridParameters, GridStyle, Region};
    pub use crate::output::{PngEncoder, SvgEncoder};
    pub use crate::projection::{GeoCoordinate, ProjectedCoordinate, Projection, WebMercator};
    pub use crate::registry::{GridPoint, PinStyle, PointKind, PointRegistry};
    pub use crate::render::{
        render_svg, CanvasRenderer, CanvasStyle, Gesture, Shape, SvgSettings, ViewportLimits,
    };
}
