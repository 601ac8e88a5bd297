//! Map renderers.
//!
//! - [`render_svg`]: one SVG element per registry cell, scalable and stateless.
//! - [`CanvasRenderer`]: raster drawing onto a [`Framebuffer`](crate::framebuffer::Framebuffer)
//!   with device-pixel-ratio scaling, pan, zoom and click hit testing.
//!
//! Both draw background cells first and pins last, so pins always sit on top.

mod cache;
mod canvas;
mod primitives;
mod throttle;
mod vector;
mod viewport;

pub use cache::HexCache;
pub use canvas::{CanvasRenderer, CanvasStyle};
pub use primitives::{fill_circle, fill_convex_polygon, fill_hexagon, Shape};
pub use throttle::{ResizeThrottle, RESIZE_INTERVAL};
pub use vector::{render_svg, render_svg_to_file, SvgSettings};
pub use viewport::{
    Gesture, Viewport, ViewportLimits, ViewportState, DRAG_THRESHOLD, MAX_ZOOM, MIN_ZOOM,
    ZOOM_STEP,
};
