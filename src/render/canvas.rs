//! Interactive raster renderer.
//!
//! [`CanvasRenderer`] draws a registry onto an RGBA [`Framebuffer`] sized in physical
//! pixels (`ceil(container * device_pixel_ratio)`), and owns the pan/zoom state, the
//! hexagon cache and the resize throttle of one map view.
//!
//! # Example
//!
//! ```
//! use hexdot::grid::{GridParameters, GridStyle, Region};
//! use hexdot::projection::GeoCoordinate;
//! use hexdot::registry::{PinStyle, PointRegistry};
//! use hexdot::render::{CanvasRenderer, CanvasStyle};
//!
//! let params = GridParameters::new(200, 100, -180.0, 90.0, 360.0, 180.0, 1.0, GridStyle::Diagonal)
//!     .unwrap();
//! let mut registry = PointRegistry::new(params, Region::default());
//! registry
//!     .add_pin(GeoCoordinate::new(10.0, 20.0).unwrap(), None, PinStyle::default())
//!     .unwrap();
//!
//! let mut renderer = CanvasRenderer::new(200, 100, CanvasStyle::default());
//! renderer.attach(400, 200, 2.0).unwrap();
//! renderer.draw(&registry).unwrap();
//! assert_eq!(renderer.surface().unwrap().width(), 800);
//! ```

use super::cache::HexCache;
use super::primitives::{fill_circle, Shape};
use super::throttle::ResizeThrottle;
use super::viewport::{Gesture, Viewport, ViewportLimits, ViewportState};
use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::framebuffer::Framebuffer;
use crate::geometry::Point;
use crate::projection::Projection;
use crate::registry::{GridPoint, PointRegistry};
use std::time::{Duration, Instant};
use tracing::debug;

/// Colors and sizes used by the raster renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasStyle {
    /// Shape of background cells.
    pub shape: Shape,
    /// Background cell color.
    pub color: Rgba,
    /// Surface clear color.
    pub background: Rgba,
    /// Default pin color.
    pub pin_color: Rgba,
    /// Background cell radius in grid units.
    pub radius: f64,
    /// Default pin radius in grid units.
    pub pin_radius: f64,
}

impl Default for CanvasStyle {
    fn default() -> Self {
        Self {
            shape: Shape::Hexagon,
            color: Rgba::rgb(0x7e, 0x7e, 0x7e),
            background: Rgba::TRANSPARENT,
            pin_color: Rgba::rgb(0xd6, 0xff, 0x79),
            radius: 0.25,
            pin_radius: 0.25,
        }
    }
}

#[derive(Debug, Clone)]
struct Surface {
    framebuffer: Framebuffer,
    width: u32,
    height: u32,
    dpr: f64,
}

/// Stateful renderer for one map view.
#[derive(Debug, Clone)]
pub struct CanvasRenderer {
    style: CanvasStyle,
    viewport: Viewport,
    cache: HexCache,
    throttle: ResizeThrottle,
    epoch: Option<Instant>,
    surface: Option<Surface>,
}

impl CanvasRenderer {
    /// Renderer for a `grid_width` x `grid_height` map, with default limits.
    #[must_use]
    pub fn new(grid_width: u32, grid_height: u32, style: CanvasStyle) -> Self {
        Self {
            style,
            viewport: Viewport::new(
                f64::from(grid_width),
                f64::from(grid_height),
                ViewportLimits::default(),
            ),
            cache: HexCache::new(),
            throttle: ResizeThrottle::default(),
            epoch: None,
            surface: None,
        }
    }

    /// Replace the zoom and drag limits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the limits fail
    /// [`ViewportLimits::validate`].
    pub fn with_limits(mut self, limits: ViewportLimits) -> Result<Self> {
        limits.validate()?;
        let (gw, gh) = self.viewport.grid();
        let (cw, ch) = self.viewport.container();
        self.viewport = Viewport::new(gw, gh, limits);
        self.viewport.set_container(cw, ch);
        Ok(self)
    }

    /// Replace the minimum time between applied resizes.
    #[must_use]
    pub fn with_resize_interval(mut self, interval: Duration) -> Self {
        self.throttle = ResizeThrottle::new(interval);
        self
    }

    /// Drawing style.
    #[must_use]
    pub fn style(&self) -> &CanvasStyle {
        &self.style
    }

    /// Pan/zoom state.
    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Transform snapshot.
    #[must_use]
    pub fn state(&self) -> ViewportState {
        self.viewport.state()
    }

    /// Hexagon center cache.
    #[must_use]
    pub fn cache(&self) -> &HexCache {
        &self.cache
    }

    /// The attached surface, if any.
    #[must_use]
    pub fn surface(&self) -> Option<&Framebuffer> {
        self.surface.as_ref().map(|s| &s.framebuffer)
    }

    /// Whether a surface is attached.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.surface.is_some()
    }

    /// Attach (or resize) the drawing surface for a container of `width` x `height`
    /// logical pixels.
    ///
    /// A non-finite or non-positive `device_pixel_ratio` is treated as 1.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if the container is empty.
    pub fn attach(&mut self, width: u32, height: u32, device_pixel_ratio: f64) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            debug!(device_pixel_ratio, "invalid device pixel ratio, using 1");
            1.0
        };

        let physical_w = (f64::from(width) * dpr).ceil() as u32;
        let physical_h = (f64::from(height) * dpr).ceil() as u32;
        let reuse = self.surface.as_ref().is_some_and(|s| {
            s.framebuffer.width() == physical_w && s.framebuffer.height() == physical_h
        });
        let framebuffer = match self.surface.take() {
            Some(s) if reuse => s.framebuffer,
            _ => Framebuffer::new(physical_w, physical_h)?,
        };

        self.surface = Some(Surface {
            framebuffer,
            width,
            height,
            dpr,
        });
        self.viewport.set_container(f64::from(width), f64::from(height));
        debug!(width, height, dpr, physical_w, physical_h, "attached surface");
        Ok(())
    }

    /// Drop the drawing surface. Interaction state is kept.
    pub fn detach(&mut self) {
        self.surface = None;
    }

    /// Draw `registry` onto the attached surface.
    ///
    /// Background cells are drawn in key order with the style shape, then every pin is
    /// drawn on top as a filled circle. Does nothing when no surface is attached.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidColor`] if a pin carries a color that is not a CSS color
    /// this renderer understands. Nothing is drawn in that case.
    pub fn draw<P: Projection>(&mut self, registry: &PointRegistry<P>) -> Result<()> {
        let Some(surface) = self.surface.as_mut() else {
            debug!("no surface attached, skipping draw");
            return Ok(());
        };

        let pins = registry.pins();
        let pin_colors = pins
            .iter()
            .map(|pin| match pin.color() {
                Some(css) => Rgba::from_css(css, self.style.pin_color),
                None => Ok(self.style.pin_color),
            })
            .collect::<Result<Vec<_>>>()?;

        let image = registry.image();
        let grid = (f64::from(image.width), f64::from(image.height));
        if grid != self.viewport.grid() {
            self.viewport.set_grid(grid.0, grid.1);
            self.cache.invalidate();
        }
        self.cache.ensure(registry, surface.height);

        let state = self.viewport.state();
        let dpr = surface.dpr;
        let pixels_per_unit = state.scale * dpr;
        let origin = physical_origin(&self.viewport, dpr);

        let fb = &mut surface.framebuffer;
        fb.clear(self.style.background);

        let cell_radius = self.style.radius * pixels_per_unit;
        let margin = cell_radius * 2.0;
        let (fw, fh) = (f64::from(fb.width()), f64::from(fb.height()));
        let centers = self
            .cache
            .transformed(pixels_per_unit / self.cache.unit(), origin);
        let mut drawn = 0usize;
        for center in centers {
            let visible = (-margin..=fw + margin).contains(&center.x)
                && (-margin..=fh + margin).contains(&center.y);
            if !visible {
                continue;
            }
            self.style.shape.fill(fb, center, cell_radius, self.style.color);
            drawn += 1;
        }

        for (pin, color) in pins.iter().zip(pin_colors) {
            let center = Point::new(
                origin.x + pin.x * pixels_per_unit,
                origin.y + pin.y * pixels_per_unit,
            );
            let radius = pin.radius().unwrap_or(self.style.pin_radius) * pixels_per_unit;
            fill_circle(fb, center, radius, color);
        }

        debug!(
            cells = self.cache.len(),
            drawn,
            pins = pins.len(),
            zoom = state.zoom,
            "drew map"
        );
        Ok(())
    }

    /// Zoom in one step. Returns the new zoom factor.
    pub fn zoom_in(&mut self) -> f64 {
        self.viewport.zoom_in()
    }

    /// Zoom out one step. Returns the new zoom factor.
    pub fn zoom_out(&mut self) -> f64 {
        self.viewport.zoom_out()
    }

    /// Double click zooms in.
    pub fn double_click(&mut self) -> f64 {
        self.zoom_in()
    }

    /// Pointer pressed at logical `(x, y)`.
    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.viewport.pointer_down(x, y);
    }

    /// Pointer moved. Returns `true` while the press is panning the map.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.viewport.pointer_move(x, y)
    }

    /// Pointer released. `None` if no press was in progress.
    pub fn pointer_up(&mut self, x: f64, y: f64) -> Option<Gesture> {
        self.viewport.pointer_up(x, y)
    }

    /// Logical screen position to grid position.
    #[must_use]
    pub fn screen_to_grid(&self, x: f64, y: f64) -> Point {
        self.viewport.to_grid(Point::new(x, y))
    }

    /// The pin whose cell contains logical screen position `(x, y)`.
    #[must_use]
    pub fn hit_test<'a, P: Projection>(
        &self,
        registry: &'a PointRegistry<P>,
        x: f64,
        y: f64,
    ) -> Option<&'a GridPoint> {
        let p = self.screen_to_grid(x, y);
        let key = registry.params().key_at(p.x, p.y);
        registry.get(key).filter(|point| point.is_pin())
    }

    /// Request a container resize at monotonic timestamp `now`, measured from any fixed
    /// origin (`performance.now()` in a browser).
    ///
    /// Resizes closer together than the throttle interval are held back; the latest one
    /// is applied by [`flush_resize_at`](Self::flush_resize_at). Returns whether the
    /// resize was applied.
    pub fn resize_at(&mut self, width: u32, height: u32, now: Duration) -> Result<bool> {
        if !self.throttle.offer(width, height, now) {
            return Ok(false);
        }
        self.apply_resize(width, height)?;
        Ok(true)
    }

    /// Apply a held-back resize once the throttle interval has passed.
    pub fn flush_resize_at(&mut self, now: Duration) -> Result<bool> {
        match self.throttle.flush(now) {
            Some((width, height)) => {
                self.apply_resize(width, height)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// [`resize_at`](Self::resize_at) on the native clock. The first `Instant` seen is
    /// the origin; do not mix with `resize_at` timestamps on one renderer.
    pub fn resize(&mut self, width: u32, height: u32, now: Instant) -> Result<bool> {
        let now = self.since_epoch(now);
        self.resize_at(width, height, now)
    }

    /// [`flush_resize_at`](Self::flush_resize_at) on the native clock.
    pub fn flush_resize(&mut self, now: Instant) -> Result<bool> {
        let now = self.since_epoch(now);
        self.flush_resize_at(now)
    }

    fn since_epoch(&mut self, now: Instant) -> Duration {
        now.saturating_duration_since(*self.epoch.get_or_insert(now))
    }

    fn apply_resize(&mut self, width: u32, height: u32) -> Result<()> {
        match self.surface.as_ref().map(|s| (s.width, s.height, s.dpr)) {
            Some((w, h, _)) if (w, h) == (width, height) => Ok(()),
            Some((_, _, dpr)) => self.attach(width, height, dpr),
            None => {
                self.viewport.set_container(f64::from(width), f64::from(height));
                Ok(())
            }
        }
    }
}

/// Physical position of grid point `(0, 0)`.
fn physical_origin(viewport: &Viewport, dpr: f64) -> Point {
    let screen = viewport.to_screen(Point::ORIGIN);
    Point::new(screen.x * dpr, screen.y * dpr)
}
