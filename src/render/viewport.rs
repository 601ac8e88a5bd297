//! Pan and zoom state of an interactive map.
//!
//! The map is fitted into its container (`base = min(cw/gw, ch/gh)`), then magnified by
//! `zoom`. `offset` is a translation in grid units measured from the grid center, and is
//! clamped after every change so the map never scrolls past its own edges:
//!
//! ```text
//! screen = container / 2 + (p - grid / 2 + offset) * base * zoom
//! ```

use crate::error::{Error, Result};
use crate::geometry::Point;
use serde::{Deserialize, Serialize};

/// Smallest zoom factor (whole map visible).
pub const MIN_ZOOM: f64 = 1.0;
/// Largest zoom factor.
pub const MAX_ZOOM: f64 = 10.0;
/// Factor applied by one zoom-in or zoom-out step.
pub const ZOOM_STEP: f64 = 1.5;
/// Pointer travel, in logical pixels, beyond which a press becomes a pan.
pub const DRAG_THRESHOLD: f64 = 5.0;

/// Tunable interaction limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportLimits {
    /// Smallest zoom factor.
    pub min_zoom: f64,
    /// Largest zoom factor.
    pub max_zoom: f64,
    /// Multiplier per zoom step.
    pub zoom_step: f64,
    /// Click/pan threshold in logical pixels.
    pub drag_threshold: f64,
}

impl Default for ViewportLimits {
    fn default() -> Self {
        Self {
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            zoom_step: ZOOM_STEP,
            drag_threshold: DRAG_THRESHOLD,
        }
    }
}

impl ViewportLimits {
    /// Check that the limits describe a usable zoom range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] unless `0 < min_zoom <= max_zoom`,
    /// `zoom_step > 1` and `drag_threshold >= 0`, all finite.
    pub fn validate(&self) -> Result<()> {
        if !(self.min_zoom.is_finite() && self.min_zoom > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "min_zoom must be positive, got {}",
                self.min_zoom
            )));
        }
        if !(self.max_zoom.is_finite() && self.max_zoom >= self.min_zoom) {
            return Err(Error::InvalidConfig(format!(
                "max_zoom ({}) must be at least min_zoom ({})",
                self.max_zoom, self.min_zoom
            )));
        }
        if !(self.zoom_step.is_finite() && self.zoom_step > 1.0) {
            return Err(Error::InvalidConfig(format!(
                "zoom_step must be greater than 1, got {}",
                self.zoom_step
            )));
        }
        if !(self.drag_threshold.is_finite() && self.drag_threshold >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "drag_threshold must be non-negative, got {}",
                self.drag_threshold
            )));
        }
        Ok(())
    }
}

/// Snapshot of the transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    /// Zoom factor in `[min_zoom, max_zoom]`.
    pub zoom: f64,
    /// Translation in grid units.
    pub offset: Point,
    /// Effective scale, logical pixels per grid unit.
    pub scale: f64,
}

/// Result of a completed pointer interaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// The pointer moved less than the drag threshold.
    Click {
        /// Release position in logical pixels.
        screen: Point,
        /// Release position in grid units.
        grid: Point,
    },
    /// The pointer dragged the map.
    Pan {
        /// Total horizontal travel in logical pixels.
        dx: f64,
        /// Total vertical travel in logical pixels.
        dy: f64,
    },
}

#[derive(Debug, Clone, Copy)]
struct Press {
    start: Point,
    last: Point,
    panning: bool,
}

/// Zoom, offset and pointer tracking for one map view.
#[derive(Debug, Clone)]
pub struct Viewport {
    limits: ViewportLimits,
    grid_width: f64,
    grid_height: f64,
    container_width: f64,
    container_height: f64,
    zoom: f64,
    offset: Point,
    press: Option<Press>,
}

impl Viewport {
    /// Viewport for a `grid_width` x `grid_height` map with no container yet.
    #[must_use]
    pub fn new(grid_width: f64, grid_height: f64, limits: ViewportLimits) -> Self {
        Self {
            limits,
            grid_width,
            grid_height,
            container_width: 0.0,
            container_height: 0.0,
            zoom: limits.min_zoom,
            offset: Point::ORIGIN,
            press: None,
        }
    }

    /// Interaction limits.
    #[must_use]
    pub fn limits(&self) -> ViewportLimits {
        self.limits
    }

    /// Current zoom factor.
    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Current offset in grid units.
    #[must_use]
    pub fn offset(&self) -> Point {
        self.offset
    }

    /// Container size in logical pixels.
    #[must_use]
    pub fn container(&self) -> (f64, f64) {
        (self.container_width, self.container_height)
    }

    /// Grid size in grid units.
    #[must_use]
    pub fn grid(&self) -> (f64, f64) {
        (self.grid_width, self.grid_height)
    }

    /// Transform snapshot.
    #[must_use]
    pub fn state(&self) -> ViewportState {
        ViewportState {
            zoom: self.zoom,
            offset: self.offset,
            scale: self.effective_scale(),
        }
    }

    /// Scale at which the whole grid fits the container.
    #[must_use]
    pub fn base_scale(&self) -> f64 {
        if self.grid_width <= 0.0 || self.grid_height <= 0.0 {
            return 0.0;
        }
        (self.container_width / self.grid_width).min(self.container_height / self.grid_height)
    }

    /// Logical pixels per grid unit at the current zoom.
    #[must_use]
    pub fn effective_scale(&self) -> f64 {
        self.base_scale() * self.zoom
    }

    /// Set the container size and re-clamp the offset.
    pub fn set_container(&mut self, width: f64, height: f64) {
        self.container_width = width.max(0.0);
        self.container_height = height.max(0.0);
        self.clamp_offset();
    }

    /// Set the grid size and re-clamp the offset.
    pub fn set_grid(&mut self, width: f64, height: f64) {
        self.grid_width = width;
        self.grid_height = height;
        self.clamp_offset();
    }

    /// Largest `|offset|` per axis that keeps the map covering the container.
    #[must_use]
    pub fn offset_bounds(&self) -> (f64, f64) {
        let scale = self.effective_scale();
        if scale <= 0.0 {
            return (0.0, 0.0);
        }
        let bx = ((self.grid_width - self.container_width / scale) / 2.0).max(0.0);
        let by = ((self.grid_height - self.container_height / scale) / 2.0).max(0.0);
        (bx, by)
    }

    fn clamp_offset(&mut self) {
        let (bx, by) = self.offset_bounds();
        self.offset = Point::new(self.offset.x.clamp(-bx, bx), self.offset.y.clamp(-by, by));
    }

    /// Set the zoom factor, saturating at the limits.
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        if zoom.is_finite() {
            // max/min rather than clamp: unchecked limits must not panic here.
            self.zoom = zoom.min(self.limits.max_zoom).max(self.limits.min_zoom);
            self.clamp_offset();
        }
        self.zoom
    }

    /// Zoom in one step.
    pub fn zoom_in(&mut self) -> f64 {
        self.set_zoom(self.zoom * self.limits.zoom_step)
    }

    /// Zoom out one step.
    pub fn zoom_out(&mut self) -> f64 {
        self.set_zoom(self.zoom / self.limits.zoom_step)
    }

    /// Translate by a screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let scale = self.effective_scale();
        if scale <= 0.0 {
            return;
        }
        self.offset = Point::new(self.offset.x + dx / scale, self.offset.y + dy / scale);
        self.clamp_offset();
    }

    /// Back to the fitted, centered view.
    pub fn reset(&mut self) {
        self.zoom = self.limits.min_zoom;
        self.offset = Point::ORIGIN;
        self.press = None;
    }

    /// Grid position to logical screen position.
    #[must_use]
    pub fn to_screen(&self, p: Point) -> Point {
        let scale = self.effective_scale();
        Point::new(
            self.container_width / 2.0 + (p.x - self.grid_width / 2.0 + self.offset.x) * scale,
            self.container_height / 2.0 + (p.y - self.grid_height / 2.0 + self.offset.y) * scale,
        )
    }

    /// Logical screen position to grid position.
    ///
    /// Returns the grid center when there is no container to invert against.
    #[must_use]
    pub fn to_grid(&self, screen: Point) -> Point {
        let scale = self.effective_scale();
        if scale <= 0.0 {
            return Point::new(self.grid_width / 2.0, self.grid_height / 2.0);
        }
        Point::new(
            (screen.x - self.container_width / 2.0) / scale + self.grid_width / 2.0
                - self.offset.x,
            (screen.y - self.container_height / 2.0) / scale + self.grid_height / 2.0
                - self.offset.y,
        )
    }

    /// Start tracking a press.
    pub fn pointer_down(&mut self, x: f64, y: f64) {
        let at = Point::new(x, y);
        self.press = Some(Press {
            start: at,
            last: at,
            panning: false,
        });
    }

    /// Follow the pointer. Returns `true` once the press has turned into a pan.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        let Some(mut press) = self.press else {
            return false;
        };
        let at = Point::new(x, y);
        if !press.panning && press.start.distance(at) > self.limits.drag_threshold {
            press.panning = true;
        }
        if press.panning {
            self.pan_by(at.x - press.last.x, at.y - press.last.y);
            press.last = at;
        }
        self.press = Some(press);
        press.panning
    }

    /// Finish the press and classify it. `None` if no press was in progress.
    pub fn pointer_up(&mut self, x: f64, y: f64) -> Option<Gesture> {
        let press = self.press.take()?;
        let at = Point::new(x, y);
        let panning = press.panning || press.start.distance(at) > self.limits.drag_threshold;
        if panning {
            self.pan_by(at.x - press.last.x, at.y - press.last.y);
            Some(Gesture::Pan {
                dx: at.x - press.start.x,
                dy: at.y - press.start.y,
            })
        } else {
            Some(Gesture::Click {
                screen: at,
                grid: self.to_grid(at),
            })
        }
    }

    /// Whether a press is being tracked.
    #[must_use]
    pub fn is_pressed(&self) -> bool {
        self.press.is_some()
    }
}
