//! YAML configuration.
//!
//! Every field has a default, so an empty document is a valid configuration. Command-line
//! flags override the file, and the file overrides the defaults.
//!
//! ```yaml
//! dataset:
//!   path: world.json
//!   avoid_outer_pins: true
//! svg:
//!   shape: hexagon
//!   color: "#7e7e7e"
//!   radius: 0.25
//! pins:
//!   - { lat: 41.749, lng: 44.799, color: "#d6ff79", data: { name: Tbilisi } }
//! canvas:
//!   width: 1200
//!   height: 600
//!   dpr: 2.0
//! viewport:
//!   max_zoom: 8
//! ```

use crate::color::Rgba;
use crate::dataset::BaseGrid;
use crate::error::{Error, Result};
use crate::projection::GeoCoordinate;
use crate::registry::{PinData, PinStyle, PointRegistry};
use crate::render::{CanvasStyle, Shape, SvgSettings, ViewportLimits};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Base dataset settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Path of the base grid JSON.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Reject pins outside the dataset region.
    #[serde(default)]
    pub avoid_outer_pins: bool,
}

/// A pin to place on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinSpec {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
    /// Opaque payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<PinData>,
    /// CSS fill color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Radius in grid units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
}

impl PinSpec {
    /// Validated coordinate.
    pub fn geo(&self) -> Result<GeoCoordinate> {
        GeoCoordinate::new(self.lat, self.lng)
    }

    /// Style override carried by this pin.
    #[must_use]
    pub fn style(&self) -> PinStyle {
        PinStyle {
            color: self.color.clone(),
            radius: self.radius,
        }
    }
}

/// Raster output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// Container width in logical pixels.
    #[serde(default = "default_canvas_width")]
    pub width: u32,

    /// Container height in logical pixels.
    #[serde(default = "default_canvas_height")]
    pub height: u32,

    /// Device pixel ratio.
    #[serde(default = "default_dpr")]
    pub dpr: f64,

    /// Shape of background cells.
    #[serde(default = "default_canvas_shape")]
    pub shape: Shape,

    /// Background cell color.
    #[serde(default = "default_cell_color")]
    pub color: String,

    /// Surface clear color.
    #[serde(default = "default_background")]
    pub background: String,

    /// Default pin color.
    #[serde(default = "default_pin_color")]
    pub pin_color: String,

    /// Background cell radius in grid units.
    #[serde(default = "default_radius")]
    pub radius: f64,

    /// Default pin radius in grid units.
    #[serde(default = "default_radius")]
    pub pin_radius: f64,
}

fn default_canvas_width() -> u32 {
    800
}
fn default_canvas_height() -> u32 {
    400
}
fn default_dpr() -> f64 {
    1.0
}
fn default_canvas_shape() -> Shape {
    Shape::Hexagon
}
fn default_cell_color() -> String {
    "#7e7e7e".to_string()
}
fn default_background() -> String {
    "transparent".to_string()
}
fn default_pin_color() -> String {
    "#d6ff79".to_string()
}
fn default_radius() -> f64 {
    0.25
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: default_canvas_width(),
            height: default_canvas_height(),
            dpr: default_dpr(),
            shape: default_canvas_shape(),
            color: default_cell_color(),
            background: default_background(),
            pin_color: default_pin_color(),
            radius: default_radius(),
            pin_radius: default_radius(),
        }
    }
}

impl CanvasConfig {
    /// Parse the colors into a renderer style.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidColor`] for an unsupported color.
    pub fn style(&self) -> Result<CanvasStyle> {
        let color = Rgba::from_css(&self.color, Rgba::BLACK)?;
        Ok(CanvasStyle {
            shape: self.shape,
            color,
            background: Rgba::from_css(&self.background, color)?,
            pin_color: Rgba::from_css(&self.pin_color, color)?,
            radius: self.radius,
            pin_radius: self.pin_radius,
        })
    }
}

/// Interaction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    /// Smallest zoom factor.
    #[serde(default = "default_min_zoom")]
    pub min_zoom: f64,

    /// Largest zoom factor.
    #[serde(default = "default_max_zoom")]
    pub max_zoom: f64,

    /// Multiplier per zoom step.
    #[serde(default = "default_zoom_step")]
    pub zoom_step: f64,

    /// Click/pan threshold in logical pixels.
    #[serde(default = "default_drag_threshold")]
    pub drag_threshold: f64,

    /// Minimum time between applied resizes, in milliseconds.
    #[serde(default = "default_resize_throttle_ms")]
    pub resize_throttle_ms: u64,
}

fn default_min_zoom() -> f64 {
    crate::render::MIN_ZOOM
}
fn default_max_zoom() -> f64 {
    crate::render::MAX_ZOOM
}
fn default_zoom_step() -> f64 {
    crate::render::ZOOM_STEP
}
fn default_drag_threshold() -> f64 {
    crate::render::DRAG_THRESHOLD
}
fn default_resize_throttle_ms() -> u64 {
    100
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_zoom: default_min_zoom(),
            max_zoom: default_max_zoom(),
            zoom_step: default_zoom_step(),
            drag_threshold: default_drag_threshold(),
            resize_throttle_ms: default_resize_throttle_ms(),
        }
    }
}

impl ViewportConfig {
    /// Zoom and drag limits.
    #[must_use]
    pub fn limits(&self) -> ViewportLimits {
        ViewportLimits {
            min_zoom: self.min_zoom,
            max_zoom: self.max_zoom,
            zoom_step: self.zoom_step,
            drag_threshold: self.drag_threshold,
        }
    }

    /// Resize throttle interval.
    #[must_use]
    pub fn resize_interval(&self) -> Duration {
        Duration::from_millis(self.resize_throttle_ms)
    }
}

/// Complete map configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Base dataset.
    #[serde(default)]
    pub dataset: DatasetConfig,

    /// SVG output defaults.
    #[serde(default)]
    pub svg: SvgSettings,

    /// Pins to place.
    #[serde(default)]
    pub pins: Vec<PinSpec>,

    /// Raster output.
    #[serde(default)]
    pub canvas: CanvasConfig,

    /// Interaction limits.
    #[serde(default)]
    pub viewport: ViewportConfig,
}

impl MapConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and validates configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = Self::from_yaml(&std::fs::read_to_string(path)?)?;
        debug!(path = %path.display(), pins = config.pins.len(), "loaded configuration");
        Ok(config)
    }

    /// Parses and validates configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Checks value ranges, pin coordinates and colors.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<()> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(Error::InvalidConfig(format!("{name} must be positive, got {v}")))
            }
        };

        positive("svg.radius", self.svg.radius)?;
        positive("canvas.dpr", self.canvas.dpr)?;
        positive("canvas.radius", self.canvas.radius)?;
        positive("canvas.pin_radius", self.canvas.pin_radius)?;
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(Error::InvalidDimensions {
                width: self.canvas.width,
                height: self.canvas.height,
            });
        }
        self.canvas.style()?;

        self.viewport.limits().validate()?;

        for pin in &self.pins {
            pin.geo()?;
            if let Some(radius) = pin.radius {
                positive("pin radius", radius)?;
            }
        }
        Ok(())
    }

    /// Load the base grid and place every configured pin on it.
    ///
    /// # Errors
    ///
    /// Returns an error if a pin cannot be placed.
    pub fn build_registry(&self, base: &BaseGrid) -> Result<PointRegistry> {
        let mut registry = base
            .to_registry()?
            .avoid_outer_pins(self.dataset.avoid_outer_pins);
        for pin in &self.pins {
            registry.add_pin(pin.geo()?, pin.data.clone(), pin.style())?;
        }
        if registry.collisions() > 0 {
            debug!(
                collisions = registry.collisions(),
                "configured pins share cells"
            );
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = MapConfig::new();
        assert_eq!(config.svg, SvgSettings::default());
        assert_eq!(config.canvas.width, 800);
        assert_eq!(config.viewport.max_zoom, 10.0);
        assert_eq!(config.viewport.resize_interval(), Duration::from_millis(100));
        assert!(config.pins.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_parse_empty() {
        let config = MapConfig::from_yaml("{}").unwrap();
        assert_eq!(config, MapConfig::default());
    }

    #[test]
    fn test_config_parse_full() {
        let yaml = r##"
dataset:
  path: world.json
  avoid_outer_pins: true
svg:
  shape: hexagon
  color: "#7e7e7e"
  backgroundColor: black
  radius: 0.25
pins:
  - lat: 41.749
    lng: 44.799
    color: "#d6ff79"
    data:
      name: Tbilisi
  - { lat: -33.9, lng: 18.4 }
canvas:
  width: 1200
  dpr: 2
viewport:
  max_zoom: 8
  resize_throttle_ms: 250
"##;
        let config = MapConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.dataset.path, Some(PathBuf::from("world.json")));
        assert!(config.dataset.avoid_outer_pins);
        assert_eq!(config.svg.shape, Shape::Hexagon);
        assert_eq!(config.svg.background_color, "black");
        assert_eq!(config.pins.len(), 2);
        assert_eq!(config.pins[0].data.as_ref().unwrap()["name"], "Tbilisi");
        assert_eq!(config.pins[1].color, None);
        assert_eq!(config.canvas.width, 1200);
        assert_eq!(config.canvas.height, 400);
        assert_eq!(config.canvas.dpr, 2.0);
        assert_eq!(config.viewport.limits().max_zoom, 8.0);
        assert_eq!(config.viewport.resize_interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_config_round_trip() {
        let mut config = MapConfig::new();
        config.pins.push(PinSpec {
            lat: 10.0,
            lng: 20.0,
            data: Some(serde_json::json!({"id": 7})),
            color: Some("red".into()),
            radius: Some(0.4),
        });
        let back = MapConfig::from_yaml(&config.to_yaml().unwrap()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_config_rejects_bad_values() {
        assert!(matches!(
            MapConfig::from_yaml("svg: { radius: 0 }"),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            MapConfig::from_yaml("viewport: { min_zoom: 4, max_zoom: 2 }"),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            MapConfig::from_yaml("viewport: { zoom_step: 1 }"),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            MapConfig::from_yaml("canvas: { width: 0 }"),
            Err(Error::InvalidDimensions { .. })
        ));
        assert!(matches!(
            MapConfig::from_yaml("canvas: { color: mauve }"),
            Err(Error::InvalidColor(_))
        ));
        assert!(matches!(
            MapConfig::from_yaml("pins: [ { lat: 95, lng: 0 } ]"),
            Err(Error::OutOfDomain { .. })
        ));
    }

    #[test]
    fn test_config_parse_error() {
        assert!(matches!(
            MapConfig::from_yaml("canvas: { width: wide }"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_canvas_style() {
        let style = CanvasConfig::default().style().unwrap();
        assert_eq!(style.color, Rgba::rgb(0x7e, 0x7e, 0x7e));
        assert_eq!(style.background, Rgba::TRANSPARENT);
        assert_eq!(style.pin_color, Rgba::rgb(0xd6, 0xff, 0x79));
        assert_eq!(style.shape, Shape::Hexagon);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.yaml");
        std::fs::write(&path, "canvas:\n  height: 300\n").unwrap();
        let config = MapConfig::load(&path).unwrap();
        assert_eq!(config.canvas.height, 300);
        assert!(MapConfig::load(dir.path().join("missing.yaml")).is_err());
    }
}
