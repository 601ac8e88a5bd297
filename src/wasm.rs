//! WebAssembly bindings for hexdot.
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { HexMap } from 'hexdot';
//!
//! await init();
//!
//! const map = new HexMap(await (await fetch('world.json')).text());
//! map.add_pin(41.749, 44.799, JSON.stringify({ name: 'Tbilisi' }), '#d6ff79', 0.25);
//! document.getElementById('map').innerHTML = map.svg('hexagon', '#7e7e7e', 'transparent', 0.25);
//!
//! // Or draw onto a canvas
//! map.attach(canvas.clientWidth, canvas.clientHeight, window.devicePixelRatio);
//! const pixels = map.draw();
//! ctx.putImageData(new ImageData(new Uint8ClampedArray(pixels), map.surface_width()), 0, 0);
//! ```
//!
//! Container resizes go through the renderer's throttle, timed with `performance.now()`:
//!
//! ```javascript
//! new ResizeObserver(() => {
//!     map.resize(canvas.clientWidth, canvas.clientHeight, performance.now());
//! }).observe(canvas);
//! // once per animation frame
//! map.flush_resize(performance.now());
//! ```

use std::time::Duration;

use wasm_bindgen::prelude::*;

use crate::dataset::BaseGrid;
use crate::output::PngEncoder;
use crate::projection::GeoCoordinate;
use crate::registry::{PinStyle, PointRegistry};
use crate::render::{render_svg, CanvasRenderer, CanvasStyle, Gesture, Shape, SvgSettings};

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// `performance.now()` milliseconds as a timestamp. Negative or non-finite input is 0.
fn timestamp(now_ms: f64) -> Duration {
    Duration::try_from_secs_f64(now_ms / 1000.0).unwrap_or_default()
}

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str(concat!(
        "hexdot ",
        env!("CARGO_PKG_VERSION"),
        " loaded"
    )));
}

/// A map with its pins and an interactive raster view.
#[wasm_bindgen]
pub struct HexMap {
    registry: PointRegistry,
    renderer: CanvasRenderer,
}

#[wasm_bindgen]
impl HexMap {
    /// Load a base grid dataset from its JSON text.
    #[wasm_bindgen(constructor)]
    pub fn new(dataset_json: &str) -> Result<HexMap, JsValue> {
        let base = BaseGrid::from_json_str(dataset_json).map_err(js_err)?;
        let registry = base.to_registry().map_err(js_err)?;
        let image = registry.image();
        Ok(Self {
            registry,
            renderer: CanvasRenderer::new(image.width, image.height, CanvasStyle::default()),
        })
    }

    /// Place a pin. `data_json` is stored as the pin payload.
    pub fn add_pin(
        &mut self,
        lat: f64,
        lng: f64,
        data_json: Option<String>,
        color: Option<String>,
        radius: Option<f64>,
    ) -> Result<(), JsValue> {
        let geo = GeoCoordinate::new(lat, lng).map_err(js_err)?;
        let data = data_json
            .map(|s| serde_json::from_str(&s))
            .transpose()
            .map_err(js_err)?;
        self.registry
            .add_pin(geo, data, PinStyle { color, radius })
            .map_err(js_err)?;
        Ok(())
    }

    /// Number of cells, pins included.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Whether the map has no cells.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Render SVG markup. `shape` is `"circle"` or `"hexagon"`.
    pub fn svg(&self, shape: &str, color: &str, background: &str, radius: f64) -> String {
        let settings = SvgSettings {
            shape: if shape.eq_ignore_ascii_case("hexagon") {
                Shape::Hexagon
            } else {
                Shape::Circle
            },
            color: color.to_string(),
            background_color: background.to_string(),
            radius,
        };
        render_svg(&self.registry, &settings)
    }

    /// Attach the raster surface, or change its device pixel ratio. Not throttled.
    pub fn attach(&mut self, width: u32, height: u32, device_pixel_ratio: f64) -> Result<(), JsValue> {
        self.renderer
            .attach(width, height, device_pixel_ratio)
            .map_err(js_err)
    }

    /// Throttled container resize at `now_ms` (`performance.now()`). Returns whether
    /// it was applied; a held-back size is applied by [`flush_resize`](Self::flush_resize).
    pub fn resize(&mut self, width: u32, height: u32, now_ms: f64) -> Result<bool, JsValue> {
        self.renderer
            .resize_at(width, height, timestamp(now_ms))
            .map_err(js_err)
    }

    /// Apply the last held-back resize once the throttle interval has passed.
    pub fn flush_resize(&mut self, now_ms: f64) -> Result<bool, JsValue> {
        self.renderer
            .flush_resize_at(timestamp(now_ms))
            .map_err(js_err)
    }

    /// Physical width of the surface (0 when detached).
    pub fn surface_width(&self) -> u32 {
        self.renderer.surface().map_or(0, |fb| fb.width())
    }

    /// Draw and return the RGBA pixels (empty when detached).
    pub fn draw(&mut self) -> Result<Vec<u8>, JsValue> {
        self.renderer.draw(&self.registry).map_err(js_err)?;
        Ok(self
            .renderer
            .surface()
            .map(|fb| fb.pixels().to_vec())
            .unwrap_or_default())
    }

    /// Draw and return PNG bytes (empty when detached).
    pub fn png(&mut self) -> Result<Vec<u8>, JsValue> {
        self.renderer.draw(&self.registry).map_err(js_err)?;
        match self.renderer.surface() {
            Some(fb) => PngEncoder::to_bytes(fb).map_err(js_err),
            None => Ok(Vec::new()),
        }
    }

    /// Zoom in one step.
    pub fn zoom_in(&mut self) -> f64 {
        self.renderer.zoom_in()
    }

    /// Zoom out one step.
    pub fn zoom_out(&mut self) -> f64 {
        self.renderer.zoom_out()
    }

    /// Pointer pressed.
    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.renderer.pointer_down(x, y);
    }

    /// Pointer moved; `true` while panning.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.renderer.pointer_move(x, y)
    }

    /// Pointer released. Returns the clicked pin's payload, `undefined` when no pin
    /// was clicked.
    pub fn pointer_up(&mut self, x: f64, y: f64) -> Result<JsValue, JsValue> {
        let Some(Gesture::Click { screen, .. }) = self.renderer.pointer_up(x, y) else {
            return Ok(JsValue::UNDEFINED);
        };
        match self.renderer.hit_test(&self.registry, screen.x, screen.y) {
            Some(pin) => match pin.data() {
                Some(data) => js_sys::JSON::parse(&data.to_string()),
                None => Ok(JsValue::NULL),
            },
            None => Ok(JsValue::UNDEFINED),
        }
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
