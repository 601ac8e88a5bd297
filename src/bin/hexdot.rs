//! hexdot: dotted world maps from the command line.
//!
//! ```text
//! hexdot generate --land countries.geojson --height 100 --out world.json
//! hexdot svg --dataset world.json --pin 41.749,44.799 --shape hexagon --out map.svg
//! hexdot png --dataset world.json --config map.yaml --zoom 2 --out map.png
//! hexdot locate --dataset world.json 41.749 44.799
//! ```

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use hexdot::config::{MapConfig, PinSpec};
use hexdot::dataset::BaseGrid;
use hexdot::generate::{generate_base_grid, GenerateSettings, LandMask};
use hexdot::grid::{GridStyle, Region, Span};
use hexdot::output::{PngEncoder, SvgEncoder};
use hexdot::projection::GeoCoordinate;
use hexdot::registry::PointRegistry;
use hexdot::render::{render_svg, CanvasRenderer, Shape};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Dotted hexagon world maps
#[derive(Parser, Debug)]
#[command(name = "hexdot")]
#[command(version)]
#[command(about = "Render pins on a dotted hexagon world map", long_about = None)]
struct Cli {
    /// Config file path (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the map as an SVG document
    Svg {
        #[command(flatten)]
        map: MapArgs,

        /// Dot shape
        #[arg(long, value_parser = parse_shape)]
        shape: Option<Shape>,

        /// Default dot color (CSS)
        #[arg(long)]
        color: Option<String>,

        /// Background color (CSS)
        #[arg(long)]
        background: Option<String>,

        /// Default dot radius in grid units
        #[arg(long)]
        radius: Option<f64>,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Rasterize the map to PNG
    Png {
        #[command(flatten)]
        map: MapArgs,

        /// Container width in logical pixels
        #[arg(long)]
        width: Option<u32>,

        /// Container height in logical pixels
        #[arg(long)]
        height: Option<u32>,

        /// Device pixel ratio
        #[arg(long)]
        dpr: Option<f64>,

        /// Number of zoom-in steps before drawing
        #[arg(long, default_value_t = 0)]
        zoom: u32,

        /// Wrap the PNG in an SVG document instead
        #[arg(long)]
        svg: bool,

        /// Output file
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Print the cell a coordinate snaps to
    Locate {
        #[command(flatten)]
        map: MapArgs,

        /// Latitude in degrees
        #[arg(allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in degrees
        #[arg(allow_hyphen_values = true)]
        lng: f64,
    },

    /// Build a base grid dataset from GeoJSON land polygons
    Generate {
        /// GeoJSON file with Polygon/MultiPolygon features
        #[arg(long)]
        land: PathBuf,

        /// Grid height in units
        #[arg(long, conflicts_with = "width")]
        height: Option<u32>,

        /// Grid width in units
        #[arg(long)]
        width: Option<u32>,

        /// Row pattern: diagonal or vertical
        #[arg(long, value_parser = parse_grid, default_value = "diagonal")]
        grid: GridStyle,

        /// Region as lat_min,lat_max,lng_min,lng_max
        #[arg(long, value_parser = parse_region, allow_hyphen_values = true)]
        region: Option<Region>,

        /// Keep only these ISO-A3 country codes
        #[arg(long, value_delimiter = ',')]
        countries: Vec<String>,

        /// Output dataset file
        #[arg(short, long)]
        out: PathBuf,
    },
}

/// Dataset and pin arguments shared by the rendering commands.
#[derive(clap::Args, Debug)]
struct MapArgs {
    /// Base grid dataset (JSON). Overrides the config file.
    #[arg(short, long)]
    dataset: Option<PathBuf>,

    /// Extra pin as LAT,LNG (repeatable)
    #[arg(long = "pin", value_parser = parse_pin, allow_hyphen_values = true)]
    pins: Vec<PinSpec>,

    /// Reject pins outside the dataset region
    #[arg(long)]
    avoid_outer_pins: bool,
}

fn parse_shape(s: &str) -> Result<Shape, String> {
    match s.to_ascii_lowercase().as_str() {
        "circle" => Ok(Shape::Circle),
        "hexagon" => Ok(Shape::Hexagon),
        other => Err(format!("unknown shape '{other}', expected circle or hexagon")),
    }
}

fn parse_grid(s: &str) -> Result<GridStyle, String> {
    match s.to_ascii_lowercase().as_str() {
        "diagonal" => Ok(GridStyle::Diagonal),
        "vertical" => Ok(GridStyle::Vertical),
        other => Err(format!("unknown grid '{other}', expected diagonal or vertical")),
    }
}

fn parse_numbers<const N: usize>(s: &str) -> Result<[f64; N], String> {
    let values = s
        .split(',')
        .map(|part| part.trim().parse::<f64>().map_err(|e| format!("'{part}': {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    <[f64; N]>::try_from(values).map_err(|v| format!("expected {N} numbers, got {}", v.len()))
}

fn parse_pin(s: &str) -> Result<PinSpec, String> {
    let [lat, lng] = parse_numbers::<2>(s)?;
    Ok(PinSpec {
        lat,
        lng,
        data: None,
        color: None,
        radius: None,
    })
}

fn parse_region(s: &str) -> Result<Region, String> {
    let [lat_min, lat_max, lng_min, lng_max] = parse_numbers::<4>(s)?;
    Ok(Region {
        lat: Span {
            min: lat_min,
            max: lat_max,
        },
        lng: Span {
            min: lng_min,
            max: lng_max,
        },
    })
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<MapConfig> {
    match path {
        Some(path) => MapConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(MapConfig::default()),
    }
}

/// Apply command-line overrides, then load the dataset and place every pin.
fn build_registry(config: &mut MapConfig, map: MapArgs) -> Result<PointRegistry> {
    if let Some(dataset) = map.dataset {
        config.dataset.path = Some(dataset);
    }
    if map.avoid_outer_pins {
        config.dataset.avoid_outer_pins = true;
    }
    config.pins.extend(map.pins);
    config.validate()?;

    let Some(path) = config.dataset.path.as_deref() else {
        bail!("no dataset given: pass --dataset or set dataset.path in the config");
    };
    let base = BaseGrid::from_file(path)
        .with_context(|| format!("failed to load dataset {}", path.display()))?;
    let registry = config.build_registry(&base)?;
    info!(
        cells = registry.len(),
        pins = registry.pins().len(),
        collisions = registry.collisions(),
        "map ready"
    );
    Ok(registry)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Svg {
            map,
            shape,
            color,
            background,
            radius,
            out,
        } => {
            if let Some(shape) = shape {
                config.svg.shape = shape;
            }
            if let Some(color) = color {
                config.svg.color = color;
            }
            if let Some(background) = background {
                config.svg.background_color = background;
            }
            if let Some(radius) = radius {
                config.svg.radius = radius;
            }
            let registry = build_registry(&mut config, map)?;
            let svg = render_svg(&registry, &config.svg);
            match out {
                Some(path) => {
                    std::fs::write(&path, svg)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    info!(path = %path.display(), "wrote svg");
                }
                None => print!("{svg}"),
            }
        }

        Command::Png {
            map,
            width,
            height,
            dpr,
            zoom,
            svg,
            out,
        } => {
            if let Some(width) = width {
                config.canvas.width = width;
            }
            if let Some(height) = height {
                config.canvas.height = height;
            }
            if let Some(dpr) = dpr {
                config.canvas.dpr = dpr;
            }
            let registry = build_registry(&mut config, map)?;
            let image = registry.image();
            let mut renderer =
                CanvasRenderer::new(image.width, image.height, config.canvas.style()?)
                    .with_limits(config.viewport.limits())?
                    .with_resize_interval(config.viewport.resize_interval());
            renderer.attach(config.canvas.width, config.canvas.height, config.canvas.dpr)?;
            for _ in 0..zoom {
                renderer.zoom_in();
            }
            renderer.draw(&registry)?;

            let Some(fb) = renderer.surface() else {
                bail!("renderer has no surface");
            };
            if svg {
                SvgEncoder::from_framebuffer(fb)?.write_to_file(&out)?;
            } else {
                PngEncoder::write_to_file(fb, &out)?;
            }
            info!(path = %out.display(), width = fb.width(), height = fb.height(), "wrote image");
        }

        Command::Locate { map, lat, lng } => {
            let registry = build_registry(&mut config, map)?;
            let geo = GeoCoordinate::new(lat, lng)?;
            let cell = registry.get_pin(geo)?;
            let existing = registry.get(cell.key);
            let report = serde_json::json!({
                "key": cell.key.to_string(),
                "col": cell.key.col,
                "row": cell.key.row,
                "x": cell.x,
                "y": cell.y,
                "lat": cell.lat,
                "lng": cell.lng,
                "land": existing.is_some_and(|p| !p.is_pin()),
                "pin": existing.filter(|p| p.is_pin()).and_then(|p| p.data()),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Command::Generate {
            land,
            height,
            width,
            grid,
            region,
            countries,
            out,
        } => {
            let filter = (!countries.is_empty()).then_some(countries.as_slice());
            let mask = LandMask::from_file(&land, filter)
                .with_context(|| format!("failed to read land polygons {}", land.display()))?;
            let settings = GenerateSettings {
                height: height.or_else(|| width.is_none().then_some(100)),
                width,
                region: region.unwrap_or_default(),
                grid,
            };
            let base = generate_base_grid(&settings, &mask)?;
            base.write_to_file(&out)
                .with_context(|| format!("failed to write {}", out.display()))?;
            info!(
                path = %out.display(),
                cells = base.len(),
                width = base.width,
                height = base.height,
                "wrote dataset"
            );
        }
    }

    Ok(())
}
