//! Terracarve CLI - procedural terrain with erosion, water and roads.
//!
//! Builds a scene from flags or a TOML file, runs the generation pipeline and
//! writes the requested layers.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Args, Parser, Subcommand, ValueEnum};
use glam::Vec2;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use terracarve::export::{
    export_field_exr, export_layer_png, export_layer_png16, export_layer_raw, export_obj,
    ExrExportOptions, PngExportOptions, RawFormat,
};
use terracarve::road::{RoadConfig, RoadCost};
use terracarve::config::SourceConfig;
use terracarve::{OutputConfig, OutputFormat, RasterLayer, SceneConfig, TerrainField};

/// Procedural terrain heightfield generator.
#[derive(Parser)]
#[command(name = "terracarve")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a terrain scene and export it.
    Generate(GenerateArgs),

    /// Display grid geometry and output sizes for a configuration.
    Info {
        /// Grid resolution along i.
        #[arg(long, default_value = "250")]
        nx: usize,

        /// Grid resolution along j.
        #[arg(long, default_value = "250")]
        ny: usize,

        /// World-space lower corner as `x,y`.
        #[arg(long, allow_hyphen_values = true, value_parser = parse_vec2, default_value = "0,0")]
        min: Vec2,

        /// World-space upper corner as `x,y`.
        #[arg(long, allow_hyphen_values = true, value_parser = parse_vec2, default_value = "1,1")]
        max: Vec2,
    },
}

#[derive(Args)]
struct GenerateArgs {
    /// Scene file (TOML). Flags given on the command line override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Grid resolution along i.
    #[arg(long)]
    nx: Option<usize>,

    /// Grid resolution along j.
    #[arg(long)]
    ny: Option<usize>,

    /// World-space lower corner as `x,y`.
    #[arg(long, allow_hyphen_values = true, value_parser = parse_vec2)]
    min: Option<Vec2>,

    /// World-space upper corner as `x,y`.
    #[arg(long, allow_hyphen_values = true, value_parser = parse_vec2)]
    max: Option<Vec2>,

    // Noise options
    /// Noise periods across the grid along i.
    #[arg(long)]
    frequency_x: Option<f32>,

    /// Noise periods across the grid along j.
    #[arg(long)]
    frequency_y: Option<f32>,

    /// Elevation of the highest noise value.
    #[arg(long)]
    height: Option<f32>,

    /// Number of noise octaves.
    #[arg(long)]
    octaves: Option<u8>,

    /// Random seed for reproducible generation.
    #[arg(short, long)]
    seed: Option<i32>,

    // Source image options
    /// Read elevation from an image instead of noise.
    #[arg(long)]
    heightmap: Option<PathBuf>,

    /// Elevation of a full-intensity heightmap pixel.
    #[arg(long)]
    scale_z: Option<f32>,

    /// Box blur half-size applied to the initial elevation.
    #[arg(long)]
    blur: Option<usize>,

    // Erosion options
    /// Number of erosion rounds (thermal then stream power).
    #[arg(long)]
    iterations: Option<u32>,

    /// Fraction of height moved per thermal pass (0-1).
    #[arg(long)]
    thermal_quantity: Option<f32>,

    /// Stream-power coefficient.
    #[arg(short, long)]
    k: Option<f32>,

    /// Stream-power slope exponent.
    #[arg(short, long)]
    n: Option<f32>,

    /// Flood every cell below this elevation.
    #[arg(long)]
    water_level: Option<f32>,

    // Road options
    /// Road endpoints as `i1,j1,i2,j2`.
    #[arg(long, value_parser = parse_road)]
    road: Option<((usize, usize), (usize, usize))>,

    /// Road corridor half-width in cells.
    #[arg(long)]
    road_width: Option<usize>,

    /// Road cost per unit of slope.
    #[arg(long)]
    slope_cost: Option<f32>,

    /// Road cost per unit of shallow water.
    #[arg(long)]
    water_low_cost: Option<f32>,

    /// Road cost per unit of deep water.
    #[arg(long)]
    water_high_cost: Option<f32>,

    /// Depth separating shallow from deep water.
    #[arg(long)]
    water_threshold: Option<f32>,

    // Output options
    /// Output directory for generated files.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Base name for output files.
    #[arg(long)]
    name: Option<String>,

    /// Layer to export (repeatable): height, slope, laplacian, stream_area, wetness, texture.
    #[arg(short, long = "layer")]
    layers: Vec<RasterLayer>,

    /// Export format.
    #[arg(short, long)]
    format: Option<ExportFormat>,

    /// Also export the surface as an OBJ mesh.
    #[arg(long)]
    mesh: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    /// 8-bit PNG (RGB for the texture layer).
    Png,
    /// 16-bit PNG.
    Png16,
    /// 16-bit RAW little-endian (Unity).
    Raw,
    /// 32-bit float RAW (high precision).
    RawFloat,
    /// Multi-channel float OpenEXR.
    Exr,
}

impl From<ExportFormat> for OutputFormat {
    fn from(format: ExportFormat) -> Self {
        match format {
            ExportFormat::Png => OutputFormat::Png,
            ExportFormat::Png16 => OutputFormat::Png16,
            ExportFormat::Raw => OutputFormat::Raw,
            ExportFormat::RawFloat => OutputFormat::RawFloat,
            ExportFormat::Exr => OutputFormat::Exr,
        }
    }
}

fn parse_vec2(s: &str) -> Result<Vec2, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [x, y] => {
            let x = x.parse::<f32>().map_err(|e| e.to_string())?;
            let y = y.parse::<f32>().map_err(|e| e.to_string())?;
            Ok(Vec2::new(x, y))
        }
        _ => Err(format!("expected `x,y`, got '{}'", s)),
    }
}

fn parse_road(s: &str) -> Result<((usize, usize), (usize, usize)), String> {
    let values = s
        .split(',')
        .map(|p| p.trim().parse::<usize>().map_err(|e| e.to_string()))
        .collect::<Result<Vec<_>, _>>()?;
    match values.as_slice() {
        &[i1, j1, i2, j2] => Ok(((i1, j1), (i2, j2))),
        _ => Err(format!("expected `i1,j1,i2,j2`, got '{}'", s)),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate(args) => run_generate(args),
        Commands::Info { nx, ny, min, max } => run_info(nx, ny, min, max),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Applies command-line overrides on top of a scene.
fn build_scene(args: GenerateArgs) -> Result<SceneConfig, Box<dyn std::error::Error>> {
    let mut scene = match &args.config {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    };

    let grid = &mut scene.grid;
    grid.nx = args.nx.unwrap_or(grid.nx);
    grid.ny = args.ny.unwrap_or(grid.ny);
    grid.p_min = args.min.unwrap_or(grid.p_min);
    grid.p_max = args.max.unwrap_or(grid.p_max);

    let noise = &mut scene.noise;
    noise.frequency_x = args.frequency_x.unwrap_or(noise.frequency_x);
    noise.frequency_y = args.frequency_y.unwrap_or(noise.frequency_y);
    noise.height = args.height.unwrap_or(noise.height);
    noise.fractal.octaves = args.octaves.unwrap_or(noise.fractal.octaves);
    noise.fractal.seed = args.seed.unwrap_or(noise.fractal.seed);

    if let Some(path) = args.heightmap {
        scene.source = Some(SourceConfig {
            path,
            scale_z: args.scale_z.unwrap_or(0.1),
        });
    } else if let (Some(source), Some(scale_z)) = (scene.source.as_mut(), args.scale_z) {
        source.scale_z = scale_z;
    }
    scene.blur = args.blur.unwrap_or(scene.blur);

    let erosion = &mut scene.erosion;
    erosion.iterations = args.iterations.unwrap_or(erosion.iterations);
    erosion.thermal_quantity = args.thermal_quantity.unwrap_or(erosion.thermal_quantity);
    erosion.k = args.k.unwrap_or(erosion.k);
    erosion.n = args.n.unwrap_or(erosion.n);

    if args.water_level.is_some() {
        scene.water_level = args.water_level;
    }

    if let Some((start, goal)) = args.road {
        let base = scene.road.take();
        scene.road = Some(RoadConfig {
            start,
            goal,
            ..base.unwrap_or_else(|| RoadConfig::between(start, goal))
        });
    }
    if let Some(road) = scene.road.as_mut() {
        road.half_width = args.road_width.unwrap_or(road.half_width);
        let cost: &mut RoadCost = &mut road.cost;
        cost.slope_cost = args.slope_cost.unwrap_or(cost.slope_cost);
        cost.water_low_cost = args.water_low_cost.unwrap_or(cost.water_low_cost);
        cost.water_high_cost = args.water_high_cost.unwrap_or(cost.water_high_cost);
        cost.water_threshold = args.water_threshold.unwrap_or(cost.water_threshold);
    }

    let output = &mut scene.output;
    if let Some(dir) = args.output {
        output.directory = dir;
    }
    if let Some(name) = args.name {
        output.name = name;
    }
    if !args.layers.is_empty() {
        output.layers = args.layers;
    }
    if let Some(format) = args.format {
        output.format = format.into();
    }
    output.mesh |= args.mesh;

    Ok(scene)
}

fn run_generate(args: GenerateArgs) -> CliResult {
    let scene = build_scene(args)?;
    scene.validate()?;

    println!("Terracarve - Procedural Terrain Generator");
    println!("=========================================");
    match &scene.source {
        Some(source) => println!("Source: {} (scale_z {})", source.path.display(), source.scale_z),
        None => println!(
            "Grid: {}x{} over ({}, {})-({}, {})",
            scene.grid.nx, scene.grid.ny, scene.grid.p_min.x, scene.grid.p_min.y,
            scene.grid.p_max.x, scene.grid.p_max.y
        ),
    }
    println!("Seed: {}", scene.noise.fractal.seed);
    println!("Output: {}", scene.output.directory.display());

    let start = Instant::now();
    let mut field = scene.initial_field()?;
    let pipeline = scene.pipeline();

    pipeline.run_with_callbacks(
        &mut field,
        |name, i, total| {
            println!("  [{}/{}] {}...", i + 1, total, name);
        },
        |name, _, _| {
            info!("stage '{}' complete", name);
        },
    )?;

    let (min, max) = field.heights().value_range();
    println!("\nGeneration complete in {:.2?}", start.elapsed());
    println!("Elevation range: [{:.5}, {:.5}]", min, max);

    println!("\nExporting...");
    let written = write_outputs(&field, &scene.output)?;
    for path in &written {
        println!("  {}", path.display());
    }
    println!("\nDone! {} file(s) written in {:.2?}", written.len(), start.elapsed());
    Ok(())
}

/// Writes every requested layer (and the mesh), returning the paths written.
fn write_outputs(field: &TerrainField, output: &OutputConfig) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(&output.directory)?;
    let mut written = Vec::new();

    if output.format == OutputFormat::Exr {
        let path = output
            .directory
            .join(format!("{}.{}", output.name, output.format.extension()));
        export_field_exr(field, &path, &ExrExportOptions::default())?;
        written.push(path);
    } else {
        for &layer in &output.layers {
            // color layers only have an 8-bit PNG form
            let format = if layer.is_color() {
                OutputFormat::Png
            } else {
                output.format
            };
            let path = OutputConfig {
                format,
                ..output.clone()
            }
            .layer_path(layer);

            match format {
                OutputFormat::Png => export_layer_png(field, layer, &path, &PngExportOptions::default())?,
                OutputFormat::Png16 => {
                    export_layer_png16(field, layer, &path, &PngExportOptions::default())?
                }
                OutputFormat::Raw => export_layer_raw(field, layer, &path, RawFormat::R16LittleEndian)?,
                OutputFormat::RawFloat => export_layer_raw(field, layer, &path, RawFormat::R32Float)?,
                OutputFormat::Exr => continue,
            }
            written.push(path);
        }
    }

    if output.mesh {
        let path = output.directory.join(format!("{}.obj", output.name));
        export_obj(&field.polygonize(), &path)?;
        written.push(path);
    }

    Ok(written)
}

fn run_info(nx: usize, ny: usize, min: Vec2, max: Vec2) -> CliResult {
    let field = TerrainField::new(min, max, nx, ny)?;
    let grid = field.heights();
    let cells = (nx * ny) as u64;

    let bytes_layers = cells * 4 * 2; // heights + water
    let bytes_graph = cells * 16 * 16; // Diamond-16 edges
    let mb = |bytes: u64| bytes as f64 / 1024.0 / 1024.0;

    println!("Terracarve - Grid Info");
    println!("======================");
    println!();
    println!("Resolution: {}x{} ({} cells)", nx, ny, cells);
    println!("Bounds:     ({}, {}) - ({}, {})", min.x, min.y, max.x, max.y);
    println!("Spacing:    {} x {}", grid.scale_x(), grid.scale_y());
    println!("Triangles:  {}", (nx - 1) * (ny - 1) * 2);
    println!();
    println!("Memory usage (in-memory):");
    println!("  Layers:     {:>12} bytes ({:.2} MB)", bytes_layers, mb(bytes_layers));
    println!("  Road graph: {:>12} bytes ({:.2} MB)", bytes_graph, mb(bytes_graph));
    println!();
    println!("Export file sizes (per layer):");
    println!("  PNG (8-bit, raw):  {:>10} bytes", cells);
    println!("  RAW (R16):         {:>10} bytes", cells * 2);
    println!("  RAW (R32):         {:>10} bytes", cells * 4);
    Ok(())
}
