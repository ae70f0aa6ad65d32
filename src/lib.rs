//! Procedural terrain heightfields with erosion, hydrology and roads.
//!
//! A [`TerrainField`] pairs an elevation grid with a water-depth layer. It
//! can be seeded from fractal noise or an image, eroded with thermal and
//! stream-power passes, flooded, cut by least-cost roads, smoothed, and
//! exported as rasters or a triangle mesh.

pub mod config;
pub mod erosion;
pub mod export;
pub mod grid;
pub mod mesh;
pub mod noise;
pub mod pipeline;
pub mod road;
pub mod terrain;

pub use config::{ConfigError, OutputConfig, OutputFormat, SceneConfig};
pub use erosion::ErosionConfig;
pub use export::{Raster, RasterLayer};
pub use grid::{Grid, GridError, Topology};
pub use mesh::Mesh;
pub use noise::FractalNoiseConfig;
pub use pipeline::{GenerationStage, Pipeline, PipelineError};
pub use road::{Path, RoadConfig, RoadCost, RoadError};
pub use terrain::{NoiseConfig, TerrainError, TerrainField};
