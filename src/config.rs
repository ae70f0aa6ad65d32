//! Scene description: grid, generation stages and outputs, loadable from TOML.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::erosion::ErosionConfig;
use crate::export::RasterLayer;
use crate::grid::GridError;
use crate::pipeline::{
    BlurStage, ErosionStage, HeightmapStage, Pipeline, RoadStage, SourceImageStage, WaterStage,
};
use crate::road::RoadConfig;
use crate::terrain::{NoiseConfig, TerrainField};

/// Errors raised while loading or validating a scene.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse scene: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid grid: {0}")]
    Grid(#[from] GridError),
    #[error("{0}")]
    Invalid(String),
}

/// World bounds and resolution of the terrain grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub p_min: Vec2,
    pub p_max: Vec2,
    pub nx: usize,
    pub ny: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            p_min: Vec2::ZERO,
            p_max: Vec2::ONE,
            nx: 250,
            ny: 250,
        }
    }
}

/// Elevation read from an image instead of noise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub path: PathBuf,
    /// Elevation of a full-intensity pixel.
    #[serde(default = "default_scale_z")]
    pub scale_z: f32,
}

fn default_scale_z() -> f32 {
    0.1
}

/// File formats for scalar layer output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// 8-bit normalized PNG (the texture layer is RGB).
    #[default]
    Png,
    /// 16-bit PNG normalized to the layer range.
    Png16,
    /// 16-bit little-endian RAW.
    Raw,
    /// 32-bit float RAW.
    RawFloat,
    /// One multi-channel float EXR of the whole field.
    Exr,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png | OutputFormat::Png16 => "png",
            OutputFormat::Raw => "raw",
            OutputFormat::RawFloat => "r32",
            OutputFormat::Exr => "exr",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "png16" => Ok(OutputFormat::Png16),
            "raw" => Ok(OutputFormat::Raw),
            "raw-float" | "raw_float" => Ok(OutputFormat::RawFloat),
            "exr" => Ok(OutputFormat::Exr),
            other => Err(ConfigError::Invalid(format!("unknown output format '{}'", other))),
        }
    }
}

/// What to write once the scene is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    /// Base file name; layers are written as `{name}_{layer}.{ext}`.
    pub name: String,
    pub layers: Vec<RasterLayer>,
    pub format: OutputFormat,
    /// Also write the surface as `{name}.obj`.
    pub mesh: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output"),
            name: "terrain".to_string(),
            layers: vec![RasterLayer::Height, RasterLayer::Texture],
            format: OutputFormat::Png,
            mesh: false,
        }
    }
}

impl OutputConfig {
    /// Output path for one layer.
    pub fn layer_path(&self, layer: RasterLayer) -> PathBuf {
        self.directory
            .join(format!("{}_{}.{}", self.name, layer.name(), self.format.extension()))
    }
}

/// A full scene rebuild: initial terrain, processing stages and outputs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Box blur half-size applied after the initial elevation (0 disables it).
    pub blur: usize,
    /// Flood every cell below this elevation.
    pub water_level: Option<f32>,
    pub grid: GridConfig,
    pub noise: NoiseConfig,
    /// When set, elevation comes from this image and `noise` is ignored.
    pub source: Option<SourceConfig>,
    pub erosion: ErosionConfig,
    pub road: Option<RoadConfig>,
    pub output: OutputConfig,
}

impl SceneConfig {
    /// Reads a scene from a TOML file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: SceneConfig = toml::from_str(&text)?;
        info!("loaded scene from {}", path.display());
        Ok(config)
    }

    /// Rejects parameter combinations no stage can run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.is_none() && !(self.noise.height > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "noise height must be positive, got {}",
                self.noise.height
            )));
        }
        if !(0.0..=1.0).contains(&self.erosion.thermal_quantity) {
            return Err(ConfigError::Invalid(format!(
                "thermal quantity must lie in [0, 1], got {}",
                self.erosion.thermal_quantity
            )));
        }
        if self.erosion.k < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "stream-power coefficient must be non-negative, got {}",
                self.erosion.k
            )));
        }
        if let Some(road) = &self.road {
            if road.half_width == 0 {
                return Err(ConfigError::Invalid(
                    "road half-width must be at least one cell".to_string(),
                ));
            }
        }
        if let Some(level) = self.water_level {
            if !level.is_finite() {
                return Err(ConfigError::Invalid(format!("water level must be finite, got {}", level)));
            }
        }
        Ok(())
    }

    /// Empty terrain with the configured geometry.
    pub fn initial_field(&self) -> Result<TerrainField, ConfigError> {
        let g = &self.grid;
        Ok(TerrainField::new(g.p_min, g.p_max, g.nx, g.ny)?)
    }

    /// The stages of a scene rebuild, in order.
    pub fn pipeline(&self) -> Pipeline {
        let mut pipeline = Pipeline::new();
        match &self.source {
            Some(source) => pipeline.add_stage(SourceImageStage::new(&source.path, source.scale_z)),
            None => pipeline.add_stage(HeightmapStage::new(self.noise.clone())),
        };
        if self.blur > 0 {
            pipeline.add_stage(BlurStage::new(self.blur));
        }
        if self.erosion.iterations > 0 {
            pipeline.add_stage(ErosionStage::new(self.erosion.clone()));
        }
        if let Some(level) = self.water_level {
            pipeline.add_stage(WaterStage::new(level));
        }
        if let Some(road) = &self.road {
            pipeline.add_stage(RoadStage::new(road.clone()));
        }
        pipeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config: SceneConfig = toml::from_str("").unwrap();
        assert_eq!(config, SceneConfig::default());
        assert_eq!((config.grid.nx, config.grid.ny), (250, 250));
    }

    #[test]
    fn test_defaults_round_trip_through_toml() {
        let config = SceneConfig {
            water_level: Some(0.05),
            road: Some(RoadConfig::between((1, 2), (30, 40))),
            ..Default::default()
        };
        let text = toml::to_string(&config).unwrap();
        let back: SceneConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_load_partial_scene() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.toml");
        std::fs::write(
            &path,
            r#"
blur = 2
water_level = 0.03

[grid]
nx = 64
ny = 32

[erosion]
iterations = 5

[road]
start = [0, 0]
goal = [63, 31]
half_width = 1

[output]
layers = ["height", "stream_area", "wetness"]
format = "raw-float"
mesh = true
"#,
        )
        .unwrap();

        let config = SceneConfig::load(&path).unwrap();
        assert_eq!((config.grid.nx, config.grid.ny), (64, 32));
        assert_eq!(config.grid.p_max, Vec2::ONE);
        assert_eq!(config.erosion.iterations, 5);
        assert_eq!(config.erosion.n, 1.0);
        assert_eq!(config.road.as_ref().map(|r| r.half_width), Some(1));
        assert_eq!(config.output.format, OutputFormat::RawFloat);
        assert_eq!(config.output.layers.len(), 3);
        assert_eq!(config.pipeline().stage_count(), 5);
    }

    #[test]
    fn test_load_missing_file() {
        let result = SceneConfig::load(Path::new("/nonexistent/scene.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_validate_rejects_bad_parameters() {
        let mut config = SceneConfig::default();
        assert!(config.validate().is_ok());

        config.erosion.thermal_quantity = 1.5;
        assert!(config.validate().is_err());
        config.erosion.thermal_quantity = 0.5;

        config.noise.height = 0.0;
        assert!(config.validate().is_err());
        config.source = Some(SourceConfig {
            path: PathBuf::from("hm.png"),
            scale_z: 1.0,
        });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_width_road() {
        let mut config = SceneConfig {
            road: Some(RoadConfig::between((0, 0), (10, 10))),
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        if let Some(road) = config.road.as_mut() {
            road.half_width = 0;
        }
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_invalid_grid_is_reported() {
        let config = SceneConfig {
            grid: GridConfig {
                nx: 1,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(config.initial_field(), Err(ConfigError::Grid(_))));
    }

    #[test]
    fn test_output_paths() {
        let output = OutputConfig {
            format: OutputFormat::RawFloat,
            ..Default::default()
        };
        assert_eq!(
            output.layer_path(RasterLayer::Wetness),
            PathBuf::from("output").join("terrain_wetness.r32")
        );
        assert_eq!("raw-float".parse::<OutputFormat>().unwrap(), OutputFormat::RawFloat);
        assert!("tiff".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_pipeline_skips_disabled_stages() {
        let config = SceneConfig {
            erosion: ErosionConfig::disabled(),
            ..Default::default()
        };
        assert_eq!(config.pipeline().stage_names(), vec!["Noise Heightmap"]);
    }
}
