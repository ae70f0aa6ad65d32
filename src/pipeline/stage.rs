//! Generation stage trait and pipeline orchestration.

use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::erosion::ErosionConfig;
use crate::road::{RoadConfig, RoadError};
use crate::terrain::{generate_heightmap, NoiseConfig, TerrainError, TerrainField};

/// Unique identifier for generation stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageId {
    /// Initial elevation, from noise or a source image.
    Heightmap,
    /// Box filtering of the elevation.
    Blur,
    /// Thermal and stream-power erosion rounds.
    Erosion,
    /// Flooding below a water level.
    Water,
    /// Least-cost road routing and carving.
    Road,
}

impl StageId {
    /// Returns the name of the stage.
    pub fn name(&self) -> &'static str {
        match self {
            StageId::Heightmap => "heightmap",
            StageId::Blur => "blur",
            StageId::Erosion => "erosion",
            StageId::Water => "water",
            StageId::Road => "road",
        }
    }
}

/// Errors that can occur during pipeline execution.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Stage '{0}' failed: {1}")]
    StageFailed(String, String),
    #[error("Missing dependency: stage '{0}' requires '{1}'")]
    MissingDependency(String, String),
    #[error(transparent)]
    Terrain(#[from] TerrainError),
    #[error(transparent)]
    Road(#[from] RoadError),
}

/// Trait for implementing generation stages.
///
/// Each stage transforms the terrain field in place, building upon the
/// stages run before it.
pub trait GenerationStage: Send + Sync {
    /// Returns the unique identifier for this stage.
    fn id(&self) -> StageId;

    /// Returns a human-readable name for the stage.
    fn name(&self) -> &str;

    /// Returns the stage IDs that must be executed before this stage.
    fn dependencies(&self) -> &[StageId] {
        &[StageId::Heightmap]
    }

    /// Executes the generation stage, modifying the field in place.
    fn execute(&self, field: &mut TerrainField) -> Result<(), PipelineError>;
}

/// Orchestrates multiple generation stages into a complete pipeline.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn GenerationStage>>,
}

impl Pipeline {
    /// Creates a new empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a stage to the pipeline.
    pub fn add_stage<S: GenerationStage + 'static>(&mut self, stage: S) -> &mut Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Returns the number of stages in the pipeline.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Names of the stages, in execution order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Executes all stages in order on the given field.
    pub fn run(&self, field: &mut TerrainField) -> Result<(), PipelineError> {
        self.run_with_callbacks(field, |_, _, _| {}, |_, _, _| {})
    }

    /// Executes all stages with progress callbacks.
    ///
    /// # Arguments
    /// * `field` - The terrain to generate
    /// * `on_stage_start` - Called when each stage begins
    /// * `on_stage_complete` - Called when each stage finishes
    pub fn run_with_callbacks<F1, F2>(
        &self,
        field: &mut TerrainField,
        mut on_stage_start: F1,
        mut on_stage_complete: F2,
    ) -> Result<(), PipelineError>
    where
        F1: FnMut(&str, usize, usize),
        F2: FnMut(&str, usize, usize),
    {
        let total = self.stages.len();
        let mut completed: Vec<StageId> = Vec::new();

        for (i, stage) in self.stages.iter().enumerate() {
            on_stage_start(stage.name(), i, total);

            for dep in stage.dependencies() {
                if !completed.contains(dep) {
                    return Err(PipelineError::MissingDependency(
                        stage.name().to_string(),
                        dep.name().to_string(),
                    ));
                }
            }

            stage.execute(field)?;
            completed.push(stage.id());

            on_stage_complete(stage.name(), i, total);
        }

        Ok(())
    }
}

/// Fills the elevation with fractal noise.
pub struct HeightmapStage {
    config: NoiseConfig,
}

impl HeightmapStage {
    pub fn new(config: NoiseConfig) -> Self {
        Self { config }
    }
}

impl GenerationStage for HeightmapStage {
    fn id(&self) -> StageId {
        StageId::Heightmap
    }

    fn name(&self) -> &str {
        "Noise Heightmap"
    }

    fn dependencies(&self) -> &[StageId] {
        &[]
    }

    fn execute(&self, field: &mut TerrainField) -> Result<(), PipelineError> {
        generate_heightmap(field, &self.config)?;
        let (min, max) = field.heights().value_range();
        info!(min, max, "noise heightmap generated");
        Ok(())
    }
}

/// Replaces the field with elevations read from an image.
///
/// The field keeps its world bounds; the resolution becomes the image size.
pub struct SourceImageStage {
    path: PathBuf,
    scale_z: f32,
}

impl SourceImageStage {
    pub fn new(path: impl Into<PathBuf>, scale_z: f32) -> Self {
        Self {
            path: path.into(),
            scale_z,
        }
    }
}

impl GenerationStage for SourceImageStage {
    fn id(&self) -> StageId {
        StageId::Heightmap
    }

    fn name(&self) -> &str {
        "Source Heightmap"
    }

    fn dependencies(&self) -> &[StageId] {
        &[]
    }

    fn execute(&self, field: &mut TerrainField) -> Result<(), PipelineError> {
        let (p_min, p_max) = (field.heights().p_min(), field.heights().p_max());
        *field = TerrainField::from_image(&self.path, self.scale_z, p_min, p_max)?;
        Ok(())
    }
}

/// Smooths the elevation with a box filter.
pub struct BlurStage {
    size: usize,
}

impl BlurStage {
    pub fn new(size: usize) -> Self {
        Self { size }
    }
}

impl GenerationStage for BlurStage {
    fn id(&self) -> StageId {
        StageId::Blur
    }

    fn name(&self) -> &str {
        "Blur"
    }

    fn execute(&self, field: &mut TerrainField) -> Result<(), PipelineError> {
        field.blur(self.size);
        info!(size = self.size, "elevation blurred");
        Ok(())
    }
}

/// Thermal plus stream-power erosion.
pub struct ErosionStage {
    config: ErosionConfig,
}

impl ErosionStage {
    pub fn new(config: ErosionConfig) -> Self {
        Self {
            config: config.sanitized(),
        }
    }
}

impl GenerationStage for ErosionStage {
    fn id(&self) -> StageId {
        StageId::Erosion
    }

    fn name(&self) -> &str {
        "Erosion"
    }

    fn execute(&self, field: &mut TerrainField) -> Result<(), PipelineError> {
        let before = field.heights().total();
        field.erode(&self.config);
        info!(
            iterations = self.config.iterations,
            removed = before - field.heights().total(),
            "erosion complete"
        );
        Ok(())
    }
}

/// Floods every cell below a level.
pub struct WaterStage {
    level: f32,
}

impl WaterStage {
    pub fn new(level: f32) -> Self {
        Self { level }
    }
}

impl GenerationStage for WaterStage {
    fn id(&self) -> StageId {
        StageId::Water
    }

    fn name(&self) -> &str {
        "Water Fill"
    }

    fn execute(&self, field: &mut TerrainField) -> Result<(), PipelineError> {
        if !self.level.is_finite() {
            return Err(PipelineError::StageFailed(
                self.name().to_string(),
                format!("water level must be finite, got {}", self.level),
            ));
        }
        field.fill(self.level);
        let wet = field.water().data().iter().filter(|&&w| w > 0.0).count();
        info!(level = self.level, wet_cells = wet, "water filled");
        Ok(())
    }
}

/// Routes and carves one road.
pub struct RoadStage {
    config: RoadConfig,
}

impl RoadStage {
    pub fn new(config: RoadConfig) -> Self {
        Self { config }
    }
}

impl GenerationStage for RoadStage {
    fn id(&self) -> StageId {
        StageId::Road
    }

    fn name(&self) -> &str {
        "Road"
    }

    fn execute(&self, field: &mut TerrainField) -> Result<(), PipelineError> {
        field.road(&self.config)?;
        Ok(())
    }
}
