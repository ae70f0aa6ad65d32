//! Pipeline module for orchestrating terrain generation stages.
//!
//! Provides a trait-based architecture for modular generation stages
//! that can be composed into a complete scene rebuild.

mod stage;

pub use stage::{
    BlurStage, ErosionStage, GenerationStage, HeightmapStage, Pipeline, PipelineError,
    RoadStage, SourceImageStage, StageId, WaterStage,
};
