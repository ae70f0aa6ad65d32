//! Terrain module.
//!
//! Provides the `TerrainField` (elevation + water layers) and the operators
//! that initialize and reshape it.

mod blur;
mod field;
mod heightmap;

pub use blur::box_blur;
pub use field::{TerrainError, TerrainField};
pub use heightmap::{generate_heightmap, NoiseConfig};
