//! Heightmap initialization using fractal noise.

use glam::Vec2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::grid::value_range;
use crate::noise::{sample_fractal_noise_batch, FractalNoiseConfig};

use super::field::{TerrainError, TerrainField};

/// Parameters for seeding a terrain field with noise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// Number of noise periods across the grid along `i`.
    pub frequency_x: f32,
    /// Number of noise periods across the grid along `j`.
    pub frequency_y: f32,
    /// Elevation reached by the highest noise value. Must be positive.
    pub height: f32,
    /// Octave stack used for each sample.
    pub fractal: FractalNoiseConfig,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            frequency_x: 10.0,
            frequency_y: 10.0,
            height: 0.1,
            fractal: FractalNoiseConfig::default(),
        }
    }
}

/// Overwrites every elevation with noise stretched over `[0, config.height]`.
///
/// Cell `(i, j)` samples the noise at `(i * fx / nx, j * fy / ny)`. The lowest
/// sample maps to 0 and the highest to `config.height`; a constant sample set
/// (no octaves) leaves the field flat at 0.
pub fn generate_heightmap(field: &mut TerrainField, config: &NoiseConfig) -> Result<(), TerrainError> {
    if !(config.height > 0.0) {
        return Err(TerrainError::InvalidHeight(config.height));
    }

    let grid = field.heights();
    let (nx, ny) = (grid.nx(), grid.ny());
    let step = Vec2::new(config.frequency_x / nx as f32, config.frequency_y / ny as f32);

    let positions: Vec<Vec2> = (0..grid.len())
        .map(|idx| Vec2::new((idx % nx) as f32, (idx / nx) as f32) * step)
        .collect();
    let noise = sample_fractal_noise_batch(&positions, &config.fractal);
    let (min, max) = value_range(&noise);
    let range = max - min;
    let samples: Vec<f32> = if range > 0.0 {
        noise
            .into_par_iter()
            .map(|n| ((n - min) / range).clamp(0.0, 1.0) * config.height)
            .collect()
    } else {
        vec![0.0; noise.len()]
    };

    let heights = grid.with_samples(samples);
    field.set_heights(heights);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> TerrainField {
        TerrainField::new(Vec2::ZERO, Vec2::ONE, 32, 24).unwrap()
    }

    #[test]
    fn test_generate_heightmap_range() {
        let mut field = field();
        let config = NoiseConfig::default();
        generate_heightmap(&mut field, &config).unwrap();

        let (min, max) = field.heights().value_range();
        assert!(min.abs() < 1e-6, "lowest cell should sit at 0, got {}", min);
        assert!(
            (max - config.height).abs() < 1e-6,
            "highest cell should reach {}, got {}",
            config.height,
            max
        );
    }

    #[test]
    fn test_heightmap_spans_target_height_on_large_grid() {
        let mut field = TerrainField::new(Vec2::ZERO, Vec2::ONE, 250, 250).unwrap();
        let config = NoiseConfig {
            height: 2.5,
            ..Default::default()
        };
        generate_heightmap(&mut field, &config).unwrap();

        let (min, max) = field.heights().value_range();
        assert!(max - min > 0.5 * config.height);
        let mean = field.heights().total() / field.heights().len() as f64;
        assert!(mean > 0.1 * config.height as f64 && mean < 0.9 * config.height as f64);
    }

    #[test]
    fn test_zero_octaves_gives_flat_ground() {
        let mut field = field();
        let config = NoiseConfig {
            fractal: FractalNoiseConfig {
                octaves: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        generate_heightmap(&mut field, &config).unwrap();
        assert!(field.heights().data().iter().all(|&h| h == 0.0));
    }

    #[test]
    fn test_heightmap_reproducibility() {
        let config = NoiseConfig {
            fractal: FractalNoiseConfig::with_seed(999),
            ..Default::default()
        };
        let mut a = field();
        let mut b = field();
        generate_heightmap(&mut a, &config).unwrap();
        generate_heightmap(&mut b, &config).unwrap();
        assert_eq!(a, b, "Same configuration should produce identical heights");
    }

    #[test]
    fn test_rejects_non_positive_height() {
        let mut field = field();
        for height in [0.0, -1.0, f32::NAN] {
            let config = NoiseConfig {
                height,
                ..Default::default()
            };
            assert!(matches!(
                generate_heightmap(&mut field, &config),
                Err(TerrainError::InvalidHeight(_))
            ));
        }
        assert!(field.heights().data().iter().all(|&h| h == 0.0));
    }
}
