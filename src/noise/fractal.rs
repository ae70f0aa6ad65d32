//! Multi-octave fractal Brownian motion (fBm) noise on the plane.

use glam::Vec2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use simdnoise::NoiseBuilder;

/// Configuration for multi-octave fractal noise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FractalNoiseConfig {
    /// Number of noise octaves.
    pub octaves: u8,
    /// Base frequency applied to the sample position.
    pub frequency: f32,
    /// Frequency multiplier per octave.
    pub lacunarity: f32,
    /// Amplitude decay per octave.
    pub persistence: f32,
    /// Seed for reproducible generation.
    pub seed: i32,
}

impl Default for FractalNoiseConfig {
    fn default() -> Self {
        Self {
            octaves: 6,
            frequency: 1.0,
            lacunarity: 2.0,
            persistence: 0.5,
            seed: 42,
        }
    }
}

impl FractalNoiseConfig {
    pub fn with_seed(seed: i32) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }
}

fn octave_sample(pos: Vec2, frequency: f32, seed: i32) -> f32 {
    NoiseBuilder::fbm_2d_offset(pos.x * frequency, 1, pos.y * frequency, 1)
        .with_seed(seed)
        .with_freq(1.0)
        .with_octaves(1)
        .generate()
        .0[0]
}

/// Samples fractal noise at a 2D position.
///
/// The result is the amplitude-weighted mean of the octaves. simdnoise's raw
/// fBm output is centered on zero but much narrower than `[-1, 1]`, so
/// callers stretch a batch of samples to the range they need.
pub fn sample_fractal_noise(pos: Vec2, config: &FractalNoiseConfig) -> f32 {
    let mut total = 0.0f32;
    let mut amplitude = 1.0f32;
    let mut frequency = config.frequency;
    let mut max_amplitude = 0.0f32;

    for octave in 0..config.octaves {
        let octave_seed = config.seed.wrapping_add(octave as i32 * 31337);
        total += octave_sample(pos, frequency, octave_seed) * amplitude;
        max_amplitude += amplitude;
        amplitude *= config.persistence;
        frequency *= config.lacunarity;
    }

    if max_amplitude > 0.0 {
        total / max_amplitude
    } else {
        0.0
    }
}

/// Samples fractal noise for many positions in parallel.
pub fn sample_fractal_noise_batch(positions: &[Vec2], config: &FractalNoiseConfig) -> Vec<f32> {
    positions
        .par_iter()
        .map(|&pos| sample_fractal_noise(pos, config))
        .collect()
}
