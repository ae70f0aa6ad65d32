//! Coherent noise used to seed terrain elevation.
//!
//! Uses simdnoise for SIMD-accelerated fBm sampling.

mod fractal;

pub use fractal::{sample_fractal_noise, sample_fractal_noise_batch, FractalNoiseConfig};
