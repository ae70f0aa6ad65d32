//! Erosion configuration.

use serde::{Deserialize, Serialize};

/// Parameters for the erosion loop run on every scene rebuild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErosionConfig {
    /// Number of (thermal, stream-power) rounds.
    pub iterations: u32,
    /// Fraction of a cell's height moved to its steepest Cross-4 neighbor (0-1).
    pub thermal_quantity: f32,
    /// Stream-power coefficient (k >= 0).
    pub k: f32,
    /// Slope exponent of the stream-power law.
    pub n: f32,
}

impl Default for ErosionConfig {
    fn default() -> Self {
        Self {
            iterations: 20,
            thermal_quantity: 0.002,
            k: 0.00005,
            n: 1.0,
        }
    }
}

impl ErosionConfig {
    /// A configuration that leaves the terrain untouched.
    pub fn disabled() -> Self {
        Self {
            iterations: 0,
            ..Default::default()
        }
    }

    /// Clamps the parameters into their valid ranges.
    pub fn sanitized(&self) -> Self {
        Self {
            iterations: self.iterations,
            thermal_quantity: self.thermal_quantity.clamp(0.0, 1.0),
            k: self.k.max(0.0),
            n: self.n,
        }
    }
}
