//! Road routing parameters.

use serde::{Deserialize, Serialize};

/// Multipliers applied to the length of each road graph edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadCost {
    /// Penalty per unit of slope at the edge's target cell.
    pub slope_cost: f32,
    /// Penalty per unit of shallow water at the edge's source cell.
    pub water_low_cost: f32,
    /// Penalty per unit of deep water at the edge's source cell.
    pub water_high_cost: f32,
    /// Depth separating shallow from deep water.
    pub water_threshold: f32,
}

impl Default for RoadCost {
    fn default() -> Self {
        Self {
            slope_cost: 0.0,
            water_low_cost: 1.0,
            water_high_cost: 100.0,
            water_threshold: 0.01,
        }
    }
}

impl RoadCost {
    /// Multiplier term contributed by `depth` of standing water.
    pub fn water_term(&self, depth: f32) -> f32 {
        if depth < self.water_threshold {
            depth * self.water_low_cost
        } else {
            depth * self.water_high_cost
        }
    }
}

/// A single road query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadConfig {
    /// Start cell `(i, j)`.
    pub start: (usize, usize),
    /// Destination cell `(i, j)`.
    pub goal: (usize, usize),
    /// Corridor half-width in cells.
    #[serde(default = "default_half_width")]
    pub half_width: usize,
    #[serde(default)]
    pub cost: RoadCost,
}

fn default_half_width() -> usize {
    2
}

impl RoadConfig {
    /// Road between two cells with default width and costs.
    pub fn between(start: (usize, usize), goal: (usize, usize)) -> Self {
        Self {
            start,
            goal,
            half_width: default_half_width(),
            cost: RoadCost::default(),
        }
    }
}
