//! Erosion and hydrology.
//!
//! Thermal and stream-power erosion are passes from one elevation grid to
//! the next; the caller swaps the result in. Flow accumulation feeds the
//! stream-power pass and the wetness/area rasters.

mod config;
mod flow;
mod stream_power;
mod thermal;

pub use config::ErosionConfig;
pub use flow::flow_accumulation;
pub use stream_power::stream_power_erosion;
pub use thermal::thermal_erosion;

use crate::grid::Grid;

/// Flat indices ordered by descending height.
///
/// The sort is stable, so equal heights keep row-major order.
pub(crate) fn descending_order(heights: &Grid<f32>) -> Vec<usize> {
    let data = heights.data();
    let mut order: Vec<usize> = (0..data.len()).collect();
    order.sort_by(|&a, &b| data[b].total_cmp(&data[a]));
    order
}
