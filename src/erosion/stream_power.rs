//! Stream-power fluvial incision.

use rayon::prelude::*;

use crate::grid::Grid;

use super::flow_accumulation;

/// One stream-power pass: `h - k * sqrt(area) * slope^n` for every cell.
///
/// Area comes from a single flow accumulation over the input and slope is
/// read from the input too, so the update never sees its own writes.
pub fn stream_power_erosion(heights: &Grid<f32>, k: f32, n: f32) -> Grid<f32> {
    let areas = flow_accumulation(heights);

    let data: Vec<f32> = (0..heights.len())
        .into_par_iter()
        .map(|idx| {
            let (i, j) = heights.coords(idx);
            let incision = k * areas.data()[idx].sqrt() * heights.slope(i, j).powf(n);
            heights.data()[idx] - incision
        })
        .collect();

    heights.with_samples(data)
}
