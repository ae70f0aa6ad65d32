//! Box filtering of elevation grids.

use rayon::prelude::*;

use crate::grid::Grid;

/// Averages every cell over a `(2 * size + 1)²` window clipped to the grid.
///
/// Only in-bounds samples contribute, so border cells average over fewer
/// samples. The result is a new grid; the input is never read mid-update.
pub fn box_blur(grid: &Grid<f32>, size: usize) -> Grid<f32> {
    let (nx, ny) = (grid.nx(), grid.ny());
    let data: Vec<f32> = (0..grid.len())
        .into_par_iter()
        .map(|idx| {
            let (i, j) = grid.coords(idx);
            let (i0, i1) = (i.saturating_sub(size), (i + size).min(nx - 1));
            let (j0, j1) = (j.saturating_sub(size), (j + size).min(ny - 1));

            let mut total = 0.0f32;
            for sj in j0..=j1 {
                for si in i0..=i1 {
                    total += grid.value(si, sj);
                }
            }
            let count = (i1 - i0 + 1) * (j1 - j0 + 1);
            total / count as f32
        })
        .collect();
    grid.with_samples(data)
}
