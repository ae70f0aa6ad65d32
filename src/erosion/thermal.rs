//! Thermal erosion: steepest-descent material transfer.

use crate::grid::{Cell, Grid, Topology};

use super::descending_order;

/// One thermal erosion pass.
///
/// Cells are visited in descending order of their height at the start of the
/// pass. Each visited cell moves `quantity` times its current height to its
/// steepest-descent Cross-4 neighbor, provided that neighbor is lower. Later
/// visits see the transfers made by earlier ones. Ties between equally steep
/// neighbors go to the first one in Cross-4 order.
///
/// Material is only moved, never created or destroyed.
pub fn thermal_erosion(heights: &Grid<f32>, quantity: f32) -> Grid<f32> {
    let order = descending_order(heights);
    let mut out = heights.clone();

    for idx in order {
        let (i, j) = out.coords(idx);
        let Some(lowest) = steepest_descent(&out, i, j) else {
            continue;
        };
        if lowest.slope >= 0.0 {
            continue;
        }

        let moved = out.value(i, j) * quantity;
        let target = out.index(lowest.i, lowest.j);
        out.data_mut()[target] += moved;
        out.data_mut()[idx] -= moved;
    }

    out
}

/// The Cross-4 neighbor with the smallest directional slope (first wins on ties).
fn steepest_descent(heights: &Grid<f32>, i: usize, j: usize) -> Option<Cell> {
    heights
        .neighbors(i, j, Topology::Cross4)
        .into_iter()
        .fold(None, |best, cell| match best {
            Some(b) if b.slope <= cell.slope => Some(b),
            _ => Some(cell),
        })
}
