//! Multiple-flow-direction accumulation of upstream area.

use crate::grid::{Grid, Topology};

use super::descending_order;

/// Accumulated contributing area per cell, in cells.
///
/// Every cell starts with an area of 1. Cells are visited once, highest
/// first, so a cell has received everything from its higher neighbors before
/// it hands its own area on. Each cell splits its area across its lower Ring-8
/// neighbors in proportion to the directional slope toward them. Cells with no
/// lower neighbor keep their area.
pub fn flow_accumulation(heights: &Grid<f32>) -> Grid<f32> {
    let mut areas = vec![1.0f32; heights.len()];

    for idx in descending_order(heights) {
        let (i, j) = heights.coords(idx);
        let downhill: Vec<_> = heights
            .neighbors(i, j, Topology::Ring8)
            .into_iter()
            .filter(|n| n.slope < 0.0)
            .collect();

        let total_slope: f32 = downhill.iter().map(|n| n.slope).sum();
        if total_slope == 0.0 {
            continue;
        }

        let area = areas[idx];
        for n in &downhill {
            areas[heights.index(n.i, n.j)] += area * (n.slope / total_slope);
        }
    }

    heights.with_samples(areas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn grid_from_fn(nx: usize, ny: usize, f: impl Fn(usize, usize) -> f32) -> Grid<f32> {
        let mut grid = Grid::new(Vec2::ZERO, Vec2::new((nx - 1) as f32, (ny - 1) as f32), nx, ny, 0.0)
            .unwrap();
        for j in 0..ny {
            for i in 0..nx {
                grid.set(i, j, f(i, j));
            }
        }
        grid
    }

    #[test]
    fn test_flat_field_keeps_unit_area() {
        let grid = Grid::new(Vec2::ZERO, Vec2::ONE, 3, 3, 1.0f32).unwrap();
        let areas = flow_accumulation(&grid);
        assert!(areas.data().iter().all(|&a| a == 1.0));
    }

    #[test]
    fn test_peak_spreads_by_slope() {
        let grid = grid_from_fn(3, 3, |i, j| if (i, j) == (1, 1) { 1.0 } else { 0.0 });
        let areas = flow_accumulation(&grid);

        assert_eq!(areas.value(1, 1), 1.0);
        // axis neighbors are steeper than diagonal ones
        let axis = areas.value(1, 0);
        let diag = areas.value(0, 0);
        assert!(axis > diag && diag > 1.0);
        let weight_sum = 4.0 + 4.0 / 2.0f32.sqrt();
        assert!((axis - (1.0 + 1.0 / weight_sum)).abs() < 1e-6);

        let total: f32 = areas.data().iter().sum::<f32>() - areas.value(1, 1);
        assert!((total - 9.0).abs() < 1e-5);
    }

    #[test]
    fn test_ramp_drains_into_lowest_column() {
        let grid = grid_from_fn(5, 5, |i, _| 4.0 - i as f32);
        let areas = flow_accumulation(&grid);

        let sink_total: f32 = (0..5).map(|j| areas.value(4, j)).sum();
        assert!((sink_total - 25.0).abs() < 1e-4);
        // the top column receives nothing
        assert!((0..5).all(|j| areas.value(0, j) == 1.0));
        // area never decreases downhill along a row
        for j in 0..5 {
            for i in 0..4 {
                assert!(areas.value(i + 1, j) >= areas.value(i, j));
            }
        }
    }

    #[test]
    fn test_same_geometry_as_input() {
        let grid = grid_from_fn(4, 2, |i, j| (i * j) as f32);
        let areas = flow_accumulation(&grid);
        assert_eq!((areas.nx(), areas.ny()), (4, 2));
        assert_eq!(areas.scale_x(), grid.scale_x());
    }
}
