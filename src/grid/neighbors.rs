//! Fixed-stencil neighbor enumeration on a bounded grid.
//!
//! Every topology is a static offset table listed in row-major order
//! (`dj` outer, `di` inner). Offsets that fall outside the grid are dropped,
//! never wrapped or reflected.

use serde::{Deserialize, Serialize};

use super::Grid;

/// Neighborhood stencil.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topology {
    /// The four axis-aligned neighbors.
    Cross4,
    /// The full 3x3 ring.
    Ring8,
    /// `Ring8` plus the eight cells of `[-2,2]²` at Manhattan distance 3.
    Diamond16,
    /// `Diamond16` plus the sixteen cells of `[-3,3]²` at Chebyshev distance 3
    /// and Manhattan distance 4 or 5.
    Diamond32,
}

const CROSS_4: [(i32, i32); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];

#[rustfmt::skip]
const RING_8: [(i32, i32); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0),           (1, 0),
    (-1, 1),  (0, 1),  (1, 1),
];

#[rustfmt::skip]
const DIAMOND_16: [(i32, i32); 16] = [
    (-1, -2), (1, -2),
    (-2, -1), (-1, -1), (0, -1), (1, -1), (2, -1),
    (-1, 0), (1, 0),
    (-2, 1), (-1, 1), (0, 1), (1, 1), (2, 1),
    (-1, 2), (1, 2),
];

#[rustfmt::skip]
const DIAMOND_32: [(i32, i32); 32] = [
    (-2, -3), (-1, -3), (1, -3), (2, -3),
    (-3, -2), (-1, -2), (1, -2), (3, -2),
    (-3, -1), (-2, -1), (-1, -1), (0, -1), (1, -1), (2, -1), (3, -1),
    (-1, 0), (1, 0),
    (-3, 1), (-2, 1), (-1, 1), (0, 1), (1, 1), (2, 1), (3, 1),
    (-3, 2), (-1, 2), (1, 2), (3, 2),
    (-2, 3), (-1, 3), (1, 3), (2, 3),
];

impl Topology {
    /// Offsets `(di, dj)` of the stencil, in enumeration order.
    pub fn offsets(self) -> &'static [(i32, i32)] {
        match self {
            Topology::Cross4 => &CROSS_4,
            Topology::Ring8 => &RING_8,
            Topology::Diamond16 => &DIAMOND_16,
            Topology::Diamond32 => &DIAMOND_32,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Topology::Cross4 => "cross-4",
            Topology::Ring8 => "ring-8",
            Topology::Diamond16 => "diamond-16",
            Topology::Diamond32 => "diamond-32",
        }
    }
}

/// A neighbor seen from a reference cell.
///
/// `slope` is the signed directional slope from the reference cell: positive
/// when this neighbor is higher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub i: usize,
    pub j: usize,
    pub height: f32,
    pub slope: f32,
}

impl Grid<f32> {
    /// World-space horizontal distance between `(i, j)` and `(ni, nj)`.
    pub fn distance(&self, i: usize, j: usize, ni: usize, nj: usize) -> f32 {
        let dx = (ni as f32 - i as f32) * self.scale_x();
        let dy = (nj as f32 - j as f32) * self.scale_y();
        (dx * dx + dy * dy).sqrt()
    }

    /// `(value(ni, nj) - value(i, j)) / distance`. The cells must differ.
    pub fn directional_slope(&self, i: usize, j: usize, ni: usize, nj: usize) -> f32 {
        debug_assert!((i, j) != (ni, nj), "directional slope needs two distinct cells");
        (self.value(ni, nj) - self.value(i, j)) / self.distance(i, j, ni, nj)
    }

    /// In-bounds neighbors of `(i, j)` for the given stencil.
    pub fn neighbors(&self, i: usize, j: usize, topology: Topology) -> Vec<Cell> {
        let offsets = topology.offsets();
        let mut out = Vec::with_capacity(offsets.len());
        for &(di, dj) in offsets {
            if let Some((ni, nj)) = self.offset(i, j, di, dj) {
                out.push(Cell {
                    i: ni,
                    j: nj,
                    height: self.value(ni, nj),
                    slope: self.directional_slope(i, j, ni, nj),
                });
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use std::collections::HashSet;

    const ALL: [Topology; 4] = [
        Topology::Cross4,
        Topology::Ring8,
        Topology::Diamond16,
        Topology::Diamond32,
    ];

    fn manhattan(&(di, dj): &(i32, i32)) -> i32 {
        di.abs() + dj.abs()
    }

    fn chebyshev(&(di, dj): &(i32, i32)) -> i32 {
        di.abs().max(dj.abs())
    }

    #[test]
    fn test_offset_tables_are_distinct_and_row_major() {
        for topology in ALL {
            let offsets = topology.offsets();
            let unique: HashSet<_> = offsets.iter().collect();
            assert_eq!(unique.len(), offsets.len(), "{} has duplicates", topology.name());
            assert!(!offsets.contains(&(0, 0)));

            let mut sorted = offsets.to_vec();
            sorted.sort_by_key(|&(di, dj)| (dj, di));
            assert_eq!(sorted, offsets, "{} is not row-major", topology.name());
        }
    }

    #[test]
    fn test_stencil_shapes() {
        assert_eq!(Topology::Cross4.offsets().len(), 4);
        assert!(Topology::Cross4.offsets().iter().all(|o| manhattan(o) == 1));

        assert_eq!(Topology::Ring8.offsets().len(), 8);
        assert!(Topology::Ring8.offsets().iter().all(|o| chebyshev(o) == 1));

        let d16 = Topology::Diamond16.offsets();
        assert_eq!(d16.len(), 16);
        let outer16: Vec<_> = d16.iter().filter(|o| chebyshev(o) > 1).collect();
        assert_eq!(outer16.len(), 8);
        assert!(outer16.iter().all(|o| manhattan(o) == 3 && chebyshev(o) == 2));

        let d32 = Topology::Diamond32.offsets();
        assert_eq!(d32.len(), 32);
        assert!(d16.iter().all(|o| d32.contains(o)));
        let outer32: Vec<_> = d32.iter().filter(|o| chebyshev(o) == 3).collect();
        assert_eq!(outer32.len(), 16);
        assert!(outer32.iter().all(|o| manhattan(o) == 4 || manhattan(o) == 5));
    }

    #[test]
    fn test_neighbors_clipped_at_corner() {
        let grid = Grid::new(Vec2::ZERO, Vec2::new(9.0, 9.0), 10, 10, 0.0f32).unwrap();
        assert_eq!(grid.neighbors(0, 0, Topology::Cross4).len(), 2);
        assert_eq!(grid.neighbors(0, 0, Topology::Ring8).len(), 3);
        // (1,0) (0,1) (1,1) (2,1) (1,2)
        assert_eq!(grid.neighbors(0, 0, Topology::Diamond16).len(), 5);
        assert_eq!(grid.neighbors(5, 5, Topology::Diamond32).len(), 32);
    }

    #[test]
    fn test_cross4_order() {
        let grid = Grid::new(Vec2::ZERO, Vec2::new(2.0, 2.0), 3, 3, 0.0f32).unwrap();
        let cells: Vec<_> = grid
            .neighbors(1, 1, Topology::Cross4)
            .iter()
            .map(|c| (c.i, c.j))
            .collect();
        assert_eq!(cells, vec![(1, 0), (0, 1), (2, 1), (1, 2)]);
    }

    #[test]
    fn test_directional_slope_sign_and_distance() {
        let mut grid = Grid::new(Vec2::ZERO, Vec2::new(2.0, 4.0), 3, 3, 0.0f32).unwrap();
        // scale_x = 1, scale_y = 2
        grid.set(1, 1, 1.0);
        grid.set(2, 2, 3.0);

        let cells = grid.neighbors(1, 1, Topology::Ring8);
        let left = cells.iter().find(|c| (c.i, c.j) == (0, 1)).unwrap();
        assert_eq!(left.slope, -1.0);
        let below = cells.iter().find(|c| (c.i, c.j) == (1, 0)).unwrap();
        assert_eq!(below.slope, -0.5);
        let diag = cells.iter().find(|c| (c.i, c.j) == (2, 2)).unwrap();
        assert!((diag.slope - 2.0 / 5.0f32.sqrt()).abs() < 1e-6);
        assert_eq!(diag.height, 3.0);
    }
}
