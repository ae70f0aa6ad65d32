//! Grid storage, index conversion and finite-difference operators.

use glam::{Vec2, Vec3};
use rayon::prelude::*;
use thiserror::Error;

/// Errors raised when a grid cannot be constructed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("Grid resolution must be at least 2x2, got {0}x{1}")]
    Resolution(usize, usize),
    #[error("Degenerate bounds: min ({0}, {1}) must be strictly below max ({2}, {3})")]
    DegenerateBounds(f32, f32, f32, f32),
    #[error("Sample count {got} does not match {nx}x{ny} grid")]
    DataLength { got: usize, nx: usize, ny: usize },
}

/// A regular grid of samples over the world-space box `[p_min, p_max]`.
///
/// Samples are stored row-major: cell `(i, j)` lives at `j * nx + i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    p_min: Vec2,
    p_max: Vec2,
    nx: usize,
    ny: usize,
    scale_x: f32,
    scale_y: f32,
    data: Vec<T>,
}

impl<T: Copy> Grid<T> {
    /// Creates a grid with every sample set to `fill`.
    pub fn new(p_min: Vec2, p_max: Vec2, nx: usize, ny: usize, fill: T) -> Result<Self, GridError> {
        Self::from_data(p_min, p_max, nx, ny, vec![fill; nx.saturating_mul(ny)])
    }

    /// Creates a grid from row-major samples.
    pub fn from_data(
        p_min: Vec2,
        p_max: Vec2,
        nx: usize,
        ny: usize,
        data: Vec<T>,
    ) -> Result<Self, GridError> {
        if nx < 2 || ny < 2 {
            return Err(GridError::Resolution(nx, ny));
        }
        if !(p_min.x < p_max.x && p_min.y < p_max.y) {
            return Err(GridError::DegenerateBounds(p_min.x, p_min.y, p_max.x, p_max.y));
        }
        if data.len() != nx * ny {
            return Err(GridError::DataLength { got: data.len(), nx, ny });
        }

        let scale_x = (p_max.x - p_min.x) / (nx - 1) as f32;
        let scale_y = (p_max.y - p_min.y) / (ny - 1) as f32;
        // Bounds so close together that the spacing underflows are just as degenerate.
        if !(scale_x > 0.0 && scale_y > 0.0 && scale_x.is_finite() && scale_y.is_finite()) {
            return Err(GridError::DegenerateBounds(p_min.x, p_min.y, p_max.x, p_max.y));
        }

        Ok(Self {
            p_min,
            p_max,
            nx,
            ny,
            scale_x,
            scale_y,
            data,
        })
    }

    /// Returns a grid with the same geometry holding `data` instead.
    pub fn with_samples<U: Copy>(&self, data: Vec<U>) -> Grid<U> {
        assert_eq!(data.len(), self.data.len(), "sample count mismatch");
        Grid {
            p_min: self.p_min,
            p_max: self.p_max,
            nx: self.nx,
            ny: self.ny,
            scale_x: self.scale_x,
            scale_y: self.scale_y,
            data,
        }
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn p_min(&self) -> Vec2 {
        self.p_min
    }

    pub fn p_max(&self) -> Vec2 {
        self.p_max
    }

    /// World distance between two adjacent columns.
    pub fn scale_x(&self) -> f32 {
        self.scale_x
    }

    /// World distance between two adjacent rows.
    pub fn scale_y(&self) -> f32 {
        self.scale_y
    }

    /// Number of cells (`nx * ny`).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major samples.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// Flat index of cell `(i, j)`. Panics when out of range.
    #[inline]
    pub fn index(&self, i: usize, j: usize) -> usize {
        assert!(
            i < self.nx && j < self.ny,
            "cell ({}, {}) out of bounds for {}x{} grid",
            i,
            j,
            self.nx,
            self.ny
        );
        j * self.nx + i
    }

    /// Inverse of [`Grid::index`]. Panics when out of range.
    #[inline]
    pub fn coords(&self, index: usize) -> (usize, usize) {
        assert!(
            index < self.data.len(),
            "index {} out of bounds for {}x{} grid",
            index,
            self.nx,
            self.ny
        );
        (index % self.nx, index / self.nx)
    }

    /// Applies a signed offset to `(i, j)`, returning `None` when it leaves the grid.
    #[inline]
    pub fn offset(&self, i: usize, j: usize, di: i32, dj: i32) -> Option<(usize, usize)> {
        let ni = i as i64 + di as i64;
        let nj = j as i64 + dj as i64;
        if ni >= 0 && nj >= 0 && (ni as usize) < self.nx && (nj as usize) < self.ny {
            Some((ni as usize, nj as usize))
        } else {
            None
        }
    }

    #[inline]
    pub fn value(&self, i: usize, j: usize) -> T {
        self.data[self.index(i, j)]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        let idx = self.index(i, j);
        self.data[idx] = value;
    }
}

impl Grid<f32> {
    /// Central-difference gradient.
    ///
    /// At a border the missing neighbor is replaced by the cell itself, so the
    /// difference becomes one-sided while the denominator stays `2 * scale`.
    pub fn gradient(&self, i: usize, j: usize) -> Vec2 {
        let (il, ir) = (i.saturating_sub(1), (i + 1).min(self.nx - 1));
        let (jl, jr) = (j.saturating_sub(1), (j + 1).min(self.ny - 1));

        let gx = (self.value(ir, j) - self.value(il, j)) / (2.0 * self.scale_x);
        let gy = (self.value(i, jr) - self.value(i, jl)) / (2.0 * self.scale_y);
        Vec2::new(gx, gy)
    }

    /// Gradient magnitude.
    pub fn slope(&self, i: usize, j: usize) -> f32 {
        self.gradient(i, j).length()
    }

    /// Discrete 4-neighbor laplacian normalized by the cell area.
    pub fn laplacian(&self, i: usize, j: usize) -> f32 {
        let (il, ir) = (i.saturating_sub(1), (i + 1).min(self.nx - 1));
        let (jl, jr) = (j.saturating_sub(1), (j + 1).min(self.ny - 1));

        let num = self.value(il, j) + self.value(ir, j) + self.value(i, jl) + self.value(i, jr)
            - 4.0 * self.value(i, j);
        num / (self.scale_x * self.scale_y)
    }

    /// Surface point `(i * scale_x, j * scale_y, value)`.
    pub fn point(&self, i: usize, j: usize) -> Vec3 {
        Vec3::new(i as f32 * self.scale_x, j as f32 * self.scale_y, self.value(i, j))
    }

    /// Unit surface normal derived from the gradient.
    pub fn normal(&self, i: usize, j: usize) -> Vec3 {
        let g = self.gradient(i, j);
        Vec3::new(-g.x, -g.y, 1.0).normalize()
    }

    /// Slope magnitude for every cell, row-major.
    pub fn slope_map(&self) -> Vec<f32> {
        (0..self.len())
            .into_par_iter()
            .map(|idx| {
                let (i, j) = self.coords(idx);
                self.slope(i, j)
            })
            .collect()
    }

    /// Laplacian for every cell, row-major.
    pub fn laplacian_map(&self) -> Vec<f32> {
        (0..self.len())
            .into_par_iter()
            .map(|idx| {
                let (i, j) = self.coords(idx);
                self.laplacian(i, j)
            })
            .collect()
    }

    /// Minimum and maximum sample.
    pub fn value_range(&self) -> (f32, f32) {
        value_range(&self.data)
    }

    /// Sum of all samples, accumulated in `f64`.
    pub fn total(&self) -> f64 {
        self.data.iter().map(|&v| v as f64).sum()
    }
}

/// Minimum and maximum of a slice (`(f32::MAX, f32::MIN)` when empty).
pub(crate) fn value_range(values: &[f32]) -> (f32, f32) {
    values.iter().fold((f32::MAX, f32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}
