//! The terrain field: an elevation grid plus a parallel water-depth layer.

use std::path::Path as FsPath;

use glam::{Vec2, Vec3};
use thiserror::Error;
use tracing::{debug, info};

use crate::erosion::{flow_accumulation, stream_power_erosion, thermal_erosion, ErosionConfig};
use crate::grid::{Grid, GridError};
use crate::mesh::{polygonize, Mesh};
use crate::road::{carve_road, Path, RoadConfig, RoadError, RoadGraph};

use super::blur::box_blur;

/// Errors that can occur while building a terrain field.
#[derive(Error, Debug)]
pub enum TerrainError {
    #[error("Invalid grid: {0}")]
    Grid(#[from] GridError),
    #[error("Image decoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Target height must be positive, got {0}")]
    InvalidHeight(f32),
    #[error("Raster has {got} bytes, expected {expected} for {width}x{height}x{channels}")]
    RasterLength {
        got: usize,
        expected: usize,
        width: usize,
        height: usize,
        channels: usize,
    },
}

/// Elevation and water depth over the same grid.
///
/// Water depth is never negative. Both layers always share one geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainField {
    heights: Grid<f32>,
    water: Grid<f32>,
}

impl TerrainField {
    /// Flat terrain at elevation 0 with no water.
    pub fn new(p_min: Vec2, p_max: Vec2, nx: usize, ny: usize) -> Result<Self, GridError> {
        Ok(Self::from_heights(Grid::new(p_min, p_max, nx, ny, 0.0)?))
    }

    /// Wraps an existing elevation grid with a dry water layer.
    pub fn from_heights(heights: Grid<f32>) -> Self {
        let water = heights.with_samples(vec![0.0; heights.len()]);
        Self { heights, water }
    }

    /// Builds elevations from an 8-bit raster: the first channel of every
    /// pixel, scaled from `[0, 255]` to `[0, scale_z]`.
    pub fn from_samples(
        width: usize,
        height: usize,
        channels: usize,
        pixels: &[u8],
        scale_z: f32,
        p_min: Vec2,
        p_max: Vec2,
    ) -> Result<Self, TerrainError> {
        let expected = width * height * channels.max(1);
        if pixels.len() != expected {
            return Err(TerrainError::RasterLength {
                got: pixels.len(),
                expected,
                width,
                height,
                channels,
            });
        }
        let heights: Vec<f32> = pixels
            .chunks_exact(channels.max(1))
            .map(|px| px[0] as f32 / 255.0 * scale_z)
            .collect();
        Ok(Self::from_heights(Grid::from_data(p_min, p_max, width, height, heights)?))
    }

    /// Loads elevations from an image file (red channel, scaled by `scale_z`).
    ///
    /// The bottom image row becomes `j = 0`, matching the raster exports.
    pub fn from_image(
        path: &FsPath,
        scale_z: f32,
        p_min: Vec2,
        p_max: Vec2,
    ) -> Result<Self, TerrainError> {
        let img = image::imageops::flip_vertical(&image::open(path)?.to_rgb8());
        let (width, height) = img.dimensions();
        info!(
            "loaded heightmap {} ({}x{})",
            path.display(),
            width,
            height
        );
        Self::from_samples(
            width as usize,
            height as usize,
            3,
            img.as_raw(),
            scale_z,
            p_min,
            p_max,
        )
    }

    pub fn heights(&self) -> &Grid<f32> {
        &self.heights
    }

    pub fn water(&self) -> &Grid<f32> {
        &self.water
    }

    /// Replaces the elevation layer. The geometry must not change.
    pub fn set_heights(&mut self, heights: Grid<f32>) {
        assert_eq!(
            (heights.nx(), heights.ny()),
            (self.heights.nx(), self.heights.ny()),
            "elevation layer shape mismatch"
        );
        self.heights = heights;
    }

    /// Mutable access to both layers at once.
    pub(crate) fn layers_mut(&mut self) -> (&mut Grid<f32>, &mut Grid<f32>) {
        (&mut self.heights, &mut self.water)
    }

    pub fn nx(&self) -> usize {
        self.heights.nx()
    }

    pub fn ny(&self) -> usize {
        self.heights.ny()
    }

    pub fn height(&self, i: usize, j: usize) -> f32 {
        self.heights.value(i, j)
    }

    pub fn water_depth(&self, i: usize, j: usize) -> f32 {
        self.water.value(i, j)
    }

    pub fn slope(&self, i: usize, j: usize) -> f32 {
        self.heights.slope(i, j)
    }

    pub fn point(&self, i: usize, j: usize) -> Vec3 {
        self.heights.point(i, j)
    }

    pub fn normal(&self, i: usize, j: usize) -> Vec3 {
        self.heights.normal(i, j)
    }

    /// One thermal erosion pass moving `quantity` of each cell downhill.
    pub fn thermal_erosion(&mut self, quantity: f32) {
        self.heights = thermal_erosion(&self.heights, quantity);
    }

    /// One stream-power incision pass.
    pub fn stream_power_erosion(&mut self, k: f32, n: f32) {
        self.heights = stream_power_erosion(&self.heights, k, n);
    }

    /// Runs `config.iterations` rounds of thermal then stream-power erosion.
    pub fn erode(&mut self, config: &ErosionConfig) {
        for iteration in 0..config.iterations {
            self.thermal_erosion(config.thermal_quantity);
            self.stream_power_erosion(config.k, config.n);
            debug!(iteration, "erosion iteration complete");
        }
    }

    /// Accumulated upstream area per cell.
    pub fn flow_areas(&self) -> Grid<f32> {
        flow_accumulation(&self.heights)
    }

    /// Floods every cell below `level` up to `level`.
    ///
    /// Cells at or above `level` keep whatever water they already had.
    pub fn fill(&mut self, level: f32) {
        for (h, w) in self.heights.data().iter().zip(self.water.data_mut()) {
            if *h < level {
                *w = level - *h;
            }
        }
    }

    /// Box-filters the elevation with a `(2 * size + 1)` window.
    pub fn blur(&mut self, size: usize) {
        self.heights = box_blur(&self.heights, size);
    }

    /// Finds the cheapest path for `config` and carves a road along it.
    ///
    /// Returns the carved path. Identical endpoints carve nothing.
    pub fn road(&mut self, config: &RoadConfig) -> Result<Path, RoadError> {
        let graph = RoadGraph::build(self, &config.cost);
        let path = graph.shortest_path(config.start, config.goal)?;
        if config.start != config.goal {
            carve_road(self, &path, config.half_width);
        }
        info!(
            cells = path.len(),
            cost = path.total_cost(),
            "road carved"
        );
        Ok(path)
    }

    /// Triangulated surface for rendering.
    pub fn polygonize(&self) -> Mesh {
        polygonize(&self.heights)
    }
}
