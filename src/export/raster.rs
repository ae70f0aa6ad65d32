//! Derived layers of a terrain field, flattened into image rasters.
//!
//! Rasters are stored top row first. The top row holds `j = ny - 1`, so the
//! grid's `j` axis points up in the image.

use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::value_range;
use crate::terrain::TerrainField;

use super::color::texture_color;

/// Offset keeping the wetness ratio finite on flat cells.
const SLOPE_EPSILON: f32 = 1e-5;

/// A terrain-derived layer that can be written as an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RasterLayer {
    /// Elevation.
    Height,
    /// Gradient magnitude.
    Slope,
    /// Discrete laplacian.
    Laplacian,
    /// Square root of the accumulated upstream area.
    StreamArea,
    /// `sqrt(ln(area / slope))`, clamped at zero.
    Wetness,
    /// Shaded RGB composite of vegetation, rock, drainage and water.
    Texture,
}

impl RasterLayer {
    pub fn all() -> [RasterLayer; 6] {
        [
            RasterLayer::Height,
            RasterLayer::Slope,
            RasterLayer::Laplacian,
            RasterLayer::StreamArea,
            RasterLayer::Wetness,
            RasterLayer::Texture,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            RasterLayer::Height => "height",
            RasterLayer::Slope => "slope",
            RasterLayer::Laplacian => "laplacian",
            RasterLayer::StreamArea => "stream_area",
            RasterLayer::Wetness => "wetness",
            RasterLayer::Texture => "texture",
        }
    }

    /// Whether the layer is a color image rather than a scalar field.
    pub fn is_color(self) -> bool {
        self == RasterLayer::Texture
    }
}

impl fmt::Display for RasterLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Unknown raster layer '{0}'")]
pub struct UnknownLayer(pub String);

impl FromStr for RasterLayer {
    type Err = UnknownLayer;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        RasterLayer::all()
            .into_iter()
            .find(|layer| layer.name() == wanted)
            .ok_or_else(|| UnknownLayer(s.to_string()))
    }
}

/// Interleaved image samples, top row first.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster<T> {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub data: Vec<T>,
}

impl<T: Copy> Raster<T> {
    /// Builds a raster from samples laid out like the grid (`j = 0` first).
    pub fn from_grid_order(width: usize, height: usize, channels: usize, samples: &[T]) -> Self {
        assert_eq!(
            samples.len(),
            width * height * channels,
            "raster sample count mismatch"
        );
        let row = width * channels;
        let data = samples
            .chunks_exact(row)
            .rev()
            .flat_map(|r| r.iter().copied())
            .collect();
        Self {
            width,
            height,
            channels,
            data,
        }
    }

    /// Samples of pixel `(x, y)`, with `y = 0` the top row.
    pub fn pixel(&self, x: usize, y: usize) -> &[T] {
        let start = (y * self.width + x) * self.channels;
        &self.data[start..start + self.channels]
    }

    pub fn expected_len(&self) -> usize {
        self.width * self.height * self.channels
    }
}

/// Per-cell values of a scalar layer, in grid order.
///
/// Returns `None` for [`RasterLayer::Texture`].
pub fn scalar_values(field: &TerrainField, layer: RasterLayer) -> Option<Vec<f32>> {
    let heights = field.heights();
    let values = match layer {
        RasterLayer::Height => heights.data().to_vec(),
        RasterLayer::Slope => heights.slope_map(),
        RasterLayer::Laplacian => heights.laplacian_map(),
        RasterLayer::StreamArea => field.flow_areas().data().par_iter().map(|a| a.sqrt()).collect(),
        RasterLayer::Wetness => {
            let areas = field.flow_areas();
            areas
                .data()
                .par_iter()
                .zip(heights.slope_map())
                .map(|(&area, slope)| wetness(area, slope))
                .collect()
        }
        RasterLayer::Texture => return None,
    };
    Some(values)
}

/// Topographic wetness index of one cell.
pub fn wetness(area: f32, slope: f32) -> f32 {
    (area / (slope + SLOPE_EPSILON)).ln().max(0.0).sqrt()
}

/// Scalar layer as unnormalized floats (one channel). `None` for the texture.
pub fn float_raster(field: &TerrainField, layer: RasterLayer) -> Option<Raster<f32>> {
    let values = scalar_values(field, layer)?;
    Some(Raster::from_grid_order(field.nx(), field.ny(), 1, &values))
}

/// Maps values linearly so the minimum becomes 0 and the maximum 255.
///
/// A constant input maps to all zeros.
pub fn normalize_u8(values: &[f32]) -> Vec<u8> {
    let (min, max) = value_range(values);
    let range = max - min;
    if !(range > 0.0) {
        return vec![0; values.len()];
    }
    values
        .par_iter()
        .map(|&v| (255.0 * ((v - min) / range)) as u8)
        .collect()
}

/// Renders a layer as an 8-bit raster: normalized gray (1 channel) or RGB.
pub fn render_layer(field: &TerrainField, layer: RasterLayer) -> Raster<u8> {
    match scalar_values(field, layer) {
        Some(values) => Raster::from_grid_order(field.nx(), field.ny(), 1, &normalize_u8(&values)),
        None => texture_raster(field),
    }
}

/// Shaded RGB texture of the field.
pub fn texture_raster(field: &TerrainField) -> Raster<u8> {
    let heights = field.heights();
    let areas = field.flow_areas();
    let water = field.water();

    let samples: Vec<u8> = (0..heights.len())
        .into_par_iter()
        .flat_map_iter(|idx| {
            let (i, j) = heights.coords(idx);
            let color = texture_color(heights.slope(i, j), areas.data()[idx], water.data()[idx]);
            (color * 255.0).to_array().map(|c| c as u8)
        })
        .collect();

    Raster::from_grid_order(field.nx(), field.ny(), 3, &samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use glam::Vec2;

    fn ramp_field() -> TerrainField {
        let data: Vec<f32> = (0..12).map(|k| (k % 4) as f32).collect();
        TerrainField::from_heights(
            Grid::from_data(Vec2::ZERO, Vec2::new(3.0, 2.0), 4, 3, data).unwrap(),
        )
    }

    #[test]
    fn test_layer_names_round_trip() {
        for layer in RasterLayer::all() {
            assert_eq!(layer.name().parse::<RasterLayer>(), Ok(layer));
        }
        assert_eq!("Stream-Area".parse::<RasterLayer>(), Ok(RasterLayer::StreamArea));
        assert!("normals".parse::<RasterLayer>().is_err());
    }

    #[test]
    fn test_normalize_spans_full_range() {
        assert_eq!(normalize_u8(&[2.0, 3.0, 4.0]), vec![0, 127, 255]);
        assert_eq!(normalize_u8(&[5.0, 5.0]), vec![0, 0]);
    }

    #[test]
    fn test_rows_are_flipped() {
        let raster = Raster::from_grid_order(2, 2, 1, &[1, 2, 3, 4]);
        assert_eq!(raster.data, vec![3, 4, 1, 2]);
        assert_eq!(raster.pixel(0, 1), &[1]);
    }

    #[test]
    fn test_height_layer_is_normalized_gray() {
        let raster = render_layer(&ramp_field(), RasterLayer::Height);
        assert_eq!((raster.width, raster.height, raster.channels), (4, 3, 1));
        assert_eq!(raster.pixel(0, 0), &[0]);
        assert_eq!(raster.pixel(3, 2), &[255]);
        assert_eq!(raster.data.len(), raster.expected_len());
    }

    #[test]
    fn test_stream_area_is_sqrt_of_flow() {
        let field = ramp_field();
        let values = scalar_values(&field, RasterLayer::StreamArea).unwrap();
        let areas = field.flow_areas();
        for (v, a) in values.iter().zip(areas.data()) {
            assert!((v * v - a).abs() < 1e-4);
        }
    }

    #[test]
    fn test_wetness_is_never_nan() {
        assert_eq!(wetness(1.0, 10.0), 0.0);
        assert!(wetness(4.0, 0.0) > 0.0);
        let values = scalar_values(&ramp_field(), RasterLayer::Wetness).unwrap();
        assert!(values.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_texture_has_three_channels() {
        let field = ramp_field();
        assert!(scalar_values(&field, RasterLayer::Texture).is_none());
        let raster = render_layer(&field, RasterLayer::Texture);
        assert_eq!(raster.channels, 3);
        assert_eq!(raster.data.len(), 4 * 3 * 3);
    }
}
