//! RAW format export for game engine compatibility.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::terrain::TerrainField;

use super::raster::{float_raster, Raster, RasterLayer};

/// Errors that can occur during RAW export.
#[derive(Error, Debug)]
pub enum RawExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid value range: min ({0}) >= max ({1})")]
    InvalidRange(f32, f32),
    #[error("RAW export needs a single-channel raster, got {0} channels")]
    MultiChannel(usize),
    #[error("Layer '{0}' has no scalar values")]
    NotScalar(RasterLayer),
}

/// RAW export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawFormat {
    /// 16-bit unsigned integer, little-endian (Unity default).
    #[default]
    R16LittleEndian,
    /// 16-bit unsigned integer, big-endian.
    R16BigEndian,
    /// 32-bit float, little-endian (high precision).
    R32Float,
}

impl RawFormat {
    pub fn bytes_per_sample(self) -> u64 {
        match self {
            RawFormat::R16LittleEndian | RawFormat::R16BigEndian => 2,
            RawFormat::R32Float => 4,
        }
    }
}

/// Writes a single-channel raster as headerless samples, top row first.
///
/// # Arguments
/// * `raster` - Values to write
/// * `path` - Output file path
/// * `format` - RAW format (R16 or R32)
/// * `min_value` - Value mapped to 0 (R16 only)
/// * `max_value` - Value mapped to 65535 (R16 only)
pub fn export_raw(
    raster: &Raster<f32>,
    path: &Path,
    format: RawFormat,
    min_value: f32,
    max_value: f32,
) -> Result<(), RawExportError> {
    if raster.channels != 1 {
        return Err(RawExportError::MultiChannel(raster.channels));
    }
    if format != RawFormat::R32Float && !(min_value < max_value) {
        return Err(RawExportError::InvalidRange(min_value, max_value));
    }

    let mut writer = BufWriter::new(File::create(path)?);
    let range = max_value - min_value;
    let quantize = |v: f32| (((v - min_value) / range).clamp(0.0, 1.0) * 65535.0) as u16;

    match format {
        RawFormat::R16LittleEndian => {
            for &v in &raster.data {
                writer.write_all(&quantize(v).to_le_bytes())?;
            }
        }
        RawFormat::R16BigEndian => {
            for &v in &raster.data {
                writer.write_all(&quantize(v).to_be_bytes())?;
            }
        }
        RawFormat::R32Float => {
            for &v in &raster.data {
                writer.write_all(&v.to_le_bytes())?;
            }
        }
    }

    writer.flush()?;
    Ok(())
}

/// Writes a scalar layer of `field`, normalizing R16 output to the layer's range.
pub fn export_layer_raw(
    field: &TerrainField,
    layer: RasterLayer,
    path: &Path,
    format: RawFormat,
) -> Result<(), RawExportError> {
    let raster = float_raster(field, layer).ok_or(RawExportError::NotScalar(layer))?;
    let (min, max) = crate::grid::value_range(&raster.data);
    let max = if max > min { max } else { min + 1.0 };
    export_raw(&raster, path, format, min, max)
}

/// Returns the expected file size for a RAW export.
pub fn expected_file_size(width: usize, height: usize, format: RawFormat) -> u64 {
    (width as u64) * (height as u64) * format.bytes_per_sample()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use glam::Vec2;
    use tempfile::tempdir;

    fn raster(data: Vec<f32>, width: usize) -> Raster<f32> {
        Raster {
            width,
            height: data.len() / width,
            channels: 1,
            data,
        }
    }

    #[test]
    fn test_export_layer_raw_sizes() {
        let field = TerrainField::new(Vec2::ZERO, Vec2::ONE, 16, 8).unwrap();
        let dir = tempdir().unwrap();
        for format in [RawFormat::R16LittleEndian, RawFormat::R16BigEndian, RawFormat::R32Float] {
            let path = dir.path().join(format!("{:?}.raw", format));
            export_layer_raw(&field, RasterLayer::Slope, &path, format).unwrap();
            let len = std::fs::metadata(&path).unwrap().len();
            assert_eq!(len, expected_file_size(16, 8, format));
        }
    }

    #[test]
    fn test_expected_file_size() {
        assert_eq!(expected_file_size(256, 128, RawFormat::R16LittleEndian), 256 * 128 * 2);
        assert_eq!(expected_file_size(256, 128, RawFormat::R32Float), 256 * 128 * 4);
    }

    #[test]
    fn test_raw_content_correctness() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.raw");
        export_raw(
            &raster(vec![-1.0, 0.0, 0.5, 1.0], 2),
            &path,
            RawFormat::R16LittleEndian,
            -1.0,
            1.0,
        )
        .unwrap();

        let data = std::fs::read(&path).unwrap();
        assert_eq!(data.len(), 8);
        assert_eq!(u16::from_le_bytes([data[0], data[1]]), 0);
        let mid = u16::from_le_bytes([data[2], data[3]]);
        assert!((mid as i32 - 32767).abs() < 2);
        assert_eq!(u16::from_le_bytes([data[6], data[7]]), 65535);
    }

    #[test]
    fn test_big_endian_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("be.raw");
        export_raw(&raster(vec![1.0], 1), &path, RawFormat::R16BigEndian, 0.0, 1.0).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), vec![0xff, 0xff]);
    }

    #[test]
    fn test_float_export_is_verbatim_and_flipped() {
        let grid = Grid::from_data(Vec2::ZERO, Vec2::ONE, 2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let field = TerrainField::from_heights(grid);
        let dir = tempdir().unwrap();
        let path = dir.path().join("h.r32");
        export_layer_raw(&field, RasterLayer::Height, &path, RawFormat::R32Float).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let values: Vec<f32> = bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        assert_eq!(values, vec![3.0, 4.0, 1.0, 2.0]);
    }

    #[test]
    fn test_invalid_range() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.raw");
        let result = export_raw(&raster(vec![0.0], 1), &path, RawFormat::R16BigEndian, 1.0, 1.0);
        assert!(matches!(result, Err(RawExportError::InvalidRange(..))));
        // float output ignores the range
        assert!(export_raw(&raster(vec![0.0], 1), &path, RawFormat::R32Float, 1.0, 1.0).is_ok());
    }
}
