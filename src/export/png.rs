//! PNG export of terrain rasters.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder};
use thiserror::Error;

use crate::terrain::TerrainField;

use super::raster::{float_raster, render_layer, Raster, RasterLayer};

/// Errors that can occur during PNG export.
#[derive(Error, Debug)]
pub enum PngExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid value range: min ({0}) >= max ({1})")]
    InvalidRange(f32, f32),
    #[error("Unsupported channel count {0} (expected 1 or 3)")]
    UnsupportedChannels(usize),
    #[error("Raster holds {got} samples, expected {expected}")]
    InvalidLength { got: usize, expected: usize },
    #[error("Layer '{0}' has no scalar values")]
    NotScalar(RasterLayer),
}

/// Options for PNG export.
#[derive(Debug, Clone)]
pub struct PngExportOptions {
    pub compression: CompressionType,
    pub filter: FilterType,
}

impl Default for PngExportOptions {
    fn default() -> Self {
        Self {
            compression: CompressionType::Default,
            filter: FilterType::Adaptive,
        }
    }
}

fn check_len<T: Copy>(raster: &Raster<T>) -> Result<(), PngExportError> {
    if raster.data.len() != raster.expected_len() {
        return Err(PngExportError::InvalidLength {
            got: raster.data.len(),
            expected: raster.expected_len(),
        });
    }
    Ok(())
}

fn encoder(path: &Path, options: &PngExportOptions) -> Result<PngEncoder<BufWriter<File>>, PngExportError> {
    let writer = BufWriter::new(File::create(path)?);
    Ok(PngEncoder::new_with_quality(writer, options.compression, options.filter))
}

/// Writes an 8-bit raster as a grayscale (1 channel) or RGB (3 channels) PNG.
pub fn export_png(
    raster: &Raster<u8>,
    path: &Path,
    options: &PngExportOptions,
) -> Result<(), PngExportError> {
    let color = match raster.channels {
        1 => ExtendedColorType::L8,
        3 => ExtendedColorType::Rgb8,
        n => return Err(PngExportError::UnsupportedChannels(n)),
    };
    check_len(raster)?;

    encoder(path, options)?.write_image(
        &raster.data,
        raster.width as u32,
        raster.height as u32,
        color,
    )?;
    Ok(())
}

/// Writes a single-channel float raster as a 16-bit grayscale PNG.
///
/// `min_value` maps to 0 and `max_value` to 65535; values outside the range
/// are clamped.
pub fn export_png16(
    raster: &Raster<f32>,
    path: &Path,
    min_value: f32,
    max_value: f32,
    options: &PngExportOptions,
) -> Result<(), PngExportError> {
    if !(min_value < max_value) {
        return Err(PngExportError::InvalidRange(min_value, max_value));
    }
    if raster.channels != 1 {
        return Err(PngExportError::UnsupportedChannels(raster.channels));
    }
    check_len(raster)?;

    let range = max_value - min_value;
    let samples: Vec<u16> = raster
        .data
        .iter()
        .map(|&v| (((v - min_value) / range).clamp(0.0, 1.0) * 65535.0) as u16)
        .collect();

    // The encoder takes native-endian samples and swaps them itself.
    let bytes: &[u8] = bytemuck::cast_slice(&samples);

    encoder(path, options)?.write_image(
        bytes,
        raster.width as u32,
        raster.height as u32,
        ExtendedColorType::L16,
    )?;
    Ok(())
}

/// Renders `layer` of `field` and writes it as an 8-bit PNG.
pub fn export_layer_png(
    field: &TerrainField,
    layer: RasterLayer,
    path: &Path,
    options: &PngExportOptions,
) -> Result<(), PngExportError> {
    export_png(&render_layer(field, layer), path, options)
}

/// Writes a scalar layer as a 16-bit PNG normalized to its own range.
pub fn export_layer_png16(
    field: &TerrainField,
    layer: RasterLayer,
    path: &Path,
    options: &PngExportOptions,
) -> Result<(), PngExportError> {
    let raster = float_raster(field, layer).ok_or(PngExportError::NotScalar(layer))?;
    let (min, max) = crate::grid::value_range(&raster.data);
    // a constant layer still gets a valid range
    let max = if max > min { max } else { min + 1.0 };
    export_png16(&raster, path, min, max, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use glam::Vec2;
    use tempfile::tempdir;

    fn field() -> TerrainField {
        let data: Vec<f32> = (0..20).map(|k| (k as f32 * 0.7).sin()).collect();
        TerrainField::from_heights(
            Grid::from_data(Vec2::ZERO, Vec2::new(4.0, 3.0), 5, 4, data).unwrap(),
        )
    }

    #[test]
    fn test_export_gray_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("height.png");
        export_layer_png(&field(), RasterLayer::Height, &path, &PngExportOptions::default())
            .unwrap();

        let img = image::open(&path).unwrap().into_luma8();
        assert_eq!(img.dimensions(), (5, 4));
        let raster = render_layer(&field(), RasterLayer::Height);
        assert_eq!(img.as_raw(), &raster.data);
    }

    #[test]
    fn test_export_texture_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("texture.png");
        export_layer_png(&field(), RasterLayer::Texture, &path, &PngExportOptions::default())
            .unwrap();

        let img = image::open(&path).unwrap();
        assert_eq!(img.color(), image::ColorType::Rgb8);
        assert_eq!((img.width(), img.height()), (5, 4));
    }

    #[test]
    fn test_export_png16_range() {
        let raster = Raster {
            width: 2,
            height: 1,
            channels: 1,
            data: vec![-1.0, 1.0],
        };
        let dir = tempdir().unwrap();
        let path = dir.path().join("wide.png");
        export_png16(&raster, &path, -1.0, 1.0, &PngExportOptions::default()).unwrap();

        let img = image::open(&path).unwrap().into_luma16();
        assert_eq!(img.get_pixel(0, 0).0[0], 0);
        assert_eq!(img.get_pixel(1, 0).0[0], 65535);
    }

    #[test]
    fn test_invalid_range() {
        let raster = Raster {
            width: 1,
            height: 1,
            channels: 1,
            data: vec![0.0],
        };
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.png");
        let result = export_png16(&raster, &path, 1.0, -1.0, &PngExportOptions::default());
        assert!(matches!(result, Err(PngExportError::InvalidRange(..))));
    }

    #[test]
    fn test_rejects_two_channels() {
        let raster = Raster {
            width: 1,
            height: 1,
            channels: 2,
            data: vec![0u8, 0],
        };
        let dir = tempdir().unwrap();
        let result = export_png(&raster, &dir.path().join("x.png"), &PngExportOptions::default());
        assert!(matches!(result, Err(PngExportError::UnsupportedChannels(2))));
    }

    #[test]
    fn test_rejects_short_buffers() {
        let dir = tempdir().unwrap();
        let gray = Raster {
            width: 3,
            height: 2,
            channels: 1,
            data: vec![0u8; 5],
        };
        let result = export_png(&gray, &dir.path().join("g.png"), &PngExportOptions::default());
        assert!(matches!(
            result,
            Err(PngExportError::InvalidLength { got: 5, expected: 6 })
        ));

        let wide = Raster {
            width: 2,
            height: 2,
            channels: 1,
            data: vec![0.5f32; 3],
        };
        let result = export_png16(
            &wide,
            &dir.path().join("w.png"),
            0.0,
            1.0,
            &PngExportOptions::default(),
        );
        assert!(matches!(
            result,
            Err(PngExportError::InvalidLength { got: 3, expected: 4 })
        ));
    }

    #[test]
    fn test_texture_has_no_16_bit_form() {
        let dir = tempdir().unwrap();
        let result = export_layer_png16(
            &field(),
            RasterLayer::Texture,
            &dir.path().join("t.png"),
            &PngExportOptions::default(),
        );
        assert!(matches!(result, Err(PngExportError::NotScalar(RasterLayer::Texture))));
    }
}
