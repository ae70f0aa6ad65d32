//! OpenEXR export (multi-channel, float).
//!
//! Writes one `.exr` file per field with named channels, top row first.

use std::path::Path;

use exr::image::{AnyChannel, AnyChannels, FlatSamples, Image, Layer};
use exr::meta::header::LayerAttributes;
use exr::prelude::{Encoding, WritableImage};
use thiserror::Error;

use crate::terrain::TerrainField;

use super::raster::{scalar_values, Raster, RasterLayer};

/// Errors that can occur during EXR export.
#[derive(Error, Debug)]
pub enum ExrExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("IO / EXR error: {0}")]
    Exr(#[from] exr::error::Error),
    #[error("Invalid channel data length for '{name}': got {got}, expected {expected}")]
    InvalidChannelLength {
        name: &'static str,
        got: usize,
        expected: usize,
    },
}

/// Channel preset for EXR export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExrChannelsPreset {
    /// Only `height`.
    HeightOnly,
    /// `height`, `water`, `flow_area` and `slope`.
    #[default]
    All,
}

/// Options for EXR export.
#[derive(Debug, Clone)]
pub struct ExrExportOptions {
    pub preset: ExrChannelsPreset,
    /// Compression/encoding choice.
    pub encoding: Encoding,
    /// Layer name in the EXR file.
    pub layer_name: &'static str,
}

impl Default for ExrExportOptions {
    fn default() -> Self {
        Self {
            preset: ExrChannelsPreset::All,
            encoding: Encoding::FAST_LOSSLESS,
            layer_name: "terracarve",
        }
    }
}

fn push_f32_channel(
    channels: &mut Vec<AnyChannel<FlatSamples>>,
    name: &'static str,
    samples: &[f32],
    width: usize,
    height: usize,
) -> Result<(), ExrExportError> {
    if samples.len() != width * height {
        return Err(ExrExportError::InvalidChannelLength {
            name,
            got: samples.len(),
            expected: width * height,
        });
    }
    let rows = Raster::from_grid_order(width, height, 1, samples);
    channels.push(AnyChannel::new(name, FlatSamples::F32(rows.data)));
    Ok(())
}

fn build_channels(
    field: &TerrainField,
    options: &ExrExportOptions,
) -> Result<Vec<AnyChannel<FlatSamples>>, ExrExportError> {
    let (w, h) = (field.nx(), field.ny());
    let mut channels = Vec::new();

    push_f32_channel(&mut channels, "height", field.heights().data(), w, h)?;
    if options.preset == ExrChannelsPreset::HeightOnly {
        return Ok(channels);
    }

    push_f32_channel(&mut channels, "water", field.water().data(), w, h)?;
    push_f32_channel(&mut channels, "flow_area", field.flow_areas().data(), w, h)?;
    let slope = scalar_values(field, RasterLayer::Slope).unwrap_or_default();
    push_f32_channel(&mut channels, "slope", &slope, w, h)?;

    Ok(channels)
}

/// Export a terrain field to OpenEXR with multi-channel float outputs.
pub fn export_field_exr(
    field: &TerrainField,
    path: &Path,
    options: &ExrExportOptions,
) -> Result<(), ExrExportError> {
    let channels = build_channels(field, options)?;
    let any_channels = AnyChannels::sort(channels.into());

    let layer = Layer::new(
        (field.nx(), field.ny()),
        LayerAttributes::named(options.layer_name),
        options.encoding,
        any_channels,
    );

    Image::from_layer(layer).write().to_file(path)?;
    Ok(())
}
