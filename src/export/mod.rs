//! Export module for saving terrain data to various file formats.
//!
//! Derived layers (height, slope, laplacian, stream area, wetness and the
//! shaded texture) are flattened into [`Raster`]s and written as 8/16-bit
//! PNG or RAW. Full float fields go to multi-channel EXR and meshes to OBJ.

mod color;
mod exr;
mod obj;
mod png;
mod raster;
mod raw;

pub use color::{mix, texture_color, ROCK_COLOR, VEGETATION_COLOR, WATER_COLOR};
pub use self::exr::{export_field_exr, ExrChannelsPreset, ExrExportError, ExrExportOptions};
pub use obj::{export_obj, write_obj};
pub use png::{export_layer_png, export_layer_png16, export_png, export_png16, PngExportError, PngExportOptions};
pub use raster::{
    float_raster, normalize_u8, render_layer, scalar_values, texture_raster, wetness, Raster,
    RasterLayer, UnknownLayer,
};
pub use raw::{export_layer_raw, export_raw, expected_file_size, RawExportError, RawFormat};
