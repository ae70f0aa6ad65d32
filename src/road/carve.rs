//! Cutting a road corridor into the terrain.

use crate::terrain::TerrainField;

use super::Path;

/// Depth a road sits below the surrounding surface.
pub const ROAD_DEPRESSION: f32 = 0.0005;

/// Flattens a corridor of `half_width` cells around every cell of `path`.
///
/// Each covered cell absorbs its standing water into the elevation, drops by
/// [`ROAD_DEPRESSION`] and ends up dry. Cells covered by several path cells
/// are lowered once per covering cell.
pub fn carve_road(field: &mut TerrainField, path: &Path, half_width: usize) {
    let w = half_width as i32;
    let (heights, water) = field.layers_mut();

    for &(i, j) in &path.cells {
        for dj in -w..=w {
            for di in -w..=w {
                let Some((ni, nj)) = heights.offset(i, j, di, dj) else {
                    continue;
                };
                let idx = heights.index(ni, nj);
                heights.data_mut()[idx] += water.data()[idx] - ROAD_DEPRESSION;
                water.data_mut()[idx] = 0.0;
            }
        }
    }
}
