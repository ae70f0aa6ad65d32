//! Triangle mesh extraction from an elevation grid.

use glam::{Vec2, Vec3};

use crate::grid::Grid;

/// Indexed triangle mesh with one vertex per grid cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    pub tex_coords: Vec<Vec2>,
    pub normals: Vec<Vec3>,
    /// Triangle list, three indices per triangle.
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Turns every grid quad into two triangles.
///
/// Vertex `(i, j)` sits at [`Grid::point`] with texture coordinate
/// `(i / (nx - 1), j / (ny - 1))`. The quad with corners `i0 = (i, j)`,
/// `i1 = (i + 1, j)`, `i2 = (i, j + 1)`, `i3 = (i + 1, j + 1)` emits
/// `(i0, i1, i3)` and `(i0, i3, i2)`.
pub fn polygonize(heights: &Grid<f32>) -> Mesh {
    let (nx, ny) = (heights.nx(), heights.ny());
    let mut mesh = Mesh {
        positions: Vec::with_capacity(nx * ny),
        tex_coords: Vec::with_capacity(nx * ny),
        normals: Vec::with_capacity(nx * ny),
        indices: Vec::with_capacity((nx - 1) * (ny - 1) * 6),
    };

    for j in 0..ny {
        for i in 0..nx {
            mesh.positions.push(heights.point(i, j));
            mesh.tex_coords.push(Vec2::new(
                i as f32 / (nx - 1) as f32,
                j as f32 / (ny - 1) as f32,
            ));
            mesh.normals.push(heights.normal(i, j));

            if i + 1 < nx && j + 1 < ny {
                let i0 = heights.index(i, j) as u32;
                let i1 = heights.index(i + 1, j) as u32;
                let i2 = heights.index(i, j + 1) as u32;
                let i3 = heights.index(i + 1, j + 1) as u32;
                mesh.indices.extend_from_slice(&[i0, i1, i3, i0, i3, i2]);
            }
        }
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygonize_counts() {
        let grid = Grid::new(Vec2::ZERO, Vec2::new(2.0, 1.0), 3, 2, 0.5f32).unwrap();
        let mesh = polygonize(&grid);
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.tex_coords.len(), 6);
        assert_eq!(mesh.normals.len(), 6);
        assert_eq!(mesh.triangle_count(), 4);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
    }

    #[test]
    fn test_polygonize_winding_and_uv() {
        let grid = Grid::new(Vec2::ZERO, Vec2::ONE, 2, 2, 0.0f32).unwrap();
        let mesh = polygonize(&grid);
        assert_eq!(mesh.indices, vec![0, 1, 3, 0, 3, 2]);
        assert_eq!(mesh.tex_coords[3], Vec2::ONE);
        assert_eq!(mesh.positions[1], Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(mesh.normals[0], Vec3::Z);
    }

    #[test]
    fn test_positions_carry_elevation() {
        let data = vec![0.0, 1.0, 2.0, 3.0];
        let grid = Grid::from_data(Vec2::ZERO, Vec2::new(4.0, 2.0), 2, 2, data).unwrap();
        let mesh = polygonize(&grid);
        assert_eq!(mesh.positions[3], Vec3::new(4.0, 2.0, 3.0));
    }
}
