//! Wavefront OBJ export of terrain meshes.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::mesh::Mesh;

/// Writes `mesh` as OBJ text, with texture coordinates and normals when
/// every vertex has one.
pub fn write_obj<W: Write>(mesh: &Mesh, out: &mut W, name: Option<&str>) -> io::Result<()> {
    writeln!(out, "# terracarve terrain mesh")?;
    if let Some(name) = name {
        writeln!(out, "o {}", name)?;
    }

    for p in &mesh.positions {
        writeln!(out, "v {} {} {}", p.x, p.y, p.z)?;
    }

    let has_uvs = mesh.tex_coords.len() == mesh.positions.len();
    if has_uvs {
        for uv in &mesh.tex_coords {
            writeln!(out, "vt {} {}", uv.x, uv.y)?;
        }
    }

    let has_normals = mesh.normals.len() == mesh.positions.len();
    if has_normals {
        for n in &mesh.normals {
            writeln!(out, "vn {} {} {}", n.x, n.y, n.z)?;
        }
    }

    for tri in mesh.indices.chunks_exact(3) {
        // OBJ indices are 1-based
        let [a, b, c] = [tri[0] + 1, tri[1] + 1, tri[2] + 1];
        match (has_uvs, has_normals) {
            (true, true) => writeln!(out, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}")?,
            (true, false) => writeln!(out, "f {a}/{a} {b}/{b} {c}/{c}")?,
            (false, true) => writeln!(out, "f {a}//{a} {b}//{b} {c}//{c}")?,
            (false, false) => writeln!(out, "f {a} {b} {c}")?,
        }
    }

    Ok(())
}

/// Writes `mesh` to an OBJ file named after the file stem.
pub fn export_obj(mesh: &Mesh, path: &Path) -> io::Result<()> {
    let name = path.file_stem().and_then(|s| s.to_str());
    let mut writer = BufWriter::new(File::create(path)?);
    write_obj(mesh, &mut writer, name)?;
    writer.flush()
}
