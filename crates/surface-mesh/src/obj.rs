//! Wavefront OBJ output.
//!
//! Vertex colors use the common `v x y z r g b` extension with components in
//! [0, 1]. Face indices are 1-based and reference the matching normal.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use ocean_common::OceanResult;

use crate::mesh::SurfaceMesh;

pub fn write_obj(path: &Path, mesh: &SurfaceMesh) -> OceanResult<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_obj_to(&mut out, mesh)?;
    out.flush()?;
    Ok(())
}

pub fn write_obj_to<W: Write>(out: &mut W, mesh: &SurfaceMesh) -> OceanResult<()> {
    writeln!(
        out,
        "# {} vertices, {} triangles",
        mesh.vertex_count(),
        mesh.triangle_count()
    )?;
    for (v, c) in mesh.vertices.iter().zip(&mesh.colors) {
        let [r, g, b] = c.to_unit_rgb();
        writeln!(out, "v {} {} {} {:.6} {:.6} {:.6}", v[0], v[1], v[2], r, g, b)?;
    }
    for n in &mesh.normals {
        writeln!(out, "vn {} {} {}", n[0], n[1], n[2])?;
    }
    for t in &mesh.triangles {
        let (a, b, c) = (t[0] + 1, t[1] + 1, t[2] + 1);
        writeln!(out, "f {a}//{a} {b}//{b} {c}//{c}")?;
    }
    Ok(())
}
