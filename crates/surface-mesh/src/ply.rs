//! ASCII PLY output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use ocean_common::OceanResult;

use crate::mesh::SurfaceMesh;

/// Write the mesh as ASCII PLY with normals, 8-bit colors and faces.
pub fn write_ply(path: &Path, mesh: &SurfaceMesh) -> OceanResult<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_ply_to(&mut out, mesh)?;
    out.flush()?;
    Ok(())
}

pub fn write_ply_to<W: Write>(out: &mut W, mesh: &SurfaceMesh) -> OceanResult<()> {
    writeln!(out, "ply")?;
    writeln!(out, "format ascii 1.0")?;
    writeln!(out, "element vertex {}", mesh.vertex_count())?;
    for prop in ["x", "y", "z", "nx", "ny", "nz"] {
        writeln!(out, "property double {}", prop)?;
    }
    for prop in ["red", "green", "blue"] {
        writeln!(out, "property uchar {}", prop)?;
    }
    writeln!(out, "element face {}", mesh.triangle_count())?;
    writeln!(out, "property list uchar int vertex_indices")?;
    writeln!(out, "end_header")?;

    for ((v, n), c) in mesh.vertices.iter().zip(&mesh.normals).zip(&mesh.colors) {
        writeln!(
            out,
            "{} {} {} {} {} {} {} {} {}",
            v[0], v[1], v[2], n[0], n[1], n[2], c.r, c.g, c.b
        )?;
    }
    for t in &mesh.triangles {
        writeln!(out, "3 {} {} {}", t[0], t[1], t[2])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::HeightGrid;
    use ocean_common::Axis;

    #[test]
    fn test_header_and_counts() {
        let grid = HeightGrid::new(
            Axis::new("x_m", vec![0.0, 1.0]).unwrap(),
            Axis::new("y_m", vec![0.0, 1.0]).unwrap(),
            vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)],
        )
        .unwrap();
        let mesh = SurfaceMesh::build(&grid).unwrap();
        let mut buf = Vec::new();
        write_ply_to(&mut buf, &mesh).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "ply");
        assert!(lines.contains(&"element vertex 4"));
        assert!(lines.contains(&"element face 2"));
        let body = lines.iter().position(|l| *l == "end_header").unwrap() + 1;
        assert_eq!(lines.len() - body, 4 + 2);
        assert_eq!(lines[body + 4], "3 0 1 2");
        assert_eq!(lines[body + 5], "3 1 3 2");
    }
}
