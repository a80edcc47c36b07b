//! Structural properties of meshes built from gridded bathymetry.

use std::collections::HashSet;

use ocean_common::Axis;
use surface_mesh::{HeightGrid, MeshConfig, MeshFormat, SurfaceMesh};
use test_utils::{create_bowl_heights, temp_test_dir};

fn bowl_grid(rows: usize, cols: usize) -> HeightGrid {
    let field = create_bowl_heights(rows, cols, 80.0);
    let x = Axis::linspace("x_m", -3_000.0, 3_000.0, cols).unwrap();
    let y = Axis::linspace("y_m", -2_000.0, 2_000.0, rows).unwrap();
    HeightGrid::from_bathymetry(&field, &x, &y).unwrap()
}

#[test]
fn test_counts_match_grid() {
    for &(rows, cols) in &[(2, 2), (5, 5), (6, 7), (9, 4)] {
        let grid = bowl_grid(rows, cols);
        let (m, n) = grid.shape();
        let mesh = SurfaceMesh::build(&grid).unwrap();
        assert_eq!(mesh.vertex_count(), m * n);
        assert_eq!(mesh.triangle_count(), 2 * (m - 1) * (n - 1));
        assert_eq!(mesh.colors.len(), m * n);
        assert_eq!(mesh.normals.len(), m * n);
    }
}

#[test]
fn test_indices_distinct_and_in_range() {
    let grid = bowl_grid(6, 7);
    let mesh = SurfaceMesh::build(&grid).unwrap();
    for tri in &mesh.triangles {
        assert!(tri.iter().all(|&i| i < mesh.vertex_count()), "{:?}", tri);
        let unique: HashSet<usize> = tri.iter().copied().collect();
        assert_eq!(unique.len(), 3, "{:?}", tri);
    }
}

#[test]
fn test_build_is_deterministic() {
    let grid = bowl_grid(5, 5);
    let a = SurfaceMesh::build(&grid).unwrap();
    let b = SurfaceMesh::build(&grid).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_normals_are_unit_length() {
    let mesh = SurfaceMesh::build(&bowl_grid(5, 6)).unwrap();
    for n in &mesh.normals {
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        assert!((len - 1.0).abs() < 1e-9, "normal {:?}", n);
    }
}

#[test]
fn test_write_both_formats() {
    let dir = temp_test_dir();
    let mesh = SurfaceMesh::build(&bowl_grid(4, 4)).unwrap();

    for format in [MeshFormat::Ply, MeshFormat::Obj] {
        let config = MeshConfig {
            format,
            ..Default::default()
        };
        let path = config.write(dir.path(), &mesh).unwrap();
        assert_eq!(path.extension().unwrap(), format.extension());
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(!text.is_empty());
    }
}
