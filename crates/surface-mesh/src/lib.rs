//! Triangulated bathymetry surfaces for visual inspection.
//!
//! A [`HeightGrid`] (two planar axes and a height per node) becomes a
//! [`SurfaceMesh`] with one vertex per node, two triangles per cell, viridis
//! vertex colors and area-weighted normals. Meshes are written as ASCII PLY
//! or Wavefront OBJ.

pub mod colormap;
pub mod config;
pub mod mesh;
pub mod obj;
pub mod ply;

pub use colormap::{viridis, Color};
pub use config::{MeshConfig, MeshFormat};
pub use mesh::{HeightGrid, SurfaceMesh};
pub use obj::write_obj;
pub use ply::write_ply;
