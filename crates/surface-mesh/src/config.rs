//! Mesh output settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use ocean_common::OceanResult;

use crate::mesh::SurfaceMesh;
use crate::obj::write_obj;
use crate::ply::write_ply;

/// Mesh file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeshFormat {
    #[default]
    Ply,
    Obj,
}

impl MeshFormat {
    /// Parse from string (as used in config files).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ply" => Some(Self::Ply),
            "obj" => Some(Self::Obj),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Ply => "ply",
            Self::Obj => "obj",
        }
    }
}

/// Settings for the mesh stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    pub enabled: bool,
    pub format: MeshFormat,
    /// File stem, written next to the exported arrays
    pub file_name: String,
    /// Height used for undefined cells; `None` makes them an error
    pub undefined_fill: Option<f64>,
    /// Mesh the kriged surface when the refinement stage produced one
    pub use_kriged: bool,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            format: MeshFormat::Ply,
            file_name: "bathymetry_mesh".to_string(),
            undefined_fill: None,
            use_kriged: true,
        }
    }
}

impl MeshConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.file_name.is_empty() {
            return Err("mesh file_name must not be empty".to_string());
        }
        if let Some(fill) = self.undefined_fill {
            if !fill.is_finite() {
                return Err("undefined_fill must be finite".to_string());
            }
        }
        Ok(())
    }

    /// Write `mesh` into `dir` and return the file path.
    pub fn write(&self, dir: &Path, mesh: &SurfaceMesh) -> OceanResult<PathBuf> {
        let path = dir.join(format!("{}.{}", self.file_name, self.format.extension()));
        match self.format {
            MeshFormat::Ply => write_ply(&path, mesh)?,
            MeshFormat::Obj => write_obj(&path, mesh)?,
        }
        info!(
            path = %path.display(),
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            "Wrote surface mesh"
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_str() {
        assert_eq!(MeshFormat::from_str("OBJ"), Some(MeshFormat::Obj));
        assert_eq!(MeshFormat::from_str("ply"), Some(MeshFormat::Ply));
        assert_eq!(MeshFormat::from_str("stl"), None);
    }

    #[test]
    fn test_validate() {
        assert!(MeshConfig::default().validate().is_ok());
        let bad = MeshConfig {
            undefined_fill: Some(f64::NAN),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
