//! Binary export of axes and fields for the ray tracer.
//!
//! Every array is written as f64 in one of two containers: headerless
//! little-endian (`.bin`) or NumPy `.npy`. Fields are flattened row-major in
//! their canonical axis order, (lat, lon) or (lat, lon, depth); axes go to
//! sibling files. Values are written as-is; an undefined sample aborts the
//! export.

mod manifest;
mod npy;
mod raw;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use ocean_common::{dims, Axis, Field2D, Field3D, LocalGrid, OceanError, OceanResult};

pub use manifest::{Manifest, ManifestEntry, MANIFEST_FILE};
pub use npy::{read_npy, write_npy};
pub use raw::{read_raw, write_raw};

use crate::refine::{RefinedSurface, RefinedVolume, KRIGED_SUFFIX};

/// Array container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Headerless little-endian f64
    #[default]
    Raw,
    /// NumPy `.npy` v1.0, `<f8`
    Npy,
}

impl ExportFormat {
    /// Parse from string (as used in config files and environment variables).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "raw" | "bin" => Some(Self::Raw),
            "npy" | "numpy" => Some(Self::Npy),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Raw => "bin",
            Self::Npy => "npy",
        }
    }

    /// Write one 1D array.
    pub fn write(&self, path: &Path, values: &[f64]) -> OceanResult<()> {
        match self {
            Self::Raw => write_raw(path, values),
            Self::Npy => write_npy(path, values),
        }
    }

    /// Read one 1D array.
    pub fn read(&self, path: &Path) -> OceanResult<Vec<f64>> {
        match self {
            Self::Raw => read_raw(path),
            Self::Npy => read_npy(path),
        }
    }
}

/// Which 3D field is written as `ssp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SspSource {
    /// The completed field when fully defined, otherwise the kriged volume
    /// when one exists on the grid's axes
    #[default]
    Auto,
    /// Always the completed field; undefined samples abort the export
    Completed,
    /// Always the kriged volume
    Kriged,
}

impl SspSource {
    /// Parse from string (as used in config files and environment variables).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "completed" | "raw" => Some(Self::Completed),
            "kriged" => Some(Self::Kriged),
            _ => None,
        }
    }
}

/// File stems for exported arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportNames {
    pub x: String,
    pub y: String,
    pub depth: String,
    pub bathymetry: String,
    pub ssp: String,
}

impl Default for ExportNames {
    fn default() -> Self {
        Self {
            x: "x_coords".to_string(),
            y: "y_coords".to_string(),
            depth: "depth_coords".to_string(),
            bathymetry: "bathymetry".to_string(),
            ssp: "ssp".to_string(),
        }
    }
}

/// Export settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
    pub format: ExportFormat,
    pub names: ExportNames,
    /// Also export kriged fields produced by the refinement stage
    pub include_kriged: bool,
    pub ssp_source: SspSource,
    pub write_manifest: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            format: ExportFormat::Raw,
            names: ExportNames::default(),
            include_kriged: true,
            ssp_source: SspSource::Auto,
            write_manifest: true,
        }
    }
}

impl ExportConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        let names = [
            &self.names.x,
            &self.names.y,
            &self.names.depth,
            &self.names.bathymetry,
            &self.names.ssp,
        ];
        if names.iter().any(|n| n.is_empty()) {
            return Err("export file names must not be empty".to_string());
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err("output_dir must not be empty".to_string());
        }
        Ok(())
    }
}

/// Writes fields, their axes and a manifest into one directory.
#[derive(Debug, Clone)]
pub struct Exporter {
    config: ExportConfig,
    manifest: Manifest,
}

impl Exporter {
    /// Create the exporter, creating the output directory if needed.
    pub fn new(config: ExportConfig) -> OceanResult<Self> {
        std::fs::create_dir_all(&config.output_dir)?;
        let manifest = Manifest::new(config.output_dir.display().to_string(), config.format);
        Ok(Self { config, manifest })
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    fn file_name(&self, stem: &str) -> String {
        format!("{}.{}", stem, self.config.format.extension())
    }

    /// Write one array under `stem` and return its file name.
    pub fn write_array(&self, stem: &str, values: &[f64]) -> OceanResult<String> {
        let name = self.file_name(stem);
        let path = self.config.output_dir.join(&name);
        self.config.format.write(&path, values)?;
        debug!(path = %path.display(), len = values.len(), "Wrote array");
        Ok(name)
    }

    /// Write a coordinate axis.
    pub fn write_axis(&self, stem: &str, axis: &Axis) -> OceanResult<String> {
        self.write_array(stem, axis.values())
    }

    /// Export a (y, x) field with its axes under `key`.
    pub fn export_field_2d(
        &mut self,
        key: &str,
        stems: (&str, &str, &str),
        field: &Field2D,
        x: &Axis,
        y: &Axis,
    ) -> OceanResult<ManifestEntry> {
        let (data_stem, x_stem, y_stem) = stems;
        if field.shape() != (y.len(), x.len()) {
            return Err(OceanError::shape_mismatch(
                key,
                format!("({}, {})", y.len(), x.len()),
                format!("{:?}", field.shape()),
            ));
        }
        let values = field.to_dense(key)?;
        let entry = ManifestEntry {
            data: self.write_array(data_stem, &values)?,
            x: self.write_axis(x_stem, x)?,
            y: self.write_axis(y_stem, y)?,
            z: None,
            dims: vec![dims::LAT.to_string(), dims::LON.to_string()],
            shape: vec![y.len(), x.len()],
        };
        info!(field = key, data = %entry.data, shape = ?entry.shape, "Exported 2D field");
        self.manifest.insert(key, entry.clone());
        Ok(entry)
    }

    /// Export a (y, x, z) field with its axes under `key`.
    pub fn export_field_3d(
        &mut self,
        key: &str,
        stems: (&str, &str, &str, &str),
        field: &Field3D,
        axes: (&Axis, &Axis, &Axis),
    ) -> OceanResult<ManifestEntry> {
        let (data_stem, x_stem, y_stem, z_stem) = stems;
        let (x, y, z) = axes;
        if field.shape() != (y.len(), x.len(), z.len()) {
            return Err(OceanError::shape_mismatch(
                key,
                format!("({}, {}, {})", y.len(), x.len(), z.len()),
                format!("{:?}", field.shape()),
            ));
        }
        let values = field.to_dense(key)?;
        let entry = ManifestEntry {
            data: self.write_array(data_stem, &values)?,
            x: self.write_axis(x_stem, x)?,
            y: self.write_axis(y_stem, y)?,
            z: Some(self.write_axis(z_stem, z)?),
            dims: vec![
                dims::LAT.to_string(),
                dims::LON.to_string(),
                dims::DEPTH.to_string(),
            ],
            shape: vec![y.len(), x.len(), z.len()],
        };
        info!(field = key, data = %entry.data, shape = ?entry.shape, "Exported 3D field");
        self.manifest.insert(key, entry.clone());
        Ok(entry)
    }

    /// Export the bathymetry field of a local grid with the default names.
    pub fn export_bathymetry(&mut self, grid: &LocalGrid, field_name: &str) -> OceanResult<ManifestEntry> {
        let names = self.config.names.clone();
        let field = grid.geo().field_2d(field_name)?;
        self.export_field_2d(
            "bathymetry",
            (names.bathymetry.as_str(), names.x.as_str(), names.y.as_str()),
            field,
            grid.x(),
            grid.y(),
        )
    }

    /// Export the sound-speed field of a local grid with the default names.
    pub fn export_ssp(&mut self, grid: &LocalGrid, field_name: &str) -> OceanResult<ManifestEntry> {
        let names = self.config.names.clone();
        let field = grid.geo().field_3d(field_name)?;
        self.export_field_3d(
            "ssp",
            (
                names.ssp.as_str(),
                names.x.as_str(),
                names.y.as_str(),
                names.depth.as_str(),
            ),
            field,
            (grid.x(), grid.y(), grid.depth()),
        )
    }

    /// Export a refined surface with its own axis files.
    pub fn export_surface(&mut self, surface: &RefinedSurface) -> OceanResult<ManifestEntry> {
        let x_stem = format!("{}_{}", self.config.names.x, surface.name);
        let y_stem = format!("{}_{}", self.config.names.y, surface.name);
        self.export_field_2d(
            &surface.name,
            (surface.name.as_str(), x_stem.as_str(), y_stem.as_str()),
            &surface.field.estimate,
            &surface.field.x,
            &surface.field.y,
        )
    }

    /// Export a kriged volume as `<ssp>_kriged`. Axes that differ from the
    /// base grid's get their own files.
    pub fn export_volume(&mut self, volume: &RefinedVolume, grid: &LocalGrid) -> OceanResult<ManifestEntry> {
        let names = self.config.names.clone();
        let data_stem = format!("{}{}", names.ssp, KRIGED_SUFFIX);
        let stem = |base: &str, axis: &Axis, shared: &Axis| {
            if axis == shared {
                base.to_string()
            } else {
                format!("{}_{}", base, data_stem)
            }
        };
        let x_stem = stem(&names.x, &volume.field.x, grid.x());
        let y_stem = stem(&names.y, &volume.field.y, grid.y());
        let z_stem = stem(&names.depth, &volume.field.z, grid.depth());
        self.export_field_3d(
            &data_stem,
            (data_stem.as_str(), x_stem.as_str(), y_stem.as_str(), z_stem.as_str()),
            &volume.field.estimate,
            (&volume.field.x, &volume.field.y, &volume.field.z),
        )
    }

    /// Write `manifest.json` and return its path.
    pub fn finish(self) -> OceanResult<Option<PathBuf>> {
        if !self.config.write_manifest {
            return Ok(None);
        }
        self.manifest.write(&self.config.output_dir)?;
        Ok(Some(self.config.output_dir.join(MANIFEST_FILE)))
    }
}

/// Read an axis file back.
pub fn read_axis(path: &Path, format: ExportFormat, name: &str) -> OceanResult<Axis> {
    Axis::new(name, format.read(path)?)
}

/// Read a 2D field file and reshape it to (rows, cols).
pub fn read_field_2d(path: &Path, format: ExportFormat, rows: usize, cols: usize) -> OceanResult<Field2D> {
    Field2D::from_dense(rows, cols, format.read(path)?)
}

/// Read a 3D field file and reshape it to (rows, cols, levels).
pub fn read_field_3d(
    path: &Path,
    format: ExportFormat,
    shape: (usize, usize, usize),
) -> OceanResult<Field3D> {
    let (rows, cols, levels) = shape;
    Field3D::from_dense(rows, cols, levels, format.read(path)?)
}
