//! Pipeline configuration.
//!
//! Every section has working defaults, so an empty YAML document is a valid
//! configuration. Environment variables override the most commonly tuned
//! settings after the file is read.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use ocean_common::{GeoPoint, OceanError, OceanResult};
use projection::ProjectionConfig;
use surface_mesh::MeshConfig;

use crate::bathymetry::BathymetryConfig;
use crate::dataset::SubsetConfig;
use crate::refine::RefineConfig;
use crate::writer::{ExportConfig, ExportFormat, SspSource};

/// Configuration for [`Pipeline`](crate::pipeline::Pipeline).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Dataset document to read when the caller does not name one
    pub input: Option<PathBuf>,
    pub subset: SubsetConfig,
    pub projection: ProjectionConfig,
    /// Projection center; the subgrid's axis midpoints when absent
    pub center: Option<GeoPoint>,
    pub bathymetry: BathymetryConfig,
    pub kriging: RefineConfig,
    pub mesh: MeshConfig,
    pub export: ExportConfig,
}

impl PipelineConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Parse a YAML document.
    pub fn from_yaml_str(yaml: &str) -> OceanResult<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| OceanError::invalid_config(format!("failed to parse pipeline config: {}", e)))
    }

    /// Read a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> OceanResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text)
    }

    /// Override settings from environment variables.
    ///
    /// Unparseable values are ignored and the current setting is kept.
    pub fn apply_env(&mut self) {
        if let Ok(val) = std::env::var("SSP_EPSILON_M") {
            if let Ok(eps) = val.parse() {
                self.bathymetry.epsilon_m = eps;
            }
        }

        if let Ok(val) = std::env::var("SSP_MAX_RADIUS_M") {
            if let Ok(radius) = val.parse() {
                self.projection.max_radius_m = radius;
            }
        }

        if let Ok(val) = std::env::var("SSP_KRIGING_REFINE") {
            if let Ok(factor) = val.parse::<usize>() {
                self.kriging.refine_factor = factor;
            } else {
                match val.to_lowercase().as_str() {
                    "false" | "off" | "no" => self.kriging.enabled = false,
                    "true" | "on" | "yes" => self.kriging.enabled = true,
                    _ => {}
                }
            }
        }

        if let Ok(val) = std::env::var("SSP_EXPORT_FORMAT") {
            if let Some(format) = ExportFormat::from_str(&val) {
                self.export.format = format;
            }
        }

        if let Ok(val) = std::env::var("SSP_SOURCE") {
            if let Some(source) = SspSource::from_str(&val) {
                self.export.ssp_source = source;
            }
        }

        if let Ok(val) = std::env::var("SSP_OUTPUT_DIR") {
            if !val.is_empty() {
                self.export.output_dir = PathBuf::from(val);
            }
        }
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), String> {
        self.subset.validate().map_err(|e| format!("subset: {}", e))?;
        self.projection.validate().map_err(|e| format!("projection: {}", e))?;
        self.bathymetry.validate().map_err(|e| format!("bathymetry: {}", e))?;
        self.kriging.validate().map_err(|e| format!("kriging: {}", e))?;
        self.mesh.validate().map_err(|e| format!("mesh: {}", e))?;
        self.export.validate().map_err(|e| format!("export: {}", e))?;
        if self.export.ssp_source == SspSource::Kriged {
            let volume_on_grid = self.kriging.enabled
                && self.kriging.volume_field.as_deref() == Some(self.bathymetry.source_field.as_str())
                && self.kriging.volume_refine_factor == 1;
            if !volume_on_grid {
                return Err(format!(
                    "export: ssp_source kriged needs kriging of '{}' with volume_refine_factor 1",
                    self.bathymetry.source_field
                ));
            }
        }
        if let Some(center) = self.center {
            if !(-90.0..=90.0).contains(&center.lat) || !center.lon.is_finite() {
                return Err(format!("center ({}, {}) is not a valid position", center.lon, center.lat));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bathymetry::ShallowGapPolicy;
    use kriging::VariogramModel;
    use surface_mesh::MeshFormat;

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bathymetry.epsilon_m, 2.5);
        assert_eq!(config.projection.max_radius_m, 250_000.0);
        assert_eq!(config.kriging.refine_factor, 5);
        assert_eq!(config.export.format, ExportFormat::Raw);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = PipelineConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
input: data/monterey.json
subset:
  lat: [1, 7]
  lon: [0, 7]
center:
  lon: -122.0
  lat: 36.7
bathymetry:
  epsilon_m: 5.0
  shallow_gap: deepest_depth
kriging:
  variogram_model: exponential
  refine_factor: 3
  volume_refine_factor: 2
mesh:
  format: obj
export:
  format: npy
  output_dir: out/monterey
  ssp_source: completed
"#;
        let config = PipelineConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.input, Some(PathBuf::from("data/monterey.json")));
        assert_eq!(config.subset.lat, Some([1, 7]));
        assert_eq!(config.subset.lon, Some([0, 7]));
        assert_eq!(config.center, Some(GeoPoint::new(-122.0, 36.7)));
        assert_eq!(config.bathymetry.epsilon_m, 5.0);
        assert_eq!(config.bathymetry.shallow_gap, ShallowGapPolicy::DeepestDepth);
        assert_eq!(config.bathymetry.source_field, "sound_speed");
        assert_eq!(config.kriging.variogram_model, VariogramModel::Exponential);
        assert_eq!(config.kriging.refine_factor, 3);
        assert_eq!(config.kriging.volume_refine_factor, 2);
        assert!(config.kriging.enabled);
        assert_eq!(config.mesh.format, MeshFormat::Obj);
        assert_eq!(config.export.format, ExportFormat::Npy);
        assert_eq!(config.export.output_dir, PathBuf::from("out/monterey"));
        assert_eq!(config.export.names.ssp, "ssp");
        assert_eq!(config.export.ssp_source, SspSource::Completed);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_yaml() {
        let err = PipelineConfig::from_yaml_str("kriging: [1, 2").unwrap_err();
        assert!(matches!(err, OceanError::InvalidConfig(_)));
    }

    #[test]
    fn test_validate_reports_section() {
        let mut config = PipelineConfig::default();
        config.kriging.refine_factor = 0;
        let err = config.validate().unwrap_err();
        assert!(err.starts_with("kriging:"), "{}", err);

        let mut config = PipelineConfig::default();
        config.center = Some(GeoPoint::new(0.0, 95.0));
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.export.ssp_source = SspSource::Kriged;
        assert!(config.validate().is_ok());
        config.kriging.volume_refine_factor = 3;
        assert!(config.validate().unwrap_err().starts_with("export:"));
    }
}
