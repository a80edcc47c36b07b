//! Seafloor depth from where profiles stop having data.
//!
//! For each horizontal cell the first undefined depth index marks the
//! seafloor; the bathymetry is that depth minus a safety margin so the
//! profile is still defined just above it. A fully defined profile uses the
//! deepest level instead.

use serde::{Deserialize, Serialize};
use tracing::debug;

use ocean_common::{Axis, Field2D, Field3D, GeoGrid, OceanError, OceanResult, Sample};

/// Name of the derived 2D field.
pub const BATHYMETRY_FIELD: &str = "bathymetry";

/// What to report for a profile whose shallowest sample is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShallowGapPolicy {
    /// Use the first undefined index like any other profile: depth[0] - ε.
    #[default]
    SurfaceGap,
    /// Treat the profile as having no valid data: depth[last] - ε.
    DeepestDepth,
    /// Leave the cell undefined.
    Undefined,
}

impl ShallowGapPolicy {
    /// Parse from string (as used in config files and environment variables).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "surface_gap" | "surface" => Some(Self::SurfaceGap),
            "deepest_depth" | "deepest" => Some(Self::DeepestDepth),
            "undefined" | "none" => Some(Self::Undefined),
            _ => None,
        }
    }
}

/// Bathymetry extraction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BathymetryConfig {
    /// Margin subtracted from the seafloor depth (meters)
    pub epsilon_m: f64,
    pub shallow_gap: ShallowGapPolicy,
    /// 3D field the seafloor is read from
    pub source_field: String,
}

impl Default for BathymetryConfig {
    fn default() -> Self {
        Self {
            epsilon_m: 2.5,
            shallow_gap: ShallowGapPolicy::SurfaceGap,
            source_field: "sound_speed".to_string(),
        }
    }
}

impl BathymetryConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !self.epsilon_m.is_finite() || self.epsilon_m < 0.0 {
            return Err("epsilon_m must be a non-negative number".to_string());
        }
        if self.source_field.is_empty() {
            return Err("source_field must not be empty".to_string());
        }
        Ok(())
    }
}

/// Bathymetry for a single profile.
///
/// `profile` and `depth` must have the same length; an empty pair has no
/// seafloor.
pub fn profile_bathymetry(
    profile: &[Sample],
    depth: &[f64],
    epsilon: f64,
    policy: ShallowGapPolicy,
) -> OceanResult<Sample> {
    if profile.len() != depth.len() {
        return Err(OceanError::shape_mismatch("profile levels", depth.len(), profile.len()));
    }
    let Some(&deepest) = depth.last() else {
        return Ok(None);
    };
    let value = match profile.iter().position(Option::is_none) {
        None => Some(deepest - epsilon),
        Some(0) => match policy {
            ShallowGapPolicy::SurfaceGap => Some(depth[0] - epsilon),
            ShallowGapPolicy::DeepestDepth => Some(deepest - epsilon),
            ShallowGapPolicy::Undefined => None,
        },
        Some(k) => Some(depth[k] - epsilon),
    };
    Ok(value)
}

/// Bathymetry over every horizontal cell of a (lat, lon, depth) field.
pub fn extract_bathymetry(field: &Field3D, depth: &Axis, config: &BathymetryConfig) -> OceanResult<Field2D> {
    if field.levels() != depth.len() {
        return Err(OceanError::shape_mismatch(
            "profile field depth",
            depth.len(),
            field.levels(),
        ));
    }

    let values = field
        .profiles()
        .map(|(_, _, profile)| {
            profile_bathymetry(profile, depth.values(), config.epsilon_m, config.shallow_gap)
        })
        .collect::<OceanResult<Vec<Sample>>>()?;
    let out = Field2D::new(field.rows(), field.cols(), values)?;

    debug!(
        epsilon_m = config.epsilon_m,
        policy = ?config.shallow_gap,
        cells = out.len(),
        undefined = out.len() - out.defined_count(),
        range = ?out.min_max(),
        "Extracted bathymetry"
    );
    Ok(out)
}

/// Add a `bathymetry` field derived from the configured source field.
pub fn extract_grid_bathymetry(grid: &GeoGrid, config: &BathymetryConfig) -> OceanResult<GeoGrid> {
    let field = grid.field_3d(&config.source_field)?;
    let bathymetry = extract_bathymetry(field, grid.depth(), config)?;
    grid.clone().with_field_2d(BATHYMETRY_FIELD, bathymetry)
}
