//! Kriging gridded fields onto target grids.
//!
//! Source fields use the canonical layouts from `ocean-common`: 2D fields are
//! (y, x) = (lat, lon) and 3D fields are (y, x, z) = (lat, lon, depth).
//! Undefined samples are dropped before fitting; outputs are fully defined
//! and use the same layouts over the target axes.

use serde::{Deserialize, Serialize};
use tracing::info;

use ocean_common::{Axis, Field2D, Field3D, OceanError, OceanResult};

use crate::ordinary::OrdinaryKriging;
use crate::variogram::{VariogramModel, DEFAULT_NLAGS};

/// Settings shared by the 2D and 3D kriging entry points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KrigingConfig {
    pub variogram_model: VariogramModel,
    pub nlags: usize,
}

impl Default for KrigingConfig {
    fn default() -> Self {
        Self {
            variogram_model: VariogramModel::Spherical,
            nlags: DEFAULT_NLAGS,
        }
    }
}

impl KrigingConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.nlags == 0 {
            return Err("nlags must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Estimate and variance over a 2D target grid, laid out (y, x).
#[derive(Debug, Clone, PartialEq)]
pub struct KrigedField2D {
    pub x: Axis,
    pub y: Axis,
    pub estimate: Field2D,
    pub variance: Field2D,
}

/// Estimate and variance over a 3D target grid, laid out (y, x, z).
#[derive(Debug, Clone, PartialEq)]
pub struct KrigedField3D {
    pub x: Axis,
    pub y: Axis,
    pub z: Axis,
    pub estimate: Field3D,
    pub variance: Field3D,
}

/// Evenly spaced axis over the same span with `len * factor` points.
///
/// A factor of 1 returns the axis unchanged.
pub fn refine_axis(axis: &Axis, factor: usize) -> OceanResult<Axis> {
    if factor == 0 {
        return Err(OceanError::invalid_config("refinement factor must be at least 1"));
    }
    if factor == 1 {
        return Ok(axis.clone());
    }
    Axis::linspace(axis.name(), axis.first(), axis.last(), axis.len() * factor)
}

/// Krige a 2D field given on (y, x) axes onto (target_y, target_x).
pub fn krige_2d(
    x: &Axis,
    y: &Axis,
    field: &Field2D,
    target_x: &Axis,
    target_y: &Axis,
    config: &KrigingConfig,
) -> OceanResult<KrigedField2D> {
    if field.shape() != (y.len(), x.len()) {
        return Err(OceanError::shape_mismatch(
            "2D kriging input",
            format!("(y, x) = ({}, {})", y.len(), x.len()),
            format!("{:?}", field.shape()),
        ));
    }

    let mut points = Vec::with_capacity(field.defined_count());
    let mut values = Vec::with_capacity(field.defined_count());
    for (r, &yv) in y.values().iter().enumerate() {
        for (c, &xv) in x.values().iter().enumerate() {
            if let Some(v) = field.get(r, c) {
                points.push([xv, yv]);
                values.push(v);
            }
        }
    }

    let model = OrdinaryKriging::fit(points, values, config.variogram_model, config.nlags)?;

    let (ny, nx) = (target_y.len(), target_x.len());
    let targets: Vec<[f64; 2]> = target_y
        .values()
        .iter()
        .flat_map(|&yv| target_x.values().iter().map(move |&xv| [xv, yv]))
        .collect();
    let predictions = model.predict_many(&targets)?;
    let estimate = predictions.iter().map(|p| p.estimate).collect();
    let variance = predictions.iter().map(|p| p.variance).collect();

    let params = model.variogram().params;
    info!(
        samples = model.sample_count(),
        target_nx = nx,
        target_ny = ny,
        model = config.variogram_model.as_str(),
        psill = params.psill,
        range = params.range,
        nugget = params.nugget,
        "Kriged 2D field"
    );

    Ok(KrigedField2D {
        x: target_x.clone(),
        y: target_y.clone(),
        estimate: Field2D::from_dense(ny, nx, estimate)?,
        variance: Field2D::from_dense(ny, nx, variance)?,
    })
}

/// Krige a 3D field given on (y, x, z) axes onto (target_y, target_x, target_z).
pub fn krige_3d(
    x: &Axis,
    y: &Axis,
    z: &Axis,
    field: &Field3D,
    targets: (&Axis, &Axis, &Axis),
    config: &KrigingConfig,
) -> OceanResult<KrigedField3D> {
    let (target_x, target_y, target_z) = targets;
    if field.shape() != (y.len(), x.len(), z.len()) {
        return Err(OceanError::shape_mismatch(
            "3D kriging input",
            format!("(y, x, z) = ({}, {}, {})", y.len(), x.len(), z.len()),
            format!("{:?}", field.shape()),
        ));
    }

    let mut points = Vec::with_capacity(field.defined_count());
    let mut values = Vec::with_capacity(field.defined_count());
    for (r, c, profile) in field.profiles() {
        for (k, sample) in profile.iter().enumerate() {
            if let Some(v) = *sample {
                points.push([x.values()[c], y.values()[r], z.values()[k]]);
                values.push(v);
            }
        }
    }

    let model = OrdinaryKriging::fit(points, values, config.variogram_model, config.nlags)?;

    let (ny, nx, nz) = (target_y.len(), target_x.len(), target_z.len());
    let mut estimate = Vec::with_capacity(ny * nx * nz);
    let mut variance = Vec::with_capacity(ny * nx * nz);
    for &yv in target_y.values() {
        for &xv in target_x.values() {
            for &zv in target_z.values() {
                let p = model.predict(&[xv, yv, zv])?;
                estimate.push(p.estimate);
                variance.push(p.variance);
            }
        }
    }

    let params = model.variogram().params;
    info!(
        samples = model.sample_count(),
        target_nx = nx,
        target_ny = ny,
        target_nz = nz,
        model = config.variogram_model.as_str(),
        psill = params.psill,
        range = params.range,
        nugget = params.nugget,
        "Kriged 3D field"
    );

    Ok(KrigedField3D {
        x: target_x.clone(),
        y: target_y.clone(),
        z: target_z.clone(),
        estimate: Field3D::from_dense(ny, nx, nz, estimate)?,
        variance: Field3D::from_dense(ny, nx, nz, variance)?,
    })
}
