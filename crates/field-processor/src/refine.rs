//! Kriging stage: smooth bathymetry onto a finer grid and re-estimate the
//! sound-speed volume.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use kriging::{
    krige_2d, krige_3d, refine_axis, KrigedField2D, KrigedField3D, KrigingConfig, VariogramModel, DEFAULT_NLAGS,
};
use ocean_common::{LocalGrid, OceanError, OceanResult};

/// Suffix of kriged estimate fields.
pub const KRIGED_SUFFIX: &str = "_kriged";
/// Suffix of kriging variance fields.
pub const VARIANCE_SUFFIX: &str = "_kriged_variance";

/// Kriging stage settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefineConfig {
    pub enabled: bool,
    /// 2D field kriged onto the refined grid; `None` skips the 2D pass
    pub surface_field: Option<String>,
    /// 3D field re-estimated by 3D kriging; `None` skips the 3D pass
    pub volume_field: Option<String>,
    /// Each horizontal axis of the 2D target has `len * refine_factor` points
    pub refine_factor: usize,
    /// Horizontal refinement of the 3D target; depth levels are kept.
    /// At 1 the volume stays on the input grid and is attached to it.
    pub volume_refine_factor: usize,
    pub variogram_model: VariogramModel,
    pub nlags: usize,
    /// Reject inputs with more valid samples than this
    pub max_points: Option<usize>,
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            surface_field: Some("bathymetry".to_string()),
            volume_field: Some("sound_speed".to_string()),
            refine_factor: 5,
            volume_refine_factor: 1,
            variogram_model: VariogramModel::Spherical,
            nlags: DEFAULT_NLAGS,
            max_points: None,
        }
    }
}

impl RefineConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.refine_factor == 0 {
            return Err("refine_factor must be at least 1".to_string());
        }
        if self.volume_refine_factor == 0 {
            return Err("volume_refine_factor must be at least 1".to_string());
        }
        if self.nlags == 0 {
            return Err("nlags must be at least 1".to_string());
        }
        if self.max_points == Some(0) {
            return Err("max_points must be positive when set".to_string());
        }
        Ok(())
    }

    pub fn kriging_config(&self) -> KrigingConfig {
        KrigingConfig {
            variogram_model: self.variogram_model,
            nlags: self.nlags,
        }
    }

    fn check_points(&self, name: &str, count: usize) -> OceanResult<()> {
        match self.max_points {
            Some(limit) if count > limit => Err(OceanError::invalid_config(format!(
                "{} has {} valid samples, above the max_points limit of {}",
                name, count, limit
            ))),
            _ => Ok(()),
        }
    }
}

/// A kriged 2D field on its refined grid.
#[derive(Debug, Clone, PartialEq)]
pub struct RefinedSurface {
    pub name: String,
    pub field: KrigedField2D,
}

/// A kriged 3D field on its (possibly horizontally refined) grid.
#[derive(Debug, Clone, PartialEq)]
pub struct RefinedVolume {
    pub name: String,
    pub field: KrigedField3D,
}

impl RefinedVolume {
    /// Whether the volume shares the horizontal axes of `grid`.
    pub fn on_grid(&self, grid: &LocalGrid) -> bool {
        &self.field.x == grid.x() && &self.field.y == grid.y() && &self.field.z == grid.depth()
    }
}

/// Result of the kriging stage.
#[derive(Debug, Clone)]
pub struct RefineOutput {
    /// Input grid, with `<volume>_kriged` and `<volume>_kriged_variance`
    /// attached when the volume was kriged onto the input axes
    pub grid: LocalGrid,
    pub surface: Option<RefinedSurface>,
    pub volume: Option<RefinedVolume>,
}

/// Krige a 2D field of a local grid onto axes refined by `config.refine_factor`.
pub fn refine_surface(grid: &LocalGrid, name: &str, config: &RefineConfig) -> OceanResult<RefinedSurface> {
    let field = grid.geo().field_2d(name)?;
    config.check_points(name, field.defined_count())?;

    let target_x = refine_axis(grid.x(), config.refine_factor)?;
    let target_y = refine_axis(grid.y(), config.refine_factor)?;
    let kriged = krige_2d(
        grid.x(),
        grid.y(),
        field,
        &target_x,
        &target_y,
        &config.kriging_config(),
    )?;
    Ok(RefinedSurface {
        name: format!("{}{}", name, KRIGED_SUFFIX),
        field: kriged,
    })
}

/// Krige a 3D field onto x/y axes refined by `config.volume_refine_factor`,
/// keeping the depth levels.
pub fn refine_volume(grid: &LocalGrid, name: &str, config: &RefineConfig) -> OceanResult<RefinedVolume> {
    let field = grid.geo().field_3d(name)?;
    config.check_points(name, field.defined_count())?;

    let target_x = refine_axis(grid.x(), config.volume_refine_factor)?;
    let target_y = refine_axis(grid.y(), config.volume_refine_factor)?;
    let kriged = krige_3d(
        grid.x(),
        grid.y(),
        grid.depth(),
        field,
        (&target_x, &target_y, grid.depth()),
        &config.kriging_config(),
    )?;
    Ok(RefinedVolume {
        name: format!("{}{}", name, KRIGED_SUFFIX),
        field: kriged,
    })
}

/// Attach estimate and variance of a volume kriged onto the grid's own axes.
fn attach_volume(grid: &LocalGrid, source: &str, volume: &RefinedVolume) -> OceanResult<LocalGrid> {
    if !volume.on_grid(grid) {
        debug!(volume = %volume.name, "Refined volume kept off-grid");
        return Ok(grid.clone());
    }
    let geo = grid
        .geo()
        .clone()
        .with_field_3d(volume.name.clone(), volume.field.estimate.clone())?
        .with_field_3d(format!("{}{}", source, VARIANCE_SUFFIX), volume.field.variance.clone())?;
    grid.with_geo(geo)
}

/// Run whichever kriging passes the config enables.
pub fn refine(grid: &LocalGrid, config: &RefineConfig) -> OceanResult<RefineOutput> {
    if !config.enabled {
        return Ok(RefineOutput {
            grid: grid.clone(),
            surface: None,
            volume: None,
        });
    }

    let surface = match &config.surface_field {
        Some(name) => Some(refine_surface(grid, name, config)?),
        None => None,
    };
    let (grid, volume) = match &config.volume_field {
        Some(name) => {
            let volume = refine_volume(grid, name, config)?;
            (attach_volume(grid, name, &volume)?, Some(volume))
        }
        None => (grid.clone(), None),
    };

    info!(
        surface = surface.as_ref().map(|s| s.name.as_str()),
        volume = volume.as_ref().map(|v| v.name.as_str()),
        refine_factor = config.refine_factor,
        volume_refine_factor = config.volume_refine_factor,
        "Kriging stage complete"
    );
    Ok(RefineOutput { grid, surface, volume })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocean_common::{Axis, Field2D, Field3D, GeoGrid, GeoPoint};

    fn local_grid() -> LocalGrid {
        let geo = GeoGrid::new(
            Axis::new("lon", vec![10.0, 10.1, 10.2, 10.3]).unwrap(),
            Axis::new("lat", vec![43.0, 43.1, 43.2]).unwrap(),
            Axis::new("depth", vec![0.0, 10.0]).unwrap(),
        )
        .with_field_2d(
            "bathymetry",
            Field2D::from_dense(3, 4, vec![10.0, 12.0, 15.0, 19.0, 11.0, 14.0, 18.0, 23.0, 13.0, 17.0, 22.0, 28.0])
                .unwrap(),
        )
        .unwrap();
        let x = Axis::new("x_m", vec![-12_000.0, -4_000.0, 4_000.0, 12_000.0]).unwrap();
        let y = Axis::new("y_m", vec![-11_000.0, 0.0, 11_000.0]).unwrap();
        LocalGrid::new(geo, x, y, GeoPoint::new(10.15, 43.1)).unwrap()
    }

    #[test]
    fn test_refine_surface_shape() {
        let config = RefineConfig {
            volume_field: None,
            ..Default::default()
        };
        let out = refine(&local_grid(), &config).unwrap();
        let surface = out.surface.unwrap();
        assert_eq!(surface.name, "bathymetry_kriged");
        assert_eq!(surface.field.estimate.shape(), (15, 20));
        assert_eq!(surface.field.x.first(), -12_000.0);
        assert_eq!(surface.field.y.last(), 11_000.0);
    }

    fn volume_grid() -> LocalGrid {
        let (ny, nx, nz) = (3, 4, 3);
        let mut values = Vec::with_capacity(ny * nx * nz);
        for r in 0..ny {
            for c in 0..nx {
                for k in 0..nz {
                    let bump = ((r * 7 + c * 3 + k) % 4) as f64 * 0.1;
                    values.push(1500.0 - 0.5 * k as f64 + 0.3 * r as f64 - 0.2 * c as f64 + bump);
                }
            }
        }
        let geo = GeoGrid::new(
            Axis::new("lon", vec![10.0, 10.001, 10.002, 10.003]).unwrap(),
            Axis::new("lat", vec![43.0, 43.001, 43.002]).unwrap(),
            Axis::new("depth", vec![0.0, 10.0, 20.0]).unwrap(),
        )
        .with_field_3d("sound_speed", Field3D::from_dense(ny, nx, nz, values).unwrap())
        .unwrap();
        let x = Axis::new("x_m", vec![-150.0, -50.0, 50.0, 150.0]).unwrap();
        let y = Axis::new("y_m", vec![-100.0, 0.0, 100.0]).unwrap();
        LocalGrid::new(geo, x, y, GeoPoint::new(10.0015, 43.001)).unwrap()
    }

    #[test]
    fn test_volume_on_grid_is_attached() {
        let config = RefineConfig {
            surface_field: None,
            ..Default::default()
        };
        let grid = volume_grid();
        let out = refine(&grid, &config).unwrap();
        let volume = out.volume.unwrap();
        assert_eq!(volume.name, "sound_speed_kriged");
        assert!(volume.on_grid(&out.grid));
        assert_eq!(out.grid.geo().field_3d("sound_speed_kriged").unwrap(), &volume.field.estimate);
        assert!(out.grid.geo().field_3d("sound_speed_kriged_variance").is_ok());
    }

    #[test]
    fn test_volume_horizontal_refinement() {
        let config = RefineConfig {
            surface_field: None,
            volume_refine_factor: 2,
            ..Default::default()
        };
        let grid = volume_grid();
        let source = grid.geo().field_3d("sound_speed").unwrap().clone();
        let out = refine(&grid, &config).unwrap();
        let volume = out.volume.unwrap();

        assert_eq!(volume.field.estimate.shape(), (6, 8, 3));
        assert_eq!(volume.field.z, *grid.depth());
        assert_eq!(volume.field.x.first(), grid.x().first());
        assert_eq!(volume.field.y.last(), grid.y().last());
        // refined x/y keep only the end points of the input axes
        for k in 0..3 {
            let corners = [((0, 0), (0, 0)), ((2, 3), (5, 7)), ((0, 3), (0, 7)), ((2, 0), (5, 0))];
            for ((r, c), (rr, cc)) in corners {
                let expected = source.get(r, c, k).unwrap();
                let got = volume.field.estimate.get(rr, cc, k).unwrap();
                assert!((got - expected).abs() < 1e-6, "({}, {}, {}) {} vs {}", r, c, k, got, expected);
            }
        }
        // off-grid volumes are not attached to the input grid
        assert!(out.grid.geo().field_3d("sound_speed_kriged").is_err());
    }

    #[test]
    fn test_zero_volume_refine_factor_is_invalid() {
        let config = RefineConfig {
            volume_refine_factor: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_max_points_limit() {
        let config = RefineConfig {
            volume_field: None,
            max_points: Some(5),
            ..Default::default()
        };
        let err = refine(&local_grid(), &config).unwrap_err();
        assert!(matches!(err, OceanError::InvalidConfig(_)));
    }

    #[test]
    fn test_disabled_is_passthrough() {
        let config = RefineConfig {
            enabled: false,
            ..Default::default()
        };
        let grid = local_grid();
        let out = refine(&grid, &config).unwrap();
        assert!(out.surface.is_none());
        assert_eq!(out.grid.geo(), grid.geo());
    }

    #[test]
    fn test_missing_field() {
        let err = refine(&local_grid(), &RefineConfig::default()).unwrap_err();
        assert!(matches!(err, OceanError::FieldNotFound(_)));
    }
}
