//! Projection of a small lon/lat subgrid onto local planar axes.
//!
//! The subgrid is assumed to be locally rectilinear after projection: one x
//! per longitude (taken from the first latitude row) and one y per latitude
//! (taken from the first longitude column). The projector checks the extent
//! before projecting and reports how far the result deviates from a true
//! rectilinear grid.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use ocean_common::{Axis, GeoBoundingBox, GeoGrid, GeoPoint, LocalGrid, OceanError, OceanResult};

use crate::aeqd::AzimuthalEquidistant;

/// Name of the projected easting axis.
pub const X_AXIS: &str = "x_m";
/// Name of the projected northing axis.
pub const Y_AXIS: &str = "y_m";

/// Configuration for [`SubgridProjector`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Maximum geodesic distance from the center to any subgrid corner (meters)
    pub max_radius_m: f64,
    /// Latitudes closer than this to either pole are rejected (degrees)
    pub pole_margin_deg: f64,
    /// Skew above this fraction of the projected extent is logged as a warning
    pub skew_warn_fraction: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            max_radius_m: 250_000.0,
            pole_margin_deg: 0.5,
            skew_warn_fraction: 0.01,
        }
    }
}

impl ProjectionConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_radius_m.is_nan() || self.max_radius_m <= 0.0 {
            return Err("max_radius_m must be positive".to_string());
        }
        if !(0.0..90.0).contains(&self.pole_margin_deg) {
            return Err("pole_margin_deg must be in [0, 90)".to_string());
        }
        if self.skew_warn_fraction < 0.0 {
            return Err("skew_warn_fraction must be non-negative".to_string());
        }
        Ok(())
    }
}

/// Projected axes for a subgrid.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanarAxes {
    /// One easting per longitude index (meters)
    pub x: Axis,
    /// One northing per latitude index (meters)
    pub y: Axis,
    pub center: GeoPoint,
    /// Largest departure from rectilinearity (meters)
    pub skew_m: f64,
}

/// Projects lon/lat subgrids onto local AEQD axes.
#[derive(Debug, Clone, Default)]
pub struct SubgridProjector {
    config: ProjectionConfig,
}

impl SubgridProjector {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Center used when the caller does not supply one: the midpoint of the
    /// first and last value of each axis.
    pub fn default_center(lon: &Axis, lat: &Axis) -> GeoPoint {
        let (clon, clat) = GeoBoundingBox::from_axes(lon, lat).center();
        GeoPoint::new(clon, clat)
    }

    /// Project every (lon, lat) pair and reduce to one x per longitude and
    /// one y per latitude.
    pub fn project(&self, lon: &Axis, lat: &Axis, center: Option<GeoPoint>) -> OceanResult<PlanarAxes> {
        let center = center.unwrap_or_else(|| Self::default_center(lon, lat));
        self.check_extent(lon, lat, center)?;

        let proj = AzimuthalEquidistant::new(center);
        let (nlat, nlon) = (lat.len(), lon.len());

        // Row-major over (lat, lon), mirroring a meshgrid of the two axes.
        let mut xs = Vec::with_capacity(nlat * nlon);
        let mut ys = Vec::with_capacity(nlat * nlon);
        for &la in lat.values() {
            for &lo in lon.values() {
                let (x, y) = proj.forward(lo, la)?;
                xs.push(x);
                ys.push(y);
            }
        }

        let x: Vec<f64> = xs[..nlon].to_vec();
        let y: Vec<f64> = (0..nlat).map(|i| ys[i * nlon]).collect();
        let skew_m = rectilinear_skew(&xs, &ys, nlat, nlon);

        let extent = (x[nlon - 1] - x[0]).abs().max((y[nlat - 1] - y[0]).abs());
        if extent > 0.0 && skew_m > self.config.skew_warn_fraction * extent {
            warn!(
                skew_m = skew_m,
                extent_m = extent,
                "Projected subgrid is not rectilinear; x/y axes are an approximation"
            );
        }

        debug!(
            center_lon = center.lon,
            center_lat = center.lat,
            nx = nlon,
            ny = nlat,
            skew_m = skew_m,
            "Projected subgrid to local AEQD axes"
        );

        Ok(PlanarAxes {
            x: Axis::new(X_AXIS, x)?,
            y: Axis::new(Y_AXIS, y)?,
            center,
            skew_m,
        })
    }

    /// Project a geographic grid, keeping its fields untouched.
    pub fn project_grid(&self, geo: GeoGrid, center: Option<GeoPoint>) -> OceanResult<LocalGrid> {
        let axes = self.project(geo.lon(), geo.lat(), center)?;
        LocalGrid::new(geo, axes.x, axes.y, axes.center)
    }

    fn check_extent(&self, lon: &Axis, lat: &Axis, center: GeoPoint) -> OceanResult<()> {
        let bbox = GeoBoundingBox::from_axes(lon, lat);
        let polar_limit = 90.0 - self.config.pole_margin_deg;
        if bbox.min_lat < -polar_limit || bbox.max_lat > polar_limit {
            return Err(OceanError::projection_domain(format!(
                "latitudes [{}, {}] reach within {}° of a pole",
                bbox.min_lat, bbox.max_lat, self.config.pole_margin_deg
            )));
        }

        if bbox.width() >= 180.0 {
            return Err(OceanError::projection_domain(format!(
                "longitude span {}° is not a local region",
                bbox.width()
            )));
        }

        let proj = AzimuthalEquidistant::new(center);
        for (lo, la) in bbox.corners() {
            let (x, y) = proj.forward(lo, la)?;
            let distance = x.hypot(y);
            if distance > self.config.max_radius_m {
                return Err(OceanError::projection_domain(format!(
                    "corner ({}, {}) is {:.0} m from the center, limit is {:.0} m",
                    lo, la, distance, self.config.max_radius_m
                )));
            }
        }
        Ok(())
    }
}

/// Largest difference between the first and last row's x values and the
/// first and last column's y values.
fn rectilinear_skew(xs: &[f64], ys: &[f64], nlat: usize, nlon: usize) -> f64 {
    let last_row = (nlat - 1) * nlon;
    let dx = (0..nlon)
        .map(|j| (xs[last_row + j] - xs[j]).abs())
        .fold(0.0, f64::max);
    let dy = (0..nlat)
        .map(|i| (ys[i * nlon + nlon - 1] - ys[i * nlon]).abs())
        .fold(0.0, f64::max);
    dx.max(dy)
}
