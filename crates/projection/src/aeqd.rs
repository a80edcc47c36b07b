//! Azimuthal Equidistant projection on the WGS84 ellipsoid.
//!
//! Distances and azimuths measured from the projection center are preserved:
//! a point at geodesic distance `s` and forward azimuth `α` from the center
//! maps to `(s·sin α, s·cos α)` meters, so +x is east and +y is north near
//! the center.

use ocean_common::{GeoPoint, OceanError, OceanResult};

use crate::geodesic::{self, Ellipsoid};

/// Azimuthal Equidistant projection centered on a geographic point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AzimuthalEquidistant {
    /// Projection center (degrees)
    pub center: GeoPoint,
    pub ellipsoid: Ellipsoid,
}

impl AzimuthalEquidistant {
    /// Create a projection centered at `center` on WGS84.
    pub fn new(center: GeoPoint) -> Self {
        Self {
            center,
            ellipsoid: Ellipsoid::WGS84,
        }
    }

    /// Convert geographic coordinates (degrees) to planar (x, y) meters.
    ///
    /// Fails only when the geodesic iteration does not converge, which
    /// happens for points nearly antipodal to the center.
    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> OceanResult<(f64, f64)> {
        let sol = geodesic::inverse(
            &self.ellipsoid,
            self.center.lat,
            self.center.lon,
            lat_deg,
            lon_deg,
        )
        .ok_or_else(|| {
            OceanError::projection_domain(format!(
                "geodesic from ({}, {}) to ({}, {}) did not converge",
                self.center.lon, self.center.lat, lon_deg, lat_deg
            ))
        })?;
        let (sin_a, cos_a) = sol.azimuth.sin_cos();
        Ok((sol.distance * sin_a, sol.distance * cos_a))
    }

    /// Convert planar (x, y) meters back to (lon, lat) degrees.
    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let distance = x.hypot(y);
        if distance == 0.0 {
            return (self.center.lon, self.center.lat);
        }
        let azimuth = x.atan2(y);
        let (lat, lon) = geodesic::direct(
            &self.ellipsoid,
            self.center.lat,
            self.center.lon,
            azimuth,
            distance,
        );
        (lon, lat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_maps_to_origin() {
        let proj = AzimuthalEquidistant::new(GeoPoint::new(-122.0, 36.7));
        let (x, y) = proj.forward(-122.0, 36.7).unwrap();
        assert!(x.abs() < 1e-9, "x should be ~0, got {}", x);
        assert!(y.abs() < 1e-9, "y should be ~0, got {}", y);
    }

    #[test]
    fn test_equator_east_offset() {
        let proj = AzimuthalEquidistant::new(GeoPoint::new(0.0, 0.0));
        let (x, y) = proj.forward(0.1, 0.0).unwrap();
        assert!((x - 11_131.95).abs() < 0.01, "x should be ~11131.95, got {}", x);
        assert!(y.abs() < 1e-6, "y should be ~0, got {}", y);
    }

    #[test]
    fn test_north_is_positive_y() {
        let proj = AzimuthalEquidistant::new(GeoPoint::new(10.0, 45.0));
        let (x, y) = proj.forward(10.0, 45.1).unwrap();
        assert!(x.abs() < 1e-6, "x should be ~0, got {}", x);
        assert!(y > 11_000.0 && y < 11_200.0, "y out of range: {}", y);
    }

    #[test]
    fn test_roundtrip() {
        let proj = AzimuthalEquidistant::new(GeoPoint::new(-122.0, 36.7));
        for &(lon, lat) in &[(-122.3, 36.5), (-121.7, 36.9), (-122.0, 37.0)] {
            let (x, y) = proj.forward(lon, lat).unwrap();
            let (lon2, lat2) = proj.inverse(x, y);
            assert!((lon - lon2).abs() < 1e-9, "lon {} -> {}", lon, lon2);
            assert!((lat - lat2).abs() < 1e-9, "lat {} -> {}", lat, lat2);
        }
    }
}
