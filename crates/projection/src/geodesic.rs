//! Vincenty geodesics on an ellipsoid.
//!
//! The inverse problem gives distance and forward azimuth between two
//! points; the direct problem walks a distance along an azimuth. Both are
//! accurate to well under a millimetre for the short distances used by the
//! local projection. The inverse iteration can fail to converge for nearly
//! antipodal points; that case is reported as `None`.

use std::f64::consts::PI;

const MAX_ITERATIONS: usize = 200;
const CONVERGENCE: f64 = 1e-12;

/// Reference ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis (meters)
    pub a: f64,
    /// Flattening
    pub f: f64,
}

impl Ellipsoid {
    /// WGS84 ellipsoid.
    pub const WGS84: Ellipsoid = Ellipsoid {
        a: 6_378_137.0,
        f: 1.0 / 298.257_223_563,
    };

    /// Semi-minor axis (meters).
    pub fn b(&self) -> f64 {
        self.a * (1.0 - self.f)
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::WGS84
    }
}

/// Result of the inverse geodesic problem.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InverseSolution {
    /// Geodesic distance (meters)
    pub distance: f64,
    /// Forward azimuth at the first point, radians clockwise from north
    pub azimuth: f64,
}

/// Distance and forward azimuth from point 1 to point 2 (degrees in).
pub fn inverse(
    ellipsoid: &Ellipsoid,
    lat1_deg: f64,
    lon1_deg: f64,
    lat2_deg: f64,
    lon2_deg: f64,
) -> Option<InverseSolution> {
    let Ellipsoid { a, f } = *ellipsoid;
    let b = ellipsoid.b();

    let l = normalize_lon((lon2_deg - lon1_deg).to_radians());
    let u1 = ((1.0 - f) * lat1_deg.to_radians().tan()).atan();
    let u2 = ((1.0 - f) * lat2_deg.to_radians().tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    let mut converged = false;
    let (mut sin_sigma, mut cos_sigma, mut sigma) = (0.0, 0.0, 0.0);
    let (mut cos_sq_alpha, mut cos_2sigma_m) = (0.0, 0.0);
    let (mut sin_lambda, mut cos_lambda) = (0.0, 0.0);

    for _ in 0..MAX_ITERATIONS {
        (sin_lambda, cos_lambda) = lambda.sin_cos();
        let t1 = cos_u2 * sin_lambda;
        let t2 = cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda;
        sin_sigma = (t1 * t1 + t2 * t2).sqrt();
        if sin_sigma == 0.0 {
            // coincident points
            return Some(InverseSolution {
                distance: 0.0,
                azimuth: 0.0,
            });
        }
        cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        cos_2sigma_m = if cos_sq_alpha != 0.0 {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        } else {
            // equatorial line
            0.0
        };
        let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
        let previous = lambda;
        lambda = l
            + (1.0 - c)
                * f
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));
        if (lambda - previous).abs() < CONVERGENCE {
            converged = true;
            break;
        }
    }

    if !converged {
        return None;
    }

    let u_sq = cos_sq_alpha * (a * a - b * b) / (b * b);
    let (big_a, big_b) = series_coefficients(u_sq);
    let delta_sigma = delta_sigma(big_b, sin_sigma, cos_sigma, cos_2sigma_m);
    let distance = b * big_a * (sigma - delta_sigma);
    let azimuth = (cos_u2 * sin_lambda).atan2(cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda);

    Some(InverseSolution { distance, azimuth })
}

/// Destination (lat, lon) in degrees after travelling `distance` meters from
/// (lat1, lon1) along `azimuth` radians.
pub fn direct(
    ellipsoid: &Ellipsoid,
    lat1_deg: f64,
    lon1_deg: f64,
    azimuth: f64,
    distance: f64,
) -> (f64, f64) {
    let Ellipsoid { a, f } = *ellipsoid;
    let b = ellipsoid.b();

    let (sin_alpha1, cos_alpha1) = azimuth.sin_cos();
    let tan_u1 = (1.0 - f) * lat1_deg.to_radians().tan();
    let cos_u1 = 1.0 / (1.0 + tan_u1 * tan_u1).sqrt();
    let sin_u1 = tan_u1 * cos_u1;
    let sigma1 = tan_u1.atan2(cos_alpha1);
    let sin_alpha = cos_u1 * sin_alpha1;
    let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
    let u_sq = cos_sq_alpha * (a * a - b * b) / (b * b);
    let (big_a, big_b) = series_coefficients(u_sq);

    let mut sigma = distance / (b * big_a);
    let (mut sin_sigma, mut cos_sigma, mut cos_2sigma_m) = (0.0, 0.0, 0.0);
    for _ in 0..MAX_ITERATIONS {
        cos_2sigma_m = (2.0 * sigma1 + sigma).cos();
        (sin_sigma, cos_sigma) = sigma.sin_cos();
        let previous = sigma;
        sigma = distance / (b * big_a) + delta_sigma(big_b, sin_sigma, cos_sigma, cos_2sigma_m);
        if (sigma - previous).abs() < CONVERGENCE {
            break;
        }
    }
    (sin_sigma, cos_sigma) = sigma.sin_cos();
    cos_2sigma_m = (2.0 * sigma1 + sigma).cos();

    let tmp = sin_u1 * sin_sigma - cos_u1 * cos_sigma * cos_alpha1;
    let lat2 = (sin_u1 * cos_sigma + cos_u1 * sin_sigma * cos_alpha1)
        .atan2((1.0 - f) * (sin_alpha * sin_alpha + tmp * tmp).sqrt());
    let lambda = (sin_sigma * sin_alpha1).atan2(cos_u1 * cos_sigma - sin_u1 * sin_sigma * cos_alpha1);
    let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
    let l = lambda
        - (1.0 - c)
            * f
            * sin_alpha
            * (sigma
                + c * sin_sigma
                    * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));
    let lon2 = normalize_lon(lon1_deg.to_radians() + l);

    (lat2.to_degrees(), lon2.to_degrees())
}

fn series_coefficients(u_sq: f64) -> (f64, f64) {
    let big_a = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
    let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
    (big_a, big_b)
}

fn delta_sigma(big_b: f64, sin_sigma: f64, cos_sigma: f64, cos_2sigma_m: f64) -> f64 {
    big_b
        * sin_sigma
        * (cos_2sigma_m
            + big_b / 4.0
                * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)
                    - big_b / 6.0
                        * cos_2sigma_m
                        * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                        * (-3.0 + 4.0 * cos_2sigma_m * cos_2sigma_m)))
}

/// Normalize a longitude difference to [-π, π].
fn normalize_lon(mut lon: f64) -> f64 {
    while lon > PI {
        lon -= 2.0 * PI;
    }
    while lon < -PI {
        lon += 2.0 * PI;
    }
    lon
}
