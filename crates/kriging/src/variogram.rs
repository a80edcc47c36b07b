//! Experimental variograms and model fitting.
//!
//! A variogram model describes how the semivariance between two samples
//! grows with their separation. Models are parameterised by a partial sill,
//! a range and a nugget; the linear model reuses `psill` as its slope and
//! ignores `range`.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default number of lag bins in the experimental variogram.
pub const DEFAULT_NLAGS: usize = 6;

/// Number of candidate ranges in the coarse scan before golden-section search.
const RANGE_SCAN_STEPS: usize = 50;
const GOLDEN_ITERATIONS: usize = 60;

/// Variogram model family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariogramModel {
    #[default]
    Spherical,
    Exponential,
    Gaussian,
    Linear,
}

impl VariogramModel {
    /// Parse from string (as used in config files and environment variables).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "spherical" => Some(Self::Spherical),
            "exponential" => Some(Self::Exponential),
            "gaussian" => Some(Self::Gaussian),
            "linear" => Some(Self::Linear),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spherical => "spherical",
            Self::Exponential => "exponential",
            Self::Gaussian => "gaussian",
            Self::Linear => "linear",
        }
    }

    /// Unit-sill shape of the model at lag `h` for a given range.
    ///
    /// The fitted variogram is `psill * shape(h, range) + nugget`.
    fn shape(&self, h: f64, range: f64) -> f64 {
        match self {
            Self::Spherical => {
                if h >= range {
                    1.0
                } else {
                    let r = h / range;
                    1.5 * r - 0.5 * r * r * r
                }
            }
            Self::Exponential => 1.0 - (-h / (range / 3.0)).exp(),
            Self::Gaussian => {
                let s = 4.0 * range / 7.0;
                1.0 - (-(h * h) / (s * s)).exp()
            }
            Self::Linear => h,
        }
    }

    fn has_range(&self) -> bool {
        !matches!(self, Self::Linear)
    }
}

/// Fitted variogram parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariogramParams {
    /// Partial sill (slope for the linear model)
    pub psill: f64,
    pub range: f64,
    pub nugget: f64,
}

/// A variogram model with fitted parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Variogram {
    pub model: VariogramModel,
    pub params: VariogramParams,
}

impl Variogram {
    pub fn new(model: VariogramModel, params: VariogramParams) -> Self {
        Self { model, params }
    }

    /// Semivariance at lag `h`.
    #[inline]
    pub fn gamma(&self, h: f64) -> f64 {
        self.params.psill * self.model.shape(h, self.params.range) + self.params.nugget
    }

    /// Psill plus nugget; zero means the data carried no spatial variation.
    pub fn total_sill(&self) -> f64 {
        self.params.psill + self.params.nugget
    }

    /// Fit a model to an experimental variogram by bounded least squares.
    ///
    /// Bounds: `0 <= psill <= 10 * max(γ)`, `0 < range <= max(lag)`,
    /// `0 <= nugget <= max(γ)`. For a fixed range the model is linear in
    /// (psill, nugget), so each candidate range is solved in closed form and
    /// the range itself is found by a coarse scan then golden-section search.
    pub fn fit(model: VariogramModel, experimental: &ExperimentalVariogram) -> Self {
        let lags = &experimental.lags;
        let gammas = &experimental.semivariance;
        let max_gamma = gammas.iter().cloned().fold(0.0, f64::max);
        let max_lag = lags.iter().cloned().fold(0.0, f64::max);

        if lags.is_empty() || max_gamma <= 0.0 {
            return Self::new(
                model,
                VariogramParams {
                    psill: 0.0,
                    range: if max_lag > 0.0 { max_lag } else { 1.0 },
                    nugget: 0.0,
                },
            );
        }

        let psill_max = if model.has_range() {
            10.0 * max_gamma
        } else {
            // slope bound: reach 10 * max(γ) at the largest lag
            10.0 * max_gamma / max_lag.max(f64::MIN_POSITIVE)
        };
        let bounds = Bounds {
            psill_max,
            nugget_max: max_gamma,
        };

        let (best_range, (psill, nugget, sse)) = if model.has_range() {
            let cost = |range: f64| -> (f64, f64, f64) {
                let basis: Vec<f64> = lags.iter().map(|&h| model.shape(h, range)).collect();
                solve_bounded(&basis, gammas, &bounds)
            };

            let step = max_lag / RANGE_SCAN_STEPS as f64;
            let mut best_k = RANGE_SCAN_STEPS;
            let mut best_sse = f64::INFINITY;
            for k in 1..=RANGE_SCAN_STEPS {
                let sse = cost(step * k as f64).2;
                if sse < best_sse {
                    best_sse = sse;
                    best_k = k;
                }
            }

            let lo = step * (best_k as f64 - 1.0).max(f64::EPSILON);
            let hi = (step * (best_k as f64 + 1.0)).min(max_lag);
            let range = golden_section(lo, hi, |r| cost(r).2);
            let refined = cost(range);
            if refined.2 <= best_sse {
                (range, refined)
            } else {
                let range = step * best_k as f64;
                (range, cost(range))
            }
        } else {
            let basis: Vec<f64> = lags.clone();
            (max_lag, solve_bounded(&basis, gammas, &bounds))
        };

        debug!(
            model = model.as_str(),
            psill = psill,
            range = best_range,
            nugget = nugget,
            sse = sse,
            "Fitted variogram"
        );

        Self::new(
            model,
            VariogramParams {
                psill,
                range: best_range,
                nugget,
            },
        )
    }
}

/// Binned mean semivariance against mean lag.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExperimentalVariogram {
    pub lags: Vec<f64>,
    pub semivariance: Vec<f64>,
}

impl ExperimentalVariogram {
    /// Compute from samples using `nlags` equal-width bins between the
    /// smallest and largest pair distance. Empty bins are dropped.
    pub fn compute<const D: usize>(points: &[[f64; D]], values: &[f64], nlags: usize) -> Self {
        let n = points.len().min(values.len());
        if n < 2 || nlags == 0 {
            return Self::default();
        }

        let mut pairs = Vec::with_capacity(n * (n - 1) / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                let d = distance(&points[i], &points[j]);
                let g = 0.5 * (values[i] - values[j]).powi(2);
                pairs.push((d, g));
            }
        }

        let dmin = pairs.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
        let dmax = pairs.iter().map(|p| p.0).fold(0.0, f64::max);
        let width = (dmax - dmin) / nlags as f64;

        let mut sum_d = vec![0.0; nlags];
        let mut sum_g = vec![0.0; nlags];
        let mut count = vec![0usize; nlags];
        for &(d, g) in &pairs {
            let bin = if width > 0.0 {
                (((d - dmin) / width) as usize).min(nlags - 1)
            } else {
                0
            };
            sum_d[bin] += d;
            sum_g[bin] += g;
            count[bin] += 1;
        }

        let mut out = Self::default();
        for k in 0..nlags {
            if count[k] > 0 {
                out.lags.push(sum_d[k] / count[k] as f64);
                out.semivariance.push(sum_g[k] / count[k] as f64);
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.lags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lags.is_empty()
    }
}

/// Euclidean distance between two points.
#[inline]
pub fn distance<const D: usize>(a: &[f64; D], b: &[f64; D]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

struct Bounds {
    psill_max: f64,
    nugget_max: f64,
}

/// Least squares for `γ ≈ psill * basis + nugget` inside the box bounds.
///
/// Returns (psill, nugget, sse). The unconstrained optimum is used when it
/// is feasible; otherwise the best solution on the box edges is taken.
fn solve_bounded(basis: &[f64], gammas: &[f64], bounds: &Bounds) -> (f64, f64, f64) {
    let n = basis.len() as f64;
    let sf: f64 = basis.iter().sum();
    let sg: f64 = gammas.iter().sum();
    let sff: f64 = basis.iter().map(|f| f * f).sum();
    let sfg: f64 = basis.iter().zip(gammas).map(|(f, g)| f * g).sum();

    let sse = |p: f64, c: f64| -> f64 {
        basis
            .iter()
            .zip(gammas)
            .map(|(f, g)| {
                let r = p * f + c - g;
                r * r
            })
            .sum()
    };
    let feasible = |p: f64, c: f64| {
        (0.0..=bounds.psill_max).contains(&p) && (0.0..=bounds.nugget_max).contains(&c)
    };

    let det = n * sff - sf * sf;
    if det.abs() > 1e-12 * (n * sff).max(1.0) {
        let p = (n * sfg - sf * sg) / det;
        let c = (sff * sg - sf * sfg) / det;
        if feasible(p, c) {
            return (p, c, sse(p, c));
        }
    }

    let mut candidates = Vec::with_capacity(4);
    // psill fixed on an edge, nugget free
    for p in [0.0, bounds.psill_max] {
        let c = ((sg - p * sf) / n).clamp(0.0, bounds.nugget_max);
        candidates.push((p, c));
    }
    // nugget fixed on an edge, psill free
    for c in [0.0, bounds.nugget_max] {
        let p = if sff > 0.0 {
            ((sfg - c * sf) / sff).clamp(0.0, bounds.psill_max)
        } else {
            0.0
        };
        candidates.push((p, c));
    }

    candidates
        .into_iter()
        .map(|(p, c)| (p, c, sse(p, c)))
        .fold((0.0, 0.0, f64::INFINITY), |best, cur| if cur.2 < best.2 { cur } else { best })
}

fn golden_section(mut lo: f64, mut hi: f64, f: impl Fn(f64) -> f64) -> f64 {
    let ratio = (5.0_f64.sqrt() - 1.0) / 2.0;
    let mut c = hi - ratio * (hi - lo);
    let mut d = lo + ratio * (hi - lo);
    let mut fc = f(c);
    let mut fd = f(d);
    for _ in 0..GOLDEN_ITERATIONS {
        if (hi - lo).abs() <= 1e-9 * hi.abs().max(1.0) {
            break;
        }
        if fc < fd {
            hi = d;
            d = c;
            fd = fc;
            c = hi - ratio * (hi - lo);
            fc = f(c);
        } else {
            lo = c;
            c = d;
            fc = fd;
            d = lo + ratio * (hi - lo);
            fd = f(d);
        }
    }
    (lo + hi) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spherical_shape() {
        let v = Variogram::new(
            VariogramModel::Spherical,
            VariogramParams {
                psill: 2.0,
                range: 10.0,
                nugget: 0.5,
            },
        );
        assert!((v.gamma(0.0) - 0.5).abs() < 1e-12);
        // 2 * (1.5 * 0.5 - 0.5 * 0.125) + 0.5
        assert!((v.gamma(5.0) - 1.875).abs() < 1e-12);
        assert!((v.gamma(10.0) - 2.5).abs() < 1e-12);
        assert!((v.gamma(50.0) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_model_from_str() {
        assert_eq!(VariogramModel::from_str("Spherical"), Some(VariogramModel::Spherical));
        assert_eq!(VariogramModel::from_str("gaussian"), Some(VariogramModel::Gaussian));
        assert_eq!(VariogramModel::from_str("cubic"), None);
    }

    #[test]
    fn test_experimental_bins() {
        let points = [[0.0, 0.0], [1.0, 0.0], [2.0, 0.0], [3.0, 0.0]];
        let values = [0.0, 1.0, 2.0, 3.0];
        let ev = ExperimentalVariogram::compute(&points, &values, 3);
        assert_eq!(ev.len(), 3);
        // bin 0 holds the three unit-distance pairs, γ = 0.5
        assert!((ev.lags[0] - 1.0).abs() < 1e-12);
        assert!((ev.semivariance[0] - 0.5).abs() < 1e-12);
        // the last bin includes the maximum distance
        assert!((ev.lags[2] - 3.0).abs() < 1e-12);
        assert!((ev.semivariance[2] - 4.5).abs() < 1e-12);
    }

    #[test]
    fn test_fit_recovers_spherical() {
        let truth = Variogram::new(
            VariogramModel::Spherical,
            VariogramParams {
                psill: 4.0,
                range: 30.0,
                nugget: 0.2,
            },
        );
        let lags: Vec<f64> = (1..=12).map(|k| k as f64 * 5.0).collect();
        let semivariance = lags.iter().map(|&h| truth.gamma(h)).collect();
        let ev = ExperimentalVariogram {
            lags,
            semivariance,
        };
        let fitted = Variogram::fit(VariogramModel::Spherical, &ev);
        assert!((fitted.params.range - 30.0).abs() < 0.5, "range {}", fitted.params.range);
        assert!((fitted.params.psill - 4.0).abs() < 0.05, "psill {}", fitted.params.psill);
        assert!((fitted.params.nugget - 0.2).abs() < 0.05, "nugget {}", fitted.params.nugget);
    }

    #[test]
    fn test_fit_respects_bounds() {
        // Decreasing semivariance would want a negative sill.
        let ev = ExperimentalVariogram {
            lags: vec![1.0, 2.0, 3.0],
            semivariance: vec![3.0, 2.0, 1.0],
        };
        let fitted = Variogram::fit(VariogramModel::Spherical, &ev);
        assert!(fitted.params.psill >= 0.0);
        assert!(fitted.params.nugget >= 0.0 && fitted.params.nugget <= 3.0);
        assert!(fitted.params.range > 0.0 && fitted.params.range <= 3.0);
    }

    #[test]
    fn test_fit_constant_field() {
        let points = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
        let ev = ExperimentalVariogram::compute(&points, &[7.0, 7.0, 7.0], DEFAULT_NLAGS);
        let fitted = Variogram::fit(VariogramModel::Spherical, &ev);
        assert_eq!(fitted.total_sill(), 0.0);
    }
}
