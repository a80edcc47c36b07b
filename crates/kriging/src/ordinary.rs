//! Ordinary kriging over scattered points in D dimensions.
//!
//! The kriging system is written in semivariance form:
//!
//! ```text
//!   ┌                         ┐ ┌    ┐   ┌          ┐
//!   │  0    -γ12  ...  -γ1n  1 │ │ λ1 │   │ -γ(d10)  │
//!   │ -γ21   0    ...  -γ2n  1 │ │ λ2 │   │ -γ(d20)  │
//!   │  ...                     │ │ .. │ = │   ...    │
//!   │ -γn1  -γn2  ...   0    1 │ │ λn │   │ -γ(dn0)  │
//!   │  1     1    ...   1    0 │ │ μ  │   │    1     │
//!   └                         ┘ └    ┘   └          ┘
//! ```
//!
//! The matrix depends only on the sample positions, so it is LU-factored once
//! and every target point costs one back-substitution.

use nalgebra::{DMatrix, DVector, Dyn, LU};
use tracing::debug;

use ocean_common::{OceanError, OceanResult};

use crate::variogram::{distance, ExperimentalVariogram, Variogram, VariogramModel, VariogramParams};

/// Distances at or below this are treated as coincident with a sample.
const COINCIDENT_EPS: f64 = 1e-10;

/// Kriging estimate and variance at one target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub estimate: f64,
    pub variance: f64,
}

/// A fitted ordinary-kriging model.
pub struct OrdinaryKriging<const D: usize> {
    points: Vec<[f64; D]>,
    values: Vec<f64>,
    variogram: Variogram,
    /// Variogram used for the weights; differs from `variogram` only for
    /// constant fields, where a unit-sill stand-in is used.
    solver_variogram: Variogram,
    lu: LU<f64, Dyn, Dyn>,
}

impl<const D: usize> std::fmt::Debug for OrdinaryKriging<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdinaryKriging")
            .field("dims", &D)
            .field("points", &self.points.len())
            .field("variogram", &self.variogram)
            .finish()
    }
}

impl<const D: usize> OrdinaryKriging<D> {
    /// Fit a variogram of the given family to the samples and factor the
    /// kriging system.
    ///
    /// Needs at least `D + 1` samples that are not all on one hyperplane
    /// (3 non-collinear in 2D, 4 non-coplanar in 3D).
    pub fn fit(
        points: Vec<[f64; D]>,
        values: Vec<f64>,
        model: VariogramModel,
        nlags: usize,
    ) -> OceanResult<Self> {
        if points.len() != values.len() {
            return Err(OceanError::shape_mismatch(
                "kriging samples",
                format!("{} values", points.len()),
                values.len(),
            ));
        }
        check_spread(&points)?;

        let experimental = ExperimentalVariogram::compute(&points, &values, nlags);
        let variogram = Variogram::fit(model, &experimental);
        Self::with_variogram(points, values, variogram)
    }

    /// Build the kriging system with a known variogram.
    pub fn with_variogram(
        points: Vec<[f64; D]>,
        values: Vec<f64>,
        variogram: Variogram,
    ) -> OceanResult<Self> {
        check_spread(&points)?;

        let solver_variogram = if variogram.total_sill() > 0.0 {
            variogram
        } else {
            let extent = max_pair_distance(&points);
            Variogram::new(
                VariogramModel::Spherical,
                VariogramParams {
                    psill: 1.0,
                    range: if extent > 0.0 { extent } else { 1.0 },
                    nugget: 0.0,
                },
            )
        };

        let n = points.len();
        let mut a = DMatrix::<f64>::zeros(n + 1, n + 1);
        for i in 0..n {
            for j in (i + 1)..n {
                let d = distance(&points[i], &points[j]);
                if d <= COINCIDENT_EPS {
                    return Err(OceanError::Interpolation(format!(
                        "samples {} and {} share a position; kriging system is singular",
                        i, j
                    )));
                }
                let g = -solver_variogram.gamma(d);
                a[(i, j)] = g;
                a[(j, i)] = g;
            }
            a[(i, n)] = 1.0;
            a[(n, i)] = 1.0;
        }

        let lu = a.lu();
        if !lu.is_invertible() {
            return Err(OceanError::Interpolation(format!(
                "kriging system for {} samples is singular",
                n
            )));
        }

        debug!(
            dims = D,
            samples = n,
            psill = variogram.params.psill,
            range = variogram.params.range,
            nugget = variogram.params.nugget,
            "Factored kriging system"
        );

        Ok(Self {
            points,
            values,
            variogram,
            solver_variogram,
            lu,
        })
    }

    pub fn variogram(&self) -> &Variogram {
        &self.variogram
    }

    pub fn sample_count(&self) -> usize {
        self.points.len()
    }

    /// Estimate and variance at a single target.
    pub fn predict(&self, target: &[f64; D]) -> OceanResult<Prediction> {
        let n = self.points.len();
        let mut b = DVector::<f64>::zeros(n + 1);
        for (i, p) in self.points.iter().enumerate() {
            let d = distance(p, target);
            b[i] = if d <= COINCIDENT_EPS {
                0.0
            } else {
                -self.solver_variogram.gamma(d)
            };
        }
        b[n] = 1.0;

        let x = self
            .lu
            .solve(&b)
            .ok_or_else(|| OceanError::Interpolation("kriging solve failed".to_string()))?;

        let estimate = (0..n).map(|i| x[i] * self.values[i]).sum();
        let variance = if self.variogram.total_sill() > 0.0 {
            let v: f64 = -x.dot(&b);
            // round-off can leave tiny negatives at sample positions
            v.max(0.0)
        } else {
            0.0
        };

        Ok(Prediction { estimate, variance })
    }

    /// Predict at many targets, preserving order.
    pub fn predict_many(&self, targets: &[[f64; D]]) -> OceanResult<Vec<Prediction>> {
        targets.iter().map(|t| self.predict(t)).collect()
    }
}

/// Reject sample sets that cannot support an ordinary-kriging fit.
fn check_spread<const D: usize>(points: &[[f64; D]]) -> OceanResult<()> {
    let required = D + 1;
    if points.len() < required {
        return Err(OceanError::insufficient_data(
            required,
            points.len(),
            format!("{}D kriging needs at least {} valid samples", D, required),
        ));
    }

    // Affine rank of the sample positions: D means they span the space.
    let origin = points[0];
    let centered = DMatrix::from_fn(points.len() - 1, D, |i, k| points[i + 1][k] - origin[k]);
    let scale = centered.amax().max(f64::MIN_POSITIVE);
    let rank = (centered / scale).rank(1e-9);
    if rank < D {
        let shape = match D {
            2 => "collinear",
            3 => "coplanar",
            _ => "degenerate",
        };
        return Err(OceanError::insufficient_data(
            required,
            points.len(),
            format!("{}D kriging samples are {}", D, shape),
        ));
    }
    Ok(())
}

fn max_pair_distance<const D: usize>(points: &[[f64; D]]) -> f64 {
    let mut max = 0.0_f64;
    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            max = max.max(distance(&points[i], &points[j]));
        }
    }
    max
}
