//! Ordinary kriging for scattered ocean samples.
//!
//! # Architecture
//!
//! ```text
//! Field2D / Field3D ──► drop undefined ──► ExperimentalVariogram (nlags bins)
//!                                                  │
//!                                                  ▼
//!                                      Variogram::fit (bounded least squares)
//!                                                  │
//!                                                  ▼
//!                                 OrdinaryKriging (LU-factored once)
//!                                                  │
//!                          target axes ──► predict ──► estimate + variance
//! ```
//!
//! The cost of a fit is quadratic in the number of valid samples for the
//! variogram and cubic for the factorisation; large inputs should be
//! downsampled by the caller.

pub mod grid;
pub mod ordinary;
pub mod variogram;

pub use grid::{krige_2d, krige_3d, refine_axis, KrigedField2D, KrigedField3D, KrigingConfig};
pub use ordinary::{OrdinaryKriging, Prediction};
pub use variogram::{ExperimentalVariogram, Variogram, VariogramModel, VariogramParams, DEFAULT_NLAGS};
