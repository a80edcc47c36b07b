//! Local planar projection for small ocean subgrids.
//!
//! Implements the geodesic math from scratch without external dependencies:
//! Vincenty's formulas on the WGS84 ellipsoid, an Azimuthal Equidistant
//! projection built on them, and a subgrid projector that turns lon/lat axes
//! into local x/y axes in meters.

pub mod aeqd;
pub mod geodesic;
pub mod local;

pub use aeqd::AzimuthalEquidistant;
pub use geodesic::Ellipsoid;
pub use local::{PlanarAxes, ProjectionConfig, SubgridProjector, X_AXIS, Y_AXIS};
