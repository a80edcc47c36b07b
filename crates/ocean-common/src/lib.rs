//! Common types shared across the sound-speed preparation crates.
//!
//! Everything here is a plain value type: axes, gridded fields with explicit
//! "undefined" samples, and the geographic / local-planar grid records that
//! the pipeline stages hand to each other.

pub mod axis;
pub mod bbox;
pub mod error;
pub mod field;
pub mod grid;

pub use axis::Axis;
pub use bbox::GeoBoundingBox;
pub use error::{OceanError, OceanResult};
pub use field::{Field2D, Field3D, Sample};
pub use grid::{GeoGrid, GeoPoint, LocalGrid};

/// Canonical axis names used by datasets and export manifests.
pub mod dims {
    pub const LON: &str = "lon";
    pub const LAT: &str = "lat";
    pub const DEPTH: &str = "depth";
    pub const TIME: &str = "time";
}
