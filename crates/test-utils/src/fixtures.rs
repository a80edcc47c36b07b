//! Common test fixtures for sound-speed preparation tests.
//!
//! This module provides pre-defined regions and depth layouts that mirror
//! the small coastal subgrids the pipeline is meant for.

/// Common region definitions for testing.
pub mod region {
    /// Monterey Bay sized region, 0.1 degree spacing
    pub const MONTEREY: RegionSpec = RegionSpec {
        lon0: -122.3,
        lat0: 36.4,
        step: 0.1,
        rows: 8,
        cols: 8,
    };

    /// The 5x5 grid used by the bathymetry scenario
    pub const SMALL_5X5: RegionSpec = RegionSpec {
        lon0: 10.0,
        lat0: 43.0,
        step: 0.05,
        rows: 5,
        cols: 5,
    };

    /// Region specification for testing.
    #[derive(Debug, Clone, Copy)]
    pub struct RegionSpec {
        pub lon0: f64,
        pub lat0: f64,
        pub step: f64,
        pub rows: usize,
        pub cols: usize,
    }

    impl RegionSpec {
        /// Returns the total number of horizontal cells.
        pub fn size(&self) -> usize {
            self.rows * self.cols
        }

        /// Builds a grid over this region with a `sound_speed` field.
        pub fn grid(
            &self,
            depths: &[f64],
            valid_levels: impl Fn(usize, usize) -> usize,
        ) -> ocean_common::GeoGrid {
            crate::generators::create_test_grid(
                self.lon0,
                self.lat0,
                self.step,
                (self.rows, self.cols),
                depths,
                valid_levels,
            )
        }
    }
}

/// Common depth layouts for testing.
pub mod depth {
    /// Ten levels, 10 m apart, from the surface
    pub const TEN_LEVELS: [f64; 10] = [0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0];

    /// Default bathymetry margin in meters
    pub const EPSILON: f64 = 2.5;
}
