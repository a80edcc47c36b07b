//! Test helpers shared by the sound-speed preparation crates.
//!
//! - [`generators`]: synthetic profiles, grids, height maps and scattered samples
//! - [`fixtures`]: named regions and depth layouts used across crates
//! - [`paths`]: locating files under `testdata/` and scratch directories
//! - assertion macros for `f64` and [`Sample`](ocean_common::Sample) values
//!
//! ```ignore
//! use test_utils::{assert_samples_approx_eq, create_profile_field, depth::TEN_LEVELS};
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Resolve a file under a `testdata/` directory, or return from the test.
///
/// ```ignore
/// let path = require_test_file!("sample_dataset.json");
/// let grid = load_dataset(&path, 0).unwrap();
/// ```
#[macro_export]
macro_rules! require_test_file {
    ($name:expr) => {{
        match $crate::find_test_file($name) {
            Some(path) => path,
            None => {
                eprintln!("SKIPPED: no testdata file '{}'", $name);
                return;
            }
        }
    }};
}

/// Resolve several testdata files at once; returns from the test if any is missing.
#[macro_export]
macro_rules! require_test_files {
    ($($name:expr),+ $(,)?) => {{
        let mut paths = Vec::new();
        $(
            match $crate::find_test_file($name) {
                Some(path) => paths.push(path),
                None => {
                    eprintln!("SKIPPED: no testdata file '{}'", $name);
                    return;
                }
            }
        )+
        paths
    }};
}

/// `|left - right| <= epsilon` for values convertible to `f64`.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Compare two sample slices (profiles, flattened fields).
///
/// Lengths and definedness must match exactly; defined values must agree
/// within `epsilon`.
#[macro_export]
macro_rules! assert_samples_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: &[Option<f64>] = &$left;
        let right: &[Option<f64>] = &$right;
        let epsilon: f64 = $epsilon as f64;
        assert_eq!(left.len(), right.len(), "sample counts differ");
        for (i, (l, r)) in left.iter().zip(right.iter()).enumerate() {
            match (l, r) {
                (Some(a), Some(b)) if (a - b).abs() <= epsilon => {}
                (None, None) => {}
                _ => panic!(
                    "assertion failed: samples differ at index {}\n  left: `{:?}`,\n right: `{:?}`",
                    i, l, r
                ),
            }
        }
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(1500.0001, 1500.0, 0.001);
        assert_approx_eq!(-2.5, -2.500001, 0.0001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(57.5, 57.0, 0.001);
    }

    #[test]
    fn test_samples_match_with_gaps() {
        let profile = vec![Some(1500.0), Some(1499.5), None];
        assert_samples_approx_eq!(profile, [Some(1500.0), Some(1499.50001), None], 1e-3);
    }

    #[test]
    #[should_panic(expected = "samples differ at index 2")]
    fn test_samples_definedness_mismatch() {
        assert_samples_approx_eq!([Some(1.0), Some(2.0), None], [Some(1.0), Some(2.0), Some(2.0)], 1e-9);
    }
}
