//! Test data generators for synthetic ocean profiles and grids.
//!
//! These generators create predictable, verifiable test data patterns
//! that can be used across the test suite.

use ocean_common::{dims, Axis, Field2D, Field3D, GeoGrid};

/// Sound speed in m/s for a simple linear profile.
///
/// Decreases 0.05 m/s per meter from 1500 m/s at the surface, plus a small
/// horizontal gradient so neighbouring profiles differ.
pub fn sound_speed_at(row: usize, col: usize, depth: f64) -> f64 {
    1500.0 - 0.05 * depth + 0.3 * row as f64 - 0.2 * col as f64
}

/// Evenly spaced depth levels starting at the surface.
///
/// # Example
///
/// ```
/// use test_utils::create_depth_levels;
///
/// assert_eq!(create_depth_levels(4, 10.0), vec![0.0, 10.0, 20.0, 30.0]);
/// ```
pub fn create_depth_levels(count: usize, spacing: f64) -> Vec<f64> {
    (0..count).map(|k| k as f64 * spacing).collect()
}

/// Creates a (rows, cols, levels) sound-speed field.
///
/// Each profile is defined for its first `valid_levels(row, col)` samples and
/// undefined below, the way a model grid marks the seafloor.
///
/// # Arguments
///
/// * `rows` - Number of latitude rows
/// * `cols` - Number of longitude columns
/// * `depths` - Depth levels, shallow to deep
/// * `valid_levels` - Number of defined samples for each (row, col)
pub fn create_profile_field(
    rows: usize,
    cols: usize,
    depths: &[f64],
    valid_levels: impl Fn(usize, usize) -> usize,
) -> Field3D {
    let mut field = Field3D::filled(rows, cols, depths.len(), None);
    for row in 0..rows {
        for col in 0..cols {
            let valid = valid_levels(row, col).min(depths.len());
            for (k, &depth) in depths.iter().enumerate().take(valid) {
                field.set(row, col, k, Some(sound_speed_at(row, col, depth)));
            }
        }
    }
    field
}

/// Creates a profile field that deepens from the north-west corner, giving a
/// sloping seafloor.
pub fn create_sloping_profile_field(rows: usize, cols: usize, depths: &[f64]) -> Field3D {
    let levels = depths.len();
    create_profile_field(rows, cols, depths, |r, c| (2 + r + c).min(levels))
}

/// Creates a geographic grid with a `sound_speed` field.
///
/// Longitudes and latitudes are spaced `step` degrees from the south-west
/// corner `(lon0, lat0)`.
pub fn create_test_grid(
    lon0: f64,
    lat0: f64,
    step: f64,
    shape: (usize, usize),
    depths: &[f64],
    valid_levels: impl Fn(usize, usize) -> usize,
) -> GeoGrid {
    let (rows, cols) = shape;
    let lon = Axis::new(dims::LON, (0..cols).map(|c| lon0 + c as f64 * step).collect())
        .expect("generated longitudes are increasing");
    let lat = Axis::new(dims::LAT, (0..rows).map(|r| lat0 + r as f64 * step).collect())
        .expect("generated latitudes are increasing");
    let depth = Axis::new(dims::DEPTH, depths.to_vec()).expect("depth levels must be increasing");
    let field = create_profile_field(rows, cols, depths, valid_levels);
    GeoGrid::new(lon, lat, depth)
        .with_field_3d("sound_speed", field)
        .expect("generated field matches the axes")
}

/// Creates a bowl-shaped height grid: deepest in the middle.
///
/// Values are positive depths in meters, laid out row-major.
pub fn create_bowl_heights(rows: usize, cols: usize, max_depth: f64) -> Field2D {
    let cr = (rows as f64 - 1.0) / 2.0;
    let cc = (cols as f64 - 1.0) / 2.0;
    let norm = (cr * cr + cc * cc).max(1.0);
    let values = (0..rows)
        .flat_map(|r| {
            (0..cols).map(move |c| {
                let dr = r as f64 - cr;
                let dc = c as f64 - cc;
                max_depth * (1.0 - (dr * dr + dc * dc) / norm)
            })
        })
        .collect();
    Field2D::from_dense(rows, cols, values).expect("values match shape")
}

/// Scattered 2D samples with reproducible positions and a smooth value.
///
/// Positions lie in `[0, extent)²`; values follow a gentle plane plus a
/// ripple so the variogram has structure.
pub fn create_scattered_samples(count: usize, extent: f64, seed: u32) -> (Vec<[f64; 2]>, Vec<f64>) {
    let mut points = Vec::with_capacity(count);
    let mut values = Vec::with_capacity(count);
    for i in 0..count {
        let hx = simple_hash(i as u32, 0, seed);
        let hy = simple_hash(i as u32, 1, seed);
        let x = (hx % 1_000_000) as f64 / 1_000_000.0 * extent;
        let y = (hy % 1_000_000) as f64 / 1_000_000.0 * extent;
        points.push([x, y]);
        values.push(50.0 + 0.01 * x - 0.02 * y + (x / extent * 6.0).sin() * 3.0);
    }
    (points, values)
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}
