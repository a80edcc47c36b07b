//! Bathymetry and profile completion on small synthetic grids.

use field_processor::{
    complete_grid_field, complete_profiles, extract_bathymetry, extract_grid_bathymetry, BathymetryConfig,
    BATHYMETRY_FIELD,
};
use ocean_common::Axis;
use test_utils::fixtures::{depth, region};
use test_utils::{assert_approx_eq, create_profile_field, create_sloping_profile_field, create_test_grid};

#[test]
fn test_5x5_scenario() {
    let spec = region::SMALL_5X5;
    let grid = spec.grid(&depth::TEN_LEVELS, |r, c| if (r, c) == (2, 2) { 6 } else { 10 });

    let config = BathymetryConfig {
        epsilon_m: depth::EPSILON,
        ..Default::default()
    };
    let out = extract_grid_bathymetry(&grid, &config).unwrap();
    let bathy = out.field_2d(BATHYMETRY_FIELD).unwrap();

    assert_eq!(bathy.shape(), (5, 5));
    assert_eq!(bathy.defined_count(), spec.size());
    assert_approx_eq!(bathy.get(2, 2).unwrap(), 57.5, 1e-12);
    for r in 0..5 {
        for c in 0..5 {
            if (r, c) != (2, 2) {
                assert_approx_eq!(bathy.get(r, c).unwrap(), 87.5, 1e-12);
            }
        }
    }
}

#[test]
fn test_bathymetry_follows_first_gap() {
    let levels = depth::TEN_LEVELS;
    let depth_axis = Axis::new("depth", levels.to_vec()).unwrap();
    let field = create_sloping_profile_field(4, 4, &levels);
    let bathy = extract_bathymetry(&field, &depth_axis, &BathymetryConfig::default()).unwrap();

    for r in 0..4 {
        for c in 0..4 {
            let valid = (2 + r + c).min(levels.len());
            let expected = if valid == levels.len() {
                levels[levels.len() - 1] - depth::EPSILON
            } else {
                levels[valid] - depth::EPSILON
            };
            assert_approx_eq!(bathy.get(r, c).unwrap(), expected, 1e-12);
        }
    }
}

#[test]
fn test_completion_is_idempotent() {
    let field = create_profile_field(3, 4, &depth::TEN_LEVELS, |r, c| (r * 3 + c) % 11);
    let once = complete_profiles(&field);
    let twice = complete_profiles(&once);
    assert_eq!(once, twice);
}

#[test]
fn test_completion_keeps_defined_values() {
    let field = create_profile_field(3, 4, &depth::TEN_LEVELS, |r, c| (r * 3 + c) % 11);
    let completed = complete_profiles(&field);

    for (r, c, profile) in field.profiles() {
        let after = completed.profile(r, c);
        for (before, after) in profile.iter().zip(after) {
            if before.is_some() {
                assert_eq!(before, after);
            }
        }
        let first_before = profile.iter().position(Option::is_some);
        let first_after = after.iter().position(Option::is_some);
        assert_eq!(first_before, first_after);
        if let Some(first) = first_before {
            assert!(after[first..].iter().all(Option::is_some));
        }
    }
}

#[test]
fn test_extraction_before_completion() {
    let grid = create_test_grid(-122.0, 36.6, 0.1, (2, 2), &depth::TEN_LEVELS, |_, _| 4);
    let config = BathymetryConfig::default();

    let right_order = extract_grid_bathymetry(&grid, &config).unwrap();
    let completed_first = complete_grid_field(&grid, "sound_speed").unwrap();
    let wrong_order = extract_grid_bathymetry(&completed_first, &config).unwrap();

    let right = right_order.field_2d(BATHYMETRY_FIELD).unwrap().get(0, 0).unwrap();
    let wrong = wrong_order.field_2d(BATHYMETRY_FIELD).unwrap().get(0, 0).unwrap();
    assert_approx_eq!(right, 37.5, 1e-12);
    // completion erases the gap, so the seafloor collapses to the deepest level
    assert_approx_eq!(wrong, 87.5, 1e-12);
}
