//! Vertical completion of profile fields.
//!
//! Each profile is forward-filled from shallow to deep: an undefined sample
//! takes the nearest shallower defined value. Samples above the first
//! defined value stay undefined. Profiles never borrow from their
//! horizontal neighbours.

use tracing::debug;

use ocean_common::{Field3D, GeoGrid, OceanResult, Sample};

/// Forward-fill one profile in place. Returns the number of filled samples.
pub fn complete_profile(profile: &mut [Sample]) -> usize {
    let mut last = None;
    let mut filled = 0;
    for sample in profile.iter_mut() {
        match *sample {
            Some(v) => last = Some(v),
            None => {
                if last.is_some() {
                    *sample = last;
                    filled += 1;
                }
            }
        }
    }
    filled
}

/// Forward-fill every profile of a field in place.
pub fn complete_profiles_in_place(field: &mut Field3D) -> usize {
    field.profiles_mut().map(complete_profile).sum()
}

/// Forward-fill every profile, returning a new field.
pub fn complete_profiles(field: &Field3D) -> Field3D {
    let mut out = field.clone();
    complete_profiles_in_place(&mut out);
    out
}

/// Replace the named 3D field of a grid snapshot with its completed version.
pub fn complete_grid_field(grid: &GeoGrid, name: &str) -> OceanResult<GeoGrid> {
    let mut completed = grid.field_3d(name)?.clone();
    let filled = complete_profiles_in_place(&mut completed);
    debug!(field = name, filled = filled, range = ?completed.min_max(), "Completed profiles");

    let mut out = grid.clone();
    out.insert_field_3d(name, completed)?;
    Ok(out)
}
