//! Named, strictly increasing coordinate axes.

use serde::{Deserialize, Serialize};

use crate::{OceanError, OceanResult};

/// A 1D coordinate axis (longitude, latitude, depth, time, x_m, y_m).
///
/// Values are strictly increasing; this is checked once on construction so
/// later stages can rely on `first()`/`last()` being the extremes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAxis")]
pub struct Axis {
    name: String,
    values: Vec<f64>,
}

/// Unchecked wire form; deserialization goes through [`Axis::new`].
#[derive(Deserialize)]
struct RawAxis {
    name: String,
    values: Vec<f64>,
}

impl TryFrom<RawAxis> for Axis {
    type Error = OceanError;

    fn try_from(raw: RawAxis) -> OceanResult<Self> {
        Axis::new(raw.name, raw.values)
    }
}

impl Axis {
    /// Create a validated axis.
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> OceanResult<Self> {
        let name = name.into();
        if values.is_empty() {
            return Err(OceanError::InvalidAxis(format!("{}: axis is empty", name)));
        }
        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(OceanError::InvalidAxis(format!(
                "{}: non-finite value at index {}",
                name, pos
            )));
        }
        if let Some(pos) = values.windows(2).position(|w| w[1] <= w[0]) {
            return Err(OceanError::InvalidAxis(format!(
                "{}: not strictly increasing at index {} ({} -> {})",
                name,
                pos + 1,
                values[pos],
                values[pos + 1]
            )));
        }
        Ok(Self { name, values })
    }

    /// Evenly spaced axis between `start` and `end` inclusive.
    pub fn linspace(name: impl Into<String>, start: f64, end: f64, num: usize) -> OceanResult<Self> {
        Self::new(name, linspace(start, end, num))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Axes are never empty, kept for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first(&self) -> f64 {
        self.values[0]
    }

    pub fn last(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    /// Sub-axis over an index range.
    pub fn slice(&self, range: std::ops::Range<usize>) -> OceanResult<Self> {
        if range.start >= range.end || range.end > self.values.len() {
            return Err(OceanError::shape_mismatch(
                format!("{} slice", self.name),
                format!("range within 0..{}", self.values.len()),
                format!("{}..{}", range.start, range.end),
            ));
        }
        Ok(Self {
            name: self.name.clone(),
            values: self.values[range].to_vec(),
        })
    }
}

/// Linearly spaced values from `start` to `end` inclusive.
///
/// `num == 1` yields `[start]`, `num == 0` yields an empty vector.
pub fn linspace(start: f64, end: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (num - 1) as f64;
            (0..num)
                .map(|i| if i == num - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}
