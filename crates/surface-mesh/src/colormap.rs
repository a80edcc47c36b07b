//! Height-to-color mapping.

use serde::{Deserialize, Serialize};

/// RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Components scaled to [0, 1].
    pub fn to_unit_rgb(&self) -> [f64; 3] {
        [
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
        ]
    }
}

/// Viridis sampled at nine evenly spaced stops.
pub const VIRIDIS: [Color; 9] = [
    Color::new(68, 1, 84),
    Color::new(71, 44, 122),
    Color::new(59, 81, 139),
    Color::new(44, 113, 142),
    Color::new(33, 144, 141),
    Color::new(39, 173, 129),
    Color::new(92, 200, 99),
    Color::new(170, 220, 50),
    Color::new(253, 231, 37),
];

/// Viridis color for a normalized value; `t` is clamped to [0, 1].
pub fn viridis(t: f64) -> Color {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let segments = (VIRIDIS.len() - 1) as f64;
    let pos = t * segments;
    let idx = (pos.floor() as usize).min(VIRIDIS.len() - 2);
    interpolate_color(VIRIDIS[idx], VIRIDIS[idx + 1], pos - idx as f64)
}

fn interpolate_color(color1: Color, color2: Color, t: f64) -> Color {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;
    let mix = |a: u8, b: u8| (a as f64 * t_inv + b as f64 * t).round() as u8;
    Color::new(
        mix(color1.r, color2.r),
        mix(color1.g, color2.g),
        mix(color1.b, color2.b),
    )
}

/// Min-max normalize to [0, 1]. A constant input maps to all zeros.
pub fn normalize(values: &[f64]) -> Vec<f64> {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = max - min;
    if range.is_nan() || range <= 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|&v| (v - min) / range).collect()
}
