//! Gridded scalar fields with explicit undefined samples.
//!
//! Both field types store values row-major with the last axis varying
//! fastest. For a [`Field3D`] in canonical (lat, lon, depth) order this makes
//! every vertical profile a contiguous slice.

use std::ops::Range;

use serde::Serialize;

use crate::{OceanError, OceanResult};

/// One grid sample: `None` means "no data" (land, below seafloor, missing).
pub type Sample = Option<f64>;

/// A 2D field over (lat, lon) or any (axis1, axis2) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field2D {
    rows: usize,
    cols: usize,
    values: Vec<Sample>,
}

impl Field2D {
    /// Create a field, checking that `values.len() == rows * cols`.
    pub fn new(rows: usize, cols: usize, values: Vec<Sample>) -> OceanResult<Self> {
        if values.len() != rows * cols {
            return Err(OceanError::shape_mismatch(
                "2D field",
                format!("{}x{} = {} values", rows, cols, rows * cols),
                values.len(),
            ));
        }
        Ok(Self { rows, cols, values })
    }

    /// Field with every cell set to `sample`.
    pub fn filled(rows: usize, cols: usize, sample: Sample) -> Self {
        Self {
            rows,
            cols,
            values: vec![sample; rows * cols],
        }
    }

    /// Field where every value is defined.
    pub fn from_dense(rows: usize, cols: usize, values: Vec<f64>) -> OceanResult<Self> {
        Self::new(rows, cols, values.into_iter().map(Some).collect())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    pub fn get(&self, row: usize, col: usize) -> Sample {
        self.values[self.index(row, col)]
    }

    pub fn set(&mut self, row: usize, col: usize, sample: Sample) {
        let idx = self.index(row, col);
        self.values[idx] = sample;
    }

    pub fn values(&self) -> &[Sample] {
        &self.values
    }

    /// Number of defined samples.
    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Minimum and maximum over defined samples.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        min_max(&self.values)
    }

    /// Flatten to plain values; fails on the first undefined sample.
    pub fn to_dense(&self, what: &str) -> OceanResult<Vec<f64>> {
        to_dense(&self.values, what)
    }

    /// Swap the two axes.
    pub fn transpose(&self) -> Self {
        let mut values = Vec::with_capacity(self.values.len());
        for c in 0..self.cols {
            for r in 0..self.rows {
                values.push(self.get(r, c));
            }
        }
        Self {
            rows: self.cols,
            cols: self.rows,
            values,
        }
    }

    /// Sub-field over row and column index ranges.
    pub fn slice(&self, rows: Range<usize>, cols: Range<usize>) -> OceanResult<Self> {
        check_range("2D field rows", &rows, self.rows)?;
        check_range("2D field cols", &cols, self.cols)?;
        let mut values = Vec::with_capacity(rows.len() * cols.len());
        for r in rows.clone() {
            let start = self.index(r, cols.start);
            values.extend_from_slice(&self.values[start..start + cols.len()]);
        }
        Ok(Self {
            rows: rows.len(),
            cols: cols.len(),
            values,
        })
    }
}

/// A 3D field over (lat, lon, depth).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field3D {
    rows: usize,
    cols: usize,
    levels: usize,
    values: Vec<Sample>,
}

impl Field3D {
    /// Create a field, checking that `values.len() == rows * cols * levels`.
    pub fn new(rows: usize, cols: usize, levels: usize, values: Vec<Sample>) -> OceanResult<Self> {
        let expected = rows * cols * levels;
        if values.len() != expected {
            return Err(OceanError::shape_mismatch(
                "3D field",
                format!("{}x{}x{} = {} values", rows, cols, levels, expected),
                values.len(),
            ));
        }
        Ok(Self {
            rows,
            cols,
            levels,
            values,
        })
    }

    pub fn filled(rows: usize, cols: usize, levels: usize, sample: Sample) -> Self {
        Self {
            rows,
            cols,
            levels,
            values: vec![sample; rows * cols * levels],
        }
    }

    pub fn from_dense(rows: usize, cols: usize, levels: usize, values: Vec<f64>) -> OceanResult<Self> {
        Self::new(rows, cols, levels, values.into_iter().map(Some).collect())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn levels(&self) -> usize {
        self.levels
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        (self.rows, self.cols, self.levels)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn index(&self, row: usize, col: usize, level: usize) -> usize {
        (row * self.cols + col) * self.levels + level
    }

    pub fn get(&self, row: usize, col: usize, level: usize) -> Sample {
        self.values[self.index(row, col, level)]
    }

    pub fn set(&mut self, row: usize, col: usize, level: usize, sample: Sample) {
        let idx = self.index(row, col, level);
        self.values[idx] = sample;
    }

    pub fn values(&self) -> &[Sample] {
        &self.values
    }

    /// The vertical profile of one horizontal cell, shallow to deep.
    pub fn profile(&self, row: usize, col: usize) -> &[Sample] {
        let start = self.index(row, col, 0);
        &self.values[start..start + self.levels]
    }

    /// Iterate over `(row, col, profile)` in row-major order.
    pub fn profiles(&self) -> impl Iterator<Item = (usize, usize, &[Sample])> + '_ {
        let cols = self.cols;
        self.values
            .chunks(self.levels.max(1))
            .enumerate()
            .map(move |(i, p)| (i / cols, i % cols, p))
    }

    /// Mutable profiles in row-major order.
    pub fn profiles_mut(&mut self) -> impl Iterator<Item = &mut [Sample]> + '_ {
        self.values.chunks_mut(self.levels.max(1))
    }

    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    pub fn min_max(&self) -> Option<(f64, f64)> {
        min_max(&self.values)
    }

    pub fn to_dense(&self, what: &str) -> OceanResult<Vec<f64>> {
        to_dense(&self.values, what)
    }

    /// Sub-field over row and column index ranges; depth is kept whole.
    pub fn slice(&self, rows: Range<usize>, cols: Range<usize>) -> OceanResult<Self> {
        check_range("3D field rows", &rows, self.rows)?;
        check_range("3D field cols", &cols, self.cols)?;
        let mut values = Vec::with_capacity(rows.len() * cols.len() * self.levels);
        for r in rows.clone() {
            let start = self.index(r, cols.start, 0);
            let end = start + cols.len() * self.levels;
            values.extend_from_slice(&self.values[start..end]);
        }
        Ok(Self {
            rows: rows.len(),
            cols: cols.len(),
            levels: self.levels,
            values,
        })
    }
}

fn min_max(values: &[Sample]) -> Option<(f64, f64)> {
    values.iter().flatten().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

fn to_dense(values: &[Sample], what: &str) -> OceanResult<Vec<f64>> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| v.ok_or_else(|| OceanError::undefined_value(what, i)))
        .collect()
}

fn check_range(what: &str, range: &Range<usize>, len: usize) -> OceanResult<()> {
    if range.start >= range.end || range.end > len {
        return Err(OceanError::shape_mismatch(
            what,
            format!("range within 0..{}", len),
            format!("{}..{}", range.start, range.end),
        ));
    }
    Ok(())
}
