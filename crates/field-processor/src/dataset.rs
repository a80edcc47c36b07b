//! Loading gridded datasets from JSON documents.
//!
//! The document mirrors a labeled multi-dimensional dataset:
//!
//! ```json
//! {
//!   "coords": { "lon": [...], "lat": [...], "depth": [...], "time": [...] },
//!   "fields": {
//!     "sound_speed": { "dims": ["time", "depth", "lat", "lon"], "values": [1500.1, null, ...] }
//!   }
//! }
//! ```
//!
//! Field values are flat and row-major in the order of their `dims`; `null`
//! marks no-data, as does any value equal to the field's optional numeric
//! `no_data` marker (e.g. `-32767.0`). Any permutation of the axes is accepted. Loading selects
//! one time step and permutes every field to (lat, lon) or (lat, lon, depth).

use std::collections::BTreeMap;
use std::ops::Range;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use ocean_common::{dims, Axis, Field2D, Field3D, GeoGrid, OceanError, OceanResult, Sample};

/// Raw JSON dataset document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetDocument {
    pub coords: BTreeMap<String, Vec<f64>>,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldDocument>,
}

/// One field of a dataset document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDocument {
    pub dims: Vec<String>,
    pub values: Vec<Sample>,
    /// Fill value standing for missing data
    #[serde(default, alias = "_FillValue", skip_serializing_if = "Option::is_none")]
    pub no_data: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
}

/// Which part of the dataset to keep.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubsetConfig {
    /// Time step selected from fields that have a time dimension
    pub time_index: usize,
    /// Latitude index range `[start, end)`; whole axis when absent
    pub lat: Option<[usize; 2]>,
    /// Longitude index range `[start, end)`; whole axis when absent
    pub lon: Option<[usize; 2]>,
}

impl SubsetConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        for (name, range) in [("lat", self.lat), ("lon", self.lon)] {
            if let Some([start, end]) = range {
                if start >= end {
                    return Err(format!("{} range [{}, {}) is empty", name, start, end));
                }
            }
        }
        Ok(())
    }
}

/// Read and parse a dataset file, selecting `time_index`.
pub fn load_dataset(path: impl AsRef<Path>, time_index: usize) -> OceanResult<GeoGrid> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)?;
    let grid = parse_dataset(&contents, time_index)?;
    let (nlat, nlon, ndepth) = grid.shape();
    info!(
        path = %path.display(),
        nlat = nlat,
        nlon = nlon,
        ndepth = ndepth,
        fields_2d = grid.field_names_2d().count(),
        fields_3d = grid.field_names_3d().count(),
        "Loaded dataset"
    );
    Ok(grid)
}

/// Parse a dataset document from a JSON string.
pub fn parse_dataset(json: &str, time_index: usize) -> OceanResult<GeoGrid> {
    let doc: DatasetDocument = serde_json::from_str(json)?;
    dataset_to_grid(&doc, time_index)
}

/// Validate a document and convert it to a canonical grid.
pub fn dataset_to_grid(doc: &DatasetDocument, time_index: usize) -> OceanResult<GeoGrid> {
    let coord = |name: &str| -> OceanResult<Axis> {
        let values = doc
            .coords
            .get(name)
            .ok_or_else(|| OceanError::FieldNotFound(format!("coordinate '{}'", name)))?;
        Axis::new(name, values.clone())
    };

    let lon = coord(dims::LON)?;
    let lat = coord(dims::LAT)?;
    let depth = coord(dims::DEPTH)?;
    let time = match doc.coords.get(dims::TIME) {
        Some(values) => Some(Axis::new(dims::TIME, values.clone())?),
        None => None,
    };

    if let Some(time) = &time {
        if time_index >= time.len() {
            return Err(OceanError::invalid_config(format!(
                "time index {} out of range for {} time steps",
                time_index,
                time.len()
            )));
        }
    }

    let axis_len = |name: &str| -> Option<usize> {
        match name {
            dims::LON => Some(lon.len()),
            dims::LAT => Some(lat.len()),
            dims::DEPTH => Some(depth.len()),
            dims::TIME => time.as_ref().map(Axis::len),
            _ => None,
        }
    };

    let mut grid = GeoGrid::new(lon.clone(), lat.clone(), depth.clone());
    if let Some(time) = time.clone() {
        grid = grid.with_time(time);
    }

    for (name, field) in &doc.fields {
        let layout = FieldLayout::new(name, &field.dims, &axis_len)?;
        if field.values.len() != layout.size() {
            return Err(OceanError::shape_mismatch(
                name.as_str(),
                format!("{:?} = {} values", field.dims, layout.size()),
                field.values.len(),
            ));
        }

        let canonical: Vec<&str> = if layout.has(dims::DEPTH) {
            vec![dims::LAT, dims::LON, dims::DEPTH]
        } else {
            vec![dims::LAT, dims::LON]
        };
        let mut values = layout.permute(&field.values, &canonical, time_index);
        if let Some(marker) = field.no_data {
            for v in values.iter_mut().filter(|v| **v == Some(marker)) {
                *v = None;
            }
        }

        if layout.has(dims::DEPTH) {
            grid.insert_field_3d(name.as_str(), Field3D::new(lat.len(), lon.len(), depth.len(), values)?)?;
        } else {
            grid.insert_field_2d(name.as_str(), Field2D::new(lat.len(), lon.len(), values)?)?;
        }
        debug!(field = %name, dims = ?field.dims, "Canonicalised field");
    }

    Ok(grid)
}

/// Apply a subset configuration to a loaded grid.
pub fn apply_subset(grid: &GeoGrid, config: &SubsetConfig) -> OceanResult<GeoGrid> {
    let (nlat, nlon, _) = grid.shape();
    let to_range = |r: Option<[usize; 2]>, len: usize| -> Range<usize> {
        match r {
            Some([start, end]) => start..end,
            None => 0..len,
        }
    };
    let lat = to_range(config.lat, nlat);
    let lon = to_range(config.lon, nlon);
    if lat == (0..nlat) && lon == (0..nlon) {
        return Ok(grid.clone());
    }
    let out = grid.subset(lat.clone(), lon.clone())?;
    debug!(lat = ?lat, lon = ?lon, "Subset grid");
    Ok(out)
}

/// Dimension order and strides of one field in a document.
struct FieldLayout<'a> {
    dims: Vec<&'a str>,
    shape: Vec<usize>,
    strides: Vec<usize>,
}

impl<'a> FieldLayout<'a> {
    fn new(
        name: &str,
        field_dims: &'a [String],
        axis_len: &dyn Fn(&str) -> Option<usize>,
    ) -> OceanResult<Self> {
        let dims: Vec<&str> = field_dims.iter().map(String::as_str).collect();
        let mut shape = Vec::with_capacity(dims.len());
        for (i, d) in dims.iter().enumerate() {
            if dims[..i].contains(d) {
                return Err(OceanError::InvalidAxis(format!(
                    "field '{}' repeats dimension '{}'",
                    name, d
                )));
            }
            let len = axis_len(d).ok_or_else(|| {
                OceanError::InvalidAxis(format!("field '{}' uses unknown dimension '{}'", name, d))
            })?;
            shape.push(len);
        }
        if !dims.contains(&dims::LAT) || !dims.contains(&dims::LON) {
            return Err(OceanError::InvalidAxis(format!(
                "field '{}' must have both '{}' and '{}' dimensions, got {:?}",
                name,
                dims::LAT,
                dims::LON,
                dims
            )));
        }

        let mut strides = vec![1; dims.len()];
        for i in (0..dims.len().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * shape[i + 1];
        }
        Ok(Self { dims, shape, strides })
    }

    fn has(&self, dim: &str) -> bool {
        self.dims.contains(&dim)
    }

    fn size(&self) -> usize {
        self.shape.iter().product()
    }

    fn position(&self, dim: &str) -> Option<usize> {
        self.dims.iter().position(|d| *d == dim)
    }

    /// Gather values in `order`, fixing the time dimension at `time_index`.
    fn permute(&self, values: &[Sample], order: &[&str], time_index: usize) -> Vec<Sample> {
        let base = self
            .position(dims::TIME)
            .map(|t| self.strides[t] * time_index)
            .unwrap_or(0);
        let axes: Vec<(usize, usize)> = order
            .iter()
            .filter_map(|d| self.position(d).map(|p| (self.shape[p], self.strides[p])))
            .collect();

        let total: usize = axes.iter().map(|(len, _)| len).product();
        let mut out = Vec::with_capacity(total);
        let mut index = vec![0usize; axes.len()];
        for _ in 0..total {
            let offset: usize = index
                .iter()
                .zip(&axes)
                .map(|(i, (_, stride))| i * stride)
                .sum();
            out.push(values[base + offset]);
            // odometer increment, last axis fastest
            for k in (0..axes.len()).rev() {
                index[k] += 1;
                if index[k] < axes[k].0 {
                    break;
                }
                index[k] = 0;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(dims: &[&str], values: Vec<serde_json::Value>) -> String {
        json!({
            "coords": {
                "lon": [10.0, 10.1, 10.2],
                "lat": [43.0, 43.1],
                "depth": [0.0, 10.0],
                "time": [0.0, 1.0]
            },
            "fields": {
                "sound_speed": { "dims": dims, "values": values }
            }
        })
        .to_string()
    }

    #[test]
    fn test_canonical_order_is_kept() {
        let values: Vec<_> = (0..12).map(|v| json!(v as f64)).collect();
        let grid = parse_dataset(&document(&["lat", "lon", "depth"], values), 0).unwrap();
        let f = grid.field_3d("sound_speed").unwrap();
        assert_eq!(f.shape(), (2, 3, 2));
        assert_eq!(f.get(1, 2, 1), Some(11.0));
    }

    #[test]
    fn test_permuted_dims_with_time() {
        // (time, depth, lat, lon): value = t*1000 + k*100 + r*10 + c
        let mut values = Vec::new();
        for t in 0..2 {
            for k in 0..2 {
                for r in 0..2 {
                    for c in 0..3 {
                        values.push(json!((t * 1000 + k * 100 + r * 10 + c) as f64));
                    }
                }
            }
        }
        let grid = parse_dataset(&document(&["time", "depth", "lat", "lon"], values), 1).unwrap();
        let f = grid.field_3d("sound_speed").unwrap();
        assert_eq!(f.get(1, 2, 0), Some(1012.0));
        assert_eq!(f.get(0, 1, 1), Some(1101.0));
        assert_eq!(grid.time().map(Axis::len), Some(2));
    }

    #[test]
    fn test_null_is_undefined() {
        let mut values: Vec<_> = (0..6).map(|v| json!(v as f64)).collect();
        values[4] = serde_json::Value::Null;
        let doc = json!({
            "coords": { "lon": [1.0, 2.0, 3.0], "lat": [5.0, 6.0], "depth": [0.0] },
            "fields": { "bathymetry": { "dims": ["lat", "lon"], "values": values } }
        });
        let grid = parse_dataset(&doc.to_string(), 0).unwrap();
        let f = grid.field_2d("bathymetry").unwrap();
        assert_eq!(f.get(1, 1), None);
        assert_eq!(f.get(1, 2), Some(5.0));
    }

    #[test]
    fn test_no_data_marker_is_undefined() {
        let doc = json!({
            "coords": { "lon": [1.0, 2.0], "lat": [5.0], "depth": [0.0, 10.0, 20.0] },
            "fields": {
                "sound_speed": {
                    "dims": ["lat", "lon", "depth"],
                    "values": [1500.0, 1499.0, -32767.0, 1501.0, -32767.0, -32767.0],
                    "no_data": -32767.0
                },
                "temp": {
                    "dims": ["lat", "lon", "depth"],
                    "values": [12.0, 11.0, -32767.0, 12.5, 11.5, 10.5]
                }
            }
        });
        let grid = parse_dataset(&doc.to_string(), 0).unwrap();
        let ssp = grid.field_3d("sound_speed").unwrap();
        assert_eq!(ssp.profile(0, 0), &[Some(1500.0), Some(1499.0), None]);
        assert_eq!(ssp.profile(0, 1), &[Some(1501.0), None, None]);
        // without a marker the value is data
        assert_eq!(grid.field_3d("temp").unwrap().get(0, 0, 2), Some(-32767.0));
    }

    #[test]
    fn test_fill_value_alias() {
        let doc = json!({
            "coords": { "lon": [1.0, 2.0], "lat": [5.0], "depth": [0.0] },
            "fields": { "bathymetry": { "dims": ["lat", "lon"], "values": [40.0, 9999.0], "_FillValue": 9999.0 } }
        });
        let grid = parse_dataset(&doc.to_string(), 0).unwrap();
        assert_eq!(grid.field_2d("bathymetry").unwrap().get(0, 1), None);
    }

    #[test]
    fn test_wrong_value_count() {
        let values: Vec<_> = (0..11).map(|v| json!(v as f64)).collect();
        let err = parse_dataset(&document(&["lat", "lon", "depth"], values), 0).unwrap_err();
        assert!(matches!(err, OceanError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_unknown_dimension() {
        let values: Vec<_> = (0..12).map(|v| json!(v as f64)).collect();
        let err = parse_dataset(&document(&["lat", "lon", "level"], values), 0).unwrap_err();
        assert!(matches!(err, OceanError::InvalidAxis(_)));
    }

    #[test]
    fn test_time_index_out_of_range() {
        let values: Vec<_> = (0..24).map(|v| json!(v as f64)).collect();
        let err = parse_dataset(&document(&["time", "lat", "lon", "depth"], values), 2).unwrap_err();
        assert!(matches!(err, OceanError::InvalidConfig(_)));
    }

    #[test]
    fn test_apply_subset() {
        let values: Vec<_> = (0..12).map(|v| json!(v as f64)).collect();
        let grid = parse_dataset(&document(&["lat", "lon", "depth"], values), 0).unwrap();
        let config = SubsetConfig {
            lat: Some([1, 2]),
            lon: Some([0, 2]),
            ..Default::default()
        };
        let sub = apply_subset(&grid, &config).unwrap();
        assert_eq!(sub.shape(), (1, 2, 2));
        assert_eq!(sub.field_3d("sound_speed").unwrap().get(0, 1, 0), Some(8.0));

        let too_far = SubsetConfig {
            lon: Some([0, 7]),
            ..Default::default()
        };
        assert!(apply_subset(&grid, &too_far).is_err());
    }
}
