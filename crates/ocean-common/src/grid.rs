//! Geographic and local-planar grid records.
//!
//! A [`GeoGrid`] is the typed replacement for a labeled multi-dimensional
//! dataset: three axes plus named fields whose shapes are checked against the
//! axes once, when the field is attached.

use std::collections::BTreeMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::{Axis, Field2D, Field3D, GeoBoundingBox, OceanError, OceanResult};

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// A regular lon/lat/depth grid with named fields.
///
/// 2D fields are indexed (lat, lon); 3D fields (lat, lon, depth).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoGrid {
    lon: Axis,
    lat: Axis,
    depth: Axis,
    time: Option<Axis>,
    fields_2d: BTreeMap<String, Field2D>,
    fields_3d: BTreeMap<String, Field3D>,
}

impl GeoGrid {
    /// Create a grid with no fields attached.
    pub fn new(lon: Axis, lat: Axis, depth: Axis) -> Self {
        Self {
            lon,
            lat,
            depth,
            time: None,
            fields_2d: BTreeMap::new(),
            fields_3d: BTreeMap::new(),
        }
    }

    /// Record the time axis the fields were selected from.
    pub fn with_time(mut self, time: Axis) -> Self {
        self.time = Some(time);
        self
    }

    pub fn lon(&self) -> &Axis {
        &self.lon
    }

    pub fn lat(&self) -> &Axis {
        &self.lat
    }

    pub fn depth(&self) -> &Axis {
        &self.depth
    }

    pub fn time(&self) -> Option<&Axis> {
        self.time.as_ref()
    }

    /// (lat, lon, depth) lengths.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.lat.len(), self.lon.len(), self.depth.len())
    }

    pub fn bbox(&self) -> GeoBoundingBox {
        GeoBoundingBox::from_axes(&self.lon, &self.lat)
    }

    /// Attach or replace a 2D field.
    pub fn insert_field_2d(&mut self, name: impl Into<String>, field: Field2D) -> OceanResult<()> {
        let name = name.into();
        let expected = (self.lat.len(), self.lon.len());
        if field.shape() != expected {
            return Err(OceanError::shape_mismatch(
                name,
                format!("(lat, lon) = {:?}", expected),
                format!("{:?}", field.shape()),
            ));
        }
        self.fields_2d.insert(name, field);
        Ok(())
    }

    /// Attach or replace a 3D field.
    pub fn insert_field_3d(&mut self, name: impl Into<String>, field: Field3D) -> OceanResult<()> {
        let name = name.into();
        let expected = self.shape();
        if field.shape() != expected {
            return Err(OceanError::shape_mismatch(
                name,
                format!("(lat, lon, depth) = {:?}", expected),
                format!("{:?}", field.shape()),
            ));
        }
        self.fields_3d.insert(name, field);
        Ok(())
    }

    /// Builder form of [`insert_field_2d`](Self::insert_field_2d).
    pub fn with_field_2d(mut self, name: impl Into<String>, field: Field2D) -> OceanResult<Self> {
        self.insert_field_2d(name, field)?;
        Ok(self)
    }

    /// Builder form of [`insert_field_3d`](Self::insert_field_3d).
    pub fn with_field_3d(mut self, name: impl Into<String>, field: Field3D) -> OceanResult<Self> {
        self.insert_field_3d(name, field)?;
        Ok(self)
    }

    pub fn field_2d(&self, name: &str) -> OceanResult<&Field2D> {
        self.fields_2d
            .get(name)
            .ok_or_else(|| OceanError::FieldNotFound(format!("2D field '{}'", name)))
    }

    pub fn field_3d(&self, name: &str) -> OceanResult<&Field3D> {
        self.fields_3d
            .get(name)
            .ok_or_else(|| OceanError::FieldNotFound(format!("3D field '{}'", name)))
    }

    pub fn field_names_2d(&self) -> impl Iterator<Item = &str> {
        self.fields_2d.keys().map(String::as_str)
    }

    pub fn field_names_3d(&self) -> impl Iterator<Item = &str> {
        self.fields_3d.keys().map(String::as_str)
    }

    /// Index-range subset over latitude and longitude; depth is kept whole.
    pub fn subset(&self, lat: Range<usize>, lon: Range<usize>) -> OceanResult<Self> {
        let mut out = GeoGrid::new(
            self.lon.slice(lon.clone())?,
            self.lat.slice(lat.clone())?,
            self.depth.clone(),
        );
        out.time = self.time.clone();
        for (name, field) in &self.fields_2d {
            out.fields_2d
                .insert(name.clone(), field.slice(lat.clone(), lon.clone())?);
        }
        for (name, field) in &self.fields_3d {
            out.fields_3d
                .insert(name.clone(), field.slice(lat.clone(), lon.clone())?);
        }
        Ok(out)
    }
}

/// A [`GeoGrid`] together with local planar coordinates.
///
/// `x` is aligned index-for-index with the longitude axis and `y` with the
/// latitude axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalGrid {
    geo: GeoGrid,
    x: Axis,
    y: Axis,
    center: GeoPoint,
}

impl LocalGrid {
    pub fn new(geo: GeoGrid, x: Axis, y: Axis, center: GeoPoint) -> OceanResult<Self> {
        if x.len() != geo.lon().len() {
            return Err(OceanError::shape_mismatch("x_m axis", geo.lon().len(), x.len()));
        }
        if y.len() != geo.lat().len() {
            return Err(OceanError::shape_mismatch("y_m axis", geo.lat().len(), y.len()));
        }
        Ok(Self { geo, x, y, center })
    }

    pub fn geo(&self) -> &GeoGrid {
        &self.geo
    }

    pub fn x(&self) -> &Axis {
        &self.x
    }

    pub fn y(&self) -> &Axis {
        &self.y
    }

    pub fn depth(&self) -> &Axis {
        self.geo.depth()
    }

    pub fn center(&self) -> GeoPoint {
        self.center
    }

    /// Same coordinates, new field snapshot.
    pub fn with_geo(&self, geo: GeoGrid) -> OceanResult<Self> {
        Self::new(geo, self.x.clone(), self.y.clone(), self.center)
    }
}
