//! Sound-speed and bathymetry preparation for the 3D ray tracer.
//!
//! This crate turns a gridded ocean dataset into the arrays the ray tracer
//! reads: planar axes in meters, a bathymetry surface and a completed
//! sound-speed volume. It also offers kriging refinement and a mesh of the
//! seafloor for inspection.
//!
//! # Architecture
//!
//! ```text
//! dataset.json
//!      │
//!      ▼
//! load_dataset() ──► GeoGrid (lat, lon, depth)
//!      │
//!      ├─► apply_subset()            index ranges
//!      │
//!      ├─► SubgridProjector          lon/lat → x_m/y_m (AEQD, WGS84)
//!      │
//!      ├─► extract_grid_bathymetry() first undefined level − ε
//!      │
//!      ├─► complete_grid_field()     forward-fill each profile
//!      │
//!      ├─► refine()                  optional 2D/3D ordinary kriging
//!      │
//!      ├─► SurfaceMesh::build()      optional seafloor mesh
//!      │
//!      └─► Exporter                  f64 arrays + manifest.json
//! ```
//!
//! # Example
//!
//! ```ignore
//! use field_processor::{load_dataset, Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::from_file("ssp-prep.yaml")?;
//! let grid = load_dataset("monterey.json", config.subset.time_index)?;
//! let output = Pipeline::new(config)?.run(&grid)?;
//! println!("wrote {:?}", output.manifest_path);
//! ```

pub mod bathymetry;
pub mod config;
pub mod dataset;
pub mod pipeline;
pub mod profile;
pub mod refine;
pub mod writer;

// Re-export commonly used types at crate root
pub use bathymetry::{
    extract_bathymetry, extract_grid_bathymetry, profile_bathymetry, BathymetryConfig, ShallowGapPolicy,
    BATHYMETRY_FIELD,
};
pub use config::PipelineConfig;
pub use dataset::{apply_subset, dataset_to_grid, load_dataset, parse_dataset, DatasetDocument, SubsetConfig};
pub use pipeline::{Pipeline, PipelineOutput};
pub use profile::{complete_grid_field, complete_profile, complete_profiles, complete_profiles_in_place};
pub use refine::{refine, refine_surface, refine_volume, RefineConfig, RefineOutput, RefinedSurface, RefinedVolume};
pub use writer::{
    read_axis, read_field_2d, read_field_3d, ExportConfig, ExportFormat, ExportNames, Exporter, Manifest,
    ManifestEntry, SspSource, MANIFEST_FILE,
};
