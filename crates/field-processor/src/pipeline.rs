//! End-to-end preparation of a geographic grid for the ray tracer.
//!
//! Stage order matters: bathymetry is read from the raw sound-speed field
//! before profile completion fills the undefined tail it depends on.

use std::path::PathBuf;
use std::time::Instant;

use tracing::{info, instrument, warn};

use ocean_common::{GeoGrid, LocalGrid, OceanError, OceanResult};
use projection::SubgridProjector;
use surface_mesh::{HeightGrid, SurfaceMesh};

use crate::bathymetry::{extract_grid_bathymetry, BATHYMETRY_FIELD};
use crate::config::PipelineConfig;
use crate::dataset::apply_subset;
use crate::profile::complete_grid_field;
use crate::refine::{refine, RefinedSurface, RefinedVolume, KRIGED_SUFFIX};
use crate::writer::{Exporter, Manifest, SspSource};

/// Everything a pipeline run produced.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Projected grid with bathymetry, completed sound speed and any kriged volume
    pub grid: LocalGrid,
    pub surface: Option<RefinedSurface>,
    pub volume: Option<RefinedVolume>,
    /// Grid field written as `ssp`
    pub ssp_field: String,
    pub mesh: Option<SurfaceMesh>,
    pub mesh_path: Option<PathBuf>,
    pub manifest: Manifest,
    pub manifest_path: Option<PathBuf>,
}

/// Runs subset, projection, bathymetry, completion, kriging, meshing and export.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline; fails if the configuration does not validate.
    pub fn new(config: PipelineConfig) -> OceanResult<Self> {
        config.validate().map_err(OceanError::invalid_config)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Subset, project, extract bathymetry and complete the sound-speed field.
    pub fn prepare(&self, grid: &GeoGrid) -> OceanResult<LocalGrid> {
        let subset = apply_subset(grid, &self.config.subset)?;
        let (nlat, nlon, ndepth) = subset.shape();
        let fields: Vec<&str> = subset.field_names_2d().chain(subset.field_names_3d()).collect();
        info!(nlat, nlon, ndepth, bbox = ?subset.bbox(), fields = ?fields, "Selected subgrid");

        let projector = SubgridProjector::new(self.config.projection.clone());
        let local = projector.project_grid(subset, self.config.center)?;
        info!(
            center_lon = local.center().lon,
            center_lat = local.center().lat,
            "Projected subgrid"
        );

        let with_bathymetry = extract_grid_bathymetry(local.geo(), &self.config.bathymetry)?;
        let completed = complete_grid_field(&with_bathymetry, &self.config.bathymetry.source_field)?;
        local.with_geo(completed)
    }

    /// Run every stage and write the outputs.
    #[instrument(skip(self, grid), fields(output_dir = %self.config.export.output_dir.display()))]
    pub fn run(&self, grid: &GeoGrid) -> OceanResult<PipelineOutput> {
        let start = Instant::now();

        let local = self.prepare(grid)?;
        let refined = refine(&local, &self.config.kriging)?;
        let grid = refined.grid;
        let surface = refined.surface;
        let volume = refined.volume;

        let mesh = if self.config.mesh.enabled {
            Some(self.build_mesh(&grid, surface.as_ref())?)
        } else {
            None
        };

        let mut exporter = Exporter::new(self.config.export.clone())?;
        exporter.export_bathymetry(&grid, BATHYMETRY_FIELD)?;
        let ssp_field = self.ssp_field(&grid)?;
        exporter.export_ssp(&grid, &ssp_field)?;

        if self.config.export.include_kriged {
            if let Some(surface) = &surface {
                exporter.export_surface(surface)?;
            }
            if let Some(volume) = &volume {
                exporter.export_volume(volume, &grid)?;
            }
        }

        let mesh_path = match &mesh {
            Some(mesh) => Some(self.config.mesh.write(&self.config.export.output_dir, mesh)?),
            None => None,
        };

        let manifest = exporter.manifest().clone();
        let manifest_path = exporter.finish()?;

        info!(
            fields = manifest.entries.len(),
            kriged = surface.is_some(),
            meshed = mesh.is_some(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Pipeline complete"
        );

        Ok(PipelineOutput {
            grid,
            surface,
            volume,
            ssp_field,
            mesh,
            mesh_path,
            manifest,
            manifest_path,
        })
    }

    /// Pick the grid field exported as `ssp` per `export.ssp_source`.
    fn ssp_field(&self, grid: &LocalGrid) -> OceanResult<String> {
        let completed = self.config.bathymetry.source_field.clone();
        let kriged = format!("{}{}", completed, KRIGED_SUFFIX);
        let has_kriged = grid.geo().field_3d(&kriged).is_ok();

        match self.config.export.ssp_source {
            SspSource::Completed => Ok(completed),
            SspSource::Kriged if has_kriged => Ok(kriged),
            SspSource::Kriged => Err(OceanError::invalid_config(format!(
                "ssp_source is kriged but no '{}' field on the grid axes was produced",
                kriged
            ))),
            SspSource::Auto => {
                let field = grid.geo().field_3d(&completed)?;
                let undefined = field.len() - field.defined_count();
                if undefined == 0 || !has_kriged {
                    return Ok(completed);
                }
                warn!(
                    undefined = undefined,
                    field = %kriged,
                    "Completed sound speed has undefined samples; exporting kriged volume"
                );
                Ok(kriged)
            }
        }
    }

    fn build_mesh(&self, grid: &LocalGrid, surface: Option<&RefinedSurface>) -> OceanResult<SurfaceMesh> {
        let heights = match surface {
            Some(s) if self.config.mesh.use_kriged => {
                HeightGrid::from_bathymetry(&s.field.estimate, &s.field.x, &s.field.y)?
            }
            _ => HeightGrid::from_bathymetry(grid.geo().field_2d(BATHYMETRY_FIELD)?, grid.x(), grid.y())?,
        };

        let heights = match self.config.mesh.undefined_fill {
            Some(fill) if heights.undefined_count() > 0 => {
                warn!(
                    undefined = heights.undefined_count(),
                    fill = fill,
                    "Filling undefined mesh heights"
                );
                heights.substitute_undefined(fill)
            }
            _ => heights,
        };
        SurfaceMesh::build(&heights)
    }
}
