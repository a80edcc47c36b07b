//! Full pipeline runs over the bundled sample dataset.

use field_processor::{
    load_dataset, read_field_2d, ExportFormat, Manifest, Pipeline, PipelineConfig, BATHYMETRY_FIELD,
};
use surface_mesh::MeshFormat;
use test_utils::{assert_approx_eq, require_test_file, require_test_files, temp_test_dir};

#[test]
fn test_sample_dataset_loads() {
    let path = require_test_file!("sample_dataset.json");
    let grid = load_dataset(&path, 1).unwrap();
    assert_eq!(grid.shape(), (8, 8, 6));
    assert_eq!(grid.time().map(|t| t.len()), Some(2));

    // values are stored (time, depth, lat, lon) in the file
    let ssp = grid.field_3d("sound_speed").unwrap();
    assert_approx_eq!(ssp.get(0, 0, 0).unwrap(), 1500.5, 1e-9);
    assert!(grid.field_3d("temp").is_ok());
}

#[test]
fn test_pipeline_with_sample_config() {
    let paths = require_test_files!("sample_dataset.json", "sample_config.yaml");
    let out_dir = temp_test_dir();

    let mut config = PipelineConfig::from_file(&paths[1]).unwrap();
    config.export.output_dir = out_dir.path().to_path_buf();
    let grid = load_dataset(&paths[0], config.subset.time_index).unwrap();
    let output = Pipeline::new(config).unwrap().run(&grid).unwrap();

    // lat 1..7, lon 0..7
    assert_eq!(output.grid.geo().shape(), (6, 7, 6));
    assert_eq!(output.grid.x().len(), 7);
    assert_eq!(output.grid.y().len(), 6);

    let surface = output.surface.as_ref().unwrap();
    assert_eq!(surface.name, "bathymetry_kriged");
    assert_eq!(surface.field.estimate.shape(), (12, 14));
    assert!(output.grid.geo().field_3d("sound_speed_kriged").is_ok());
    assert!(output.grid.geo().field_3d("sound_speed_kriged_variance").is_ok());
    // the completed field is fully defined, so it is what gets exported as ssp
    assert_eq!(output.ssp_field, "sound_speed");

    let mesh = output.mesh.as_ref().unwrap();
    assert_eq!(mesh.vertex_count(), 12 * 14);
    assert_eq!(mesh.triangle_count(), 2 * 11 * 13);
    assert!(output.mesh_path.as_ref().unwrap().exists());

    let manifest = Manifest::read(out_dir.path()).unwrap();
    for key in ["bathymetry", "ssp", "bathymetry_kriged", "ssp_kriged"] {
        let entry = manifest.get(key).unwrap_or_else(|| panic!("missing manifest entry {}", key));
        assert!(out_dir.path().join(&entry.data).exists(), "{}", entry.data);
    }

    let bathy = read_field_2d(&out_dir.path().join("bathymetry.bin"), ExportFormat::Raw, 6, 7).unwrap();
    assert_eq!(&bathy, output.grid.geo().field_2d(BATHYMETRY_FIELD).unwrap());
}

#[test]
fn test_pipeline_without_kriging() {
    let path = require_test_file!("sample_dataset.json");
    let out_dir = temp_test_dir();

    let mut config = PipelineConfig::default();
    config.subset.lat = Some([1, 7]);
    config.subset.lon = Some([0, 7]);
    config.kriging.enabled = false;
    config.mesh.format = MeshFormat::Obj;
    config.export.format = ExportFormat::Npy;
    config.export.output_dir = out_dir.path().to_path_buf();

    let grid = load_dataset(&path, 0).unwrap();
    let output = Pipeline::new(config).unwrap().run(&grid).unwrap();

    assert!(output.surface.is_none());
    assert_eq!(output.manifest.entries.len(), 2);
    assert!(out_dir.path().join("bathymetry.npy").exists());
    assert!(out_dir.path().join("ssp.npy").exists());
    assert!(out_dir.path().join("bathymetry_mesh.obj").exists());

    // the mesh falls back to the projected bathymetry
    let mesh = output.mesh.unwrap();
    assert_eq!(mesh.vertex_count(), 6 * 7);
    // every profile has a defined surface sample, so completion leaves no gaps
    assert_eq!(output.grid.geo().field_3d("sound_speed").unwrap().defined_count(), 6 * 7 * 6);
}
