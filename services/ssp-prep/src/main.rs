//! Sound-speed preparation CLI.
//!
//! Loads a JSON dataset, runs the preparation pipeline and writes the
//! ray-tracer input arrays, a manifest and an optional seafloor mesh.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use field_processor::{load_dataset, Pipeline, PipelineConfig, PipelineOutput};
use ocean_common::OceanError;

#[derive(Parser, Debug)]
#[command(name = "ssp-prep")]
#[command(about = "Prepare sound-speed and bathymetry arrays for the ray tracer")]
struct Args {
    /// Pipeline configuration file (YAML)
    #[arg(short, long, env = "SSP_CONFIG")]
    config: Option<PathBuf>,

    /// Dataset document (JSON); overrides `input` from the config file
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output directory; overrides the config file and SSP_OUTPUT_DIR
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Skip the kriging stage
    #[arg(long)]
    no_kriging: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    init_tracing(&args.log_level, args.log_json)?;

    if let Err(e) = run(args) {
        let code = e.downcast_ref::<OceanError>().map(OceanError::code).unwrap_or("other");
        error!(code, error = %format!("{:#}", e), "Preparation failed");
        return Err(e);
    }
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("Failed to load pipeline config from {:?}", path))?,
        None => PipelineConfig::default(),
    };
    config.apply_env();

    if let Some(dir) = args.output_dir {
        config.export.output_dir = dir;
    }
    if args.no_kriging {
        config.kriging.enabled = false;
    }

    let input = args
        .input
        .or_else(|| config.input.clone())
        .ok_or_else(|| anyhow!("no input dataset: pass --input or set `input` in the config file"))?;

    info!(
        input = %input.display(),
        output_dir = %config.export.output_dir.display(),
        format = config.export.format.extension(),
        kriging = config.kriging.enabled,
        "Starting sound-speed preparation"
    );

    let grid = load_dataset(&input, config.subset.time_index)
        .with_context(|| format!("Failed to load dataset from {:?}", input))?;

    let pipeline = Pipeline::new(config).context("Invalid pipeline configuration")?;
    let output = pipeline.run(&grid).context("Pipeline failed")?;
    report(&output)?;
    Ok(())
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder().with_max_level(level).with_target(true);
    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn report(output: &PipelineOutput) -> Result<()> {
    let (nlat, nlon, ndepth) = output.grid.geo().shape();
    info!(
        nlat,
        nlon,
        ndepth,
        center_lon = output.grid.center().lon,
        center_lat = output.grid.center().lat,
        ssp_field = %output.ssp_field,
        "Prepared grid"
    );
    for (key, entry) in &output.manifest.entries {
        info!(field = %key, data = %entry.data, shape = ?entry.shape, "Exported");
    }
    if let Some(path) = &output.mesh_path {
        info!(path = %path.display(), "Wrote mesh");
    }
    if let Some(path) = &output.manifest_path {
        info!(path = %path.display(), "Wrote manifest");
    } else {
        // no manifest on disk; print it so the run is still traceable
        let manifest = serde_json::to_string_pretty(&output.manifest)?;
        println!("{}", manifest);
    }
    Ok(())
}
