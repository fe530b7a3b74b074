//! SCMI writer.
//!
//! Reads an already gridded scene and writes AWIPS SCMI NetCDF4 tiles,
//! either numbered or on a sector's lettered grid.

mod cli;

use anyhow::{bail, Context, Result};
use clap::Parser;
use scmi::{load_config, Backend, GriddedScene};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use cli::{Args, Environment, LogFormat};

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args);

    // keep HDF5 from printing diagnostics we already report
    scmi_netcdf::silence_hdf5_errors();

    let env = Environment::from_env()?;
    let config = load_config(&args.config)
        .with_context(|| format!("Failed to load SCMI config from {:?}", args.config))?;

    let mut scene = GriddedScene::load_json(&args.scene)
        .with_context(|| format!("Failed to load scene from {:?}", args.scene))?;
    if !args.products.is_empty() {
        scene.retain_products(&args.products);
    }
    if scene.is_empty() {
        bail!("No products to write");
    }
    info!(products = scene.len(), "Loaded gridded scene");

    let tiling = args.tiling();
    let backend = Backend::with_netcdf(config, args.output_options(&env));
    let summary = backend
        .create_output_from_scene(&scene, &tiling)
        .context("SCMI output failed")?;

    for product in &summary.empty_products {
        warn!(product = %product, "Product produced no tiles");
    }
    info!(
        files = summary.created_files.len(),
        failed_tiles = summary.failed_tiles,
        failed_products = summary.failed_products.len(),
        "Finished writing SCMI tiles"
    );

    if !summary.is_success() {
        bail!(
            "{} tile(s) and {} product(s) failed",
            summary.failed_tiles,
            summary.failed_products.len()
        );
    }
    if summary.created_files.is_empty() {
        bail!("No SCMI tiles were created");
    }
    Ok(())
}

fn init_tracing(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    let builder = fmt().with_env_filter(filter).with_target(true).with_level(true);
    match args.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}
