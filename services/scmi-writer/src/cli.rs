//! Command line arguments.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use scmi::{OutputOptions, TilingMode, TilingOptions, DEFAULT_OUTPUT_PATTERN, DEFAULT_SOURCE_NAME};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Write gridded satellite products as AWIPS SCMI NetCDF4 tiles
#[derive(Parser, Debug)]
#[command(name = "scmi-writer")]
#[command(about = "Write gridded satellite scenes as AWIPS SCMI NetCDF4 tiles")]
pub struct Args {
    /// SCMI configuration file (products and sectors)
    #[arg(long, env = "SCMI_CONFIG", default_value = "configs/scmi.yaml")]
    pub config: PathBuf,

    /// Scene manifest (JSON) describing the gridded products
    #[arg(long)]
    pub scene: PathBuf,

    /// Only write these products
    #[arg(short, long, num_args = 1..)]
    pub products: Vec<String>,

    /// Sector identifier written to files and used for lettered tiling
    #[arg(long)]
    pub sector_id: String,

    /// Number of tile rows and columns
    #[arg(long, num_args = 2, value_names = ["ROWS", "COLS"], default_values_t = [1usize, 1])]
    pub tiles: Vec<usize>,

    /// Tile size in pixels; overrides --tiles
    #[arg(long, num_args = 2, value_names = ["ROWS", "COLS"])]
    pub tile_size: Option<Vec<usize>>,

    /// Use the sector's static lettered grid
    #[arg(long)]
    pub letters: bool,

    /// Sub-tiles per lettered cell
    #[arg(long, num_args = 2, value_names = ["ROWS", "COLS"], default_values_t = [2usize, 2])]
    pub letter_subtiles: Vec<usize>,

    /// Output file name pattern
    #[arg(long, default_value = DEFAULT_OUTPUT_PATTERN)]
    pub output_pattern: String,

    /// Directory receiving the tiles
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Source name used in file names
    #[arg(long, default_value = DEFAULT_SOURCE_NAME)]
    pub source_name: String,

    /// zlib-compress tile variables
    #[arg(long)]
    pub compress: bool,

    /// Strip `_NCProperties` so AWIPS can read the files
    #[arg(long)]
    pub fix_awips: bool,

    /// Overwrite existing tile files
    #[arg(long)]
    pub overwrite: bool,

    /// Keep partially written files after a failure
    #[arg(long)]
    pub keep_intermediate: bool,

    /// Stop at the first failed tile or product
    #[arg(long)]
    pub exit_on_error: bool,

    /// Log level (RUST_LOG takes precedence)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Values read from the environment rather than flags.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    pub organization: Option<String>,
    pub hostname: Option<String>,
    pub time_shift_minutes: i64,
}

impl Environment {
    pub fn from_env() -> anyhow::Result<Self> {
        let time_shift_minutes = match std::env::var("SCMI_TIME_SHIFT") {
            Ok(raw) if !raw.trim().is_empty() => raw.trim().parse().map_err(|_| {
                anyhow::anyhow!("SCMI_TIME_SHIFT must be whole minutes, got '{}'", raw)
            })?,
            _ => 0,
        };
        Ok(Self {
            organization: std::env::var("ORGANIZATION").ok(),
            hostname: std::env::var("HOSTNAME").ok(),
            time_shift_minutes,
        })
    }
}

fn pair(values: &[usize]) -> (usize, usize) {
    (values[0], values[1])
}

impl Args {
    pub fn tiling(&self) -> TilingOptions {
        let mode = if self.letters {
            TilingMode::lettered(Some(pair(&self.letter_subtiles)))
        } else {
            TilingMode::numbered(self.tile_size.as_deref().map(pair), pair(&self.tiles))
        };
        TilingOptions::new(self.sector_id.clone(), mode)
    }

    pub fn output_options(&self, env: &Environment) -> OutputOptions {
        OutputOptions {
            source_name: self.source_name.clone(),
            output_pattern: self.output_pattern.clone(),
            output_dir: self.output_dir.clone(),
            overwrite_existing: self.overwrite,
            keep_intermediate: self.keep_intermediate,
            exit_on_error: self.exit_on_error,
            compress: self.compress,
            fix_awips: self.fix_awips,
            time_shift_minutes: env.time_shift_minutes,
            production_location: env.organization.clone().or_else(|| env.hostname.clone()),
            ..OutputOptions::default()
        }
    }
}
