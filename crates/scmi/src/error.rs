//! Error types for SCMI output generation.

use scmi_netcdf::WriteError;
use thiserror::Error;
use tile_geometry::TileError;

/// Result type alias using ScmiError.
pub type ScmiResult<T> = Result<T, ScmiError>;

/// Errors raised while turning a gridded scene into SCMI tiles.
#[derive(Debug, Error)]
pub enum ScmiError {
    /// Missing sector, unmatched product, unsupported projection, bad pattern
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tile scheme error: {0}")]
    Tile(#[from] TileError),

    #[error("Write error: {0}")]
    Write(#[from] WriteError),

    /// No tile of the product intersected valid data
    #[error("No SCMI tiles were created for product '{product}'")]
    NoTiles { product: String },

    /// Scene input could not be read or is inconsistent
    #[error("Scene error: {0}")]
    Scene(String),
}

impl ScmiError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn scene(msg: impl Into<String>) -> Self {
        Self::Scene(msg.into())
    }
}
