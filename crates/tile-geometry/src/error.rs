//! Error types for tile scheme construction.

use projection::ProjectionError;
use thiserror::Error;

/// Result type alias using TileError.
pub type TileResult<T> = Result<T, TileError>;

/// Errors raised while building a tile scheme.
///
/// All of these abort scheme construction; a scheme is never returned
/// half-built.
#[derive(Debug, Error)]
pub enum TileError {
    /// Sector or grid configuration cannot produce a valid tiling
    #[error("Configuration error: {0}")]
    Config(String),

    /// Quantized coordinate axis does not fit in signed 16-bit storage
    #[error("{axis} axis needs {count} coordinate indices, more than the {limit} available in 16-bit storage")]
    Size {
        axis: &'static str,
        count: usize,
        limit: usize,
    },

    /// Tile shape/count missing or inconsistent with the data
    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("Projection error: {0}")]
    Projection(#[from] ProjectionError),
}

impl TileError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }
}
