//! Error types for tile file writing.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for tile writing operations.
pub type WriteResult<T> = Result<T, WriteError>;

/// Error types for writing one tile file.
#[derive(Error, Debug)]
pub enum WriteError {
    /// Output exists and overwriting was not requested
    #[error("AWIPS file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error raised by the NetCDF library
    #[error("NetCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),

    /// Error raised by a direct HDF5 call
    #[error("HDF5 error: {0}")]
    Hdf5(String),

    /// Tile content is inconsistent (array lengths, names)
    #[error("Invalid tile content: {0}")]
    Content(String),
}
