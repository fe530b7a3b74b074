//! NetCDF4 output for AWIPS SCMI tiles.
//!
//! One [`TileFile`] becomes one file with two spatial dimensions, a `u16`
//! image variable, `i16` X/Y coordinate variables whose scale/offset rebuild
//! projected coordinates, a dimensionless grid mapping variable and the SCMI
//! global attributes.
//!
//! Files written by netCDF-C 4.4.1 and later carry a `_NCProperties` root
//! attribute that AWIPS cannot parse; [`NetCdfTileWriter::fix_awips`] removes
//! it through HDF5 after the file is closed.

pub mod content;
pub mod error;
pub mod hdf5;
pub mod writer;

pub use content::{
    AttrValue, Attributes, CoordinateVariable, GridMappingVariable, ImageVariable, TileFile,
    COL_DIM, IMAGE_VAR, ROW_DIM,
};
pub use error::{WriteError, WriteResult};
pub use hdf5::{silence_hdf5_errors, strip_nc_properties};
pub use writer::{NetCdfTileWriter, TileWriter};
