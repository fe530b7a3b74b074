//! Coordinate reference system handling for SCMI tiling.
//!
//! Grids and sectors describe their projection with PROJ.4 strings. This
//! crate parses those strings into typed parameters (needed for the NetCDF
//! grid mapping attributes) and projects geographic coordinates into map
//! units through the pure Rust `proj4rs` port of PROJ.

pub mod error;
pub mod proj4;
pub mod transform;

pub use error::{ProjectionError, ProjectionResult};
pub use proj4::{Ellipsoid, Proj4Params, ProjectionFamily};
pub use transform::{Proj4Projector, Projector};
