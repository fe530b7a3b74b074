//! Tile geometry for AWIPS SCMI output.
//!
//! A full-resolution image is partitioned into fixed-size tiles, either
//! numbered sequentially or laid onto the static lettered grid of a sector.
//! Each scheme computes its tile descriptors (offsets, coordinates and source
//! slices) once, independent of the data; materializing a descriptor against
//! a [`MaskedGrid`] yields the tile buffer or nothing when the tile holds no
//! valid pixel.

pub mod array;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod lettered;
pub mod numbered;
pub mod scheme;
pub mod slice;
pub mod tile;

pub use array::MaskedGrid;
pub use error::{TileError, TileResult};
pub use geometry::{GridGeometry, ScalingParameters, MAX_AXIS_INDICES};
pub use grid::GridDefinition;
pub use lettered::{LetteredSector, LetteredTileScheme, DEFAULT_SUBTILES, MAX_ALPHA_CELLS};
pub use numbered::NumberedTileScheme;
pub use scheme::TileScheme;
pub use slice::{axis_overlap, tile_overlap, AxisOverlap, AxisSlice, TileSlices};
pub use tile::{Tile, TileDescriptor, TileId};
