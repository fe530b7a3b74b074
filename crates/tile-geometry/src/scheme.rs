//! Common interface over the numbered and lettered schemes.

use tracing::info;

use crate::array::MaskedGrid;
use crate::error::{TileError, TileResult};
use crate::geometry::{GridGeometry, ScalingParameters};
use crate::lettered::LetteredTileScheme;
use crate::numbered::NumberedTileScheme;
use crate::tile::{Tile, TileDescriptor};

/// A tile scheme built for one grid.
///
/// Geometry is computed once when the scheme is constructed; every product on
/// the same grid reuses it. Only [`TileScheme::tiles`] looks at data.
#[derive(Debug, Clone)]
pub enum TileScheme {
    Numbered(NumberedTileScheme),
    Lettered(LetteredTileScheme),
}

impl TileScheme {
    pub fn is_lettered(&self) -> bool {
        matches!(self, TileScheme::Lettered(_))
    }

    /// (rows, cols) of the tile buffer.
    pub fn tile_shape(&self) -> (usize, usize) {
        match self {
            TileScheme::Numbered(s) => s.tile_shape(),
            TileScheme::Lettered(s) => s.tile_shape(),
        }
    }

    /// (rows, cols) of tiles covering the full image.
    pub fn tile_count(&self) -> (usize, usize) {
        match self {
            TileScheme::Numbered(s) => s.tile_count(),
            TileScheme::Lettered(s) => s.tile_count(),
        }
    }

    pub fn total_tiles(&self) -> usize {
        let (rows, cols) = self.tile_count();
        rows * cols
    }

    /// (rows, cols) of the full, tile-padded image.
    pub fn image_shape(&self) -> (usize, usize) {
        self.geometry().shape()
    }

    pub fn geometry(&self) -> &GridGeometry {
        match self {
            TileScheme::Numbered(s) => s.geometry(),
            TileScheme::Lettered(s) => s.geometry(),
        }
    }

    pub fn scaling(&self) -> ScalingParameters {
        self.geometry().scaling()
    }

    /// Descriptors of every tile that can receive data, in output order.
    pub fn descriptors(&self) -> &[TileDescriptor] {
        match self {
            TileScheme::Numbered(s) => s.descriptors(),
            TileScheme::Lettered(s) => s.descriptors(),
        }
    }

    /// Materialize the tiles of `data` that contain at least one valid pixel.
    pub fn tiles<'a>(
        &'a self,
        data: &'a MaskedGrid,
        expected_shape: (usize, usize),
    ) -> TileResult<impl Iterator<Item = Tile<'a>> + 'a> {
        if data.shape() != expected_shape {
            return Err(TileError::geometry(format!(
                "data shape {:?} does not match grid shape {:?}",
                data.shape(),
                expected_shape
            )));
        }
        Ok(self.descriptors().iter().filter_map(move |d| {
            let tile = d.materialize(data);
            if tile.is_none() {
                info!(tile = %d.id, "Tile contains all masked data, skipping");
            }
            tile
        }))
    }
}

impl From<NumberedTileScheme> for TileScheme {
    fn from(s: NumberedTileScheme) -> Self {
        TileScheme::Numbered(s)
    }
}

impl From<LetteredTileScheme> for TileScheme {
    fn from(s: LetteredTileScheme) -> Self {
        TileScheme::Lettered(s)
    }
}
