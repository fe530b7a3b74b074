//! Sequentially numbered tiles (`T001`, `T002`, ...).

use tracing::debug;

use crate::error::{TileError, TileResult};
use crate::geometry::{GridGeometry, ScalingParameters};
use crate::grid::GridDefinition;
use crate::slice::tile_overlap;
use crate::tile::{TileDescriptor, TileId};

/// Splits a grid into a fixed number of equally sized tiles, numbered
/// left-to-right, top-to-bottom starting at 1.
#[derive(Debug, Clone)]
pub struct NumberedTileScheme {
    tile_shape: (usize, usize),
    tile_count: (usize, usize),
    geometry: GridGeometry,
    descriptors: Vec<TileDescriptor>,
}

impl NumberedTileScheme {
    /// Build the scheme from either a tile pixel shape or a tile count.
    ///
    /// A shape larger than the grid is clipped to the grid; the count then
    /// follows by ceiling division. A count gives the shape the same way.
    pub fn new(
        grid: &GridDefinition,
        tile_shape: Option<(usize, usize)>,
        tile_count: Option<(usize, usize)>,
    ) -> TileResult<Self> {
        grid.validate()?;
        let (rows, cols) = grid.shape();

        let (tile_shape, tile_count) = match (tile_shape, tile_count) {
            (Some(_), Some(_)) => {
                return Err(TileError::geometry(
                    "only one of tile shape or tile count may be given",
                ))
            }
            (Some((th, tw)), None) => {
                if th == 0 || tw == 0 {
                    return Err(TileError::geometry(format!(
                        "tile shape must be positive, got {}x{}",
                        th, tw
                    )));
                }
                let shape = (th.min(rows), tw.min(cols));
                (shape, (rows.div_ceil(shape.0), cols.div_ceil(shape.1)))
            }
            (None, Some((tr, tc))) => {
                if tr == 0 || tc == 0 {
                    return Err(TileError::geometry(format!(
                        "tile count must be positive, got {}x{}",
                        tr, tc
                    )));
                }
                ((rows.div_ceil(tr), cols.div_ceil(tc)), (tr, tc))
            }
            (None, None) => {
                return Err(TileError::geometry(
                    "either tile shape or tile count must be provided",
                ))
            }
        };

        // Tiles may run past the grid, so coordinates cover every tile.
        let geometry = GridGeometry::new(
            grid.origin_x,
            grid.origin_y,
            grid.cell_width,
            grid.cell_height,
            tile_shape.0 * tile_count.0,
            tile_shape.1 * tile_count.1,
        )?;

        let descriptors = build_descriptors(grid, &geometry, tile_shape, tile_count);

        debug!(
            grid = %grid.grid_name,
            tile_rows = tile_shape.0,
            tile_cols = tile_shape.1,
            count_rows = tile_count.0,
            count_cols = tile_count.1,
            "Built numbered tile scheme"
        );

        Ok(Self {
            tile_shape,
            tile_count,
            geometry,
            descriptors,
        })
    }

    pub fn tile_shape(&self) -> (usize, usize) {
        self.tile_shape
    }

    pub fn tile_count(&self) -> (usize, usize) {
        self.tile_count
    }

    pub fn total_tiles(&self) -> usize {
        self.tile_count.0 * self.tile_count.1
    }

    pub fn image_shape(&self) -> (usize, usize) {
        self.geometry.shape()
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn scaling(&self) -> ScalingParameters {
        self.geometry.scaling()
    }

    pub fn descriptors(&self) -> &[TileDescriptor] {
        &self.descriptors
    }
}

fn build_descriptors(
    grid: &GridDefinition,
    geometry: &GridGeometry,
    tile_shape: (usize, usize),
    tile_count: (usize, usize),
) -> Vec<TileDescriptor> {
    let data_x = grid.x_coords();
    let data_y = grid.y_coords();
    let (th, tw) = tile_shape;
    let mut descriptors = Vec::with_capacity(tile_count.0 * tile_count.1);

    for ty in 0..tile_count.0 {
        for tx in 0..tile_count.1 {
            let id = TileId::Numbered(ty * tile_count.1 + tx + 1);
            let row_offset = ty * th;
            let col_offset = tx * tw;
            let x = geometry.x()[col_offset..col_offset + tw].to_vec();
            let y = geometry.y()[row_offset..row_offset + th].to_vec();

            let left = x[0] - grid.cell_width / 2.0;
            let top = y[0] - grid.cell_height / 2.0;
            let Some(slices) = tile_overlap(
                &data_x,
                &data_y,
                left,
                top,
                grid.cell_width,
                grid.cell_height,
                tile_shape,
            ) else {
                debug!(tile = %id, "Tile lies outside the grid");
                continue;
            };

            descriptors.push(TileDescriptor {
                id,
                tile_row: ty,
                tile_col: tx,
                row_offset,
                col_offset,
                shape: tile_shape,
                x,
                y,
                slices,
            });
        }
    }

    descriptors
}
