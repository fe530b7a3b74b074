//! Lettered sector tiles (`TA01`, `TA02`, ..., `TZ04`).
//!
//! The sector's geographic corners define a static grid of alpha cells (one
//! letter each), every cell split into a fixed number of numbered sub-tiles.
//! Tile positions only depend on the sector, the sub-tile counts and the
//! source pixel size, so two runs over the same sector always produce the
//! same tile boundaries whatever part of it the data covers.

use projection::Projector;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{TileError, TileResult};
use crate::geometry::{GridGeometry, ScalingParameters};
use crate::grid::GridDefinition;
use crate::slice::tile_overlap;
use crate::tile::{TileDescriptor, TileId};

/// Number of letters available for alpha cells.
pub const MAX_ALPHA_CELLS: usize = 26;

/// Default sub-tile rows/cols per alpha cell.
pub const DEFAULT_SUBTILES: (usize, usize) = (2, 2);

/// Static geographic sector that a lettered grid is laid over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LetteredSector {
    /// Lower-left corner as (lon, lat) degrees
    pub lower_left: (f64, f64),
    /// Upper-right corner as (lon, lat) degrees
    pub upper_right: (f64, f64),
    /// Alpha cell size as (row height, column width) in projection units
    pub cell_size: (f64, f64),
}

/// Tiles a grid onto the lettered grid of a sector.
#[derive(Debug, Clone)]
pub struct LetteredTileScheme {
    subtiles: (usize, usize),
    tile_shape: (usize, usize),
    total_tile_count: (usize, usize),
    /// Inclusive tile row/col range intersecting the data, `None` if empty
    data_range: Option<((usize, usize), (usize, usize))>,
    upper_left: (f64, f64),
    geometry: GridGeometry,
    descriptors: Vec<TileDescriptor>,
}

impl LetteredTileScheme {
    pub fn new(
        grid: &GridDefinition,
        sector: &LetteredSector,
        subtiles: (usize, usize),
        projector: &dyn Projector,
    ) -> TileResult<Self> {
        grid.validate()?;
        validate_sector(sector, subtiles)?;
        if grid.cell_height > 0.0 {
            return Err(TileError::geometry(format!(
                "lettered tiling needs north-up rows (negative cell height), grid {} has {}",
                grid.grid_name, grid.cell_height
            )));
        }

        let cw = grid.cell_width.abs();
        let ch = grid.cell_height.abs();
        let data_x = grid.x_coords();
        let data_y = grid.y_coords();
        let (x_min, x_max) = min_max(&data_x);
        let (y_min, y_max) = min_max(&data_y);

        let ll = projector.project(sector.lower_left.0, sector.lower_left.1)?;
        let ur = projector.project(sector.upper_right.0, sector.upper_right.1)?;
        let (width, height) = (ur.0 - ll.0, ur.1 - ll.1);

        // Numbering starts at the upper-left corner, moved onto the data's
        // pixel edge lattice so it is a whole number of pixels from any
        // window of the same grid.
        let ul = (
            snap_to_lattice(ll.0, x_min - cw / 2.0, cw),
            snap_to_lattice(ur.1, y_max + ch / 2.0, ch),
        );
        debug!(
            shift_x = ll.0 - ul.0,
            shift_y = ur.1 - ul.1,
            "Aligned lettered grid to data pixel edges"
        );

        let (st_rows, st_cols) = subtiles;
        let (cs_rows, cs_cols) = sector.cell_size;
        let fcs_y = (cs_rows / st_rows as f64).ceil();
        let fcs_x = (cs_cols / st_cols as f64).ceil();

        // whole alpha cells only
        let max_cols = ceil_count(width / fcs_x, st_cols)?;
        let max_rows = ceil_count(height / fcs_y, st_rows)?;

        let alpha_cells = (max_rows / st_rows) * (max_cols / st_cols);
        if alpha_cells > MAX_ALPHA_CELLS {
            return Err(TileError::config(format!(
                "too many lettered grid cells ({}), sector cell size too small; max {}",
                alpha_cells, MAX_ALPHA_CELLS
            )));
        }

        // sub-tile size in whole source pixels
        let num_pixels_x = (fcs_x / cw).floor() as usize;
        let num_pixels_y = (fcs_y / ch).floor() as usize;
        if num_pixels_x == 0 || num_pixels_y == 0 {
            return Err(TileError::config(format!(
                "sub-tile size ({}, {}) is smaller than one pixel ({}, {})",
                fcs_y, fcs_x, ch, cw
            )));
        }
        let tile_shape = (num_pixels_y, num_pixels_x);
        let fcs_x = num_pixels_x as f64 * cw;
        let fcs_y = num_pixels_y as f64 * ch;

        let geometry = GridGeometry::new(
            ul.0 + cw / 2.0,
            ul.1 - ch / 2.0,
            cw,
            -ch,
            max_rows * num_pixels_y,
            max_cols * num_pixels_x,
        )?;

        // tile rows/cols the data can touch, measured from pixel centers
        let col_range = clamp_range(
            ((x_min - ul.0) / fcs_x).floor(),
            ((x_max - ul.0) / fcs_x).floor(),
            max_cols,
        );
        let row_range = clamp_range(
            ((ul.1 - y_max) / fcs_y).floor(),
            ((ul.1 - y_min) / fcs_y).floor(),
            max_rows,
        );
        let data_range = row_range.zip(col_range);

        let mut descriptors = Vec::new();
        if let Some(((min_row, max_row), (min_col, max_col))) = data_range {
            for ty in min_row..=max_row {
                for tx in min_col..=max_col {
                    let id = tile_id(ty, tx, subtiles, max_cols);
                    let row_offset = ty * num_pixels_y;
                    let col_offset = tx * num_pixels_x;
                    let left = ul.0 + tx as f64 * fcs_x;
                    let top = ul.1 - ty as f64 * fcs_y;

                    let Some(slices) =
                        tile_overlap(&data_x, &data_y, left, top, cw, -ch, tile_shape)
                    else {
                        debug!(tile = %id, "Tile doesn't have any data in it");
                        continue;
                    };

                    descriptors.push(TileDescriptor {
                        id,
                        tile_row: ty,
                        tile_col: tx,
                        row_offset,
                        col_offset,
                        shape: tile_shape,
                        x: geometry.x()[col_offset..col_offset + num_pixels_x].to_vec(),
                        y: geometry.y()[row_offset..row_offset + num_pixels_y].to_vec(),
                        slices,
                    });
                }
            }
        }

        debug!(
            grid = %grid.grid_name,
            total_rows = max_rows,
            total_cols = max_cols,
            tile_rows = num_pixels_y,
            tile_cols = num_pixels_x,
            data_range = ?data_range,
            tiles = descriptors.len(),
            "Built lettered tile scheme"
        );

        Ok(Self {
            subtiles,
            tile_shape,
            total_tile_count: (max_rows, max_cols),
            data_range,
            upper_left: ul,
            geometry,
            descriptors,
        })
    }

    pub fn subtiles(&self) -> (usize, usize) {
        self.subtiles
    }

    pub fn tile_shape(&self) -> (usize, usize) {
        self.tile_shape
    }

    /// Tile rows/cols of the whole lettered grid.
    pub fn tile_count(&self) -> (usize, usize) {
        self.total_tile_count
    }

    pub fn total_tiles(&self) -> usize {
        self.total_tile_count.0 * self.total_tile_count.1
    }

    /// Inclusive ((min_row, max_row), (min_col, max_col)) of tiles the data
    /// extent reaches.
    pub fn data_tile_range(&self) -> Option<((usize, usize), (usize, usize))> {
        self.data_range
    }

    /// Outer upper-left corner of the lettered grid after alignment.
    pub fn upper_left(&self) -> (f64, f64) {
        self.upper_left
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

fn validate_sector(sector: &LetteredSector, subtiles: (usize, usize)) -> TileResult<()> {
    if subtiles.0 == 0 || subtiles.1 == 0 {
        return Err(TileError::config(format!(
            "sub-tile counts must be positive, got {:?}",
            subtiles
        )));
    }
    let (rows, cols) = sector.cell_size;
    if !(rows.is_finite() && rows > 0.0 && cols.is_finite() && cols > 0.0) {
        return Err(TileError::config(format!(
            "sector cell size must be positive, got {:?}",
            sector.cell_size
        )));
    }
    Ok(())
}

/// Largest point of the lattice `edge + k * cell` at or below `value`.
///
/// The result is built from `edge` plus a whole multiple of `cell`, never
/// from `value`, so grids sharing a lattice get bit-identical corners.
/// Values within rounding noise of a lattice point snap to it.
fn snap_to_lattice(value: f64, edge: f64, cell: f64) -> f64 {
    let cells = (value - edge) / cell;
    let nearest = cells.round();
    let whole = if (cells - nearest).abs() <= 1e-9 {
        nearest
    } else {
        cells.floor()
    };
    edge + whole * cell
}

/// Number of tiles spanning `tiles` (fractional), rounded up to a
/// multiple of `multiple`.
fn ceil_count(tiles: f64, multiple: usize) -> TileResult<usize> {
    if !tiles.is_finite() || tiles <= 0.0 {
        return Err(TileError::config(format!(
            "sector corners give an empty lettered grid ({} tiles)",
            tiles
        )));
    }
    let count = tiles.ceil() as usize;
    Ok(count.div_ceil(multiple) * multiple)
}

fn clamp_range(lo: f64, hi: f64, count: usize) -> Option<(usize, usize)> {
    let lo = lo.max(0.0);
    let hi = hi.min(count as f64 - 1.0);
    if hi < lo {
        return None;
    }
    Some((lo as usize, hi as usize))
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

/// Letter from the alpha cell, number from the position inside it.
fn tile_id(ty: usize, tx: usize, subtiles: (usize, usize), total_cols: usize) -> TileId {
    let (st_rows, st_cols) = subtiles;
    let alpha = (ty / st_rows) * (total_cols / st_cols) + tx / st_cols;
    let number = (ty % st_rows) * st_cols + tx % st_cols + 1;
    TileId::Lettered {
        letter: (b'A' + alpha as u8) as char,
        number,
    }
}
