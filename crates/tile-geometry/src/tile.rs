//! Tile identifiers, descriptors and materialized tiles.

use std::fmt;

use crate::array::MaskedGrid;
use crate::slice::TileSlices;

/// Identifier of one tile, as it appears in AWIPS file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileId {
    /// `T001`, `T002`, ... numbered row-major from 1
    Numbered(usize),
    /// `TA01`, `TB03`, ... alpha cell plus 1-based sub-tile number
    Lettered { letter: char, number: usize },
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileId::Numbered(n) => write!(f, "T{:03}", n),
            TileId::Lettered { letter, number } => write!(f, "T{}{:02}", letter, number),
        }
    }
}

/// Data-independent placement of one tile.
#[derive(Debug, Clone, PartialEq)]
pub struct TileDescriptor {
    pub id: TileId,
    /// Tile row/column in the scheme's tile grid
    pub tile_row: usize,
    pub tile_col: usize,
    /// Pixel offset of the tile's first row/column in the full image
    pub row_offset: usize,
    pub col_offset: usize,
    /// (rows, cols) of the tile buffer
    pub shape: (usize, usize),
    /// Pixel-center X of every tile column
    pub x: Vec<f64>,
    /// Pixel-center Y of every tile row
    pub y: Vec<f64>,
    /// Where source data lands inside the tile
    pub slices: TileSlices,
}

impl TileDescriptor {
    /// Global coordinate index of every tile column.
    pub fn x_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.shape.1).map(move |i| self.col_offset + i)
    }

    /// Global coordinate index of every tile row.
    pub fn y_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.shape.0).map(move |i| self.row_offset + i)
    }

    /// Copy the overlapping source region into a fill-initialized tile.
    ///
    /// Returns `None` when none of the copied pixels is valid.
    pub fn materialize(&self, data: &MaskedGrid) -> Option<Tile<'_>> {
        let rows = self.slices.rows;
        let cols = self.slices.cols;
        if rows.data.end > data.rows() || cols.data.end > data.cols() {
            return None;
        }

        let mut buffer = MaskedGrid::filled(self.shape.0, self.shape.1, f32::NAN);
        let mut any_valid = false;

        for (tr, dr) in rows.tile.range().zip(rows.data.range()) {
            for (tc, dc) in cols.tile.range().zip(cols.data.range()) {
                let valid = data.is_valid(dr, dc);
                any_valid |= valid;
                buffer.set(tr, tc, data.get(dr, dc), !valid);
            }
        }

        if !any_valid {
            return None;
        }

        Some(Tile {
            descriptor: self,
            data: buffer,
        })
    }
}

/// A tile with its pixel buffer filled from one product.
#[derive(Debug, Clone)]
pub struct Tile<'a> {
    pub descriptor: &'a TileDescriptor,
    /// Tile-shaped buffer; pixels outside the source overlap are invalid
    pub data: MaskedGrid,
}

impl Tile<'_> {
    pub fn id(&self) -> TileId {
        self.descriptor.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slice::{AxisOverlap, AxisSlice};

    #[test]
    fn test_tile_id_format() {
        assert_eq!(TileId::Numbered(1).to_string(), "T001");
        assert_eq!(TileId::Numbered(42).to_string(), "T042");
        assert_eq!(
            TileId::Lettered {
                letter: 'C',
                number: 4
            }
            .to_string(),
            "TC04"
        );
    }

    fn descriptor() -> TileDescriptor {
        TileDescriptor {
            id: TileId::Numbered(1),
            tile_row: 0,
            tile_col: 1,
            row_offset: 0,
            col_offset: 3,
            shape: (2, 3),
            x: vec![3.5, 4.5, 5.5],
            y: vec![1.5, 0.5],
            slices: TileSlices {
                rows: AxisOverlap {
                    tile: AxisSlice::new(0, 2),
                    data: AxisSlice::new(0, 2),
                },
                cols: AxisOverlap {
                    tile: AxisSlice::new(0, 2),
                    data: AxisSlice::new(3, 5),
                },
            },
        }
    }

    #[test]
    fn test_materialize_partial_tile() {
        let data = MaskedGrid::new(2, 5, (0..10).map(|v| v as f32).collect(), None).unwrap();
        let d = descriptor();
        let tile = d.materialize(&data).unwrap();
        assert_eq!(tile.data.shape(), (2, 3));
        assert_eq!(tile.data.get(0, 0), 3.0);
        assert_eq!(tile.data.get(1, 1), 9.0);
        assert!(!tile.data.is_valid(0, 2));
        assert_eq!(tile.data.count_valid(), 4);
        assert_eq!(d.x_indices().collect::<Vec<_>>(), vec![3, 4, 5]);
        assert_eq!(d.y_indices().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_materialize_all_masked_is_none() {
        let mut mask = vec![false; 10];
        for m in mask.iter_mut().skip(3).take(2) {
            *m = true;
        }
        for m in mask.iter_mut().skip(8).take(2) {
            *m = true;
        }
        let data = MaskedGrid::new(2, 5, vec![1.0; 10], Some(mask)).unwrap();
        assert!(descriptor().materialize(&data).is_none());
    }
}
