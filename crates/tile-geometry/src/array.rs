//! Masked 2-D data arrays.

use crate::error::{TileError, TileResult};

/// Row-major `f32` grid with a validity mask.
///
/// A pixel is invalid when its mask entry is `true` or its value is not
/// finite.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedGrid {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
    mask: Vec<bool>,
}

impl MaskedGrid {
    /// Build a grid; the mask defaults to "all valid".
    pub fn new(rows: usize, cols: usize, data: Vec<f32>, mask: Option<Vec<bool>>) -> TileResult<Self> {
        let len = rows * cols;
        if data.len() != len {
            return Err(TileError::geometry(format!(
                "data has {} values, expected {} ({}x{})",
                data.len(),
                len,
                rows,
                cols
            )));
        }
        let mask = match mask {
            Some(mask) if mask.len() != len => {
                return Err(TileError::geometry(format!(
                    "mask has {} values, expected {}",
                    mask.len(),
                    len
                )));
            }
            Some(mask) => mask,
            None => vec![false; len],
        };
        Ok(Self {
            rows,
            cols,
            data,
            mask,
        })
    }

    /// A fully invalid grid filled with `fill`.
    pub fn filled(rows: usize, cols: usize, fill: f32) -> Self {
        Self {
            rows,
            cols,
            data: vec![fill; rows * cols],
            mask: vec![true; rows * cols],
        }
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.cols + col]
    }

    pub fn is_valid(&self, row: usize, col: usize) -> bool {
        let idx = row * self.cols + col;
        !self.mask[idx] && self.data[idx].is_finite()
    }

    /// Iterator over all valid values.
    pub fn valid_values(&self) -> impl Iterator<Item = f32> + '_ {
        self.data
            .iter()
            .zip(&self.mask)
            .filter(|(v, m)| !**m && v.is_finite())
            .map(|(v, _)| *v)
    }

    pub fn count_valid(&self) -> usize {
        self.valid_values().count()
    }

    /// (min, max) of valid values, `None` if everything is masked.
    pub fn valid_range(&self) -> Option<(f32, f32)> {
        self.valid_values().fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, value: f32, invalid: bool) {
        let idx = row * self.cols + col;
        self.data[idx] = value;
        self.mask[idx] = invalid;
    }
}
