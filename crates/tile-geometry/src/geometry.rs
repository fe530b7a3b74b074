//! Coordinate arrays and quantization parameters of a tiled image.

use serde::{Deserialize, Serialize};

use crate::error::{TileError, TileResult};
use crate::grid::axis_coords;

/// Largest number of distinct coordinate indices per axis.
///
/// AWIPS stores X/Y as signed 16-bit integers counting up from 0, so only
/// the non-negative half of the range is usable.
pub const MAX_AXIS_INDICES: usize = 1 << 15;

/// Linear map from stored coordinate index to projected coordinate:
/// `x = index * mx + bx`, `y = index * my + by`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalingParameters {
    pub mx: f64,
    pub bx: f64,
    pub my: f64,
    pub by: f64,
}

impl ScalingParameters {
    pub fn x_at(&self, index: usize) -> f64 {
        index as f64 * self.mx + self.bx
    }

    pub fn y_at(&self, index: usize) -> f64 {
        index as f64 * self.my + self.by
    }
}

/// Pixel-center coordinates of the full, tile-padded image.
///
/// The extents are the *virtual* ones (tile count times tile shape), which
/// can run past the source data. Every tile of the image shares the same
/// [`ScalingParameters`].
#[derive(Debug, Clone, PartialEq)]
pub struct GridGeometry {
    x: Vec<f64>,
    y: Vec<f64>,
    scaling: ScalingParameters,
}

impl GridGeometry {
    /// Build coordinates for a `rows` x `cols` image whose upper-left pixel
    /// center is `(first_x, first_y)`.
    pub fn new(
        first_x: f64,
        first_y: f64,
        step_x: f64,
        step_y: f64,
        rows: usize,
        cols: usize,
    ) -> TileResult<Self> {
        check_axis("X", cols)?;
        check_axis("Y", rows)?;

        Ok(Self {
            x: axis_coords(first_x, step_x, cols),
            y: axis_coords(first_y, step_y, rows),
            scaling: ScalingParameters {
                mx: step_x,
                bx: first_x,
                my: step_y,
                by: first_y,
            },
        })
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn scaling(&self) -> ScalingParameters {
        self.scaling
    }

    /// (rows, cols) of the virtual image.
    pub fn shape(&self) -> (usize, usize) {
        (self.y.len(), self.x.len())
    }
}

fn check_axis(axis: &'static str, count: usize) -> TileResult<()> {
    if count > MAX_AXIS_INDICES {
        return Err(TileError::Size {
            axis,
            count,
            limit: MAX_AXIS_INDICES,
        });
    }
    Ok(())
}
