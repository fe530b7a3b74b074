//! Projected pixel grid definitions.

use serde::{Deserialize, Serialize};

use crate::error::{TileError, TileResult};

/// A regular grid in a projected coordinate system.
///
/// `origin_x`/`origin_y` are the coordinates of the *center* of the upper-left
/// pixel. Columns grow with X (`cell_width > 0`); rows usually grow downward,
/// so `cell_height` is negative for north-up imagery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridDefinition {
    /// Name used to group products and to label the projection variable
    pub grid_name: String,
    /// PROJ.4 definition of the grid's projection
    #[serde(alias = "proj4")]
    pub proj4_definition: String,
    /// Number of columns
    pub width: usize,
    /// Number of rows
    pub height: usize,
    /// Pixel size along X in projection units
    pub cell_width: f64,
    /// Pixel size along Y in projection units (signed)
    pub cell_height: f64,
    /// X of the upper-left pixel center
    pub origin_x: f64,
    /// Y of the upper-left pixel center
    pub origin_y: f64,
}

impl GridDefinition {
    /// Check the structural invariants of the grid.
    pub fn validate(&self) -> TileResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(TileError::geometry(format!(
                "grid '{}' has empty shape {}x{}",
                self.grid_name, self.height, self.width
            )));
        }
        if !(self.cell_width.is_finite() && self.cell_width > 0.0) {
            return Err(TileError::geometry(format!(
                "grid '{}' cell_width must be positive, got {}",
                self.grid_name, self.cell_width
            )));
        }
        if !(self.cell_height.is_finite() && self.cell_height != 0.0) {
            return Err(TileError::geometry(format!(
                "grid '{}' cell_height must be non-zero, got {}",
                self.grid_name, self.cell_height
            )));
        }
        if !self.origin_x.is_finite() || !self.origin_y.is_finite() {
            return Err(TileError::geometry(format!(
                "grid '{}' has a non-finite origin",
                self.grid_name
            )));
        }
        Ok(())
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Pixel-center X coordinate of every column.
    pub fn x_coords(&self) -> Vec<f64> {
        axis_coords(self.origin_x, self.cell_width, self.width)
    }

    /// Pixel-center Y coordinate of every row.
    pub fn y_coords(&self) -> Vec<f64> {
        axis_coords(self.origin_y, self.cell_height, self.height)
    }
}

/// `first + i * step` for `i` in `0..len`.
pub(crate) fn axis_coords(first: f64, step: f64, len: usize) -> Vec<f64> {
    (0..len).map(|i| first + i as f64 * step).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> GridDefinition {
        GridDefinition {
            grid_name: "test".to_string(),
            proj4_definition: "+proj=merc".to_string(),
            width: 4,
            height: 3,
            cell_width: 1000.0,
            cell_height: -1000.0,
            origin_x: 500.0,
            origin_y: -500.0,
        }
    }

    #[test]
    fn test_coords() {
        let g = grid();
        assert_eq!(g.x_coords(), vec![500.0, 1500.0, 2500.0, 3500.0]);
        assert_eq!(g.y_coords(), vec![-500.0, -1500.0, -2500.0]);
        assert_eq!(g.shape(), (3, 4));
    }

    #[test]
    fn test_validate() {
        assert!(grid().validate().is_ok());

        let mut bad = grid();
        bad.cell_width = -1000.0;
        assert!(matches!(bad.validate(), Err(TileError::Geometry(_))));

        let mut bad = grid();
        bad.height = 0;
        assert!(bad.validate().is_err());

        let mut bad = grid();
        bad.cell_height = 0.0;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_deserialize_with_alias() {
        let json = r#"{
            "grid_name": "lcc_conus",
            "proj4": "+proj=lcc +lat_0=25 +lon_0=-95 +lat_1=25",
            "width": 10, "height": 5,
            "cell_width": 1000.0, "cell_height": -1000.0,
            "origin_x": 0.0, "origin_y": 0.0
        }"#;
        let g: GridDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(g.grid_name, "lcc_conus");
        assert!(g.proj4_definition.starts_with("+proj=lcc"));
    }
}
