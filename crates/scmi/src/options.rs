//! Run options handed to the backend at construction.

use std::path::PathBuf;

use chrono::Duration;
use tile_geometry::DEFAULT_SUBTILES;

use crate::naming::DEFAULT_OUTPUT_PATTERN;

/// Value of the `creator` global attribute unless overridden.
pub const DEFAULT_CREATOR: &str = "UW SSEC - SCMI Writer";

/// Source name used in file names unless overridden.
pub const DEFAULT_SOURCE_NAME: &str = "SSEC";

/// Output file behavior.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub source_name: String,
    /// File name pattern, see [`crate::naming`]
    pub output_pattern: String,
    pub output_dir: PathBuf,
    pub overwrite_existing: bool,
    /// Leave partially written files behind on failure
    pub keep_intermediate: bool,
    /// Abort on the first failed tile or product instead of continuing
    pub exit_on_error: bool,
    pub compress: bool,
    pub fix_awips: bool,
    /// Minutes added to begin/end times in names and `start_date_time`
    pub time_shift_minutes: i64,
    /// `production_location` attribute; omitted when `None`
    pub production_location: Option<String>,
    pub creator: String,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            source_name: DEFAULT_SOURCE_NAME.to_string(),
            output_pattern: DEFAULT_OUTPUT_PATTERN.to_string(),
            output_dir: PathBuf::from("."),
            overwrite_existing: false,
            keep_intermediate: false,
            exit_on_error: false,
            compress: false,
            fix_awips: false,
            time_shift_minutes: 0,
            production_location: None,
            creator: DEFAULT_CREATOR.to_string(),
        }
    }
}

impl OutputOptions {
    pub fn time_shift(&self) -> Duration {
        Duration::minutes(self.time_shift_minutes)
    }
}

/// How the grid is cut into tiles.
#[derive(Debug, Clone, PartialEq)]
pub enum TilingMode {
    /// Sequential tiles; exactly one of shape or count is set
    Numbered {
        tile_shape: Option<(usize, usize)>,
        tile_count: Option<(usize, usize)>,
    },
    /// Static lettered grid of the sector
    Lettered { subtiles: (usize, usize) },
}

impl TilingMode {
    /// Numbered tiling where an explicit shape takes precedence over a count.
    pub fn numbered(tile_shape: Option<(usize, usize)>, tile_count: (usize, usize)) -> Self {
        match tile_shape {
            Some(shape) => TilingMode::Numbered {
                tile_shape: Some(shape),
                tile_count: None,
            },
            None => TilingMode::Numbered {
                tile_shape: None,
                tile_count: Some(tile_count),
            },
        }
    }

    pub fn lettered(subtiles: Option<(usize, usize)>) -> Self {
        TilingMode::Lettered {
            subtiles: subtiles.unwrap_or(DEFAULT_SUBTILES),
        }
    }

    pub fn is_lettered(&self) -> bool {
        matches!(self, TilingMode::Lettered { .. })
    }
}

/// Sector and tiling used for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct TilingOptions {
    pub sector_id: String,
    pub mode: TilingMode,
}

impl TilingOptions {
    pub fn new(sector_id: impl Into<String>, mode: TilingMode) -> Self {
        Self {
            sector_id: sector_id.into(),
            mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_overrides_count() {
        assert_eq!(
            TilingMode::numbered(Some((256, 256)), (2, 2)),
            TilingMode::Numbered {
                tile_shape: Some((256, 256)),
                tile_count: None
            }
        );
        assert_eq!(
            TilingMode::numbered(None, (2, 3)),
            TilingMode::Numbered {
                tile_shape: None,
                tile_count: Some((2, 3))
            }
        );
    }

    #[test]
    fn test_defaults() {
        let opts = OutputOptions::default();
        assert_eq!(opts.output_pattern, DEFAULT_OUTPUT_PATTERN);
        assert_eq!(opts.time_shift(), Duration::zero());
        assert_eq!(TilingMode::lettered(None), TilingMode::Lettered { subtiles: (2, 2) });
    }
}
