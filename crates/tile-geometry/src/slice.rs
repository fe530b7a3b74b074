//! Overlap between a tile's extent and the source coordinate arrays.
//!
//! Both tile schemes place tiles by coordinate and then ask this module
//! which source pixels land where. A tile along one axis is described by its
//! *leading edge* (left for X, top for north-up Y), the signed pixel step and
//! its length in pixels. The leading edge is inclusive and the trailing edge
//! exclusive, so a pixel center sitting exactly on a shared boundary belongs
//! to exactly one tile.
//!
//! Source coordinates must be monotonic and gap-free inside the overlap.

/// Half-open index range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxisSlice {
    pub start: usize,
    pub end: usize,
}

impl AxisSlice {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// Where source data lands inside one tile along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisOverlap {
    /// Range inside the fixed-size tile buffer
    pub tile: AxisSlice,
    /// Range inside the source array
    pub data: AxisSlice,
}

/// Row and column overlaps of one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSlices {
    pub rows: AxisOverlap,
    pub cols: AxisOverlap,
}

impl TileSlices {
    /// Number of source pixels copied into the tile.
    pub fn pixel_count(&self) -> usize {
        self.rows.data.len() * self.cols.data.len()
    }
}

/// Compute the overlap of one tile axis with the source coordinates.
///
/// `coords` are source pixel centers, `leading` is the tile's outer edge on
/// the side where its local index 0 sits, `step` the signed pixel size and
/// `tile_len` the tile length in pixels. Returns `None` when no source pixel
/// center falls inside the tile.
pub fn axis_overlap(coords: &[f64], leading: f64, step: f64, tile_len: usize) -> Option<AxisOverlap> {
    if coords.is_empty() || tile_len == 0 || step == 0.0 {
        return None;
    }
    let trailing = leading + step * tile_len as f64;

    let ascending = match coords.len() {
        1 => step > 0.0,
        n => coords[n - 1] >= coords[0],
    };
    if ascending != (step > 0.0) {
        // Source runs opposite to the tile direction; nothing to align.
        return None;
    }

    let (start, end) = if step > 0.0 {
        (
            coords.partition_point(|&c| c < leading),
            coords.partition_point(|&c| c < trailing),
        )
    } else {
        (
            coords.partition_point(|&c| c > leading),
            coords.partition_point(|&c| c > trailing),
        )
    };

    if start >= end {
        return None;
    }

    // Local index of the pixel whose extent holds the first source center.
    let local = ((coords[start] - leading) / step).floor();
    if local < 0.0 {
        return None;
    }
    let tile_start = local as usize;
    if tile_start >= tile_len {
        return None;
    }

    let len = (end - start).min(tile_len - tile_start);
    Some(AxisOverlap {
        tile: AxisSlice::new(tile_start, tile_start + len),
        data: AxisSlice::new(start, start + len),
    })
}

/// Overlap on both axes, `None` if either axis misses.
pub fn tile_overlap(
    x: &[f64],
    y: &[f64],
    left: f64,
    top: f64,
    step_x: f64,
    step_y: f64,
    tile_shape: (usize, usize),
) -> Option<TileSlices> {
    let cols = axis_overlap(x, left, step_x, tile_shape.1)?;
    let rows = axis_overlap(y, top, step_y, tile_shape.0)?;
    Some(TileSlices { rows, cols })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn centers(first: f64, step: f64, n: usize) -> Vec<f64> {
        (0..n).map(|i| first + i as f64 * step).collect()
    }

    #[test]
    fn test_full_overlap_ascending() {
        let x = centers(0.5, 1.0, 10);
        let o = axis_overlap(&x, 0.0, 1.0, 10).unwrap();
        assert_eq!(o.tile, AxisSlice::new(0, 10));
        assert_eq!(o.data, AxisSlice::new(0, 10));
    }

    #[test]
    fn test_partial_overlap_at_edge() {
        let x = centers(0.5, 1.0, 10);
        // tile covers [8, 12): only pixels 8 and 9 exist
        let o = axis_overlap(&x, 8.0, 1.0, 4).unwrap();
        assert_eq!(o.tile, AxisSlice::new(0, 2));
        assert_eq!(o.data, AxisSlice::new(8, 10));

        // tile covers [-3, 1): data starts at local index 3
        let o = axis_overlap(&x, -3.0, 1.0, 4).unwrap();
        assert_eq!(o.tile, AxisSlice::new(3, 4));
        assert_eq!(o.data, AxisSlice::new(0, 1));
    }

    #[test]
    fn test_descending_axis() {
        let y = centers(9.5, -1.0, 10);
        // tile covers (6, 10]
        let o = axis_overlap(&y, 10.0, -1.0, 4).unwrap();
        assert_eq!(o.tile, AxisSlice::new(0, 4));
        assert_eq!(o.data, AxisSlice::new(0, 4));

        // tile covers (-2, 2]
        let o = axis_overlap(&y, 2.0, -1.0, 4).unwrap();
        assert_eq!(o.tile, AxisSlice::new(0, 2));
        assert_eq!(o.data, AxisSlice::new(8, 10));
    }

    #[test]
    fn test_no_overlap() {
        let x = centers(0.5, 1.0, 10);
        assert!(axis_overlap(&x, 10.0, 1.0, 4).is_none());
        assert!(axis_overlap(&x, -4.0, 1.0, 4).is_none());
        assert!(axis_overlap(&[], 0.0, 1.0, 4).is_none());
    }

    #[test]
    fn test_boundary_pixels_counted_once() {
        // centers exactly on tile edges
        let x = centers(0.0, 1.0, 8);
        let a = axis_overlap(&x, 0.0, 1.0, 4).unwrap();
        let b = axis_overlap(&x, 4.0, 1.0, 4).unwrap();
        assert_eq!(a.data.end, b.data.start);
        assert_eq!(a.data.len() + b.data.len(), 8);
    }

    #[test]
    fn test_tile_overlap_pixel_count() {
        let x = centers(0.5, 1.0, 6);
        let y = centers(5.5, -1.0, 6);
        let s = tile_overlap(&x, &y, 4.0, 6.0, 1.0, -1.0, (4, 4)).unwrap();
        assert_eq!(s.cols.data, AxisSlice::new(4, 6));
        assert_eq!(s.rows.data, AxisSlice::new(0, 4));
        assert_eq!(s.pixel_count(), 8);
    }
}
