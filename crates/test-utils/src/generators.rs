//! Synthetic image data for tiling tests.
//!
//! Values and masks are plain row-major vectors so any crate can wrap them
//! in its own grid type. Masks use `true` for invalid pixels.

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// This makes it easy to verify that a tile received the right source pixels
/// by checking that grid[row][col] == col * 1000 + row.
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50); // 10 * 5
/// assert_eq!(grid[0], 0.0);   // col=0, row=0 -> 0*1000 + 0
/// assert_eq!(grid[1], 1000.0); // col=1, row=0 -> 1*1000 + 0
/// assert_eq!(grid[10], 1.0);  // col=0, row=1 -> 0*1000 + 1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Creates brightness-temperature-like values in Kelvin.
///
/// A gradient from about 200K (top-left) to 320K (bottom-right), the range
/// of infrared window channels.
pub fn create_brightness_temperature_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let x_factor = col as f32 / width.max(1) as f32;
            let y_factor = row as f32 / height.max(1) as f32;
            data.push(200.0 + x_factor * 60.0 + y_factor * 60.0);
        }
    }
    data
}

/// Creates a mask where only the block `rows` x `cols` is valid.
///
/// Everything outside the half-open row/col ranges is marked invalid
/// (`true`).
///
/// # Example
///
/// ```
/// use test_utils::create_block_valid_mask;
///
/// let mask = create_block_valid_mask(4, 4, 1..3, 1..3);
/// assert!(mask[0]);       // (0, 0) invalid
/// assert!(!mask[4 + 1]);  // (1, 1) valid
/// assert_eq!(mask.iter().filter(|m| !**m).count(), 4);
/// ```
pub fn create_block_valid_mask(
    width: usize,
    height: usize,
    rows: std::ops::Range<usize>,
    cols: std::ops::Range<usize>,
) -> Vec<bool> {
    let mut mask = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            mask.push(!(rows.contains(&row) && cols.contains(&col)));
        }
    }
    mask
}

/// Encodes `f32` values as little-endian bytes, the layout of scene data
/// files.
pub fn to_le_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}
