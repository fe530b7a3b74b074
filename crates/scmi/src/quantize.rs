//! Linear packing of product values into 16-bit tile storage.

use tile_geometry::MaskedGrid;

use crate::error::{ScmiError, ScmiResult};

/// Bits of the unsigned storage type.
pub const FILE_BIT_DEPTH: u32 = 16;

/// Code stored for invalid pixels.
pub const FILL_CODE: u16 = u16::MAX;

/// Scale/offset mapping a product's valid range onto integer codes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantization {
    pub scale: f64,
    pub offset: f64,
    pub bit_depth: u32,
    /// 1 when the fill code is carved out of the data range
    pub num_fills: u32,
    pub valid_min: f64,
    pub valid_max: f64,
}

impl Quantization {
    /// Compute the packing for a valid range.
    ///
    /// A bit depth at or above the storage width reserves the top code for
    /// fill; a smaller one leaves the fill code outside the data range.
    /// Category data (`flag_meanings`) uses scale 0.5 and offset 0 since
    /// AWIPS rejects the identity transform.
    pub fn new(
        valid_min: f64,
        valid_max: f64,
        bit_depth: Option<u32>,
        flag_meanings: bool,
    ) -> ScmiResult<Self> {
        if !valid_min.is_finite() || !valid_max.is_finite() || valid_min > valid_max {
            return Err(ScmiError::config(format!(
                "invalid valid range [{}, {}]",
                valid_min, valid_max
            )));
        }

        let requested = bit_depth.unwrap_or(FILE_BIT_DEPTH);
        if requested == 0 {
            return Err(ScmiError::config("bit depth must be positive"));
        }
        let (bit_depth, num_fills) = if requested >= FILE_BIT_DEPTH {
            (FILE_BIT_DEPTH, 1)
        } else {
            (requested, 0)
        };

        let (scale, offset) = if flag_meanings {
            (0.5, 0.0)
        } else {
            let steps = ((1u64 << bit_depth) - 1 - num_fills as u64) as f64;
            let range = valid_max - valid_min;
            // constant products still need a usable scale
            let scale = if range > 0.0 { range / steps } else { 1.0 };
            (scale, valid_min)
        };

        Ok(Self {
            scale,
            offset,
            bit_depth,
            num_fills,
            valid_min,
            valid_max,
        })
    }

    /// Largest code holding data; the `valid_max` attribute.
    pub fn max_code(&self) -> u16 {
        ((1u64 << self.bit_depth) - 1 - self.num_fills as u64) as u16
    }

    pub fn encode(&self, value: f32, valid: bool) -> u16 {
        if !valid || !value.is_finite() {
            return FILL_CODE;
        }
        let clipped = (value as f64).clamp(self.valid_min, self.valid_max);
        let code = ((clipped - self.offset) / self.scale).round();
        code.clamp(0.0, self.max_code() as f64) as u16
    }

    /// Decode a code; the fill code decodes to NaN.
    pub fn decode(&self, code: u16) -> f32 {
        if code == FILL_CODE {
            return f32::NAN;
        }
        (code as f64 * self.scale + self.offset) as f32
    }

    /// Encode a whole grid in row-major order.
    pub fn encode_grid(&self, grid: &MaskedGrid) -> Vec<u16> {
        grid.data()
            .iter()
            .zip(grid.mask())
            .map(|(&v, &invalid)| self.encode(v, !invalid))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_depth_reserves_fill() {
        let q = Quantization::new(200.0, 330.0, None, false).unwrap();
        assert_eq!(q.bit_depth, 16);
        assert_eq!(q.num_fills, 1);
        assert_eq!(q.max_code(), 65534);
        assert!((q.scale - 130.0 / 65534.0).abs() < 1e-12);
        assert_eq!(q.offset, 200.0);
    }

    #[test]
    fn test_reduced_depth_has_no_reserved_code() {
        let q = Quantization::new(0.0, 255.0, Some(8), false).unwrap();
        assert_eq!(q.num_fills, 0);
        assert_eq!(q.max_code(), 255);
        assert_eq!(q.scale, 1.0);
        assert_eq!(q.encode(17.0, true), 17);

        let q = Quantization::new(0.0, 1.0, Some(20), false).unwrap();
        assert_eq!(q.bit_depth, 16);
    }

    #[test]
    fn test_flag_meanings() {
        let q = Quantization::new(0.0, 10.0, None, true).unwrap();
        assert_eq!((q.scale, q.offset), (0.5, 0.0));
        assert_eq!(q.encode(3.0, true), 6);
        assert_eq!(q.decode(6), 3.0);
    }

    #[test]
    fn test_round_trip_within_one_step() {
        let q = Quantization::new(200.0, 330.0, None, false).unwrap();
        for i in 0..=130 {
            let v = 200.0 + i as f32 * 0.997;
            let v = v.min(330.0);
            let back = q.decode(q.encode(v, true));
            assert!((back - v).abs() as f64 <= q.scale, "{} -> {}", v, back);
        }
    }

    #[test]
    fn test_fill_and_clipping() {
        let q = Quantization::new(0.0, 100.0, None, false).unwrap();
        assert_eq!(q.encode(f32::NAN, true), FILL_CODE);
        assert_eq!(q.encode(50.0, false), FILL_CODE);
        assert!(q.decode(FILL_CODE).is_nan());
        assert_eq!(q.encode(-5.0, true), 0);
        assert_eq!(q.encode(150.0, true), q.max_code());
    }

    #[test]
    fn test_constant_and_invalid_ranges() {
        let q = Quantization::new(5.0, 5.0, None, false).unwrap();
        assert_eq!(q.encode(5.0, true), 0);
        assert_eq!(q.decode(0), 5.0);

        assert!(Quantization::new(10.0, 0.0, None, false).is_err());
        assert!(Quantization::new(f64::NAN, 1.0, None, false).is_err());
        assert!(Quantization::new(0.0, 1.0, Some(0), false).is_err());
    }

    #[test]
    fn test_encode_grid() {
        let grid = MaskedGrid::new(1, 3, vec![0.0, 100.0, 50.0], Some(vec![false, false, true]))
            .unwrap();
        let q = Quantization::new(0.0, 100.0, None, false).unwrap();
        assert_eq!(q.encode_grid(&grid), vec![0, 65534, FILL_CODE]);
    }
}
