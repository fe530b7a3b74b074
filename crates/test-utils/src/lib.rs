//! Test support shared by the tiling, writer and orchestration crates.
//!
//! [`generators`] builds synthetic images and masks as plain row-major
//! vectors; [`fixtures`] holds named grids, sectors and product metadata
//! used across integration tests.

pub mod fixtures;
pub mod generators;

pub use fixtures::*;
pub use generators::*;

/// Asserts two numbers are within `epsilon` of each other.
///
/// Both sides are widened to `f64`, so `f32` values and integer literals
/// can be mixed freely:
///
/// ```
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(5000.2_f32, 5000, 0.5);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let (left, right, epsilon) = ($left as f64, $right as f64, $epsilon as f64);
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "values differ by more than {}: left = {}, right = {} (diff {})",
                epsilon, left, right, diff
            );
        }
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_approx_eq_within_epsilon() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(-5.5_f32, -5.500001_f32, 0.0001);
        assert_approx_eq!(0, 0.0, 0.0);
    }

    #[test]
    #[should_panic(expected = "values differ by more than")]
    fn test_approx_eq_outside_epsilon() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }
}
