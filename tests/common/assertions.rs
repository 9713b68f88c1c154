//! Assertion utilities for testing.
//!
//! Helpers for floating-point comparisons on regridded fields.

use ndarray::Array2;

/// Default epsilon for floating-point comparisons
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// Assert that two floating-point values are approximately equal.
///
/// # Panics
///
/// Panics if the absolute difference between `actual` and `expected` is greater than `epsilon`.
pub fn assert_approx_eq(actual: f64, expected: f64, epsilon: Option<f64>) {
    let epsilon = epsilon.unwrap_or(DEFAULT_EPSILON);
    let diff = (actual - expected).abs();

    assert!(
        diff <= epsilon,
        "Values not approximately equal: actual = {}, expected = {}, diff = {}, epsilon = {}",
        actual,
        expected,
        diff,
        epsilon
    );
}

/// Assert that two arrays are identical bit for bit, NaN included.
pub fn assert_bitwise_eq(actual: &Array2<f64>, expected: &Array2<f64>) {
    assert_eq!(actual.dim(), expected.dim(), "Array shapes differ");
    for ((index, a), e) in actual.indexed_iter().zip(expected.iter()) {
        assert_eq!(
            a.to_bits(),
            e.to_bits(),
            "Arrays differ at {:?}: actual = {}, expected = {}",
            index,
            a,
            e
        );
    }
}

/// Assert that every finite value of `field` lies within `[min, max]`.
pub fn assert_finite_values_in_range(field: &Array2<f64>, min: f64, max: f64) {
    for (index, &value) in field.indexed_iter() {
        if value.is_finite() {
            assert!(
                value >= min && value <= max,
                "Value at {:?} out of range: {} not in [{}, {}]",
                index,
                value,
                min,
                max
            );
        }
    }
}
