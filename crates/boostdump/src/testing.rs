//! Testing utilities for boostdump.
//!
//! Assertion helpers shared by unit tests, integration tests and benches.
//!
//! ```
//! use boostdump::testing::{assert_slice_approx_eq, DEFAULT_TOLERANCE};
//!
//! assert_slice_approx_eq(&[0.5, 0.25], &[0.500001, 0.25], DEFAULT_TOLERANCE, "probs");
//! ```

use approx::AbsDiffEq;
use ndarray::ArrayView2;

// =============================================================================
// Constants
// =============================================================================

/// Default tolerance for floating point comparisons.
/// This is appropriate for most predictions where values are O(1).
pub const DEFAULT_TOLERANCE: f32 = 1e-5;

/// Same tolerance as f64 for compatibility with test expected values.
pub const DEFAULT_TOLERANCE_F64: f64 = 1e-5;

// =============================================================================
// Floating Point Assertions
// =============================================================================

/// Assert that two slices of f32 values are approximately equal element-wise.
///
/// # Panics
///
/// Panics if lengths differ or any element differs by more than tolerance.
pub fn assert_slice_approx_eq(actual: &[f32], expected: &[f32], tolerance: f32, context: &str) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "{context}: length mismatch - got {}, expected {}",
        actual.len(),
        expected.len()
    );

    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert!(
            a.abs_diff_eq(e, tolerance),
            "{context}[{i}]: {a} != {e} (diff={}, tolerance={tolerance})",
            (a - e).abs()
        );
    }
}

/// Assert that f32 predictions match f64 expected values stored in fixtures.
pub fn assert_slice_approx_eq_f64(actual: &[f32], expected: &[f64], tolerance: f64, context: &str) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "{context}: length mismatch - got {}, expected {}",
        actual.len(),
        expected.len()
    );

    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        let diff = (*a as f64 - *e).abs();
        assert!(
            diff <= tolerance,
            "{context}[{i}]: {a} != {e} (diff={diff}, tolerance={tolerance})"
        );
    }
}

// =============================================================================
// Batch Assertions
// =============================================================================

/// Git-style listing of the rows that differ: `-` expected, `+` actual.
fn diff_rows(actual: ArrayView2<f32>, expected: ArrayView2<f32>, epsilon: f32) -> String {
    let mut result = format!("Shape: {:?}\nEpsilon: {epsilon:.0e}\n\n", actual.shape());

    for (i, (act_row, exp_row)) in actual.rows().into_iter().zip(expected.rows()).enumerate() {
        let row_differs = act_row
            .iter()
            .zip(exp_row.iter())
            .any(|(a, e)| !a.abs_diff_eq(e, epsilon));
        if !row_differs {
            continue;
        }

        result.push_str(&format!("[{i:3}] -"));
        for val in exp_row {
            result.push_str(&format!(" {val:>12.6}"));
        }
        result.push_str("  (expected)\n      +");
        for val in act_row {
            result.push_str(&format!(" {val:>12.6}"));
        }
        result.push_str("  (actual)\n");
    }

    result
}

/// Assert that two `[n_rows, n_groups]` prediction matrices match.
///
/// # Panics
///
/// Panics if shapes differ or if any value differs by more than epsilon.
pub fn assert_batch_approx_eq(actual: ArrayView2<f32>, expected: ArrayView2<f32>, epsilon: f32, context: &str) {
    if actual.shape() != expected.shape() {
        panic!(
            "\n{context}: shape mismatch\n- {:?}  (expected)\n+ {:?}  (actual)\n",
            expected.shape(),
            actual.shape()
        );
    }

    if !actual.abs_diff_eq(&expected, epsilon) {
        let diff_count = actual
            .iter()
            .zip(expected.iter())
            .filter(|(a, e)| !a.abs_diff_eq(e, epsilon))
            .count();
        let total = actual.len();
        panic!(
            "\n{context}: {diff_count}/{total} values differ\n\n{}",
            diff_rows(actual, expected, epsilon)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn slices_within_tolerance_pass() {
        assert_slice_approx_eq(&[1.0, 2.0], &[1.000001, 2.0], DEFAULT_TOLERANCE, "ok");
        assert_slice_approx_eq_f64(&[0.1], &[0.1], DEFAULT_TOLERANCE_F64, "ok");
    }

    #[test]
    #[should_panic(expected = "length mismatch")]
    fn slice_length_mismatch_panics() {
        assert_slice_approx_eq(&[1.0], &[1.0, 2.0], DEFAULT_TOLERANCE, "len");
    }

    #[test]
    #[should_panic(expected = "1/4 values differ")]
    fn batch_mismatch_reports_count() {
        let a = array![[1.0f32, 2.0], [3.0, 4.0]];
        let b = array![[1.0f32, 2.0], [3.0, 4.5]];
        assert_batch_approx_eq(a.view(), b.view(), DEFAULT_TOLERANCE, "batch");
    }
}
