//! Tolerance-based assertions for floating-point results.
//!
//! Different partition counts and merge fanouts sum in different orders, so
//! results are compared relative to their magnitude rather than bit for bit.

use std::fmt::Debug;

/// Relative tolerance used across the crate's own tests.
pub const DEFAULT_REL_TOL: f64 = 1e-9;

/// `true` if `a` and `b` agree within `rel_tol` relative to the larger
/// magnitude, with an absolute floor of `rel_tol` near zero. Equal
/// infinities compare close.
#[must_use]
pub fn approx_eq(a: f64, b: f64, rel_tol: f64) -> bool {
    if a == b {
        return true;
    }
    if !a.is_finite() || !b.is_finite() {
        return false;
    }
    let scale = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= rel_tol * scale
}

/// Assert two values agree within `rel_tol`.
///
/// # Panics
///
/// Panics with both values if they differ.
///
/// # Example
///
/// ```
/// use ironstats::testing::assert_close;
///
/// assert_close(0.1 + 0.2, 0.3, 1e-12);
/// ```
pub fn assert_close(actual: f64, expected: f64, rel_tol: f64) {
    assert!(
        approx_eq(actual, expected, rel_tol),
        "Value mismatch:\n  Expected: {expected:?}\n  Actual: {actual:?}\n  Tolerance: {rel_tol:e}"
    );
}

/// Assert two slices agree element-wise within `rel_tol`.
///
/// # Panics
///
/// Panics if lengths differ or any element is out of tolerance.
pub fn assert_vec_close<A, E>(actual: A, expected: E, rel_tol: f64)
where
    A: AsRef<[f64]> + Debug,
    E: AsRef<[f64]> + Debug,
{
    let (a, e) = (actual.as_ref(), expected.as_ref());
    assert_eq!(
        a.len(),
        e.len(),
        "Collection length mismatch:\n  Expected length: {}\n  Actual length: {}\n  Expected: {expected:?}\n  Actual: {actual:?}",
        e.len(),
        a.len()
    );
    for (i, (x, y)) in a.iter().zip(e).enumerate() {
        assert!(
            approx_eq(*x, *y, rel_tol),
            "Collection mismatch at index {i}:\n  Expected: {y:?}\n  Actual: {x:?}\n  Full expected: {expected:?}\n  Full actual: {actual:?}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infinities_and_zero() {
        assert!(approx_eq(f64::INFINITY, f64::INFINITY, 1e-9));
        assert!(!approx_eq(f64::INFINITY, 1e300, 1e-9));
        assert!(approx_eq(0.0, 1e-12, 1e-9));
        assert!(!approx_eq(f64::NAN, f64::NAN, 1e-9));
    }

    #[test]
    #[should_panic(expected = "Collection mismatch at index 1")]
    fn vec_mismatch_names_index() {
        assert_vec_close([1.0, 2.0], [1.0, 2.5], 1e-9);
    }
}
