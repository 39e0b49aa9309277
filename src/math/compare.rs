//! Tolerance-aware floating-point comparisons.
//!
//! The fit and correction loops compare quantities that carry representational
//! noise from finite-difference derivatives and repeated integration. A bare
//! `==`/`<` makes those loops oscillate near their stopping conditions, so
//! every comparison goes through these predicates instead.
//!
//! Call sites pick the epsilon for the physical quantity at hand (1e-5 for
//! flow indices, 1e-6 for shear rates, 1e-8 for stresses); [`DEFAULT_EPS`]
//! covers generic values.

/// Generic comparison tolerance.
pub const DEFAULT_EPS: f64 = 1e-9;

/// `a == b` within `eps`. Two NaNs ("undefined") compare equal.
pub fn eq(a: f64, b: f64, eps: f64) -> bool {
    if a.is_nan() && b.is_nan() {
        return true;
    }
    (a - b).abs() < eps
}

/// `a > b` by more than `eps`.
pub fn gt(a: f64, b: f64, eps: f64) -> bool {
    a - eps > b
}

/// `a < b` by more than `eps`.
pub fn lt(a: f64, b: f64, eps: f64) -> bool {
    gt(b, a, eps)
}

/// `a >= b` within `eps`.
pub fn ge(a: f64, b: f64, eps: f64) -> bool {
    !lt(a, b, eps)
}

/// `a <= b` within `eps`.
pub fn le(a: f64, b: f64, eps: f64) -> bool {
    !gt(a, b, eps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eq_within_tolerance() {
        assert!(eq(1.0, 1.0 + 1e-10, DEFAULT_EPS));
        assert!(!eq(1.0, 1.0 + 1e-8, DEFAULT_EPS));
    }

    #[test]
    fn nan_compares_equal_to_nan() {
        assert!(eq(f64::NAN, f64::NAN, DEFAULT_EPS));
        assert!(!eq(f64::NAN, 0.0, DEFAULT_EPS));
    }

    #[test]
    fn strict_orderings_respect_epsilon() {
        assert!(gt(1.0, 0.5, DEFAULT_EPS));
        assert!(!gt(1.0, 1.0 - 1e-12, DEFAULT_EPS));
        assert!(lt(0.5, 1.0, DEFAULT_EPS));
        assert!(ge(1.0, 1.0 + 1e-12, DEFAULT_EPS));
        assert!(le(1.0, 1.0 - 1e-12, DEFAULT_EPS));
    }
}
