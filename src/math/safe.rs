//! Guarded elementary functions.
//!
//! The log-log regression inside the Kelessidis calibrator evaluates
//! `ln(τ − τ0)` while τ0 is still being searched, so non-positive arguments
//! are expected along the way. Substituting a large finite sentinel keeps the
//! regression sums finite instead of poisoning them with NaN/−∞.

/// Sentinel standing in for the logarithm of a non-positive value.
pub const LOG_SENTINEL: f64 = -1e9;

/// `ln(v)` for positive `v`, [`LOG_SENTINEL`] otherwise.
pub fn ln_or_sentinel(v: f64) -> f64 {
    if v > 0.0 && v.is_finite() {
        v.ln()
    } else {
        LOG_SENTINEL
    }
}

/// `base^exp` with negative bases (from rounding noise) clamped to zero.
pub fn pow_clamped(base: f64, exp: f64) -> f64 {
    base.max(0.0).powf(exp)
}
