//! Trapezoidal integration with a fixed interval count.
//!
//! The Couette gap-flow integrands are smooth on the annulus, so a plain
//! composite trapezoid with a bounded number of intervals is accurate enough
//! and, importantly, guarantees termination inside the Newton-Raphson loops
//! that evaluate these integrals many times.

/// Composite trapezoid of `f` over `[a, b]`.
///
/// Degenerate ranges (`b <= a`) integrate to zero, which is the limit the
/// plug-flow equation needs when the plug fills the whole gap.
pub fn trapezoid(f: impl Fn(f64) -> f64, a: f64, b: f64, intervals: usize) -> f64 {
    if b <= a || intervals == 0 {
        return 0.0;
    }

    let h = (b - a) / intervals as f64;
    let mut sum = 0.5 * (f(a) + f(b));
    for i in 1..intervals {
        sum += f(a + h * i as f64);
    }
    sum * h
}
