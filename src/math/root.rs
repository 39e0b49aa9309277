//! Scalar root-finding kernels.
//!
//! The calibrators and the correction engine all solve 1-D equations whose
//! derivatives are only available numerically, so both solvers here use
//! finite-difference slopes and hard iteration caps. A cap overrun is not an
//! error: the last iterate is returned as best-effort with `converged = false`
//! and the caller decides whether that is acceptable.

use crate::math::compare;

/// Outcome of a scalar root search.
#[derive(Debug, Clone, Copy)]
pub struct RootSolve {
    /// Last iterate (the root when `converged`).
    pub root: f64,
    /// Residual `f(root)` at the last iterate.
    pub residual: f64,
    /// Iterations actually performed.
    pub iterations: usize,
    /// Whether `|residual| < tol` was reached within the cap.
    pub converged: bool,
}

/// Newton-Raphson with a finite-difference derivative.
///
/// The derivative step is `rel_step` relative to the current iterate
/// (floored so an iterate of exactly zero still gets a usable step).
pub fn newton_raphson(
    f: impl Fn(f64) -> f64,
    x0: f64,
    rel_step: f64,
    tol: f64,
    max_iter: usize,
) -> RootSolve {
    let mut x = x0;
    let mut fx = f(x);
    let mut iterations = 0;

    while fx.is_finite() && fx.abs() >= tol && iterations < max_iter {
        let h = (x.abs() * rel_step).max(rel_step * rel_step);
        let slope = (f(x + h) - fx) / h;
        if !slope.is_finite() || compare::eq(slope, 0.0, f64::MIN_POSITIVE) {
            // Flat or broken slope: stop with the best iterate so far.
            break;
        }
        let dx = fx / slope;
        x -= dx;
        fx = f(x);
        iterations += 1;

        // Stagnation at machine precision: further iterations cannot move x.
        if dx.abs() <= f64::EPSILON * x.abs().max(1.0) {
            break;
        }
    }

    RootSolve {
        root: x,
        residual: fx,
        iterations,
        converged: fx.is_finite() && fx.abs() < tol,
    }
}

/// Bisection on `[lo, hi]`.
///
/// Returns `None` when `f` does not change sign over the bracket. Stops on
/// residual tolerance or when the bracket collapses; the iteration cap makes
/// the result best-effort like the Newton-Raphson kernel.
pub fn bisection(
    f: impl Fn(f64) -> f64,
    lo: f64,
    hi: f64,
    tol: f64,
    max_iter: usize,
) -> Option<RootSolve> {
    let f_lo = f(lo);
    let f_hi = f(hi);
    if !(f_lo.is_finite() && f_hi.is_finite()) || f_lo * f_hi > 0.0 {
        return None;
    }

    let (mut a, mut b) = (lo, hi);
    let mut f_a = f_lo;
    let mut mid = 0.5 * (a + b);
    let mut f_mid = f(mid);
    let mut iterations = 0;

    let collapsed =
        |a: f64, b: f64, mid: f64| (b - a).abs() <= f64::EPSILON * mid.abs().max(1.0);

    while f_mid.abs() >= tol && !collapsed(a, b, mid) && iterations < max_iter {
        if f_a * f_mid <= 0.0 {
            b = mid;
        } else {
            a = mid;
            f_a = f_mid;
        }
        mid = 0.5 * (a + b);
        f_mid = f(mid);
        iterations += 1;
    }

    // A collapsed bracket pins the root to machine precision even when the
    // residual never drops below `tol` (its scale is the caller's business).
    Some(RootSolve {
        root: mid,
        residual: f_mid,
        iterations,
        converged: f_mid.is_finite() && (f_mid.abs() < tol || collapsed(a, b, mid)),
    })
}
