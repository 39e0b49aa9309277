//! Mullineux calibration.
//!
//! With x = γ̇ⁿ the YPL law is linear in (τ0, K), so the least-squares
//! stationarity conditions in τ0, K, and n reduce to requiring that the
//! augmented 3×3 system
//!
//! ```text
//! | Σ1        Σx         Στ        |
//! | Σx        Σx²        Στx       |
//! | Σx·lnγ̇   Σx²·lnγ̇   Στx·lnγ̇  |
//! ```
//!
//! be singular. The flow index n is therefore the root of that determinant;
//! once n is fixed, τ0 and K come from a plain linear regression of τ on γ̇ⁿ
//! with no further iteration.
//!
//! The raw determinant scales with high powers of the shear rates, so a fixed
//! residual tolerance would be unit-dependent; the objective is normalized by
//! the Hadamard bound (the product of row norms) for diagnostics, and
//! convergence is judged on the Newton step |Δn| instead of the residual. The
//! root location is unchanged by the normalization.

use nalgebra::Matrix3;

use crate::domain::{Calibration, ModelKind, Rheogram, YplModel};
use crate::error::FitError;
use crate::math::compare;
use crate::math::regression::linear_regression;
use crate::math::root::{bisection, RootSolve};
use crate::models::chi_square_uniform;

/// Hard stop for the n search.
const MAX_ITERATIONS: usize = 50;

/// Convergence tolerance on the Newton step |Δn|.
const STEP_TOL: f64 = 1e-5;

/// Newton-Raphson starting point and finite-difference step ratio.
const N_INITIAL: f64 = 1.0;
const N_REL_STEP: f64 = 1e-3;

/// Flow indices outside this range are treated as divergence of the search.
const N_RANGE: (f64, f64) = (1e-3, 10.0);

/// Bisection bracket used when Newton-Raphson fails.
const N_BRACKET: (f64, f64) = (0.01, 1.0);

/// Calibrate by the Mullineux method.
pub fn fit_mullineux(rheogram: &Rheogram, kind: ModelKind) -> Result<Calibration, FitError> {
    let rates = rheogram.shear_rates();
    let stresses = rheogram.shear_stresses();
    if rates.len() < 3 {
        return Err(FitError::InsufficientData {
            needed: 3,
            got: rates.len(),
        });
    }

    let objective = |n: f64| stationarity_determinant(&rates, &stresses, n);

    let newton = newton_flow_index(&objective);
    let (n, iterations, converged) = if newton.converged {
        (newton.root, newton.iterations, true)
    } else {
        // Fall back to bisection, which only applies when the objective
        // changes sign over the bracket. Tolerance 0 runs the bracket down to
        // collapse: the determinant residual has no scale a fixed tolerance
        // could be checked against.
        match bisection(&objective, N_BRACKET.0, N_BRACKET.1, 0.0, 2 * MAX_ITERATIONS) {
            Some(b) if b.converged => (b.root, newton.iterations + b.iterations, true),
            Some(b) => (b.root, newton.iterations + b.iterations, false),
            None => {
                return Err(FitError::NonConvergent {
                    what: "Mullineux flow-index objective",
                    iterations: newton.iterations,
                    residual: newton.residual,
                })
            }
        }
    };

    // τ on γ̇ⁿ is linear once n is fixed.
    let points: Vec<(f64, f64)> = rates
        .iter()
        .zip(&stresses)
        .map(|(&r, &s)| (pow_or_zero(r, n), s))
        .collect();
    let line = linear_regression(&points).ok_or(FitError::Degenerate {
        what: "Mullineux parameter regression",
    })?;

    let mut model = YplModel {
        tau0: line.intercept,
        k: line.slope,
        n,
    };
    let chi = chi_square_uniform(&rates, &stresses, rheogram.sigma(), &model)
        .ok_or(FitError::Degenerate {
            what: "Mullineux chi-square",
        })?;
    if !model.is_finite() {
        return Err(FitError::Degenerate {
            what: "Mullineux fitted parameters",
        });
    }

    model.constrain(kind);
    Ok(Calibration {
        model,
        chi_square: chi,
        iterations,
        converged,
    })
}

/// Newton-Raphson on F(n) from n = 1, converging on the step size.
///
/// The determinant residual has no natural scale (its rows are nearly
/// collinear for realistic rheograms), so |Δn| is the meaningful stopping
/// criterion; leaving [`N_RANGE`] or a flat slope counts as failure and
/// triggers the bisection fallback.
fn newton_flow_index(objective: impl Fn(f64) -> f64) -> RootSolve {
    let mut n = N_INITIAL;
    let mut f_n = objective(n);
    let mut iterations = 0;
    let mut converged = false;

    while iterations < MAX_ITERATIONS {
        if !f_n.is_finite() || !(N_RANGE.0..=N_RANGE.1).contains(&n) {
            break;
        }

        let h = (n.abs() * N_REL_STEP).max(N_REL_STEP * N_REL_STEP);
        let slope = (objective(n + h) - f_n) / h;
        if !slope.is_finite() || compare::eq(slope, 0.0, f64::MIN_POSITIVE) {
            break;
        }

        let dn = f_n / slope;
        n -= dn;
        f_n = objective(n);
        iterations += 1;

        if dn.abs() < STEP_TOL {
            converged = f_n.is_finite() && (N_RANGE.0..=N_RANGE.1).contains(&n);
            break;
        }
    }

    RootSolve {
        root: n,
        residual: f_n,
        iterations,
        converged,
    }
}

/// The normalized stationarity determinant F(n).
fn stationarity_determinant(rates: &[f64], stresses: &[f64], n: f64) -> f64 {
    let count = rates.len() as f64;
    let (mut sx, mut sxx, mut st, mut stx) = (0.0, 0.0, 0.0, 0.0);
    let (mut sxl, mut sxxl, mut stxl) = (0.0, 0.0, 0.0);

    for (&r, &tau) in rates.iter().zip(stresses) {
        let x = pow_or_zero(r, n);
        // γ̇ⁿ·ln γ̇ → 0 as γ̇ → 0 for n > 0, so zero-rate points drop out of
        // the log-weighted sums instead of producing 0·(−∞).
        let xl = if r > 0.0 { x * r.ln() } else { 0.0 };

        sx += x;
        sxx += x * x;
        st += tau;
        stx += tau * x;
        sxl += xl;
        sxxl += x * xl;
        stxl += tau * xl;
    }

    let m = Matrix3::new(
        count, sx, st, //
        sx, sxx, stx, //
        sxl, sxxl, stxl,
    );

    let norm = row_norm(count, sx, st) * row_norm(sx, sxx, stx) * row_norm(sxl, sxxl, stxl);
    if norm > 0.0 && norm.is_finite() {
        m.determinant() / norm
    } else {
        f64::NAN
    }
}

fn row_norm(a: f64, b: f64, c: f64) -> f64 {
    (a * a + b * b + c * c).sqrt()
}

fn pow_or_zero(rate: f64, n: f64) -> f64 {
    if rate > 0.0 {
        rate.powf(n)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Measurement;
    use crate::models::StressModel;

    fn synthetic(model: &YplModel, rates: &[f64], sigma: Option<f64>) -> Rheogram {
        let measurements = rates
            .iter()
            .map(|&r| Measurement {
                shear_rate: r,
                shear_stress: model.stress(r),
            })
            .collect();
        Rheogram::new(measurements, sigma)
    }

    const RATES: [f64; 8] = [5.1, 10.2, 170.3, 340.7, 511.0, 681.3, 851.7, 1022.0];

    #[test]
    fn recovers_ypl_parameters_from_exact_data() {
        let truth = YplModel {
            tau0: 5.0,
            k: 0.75,
            n: 0.65,
        };
        let rheogram = synthetic(&truth, &RATES, Some(0.01));
        let cal = fit_mullineux(&rheogram, ModelKind::YieldPowerLaw).unwrap();

        assert!((cal.model.tau0 - truth.tau0).abs() / truth.tau0 < 1e-4);
        assert!((cal.model.k - truth.k).abs() / truth.k < 1e-4);
        assert!((cal.model.n - truth.n).abs() / truth.n < 1e-4);
        assert!(cal.chi_square >= 0.0);
        assert!(cal.chi_square < 1e-6, "chi²={}", cal.chi_square);
        assert!(cal.iterations <= 150);
    }

    #[test]
    fn recovers_a_bingham_fluid() {
        // n = 1 exactly: the Newton-Raphson start point is already the root.
        let truth = YplModel {
            tau0: 8.0,
            k: 0.03,
            n: 1.0,
        };
        let rheogram = synthetic(&truth, &RATES, Some(0.01));
        let cal = fit_mullineux(&rheogram, ModelKind::YieldPowerLaw).unwrap();
        assert!((cal.model.tau0 - truth.tau0).abs() < 1e-3);
        assert!((cal.model.n - truth.n).abs() < 1e-4);
    }

    #[test]
    fn rejects_fewer_than_three_measurements() {
        for count in 0..3 {
            let truth = YplModel::default();
            let rheogram = synthetic(&truth, &RATES[..count], Some(0.01));
            let err = fit_mullineux(&rheogram, ModelKind::YieldPowerLaw).unwrap_err();
            assert!(matches!(err, FitError::InsufficientData { .. }));
        }
    }

    #[test]
    fn zero_shear_rate_points_do_not_poison_the_sums() {
        let truth = YplModel {
            tau0: 3.0,
            k: 0.5,
            n: 0.7,
        };
        let mut rates = vec![0.0];
        rates.extend_from_slice(&RATES);
        let rheogram = synthetic(&truth, &rates, Some(0.01));
        let cal = fit_mullineux(&rheogram, ModelKind::YieldPowerLaw).unwrap();
        assert!(cal.model.is_finite());
        assert!(cal.chi_square.is_finite());
    }

    #[test]
    fn constrain_leaves_k_and_chi_square_stale() {
        // Documents the historical behavior: forcing τ0 = 0 (or n = 1) after
        // the fit does not refit K or recompute chi², so those outputs are
        // inconsistent with the constrained model.
        let truth = YplModel {
            tau0: 5.0,
            k: 0.75,
            n: 0.65,
        };
        let rheogram = synthetic(&truth, &RATES, Some(0.01));
        let ypl = fit_mullineux(&rheogram, ModelKind::YieldPowerLaw).unwrap();
        let newt = fit_mullineux(&rheogram, ModelKind::Newtonian).unwrap();

        assert_eq!(newt.model.tau0, 0.0);
        assert_eq!(newt.model.n, 1.0);
        assert_eq!(newt.model.k, ypl.model.k);
        assert_eq!(newt.chi_square, ypl.chi_square);

        // The stale chi² does not score the constrained model.
        let rates = rheogram.shear_rates();
        let stresses = rheogram.shear_stresses();
        let rescored =
            chi_square_uniform(&rates, &stresses, rheogram.sigma(), &newt.model).unwrap();
        assert!((rescored - newt.chi_square).abs() > 1.0);
    }

    #[test]
    fn determinant_vanishes_at_the_true_flow_index() {
        let truth = YplModel {
            tau0: 5.0,
            k: 0.75,
            n: 0.65,
        };
        let rheogram = synthetic(&truth, &RATES, None);
        let rates = rheogram.shear_rates();
        let stresses = rheogram.shear_stresses();
        let at_truth = stationarity_determinant(&rates, &stresses, 0.65);
        let away = stationarity_determinant(&rates, &stresses, 0.9);
        assert!(at_truth.abs() < 1e-9, "F(n*)={at_truth}");
        assert!(away.abs() > at_truth.abs());
    }
}
