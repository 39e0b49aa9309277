//! Kelessidis/Zamora calibration.
//!
//! The yield stress τ0 is found as the stationary point of the profile
//! chi-square: at each trial τ0, K and n are refit by a log-log linear
//! regression of `ln(τ − τ0)` on `ln γ̇`, and the derivative d(chi²)/d(τ0) is
//! taken by central finite difference (a one-sided difference biases the
//! stationary point by half the step). A secant step on that derivative
//! drives τ0 toward the stationarity condition.
//!
//! Guardrails:
//! - τ0 never exceeds 0.99 × the minimum observed stress (keeps the yield
//!   stress physically below the data).
//! - `ln(τ − τ0)` for non-positive arguments takes the finite log sentinel so
//!   the regression sums stay finite.
//! - the iteration cap is a hard stop, not an error; the last iterate is
//!   accepted as-is with `converged = false`.

use crate::domain::{Calibration, ModelKind, Rheogram, YplModel};
use crate::error::FitError;
use crate::math::compare;
use crate::math::regression::{linear_regression, Line};
use crate::math::safe::ln_or_sentinel;
use crate::models::chi_square_uniform;

/// Hard stop for the τ0 search.
const MAX_ITERATIONS: usize = 50;

/// Convergence tolerance on |d(chi²)/d(τ0)|.
const DERIVATIVE_TOL: f64 = 1e-6;

/// Distinctness tolerance for shear rates (1/s).
const RATE_EPS: f64 = 1e-6;

/// τ0 stays below this fraction of the minimum observed stress.
const TAU0_CEILING_FRACTION: f64 = 0.99;

/// Calibrate by the Kelessidis/Zamora method.
pub fn fit_kelessidis(rheogram: &Rheogram, kind: ModelKind) -> Result<Calibration, FitError> {
    let rates = rheogram.shear_rates();
    let stresses = rheogram.shear_stresses();
    if rates.len() < 3 {
        return Err(FitError::InsufficientData {
            needed: 3,
            got: rates.len(),
        });
    }

    let sigma = rheogram.sigma();

    // The two smallest distinct shear rates anchor the initial τ0 guess.
    let i0 = argmin(&rates);
    let min_rate = rates[i0];
    let i1 = rates
        .iter()
        .enumerate()
        .filter(|&(_, &r)| compare::gt(r, min_rate, RATE_EPS))
        .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .ok_or(FitError::InsufficientData {
            needed: 2,
            got: 1,
        })?;

    let min_stress = stresses.iter().copied().fold(f64::INFINITY, f64::min);
    let tau0_ceiling = TAU0_CEILING_FRACTION * min_stress;

    // Initial τ0: the line through the two lowest-rate points, extrapolated
    // to γ̇ = 0.
    let slope = (stresses[i1] - stresses[i0]) / (rates[i1] - rates[i0]);
    let mut tau0 = (stresses[i0] - slope * rates[i0]).min(tau0_ceiling);

    let mut iterations = 0;
    let mut converged = false;
    while iterations < MAX_ITERATIONS {
        iterations += 1;

        let h = profile_derivative(&rates, &stresses, sigma, tau0)
            .ok_or(FitError::Degenerate {
                what: "Kelessidis chi-square derivative",
            })?;
        if compare::lt(h.abs(), DERIVATIVE_TOL, 0.0) {
            converged = true;
            break;
        }

        // Secant estimate of h'(τ0) with a 0.1% step.
        let step = (1e-3 * tau0.abs()).max(1e-6);
        let h_step = profile_derivative(&rates, &stresses, sigma, tau0 + step)
            .ok_or(FitError::Degenerate {
                what: "Kelessidis chi-square derivative",
            })?;
        let dh = (h_step - h) / step;
        if !dh.is_finite() || compare::eq(dh, 0.0, f64::MIN_POSITIVE) {
            break;
        }

        tau0 = (tau0 - h / dh).min(tau0_ceiling);
    }

    let (line, chi) = profile_fit(&rates, &stresses, sigma, tau0).ok_or(FitError::Degenerate {
        what: "Kelessidis final regression",
    })?;

    let mut model = YplModel {
        tau0,
        k: line.intercept.exp(),
        n: line.slope,
    };
    if !model.is_finite() || !chi.is_finite() {
        return Err(FitError::Degenerate {
            what: "Kelessidis fitted parameters",
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

/// Log-log regression and chi-square at a fixed τ0.
///
/// The regression of `ln(τ − τ0)` on `ln γ̇` yields `intercept = ln K` and
/// `slope = n`.
fn profile_fit(rates: &[f64], stresses: &[f64], sigma: f64, tau0: f64) -> Option<(Line, f64)> {
    let points: Vec<(f64, f64)> = rates
        .iter()
        .zip(stresses)
        .map(|(&r, &s)| (ln_or_sentinel(r), ln_or_sentinel(s - tau0)))
        .collect();
    let line = linear_regression(&points)?;

    let model = YplModel {
        tau0,
        k: line.intercept.exp(),
        n: line.slope,
    };
    let chi = chi_square_uniform(rates, stresses, sigma, &model)?;
    Some((line, chi))
}

/// Central-difference d(chi²)/d(τ0) of the profile chi-square.
fn profile_derivative(rates: &[f64], stresses: &[f64], sigma: f64, tau0: f64) -> Option<f64> {
    let delta = (1e-3 * tau0.abs()).max(1e-3);
    let (_, chi_above) = profile_fit(rates, stresses, sigma, tau0 + delta)?;
    let (_, chi_below) = profile_fit(rates, stresses, sigma, tau0 - delta)?;
    let h = (chi_above - chi_below) / (2.0 * delta);
    h.is_finite().then_some(h)
}

fn argmin(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v < values[best] {
            best = i;
        }
    }
    best
}
