//! Shear-rate solvers for a concentric-cylinder (Couette) geometry.
//!
//! A narrow-gap viscometer reports the Newtonian shear rate, which is exact
//! only for a Newtonian fluid. For a Yield-Power-Law fluid the rate at the
//! inner cylinder follows from the momentum balance across the gap, which
//! splits into three regimes by rotational velocity Ω:
//!
//! - τ0 ≈ 0: closed forms (Newtonian or power-law), no iteration.
//! - Ω above the fully-sheared threshold Ω*: the whole gap flows; solve for
//!   the torque constant C in the gap-velocity integral.
//! - Ω at or below Ω*: an outer annulus moves as a rigid plug; solve for the
//!   plug radius R̃p instead.
//!
//! All integrals run over the normalized radius r̃ ∈ [κ, 1] with a fixed
//! trapezoid rule, so the two iterative branches cost a bounded number of
//! integrand evaluations per Newton step.

use crate::domain::YplModel;
use crate::math::compare;
use crate::math::integrate::trapezoid;
use crate::math::root::newton_raphson;
use crate::math::safe::pow_clamped;

/// Trapezoid subdivisions for the gap integrals.
pub const INTEGRATION_INTERVALS: usize = 100;

/// Tolerance for the τ0 ≈ 0 and n ≈ 1 regime tests.
const DEGENERACY_EPS: f64 = 1e-8;

/// Fully-sheared torque-constant search.
const C_REL_STEP: f64 = 1e-2;
const C_TOL: f64 = 1e-8;
const C_MAX_ITERATIONS: usize = 40;

/// Plug-radius search. The residual is an Ω in rad/s, so the tight tolerance
/// in practice means "iterate to machine precision"; the kernel stops on
/// stagnation rather than spinning against the cap.
const PLUG_REL_STEP: f64 = 1e-2;
const PLUG_TOL: f64 = 1e-16;
const PLUG_MAX_ITERATIONS: usize = 100;

/// Outcome of one shear-rate correction.
#[derive(Debug, Clone, Copy)]
pub struct ShearRateSolve {
    /// Shear rate at the inner cylinder (1/s).
    pub shear_rate: f64,
    /// Newton-Raphson iterations spent (0 for the closed-form branches).
    pub iterations: usize,
    pub converged: bool,
}

impl ShearRateSolve {
    fn closed_form(shear_rate: f64) -> Self {
        ShearRateSolve {
            shear_rate,
            iterations: 0,
            converged: true,
        }
    }
}

/// Newtonian shear rate at the inner cylinder, `2Ω / (1 − κ²)`.
pub fn newtonian_shear_rate(omega: f64, kappa: f64) -> f64 {
    2.0 * omega / (1.0 - kappa * kappa)
}

/// Inverse of [`newtonian_shear_rate`]: the Ω a viscometer was spinning at
/// when it reported `shear_rate`.
pub fn newtonian_rotational_velocity(shear_rate: f64, kappa: f64) -> f64 {
    shear_rate * (1.0 - kappa * kappa) / 2.0
}

/// Power-law shear rate at the inner cylinder, `(2Ω/n) / (1 − κ^(2/n))`.
pub fn power_law_shear_rate(omega: f64, kappa: f64, n: f64) -> f64 {
    (2.0 * omega / n) / (1.0 - kappa.powf(2.0 / n))
}

/// The fully-sheared threshold Ω*: the smallest rotational velocity at which
/// the stress exceeds τ0 everywhere in the gap.
///
/// `Ω* = (τ0/K)^(1/n) · ∫_κ¹ (1/r̃) (1/r̃² − 1)^(1/n) dr̃`
pub fn minimum_rotational_velocity(model: &YplModel, kappa: f64) -> f64 {
    let exponent = 1.0 / model.n;
    let scale = (model.tau0 / model.k).powf(exponent);
    scale
        * trapezoid(
            |r| pow_clamped(1.0 / (r * r) - 1.0, exponent) / r,
            kappa,
            1.0,
            INTEGRATION_INTERVALS,
        )
}

/// Shear rate at the inner cylinder for a rotational velocity Ω.
///
/// Dispatches on the model and flow regime; never fails. The iterative
/// branches return the last iterate with `converged = false` when the
/// Newton-Raphson cap is hit, and the caller decides what to do with that.
pub fn shear_rate(model: &YplModel, kappa: f64, omega: f64) -> ShearRateSolve {
    if omega <= 0.0 {
        return ShearRateSolve::closed_form(0.0);
    }
    if compare::eq(model.tau0, 0.0, DEGENERACY_EPS) {
        if compare::eq(model.n, 1.0, DEGENERACY_EPS) {
            return ShearRateSolve::closed_form(newtonian_shear_rate(omega, kappa));
        }
        return ShearRateSolve::closed_form(power_law_shear_rate(omega, kappa, model.n));
    }

    let threshold = minimum_rotational_velocity(model, kappa);
    if compare::gt(omega, threshold, compare::DEFAULT_EPS) {
        fully_sheared_shear_rate(model, kappa, omega)
    } else {
        plug_flow_shear_rate(model, kappa, omega)
    }
}

/// Fully-sheared regime: solve for the torque constant C in
/// `∫_κ¹ (1/r̃) ((C/r̃² − τ0)/K)^(1/n) dr̃ = Ω`, then evaluate the rate at the
/// inner cylinder as `((C/κ² − τ0)/K)^(1/n)`.
fn fully_sheared_shear_rate(model: &YplModel, kappa: f64, omega: f64) -> ShearRateSolve {
    let exponent = 1.0 / model.n;
    let gap_velocity = |c: f64| {
        trapezoid(
            |r| pow_clamped((c / (r * r) - model.tau0) / model.k, exponent) / r,
            kappa,
            1.0,
            INTEGRATION_INTERVALS,
        )
    };

    // Seed C from the power-law closed form: the wall stress it implies at
    // the inner cylinder, carried to the r̃ = 1 reference by κ².
    let rate_power_law = power_law_shear_rate(omega, kappa, model.n);
    let c0 = (model.tau0 + model.k * rate_power_law.powf(model.n)) * kappa * kappa;

    let solve = newton_raphson(
        |c| gap_velocity(c) - omega,
        c0,
        C_REL_STEP,
        C_TOL,
        C_MAX_ITERATIONS,
    );
    ShearRateSolve {
        shear_rate: pow_clamped(
            (solve.root / (kappa * kappa) - model.tau0) / model.k,
            exponent,
        ),
        iterations: solve.iterations,
        converged: solve.converged,
    }
}

/// Plug-flow regime: fluid beyond the plug radius R̃p rotates rigidly, so Ω
/// is carried entirely by the sheared annulus [κ, R̃p]:
///
/// `(τ0/K)^(1/n) · ∫_κ^R̃p (1/r̃) (R̃p²/r̃² − 1)^(1/n) dr̃ = Ω`
fn plug_flow_shear_rate(model: &YplModel, kappa: f64, omega: f64) -> ShearRateSolve {
    let exponent = 1.0 / model.n;
    let scale = (model.tau0 / model.k).powf(exponent);
    let gap_velocity = |plug: f64| {
        scale
            * trapezoid(
                |r| pow_clamped(plug * plug / (r * r) - 1.0, exponent) / r,
                kappa,
                plug,
                INTEGRATION_INTERVALS,
            )
    };

    // At R̃p = 1 the residual is Ω* − Ω ≥ 0, so the search starts on the
    // physical boundary and moves inward.
    let solve = newton_raphson(
        |plug| gap_velocity(plug) - omega,
        1.0,
        PLUG_REL_STEP,
        PLUG_TOL,
        PLUG_MAX_ITERATIONS,
    );
    let plug = solve.root.clamp(kappa, 1.0);
    ShearRateSolve {
        shear_rate: scale * pow_clamped(plug * plug / (kappa * kappa) - 1.0, exponent),
        iterations: solve.iterations,
        converged: solve.converged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KAPPA: f64 = 0.8818;

    fn ypl() -> YplModel {
        YplModel {
            tau0: 5.0,
            k: 0.75,
            n: 0.65,
        }
    }

    #[test]
    fn newtonian_model_reproduces_the_closed_form_exactly() {
        let model = YplModel {
            tau0: 0.0,
            k: 0.05,
            n: 1.0,
        };
        for omega in [0.1, 1.0, 10.0, 60.0] {
            let solve = shear_rate(&model, KAPPA, omega);
            assert_eq!(solve.shear_rate, newtonian_shear_rate(omega, KAPPA));
            assert_eq!(solve.iterations, 0);
            assert!(solve.converged);
        }
    }

    #[test]
    fn zero_yield_stress_routes_to_the_power_law_form() {
        let model = YplModel {
            tau0: 0.0,
            k: 0.4,
            n: 0.7,
        };
        let solve = shear_rate(&model, KAPPA, 10.0);
        assert_eq!(solve.shear_rate, power_law_shear_rate(10.0, KAPPA, 0.7));
        assert_eq!(solve.iterations, 0);
    }

    #[test]
    fn nonpositive_rotational_velocity_is_zero_rate() {
        let solve = shear_rate(&ypl(), KAPPA, 0.0);
        assert_eq!(solve.shear_rate, 0.0);
        assert!(solve.converged);
        assert_eq!(shear_rate(&ypl(), KAPPA, -1.0).shear_rate, 0.0);
    }

    #[test]
    fn fully_sheared_solver_converges_for_realistic_velocities() {
        let model = ypl();
        let threshold = minimum_rotational_velocity(&model, KAPPA);
        for newtonian in [10.0, 100.0, 500.0, 1022.0] {
            let omega = newtonian_rotational_velocity(newtonian, KAPPA);
            assert!(omega > threshold);
            let solve = shear_rate(&model, KAPPA, omega);
            assert!(solve.converged, "Ω={omega}: {solve:?}");
            assert!(solve.iterations <= C_MAX_ITERATIONS);
            // A yield-stress fluid shears faster at the wall than the
            // Newtonian estimate.
            assert!(solve.shear_rate > newtonian);
        }
    }

    #[test]
    fn plug_flow_solver_converges_below_the_threshold() {
        let model = ypl();
        let threshold = minimum_rotational_velocity(&model, KAPPA);
        let solve = shear_rate(&model, KAPPA, 0.1 * threshold);
        assert!(solve.converged, "{solve:?}");
        assert!(solve.shear_rate > 0.0);
        assert!(solve.iterations <= PLUG_MAX_ITERATIONS);
    }

    #[test]
    fn the_regimes_agree_at_the_threshold() {
        // Approaching Ω* from either side must give the same shear rate: the
        // plug radius reaches 1 exactly where the full gap starts to shear.
        let model = ypl();
        let threshold = minimum_rotational_velocity(&model, KAPPA);
        let below = shear_rate(&model, KAPPA, threshold);
        let above = shear_rate(&model, KAPPA, threshold * (1.0 + 1e-9));
        let gap = (above.shear_rate - below.shear_rate).abs() / below.shear_rate;
        assert!(gap < 1e-6, "relative jump {gap}");
    }

    #[test]
    fn shear_rate_is_monotone_in_rotational_velocity() {
        let model = ypl();
        let mut last = 0.0;
        for i in 1..=30 {
            let omega = 0.05 * i as f64;
            let rate = shear_rate(&model, KAPPA, omega).shear_rate;
            assert!(rate > last, "Ω={omega}: {rate} <= {last}");
            last = rate;
        }
    }
}
