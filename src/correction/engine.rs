//! Iterative shear-rate correction of a full rheogram.
//!
//! The measured shear rates assume a Newtonian fluid, but the correction
//! itself needs a calibrated model, which in turn should be fit against the
//! corrected rates. The engine closes that loop as a fixed point:
//!
//! 1. recover each measurement's rotational velocity from its Newtonian rate,
//! 2. correct every rate under the current model (in parallel),
//! 3. refit the model on the corrected rheogram (Mullineux),
//! 4. repeat until the fit chi-square stops moving.
//!
//! The refit always estimates the full Yield-Power-Law model; constraining to
//! a sub-model is a presentation concern that would bias the correction.

use rayon::prelude::*;

use crate::domain::{Calibration, CorrectedPoint, CouetteGeometry, Measurement, ModelKind, Rheogram, YplModel};
use crate::error::FitError;
use crate::fit::fit_mullineux;
use crate::math::compare;

use super::couette::{self, ShearRateSolve};

/// Hard stop for the correct-then-refit loop.
pub const MAX_OUTER_ITERATIONS: usize = 40;

/// Convergence tolerance on the change of the fit chi-square between passes.
pub const CHI_SQUARE_TOL: f64 = 1e-5;

/// A corrected rheogram with the model that produced it.
#[derive(Debug, Clone)]
pub struct Correction {
    /// Per-measurement detail, in input order.
    pub points: Vec<CorrectedPoint>,
    /// The corrected rheogram (same stresses, corrected rates).
    pub rheogram: Rheogram,
    /// The final fit on the corrected rheogram.
    pub calibration: Calibration,
    /// Outer correct-then-refit passes performed.
    pub iterations: usize,
    /// Whether the chi-square settled within the pass cap.
    pub converged: bool,
    /// Whether every per-point shear-rate solve of the final pass converged.
    pub shear_solves_converged: bool,
}

/// Correct a rheogram measured in the given Couette geometry.
///
/// Starts from the identity model (Newtonian, K = 1), under which the first
/// pass reproduces the measured rates; every later pass tightens the model
/// and the rates together.
pub fn correct_rheogram(
    rheogram: &Rheogram,
    geometry: &CouetteGeometry,
) -> Result<Correction, FitError> {
    if rheogram.len() < 3 {
        return Err(FitError::InsufficientData {
            needed: 3,
            got: rheogram.len(),
        });
    }

    let kappa = geometry.kappa();
    let newtonian_rates = rheogram.shear_rates();
    let stresses = rheogram.shear_stresses();
    let omegas: Vec<f64> = newtonian_rates
        .iter()
        .map(|&rate| couette::newtonian_rotational_velocity(rate, kappa))
        .collect();

    let mut model = YplModel::default();
    let mut previous_chi: Option<f64> = None;
    let mut iterations = 0;
    let mut converged = false;
    let mut solves: Vec<ShearRateSolve> = Vec::new();
    let mut calibration: Option<Calibration> = None;

    while iterations < MAX_OUTER_ITERATIONS {
        iterations += 1;

        solves = omegas
            .par_iter()
            .map(|&omega| couette::shear_rate(&model, kappa, omega))
            .collect();

        let corrected = Rheogram::new(
            solves
                .iter()
                .zip(&stresses)
                .map(|(solve, &stress)| Measurement {
                    shear_rate: solve.shear_rate,
                    shear_stress: stress,
                })
                .collect(),
            rheogram.shear_stress_std_dev,
        );

        let fit = fit_mullineux(&corrected, ModelKind::YieldPowerLaw)?;
        let chi = fit.chi_square;
        model = fit.model;
        calibration = Some(fit);

        if let Some(previous) = previous_chi {
            if compare::lt((chi - previous).abs(), CHI_SQUARE_TOL, 0.0) {
                converged = true;
                break;
            }
        }
        previous_chi = Some(chi);
    }

    // The cap is at least one, so a calibration always exists here.
    let calibration = calibration.ok_or(FitError::Degenerate {
        what: "correction loop",
    })?;
    let shear_solves_converged = solves.iter().all(|solve| solve.converged);

    let points: Vec<CorrectedPoint> = omegas
        .iter()
        .zip(&newtonian_rates)
        .zip(&solves)
        .zip(&stresses)
        .map(|(((&omega, &newtonian), solve), &stress)| CorrectedPoint {
            rotational_velocity: omega,
            newtonian_shear_rate: newtonian,
            corrected_shear_rate: solve.shear_rate,
            shear_stress: stress,
        })
        .collect();
    let corrected_rheogram = Rheogram::new(
        points
            .iter()
            .map(|p| Measurement {
                shear_rate: p.corrected_shear_rate,
                shear_stress: p.shear_stress,
            })
            .collect(),
        rheogram.shear_stress_std_dev,
    );

    Ok(Correction {
        points,
        rheogram: corrected_rheogram,
        calibration,
        iterations,
        converged,
        shear_solves_converged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StressModel;

    const KAPPA_R1: f64 = 1.7245;
    const KAPPA_R2: f64 = 1.9557;
    const NEWTONIAN_RATES: [f64; 8] = [5.1, 10.2, 170.3, 340.7, 511.0, 681.3, 851.7, 1022.0];

    fn geometry() -> CouetteGeometry {
        CouetteGeometry::new(KAPPA_R1, KAPPA_R2).unwrap()
    }

    /// Synthesize measurements the way a viscometer would take them: the true
    /// model sets the stress at the true (corrected) shear rate, while the
    /// instrument reports the Newtonian rate for the same Ω.
    fn measured(truth: &YplModel) -> Rheogram {
        let kappa = geometry().kappa();
        let measurements = NEWTONIAN_RATES
            .iter()
            .map(|&newtonian| {
                let omega = couette::newtonian_rotational_velocity(newtonian, kappa);
                let true_rate = couette::shear_rate(truth, kappa, omega).shear_rate;
                Measurement {
                    shear_rate: newtonian,
                    shear_stress: truth.stress(true_rate),
                }
            })
            .collect();
        Rheogram::new(measurements, Some(0.01))
    }

    #[test]
    fn newtonian_data_is_a_fixed_point_of_the_correction() {
        let truth = YplModel {
            tau0: 0.0,
            k: 0.05,
            n: 1.0,
        };
        let rheogram = measured(&truth);
        let correction = correct_rheogram(&rheogram, &geometry()).unwrap();

        assert!(correction.converged);
        assert!(correction.iterations <= 3);
        for point in &correction.points {
            assert!(
                (point.corrected_shear_rate - point.newtonian_shear_rate).abs()
                    / point.newtonian_shear_rate
                    < 1e-9
            );
        }
    }

    #[test]
    fn recovers_the_true_model_from_couette_measurements() {
        let truth = YplModel {
            tau0: 5.0,
            k: 0.75,
            n: 0.65,
        };
        let rheogram = measured(&truth);
        let correction = correct_rheogram(&rheogram, &geometry()).unwrap();

        assert!(correction.converged, "{correction:?}");
        assert!(correction.iterations <= MAX_OUTER_ITERATIONS);
        assert!(correction.shear_solves_converged);

        let model = correction.calibration.model;
        assert!((model.tau0 - truth.tau0).abs() / truth.tau0 < 1e-3);
        assert!((model.k - truth.k).abs() / truth.k < 1e-3);
        assert!((model.n - truth.n).abs() / truth.n < 1e-3);
    }

    #[test]
    fn corrected_rates_exceed_newtonian_rates_for_a_yield_stress_fluid() {
        let truth = YplModel {
            tau0: 5.0,
            k: 0.75,
            n: 0.65,
        };
        let rheogram = measured(&truth);
        let correction = correct_rheogram(&rheogram, &geometry()).unwrap();
        for point in &correction.points {
            assert!(point.corrected_shear_rate > point.newtonian_shear_rate);
        }
    }

    #[test]
    fn rejects_fewer_than_three_measurements() {
        let rheogram = Rheogram::new(
            vec![
                Measurement {
                    shear_rate: 10.0,
                    shear_stress: 4.0,
                },
                Measurement {
                    shear_rate: 20.0,
                    shear_stress: 5.0,
                },
            ],
            None,
        );
        let err = correct_rheogram(&rheogram, &geometry()).unwrap_err();
        assert!(matches!(err, FitError::InsufficientData { .. }));
    }

    #[test]
    fn points_preserve_input_order_and_stresses() {
        let truth = YplModel {
            tau0: 3.0,
            k: 0.5,
            n: 0.8,
        };
        let rheogram = measured(&truth);
        let correction = correct_rheogram(&rheogram, &geometry()).unwrap();
        let stresses = rheogram.shear_stresses();
        assert_eq!(correction.points.len(), rheogram.len());
        for (point, (&newtonian, &stress)) in correction
            .points
            .iter()
            .zip(NEWTONIAN_RATES.iter().zip(&stresses))
        {
            assert_eq!(point.newtonian_shear_rate, newtonian);
            assert_eq!(point.shear_stress, stress);
        }
    }
}
