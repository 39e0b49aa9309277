//! Formatted terminal output for calibration and correction runs.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::correction::Correction;
use crate::domain::{
    Calibration, CalibrationMethod, CouetteGeometry, Measurement, ModelKind, Rheogram,
};
use crate::io::ingest::IngestedData;
use crate::models::StressModel;

/// One residual row of the fit table.
#[derive(Debug, Clone, Copy)]
pub struct StressResidual {
    pub measurement: Measurement,
    pub stress_fit: f64,
    pub residual: f64,
}

/// Compute fitted stresses and residuals for each measurement.
pub fn compute_residuals(rheogram: &Rheogram, calibration: &Calibration) -> Vec<StressResidual> {
    rheogram
        .measurements
        .iter()
        .map(|&measurement| {
            let stress_fit = calibration.model.stress(measurement.shear_rate);
            StressResidual {
                measurement,
                stress_fit,
                residual: measurement.shear_stress - stress_fit,
            }
        })
        .collect()
}

/// Format the calibration run summary (dataset + model + diagnostics).
pub fn format_calibration_summary(
    ingest: &IngestedData,
    calibration: &Calibration,
    method: CalibrationMethod,
    kind: ModelKind,
) -> String {
    let mut out = String::new();

    out.push_str("=== ypl - Yield-Power-Law Calibration ===\n");
    out.push_str(&format!("Method: {}\n", method.display_name()));
    out.push_str(&format!("Model:  {}\n", kind.display_name()));
    out.push_str(&format!(
        "Points: n={} used ({} read, {} skipped) | sigma={}\n",
        ingest.rows_used,
        ingest.rows_read,
        ingest.row_errors.len(),
        ingest.rheogram.sigma(),
    ));
    for e in &ingest.row_errors {
        out.push_str(&format!("  (line {}) {}\n", e.line, e.message));
    }

    out.push_str("\nFitted parameters:\n");
    out.push_str(&format_model_block(calibration));

    out.push_str("\nResiduals:\n");
    out.push_str(&format_residual_table(&compute_residuals(
        &ingest.rheogram,
        calibration,
    )));

    out
}

/// Format the correction run summary.
pub fn format_correction_summary(correction: &Correction, geometry: &CouetteGeometry) -> String {
    let mut out = String::new();

    out.push_str("=== ypl - Couette Shear-Rate Correction ===\n");
    out.push_str(&format!(
        "Geometry: R1={} R2={} | kappa={:.6}\n",
        geometry.r1(),
        geometry.r2(),
        geometry.kappa(),
    ));
    out.push_str(&format!(
        "Passes: {} | converged: {}{}\n",
        correction.iterations,
        yes_no(correction.converged),
        if correction.shear_solves_converged {
            ""
        } else {
            " (some per-point solves hit their cap)"
        },
    ));

    out.push_str("\nFitted parameters (corrected rheogram):\n");
    out.push_str(&format_model_block(&correction.calibration));

    out.push_str("\nCorrected points:\n");
    out.push_str(&format!(
        "{:>12} {:>16} {:>16} {:>12}\n",
        "omega", "newtonian_rate", "corrected_rate", "stress"
    ));
    out.push_str(&format!(
        "{:->12} {:->16} {:->16} {:->12}\n",
        "", "", "", ""
    ));
    for p in &correction.points {
        out.push_str(&format!(
            "{:>12.4} {:>16.4} {:>16.4} {:>12.4}\n",
            p.rotational_velocity, p.newtonian_shear_rate, p.corrected_shear_rate, p.shear_stress,
        ));
    }

    out
}

fn format_model_block(calibration: &Calibration) -> String {
    let model = &calibration.model;
    let mut out = String::new();
    out.push_str(&format!("- tau0 = {:.6} Pa\n", model.tau0));
    out.push_str(&format!("- K    = {:.6} Pa.s^n\n", model.k));
    out.push_str(&format!("- n    = {:.6}\n", model.n));
    out.push_str(&format!(
        "- chi2 = {:.6e} | iterations: {} | converged: {}\n",
        calibration.chi_square,
        calibration.iterations,
        yes_no(calibration.converged),
    ));
    out
}

fn format_residual_table(rows: &[StressResidual]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>12} {:>12} {:>12} {:>12}\n",
        "shear_rate", "stress_obs", "stress_fit", "residual"
    ));
    out.push_str(&format!(
        "{:->12} {:->12} {:->12} {:->12}\n",
        "", "", "", ""
    ));
    for r in rows {
        out.push_str(&format!(
            "{:>12.4} {:>12.4} {:>12.4} {:>12.4}\n",
            r.measurement.shear_rate, r.measurement.shear_stress, r.stress_fit, r.residual,
        ));
    }
    out
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::YplModel;

    #[test]
    fn residuals_subtract_the_fitted_stress() {
        let model = YplModel {
            tau0: 2.0,
            k: 0.5,
            n: 1.0,
        };
        let rheogram = Rheogram::new(
            vec![Measurement {
                shear_rate: 10.0,
                shear_stress: 8.0,
            }],
            None,
        );
        let calibration = Calibration {
            model,
            chi_square: 0.0,
            iterations: 0,
            converged: true,
        };
        let rows = compute_residuals(&rheogram, &calibration);
        assert_eq!(rows.len(), 1);
        // fit = 2 + 0.5·10 = 7, residual = 8 − 7 = 1
        assert!((rows[0].stress_fit - 7.0).abs() < 1e-12);
        assert!((rows[0].residual - 1.0).abs() < 1e-12);
    }

    #[test]
    fn summaries_mention_the_headline_numbers() {
        let calibration = Calibration {
            model: YplModel {
                tau0: 5.0,
                k: 0.75,
                n: 0.65,
            },
            chi_square: 0.9,
            iterations: 7,
            converged: true,
        };
        let ingest = IngestedData {
            rheogram: Rheogram::new(
                vec![Measurement {
                    shear_rate: 5.1,
                    shear_stress: 10.2,
                }],
                Some(0.01),
            ),
            row_errors: vec![],
            rows_read: 1,
            rows_used: 1,
        };
        let text = format_calibration_summary(
            &ingest,
            &calibration,
            CalibrationMethod::Mullineux,
            ModelKind::YieldPowerLaw,
        );
        assert!(text.contains("Mullineux"));
        assert!(text.contains("tau0 = 5.000000"));
        assert!(text.contains("converged: yes"));
    }
}
