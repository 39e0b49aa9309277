//! Export calibration and correction results.
//!
//! JSON files carry the portable, machine-readable record of a run; CSV
//! exports are meant to be easy to consume in spreadsheets or downstream
//! scripts. Schemas are defined by `domain::CalibrationFile` and
//! `domain::CorrectionFile`.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{
    Calibration, CalibrationFile, CalibrationMethod, CorrectionFile, CouetteGeometry, ModelKind,
    Rheogram,
};
use crate::correction::Correction;
use crate::error::AppError;

const TOOL: &str = "ypl";

/// Write a calibration JSON file.
pub fn write_calibration_json(
    path: &Path,
    calibration: &Calibration,
    method: CalibrationMethod,
    kind: ModelKind,
    rheogram: &Rheogram,
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create calibration JSON '{}': {e}", path.display()),
        )
    })?;

    let record = CalibrationFile {
        tool: TOOL.to_string(),
        method,
        kind,
        n_points: rheogram.len(),
        sigma: rheogram.sigma(),
        calibration: calibration.clone(),
    };

    serde_json::to_writer_pretty(file, &record)
        .map_err(|e| AppError::new(2, format!("Failed to write calibration JSON: {e}")))?;
    Ok(())
}

/// Write a correction JSON file.
pub fn write_correction_json(
    path: &Path,
    correction: &Correction,
    geometry: &CouetteGeometry,
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create correction JSON '{}': {e}", path.display()),
        )
    })?;

    let record = CorrectionFile {
        tool: TOOL.to_string(),
        r1: geometry.r1(),
        r2: geometry.r2(),
        kappa: geometry.kappa(),
        calibration: correction.calibration.clone(),
        iterations: correction.iterations,
        converged: correction.converged,
        points: correction.points.clone(),
    };

    serde_json::to_writer_pretty(file, &record)
        .map_err(|e| AppError::new(2, format!("Failed to write correction JSON: {e}")))?;
    Ok(())
}

/// Write corrected per-point results to a CSV file.
pub fn write_correction_csv(path: &Path, correction: &Correction) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create export CSV '{}': {e}", path.display()),
        )
    })?;

    writeln!(
        file,
        "rotational_velocity,newtonian_shear_rate,corrected_shear_rate,shear_stress"
    )
    .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for p in &correction.points {
        writeln!(
            file,
            "{:.10},{:.10},{:.10},{:.10}",
            p.rotational_velocity, p.newtonian_shear_rate, p.corrected_shear_rate, p.shear_stress,
        )
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

/// Write a rheogram to a measurement CSV (the schema `ingest` reads back).
pub fn write_rheogram_csv(path: &Path, rheogram: &Rheogram) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create rheogram CSV '{}': {e}", path.display()),
        )
    })?;

    writeln!(file, "shear_rate,shear_stress")
        .map_err(|e| AppError::new(2, format!("Failed to write rheogram CSV header: {e}")))?;
    for m in &rheogram.measurements {
        writeln!(file, "{:.10},{:.10}", m.shear_rate, m.shear_stress)
            .map_err(|e| AppError::new(2, format!("Failed to write rheogram CSV row: {e}")))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Measurement;
    use crate::io::ingest::load_rheogram;

    fn rheogram() -> Rheogram {
        Rheogram::new(
            vec![
                Measurement {
                    shear_rate: 5.1,
                    shear_stress: 10.2,
                },
                Measurement {
                    shear_rate: 10.2,
                    shear_stress: 12.4,
                },
                Measurement {
                    shear_rate: 170.3,
                    shear_stress: 25.9,
                },
            ],
            Some(0.02),
        )
    }

    #[test]
    fn rheogram_csv_round_trips_through_ingest() {
        let path = std::env::temp_dir().join("ypl_export_roundtrip.csv");
        let original = rheogram();
        write_rheogram_csv(&path, &original).unwrap();
        let data = load_rheogram(&path, original.shear_stress_std_dev).unwrap();
        assert_eq!(data.rheogram.len(), original.len());
        for (a, b) in data
            .rheogram
            .measurements
            .iter()
            .zip(&original.measurements)
        {
            assert!((a.shear_rate - b.shear_rate).abs() < 1e-9);
            assert!((a.shear_stress - b.shear_stress).abs() < 1e-9);
        }
    }

    #[test]
    fn calibration_json_is_readable_back() {
        let path = std::env::temp_dir().join("ypl_export_cal.json");
        let calibration = Calibration {
            model: crate::domain::YplModel {
                tau0: 5.0,
                k: 0.75,
                n: 0.65,
            },
            chi_square: 0.12,
            iterations: 7,
            converged: true,
        };
        write_calibration_json(
            &path,
            &calibration,
            CalibrationMethod::Mullineux,
            ModelKind::YieldPowerLaw,
            &rheogram(),
        )
        .unwrap();

        let file = File::open(&path).unwrap();
        let record: CalibrationFile = serde_json::from_reader(file).unwrap();
        assert_eq!(record.tool, "ypl");
        assert_eq!(record.n_points, 3);
        assert_eq!(record.calibration.model.tau0, 5.0);
        assert!(record.calibration.converged);
    }
}
