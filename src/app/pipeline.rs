//! Shared run pipelines for the CLI front-end.
//!
//! Keeping these in one place avoids duplicating the core workflows:
//!
//! - fit:     ingest -> calibrate
//! - correct: ingest -> geometry -> correction fixed point
//!
//! The CLI layer then focuses on presentation and exports.

use std::path::Path;

use crate::correction::{correct_rheogram, Correction};
use crate::domain::{Calibration, CalibrationMethod, CouetteGeometry, ModelKind};
use crate::error::AppError;
use crate::fit::calibrate;
use crate::io::ingest::{load_rheogram, IngestedData};

/// All computed outputs of a single `ypl fit` run.
#[derive(Debug, Clone)]
pub struct FitRun {
    pub ingest: IngestedData,
    pub calibration: Calibration,
}

/// All computed outputs of a single `ypl correct` run.
#[derive(Debug, Clone)]
pub struct CorrectRun {
    pub ingest: IngestedData,
    pub geometry: CouetteGeometry,
    pub correction: Correction,
}

pub fn run_fit(
    input: &Path,
    method: CalibrationMethod,
    kind: ModelKind,
    sigma: Option<f64>,
) -> Result<FitRun, AppError> {
    let ingest = load_rheogram(input, sigma)?;
    let calibration = calibrate(method, &ingest.rheogram, kind)?;
    Ok(FitRun {
        ingest,
        calibration,
    })
}

pub fn run_correct(
    input: &Path,
    r1: f64,
    r2: f64,
    sigma: Option<f64>,
) -> Result<CorrectRun, AppError> {
    let ingest = load_rheogram(input, sigma)?;
    let geometry = CouetteGeometry::new(r1, r2)?;
    let correction = correct_rheogram(&ingest.rheogram, &geometry)?;
    Ok(CorrectRun {
        ingest,
        geometry,
        correction,
    })
}
