//! Rheogram CSV ingest and validation.
//!
//! Turns a two-column measurement CSV into a clean [`Rheogram`] that is safe
//! to calibrate.
//!
//! Design goals:
//! - **Strict schema** for the required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Separation of concerns**: no fitting logic here

use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{Measurement, Rheogram};
use crate::error::AppError;

const SHEAR_RATE_COLUMN: &str = "shear_rate";
const SHEAR_STRESS_COLUMN: &str = "shear_stress";

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: the usable rheogram plus what was skipped along the way.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub rheogram: Rheogram,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load and validate a measurement CSV.
///
/// The file must carry `shear_rate` and `shear_stress` headers (any column
/// order, extra columns ignored). `sigma` becomes the rheogram's stress
/// standard deviation for chi-square weighting.
pub fn load_rheogram(path: &Path, sigma: Option<f64>) -> Result<IngestedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let rate_col = find_column(&headers, SHEAR_RATE_COLUMN)?;
    let stress_col = find_column(&headers, SHEAR_STRESS_COLUMN)?;

    let mut measurements = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // Headers occupy line 1; records are 1-based after them.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, rate_col, stress_col) {
            Ok(measurement) => measurements.push(measurement),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if measurements.is_empty() {
        return Err(AppError::new(
            2,
            format!("No usable measurements in '{}'.", path.display()),
        ));
    }

    let rows_used = measurements.len();
    Ok(IngestedData {
        rheogram: Rheogram::new(measurements, sigma),
        row_errors,
        rows_read,
        rows_used,
    })
}

fn find_column(headers: &StringRecord, name: &str) -> Result<usize, AppError> {
    headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(name))
        .ok_or_else(|| AppError::new(2, format!("CSV is missing required column '{name}'.")))
}

fn parse_row(
    record: &StringRecord,
    rate_col: usize,
    stress_col: usize,
) -> Result<Measurement, String> {
    let shear_rate = parse_field(record, rate_col, SHEAR_RATE_COLUMN)?;
    let shear_stress = parse_field(record, stress_col, SHEAR_STRESS_COLUMN)?;

    if shear_rate < 0.0 {
        return Err(format!("Negative shear rate {shear_rate}."));
    }

    Ok(Measurement {
        shear_rate,
        shear_stress,
    })
}

fn parse_field(record: &StringRecord, col: usize, name: &str) -> Result<f64, String> {
    let raw = record
        .get(col)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing '{name}' value."))?;
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("Invalid '{name}' value '{raw}'."))?;
    if !value.is_finite() {
        return Err(format!("Non-finite '{name}' value '{raw}'."));
    }
    Ok(value)
}
