//! Rheological model calibration.
//!
//! Two independent estimators of the Yield-Power-Law parameters:
//!
//! - Kelessidis/Zamora: search τ0 by Newton-Raphson on the chi-square
//!   stationarity condition, with K and n from a log-log regression.
//! - Mullineux: search n as the root of a 3×3 stationarity determinant, with
//!   τ0 and K from a plain linear regression.
//!
//! Both return a complete [`Calibration`](crate::domain::Calibration) or a
//! `FitError`; neither leaves partial state behind.

pub mod kelessidis;
pub mod mullineux;

pub use kelessidis::*;
pub use mullineux::*;

use crate::domain::{Calibration, CalibrationMethod, ModelKind, Rheogram};
use crate::error::FitError;

/// Run the requested calibration method.
pub fn calibrate(
    method: CalibrationMethod,
    rheogram: &Rheogram,
    kind: ModelKind,
) -> Result<Calibration, FitError> {
    match method {
        CalibrationMethod::Kelessidis => fit_kelessidis(rheogram, kind),
        CalibrationMethod::Mullineux => fit_mullineux(rheogram, kind),
    }
}
