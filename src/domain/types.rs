//! Shared domain types.
//!
//! These types are intentionally lightweight and serializable so they can be:
//!
//! - used in-memory during calibration and correction
//! - exported to JSON/CSV
//! - reloaded later for comparisons
//!
//! Shear rates are in 1/s, shear stresses in Pa, radii in m.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::FitError;

/// Uniform per-point stress uncertainty used when none is supplied.
pub const DEFAULT_SIGMA: f64 = 0.01;

/// One rotational-viscometer reading: a (shear rate, shear stress) pair.
///
/// Immutable once recorded; it has no identity beyond its position in the
/// rheogram that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Shear rate γ̇ (1/s), non-negative.
    pub shear_rate: f64,
    /// Shear stress τ (Pa).
    pub shear_stress: f64,
}

/// A collection of measurements plus the uniform stress standard deviation
/// used for chi-square weighting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rheogram {
    pub measurements: Vec<Measurement>,
    /// σ for chi-square weighting; `None` or ≤ 0 falls back to
    /// [`DEFAULT_SIGMA`].
    pub shear_stress_std_dev: Option<f64>,
}

impl Rheogram {
    pub fn new(measurements: Vec<Measurement>, shear_stress_std_dev: Option<f64>) -> Self {
        Self {
            measurements,
            shear_stress_std_dev,
        }
    }

    /// Effective stress standard deviation (always > 0).
    pub fn sigma(&self) -> f64 {
        match self.shear_stress_std_dev {
            Some(s) if s > 0.0 && s.is_finite() => s,
            _ => DEFAULT_SIGMA,
        }
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    pub fn shear_rates(&self) -> Vec<f64> {
        self.measurements.iter().map(|m| m.shear_rate).collect()
    }

    pub fn shear_stresses(&self) -> Vec<f64> {
        self.measurements.iter().map(|m| m.shear_stress).collect()
    }
}

/// Concentric-cylinder (Couette) geometry used by the correction engine.
///
/// Constructed through [`CouetteGeometry::new`] so `0 < R1 < R2` holds by
/// construction; the integral kernels only ever see the dimensionless ratio
/// κ = R1/R2.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CouetteGeometry {
    r1: f64,
    r2: f64,
}

impl CouetteGeometry {
    pub fn new(r1: f64, r2: f64) -> Result<Self, FitError> {
        if !(r1.is_finite() && r2.is_finite()) || r1 <= 0.0 || r2 <= r1 {
            return Err(FitError::InvalidGeometry { r1, r2 });
        }
        Ok(Self { r1, r2 })
    }

    /// Inner (bob) radius, m.
    pub fn r1(&self) -> f64 {
        self.r1
    }

    /// Outer (cup) radius, m.
    pub fn r2(&self) -> f64 {
        self.r2
    }

    /// Dimensionless gap ratio κ = R1/R2 ∈ (0, 1).
    pub fn kappa(&self) -> f64 {
        self.r1 / self.r2
    }
}

/// Rheological model family requested by the caller.
///
/// `PowerLaw` and `Newtonian` are applied as post-fit constraints on the
/// fitted YPL parameters; see [`YplModel::constrain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ModelKind {
    /// Herschel-Bulkley: τ = τ0 + K·γ̇ⁿ.
    YieldPowerLaw,
    /// τ0 forced to 0.
    PowerLaw,
    /// τ0 forced to 0 and n forced to 1.
    Newtonian,
}

impl ModelKind {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::YieldPowerLaw => "Yield-Power-Law",
            ModelKind::PowerLaw => "Power-Law",
            ModelKind::Newtonian => "Newtonian",
        }
    }
}

/// Which calibration algorithm to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CalibrationMethod {
    /// Kelessidis/Zamora: Newton-Raphson on d(chi²)/d(τ0), then log-log
    /// regression for K and n.
    Kelessidis,
    /// Mullineux: root of the 3×3 stationarity determinant in n, then linear
    /// regression for τ0 and K.
    Mullineux,
}

impl CalibrationMethod {
    pub fn display_name(self) -> &'static str {
        match self {
            CalibrationMethod::Kelessidis => "Kelessidis/Zamora",
            CalibrationMethod::Mullineux => "Mullineux",
        }
    }
}

/// Yield-Power-Law (Herschel-Bulkley) parameters.
///
/// Defaults to water-like Newtonian values (τ0 = 0, K = 1, n = 1), the state
/// a failed calibration leaves behind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YplModel {
    /// Yield stress τ0 (Pa).
    pub tau0: f64,
    /// Consistency index K (Pa·sⁿ).
    pub k: f64,
    /// Flow behavior index n (dimensionless).
    pub n: f64,
}

impl Default for YplModel {
    fn default() -> Self {
        Self {
            tau0: 0.0,
            k: 1.0,
            n: 1.0,
        }
    }
}

impl YplModel {
    /// Apply the requested model-family constraint after a fit.
    ///
    /// Deliberately does NOT refit K or recompute chi-square: this reproduces
    /// the historical behavior of the calibrators, where forcing τ0 = 0 (and
    /// n = 1 for Newtonian) leaves the other outputs untouched. See the test
    /// `constrain_leaves_k_and_chi_square_stale` in `fit::mullineux`.
    pub fn constrain(&mut self, kind: ModelKind) {
        match kind {
            ModelKind::YieldPowerLaw => {}
            ModelKind::PowerLaw => self.tau0 = 0.0,
            ModelKind::Newtonian => {
                self.tau0 = 0.0;
                self.n = 1.0;
            }
        }
    }

    pub fn is_finite(&self) -> bool {
        self.tau0.is_finite() && self.k.is_finite() && self.n.is_finite()
    }
}

/// Output of a successful calibration.
///
/// A fit either produces all of these fields consistently or fails with a
/// `FitError`; there is no partially-updated state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Calibration {
    pub model: YplModel,
    /// Weighted sum of squared residuals at the fitted parameters (≥ 0).
    pub chi_square: f64,
    /// Iterations spent in the outer parameter search.
    pub iterations: usize,
    /// Whether the stopping criterion was met before the iteration cap.
    pub converged: bool,
}

/// A saved calibration file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationFile {
    pub tool: String,
    pub method: CalibrationMethod,
    pub kind: ModelKind,
    pub n_points: usize,
    pub sigma: f64,
    pub calibration: Calibration,
}

/// One row of a corrected rheogram.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CorrectedPoint {
    /// Rotational velocity Ω (rad/s) recovered from the Newtonian reading.
    pub rotational_velocity: f64,
    /// Shear rate under the Newtonian assumption (as measured).
    pub newtonian_shear_rate: f64,
    /// Shear rate consistent with the fitted YPL fluid.
    pub corrected_shear_rate: f64,
    pub shear_stress: f64,
}

/// A saved correction run (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionFile {
    pub tool: String,
    pub r1: f64,
    pub r2: f64,
    pub kappa: f64,
    pub calibration: Calibration,
    /// Outer fixed-point iterations performed.
    pub iterations: usize,
    /// Whether |Δchi²| dropped below tolerance before the cap.
    pub converged: bool,
    pub points: Vec<CorrectedPoint>,
}
