//! Error types.
//!
//! The numerical core reports failures through [`FitError`] so that callers can
//! distinguish "not enough data" from "the solver gave up" at the type level,
//! instead of overloading a numeric sentinel. The binary wraps everything in
//! [`AppError`], which carries the process exit code.

/// Failure modes of the calibration / correction core.
#[derive(Clone, PartialEq)]
pub enum FitError {
    /// Fewer measurements (or distinct shear rates) than the algorithm needs.
    InsufficientData { needed: usize, got: usize },
    /// A root-finding or fixed-point loop found no usable root.
    NonConvergent {
        what: &'static str,
        iterations: usize,
        residual: f64,
    },
    /// A NaN/Inf-contaminated intermediate that no sentinel guard intercepted.
    Degenerate { what: &'static str },
    /// Couette radii that violate 0 < R1 < R2.
    InvalidGeometry { r1: f64, r2: f64 },
}

impl std::fmt::Display for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FitError::InsufficientData { needed, got } => {
                write!(f, "Insufficient data: need {needed} measurements, got {got}.")
            }
            FitError::NonConvergent {
                what,
                iterations,
                residual,
            } => write!(
                f,
                "{what} did not converge after {iterations} iterations (residual {residual:.3e})."
            ),
            FitError::Degenerate { what } => {
                write!(f, "Degenerate numerical result in {what}.")
            }
            FitError::InvalidGeometry { r1, r2 } => {
                write!(f, "Invalid Couette geometry: R1={r1}, R2={r2} (need 0 < R1 < R2).")
            }
        }
    }
}

impl std::fmt::Debug for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FitError({self})")
    }
}

impl std::error::Error for FitError {}

/// Application-level error carrying a process exit code.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        AppError::new(3, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
