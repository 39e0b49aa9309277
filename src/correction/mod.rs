//! Couette shear-rate correction.
//!
//! [`couette`] holds the per-point solvers (closed forms plus the
//! fully-sheared and plug-flow Newton-Raphson branches); [`engine`] iterates
//! correction and recalibration over a whole rheogram until they agree.

pub mod couette;
pub mod engine;

pub use couette::{
    minimum_rotational_velocity, newtonian_rotational_velocity, newtonian_shear_rate,
    power_law_shear_rate, shear_rate, ShearRateSolve,
};
pub use engine::{correct_rheogram, Correction};
