//! Command-line parsing for the YPL rheology toolkit.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{CalibrationMethod, ModelKind};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ypl", version, about = "Yield-Power-Law rheological calibration")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Calibrate a model from a measurement CSV and print diagnostics.
    Fit(FitArgs),
    /// Correct Couette shear rates and recalibrate against them.
    Correct(CorrectArgs),
    /// Generate a synthetic rheogram from known parameters.
    Sample(SampleArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Measurement CSV with `shear_rate,shear_stress` columns.
    #[arg(short = 'i', long)]
    pub input: PathBuf,

    /// Calibration method.
    #[arg(short = 'm', long, value_enum, default_value_t = CalibrationMethod::Mullineux)]
    pub method: CalibrationMethod,

    /// Model family constraint applied after the fit.
    #[arg(short = 'k', long, value_enum, default_value_t = ModelKind::YieldPowerLaw)]
    pub kind: ModelKind,

    /// Stress standard deviation for chi-square weighting (Pa).
    #[arg(long)]
    pub sigma: Option<f64>,

    /// Write the calibration as JSON.
    #[arg(long)]
    pub export_json: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct CorrectArgs {
    /// Measurement CSV with `shear_rate,shear_stress` columns (rates as
    /// reported under the Newtonian assumption).
    #[arg(short = 'i', long)]
    pub input: PathBuf,

    /// Inner (bob) radius.
    #[arg(long)]
    pub r1: f64,

    /// Outer (cup) radius, same unit as --r1.
    #[arg(long)]
    pub r2: f64,

    /// Stress standard deviation for chi-square weighting (Pa).
    #[arg(long)]
    pub sigma: Option<f64>,

    /// Write the correction run as JSON.
    #[arg(long)]
    pub export_json: Option<PathBuf>,

    /// Write the corrected points as CSV.
    #[arg(long)]
    pub export_csv: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct SampleArgs {
    /// Truth yield stress τ0 (Pa).
    #[arg(long, default_value_t = 5.0)]
    pub tau0: f64,

    /// Truth consistency index K (Pa·sⁿ).
    #[arg(long, default_value_t = 0.75)]
    pub k: f64,

    /// Truth flow index n.
    #[arg(long, default_value_t = 0.65)]
    pub n: f64,

    /// Number of measurements.
    #[arg(short = 'c', long, default_value_t = 8)]
    pub count: usize,

    /// Lowest shear rate (1/s).
    #[arg(long, default_value_t = 5.0)]
    pub rate_min: f64,

    /// Highest shear rate (1/s).
    #[arg(long, default_value_t = 1020.0)]
    pub rate_max: f64,

    /// Stress noise standard deviation (Pa).
    #[arg(long, default_value_t = 0.05)]
    pub sigma: f64,

    /// Random seed (derived from the other arguments when omitted).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output CSV path; the rheogram is printed when omitted.
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
}
