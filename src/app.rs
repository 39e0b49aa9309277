//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs the fit/correct/sample pipelines
//! - prints reports
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, CorrectArgs, FitArgs, SampleArgs};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `ypl` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Correct(args) => handle_correct(args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let run = pipeline::run_fit(&args.input, args.method, args.kind, args.sigma)?;

    println!(
        "{}",
        crate::report::format_calibration_summary(
            &run.ingest,
            &run.calibration,
            args.method,
            args.kind,
        )
    );

    if let Some(path) = &args.export_json {
        crate::io::write_calibration_json(
            path,
            &run.calibration,
            args.method,
            args.kind,
            &run.ingest.rheogram,
        )?;
        println!("Wrote calibration JSON: {}", path.display());
    }

    Ok(())
}

fn handle_correct(args: CorrectArgs) -> Result<(), AppError> {
    let run = pipeline::run_correct(&args.input, args.r1, args.r2, args.sigma)?;

    println!(
        "{}",
        crate::report::format_correction_summary(&run.correction, &run.geometry)
    );

    if let Some(path) = &args.export_json {
        crate::io::write_correction_json(path, &run.correction, &run.geometry)?;
        println!("Wrote correction JSON: {}", path.display());
    }
    if let Some(path) = &args.export_csv {
        crate::io::write_correction_csv(path, &run.correction)?;
        println!("Wrote corrected CSV: {}", path.display());
    }

    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = crate::data::SampleConfig {
        model: crate::domain::YplModel {
            tau0: args.tau0,
            k: args.k,
            n: args.n,
        },
        count: args.count,
        rate_min: args.rate_min,
        rate_max: args.rate_max,
        sigma: args.sigma,
        seed: args.seed,
    };
    let sample = crate::data::generate_sample(&config)?;

    match &args.output {
        Some(path) => {
            crate::io::write_rheogram_csv(path, &sample.rheogram)?;
            println!(
                "Wrote {} measurements (seed {}): {}",
                sample.rheogram.len(),
                sample.seed,
                path.display()
            );
        }
        None => {
            println!("shear_rate,shear_stress");
            for m in &sample.rheogram.measurements {
                println!("{:.10},{:.10}", m.shear_rate, m.shear_stress);
            }
        }
    }

    Ok(())
}
