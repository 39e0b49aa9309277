//! Synthetic rheogram generation from a known model.
//!
//! Useful for exercising the calibrators end to end: the truth parameters are
//! chosen up front, the shear rates are log-spaced across the requested span,
//! and Gaussian noise of the requested σ is added to the stresses. The RNG
//! seed is derived from the configuration (or given explicitly), so a given
//! configuration always produces the same rheogram.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{Measurement, Rheogram, YplModel};
use crate::error::AppError;
use crate::models::StressModel;

#[derive(Debug, Clone)]
pub struct SampleConfig {
    /// Truth parameters the stresses are generated from.
    pub model: YplModel,
    pub count: usize,
    /// Shear-rate span (1/s), covered log-spaced.
    pub rate_min: f64,
    pub rate_max: f64,
    /// Stress noise standard deviation (Pa); 0 gives exact data.
    pub sigma: f64,
    /// Explicit RNG seed; derived from the other fields when absent.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct SampleData {
    pub rheogram: Rheogram,
    pub truth: YplModel,
    pub seed: u64,
}

pub fn generate_sample(config: &SampleConfig) -> Result<SampleData, AppError> {
    if config.count < 3 {
        return Err(AppError::new(
            2,
            "Sample count must be at least 3 (calibration needs 3 points).",
        ));
    }
    if !(config.rate_min.is_finite()
        && config.rate_max.is_finite()
        && config.rate_min > 0.0
        && config.rate_max > config.rate_min)
    {
        return Err(AppError::new(2, "Invalid shear-rate span for sample generation."));
    }
    if !(config.sigma.is_finite() && config.sigma >= 0.0) {
        return Err(AppError::new(2, "Noise sigma must be finite and non-negative."));
    }
    if !config.model.is_finite() || config.model.n <= 0.0 || config.model.k <= 0.0 {
        return Err(AppError::new(2, "Truth model must have finite parameters with K, n > 0."));
    }

    let seed = config.seed.unwrap_or_else(|| derived_seed(config));
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let ratio = config.rate_max / config.rate_min;
    let span = (config.count - 1) as f64;
    let measurements = (0..config.count)
        .map(|i| {
            let shear_rate = config.rate_min * ratio.powf(i as f64 / span);
            let noise = config.sigma * normal.sample(&mut rng);
            Measurement {
                shear_rate,
                shear_stress: config.model.stress(shear_rate) + noise,
            }
        })
        .collect();

    let sigma = (config.sigma > 0.0).then_some(config.sigma);
    Ok(SampleData {
        rheogram: Rheogram::new(measurements, sigma),
        truth: config.model,
        seed,
    })
}

fn derived_seed(config: &SampleConfig) -> u64 {
    let mut hasher = DefaultHasher::new();
    config.model.tau0.to_bits().hash(&mut hasher);
    config.model.k.to_bits().hash(&mut hasher);
    config.model.n.to_bits().hash(&mut hasher);
    config.count.hash(&mut hasher);
    config.rate_min.to_bits().hash(&mut hasher);
    config.rate_max.to_bits().hash(&mut hasher);
    config.sigma.to_bits().hash(&mut hasher);
    hasher.finish()
}
