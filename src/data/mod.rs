//! Synthetic data generation.

pub mod sample;

pub use sample::{generate_sample, SampleConfig, SampleData};
