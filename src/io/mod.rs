//! Input/output helpers.
//!
//! - rheogram CSV ingest + validation (`ingest`)
//! - calibration/correction exports (CSV/JSON) (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
