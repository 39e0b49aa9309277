//! Model evaluation and goodness-of-fit.

pub mod model;

pub use model::*;
