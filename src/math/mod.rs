//! Numerical utilities: tolerance-aware comparisons, linear regression, and
//! the integration / root-finding kernels used by the correction engine.

pub mod compare;
pub mod integrate;
pub mod regression;
pub mod root;
pub mod safe;

pub use compare::*;
pub use integrate::*;
pub use regression::*;
pub use root::*;
pub use safe::*;
