//! Drift
//!
//! Statistical kernels and the per-column drift test built on them.
pub mod calculation;
pub mod stats;

pub use calculation::{categorical_drift, continuous_drift, is_drifted};
