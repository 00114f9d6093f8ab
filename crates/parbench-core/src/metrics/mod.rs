//! Cross-configuration metrics
//!
//! - [`speedup`]: sequential baseline time over parallel time
//! - [`efficiency`]: speedup per thread
//! - [`step_shares`] and [`overhead_ratios`]: per-step breakdown analysis

pub mod breakdown;
pub mod speedup;

pub use breakdown::{overhead_ratios, step_shares, StepOverhead};
pub use speedup::{efficiency, speedup};
