//! Step-time breakdowns
//!
//! A breakdown is the per-step timing sequence of one sample. In the plain
//! layout each entry is one step. In the interleaved layout entries come in
//! `(wall, profiled)` pairs: wall-clock time followed by device-profiled time
//! for the same step.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Fraction of the total spent in each step.
///
/// Multiply by 100 for percentages.
///
/// # Errors
///
/// Returns [`AnalysisError::DegenerateSample`] if a step is negative or
/// the steps sum to zero.
///
/// # Examples
///
/// ```
/// use parbench_core::metrics::step_shares;
///
/// let shares = step_shares(&[1.0, 3.0]).unwrap();
/// assert_eq!(shares, vec![0.25, 0.75]);
/// ```
pub fn step_shares(steps: &[f64]) -> Result<Vec<f64>> {
    if let Some(negative) = steps.iter().find(|&&step| step < 0.0) {
        return Err(AnalysisError::DegenerateSample(format!(
            "negative step timing {negative}"
        )));
    }
    let total: f64 = steps.iter().sum();
    if total == 0.0 {
        return Err(AnalysisError::DegenerateSample(
            "step timings sum to zero".to_string(),
        ));
    }
    Ok(steps.iter().map(|step| step / total).collect())
}

/// One logical step of an interleaved breakdown
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepOverhead {
    /// Wall-clock time of the step
    pub wall: f64,
    /// Device-profiled time of the step
    pub profiled: f64,
    /// `wall / profiled`
    pub ratio: f64,
}

/// Split an interleaved breakdown into steps and compute `wall / profiled`.
///
/// # Errors
///
/// - [`AnalysisError::InvalidConfiguration`] if the breakdown length is odd
/// - [`AnalysisError::DivisionByZero`] if a profiled time is zero
///
/// # Examples
///
/// ```
/// use parbench_core::metrics::overhead_ratios;
///
/// let steps = overhead_ratios(&[10.0, 20.0, 30.0, 40.0]).unwrap();
/// assert_eq!(steps[0].ratio, 0.5);
/// assert_eq!(steps[1].ratio, 0.75);
/// ```
pub fn overhead_ratios(breakdown: &[f64]) -> Result<Vec<StepOverhead>> {
    if breakdown.len() % 2 != 0 {
        return Err(AnalysisError::InvalidConfiguration(format!(
            "interleaved breakdown has odd length {}",
            breakdown.len()
        )));
    }
    breakdown
        .chunks_exact(2)
        .enumerate()
        .map(|(step, pair)| {
            let (wall, profiled) = (pair[0], pair[1]);
            if profiled == 0.0 {
                return Err(AnalysisError::DivisionByZero(format!(
                    "step {step} has zero profiled time"
                )));
            }
            Ok(StepOverhead {
                wall,
                profiled,
                ratio: wall / profiled,
            })
        })
        .collect()
}
