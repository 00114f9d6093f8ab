//! Speedup and parallel efficiency

use crate::error::{AnalysisError, Result};

/// Baseline time divided by target time.
///
/// # Errors
///
/// Returns [`AnalysisError::DivisionByZero`] if either time is zero.
///
/// # Examples
///
/// ```
/// use parbench_core::metrics::speedup;
///
/// assert_eq!(speedup(10.0, 2.0).unwrap(), 5.0);
/// assert!(speedup(10.0, 0.0).is_err());
/// assert!(speedup(0.0, 2.0).is_err());
/// ```
pub fn speedup(baseline_mean: f64, target_mean: f64) -> Result<f64> {
    if target_mean == 0.0 {
        return Err(AnalysisError::DivisionByZero(format!(
            "speedup of baseline {baseline_mean} over a zero target time"
        )));
    }
    if baseline_mean == 0.0 {
        return Err(AnalysisError::DivisionByZero(format!(
            "speedup over target {target_mean} from a zero baseline time"
        )));
    }
    Ok(baseline_mean / target_mean)
}

/// Speedup per thread; 1.0 is ideal linear scaling.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidConfiguration`] if `thread_count` is zero.
pub fn efficiency(speedup: f64, thread_count: u32) -> Result<f64> {
    if thread_count == 0 {
        return Err(AnalysisError::InvalidConfiguration(
            "thread count must be a positive integer".to_string(),
        ));
    }
    Ok(speedup / f64::from(thread_count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speedup_identity() {
        assert_eq!(speedup(3.7, 3.7).unwrap(), 1.0);
    }

    #[test]
    fn test_speedup_zero_target() {
        assert!(matches!(
            speedup(1.0, 0.0),
            Err(AnalysisError::DivisionByZero(_))
        ));
    }

    #[test]
    fn test_speedup_zero_baseline() {
        assert!(matches!(
            speedup(0.0, 4.0),
            Err(AnalysisError::DivisionByZero(_))
        ));
    }

    #[test]
    fn test_efficiency() {
        assert_eq!(efficiency(5.0, 4).unwrap(), 1.25);
        assert_eq!(efficiency(8.0, 8).unwrap(), 1.0);
        assert!(matches!(
            efficiency(2.0, 0),
            Err(AnalysisError::InvalidConfiguration(_))
        ));
    }
}
