//! Mean, sample standard deviation and confidence interval of retained timings.

use serde::{Deserialize, Serialize};

use super::critical::CriticalValueProvider;
use super::trim::RetainedSet;
use crate::error::{AnalysisError, Result};

/// Summary statistics over one retained set's primary timings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregatedMetric {
    /// Arithmetic mean
    pub mean: f64,
    /// Bessel-corrected sample standard deviation
    pub std_dev: f64,
    /// Half-width of the two-tailed Student's-t interval around the mean
    pub confidence_interval: f64,
    /// Smallest retained timing
    pub best: f64,
    /// Number of retained samples
    pub count: usize,
}

impl AggregatedMetric {
    /// Compute the summary of a set of timings.
    ///
    /// `confidence_interval = t(k - 1) * std_dev / sqrt(k)`.
    ///
    /// # Errors
    ///
    /// - [`AnalysisError::DegenerateSample`] if fewer than two values are given
    /// - [`AnalysisError::UnsupportedSampleSize`] if the provider has no
    ///   critical value for `k - 1` degrees of freedom
    ///
    /// # Examples
    ///
    /// ```
    /// use parbench_core::stats::{AggregatedMetric, StudentTable};
    ///
    /// let metric = AggregatedMetric::from_timings(&[7.0, 9.0, 12.0], &StudentTable::default()).unwrap();
    /// assert!((metric.mean - 9.333_333).abs() < 1e-6);
    /// assert_eq!(metric.count, 3);
    /// ```
    pub fn from_timings(timings: &[f64], provider: &dyn CriticalValueProvider) -> Result<Self> {
        let count = timings.len();
        let variance = sample_variance(timings)?;
        let mean = mean(timings)?;
        let std_dev = variance.sqrt();
        let critical = provider.critical_value(count - 1)?;
        let confidence_interval = critical * std_dev / (count as f64).sqrt();
        let best = timings.iter().copied().fold(f64::INFINITY, f64::min);

        Ok(Self {
            mean,
            std_dev,
            confidence_interval,
            best,
            count,
        })
    }

    /// Compute the summary of a retained set
    ///
    /// # Errors
    ///
    /// Same as [`AggregatedMetric::from_timings`].
    pub fn from_retained(retained: &RetainedSet, provider: &dyn CriticalValueProvider) -> Result<Self> {
        Self::from_timings(&retained.timings(), provider)
    }

    /// Coefficient of variation (std_dev / mean)
    ///
    /// Returns 0.0 when the mean is zero.
    #[must_use]
    pub fn coefficient_of_variation(&self) -> f64 {
        if self.mean == 0.0 {
            0.0
        } else {
            self.std_dev / self.mean
        }
    }
}

/// Arithmetic mean.
///
/// # Errors
///
/// Returns [`AnalysisError::DegenerateSample`] for an empty slice.
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(AnalysisError::DegenerateSample(
            "mean of an empty sample".to_string(),
        ));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Bessel-corrected variance, computed in two passes.
///
/// # Errors
///
/// Returns [`AnalysisError::DegenerateSample`] for fewer than two values.
pub fn sample_variance(values: &[f64]) -> Result<f64> {
    if values.len() < 2 {
        return Err(AnalysisError::DegenerateSample(format!(
            "sample variance needs at least 2 values, got {}",
            values.len()
        )));
    }
    let mean = mean(values)?;
    let squared_diffs: f64 = values.iter().map(|&x| (x - mean).powi(2)).sum();
    Ok(squared_diffs / (values.len() - 1) as f64)
}
