//! Percentiles and five-number summaries for box-plot series.

use serde::{Deserialize, Serialize};

/// Percentile of `samples` with linear interpolation between nearest ranks.
///
/// # Returns
///
/// * `Some(value)` - The percentile value
/// * `None` - If samples is empty or `p` is outside 0..=100
///
/// # Examples
///
/// ```
/// use parbench_core::stats::percentile;
///
/// let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
/// assert_eq!(percentile(&data, 50.0), Some(3.0));
/// assert_eq!(percentile(&data, 25.0), Some(2.0));
/// ```
#[must_use]
pub fn percentile(samples: &[f64], p: f64) -> Option<f64> {
    if samples.is_empty() || !(0.0..=100.0).contains(&p) {
        return None;
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (p / 100.0) * (sorted.len() - 1) as f64;
    let lower_index = rank.floor() as usize;
    let upper_index = rank.ceil() as usize;

    if lower_index == upper_index {
        Some(sorted[lower_index])
    } else {
        let lower_value = sorted[lower_index];
        let upper_value = sorted[upper_index];
        let fraction = rank - lower_index as f64;
        Some(lower_value + fraction * (upper_value - lower_value))
    }
}

/// Five-number summary drawn by a box plot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxSummary {
    /// Smallest value
    pub min: f64,
    /// 25th percentile
    pub q1: f64,
    /// 50th percentile
    pub median: f64,
    /// 75th percentile
    pub q3: f64,
    /// Largest value
    pub max: f64,
}

impl BoxSummary {
    /// Summarize samples, or `None` if there are none
    #[must_use]
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        Some(Self {
            min: percentile(samples, 0.0)?,
            q1: percentile(samples, 25.0)?,
            median: percentile(samples, 50.0)?,
            q3: percentile(samples, 75.0)?,
            max: percentile(samples, 100.0)?,
        })
    }

    /// Interquartile range
    #[must_use]
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}
