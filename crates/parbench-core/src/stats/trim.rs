//! Min/max trimming of raw sample sets.
//!
//! Each sample set loses exactly its fastest and its slowest measurement
//! before any statistic is computed. Ordering uses a stable sort on the
//! primary timing, so among equal timings the sample that appeared first in
//! the input is the one dropped at the low end, and the one that appeared
//! last is dropped at the high end.

use serde::Serialize;

use crate::error::{AnalysisError, Result};
use crate::model::{ConfigurationKey, ProblemSize, SampleSet};
use crate::sample::RawSample;

/// Minimum raw sample count that leaves at least one sample after trimming
pub const MIN_RAW_SAMPLES: usize = 3;

/// A sample set with its minimum and maximum timing removed, sorted ascending
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetainedSet {
    size: ProblemSize,
    configuration: ConfigurationKey,
    samples: Vec<RawSample>,
}

impl RetainedSet {
    /// Problem size of the originating sample set
    #[must_use]
    pub const fn size(&self) -> ProblemSize {
        self.size
    }

    /// Configuration of the originating sample set
    #[must_use]
    pub const fn configuration(&self) -> &ConfigurationKey {
        &self.configuration
    }

    /// Retained samples, ascending by timing
    #[must_use]
    pub fn samples(&self) -> &[RawSample] {
        &self.samples
    }

    /// Retained primary timings, ascending
    #[must_use]
    pub fn timings(&self) -> Vec<f64> {
        self.samples.iter().map(RawSample::timing).collect()
    }

    /// Fastest retained sample
    #[must_use]
    pub fn best(&self) -> Option<&RawSample> {
        self.samples.first()
    }

    /// Number of retained samples
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether nothing was retained
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Drop the minimum and maximum timing from a sample set.
///
/// # Errors
///
/// Returns [`AnalysisError::InsufficientSamples`] if the set has fewer than
/// [`MIN_RAW_SAMPLES`] samples.
///
/// # Examples
///
/// ```
/// use parbench_core::model::{ConfigurationKey, ProblemSize, SampleSet};
/// use parbench_core::sample::RawSample;
/// use parbench_core::stats::trim;
///
/// let samples = [12.0, 5.0, 7.0, 9.0, 100.0]
///     .iter()
///     .map(|&t| RawSample::new(t, 0.0))
///     .collect();
/// let set = SampleSet::new(ProblemSize::new(10), ConfigurationKey::runtime("omp"), samples);
///
/// let retained = trim(&set).unwrap();
/// assert_eq!(retained.timings(), vec![7.0, 9.0, 12.0]);
/// ```
pub fn trim(set: &SampleSet) -> Result<RetainedSet> {
    if set.len() < MIN_RAW_SAMPLES {
        return Err(AnalysisError::InsufficientSamples {
            size: set.size(),
            configuration: set.configuration().clone(),
            count: set.len(),
        });
    }

    let mut sorted = set.samples().to_vec();
    // slice::sort_by is stable
    sorted.sort_by(|a, b| a.timing().total_cmp(&b.timing()));
    sorted.pop();
    sorted.remove(0);

    Ok(RetainedSet {
        size: set.size(),
        configuration: set.configuration().clone(),
        samples: sorted,
    })
}
