//! Grouping keys and sample sets
//!
//! Measurements are grouped by [`ProblemSize`] (outer key) and
//! [`ConfigurationKey`] (inner key). Each group is a [`SampleSet`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AnalysisError, Result};
use crate::sample::RawSample;

/// Workload size for one batch of measurements
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProblemSize(u64);

impl ProblemSize {
    /// Wrap a raw size value
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Parse a size from text, rejecting zero
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidConfiguration`] if the text is not a
    /// positive integer.
    pub fn parse(text: &str) -> Result<Self> {
        let value: u64 = text.trim().parse().map_err(|_| {
            AnalysisError::InvalidConfiguration(format!("problem size is not an integer: '{text}'"))
        })?;
        if value == 0 {
            return Err(AnalysisError::InvalidConfiguration(
                "problem size must be positive".to_string(),
            ));
        }
        Ok(Self(value))
    }

    /// The raw size value
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProblemSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One experimental configuration
///
/// Fields a batch does not vary are left as `None`. Equality, hashing and
/// ordering are structural, so keys parsed from file names and keys written
/// in a report manifest compare equal when they name the same configuration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConfigurationKey {
    /// Compiler or runtime name (e.g. "omp", "ocl", "gcc")
    pub runtime: String,
    /// Thread count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threads: Option<u32>,
    /// Scheduling policy (e.g. "static", "guided")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    /// Scheduling chunk size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk: Option<u32>,
}

impl ConfigurationKey {
    /// Key with only the runtime set
    pub fn runtime(name: impl Into<String>) -> Self {
        Self {
            runtime: name.into(),
            threads: None,
            schedule: None,
            chunk: None,
        }
    }

    /// Set the thread count
    #[must_use]
    pub fn with_threads(mut self, threads: u32) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Set the scheduling policy
    #[must_use]
    pub fn with_schedule(mut self, schedule: impl Into<String>) -> Self {
        self.schedule = Some(schedule.into());
        self
    }

    /// Set the chunk size
    #[must_use]
    pub fn with_chunk(mut self, chunk: u32) -> Self {
        self.chunk = Some(chunk);
        self
    }

    /// Compact label used in table rows and series names
    ///
    /// ```
    /// use parbench_core::ConfigurationKey;
    ///
    /// let key = ConfigurationKey::runtime("omp").with_threads(4).with_schedule("guided");
    /// assert_eq!(key.label(), "omp-t4-guided");
    /// ```
    #[must_use]
    pub fn label(&self) -> String {
        let mut label = self.runtime.clone();
        if let Some(threads) = self.threads {
            label.push_str(&format!("-t{threads}"));
        }
        if let Some(ref schedule) = self.schedule {
            label.push('-');
            label.push_str(schedule);
        }
        if let Some(chunk) = self.chunk {
            label.push_str(&format!("-c{chunk}"));
        }
        label
    }
}

impl fmt::Display for ConfigurationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// All raw samples for one (problem size, configuration) pair, in input order
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSet {
    size: ProblemSize,
    configuration: ConfigurationKey,
    samples: Vec<RawSample>,
}

impl SampleSet {
    /// Create a sample set
    #[must_use]
    pub fn new(
        size: ProblemSize,
        configuration: ConfigurationKey,
        samples: Vec<RawSample>,
    ) -> Self {
        Self {
            size,
            configuration,
            samples,
        }
    }

    /// Problem size of this set
    #[must_use]
    pub const fn size(&self) -> ProblemSize {
        self.size
    }

    /// Configuration of this set
    #[must_use]
    pub const fn configuration(&self) -> &ConfigurationKey {
        &self.configuration
    }

    /// Samples in input order
    #[must_use]
    pub fn samples(&self) -> &[RawSample] {
        &self.samples
    }

    /// Number of raw samples
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the set has no samples
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub(crate) fn extend(&mut self, samples: impl IntoIterator<Item = RawSample>) {
        self.samples.extend(samples);
    }
}
