//! Pipeline context
//!
//! An [`Experiment`] collects parsed samples for one batch, grouped by
//! problem size and configuration, and runs the consistency check as data
//! arrives. [`Experiment::analyze`] then trims and summarizes every group into
//! an [`ExperimentTable`].
//!
//! ```text
//! file contents ──parse──> RawSample* ──group──> SampleSet
//!                                                   │ trim
//!                                                   v
//!                        ExperimentTable <──summarize── RetainedSet
//! ```
//!
//! # Example
//!
//! ```
//! use parbench_core::experiment::Experiment;
//! use parbench_core::model::{ConfigurationKey, ProblemSize};
//! use parbench_core::sample::{FieldOffset, FormatDescriptor};
//! use parbench_core::stats::StudentTable;
//!
//! # fn example() -> parbench_core::Result<()> {
//! let format = FormatDescriptor::new(1000.0, FieldOffset::new(-2), FieldOffset::new(-1));
//! let mut experiment = Experiment::new(format)?;
//!
//! let content = "5000;1.0\n7000;1.0\n9000;1.0\n12000;1.0\n100000;1.0\n";
//! experiment.ingest(ProblemSize::new(100), ConfigurationKey::runtime("omp"), "lab1-omp-100.txt", content)?;
//!
//! let table = experiment.analyze(&StudentTable::default())?;
//! let means = table.metrics(&ConfigurationKey::runtime("omp"))?;
//! assert!((means[0].mean - 9.333_333).abs() < 1e-6);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, instrument, warn};

use crate::error::{AnalysisError, Result};
use crate::model::{ConfigurationKey, ProblemSize, SampleSet};
use crate::sample::{FormatDescriptor, RawSample};
use crate::stats::{trim, AggregatedMetric, CriticalValueProvider};
use crate::table::{ExperimentTable, TableCell};

/// Coefficient of variation above which a cell is logged as noisy
const NOISY_CV: f64 = 0.10;

/// Cross-configuration check-value validation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyCheck {
    /// Whether check values are compared at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Largest accepted absolute difference
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

fn default_enabled() -> bool {
    true
}

fn default_tolerance() -> f64 {
    1e-6
}

impl Default for ConsistencyCheck {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            tolerance: default_tolerance(),
        }
    }
}

impl ConsistencyCheck {
    /// Check disabled
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            tolerance: 0.0,
        }
    }
}

/// Expected check value for one problem size and where it came from
#[derive(Debug, Clone)]
struct Reference {
    source_name: String,
    value: f64,
}

/// Samples of one batch, grouped by problem size and configuration
#[derive(Debug)]
pub struct Experiment {
    format: FormatDescriptor,
    consistency: ConsistencyCheck,
    sets: BTreeMap<ProblemSize, BTreeMap<ConfigurationKey, SampleSet>>,
    references: BTreeMap<ProblemSize, Reference>,
}

impl Experiment {
    /// Create an empty experiment with the default consistency check
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidConfiguration`] if the format
    /// descriptor is invalid.
    pub fn new(format: FormatDescriptor) -> Result<Self> {
        format.validate()?;
        Ok(Self {
            format,
            consistency: ConsistencyCheck::default(),
            sets: BTreeMap::new(),
            references: BTreeMap::new(),
        })
    }

    /// Replace the consistency check settings
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidConfiguration`] for a negative or
    /// non-finite tolerance on an enabled check.
    pub fn with_consistency(mut self, consistency: ConsistencyCheck) -> Result<Self> {
        if consistency.enabled && !(consistency.tolerance.is_finite() && consistency.tolerance >= 0.0) {
            return Err(AnalysisError::InvalidConfiguration(format!(
                "consistency tolerance must be a non-negative number, got {}",
                consistency.tolerance
            )));
        }
        self.consistency = consistency;
        Ok(self)
    }

    /// Format descriptor used for parsing
    #[must_use]
    pub const fn format(&self) -> &FormatDescriptor {
        &self.format
    }

    /// Parse one file's contents and add its samples.
    ///
    /// Returns the number of samples added.
    ///
    /// # Errors
    ///
    /// - [`AnalysisError::MalformedRecord`] for any unparseable line
    /// - [`AnalysisError::ConsistencyMismatch`] if a check value disagrees with
    ///   the first one seen for this problem size
    #[instrument(skip_all, fields(size = %size, configuration = %configuration, source = source_name))]
    pub fn ingest(
        &mut self,
        size: ProblemSize,
        configuration: ConfigurationKey,
        source_name: &str,
        content: &str,
    ) -> Result<usize> {
        let samples = self.format.parse_str(content, source_name)?;
        let count = samples.len();
        self.add_samples(size, configuration, source_name, samples)?;
        Ok(count)
    }

    /// Add already parsed samples.
    ///
    /// # Errors
    ///
    /// - [`AnalysisError::InvalidConfiguration`] for a zero problem size
    /// - [`AnalysisError::ConsistencyMismatch`] as for [`Experiment::ingest`]
    pub fn add_samples(
        &mut self,
        size: ProblemSize,
        configuration: ConfigurationKey,
        source_name: &str,
        samples: Vec<RawSample>,
    ) -> Result<()> {
        if size.value() == 0 {
            return Err(AnalysisError::InvalidConfiguration(format!(
                "{source_name}: problem size must be positive"
            )));
        }
        if self.consistency.enabled {
            self.check_consistency(size, source_name, &samples)?;
        }

        debug!(
            source = source_name,
            count = samples.len(),
            "adding samples to {configuration} at size {size}"
        );
        self.sets
            .entry(size)
            .or_default()
            .entry(configuration.clone())
            .or_insert_with(|| SampleSet::new(size, configuration, Vec::new()))
            .extend(samples);
        Ok(())
    }

    fn check_consistency(
        &mut self,
        size: ProblemSize,
        source_name: &str,
        samples: &[RawSample],
    ) -> Result<()> {
        let Some(first) = samples.first() else {
            return Ok(());
        };
        let reference = self.references.entry(size).or_insert_with(|| Reference {
            source_name: source_name.to_string(),
            value: first.check(),
        });

        for sample in samples {
            if (sample.check() - reference.value).abs() > self.consistency.tolerance {
                warn!(
                    reference = %reference.source_name,
                    "check value mismatch in {source_name}"
                );
                return Err(AnalysisError::ConsistencyMismatch {
                    source_name: source_name.to_string(),
                    size,
                    expected: reference.value,
                    observed: sample.check(),
                });
            }
        }
        Ok(())
    }

    /// Problem sizes seen so far, ascending
    #[must_use]
    pub fn problem_sizes(&self) -> Vec<ProblemSize> {
        self.sets.keys().copied().collect()
    }

    /// Configurations seen so far, in key order
    #[must_use]
    pub fn configurations(&self) -> BTreeSet<ConfigurationKey> {
        self.sets.values().flat_map(BTreeMap::keys).cloned().collect()
    }

    /// Raw samples for one pair
    #[must_use]
    pub fn sample_set(&self, size: ProblemSize, configuration: &ConfigurationKey) -> Option<&SampleSet> {
        self.sets.get(&size)?.get(configuration)
    }

    /// Whether no samples have been added
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Trim and summarize every sample set.
    ///
    /// # Errors
    ///
    /// The first [`AnalysisError::InsufficientSamples`],
    /// [`AnalysisError::DegenerateSample`] or
    /// [`AnalysisError::UnsupportedSampleSize`] raised by any set aborts the
    /// analysis.
    #[instrument(skip_all)]
    pub fn analyze(&self, provider: &dyn CriticalValueProvider) -> Result<ExperimentTable> {
        let mut table = ExperimentTable::new();

        for (size, configurations) in &self.sets {
            for (configuration, set) in configurations {
                let retained = trim(set)?;
                let metric = AggregatedMetric::from_retained(&retained, provider)?;
                let cv = metric.coefficient_of_variation();
                if cv > NOISY_CV {
                    warn!(
                        "{configuration} at size {size} is noisy: CV {:.1}% over {} samples",
                        cv * 100.0,
                        metric.count
                    );
                }
                debug!(
                    "{configuration} at size {size}: mean={:.4} ci=±{:.4}",
                    metric.mean, metric.confidence_interval
                );
                table.insert(TableCell { retained, metric });
            }
        }

        info!(
            "Analyzed {} cells across {} problem sizes",
            table.cell_count(),
            table.problem_sizes().len()
        );
        Ok(table)
    }
}
