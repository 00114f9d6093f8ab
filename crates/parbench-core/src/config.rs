//! Per-batch configuration
//!
//! One TOML file describes one experiment batch: how records are laid out,
//! how result files are named, how check values are compared, which
//! critical-value provider to use, and what to report.
//!
//! ```toml
//! [batch]
//! name = "lab5"
//!
//! [format]
//! scale_factor = 1000.0
//! primary = -2
//! check = -1
//!
//! [report]
//! configurations = [{ runtime = "omp" }, { runtime = "ocl" }]
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{AnalysisError, Result};
use crate::experiment::ConsistencyCheck;
use crate::reporter::ReportManifest;
use crate::sample::FormatDescriptor;
use crate::stats::critical::DEFAULT_CONFIDENCE;
use crate::stats::{CriticalValueProvider, CriticalValueSource, ExactStudentT, StudentTable};

/// Main configuration structure loaded from TOML files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Batch identity
    pub batch: BatchSection,
    /// Record layout; `scale_factor` has no default
    pub format: FormatDescriptor,
    /// Result file naming
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    /// Check-value comparison across configurations
    #[serde(default)]
    pub consistency: ConsistencyCheck,
    /// Critical-value provider selection
    #[serde(default)]
    pub statistics: StatisticsConfig,
    /// What to report, and in which order
    pub report: ReportManifest,
}

impl BatchConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML is malformed
    /// - Required fields are missing
    ///
    /// # Example
    ///
    /// ```no_run
    /// use parbench_core::config::BatchConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = BatchConfig::from_file("lab5.toml")?;
    /// config.validate()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse configuration from a TOML string
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or required fields are missing
    ///
    /// # Example
    ///
    /// ```
    /// use parbench_core::config::BatchConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let toml = r#"
    ///     [batch]
    ///     name = "lab1"
    ///
    ///     [format]
    ///     scale_factor = 1000.0
    ///     primary = -2
    ///     check = -1
    ///
    ///     [report]
    ///     configurations = [{ runtime = "omp" }]
    /// "#;
    /// let config = BatchConfig::from_str(toml)?;
    /// assert_eq!(config.batch.name, "lab1");
    /// # Ok(())
    /// # }
    /// # example().unwrap();
    /// ```
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse TOML configuration")
    }

    /// Check every section
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidConfiguration`] for an empty batch
    /// name, an invalid format descriptor, a negative tolerance, an invalid
    /// confidence level, or an invalid manifest.
    pub fn validate(&self) -> Result<()> {
        if self.batch.name.trim().is_empty() {
            return Err(AnalysisError::InvalidConfiguration(
                "batch name must not be empty".to_string(),
            ));
        }
        self.format.validate()?;
        if self.consistency.enabled
            && !(self.consistency.tolerance.is_finite() && self.consistency.tolerance >= 0.0)
        {
            return Err(AnalysisError::InvalidConfiguration(format!(
                "consistency tolerance must be a non-negative number, got {}",
                self.consistency.tolerance
            )));
        }
        self.statistics.provider()?;
        self.report.validate()
    }
}

/// Batch identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSection {
    /// Name used in output file names
    pub name: String,
}

/// Result file naming
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Regular expression with named groups `size` and `runtime`, and
    /// optionally `threads`, `schedule`, `chunk` and `batch`
    #[serde(default = "default_pattern")]
    pub pattern: String,
}

/// Matches `lab<N>-<runtime>-<size>.txt`
pub const DEFAULT_PATTERN: &str = r"^(?P<batch>lab\d+)-(?P<runtime>\w+)-(?P<size>\d+)\.txt$";

fn default_pattern() -> String {
    DEFAULT_PATTERN.to_string()
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            pattern: default_pattern(),
        }
    }
}

/// Critical-value provider selection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatisticsConfig {
    /// Built-in table or exact computation (default: table)
    #[serde(default)]
    pub critical_values: CriticalValueSource,
    /// Two-tailed confidence level (default: 0.95)
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

fn default_confidence() -> f64 {
    DEFAULT_CONFIDENCE
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            critical_values: CriticalValueSource::default(),
            confidence: default_confidence(),
        }
    }
}

impl StatisticsConfig {
    /// Build the configured provider
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidConfiguration`] if the confidence level
    /// is outside (0, 1), or differs from 95% with the built-in table.
    pub fn provider(&self) -> Result<Box<dyn CriticalValueProvider>> {
        match self.critical_values {
            CriticalValueSource::Table => {
                if (self.confidence - DEFAULT_CONFIDENCE).abs() > f64::EPSILON {
                    return Err(AnalysisError::InvalidConfiguration(format!(
                        "the built-in table only covers {DEFAULT_CONFIDENCE} confidence, got {}; use critical_values = \"exact\"",
                        self.confidence
                    )));
                }
                Ok(Box::new(StudentTable::default()))
            }
            CriticalValueSource::Exact => Ok(Box::new(ExactStudentT::new(self.confidence)?)),
        }
    }
}
