//! Error types for the aggregation pipeline
//!
//! Every variant is fatal to the run that produces it: a bad data batch must
//! abort instead of silently producing misleading tables or charts.

use thiserror::Error;

use crate::model::{ConfigurationKey, ProblemSize};

/// Result type alias
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors raised while parsing, aggregating, or reporting benchmark samples
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// An input line could not be parsed with the batch's format descriptor
    #[error("Malformed record in {source_name} line {line}: {reason}")]
    MalformedRecord {
        /// File (or other label) the record came from
        source_name: String,
        /// 1-indexed line number
        line: usize,
        /// What was wrong with the record
        reason: String,
    },

    /// Trimming needs at least three raw samples
    #[error("Insufficient samples for {configuration} at size {size}: got {count}, need at least 3")]
    InsufficientSamples {
        /// Problem size of the sample set
        size: ProblemSize,
        /// Configuration of the sample set
        configuration: ConfigurationKey,
        /// Number of raw samples found
        count: usize,
    },

    /// A statistic or share has a zero denominator
    #[error("Degenerate sample: {0}")]
    DegenerateSample(String),

    /// No critical value is known for this many degrees of freedom
    #[error("Unsupported sample size: no critical value for {degrees_of_freedom} degrees of freedom")]
    UnsupportedSampleSize {
        /// Degrees of freedom that were looked up (retained count - 1)
        degrees_of_freedom: usize,
    },

    /// A configuration or batch parameter is out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The reporting manifest names a configuration the data does not contain
    #[error("Unknown configuration '{0}': requested by the report manifest but absent from the data")]
    UnknownConfiguration(ConfigurationKey),

    /// A configuration has no samples for one of the batch's problem sizes
    #[error("Missing measurements for {configuration} at size {size}")]
    MissingMeasurement {
        /// Problem size without data
        size: ProblemSize,
        /// Configuration without data
        configuration: ConfigurationKey,
    },

    /// A timing ratio was requested with a zero denominator
    #[error("Division by zero: {0}")]
    DivisionByZero(String),

    /// Check values disagree between configurations for the same problem size
    #[error(
        "Consistency check failed in {source_name} (size {size}): expected={expected:.6} observed={observed:.6}"
    )]
    ConsistencyMismatch {
        /// File whose sample disagreed
        source_name: String,
        /// Problem size being compared
        size: ProblemSize,
        /// Reference check value for this problem size
        expected: f64,
        /// Check value that disagreed
        observed: f64,
    },
}
