//! Two-tailed Student's-t critical values.
//!
//! The statistics engine asks a [`CriticalValueProvider`] for the critical
//! value at a given number of degrees of freedom. [`StudentTable`] is the
//! built-in lookup table at 95% confidence; [`ExactStudentT`] takes the
//! quantile of the t distribution for any confidence level and is a drop-in
//! replacement.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};
use std::collections::BTreeMap;

use crate::error::{AnalysisError, Result};

/// Confidence level of the built-in table
pub const DEFAULT_CONFIDENCE: f64 = 0.95;

/// Source of two-tailed critical values
pub trait CriticalValueProvider: std::fmt::Debug {
    /// Critical value for `degrees_of_freedom`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::UnsupportedSampleSize`] when no value is
    /// available for this many degrees of freedom.
    fn critical_value(&self, degrees_of_freedom: usize) -> Result<f64>;
}

/// Which provider a batch uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriticalValueSource {
    /// Built-in 95% table
    #[default]
    Table,
    /// Numerical quantile at the configured level
    Exact,
}

/// Two-tailed 95% values, degrees of freedom 1..=30 plus 40, 60 and 120
const T_95: [(usize, f64); 33] = [
    (1, 12.706),
    (2, 4.303),
    (3, 3.182),
    (4, 2.776),
    (5, 2.571),
    (6, 2.447),
    (7, 2.365),
    (8, 2.306),
    (9, 2.262),
    (10, 2.228),
    (11, 2.201),
    (12, 2.179),
    (13, 2.160),
    (14, 2.145),
    (15, 2.131),
    (16, 2.120),
    (17, 2.110),
    (18, 2.101),
    (19, 2.093),
    (20, 2.086),
    (21, 2.080),
    (22, 2.074),
    (23, 2.069),
    (24, 2.064),
    (25, 2.060),
    (26, 2.056),
    (27, 2.052),
    (28, 2.048),
    (29, 2.045),
    (30, 2.042),
    (40, 2.021),
    (60, 2.000),
    (120, 1.980),
];

/// Fixed lookup table keyed by degrees of freedom
///
/// Only exact matches are served; there is no interpolation between rows.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentTable {
    values: BTreeMap<usize, f64>,
}

impl StudentTable {
    /// Table from explicit `(degrees of freedom, critical value)` rows
    pub fn from_rows(rows: impl IntoIterator<Item = (usize, f64)>) -> Self {
        Self {
            values: rows.into_iter().collect(),
        }
    }

    /// Degrees of freedom covered by this table
    pub fn degrees_of_freedom(&self) -> impl Iterator<Item = usize> + '_ {
        self.values.keys().copied()
    }
}

impl Default for StudentTable {
    fn default() -> Self {
        Self::from_rows(T_95)
    }
}

impl CriticalValueProvider for StudentTable {
    fn critical_value(&self, degrees_of_freedom: usize) -> Result<f64> {
        self.values
            .get(&degrees_of_freedom)
            .copied()
            .ok_or(AnalysisError::UnsupportedSampleSize { degrees_of_freedom })
    }
}

/// Student's-t quantile from the `statrs` inverse CDF
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExactStudentT {
    confidence: f64,
}

impl ExactStudentT {
    /// Provider for a two-tailed confidence level in (0, 1)
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidConfiguration`] for levels outside (0, 1).
    pub fn new(confidence: f64) -> Result<Self> {
        if !(confidence > 0.0 && confidence < 1.0) {
            return Err(AnalysisError::InvalidConfiguration(format!(
                "confidence level must be in (0, 1), got {confidence}"
            )));
        }
        Ok(Self { confidence })
    }

    /// Configured confidence level
    #[must_use]
    pub const fn confidence(&self) -> f64 {
        self.confidence
    }
}

impl Default for ExactStudentT {
    fn default() -> Self {
        Self {
            confidence: DEFAULT_CONFIDENCE,
        }
    }
}

impl CriticalValueProvider for ExactStudentT {
    fn critical_value(&self, degrees_of_freedom: usize) -> Result<f64> {
        let unsupported = || AnalysisError::UnsupportedSampleSize { degrees_of_freedom };
        if degrees_of_freedom == 0 {
            return Err(unsupported());
        }
        let alpha = 1.0 - self.confidence;
        let distribution =
            StudentsT::new(0.0, 1.0, degrees_of_freedom as f64).map_err(|_| unsupported())?;
        let quantile = distribution.inverse_cdf(1.0 - alpha / 2.0);
        if quantile.is_finite() {
            Ok(quantile)
        } else {
            Err(unsupported())
        }
    }
}
