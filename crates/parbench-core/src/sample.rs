//! Record parsing
//!
//! A record is one line of delimited numeric fields. Where the primary timing,
//! the check value and the optional step breakdown live inside the record is
//! declared per batch by a [`FormatDescriptor`], together with the scale
//! factor that converts the raw timing unit into the reporting unit.
//!
//! ```
//! use parbench_core::sample::{FieldOffset, FormatDescriptor};
//!
//! let format = FormatDescriptor::new(1000.0, FieldOffset::new(-2), FieldOffset::new(-1));
//! let sample = format.parse_line("15320;42.5", "lab1-omp-100.txt", 1).unwrap();
//! assert_eq!(sample.timing(), 15.32);
//! assert_eq!(sample.check(), 42.5);
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AnalysisError, Result};

/// One parsed record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    timing: f64,
    check: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    breakdown: Vec<f64>,
}

impl RawSample {
    /// Sample without a step breakdown
    #[must_use]
    pub const fn new(timing: f64, check: f64) -> Self {
        Self {
            timing,
            check,
            breakdown: Vec::new(),
        }
    }

    /// Attach a step breakdown
    #[must_use]
    pub fn with_breakdown(mut self, breakdown: Vec<f64>) -> Self {
        self.breakdown = breakdown;
        self
    }

    /// Primary timing, already divided by the batch scale factor
    #[must_use]
    pub const fn timing(&self) -> f64 {
        self.timing
    }

    /// Correctness value printed by the benchmark
    #[must_use]
    pub const fn check(&self) -> f64 {
        self.check
    }

    /// Per-step timings, scaled like the primary timing
    #[must_use]
    pub fn breakdown(&self) -> &[f64] {
        &self.breakdown
    }
}

/// Signed field position; negative values count from the end of the record
///
/// `-1` is the last field, `0` the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldOffset(i64);

impl FieldOffset {
    /// Create an offset
    #[must_use]
    pub const fn new(offset: i64) -> Self {
        Self(offset)
    }

    /// Absolute index in a record of `len` fields, if it exists
    #[must_use]
    pub fn resolve(self, len: usize) -> Option<usize> {
        let len = i64::try_from(len).ok()?;
        let index = if self.0 < 0 { len + self.0 } else { self.0 };
        if (0..len).contains(&index) {
            usize::try_from(index).ok()
        } else {
            None
        }
    }

    /// Minimum record length for this offset to exist
    #[must_use]
    pub fn min_len(self) -> usize {
        let span = if self.0 < 0 { self.0.unsigned_abs() } else { self.0.unsigned_abs() + 1 };
        usize::try_from(span).unwrap_or(usize::MAX)
    }
}

/// How breakdown fields are organised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakdownLayout {
    /// One timing per step
    #[default]
    Plain,
    /// Two timings per step: wall-clock followed by device-profiled time
    Interleaved,
}

/// Contiguous run of breakdown fields, with slice semantics on signed bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownSlice {
    /// First field (inclusive)
    #[serde(default)]
    pub start: i64,
    /// End field (exclusive); `None` runs to the end of the record
    #[serde(default)]
    pub end: Option<i64>,
    /// Field organisation
    #[serde(default)]
    pub layout: BreakdownLayout,
}

impl BreakdownSlice {
    fn bounds(&self, len: usize) -> Option<(usize, usize)> {
        let len = i64::try_from(len).ok()?;
        let absolute = |bound: i64| if bound < 0 { len + bound } else { bound };
        let start = absolute(self.start);
        let end = self.end.map_or(len, absolute);
        if start < 0 || end > len || start > end {
            return None;
        }
        Some((usize::try_from(start).ok()?, usize::try_from(end).ok()?))
    }
}

fn default_delimiter() -> char {
    ';'
}

/// Per-batch record layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatDescriptor {
    /// Raw timing unit divided by this value gives the reporting unit.
    /// Required: batches disagree on raw units.
    pub scale_factor: f64,
    /// Field separator
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Position of the primary timing
    pub primary: FieldOffset,
    /// Position of the correctness value
    pub check: FieldOffset,
    /// Optional per-step timings
    #[serde(default)]
    pub breakdown: Option<BreakdownSlice>,
}

impl FormatDescriptor {
    /// Descriptor with `;` delimiter and no breakdown
    #[must_use]
    pub const fn new(scale_factor: f64, primary: FieldOffset, check: FieldOffset) -> Self {
        Self {
            scale_factor,
            delimiter: ';',
            primary,
            check,
            breakdown: None,
        }
    }

    /// Attach a breakdown slice
    #[must_use]
    pub const fn with_breakdown(mut self, breakdown: BreakdownSlice) -> Self {
        self.breakdown = Some(breakdown);
        self
    }

    /// Check the descriptor itself before any record is parsed
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidConfiguration`] if the scale factor is
    /// not a positive finite number.
    pub fn validate(&self) -> Result<()> {
        if !self.scale_factor.is_finite() || self.scale_factor <= 0.0 {
            return Err(AnalysisError::InvalidConfiguration(format!(
                "scale_factor must be a positive finite number, got {}",
                self.scale_factor
            )));
        }
        Ok(())
    }

    /// Minimum number of fields a record needs
    #[must_use]
    pub fn required_fields(&self) -> usize {
        let mut required = self.primary.min_len().max(self.check.min_len());
        if let Some(slice) = self.breakdown {
            for bound in std::iter::once(slice.start).chain(slice.end) {
                let needed = usize::try_from(bound.unsigned_abs()).unwrap_or(usize::MAX);
                required = required.max(needed);
            }
        }
        required
    }

    /// Parse one record
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::MalformedRecord`] if the record is too short,
    /// a required field is not a finite number, or an interleaved breakdown
    /// has an odd number of fields.
    pub fn parse_line(&self, line: &str, source_name: &str, line_number: usize) -> Result<RawSample> {
        let malformed = |reason: String| AnalysisError::MalformedRecord {
            source_name: source_name.to_string(),
            line: line_number,
            reason,
        };

        let fields: Vec<&str> = line.trim().split(self.delimiter).map(str::trim).collect();
        let required = self.required_fields();
        if fields.len() < required {
            return Err(malformed(format!(
                "expected at least {required} fields, found {}",
                fields.len()
            )));
        }

        let number = |index: usize| -> Result<f64> {
            let text = fields[index];
            match text.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(value),
                _ => Err(malformed(format!("field {index} is not a number: '{text}'"))),
            }
        };
        let locate = |offset: FieldOffset, name: &str| -> Result<usize> {
            offset
                .resolve(fields.len())
                .ok_or_else(|| malformed(format!("{name} field {} is out of range", offset.0)))
        };

        let timing = number(locate(self.primary, "primary")?)? / self.scale_factor;
        let check = number(locate(self.check, "check")?)?;

        let mut breakdown = Vec::new();
        if let Some(slice) = self.breakdown {
            let (start, end) = slice
                .bounds(fields.len())
                .ok_or_else(|| malformed("breakdown slice is out of range".to_string()))?;
            if slice.layout == BreakdownLayout::Interleaved && (end - start) % 2 != 0 {
                return Err(malformed(format!(
                    "interleaved breakdown needs an even number of fields, found {}",
                    end - start
                )));
            }
            for index in start..end {
                breakdown.push(number(index)? / self.scale_factor);
            }
        }

        Ok(RawSample {
            timing,
            check,
            breakdown,
        })
    }

    /// Parse every non-blank line of a file's contents
    ///
    /// # Errors
    ///
    /// Fails on the first malformed record.
    pub fn parse_str(&self, content: &str, source_name: &str) -> Result<Vec<RawSample>> {
        let samples = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| self.parse_line(line, source_name, index + 1))
            .collect::<Result<Vec<_>>>()?;
        debug!(source = source_name, count = samples.len(), "parsed records");
        Ok(samples)
    }
}
