//! Aggregated results keyed by configuration and problem size

use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{AnalysisError, Result};
use crate::metrics::{efficiency, speedup};
use crate::model::{ConfigurationKey, ProblemSize};
use crate::stats::{AggregatedMetric, RetainedSet};

/// Statistics for one (configuration, problem size) pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableCell {
    /// Samples left after trimming, ascending by timing
    pub retained: RetainedSet,
    /// Summary over the retained timings
    pub metric: AggregatedMetric,
}

/// Every analysed cell of an experiment
///
/// Rows are configurations in key order; within a row, cells are ordered by
/// ascending problem size.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExperimentTable {
    problem_sizes: Vec<ProblemSize>,
    rows: BTreeMap<ConfigurationKey, BTreeMap<ProblemSize, TableCell>>,
}

impl ExperimentTable {
    /// Empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a cell, replacing any previous cell for the same pair
    pub fn insert(&mut self, cell: TableCell) {
        let size = cell.retained.size();
        if let Err(position) = self.problem_sizes.binary_search(&size) {
            self.problem_sizes.insert(position, size);
        }
        self.rows
            .entry(cell.retained.configuration().clone())
            .or_default()
            .insert(size, cell);
    }

    /// All problem sizes, ascending
    #[must_use]
    pub fn problem_sizes(&self) -> &[ProblemSize] {
        &self.problem_sizes
    }

    /// All configurations, in key order
    pub fn configurations(&self) -> impl Iterator<Item = &ConfigurationKey> {
        self.rows.keys()
    }

    /// Whether any cell exists for `configuration`
    #[must_use]
    pub fn contains(&self, configuration: &ConfigurationKey) -> bool {
        self.rows.contains_key(configuration)
    }

    /// Number of cells
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.rows.values().map(BTreeMap::len).sum()
    }

    /// Whether the table has no cells
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell for one pair
    #[must_use]
    pub fn cell(&self, configuration: &ConfigurationKey, size: ProblemSize) -> Option<&TableCell> {
        self.rows.get(configuration)?.get(&size)
    }

    /// Cells of one configuration, one per problem size, ascending.
    ///
    /// # Errors
    ///
    /// - [`AnalysisError::UnknownConfiguration`] if the configuration is absent
    /// - [`AnalysisError::MissingMeasurement`] if it lacks any problem size
    pub fn row(&self, configuration: &ConfigurationKey) -> Result<Vec<&TableCell>> {
        let cells = self
            .rows
            .get(configuration)
            .ok_or_else(|| AnalysisError::UnknownConfiguration(configuration.clone()))?;
        self.problem_sizes
            .iter()
            .map(|&size| {
                cells.get(&size).ok_or_else(|| AnalysisError::MissingMeasurement {
                    size,
                    configuration: configuration.clone(),
                })
            })
            .collect()
    }

    /// Aggregated metrics of one configuration, one per problem size
    ///
    /// # Errors
    ///
    /// Same as [`ExperimentTable::row`].
    pub fn metrics(&self, configuration: &ConfigurationKey) -> Result<Vec<AggregatedMetric>> {
        Ok(self.row(configuration)?.into_iter().map(|cell| cell.metric).collect())
    }

    /// Speedup of `target` over `baseline` at every problem size, from means
    ///
    /// # Errors
    ///
    /// Row lookup errors for either configuration, or
    /// [`AnalysisError::DivisionByZero`] for a zero target mean.
    pub fn speedups(&self, target: &ConfigurationKey, baseline: &ConfigurationKey) -> Result<Vec<f64>> {
        let baseline_row = self.metrics(baseline)?;
        let target_row = self.metrics(target)?;
        baseline_row
            .iter()
            .zip(&target_row)
            .map(|(base, run)| speedup(base.mean, run.mean))
            .collect()
    }

    /// Parallel efficiency of `target` over `baseline` at every problem size
    ///
    /// # Errors
    ///
    /// Everything [`ExperimentTable::speedups`] can return, plus
    /// [`AnalysisError::InvalidConfiguration`] if `target` has no thread count.
    pub fn efficiencies(
        &self,
        target: &ConfigurationKey,
        baseline: &ConfigurationKey,
    ) -> Result<Vec<f64>> {
        let threads = target.threads.ok_or_else(|| {
            AnalysisError::InvalidConfiguration(format!(
                "efficiency of '{target}' needs a thread count"
            ))
        })?;
        self.speedups(target, baseline)?
            .into_iter()
            .map(|value| efficiency(value, threads))
            .collect()
    }
}
