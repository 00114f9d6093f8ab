//! Manifest-driven reshaping of an [`ExperimentTable`]
//!
//! No statistics are computed here beyond the cross-configuration ratios the
//! manifest asks for. Rows follow the manifest order, columns follow ascending
//! problem size.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, instrument};

use crate::error::{AnalysisError, Result};
use crate::metrics::{overhead_ratios, step_shares, StepOverhead};
use crate::model::{ConfigurationKey, ProblemSize};
use crate::sample::BreakdownLayout;
use crate::stats::{AggregatedMetric, BoxSummary};
use crate::table::{ExperimentTable, TableCell};

/// Per-size scalar that can be tabulated
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Mean of the retained timings
    Mean,
    /// Half-width of the confidence interval
    ConfidenceInterval,
    /// Fastest retained timing
    Best,
    /// Sample standard deviation
    StdDev,
    /// Check value of the fastest retained sample
    Check,
    /// Baseline mean over configuration mean
    Speedup,
    /// Speedup per thread
    Efficiency,
}

impl MetricKind {
    /// Name used in output file names
    #[must_use]
    pub const fn file_stem(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::ConfidenceInterval => "ci",
            Self::Best => "best",
            Self::StdDev => "std",
            Self::Check => "check",
            Self::Speedup => "speedup",
            Self::Efficiency => "efficiency",
        }
    }

    /// Whether the metric is relative to a baseline configuration
    #[must_use]
    pub const fn needs_baseline(self) -> bool {
        matches!(self, Self::Speedup | Self::Efficiency)
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mean => "Mean",
            Self::ConfidenceInterval => "Confidence interval",
            Self::Best => "Best",
            Self::StdDev => "Std dev",
            Self::Check => "Check",
            Self::Speedup => "Speedup",
            Self::Efficiency => "Efficiency",
        };
        f.write_str(name)
    }
}

fn default_metrics() -> Vec<MetricKind> {
    vec![MetricKind::Mean, MetricKind::ConfidenceInterval]
}

/// Which configurations to report, in which order, and which metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportManifest {
    /// Rows, in output order
    pub configurations: Vec<ConfigurationKey>,
    /// Reference configuration for speedup and efficiency
    #[serde(default)]
    pub baseline: Option<ConfigurationKey>,
    /// Tables to produce (default: mean and confidence interval)
    #[serde(default = "default_metrics")]
    pub metrics: Vec<MetricKind>,
}

impl ReportManifest {
    /// Manifest reporting mean and confidence interval for `configurations`
    #[must_use]
    pub fn new(configurations: Vec<ConfigurationKey>) -> Self {
        Self {
            configurations,
            baseline: None,
            metrics: default_metrics(),
        }
    }

    /// Set the baseline configuration
    #[must_use]
    pub fn with_baseline(mut self, baseline: ConfigurationKey) -> Self {
        self.baseline = Some(baseline);
        self
    }

    /// Replace the metric selection
    #[must_use]
    pub fn with_metrics(mut self, metrics: Vec<MetricKind>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Check the manifest without looking at any data
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidConfiguration`] when the manifest has no
    /// configurations or metrics, lists a configuration twice, requests a
    /// relative metric without a baseline, or requests efficiency for a
    /// configuration without a thread count.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| Err(AnalysisError::InvalidConfiguration(message));

        if self.configurations.is_empty() {
            return invalid("report manifest lists no configurations".to_string());
        }
        if self.metrics.is_empty() {
            return invalid("report manifest selects no metrics".to_string());
        }
        let mut seen = BTreeSet::new();
        for configuration in &self.configurations {
            if !seen.insert(configuration) {
                return invalid(format!("configuration '{configuration}' is listed twice"));
            }
        }
        if self.baseline.is_none() {
            if let Some(metric) = self.metrics.iter().find(|m| m.needs_baseline()) {
                return invalid(format!("metric '{}' needs a baseline", metric.file_stem()));
            }
        }
        if self.metrics.contains(&MetricKind::Efficiency) {
            if let Some(configuration) = self.configurations.iter().find(|c| c.threads.is_none()) {
                return invalid(format!(
                    "efficiency of '{configuration}' needs a thread count"
                ));
            }
        }
        Ok(())
    }
}

/// One configuration's values across problem sizes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    /// Configuration the row belongs to
    pub configuration: ConfigurationKey,
    /// Row label
    pub label: String,
    /// One value per problem size, ascending
    pub values: Vec<f64>,
}

/// One metric for every manifest configuration; also a line-chart series set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricTable {
    /// Tabulated metric
    pub metric: MetricKind,
    /// Column keys, ascending
    pub problem_sizes: Vec<ProblemSize>,
    /// Rows in manifest order
    pub rows: Vec<ReportRow>,
}

/// Retained timings of one configuration at one size
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSeries {
    /// Configuration label
    pub label: String,
    /// Retained timings, ascending
    pub timings: Vec<f64>,
    /// Five-number summary of `timings`
    pub summary: BoxSummary,
}

/// Box-plot data for one problem size
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxGroup {
    /// Problem size
    pub size: ProblemSize,
    /// One series per manifest configuration
    pub series: Vec<BoxSeries>,
}

/// Breakdown of one configuration's best sample
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BarValues {
    /// Fraction of the total per step
    Shares {
        /// Step shares, summing to one
        shares: Vec<f64>,
    },
    /// Wall and profiled time per step
    Overheads {
        /// One entry per logical step
        steps: Vec<StepOverhead>,
    },
}

/// Bar-chart series for one configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    /// Configuration label
    pub label: String,
    /// Breakdown values
    #[serde(flatten)]
    pub values: BarValues,
}

/// Bar-chart data for one problem size
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarGroup {
    /// Problem size
    pub size: ProblemSize,
    /// Series for the configurations that carry a breakdown
    pub series: Vec<BarSeries>,
}

/// Everything emitted for one batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Batch name
    pub batch: String,
    /// Problem sizes, ascending
    pub problem_sizes: Vec<ProblemSize>,
    /// One table per selected metric, in manifest order
    pub tables: Vec<MetricTable>,
    /// Box-plot groups, one per problem size
    pub boxes: Vec<BoxGroup>,
    /// Bar-chart groups; empty when samples carry no breakdown
    pub bars: Vec<BarGroup>,
}

/// Reshapes a table according to a manifest
#[derive(Debug)]
pub struct ReportAdapter<'a> {
    table: &'a ExperimentTable,
    manifest: &'a ReportManifest,
}

impl<'a> ReportAdapter<'a> {
    /// Bind a manifest to a table.
    ///
    /// # Errors
    ///
    /// - [`AnalysisError::InvalidConfiguration`] if the manifest is invalid
    /// - [`AnalysisError::UnknownConfiguration`] naming the first manifest
    ///   configuration (or the baseline) absent from the table
    pub fn new(table: &'a ExperimentTable, manifest: &'a ReportManifest) -> Result<Self> {
        manifest.validate()?;
        for configuration in manifest.configurations.iter().chain(&manifest.baseline) {
            if !table.contains(configuration) {
                return Err(AnalysisError::UnknownConfiguration(configuration.clone()));
            }
        }
        Ok(Self { table, manifest })
    }

    /// Rows for one metric, in manifest order
    ///
    /// # Errors
    ///
    /// Row lookup errors from the table, and the errors of the derived-metric
    /// calculations for [`MetricKind::Speedup`] and [`MetricKind::Efficiency`].
    pub fn metric_table(&self, metric: MetricKind) -> Result<MetricTable> {
        let rows = self
            .manifest
            .configurations
            .iter()
            .map(|configuration| {
                Ok(ReportRow {
                    configuration: configuration.clone(),
                    label: configuration.label(),
                    values: self.values(configuration, metric)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(MetricTable {
            metric,
            problem_sizes: self.table.problem_sizes().to_vec(),
            rows,
        })
    }

    fn values(&self, configuration: &ConfigurationKey, metric: MetricKind) -> Result<Vec<f64>> {
        let baseline = || {
            self.manifest.baseline.as_ref().ok_or_else(|| {
                AnalysisError::InvalidConfiguration(format!(
                    "metric '{}' needs a baseline",
                    metric.file_stem()
                ))
            })
        };

        match metric {
            MetricKind::Speedup => self.table.speedups(configuration, baseline()?),
            MetricKind::Efficiency => self.table.efficiencies(configuration, baseline()?),
            MetricKind::Check => self
                .table
                .row(configuration)?
                .into_iter()
                .map(|cell| best_sample(cell).map(|sample| sample.check()))
                .collect(),
            MetricKind::Mean => self.summary_values(configuration, |m| m.mean),
            MetricKind::ConfidenceInterval => {
                self.summary_values(configuration, |m| m.confidence_interval)
            }
            MetricKind::Best => self.summary_values(configuration, |m| m.best),
            MetricKind::StdDev => self.summary_values(configuration, |m| m.std_dev),
        }
    }

    fn summary_values(
        &self,
        configuration: &ConfigurationKey,
        pick: impl Fn(&AggregatedMetric) -> f64,
    ) -> Result<Vec<f64>> {
        Ok(self
            .table
            .metrics(configuration)?
            .iter()
            .map(pick)
            .collect())
    }

    /// Box-plot groups, one per problem size
    ///
    /// # Errors
    ///
    /// Row lookup errors from the table.
    pub fn box_groups(&self) -> Result<Vec<BoxGroup>> {
        let rows = self.rows()?;
        self.table
            .problem_sizes()
            .iter()
            .enumerate()
            .map(|(column, &size)| {
                let series = rows
                    .iter()
                    .map(|(configuration, cells)| {
                        let timings = cells[column].retained.timings();
                        let summary = BoxSummary::from_samples(&timings).ok_or_else(|| {
                            AnalysisError::DegenerateSample(format!(
                                "no retained timings for '{configuration}' at size {size}"
                            ))
                        })?;
                        Ok(BoxSeries {
                            label: configuration.label(),
                            timings,
                            summary,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(BoxGroup { size, series })
            })
            .collect::<Result<Vec<_>>>()
    }

    /// Bar-chart groups from the best sample's breakdown.
    ///
    /// Configurations whose best sample has no breakdown are left out, as are
    /// sizes where no configuration has one.
    ///
    /// # Errors
    ///
    /// Row lookup errors, and the errors of [`step_shares`] or
    /// [`overhead_ratios`].
    pub fn bar_groups(&self, layout: BreakdownLayout) -> Result<Vec<BarGroup>> {
        let rows = self.rows()?;
        let mut groups = Vec::new();
        for (column, &size) in self.table.problem_sizes().iter().enumerate() {
            let mut series = Vec::new();
            for (configuration, cells) in &rows {
                let breakdown = best_sample(cells[column])?.breakdown();
                if breakdown.is_empty() {
                    continue;
                }
                let values = match layout {
                    BreakdownLayout::Plain => BarValues::Shares {
                        shares: step_shares(breakdown)?,
                    },
                    BreakdownLayout::Interleaved => BarValues::Overheads {
                        steps: overhead_ratios(breakdown)?,
                    },
                };
                series.push(BarSeries {
                    label: configuration.label(),
                    values,
                });
            }
            if !series.is_empty() {
                groups.push(BarGroup { size, series });
            }
        }
        Ok(groups)
    }

    /// Assemble every table and chart series for a batch
    ///
    /// # Errors
    ///
    /// Any error from [`ReportAdapter::metric_table`],
    /// [`ReportAdapter::box_groups`] or [`ReportAdapter::bar_groups`].
    #[instrument(skip(self, layout))]
    pub fn build(&self, batch: &str, layout: Option<BreakdownLayout>) -> Result<Report> {
        let tables = self
            .manifest
            .metrics
            .iter()
            .map(|&metric| self.metric_table(metric))
            .collect::<Result<Vec<_>>>()?;
        let boxes = self.box_groups()?;
        let bars = match layout {
            Some(layout) => self.bar_groups(layout)?,
            None => Vec::new(),
        };
        debug!(
            tables = tables.len(),
            boxes = boxes.len(),
            bars = bars.len(),
            "report assembled"
        );
        Ok(Report {
            batch: batch.to_string(),
            problem_sizes: self.table.problem_sizes().to_vec(),
            tables,
            boxes,
            bars,
        })
    }

    fn rows(&self) -> Result<Vec<(&'a ConfigurationKey, Vec<&'a TableCell>)>> {
        self.manifest
            .configurations
            .iter()
            .map(|configuration| Ok((configuration, self.table.row(configuration)?)))
            .collect::<Result<Vec<_>>>()
    }
}

fn best_sample(cell: &TableCell) -> Result<&crate::sample::RawSample> {
    cell.retained.best().ok_or_else(|| {
        AnalysisError::DegenerateSample(format!(
            "no retained samples for '{}' at size {}",
            cell.retained.configuration(),
            cell.retained.size()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SampleSet;
    use crate::sample::RawSample;
    use crate::stats::{trim, AggregatedMetric, StudentTable};
    use pretty_assertions::assert_eq;

    fn cell(configuration: &ConfigurationKey, size: u64, timings: &[f64]) -> TableCell {
        let samples = timings
            .iter()
            .map(|&t| RawSample::new(t, 3.0).with_breakdown(vec![t / 4.0, 3.0 * t / 4.0]))
            .collect();
        let set = SampleSet::new(ProblemSize::new(size), configuration.clone(), samples);
        let retained = trim(&set).unwrap();
        let metric = AggregatedMetric::from_retained(&retained, &StudentTable::default()).unwrap();
        TableCell { retained, metric }
    }

    fn keys() -> (ConfigurationKey, ConfigurationKey, ConfigurationKey) {
        (
            ConfigurationKey::runtime("seq"),
            ConfigurationKey::runtime("omp").with_threads(4),
            ConfigurationKey::runtime("ocl").with_threads(2),
        )
    }

    fn table() -> ExperimentTable {
        let (seq, omp, ocl) = keys();
        let mut table = ExperimentTable::new();
        for (key, base) in [(&seq, 10.0), (&omp, 2.0), (&ocl, 4.0)] {
            table.insert(cell(key, 100, &[0.5, base, base, base, 99.0]));
            table.insert(cell(key, 200, &[0.5, base * 2.0, base * 2.0, base * 2.0, 99.0]));
        }
        table
    }

    #[test]
    fn test_rows_follow_manifest_order() {
        let (_, omp, ocl) = keys();
        let table = table();
        let manifest = ReportManifest::new(vec![omp, ocl]);
        let adapter = ReportAdapter::new(&table, &manifest).unwrap();
        let means = adapter.metric_table(MetricKind::Mean).unwrap();

        let labels: Vec<&str> = means.rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["omp-t4", "ocl-t2"]);
        assert_eq!(means.rows[0].values, vec![2.0, 4.0]);
        assert_eq!(means.rows[1].values, vec![4.0, 8.0]);
        assert_eq!(
            means.problem_sizes,
            vec![ProblemSize::new(100), ProblemSize::new(200)]
        );
    }

    #[test]
    fn test_unknown_configuration() {
        let (_, omp, _) = keys();
        let table = table();
        let icc = ConfigurationKey::runtime("icc");
        let manifest = ReportManifest::new(vec![omp, icc.clone()]);
        assert_eq!(
            ReportAdapter::new(&table, &manifest).unwrap_err(),
            AnalysisError::UnknownConfiguration(icc)
        );
    }

    #[test]
    fn test_unknown_baseline() {
        let (_, omp, _) = keys();
        let table = table();
        let gcc = ConfigurationKey::runtime("gcc");
        let manifest = ReportManifest::new(vec![omp]).with_baseline(gcc.clone());
        assert_eq!(
            ReportAdapter::new(&table, &manifest).unwrap_err(),
            AnalysisError::UnknownConfiguration(gcc)
        );
    }

    #[test]
    fn test_relative_metrics() {
        let (seq, omp, ocl) = keys();
        let table = table();
        let manifest = ReportManifest::new(vec![omp, ocl])
            .with_baseline(seq)
            .with_metrics(vec![MetricKind::Speedup, MetricKind::Efficiency]);
        let adapter = ReportAdapter::new(&table, &manifest).unwrap();

        let speedup = adapter.metric_table(MetricKind::Speedup).unwrap();
        assert_eq!(speedup.rows[0].values, vec![5.0, 5.0]);
        assert_eq!(speedup.rows[1].values, vec![2.5, 2.5]);

        let efficiency = adapter.metric_table(MetricKind::Efficiency).unwrap();
        assert_eq!(efficiency.rows[0].values, vec![1.25, 1.25]);
        assert_eq!(efficiency.rows[1].values, vec![1.25, 1.25]);
    }

    #[test]
    fn test_scalar_metrics() {
        let (seq, _, _) = keys();
        let table = table();
        let manifest = ReportManifest::new(vec![seq]);
        let adapter = ReportAdapter::new(&table, &manifest).unwrap();

        assert_eq!(adapter.metric_table(MetricKind::Best).unwrap().rows[0].values, vec![10.0, 20.0]);
        assert_eq!(adapter.metric_table(MetricKind::StdDev).unwrap().rows[0].values, vec![0.0, 0.0]);
        assert_eq!(
            adapter.metric_table(MetricKind::ConfidenceInterval).unwrap().rows[0].values,
            vec![0.0, 0.0]
        );
        assert_eq!(adapter.metric_table(MetricKind::Check).unwrap().rows[0].values, vec![3.0, 3.0]);
    }

    #[test]
    fn test_summary_metrics_read_distinct_fields() {
        let omp = ConfigurationKey::runtime("omp");
        let mut table = ExperimentTable::new();
        table.insert(cell(&omp, 100, &[1.0, 2.0, 4.0, 6.0, 100.0]));
        let manifest = ReportManifest::new(vec![omp]);
        let adapter = ReportAdapter::new(&table, &manifest).unwrap();
        let value = |metric| adapter.metric_table(metric).unwrap().rows[0].values[0];

        assert_eq!(value(MetricKind::Mean), 4.0);
        assert_eq!(value(MetricKind::Best), 2.0);
        assert_eq!(value(MetricKind::StdDev), 2.0);
        let expected_ci = 4.303 * 2.0 / 3.0_f64.sqrt();
        assert!((value(MetricKind::ConfidenceInterval) - expected_ci).abs() < 1e-12);
    }

    #[test]
    fn test_manifest_validation() {
        let (seq, omp, _) = keys();
        assert!(ReportManifest::new(vec![]).validate().is_err());
        assert!(ReportManifest::new(vec![omp.clone(), omp.clone()]).validate().is_err());
        assert!(ReportManifest::new(vec![omp.clone()])
            .with_metrics(vec![MetricKind::Speedup])
            .validate()
            .is_err());
        assert!(ReportManifest::new(vec![omp.clone(), seq.clone()])
            .with_baseline(seq.clone())
            .with_metrics(vec![MetricKind::Efficiency])
            .validate()
            .is_err());
        assert!(ReportManifest::new(vec![omp])
            .with_baseline(seq)
            .with_metrics(vec![MetricKind::Speedup, MetricKind::Efficiency])
            .validate()
            .is_ok());
    }

    #[test]
    fn test_box_groups() {
        let (seq, omp, _) = keys();
        let table = table();
        let manifest = ReportManifest::new(vec![omp, seq]);
        let boxes = ReportAdapter::new(&table, &manifest).unwrap().box_groups().unwrap();

        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0].size, ProblemSize::new(100));
        assert_eq!(boxes[0].series[0].label, "omp-t4");
        assert_eq!(boxes[0].series[0].timings, vec![2.0, 2.0, 2.0]);
        assert_eq!(boxes[1].series[1].summary.median, 20.0);
    }

    #[test]
    fn test_bar_groups_by_layout() {
        let (_, omp, _) = keys();
        let table = table();
        let manifest = ReportManifest::new(vec![omp]);
        let adapter = ReportAdapter::new(&table, &manifest).unwrap();

        let shares = adapter.bar_groups(BreakdownLayout::Plain).unwrap();
        assert_eq!(
            shares[0].series[0].values,
            BarValues::Shares {
                shares: vec![0.25, 0.75]
            }
        );

        let overheads = adapter.bar_groups(BreakdownLayout::Interleaved).unwrap();
        match &overheads[1].series[0].values {
            BarValues::Overheads { steps } => {
                assert_eq!(steps.len(), 1);
                assert_eq!(steps[0].wall, 1.0);
                assert_eq!(steps[0].profiled, 3.0);
            }
            other => panic!("unexpected bar values: {other:?}"),
        }
    }

    #[test]
    fn test_build_report() {
        let (seq, omp, ocl) = keys();
        let table = table();
        let manifest = ReportManifest::new(vec![omp, ocl])
            .with_baseline(seq)
            .with_metrics(vec![MetricKind::Mean, MetricKind::Speedup]);
        let report = ReportAdapter::new(&table, &manifest)
            .unwrap()
            .build("lab5", None)
            .unwrap();

        assert_eq!(report.batch, "lab5");
        assert_eq!(report.tables.len(), 2);
        assert_eq!(report.tables[1].metric, MetricKind::Speedup);
        assert_eq!(report.boxes.len(), 2);
        assert!(report.bars.is_empty());
    }
}
