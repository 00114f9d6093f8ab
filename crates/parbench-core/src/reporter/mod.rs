//! Report shaping and output
//!
//! [`ReportAdapter`] turns an [`ExperimentTable`](crate::table::ExperimentTable)
//! into a [`Report`] following a [`ReportManifest`]. A [`Reporter`] then
//! renders it.
//!
//! # Output Formats
//!
//! - **CSV**: one `table-<batch>-<metric>.csv` per selected metric
//! - **JSON**: chart series in `series-<batch>.json`
//! - **Console**: human-readable tables
//!
//! # Example
//!
//! ```no_run
//! use parbench_core::reporter::{OutputFormat, Report, Reporter};
//!
//! # fn example(report: Report) -> anyhow::Result<()> {
//! let written = Reporter::new(OutputFormat::Csv).write_to_dir(&report, "build")?;
//! println!("{} files written", written.len());
//! # Ok(())
//! # }
//! ```

mod adapter;
mod console;
mod csv;
mod json;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub use adapter::{
    BarGroup, BarSeries, BarValues, BoxGroup, BoxSeries, MetricKind, MetricTable, Report,
    ReportAdapter, ReportManifest, ReportRow,
};
pub use console::ConsoleReporter;
pub use csv::CsvReporter;
pub use json::JsonReporter;

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One CSV table per metric
    Csv,
    /// Compact JSON series
    Json,
    /// Pretty-printed JSON series
    JsonPretty,
    /// Console tables
    #[default]
    Console,
}

/// One rendered output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFile {
    /// File name, without directory
    pub name: String,
    /// File contents
    pub contents: String,
}

/// Renders a [`Report`] in one format
#[derive(Debug, Default)]
pub struct Reporter {
    format: OutputFormat,
}

impl Reporter {
    /// Create a new reporter with the specified output format
    #[must_use]
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Render the report into named files
    pub fn render(&self, report: &Report) -> Result<Vec<ReportFile>> {
        let batch = &report.batch;
        match self.format {
            OutputFormat::Csv => report
                .tables
                .iter()
                .map(|table| {
                    Ok(ReportFile {
                        name: format!("table-{batch}-{}.csv", table.metric.file_stem()),
                        contents: CsvReporter::format(table)?,
                    })
                })
                .collect::<Result<Vec<_>>>(),
            OutputFormat::Json | OutputFormat::JsonPretty => Ok(vec![ReportFile {
                name: format!("series-{batch}.json"),
                contents: JsonReporter::format(report, self.format == OutputFormat::JsonPretty)?,
            }]),
            OutputFormat::Console => Ok(vec![ReportFile {
                name: format!("summary-{batch}.txt"),
                contents: ConsoleReporter::format(report)?,
            }]),
        }
    }

    /// Write every rendered file into `dir`, overwriting existing files
    pub fn write_to_dir<P: AsRef<Path>>(&self, report: &Report, dir: P) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

        self.render(report)?
            .into_iter()
            .map(|file| {
                let path = dir.join(&file.name);
                fs::write(&path, file.contents)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                tracing::debug!("wrote {}", path.display());
                Ok(path)
            })
            .collect::<Result<Vec<_>>>()
    }
}
