//! One batch, from result files to report files

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use parbench_core::reporter::ConsoleReporter;
use parbench_core::{BatchConfig, Experiment, OutputFormat, Report, ReportAdapter, Reporter};

use crate::discovery::{discover, FileMatcher};

/// What a batch run produced
#[derive(Debug)]
pub struct RunOutcome {
    /// Number of result files read
    pub files: usize,
    /// Number of records parsed
    pub samples: usize,
    /// Output files written, in write order
    pub written: Vec<PathBuf>,
    /// The assembled report
    pub report: Report,
}

impl RunOutcome {
    /// Console rendering of the report
    pub fn console_summary(&self) -> Result<String> {
        ConsoleReporter::format(&self.report)
    }
}

/// Read every result file of the batch in `input`, analyze, and write one
/// output per entry of `formats` into `output`.
///
/// Any failure aborts the run before output is written.
#[instrument(skip_all, fields(batch = %config.batch.name))]
pub fn run_batch(
    config: &BatchConfig,
    input: &Path,
    output: &Path,
    formats: &[OutputFormat],
) -> Result<RunOutcome> {
    config.validate().context("Invalid batch configuration")?;

    let matcher = FileMatcher::new(&config.discovery.pattern, &config.batch.name)?;
    let files = discover(input, &matcher)?;
    info!("Found {} result files in {}", files.len(), input.display());

    let mut experiment = Experiment::new(config.format.clone())?.with_consistency(config.consistency)?;
    let mut samples = 0;
    for file in &files {
        let content = fs::read_to_string(&file.path)
            .with_context(|| format!("Failed to read result file: {}", file.path.display()))?;
        samples += experiment.ingest(file.size, file.configuration.clone(), &file.name, &content)?;
    }
    info!(
        "Parsed {samples} records for {} configurations",
        experiment.configurations().len()
    );

    let provider = config.statistics.provider()?;
    let table = experiment.analyze(provider.as_ref())?;
    let report = ReportAdapter::new(&table, &config.report)?
        .build(&config.batch.name, config.format.breakdown.map(|b| b.layout))?;

    let mut written = Vec::new();
    for &format in formats {
        written.extend(Reporter::new(format).write_to_dir(&report, output)?);
    }
    info!("Wrote {} files to {}", written.len(), output.display());

    Ok(RunOutcome {
        files: files.len(),
        samples,
        written,
        report,
    })
}
