//! CSV tables, one file per metric
//!
//! Each line is a configuration label followed by one value per problem
//! size. No header row is written; labels holding a delimiter or quote are
//! quoted.

use anyhow::{Context, Result};

use super::adapter::MetricTable;

/// CSV format reporter
pub struct CsvReporter;

impl CsvReporter {
    /// Format one metric table
    pub fn format(table: &MetricTable) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        for row in &table.rows {
            let record = std::iter::once(row.label.clone())
                .chain(row.values.iter().map(f64::to_string));
            writer
                .write_record(record)
                .with_context(|| format!("Failed to write CSV row for {}", row.label))?;
        }
        let bytes = writer.into_inner().context("Failed to flush CSV output")?;
        Ok(String::from_utf8(bytes)?)
    }
}
