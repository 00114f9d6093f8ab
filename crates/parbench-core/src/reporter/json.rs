//! JSON chart series

use anyhow::Result;

use super::adapter::Report;

/// JSON format reporter
pub struct JsonReporter;

impl JsonReporter {
    /// Format a report as JSON
    ///
    /// # Arguments
    ///
    /// * `report` - The report to format
    /// * `pretty` - Whether to pretty-print the JSON
    pub fn format(report: &Report, pretty: bool) -> Result<String> {
        let output = if pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };
        Ok(output)
    }
}
