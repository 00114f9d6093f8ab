//! Console reporter
//!
//! Human-readable summary with one ASCII table per selected metric.

use anyhow::Result;
use std::fmt::Write;

use super::adapter::{MetricTable, Report};

const VALUE_WIDTH: usize = 12;

/// Console format reporter
pub struct ConsoleReporter;

impl ConsoleReporter {
    /// Format a report for the terminal
    pub fn format(report: &Report) -> Result<String> {
        let mut output = String::new();

        writeln!(output)?;
        writeln!(output, "╔══════════════════════════════════════════════════════════════╗")?;
        writeln!(output, "║                    BENCHMARK SUMMARY                         ║")?;
        writeln!(output, "╚══════════════════════════════════════════════════════════════╝")?;
        writeln!(output)?;

        writeln!(output, "Batch:          {}", report.batch)?;
        let sizes: Vec<String> = report.problem_sizes.iter().map(ToString::to_string).collect();
        writeln!(output, "Problem sizes:  {}", sizes.join(", "))?;
        writeln!(output)?;

        for table in &report.tables {
            Self::format_table(&mut output, table)?;
        }

        if !report.bars.is_empty() {
            writeln!(output, "Breakdown series: {} problem sizes", report.bars.len())?;
            writeln!(output)?;
        }
        Ok(output)
    }

    fn format_table(output: &mut String, table: &MetricTable) -> Result<()> {
        let label_width = table
            .rows
            .iter()
            .map(|row| row.label.len())
            .chain(std::iter::once("Configuration".len()))
            .max()
            .unwrap_or_default();
        let rule = |left: &str, mid: &str, right: &str| {
            let mut line = format!("  {left}{}", "─".repeat(label_width + 2));
            for _ in &table.problem_sizes {
                line.push_str(mid);
                line.push_str(&"─".repeat(VALUE_WIDTH + 2));
            }
            line.push_str(right);
            line
        };

        writeln!(output, "{}", table.metric)?;
        writeln!(output, "{}", rule("┌", "┬", "┐"))?;
        write!(output, "  │ {:<label_width$} │", "Configuration")?;
        for size in &table.problem_sizes {
            write!(output, " {:>VALUE_WIDTH$} │", size.to_string())?;
        }
        writeln!(output)?;
        writeln!(output, "{}", rule("├", "┼", "┤"))?;

        for row in &table.rows {
            write!(output, "  │ {:<label_width$} │", row.label)?;
            for value in &row.values {
                write!(output, " {:>VALUE_WIDTH$} │", format_value(*value))?;
            }
            writeln!(output)?;
        }
        writeln!(output, "{}", rule("└", "┴", "┘"))?;
        writeln!(output)?;
        Ok(())
    }
}

fn format_value(value: f64) -> String {
    if value != 0.0 && value.abs() < 0.01 {
        format!("{value:.3e}")
    } else {
        format!("{value:.4}")
    }
}
