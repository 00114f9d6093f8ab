//! Command-line front end for the parbench aggregation pipeline
//!
//! Finds a batch's result files, runs them through
//! [`parbench_core`], and writes tables and chart series.

pub mod discovery;
pub mod run;

pub use discovery::{discover, FileMatcher, ResultFile};
pub use run::{run_batch, RunOutcome};
