//! Aggregation pipeline for parallel-computing benchmark results
//!
//! This crate turns raw timing records from benchmark runs into trimmed
//! statistics keyed by (problem size, configuration), derives speedup,
//! efficiency and step breakdowns from them, and shapes the results into
//! tables and chart series.
//!
//! # Features
//!
//! - **Declarative record layout**: signed field offsets, explicit scale factor
//! - **Trimming**: fastest and slowest raw sample dropped, stable tie-break
//! - **Statistics**: mean, sample standard deviation, Student's-t confidence
//!   interval from a pluggable critical-value provider
//! - **Derived metrics**: speedup, parallel efficiency, step shares, overhead
//!   ratios
//! - **Consistency check**: check values must agree per problem size
//! - **Output**: CSV tables, JSON chart series, console summary
//!
//! # Example
//!
//! ```
//! use parbench_core::{ConfigurationKey, Experiment, ProblemSize, ReportAdapter, ReportManifest};
//! use parbench_core::sample::{FieldOffset, FormatDescriptor};
//! use parbench_core::stats::StudentTable;
//!
//! # fn example() -> parbench_core::Result<()> {
//! let format = FormatDescriptor::new(1000.0, FieldOffset::new(-2), FieldOffset::new(-1));
//! let mut experiment = Experiment::new(format)?;
//!
//! let seq = ConfigurationKey::runtime("seq");
//! let omp = ConfigurationKey::runtime("omp").with_threads(4);
//! let size = ProblemSize::new(1000);
//! experiment.ingest(size, seq.clone(), "lab1-seq-1000.txt", "9000;7\n10000;7\n10000;7\n10000;7\n11000;7\n")?;
//! experiment.ingest(size, omp.clone(), "lab1-omp-1000.txt", "1000;7\n2000;7\n2000;7\n2000;7\n3000;7\n")?;
//!
//! let table = experiment.analyze(&StudentTable::default())?;
//! assert_eq!(table.speedups(&omp, &seq)?, vec![5.0]);
//!
//! let manifest = ReportManifest::new(vec![omp, seq]);
//! let report = ReportAdapter::new(&table, &manifest)?.build("lab1", None)?;
//! assert_eq!(report.tables[0].rows[0].values, vec![2.0]);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! # Configuration
//!
//! Batches are configured using TOML files, see [`config::BatchConfig`]:
//!
//! ```toml
//! [batch]
//! name = "lab5"
//!
//! [format]
//! scale_factor = 1000.0
//! primary = -2
//! check = -1
//!
//! [statistics]
//! critical_values = "table"
//!
//! [report]
//! configurations = [{ runtime = "omp", threads = 4 }, { runtime = "ocl", threads = 4 }]
//! baseline = { runtime = "seq" }
//! metrics = ["mean", "confidence_interval", "speedup", "efficiency"]
//! ```

pub mod config;
pub mod error;
pub mod experiment;
pub mod metrics;
pub mod model;
pub mod reporter;
pub mod sample;
pub mod stats;
pub mod table;

// Re-export main types for convenience
pub use config::BatchConfig;
pub use error::{AnalysisError, Result};
pub use experiment::{ConsistencyCheck, Experiment};
pub use model::{ConfigurationKey, ProblemSize, SampleSet};
pub use reporter::{OutputFormat, Report, ReportAdapter, ReportManifest, Reporter};
pub use sample::{FormatDescriptor, RawSample};
pub use table::{ExperimentTable, TableCell};
