//! Statistical analysis of benchmark samples
//!
//! The pipeline trims every raw sample set (drop fastest and slowest), then
//! summarizes the retained timings with mean, sample standard deviation and a
//! Student's-t confidence interval.
//!
//! # Examples
//!
//! ```
//! use parbench_core::model::{ConfigurationKey, ProblemSize, SampleSet};
//! use parbench_core::sample::RawSample;
//! use parbench_core::stats::{trim, AggregatedMetric, StudentTable};
//!
//! let samples = [12.0, 5.0, 7.0, 9.0, 100.0]
//!     .iter()
//!     .map(|&t| RawSample::new(t, 1.0))
//!     .collect();
//! let set = SampleSet::new(ProblemSize::new(1000), ConfigurationKey::runtime("omp"), samples);
//!
//! let retained = trim(&set).unwrap();
//! let metric = AggregatedMetric::from_retained(&retained, &StudentTable::default()).unwrap();
//! println!("mean={:.3} ci=±{:.3}", metric.mean, metric.confidence_interval);
//! ```

pub mod critical;
pub mod percentiles;
pub mod summary;
pub mod trim;

// Re-export main types and functions
pub use critical::{CriticalValueProvider, CriticalValueSource, ExactStudentT, StudentTable};
pub use percentiles::{percentile, BoxSummary};
pub use summary::{mean, sample_variance, AggregatedMetric};
pub use trim::{trim, RetainedSet, MIN_RAW_SAMPLES};
