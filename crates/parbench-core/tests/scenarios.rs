//! End-to-end scenarios for the aggregation pipeline

use parbench_core::config::BatchConfig;
use parbench_core::metrics::{efficiency, overhead_ratios, speedup};
use parbench_core::reporter::{BarValues, MetricKind, OutputFormat, Reporter};
use parbench_core::sample::{BreakdownLayout, FieldOffset, FormatDescriptor};
use parbench_core::stats::{trim, AggregatedMetric, StudentTable};
use parbench_core::{
    AnalysisError, ConfigurationKey, Experiment, ProblemSize, RawSample, ReportAdapter,
    ReportManifest, SampleSet,
};
use pretty_assertions::assert_eq;

fn records(timings_us: &[u64], check: f64) -> String {
    timings_us.iter().map(|t| format!("{t};{check}\n")).collect()
}

#[test]
fn test_trim_and_summarize_five_samples() {
    let samples = [12.0, 5.0, 7.0, 9.0, 100.0]
        .iter()
        .map(|&t| RawSample::new(t, 0.0))
        .collect();
    let set = SampleSet::new(ProblemSize::new(10), ConfigurationKey::runtime("omp"), samples);

    let retained = trim(&set).unwrap();
    assert_eq!(retained.timings(), vec![7.0, 9.0, 12.0]);

    let metric = AggregatedMetric::from_retained(&retained, &StudentTable::default()).unwrap();
    let mean = 28.0 / 3.0;
    let variance: f64 = [7.0, 9.0, 12.0]
        .iter()
        .map(|x: &f64| (x - mean).powi(2))
        .sum::<f64>()
        / 2.0;
    assert!((metric.mean - 9.333_333_333).abs() < 1e-9);
    assert!((metric.std_dev - f64::sqrt(variance)).abs() < 1e-12);
    assert!((metric.confidence_interval - 4.303 * metric.std_dev / 3f64.sqrt()).abs() < 1e-12);
}

#[test]
fn test_speedup_and_efficiency() {
    let value = speedup(10.0, 2.0).unwrap();
    assert_eq!(value, 5.0);
    assert_eq!(efficiency(value, 4).unwrap(), 1.25);
}

#[test]
fn test_interleaved_overhead_ratios() {
    let steps = overhead_ratios(&[10.0, 20.0, 30.0, 40.0]).unwrap();
    let ratios: Vec<f64> = steps.iter().map(|s| s.ratio).collect();
    assert_eq!(ratios, vec![0.5, 0.75]);
}

#[test]
fn test_unknown_configuration_aborts_report() {
    let format = FormatDescriptor::new(1000.0, FieldOffset::new(-2), FieldOffset::new(-1));
    let mut experiment = Experiment::new(format).unwrap();
    let omp = ConfigurationKey::runtime("omp");
    experiment
        .ingest(ProblemSize::new(100), omp.clone(), "lab1-omp-100.txt", &records(&[1, 2, 3, 4], 1.0))
        .unwrap();
    let table = experiment.analyze(&StudentTable::default()).unwrap();

    let missing = ConfigurationKey::runtime("ocl").with_threads(8);
    let manifest = ReportManifest::new(vec![omp, missing.clone()]);
    let error = ReportAdapter::new(&table, &manifest).unwrap_err();
    assert_eq!(error, AnalysisError::UnknownConfiguration(missing));
    assert!(error.to_string().contains("ocl-t8"));
}

#[test]
fn test_consistency_mismatch_aborts_ingest() {
    let format = FormatDescriptor::new(1000.0, FieldOffset::new(-2), FieldOffset::new(-1));
    let mut experiment = Experiment::new(format).unwrap();
    let size = ProblemSize::new(100);
    experiment
        .ingest(size, ConfigurationKey::runtime("ocl"), "lab2-ocl-100.txt", &records(&[5, 6, 7], 42.0))
        .unwrap();
    let error = experiment
        .ingest(size, ConfigurationKey::runtime("omp"), "lab2-omp-100.txt", &records(&[5, 6, 7], 41.0))
        .unwrap_err();

    let message = error.to_string();
    assert!(message.contains("lab2-omp-100.txt"));
    assert!(message.contains("expected=42.000000"));
    assert!(message.contains("observed=41.000000"));
}

#[test]
fn test_missing_problem_size_is_reported() {
    let format = FormatDescriptor::new(1.0, FieldOffset::new(0), FieldOffset::new(1));
    let mut experiment = Experiment::new(format).unwrap();
    let omp = ConfigurationKey::runtime("omp");
    let ocl = ConfigurationKey::runtime("ocl");
    experiment
        .ingest(ProblemSize::new(1), omp.clone(), "a", &records(&[1, 2, 3, 4], 0.0))
        .unwrap();
    experiment
        .ingest(ProblemSize::new(2), omp.clone(), "b", &records(&[1, 2, 3, 4], 0.0))
        .unwrap();
    experiment
        .ingest(ProblemSize::new(1), ocl.clone(), "c", &records(&[1, 2, 3, 4], 0.0))
        .unwrap();
    let table = experiment.analyze(&StudentTable::default()).unwrap();

    let manifest = ReportManifest::new(vec![omp, ocl.clone()]);
    let adapter = ReportAdapter::new(&table, &manifest).unwrap();
    assert_eq!(
        adapter.metric_table(MetricKind::Mean).unwrap_err(),
        AnalysisError::MissingMeasurement {
            size: ProblemSize::new(2),
            configuration: ocl,
        }
    );
}

#[test]
fn test_batch_from_config_to_files() {
    let config = BatchConfig::from_str(
        r#"
        [batch]
        name = "lab4"

        [format]
        scale_factor = 1000.0
        primary = -2
        check = -1

        [format.breakdown]
        start = 0
        end = -2

        [report]
        configurations = [{ runtime = "omp", threads = 4 }, { runtime = "ocl", threads = 4 }]
        baseline = { runtime = "seq" }
        metrics = ["mean", "confidence_interval", "best", "speedup", "efficiency"]
        "#,
    )
    .unwrap();
    config.validate().unwrap();

    let provider = config.statistics.provider().unwrap();
    let mut experiment = Experiment::new(config.format.clone())
        .unwrap()
        .with_consistency(config.consistency)
        .unwrap();

    // step1;step2;total;check, timings in microseconds
    let inputs = [
        (ConfigurationKey::runtime("seq"), [1000u64, 9000, 10000]),
        (ConfigurationKey::runtime("omp").with_threads(4), [500, 1500, 2000]),
        (ConfigurationKey::runtime("ocl").with_threads(4), [1000, 3000, 4000]),
    ];
    for (key, [first, second, total]) in &inputs {
        // Six runs; the last one is slow and gets trimmed
        let content: String = (0..6)
            .map(|run| {
                let total = if run == 5 { total + 5000 } else { *total };
                format!("{first};{second};{total};3.5\n")
            })
            .collect();
        experiment
            .ingest(ProblemSize::new(256), key.clone(), &format!("lab4-{key}-256.txt"), &content)
            .unwrap();
    }

    let table = experiment.analyze(provider.as_ref()).unwrap();
    let report = ReportAdapter::new(&table, &config.report)
        .unwrap()
        .build(&config.batch.name, config.format.breakdown.map(|b| b.layout))
        .unwrap();

    let values = |metric: MetricKind| -> Vec<Vec<f64>> {
        report
            .tables
            .iter()
            .find(|table| table.metric == metric)
            .unwrap()
            .rows
            .iter()
            .map(|row| row.values.clone())
            .collect()
    };
    assert_eq!(values(MetricKind::Mean), vec![vec![2.0], vec![4.0]]);
    assert_eq!(values(MetricKind::ConfidenceInterval), vec![vec![0.0], vec![0.0]]);
    assert_eq!(values(MetricKind::Speedup), vec![vec![5.0], vec![2.5]]);
    assert_eq!(values(MetricKind::Efficiency), vec![vec![1.25], vec![0.625]]);

    assert_eq!(report.bars.len(), 1);
    assert_eq!(
        report.bars[0].series[0].values,
        BarValues::Shares {
            shares: vec![0.25, 0.75]
        }
    );
    assert_eq!(config.format.breakdown.unwrap().layout, BreakdownLayout::Plain);

    let dir = tempfile::tempdir().unwrap();
    let written = Reporter::new(OutputFormat::Csv)
        .write_to_dir(&report, dir.path())
        .unwrap();
    assert_eq!(written.len(), 5);
    let mean_csv = std::fs::read_to_string(dir.path().join("table-lab4-mean.csv")).unwrap();
    assert_eq!(mean_csv, "omp-t4,2\nocl-t4,4\n");
}
