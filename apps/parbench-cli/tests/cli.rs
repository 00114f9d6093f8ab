//! Integration tests for the parbench binary

use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const CONFIG: &str = r#"
[batch]
name = "lab2"

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

[discovery]
pattern = '^(?P<batch>lab\d+)-(?P<runtime>[a-z]+)(-t(?P<threads>\d+))?-(?P<size>\d+)\.txt$'
"#;

fn parbench(args: &[&str]) -> Output {
    parbench_with_log(args, Some("warn"))
}

fn parbench_with_log(args: &[&str], rust_log: Option<&str>) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_parbench"));
    command.args(args);
    match rust_log {
        Some(filter) => command.env("RUST_LOG", filter),
        None => command.env_remove("RUST_LOG"),
    };
    command.output().expect("failed to run parbench")
}

/// `step;step;total;check` records; the first and last runs are the outliers
fn write_results(dir: &Path, name: &str, total_us: u64, check: f64) {
    let mut content = String::new();
    for run in 0..7u64 {
        let total = match run {
            0 => total_us - 100,
            6 => total_us * 3,
            _ => total_us,
        };
        content.push_str(&format!("{};{};{total};{check}\n", total / 4, 3 * total / 4));
    }
    fs::write(dir.join(name), content).unwrap();
}

fn setup() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("lab2.toml"), CONFIG).unwrap();
    for size in [1000u64, 2000] {
        write_results(dir.path(), &format!("lab2-seq-{size}.txt"), 8 * size, 17.0);
        write_results(dir.path(), &format!("lab2-omp-t4-{size}.txt"), 2 * size, 17.0);
        write_results(dir.path(), &format!("lab2-ocl-t4-{size}.txt"), 4 * size, 17.0);
    }
    write_results(dir.path(), "lab3-omp-t4-1000.txt", 1, 99.0);
    dir
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_run_writes_tables_and_series() {
    let dir = setup();
    let config = dir.path().join("lab2.toml");
    let output = parbench(&[
        "--config",
        path_arg(&config),
        "--input",
        path_arg(dir.path()),
        "--quiet",
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(output.stdout.is_empty());

    let read = |name: &str| fs::read_to_string(dir.path().join(name)).unwrap();
    assert_eq!(read("table-lab2-mean.csv"), "omp-t4,2,4\nocl-t4,4,8\n");
    assert_eq!(read("table-lab2-ci.csv"), "omp-t4,0,0\nocl-t4,0,0\n");
    assert_eq!(read("table-lab2-speedup.csv"), "omp-t4,4,4\nocl-t4,2,2\n");
    assert_eq!(read("table-lab2-efficiency.csv"), "omp-t4,1,1\nocl-t4,0.5,0.5\n");
    assert_eq!(read("table-lab2-best.csv"), "omp-t4,2,4\nocl-t4,4,8\n");

    let series: serde_json::Value = serde_json::from_str(&read("series-lab2.json")).unwrap();
    assert_eq!(series["batch"], "lab2");
    assert_eq!(series["problem_sizes"], serde_json::json!([1000, 2000]));
    assert_eq!(series["boxes"][0]["series"][0]["label"], "omp-t4");
    assert_eq!(series["boxes"][0]["series"][0]["timings"].as_array().unwrap().len(), 5);
    assert_eq!(series["bars"][1]["series"][1]["kind"], "shares");
    assert_eq!(series["bars"][1]["series"][1]["shares"], serde_json::json!([0.25, 0.75]));
}

#[test]
fn test_run_is_idempotent() {
    let dir = setup();
    let config = dir.path().join("lab2.toml");
    let out = dir.path().join("out");
    let args = [
        "--config",
        path_arg(&config),
        "--input",
        path_arg(dir.path()),
        "--output",
        path_arg(&out),
        "--format",
        "json",
    ];

    assert!(parbench(&args).status.success());
    let first = fs::read_to_string(out.join("series-lab2.json")).unwrap();
    assert!(parbench(&args).status.success());
    let second = fs::read_to_string(out.join("series-lab2.json")).unwrap();
    assert_eq!(first, second);
    assert!(!out.join("table-lab2-mean.csv").exists());
}

#[test]
fn test_compact_json_series() {
    let dir = setup();
    let config = dir.path().join("lab2.toml");
    let output = parbench(&[
        "--config",
        path_arg(&config),
        "--input",
        path_arg(dir.path()),
        "--format",
        "json",
        "--compact-json",
    ]);
    assert!(output.status.success());

    let series = fs::read_to_string(dir.path().join("series-lab2.json")).unwrap();
    assert!(!series.contains('\n'));
    let value: serde_json::Value = serde_json::from_str(&series).unwrap();
    assert_eq!(value["batch"], "lab2");
}

#[test]
fn test_console_summary_on_stdout() {
    let dir = setup();
    let config = dir.path().join("lab2.toml");
    let out = dir.path().join("out");
    let output = parbench(&[
        "--config",
        path_arg(&config),
        "--input",
        path_arg(dir.path()),
        "--output",
        path_arg(&out),
        "--format",
        "console",
    ]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Batch:          lab2"));
    assert!(stdout.contains("omp-t4"));
    assert!(stdout.contains("Efficiency"));
    assert!(!out.exists());
}

#[test]
fn test_consistency_mismatch_fails() {
    let dir = setup();
    // Files are ingested in name order, so the seq file is compared last
    write_results(dir.path(), "lab2-seq-2000.txt", 16000, 18.5);
    let config = dir.path().join("lab2.toml");
    let output = parbench(&["--config", path_arg(&config), "--input", path_arg(dir.path())]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("lab2-seq-2000.txt"));
    assert!(stderr.contains("expected=17.000000"));
    assert!(stderr.contains("observed=18.500000"));
    assert!(!dir.path().join("table-lab2-mean.csv").exists());
}

#[test]
fn test_unknown_configuration_fails() {
    let dir = setup();
    fs::remove_file(dir.path().join("lab2-ocl-t4-1000.txt")).unwrap();
    fs::remove_file(dir.path().join("lab2-ocl-t4-2000.txt")).unwrap();
    let config = dir.path().join("lab2.toml");
    let output = parbench(&["--config", path_arg(&config), "--input", path_arg(dir.path())]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown configuration 'ocl-t4'"));
}

#[test]
fn test_validate_subcommand() {
    let dir = setup();
    let config = dir.path().join("lab2.toml");
    let output = parbench(&["validate", "--config", path_arg(&config)]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("ok"));

    let broken = dir.path().join("broken.toml");
    fs::write(&broken, CONFIG.replace("scale_factor = 1000.0", "scale_factor = -1.0")).unwrap();
    let output = parbench(&["validate", "--config", path_arg(&broken)]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("scale_factor"));
}

#[test]
fn test_rust_log_controls_log_level() {
    let dir = setup();
    let config = dir.path().join("lab2.toml");
    let args = [
        "--config",
        path_arg(&config),
        "--input",
        path_arg(dir.path()),
        "--quiet",
    ];

    let output = parbench_with_log(&args, Some("warn"));
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains(" INFO "), "stderr: {stderr}");

    let output = parbench_with_log(&args, Some("debug"));
    assert!(String::from_utf8_lossy(&output.stderr).contains(" DEBUG "));

    let output = parbench_with_log(&args, None);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(" INFO "));
    assert!(!stderr.contains(" DEBUG "));
}

#[test]
fn test_missing_config_fails() {
    let output = parbench(&[]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--config"));
}
