//! parbench binary
//!
//! Aggregates one batch of benchmark result files into tables and chart
//! series.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use parbench_cli::run_batch;
use parbench_core::{BatchConfig, OutputFormat};

#[derive(Parser, Debug)]
#[command(name = "parbench")]
#[command(version, about = "Aggregate parallel benchmark results into tables and chart series")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Batch configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the result files
    #[arg(short, long, default_value = "build")]
    input: PathBuf,

    /// Directory for output files (default: the input directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Which outputs to produce
    #[arg(short, long, value_enum, default_value = "all")]
    format: FormatArg,

    /// Write the series JSON on one line
    #[arg(long)]
    compact_json: bool,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Do not print the console summary
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a batch configuration without reading any result files
    Validate,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum FormatArg {
    Csv,
    Json,
    Console,
    All,
}

impl FormatArg {
    fn file_formats(self, compact_json: bool) -> Vec<OutputFormat> {
        let json = if compact_json {
            OutputFormat::Json
        } else {
            OutputFormat::JsonPretty
        };
        match self {
            Self::Csv => vec![OutputFormat::Csv],
            Self::Json => vec![json],
            Self::Console => Vec::new(),
            Self::All => vec![OutputFormat::Csv, json],
        }
    }

    fn prints_console(self) -> bool {
        matches!(self, Self::Console | Self::All)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::registry()
        .with(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal()),
        )
        .init();

    let config_path = args
        .config
        .context("No batch configuration given; pass --config <FILE>")?;
    let config = BatchConfig::from_file(&config_path)?;

    if let Some(Command::Validate) = args.command {
        config
            .validate()
            .with_context(|| format!("Invalid batch configuration: {}", config_path.display()))?;
        println!("{}: ok", config_path.display());
        return Ok(());
    }

    tracing::info!("parbench v{}", env!("CARGO_PKG_VERSION"));
    let output = args.output.unwrap_or_else(|| args.input.clone());
    let formats = args.format.file_formats(args.compact_json);
    let outcome = run_batch(&config, &args.input, &output, &formats)?;

    if args.format.prints_console() && !args.quiet {
        print!("{}", outcome.console_summary()?);
    }
    Ok(())
}
