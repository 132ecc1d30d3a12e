//! Power position report CLI.
//!
//! Builds the daily reports for one trading date and prints where they were
//! written.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use power_core::Config;
use power_ingestion::{JsonTradeSource, SyntheticTradeSource, TradeSource};
use power_pipeline::PowerTradersReport;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Console filter when `RUST_LOG` is unset: progress from the binary,
/// warnings from the library crates.
const DEFAULT_LOG_FILTER: &str =
    "power_position=info,power_pipeline=warn,power_ingestion=warn,power_reports=warn";

#[derive(Parser)]
#[command(name = "power-position")]
#[command(about = "Daily intraday power position report", long_about = None)]
struct Cli {
    /// Trading date (dd/mm/yyyy)
    #[arg(short, long)]
    date: String,

    /// Output directory (defaults to the configured report location)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where trades come from
    #[arg(long, value_enum, default_value_t = SourceKind::Synthetic)]
    source: SourceKind,

    /// Directory of `<yyyymmdd>.json` trade files (json source)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Seed for the synthetic source
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum SourceKind {
    /// Seeded synthetic trades
    Synthetic,
    /// Trade files exported as JSON
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(seed) = cli.seed {
        config.synthetic.seed = seed;
    }

    let source: Box<dyn TradeSource> = match cli.source {
        SourceKind::Synthetic => Box::new(SyntheticTradeSource::new(config.synthetic.clone())),
        SourceKind::Json => match &cli.data_dir {
            Some(dir) => Box::new(JsonTradeSource::new(dir)),
            None => bail!("--data-dir is required with --source json"),
        },
    };

    let report = PowerTradersReport::with_config(&cli.date, cli.output, source, config)
        .context("invalid report request")?;
    info!(date = %report.date(), run_tag = report.run_tag(), "building power position report");

    let paths = report
        .save_report()
        .with_context(|| format!("power position report for {} failed", cli.date))?;

    println!("{}", paths.aggregated.display());
    println!("{}", paths.profile.display());
    println!("{}", paths.quality.display());
    Ok(())
}
