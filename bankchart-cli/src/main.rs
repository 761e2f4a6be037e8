//! Bankchart CLI: refresh the top 10 Malaysian banks relative performance chart.
//!
//! Commands:
//! - `update`: load prices, normalize against the baseline, write the HTML chart
//! - `banks`: print the bank roster in ranking order

use anyhow::{bail, Context, Result};
use bankchart_core::chart::{render_html, write_html};
use bankchart_core::data::{load_series, LoadPlan, PriceProvider, TracingProgress, YahooProvider};
use bankchart_core::domain::BANKS;
use bankchart_core::{check_schedule, run_pipeline, ChartConfig, ScheduleDecision};
use chrono::{FixedOffset, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(
    name = "bankchart",
    about = "Relative performance chart of the top 10 Malaysian banks"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load prices, normalize and write the HTML chart.
    Update {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Baseline date (YYYY-MM-DD). Overrides the config file.
        #[arg(long)]
        baseline: Option<String>,

        /// HTML output path. Overrides the config file.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Read every ticker from this CSV directory instead of the network.
        #[arg(long)]
        sample_data: Option<PathBuf>,

        /// Mirror downloaded prices as CSV into this directory.
        #[arg(long)]
        write_sample_data: Option<PathBuf>,

        /// CSV directory to fall back to when a download fails.
        /// Defaults to --write-sample-data.
        #[arg(long)]
        fallback_sample_data: Option<PathBuf>,

        /// Refresh even on weekends or before the local run hour.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Print the bank roster in ranking order.
    Banks,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Update {
            config,
            baseline,
            output,
            sample_data,
            write_sample_data,
            fallback_sample_data,
            force,
        } => {
            let mut chart_config = match config {
                Some(path) => ChartConfig::from_file(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => ChartConfig::default(),
            };
            if let Some(date) = baseline {
                chart_config.baseline = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                    .with_context(|| format!("invalid --baseline '{date}', expected YYYY-MM-DD"))?;
            }
            if let Some(path) = output {
                chart_config.output = path;
            }
            let fallback_sample_data = fallback_sample_data.or_else(|| write_sample_data.clone());
            let sources = Sources {
                sample: sample_data,
                mirror: write_sample_data,
                fallback: fallback_sample_data,
            };
            run_update(&chart_config, sources, force)
        }
        Commands::Banks => {
            for bank in BANKS.iter() {
                println!(
                    "{:>2}  {:<8} {:<8} {}",
                    bank.rank, bank.ticker, bank.abbreviation, bank.name
                );
            }
            Ok(())
        }
    }
}

struct Sources {
    sample: Option<PathBuf>,
    mirror: Option<PathBuf>,
    fallback: Option<PathBuf>,
}

fn run_update(config: &ChartConfig, sources: Sources, force: bool) -> Result<()> {
    let now = Utc::now();
    if force {
        info!("--force given; bypassing schedule check");
    } else if let ScheduleDecision::Skip(reason) = check_schedule(now, &config.schedule) {
        info!("{reason}");
        return Ok(());
    }

    let offset = FixedOffset::east_opt(config.schedule.utc_offset_hours * 3600)
        .context("schedule.utc_offset_hours is out of range")?;
    let local_now = now.with_timezone(&offset);
    let today = local_now.date_naive();
    if config.baseline > today {
        bail!(
            "baseline {} is after today ({today}); nothing to chart",
            config.baseline
        );
    }

    let sample_mode = sources.sample.is_some();
    let plan = LoadPlan {
        sample_dir: sources.sample,
        mirror_dir: sources.mirror,
        fallback_dir: sources.fallback,
        start: config.baseline,
        end: today,
    };

    let yahoo = if sample_mode {
        None
    } else {
        Some(YahooProvider::new(&config.provider).context("building Yahoo Finance client")?)
    };
    let provider = yahoo.as_ref().map(|p| p as &dyn PriceProvider);

    let loaded = load_series(&BANKS, &plan, provider, &TracingProgress)
        .context("loading bank prices")?;
    if loaded.used_fallback() {
        warn!("some tickers were served from fallback CSV files");
    }

    let report = run_pipeline(&BANKS, config.baseline, &loaded.series)
        .context("building chart dataset")?;
    for fault in &report.faults {
        warn!(symbol = %fault.symbol, error = %fault.error, "symbol omitted from chart");
    }

    let html = render_html(&report, &config.page_title(), local_now)
        .context("rendering chart page")?;
    write_html(&config.output, &html)
        .with_context(|| format!("writing {}", config.output.display()))?;

    info!(
        dates = report.dataset.len(),
        fingerprint = %report.fingerprint,
        partial = report.is_partial(),
        "chart written"
    );
    println!("Chart updated -> {}", config.output.display());
    Ok(())
}
