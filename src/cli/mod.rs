mod render;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use ccdaily::config::Settings;
use ccdaily::services::{RefreshScheduler, UsageQueryService, DEFAULT_REFRESH_INTERVAL};
use ccdaily::types::{DailySummary, PeriodTotals};

const DEFAULT_DAYS: u32 = 7;

/// Daily Claude Code token usage and cost
#[derive(Parser)]
#[command(name = "ccdaily")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Claude data directory [default: $CLAUDE_CONFIG_DIR or ~/.claude]
    #[arg(long, global = true, value_name = "DIR")]
    claude_dir: Option<String>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show today's usage (default)
    Today {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show usage for each of the last N days
    Recent {
        /// Number of days, ending today
        #[arg(long, default_value_t = DEFAULT_DAYS, value_parser = clap::value_parser!(u32).range(1..))]
        days: u32,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Refresh periodically (Enter refreshes now, Ctrl-C exits)
    Watch {
        /// Seconds between refreshes
        #[arg(long, default_value_t = DEFAULT_REFRESH_INTERVAL.as_secs())]
        interval: u64,

        /// Number of days in the trailing window
        #[arg(long, default_value_t = DEFAULT_DAYS, value_parser = clap::value_parser!(u32).range(1..))]
        days: u32,
    },

    /// Check that the data directory looks usable
    Check,
}

#[derive(Serialize)]
struct RecentReport<'a> {
    days: &'a [DailySummary],
    totals: PeriodTotals,
}

impl Cli {
    pub fn verbose(&self) -> u8 {
        self.verbose
    }

    pub fn run(self) -> anyhow::Result<()> {
        let settings = Settings::resolve(self.claude_dir.as_deref())?;
        info!(claude_dir = %settings.claude_dir().display(), "using data directory");

        match self.command {
            None => run_today(&settings, false),
            Some(Commands::Today { json }) => run_today(&settings, json),
            Some(Commands::Recent { days, json }) => run_recent(&settings, days as usize, json),
            Some(Commands::Watch { interval, days }) => {
                run_watch(&settings, Duration::from_secs(interval), days as usize)
            }
            Some(Commands::Check) => run_check(&settings),
        }
    }
}

fn run_today(settings: &Settings, json: bool) -> anyhow::Result<()> {
    let summary = UsageQueryService::from_settings(settings).today()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", render::render_day(&summary));
    }
    Ok(())
}

fn run_recent(settings: &Settings, days: usize, json: bool) -> anyhow::Result<()> {
    let summaries = UsageQueryService::from_settings(settings).last_n_days(days)?;
    if json {
        let report = RecentReport {
            days: &summaries,
            totals: PeriodTotals::from_daily_summaries(&summaries),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render::render_table(&summaries));
    }
    Ok(())
}

fn run_check(settings: &Settings) -> anyhow::Result<()> {
    let validation = settings.validate();
    println!("{}: {}", settings.claude_dir().display(), validation);
    if !validation.is_valid() {
        anyhow::bail!("data directory check failed: {}", validation);
    }

    let stats = UsageQueryService::from_settings(settings).load()?.stats;
    println!(
        "{} files read, {} skipped, {} records ({} duplicates removed), {} malformed lines",
        stats.files_read,
        stats.files_skipped,
        stats.records_parsed - stats.duplicates_removed,
        stats.duplicates_removed,
        stats.malformed_lines,
    );
    Ok(())
}

fn run_watch(settings: &Settings, interval: Duration, days: usize) -> anyhow::Result<()> {
    let service = Arc::new(UsageQueryService::from_settings(settings));
    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;

    runtime.block_on(async move {
        let (handle, mut reports) = RefreshScheduler::spawn(service, interval, days);
        let mut stdin = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;

        eprintln!("Press Enter to refresh, Ctrl-C to exit");
        loop {
            tokio::select! {
                report = reports.recv() => match report {
                    Some(report) => println!("{}", render::render_report(&report)),
                    None => break,
                },
                line = stdin.next_line(), if stdin_open => match line {
                    Ok(Some(_)) => {
                        handle.refresh_now();
                    }
                    _ => stdin_open = false,
                },
                _ = tokio::signal::ctrl_c() => break,
            }
        }

        handle.shutdown().await;
    });

    // A pending stdin read would otherwise block runtime drop
    runtime.shutdown_timeout(Duration::from_millis(100));
    Ok(())
}
