//! Headless battlefield runner.
//!
//! Plays a battle without graphics and prints the report as JSON.
//!
//! # Usage
//!
//! ```bash
//! # Play the built-in duel
//! cargo run -p battle_headless
//!
//! # Play a scenario file
//! cargo run -p battle_headless -- run --scenario ambush.ron --pretty
//!
//! # Verify determinism
//! cargo run -p battle_headless -- verify --scenario ambush.ron --runs 5
//! ```
//!
//! Logs go to stderr so stdout stays machine-readable. `RUST_LOG`
//! overrides the level chosen by `--verbose`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use battle_headless::{BattleReport, HeadlessConfig, HeadlessRunner, Scenario, ScenarioError};

#[derive(Parser)]
#[command(name = "battle_headless")]
#[command(about = "Headless battlefield runner")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single battle and print its report
    Run {
        /// Scenario file to load (defaults to the built-in duel)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Keep ticking to max_ticks after one side is wiped out
        #[arg(long)]
        full: bool,

        /// Log progress every N ticks
        #[arg(long, default_value = "0")]
        progress: u64,

        /// Pretty-print the JSON report
        #[arg(long)]
        pretty: bool,
    },

    /// Play the same battle several times and compare final hashes
    Verify {
        /// Scenario file to load (defaults to the built-in duel)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for the report)
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    let result = match cli.command {
        Some(Commands::Run {
            scenario,
            full,
            progress,
            pretty,
        }) => cmd_run(scenario, full, progress, pretty),
        Some(Commands::Verify { scenario, runs }) => cmd_verify(scenario, runs),
        None => cmd_run(None, false, 0, false),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(%err, "Failed to load scenario");
            ExitCode::FAILURE
        }
    }
}

fn load_scenario(path: Option<PathBuf>) -> Result<Scenario, ScenarioError> {
    match path {
        Some(path) => Scenario::load(path),
        None => {
            tracing::info!("No scenario given, playing the built-in duel");
            Ok(Scenario::default())
        }
    }
}

/// Play one battle and print the report.
fn cmd_run(
    scenario: Option<PathBuf>,
    full: bool,
    progress: u64,
    pretty: bool,
) -> Result<ExitCode, ScenarioError> {
    let scenario = load_scenario(scenario)?;
    let runner = HeadlessRunner::with_config(HeadlessConfig {
        run_to_completion: full,
        progress_interval: progress,
    });

    let report = runner.run(&scenario);
    Ok(print_report(&report, pretty))
}

fn print_report(report: &BattleReport, pretty: bool) -> ExitCode {
    let json = if pretty {
        serde_json::to_string_pretty(report)
    } else {
        serde_json::to_string(report)
    };

    match json {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(%err, "Failed to serialize report");
            ExitCode::FAILURE
        }
    }
}

/// Play the same battle `runs` times and compare hashes.
fn cmd_verify(scenario: Option<PathBuf>, runs: u32) -> Result<ExitCode, ScenarioError> {
    let scenario = load_scenario(scenario)?;
    let runner = HeadlessRunner::new();

    tracing::info!(scenario = %scenario.name, runs, "Verifying determinism");

    let mut hashes: Vec<u64> = (0..runs.max(1))
        .map(|run| {
            let report = runner.run(&scenario);
            tracing::debug!(run, hash = report.state_hash, ticks = report.ticks, "Run complete");
            report.state_hash
        })
        .collect();
    hashes.sort_unstable();
    hashes.dedup();

    if hashes.len() == 1 {
        println!("PASS: {runs} runs produced hash {:#018x}", hashes[0]);
        Ok(ExitCode::SUCCESS)
    } else {
        println!("FAIL: {runs} runs produced {} distinct hashes", hashes.len());
        Ok(ExitCode::FAILURE)
    }
}
