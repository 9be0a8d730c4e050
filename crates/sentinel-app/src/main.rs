use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use sentinel_app::game_loop::{self, LoopOptions, RunSummary};
use sentinel_app::state::SnapshotBoard;
use sentinel_core::config::SimConfig;
use sentinel_sim::SimulationEngine;

/// Headless air-defense engagement simulation.
#[derive(Parser, Debug)]
#[command(name = "sentinel", version)]
struct Args {
    /// YAML configuration file. Built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured RNG seed.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Stop after this many ticks.
    #[arg(short, long, default_value_t = 12_000)]
    ticks: u64,

    /// Pace ticks to wall-clock time.
    #[arg(long)]
    realtime: bool,

    /// Keep running after every threat has resolved.
    #[arg(long)]
    no_stop: bool,

    /// Disable automatic engagement.
    #[arg(long)]
    manual: bool,

    /// Write the run summary as JSON to this file ("-" for stdout).
    #[arg(long)]
    summary: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(summary) if summary.fault.is_none() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(err) => {
            error!(%err, "sentinel failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<RunSummary, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.manual {
        config.auto_engage = false;
    }

    let engine = SimulationEngine::new(config)?;
    let board = Arc::new(SnapshotBoard::new());
    let handle = game_loop::spawn_sim_loop(
        engine,
        Arc::clone(&board),
        LoopOptions {
            max_ticks: Some(args.ticks),
            realtime: args.realtime,
            stop_when_quiescent: !args.no_stop,
        },
    )?;
    let summary = handle
        .join()
        .map_err(|_| "simulation loop thread panicked")?;

    let stats = summary.stats;
    info!(
        seed = summary.seed,
        ticks = summary.ticks,
        elapsed_secs = summary.elapsed_secs,
        spawned = stats.threats_spawned,
        launched = stats.interceptors_launched,
        intercepted = stats.intercepted,
        missed = stats.missed,
        landed = stats.landed,
        escaped = stats.escaped,
        "run complete"
    );

    if let Some(path) = &args.summary {
        let json = serde_json::to_string_pretty(&summary)?;
        if path.as_os_str() == "-" {
            println!("{json}");
        } else {
            std::fs::write(path, json)?;
        }
    }

    Ok(summary)
}
