//! Simulation loop thread: ticks the engine, publishes snapshots and logs
//! events.
//!
//! The engine is moved into the thread and owned there. Commands arrive via
//! an `mpsc` channel; snapshots go to the shared `SnapshotBoard`.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, error, info};

use sentinel_core::enums::SimPhase;
use sentinel_core::events::{EngagementRecord, SimEvent};
use sentinel_core::state::{SimSnapshot, StatsView};
use sentinel_sim::SimulationEngine;

use crate::state::{LoopCommand, SnapshotBoard};

/// How the loop runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopOptions {
    /// Stop after this many calls to `tick()`.
    pub max_ticks: Option<u64>,
    /// Sleep so simulated time tracks wall-clock time.
    pub realtime: bool,
    /// Stop once every scheduled threat has spawned and resolved.
    pub stop_when_quiescent: bool,
}

/// End-of-run report.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub seed: u64,
    pub ticks: u64,
    pub elapsed_secs: f64,
    pub phase: SimPhase,
    pub stats: StatsView,
    pub records: Vec<EngagementRecord>,
    /// Set when a tick failed and the engine faulted.
    pub fault: Option<String>,
}

/// Handle to a running loop thread.
pub struct LoopHandle {
    commands: mpsc::Sender<LoopCommand>,
    thread: JoinHandle<RunSummary>,
}

impl LoopHandle {
    /// A sender for queuing commands from other threads.
    pub fn commands(&self) -> mpsc::Sender<LoopCommand> {
        self.commands.clone()
    }

    /// Ask the loop to stop. Ignored if it already has.
    pub fn shutdown(&self) {
        let _ = self.commands.send(LoopCommand::Shutdown);
    }

    /// Wait for the loop to finish and return its summary.
    pub fn join(self) -> std::thread::Result<RunSummary> {
        self.thread.join()
    }
}

/// Spawns the simulation loop in a new thread.
pub fn spawn_sim_loop(
    engine: SimulationEngine,
    board: Arc<SnapshotBoard>,
    options: LoopOptions,
) -> std::io::Result<LoopHandle> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<LoopCommand>();

    let thread = std::thread::Builder::new()
        .name("sentinel-sim-loop".into())
        .spawn(move || run_sim_loop(engine, &cmd_rx, &board, options))?;

    Ok(LoopHandle {
        commands: cmd_tx,
        thread,
    })
}

/// The simulation loop. Runs until a stop condition, a Shutdown command, a
/// disconnected channel or a faulted tick.
pub fn run_sim_loop(
    mut engine: SimulationEngine,
    cmd_rx: &mpsc::Receiver<LoopCommand>,
    board: &SnapshotBoard,
    options: LoopOptions,
) -> RunSummary {
    let tick_duration = Duration::from_secs_f64(engine.config().tick_secs);
    let mut next_tick_time = Instant::now();
    let mut ticks_run = 0u64;
    let mut fault = None;

    'run: loop {
        // 1. Drain all pending commands
        loop {
            match cmd_rx.try_recv() {
                Ok(LoopCommand::Operator(command)) => {
                    debug!(?command, "operator command queued");
                    engine.queue_command(command);
                }
                Ok(LoopCommand::Shutdown) => {
                    info!("shutdown requested");
                    break 'run;
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => break 'run,
            }
        }

        if options.max_ticks.is_some_and(|max| ticks_run >= max) {
            break;
        }

        // 2. Advance one tick (the engine handles pause internally)
        match engine.tick() {
            Ok(snapshot) => {
                log_events(&snapshot);
                board.publish(snapshot);
            }
            Err(err) => {
                error!(%err, "simulation stopped");
                fault = Some(err.to_string());
                break;
            }
        }
        ticks_run += 1;

        if options.stop_when_quiescent && engine.is_quiescent() {
            info!(tick = engine.time().tick, "all threats resolved");
            break;
        }

        // 3. Sleep until the next tick
        if options.realtime {
            next_tick_time += tick_duration;
            let now = Instant::now();
            if next_tick_time > now {
                std::thread::sleep(next_tick_time - now);
            } else if now - next_tick_time > tick_duration * 2 {
                // Too far behind, reset to avoid a catch-up spiral
                next_tick_time = now;
            }
        }
    }

    let time = engine.time();
    RunSummary {
        seed: engine.config().seed,
        ticks: time.tick,
        elapsed_secs: time.elapsed_secs,
        phase: engine.phase(),
        stats: engine.stats(),
        records: engine.records().to_vec(),
        fault,
    }
}

fn log_events(snapshot: &SimSnapshot) {
    let tick = snapshot.time.tick;
    for event in &snapshot.events {
        match event {
            SimEvent::Hit { .. } | SimEvent::Miss { .. } => {
                info!(tick, ?event, "engagement resolved");
            }
            _ => debug!(tick, ?event, "sim event"),
        }
    }
}
