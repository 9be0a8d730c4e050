//! Simulation engine: owns the world and runs the defense loop.
//!
//! `SimulationEngine` owns the hecs ECS world, processes operator commands,
//! runs all systems, and produces `SimSnapshot`s. Completely headless,
//! enabling deterministic testing.

use std::collections::VecDeque;

use hecs::World;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{error, info, warn};

use sentinel_core::commands::OperatorCommand;
use sentinel_core::config::{ensure_positive, ScriptedThreat, SimConfig};
use sentinel_core::enums::SimPhase;
use sentinel_core::error::{ConfigResult, SimError, SimResult};
use sentinel_core::events::{EngagementRecord, SimEvent};
use sentinel_core::state::{SimSnapshot, StatsView};
use sentinel_core::types::SimTime;

use crate::engagement::{EngagementLog, ScoreState};
use crate::systems;
use crate::systems::radar::RadarPicture;
use crate::systems::snapshot::SnapshotInputs;
use crate::systems::wave_spawner::WaveSchedule;
use crate::world_setup::EntityIndex;

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    config: SimConfig,
    world: World,
    index: EntityIndex,
    time: SimTime,
    phase: SimPhase,
    auto_engage: bool,
    rng: ChaCha8Rng,
    command_queue: VecDeque<OperatorCommand>,
    pending_overrides: VecDeque<u32>,
    despawn_buffer: Vec<hecs::Entity>,
    events: Vec<SimEvent>,
    wave_schedule: WaveSchedule,
    radar: RadarPicture,
    log: EngagementLog,
    score: ScoreState,
}

impl SimulationEngine {
    /// Create a new simulation engine. Fails if the config does not validate.
    pub fn new(config: SimConfig) -> ConfigResult<Self> {
        config.validate()?;
        let wave_schedule = WaveSchedule::from_config(&config);
        info!(
            seed = config.seed,
            scheduled_threats = wave_schedule.total_threats(),
            tick_secs = config.tick_secs,
            radar_range = config.radar.range,
            interceptor_speed = config.interceptor.speed,
            max_concurrent = config.interceptor.max_concurrent,
            "simulation engine created"
        );
        Ok(Self {
            world: World::new(),
            index: EntityIndex::default(),
            time: SimTime::default(),
            phase: SimPhase::default(),
            auto_engage: config.auto_engage,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            command_queue: VecDeque::new(),
            pending_overrides: VecDeque::new(),
            despawn_buffer: Vec::new(),
            events: Vec::new(),
            wave_schedule,
            radar: RadarPicture::default(),
            log: EngagementLog::default(),
            score: ScoreState::default(),
            config,
        })
    }

    /// Queue an operator command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: OperatorCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = OperatorCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    ///
    /// While paused, commands are still processed and a snapshot is returned,
    /// but time does not advance. A failed tick faults the engine; every later
    /// call returns `SimError::Faulted`.
    pub fn tick(&mut self) -> SimResult<SimSnapshot> {
        if self.phase == SimPhase::Faulted {
            return Err(SimError::Faulted {
                tick: self.time.tick,
            });
        }

        let mark = self.log.len();
        self.process_commands();

        if self.phase == SimPhase::Active {
            if let Err(err) = self.run_systems() {
                self.phase = SimPhase::Faulted;
                error!(tick = self.time.tick, %err, "tick failed, simulation faulted");
                return Err(err);
            }
        }

        Ok(systems::snapshot::build_snapshot(
            &self.world,
            &self.index,
            SnapshotInputs {
                time: self.time,
                phase: self.phase,
                auto_engage: self.auto_engage,
                config: &self.config,
                radar: &self.radar,
                events: std::mem::take(&mut self.events),
                records: self.log.since(mark).to_vec(),
                score: &self.score,
            },
        ))
    }

    /// Spawn a threat with exact kinematics at the current time, outside the
    /// configured schedule. Returns its id.
    pub fn spawn_threat(&mut self, threat: &ScriptedThreat) -> u32 {
        let kinematics = systems::wave_spawner::scripted_kinematics(threat, &self.config);
        systems::wave_spawner::spawn(
            &mut self.world,
            &mut self.index,
            threat.kind,
            kinematics,
            self.time.elapsed_secs,
            &mut self.events,
            &mut self.score,
        )
    }

    /// Get the current simulation phase.
    pub fn phase(&self) -> SimPhase {
        self.phase
    }

    /// Get the current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn auto_engage(&self) -> bool {
        self.auto_engage
    }

    /// The live configuration, including any retuning.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Every engagement record since the start of the run, in creation order.
    pub fn records(&self) -> &[EngagementRecord] {
        self.log.records()
    }

    /// Running totals.
    pub fn stats(&self) -> StatsView {
        self.score.view(systems::fire_control::count_en_route(&self.world))
    }

    /// Manual launch orders still waiting for a free slot.
    pub fn pending_overrides(&self) -> impl Iterator<Item = u32> + '_ {
        self.pending_overrides.iter().copied()
    }

    /// Whether every scheduled threat has spawned and none is still flying.
    pub fn is_quiescent(&self) -> bool {
        self.wave_schedule.exhausted()
            && self.index.interceptors.is_empty()
            && self.index.threats.is_empty()
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Handle a single operator command.
    fn handle_command(&mut self, command: OperatorCommand) {
        match command {
            OperatorCommand::LaunchInterceptor { threat_id } => {
                self.pending_overrides.push_back(threat_id);
            }
            OperatorCommand::SetAutoEngage { enabled } => {
                info!(enabled, "auto-engage toggled");
                self.auto_engage = enabled;
            }
            OperatorCommand::RetuneDefense {
                radar_range,
                interceptor_speed,
                max_concurrent,
            } => self.retune(radar_range, interceptor_speed, max_concurrent),
            OperatorCommand::Pause => {
                if self.phase == SimPhase::Active {
                    self.phase = SimPhase::Paused;
                }
            }
            OperatorCommand::Resume => {
                if self.phase == SimPhase::Paused {
                    self.phase = SimPhase::Active;
                }
            }
        }
    }

    /// Apply a retune atomically: either every given value is valid and
    /// applied, or nothing changes.
    fn retune(
        &mut self,
        radar_range: Option<f64>,
        interceptor_speed: Option<f64>,
        max_concurrent: Option<u32>,
    ) {
        let checked = radar_range
            .map_or(Ok(()), |v| ensure_positive("radar.range", v))
            .and_then(|_| {
                interceptor_speed.map_or(Ok(()), |v| ensure_positive("interceptor.speed", v))
            })
            .and_then(|_| {
                max_concurrent.map_or(Ok(()), |v| {
                    ensure_positive("interceptor.max_concurrent", f64::from(v))
                })
            });

        if let Err(err) = checked {
            warn!(%err, "retune rejected");
            self.events.push(SimEvent::RetuneRejected {
                message: err.to_string(),
            });
            return;
        }

        if let Some(range) = radar_range {
            self.config.radar.range = range;
        }
        if let Some(speed) = interceptor_speed {
            self.config.interceptor.speed = speed;
        }
        if let Some(max) = max_concurrent {
            self.config.interceptor.max_concurrent = max;
        }
        info!(
            radar_range = self.config.radar.range,
            interceptor_speed = self.config.interceptor.speed,
            max_concurrent = self.config.interceptor.max_concurrent,
            "defense retuned"
        );
    }

    /// Run all systems in order, then advance the clock.
    ///
    /// Threats spawned this tick are stamped with the tick's start time;
    /// everything else sees the end-of-tick time.
    fn run_systems(&mut self) -> SimResult<()> {
        let dt = self.config.tick_secs;
        let start = self.time;
        let mut next = self.time;
        next.advance(dt);

        // 1. Wave spawning
        systems::wave_spawner::run(
            &mut self.world,
            &mut self.index,
            &mut self.rng,
            &mut self.wave_schedule,
            &self.config,
            start.elapsed_secs,
            &mut self.events,
            &mut self.score,
        );
        // 2. Threat motion, landing and escape
        systems::trajectory::run(
            &mut self.world,
            &self.index,
            &mut self.rng,
            &self.config,
            dt,
            next.tick,
            &mut self.events,
            &mut self.score,
        )?;
        // 3. Radar
        self.radar = systems::radar::detection::run(
            &mut self.world,
            &self.index,
            &self.config.radar,
            &mut self.events,
        );
        // 4. Fire control (overrides, then prioritized auto-engagement)
        systems::fire_control::run(
            &mut self.world,
            &mut self.index,
            &mut self.pending_overrides,
            &self.config,
            self.auto_engage,
            next.tick,
            next.elapsed_secs,
            &mut self.events,
            &mut self.score,
        );
        // 5. Interceptor flight and resolution
        systems::interceptor::run(
            &mut self.world,
            &self.index,
            &self.config,
            dt,
            next.tick,
            next.elapsed_secs,
            &mut self.events,
            &mut self.log,
            &mut self.score,
        )?;
        // 6. Position history
        systems::movement::update_history(&mut self.world, next.tick);
        // 7. Cleanup
        let retain_ticks = self.retain_ticks();
        systems::cleanup::run(
            &mut self.world,
            &mut self.index,
            &mut self.despawn_buffer,
            retain_ticks,
            next.tick,
        );

        self.time = next;
        Ok(())
    }

    fn retain_ticks(&self) -> u64 {
        (self.config.retain_resolved_secs / self.config.tick_secs).round() as u64
    }
}
