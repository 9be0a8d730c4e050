//! Wave spawning system: spawns threat waves and scripted threats at
//! scheduled times. This is the threat factory: every threat enters the
//! world through here or through `SimulationEngine::spawn_threat`.

use hecs::World;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use sentinel_core::config::{ScriptedThreat, SimConfig};
use sentinel_core::enums::ThreatKind;
use sentinel_core::events::SimEvent;
use sentinel_threat_ai::profiles;
use sentinel_threat_ai::trajectory::ThreatKinematics;

use crate::engagement::ScoreState;
use crate::world_setup::{self, EntityIndex};

/// Slack on schedule comparisons so a time that is an exact multiple of the
/// tick fires on that tick.
const SCHEDULE_SLACK_SECS: f64 = 1e-9;

/// A batch of randomized threats.
#[derive(Debug, Clone)]
pub struct WaveEntry {
    /// Simulation time at which this wave spawns (seconds).
    pub at_secs: f64,
    pub missiles: u32,
    pub jets: u32,
    /// Whether this wave has already been spawned.
    pub spawned: bool,
}

/// A threat with exact initial kinematics.
#[derive(Debug, Clone)]
pub struct ScriptedEntry {
    pub threat: ScriptedThreat,
    pub spawned: bool,
}

/// The complete spawn schedule for a run.
#[derive(Debug, Clone, Default)]
pub struct WaveSchedule {
    pub waves: Vec<WaveEntry>,
    pub scripted: Vec<ScriptedEntry>,
}

impl WaveSchedule {
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            waves: config
                .threats
                .waves
                .iter()
                .map(|w| WaveEntry {
                    at_secs: w.at_secs,
                    missiles: w.missiles,
                    jets: w.jets,
                    spawned: false,
                })
                .collect(),
            scripted: config
                .threats
                .scripted
                .iter()
                .map(|s| ScriptedEntry {
                    threat: s.clone(),
                    spawned: false,
                })
                .collect(),
        }
    }

    /// Total number of threats across the whole schedule.
    pub fn total_threats(&self) -> u32 {
        let randomized: u32 = self.waves.iter().map(|w| w.missiles + w.jets).sum();
        randomized + self.scripted.len() as u32
    }

    /// Whether every entry has been spawned.
    pub fn exhausted(&self) -> bool {
        self.waves.iter().all(|w| w.spawned) && self.scripted.iter().all(|s| s.spawned)
    }
}

/// Check the schedule and spawn anything due at `now_secs`.
///
/// Within one tick, waves spawn in schedule order (missiles, then jets),
/// followed by scripted threats in schedule order.
#[allow(clippy::too_many_arguments)]
pub fn run(
    world: &mut World,
    index: &mut EntityIndex,
    rng: &mut ChaCha8Rng,
    schedule: &mut WaveSchedule,
    config: &SimConfig,
    now_secs: f64,
    events: &mut Vec<SimEvent>,
    score: &mut ScoreState,
) {
    let due = |at_secs: f64| now_secs + SCHEDULE_SLACK_SECS >= at_secs;

    for wave in &mut schedule.waves {
        if wave.spawned || !due(wave.at_secs) {
            continue;
        }
        for (kind, count) in [
            (ThreatKind::Missile, wave.missiles),
            (ThreatKind::Jet, wave.jets),
        ] {
            for _ in 0..count {
                let kinematics =
                    profiles::sample_kinematics(kind, &config.threats, &config.radar.origin, rng);
                spawn(world, index, kind, kinematics, now_secs, events, score);
            }
        }
        wave.spawned = true;
    }

    for entry in &mut schedule.scripted {
        if entry.spawned || !due(entry.threat.at_secs) {
            continue;
        }
        let kinematics = scripted_kinematics(&entry.threat, config);
        spawn(world, index, entry.threat.kind, kinematics, now_secs, events, score);
        entry.spawned = true;
    }
}

/// Initial kinematics for a scripted threat. Positions are absolute.
pub fn scripted_kinematics(threat: &ScriptedThreat, config: &SimConfig) -> ThreatKinematics {
    ThreatKinematics {
        position: threat.position,
        velocity: threat.velocity,
        motion: profiles::motion_for(threat.kind, &config.threats, threat.gravity),
    }
}

/// Spawn one threat and report it.
pub fn spawn(
    world: &mut World,
    index: &mut EntityIndex,
    kind: ThreatKind,
    kinematics: ThreatKinematics,
    now_secs: f64,
    events: &mut Vec<SimEvent>,
    score: &mut ScoreState,
) -> u32 {
    let position = kinematics.position;
    let threat_id = world_setup::spawn_threat(world, index, kind, kinematics, now_secs);
    score.threats_spawned += 1;
    debug!(threat_id, ?kind, x = position.x, y = position.y, z = position.z, "threat spawned");
    events.push(SimEvent::ThreatSpawned {
        threat_id,
        kind,
        position,
    });
    threat_id
}
