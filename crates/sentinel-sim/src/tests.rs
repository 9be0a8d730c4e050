//! Tests for the simulation engine, radar, fire control and engagement pipeline.

use std::collections::HashMap;

use sentinel_core::commands::OperatorCommand;
use sentinel_core::config::{ScriptedThreat, SimConfig, WaveConfig};
use sentinel_core::enums::*;
use sentinel_core::error::{ConfigError, SimError};
use sentinel_core::events::{EngagementRecord, SimEvent};
use sentinel_core::state::SimSnapshot;
use sentinel_core::types::{Position, Velocity};

use crate::engagement::EngagementLog;
use crate::engine::SimulationEngine;
use crate::systems::wave_spawner::WaveSchedule;

// ---- Helpers ----

fn scripted(kind: ThreatKind, position: Position, velocity: Velocity) -> ScriptedThreat {
    ScriptedThreat {
        kind,
        position,
        velocity,
        at_secs: 0.0,
        gravity: Some(0.0),
    }
}

fn stationary_missile(x: f64, y: f64, z: f64) -> ScriptedThreat {
    scripted(
        ThreatKind::Missile,
        Position::new(x, y, z),
        Velocity::default(),
    )
}

fn engine_with(config: SimConfig) -> SimulationEngine {
    SimulationEngine::new(config).unwrap()
}

fn run(engine: &mut SimulationEngine, ticks: usize) -> Vec<SimSnapshot> {
    (0..ticks).map(|_| engine.tick().unwrap()).collect()
}

/// (tick, interceptor_id, threat_id, manual) for every launch.
fn launches(snapshots: &[SimSnapshot]) -> Vec<(u64, u32, u32, bool)> {
    snapshots
        .iter()
        .flat_map(|s| {
            s.events.iter().filter_map(move |e| match e {
                SimEvent::InterceptorLaunched {
                    interceptor_id,
                    threat_id,
                    manual,
                    ..
                } => Some((s.time.tick, *interceptor_id, *threat_id, *manual)),
                _ => None,
            })
        })
        .collect()
}

fn all_events(snapshots: &[SimSnapshot]) -> Vec<SimEvent> {
    snapshots.iter().flat_map(|s| s.events.clone()).collect()
}

fn status_rank(status: ThreatStatus) -> u8 {
    match status {
        ThreatStatus::InFlight => 0,
        ThreatStatus::Detected => 1,
        ThreatStatus::Engaged => 2,
        ThreatStatus::Destroyed | ThreatStatus::Landed | ThreatStatus::Escaped => 3,
    }
}

fn threat_status(snapshot: &SimSnapshot, id: u32) -> Option<ThreatStatus> {
    snapshot.threats.iter().find(|t| t.id == id).map(|t| t.status)
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    let mut config = SimConfig::default();
    config.seed = 12345;
    let mut engine_a = engine_with(config.clone());
    let mut engine_b = engine_with(config);

    for _ in 0..300 {
        let snap_a = engine_a.tick().unwrap();
        let snap_b = engine_b.tick().unwrap();

        let json_a = serde_json::to_string(&snap_a).unwrap();
        let json_b = serde_json::to_string(&snap_b).unwrap();
        assert_eq!(json_a, json_b, "Snapshots diverged with same seed");
    }
}

#[test]
fn test_determinism_different_seeds() {
    let mut config_a = SimConfig::default();
    config_a.seed = 111;
    let mut config_b = SimConfig::default();
    config_b.seed = 222;
    let mut engine_a = engine_with(config_a);
    let mut engine_b = engine_with(config_b);

    // Spawn positions are drawn on the first tick.
    let snap_a = engine_a.tick().unwrap();
    let snap_b = engine_b.tick().unwrap();
    assert_ne!(
        serde_json::to_string(&snap_a).unwrap(),
        serde_json::to_string(&snap_b).unwrap(),
        "Different seeds should produce divergent output"
    );
}

#[test]
fn test_reproducible_engagement_records() {
    let records = |seed: u64| -> Vec<EngagementRecord> {
        let mut config = SimConfig::default();
        config.seed = seed;
        let mut engine = engine_with(config);
        run(&mut engine, 5000);
        engine.records().to_vec()
    };

    let first = records(7);
    let second = records(7);
    assert!(!first.is_empty(), "a full default wave should produce engagements");
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_records_in_snapshots_match_log() {
    let mut engine = engine_with(SimConfig::default());
    let snapshots = run(&mut engine, 3000);
    let from_snapshots: Vec<EngagementRecord> =
        snapshots.iter().flat_map(|s| s.records.clone()).collect();
    assert_eq!(from_snapshots, engine.records());
}

// ---- Invariants over a full run ----

#[test]
fn test_invariants_hold_over_default_run() {
    let mut engine = engine_with(SimConfig::default());
    let max_concurrent = engine.config().interceptor.max_concurrent as usize;
    let mut last_status: HashMap<u32, ThreatStatus> = HashMap::new();
    let mut resolved_interceptors: HashMap<u32, InterceptorStatus> = HashMap::new();

    for _ in 0..4000 {
        let snap = engine.tick().unwrap();

        let en_route: Vec<_> = snap
            .interceptors
            .iter()
            .filter(|i| i.status == InterceptorStatus::EnRoute)
            .collect();
        assert!(en_route.len() <= max_concurrent);
        assert_eq!(snap.stats.in_flight as usize, en_route.len());

        // At most one interceptor en route per threat.
        let mut per_threat: HashMap<u32, u32> = HashMap::new();
        for i in &en_route {
            *per_threat.entry(i.target_id).or_default() += 1;
        }
        assert!(per_threat.values().all(|&n| n == 1));

        // Status only moves forward; a terminal status never changes.
        for threat in &snap.threats {
            if let Some(prev) = last_status.insert(threat.id, threat.status) {
                if prev.is_terminal() {
                    assert_eq!(prev, threat.status, "threat {} left {prev:?}", threat.id);
                } else {
                    assert!(
                        status_rank(prev) <= status_rank(threat.status),
                        "threat {} went {prev:?} -> {:?}",
                        threat.id,
                        threat.status
                    );
                }
            }
        }

        // Hit and Miss are final.
        for i in &snap.interceptors {
            if let Some(prev) = resolved_interceptors.get(&i.id) {
                assert_eq!(*prev, i.status, "interceptor {} changed after resolving", i.id);
            }
            if i.status.is_terminal() {
                resolved_interceptors.insert(i.id, i.status);
            }
        }

        let stats = snap.stats;
        assert_eq!(
            stats.interceptors_launched,
            stats.intercepted + stats.missed + stats.in_flight
        );
    }

    // One record per resolved interceptor.
    let stats = engine.stats();
    assert_eq!(
        engine.records().len() as u32,
        stats.intercepted + stats.missed
    );
}

// ---- Clock ----

#[test]
fn test_tick_timing_no_drift() {
    let mut engine = engine_with(SimConfig::empty_sky());
    let snapshots = run(&mut engine, 100);
    let last = snapshots.last().unwrap();
    assert_eq!(last.time.tick, 100);
    assert_eq!(last.time.elapsed_secs, 1.0);
}

#[test]
fn test_pause_stops_simulation() {
    let mut config = SimConfig::empty_sky();
    config.threats.scripted = vec![scripted(
        ThreatKind::Missile,
        Position::new(0.0, 50_000.0, 10_000.0),
        Velocity::new(0.0, -100.0, 0.0),
    )];
    let mut engine = engine_with(config);
    run(&mut engine, 10);

    engine.queue_command(OperatorCommand::Pause);
    let paused = engine.tick().unwrap();
    assert_eq!(paused.phase, SimPhase::Paused);
    assert_eq!(paused.time.tick, 10);
    let frozen = paused.threats[0].position;

    let still = run(&mut engine, 5);
    assert!(still.iter().all(|s| s.time.tick == 10));
    assert_eq!(still[4].threats[0].position, frozen);

    engine.queue_command(OperatorCommand::Resume);
    let resumed = engine.tick().unwrap();
    assert_eq!(resumed.phase, SimPhase::Active);
    assert_eq!(resumed.time.tick, 11);
    assert!(resumed.threats[0].position.y < frozen.y);
}

// ---- Spawning ----

#[test]
fn test_default_wave_spawns_on_first_tick() {
    let mut engine = engine_with(SimConfig::default());
    let snap = engine.tick().unwrap();
    assert_eq!(snap.threats.len(), 28);
    assert_eq!(snap.stats.threats_spawned, 28);

    let ids: Vec<u32> = snap.threats.iter().map(|t| t.id).collect();
    assert_eq!(ids, (1..=28).collect::<Vec<_>>(), "ids start at 1, ascending");

    assert_eq!(snap.threats[0].name, "M1");
    assert_eq!(snap.threats[0].kind, ThreatKind::Missile);
    assert_eq!(snap.threats[27].name, "J28");
    assert_eq!(snap.threats[27].kind, ThreatKind::Jet);
}

#[test]
fn test_scheduled_wave_and_scripted_threat_timing() {
    let mut config = SimConfig::empty_sky();
    config.threats.waves = vec![WaveConfig {
        at_secs: 0.5,
        missiles: 2,
        jets: 1,
    }];
    let mut late = stationary_missile(0.0, 40_000.0, 5_000.0);
    late.at_secs = 1.0;
    config.threats.scripted = vec![late];
    let mut engine = engine_with(config);
    let snapshots = run(&mut engine, 120);

    let spawn_ticks: Vec<u64> = snapshots
        .iter()
        .flat_map(|s| {
            s.events
                .iter()
                .filter(|e| matches!(e, SimEvent::ThreatSpawned { .. }))
                .map(move |_| s.time.tick)
        })
        .collect();
    // A tick spawns what is due at its start time: 0.5 s is the start of tick 51.
    assert_eq!(spawn_ticks, vec![51, 51, 51, 101]);
}

#[test]
fn test_wave_schedule_totals() {
    let mut config = SimConfig::default();
    config.threats.scripted = vec![stationary_missile(0.0, 1_000.0, 1_000.0)];
    let schedule = WaveSchedule::from_config(&config);
    assert_eq!(schedule.total_threats(), 29);
    assert!(!schedule.exhausted());
    assert!(WaveSchedule::from_config(&SimConfig::empty_sky()).exhausted());
}

#[test]
fn test_spawn_threat_outside_schedule() {
    let mut engine = engine_with(SimConfig::empty_sky());
    let id = engine.spawn_threat(&stationary_missile(0.0, 50_000.0, 5_000.0));
    assert_eq!(id, 1);
    let snap = engine.tick().unwrap();
    assert!(snap
        .events
        .iter()
        .any(|e| matches!(e, SimEvent::ThreatSpawned { threat_id: 1, .. })));
    assert_eq!(snap.threats.len(), 1);
}

// ---- Radar ----

#[test]
fn test_radar_lock_is_monotonic() {
    let mut config = SimConfig::empty_sky();
    config.auto_engage = false;
    config.radar.range = 2_000.0;
    // Flies straight through the detection bubble and out the other side.
    config.threats.scripted = vec![scripted(
        ThreatKind::Missile,
        Position::new(-3_000.0, 0.0, 1_000.0),
        Velocity::new(1_000.0, 0.0, 0.0),
    )];
    let mut engine = engine_with(config);
    let snapshots = run(&mut engine, 600);

    let detections = all_events(&snapshots)
        .into_iter()
        .filter(|e| matches!(e, SimEvent::ThreatDetected { .. }))
        .count();
    assert_eq!(detections, 1);

    let last = snapshots.last().unwrap();
    assert_eq!(threat_status(last, 1), Some(ThreatStatus::Detected));
    assert!(last.radar.in_range.is_empty(), "threat has left the bubble");
    assert!(
        snapshots.iter().any(|s| s.radar.in_range == vec![1]),
        "threat was inside range at some point"
    );
}

#[test]
fn test_threat_outside_range_stays_in_flight() {
    let mut config = SimConfig::empty_sky();
    config.threats.scripted = vec![stationary_missile(0.0, 40_000.0, 5_000.0)];
    let mut engine = engine_with(config);
    let snapshots = run(&mut engine, 50);
    assert_eq!(
        threat_status(snapshots.last().unwrap(), 1),
        Some(ThreatStatus::InFlight)
    );
    assert!(launches(&snapshots).is_empty());
}

// ---- Intercept scenarios ----

#[test]
fn test_stationary_threat_intercept_timeline() {
    let mut config = SimConfig::empty_sky();
    config.radar.origin = Position::new(0.0, 0.0, 1_000.0);
    config.interceptor.speed = 500.0;
    config.interceptor.capture_radius = 1.0;
    config.threats.scripted = vec![stationary_missile(1_000.0, 0.0, 1_000.0)];
    let mut engine = engine_with(config);
    let snapshots = run(&mut engine, 250);

    let launch = snapshots[0]
        .events
        .iter()
        .find_map(|e| match e {
            SimEvent::InterceptorLaunched {
                intercept_point,
                intercept_time_secs,
                ..
            } => Some((*intercept_point, *intercept_time_secs)),
            _ => None,
        })
        .expect("launch on the detection tick");
    assert_eq!(launch.1, 2.0);
    assert_eq!(launch.0, Position::new(1_000.0, 0.0, 1_000.0));

    // Not advanced on its launch tick.
    assert_eq!(
        snapshots[0].interceptors[0].position,
        Position::new(0.0, 0.0, 1_000.0)
    );

    let hit_tick = snapshots
        .iter()
        .find(|s| s.events.iter().any(|e| matches!(e, SimEvent::Hit { .. })))
        .map(|s| s.time.tick)
        .expect("stationary threat is hit");
    assert_eq!(hit_tick, 201, "200 ticks of flight after launch on tick 1");

    let records = engine.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].outcome, InterceptResult::Hit);
    assert_eq!(records[0].threat_id, 1);
    assert_eq!(records[0].interceptor_id, 1);
    assert!((records[0].time_secs - 2.01).abs() < 1e-9);

    let last = snapshots.last().unwrap();
    assert_eq!(threat_status(last, 1), Some(ThreatStatus::Destroyed));
    assert_eq!(last.interceptors[0].status, InterceptorStatus::Hit);
    assert_eq!(last.stats.intercepted, 1);
}

#[test]
fn test_interceptor_never_overshoots_intercept_point() {
    let mut config = SimConfig::empty_sky();
    config.interceptor.speed = 3_000.0;
    config.interceptor.capture_radius = 1.0;
    // Stationary, but the interceptor cannot see it being hit until it
    // parks on the point.
    config.threats.scripted = vec![stationary_missile(0.0, 1_234.5, 1_000.0)];
    let mut engine = engine_with(config);
    let point_distance = Position::default().range_to(&Position::new(0.0, 1_234.5, 1_000.0));
    for snap in run(&mut engine, 200) {
        for i in &snap.interceptors {
            assert!(i.launch_position.range_to(&i.position) <= point_distance + 1e-6);
        }
    }
}

#[test]
fn test_receding_fast_threat_never_launched_at() {
    let mut config = SimConfig::empty_sky();
    config.interceptor.speed = 500.0;
    config.threats.scripted = vec![scripted(
        ThreatKind::Missile,
        Position::new(0.0, 5_000.0, 5_000.0),
        Velocity::new(0.0, 1_000.0, 0.0),
    )];
    let mut engine = engine_with(config);
    let snapshots = run(&mut engine, 300);

    assert!(launches(&snapshots).is_empty());
    assert_eq!(engine.stats().interceptors_launched, 0);
    assert_eq!(
        threat_status(snapshots.last().unwrap(), 1),
        Some(ThreatStatus::Detected)
    );
}

#[test]
fn test_capacity_defers_second_launch() {
    let mut config = SimConfig::empty_sky();
    config.interceptor.max_concurrent = 1;
    config.threats.scripted = vec![
        stationary_missile(0.0, 5_000.0, 5_000.0),
        stationary_missile(0.0, -8_000.0, 5_000.0),
    ];
    let mut engine = engine_with(config);
    let snapshots = run(&mut engine, 300);

    let launched = launches(&snapshots);
    assert_eq!(launched.len(), 2);
    assert_eq!(launched[0], (1, 1, 1, false), "one launch on tick 1, at the lower id");

    let first_resolution = snapshots
        .iter()
        .find(|s| {
            s.events
                .iter()
                .any(|e| matches!(e, SimEvent::Hit { interceptor_id: 1, .. }))
        })
        .map(|s| s.time.tick)
        .unwrap();
    assert_eq!(
        launched[1],
        (first_resolution + 1, 2, 2, false),
        "second threat engaged on the first tick with a free slot"
    );
    assert!(snapshots.iter().all(|s| s.stats.in_flight <= 1));
}

#[test]
fn test_prioritization_tie_breaks() {
    let run_once = |first: ThreatKind, second: ThreatKind| {
        let mut config = SimConfig::empty_sky();
        config.interceptor.max_concurrent = 1;
        // Same distance, same closing speed: identical time-to-impact.
        config.threats.scripted = vec![
            scripted(
                first,
                Position::new(-3_000.0, 0.0, 4_000.0),
                Velocity::new(60.0, 0.0, -80.0),
            ),
            scripted(
                second,
                Position::new(3_000.0, 0.0, 4_000.0),
                Velocity::new(-60.0, 0.0, -80.0),
            ),
        ];
        let mut engine = engine_with(config);
        launches(&run(&mut engine, 1))
    };

    // Same kind: lowest id wins, every time.
    for _ in 0..3 {
        let launched = run_once(ThreatKind::Missile, ThreatKind::Missile);
        assert_eq!(launched.len(), 1);
        assert_eq!(launched[0].2, 1);
    }
    // Missile outranks jet at equal time-to-impact, despite the higher id.
    let launched = run_once(ThreatKind::Jet, ThreatKind::Missile);
    assert_eq!(launched[0].2, 2);
}

#[test]
fn test_closer_impact_engaged_first() {
    let mut config = SimConfig::empty_sky();
    config.interceptor.max_concurrent = 1;
    config.threats.scripted = vec![
        scripted(
            ThreatKind::Missile,
            Position::new(0.0, 20_000.0, 5_000.0),
            Velocity::new(0.0, -100.0, 0.0),
        ),
        scripted(
            ThreatKind::Jet,
            Position::new(0.0, -6_000.0, 5_000.0),
            Velocity::new(0.0, 300.0, 0.0),
        ),
    ];
    let mut engine = engine_with(config);
    let launched = launches(&run(&mut engine, 1));
    assert_eq!(launched[0].2, 2);
}

// ---- Lifecycle edge cases ----

#[test]
fn test_landing_and_escape() {
    let mut config = SimConfig::empty_sky();
    config.auto_engage = false;
    config.world.radius = 10_000.0;
    config.threats.scripted = vec![
        scripted(
            ThreatKind::Missile,
            Position::new(0.0, 5_000.0, 50.0),
            Velocity::new(0.0, 0.0, -1_000.0),
        ),
        scripted(
            ThreatKind::Jet,
            Position::new(9_990.0, 0.0, 5_000.0),
            Velocity::new(500.0, 0.0, 0.0),
        ),
    ];
    let mut engine = engine_with(config);
    let snapshots = run(&mut engine, 10);
    let events = all_events(&snapshots);

    assert!(events
        .iter()
        .any(|e| matches!(e, SimEvent::ThreatLanded { threat_id: 1, .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e, SimEvent::ThreatEscaped { threat_id: 2, .. })));
    let last = snapshots.last().unwrap();
    assert_eq!(threat_status(last, 1), Some(ThreatStatus::Landed));
    assert_eq!(threat_status(last, 2), Some(ThreatStatus::Escaped));
    assert_eq!(last.stats.landed, 1);
    assert_eq!(last.stats.escaped, 1);
}

#[test]
fn test_stale_target_scored_as_miss() {
    let mut config = SimConfig::empty_sky();
    config.interceptor.speed = 5_000.0;
    // Lands after 3 s; the interceptor needs about 4 s.
    config.threats.scripted = vec![scripted(
        ThreatKind::Missile,
        Position::new(0.0, 20_000.0, 300.0),
        Velocity::new(0.0, 0.0, -100.0),
    )];
    let mut engine = engine_with(config);
    let snapshots = run(&mut engine, 400);
    let events = all_events(&snapshots);

    let landed_at = events
        .iter()
        .position(|e| matches!(e, SimEvent::ThreatLanded { .. }))
        .expect("threat lands");
    let missed_at = events
        .iter()
        .position(|e| {
            matches!(
                e,
                SimEvent::Miss {
                    reason: MissReason::StaleTarget,
                    ..
                }
            )
        })
        .expect("interceptor scored as miss");
    assert!(landed_at < missed_at);

    let records = engine.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].outcome, InterceptResult::Miss);
    let stats = engine.stats();
    assert_eq!((stats.missed, stats.landed, stats.in_flight), (1, 1, 0));
}

#[test]
fn test_re_engagement_after_miss() {
    let mut config = SimConfig::empty_sky();
    config.interceptor.retarget_threshold = None;
    // Falls far off the straight-line prediction before the interceptor arrives.
    let mut dropping = stationary_missile(0.0, 10_000.0, 10_000.0);
    dropping.gravity = Some(2_000.0);
    config.threats.scripted = vec![dropping];
    let mut engine = engine_with(config);
    let snapshots = run(&mut engine, 300);

    let miss_tick = snapshots
        .iter()
        .find(|s| {
            s.events.iter().any(|e| {
                matches!(
                    e,
                    SimEvent::Miss {
                        interceptor_id: 1,
                        reason: MissReason::Expired,
                        ..
                    }
                )
            })
        })
        .map(|s| s.time.tick)
        .expect("first interceptor misses");

    let miss_snap = &snapshots[(miss_tick - 1) as usize];
    assert_eq!(threat_status(miss_snap, 1), Some(ThreatStatus::Engaged));
    assert_eq!(miss_snap.threats[0].active_interceptor, None);

    let launched = launches(&snapshots);
    assert!(launched.len() >= 2);
    assert_eq!(launched[1].1, 2);
    assert_eq!(launched[1].2, 1, "same threat engaged again");
    assert_eq!(launched[1].0, miss_tick + 1);
}

#[test]
fn test_retarget_follows_deviating_threat() {
    let mut config = SimConfig::empty_sky();
    config.interceptor.retarget_threshold = Some(100.0);
    let mut dropping = stationary_missile(0.0, 10_000.0, 10_000.0);
    dropping.gravity = Some(2_000.0);
    config.threats.scripted = vec![dropping];
    let mut engine = engine_with(config);
    let events = all_events(&run(&mut engine, 100));

    let retargets = events
        .iter()
        .filter(|e| matches!(e, SimEvent::InterceptorRetargeted { interceptor_id: 1, .. }))
        .count();
    assert!(retargets > 0, "deviating target should trigger a re-solve");
}

#[test]
fn test_resolved_entities_retained_then_cleaned_up() {
    let mut config = SimConfig::empty_sky();
    config.radar.origin = Position::new(0.0, 0.0, 1_000.0);
    config.interceptor.speed = 500.0;
    config.interceptor.capture_radius = 1.0;
    config.retain_resolved_secs = 2.0;
    config.threats.scripted = vec![stationary_missile(1_000.0, 0.0, 1_000.0)];
    let mut engine = engine_with(config);
    let snapshots = run(&mut engine, 401);

    // Hit on tick 201, retained for 200 ticks.
    assert_eq!(snapshots[399].threats.len(), 1);
    assert_eq!(snapshots[399].interceptors.len(), 1);
    assert!(snapshots[400].threats.is_empty());
    assert!(snapshots[400].interceptors.is_empty());
    assert!(engine.is_quiescent());
}

#[test]
fn test_zero_retention_removes_on_resolution_tick() {
    let mut config = SimConfig::empty_sky();
    config.radar.origin = Position::new(0.0, 0.0, 1_000.0);
    config.interceptor.speed = 500.0;
    config.interceptor.capture_radius = 1.0;
    config.retain_resolved_secs = 0.0;
    config.threats.scripted = vec![stationary_missile(1_000.0, 0.0, 1_000.0)];
    let mut engine = engine_with(config);
    let snapshots = run(&mut engine, 201);

    assert_eq!(snapshots[199].threats.len(), 1);
    assert_eq!(snapshots[199].interceptors.len(), 1);
    let hit_tick = &snapshots[200];
    assert!(hit_tick.events.iter().any(|e| matches!(e, SimEvent::Hit { .. })));
    assert!(hit_tick.threats.is_empty());
    assert!(hit_tick.interceptors.is_empty());
    assert!(engine.is_quiescent());
}

#[test]
fn test_history_recorded_every_few_ticks() {
    let mut config = SimConfig::empty_sky();
    config.threats.scripted = vec![scripted(
        ThreatKind::Missile,
        Position::new(0.0, 50_000.0, 10_000.0),
        Velocity::new(0.0, -100.0, 0.0),
    )];
    let mut engine = engine_with(config);
    let last = run(&mut engine, 50).pop().unwrap();
    assert_eq!(last.threats[0].history.len(), 10);
    assert_eq!(last.threats[0].history[0], last.threats[0].position);
}

// ---- Operator commands ----

#[test]
fn test_manual_override_launches_without_auto_engage() {
    let mut config = SimConfig::empty_sky();
    config.auto_engage = false;
    config.threats.scripted = vec![stationary_missile(0.0, 5_000.0, 5_000.0)];
    let mut engine = engine_with(config);

    let idle = run(&mut engine, 5);
    assert!(launches(&idle).is_empty());

    engine.queue_command(OperatorCommand::LaunchInterceptor { threat_id: 1 });
    let snap = engine.tick().unwrap();
    assert_eq!(launches(&[snap.clone()]), vec![(6, 1, 1, true)]);
    assert!(snap.interceptors[0].manual);
    assert_eq!(threat_status(&snap, 1), Some(ThreatStatus::Engaged));
}

#[test]
fn test_manual_override_rejections() {
    let mut config = SimConfig::empty_sky();
    config.auto_engage = false;
    config.interceptor.speed = 500.0;
    config.threats.scripted = vec![
        // 1: detected and engageable
        stationary_missile(0.0, 5_000.0, 5_000.0),
        // 2: outside radar range
        stationary_missile(0.0, 45_000.0, 5_000.0),
        // 3: lands on the first tick
        scripted(
            ThreatKind::Missile,
            Position::new(0.0, 1_000.0, 5.0),
            Velocity::new(0.0, 0.0, -1_000.0),
        ),
        // 4: detected, flying straight away faster than the interceptor
        scripted(
            ThreatKind::Missile,
            Position::new(0.0, 3_000.0, 4_000.0),
            Velocity::new(0.0, 600.0, 800.0),
        ),
    ];
    let mut engine = engine_with(config);
    engine.tick().unwrap();

    engine.queue_commands([
        OperatorCommand::LaunchInterceptor { threat_id: 99 },
        OperatorCommand::LaunchInterceptor { threat_id: 2 },
        OperatorCommand::LaunchInterceptor { threat_id: 3 },
        OperatorCommand::LaunchInterceptor { threat_id: 4 },
        OperatorCommand::LaunchInterceptor { threat_id: 1 },
        OperatorCommand::LaunchInterceptor { threat_id: 1 },
    ]);
    let snap = engine.tick().unwrap();

    let rejections: Vec<(u32, OverrideRejection)> = snap
        .events
        .iter()
        .filter_map(|e| match e {
            SimEvent::OverrideRejected { threat_id, reason } => Some((*threat_id, *reason)),
            _ => None,
        })
        .collect();
    assert_eq!(
        rejections,
        vec![
            (99, OverrideRejection::UnknownThreat),
            (2, OverrideRejection::NotDetected),
            (3, OverrideRejection::AlreadyResolved),
            (
                4,
                OverrideRejection::Infeasible(InfeasibleReason::NoPositiveRoot)
            ),
            (1, OverrideRejection::AlreadyEngaged),
        ]
    );
    assert_eq!(launches(&[snap]).len(), 1);
}

#[test]
fn test_capacity_blocked_override_stays_pending() {
    let mut config = SimConfig::empty_sky();
    config.auto_engage = false;
    config.interceptor.max_concurrent = 1;
    config.threats.scripted = vec![
        stationary_missile(0.0, 5_000.0, 5_000.0),
        stationary_missile(0.0, -5_000.0, 5_000.0),
    ];
    let mut engine = engine_with(config);
    engine.queue_commands([
        OperatorCommand::LaunchInterceptor { threat_id: 1 },
        OperatorCommand::LaunchInterceptor { threat_id: 2 },
    ]);
    let first = engine.tick().unwrap();
    assert_eq!(launches(&[first.clone()]), vec![(1, 1, 1, true)]);
    assert!(!first
        .events
        .iter()
        .any(|e| matches!(e, SimEvent::OverrideRejected { .. })));
    assert_eq!(engine.pending_overrides().collect::<Vec<_>>(), vec![2]);

    let later = run(&mut engine, 200);
    let launched = launches(&later);
    assert_eq!(launched.len(), 1);
    assert_eq!((launched[0].2, launched[0].3), (2, true));
    assert_eq!(engine.pending_overrides().count(), 0);
}

#[test]
fn test_set_auto_engage_toggles_launching() {
    let mut config = SimConfig::empty_sky();
    config.threats.scripted = vec![stationary_missile(0.0, 5_000.0, 5_000.0)];
    let mut engine = engine_with(config);
    engine.queue_command(OperatorCommand::SetAutoEngage { enabled: false });
    let idle = run(&mut engine, 10);
    assert!(launches(&idle).is_empty());
    assert!(!idle[0].auto_engage);

    engine.queue_command(OperatorCommand::SetAutoEngage { enabled: true });
    let snap = engine.tick().unwrap();
    assert_eq!(launches(&[snap]).len(), 1);
}

#[test]
fn test_retune_defense() {
    let mut engine = engine_with(SimConfig::empty_sky());
    engine.queue_command(OperatorCommand::RetuneDefense {
        radar_range: Some(12_000.0),
        interceptor_speed: None,
        max_concurrent: Some(3),
    });
    let snap = engine.tick().unwrap();
    assert_eq!(snap.radar.range, 12_000.0);
    assert_eq!(engine.config().interceptor.max_concurrent, 3);
    assert_eq!(engine.config().interceptor.speed, 10_000.0);

    // Any invalid value rejects the whole command.
    engine.queue_command(OperatorCommand::RetuneDefense {
        radar_range: Some(20_000.0),
        interceptor_speed: Some(-1.0),
        max_concurrent: None,
    });
    let snap = engine.tick().unwrap();
    assert!(snap
        .events
        .iter()
        .any(|e| matches!(e, SimEvent::RetuneRejected { .. })));
    assert_eq!(engine.config().radar.range, 12_000.0);
    assert_eq!(engine.config().interceptor.speed, 10_000.0);

    engine.queue_command(OperatorCommand::RetuneDefense {
        radar_range: None,
        interceptor_speed: None,
        max_concurrent: Some(0),
    });
    let snap = engine.tick().unwrap();
    assert!(snap
        .events
        .iter()
        .any(|e| matches!(e, SimEvent::RetuneRejected { .. })));
    assert_eq!(engine.config().interceptor.max_concurrent, 3);
}

#[test]
fn test_retuned_radar_range_detects_sooner() {
    let mut config = SimConfig::empty_sky();
    config.auto_engage = false;
    config.threats.scripted = vec![stationary_missile(0.0, 40_000.0, 5_000.0)];
    let mut engine = engine_with(config);
    let before = engine.tick().unwrap();
    assert_eq!(threat_status(&before, 1), Some(ThreatStatus::InFlight));

    engine.queue_command(OperatorCommand::RetuneDefense {
        radar_range: Some(45_000.0),
        interceptor_speed: None,
        max_concurrent: None,
    });
    let after = engine.tick().unwrap();
    assert_eq!(threat_status(&after, 1), Some(ThreatStatus::Detected));
}

// ---- Errors ----

#[test]
fn test_invalid_config_rejected_at_construction() {
    let mut config = SimConfig::default();
    config.radar.range = 0.0;
    assert!(matches!(
        SimulationEngine::new(config),
        Err(ConfigError::NotPositive {
            field: "radar.range",
            ..
        })
    ));

    let mut config = SimConfig::default();
    config.interceptor.max_concurrent = 0;
    assert!(SimulationEngine::new(config).is_err());
}

#[test]
fn test_non_finite_state_faults_engine() {
    let mut engine = engine_with(SimConfig::empty_sky());
    engine.tick().unwrap();
    engine.spawn_threat(&scripted(
        ThreatKind::Missile,
        Position::new(0.0, 40_000.0, 5_000.0),
        Velocity::new(f64::NAN, 0.0, 0.0),
    ));

    match engine.tick() {
        Err(SimError::NonFiniteState { entity, tick, .. }) => {
            assert_eq!(entity, "M1");
            assert_eq!(tick, 2);
        }
        other => panic!("expected NonFiniteState, got {other:?}"),
    }
    assert_eq!(engine.phase(), SimPhase::Faulted);
    assert!(matches!(engine.tick(), Err(SimError::Faulted { tick: 1 })));
}

// ---- Engagement log ----

#[test]
fn test_engagement_log_records_once_per_interceptor() {
    let mut log = EngagementLog::default();
    let record = EngagementRecord {
        threat_id: 1,
        interceptor_id: 1,
        outcome: InterceptResult::Hit,
        time_secs: 1.0,
    };
    assert!(log.record(record));
    assert!(!log.record(EngagementRecord {
        outcome: InterceptResult::Miss,
        ..record
    }));
    assert_eq!(log.len(), 1);
    assert_eq!(log.since(0), &[record]);
    assert!(log.since(1).is_empty());
    assert!(log.since(5).is_empty());
}

#[test]
fn test_snapshot_size_reasonable() {
    let mut engine = engine_with(SimConfig::default());
    let snapshot = run(&mut engine, 100).pop().unwrap();
    let json = serde_json::to_string(&snapshot).unwrap();
    let size_kb = json.len() as f64 / 1024.0;
    assert!(
        size_kb < 100.0,
        "Snapshot with a full wave should be <100KB, was {size_kb:.1}KB",
    );
}
