//! Fire control system: serves operator launch orders, then engages the
//! highest-priority detected threats while launch capacity remains.

use std::collections::{BTreeMap, VecDeque};

use hecs::World;
use tracing::{debug, info, warn};

use sentinel_core::components::{InterceptorState, ThreatProfile};
use sentinel_core::config::SimConfig;
use sentinel_core::enums::*;
use sentinel_core::events::SimEvent;

use crate::engagement::ScoreState;
use crate::guidance::{self, InterceptSolution};
use crate::systems::prioritization::{self, Candidate};
use crate::world_setup::{self, EntityIndex, Launch, ThreatSample};

/// Run the fire control system for one tick.
///
/// Pending operator orders are served first, in arrival order. Orders that
/// only lack a free launch slot stay pending; every other failure is
/// reported once and dropped.
#[allow(clippy::too_many_arguments)]
pub fn run(
    world: &mut World,
    index: &mut EntityIndex,
    pending: &mut VecDeque<u32>,
    config: &SimConfig,
    auto_engage: bool,
    tick: u64,
    now_secs: f64,
    events: &mut Vec<SimEvent>,
    score: &mut ScoreState,
) {
    let mut free = config
        .interceptor
        .max_concurrent
        .saturating_sub(count_en_route(world));

    // Step 1: operator overrides
    let mut deferred = VecDeque::new();
    while let Some(threat_id) = pending.pop_front() {
        let target = match check_override(world, index, threat_id) {
            Ok(target) => target,
            Err(reason) => {
                reject(events, threat_id, reason);
                continue;
            }
        };
        if free == 0 {
            deferred.push_back(threat_id);
            continue;
        }
        match solve_for(&target, config) {
            Ok(solution) => {
                launch(world, index, config, &target, solution, true, tick, now_secs, events, score);
                free -= 1;
            }
            Err(reason) => reject(events, threat_id, OverrideRejection::Infeasible(reason)),
        }
    }
    *pending = deferred;

    // Step 2: automatic engagement by priority
    if !auto_engage || free == 0 {
        return;
    }
    let samples = engagement_candidates(world, index);
    let candidates: Vec<Candidate> = samples
        .values()
        .map(|s| Candidate {
            id: s.id,
            kind: s.kind,
            position: s.position,
            velocity: s.velocity,
        })
        .collect();

    for threat_id in prioritization::select(&candidates, &config.radar.origin, &config.priority) {
        if free == 0 {
            break;
        }
        let Some(target) = samples.get(&threat_id) else {
            continue;
        };
        match solve_for(target, config) {
            Ok(solution) => {
                launch(world, index, config, target, solution, false, tick, now_secs, events, score);
                free -= 1;
            }
            Err(reason) => {
                debug!(threat_id, ?reason, "no intercept solution, skipping");
            }
        }
    }
}

/// Number of interceptors currently en route.
pub fn count_en_route(world: &World) -> u32 {
    world
        .query::<&InterceptorState>()
        .iter()
        .filter(|(_, state)| state.status == InterceptorStatus::EnRoute)
        .count() as u32
}

/// Detected threats, and engaged threats whose interceptor missed, keyed by id.
fn engagement_candidates(world: &World, index: &EntityIndex) -> BTreeMap<u32, ThreatSample> {
    index
        .threats
        .values()
        .filter_map(|&entity| world_setup::sample_threat(world, entity))
        .filter(|s| match s.status {
            ThreatStatus::Detected => true,
            ThreatStatus::Engaged => s.active_interceptor.is_none(),
            _ => false,
        })
        .map(|s| (s.id, s))
        .collect()
}

/// Validate a manual launch order against the threat's current state.
fn check_override(
    world: &World,
    index: &EntityIndex,
    threat_id: u32,
) -> Result<ThreatSample, OverrideRejection> {
    let target = index
        .threat(threat_id)
        .and_then(|entity| world_setup::sample_threat(world, entity))
        .ok_or(OverrideRejection::UnknownThreat)?;
    if target.status.is_terminal() {
        return Err(OverrideRejection::AlreadyResolved);
    }
    if !target.status.is_locked() {
        return Err(OverrideRejection::NotDetected);
    }
    if target.active_interceptor.is_some() {
        return Err(OverrideRejection::AlreadyEngaged);
    }
    Ok(target)
}

fn solve_for(target: &ThreatSample, config: &SimConfig) -> Result<InterceptSolution, InfeasibleReason> {
    guidance::solve_intercept(
        &target.position,
        &target.velocity,
        &config.radar.origin,
        config.interceptor.speed,
        config.interceptor.max_range,
    )
}

fn reject(events: &mut Vec<SimEvent>, threat_id: u32, reason: OverrideRejection) {
    warn!(threat_id, ?reason, "launch order rejected");
    events.push(SimEvent::OverrideRejected { threat_id, reason });
}

/// Spawn an interceptor and mark its target engaged.
#[allow(clippy::too_many_arguments)]
fn launch(
    world: &mut World,
    index: &mut EntityIndex,
    config: &SimConfig,
    target: &ThreatSample,
    solution: InterceptSolution,
    manual: bool,
    tick: u64,
    now_secs: f64,
    events: &mut Vec<SimEvent>,
    score: &mut ScoreState,
) {
    let interceptor_id = world_setup::spawn_interceptor(
        world,
        index,
        &Launch {
            target: *target,
            solution,
            origin: config.radar.origin,
            speed: config.interceptor.speed,
            manual,
            tick,
            time_secs: now_secs,
        },
    );

    if let Some(entity) = index.threat(target.id) {
        if let Ok(mut profile) = world.get::<&mut ThreatProfile>(entity) {
            if profile.status.can_transition_to(ThreatStatus::Engaged) {
                profile.status = ThreatStatus::Engaged;
            }
            profile.active_interceptor = Some(interceptor_id);
        }
    }

    score.interceptors_launched += 1;
    info!(
        interceptor_id,
        threat_id = target.id,
        manual,
        t_intercept = solution.time_secs,
        "interceptor launched"
    );
    events.push(SimEvent::InterceptorLaunched {
        interceptor_id,
        threat_id: target.id,
        intercept_point: solution.point,
        intercept_time_secs: solution.time_secs,
        manual,
    });
}
