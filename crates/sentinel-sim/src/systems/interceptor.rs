//! Interceptor system: flies en-route interceptors toward their intercept
//! points and resolves hits and misses.

use hecs::{Entity, World};
use tracing::{debug, info, warn};

use sentinel_core::components::{InterceptorState, ThreatProfile};
use sentinel_core::config::SimConfig;
use sentinel_core::enums::*;
use sentinel_core::error::{SimError, SimResult};
use sentinel_core::events::{EngagementRecord, SimEvent};
use sentinel_core::types::{Position, Velocity};

use crate::engagement::{EngagementLog, ScoreState};
use crate::guidance;
use crate::world_setup::{self, EntityIndex, ThreatSample};

/// Slack on the expiry comparison so an intercept time that is an exact
/// multiple of the tick expires on that tick.
const EXPIRY_SLACK_SECS: f64 = 1e-9;

/// How one interceptor's tick ended.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Resolution {
    Hit,
    Miss(MissReason),
}

/// Run the interceptor system for one tick.
///
/// Interceptors launched this tick are left at the launcher.
#[allow(clippy::too_many_arguments)]
pub fn run(
    world: &mut World,
    index: &EntityIndex,
    config: &SimConfig,
    dt: f64,
    tick: u64,
    now_secs: f64,
    events: &mut Vec<SimEvent>,
    log: &mut EngagementLog,
    score: &mut ScoreState,
) -> SimResult<()> {
    for (&id, &entity) in &index.interceptors {
        let (mut state, mut position) = read_interceptor(world, id, entity)?;
        if state.status.is_terminal() || state.launch_tick >= tick {
            continue;
        }
        let elapsed = (tick - state.launch_tick) as f64 * dt;

        let target = index
            .threat(state.target_id)
            .and_then(|e| world_setup::sample_threat(world, e))
            .filter(|t| !t.status.is_terminal());

        let (velocity, resolution) = match target {
            None => (Velocity::default(), Some(Resolution::Miss(MissReason::StaleTarget))),
            Some(target) => {
                retarget(&mut state, &position, &target, elapsed, config, events);
                let velocity = fly(&mut position, &state, dt);
                if !position.is_finite() {
                    return Err(SimError::NonFiniteState {
                        entity: state.name.clone(),
                        quantity: "position",
                        tick,
                    });
                }

                let resolution = if position.range_to(&target.position)
                    <= config.interceptor.capture_radius
                {
                    Some(Resolution::Hit)
                } else if elapsed + EXPIRY_SLACK_SECS >= state.intercept_time_secs {
                    Some(Resolution::Miss(MissReason::Expired))
                } else {
                    None
                };
                (velocity, resolution)
            }
        };

        if let Some(resolution) = resolution {
            resolve(world, index, &mut state, resolution, tick, now_secs, events, log, score);
        }

        let (stored_state, stored_position, stored_velocity) = world
            .query_one_mut::<(&mut InterceptorState, &mut Position, &mut Velocity)>(entity)
            .map_err(|e| SimError::Internal(format!("interceptor {id}: {e}")))?;
        *stored_state = state;
        *stored_position = position;
        *stored_velocity = velocity;
    }
    Ok(())
}

fn read_interceptor(
    world: &World,
    id: u32,
    entity: Entity,
) -> SimResult<(InterceptorState, Position)> {
    let mut query = world
        .query_one::<(&InterceptorState, &Position)>(entity)
        .map_err(|e| SimError::Internal(format!("interceptor {id}: {e}")))?;
    let (state, position) = query
        .get()
        .ok_or_else(|| SimError::Internal(format!("interceptor {id} lost its components")))?;
    Ok((state.clone(), *position))
}

/// Re-solve from the interceptor's current position when the target has
/// strayed from the track predicted at the last solve. The new point must lie
/// within the part of `max_range` not yet flown. A failed re-solve keeps the
/// previous solution.
fn retarget(
    state: &mut InterceptorState,
    position: &Position,
    target: &ThreatSample,
    elapsed: f64,
    config: &SimConfig,
    events: &mut Vec<SimEvent>,
) {
    let Some(threshold) = config.interceptor.retarget_threshold else {
        return;
    };
    let deviation = state
        .predicted_target_position(elapsed)
        .range_to(&target.position);
    if deviation <= threshold {
        return;
    }

    let remaining_range = (config.interceptor.max_range - state.speed * elapsed).max(0.0);
    match guidance::solve_intercept(
        &target.position,
        &target.velocity,
        position,
        state.speed,
        remaining_range,
    ) {
        Ok(solution) => {
            state.intercept_point = solution.point;
            state.intercept_time_secs = elapsed + solution.time_secs;
            state.solved_target_position = target.position;
            state.solved_target_velocity = target.velocity;
            state.solved_at_secs = elapsed;
            state.retargets += 1;
            debug!(
                interceptor = %state.name,
                deviation,
                t_intercept = state.intercept_time_secs,
                "interceptor retargeted"
            );
            events.push(SimEvent::InterceptorRetargeted {
                interceptor_id: state.id,
                intercept_point: state.intercept_point,
                intercept_time_secs: state.intercept_time_secs,
            });
        }
        Err(reason) => {
            debug!(interceptor = %state.name, ?reason, "re-solve failed, keeping solution");
        }
    }
}

/// Move toward the intercept point without passing it. Returns the new
/// velocity, zero once the point is reached.
fn fly(position: &mut Position, state: &InterceptorState, dt: f64) -> Velocity {
    let to_point = state.intercept_point.as_dvec3() - position.as_dvec3();
    let remaining = to_point.length();
    let step = state.speed * dt;
    if remaining <= step {
        *position = state.intercept_point;
        return Velocity::default();
    }
    let dir = to_point / remaining;
    *position = Position::from_dvec3(position.as_dvec3() + dir * step);
    Velocity::from_dvec3(dir * state.speed)
}

/// Mark the interceptor terminal, log the engagement and update its target.
#[allow(clippy::too_many_arguments)]
fn resolve(
    world: &mut World,
    index: &EntityIndex,
    state: &mut InterceptorState,
    resolution: Resolution,
    tick: u64,
    now_secs: f64,
    events: &mut Vec<SimEvent>,
    log: &mut EngagementLog,
    score: &mut ScoreState,
) {
    let outcome = match resolution {
        Resolution::Hit => InterceptResult::Hit,
        Resolution::Miss(_) => InterceptResult::Miss,
    };
    state.status = match outcome {
        InterceptResult::Hit => InterceptorStatus::Hit,
        InterceptResult::Miss => InterceptorStatus::Miss,
    };
    state.resolved_tick = Some(tick);

    let recorded = log.record(EngagementRecord {
        threat_id: state.target_id,
        interceptor_id: state.id,
        outcome,
        time_secs: now_secs,
    });
    if !recorded {
        return;
    }

    if let Some(entity) = index.threat(state.target_id) {
        if let Ok(mut profile) = world.get::<&mut ThreatProfile>(entity) {
            if profile.active_interceptor == Some(state.id) {
                profile.active_interceptor = None;
            }
            if outcome == InterceptResult::Hit
                && profile.status.can_transition_to(ThreatStatus::Destroyed)
            {
                profile.status = ThreatStatus::Destroyed;
                profile.resolved_tick = Some(tick);
            }
        }
    }

    match resolution {
        Resolution::Hit => {
            score.intercepted += 1;
            info!(interceptor = %state.name, threat_id = state.target_id, "hit");
            events.push(SimEvent::Hit {
                interceptor_id: state.id,
                threat_id: state.target_id,
            });
        }
        Resolution::Miss(reason) => {
            score.missed += 1;
            match reason {
                MissReason::StaleTarget => {
                    warn!(interceptor = %state.name, threat_id = state.target_id, "target gone, interceptor scored as miss");
                }
                MissReason::Expired => {
                    info!(interceptor = %state.name, threat_id = state.target_id, "miss");
                }
            }
            events.push(SimEvent::Miss {
                interceptor_id: state.id,
                threat_id: state.target_id,
                reason,
            });
        }
    }
}
