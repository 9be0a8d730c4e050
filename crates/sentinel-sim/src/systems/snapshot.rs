//! Snapshot system: queries the ECS world and builds a complete SimSnapshot.
//!
//! Read-only: never modifies the world.

use hecs::World;

use sentinel_core::components::*;
use sentinel_core::config::SimConfig;
use sentinel_core::enums::*;
use sentinel_core::events::{EngagementRecord, SimEvent};
use sentinel_core::state::*;
use sentinel_core::types::{Position, SimTime, Velocity};

use crate::engagement::ScoreState;
use crate::systems::radar::RadarPicture;
use crate::world_setup::EntityIndex;

/// Everything the snapshot needs besides the world.
pub struct SnapshotInputs<'a> {
    pub time: SimTime,
    pub phase: SimPhase,
    pub auto_engage: bool,
    pub config: &'a SimConfig,
    pub radar: &'a RadarPicture,
    pub events: Vec<SimEvent>,
    pub records: Vec<EngagementRecord>,
    pub score: &'a ScoreState,
}

/// Build a complete SimSnapshot from the current world state.
pub fn build_snapshot(world: &World, index: &EntityIndex, inputs: SnapshotInputs<'_>) -> SimSnapshot {
    let interceptors = build_interceptors(world, index);
    let in_flight = interceptors
        .iter()
        .filter(|i| i.status == InterceptorStatus::EnRoute)
        .count() as u32;

    SimSnapshot {
        time: inputs.time,
        phase: inputs.phase,
        auto_engage: inputs.auto_engage,
        threats: build_threats(world, index, &inputs.config.radar.origin),
        interceptors,
        radar: RadarView {
            origin: inputs.config.radar.origin,
            range: inputs.config.radar.range,
            in_range: inputs.radar.in_range.clone(),
        },
        events: inputs.events,
        records: inputs.records,
        stats: inputs.score.view(in_flight),
    }
}

/// Build ThreatView list in ascending id order.
fn build_threats(world: &World, index: &EntityIndex, origin: &Position) -> Vec<ThreatView> {
    index
        .threats
        .values()
        .filter_map(|&entity| {
            let mut query = world
                .query_one::<(&ThreatProfile, &Position, &Velocity, &PositionHistory)>(entity)
                .ok()?;
            query.get().map(|(profile, pos, vel, history)| ThreatView {
                id: profile.id,
                name: profile.name.clone(),
                kind: profile.kind,
                status: profile.status,
                position: *pos,
                velocity: *vel,
                spawn_time_secs: profile.spawn_time_secs,
                range: origin.range_to(pos),
                active_interceptor: profile.active_interceptor,
                history: history.positions.clone(),
            })
        })
        .collect()
}

/// Build InterceptorView list in ascending id order.
fn build_interceptors(world: &World, index: &EntityIndex) -> Vec<InterceptorView> {
    index
        .interceptors
        .values()
        .filter_map(|&entity| {
            let mut query = world
                .query_one::<(&InterceptorState, &Position, &Velocity, &PositionHistory)>(entity)
                .ok()?;
            query.get().map(|(state, pos, vel, history)| InterceptorView {
                id: state.id,
                name: state.name.clone(),
                target_id: state.target_id,
                status: state.status,
                manual: state.manual,
                launch_time_secs: state.launch_time_secs,
                launch_position: state.launch_position,
                position: *pos,
                velocity: *vel,
                speed: state.speed,
                intercept_point: state.intercept_point,
                intercept_time_secs: state.intercept_time_secs,
                history: history.positions.clone(),
            })
        })
        .collect()
}
