//! Entity spawn factories and the id → entity index.
//!
//! Creates threat and interceptor entities with the appropriate component
//! bundles and registers them under their public ids.

use std::collections::BTreeMap;

use hecs::{Entity, World};

use sentinel_core::components::*;
use sentinel_core::enums::*;
use sentinel_core::types::{Position, Velocity};
use sentinel_threat_ai::trajectory::ThreatKinematics;

use crate::guidance::InterceptSolution;

/// Maps public ids to ECS entities. Iteration is in ascending id order.
#[derive(Debug, Default)]
pub struct EntityIndex {
    pub threats: BTreeMap<u32, Entity>,
    pub interceptors: BTreeMap<u32, Entity>,
    next_threat_id: u32,
    next_interceptor_id: u32,
}

impl EntityIndex {
    fn allocate_threat_id(&mut self) -> u32 {
        self.next_threat_id += 1;
        self.next_threat_id
    }

    fn allocate_interceptor_id(&mut self) -> u32 {
        self.next_interceptor_id += 1;
        self.next_interceptor_id
    }

    pub fn threat(&self, id: u32) -> Option<Entity> {
        self.threats.get(&id).copied()
    }
}

/// Copy of the engagement-relevant state of one threat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThreatSample {
    pub id: u32,
    pub kind: ThreatKind,
    pub status: ThreatStatus,
    pub active_interceptor: Option<u32>,
    pub position: Position,
    pub velocity: Velocity,
}

/// Read a threat's current state, if the entity still exists.
pub fn sample_threat(world: &World, entity: Entity) -> Option<ThreatSample> {
    let mut query = world
        .query_one::<(&ThreatProfile, &Position, &Velocity)>(entity)
        .ok()?;
    query.get().map(|(profile, position, velocity)| ThreatSample {
        id: profile.id,
        kind: profile.kind,
        status: profile.status,
        active_interceptor: profile.active_interceptor,
        position: *position,
        velocity: *velocity,
    })
}

/// Display name for a threat: "M3", "J7".
pub fn threat_name(kind: ThreatKind, id: u32) -> String {
    match kind {
        ThreatKind::Missile => format!("M{id}"),
        ThreatKind::Jet => format!("J{id}"),
    }
}

/// Spawn a single threat entity and register it. Returns the new id.
pub fn spawn_threat(
    world: &mut World,
    index: &mut EntityIndex,
    kind: ThreatKind,
    kinematics: ThreatKinematics,
    spawn_time_secs: f64,
) -> u32 {
    let id = index.allocate_threat_id();
    let profile = ThreatProfile {
        id,
        name: threat_name(kind, id),
        kind,
        status: ThreatStatus::InFlight,
        spawn_time_secs,
        active_interceptor: None,
        resolved_tick: None,
    };

    let entity = world.spawn((
        profile,
        kinematics.position,
        kinematics.velocity,
        kinematics.motion,
        PositionHistory::default(),
    ));
    index.threats.insert(id, entity);
    id
}

/// Launch parameters for a new interceptor.
#[derive(Debug, Clone, Copy)]
pub struct Launch {
    pub target: ThreatSample,
    pub solution: InterceptSolution,
    pub origin: Position,
    pub speed: f64,
    pub manual: bool,
    pub tick: u64,
    pub time_secs: f64,
}

/// Spawn an interceptor entity at the launcher, heading for its intercept
/// point. Returns the new id.
pub fn spawn_interceptor(world: &mut World, index: &mut EntityIndex, launch: &Launch) -> u32 {
    let id = index.allocate_interceptor_id();
    let velocity = heading_velocity(&launch.origin, &launch.solution.point, launch.speed);

    let state = InterceptorState {
        id,
        name: format!("I{id}"),
        target_id: launch.target.id,
        status: InterceptorStatus::EnRoute,
        manual: launch.manual,
        launch_tick: launch.tick,
        launch_time_secs: launch.time_secs,
        launch_position: launch.origin,
        speed: launch.speed,
        intercept_point: launch.solution.point,
        intercept_time_secs: launch.solution.time_secs,
        solved_target_position: launch.target.position,
        solved_target_velocity: launch.target.velocity,
        solved_at_secs: 0.0,
        retargets: 0,
        resolved_tick: None,
    };

    let entity = world.spawn((
        state,
        launch.origin,
        velocity,
        PositionHistory::default(),
    ));
    index.interceptors.insert(id, entity);
    id
}

/// Velocity of magnitude `speed` pointing from `from` to `to`.
/// Zero when the two points coincide.
pub fn heading_velocity(from: &Position, to: &Position, speed: f64) -> Velocity {
    let dir = (to.as_dvec3() - from.as_dvec3()).normalize_or_zero();
    Velocity::from_dvec3(dir * speed)
}
