//! Cleanup system: despawns threats and interceptors that resolved long
//! enough ago, and drops them from the id index.

use hecs::{Entity, World};
use tracing::debug;

use sentinel_core::components::{InterceptorState, ThreatProfile};

use crate::world_setup::EntityIndex;

/// Remove entities whose resolution is at least `retain_ticks` old.
/// Uses a pre-allocated buffer to avoid per-tick allocation.
pub fn run(
    world: &mut World,
    index: &mut EntityIndex,
    despawn_buffer: &mut Vec<Entity>,
    retain_ticks: u64,
    current_tick: u64,
) {
    despawn_buffer.clear();
    let expired = |resolved: Option<u64>| {
        resolved.is_some_and(|t| current_tick.saturating_sub(t) >= retain_ticks)
    };

    let mut threat_ids = Vec::new();
    for (entity, profile) in world.query_mut::<&ThreatProfile>() {
        if expired(profile.resolved_tick) {
            despawn_buffer.push(entity);
            threat_ids.push(profile.id);
        }
    }

    let mut interceptor_ids = Vec::new();
    for (entity, state) in world.query_mut::<&InterceptorState>() {
        if expired(state.resolved_tick) {
            despawn_buffer.push(entity);
            interceptor_ids.push(state.id);
        }
    }

    for id in threat_ids {
        index.threats.remove(&id);
    }
    for id in interceptor_ids {
        index.interceptors.remove(&id);
    }

    for entity in despawn_buffer.drain(..) {
        if world.despawn(entity).is_ok() {
            debug!(?entity, "despawned resolved entity");
        }
    }
}
