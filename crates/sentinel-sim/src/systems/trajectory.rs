//! Threat trajectory system: advances every live threat by one tick and
//! applies landing and escape.

use hecs::World;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use sentinel_core::components::{MotionLaw, ThreatProfile};
use sentinel_core::config::SimConfig;
use sentinel_core::enums::ThreatStatus;
use sentinel_core::error::{SimError, SimResult};
use sentinel_core::events::SimEvent;
use sentinel_core::types::{Position, Velocity};
use sentinel_threat_ai::trajectory::{self, ThreatKinematics};

use crate::engagement::ScoreState;
use crate::world_setup::EntityIndex;

/// Advance threats in ascending id order so RNG draws are reproducible.
#[allow(clippy::too_many_arguments)]
pub fn run(
    world: &mut World,
    index: &EntityIndex,
    rng: &mut ChaCha8Rng,
    config: &SimConfig,
    dt: f64,
    tick: u64,
    events: &mut Vec<SimEvent>,
    score: &mut ScoreState,
) -> SimResult<()> {
    for (&id, &entity) in &index.threats {
        let (profile, position, velocity, motion) = world
            .query_one_mut::<(&mut ThreatProfile, &mut Position, &mut Velocity, &mut MotionLaw)>(
                entity,
            )
            .map_err(|e| SimError::Internal(format!("threat {id}: {e}")))?;
        if profile.status.is_terminal() {
            continue;
        }

        let next = trajectory::advance(
            &ThreatKinematics {
                position: *position,
                velocity: *velocity,
                motion: *motion,
            },
            dt,
            rng,
        );
        if !next.position.is_finite() {
            return Err(SimError::NonFiniteState {
                entity: profile.name.clone(),
                quantity: "position",
                tick,
            });
        }
        if !next.velocity.is_finite() {
            return Err(SimError::NonFiniteState {
                entity: profile.name.clone(),
                quantity: "velocity",
                tick,
            });
        }
        *position = next.position;
        *velocity = next.velocity;
        *motion = next.motion;

        let Some(status) = trajectory::boundary_status(position, &config.radar.origin, &config.world)
        else {
            continue;
        };
        if !profile.status.can_transition_to(status) {
            continue;
        }
        profile.status = status;
        profile.resolved_tick = Some(tick);

        let position = *position;
        match status {
            ThreatStatus::Landed => {
                score.landed += 1;
                info!(threat = %profile.name, x = position.x, y = position.y, "threat landed");
                events.push(SimEvent::ThreatLanded {
                    threat_id: id,
                    position,
                });
            }
            _ => {
                score.escaped += 1;
                info!(threat = %profile.name, x = position.x, y = position.y, z = position.z, "threat escaped");
                events.push(SimEvent::ThreatEscaped {
                    threat_id: id,
                    position,
                });
            }
        }
    }
    Ok(())
}
