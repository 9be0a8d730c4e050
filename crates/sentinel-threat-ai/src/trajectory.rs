//! Threat trajectory model.
//!
//! Pure functions that advance a threat's kinematic state by one step.
//! No ECS dependency: operates on plain data, with randomness supplied by
//! the caller so a whole run replays from one seed.

use glam::DVec2;
use rand::Rng;

use sentinel_core::components::MotionLaw;
use sentinel_core::config::WorldConfig;
use sentinel_core::enums::ThreatStatus;
use sentinel_core::types::{Position, Velocity};

/// Slack used when comparing the dodge timer against its interval, so that
/// an interval that is an exact multiple of dt fires on schedule.
const DODGE_TIMER_SLACK: f64 = 1e-9;

/// Kinematic state of one threat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThreatKinematics {
    pub position: Position,
    pub velocity: Velocity,
    pub motion: MotionLaw,
}

/// Advance a threat by `dt` seconds.
///
/// Ballistic: `v.z -= g * dt`, then `p += v * dt`. Never touches `rng`.
///
/// Evasive: `p += v * dt`, then each time the dodge timer reaches the
/// interval the horizontal heading is rotated by a uniform angle in
/// `[-dodge_max_angle, dodge_max_angle]`. Speed and vertical velocity are
/// unchanged by a dodge.
pub fn advance<R: Rng>(
    kinematics: &ThreatKinematics,
    dt: f64,
    rng: &mut R,
) -> ThreatKinematics {
    match kinematics.motion {
        MotionLaw::Ballistic { gravity } => {
            let mut velocity = kinematics.velocity;
            velocity.z -= gravity * dt;
            ThreatKinematics {
                position: kinematics.position.advanced(&velocity, dt),
                velocity,
                motion: kinematics.motion,
            }
        }
        MotionLaw::Evasive {
            dodge_interval_secs,
            dodge_max_angle,
            since_last_dodge_secs,
        } => {
            let position = kinematics.position.advanced(&kinematics.velocity, dt);
            let mut velocity = kinematics.velocity;
            let mut since = since_last_dodge_secs + dt;
            while dodge_interval_secs > 0.0
                && since + DODGE_TIMER_SLACK >= dodge_interval_secs
            {
                since -= dodge_interval_secs;
                velocity = dodge(&velocity, dodge_max_angle, rng);
            }
            ThreatKinematics {
                position,
                velocity,
                motion: MotionLaw::Evasive {
                    dodge_interval_secs,
                    dodge_max_angle,
                    since_last_dodge_secs: since.max(0.0),
                },
            }
        }
    }
}

/// Rotate the horizontal component of `velocity` by a random bounded angle.
pub fn dodge<R: Rng>(velocity: &Velocity, max_angle: f64, rng: &mut R) -> Velocity {
    let angle = if max_angle > 0.0 {
        rng.gen_range(-max_angle..=max_angle)
    } else {
        0.0
    };
    let horizontal = DVec2::from_angle(angle).rotate(DVec2::new(velocity.x, velocity.y));
    Velocity::new(horizontal.x, horizontal.y, velocity.z)
}

/// Terminal status implied by a position, if any.
///
/// Landing (z <= 0) takes precedence over leaving the world.
pub fn boundary_status(
    position: &Position,
    origin: &Position,
    world: &WorldConfig,
) -> Option<ThreatStatus> {
    if position.z <= 0.0 {
        Some(ThreatStatus::Landed)
    } else if position.horizontal_range_to(origin) > world.radius || position.z > world.ceiling {
        Some(ThreatStatus::Escaped)
    } else {
        None
    }
}
