//! Kind-specific spawn envelopes and motion parameters.
//!
//! Consolidates the per-kind ranges the threat factory samples from.

use rand::Rng;

use sentinel_core::components::MotionLaw;
use sentinel_core::config::ThreatConfig;
use sentinel_core::enums::ThreatKind;
use sentinel_core::types::{Position, Velocity};

use crate::trajectory::ThreatKinematics;

/// Inclusive sampling bounds for one axis.
pub type Span = (f64, f64);

/// Spawn envelope for a threat kind. Positions are relative to the radar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnEnvelope {
    pub x: Span,
    pub y: Span,
    pub z: Span,
    pub vx: Span,
    pub vy: Span,
    pub vz: Span,
}

/// Get the spawn envelope for a given kind.
///
/// Missiles appear anywhere over the defended area, high and diving.
/// Jets enter along the southern edge heading roughly north.
pub fn envelope(kind: ThreatKind) -> SpawnEnvelope {
    match kind {
        ThreatKind::Missile => SpawnEnvelope {
            x: (-30_000.0, 30_000.0),
            y: (-30_000.0, 30_000.0),
            z: (25_000.0, 40_000.0),
            vx: (-2_000.0, 2_000.0),
            vy: (-2_000.0, 2_000.0),
            vz: (-1_500.0, -800.0),
        },
        ThreatKind::Jet => SpawnEnvelope {
            x: (-30_000.0, 30_000.0),
            y: (-30_000.0, -30_000.0),
            z: (20_000.0, 30_000.0),
            vx: (-2_500.0, 2_500.0),
            vy: (800.0, 1_200.0),
            vz: (-400.0, 400.0),
        },
    }
}

/// Motion law for a freshly spawned threat.
///
/// `gravity_override` replaces the configured gravity for missiles.
pub fn motion_for(
    kind: ThreatKind,
    threats: &ThreatConfig,
    gravity_override: Option<f64>,
) -> MotionLaw {
    match kind {
        ThreatKind::Missile => MotionLaw::Ballistic {
            gravity: gravity_override.unwrap_or(threats.gravity),
        },
        ThreatKind::Jet => MotionLaw::Evasive {
            dodge_interval_secs: threats.dodge_interval_secs,
            dodge_max_angle: threats.dodge_max_angle,
            since_last_dodge_secs: 0.0,
        },
    }
}

/// Sample initial kinematics for a threat of `kind` around `origin`.
///
/// Draws position then velocity, axis by axis, so the number of RNG draws
/// per spawn is fixed.
pub fn sample_kinematics<R: Rng>(
    kind: ThreatKind,
    threats: &ThreatConfig,
    origin: &Position,
    rng: &mut R,
) -> ThreatKinematics {
    let env = envelope(kind);
    let position = Position::new(
        origin.x + sample(rng, env.x),
        origin.y + sample(rng, env.y),
        origin.z + sample(rng, env.z),
    );
    let mut velocity = Velocity::new(
        sample(rng, env.vx),
        sample(rng, env.vy),
        sample(rng, env.vz),
    );
    if kind == ThreatKind::Jet {
        velocity = clamp_speed(&velocity, threats.jet_min_speed, threats.jet_max_speed);
    }

    ThreatKinematics {
        position,
        velocity,
        motion: motion_for(kind, threats, None),
    }
}

/// Rescale `velocity` so its magnitude lies in `[min, max]`, keeping direction.
///
/// A zero vector is given a northward heading at `min`.
pub fn clamp_speed(velocity: &Velocity, min: f64, max: f64) -> Velocity {
    let speed = velocity.speed();
    if speed < 1e-9 {
        return Velocity::new(0.0, min, 0.0);
    }
    let target = speed.clamp(min, max);
    if target == speed {
        return *velocity;
    }
    let s = target / speed;
    Velocity::new(velocity.x * s, velocity.y * s, velocity.z * s)
}

fn sample<R: Rng>(rng: &mut R, (lo, hi): Span) -> f64 {
    rng.gen_range(lo..=hi)
}
