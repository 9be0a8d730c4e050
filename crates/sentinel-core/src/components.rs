//! ECS components for hecs entities.
//!
//! Components are plain data structs with no game logic.
//! Game logic lives in systems, not components.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{Position, Velocity};

/// Identity and lifecycle of a threat entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatProfile {
    /// Unique threat id, assigned in spawn order starting at 1.
    pub id: u32,
    /// Display name ("M3", "J1", ...).
    pub name: String,
    pub kind: ThreatKind,
    pub status: ThreatStatus,
    /// Simulation time at which the threat was spawned (seconds).
    pub spawn_time_secs: f64,
    /// Interceptor currently en route to this threat, if any.
    #[serde(default)]
    pub active_interceptor: Option<u32>,
    /// Tick at which the threat reached a terminal status.
    #[serde(default)]
    pub resolved_tick: Option<u64>,
}

/// Per-threat motion law consumed by the trajectory model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MotionLaw {
    /// Gravity pulls vertical velocity down each tick.
    Ballistic {
        /// Gravitational acceleration (m/s², positive = downward pull).
        gravity: f64,
    },
    /// Straight flight with a random heading kick every `dodge_interval_secs`.
    Evasive {
        dodge_interval_secs: f64,
        /// Maximum heading perturbation per dodge (radians).
        dodge_max_angle: f64,
        /// Time accumulated since the last dodge (seconds).
        since_last_dodge_secs: f64,
    },
}

/// Interceptor missile state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterceptorState {
    /// Unique interceptor id, assigned in launch order starting at 1.
    pub id: u32,
    /// Display name ("I1", "I2", ...).
    pub name: String,
    pub target_id: u32,
    pub status: InterceptorStatus,
    /// Launched by an operator override rather than auto-engagement.
    pub manual: bool,
    pub launch_tick: u64,
    pub launch_time_secs: f64,
    pub launch_position: Position,
    /// Fixed flight speed (m/s).
    pub speed: f64,
    /// Predicted intercept point.
    pub intercept_point: Position,
    /// Predicted intercept time, measured from launch (seconds).
    pub intercept_time_secs: f64,
    /// Target position at the last solve.
    pub solved_target_position: Position,
    /// Target velocity at the last solve.
    pub solved_target_velocity: Velocity,
    /// Seconds after launch at which the last solve happened.
    pub solved_at_secs: f64,
    /// Number of times the solver was re-invoked after launch.
    pub retargets: u32,
    /// Tick at which the interceptor resolved.
    #[serde(default)]
    pub resolved_tick: Option<u64>,
}

impl InterceptorState {
    /// Where the target would be now had it kept the velocity it had at the
    /// last solve.
    pub fn predicted_target_position(&self, elapsed_secs: f64) -> Position {
        self.solved_target_position.advanced(
            &self.solved_target_velocity,
            elapsed_secs - self.solved_at_secs,
        )
    }
}

/// History of positions for trail rendering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PositionHistory {
    /// Recent positions (newest first), up to MAX_HISTORY_DOTS.
    pub positions: Vec<Position>,
}
