//! Events emitted by the simulation for the view and reporting layers.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::Position;

/// Discrete simulation events, in emission order within a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    /// A new threat entered the world.
    ThreatSpawned {
        threat_id: u32,
        kind: ThreatKind,
        position: Position,
    },
    /// The radar locked a threat.
    ThreatDetected { threat_id: u32, range: f64 },
    /// An interceptor left the launcher.
    InterceptorLaunched {
        interceptor_id: u32,
        threat_id: u32,
        intercept_point: Position,
        intercept_time_secs: f64,
        manual: bool,
    },
    /// The solver was re-invoked for an interceptor en route.
    InterceptorRetargeted {
        interceptor_id: u32,
        intercept_point: Position,
        intercept_time_secs: f64,
    },
    /// Threat destroyed.
    Hit { interceptor_id: u32, threat_id: u32 },
    /// Interceptor failed to capture its target.
    Miss {
        interceptor_id: u32,
        threat_id: u32,
        reason: MissReason,
    },
    /// Threat reached the ground.
    ThreatLanded { threat_id: u32, position: Position },
    /// Threat left the world bounds.
    ThreatEscaped { threat_id: u32, position: Position },
    /// A manual launch order was refused.
    OverrideRejected {
        threat_id: u32,
        reason: OverrideRejection,
    },
    /// A retune command carried an invalid value and was ignored.
    RetuneRejected { message: String },
}

/// Immutable log entry created exactly once when an engagement resolves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngagementRecord {
    pub threat_id: u32,
    pub interceptor_id: u32,
    pub outcome: InterceptResult,
    /// Simulation time of the resolution (seconds).
    pub time_secs: f64,
}
