//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Threat type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ThreatKind {
    /// Ballistic missile on a gravity-curved trajectory.
    Missile,
    /// Evasive jet with randomized heading changes.
    Jet,
}

/// Threat lifecycle status.
///
/// Variants are declared in lifecycle order; a threat only ever moves to a
/// later variant. The three terminal variants share the last rank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThreatStatus {
    /// Flying, not yet seen by the radar.
    #[default]
    InFlight,
    /// Locked by the radar.
    Detected,
    /// At least one interceptor has been launched at it.
    Engaged,
    /// Destroyed by an interceptor.
    Destroyed,
    /// Reached the ground.
    Landed,
    /// Left the world bounds.
    Escaped,
}

impl ThreatStatus {
    fn rank(self) -> u8 {
        match self {
            ThreatStatus::InFlight => 0,
            ThreatStatus::Detected => 1,
            ThreatStatus::Engaged => 2,
            ThreatStatus::Destroyed | ThreatStatus::Landed | ThreatStatus::Escaped => 3,
        }
    }

    /// Destroyed, Landed or Escaped.
    pub fn is_terminal(self) -> bool {
        self.rank() == 3
    }

    /// Whether the radar has locked this threat (and it is still flying).
    pub fn is_locked(self) -> bool {
        matches!(self, ThreatStatus::Detected | ThreatStatus::Engaged)
    }

    /// Whether moving from `self` to `next` respects the lifecycle order.
    ///
    /// Engaged is only reachable from Detected (or Engaged itself, for a
    /// re-engagement after a miss) and Destroyed only from Engaged.
    pub fn can_transition_to(self, next: ThreatStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            ThreatStatus::InFlight => false,
            ThreatStatus::Detected => self == ThreatStatus::InFlight,
            ThreatStatus::Engaged => self.is_locked(),
            ThreatStatus::Destroyed => self == ThreatStatus::Engaged,
            ThreatStatus::Landed | ThreatStatus::Escaped => true,
        }
    }
}

/// Interceptor lifecycle status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterceptorStatus {
    #[default]
    EnRoute,
    Hit,
    Miss,
}

impl InterceptorStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, InterceptorStatus::EnRoute)
    }
}

/// Intercept result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterceptResult {
    Hit,
    Miss,
}

/// Why an interceptor was scored as a miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MissReason {
    /// Intercept time elapsed without capture.
    Expired,
    /// Target was destroyed, landed, escaped or removed before capture.
    StaleTarget,
}

/// Why the intercept solver rejected a geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InfeasibleReason {
    /// Discriminant is negative: the interceptor can never catch up.
    NoRealRoot,
    /// Only zero or negative intercept times exist.
    NoPositiveRoot,
    /// The intercept point is beyond the interceptor's maximum range.
    OutOfRange,
    /// Degenerate geometry (parallel equal-speed course, non-finite input).
    Degenerate,
}

/// Why a manual launch order was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverrideRejection {
    /// No threat with that id exists.
    UnknownThreat,
    /// The radar has not locked the threat yet.
    NotDetected,
    /// The threat is destroyed, landed or escaped.
    AlreadyResolved,
    /// Another interceptor is already en route to the threat.
    AlreadyEngaged,
    /// The solver found no intercept.
    Infeasible(InfeasibleReason),
}

/// Top-level simulation phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimPhase {
    #[default]
    Active,
    Paused,
    /// A tick failed; the engine refuses to advance further.
    Faulted,
}
