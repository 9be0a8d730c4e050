//! Simulation snapshot: the complete visible state published after each tick.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::{EngagementRecord, SimEvent};
use crate::types::{Position, SimTime, Velocity};

/// Complete simulation state handed to the view layer after each tick.
///
/// A snapshot is a detached copy; nothing in it aliases engine state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimSnapshot {
    pub time: SimTime,
    pub phase: SimPhase,
    pub auto_engage: bool,
    /// Threats in ascending id order.
    pub threats: Vec<ThreatView>,
    /// Interceptors in ascending id order.
    pub interceptors: Vec<InterceptorView>,
    pub radar: RadarView,
    /// Events emitted during this tick.
    pub events: Vec<SimEvent>,
    /// Engagement records created during this tick.
    pub records: Vec<EngagementRecord>,
    pub stats: StatsView,
}

/// A threat as seen by the view layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatView {
    pub id: u32,
    pub name: String,
    pub kind: ThreatKind,
    pub status: ThreatStatus,
    pub position: Position,
    pub velocity: Velocity,
    pub spawn_time_secs: f64,
    /// Range from the radar origin (meters).
    pub range: f64,
    pub active_interceptor: Option<u32>,
    /// Position history for trail dots.
    pub history: Vec<Position>,
}

/// An interceptor as seen by the view layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterceptorView {
    pub id: u32,
    pub name: String,
    pub target_id: u32,
    pub status: InterceptorStatus,
    pub manual: bool,
    pub launch_time_secs: f64,
    pub launch_position: Position,
    pub position: Position,
    pub velocity: Velocity,
    pub speed: f64,
    pub intercept_point: Position,
    pub intercept_time_secs: f64,
    pub history: Vec<Position>,
}

/// Radar picture for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RadarView {
    pub origin: Position,
    pub range: f64,
    /// Threats currently inside detection range (ascending id).
    pub in_range: Vec<u32>,
}

/// Running totals for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsView {
    pub threats_spawned: u32,
    pub interceptors_launched: u32,
    pub intercepted: u32,
    pub missed: u32,
    pub landed: u32,
    pub escaped: u32,
    /// Interceptors currently en route.
    pub in_flight: u32,
}
