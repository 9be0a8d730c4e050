//! Operator commands sent from the view layer to the simulation.
//!
//! Commands are queued and processed at the next tick boundary.

use serde::{Deserialize, Serialize};

/// All possible operator actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OperatorCommand {
    // --- Engagement management ---
    /// Launch an interceptor at a specific threat now, bypassing
    /// prioritization. Still subject to the solver and launch capacity.
    LaunchInterceptor { threat_id: u32 },
    /// Enable or disable automatic engagement of detected threats.
    SetAutoEngage { enabled: bool },

    // --- Defense tuning ---
    /// Change defense parameters mid-run. `None` keeps the current value.
    RetuneDefense {
        radar_range: Option<f64>,
        interceptor_speed: Option<f64>,
        max_concurrent: Option<u32>,
    },

    // --- Simulation control ---
    /// Pause the simulation.
    Pause,
    /// Resume the simulation.
    Resume,
}
