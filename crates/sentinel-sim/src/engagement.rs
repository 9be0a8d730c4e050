//! Engagement bookkeeping: running totals and the resolution log.
//!
//! Stored in `SimulationEngine`, NOT as ECS entities.

use std::collections::BTreeSet;

use sentinel_core::events::EngagementRecord;
use sentinel_core::state::StatsView;

/// Running score state tracked by the engine.
#[derive(Debug, Clone, Default)]
pub struct ScoreState {
    pub threats_spawned: u32,
    pub interceptors_launched: u32,
    pub intercepted: u32,
    pub missed: u32,
    pub landed: u32,
    pub escaped: u32,
}

impl ScoreState {
    pub fn view(&self, in_flight: u32) -> StatsView {
        StatsView {
            threats_spawned: self.threats_spawned,
            interceptors_launched: self.interceptors_launched,
            intercepted: self.intercepted,
            missed: self.missed,
            landed: self.landed,
            escaped: self.escaped,
            in_flight,
        }
    }
}

/// Append-only log of engagement resolutions.
///
/// Holds at most one record per interceptor.
#[derive(Debug, Clone, Default)]
pub struct EngagementLog {
    records: Vec<EngagementRecord>,
    resolved: BTreeSet<u32>,
}

impl EngagementLog {
    /// Append `record` unless its interceptor already has one.
    /// Returns whether the record was appended.
    pub fn record(&mut self, record: EngagementRecord) -> bool {
        if !self.resolved.insert(record.interceptor_id) {
            return false;
        }
        self.records.push(record);
        true
    }

    pub fn records(&self) -> &[EngagementRecord] {
        &self.records
    }

    /// Records appended at or after position `mark`.
    pub fn since(&self, mark: usize) -> &[EngagementRecord] {
        self.records.get(mark..).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
