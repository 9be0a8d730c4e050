//! Threat prioritization.
//!
//! Orders engagement candidates by time-to-impact on the defended origin,
//! then by type weight, then by id. Pure: no world access.

use sentinel_core::config::PriorityWeights;
use sentinel_core::constants::MIN_CLOSING_SPEED;
use sentinel_core::enums::ThreatKind;
use sentinel_core::types::{Position, Velocity};

/// A threat eligible for engagement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub id: u32,
    pub kind: ThreatKind,
    pub position: Position,
    pub velocity: Velocity,
}

/// Seconds until the threat reaches `origin` at its current closing speed.
///
/// Closing speed is the velocity component toward `origin`. Threats that are
/// not closing get `f64::INFINITY`.
pub fn time_to_impact(position: &Position, velocity: &Velocity, origin: &Position) -> f64 {
    let to_origin = origin.as_dvec3() - position.as_dvec3();
    let distance = to_origin.length();
    if distance == 0.0 {
        return 0.0;
    }
    let closing = velocity.as_dvec3().dot(to_origin) / distance;
    if closing > MIN_CLOSING_SPEED {
        distance / closing
    } else {
        f64::INFINITY
    }
}

/// Rank candidates, most urgent first.
pub fn select(candidates: &[Candidate], origin: &Position, weights: &PriorityWeights) -> Vec<u32> {
    let mut ranked: Vec<(f64, f64, u32)> = candidates
        .iter()
        .map(|c| {
            (
                time_to_impact(&c.position, &c.velocity, origin),
                weights.weight(c.kind),
                c.id,
            )
        })
        .collect();

    ranked.sort_by(|a, b| {
        a.0.total_cmp(&b.0)
            .then_with(|| b.1.total_cmp(&a.1))
            .then_with(|| a.2.cmp(&b.2))
    });
    ranked.into_iter().map(|(_, _, id)| id).collect()
}
