//! Radar detection system.
//!
//! Each tick, collects every live threat, computes which are inside the
//! detection range and locks the newly detected ones.

use hecs::World;
use tracing::debug;

use sentinel_core::components::ThreatProfile;
use sentinel_core::config::RadarConfig;
use sentinel_core::enums::ThreatStatus;
use sentinel_core::events::SimEvent;
use sentinel_core::types::Position;

use crate::world_setup::EntityIndex;

/// What the radar needs to know about one threat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub id: u32,
    pub position: Position,
    pub status: ThreatStatus,
}

/// Threats inside detection range this tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RadarPicture {
    /// Ascending id order.
    pub in_range: Vec<u32>,
}

/// Ids of contacts that are newly detected: within `range` of `origin` and
/// still InFlight. Sorted by id.
pub fn scan(contacts: &[Contact], origin: &Position, range: f64) -> Vec<u32> {
    let mut detected: Vec<u32> = contacts
        .iter()
        .filter(|c| c.status == ThreatStatus::InFlight && origin.range_to(&c.position) <= range)
        .map(|c| c.id)
        .collect();
    detected.sort_unstable();
    detected
}

/// Run the radar for one tick. Returns the current radar picture.
pub fn run(
    world: &mut World,
    index: &EntityIndex,
    radar: &RadarConfig,
    events: &mut Vec<SimEvent>,
) -> RadarPicture {
    let contacts: Vec<Contact> = index
        .threats
        .values()
        .filter_map(|&entity| {
            let mut query = world.query_one::<(&ThreatProfile, &Position)>(entity).ok()?;
            query.get().map(|(profile, position)| Contact {
                id: profile.id,
                position: *position,
                status: profile.status,
            })
        })
        .filter(|c| !c.status.is_terminal())
        .collect();

    for id in scan(&contacts, &radar.origin, radar.range) {
        let Some(entity) = index.threat(id) else {
            continue;
        };
        let Ok(mut profile) = world.get::<&mut ThreatProfile>(entity) else {
            continue;
        };
        if !profile.status.can_transition_to(ThreatStatus::Detected) {
            continue;
        }
        profile.status = ThreatStatus::Detected;

        let range = contacts
            .iter()
            .find(|c| c.id == id)
            .map(|c| radar.origin.range_to(&c.position))
            .unwrap_or_default();
        debug!(threat = %profile.name, range, "threat detected");
        events.push(SimEvent::ThreatDetected {
            threat_id: id,
            range,
        });
    }

    RadarPicture {
        in_range: contacts
            .iter()
            .filter(|c| radar.origin.range_to(&c.position) <= radar.range)
            .map(|c| c.id)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(id: u32, x: f64, status: ThreatStatus) -> Contact {
        Contact {
            id,
            position: Position::new(x, 0.0, 1000.0),
            status,
        }
    }

    #[test]
    fn test_scan_detects_only_in_flight_within_range() {
        let origin = Position::default();
        let contacts = [
            contact(3, 500.0, ThreatStatus::InFlight),
            contact(1, 200.0, ThreatStatus::InFlight),
            contact(2, 100.0, ThreatStatus::Detected),
            contact(4, 50_000.0, ThreatStatus::InFlight),
        ];
        assert_eq!(scan(&contacts, &origin, 10_000.0), vec![1, 3]);
    }

    #[test]
    fn test_scan_range_is_inclusive() {
        let origin = Position::default();
        let edge = Contact {
            id: 1,
            position: Position::new(3000.0, 4000.0, 0.0),
            status: ThreatStatus::InFlight,
        };
        assert_eq!(scan(&[edge], &origin, 5000.0), vec![1]);
        assert!(scan(&[edge], &origin, 4999.0).is_empty());
    }

    #[test]
    fn test_scan_empty() {
        assert!(scan(&[], &Position::default(), 1000.0).is_empty());
    }
}
