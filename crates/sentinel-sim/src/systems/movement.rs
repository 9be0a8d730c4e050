//! Position history for trail rendering.

use hecs::World;

use sentinel_core::components::PositionHistory;
use sentinel_core::constants::{HISTORY_DOT_INTERVAL, MAX_HISTORY_DOTS};
use sentinel_core::types::Position;

/// Record position history for trail rendering.
/// Called after all motion; only records a dot every HISTORY_DOT_INTERVAL ticks.
pub fn update_history(world: &mut World, current_tick: u64) {
    if current_tick == 0 || current_tick % HISTORY_DOT_INTERVAL != 0 {
        return;
    }

    for (_entity, (pos, history)) in world.query_mut::<(&Position, &mut PositionHistory)>() {
        if history.positions.first() == Some(pos) {
            continue;
        }
        history.positions.insert(0, *pos);
        history.positions.truncate(MAX_HISTORY_DOTS);
    }
}
