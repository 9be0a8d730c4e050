//! State shared between the runner and the simulation loop thread.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::warn;

use sentinel_core::commands::OperatorCommand;
use sentinel_core::state::SimSnapshot;

/// Commands sent to the loop thread.
#[derive(Debug)]
pub enum LoopCommand {
    /// An operator command to forward to the simulation engine.
    Operator(OperatorCommand),
    /// Stop the loop after the current tick.
    Shutdown,
}

/// Latest published snapshot.
///
/// Each tick swaps in a fresh `Arc`, so a reader holds either the previous
/// snapshot or the new one, never a partial tick. A poisoned lock is
/// recovered: the slot only ever holds a whole `Arc`.
#[derive(Debug, Default)]
pub struct SnapshotBoard {
    latest: Mutex<Option<Arc<SimSnapshot>>>,
}

impl SnapshotBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the published snapshot.
    pub fn publish(&self, snapshot: SimSnapshot) {
        let snapshot = Arc::new(snapshot);
        *self.slot() = Some(snapshot);
    }

    /// The most recently published snapshot, if any.
    pub fn latest(&self) -> Option<Arc<SimSnapshot>> {
        self.slot().clone()
    }

    fn slot(&self) -> MutexGuard<'_, Option<Arc<SimSnapshot>>> {
        self.latest.lock().unwrap_or_else(|poisoned| {
            warn!("snapshot board lock poisoned, recovering");
            poisoned.into_inner()
        })
    }
}
