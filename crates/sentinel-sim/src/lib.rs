//! Simulation engine for SENTINEL.
//!
//! Owns the hecs ECS world, runs systems at a fixed tick rate,
//! and produces SimSnapshots for the view layer.

pub mod engagement;
pub mod engine;
pub mod guidance;
pub mod systems;
pub mod world_setup;

pub use engine::SimulationEngine;
pub use sentinel_core as core;

#[cfg(test)]
mod tests;
