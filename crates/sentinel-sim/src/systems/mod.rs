//! ECS systems that operate on the simulation world each tick.
//!
//! Systems are functions that take `&mut World` (or `&World` for read-only).
//! They do not own state; all state lives in components and in the engine.
//! `prioritization` and `radar::scan` are pure and never touch the world.

pub mod cleanup;
pub mod fire_control;
pub mod interceptor;
pub mod movement;
pub mod prioritization;
pub mod radar;
pub mod snapshot;
pub mod trajectory;
pub mod wave_spawner;
