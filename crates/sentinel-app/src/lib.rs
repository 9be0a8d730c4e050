//! SENTINEL headless runner.
//!
//! Runs the simulation engine on its own thread, publishes each snapshot to
//! a shared board and forwards operator commands over a channel.

pub mod game_loop;
pub mod state;

pub use sentinel_core as core;
