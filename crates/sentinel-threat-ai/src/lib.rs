//! Threat motion for SENTINEL.
//!
//! Implements the per-threat trajectory model (ballistic missiles, dodging
//! jets), world-boundary classification and the randomized spawn envelopes.
//! Everything here is a pure function of its inputs plus an explicit RNG.

pub mod profiles;
pub mod trajectory;

pub use sentinel_core as core;
