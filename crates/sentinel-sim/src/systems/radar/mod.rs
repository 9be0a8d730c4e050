//! Radar subsystem.
//!
//! Detection is a range gate around the radar origin. A threat that enters
//! the gate while InFlight is locked as Detected and never unlocked.

pub mod detection;

pub use detection::{scan, Contact, RadarPicture};
