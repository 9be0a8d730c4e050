//! Error types for the simulation.
//!
//! Only genuinely exceptional conditions live here. Negative results that
//! are part of normal play (an infeasible intercept, a full launcher, a
//! stale target) are modeled as values, not errors.

use thiserror::Error;

/// Result alias for configuration loading and validation.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result alias for tick execution.
pub type SimResult<T> = Result<T, SimError>;

/// Invalid or unreadable configuration. Fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A scalar that must be strictly positive was zero, negative or not finite.
    #[error("configuration error: `{field}` must be positive and finite, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    /// A scalar that must be non-negative was negative or not finite.
    #[error("configuration error: `{field}` must be non-negative and finite, got {value}")]
    Negative { field: &'static str, value: f64 },

    /// Two related values are inconsistent.
    #[error("configuration error: {message}")]
    Inconsistent { message: String },

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub fn inconsistent(message: impl Into<String>) -> Self {
        Self::Inconsistent {
            message: message.into(),
        }
    }
}

/// Tick-level failure. Snapshots published before the failure stay valid.
#[derive(Debug, Error)]
pub enum SimError {
    /// A kinematic quantity became NaN or infinite.
    #[error("non-finite {quantity} on {entity} at tick {tick}")]
    NonFiniteState {
        entity: String,
        quantity: &'static str,
        tick: u64,
    },

    /// The engine already faulted and refuses to advance.
    #[error("simulation faulted at tick {tick} and cannot advance")]
    Faulted { tick: u64 },

    /// An ECS invariant was violated.
    #[error("internal error: {0}")]
    Internal(String),
}
