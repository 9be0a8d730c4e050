//! Simulation constants and tuning defaults.
//!
//! Every value here that is also a `SimConfig` field is only the default;
//! the engine always reads the configured value.

/// Default tick duration in seconds.
pub const DEFAULT_TICK_SECS: f64 = 0.01;

/// Default RNG seed.
pub const DEFAULT_SEED: u64 = 42;

/// How long resolved threats and interceptors stay visible before cleanup (seconds).
pub const DEFAULT_RETAIN_RESOLVED_SECS: f64 = 2.0;

// --- World bounds ---

/// Horizontal radius around the radar origin beyond which threats escape (meters).
pub const DEFAULT_WORLD_RADIUS: f64 = 60_000.0;

/// Altitude above which threats escape (meters).
pub const DEFAULT_WORLD_CEILING: f64 = 80_000.0;

// --- Radar ---

/// Radar detection range (meters).
pub const DEFAULT_RADAR_RANGE: f64 = 30_000.0;

// --- Interceptors ---

/// Interceptor speed (m/s).
pub const DEFAULT_INTERCEPTOR_SPEED: f64 = 10_000.0;

/// Farthest intercept point the solver accepts, measured from the launcher (meters).
pub const DEFAULT_INTERCEPTOR_MAX_RANGE: f64 = 45_000.0;

/// Distance at which an interceptor captures its target (meters).
pub const DEFAULT_CAPTURE_RADIUS: f64 = 200.0;

/// Maximum interceptors en route at once.
pub const DEFAULT_MAX_CONCURRENT: u32 = 30;

/// Target deviation from its predicted track that triggers a re-solve (meters).
pub const DEFAULT_RETARGET_THRESHOLD: f64 = 500.0;

// --- Threats ---

/// Gravitational acceleration applied to missiles (m/s²).
pub const DEFAULT_GRAVITY: f64 = 9.8;

/// Seconds between jet heading perturbations.
pub const DEFAULT_DODGE_INTERVAL_SECS: f64 = 0.5;

/// Largest heading perturbation per dodge (radians, ~20°).
pub const DEFAULT_DODGE_MAX_ANGLE: f64 = 0.35;

/// Jet speed envelope (m/s).
pub const DEFAULT_JET_MIN_SPEED: f64 = 200.0;
pub const DEFAULT_JET_MAX_SPEED: f64 = 800.0;

/// Threat counts in the default opening wave.
pub const DEFAULT_WAVE_MISSILES: u32 = 20;
pub const DEFAULT_WAVE_JETS: u32 = 8;

// --- Prioritization ---

pub const DEFAULT_MISSILE_WEIGHT: f64 = 2.0;
pub const DEFAULT_JET_WEIGHT: f64 = 1.0;

/// Closing speeds at or below this are treated as non-closing (m/s).
pub const MIN_CLOSING_SPEED: f64 = 1e-9;

// --- Intercept solver ---

/// Relative tolerance for the degenerate-quadratic and discriminant checks.
pub const SOLVER_EPSILON: f64 = 1e-9;

/// Roots at or below this are treated as zero (seconds).
pub const SOLVER_MIN_TIME: f64 = 1e-9;

// --- Display ---

/// Maximum number of position history dots per entity.
pub const MAX_HISTORY_DOTS: usize = 200;

/// History dot interval in ticks (one dot every N ticks).
pub const HISTORY_DOT_INTERVAL: u64 = 5;
