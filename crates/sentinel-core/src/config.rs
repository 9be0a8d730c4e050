//! Simulation configuration.
//!
//! Every section has serde defaults so a YAML file only needs the values it
//! changes. `SimConfig::validate` must pass before an engine is built.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::enums::ThreatKind;
use crate::error::{ConfigError, ConfigResult};
use crate::types::{Position, Velocity};

/// Top-level simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    /// Duration of one tick (seconds).
    pub tick_secs: f64,
    /// How long resolved entities remain in snapshots (seconds).
    pub retain_resolved_secs: f64,
    /// Automatically engage detected threats.
    pub auto_engage: bool,
    pub radar: RadarConfig,
    pub interceptor: InterceptorConfig,
    pub world: WorldConfig,
    pub threats: ThreatConfig,
    pub priority: PriorityWeights,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RadarConfig {
    /// Radar and launcher site.
    pub origin: Position,
    /// Detection range (meters).
    pub range: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InterceptorConfig {
    /// Fixed flight speed (m/s).
    pub speed: f64,
    /// Farthest acceptable intercept point from the launcher (meters).
    pub max_range: f64,
    /// Capture distance for a hit (meters).
    pub capture_radius: f64,
    /// Interceptors allowed en route at once.
    pub max_concurrent: u32,
    /// Re-solve when the target strays this far from its predicted track.
    /// `None` disables re-solving.
    pub retarget_threshold: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    /// Horizontal escape radius around the radar origin (meters).
    pub radius: f64,
    /// Escape altitude (meters).
    pub ceiling: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThreatConfig {
    /// Gravity applied to missiles (m/s²).
    pub gravity: f64,
    pub dodge_interval_secs: f64,
    /// Largest heading perturbation per jet dodge (radians).
    pub dodge_max_angle: f64,
    pub jet_min_speed: f64,
    pub jet_max_speed: f64,
    /// Randomized waves.
    pub waves: Vec<WaveConfig>,
    /// Threats with exact initial kinematics.
    pub scripted: Vec<ScriptedThreat>,
}

/// A batch of randomized threats spawned at a fixed time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaveConfig {
    #[serde(default)]
    pub at_secs: f64,
    #[serde(default)]
    pub missiles: u32,
    #[serde(default)]
    pub jets: u32,
}

/// A single threat with exact initial kinematics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptedThreat {
    pub kind: ThreatKind,
    pub position: Position,
    pub velocity: Velocity,
    #[serde(default)]
    pub at_secs: f64,
    /// Overrides the configured gravity for this missile.
    #[serde(default)]
    pub gravity: Option<f64>,
}

/// Type weights for the prioritization tie-break (higher engages first).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PriorityWeights {
    pub missile_weight: f64,
    pub jet_weight: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            tick_secs: DEFAULT_TICK_SECS,
            retain_resolved_secs: DEFAULT_RETAIN_RESOLVED_SECS,
            auto_engage: true,
            radar: RadarConfig::default(),
            interceptor: InterceptorConfig::default(),
            world: WorldConfig::default(),
            threats: ThreatConfig::default(),
            priority: PriorityWeights::default(),
        }
    }
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            origin: Position::default(),
            range: DEFAULT_RADAR_RANGE,
        }
    }
}

impl Default for InterceptorConfig {
    fn default() -> Self {
        Self {
            speed: DEFAULT_INTERCEPTOR_SPEED,
            max_range: DEFAULT_INTERCEPTOR_MAX_RANGE,
            capture_radius: DEFAULT_CAPTURE_RADIUS,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            retarget_threshold: Some(DEFAULT_RETARGET_THRESHOLD),
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_WORLD_RADIUS,
            ceiling: DEFAULT_WORLD_CEILING,
        }
    }
}

impl Default for ThreatConfig {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            dodge_interval_secs: DEFAULT_DODGE_INTERVAL_SECS,
            dodge_max_angle: DEFAULT_DODGE_MAX_ANGLE,
            jet_min_speed: DEFAULT_JET_MIN_SPEED,
            jet_max_speed: DEFAULT_JET_MAX_SPEED,
            waves: vec![WaveConfig {
                at_secs: 0.0,
                missiles: DEFAULT_WAVE_MISSILES,
                jets: DEFAULT_WAVE_JETS,
            }],
            scripted: Vec::new(),
        }
    }
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            missile_weight: DEFAULT_MISSILE_WEIGHT,
            jet_weight: DEFAULT_JET_WEIGHT,
        }
    }
}

impl PriorityWeights {
    pub fn weight(&self, kind: ThreatKind) -> f64 {
        match kind {
            ThreatKind::Missile => self.missile_weight,
            ThreatKind::Jet => self.jet_weight,
        }
    }
}

impl SimConfig {
    /// Load and validate configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// A config with no randomized waves, for hand-built scenarios.
    pub fn empty_sky() -> Self {
        let mut config = Self::default();
        config.threats.waves.clear();
        config
    }

    /// Check every scalar constraint.
    pub fn validate(&self) -> ConfigResult<()> {
        ensure_positive("tick_secs", self.tick_secs)?;
        ensure_non_negative("retain_resolved_secs", self.retain_resolved_secs)?;

        ensure_finite_position("radar.origin", &self.radar.origin)?;
        ensure_positive("radar.range", self.radar.range)?;

        ensure_positive("interceptor.speed", self.interceptor.speed)?;
        ensure_positive("interceptor.max_range", self.interceptor.max_range)?;
        ensure_positive("interceptor.capture_radius", self.interceptor.capture_radius)?;
        ensure_positive(
            "interceptor.max_concurrent",
            f64::from(self.interceptor.max_concurrent),
        )?;
        if let Some(threshold) = self.interceptor.retarget_threshold {
            ensure_positive("interceptor.retarget_threshold", threshold)?;
        }

        ensure_positive("world.radius", self.world.radius)?;
        ensure_positive("world.ceiling", self.world.ceiling)?;

        let threats = &self.threats;
        ensure_positive("threats.gravity", threats.gravity)?;
        ensure_positive("threats.dodge_interval_secs", threats.dodge_interval_secs)?;
        ensure_non_negative("threats.dodge_max_angle", threats.dodge_max_angle)?;
        ensure_positive("threats.jet_min_speed", threats.jet_min_speed)?;
        ensure_positive("threats.jet_max_speed", threats.jet_max_speed)?;
        if threats.jet_min_speed > threats.jet_max_speed {
            return Err(ConfigError::inconsistent(format!(
                "threats.jet_min_speed ({}) exceeds threats.jet_max_speed ({})",
                threats.jet_min_speed, threats.jet_max_speed
            )));
        }
        for wave in &threats.waves {
            ensure_non_negative("threats.waves.at_secs", wave.at_secs)?;
        }
        for scripted in &threats.scripted {
            ensure_non_negative("threats.scripted.at_secs", scripted.at_secs)?;
            ensure_finite_position("threats.scripted.position", &scripted.position)?;
            if !scripted.velocity.is_finite() {
                return Err(ConfigError::inconsistent(
                    "threats.scripted.velocity must be finite",
                ));
            }
            if let Some(gravity) = scripted.gravity {
                ensure_non_negative("threats.scripted.gravity", gravity)?;
            }
        }

        if !self.priority.missile_weight.is_finite() || !self.priority.jet_weight.is_finite() {
            return Err(ConfigError::inconsistent("priority weights must be finite"));
        }

        Ok(())
    }
}

/// Fails with `NotPositive` unless `value` is finite and > 0.
pub fn ensure_positive(field: &'static str, value: f64) -> ConfigResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

/// Fails with `Negative` unless `value` is finite and >= 0.
pub fn ensure_non_negative(field: &'static str, value: f64) -> ConfigResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

fn ensure_finite_position(field: &'static str, pos: &Position) -> ConfigResult<()> {
    if pos.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::inconsistent(format!("{field} must be finite")))
    }
}
