//! Detector configuration and the host sensitivity scale.
//!
//! All tunables live in one flat [`DetectorConfig`]. Fields for the tier that
//! is not selected are carried but ignored, so a host can switch policy
//! without losing its tuning for the other one.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Which recognition algorithm the engine runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecognitionPolicy {
    /// One above-threshold jolt toggles, then a long cooldown.
    SingleJolt,
    /// Two verified peaks along a common axis within a short window.
    #[default]
    DoubleShake,
}

impl RecognitionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecognitionPolicy::SingleJolt => "single-jolt",
            RecognitionPolicy::DoubleShake => "double-shake",
        }
    }
}

/// Configuration for gesture recognition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Recognition tier.
    pub policy: RecognitionPolicy,

    /// Delta magnitude a jolt must strictly exceed, in raw sensor units.
    pub threshold: f32,

    /// Host sensitivity (0..=50). Overrides `threshold` when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensitivity: Option<u32>,

    /// Number of recent deltas retained.
    pub history_capacity: usize,

    // Single jolt
    /// Suppression window after a toggle (ms).
    pub jolt_cooldown_ms: u64,

    // Double shake
    /// Minimum time between accepted peaks (ms).
    pub min_peak_interval_ms: u64,
    /// Preceding deltas a peak must dominate.
    pub peak_lookback: usize,
    /// Latest the second shake may land after the first (ms, inclusive).
    pub second_shake_window_ms: u64,
    /// A half-finished sequence older than this is dropped (ms).
    pub sequence_timeout_ms: u64,
    /// Minimum |dot| between the two shake directions.
    pub direction_consistency: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            policy: RecognitionPolicy::default(),
            threshold: Sensitivity::default().threshold(),
            sensitivity: None,
            history_capacity: 5,
            jolt_cooldown_ms: 1500,
            min_peak_interval_ms: 200,
            peak_lookback: 3,
            second_shake_window_ms: 800,
            sequence_timeout_ms: 1500,
            direction_consistency: 0.4,
        }
    }
}

impl DetectorConfig {
    /// Default tuning for `policy` at `threshold`.
    pub fn for_policy(policy: RecognitionPolicy, threshold: f32) -> Self {
        Self {
            policy,
            threshold,
            ..Self::default()
        }
    }

    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: DetectorConfig = toml::from_str(text)?;
        config.resolved()
    }

    /// Load and validate a TOML config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Fold `sensitivity` into `threshold`, then validate.
    pub fn resolved(mut self) -> Result<Self, ConfigError> {
        if let Some(progress) = self.sensitivity.take() {
            self.threshold = Sensitivity::new(progress)?.threshold();
        }
        self.validate()?;
        Ok(self)
    }

    /// Check that every tunable is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }
        if self.peak_lookback == 0 {
            return Err(invalid("peak_lookback", "must be at least 1".to_string()));
        }
        if self.history_capacity <= self.peak_lookback {
            return Err(invalid(
                "history_capacity",
                format!(
                    "{} cannot hold a candidate plus {} preceding deltas",
                    self.history_capacity, self.peak_lookback
                ),
            ));
        }
        if !(0.0..=1.0).contains(&self.direction_consistency) {
            return Err(invalid(
                "direction_consistency",
                format!("{} is outside [0, 1]", self.direction_consistency),
            ));
        }
        if self.min_peak_interval_ms > self.second_shake_window_ms {
            return Err(invalid(
                "second_shake_window_ms",
                format!(
                    "{} ms is shorter than min_peak_interval_ms ({} ms)",
                    self.second_shake_window_ms, self.min_peak_interval_ms
                ),
            ));
        }
        if self.second_shake_window_ms > self.sequence_timeout_ms {
            return Err(invalid(
                "sequence_timeout_ms",
                format!(
                    "{} ms expires before the second shake window ({} ms)",
                    self.sequence_timeout_ms, self.second_shake_window_ms
                ),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::InvalidField { field, reason }
}

/// Host-side sensitivity slider position.
///
/// The settings screen exposes 0..=50; higher means a lighter shake is enough.
/// Maps linearly onto thresholds from 75.0 down to 10.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Sensitivity(u32);

impl Sensitivity {
    pub const MAX: u32 = 50;

    /// Threshold at progress 0.
    pub const BASE_THRESHOLD: f32 = 75.0;
    /// Threshold drop per progress step.
    pub const STEP: f32 = 1.3;

    pub fn new(progress: u32) -> Result<Self, ConfigError> {
        if progress > Self::MAX {
            return Err(ConfigError::SensitivityOutOfRange(progress));
        }
        Ok(Self(progress))
    }

    pub fn progress(&self) -> u32 {
        self.0
    }

    /// `75 - progress * 1.3`
    pub fn threshold(&self) -> f32 {
        Self::BASE_THRESHOLD - self.0 as f32 * Self::STEP
    }
}

impl Default for Sensitivity {
    fn default() -> Self {
        Self(25)
    }
}
