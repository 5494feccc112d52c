use crate::action::ActionKind;
use crate::sensor_receiver::AccelSample;
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Minimum time in milliseconds between shake actions
pub const DEFAULT_MIN_PERIOD_MS: i64 = 500;

/// Decay applied to the previous filtered jerk on every sample
pub const FILTER_DECAY: f64 = 0.9;

/// Shake detection settings. Replaced as a whole on reload, never field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShakeConfig {
    /// Minimum filtered jerk required for a shake
    pub threshold: f64,
    pub min_period_ms: i64,
    pub action: ActionKind,
}

impl ShakeConfig {
    pub fn new(threshold: f64, min_period_ms: i64, action: ActionKind) -> Self {
        ShakeConfig {
            threshold,
            min_period_ms,
            action,
        }
    }
}

impl Default for ShakeConfig {
    fn default() -> Self {
        ShakeConfig::new(8.0, DEFAULT_MIN_PERIOD_MS, ActionKind::Nothing)
    }
}

/// Mutable detector state
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectorState {
    /// Magnitude of last sensed acceleration
    pub last_magnitude: f64,
    /// Filtered jerk used for shake detection
    pub filtered_jerk: f64,
    /// Timestamp of the last emitted action, `None` until the first one
    pub last_trigger_ms: Option<i64>,
}

/// Turns raw accelerometer samples into debounced shake actions.
///
/// Single-threaded and lock-free; the owner decides how samples and
/// reconfiguration are serialized.
#[derive(Debug, Clone)]
pub struct ShakeDetector {
    config: Arc<ShakeConfig>,
    state: DetectorState,
}

impl ShakeDetector {
    pub fn new(config: Arc<ShakeConfig>) -> Self {
        ShakeDetector {
            config,
            state: DetectorState::default(),
        }
    }

    /// Evaluate one sample. `now` is a monotonic clock reading in milliseconds.
    ///
    /// The sample must be finite; NaN would stick in the filter.
    pub fn on_sample(&mut self, sample: &AccelSample, now: i64) -> Option<ActionKind> {
        let magnitude = sample.magnitude();
        let delta = magnitude - self.state.last_magnitude;
        self.state.last_magnitude = magnitude;

        let filtered = self.state.filtered_jerk * FILTER_DECAY + delta;
        self.state.filtered_jerk = filtered;

        if filtered <= self.config.threshold {
            return None;
        }

        let armed = match self.state.last_trigger_ms {
            None => true,
            Some(last) => now.saturating_sub(last) > self.config.min_period_ms,
        };
        if !armed {
            return None;
        }

        self.state.last_trigger_ms = Some(now);
        debug!(
            "Shake detected at {} ms (jerk {:.2} > {:.2}), action {}",
            now, filtered, self.config.threshold, self.config.action
        );
        Some(self.config.action)
    }

    /// Swap in a new configuration. Filter state carries over.
    pub fn reconfigure(&mut self, config: Arc<ShakeConfig>) {
        self.config = config;
    }

    pub fn config(&self) -> Arc<ShakeConfig> {
        Arc::clone(&self.config)
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }
}
