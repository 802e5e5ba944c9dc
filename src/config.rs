//! Configuration for the leaderboard client and the rank recalculator.
//!
//! Every field has a default, so an empty JSON object is a valid config:
//!
//! ```
//! use highscore::LeaderboardConfig;
//!
//! let config = LeaderboardConfig::from_json_str(r#"{ "debug": true }"#).unwrap();
//! assert!(config.debug);
//! assert_eq!(config.recalc.max_cascade_depth, 8);
//! ```

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LeaderboardConfig {
    /// Verbose (debug-level) logging for this crate.
    pub debug: bool,
    pub recalc: RecalcConfig,
}

/// Scheduling limits for recalculation passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecalcConfig {
    /// After picking up a trigger, wait this long so that triggers arriving
    /// meanwhile are folded into the same pass. 0 disables the wait.
    pub coalesce_window_ms: u64,
    /// How many passes in a row may be triggered by the recalculator's own
    /// rank writes before further re-triggers are dropped.
    pub max_cascade_depth: u32,
    /// How often an idle worker thread wakes to check for a stop request.
    pub poll_interval_ms: u64,
}

impl Default for RecalcConfig {
    fn default() -> Self {
        Self {
            coalesce_window_ms: 0,
            max_cascade_depth: 8,
            poll_interval_ms: 50,
        }
    }
}

impl RecalcConfig {
    pub fn coalesce_window(&self) -> Duration {
        Duration::from_millis(self.coalesce_window_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl LeaderboardConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recalc.max_cascade_depth == 0 {
            return Err(ConfigError::Invalid(
                "recalc.maxCascadeDepth must be at least 1".into(),
            ));
        }
        if self.recalc.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "recalc.pollIntervalMs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Error type for configuration loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The input is not valid JSON for this config.
    Parse(String),
    /// The values parsed but are out of range.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(msg) => write!(f, "config parse error: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
