use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::error::SequencerError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error(transparent)]
    Invalid(#[from] SequencerError),
}

/// Sequencer-wide timing configuration. All values are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerConfig {
    /// Time between clock ticks.
    pub interval: f64,
    /// How far past `now` each tick schedules events.
    pub lookahead: f64,
    /// Generate ticks on a dedicated clock thread instead of the caller's.
    pub use_isolated_clock: bool,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            interval: 0.025,
            lookahead: 0.1,
            use_isolated_clock: true,
        }
    }
}

impl SequencerConfig {
    pub fn validate(&self) -> Result<(), SequencerError> {
        if !(self.interval.is_finite() && self.interval > 0.0) {
            return Err(SequencerError::InvalidConfig(
                "interval must be positive and finite",
            ));
        }
        if Duration::try_from_secs_f64(self.interval).is_err() {
            return Err(SequencerError::InvalidConfig("interval is too long"));
        }
        if !(self.lookahead.is_finite() && self.lookahead > 0.0) {
            return Err(SequencerError::InvalidConfig(
                "lookahead must be positive and finite",
            ));
        }
        Ok(())
    }

    /// The tick interval. Saturates for intervals `validate` rejects.
    pub fn interval_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.interval).unwrap_or(Duration::MAX)
    }

    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: SequencerConfig = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path)?;
        Self::from_ron_str(&source)
    }
}
