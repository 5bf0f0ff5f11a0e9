use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

const MINUTE_MS: u64 = 60 * 1000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ledger: LedgerConfig,
    pub profile: ProfileConfig,
    pub places: PlacesConfig,
    pub runtime: RuntimeConfig,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }
}

/// Report visibility windows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Reports older than this are hidden from reads.
    pub window_minutes: u64,
    /// Latest report younger than this gets the "Recent" badge.
    pub recent_minutes: u64,
}

impl LedgerConfig {
    pub fn window_ms(&self) -> u64 {
        self.window_minutes.saturating_mul(MINUTE_MS)
    }

    pub fn recent_ms(&self) -> u64 {
        self.recent_minutes.saturating_mul(MINUTE_MS)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            window_minutes: 60,
            recent_minutes: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Points awarded per submitted report.
    pub submission_points: u64,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            submission_points: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacesConfig {
    pub nearby_radius_m: f64,
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            nearby_radius_m: 5000.0,
        }
    }
}

/// Background persistence tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Write the snapshot right after each submission instead of batching.
    pub flush_on_submit: bool,
    /// Upper bound on how long a dirty snapshot waits before being written.
    pub batch_max_latency_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            flush_on_submit: true,
            batch_max_latency_ms: 75,
        }
    }
}
