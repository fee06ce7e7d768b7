//! Monitor configuration. Every field has a default so partial JSON files load.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming the JSON config file used by [`MonitorConfig::from_env`].
pub const CONFIG_PATH_ENV: &str = "TXSENTRY_CONFIG_PATH";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Replay capture store
    pub capture: CaptureConfig,
    /// Traffic anomaly thresholds
    pub detectors: DetectorsConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Trailing window during which a captured message stays replay-eligible
    pub retention_seconds: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorsConfig {
    /// Max requests per second from one source
    pub rate_limit_per_source: u64,
    /// Requests inside `burst_window_seconds` that make a burst
    pub burst_threshold: usize,
    pub burst_window_seconds: f64,
    /// Requests slower than this count as slow
    pub latency_threshold_ms: f64,
    /// Fraction of 5xx responses above which an error spike is raised (0.0–1.0)
    pub error_rate_threshold: f64,
    /// Traffic older than this is dropped by `Monitor::prune_traffic`
    pub analysis_window_seconds: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            retention_seconds: 300.0,
        }
    }
}

impl Default for DetectorsConfig {
    fn default() -> Self {
        Self {
            rate_limit_per_source: 100,
            burst_threshold: 500,
            burst_window_seconds: 5.0,
            latency_threshold_ms: 1000.0,
            error_rate_threshold: 0.3,
            analysis_window_seconds: 300.0,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

impl MonitorConfig {
    /// Load from JSON file if present and valid; otherwise return default
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::try_load(path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(error = %e, "falling back to default config");
                Self::default()
            }
        }
    }

    /// Strict variant of [`MonitorConfig::load`].
    pub fn try_load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from the file named by `TXSENTRY_CONFIG_PATH`, or `txsentry.json`.
    pub fn from_env() -> Self {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("txsentry.json"));
        Self::load(&path)
    }
}
