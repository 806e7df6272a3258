//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings for remote endpoints and animation timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Backend API base URL (no trailing slash)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Live BTC price feed URL
    #[serde(default = "default_price_url")]
    pub price_url: String,

    /// User the budget status is requested for
    #[serde(default = "default_user_id")]
    pub user_id: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Bar fill duration in milliseconds
    #[serde(default = "default_bar_fill_ms")]
    pub bar_fill_ms: u64,

    /// Ring fill duration in milliseconds
    #[serde(default = "default_ring_fill_ms")]
    pub ring_fill_ms: u64,

    /// Full pulse cycle (up and back down) in milliseconds
    #[serde(default = "default_pulse_period_ms")]
    pub pulse_period_ms: u64,

    /// Scale multiplier at the top of a pulse
    #[serde(default = "default_pulse_peak_scale")]
    pub pulse_peak_scale: f64,

    /// How often a running pulse publishes a new scale
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
}

fn default_api_base() -> String {
    "https://money-mastery-backend.onrender.com/api".to_string()
}

fn default_price_url() -> String {
    "https://api.coingecko.com/api/v3/simple/price?ids=bitcoin&vs_currencies=usd".to_string()
}

fn default_user_id() -> String {
    "u123".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_bar_fill_ms() -> u64 {
    800
}

fn default_ring_fill_ms() -> u64 {
    1000
}

fn default_pulse_period_ms() -> u64 {
    1000
}

fn default_pulse_peak_scale() -> f64 {
    1.05
}

fn default_frame_interval_ms() -> u64 {
    16 // ~60 fps
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            price_url: default_price_url(),
            user_id: default_user_id(),
            timeout_ms: default_timeout_ms(),
            bar_fill_ms: default_bar_fill_ms(),
            ring_fill_ms: default_ring_fill_ms(),
            pulse_period_ms: default_pulse_period_ms(),
            pulse_peak_scale: default_pulse_peak_scale(),
            frame_interval_ms: default_frame_interval_ms(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file. Missing fields take defaults.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = tokio::fs::read_to_string(path.as_ref()).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Join a path onto the API base.
    pub fn endpoint_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Bar fill duration.
    pub fn bar_fill(&self) -> Duration {
        Duration::from_millis(self.bar_fill_ms)
    }

    /// Ring fill duration.
    pub fn ring_fill(&self) -> Duration {
        Duration::from_millis(self.ring_fill_ms)
    }

    /// Pulse period.
    pub fn pulse_period(&self) -> Duration {
        Duration::from_millis(self.pulse_period_ms)
    }

    /// Pulse frame interval. Never zero.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.bar_fill(), Duration::from_millis(800));
        assert_eq!(config.ring_fill(), Duration::from_millis(1000));
        assert_eq!(config.pulse_period(), Duration::from_millis(1000));
        assert_eq!(config.pulse_peak_scale, 1.05);
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_endpoint_url_joins_slashes() {
        let config = EngineConfig {
            api_base: "http://localhost:3000/api/".to_string(),
            ..Default::default()
        };
        assert_eq!(config.endpoint_url("/budget/status"), "http://localhost:3000/api/budget/status");
        assert_eq!(config.endpoint_url("news"), "http://localhost:3000/api/news");
    }

    #[tokio::test]
    async fn test_load_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mastery.json");
        tokio::fs::write(&path, r#"{"api_base": "http://localhost:3000/api", "timeout_ms": 2500}"#)
            .await
            .unwrap();

        let config = EngineConfig::load(&path).await.unwrap();
        assert_eq!(config.api_base, "http://localhost:3000/api");
        assert_eq!(config.timeout(), Duration::from_millis(2500));
        assert_eq!(config.bar_fill_ms, 800);
        assert_eq!(config.user_id, "u123");
    }

    #[tokio::test]
    async fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = EngineConfig::load(dir.path().join("nope.json")).await;
        assert!(matches!(missing, Err(ConfigError::Io(_))));

        let path = dir.path().join("bad.json");
        tokio::fs::write(&path, "not json").await.unwrap();
        assert!(matches!(EngineConfig::load(&path).await, Err(ConfigError::Json(_))));
    }
}
