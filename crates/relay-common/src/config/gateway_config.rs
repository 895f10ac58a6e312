//! Gateway connection configuration
//!
//! Built programmatically with named options; `from_env` covers the
//! environment-variable path for deployments that prefer it. All settings
//! are immutable once the session starts.

use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Configuration for the gateway connection
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Gateway WebSocket URL
    #[serde(default = "default_gateway_url")]
    pub url: String,

    /// Timeout for a single connect + handshake attempt
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Reconnect backoff tuning
    #[serde(default)]
    pub backoff: BackoffConfig,

    /// Consecutive authentication failures tolerated before aborting
    #[serde(default = "default_max_auth_failures")]
    pub max_auth_failures: u32,

    /// Capacity of the decoded-payload channel between session and pipeline
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

/// Exponential backoff tuning for reconnect attempts
#[derive(Debug, Clone, Deserialize)]
pub struct BackoffConfig {
    /// First retry delay in milliseconds
    #[serde(default = "default_backoff_base_ms")]
    pub base_ms: u64,

    /// Upper bound on any retry delay in milliseconds
    #[serde(default = "default_backoff_max_ms")]
    pub max_ms: u64,
}

// Default value functions
fn default_gateway_url() -> String {
    "wss://gateway.example.chat/v1".to_string()
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_max_auth_failures() -> u32 {
    3
}

fn default_event_buffer() -> usize {
    256
}

fn default_backoff_base_ms() -> u64 {
    1_000
}

fn default_backoff_max_ms() -> u64 {
    60_000
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: default_gateway_url(),
            connect_timeout_ms: default_connect_timeout_ms(),
            backoff: BackoffConfig::default(),
            max_auth_failures: default_max_auth_failures(),
            event_buffer: default_event_buffer(),
        }
    }
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_ms: default_backoff_base_ms(),
            max_ms: default_backoff_max_ms(),
        }
    }
}

impl GatewayConfig {
    /// Set the gateway URL
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the connect + handshake timeout
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the reconnect backoff tuning
    #[must_use]
    pub fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }

    /// Set the event channel capacity
    #[must_use]
    pub fn with_event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = capacity;
        self
    }

    /// Get the connect timeout as a `Duration`
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a variable is present but unparsable
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let mut config = Self::default();

        if let Ok(url) = env::var("RELAY_GATEWAY_URL") {
            config.url = url;
        }
        if let Ok(raw) = env::var("RELAY_CONNECT_TIMEOUT_MS") {
            config.connect_timeout_ms = raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue("RELAY_CONNECT_TIMEOUT_MS", raw))?;
        }
        if let Ok(raw) = env::var("RELAY_BACKOFF_BASE_MS") {
            config.backoff.base_ms = raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue("RELAY_BACKOFF_BASE_MS", raw))?;
        }
        if let Ok(raw) = env::var("RELAY_BACKOFF_MAX_MS") {
            config.backoff.max_ms = raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue("RELAY_BACKOFF_MAX_MS", raw))?;
        }

        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
