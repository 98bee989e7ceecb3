//! Gateway connection settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default versioned path prefix.
pub const DEFAULT_API_PREFIX: &str = "/api/v1";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where and how to reach the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Scheme and host, e.g. `https://bank.example`
    pub base_url: String,

    /// Versioned path prefix placed before every endpoint path
    pub api_prefix: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Extra attempts for retryable GET failures; `0` disables retry
    pub retry_attempts: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry_attempts: 0,
        }
    }
}

impl GatewayConfig {
    /// Creates a config for `base_url` with default prefix and timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Builds the absolute URL of an endpoint path such as `/requests/init`.
    pub fn url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let prefix = self.api_prefix.trim_matches('/');
        let path = path.trim_start_matches('/');
        if prefix.is_empty() {
            format!("{base}/{path}")
        } else {
            format!("{base}/{prefix}/{path}")
        }
    }
}
