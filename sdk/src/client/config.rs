//! Gateway configuration.
//!
//! Provides configuration options for the JSON-RPC gateway.

use std::time::Duration;

/// Default RPC endpoint.
pub const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default confirmation timeout in seconds.
pub const DEFAULT_CONFIRM_TIMEOUT_SECS: u64 = 30;

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Per-request timeout.
    pub timeout: Duration,

    /// How long to wait for a submitted transaction to confirm.
    pub confirm_timeout: Duration,

    /// User agent string.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            confirm_timeout: Duration::from_secs(DEFAULT_CONFIRM_TIMEOUT_SECS),
            user_agent: format!("gavel-sdk/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Creates a new configuration with the given endpoint URL.
    #[must_use]
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            ..Default::default()
        }
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the confirmation timeout.
    #[must_use]
    pub fn with_confirm_timeout(mut self, timeout: Duration) -> Self {
        self.confirm_timeout = timeout;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), super::error::ClientError> {
        if self.rpc_url.is_empty() {
            return Err(super::error::ClientError::InvalidConfig(
                "rpc_url cannot be empty".to_string(),
            ));
        }

        if !self.rpc_url.starts_with("http://") && !self.rpc_url.starts_with("https://") {
            return Err(super::error::ClientError::InvalidConfig(
                "rpc_url must start with http:// or https://".to_string(),
            ));
        }

        Ok(())
    }
}
