//! Crank configuration.
//!
//! The crank is configured from the environment: ledger endpoint,
//! auction program id, cranker signing key, and the four timing knobs
//! governing settlement retries and refund batching.

use std::env;

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;

/// Environment variable holding the RPC endpoint.
pub const ENV_RPC_URL: &str = "RPC_URL";
/// Environment variable holding the auction program id.
pub const ENV_PROGRAM_ID: &str = "AUCTION_PROGRAM_ID";
/// Environment variable holding the cranker secret key.
pub const ENV_CRANKER_KEY: &str = "CRANKER_PRIVATE_KEY";

/// Configuration for the settlement crank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrankConfig {
    /// Ledger JSON-RPC endpoint.
    pub rpc_url: String,

    /// Auction program id (base58).
    pub program_id: String,

    /// Cranker secret key: a JSON byte array or a base58 string.
    pub cranker_key: String,

    /// Wall-clock budget for the settlement retry loop, in seconds.
    pub retry_window_seconds: u64,

    /// Base delay between settlement retries, in seconds.
    pub retry_interval_seconds: u64,

    /// Maximum bidders per refund batch.
    pub max_batch_size: usize,

    /// Soft deadline for the refund loop, in seconds.
    pub max_runtime_seconds: u64,
}

impl Default for CrankConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://api.devnet.solana.com".to_string(),
            program_id: String::new(),
            cranker_key: String::new(),
            retry_window_seconds: 1800,
            retry_interval_seconds: 45,
            max_batch_size: 20,
            max_runtime_seconds: 780,
        }
    }
}

impl CrankConfig {
    /// Loads the configuration from the environment.
    ///
    /// `RPC_URL` and the timing knobs fall back to defaults;
    /// `AUCTION_PROGRAM_ID` and `CRANKER_PRIVATE_KEY` are required.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a numeric
    /// variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            rpc_url: env::var(ENV_RPC_URL).unwrap_or(defaults.rpc_url),
            program_id: env::var(ENV_PROGRAM_ID)
                .map_err(|_| ConfigError::MissingEnv(ENV_PROGRAM_ID))?,
            cranker_key: env::var(ENV_CRANKER_KEY)
                .map_err(|_| ConfigError::MissingEnv(ENV_CRANKER_KEY))?,
            retry_window_seconds: env_u64("RETRY_WINDOW_SECONDS", defaults.retry_window_seconds)?,
            retry_interval_seconds: env_u64(
                "RETRY_INTERVAL_SECONDS",
                defaults.retry_interval_seconds,
            )?,
            max_batch_size: env_u64("MAX_BATCH_SIZE", defaults.max_batch_size as u64)? as usize,
            max_runtime_seconds: env_u64("MAX_RUNTIME_SECONDS", defaults.max_runtime_seconds)?,
        })
    }

    /// Sets the program id.
    #[must_use]
    pub fn with_program_id(mut self, program_id: impl Into<String>) -> Self {
        self.program_id = program_id.into();
        self
    }

    /// Sets the refund batch size.
    #[must_use]
    pub fn with_max_batch_size(mut self, size: usize) -> Self {
        self.max_batch_size = size;
        self
    }

    /// Sets the settlement retry window and interval.
    #[must_use]
    pub fn with_retry(mut self, window_seconds: u64, interval_seconds: u64) -> Self {
        self.retry_window_seconds = window_seconds;
        self.retry_interval_seconds = interval_seconds;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.program_id.is_empty() {
            return Err(ConfigError::MissingEnv(ENV_PROGRAM_ID));
        }

        if self.max_batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize);
        }

        if self.retry_interval_seconds == 0 {
            return Err(ConfigError::InvalidRetryInterval);
        }

        Ok(())
    }

    /// Parses the program id.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is not a valid base58 address.
    pub fn parse_program_id(&self) -> Result<Pubkey, ConfigError> {
        self.program_id
            .parse()
            .map_err(|_| ConfigError::InvalidProgramId(self.program_id.clone()))
    }

    /// Parses the cranker keypair from either a JSON byte array
    /// (`[12,34,...]`) or a base58-encoded secret key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key does not parse in either format.
    pub fn parse_keypair(&self) -> Result<Keypair, ConfigError> {
        let raw = self.cranker_key.trim();

        let bytes: Vec<u8> = if raw.starts_with('[') {
            serde_json::from_str(raw).map_err(|e| ConfigError::InvalidKeypair(e.to_string()))?
        } else {
            bs58::decode(raw)
                .into_vec()
                .map_err(|e| ConfigError::InvalidKeypair(e.to_string()))?
        };

        Keypair::try_from(bytes.as_slice())
            .map_err(|e| ConfigError::InvalidKeypair(e.to_string()))
    }
}

/// Reads an optional numeric environment variable.
fn env_u64(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable {0}")]
    MissingEnv(&'static str),

    /// A numeric environment variable did not parse.
    #[error("invalid value for {name}: {value}")]
    InvalidNumber {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
    },

    /// The program id is not a valid address.
    #[error("invalid program id: {0}")]
    InvalidProgramId(String),

    /// The cranker key did not parse in either accepted format.
    #[error("invalid cranker keypair: {0}")]
    InvalidKeypair(String),

    /// Batch size must be positive.
    #[error("max_batch_size must be > 0")]
    InvalidBatchSize,

    /// Retry interval must be positive.
    #[error("retry_interval_seconds must be > 0")]
    InvalidRetryInterval,
}
