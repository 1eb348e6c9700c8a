//! Gateway error types.
//!
//! Every failure shape the transport can produce is converted into
//! [`ClientError`] before it leaves the gateway, so callers classify one
//! canonical type instead of branching on transport details.

use std::fmt;

/// Gateway errors.
#[derive(Debug)]
pub enum ClientError {
    /// HTTP request failed.
    Request(reqwest::Error),

    /// Request timed out.
    Timeout,

    /// JSON-RPC level error with no program error attached.
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// Error message.
        message: String,
    },

    /// A submitted transaction was rejected or failed on chain.
    Transaction {
        /// Custom program error code, when the ledger reported one in a
        /// structured form.
        custom_code: Option<u32>,
        /// Original error message, preserved verbatim for logs.
        message: String,
    },

    /// Transaction was submitted but never confirmed in time.
    Dropped {
        /// Transaction signature.
        signature: String,
    },

    /// Failed to decode a response payload.
    Deserialization(String),

    /// Invalid configuration.
    InvalidConfig(String),
}

impl ClientError {
    /// Returns the structured custom program error code, if any.
    #[must_use]
    pub fn custom_code(&self) -> Option<u32> {
        match self {
            Self::Transaction { custom_code, .. } => *custom_code,
            _ => None,
        }
    }

    /// Returns true for network-level failures worth a blind retry.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Timeout)
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request(e) => write!(f, "HTTP request failed: {}", e),
            Self::Timeout => write!(f, "request timeout"),
            Self::Rpc { code, message } => write!(f, "RPC error [{}]: {}", code, message),
            Self::Transaction {
                custom_code: Some(code),
                message,
            } => write!(f, "transaction failed (custom {}): {}", code, message),
            Self::Transaction {
                custom_code: None,
                message,
            } => write!(f, "transaction failed: {}", message),
            Self::Dropped { signature } => write!(f, "transaction not confirmed: {}", signature),
            Self::Deserialization(msg) => write!(f, "deserialization failed: {}", msg),
            Self::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Request(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Request(err)
        }
    }
}
