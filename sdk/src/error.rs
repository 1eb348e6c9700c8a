//! SDK error types.
//!
//! Provides error types for codec and instruction building operations.

/// Codec and instruction building errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// Account data does not start with the expected discriminator.
    #[error("invalid discriminator for {account}")]
    InvalidDiscriminator {
        /// Name of the expected account type.
        account: &'static str,
    },

    /// Account data is shorter than the fixed layout.
    #[error("truncated account data: expected {expected} bytes, found {found}")]
    TruncatedAccount {
        /// Expected byte length.
        expected: usize,
        /// Actual byte length.
        found: usize,
    },

    /// Instruction argument serialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Invalid address input.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}
