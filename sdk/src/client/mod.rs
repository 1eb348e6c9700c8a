//! Ledger gateway for the Gavel SDK.
//!
//! The crank never talks to the ledger directly; everything goes through
//! the [`LedgerGateway`] trait so the orchestrator can be exercised
//! against a scripted gateway in tests. [`RpcGateway`] is the production
//! implementation over Solana JSON-RPC.
//!
//! Every transport shape is normalized into [`ClientError`] at this
//! boundary; callers never see raw RPC payloads.

pub mod cache;
pub mod config;
pub mod error;
pub mod rpc;

pub use cache::Cached;
pub use config::ClientConfig;
pub use error::ClientError;
pub use rpc::RpcGateway;

use async_trait::async_trait;
use solana_sdk::{hash::Hash, pubkey::Pubkey, transaction::Transaction};

/// Interface to the external ledger.
///
/// Four operations: fetch one account, scan program accounts by size and
/// prefix, submit a signed transaction, and confirm it. Implementations
/// do not retry internally; retry policy belongs to the caller.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Fetches the raw data of a single account, or `None` if it does not
    /// exist.
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, ClientError>;

    /// Fetches all accounts owned by `program_id` whose data is exactly
    /// `data_size` bytes and matches `memcmp_bytes` at `memcmp_offset`.
    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        data_size: u64,
        memcmp_offset: usize,
        memcmp_bytes: &[u8],
    ) -> Result<Vec<(Pubkey, Vec<u8>)>, ClientError>;

    /// Returns a recent blockhash for transaction assembly.
    async fn latest_blockhash(&self) -> Result<Hash, ClientError>;

    /// Submits a signed transaction and returns its signature.
    async fn send_transaction(&self, transaction: &Transaction) -> Result<String, ClientError>;

    /// Waits until the transaction is confirmed or errors out.
    async fn confirm(&self, signature: &str) -> Result<(), ClientError>;
}
