//! Gavel SDK - protocol layer for the Gavel daily auction program.
//!
//! This crate provides everything needed to talk to the on-chain auction
//! program from off-chain jobs:
//!
//! - [`pda`] — deterministic program-derived addresses for the config,
//!   auction day, vault, and bid receipt accounts
//! - [`accounts`] — typed decoding and encoding of raw account bytes
//! - [`instructions`] — builders for the four outbound operations
//! - [`client`] — the [`client::LedgerGateway`] trait and its JSON-RPC
//!   implementation
//!
//! # Example
//!
//! ```rust
//! use gavel_sdk::pda::DayPdas;
//! use solana_sdk::pubkey::Pubkey;
//!
//! let program_id = Pubkey::new_unique();
//! let pdas = DayPdas::derive(&program_id, 19800);
//! assert_ne!(pdas.auction_day, pdas.vault);
//! ```

pub mod accounts;
pub mod client;
pub mod error;
pub mod instructions;
pub mod pda;

pub use accounts::{AuctionDay, BidReceipt, Config};
pub use client::{Cached, ClientConfig, ClientError, LedgerGateway, RpcGateway};
pub use error::CodecError;
pub use instructions::{
    InitConfigBuilder, InitDayBuilder, RefundBatchBuilder, SettleDayBuilder,
};
