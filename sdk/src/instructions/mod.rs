//! Instruction builders for the Gavel auction program.
//!
//! Each builder assembles one outbound operation as a
//! [`solana_sdk::instruction::Instruction`]: the program id, the encoded
//! payload (8-byte discriminator plus borsh-serialized arguments), and the
//! ordered account list. Account order is part of the wire contract; the
//! program consumes accounts positionally.

pub mod init_config;
pub mod init_day;
pub mod refund_batch;
pub mod settle_day;

pub use init_config::InitConfigBuilder;
pub use init_day::InitDayBuilder;
pub use refund_batch::RefundBatchBuilder;
pub use settle_day::SettleDayBuilder;
