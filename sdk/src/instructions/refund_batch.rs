//! RefundBatch instruction builder.
//!
//! Builds the instruction that refunds a batch of losing bidders. The
//! fixed account list is followed by one (bid receipt, bidder) pair per
//! bidder, in the same order as the bidder argument list; the program
//! walks the remaining accounts positionally.

use borsh::BorshSerialize;
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};

use crate::accounts::instruction_discriminator;
use crate::error::CodecError;
use crate::pda::{derive_bid_receipt_address, DayPdas};

/// RefundBatch arguments (on-chain format).
#[derive(Debug, Clone, BorshSerialize)]
struct RefundBatchArgs {
    /// Day index being refunded.
    day_index: i64,
    /// Bidders to refund, in account order.
    bidders: Vec<[u8; 32]>,
}

/// Builder for the RefundBatch instruction.
#[derive(Debug, Clone)]
pub struct RefundBatchBuilder {
    program_id: Pubkey,
    cranker: Option<Pubkey>,
    day_index: Option<i64>,
    bidders: Vec<Pubkey>,
}

impl RefundBatchBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            program_id,
            cranker: None,
            day_index: None,
            bidders: Vec::new(),
        }
    }

    /// Sets the cranker (fee payer and signer).
    #[must_use]
    pub fn cranker(mut self, cranker: Pubkey) -> Self {
        self.cranker = Some(cranker);
        self
    }

    /// Sets the day index.
    #[must_use]
    pub fn day_index(mut self, day_index: i64) -> Self {
        self.day_index = Some(day_index);
        self
    }

    /// Sets the bidders to refund. Order is preserved on the wire.
    #[must_use]
    pub fn bidders(mut self, bidders: Vec<Pubkey>) -> Self {
        self.bidders = bidders;
        self
    }

    /// Adds a single bidder.
    #[must_use]
    pub fn add_bidder(mut self, bidder: Pubkey) -> Self {
        self.bidders.push(bidder);
        self
    }

    /// Builds the instruction.
    ///
    /// # Errors
    ///
    /// Returns an error if any required field is not set or serialization
    /// fails.
    pub fn build(self) -> Result<Instruction, CodecError> {
        let cranker = self
            .cranker
            .ok_or_else(|| CodecError::InvalidAddress("cranker not set".to_string()))?;
        let day_index = self
            .day_index
            .ok_or_else(|| CodecError::Serialization("day_index not set".to_string()))?;

        let pdas = DayPdas::derive(&self.program_id, day_index);

        let mut accounts = vec![
            AccountMeta::new_readonly(pdas.config, false),
            AccountMeta::new(pdas.auction_day, false),
            AccountMeta::new(pdas.vault, false),
            AccountMeta::new(cranker, true),
            AccountMeta::new_readonly(system_program::ID, false),
        ];

        for bidder in &self.bidders {
            let (receipt, _) =
                derive_bid_receipt_address(&self.program_id, &pdas.auction_day, bidder);
            accounts.push(AccountMeta::new(receipt, false));
            accounts.push(AccountMeta::new(*bidder, false));
        }

        let args = RefundBatchArgs {
            day_index,
            bidders: self.bidders.iter().map(|b| b.to_bytes()).collect(),
        };

        let mut data = instruction_discriminator("refund_batch").to_vec();
        data.extend(borsh::to_vec(&args).map_err(|e| CodecError::Serialization(e.to_string()))?);

        Ok(Instruction {
            program_id: self.program_id,
            accounts,
            data,
        })
    }
}
