//! SettleDay instruction builder.
//!
//! Builds the instruction that finalizes an auction day: declares the
//! winner and moves the winning bid out of the vault. The program rejects
//! resubmission with `AlreadyFinalized`, which callers treat as success.

use borsh::BorshSerialize;
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};

use crate::accounts::instruction_discriminator;
use crate::error::CodecError;
use crate::pda::DayPdas;

/// SettleDay arguments (on-chain format).
#[derive(Debug, Clone, BorshSerialize)]
struct SettleDayArgs {
    /// Day index to settle.
    day_index: i64,
}

/// Builder for the SettleDay instruction.
#[derive(Debug, Clone)]
pub struct SettleDayBuilder {
    program_id: Pubkey,
    recipient: Option<Pubkey>,
    day_index: Option<i64>,
}

impl SettleDayBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            program_id,
            recipient: None,
            day_index: None,
        }
    }

    /// Sets the proceeds recipient from the config account.
    #[must_use]
    pub fn recipient(mut self, recipient: Pubkey) -> Self {
        self.recipient = Some(recipient);
        self
    }

    /// Sets the day index.
    #[must_use]
    pub fn day_index(mut self, day_index: i64) -> Self {
        self.day_index = Some(day_index);
        self
    }

    /// Builds the instruction.
    ///
    /// # Errors
    ///
    /// Returns an error if any required field is not set or serialization
    /// fails.
    pub fn build(self) -> Result<Instruction, CodecError> {
        let recipient = self
            .recipient
            .ok_or_else(|| CodecError::InvalidAddress("recipient not set".to_string()))?;
        let day_index = self
            .day_index
            .ok_or_else(|| CodecError::Serialization("day_index not set".to_string()))?;

        let pdas = DayPdas::derive(&self.program_id, day_index);

        let accounts = vec![
            AccountMeta::new_readonly(pdas.config, false),
            AccountMeta::new(pdas.auction_day, false),
            AccountMeta::new(pdas.vault, false),
            AccountMeta::new(recipient, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ];

        let mut data = instruction_discriminator("settle_day").to_vec();
        data.extend(
            borsh::to_vec(&SettleDayArgs { day_index })
                .map_err(|e| CodecError::Serialization(e.to_string()))?,
        );

        Ok(Instruction {
            program_id: self.program_id,
            accounts,
            data,
        })
    }
}
