//! InitDay instruction builder.
//!
//! Builds the instruction that creates the auction day and vault accounts
//! for a day index. The program treats re-initialization of an existing
//! day as a no-op, so this instruction is safe to resubmit.

use borsh::BorshSerialize;
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};

use crate::accounts::instruction_discriminator;
use crate::error::CodecError;
use crate::pda::{derive_auction_day_address, derive_vault_address};

/// InitDay arguments (on-chain format).
#[derive(Debug, Clone, BorshSerialize)]
struct InitDayArgs {
    /// Day index to initialize.
    day_index: i64,
}

/// Builder for the InitDay instruction.
#[derive(Debug, Clone)]
pub struct InitDayBuilder {
    program_id: Pubkey,
    payer: Option<Pubkey>,
    day_index: Option<i64>,
}

impl InitDayBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            program_id,
            payer: None,
            day_index: None,
        }
    }

    /// Sets the fee payer (the cranker).
    #[must_use]
    pub fn payer(mut self, payer: Pubkey) -> Self {
        self.payer = Some(payer);
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
        let payer = self
            .payer
            .ok_or_else(|| CodecError::InvalidAddress("payer not set".to_string()))?;
        let day_index = self
            .day_index
            .ok_or_else(|| CodecError::Serialization("day_index not set".to_string()))?;

        let (auction_day, _) = derive_auction_day_address(&self.program_id, day_index);
        let (vault, _) = derive_vault_address(&self.program_id, &auction_day);

        let accounts = vec![
            AccountMeta::new(payer, true),
            AccountMeta::new(auction_day, false),
            AccountMeta::new(vault, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ];

        let mut data = instruction_discriminator("init_day").to_vec();
        data.extend(
            borsh::to_vec(&InitDayArgs { day_index })
                .map_err(|e| CodecError::Serialization(e.to_string()))?,
        );

        Ok(Instruction {
            program_id: self.program_id,
            accounts,
            data,
        })
    }
}
