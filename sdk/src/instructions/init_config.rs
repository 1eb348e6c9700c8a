//! InitConfig instruction builder.
//!
//! Builds the one-time instruction that creates the singleton config
//! account. The config is immutable afterwards.

use borsh::BorshSerialize;
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};

use crate::accounts::instruction_discriminator;
use crate::error::CodecError;
use crate::pda::derive_config_address;

/// InitConfig arguments (on-chain format).
#[derive(Debug, Clone, BorshSerialize)]
struct InitConfigArgs {
    /// Settlement proceeds recipient.
    recipient_pubkey: [u8; 32],
    /// Fee charged to losing bidders, in lamports.
    loser_fee_lamports: u64,
    /// Minimum bid increment, in lamports.
    min_increment_lamports: u64,
}

/// Builder for the InitConfig instruction.
#[derive(Debug, Clone)]
pub struct InitConfigBuilder {
    program_id: Pubkey,
    payer: Option<Pubkey>,
    recipient: Option<Pubkey>,
    loser_fee_lamports: u64,
    min_increment_lamports: u64,
}

impl InitConfigBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            program_id,
            payer: None,
            recipient: None,
            loser_fee_lamports: 0,
            min_increment_lamports: 0,
        }
    }

    /// Sets the fee payer.
    #[must_use]
    pub fn payer(mut self, payer: Pubkey) -> Self {
        self.payer = Some(payer);
        self
    }

    /// Sets the settlement proceeds recipient.
    #[must_use]
    pub fn recipient(mut self, recipient: Pubkey) -> Self {
        self.recipient = Some(recipient);
        self
    }

    /// Sets the loser fee in lamports.
    #[must_use]
    pub fn loser_fee_lamports(mut self, lamports: u64) -> Self {
        self.loser_fee_lamports = lamports;
        self
    }

    /// Sets the minimum bid increment in lamports.
    #[must_use]
    pub fn min_increment_lamports(mut self, lamports: u64) -> Self {
        self.min_increment_lamports = lamports;
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
        let recipient = self
            .recipient
            .ok_or_else(|| CodecError::InvalidAddress("recipient not set".to_string()))?;

        let (config, _) = derive_config_address(&self.program_id);

        let accounts = vec![
            AccountMeta::new(payer, true),
            AccountMeta::new(config, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ];

        let args = InitConfigArgs {
            recipient_pubkey: recipient.to_bytes(),
            loser_fee_lamports: self.loser_fee_lamports,
            min_increment_lamports: self.min_increment_lamports,
        };

        let mut data = instruction_discriminator("init_config").to_vec();
        data.extend(borsh::to_vec(&args).map_err(|e| CodecError::Serialization(e.to_string()))?);

        Ok(Instruction {
            program_id: self.program_id,
            accounts,
            data,
        })
    }
}
