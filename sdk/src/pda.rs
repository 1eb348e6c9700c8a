//! PDA derivation utilities for Gavel accounts.
//!
//! Provides functions to derive Program Derived Addresses (PDAs) for all
//! accounts of the daily auction program.

use solana_sdk::pubkey::Pubkey;

/// Seed for the config PDA derivation.
pub const CONFIG_SEED: &[u8] = b"config";

/// Seed for auction day PDA derivation.
pub const AUCTION_DAY_SEED: &[u8] = b"auction_day";

/// Seed for vault PDA derivation.
pub const VAULT_SEED: &[u8] = b"vault";

/// Seed for bid receipt PDA derivation.
pub const BID_RECEIPT_SEED: &[u8] = b"bid_receipt";

/// Derives the config PDA.
///
/// Seeds: `[b"config"]`
#[must_use]
pub fn derive_config_address(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[CONFIG_SEED], program_id)
}

/// Derives the auction day PDA for a day index.
///
/// Seeds: `[b"auction_day", day_index.to_le_bytes()]`
#[must_use]
pub fn derive_auction_day_address(program_id: &Pubkey, day_index: i64) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[AUCTION_DAY_SEED, &day_index.to_le_bytes()],
        program_id,
    )
}

/// Derives the vault PDA for an auction day.
///
/// Seeds: `[b"vault", auction_day]`
#[must_use]
pub fn derive_vault_address(program_id: &Pubkey, auction_day: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[VAULT_SEED, auction_day.as_ref()], program_id)
}

/// Derives the bid receipt PDA for a bidder on an auction day.
///
/// Seeds: `[b"bid_receipt", auction_day, bidder]`
#[must_use]
pub fn derive_bid_receipt_address(
    program_id: &Pubkey,
    auction_day: &Pubkey,
    bidder: &Pubkey,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[BID_RECEIPT_SEED, auction_day.as_ref(), bidder.as_ref()],
        program_id,
    )
}

/// Collection of the PDAs addressed when settling one auction day.
#[derive(Debug, Clone)]
pub struct DayPdas {
    /// Config address.
    pub config: Pubkey,
    /// Config bump.
    pub config_bump: u8,
    /// Auction day address.
    pub auction_day: Pubkey,
    /// Auction day bump.
    pub auction_day_bump: u8,
    /// Vault address.
    pub vault: Pubkey,
    /// Vault bump.
    pub vault_bump: u8,
}

impl DayPdas {
    /// Derives all settlement PDAs for a day index.
    #[must_use]
    pub fn derive(program_id: &Pubkey, day_index: i64) -> Self {
        let (config, config_bump) = derive_config_address(program_id);
        let (auction_day, auction_day_bump) = derive_auction_day_address(program_id, day_index);
        let (vault, vault_bump) = derive_vault_address(program_id, &auction_day);

        Self {
            config,
            config_bump,
            auction_day,
            auction_day_bump,
            vault,
            vault_bump,
        }
    }
}
