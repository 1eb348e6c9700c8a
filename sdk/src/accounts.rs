//! Account codec for the Gavel auction program.
//!
//! Decodes raw account byte buffers fetched from the ledger into typed
//! records, and encodes them back for tests and fixtures. Every account
//! starts with an 8-byte Anchor discriminator followed by fixed-width
//! little-endian fields in declared order. A tag or length mismatch is
//! always an error; there is no versioning or padding.

use sha2::{Digest, Sha256};
use solana_sdk::pubkey::Pubkey;

use crate::error::CodecError;

/// Length of the Anchor discriminator prefix.
pub const DISCRIMINATOR_LEN: usize = 8;

/// Computes the 8-byte account discriminator for `account:<name>`.
#[must_use]
pub fn account_discriminator(name: &str) -> [u8; 8] {
    discriminator("account", name)
}

/// Computes the 8-byte instruction discriminator for `global:<name>`.
#[must_use]
pub fn instruction_discriminator(name: &str) -> [u8; 8] {
    discriminator("global", name)
}

fn discriminator(namespace: &str, name: &str) -> [u8; 8] {
    let digest = Sha256::digest(format!("{namespace}:{name}").as_bytes());
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest.as_slice()[..8]);
    out
}

/// Cursor over raw account bytes with fixed-width little-endian reads.
struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        let end = self.offset.saturating_add(len);
        let slice = self
            .data
            .get(self.offset..end)
            .ok_or(CodecError::TruncatedAccount {
                expected: end,
                found: self.data.len(),
            })?;
        self.offset = end;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.read_bytes(1)?.first().copied().unwrap_or_default())
    }

    fn read_bool(&mut self) -> Result<bool, CodecError> {
        Ok(self.read_u8()? != 0)
    }

    fn read_u32(&mut self) -> Result<u32, CodecError> {
        let bytes = self.read_bytes(4)?;
        let mut arr = [0u8; 4];
        arr.copy_from_slice(bytes);
        Ok(u32::from_le_bytes(arr))
    }

    fn read_u64(&mut self) -> Result<u64, CodecError> {
        let bytes = self.read_bytes(8)?;
        let mut arr = [0u8; 8];
        arr.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(arr))
    }

    fn read_i64(&mut self) -> Result<i64, CodecError> {
        let bytes = self.read_bytes(8)?;
        let mut arr = [0u8; 8];
        arr.copy_from_slice(bytes);
        Ok(i64::from_le_bytes(arr))
    }

    fn read_pubkey(&mut self) -> Result<Pubkey, CodecError> {
        let bytes = self.read_bytes(32)?;
        let mut arr = [0u8; 32];
        arr.copy_from_slice(bytes);
        Ok(Pubkey::new_from_array(arr))
    }
}

/// Checks the discriminator prefix and the fixed total length.
fn check_header(
    data: &[u8],
    expected: &[u8; 8],
    len: usize,
    account: &'static str,
) -> Result<(), CodecError> {
    if data.len() < len {
        return Err(CodecError::TruncatedAccount {
            expected: len,
            found: data.len(),
        });
    }
    if data.get(..DISCRIMINATOR_LEN) != Some(expected.as_slice()) {
        return Err(CodecError::InvalidDiscriminator { account });
    }
    Ok(())
}

/// Singleton auction configuration account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Address receiving settlement proceeds.
    pub recipient_pubkey: Pubkey,
    /// Fee charged to losing bidders, in lamports.
    pub loser_fee_lamports: u64,
    /// Minimum bid increment, in lamports.
    pub min_increment_lamports: u64,
    /// PDA bump.
    pub bump: u8,
}

impl Config {
    /// Total account length including the discriminator.
    pub const LEN: usize = DISCRIMINATOR_LEN + 32 + 8 + 8 + 1;

    /// Decodes a config account from raw ledger bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the discriminator or length does not match.
    pub fn decode(data: &[u8]) -> Result<Self, CodecError> {
        check_header(data, &account_discriminator("Config"), Self::LEN, "Config")?;
        let mut reader = ByteReader::new(data);
        reader.read_bytes(DISCRIMINATOR_LEN)?;

        Ok(Self {
            recipient_pubkey: reader.read_pubkey()?,
            loser_fee_lamports: reader.read_u64()?,
            min_increment_lamports: reader.read_u64()?,
            bump: reader.read_u8()?,
        })
    }

    /// Encodes the account into its raw ledger representation.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(Self::LEN);
        data.extend_from_slice(&account_discriminator("Config"));
        data.extend_from_slice(self.recipient_pubkey.as_ref());
        data.extend_from_slice(&self.loser_fee_lamports.to_le_bytes());
        data.extend_from_slice(&self.min_increment_lamports.to_le_bytes());
        data.push(self.bump);
        data
    }
}

/// Per-day auction state account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuctionDay {
    /// Day index (seconds since epoch divided by 86 400).
    pub day_index: i64,
    /// Whether the day has been settled. Monotonic false to true.
    pub finalized: bool,
    /// Winning bidder, or the zero address before finalization.
    pub winner: Pubkey,
    /// Highest bid, in lamports.
    pub highest_bid: u64,
    /// Number of distinct bidders.
    pub bidder_count: u32,
    /// Total receipts eligible for a refund.
    pub refund_count_total: u32,
    /// Receipts refunded so far.
    pub refund_count_completed: u32,
    /// Total lamports bid across all receipts.
    pub total_bid_lamports: u64,
    /// Lamports still owed to losing bidders.
    pub refund_pool_remaining: u64,
    /// Lamports still owed to the fee recipient.
    pub fee_pool_remaining: u64,
    /// Vault PDA bump.
    pub vault_bump: u8,
}

impl AuctionDay {
    /// Total account length including the discriminator.
    pub const LEN: usize = DISCRIMINATOR_LEN + 8 + 1 + 32 + 8 + 4 + 4 + 4 + 8 + 8 + 8 + 1;

    /// Decodes an auction day account from raw ledger bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the discriminator or length does not match.
    pub fn decode(data: &[u8]) -> Result<Self, CodecError> {
        check_header(
            data,
            &account_discriminator("AuctionDay"),
            Self::LEN,
            "AuctionDay",
        )?;
        let mut reader = ByteReader::new(data);
        reader.read_bytes(DISCRIMINATOR_LEN)?;

        Ok(Self {
            day_index: reader.read_i64()?,
            finalized: reader.read_bool()?,
            winner: reader.read_pubkey()?,
            highest_bid: reader.read_u64()?,
            bidder_count: reader.read_u32()?,
            refund_count_total: reader.read_u32()?,
            refund_count_completed: reader.read_u32()?,
            total_bid_lamports: reader.read_u64()?,
            refund_pool_remaining: reader.read_u64()?,
            fee_pool_remaining: reader.read_u64()?,
            vault_bump: reader.read_u8()?,
        })
    }

    /// Encodes the account into its raw ledger representation.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(Self::LEN);
        data.extend_from_slice(&account_discriminator("AuctionDay"));
        data.extend_from_slice(&self.day_index.to_le_bytes());
        data.push(u8::from(self.finalized));
        data.extend_from_slice(self.winner.as_ref());
        data.extend_from_slice(&self.highest_bid.to_le_bytes());
        data.extend_from_slice(&self.bidder_count.to_le_bytes());
        data.extend_from_slice(&self.refund_count_total.to_le_bytes());
        data.extend_from_slice(&self.refund_count_completed.to_le_bytes());
        data.extend_from_slice(&self.total_bid_lamports.to_le_bytes());
        data.extend_from_slice(&self.refund_pool_remaining.to_le_bytes());
        data.extend_from_slice(&self.fee_pool_remaining.to_le_bytes());
        data.push(self.vault_bump);
        data
    }

    /// Returns true if every eligible receipt has been refunded.
    #[must_use]
    pub fn refunds_complete(&self) -> bool {
        self.refund_count_total > 0 && self.refund_count_completed >= self.refund_count_total
    }
}

/// One bidder's receipt for one auction day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidReceipt {
    /// Owning auction day address.
    pub auction_day: Pubkey,
    /// Bidder address.
    pub bidder: Pubkey,
    /// Bid amount, in lamports.
    pub amount: u64,
    /// Whether the bid has been refunded. Flips false to true exactly once.
    pub refunded: bool,
}

impl BidReceipt {
    /// Total account length including the discriminator.
    pub const LEN: usize = DISCRIMINATOR_LEN + 32 + 32 + 8 + 1;

    /// Byte offset of the `auction_day` field, used for memcmp filters.
    pub const AUCTION_DAY_OFFSET: usize = DISCRIMINATOR_LEN;

    /// Decodes a bid receipt account from raw ledger bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the discriminator or length does not match.
    pub fn decode(data: &[u8]) -> Result<Self, CodecError> {
        check_header(
            data,
            &account_discriminator("BidReceipt"),
            Self::LEN,
            "BidReceipt",
        )?;
        let mut reader = ByteReader::new(data);
        reader.read_bytes(DISCRIMINATOR_LEN)?;

        Ok(Self {
            auction_day: reader.read_pubkey()?,
            bidder: reader.read_pubkey()?,
            amount: reader.read_u64()?,
            refunded: reader.read_bool()?,
        })
    }

    /// Encodes the account into its raw ledger representation.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(Self::LEN);
        data.extend_from_slice(&account_discriminator("BidReceipt"));
        data.extend_from_slice(self.auction_day.as_ref());
        data.extend_from_slice(self.bidder.as_ref());
        data.extend_from_slice(&self.amount.to_le_bytes());
        data.push(u8::from(self.refunded));
        data
    }
}
