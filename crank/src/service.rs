//! The settlement service.
//!
//! Runs one crank invocation through its states in order: ensure the
//! target day exists, finalize it under a bounded retry loop, then pay
//! refunds in time-boxed batches. Every mutating step is safe to
//! repeat; all resumable progress lives in ledger state, never in
//! process memory.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use gavel_sdk::accounts::{AuctionDay, BidReceipt, Config};
use gavel_sdk::instructions::{InitDayBuilder, RefundBatchBuilder, SettleDayBuilder};
use gavel_sdk::pda::{derive_auction_day_address, derive_config_address};
use gavel_sdk::{ClientError, CodecError, LedgerGateway};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use tracing::{debug, info, warn};

use super::backoff::{BackoffPolicy, RetryWindow};
use super::classifier::{classify, ErrorOutcome, ALREADY_FINALIZED, TOO_EARLY};
use super::config::{ConfigError, CrankConfig};
use super::metrics::CrankMetrics;
use super::submitter::TransactionSubmitter;

/// Seconds in one auction day.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Cap on the linear error backoff during settlement.
const SETTLE_BACKOFF_CAP: Duration = Duration::from_secs(60);

/// Returns the day index containing the given unix timestamp.
#[must_use]
pub fn day_index_at(timestamp: i64) -> i64 {
    timestamp.div_euclid(SECONDS_PER_DAY)
}

/// Returns yesterday's day index, the crank's settlement target.
#[must_use]
pub fn previous_day_index() -> i64 {
    day_index_at(Utc::now().timestamp()) - 1
}

/// Splits `items` into consecutive batches of at most `size`, preserving
/// order.
#[must_use]
pub fn chunked(items: &[Pubkey], size: usize) -> Vec<Vec<Pubkey>> {
    if size == 0 {
        return Vec::new();
    }
    items.chunks(size).map(<[Pubkey]>::to_vec).collect()
}

/// Fatal crank errors.
#[derive(Debug, thiserror::Error)]
pub enum CrankError {
    /// The config account does not exist; nothing can be settled.
    #[error("config account not found")]
    ConfigMissing,

    /// The day stayed too early for the whole retry window.
    #[error("settle_day: too early beyond {window_seconds}s retry window for day {day_index}")]
    SettlementTimedOut {
        /// Day index being settled.
        day_index: i64,
        /// Length of the exhausted retry window.
        window_seconds: u64,
    },

    /// A gateway error survived the retry window. The original error is
    /// preserved so logs keep its message format.
    #[error(transparent)]
    Gateway(#[from] ClientError),

    /// Account or instruction encoding failed.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Outcome of one crank invocation.
#[derive(Debug, Clone, Copy)]
pub struct RunReport {
    /// Day index that was settled.
    pub day_index: i64,
    /// Bidders refunded during this run.
    pub refunded: u32,
}

/// The settlement service.
pub struct SettlementService<G> {
    /// Configuration.
    config: CrankConfig,

    /// Auction program id.
    program_id: Pubkey,

    /// Cranker keypair.
    signer: Keypair,

    /// Ledger gateway.
    gateway: G,

    /// Transaction submitter.
    submitter: TransactionSubmitter,

    /// Metrics.
    metrics: Arc<CrankMetrics>,
}

impl<G: LedgerGateway> SettlementService<G> {
    /// Creates a new settlement service.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: CrankConfig, gateway: G) -> Result<Self, CrankError> {
        config.validate()?;
        let program_id = config.parse_program_id()?;
        let signer = config.parse_keypair()?;

        Ok(Self {
            config,
            program_id,
            signer,
            gateway,
            submitter: TransactionSubmitter::new(),
            metrics: Arc::new(CrankMetrics::new()),
        })
    }

    /// Returns the metrics.
    #[must_use]
    pub fn metrics(&self) -> Arc<CrankMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Runs one invocation against yesterday's auction day.
    ///
    /// # Errors
    ///
    /// Returns an error if settlement fails fatally; refund batch
    /// failures are logged and left for the next invocation.
    pub async fn run(&self) -> Result<RunReport, CrankError> {
        self.run_for_day(previous_day_index()).await
    }

    /// Runs one invocation against a specific day index.
    ///
    /// # Errors
    ///
    /// See [`SettlementService::run`].
    pub async fn run_for_day(&self, day_index: i64) -> Result<RunReport, CrankError> {
        info!(day_index, "starting settlement");

        self.ensure_day(day_index).await?;
        self.settle_with_retry(day_index).await?;
        let refunded = self.refund_losers(day_index).await?;

        info!(day_index, refunded, "settlement run complete");
        Ok(RunReport {
            day_index,
            refunded,
        })
    }

    /// EnsureDay: creates the auction day account if it does not exist.
    ///
    /// Submission failures are never fatal here; if the day truly could
    /// not be created, settlement will fail loudly instead.
    async fn ensure_day(&self, day_index: i64) -> Result<(), CrankError> {
        match self.fetch_auction_day(day_index).await {
            Ok(Some(_)) => {
                debug!(day_index, "init_day: day already exists");
                return Ok(());
            }
            Ok(None) => {}
            Err(err) => {
                // Fall through and try the init anyway; it is idempotent.
                warn!(day_index, error = %err, "init_day: day lookup failed");
            }
        }

        let instruction = InitDayBuilder::new(self.program_id)
            .payer(self.signer.pubkey())
            .day_index(day_index)
            .build()?;

        match self
            .submitter
            .submit(&self.gateway, &self.signer, instruction)
            .await
        {
            Ok(_) => info!(day_index, "init_day: ensured day"),
            Err(err) => match classify(&err) {
                ErrorOutcome::Program(code) => {
                    info!(day_index, code, "init_day: program error")
                }
                _ => warn!(day_index, error = %err, "init_day: submission failed"),
            },
        }

        Ok(())
    }

    /// Settling: finalizes the day under the retry window.
    async fn settle_with_retry(&self, day_index: i64) -> Result<(), CrankError> {
        let config = self
            .fetch_config()
            .await?
            .ok_or(CrankError::ConfigMissing)?;

        // The instruction is identical across attempts; build it once.
        let instruction = SettleDayBuilder::new(self.program_id)
            .recipient(config.recipient_pubkey)
            .day_index(day_index)
            .build()?;

        let interval = Duration::from_secs(self.config.retry_interval_seconds);
        let too_early_policy = BackoffPolicy::Fixed { interval };
        let error_policy = BackoffPolicy::LinearCapped {
            interval,
            cap: SETTLE_BACKOFF_CAP,
        };

        let window = RetryWindow::open(Duration::from_secs(self.config.retry_window_seconds));
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            self.metrics.record_settle_attempt();

            let err = match self
                .submitter
                .submit(&self.gateway, &self.signer, instruction.clone())
                .await
            {
                Ok(_) => {
                    info!(day_index, attempt, "settle_day: success");
                    return Ok(());
                }
                Err(err) => err,
            };

            self.metrics.record_settle_failure();

            match classify(&err) {
                ErrorOutcome::Program(ALREADY_FINALIZED) => {
                    info!(day_index, "settle_day: already finalized");
                    return Ok(());
                }
                ErrorOutcome::Program(TOO_EARLY) => {
                    if window.expired() {
                        return Err(CrankError::SettlementTimedOut {
                            day_index,
                            window_seconds: self.config.retry_window_seconds,
                        });
                    }
                    info!(day_index, attempt, "settle_day: too early, retrying");
                    tokio::time::sleep(too_early_policy.delay(attempt)).await;
                }
                outcome => {
                    if window.expired() {
                        // Surface the original error, not the classified
                        // form; downstream log consumers read its message.
                        return Err(err.into());
                    }
                    warn!(
                        day_index,
                        attempt,
                        ?outcome,
                        error = %err,
                        "settle_day: retrying after error"
                    );
                    tokio::time::sleep(error_policy.delay(attempt)).await;
                }
            }
        }
    }

    /// Refunding: pays losing bidders in batches until done or out of
    /// time. Returns the number of bidders refunded this run.
    async fn refund_losers(&self, day_index: i64) -> Result<u32, CrankError> {
        let Some(day) = self.fetch_auction_day(day_index).await? else {
            warn!(day_index, "refunds: auction day missing");
            return Ok(0);
        };

        if !day.finalized {
            warn!(day_index, "refunds: auction day not finalized");
            return Ok(0);
        }

        if day.refunds_complete() {
            info!(day_index, "refunds: already completed");
            return Ok(0);
        }

        let (day_key, _) = derive_auction_day_address(&self.program_id, day_index);
        let receipts = self
            .gateway
            .get_program_accounts(
                &self.program_id,
                BidReceipt::LEN as u64,
                BidReceipt::AUCTION_DAY_OFFSET,
                day_key.as_ref(),
            )
            .await?;

        // Re-derive the pending set from ledger state; local memory is
        // never trusted across runs.
        let mut losers = Vec::new();
        for (address, data) in receipts {
            let receipt = match BidReceipt::decode(&data) {
                Ok(receipt) => receipt,
                Err(err) => {
                    warn!(%address, error = %err, "refunds: skipping undecodable receipt");
                    continue;
                }
            };
            if receipt.refunded || receipt.bidder == day.winner {
                continue;
            }
            losers.push(receipt.bidder);
        }

        if losers.is_empty() {
            info!(day_index, "refunds: no losers to refund");
            return Ok(0);
        }

        let batches = chunked(&losers, self.config.max_batch_size);
        let deadline = RetryWindow::open(Duration::from_secs(self.config.max_runtime_seconds));
        let mut refunded = 0u32;

        for batch in batches {
            if deadline.expired() {
                warn!(day_index, refunded, "refunds: max runtime reached, stopping");
                break;
            }

            let instruction = RefundBatchBuilder::new(self.program_id)
                .cranker(self.signer.pubkey())
                .day_index(day_index)
                .bidders(batch.clone())
                .build()?;

            match self
                .submitter
                .submit(&self.gateway, &self.signer, instruction)
                .await
            {
                Ok(_) => {
                    refunded += batch.len() as u32;
                    self.metrics.record_batch(batch.len());
                    info!(day_index, size = batch.len(), "refunds: processed batch");
                }
                Err(err) => {
                    // Non-fatal: the next invocation re-derives the
                    // pending set and retries these receipts.
                    self.metrics.record_batch_failure();
                    warn!(
                        day_index,
                        size = batch.len(),
                        outcome = ?classify(&err),
                        error = %err,
                        "refunds: batch failed"
                    );
                }
            }
        }

        info!(day_index, refunded, "refunds: processed bidders");
        Ok(refunded)
    }

    async fn fetch_config(&self) -> Result<Option<Config>, CrankError> {
        let (address, _) = derive_config_address(&self.program_id);
        match self.gateway.get_account(&address).await? {
            Some(data) => Ok(Some(Config::decode(&data)?)),
            None => Ok(None),
        }
    }

    async fn fetch_auction_day(&self, day_index: i64) -> Result<Option<AuctionDay>, CrankError> {
        let (address, _) = derive_auction_day_address(&self.program_id, day_index);
        match self.gateway.get_account(&address).await? {
            Some(data) => Ok(Some(AuctionDay::decode(&data)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gavel_sdk::accounts::instruction_discriminator;
    use solana_sdk::hash::Hash;
    use solana_sdk::transaction::Transaction;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    const DAY: i64 = 19800;

    /// Scripted in-memory gateway.
    #[derive(Default)]
    struct MockGateway {
        accounts: Mutex<HashMap<Pubkey, Vec<u8>>>,
        receipts: Mutex<Vec<(Pubkey, Vec<u8>)>>,
        submit_results: Mutex<VecDeque<Result<String, ClientError>>>,
        submitted: Mutex<Vec<Transaction>>,
    }

    impl MockGateway {
        fn put_account(&self, address: Pubkey, data: Vec<u8>) {
            self.accounts.lock().expect("lock").insert(address, data);
        }

        fn put_receipt(&self, address: Pubkey, data: Vec<u8>) {
            self.receipts.lock().expect("lock").push((address, data));
        }

        fn script_submit(&self, result: Result<String, ClientError>) {
            self.submit_results
                .lock()
                .expect("lock")
                .push_back(result);
        }

        fn submitted(&self) -> Vec<Transaction> {
            self.submitted.lock().expect("lock").clone()
        }
    }

    #[async_trait]
    impl LedgerGateway for MockGateway {
        async fn get_account(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, ClientError> {
            Ok(self.accounts.lock().expect("lock").get(address).cloned())
        }

        async fn get_program_accounts(
            &self,
            _program_id: &Pubkey,
            data_size: u64,
            _memcmp_offset: usize,
            _memcmp_bytes: &[u8],
        ) -> Result<Vec<(Pubkey, Vec<u8>)>, ClientError> {
            assert_eq!(data_size, BidReceipt::LEN as u64);
            Ok(self.receipts.lock().expect("lock").clone())
        }

        async fn latest_blockhash(&self) -> Result<Hash, ClientError> {
            Ok(Hash::default())
        }

        async fn send_transaction(
            &self,
            transaction: &Transaction,
        ) -> Result<String, ClientError> {
            self.submitted
                .lock()
                .expect("lock")
                .push(transaction.clone());
            self.submit_results
                .lock()
                .expect("lock")
                .pop_front()
                .unwrap_or_else(|| Ok("signature".to_string()))
        }

        async fn confirm(&self, _signature: &str) -> Result<(), ClientError> {
            Ok(())
        }
    }

    fn program_error(code: u32) -> ClientError {
        ClientError::Transaction {
            custom_code: Some(code),
            message: format!("custom program error: {:#x}", code),
        }
    }

    fn test_config(program_id: &Pubkey) -> CrankConfig {
        let keypair = Keypair::new();
        CrankConfig {
            program_id: program_id.to_string(),
            cranker_key: bs58::encode(keypair.to_bytes()).into_string(),
            // Keep test runs fast: no retry budget.
            retry_window_seconds: 0,
            retry_interval_seconds: 1,
            ..CrankConfig::default()
        }
    }

    fn seed_config(gateway: &MockGateway, program_id: &Pubkey) -> Config {
        let config = Config {
            recipient_pubkey: Pubkey::new_unique(),
            loser_fee_lamports: 5_000,
            min_increment_lamports: 1_000_000,
            bump: 255,
        };
        let (address, _) = derive_config_address(program_id);
        gateway.put_account(address, config.encode());
        config
    }

    fn seed_day(gateway: &MockGateway, program_id: &Pubkey, day: &AuctionDay) {
        let (address, _) = derive_auction_day_address(program_id, day.day_index);
        gateway.put_account(address, day.encode());
    }

    fn finalized_day(winner: Pubkey, total: u32, completed: u32) -> AuctionDay {
        AuctionDay {
            day_index: DAY,
            finalized: true,
            winner,
            highest_bid: 10_000_000,
            bidder_count: total + 1,
            refund_count_total: total,
            refund_count_completed: completed,
            total_bid_lamports: 50_000_000,
            refund_pool_remaining: 40_000_000,
            fee_pool_remaining: 0,
            vault_bump: 250,
        }
    }

    fn seed_receipt(gateway: &MockGateway, program_id: &Pubkey, bidder: Pubkey, refunded: bool) {
        let (day_key, _) = derive_auction_day_address(program_id, DAY);
        let receipt = BidReceipt {
            auction_day: day_key,
            bidder,
            amount: 1_000_000,
            refunded,
        };
        gateway.put_receipt(Pubkey::new_unique(), receipt.encode());
    }

    /// Decodes the bidder count from a refund batch instruction payload.
    fn batch_size(transaction: &Transaction) -> u32 {
        let data = &transaction.message.instructions[0].data;
        assert_eq!(data[..8], instruction_discriminator("refund_batch"));
        u32::from_le_bytes(data[16..20].try_into().expect("count"))
    }

    fn instruction_kind(transaction: &Transaction) -> &'static str {
        let data = &transaction.message.instructions[0].data;
        for name in ["init_day", "settle_day", "refund_batch"] {
            if data[..8] == instruction_discriminator(name) {
                return name;
            }
        }
        "unknown"
    }

    #[test]
    fn test_day_index_at() {
        assert_eq!(day_index_at(1_710_720_000), 19800);
        assert_eq!(day_index_at(1_710_720_000 + SECONDS_PER_DAY), 19801);
        // Pre-epoch timestamps round toward negative infinity.
        assert_eq!(day_index_at(-1), -1);
    }

    #[test]
    fn test_chunked_spec_scenario() {
        let losers: Vec<Pubkey> = (0..45).map(|_| Pubkey::new_unique()).collect();

        let batches = chunked(&losers, 20);

        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].len(), 20);
        assert_eq!(batches[1].len(), 20);
        assert_eq!(batches[2].len(), 5);

        // Order preserved and the union is exactly the input.
        let flattened: Vec<Pubkey> = batches.into_iter().flatten().collect();
        assert_eq!(flattened, losers);
    }

    #[test]
    fn test_chunked_empty_and_short() {
        assert!(chunked(&[], 20).is_empty());

        let one = vec![Pubkey::new_unique()];
        let batches = chunked(&one, 20);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0], one);
    }

    #[tokio::test]
    async fn test_run_already_finalized_goes_straight_to_refunds() {
        let program_id = Pubkey::new_unique();
        let gateway = MockGateway::default();
        seed_config(&gateway, &program_id);
        seed_day(&gateway, &program_id, &finalized_day(Pubkey::new_unique(), 0, 0));
        // First settle attempt is rejected as already finalized.
        gateway.script_submit(Err(program_error(ALREADY_FINALIZED)));

        let service =
            SettlementService::new(test_config(&program_id), gateway).expect("service");
        let report = service.run_for_day(DAY).await.expect("run");

        assert_eq!(report.day_index, DAY);
        assert_eq!(report.refunded, 0);
        assert_eq!(service.metrics().settle_attempts(), 1);
    }

    #[tokio::test]
    async fn test_run_too_early_times_out() {
        let program_id = Pubkey::new_unique();
        let gateway = MockGateway::default();
        seed_config(&gateway, &program_id);
        seed_day(&gateway, &program_id, &finalized_day(Pubkey::new_unique(), 0, 0));
        gateway.script_submit(Err(program_error(TOO_EARLY)));

        // retry_window_seconds = 0: the first TooEarly exhausts the window.
        let service =
            SettlementService::new(test_config(&program_id), gateway).expect("service");
        let err = service.run_for_day(DAY).await.expect_err("should time out");

        assert!(matches!(
            err,
            CrankError::SettlementTimedOut { day_index: DAY, .. }
        ));
    }

    #[tokio::test]
    async fn test_run_unknown_error_reraised_raw_after_window() {
        let program_id = Pubkey::new_unique();
        let gateway = MockGateway::default();
        seed_config(&gateway, &program_id);
        seed_day(&gateway, &program_id, &finalized_day(Pubkey::new_unique(), 0, 0));
        gateway.script_submit(Err(ClientError::Rpc {
            code: -32002,
            message: "Blockhash not found".to_string(),
        }));

        let service =
            SettlementService::new(test_config(&program_id), gateway).expect("service");
        let err = service.run_for_day(DAY).await.expect_err("should fail");

        // The original message survives classification.
        assert!(matches!(err, CrankError::Gateway(_)));
        assert!(err.to_string().contains("Blockhash not found"));
    }

    #[tokio::test]
    async fn test_config_missing_is_fatal_before_settlement() {
        let program_id = Pubkey::new_unique();
        let gateway = MockGateway::default();
        seed_day(&gateway, &program_id, &finalized_day(Pubkey::new_unique(), 0, 0));

        let service =
            SettlementService::new(test_config(&program_id), gateway).expect("service");
        let err = service.run_for_day(DAY).await.expect_err("should fail");

        assert!(matches!(err, CrankError::ConfigMissing));
        assert_eq!(service.metrics().settle_attempts(), 0);
    }

    #[tokio::test]
    async fn test_ensure_day_initializes_absent_day() {
        let program_id = Pubkey::new_unique();
        let gateway = MockGateway::default();
        seed_config(&gateway, &program_id);
        // No auction day account seeded.

        let service =
            SettlementService::new(test_config(&program_id), gateway).expect("service");
        let report = service.run_for_day(DAY).await.expect("run");

        // init_day then settle_day; refunding finds no day and stops.
        assert_eq!(report.refunded, 0);
        let submitted = service.gateway.submitted();
        assert_eq!(submitted.len(), 2);
        assert_eq!(instruction_kind(&submitted[0]), "init_day");
        assert_eq!(instruction_kind(&submitted[1]), "settle_day");
    }

    #[tokio::test]
    async fn test_ensure_day_rejection_still_settles() {
        let program_id = Pubkey::new_unique();
        let gateway = MockGateway::default();
        seed_config(&gateway, &program_id);
        // Day account not visible yet; the init submission is rejected by
        // the program, which the service treats as the day existing.
        gateway.script_submit(Err(program_error(6000)));

        let service =
            SettlementService::new(test_config(&program_id), gateway).expect("service");
        let report = service.run_for_day(DAY).await.expect("run");

        assert_eq!(report.day_index, DAY);
        let submitted = service.gateway.submitted();
        assert_eq!(submitted.len(), 2);
        assert_eq!(instruction_kind(&submitted[0]), "init_day");
        assert_eq!(instruction_kind(&submitted[1]), "settle_day");
    }

    #[tokio::test]
    async fn test_refunds_stop_at_max_runtime() {
        let program_id = Pubkey::new_unique();
        let gateway = MockGateway::default();
        seed_config(&gateway, &program_id);
        seed_day(&gateway, &program_id, &finalized_day(Pubkey::new_unique(), 3, 0));
        for _ in 0..3 {
            seed_receipt(&gateway, &program_id, Pubkey::new_unique(), false);
        }

        // A zero runtime budget lapses before the first batch.
        let config = CrankConfig {
            max_runtime_seconds: 0,
            ..test_config(&program_id)
        };
        let service = SettlementService::new(config, gateway).expect("service");
        let report = service.run_for_day(DAY).await.expect("run");

        assert_eq!(report.refunded, 0);
        assert_eq!(service.metrics().batches_submitted(), 0);

        // Only the settlement transaction went out; the pending receipts
        // are left for the next invocation.
        let submitted = service.gateway.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(instruction_kind(&submitted[0]), "settle_day");
    }

    #[tokio::test]
    async fn test_refund_batching_and_filtering() {
        let program_id = Pubkey::new_unique();
        let gateway = MockGateway::default();
        seed_config(&gateway, &program_id);

        let winner = Pubkey::new_unique();
        seed_day(&gateway, &program_id, &finalized_day(winner, 46, 0));

        // 45 unrefunded losers, plus the winner and one already-refunded
        // loser that must both be filtered out.
        let losers: Vec<Pubkey> = (0..45).map(|_| Pubkey::new_unique()).collect();
        for loser in &losers {
            seed_receipt(&gateway, &program_id, *loser, false);
        }
        seed_receipt(&gateway, &program_id, winner, false);
        seed_receipt(&gateway, &program_id, Pubkey::new_unique(), true);

        let service =
            SettlementService::new(test_config(&program_id), gateway).expect("service");
        let report = service.run_for_day(DAY).await.expect("run");

        assert_eq!(report.refunded, 45);

        let submitted = service.gateway.submitted();
        // One settle plus three refund batches of 20, 20, 5.
        assert_eq!(submitted.len(), 4);
        assert_eq!(instruction_kind(&submitted[0]), "settle_day");
        assert_eq!(batch_size(&submitted[1]), 20);
        assert_eq!(batch_size(&submitted[2]), 20);
        assert_eq!(batch_size(&submitted[3]), 5);

        // Winner never appears in any refund payload.
        for transaction in &submitted[1..] {
            let data = &transaction.message.instructions[0].data;
            let payload = &data[20..];
            for key in payload.chunks(32) {
                assert_ne!(key, winner.as_ref());
            }
        }

        assert_eq!(service.metrics().batches_submitted(), 3);
        assert_eq!(service.metrics().bidders_refunded(), 45);
    }

    #[tokio::test]
    async fn test_refund_idempotence_guard() {
        let program_id = Pubkey::new_unique();
        let gateway = MockGateway::default();
        seed_config(&gateway, &program_id);
        // All refunds already completed on chain.
        seed_day(&gateway, &program_id, &finalized_day(Pubkey::new_unique(), 5, 5));
        seed_receipt(&gateway, &program_id, Pubkey::new_unique(), false);

        let service =
            SettlementService::new(test_config(&program_id), gateway).expect("service");
        let report = service.run_for_day(DAY).await.expect("run");

        assert_eq!(report.refunded, 0);
        // Only the settle transaction went out.
        assert_eq!(service.gateway.submitted().len(), 1);
    }

    #[tokio::test]
    async fn test_refund_batch_failure_is_not_fatal() {
        let program_id = Pubkey::new_unique();
        let gateway = MockGateway::default();
        seed_config(&gateway, &program_id);
        seed_day(&gateway, &program_id, &finalized_day(Pubkey::new_unique(), 3, 0));

        let losers: Vec<Pubkey> = (0..3).map(|_| Pubkey::new_unique()).collect();
        for loser in &losers {
            seed_receipt(&gateway, &program_id, *loser, false);
        }

        // Settle succeeds, then the single refund batch fails.
        gateway.script_submit(Ok("sig".to_string()));
        gateway.script_submit(Err(ClientError::Timeout));

        let service = SettlementService::new(
            test_config(&program_id).with_max_batch_size(10),
            gateway,
        )
        .expect("service");
        let report = service.run_for_day(DAY).await.expect("run");

        assert_eq!(report.refunded, 0);
        assert_eq!(service.metrics().batches_failed(), 1);
    }
}
