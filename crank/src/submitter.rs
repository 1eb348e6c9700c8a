//! Transaction submission for the settlement crank.
//!
//! Signs one instruction into a transaction with the cranker keypair and
//! a cached recent blockhash, submits it through the gateway, and waits
//! for confirmation. Retry policy is the caller's concern.

use std::time::Duration;

use gavel_sdk::client::Cached;
use gavel_sdk::{ClientError, LedgerGateway};
use solana_sdk::{
    hash::Hash,
    instruction::Instruction,
    signature::Keypair,
    signer::Signer,
    transaction::Transaction,
};

/// How long a fetched blockhash is reused before refreshing.
const BLOCKHASH_TTL: Duration = Duration::from_secs(10);

/// Transaction submitter for the settlement crank.
#[derive(Debug)]
pub struct TransactionSubmitter {
    /// Recent blockhash with a short time-to-live.
    blockhash: Cached<Hash>,
}

impl Default for TransactionSubmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionSubmitter {
    /// Creates a new submitter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            blockhash: Cached::new(BLOCKHASH_TTL),
        }
    }

    /// Signs, submits, and confirms a single instruction.
    ///
    /// # Errors
    ///
    /// Returns the gateway error unchanged; callers classify it.
    pub async fn submit<G: LedgerGateway>(
        &self,
        gateway: &G,
        signer: &Keypair,
        instruction: Instruction,
    ) -> Result<String, ClientError> {
        let blockhash = match self.blockhash.get() {
            Some(hash) => hash,
            None => {
                let hash = gateway.latest_blockhash().await?;
                self.blockhash.put(hash);
                hash
            }
        };

        let transaction = Transaction::new_signed_with_payer(
            &[instruction],
            Some(&signer.pubkey()),
            &[signer],
            blockhash,
        );

        let signature = match gateway.send_transaction(&transaction).await {
            Ok(signature) => signature,
            Err(err) => {
                // The hash may have expired; do not reuse it.
                self.blockhash.invalidate();
                return Err(err);
            }
        };

        if let Err(err) = gateway.confirm(&signature).await {
            // An unconfirmed transaction usually means the hash aged out.
            self.blockhash.invalidate();
            return Err(err);
        }
        Ok(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use solana_sdk::pubkey::Pubkey;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct CountingGateway {
        blockhash_calls: AtomicU64,
        sent: Mutex<Vec<Transaction>>,
        fail_confirm: bool,
    }

    #[async_trait]
    impl LedgerGateway for CountingGateway {
        async fn get_account(&self, _address: &Pubkey) -> Result<Option<Vec<u8>>, ClientError> {
            Ok(None)
        }

        async fn get_program_accounts(
            &self,
            _program_id: &Pubkey,
            _data_size: u64,
            _memcmp_offset: usize,
            _memcmp_bytes: &[u8],
        ) -> Result<Vec<(Pubkey, Vec<u8>)>, ClientError> {
            Ok(Vec::new())
        }

        async fn latest_blockhash(&self) -> Result<Hash, ClientError> {
            self.blockhash_calls.fetch_add(1, Ordering::Relaxed);
            Ok(Hash::default())
        }

        async fn send_transaction(
            &self,
            transaction: &Transaction,
        ) -> Result<String, ClientError> {
            if let Ok(mut sent) = self.sent.lock() {
                sent.push(transaction.clone());
            }
            Ok("signature".to_string())
        }

        async fn confirm(&self, signature: &str) -> Result<(), ClientError> {
            if self.fail_confirm {
                return Err(ClientError::Dropped {
                    signature: signature.to_string(),
                });
            }
            Ok(())
        }
    }

    fn noop_instruction() -> Instruction {
        Instruction {
            program_id: Pubkey::new_unique(),
            accounts: vec![],
            data: vec![1, 2, 3],
        }
    }

    #[tokio::test]
    async fn test_submit_signs_and_sends() {
        let gateway = CountingGateway::default();
        let signer = Keypair::new();
        let submitter = TransactionSubmitter::new();

        let signature = submitter
            .submit(&gateway, &signer, noop_instruction())
            .await
            .expect("submit");

        assert_eq!(signature, "signature");
        let sent = gateway.sent.lock().expect("lock");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].message.account_keys[0], signer.pubkey());
    }

    #[tokio::test]
    async fn test_submit_reuses_cached_blockhash() {
        let gateway = CountingGateway::default();
        let signer = Keypair::new();
        let submitter = TransactionSubmitter::new();

        for _ in 0..3 {
            submitter
                .submit(&gateway, &signer, noop_instruction())
                .await
                .expect("submit");
        }

        // One fetch serves all three submissions within the TTL.
        assert_eq!(gateway.blockhash_calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_submit_discards_blockhash_when_confirm_fails() {
        let gateway = CountingGateway {
            fail_confirm: true,
            ..CountingGateway::default()
        };
        let signer = Keypair::new();
        let submitter = TransactionSubmitter::new();

        for _ in 0..2 {
            let result = submitter
                .submit(&gateway, &signer, noop_instruction())
                .await;
            assert!(matches!(result, Err(ClientError::Dropped { .. })));
        }

        // Each dropped transaction forces a fresh hash for the next one.
        assert_eq!(gateway.blockhash_calls.load(Ordering::Relaxed), 2);
    }
}
