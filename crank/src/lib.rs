//! Settlement crank for the daily sealed-bid auction.
//!
//! A scheduled job that finalizes yesterday's auction day on the ledger
//! and refunds losing bidders in batches. The crank keeps no state of
//! its own: every run re-reads the ledger and every mutating step is
//! safe to repeat, so a crashed or partial run is recovered simply by
//! running again.
//!
//! # Example
//!
//! ```rust,no_run
//! use gavel_crank::config::CrankConfig;
//! use gavel_crank::service::SettlementService;
//! use gavel_sdk::client::{ClientConfig, RpcGateway};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CrankConfig::from_env()?;
//! let gateway = RpcGateway::new(ClientConfig::new(&config.rpc_url))?;
//!
//! let service = SettlementService::new(config, gateway)?;
//! let report = service.run().await?;
//! println!("settled day {}", report.day_index);
//! # Ok(())
//! # }
//! ```

/// Retry timing policies.
pub mod backoff;

/// Program error classification.
pub mod classifier;

/// Crank configuration.
pub mod config;

/// Crank metrics.
pub mod metrics;

/// The settlement service.
pub mod service;

/// Transaction submission.
pub mod submitter;

pub use backoff::{BackoffPolicy, RetryWindow};
pub use classifier::{classify, ErrorOutcome};
pub use config::{ConfigError, CrankConfig};
pub use metrics::CrankMetrics;
pub use service::{CrankError, RunReport, SettlementService};
pub use submitter::TransactionSubmitter;
