//! Settlement crank binary.
//!
//! Runs one settlement invocation against yesterday's auction day and
//! prints a JSON status line on success. Intended to be run from a
//! scheduler shortly after the day boundary.

use gavel_crank::config::CrankConfig;
use gavel_crank::service::SettlementService;
use gavel_sdk::client::{ClientConfig, RpcGateway};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,gavel_crank=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CrankConfig::from_env()?;
    tracing::info!("Starting settlement crank");
    tracing::info!("RPC URL: {}", config.rpc_url);
    tracing::info!("Program id: {}", config.program_id);

    let gateway = RpcGateway::new(ClientConfig::new(&config.rpc_url))?;
    let service = SettlementService::new(config, gateway)?;

    let report = service.run().await?;

    // Machine-readable result for the scheduler.
    println!(
        "{}",
        json!({ "status": "ok", "day_index": report.day_index })
    );

    Ok(())
}
