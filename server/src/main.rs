//! Flight Surety Server
//!
//! Starts the sandbox ledger with the Flight Surety contract deployed, the
//! simulated oracle pool, and the HTTP API the dapp talks to.

use std::net::SocketAddr;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use flight_surety_server::config::SimulationConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let config = SimulationConfig::from_env()?;
    info!(
        accounts = config.accounts,
        oracles = config.oracle_count,
        status_mode = ?config.status_mode,
        "starting flight surety sandbox"
    );

    let state = flight_surety_server::bootstrap(&config).await?;
    let app = flight_surety_server::build_router(state, &config);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("Server starting on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
