//! Flight Surety oracle simulation server
//!
//! Runs the Flight Surety contract on a sandbox ledger, keeps a pool of
//! simulated oracles answering flight-status requests, and exposes the dapp's
//! contract calls over HTTP.

pub mod app_state;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod oracle_pool;
pub mod routes;
pub mod sandbox;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::app_state::AppState;
use crate::config::SimulationConfig;
use crate::oracle_pool::OraclePool;
use crate::sandbox::LedgerHandle;

/// Deploy the sandbox, register the oracle pool and start it answering.
pub async fn bootstrap(config: &SimulationConfig) -> anyhow::Result<AppState> {
    config.validate()?;

    let ledger = LedgerHandle::spawn(config).await?;
    let oracles = Arc::new(OraclePool::register(ledger.clone(), config).await?);
    oracles.clone().spawn();

    Ok(AppState::new(ledger, oracles))
}

pub fn build_router(state: AppState, config: &SimulationConfig) -> Router {
    Router::new()
        .merge(routes::service_routes())
        .merge(routes::airline_routes())
        .merge(routes::insurance_routes())
        .merge(routes::oracle_routes())
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(&config.cors_allowed_origins))
        .with_state(state)
}

fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allowed_origins = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(false)
}
