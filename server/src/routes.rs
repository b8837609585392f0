//! Route definitions for the Flight Surety API

use axum::{
    routing::{get, post},
    Router,
};

use crate::app_state::AppState;
use crate::handlers::*;

// Service routes
pub fn service_routes() -> Router<AppState> {
    Router::new()
        .route("/api", get(api_root))
        .route("/health", get(health_check))
        .route("/api/accounts", get(list_accounts))
        .route("/api/operational", get(get_operational).post(set_operational))
}

// Airline routes
pub fn airline_routes() -> Router<AppState> {
    Router::new()
        .route("/api/airlines", post(register_airline))
        .route("/api/airlines/fund", post(fund_airline))
        .route("/api/airlines/vote", post(vote_for_airline))
        .route("/api/airlines/:account", get(get_airline))
}

// Insurance routes
pub fn insurance_routes() -> Router<AppState> {
    Router::new()
        .route("/api/insurance", post(buy_insurance))
        .route("/api/passengers/:account/entitlement", get(get_entitlement))
        .route("/api/passengers/:account/withdraw", post(withdraw_claim))
}

// Oracle routes
pub fn oracle_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/flights/status",
            get(get_flight_status).post(fetch_flight_status),
        )
        .route("/api/oracles", get(list_oracles))
}
