//! Application state shared across handlers

use std::sync::Arc;

use axum::extract::FromRef;

use crate::oracle_pool::OraclePool;
use crate::sandbox::LedgerHandle;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub ledger: LedgerHandle,
    pub oracles: Arc<OraclePool>,
}

impl AppState {
    pub fn new(ledger: LedgerHandle, oracles: Arc<OraclePool>) -> Self {
        Self { ledger, oracles }
    }
}

impl FromRef<AppState> for LedgerHandle {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.ledger.clone()
    }
}

impl FromRef<AppState> for Arc<OraclePool> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.oracles.clone()
    }
}
