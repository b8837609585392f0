//! Simulated oracle pool
//!
//! At startup every oracle account registers with the contract and keeps the
//! index triple it was assigned. The pool then listens for `OracleRequest`s
//! and every oracle holding the request's index submits a status code.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use flight_surety::{ResponseOutcome, ORACLE_REGISTRATION_FEE};

use crate::config::{SimulationConfig, StatusMode};
use crate::error::{settle, ApiError};
use crate::models::OracleView;
use crate::sandbox::{strkey, LedgerHandle, OracleRequest};

pub struct OraclePool {
    ledger: LedgerHandle,
    members: Vec<OracleView>,
    status_mode: StatusMode,
}

impl OraclePool {
    /// Register every oracle account, paying the registration fee.
    pub async fn register(ledger: LedgerHandle, config: &SimulationConfig) -> Result<Self, ApiError> {
        let mut members = Vec::with_capacity(config.oracle_count);

        for account in config.oracle_accounts() {
            let member = ledger
                .run(move |chain| {
                    let oracle = chain.account(account)?;
                    let indexes = settle(
                        chain
                            .contract()
                            .try_register_oracle(&oracle, &ORACLE_REGISTRATION_FEE),
                    )?;
                    Ok(OracleView {
                        account,
                        address: strkey(&oracle),
                        indexes: indexes.iter().collect(),
                    })
                })
                .await?;

            debug!(oracle = account, indexes = ?member.indexes, "oracle registered");
            members.push(member);
        }

        info!(oracles = members.len(), "oracle pool registered");

        Ok(Self {
            ledger,
            members,
            status_mode: config.status_mode,
        })
    }

    pub fn members(&self) -> &[OracleView] {
        &self.members
    }

    /// Oracles that may answer a request opened under `index`.
    pub fn holders(&self, index: u32) -> impl Iterator<Item = &OracleView> {
        self.members
            .iter()
            .filter(move |member| member.indexes.contains(&index))
    }

    /// Answer requests until the sandbox ledger shuts down.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        let mut requests = self.ledger.subscribe();

        tokio::spawn(async move {
            loop {
                match requests.recv().await {
                    Ok(request) => self.answer(&request).await,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "oracle pool fell behind; requests dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!("oracle pool stopped");
        })
    }

    async fn answer(&self, request: &OracleRequest) {
        let holders: Vec<usize> = self
            .holders(request.index)
            .map(|member| member.account)
            .collect();

        info!(
            request_id = %request.request_id,
            index = request.index,
            flight = %request.flight,
            timestamp = request.timestamp,
            holders = holders.len(),
            "oracle request received"
        );

        for oracle in holders {
            let status_code = self.status_mode.pick();
            match self.submit(oracle, request, status_code).await {
                Ok(ResponseOutcome::Resolved) => {
                    info!(
                        request_id = %request.request_id,
                        oracle,
                        status_code,
                        "flight status resolved"
                    );
                }
                Ok(outcome) => {
                    debug!(
                        request_id = %request.request_id,
                        oracle,
                        status_code,
                        ?outcome,
                        "oracle response submitted"
                    );
                }
                Err(e) => {
                    warn!(request_id = %request.request_id, oracle, error = %e, "oracle response failed");
                }
            }
        }
    }

    async fn submit(
        &self,
        oracle: usize,
        request: &OracleRequest,
        status_code: u32,
    ) -> Result<ResponseOutcome, ApiError> {
        let index = request.index;
        let airline = request.airline;
        let flight = request.flight.clone();
        let timestamp = request.timestamp;

        self.ledger
            .run(move |chain| {
                let oracle_address = chain.account(oracle)?;
                let airline_address = chain.account(airline)?;
                settle(chain.contract().try_submit_oracle_response(
                    &oracle_address,
                    &index,
                    &airline_address,
                    &chain.string(&flight),
                    &timestamp,
                    &status_code,
                ))
            })
            .await
    }
}
