//! Sandbox ledger actor
//!
//! The Flight Surety contract runs natively inside a soroban test host. The
//! host environment is neither `Send` nor `Sync`, so it lives on a dedicated
//! thread and every caller hands it a job over an mpsc queue, receiving the
//! result on a oneshot channel. Jobs run one at a time in arrival order, the
//! same serial ordering a real ledger gives transactions.
//!
//! Flight-status requests opened through [`Chain::fetch_flight_status`] are
//! published on a broadcast channel for the oracle pool.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use anyhow::{anyhow, Context, Result};
use flight_surety::{FlightSurety, FlightSuretyClient};
use soroban_sdk::{
    testutils::{Address as _, EnvTestConfig, Ledger as _},
    token::StellarAssetClient,
    Address, Env,
};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::config::SimulationConfig;
use crate::error::{settle, ApiError};
use crate::models::{AccountInfo, AccountRole};

const JOB_QUEUE_DEPTH: usize = 256;
const REQUEST_BUFFER: usize = 64;

pub const FIRST_AIRLINE_NAME: &str = "First Airline";

type Job = Box<dyn FnOnce(&mut Chain) + Send>;

/// An `OracleRequest` event as seen by the oracle pool.
#[derive(Debug, Clone)]
pub struct OracleRequest {
    pub request_id: Uuid,
    pub index: u32,
    pub airline: usize,
    pub flight: String,
    pub timestamp: u64,
}

/// The deployed contract and its accounts. Only reachable from inside a job.
pub struct Chain {
    env: Env,
    contract: FlightSuretyClient<'static>,
    accounts: Vec<Address>,
    requests: broadcast::Sender<OracleRequest>,
}

impl Chain {
    fn deploy(config: &SimulationConfig, requests: broadcast::Sender<OracleRequest>) -> Result<Self> {
        // Snapshots are a test-harness feature; the sandbox keeps none.
        let env = Env::new_with_config(EnvTestConfig {
            capture_snapshot_at_drop: false,
        });
        env.mock_all_auths();
        #[allow(deprecated)]
        env.budget().reset_unlimited();

        let accounts: Vec<Address> = (0..config.accounts)
            .map(|_| Address::generate(&env))
            .collect();

        let token_admin = Address::generate(&env);
        let token = env.register_stellar_asset_contract_v2(token_admin).address();
        let minter = StellarAssetClient::new(&env, &token);
        for account in &accounts {
            minter.mint(account, &config.starting_balance);
        }

        let contract_id = env.register(FlightSurety, ());
        let contract = FlightSuretyClient::new(&env, &contract_id);

        let owner = accounts
            .first()
            .cloned()
            .ok_or_else(|| anyhow!("sandbox has no accounts"))?;
        settle(contract.try_initialize(
            &owner,
            &token,
            &owner,
            &soroban_sdk::String::from_str(&env, FIRST_AIRLINE_NAME),
        ))
        .map_err(|e| anyhow!("contract initialization failed: {}", e))?;

        info!(
            accounts = accounts.len(),
            contract = %strkey(&contract_id),
            token = %strkey(&token),
            "flight surety contract deployed"
        );

        Ok(Self {
            env,
            contract,
            accounts,
            requests,
        })
    }

    pub fn contract(&self) -> &FlightSuretyClient<'static> {
        &self.contract
    }

    pub fn account(&self, index: usize) -> Result<Address, ApiError> {
        self.accounts
            .get(index)
            .cloned()
            .ok_or(ApiError::UnknownAccount(index))
    }

    pub fn string(&self, value: &str) -> soroban_sdk::String {
        soroban_sdk::String::from_str(&self.env, value)
    }

    /// Open a status request and announce it to the oracle pool.
    pub fn fetch_flight_status(
        &self,
        requester: usize,
        airline: usize,
        flight: &str,
        timestamp: u64,
    ) -> Result<OracleRequest, ApiError> {
        let requester_address = self.account(requester)?;
        let airline_address = self.account(airline)?;
        let flight_name = self.string(flight);

        let index = settle(self.contract.try_fetch_flight_status(
            &requester_address,
            &airline_address,
            &flight_name,
            &timestamp,
        ))?;

        let request = OracleRequest {
            request_id: Uuid::new_v4(),
            index,
            airline,
            flight: flight.to_string(),
            timestamp,
        };
        // No subscribers only means no oracles are listening yet.
        let _ = self.requests.send(request.clone());

        Ok(request)
    }

    /// Move ledger time to the wall clock before each job.
    fn tick(&self) {
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        self.env.ledger().with_mut(|ledger| {
            if now > ledger.timestamp {
                ledger.timestamp = now;
            }
        });
    }
}

/// Cloneable handle to the sandbox ledger thread.
#[derive(Clone)]
pub struct LedgerHandle {
    jobs: mpsc::Sender<Job>,
    requests: broadcast::Sender<OracleRequest>,
    accounts: Arc<Vec<AccountInfo>>,
}

impl LedgerHandle {
    /// Deploy the contract on a fresh sandbox and start the ledger thread.
    pub async fn spawn(config: &SimulationConfig) -> Result<Self> {
        let (jobs_tx, mut jobs_rx) = mpsc::channel::<Job>(JOB_QUEUE_DEPTH);
        let (requests_tx, _) = broadcast::channel(REQUEST_BUFFER);
        let (ready_tx, ready_rx) = oneshot::channel();

        let thread_config = config.clone();
        let thread_requests = requests_tx.clone();
        thread::Builder::new()
            .name("sandbox-ledger".to_string())
            .spawn(move || {
                let mut chain = match Chain::deploy(&thread_config, thread_requests) {
                    Ok(chain) => chain,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let addresses: Vec<String> = chain.accounts.iter().map(strkey).collect();
                if ready_tx.send(Ok(addresses)).is_err() {
                    return;
                }

                while let Some(job) = jobs_rx.blocking_recv() {
                    chain.tick();
                    if panic::catch_unwind(AssertUnwindSafe(|| job(&mut chain))).is_err() {
                        error!("sandbox job panicked");
                    }
                }
                debug!("sandbox ledger thread stopped");
            })
            .context("failed to start sandbox ledger thread")?;

        let addresses = ready_rx
            .await
            .context("sandbox ledger thread exited during deployment")??;

        let accounts = addresses
            .into_iter()
            .enumerate()
            .map(|(index, address)| AccountInfo {
                index,
                address,
                role: role_of(config, index),
            })
            .collect();

        Ok(Self {
            jobs: jobs_tx,
            requests: requests_tx,
            accounts: Arc::new(accounts),
        })
    }

    /// Run `job` on the ledger thread and wait for its result.
    pub async fn run<T, F>(&self, job: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut Chain) -> Result<T, ApiError> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job: Job = Box::new(move |chain| {
            let _ = reply_tx.send(job(chain));
        });

        self.jobs
            .send(job)
            .await
            .map_err(|_| ApiError::LedgerUnavailable)?;

        reply_rx
            .await
            .map_err(|_| ApiError::Host("sandbox job aborted".to_string()))?
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OracleRequest> {
        self.requests.subscribe()
    }

    pub fn accounts(&self) -> &[AccountInfo] {
        &self.accounts
    }
}

fn role_of(config: &SimulationConfig, index: usize) -> AccountRole {
    if config.oracle_accounts().contains(&index) {
        return AccountRole::Oracle;
    }
    match index {
        0 => AccountRole::Owner,
        1..=5 => AccountRole::Airline,
        6..=10 => AccountRole::Passenger,
        _ => AccountRole::Spare,
    }
}

/// Stellar strkey (`G...` / `C...`) of a sandbox address.
pub fn strkey(address: &Address) -> String {
    host_string(&address.to_string())
}

/// Copy a contract string out of the host.
pub fn host_string(value: &soroban_sdk::String) -> String {
    let mut buf = vec![0u8; value.len() as usize];
    value.copy_into_slice(&mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}
