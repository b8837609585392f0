//! Flight Surety Contract
//!
//! Flight-delay insurance backed by a consortium of airlines. Airlines join
//! through a registry that switches from automatic admission to consensus
//! voting after the fourth member, fund their membership, and then sell
//! policies on their flights. Registered oracles answer flight-status
//! requests; once enough of them agree that a flight was late due to the
//! airline, every passenger insured on it is credited 1.5x the premium.
//!
//! All mutating calls pass through an operational gate the owner can close.

#![no_std]

mod error;
mod events;
mod insurance;
mod oracle;
mod payment;
mod registry;
mod storage;
mod types;


use soroban_sdk::{contract, contractimpl, Address, Env, String, Vec};

pub use crate::error::ContractError;
pub use crate::types::*;

use crate::storage::Ledger;

#[contract]
pub struct FlightSurety;

#[contractimpl]
impl FlightSurety {
    /// Initialize the contract and self-register the first airline.
    ///
    /// # Arguments
    /// * `owner` - Address allowed to toggle the operational gate
    /// * `token` - Token used for funding, premiums, fees and payouts
    /// * `first_airline` - Airline admitted at deployment (still needs funding)
    /// * `first_airline_name` - Display name of the first airline
    pub fn initialize(
        env: Env,
        owner: Address,
        token: Address,
        first_airline: Address,
        first_airline_name: String,
    ) -> Result<(), ContractError> {
        let ledger = Ledger::new(&env);
        if ledger.is_initialized() {
            return Err(ContractError::AlreadyInitialized);
        }

        ledger.init(&owner, &token);
        registry::bootstrap(&ledger, first_airline, first_airline_name);

        events::initialized(&env, &owner);

        Ok(())
    }

    // -- Operational gate ---------------------------------------------------

    /// Whether mutating calls are currently accepted.
    pub fn is_operational(env: Env) -> bool {
        Ledger::new(&env).is_operational()
    }

    /// Open or close the operational gate (owner only).
    pub fn set_operational_status(
        env: Env,
        caller: Address,
        operational: bool,
    ) -> Result<(), ContractError> {
        let ledger = Ledger::new(&env);
        let owner = ledger.owner()?;

        caller.require_auth();
        if caller != owner {
            return Err(ContractError::Unauthorized);
        }

        ledger.set_operational(operational);
        events::operational_status(&env, operational);

        Ok(())
    }

    /// Address that controls the operational gate.
    pub fn get_owner(env: Env) -> Result<Address, ContractError> {
        Ledger::new(&env).owner()
    }

    // -- Airlines -----------------------------------------------------------

    /// Register an airline on behalf of an approved airline.
    ///
    /// Returns `true` when the airline was admitted immediately, `false` when
    /// it now waits for consensus votes.
    pub fn register_airline(
        env: Env,
        caller: Address,
        airline: Address,
        name: String,
    ) -> Result<bool, ContractError> {
        registry::register_airline(&Ledger::new(&env), caller, airline, name)
    }

    /// Pay `amount` toward the airline's membership funding.
    ///
    /// Returns the cumulative funding. Payments below the minimum are rejected.
    pub fn fund_airline(env: Env, airline: Address, amount: i128) -> Result<i128, ContractError> {
        registry::fund_airline(&Ledger::new(&env), airline, amount)
    }

    /// Cast an approved airline's vote for a candidate. Returns the vote count.
    pub fn vote_for_airline(
        env: Env,
        voter: Address,
        candidate: Address,
    ) -> Result<u32, ContractError> {
        registry::vote_for_airline(&Ledger::new(&env), voter, candidate)
    }

    /// Whether the airline has been admitted, by auto-admission or by vote.
    pub fn is_airline_registered(env: Env, airline: Address) -> bool {
        registry::is_registered(&Ledger::new(&env), &airline)
    }

    /// Whether the airline has paid at least the minimum funding.
    pub fn is_airline_funded(env: Env, airline: Address) -> bool {
        registry::is_funded(&Ledger::new(&env), &airline)
    }

    /// Whether the airline is both admitted and funded, and so may act.
    pub fn is_airline_approved(env: Env, airline: Address) -> bool {
        registry::is_approved(&Ledger::new(&env), &airline)
    }

    /// Full airline record, including candidates still collecting votes.
    pub fn get_airline(env: Env, airline: Address) -> Option<Airline> {
        Ledger::new(&env).airline(&airline)
    }

    /// Derived lifecycle state of an airline.
    pub fn get_airline_status(env: Env, airline: Address) -> Option<AirlineStatus> {
        Ledger::new(&env)
            .airline(&airline)
            .map(|record| record.status())
    }

    /// Number of airlines on the registry, candidates included.
    pub fn airline_count(env: Env) -> u32 {
        Ledger::new(&env).airline_count()
    }

    /// Minimum funding an airline must pay, in stroops.
    pub fn min_airline_funding(_env: Env) -> i128 {
        MIN_AIRLINE_FUNDING
    }

    // -- Insurance ----------------------------------------------------------

    /// Buy a policy for a flight, paying `premium` (at most one unit).
    pub fn buy_insurance_policy(
        env: Env,
        passenger: Address,
        airline: Address,
        flight: String,
        timestamp: u64,
        premium: i128,
    ) -> Result<(), ContractError> {
        insurance::buy_insurance_policy(
            &Ledger::new(&env),
            passenger,
            airline,
            flight,
            timestamp,
            premium,
        )
    }

    /// Policy a passenger holds on a flight, if any.
    pub fn get_policy(
        env: Env,
        passenger: Address,
        airline: Address,
        flight: String,
        timestamp: u64,
    ) -> Option<InsurancePolicy> {
        Ledger::new(&env).policy(&PolicyKey {
            passenger,
            flight: FlightKey {
                airline,
                flight,
                timestamp,
            },
        })
    }

    /// Credited payouts the passenger has not withdrawn yet.
    pub fn get_passenger_entitlement(env: Env, passenger: Address) -> i128 {
        insurance::get_passenger_entitlement(&Ledger::new(&env), &passenger)
    }

    /// Transfer the passenger's whole entitlement to them. Returns the amount.
    pub fn withdraw_insurance_claim(env: Env, passenger: Address) -> Result<i128, ContractError> {
        insurance::withdraw_insurance_claim(&Ledger::new(&env), passenger)
    }

    /// Largest premium a single policy accepts.
    pub fn max_insurance_premium(_env: Env) -> i128 {
        MAX_INSURANCE_PREMIUM
    }

    // -- Oracles ------------------------------------------------------------

    /// Register an oracle, paying at least the registration fee.
    ///
    /// Returns the three indexes assigned to the oracle.
    pub fn register_oracle(env: Env, oracle: Address, amount: i128) -> Result<Vec<u32>, ContractError> {
        oracle::register_oracle(&Ledger::new(&env), oracle, amount)
    }

    /// Fee an oracle pays to register.
    pub fn oracle_registration_fee(_env: Env) -> i128 {
        ORACLE_REGISTRATION_FEE
    }

    /// The three indexes assigned to a registered oracle.
    pub fn get_my_indexes(env: Env, oracle: Address) -> Result<Vec<u32>, ContractError> {
        oracle::get_my_indexes(&Ledger::new(&env), &oracle)
    }

    /// Number of registered oracles.
    pub fn oracle_count(env: Env) -> u32 {
        Ledger::new(&env).oracle_count()
    }

    /// Ask the oracles for a flight's status.
    ///
    /// Emits `OracleRequest` and returns the chosen index. Resolution arrives
    /// later through `submit_oracle_response`.
    pub fn fetch_flight_status(
        env: Env,
        requester: Address,
        airline: Address,
        flight: String,
        timestamp: u64,
    ) -> Result<u32, ContractError> {
        oracle::fetch_flight_status(&Ledger::new(&env), requester, airline, flight, timestamp)
    }

    /// Submit an oracle's answer to an open request.
    ///
    /// Responses that do not match an open request under one of the oracle's
    /// indexes are ignored rather than rejected.
    #[allow(clippy::too_many_arguments)]
    pub fn submit_oracle_response(
        env: Env,
        oracle: Address,
        index: u32,
        airline: Address,
        flight: String,
        timestamp: u64,
        status_code: u32,
    ) -> Result<ResponseOutcome, ContractError> {
        oracle::submit_oracle_response(
            &Ledger::new(&env),
            oracle,
            index,
            airline,
            flight,
            timestamp,
            status_code,
        )
    }

    /// Final status of a flight, once oracles reached agreement.
    pub fn get_flight_status(
        env: Env,
        airline: Address,
        flight: String,
        timestamp: u64,
    ) -> Option<FlightRecord> {
        oracle::get_flight_status(&Ledger::new(&env), airline, flight, timestamp)
    }

    /// Agreeing responses needed to resolve a request.
    pub fn min_oracle_responses(_env: Env) -> u32 {
        MIN_ORACLE_RESPONSES
    }
}
