//! Oracle coordinator.
//!
//! Each oracle holds three distinct indexes. A status request is opened under
//! one random index and only oracles holding that index may answer it, which
//! keeps any single oracle from flooding every request. Responses are
//! reduced per status code; the first code to reach
//! [`MIN_ORACLE_RESPONSES`] finalizes the request and the flight.

use soroban_sdk::{Address, Env, String, Vec};

use crate::error::ContractError;
use crate::events;
use crate::insurance;
use crate::payment;
use crate::storage::Ledger;
use crate::types::{
    is_known_status_code, FlightKey, FlightRecord, FlightStatusRequest, Oracle, RequestKey,
    ResponseOutcome, MAX_ORACLE_INDEX, MIN_ORACLE_RESPONSES, ORACLE_INDEX_COUNT,
    ORACLE_REGISTRATION_FEE, STATUS_CODE_LATE_AIRLINE,
};

fn random_index(env: &Env) -> u32 {
    env.prng().gen_range::<u64>(0..=u64::from(MAX_ORACLE_INDEX)) as u32
}

fn generate_indexes(env: &Env) -> Vec<u32> {
    let mut indexes = Vec::new(env);
    while indexes.len() < ORACLE_INDEX_COUNT {
        let candidate = random_index(env);
        if !indexes.contains(candidate) {
            indexes.push_back(candidate);
        }
    }
    indexes
}

pub fn register_oracle(
    ledger: &Ledger,
    oracle: Address,
    amount: i128,
) -> Result<Vec<u32>, ContractError> {
    ledger.require_operational()?;
    oracle.require_auth();

    if ledger.oracle(&oracle).is_some() {
        return Err(ContractError::AlreadyRegistered);
    }
    if amount < ORACLE_REGISTRATION_FEE {
        return Err(ContractError::InsufficientFee);
    }

    payment::receive(ledger, &oracle, amount)?;

    let indexes = generate_indexes(ledger.env());
    ledger.set_oracle(
        &oracle,
        &Oracle {
            indexes: indexes.clone(),
        },
    );
    ledger.set_oracle_count(ledger.oracle_count() + 1);

    events::oracle_registered(ledger.env(), &oracle);

    Ok(indexes)
}

pub fn get_my_indexes(ledger: &Ledger, oracle: &Address) -> Result<Vec<u32>, ContractError> {
    ledger
        .oracle(oracle)
        .map(|record| record.indexes)
        .ok_or(ContractError::OracleNotRegistered)
}

/// Open a status request and return the index oracles must answer under.
pub fn fetch_flight_status(
    ledger: &Ledger,
    requester: Address,
    airline: Address,
    flight: String,
    timestamp: u64,
) -> Result<u32, ContractError> {
    ledger.require_operational()?;
    requester.require_auth();

    let flight_key = FlightKey {
        airline: airline.clone(),
        flight: flight.clone(),
        timestamp,
    };
    if ledger.flight(&flight_key).is_some() {
        return Err(ContractError::InvalidState);
    }

    let index = random_index(ledger.env());
    let key = RequestKey {
        index,
        flight: flight_key,
    };

    // A request still pending under the same index keeps its responses.
    if ledger.request(&key).is_none() {
        ledger.set_request(&key, &FlightStatusRequest::open(ledger.env(), requester));
    }

    events::oracle_request(ledger.env(), index, &airline, &flight, timestamp);

    Ok(index)
}

#[allow(clippy::too_many_arguments)]
pub fn submit_oracle_response(
    ledger: &Ledger,
    oracle: Address,
    index: u32,
    airline: Address,
    flight: String,
    timestamp: u64,
    status_code: u32,
) -> Result<ResponseOutcome, ContractError> {
    ledger.require_operational()?;
    oracle.require_auth();

    let record = ledger.oracle(&oracle).ok_or(ContractError::Unauthorized)?;
    if !is_known_status_code(status_code) {
        return Err(ContractError::InvalidStatusCode);
    }

    // Everything below that fails to match is swallowed so racing oracles
    // holding stale requests never abort.
    if !record.indexes.contains(index) {
        return Ok(ResponseOutcome::Ignored);
    }

    let flight_key = FlightKey {
        airline: airline.clone(),
        flight: flight.clone(),
        timestamp,
    };
    if ledger.flight(&flight_key).is_some() {
        return Ok(ResponseOutcome::Ignored);
    }

    let key = RequestKey {
        index,
        flight: flight_key.clone(),
    };
    let Some(mut request) = ledger.request(&key) else {
        return Ok(ResponseOutcome::Ignored);
    };
    if request.resolved || request.responses.contains_key(oracle.clone()) {
        return Ok(ResponseOutcome::Ignored);
    }

    request.responses.set(oracle, status_code);
    events::oracle_report(ledger.env(), &airline, &flight, timestamp, status_code);

    if request.agreeing(status_code) < MIN_ORACLE_RESPONSES {
        ledger.set_request(&key, &request);
        return Ok(ResponseOutcome::Recorded);
    }

    request.resolved = true;
    request.status_code = status_code;
    ledger.set_request(&key, &request);

    ledger.set_flight(
        &flight_key,
        &FlightRecord {
            status_code,
            resolved_at: ledger.env().ledger().timestamp(),
        },
    );
    events::flight_status_info(ledger.env(), &airline, &flight, timestamp, status_code);

    if status_code == STATUS_CODE_LATE_AIRLINE {
        insurance::credit_flight(ledger, &flight_key)?;
    }

    Ok(ResponseOutcome::Resolved)
}

pub fn get_flight_status(
    ledger: &Ledger,
    airline: Address,
    flight: String,
    timestamp: u64,
) -> Option<FlightRecord> {
    ledger.flight(&FlightKey {
        airline,
        flight,
        timestamp,
    })
}
