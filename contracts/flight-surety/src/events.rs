//! Published contract events.
//!
//! Off-chain collaborators (the dapp and the oracle server) observe the
//! contract only through these topics and the read-only calls.

use soroban_sdk::{symbol_short, Address, Env, String, Symbol};

pub const INITIALIZED: Symbol = symbol_short!("init");
pub const OPERATIONAL_STATUS: Symbol = symbol_short!("op_status");
pub const AIRLINE_REGISTERED: Symbol = symbol_short!("air_reg");
pub const AIRLINE_FUNDED: Symbol = symbol_short!("air_fund");
pub const AIRLINE_VOTED: Symbol = symbol_short!("air_vote");
pub const AIRLINE_APPROVED: Symbol = symbol_short!("air_appr");
pub const POLICY_PURCHASED: Symbol = symbol_short!("pol_buy");
pub const POLICY_CREDITED: Symbol = symbol_short!("pol_cred");
pub const CLAIM_WITHDRAWN: Symbol = symbol_short!("withdraw");
pub const ORACLE_REGISTERED: Symbol = symbol_short!("orc_reg");
/// `OracleRequest(index, airline, flight, timestamp)`
pub const ORACLE_REQUEST: Symbol = symbol_short!("orc_req");
/// `OracleReport(airline, flight, timestamp, status)`
pub const ORACLE_REPORT: Symbol = symbol_short!("orc_rep");
/// `FlightStatusInfo(airline, flight, timestamp, status)`
pub const FLIGHT_STATUS_INFO: Symbol = symbol_short!("flt_stat");

pub fn initialized(env: &Env, owner: &Address) {
    env.events().publish((INITIALIZED,), (owner.clone(),));
}

pub fn operational_status(env: &Env, operational: bool) {
    env.events().publish((OPERATIONAL_STATUS,), (operational,));
}

pub fn airline_registered(env: &Env, airline: &Address, admitted: bool) {
    env.events()
        .publish((AIRLINE_REGISTERED,), (airline.clone(), admitted));
}

pub fn airline_funded(env: &Env, airline: &Address, amount: i128, funding: i128) {
    env.events()
        .publish((AIRLINE_FUNDED,), (airline.clone(), amount, funding));
}

pub fn airline_voted(env: &Env, candidate: &Address, voter: &Address, votes: u32) {
    env.events().publish(
        (AIRLINE_VOTED,),
        (candidate.clone(), voter.clone(), votes),
    );
}

pub fn airline_approved(env: &Env, airline: &Address) {
    env.events().publish((AIRLINE_APPROVED,), (airline.clone(),));
}

pub fn policy_purchased(
    env: &Env,
    passenger: &Address,
    airline: &Address,
    flight: &String,
    timestamp: u64,
    premium: i128,
) {
    env.events().publish(
        (POLICY_PURCHASED,),
        (
            passenger.clone(),
            airline.clone(),
            flight.clone(),
            timestamp,
            premium,
        ),
    );
}

pub fn policy_credited(env: &Env, passenger: &Address, payout: i128) {
    env.events()
        .publish((POLICY_CREDITED,), (passenger.clone(), payout));
}

pub fn claim_withdrawn(env: &Env, passenger: &Address, amount: i128) {
    env.events()
        .publish((CLAIM_WITHDRAWN,), (passenger.clone(), amount));
}

pub fn oracle_registered(env: &Env, oracle: &Address) {
    env.events().publish((ORACLE_REGISTERED,), (oracle.clone(),));
}

pub fn oracle_request(env: &Env, index: u32, airline: &Address, flight: &String, timestamp: u64) {
    env.events().publish(
        (ORACLE_REQUEST,),
        (index, airline.clone(), flight.clone(), timestamp),
    );
}

pub fn oracle_report(
    env: &Env,
    airline: &Address,
    flight: &String,
    timestamp: u64,
    status_code: u32,
) {
    env.events().publish(
        (ORACLE_REPORT,),
        (airline.clone(), flight.clone(), timestamp, status_code),
    );
}

pub fn flight_status_info(
    env: &Env,
    airline: &Address,
    flight: &String,
    timestamp: u64,
    status_code: u32,
) {
    env.events().publish(
        (FLIGHT_STATUS_INFO,),
        (airline.clone(), flight.clone(), timestamp, status_code),
    );
}
