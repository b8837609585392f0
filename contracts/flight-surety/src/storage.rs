//! Data layer.
//!
//! [`Ledger`] is the single owner of every storage key the contract uses.
//! Component modules receive it by reference and never touch `env.storage()`
//! directly, so the layout of instance, persistent and temporary entries is
//! decided here and nowhere else.

use soroban_sdk::{Address, Env, Vec};

use crate::error::ContractError;
use crate::types::{
    Airline, DataKey, FlightKey, FlightRecord, FlightStatusRequest, InsurancePolicy, Oracle,
    PolicyKey, RequestKey,
};

const DAY_IN_LEDGERS: u32 = 17_280;

const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = INSTANCE_BUMP_AMOUNT - DAY_IN_LEDGERS;

const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = PERSISTENT_BUMP_AMOUNT - DAY_IN_LEDGERS;

/// Pending flight-status requests expire after about a day; an expired
/// request reads as unknown and late responses to it are ignored.
pub const REQUEST_TTL_LEDGERS: u32 = DAY_IN_LEDGERS;

pub struct Ledger<'a> {
    env: &'a Env,
}

impl<'a> Ledger<'a> {
    pub fn new(env: &'a Env) -> Self {
        Self { env }
    }

    pub fn env(&self) -> &'a Env {
        self.env
    }

    // -- Configuration ------------------------------------------------------

    pub fn is_initialized(&self) -> bool {
        self.env.storage().instance().has(&DataKey::Owner)
    }

    pub fn init(&self, owner: &Address, token: &Address) {
        let instance = self.env.storage().instance();
        instance.set(&DataKey::Owner, owner);
        instance.set(&DataKey::Token, token);
        instance.set(&DataKey::Operational, &true);
        instance.set(&DataKey::AirlineCount, &0u32);
        instance.set(&DataKey::OracleCount, &0u32);
        self.bump_instance();
    }

    pub fn owner(&self) -> Result<Address, ContractError> {
        self.env
            .storage()
            .instance()
            .get(&DataKey::Owner)
            .ok_or(ContractError::NotInitialized)
    }

    pub fn token(&self) -> Result<Address, ContractError> {
        self.env
            .storage()
            .instance()
            .get(&DataKey::Token)
            .ok_or(ContractError::NotInitialized)
    }

    // -- Operational gate ---------------------------------------------------

    pub fn is_operational(&self) -> bool {
        self.env
            .storage()
            .instance()
            .get(&DataKey::Operational)
            .unwrap_or(false)
    }

    pub fn set_operational(&self, operational: bool) {
        self.env
            .storage()
            .instance()
            .set(&DataKey::Operational, &operational);
        self.bump_instance();
    }

    /// Guard run first by every mutating operation.
    pub fn require_operational(&self) -> Result<(), ContractError> {
        if !self.is_initialized() {
            return Err(ContractError::NotInitialized);
        }
        if !self.is_operational() {
            return Err(ContractError::ContractPaused);
        }
        self.bump_instance();
        Ok(())
    }

    // -- Airlines -----------------------------------------------------------

    pub fn airline(&self, address: &Address) -> Option<Airline> {
        self.env
            .storage()
            .persistent()
            .get(&DataKey::Airline(address.clone()))
    }

    pub fn set_airline(&self, airline: &Airline) {
        let key = DataKey::Airline(airline.address.clone());
        self.env.storage().persistent().set(&key, airline);
        self.bump_persistent(&key);
    }

    pub fn airline_count(&self) -> u32 {
        self.env
            .storage()
            .instance()
            .get(&DataKey::AirlineCount)
            .unwrap_or(0)
    }

    pub fn set_airline_count(&self, count: u32) {
        self.env
            .storage()
            .instance()
            .set(&DataKey::AirlineCount, &count);
    }

    // -- Policies -----------------------------------------------------------

    pub fn policy(&self, key: &PolicyKey) -> Option<InsurancePolicy> {
        self.env
            .storage()
            .persistent()
            .get(&DataKey::Policy(key.clone()))
    }

    pub fn set_policy(&self, key: &PolicyKey, policy: &InsurancePolicy) {
        let key = DataKey::Policy(key.clone());
        self.env.storage().persistent().set(&key, policy);
        self.bump_persistent(&key);
    }

    /// Passengers holding a policy on the flight, in purchase order.
    pub fn flight_passengers(&self, flight: &FlightKey) -> Vec<Address> {
        self.env
            .storage()
            .persistent()
            .get(&DataKey::FlightPassengers(flight.clone()))
            .unwrap_or_else(|| Vec::new(self.env))
    }

    pub fn set_flight_passengers(&self, flight: &FlightKey, passengers: &Vec<Address>) {
        let key = DataKey::FlightPassengers(flight.clone());
        self.env.storage().persistent().set(&key, passengers);
        self.bump_persistent(&key);
    }

    pub fn flight(&self, flight: &FlightKey) -> Option<FlightRecord> {
        self.env
            .storage()
            .persistent()
            .get(&DataKey::Flight(flight.clone()))
    }

    pub fn set_flight(&self, flight: &FlightKey, record: &FlightRecord) {
        let key = DataKey::Flight(flight.clone());
        self.env.storage().persistent().set(&key, record);
        self.bump_persistent(&key);
    }

    pub fn entitlement(&self, passenger: &Address) -> i128 {
        self.env
            .storage()
            .persistent()
            .get(&DataKey::Entitlement(passenger.clone()))
            .unwrap_or(0)
    }

    pub fn set_entitlement(&self, passenger: &Address, amount: i128) {
        let key = DataKey::Entitlement(passenger.clone());
        self.env.storage().persistent().set(&key, &amount);
        self.bump_persistent(&key);
    }

    pub fn withdrawal_in_flight(&self, passenger: &Address) -> bool {
        self.env
            .storage()
            .temporary()
            .has(&DataKey::WithdrawLock(passenger.clone()))
    }

    pub fn lock_withdrawal(&self, passenger: &Address) {
        self.env
            .storage()
            .temporary()
            .set(&DataKey::WithdrawLock(passenger.clone()), &true);
    }

    pub fn unlock_withdrawal(&self, passenger: &Address) {
        self.env
            .storage()
            .temporary()
            .remove(&DataKey::WithdrawLock(passenger.clone()));
    }

    // -- Oracles ------------------------------------------------------------

    pub fn oracle(&self, address: &Address) -> Option<Oracle> {
        self.env
            .storage()
            .persistent()
            .get(&DataKey::Oracle(address.clone()))
    }

    pub fn set_oracle(&self, address: &Address, oracle: &Oracle) {
        let key = DataKey::Oracle(address.clone());
        self.env.storage().persistent().set(&key, oracle);
        self.bump_persistent(&key);
    }

    pub fn oracle_count(&self) -> u32 {
        self.env
            .storage()
            .instance()
            .get(&DataKey::OracleCount)
            .unwrap_or(0)
    }

    pub fn set_oracle_count(&self, count: u32) {
        self.env
            .storage()
            .instance()
            .set(&DataKey::OracleCount, &count);
    }

    pub fn request(&self, key: &RequestKey) -> Option<FlightStatusRequest> {
        self.env
            .storage()
            .temporary()
            .get(&DataKey::Request(key.clone()))
    }

    /// Requests live in temporary storage; each write restarts the TTL.
    pub fn set_request(&self, key: &RequestKey, request: &FlightStatusRequest) {
        let key = DataKey::Request(key.clone());
        let temporary = self.env.storage().temporary();
        temporary.set(&key, request);
        temporary.extend_ttl(&key, REQUEST_TTL_LEDGERS, REQUEST_TTL_LEDGERS);
    }

    // -- TTL ----------------------------------------------------------------

    fn bump_instance(&self) {
        self.env
            .storage()
            .instance()
            .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
    }

    fn bump_persistent(&self, key: &DataKey) {
        self.env.storage().persistent().extend_ttl(
            key,
            PERSISTENT_LIFETIME_THRESHOLD,
            PERSISTENT_BUMP_AMOUNT,
        );
    }
}
