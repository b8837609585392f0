//! Airline registry and consensus voting.
//!
//! The first [`AUTO_ADMIT_LIMIT`] airlines are admitted on registration. Every
//! later airline is registered as a candidate and admitted once
//! `ceil(registered / 2)` approved airlines have voted for it. The threshold is
//! recomputed against the current registered count at each vote, so a
//! candidate's bar rises as more airlines register while it waits.

use soroban_sdk::{Address, String};

use crate::error::ContractError;
use crate::events;
use crate::payment;
use crate::storage::Ledger;
use crate::types::{Airline, AUTO_ADMIT_LIMIT, MIN_AIRLINE_FUNDING};

/// Votes needed to admit a candidate when `registered` airlines exist.
pub fn consensus_threshold(registered: u32) -> u32 {
    registered.div_ceil(2)
}

/// Register the deployment's first airline. Only called from `initialize`.
pub fn bootstrap(ledger: &Ledger, airline: Address, name: String) {
    let record = Airline::new(ledger.env(), airline, name, true);
    ledger.set_airline(&record);
    ledger.set_airline_count(1);
    events::airline_registered(ledger.env(), &record.address, true);
}

/// Returns whether the new airline was admitted without consensus.
pub fn register_airline(
    ledger: &Ledger,
    caller: Address,
    airline: Address,
    name: String,
) -> Result<bool, ContractError> {
    ledger.require_operational()?;
    caller.require_auth();

    let sponsor = ledger.airline(&caller).ok_or(ContractError::Unauthorized)?;
    if !sponsor.is_approved() {
        return Err(ContractError::Unauthorized);
    }

    if ledger.airline(&airline).is_some() {
        return Err(ContractError::AlreadyRegistered);
    }

    let registered = ledger.airline_count();
    let admitted = registered < AUTO_ADMIT_LIMIT;

    let record = Airline::new(ledger.env(), airline, name, admitted);
    ledger.set_airline(&record);
    ledger.set_airline_count(registered + 1);

    events::airline_registered(ledger.env(), &record.address, admitted);

    Ok(admitted)
}

/// Returns the airline's cumulative funding after this payment.
pub fn fund_airline(ledger: &Ledger, airline: Address, amount: i128) -> Result<i128, ContractError> {
    ledger.require_operational()?;
    airline.require_auth();

    let mut record = ledger.airline(&airline).ok_or(ContractError::InvalidState)?;

    if amount < MIN_AIRLINE_FUNDING {
        return Err(ContractError::InsufficientFunds);
    }

    payment::receive(ledger, &airline, amount)?;

    let was_approved = record.is_approved();
    record.funding = record
        .funding
        .checked_add(amount)
        .ok_or(ContractError::InvalidAmount)?;
    ledger.set_airline(&record);

    events::airline_funded(ledger.env(), &airline, amount, record.funding);
    if !was_approved && record.is_approved() {
        events::airline_approved(ledger.env(), &airline);
    }

    Ok(record.funding)
}

/// Returns the candidate's vote count after this vote.
pub fn vote_for_airline(
    ledger: &Ledger,
    voter: Address,
    candidate: Address,
) -> Result<u32, ContractError> {
    ledger.require_operational()?;
    voter.require_auth();

    let ballot_holder = ledger.airline(&voter).ok_or(ContractError::Unauthorized)?;
    if !ballot_holder.is_approved() {
        return Err(ContractError::Unauthorized);
    }

    let mut record = ledger
        .airline(&candidate)
        .ok_or(ContractError::AirlineNotFound)?;
    if record.admitted {
        return Err(ContractError::InvalidState);
    }
    if record.votes.contains(&voter) {
        return Err(ContractError::DuplicateVote);
    }

    record.votes.push_back(voter.clone());
    let votes = record.votes.len();

    if votes >= consensus_threshold(ledger.airline_count()) {
        record.admitted = true;
    }
    ledger.set_airline(&record);

    events::airline_voted(ledger.env(), &candidate, &voter, votes);
    if record.is_approved() {
        events::airline_approved(ledger.env(), &candidate);
    }

    Ok(votes)
}

pub fn is_registered(ledger: &Ledger, airline: &Address) -> bool {
    ledger.airline(airline).is_some()
}

pub fn is_funded(ledger: &Ledger, airline: &Address) -> bool {
    ledger
        .airline(airline)
        .map(|record| record.is_funded())
        .unwrap_or(false)
}

pub fn is_approved(ledger: &Ledger, airline: &Address) -> bool {
    ledger
        .airline(airline)
        .map(|record| record.is_approved())
        .unwrap_or(false)
}

#[cfg(test)]
mod test {
    use super::consensus_threshold;

    #[test]
    fn test_threshold_rounds_up() {
        assert_eq!(consensus_threshold(4), 2);
        assert_eq!(consensus_threshold(5), 3);
        assert_eq!(consensus_threshold(6), 3);
        assert_eq!(consensus_threshold(7), 4);
    }
}
