//! Policy ledger: purchases, payouts and withdrawals.

use soroban_sdk::{Address, String};

use crate::error::ContractError;
use crate::events;
use crate::payment;
use crate::storage::Ledger;
use crate::types::{
    FlightKey, InsurancePolicy, PolicyKey, MAX_INSURANCE_PREMIUM, PAYOUT_DENOMINATOR,
    PAYOUT_NUMERATOR,
};

pub fn buy_insurance_policy(
    ledger: &Ledger,
    passenger: Address,
    airline: Address,
    flight: String,
    timestamp: u64,
    premium: i128,
) -> Result<(), ContractError> {
    ledger.require_operational()?;
    passenger.require_auth();

    let insurable = ledger
        .airline(&airline)
        .map(|record| record.is_approved())
        .unwrap_or(false);
    if !insurable {
        return Err(ContractError::InvalidAirline);
    }

    if premium <= 0 {
        return Err(ContractError::InvalidAmount);
    }
    if premium > MAX_INSURANCE_PREMIUM {
        return Err(ContractError::PremiumTooHigh);
    }

    let flight_key = FlightKey {
        airline: airline.clone(),
        flight: flight.clone(),
        timestamp,
    };
    if ledger.flight(&flight_key).is_some() {
        return Err(ContractError::InvalidState);
    }

    let policy_key = PolicyKey {
        passenger: passenger.clone(),
        flight: flight_key.clone(),
    };
    if ledger.policy(&policy_key).is_some() {
        return Err(ContractError::AlreadyExists);
    }

    payment::receive(ledger, &passenger, premium)?;

    let policy = InsurancePolicy {
        passenger: passenger.clone(),
        airline: airline.clone(),
        flight: flight.clone(),
        timestamp,
        premium,
        payout: 0,
        credited: false,
    };
    ledger.set_policy(&policy_key, &policy);

    let mut passengers = ledger.flight_passengers(&flight_key);
    passengers.push_back(passenger.clone());
    ledger.set_flight_passengers(&flight_key, &passengers);

    events::policy_purchased(ledger.env(), &passenger, &airline, &flight, timestamp, premium);

    Ok(())
}

pub fn payout_for(premium: i128) -> i128 {
    premium * PAYOUT_NUMERATOR / PAYOUT_DENOMINATOR
}

/// Credit every uncredited policy on a flight that was late due to the
/// airline. Returns the number of policies credited.
pub fn credit_flight(ledger: &Ledger, flight: &FlightKey) -> Result<u32, ContractError> {
    let mut credited = 0;

    for passenger in ledger.flight_passengers(flight).iter() {
        let key = PolicyKey {
            passenger: passenger.clone(),
            flight: flight.clone(),
        };
        let Some(mut policy) = ledger.policy(&key) else {
            continue;
        };
        if policy.credited {
            continue;
        }

        let payout = payout_for(policy.premium);
        let balance = ledger
            .entitlement(&passenger)
            .checked_add(payout)
            .ok_or(ContractError::InvalidAmount)?;

        policy.payout = payout;
        policy.credited = true;
        ledger.set_policy(&key, &policy);
        ledger.set_entitlement(&passenger, balance);

        events::policy_credited(ledger.env(), &passenger, payout);
        credited += 1;
    }

    Ok(credited)
}

/// Pay out and zero the passenger's entitlement. Returns the amount paid.
pub fn withdraw_insurance_claim(ledger: &Ledger, passenger: Address) -> Result<i128, ContractError> {
    ledger.require_operational()?;
    passenger.require_auth();

    if ledger.withdrawal_in_flight(&passenger) {
        return Err(ContractError::ReentrancyRejected);
    }

    let balance = ledger.entitlement(&passenger);
    if balance <= 0 {
        return Err(ContractError::NoBalance);
    }

    // Balance is zeroed before the transfer leaves the contract.
    ledger.lock_withdrawal(&passenger);
    ledger.set_entitlement(&passenger, 0);
    payment::send(ledger, &passenger, balance)?;
    ledger.unlock_withdrawal(&passenger);

    events::claim_withdrawn(ledger.env(), &passenger, balance);

    Ok(balance)
}

pub fn get_passenger_entitlement(ledger: &Ledger, passenger: &Address) -> i128 {
    ledger.entitlement(passenger)
}
