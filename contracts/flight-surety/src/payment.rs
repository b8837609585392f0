//! Token movements for payable operations.
//!
//! A payable call carries an explicit amount which is pulled from the payer
//! inside the same invocation, so any later error reverts the transfer too.

use soroban_sdk::{token, Address};

use crate::error::ContractError;
use crate::storage::Ledger;

/// Pull `amount` from `from` into the contract.
pub fn receive(ledger: &Ledger, from: &Address, amount: i128) -> Result<(), ContractError> {
    let env = ledger.env();
    let token_client = token::Client::new(env, &ledger.token()?);
    token_client.transfer(from, &env.current_contract_address(), &amount);
    Ok(())
}

/// Pay `amount` out of the contract to `to`.
pub fn send(ledger: &Ledger, to: &Address, amount: i128) -> Result<(), ContractError> {
    let env = ledger.env();
    let token_client = token::Client::new(env, &ledger.token()?);
    token_client.transfer(&env.current_contract_address(), to, &amount);
    Ok(())
}
