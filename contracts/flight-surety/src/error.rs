use soroban_sdk::contracterror;

/// Contract errors
///
/// Codes are stable: off-chain callers match on the numeric value carried in
/// `Error(Contract, #N)`.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ContractError {
    /// Caller lacks the role or lifecycle state the operation requires.
    Unauthorized = 1,
    AlreadyInitialized = 2,
    NotInitialized = 3,
    /// Operational gate is closed.
    ContractPaused = 4,
    AlreadyRegistered = 5,
    AirlineNotFound = 6,
    /// Operation attempted outside the required lifecycle stage.
    InvalidState = 7,
    InsufficientFunds = 8,
    InsufficientFee = 9,
    DuplicateVote = 10,
    /// Airline cannot be insured against (not approved).
    InvalidAirline = 11,
    InvalidAmount = 12,
    PremiumTooHigh = 13,
    AlreadyExists = 14,
    NoBalance = 15,
    ReentrancyRejected = 16,
    OracleNotRegistered = 17,
    InvalidStatusCode = 18,
}
