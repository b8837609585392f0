use soroban_sdk::{contracttype, Address, Env, Map, String, Vec};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// One whole unit of the payment token (7 decimals, as for XLM).
pub const UNIT: i128 = 10_000_000;

/// Minimum contribution that turns a registered airline into a funded one.
pub const MIN_AIRLINE_FUNDING: i128 = 10 * UNIT;
/// Cap on the premium paid for a single policy.
pub const MAX_INSURANCE_PREMIUM: i128 = UNIT;
pub const ORACLE_REGISTRATION_FEE: i128 = UNIT;

/// Airlines admitted without consensus. The next registration needs votes.
pub const AUTO_ADMIT_LIMIT: u32 = 4;

/// Payout is `premium * PAYOUT_NUMERATOR / PAYOUT_DENOMINATOR` (1.5x).
pub const PAYOUT_NUMERATOR: i128 = 3;
pub const PAYOUT_DENOMINATOR: i128 = 2;

/// Matching responses needed to finalize a flight status.
pub const MIN_ORACLE_RESPONSES: u32 = 3;
/// Indexes are drawn from `0..=MAX_ORACLE_INDEX`.
pub const MAX_ORACLE_INDEX: u32 = 9;
pub const ORACLE_INDEX_COUNT: u32 = 3;

pub const STATUS_CODE_UNKNOWN: u32 = 0;
pub const STATUS_CODE_ON_TIME: u32 = 10;
pub const STATUS_CODE_LATE_AIRLINE: u32 = 20;
pub const STATUS_CODE_LATE_WEATHER: u32 = 30;
pub const STATUS_CODE_LATE_TECHNICAL: u32 = 40;
pub const STATUS_CODE_LATE_OTHER: u32 = 50;

pub fn is_known_status_code(code: u32) -> bool {
    matches!(
        code,
        STATUS_CODE_UNKNOWN
            | STATUS_CODE_ON_TIME
            | STATUS_CODE_LATE_AIRLINE
            | STATUS_CODE_LATE_WEATHER
            | STATUS_CODE_LATE_TECHNICAL
            | STATUS_CODE_LATE_OTHER
    )
}

// ---------------------------------------------------------------------------
// Airlines
// ---------------------------------------------------------------------------

/// Lifecycle state derived from an [`Airline`] record.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AirlineStatus {
    /// Registered past the auto-admit limit, waiting for votes, unfunded.
    Proposed = 0,
    /// Admitted but not yet funded.
    Registered = 1,
    /// Funded but still waiting for consensus.
    Funded = 2,
    /// Admitted and funded. Only approved airlines can act.
    Approved = 3,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Airline {
    pub address: Address,
    pub name: String,
    /// Set on automatic admission or once consensus is reached.
    pub admitted: bool,
    /// Cumulative contribution in token base units.
    pub funding: i128,
    pub votes: Vec<Address>,
}

impl Airline {
    pub fn new(env: &Env, address: Address, name: String, admitted: bool) -> Self {
        Self {
            address,
            name,
            admitted,
            funding: 0,
            votes: Vec::new(env),
        }
    }

    pub fn is_funded(&self) -> bool {
        self.funding >= MIN_AIRLINE_FUNDING
    }

    pub fn is_approved(&self) -> bool {
        self.admitted && self.is_funded()
    }

    pub fn status(&self) -> AirlineStatus {
        match (self.admitted, self.is_funded()) {
            (true, true) => AirlineStatus::Approved,
            (false, true) => AirlineStatus::Funded,
            (true, false) => AirlineStatus::Registered,
            (false, false) => AirlineStatus::Proposed,
        }
    }
}

// ---------------------------------------------------------------------------
// Flights and policies
// ---------------------------------------------------------------------------

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FlightKey {
    pub airline: Address,
    pub flight: String,
    pub timestamp: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PolicyKey {
    pub passenger: Address,
    pub flight: FlightKey,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InsurancePolicy {
    pub passenger: Address,
    pub airline: Address,
    pub flight: String,
    pub timestamp: u64,
    pub premium: i128,
    /// Zero until the flight resolves as late due to the airline.
    pub payout: i128,
    pub credited: bool,
}

/// Final status of a flight, written once by the first request to resolve.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FlightRecord {
    pub status_code: u32,
    pub resolved_at: u64,
}

// ---------------------------------------------------------------------------
// Oracles
// ---------------------------------------------------------------------------

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Oracle {
    pub indexes: Vec<u32>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RequestKey {
    pub index: u32,
    pub flight: FlightKey,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FlightStatusRequest {
    pub requester: Address,
    /// Oracle -> submitted status code.
    pub responses: Map<Address, u32>,
    pub resolved: bool,
    pub status_code: u32,
}

impl FlightStatusRequest {
    pub fn open(env: &Env, requester: Address) -> Self {
        Self {
            requester,
            responses: Map::new(env),
            resolved: false,
            status_code: STATUS_CODE_UNKNOWN,
        }
    }

    /// Number of recorded responses agreeing on `status_code`.
    pub fn agreeing(&self, status_code: u32) -> u32 {
        self.responses
            .values()
            .iter()
            .filter(|code| *code == status_code)
            .count() as u32
    }
}

/// What happened to a submitted oracle response.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResponseOutcome {
    /// Unmatched index, unknown or resolved request, or a repeat submission.
    Ignored = 0,
    Recorded = 1,
    /// This response completed the quorum.
    Resolved = 2,
}

// ---------------------------------------------------------------------------
// Storage keys
// ---------------------------------------------------------------------------

#[contracttype]
#[derive(Clone, Debug)]
pub enum DataKey {
    Owner,
    Token,
    Operational,
    AirlineCount,
    OracleCount,
    Airline(Address),
    Policy(PolicyKey),
    FlightPassengers(FlightKey),
    Flight(FlightKey),
    Entitlement(Address),
    Oracle(Address),
    Request(RequestKey),
    WithdrawLock(Address),
}
