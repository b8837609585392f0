//! Request and response models for the Flight Surety API

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Standard API response envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

// ===== Accounts =====

/// Role a sandbox account plays in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    Owner,
    Airline,
    Passenger,
    Oracle,
    Spare,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountInfo {
    pub index: usize,
    pub address: String,
    pub role: AccountRole,
}

// ===== Operational gate =====

#[derive(Debug, Serialize, Deserialize)]
pub struct OperationalStatus {
    pub operational: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SetOperationalRequest {
    pub caller: usize,
    pub operational: bool,
}

// ===== Airlines =====

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterAirlineRequest {
    pub caller: usize,
    pub airline: usize,
    #[validate(length(min = 1, max = 64))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct FundAirlineRequest {
    pub airline: usize,
    /// Amount in stroops
    #[validate(custom = "validate_amount")]
    pub amount: u64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct VoteRequest {
    pub voter: usize,
    pub candidate: usize,
}

/// Airline as seen through the registry reads
#[derive(Debug, Serialize, Deserialize)]
pub struct AirlineView {
    pub account: usize,
    pub address: String,
    pub name: String,
    pub status: String,
    pub registered: bool,
    pub funded: bool,
    pub approved: bool,
    pub funding: i128,
    pub votes: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegistrationResponse {
    pub admitted: bool,
    pub airline: AirlineView,
}

// ===== Insurance =====

#[derive(Debug, Deserialize, Validate)]
pub struct BuyInsuranceRequest {
    pub passenger: usize,
    pub airline: usize,
    #[validate(length(min = 1, max = 32))]
    pub flight: String,
    pub timestamp: u64,
    /// Premium in stroops
    #[validate(custom = "validate_amount")]
    pub premium: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PolicyView {
    pub passenger: usize,
    pub airline: usize,
    pub flight: String,
    pub timestamp: u64,
    pub premium: i128,
    pub payout: i128,
    pub credited: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EntitlementResponse {
    pub account: usize,
    pub amount: i128,
}

// ===== Flight status =====

#[derive(Debug, Deserialize, Validate)]
pub struct FetchFlightStatusRequest {
    pub requester: usize,
    pub airline: usize,
    #[validate(length(min = 1, max = 32))]
    pub flight: String,
    pub timestamp: u64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct FlightStatusQuery {
    pub airline: usize,
    #[validate(length(min = 1, max = 32))]
    pub flight: String,
    pub timestamp: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FetchFlightStatusResponse {
    pub request_id: Uuid,
    pub index: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FlightStatusView {
    pub airline: usize,
    pub flight: String,
    pub timestamp: u64,
    pub resolved: bool,
    pub status_code: Option<u32>,
    pub status: Option<String>,
    /// RFC 3339 ledger time of resolution
    pub resolved_at: Option<String>,
}

// ===== Oracles =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleView {
    pub account: usize,
    pub address: String,
    pub indexes: Vec<u32>,
}

/// Human-readable label for a flight status code
pub fn status_label(code: u32) -> &'static str {
    match code {
        flight_surety::STATUS_CODE_ON_TIME => "on_time",
        flight_surety::STATUS_CODE_LATE_AIRLINE => "late_airline",
        flight_surety::STATUS_CODE_LATE_WEATHER => "late_weather",
        flight_surety::STATUS_CODE_LATE_TECHNICAL => "late_technical",
        flight_surety::STATUS_CODE_LATE_OTHER => "late_other",
        _ => "unknown",
    }
}

fn validate_amount(amount: u64) -> Result<(), ValidationError> {
    if amount == 0 {
        return Err(ValidationError::new("amount_must_be_positive"));
    }
    Ok(())
}
