//! API error type and its HTTP mapping

use std::fmt::Debug;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use flight_surety::ContractError;
use thiserror::Error;

use crate::models::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("contract rejected the call: {0:?}")]
    Contract(ContractError),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unknown sandbox account {0}")]
    UnknownAccount(usize),

    #[error("{0} not found")]
    NotFound(String),

    #[error("sandbox ledger is unavailable")]
    LedgerUnavailable,

    #[error("sandbox ledger failed: {0}")]
    Host(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Contract(error) => contract_status(*error),
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::UnknownAccount(_) | ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::LedgerUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Host(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn contract_status(error: ContractError) -> StatusCode {
    use ContractError::*;

    match error {
        Unauthorized => StatusCode::FORBIDDEN,
        NotInitialized | ContractPaused => StatusCode::SERVICE_UNAVAILABLE,
        AirlineNotFound | OracleNotRegistered => StatusCode::NOT_FOUND,
        AlreadyInitialized | AlreadyRegistered | AlreadyExists | DuplicateVote | InvalidState
        | ReentrancyRejected => StatusCode::CONFLICT,
        InsufficientFunds | InsufficientFee | InvalidAirline | InvalidAmount | PremiumTooHigh
        | NoBalance | InvalidStatusCode => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

impl From<ContractError> for ApiError {
    fn from(error: ContractError) -> Self {
        ApiError::Contract(error)
    }
}

impl From<soroban_sdk::Error> for ApiError {
    fn from(error: soroban_sdk::Error) -> Self {
        ApiError::Host(format!("{:?}", error))
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(errors.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(self.to_string()),
        };
        (status, Json(body)).into_response()
    }
}

/// Unwrap the nested result of a generated `try_*` contract call.
///
/// Calls that return a `Result` surface `ContractError`s; plain reads surface
/// host errors only.
pub fn settle<T, C, E, I>(outcome: Result<Result<T, C>, Result<E, I>>) -> Result<T, ApiError>
where
    C: Debug,
    E: Into<ApiError>,
    I: Debug,
{
    match outcome {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(conversion)) => Err(ApiError::Host(format!(
            "unexpected return value: {:?}",
            conversion
        ))),
        Err(Ok(error)) => Err(error.into()),
        Err(Err(invoke)) => Err(ApiError::Host(format!("{:?}", invoke))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soroban_sdk::InvokeError;

    #[test]
    fn contract_errors_map_to_http_statuses() {
        assert_eq!(
            ApiError::from(ContractError::Unauthorized).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(ContractError::ContractPaused).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(ContractError::DuplicateVote).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(ContractError::PremiumTooHigh).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::from(ContractError::AirlineNotFound).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn settle_passes_values_and_contract_errors() {
        let ok: Result<Result<u32, ()>, Result<ContractError, InvokeError>> = Ok(Ok(7));
        assert_eq!(settle(ok).unwrap(), 7);

        let rejected: Result<Result<u32, ()>, Result<ContractError, InvokeError>> =
            Err(Ok(ContractError::NoBalance));
        assert!(matches!(
            settle(rejected),
            Err(ApiError::Contract(ContractError::NoBalance))
        ));
    }
}
