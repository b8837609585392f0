//! API handlers for the Flight Surety dapp
//!
//! Every handler validates its input, then runs one job on the sandbox ledger
//! thread. Accounts are addressed by their sandbox index.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use flight_surety::AirlineStatus;
use serde_json::{json, Value};
use tracing::info;
use validator::Validate;

use crate::error::{settle, ApiError};
use crate::models::{
    status_label, AccountInfo, AirlineView, ApiResponse, BuyInsuranceRequest,
    EntitlementResponse, FetchFlightStatusRequest, FetchFlightStatusResponse, FlightStatusQuery,
    FlightStatusView, FundAirlineRequest, OperationalStatus, OracleView, PolicyView,
    RegisterAirlineRequest, RegistrationResponse, SetOperationalRequest, VoteRequest,
};
use crate::oracle_pool::OraclePool;
use crate::sandbox::{host_string, strkey, Chain, LedgerHandle};

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

pub async fn api_root() -> Json<Value> {
    Json(json!({ "message": "An API for use with your Dapp!" }))
}

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn list_accounts(State(ledger): State<LedgerHandle>) -> ApiResult<Vec<AccountInfo>> {
    Ok(Json(ApiResponse::ok(ledger.accounts().to_vec())))
}

// ===== Operational gate =====

pub async fn get_operational(State(ledger): State<LedgerHandle>) -> ApiResult<OperationalStatus> {
    let operational = ledger
        .run(|chain| settle(chain.contract().try_is_operational()))
        .await?;

    Ok(Json(ApiResponse::ok(OperationalStatus { operational })))
}

pub async fn set_operational(
    State(ledger): State<LedgerHandle>,
    Json(request): Json<SetOperationalRequest>,
) -> ApiResult<OperationalStatus> {
    let operational = ledger
        .run(move |chain| {
            let caller = chain.account(request.caller)?;
            settle(
                chain
                    .contract()
                    .try_set_operational_status(&caller, &request.operational),
            )?;
            settle(chain.contract().try_is_operational())
        })
        .await?;

    info!(operational, "operational status changed");
    Ok(Json(ApiResponse::ok(OperationalStatus { operational })))
}

// ===== Airlines =====

pub async fn register_airline(
    State(ledger): State<LedgerHandle>,
    Json(request): Json<RegisterAirlineRequest>,
) -> ApiResult<RegistrationResponse> {
    request.validate()?;

    let response = ledger
        .run(move |chain| {
            let caller = chain.account(request.caller)?;
            let airline = chain.account(request.airline)?;
            let admitted = settle(chain.contract().try_register_airline(
                &caller,
                &airline,
                &chain.string(&request.name),
            ))?;

            Ok(RegistrationResponse {
                admitted,
                airline: airline_view(chain, request.airline)?,
            })
        })
        .await?;

    info!(
        airline = response.airline.account,
        admitted = response.admitted,
        "airline registered"
    );
    Ok(Json(ApiResponse::ok(response)))
}

pub async fn fund_airline(
    State(ledger): State<LedgerHandle>,
    Json(request): Json<FundAirlineRequest>,
) -> ApiResult<AirlineView> {
    request.validate()?;

    let view = ledger
        .run(move |chain| {
            let airline = chain.account(request.airline)?;
            settle(
                chain
                    .contract()
                    .try_fund_airline(&airline, &i128::from(request.amount)),
            )?;
            airline_view(chain, request.airline)
        })
        .await?;

    info!(airline = view.account, funding = %view.funding, "airline funded");
    Ok(Json(ApiResponse::ok(view)))
}

pub async fn vote_for_airline(
    State(ledger): State<LedgerHandle>,
    Json(request): Json<VoteRequest>,
) -> ApiResult<AirlineView> {
    let view = ledger
        .run(move |chain| {
            let voter = chain.account(request.voter)?;
            let candidate = chain.account(request.candidate)?;
            settle(chain.contract().try_vote_for_airline(&voter, &candidate))?;
            airline_view(chain, request.candidate)
        })
        .await?;

    info!(
        candidate = view.account,
        votes = view.votes,
        approved = view.approved,
        "airline vote cast"
    );
    Ok(Json(ApiResponse::ok(view)))
}

pub async fn get_airline(
    State(ledger): State<LedgerHandle>,
    Path(account): Path<usize>,
) -> ApiResult<AirlineView> {
    let view = ledger
        .run(move |chain| airline_view(chain, account))
        .await?;

    Ok(Json(ApiResponse::ok(view)))
}

// ===== Insurance =====

pub async fn buy_insurance(
    State(ledger): State<LedgerHandle>,
    Json(request): Json<BuyInsuranceRequest>,
) -> ApiResult<PolicyView> {
    request.validate()?;

    let policy = ledger
        .run(move |chain| {
            let passenger = chain.account(request.passenger)?;
            let airline = chain.account(request.airline)?;
            let flight = chain.string(&request.flight);

            settle(chain.contract().try_buy_insurance_policy(
                &passenger,
                &airline,
                &flight,
                &request.timestamp,
                &i128::from(request.premium),
            ))?;

            let policy = settle(chain.contract().try_get_policy(
                &passenger,
                &airline,
                &flight,
                &request.timestamp,
            ))?
            .ok_or_else(|| ApiError::NotFound("policy".to_string()))?;

            Ok(PolicyView {
                passenger: request.passenger,
                airline: request.airline,
                flight: request.flight,
                timestamp: policy.timestamp,
                premium: policy.premium,
                payout: policy.payout,
                credited: policy.credited,
            })
        })
        .await?;

    info!(
        passenger = policy.passenger,
        airline = policy.airline,
        flight = %policy.flight,
        premium = %policy.premium,
        "insurance purchased"
    );
    Ok(Json(ApiResponse::ok(policy)))
}

pub async fn get_entitlement(
    State(ledger): State<LedgerHandle>,
    Path(account): Path<usize>,
) -> ApiResult<EntitlementResponse> {
    let amount = ledger
        .run(move |chain| {
            let passenger = chain.account(account)?;
            settle(chain.contract().try_get_passenger_entitlement(&passenger))
        })
        .await?;

    Ok(Json(ApiResponse::ok(EntitlementResponse { account, amount })))
}

pub async fn withdraw_claim(
    State(ledger): State<LedgerHandle>,
    Path(account): Path<usize>,
) -> ApiResult<EntitlementResponse> {
    let amount = ledger
        .run(move |chain| {
            let passenger = chain.account(account)?;
            settle(chain.contract().try_withdraw_insurance_claim(&passenger))
        })
        .await?;

    info!(passenger = account, amount = %amount, "insurance claim withdrawn");
    Ok(Json(ApiResponse::ok(EntitlementResponse { account, amount })))
}

// ===== Flight status =====

pub async fn fetch_flight_status(
    State(ledger): State<LedgerHandle>,
    Json(request): Json<FetchFlightStatusRequest>,
) -> ApiResult<FetchFlightStatusResponse> {
    request.validate()?;

    let opened = ledger
        .run(move |chain| {
            chain.fetch_flight_status(
                request.requester,
                request.airline,
                &request.flight,
                request.timestamp,
            )
        })
        .await?;

    info!(
        request_id = %opened.request_id,
        index = opened.index,
        flight = %opened.flight,
        "flight status requested"
    );
    Ok(Json(ApiResponse::ok(FetchFlightStatusResponse {
        request_id: opened.request_id,
        index: opened.index,
    })))
}

pub async fn get_flight_status(
    State(ledger): State<LedgerHandle>,
    Query(query): Query<FlightStatusQuery>,
) -> ApiResult<FlightStatusView> {
    query.validate()?;

    let view = ledger
        .run(move |chain| {
            let airline = chain.account(query.airline)?;
            let record = settle(chain.contract().try_get_flight_status(
                &airline,
                &chain.string(&query.flight),
                &query.timestamp,
            ))?;

            Ok(FlightStatusView {
                airline: query.airline,
                flight: query.flight,
                timestamp: query.timestamp,
                resolved: record.is_some(),
                status_code: record.as_ref().map(|r| r.status_code),
                status: record
                    .as_ref()
                    .map(|r| status_label(r.status_code).to_string()),
                resolved_at: record.as_ref().and_then(|r| ledger_time(r.resolved_at)),
            })
        })
        .await?;

    Ok(Json(ApiResponse::ok(view)))
}

// ===== Oracles =====

pub async fn list_oracles(State(oracles): State<Arc<OraclePool>>) -> ApiResult<Vec<OracleView>> {
    Ok(Json(ApiResponse::ok(oracles.members().to_vec())))
}

// ===== Helpers =====

fn airline_view(chain: &Chain, account: usize) -> Result<AirlineView, ApiError> {
    let address = chain.account(account)?;
    let record = settle(chain.contract().try_get_airline(&address))?
        .ok_or_else(|| ApiError::NotFound(format!("airline {}", account)))?;

    Ok(AirlineView {
        account,
        address: strkey(&address),
        name: host_string(&record.name),
        status: airline_status_name(record.status()).to_string(),
        registered: true,
        funded: record.is_funded(),
        approved: record.is_approved(),
        funding: record.funding,
        votes: record.votes.len(),
    })
}

fn airline_status_name(status: AirlineStatus) -> &'static str {
    match status {
        AirlineStatus::Proposed => "proposed",
        AirlineStatus::Registered => "registered",
        AirlineStatus::Funded => "funded",
        AirlineStatus::Approved => "approved",
    }
}

fn ledger_time(timestamp: u64) -> Option<String> {
    let seconds = i64::try_from(timestamp).ok()?;
    DateTime::<Utc>::from_timestamp(seconds, 0).map(|time| time.to_rfc3339())
}
