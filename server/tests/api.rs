use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use flight_surety_server::config::SimulationConfig;
use flight_surety_server::{bootstrap, build_router};

const UNIT: u64 = 10_000_000;
const OWNER: usize = 0;
const AIRLINE: usize = 1;
const PASSENGER: usize = 6;

async fn test_app() -> Router {
    let config = SimulationConfig::default();
    let state = bootstrap(&config).await.unwrap();
    build_router(state, &config)
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let request = match body {
        Some(body) => request.body(Body::from(body.to_string())).unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn fund_owner(app: &Router) {
    let (status, _) = call(
        app,
        "POST",
        "/api/airlines/fund",
        Some(json!({ "airline": OWNER, "amount": 10 * UNIT })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn api_root_and_health() {
    let app = test_app().await;

    let (status, body) = call(&app, "GET", "/api", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "An API for use with your Dapp!");

    let response = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn accounts_carry_roles() {
    let app = test_app().await;

    let (status, body) = call(&app, "GET", "/api/accounts", None).await;
    assert_eq!(status, StatusCode::OK);

    let accounts = body["data"].as_array().unwrap();
    assert_eq!(accounts.len(), 40);
    assert_eq!(accounts[0]["role"], "owner");
    assert_eq!(accounts[1]["role"], "airline");
    assert_eq!(accounts[6]["role"], "passenger");
    assert_eq!(accounts[11]["role"], "spare");
    assert_eq!(accounts[20]["role"], "oracle");
    assert_eq!(accounts[39]["role"], "oracle");
}

#[tokio::test]
async fn oracle_pool_registers_at_startup() {
    let app = test_app().await;

    let (status, body) = call(&app, "GET", "/api/oracles", None).await;
    assert_eq!(status, StatusCode::OK);

    let oracles = body["data"].as_array().unwrap();
    assert_eq!(oracles.len(), 20);
    for oracle in oracles {
        let indexes = oracle["indexes"].as_array().unwrap();
        assert_eq!(indexes.len(), 3);
        assert!(indexes.iter().all(|index| index.as_u64().unwrap() <= 9));
    }
}

#[tokio::test]
async fn first_airline_needs_funding_before_acting() {
    let app = test_app().await;

    let (status, body) = call(&app, "GET", "/api/airlines/0", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "First Airline");
    assert_eq!(body["data"]["status"], "registered");
    assert_eq!(body["data"]["approved"], false);

    let register = json!({ "caller": OWNER, "airline": AIRLINE, "name": "Second Airline" });
    let (status, body) = call(&app, "POST", "/api/airlines", Some(register.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);

    let (status, _) = call(
        &app,
        "POST",
        "/api/airlines/fund",
        Some(json!({ "airline": OWNER, "amount": 10 * UNIT - 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    fund_owner(&app).await;

    let (status, body) = call(&app, "POST", "/api/airlines", Some(register)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["admitted"], true);
    assert_eq!(body["data"]["airline"]["status"], "registered");

    let (status, body) = call(&app, "GET", "/api/airlines/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["registered"], true);
    assert_eq!(body["data"]["funded"], false);
}

#[tokio::test]
async fn rejects_invalid_requests() {
    let app = test_app().await;

    let (status, _) = call(
        &app,
        "POST",
        "/api/airlines",
        Some(json!({ "caller": OWNER, "airline": AIRLINE, "name": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = call(
        &app,
        "POST",
        "/api/airlines/fund",
        Some(json!({ "airline": OWNER, "amount": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = call(&app, "GET", "/api/airlines/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&app, "GET", "/api/airlines/12", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn paused_contract_returns_service_unavailable() {
    let app = test_app().await;

    let (status, _) = call(
        &app,
        "POST",
        "/api/operational",
        Some(json!({ "caller": AIRLINE, "operational": false })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(
        &app,
        "POST",
        "/api/operational",
        Some(json!({ "caller": OWNER, "operational": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["operational"], false);

    let (status, _) = call(
        &app,
        "POST",
        "/api/airlines/fund",
        Some(json!({ "airline": OWNER, "amount": 10 * UNIT })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    call(
        &app,
        "POST",
        "/api/operational",
        Some(json!({ "caller": OWNER, "operational": true })),
    )
    .await;
    let (_, body) = call(&app, "GET", "/api/operational", None).await;
    assert_eq!(body["data"]["operational"], true);
    fund_owner(&app).await;
}

#[tokio::test]
async fn premium_above_cap_is_rejected() {
    let app = test_app().await;
    fund_owner(&app).await;

    let (status, _) = call(
        &app,
        "POST",
        "/api/insurance",
        Some(json!({
            "passenger": PASSENGER,
            "airline": OWNER,
            "flight": "ND1309",
            "timestamp": 1630021956u64,
            "premium": UNIT + 1,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn fetched_flight_resolves_and_credits_passengers() {
    let app = test_app().await;
    fund_owner(&app).await;

    let (status, body) = call(
        &app,
        "POST",
        "/api/insurance",
        Some(json!({
            "passenger": PASSENGER,
            "airline": OWNER,
            "flight": "ND1309",
            "timestamp": 1630021956u64,
            "premium": UNIT,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["credited"], false);

    let status_uri = "/api/flights/status?airline=0&flight=ND1309&timestamp=1630021956";
    let fetch = json!({
        "requester": PASSENGER,
        "airline": OWNER,
        "flight": "ND1309",
        "timestamp": 1630021956u64,
    });

    // A request can land on an index fewer than three oracles hold; ask again.
    let mut resolved = false;
    'fetch: for _ in 0..10 {
        let (status, _) = call(&app, "POST", "/api/flights/status", Some(fetch.clone())).await;
        if status == StatusCode::CONFLICT {
            resolved = true;
            break;
        }
        assert_eq!(status, StatusCode::OK);

        for _ in 0..40 {
            tokio::time::sleep(Duration::from_millis(25)).await;
            let (_, body) = call(&app, "GET", status_uri, None).await;
            if body["data"]["resolved"] == true {
                resolved = true;
                break 'fetch;
            }
        }
    }
    assert!(resolved, "flight status never resolved");

    let (_, body) = call(&app, "GET", status_uri, None).await;
    assert_eq!(body["data"]["status_code"], 20);
    assert_eq!(body["data"]["status"], "late_airline");
    assert!(body["data"]["resolved_at"].is_string());

    let (status, body) = call(&app, "GET", "/api/passengers/6/entitlement", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["amount"], 15_000_000);

    let (status, body) = call(&app, "POST", "/api/passengers/6/withdraw", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["amount"], 15_000_000);

    let (status, _) = call(&app, "POST", "/api/passengers/6/withdraw", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
