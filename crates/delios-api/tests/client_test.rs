#![allow(clippy::unwrap_used)]
// Integration tests for `DeliosClient` using wiremock.

use std::time::Duration;

use chrono::NaiveDate;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use delios_api::{AnnualLogRequest, DeliosClient, Endpoints, Error, Timeouts, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, DeliosClient) {
    setup_with_timeouts(Timeouts::default()).await
}

async fn setup_with_timeouts(timeouts: Timeouts) -> (MockServer, DeliosClient) {
    let server = MockServer::start().await;
    let endpoints = Endpoints::new(Url::parse(&server.uri()).unwrap());
    let client = DeliosClient::new(endpoints, timeouts, &TransportConfig::default()).unwrap();
    (server, client)
}

fn password() -> SecretString {
    SecretString::from("hunter2".to_string())
}

fn daily_payload() -> serde_json::Value {
    json!({
        "powerpv": 3.456,
        "powerbatt": -1.04,
        "powergrid": 0.25,
        "powerhouse": 2.66,
        "percentbattery": 87.9,
        "energy_pv": 12.34,
        "energy_battery_discha": 4.05,
        "energy_battery_char": 3.27,
        "energy_grid_consumed": 1.11,
        "energy_grid_feed_in": 2.0,
        "energy_powerhouse": 9.99,
        "self_sufficiency": 91.6
    })
}

async fn mount_login(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path(Endpoints::DEFAULT_LOGIN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": token })))
        .mount(server)
        .await;
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_login_sends_credentials_and_fixed_headers() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(Endpoints::DEFAULT_LOGIN_PATH))
        .and(body_json(json!({ "email": "ops@example.com", "password": "hunter2" })))
        .and(header("content-type", "application/json"))
        .and(header("accept", "application/json, text/plain, */*"))
        .and(header("origin", "https://webportal.delios-srl.it"))
        .and(header("referer", "https://webportal.delios-srl.it/"))
        .and(header("user-agent", "HomeAssistant/DeliosIntegration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "abc" })))
        .expect(1)
        .mount(&server)
        .await;

    let token = client.login("ops@example.com", &password()).await.unwrap();

    assert_eq!(token.expose_secret(), "abc");
    assert!(client.has_token());
}

#[tokio::test]
async fn test_login_accepts_fallback_token_field() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(Endpoints::DEFAULT_LOGIN_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "access_token": "from-fallback" })),
        )
        .mount(&server)
        .await;

    let token = client.login("ops@example.com", &password()).await.unwrap();
    assert_eq!(token.expose_secret(), "from-fallback");
}

#[tokio::test]
async fn test_login_without_token_leaves_client_unauthenticated() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(Endpoints::DEFAULT_LOGIN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
        .mount(&server)
        .await;

    let result = client.login("ops@example.com", &password()).await;

    assert!(
        matches!(result, Err(Error::MissingToken { .. })),
        "expected MissingToken error, got: {result:?}"
    );
    assert!(!client.has_token());
}

#[tokio::test]
async fn test_login_rejected() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(Endpoints::DEFAULT_LOGIN_PATH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.login("ops@example.com", &password()).await;

    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

// ── Daily log tests ─────────────────────────────────────────────────

#[tokio::test]
async fn test_daily_log_carries_bearer_after_login() {
    let (server, client) = setup().await;
    mount_login(&server, "tok-123").await;

    Mock::given(method("POST"))
        .and(path(Endpoints::DEFAULT_DAILY_LOG_PATH))
        .and(header("authorization", "Bearer tok-123"))
        .and(body_json(json!({ "plant_id": "4211", "machine_id": "" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(daily_payload()))
        .expect(1)
        .mount(&server)
        .await;

    client.login("ops@example.com", &password()).await.unwrap();
    let log = client.daily_log("4211").await.unwrap();

    assert_eq!(log.energy_battery_charge, 3.27);
    assert_eq!(log.battery_percent, 87.9);
}

#[tokio::test]
async fn test_daily_log_without_login_sends_no_authorization() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(Endpoints::DEFAULT_DAILY_LOG_PATH))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(daily_payload()))
        .expect(0)
        .mount(&server)
        .await;

    let result = client.daily_log("4211").await;

    assert!(
        matches!(result, Err(Error::Api { status: 404, .. })),
        "expected unmatched request, got: {result:?}"
    );
}

#[tokio::test]
async fn test_daily_log_missing_field_is_deserialization_error() {
    let (server, client) = setup().await;

    let mut payload = daily_payload();
    payload.as_object_mut().unwrap().remove("self_sufficiency");

    Mock::given(method("POST"))
        .and(path(Endpoints::DEFAULT_DAILY_LOG_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload))
        .mount(&server)
        .await;

    let result = client.daily_log("4211").await;

    match result {
        Err(Error::Deserialization { ref message, .. }) => {
            assert!(
                message.contains("self_sufficiency"),
                "expected field name in message, got: {message}"
            );
        }
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_daily_log_times_out() {
    let timeouts = Timeouts {
        daily: Duration::from_millis(100),
        ..Timeouts::default()
    };
    let (server, client) = setup_with_timeouts(timeouts).await;

    Mock::given(method("POST"))
        .and(path(Endpoints::DEFAULT_DAILY_LOG_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(daily_payload())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let result = client.daily_log("4211").await;

    assert!(
        matches!(result, Err(Error::Timeout { .. })),
        "expected Timeout error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_expired_token_maps_to_authentication() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(Endpoints::DEFAULT_DAILY_LOG_PATH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client.daily_log("4211").await.unwrap_err();
    assert!(err.is_auth_expired());
}

// ── Annual log tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_annual_log_posts_chart_request() {
    let (server, client) = setup().await;

    let request = AnnualLogRequest::new(
        4211,
        NaiveDate::from_ymd_opt(2019, 12, 1).unwrap(),
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
    );

    Mock::given(method("POST"))
        .and(path(Endpoints::DEFAULT_ANNUAL_LOG_PATH))
        .and(body_json(serde_json::to_value(&request).unwrap()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {
                    "chart_powerpv": 4000.0,
                    "chart_powergrid": 1000.0,
                    "energy_powerhouse": 5000.0,
                    "energy_grid_consumed": 2000.0,
                    "self_sufficiency": 60.0
                },
                {
                    "chart_powerpv": 812.9,
                    "chart_powergrid": 120.5,
                    "energy_powerhouse": 990.1,
                    "energy_grid_consumed": 310.7,
                    "self_sufficiency": 71.2
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let log = client.annual_log(&request).await.unwrap();

    assert_eq!(log.data.as_ref().map(Vec::len), Some(2));
    let latest = log.latest().unwrap().unwrap();
    assert_eq!(latest.energy_pv, 812.9);
}

#[tokio::test]
async fn test_annual_log_server_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(Endpoints::DEFAULT_ANNUAL_LOG_PATH))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let request = AnnualLogRequest::new(
        4211,
        NaiveDate::from_ymd_opt(2019, 12, 1).unwrap(),
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
    );
    let err = client.annual_log(&request).await.unwrap_err();
    assert!(err.is_transient());

    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 502);
            assert!(message.contains("Bad Gateway"));
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}
