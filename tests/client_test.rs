use std::time::Duration;

use duphlux_client::{
    DuphluxClient, DuphluxConfig, Environment, Error, SessionState, VerifyRequest,
};
use http::HeaderMap;
use http::header::{HeaderName, HeaderValue};
use httpmock::prelude::*;
use serde_json::json;

fn test_config(server: &MockServer) -> DuphluxConfig {
    DuphluxConfig::new("tok_live_secret", Environment::Live).with_base_url(server.base_url())
}

fn test_client(server: &MockServer) -> DuphluxClient {
    DuphluxClient::from_config(test_config(server)).unwrap()
}

/// Client that has already completed one status check resolving to the
/// given verification status.
async fn checked_client(server: &MockServer, verification_status: &str) -> DuphluxClient {
    server.mock(|when, then| {
        when.method(POST).path("/status.json");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({
                "PayLoad": {
                    "status": "success",
                    "errors": null,
                    "data": {"verification_status": verification_status}
                }
            }));
    });

    let mut client = test_client(server);
    client.check_status("abc123").await.unwrap();
    client
}

#[tokio::test]
async fn test_authenticate_posts_verification_request() {
    let server = MockServer::start();

    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/verify.json")
            .header("token", "tok_live_secret")
            .header("content-type", "application/json")
            .header("cache-control", "no-cache")
            .json_body(json!({
                "phone_number": "2348012345678",
                "transaction_reference": "abc123",
                "redirect_url": "https://x.test/cb"
            }));
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({
                "PayLoad": {
                    "status": "success",
                    "errors": null,
                    "data": {"verification_url": "https://duphlux.com/v/abc123"}
                }
            }));
    });

    let mut client = test_client(&server);
    let outcome = client
        .authenticate(VerifyRequest::new(
            "2348012345678",
            "abc123",
            "https://x.test/cb",
        ))
        .await
        .unwrap();

    assert!(!outcome.has_error());
    assert_eq!(outcome.status(), &json!("success"));
    assert_eq!(
        client.verification_url().unwrap(),
        Some("https://duphlux.com/v/abc123")
    );
    assert_eq!(
        client.data_field("verification_url"),
        Some(&json!("https://duphlux.com/v/abc123"))
    );
    assert_eq!(client.session_state(), SessionState::Initiated);

    mock.assert();
}

#[tokio::test]
async fn test_check_status_reports_verified() {
    let server = MockServer::start();

    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/status.json")
            .header("token", "tok_live_secret")
            .json_body(json!({"transaction_reference": "abc123"}));
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({
                "PayLoad": {
                    "status": "success",
                    "errors": null,
                    "data": {"verification_status": "verified"}
                }
            }));
    });

    let mut client = test_client(&server);
    client.check_status("abc123").await.unwrap();

    assert!(client.is_verified().unwrap());
    assert!(!client.is_pending().unwrap());
    assert!(!client.is_failed().unwrap());
    assert_eq!(client.session_state(), SessionState::StatusChecked);

    mock.assert();
}

#[tokio::test]
async fn test_check_status_reports_pending() {
    let server = MockServer::start();
    let client = checked_client(&server, "pending").await;

    assert!(client.is_pending().unwrap());
    assert!(!client.is_verified().unwrap());
    assert!(!client.is_failed().unwrap());
}

#[tokio::test]
async fn test_check_status_reports_failed() {
    let server = MockServer::start();
    let client = checked_client(&server, "failed").await;

    assert!(client.is_failed().unwrap());
    assert!(!client.is_verified().unwrap());
    assert!(!client.is_pending().unwrap());
}

#[tokio::test]
async fn test_status_body_carries_merged_options() {
    let server = MockServer::start();

    let verify_mock = server.mock(|when, then| {
        when.method(POST).path("/verify.json");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({
                "PayLoad": {
                    "status": "success",
                    "errors": null,
                    "data": {"verification_url": "https://duphlux.com/v/abc123"}
                }
            }));
    });
    let status_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/status.json")
            .json_body(json!({
                "phone_number": "2348012345678",
                "redirect_url": "https://x.test/cb",
                "transaction_reference": "abc123"
            }));
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({
                "PayLoad": {
                    "status": "success",
                    "errors": null,
                    "data": {"verification_status": "verified"}
                }
            }));
    });

    let mut client = test_client(&server);
    client
        .authenticate(VerifyRequest::new(
            "2348012345678",
            "abc123",
            "https://x.test/cb",
        ))
        .await
        .unwrap();
    client.check_status("abc123").await.unwrap();

    verify_mock.assert();
    status_mock.assert();
}

#[tokio::test]
async fn test_service_error_envelope_sets_error_state() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/verify.json");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({
                "PayLoad": {
                    "status": false,
                    "errors": ["Invalid phone number"],
                    "data": null
                }
            }));
    });

    let mut client = test_client(&server);
    let outcome = client
        .authenticate(VerifyRequest::new("080", "abc123", "https://x.test/cb"))
        .await
        .unwrap();

    assert!(outcome.has_error());
    assert_eq!(outcome.error(), &json!(["Invalid phone number"]));
    assert_eq!(outcome.status(), &json!(false));
    assert_eq!(client.session_state(), SessionState::Initiated);
    assert_eq!(client.verification_url().unwrap(), None);
}

#[tokio::test]
async fn test_transport_failure_is_captured() {
    let config = DuphluxConfig::new("tok_live_secret", Environment::Live)
        .with_base_url("http://127.0.0.1:9")
        .with_timeout(Duration::from_secs(2));
    let mut client = DuphluxClient::from_config(config).unwrap();

    let outcome = client
        .authenticate(VerifyRequest::new(
            "2348012345678",
            "abc123",
            "https://x.test/cb",
        ))
        .await
        .unwrap();

    assert!(outcome.has_error());
    assert!(!outcome.error().as_str().unwrap().is_empty());
    assert!(outcome.status().is_null());
    assert!(client.response().is_none());
    assert_eq!(client.session_state(), SessionState::Initiated);
    assert_eq!(client.verification_url().unwrap(), None);
}

#[tokio::test]
async fn test_missing_parameter_rejected_before_dispatch() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/verify.json");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({
                "PayLoad": {"status": "success", "errors": null, "data": null}
            }));
    });

    let mut client = test_client(&server);
    let mut options = serde_json::Map::new();
    options.insert("phone_number".to_string(), json!("2348012345678"));
    options.insert("transaction_reference".to_string(), json!("abc123"));

    let err = client.authenticate_options(options).await.unwrap_err();
    assert_eq!(err.to_string(), "redirect_url is required for this operation");
    assert_eq!(client.session_state(), SessionState::Initiating);
    mock.assert_calls(0);
}

#[tokio::test]
async fn test_status_queries_require_prior_status_check() {
    let server = MockServer::start();
    let client = test_client(&server);

    let err = client.is_verified().unwrap_err();
    assert_eq!(
        err.to_string(),
        "Method cannot be used with the current operation"
    );
}

#[tokio::test]
async fn test_guard_tracks_most_recent_operation() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/verify.json");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({
                "PayLoad": {
                    "status": "success",
                    "errors": null,
                    "data": {"verification_url": "https://duphlux.com/v/abc123"}
                }
            }));
    });
    server.mock(|when, then| {
        when.method(POST).path("/status.json");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({
                "PayLoad": {
                    "status": "success",
                    "errors": null,
                    "data": {"verification_status": "verified"}
                }
            }));
    });

    let mut client = test_client(&server);
    client
        .authenticate(VerifyRequest::new(
            "2348012345678",
            "abc123",
            "https://x.test/cb",
        ))
        .await
        .unwrap();
    assert!(matches!(client.is_verified(), Err(Error::OperationMismatch)));
    assert!(client.verification_url().unwrap().is_some());

    client.check_status("abc123").await.unwrap();
    assert!(client.is_verified().unwrap());
    assert!(matches!(
        client.verification_url(),
        Err(Error::OperationMismatch)
    ));
}

#[tokio::test]
async fn test_extra_headers_are_sent() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/status.json")
            .header("token", "tok_live_secret")
            .header("x-request-id", "req-1");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({
                "PayLoad": {"status": "success", "errors": null, "data": null}
            }));
    });

    let mut extra = HeaderMap::new();
    extra.insert(
        HeaderName::from_static("x-request-id"),
        HeaderValue::from_static("req-1"),
    );
    let config = test_config(&server).with_extra_headers(extra);
    let mut client = DuphluxClient::from_config(config).unwrap();
    client.check_status("abc123").await.unwrap();

    mock.assert();
}

#[tokio::test]
async fn test_client_from_environment_variables() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/status.json")
            .header("token", "tok_env_test");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({
                "PayLoad": {
                    "status": "success",
                    "errors": null,
                    "data": {"verification_status": "verified"}
                }
            }));
    });

    let base_url = server.base_url();
    let mut client = temp_env::with_vars(
        [
            ("DUPHLUX_BASE_URL", Some(base_url.as_str())),
            ("DUPHLUX_ENVIRONMENT", Some("test")),
            ("DUPHLUX_LIVE_ACCESS_TOKEN", None),
            ("DUPHLUX_TEST_ACCESS_TOKEN", Some("tok_env_test")),
        ],
        || DuphluxClient::from_env(),
    )
    .unwrap();

    assert_eq!(client.environment(), Environment::Test);
    client.check_status("abc123").await.unwrap();
    mock.assert();
}

#[test]
fn test_blocking_status_check() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/status.json");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({
                "PayLoad": {
                    "status": "success",
                    "errors": null,
                    "data": {"verification_status": "verified"}
                }
            }));
    });

    let mut client = test_client(&server);
    let outcome = client.check_status_blocking("abc123").unwrap();

    assert!(!outcome.has_error());
    assert!(client.is_verified().unwrap());
    mock.assert();
}
