//! Tests for the token manager

use super::*;
use crate::config::{ClientInfo, ConnectionConfig};
use crate::error::Error;
use crate::invoker::{ApiResponse, Operation};
use crate::test_support::ScriptedInvoker;
use serde_json::json;

fn client() -> ClientInfo {
    ClientInfo::new("client-id", "client-secret")
}

fn connection() -> ConnectionConfig {
    ConnectionConfig::new()
        .with_authorization("old-token")
        .with_refresh_token("refresh-123")
        .with_endpoint("https://acme.my.salesforce.com")
}

// ============================================================================
// update_token
// ============================================================================

#[tokio::test]
async fn test_503_is_rate_limit_regardless_of_body() {
    let invoker = ScriptedInvoker::new();
    let mut config = connection();

    let response = ApiResponse::new(503, json!({"anything": "at all"}));
    let err = update_token(&mut config, &client(), &invoker, &response)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::RateLimit { .. }));
    assert!(invoker.calls().is_empty());
    assert_eq!(config, connection());
}

#[tokio::test]
async fn test_request_limit_exceeded_carries_vendor_message() {
    let invoker = ScriptedInvoker::new();
    let mut config = connection();

    let response = ApiResponse::new(
        403,
        json!([{"errorCode": "REQUEST_LIMIT_EXCEEDED", "message": "TotalRequests Limit exceeded."}]),
    );
    let err = update_token(&mut config, &client(), &invoker, &response)
        .await
        .unwrap_err();

    match err {
        Error::RateLimit { message } => assert_eq!(message, "TotalRequests Limit exceeded."),
        other => panic!("Expected RateLimit, got {other:?}"),
    }
}

#[tokio::test]
async fn test_401_refreshes_and_mutates_authorization() {
    let invoker = ScriptedInvoker::new().respond(ApiResponse::new(
        200,
        json!({"access_token": "new-token", "instance_url": "https://acme.my.salesforce.com"}),
    ));
    let mut config = connection();

    let response = ApiResponse::new(401, json!([]));
    let refreshed = update_token(&mut config, &client(), &invoker, &response)
        .await
        .unwrap();

    assert_eq!(
        refreshed,
        Some(TokenRefresh {
            access_token: "new-token".to_string()
        })
    );
    assert_eq!(config.authorization.as_deref(), Some("new-token"));

    let calls = invoker.calls();
    assert_eq!(calls.len(), 1);
    assert!(!calls[0].intercepted);
    assert_eq!(
        calls[0].operation,
        Operation::RefreshToken {
            refresh_token: "refresh-123".to_string()
        }
    );
}

#[tokio::test]
async fn test_invalid_session_id_triggers_refresh() {
    let invoker =
        ScriptedInvoker::new().respond(ApiResponse::new(200, json!({"access_token": "t2"})));
    let mut config = connection();

    let response = ApiResponse::new(
        400,
        json!([{"errorCode": "INVALID_SESSION_ID", "message": "Session expired or invalid"}]),
    );
    let refreshed = update_token(&mut config, &client(), &invoker, &response)
        .await
        .unwrap();

    assert_eq!(refreshed.unwrap().access_token, "t2");
    assert_eq!(invoker.operation_names(), vec!["refresh token"]);
}

#[tokio::test]
async fn test_refresh_rejected_is_auth_refresh_error() {
    let invoker = ScriptedInvoker::new().respond(ApiResponse::new(
        400,
        json!({"error": "invalid_grant", "error_description": "expired access/refresh token"}),
    ));
    let mut config = connection();

    let err = update_token(
        &mut config,
        &client(),
        &invoker,
        &ApiResponse::new(401, json!([])),
    )
    .await
    .unwrap_err();

    match err {
        Error::AuthRefresh { message } => {
            assert!(message.contains("expired access/refresh token"));
        }
        other => panic!("Expected AuthRefresh, got {other:?}"),
    }
    assert_eq!(config.authorization.as_deref(), Some("old-token"));
}

#[tokio::test]
async fn test_refresh_dispatch_failure_is_auth_refresh_error() {
    let invoker = ScriptedInvoker::new().fail("connection refused");
    let mut config = connection();

    let err = update_token(
        &mut config,
        &client(),
        &invoker,
        &ApiResponse::new(401, json!([])),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::AuthRefresh { .. }));
    assert!(err.to_string().contains("connection refused"));
}

#[tokio::test]
async fn test_missing_refresh_token() {
    let invoker = ScriptedInvoker::new();
    let mut config = ConnectionConfig::new().with_authorization("old");

    let err = update_token(
        &mut config,
        &client(),
        &invoker,
        &ApiResponse::new(401, json!([])),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::AuthRefresh { .. }));
    assert!(invoker.calls().is_empty());
}

#[tokio::test]
async fn test_other_failures_need_no_action() {
    let invoker = ScriptedInvoker::new();
    let mut config = connection();

    for response in [
        ApiResponse::new(404, json!([{"errorCode": "NOT_FOUND", "message": "gone"}])),
        ApiResponse::new(500, json!("Internal Server Error")),
        ApiResponse::new(400, json!([])),
    ] {
        let outcome = update_token(&mut config, &client(), &invoker, &response).await;
        tokio_test::assert_ok!(&outcome);
        assert!(outcome.unwrap().is_none());
    }
    assert!(invoker.calls().is_empty());
}

// ============================================================================
// command_callback
// ============================================================================

#[tokio::test]
async fn test_oauth_command_populates_connection() {
    let invoker = ScriptedInvoker::new().respond(ApiResponse::new(
        200,
        json!({
            "access_token": "00Dxx!access",
            "refresh_token": "5Aep!refresh",
            "instance_url": "https://acme.my.salesforce.com",
            "token_type": "Bearer"
        }),
    ));
    let mut config = ConnectionConfig::new();
    let command = CommandInfo::new(OAUTH_COMMAND)
        .with_arg("code", "aPrxCode")
        .with_arg("redirect_uri", "https://host/callback");

    let updated = command_callback(&mut config, &client(), &invoker, &command)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated, config);
    assert_eq!(config.authorization.as_deref(), Some("00Dxx!access"));
    assert_eq!(config.refresh_token.as_deref(), Some("5Aep!refresh"));
    assert_eq!(
        config.endpoint.as_deref(),
        Some("https://acme.my.salesforce.com")
    );

    let calls = invoker.calls();
    assert!(!calls[0].intercepted);
    assert_eq!(calls[0].operation.name(), "get access token");
}

#[tokio::test]
async fn test_other_commands_are_ignored() {
    let invoker = ScriptedInvoker::new();
    let mut config = connection();

    let outcome = command_callback(&mut config, &client(), &invoker, &CommandInfo::new("Ping"))
        .await
        .unwrap();

    assert!(outcome.is_none());
    assert!(invoker.calls().is_empty());
}

#[tokio::test]
async fn test_oauth_command_requires_code() {
    let invoker = ScriptedInvoker::new();
    let mut config = ConnectionConfig::new();

    let err = command_callback(
        &mut config,
        &client(),
        &invoker,
        &CommandInfo::new(OAUTH_COMMAND),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::MissingConfigField { .. }));
}

#[tokio::test]
async fn test_oauth_exchange_rejected() {
    let invoker = ScriptedInvoker::new().respond(ApiResponse::new(
        400,
        json!({"error": "invalid_grant", "error_description": "authentication failure"}),
    ));
    let mut config = ConnectionConfig::new();
    let command = CommandInfo::new(OAUTH_COMMAND)
        .with_arg("code", "bad")
        .with_arg("redirect_uri", "https://host/callback");

    let err = command_callback(&mut config, &client(), &invoker, &command)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::OAuth2 { .. }));
    assert!(config.authorization.is_none());
}
