//! Tests for the HTTP invoker module

use super::*;
use crate::config::{ClientInfo, ConnectionConfig, HttpConfig};
use crate::invoker::{Invoker, Operation, QueryKind};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GRAPHQL_PATH: &str = "/services/data/v57.0/graphql";
const TOKEN_PATH: &str = "/services/oauth2/token";

fn invoker_for(server: &MockServer, token: &str) -> HttpInvoker {
    let connection = ConnectionConfig::new()
        .with_authorization(token)
        .with_refresh_token("refresh-123")
        .with_endpoint(server.uri());
    HttpInvoker::new(Arc::new(RwLock::new(connection)), &HttpConfig::default())
        .unwrap()
        .without_rate_limit()
}

fn client_for(server: &MockServer) -> ClientInfo {
    ClientInfo::new("client-id", "client-secret").with_auth_url(server.uri())
}

fn empty_page() -> serde_json::Value {
    json!({"data": {"uiapi": {"query": {"Contact": {
        "edges": [],
        "pageInfo": {"hasNextPage": false, "endCursor": null}
    }}}}})
}

// ============================================================================
// URLs
// ============================================================================

#[test]
fn test_graphql_url() {
    let url = graphql_url("https://acme.my.salesforce.com/", "57.0").unwrap();
    assert_eq!(
        url.as_str(),
        "https://acme.my.salesforce.com/services/data/v57.0/graphql"
    );
}

#[test]
fn test_token_url() {
    let url = token_url("https://login.salesforce.com").unwrap();
    assert_eq!(url.as_str(), "https://login.salesforce.com/services/oauth2/token");
    assert!(token_url("not a url").is_err());
}

// ============================================================================
// Queries
// ============================================================================

#[tokio::test]
async fn test_query_posts_graphql_with_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(header("authorization", "Bearer token-abc"))
        .and(body_string_contains("Contact(first: $first, after: $after)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty_page()))
        .expect(1)
        .mount(&server)
        .await;

    let invoker = invoker_for(&server, "token-abc");
    let response = invoker
        .invoke(
            &Operation::first_page("Contact", QueryKind::Batch, 200),
            &client_for(&server),
        )
        .await
        .unwrap();

    assert_eq!(response.http_code, 200);
    assert!(response.data().is_some());
}

#[tokio::test]
async fn test_non_json_body_is_kept_as_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let invoker = invoker_for(&server, "token-abc");
    let response = invoker
        .invoke_without_intercept(
            &Operation::first_page("Contact", QueryKind::Batch, 200),
            &client_for(&server),
        )
        .await
        .unwrap();

    assert_eq!(response.http_code, 502);
    assert_eq!(response.result, json!("Bad Gateway"));
}

#[tokio::test]
async fn test_expired_session_refreshes_and_replays() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401).set_body_json(
            json!([{"errorCode": "INVALID_SESSION_ID", "message": "Session expired or invalid"}]),
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "fresh"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty_page()))
        .expect(1)
        .mount(&server)
        .await;

    let invoker = invoker_for(&server, "stale");
    let response = invoker
        .invoke(
            &Operation::first_page("Contact", QueryKind::Batch, 200),
            &client_for(&server),
        )
        .await
        .unwrap();

    assert_eq!(response.http_code, 200);
    let connection = invoker.connection();
    assert_eq!(connection.read().await.authorization.as_deref(), Some("fresh"));
}

#[tokio::test]
async fn test_unrecoverable_failure_is_returned_unchanged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_json(
            json!([{"errorCode": "NOT_FOUND", "message": "The requested resource does not exist"}]),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let invoker = invoker_for(&server, "token-abc");
    let response = invoker
        .invoke(
            &Operation::first_page("Lead", QueryKind::Stream, 200),
            &client_for(&server),
        )
        .await
        .unwrap();

    assert_eq!(response.http_code, 404);
}

#[tokio::test]
async fn test_quota_exhaustion_surfaces_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let invoker = invoker_for(&server, "token-abc");
    let err = invoker
        .invoke(
            &Operation::first_page("Lead", QueryKind::Batch, 200),
            &client_for(&server),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, crate::error::Error::RateLimit { .. }));
}

#[tokio::test]
async fn test_query_without_endpoint_fails() {
    let invoker = HttpInvoker::new(
        Arc::new(RwLock::new(ConnectionConfig::new())),
        &HttpConfig::default(),
    )
    .unwrap();

    let err = invoker
        .invoke(
            &Operation::first_page("Lead", QueryKind::Batch, 200),
            &ClientInfo::new("id", "secret"),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        crate::error::Error::MissingConfigField { .. }
    ));
}

// ============================================================================
// Token Operations
// ============================================================================

#[tokio::test]
async fn test_access_token_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=aPrx"))
        .and(body_string_contains("client_id=client-id"))
        .and(body_string_contains("client_secret=client-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "00D",
            "refresh_token": "5Aep",
            "instance_url": "https://acme.my.salesforce.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let invoker = invoker_for(&server, "");
    let response = invoker
        .invoke_without_intercept(
            &Operation::AccessToken {
                code: "aPrx".to_string(),
                redirect_uri: "https://host/callback".to_string(),
            },
            &client_for(&server),
        )
        .await
        .unwrap();

    assert!(response.is_success());
    assert_eq!(response.result["refresh_token"], "5Aep");
}

#[tokio::test]
async fn test_token_failure_is_not_intercepted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(
            json!({"error": "invalid_client", "error_description": "invalid client credentials"}),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let invoker = invoker_for(&server, "token-abc");
    let response = invoker
        .invoke(
            &Operation::RefreshToken {
                refresh_token: "refresh-123".to_string(),
            },
            &client_for(&server),
        )
        .await
        .unwrap();

    assert_eq!(response.http_code, 401);
    assert_eq!(
        response.message().as_deref(),
        Some("invalid client credentials")
    );
}
