//! Invoker seam
//!
//! Every network call the connector makes goes through an [`Invoker`]: the
//! readers, the token manager and the connectivity prober name an
//! [`Operation`] and get back an [`ApiResponse`]. Hosts plug in their own
//! dispatch layer; [`HttpInvoker`](crate::http::HttpInvoker) talks to
//! Salesforce directly.

use crate::config::ClientInfo;
use crate::error::Result;
use crate::types::JsonValue;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Operations
// ============================================================================

/// Which read path a query serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    /// Full-table extraction in server order
    Batch,
    /// Change polling, newest modification first
    Stream,
}

/// A named operation dispatched through the invoker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// One page of records from an entity
    Query {
        /// Entity name
        table: String,
        /// Read path
        kind: QueryKind,
        /// End cursor of the previous page; `None` for the first page
        after: Option<String>,
        /// Records per page
        page_size: u32,
    },

    /// Authorization-code exchange
    AccessToken {
        /// Code returned by the authorize redirect
        code: String,
        /// Redirect URI registered on the connected app
        redirect_uri: String,
    },

    /// Refresh-token grant
    RefreshToken {
        /// Long-lived refresh token
        refresh_token: String,
    },
}

impl Operation {
    /// First page of a table
    pub fn first_page(table: impl Into<String>, kind: QueryKind, page_size: u32) -> Self {
        Self::Query {
            table: table.into(),
            kind,
            after: None,
            page_size,
        }
    }

    /// Page following the given cursor
    pub fn next_page(
        table: impl Into<String>,
        kind: QueryKind,
        after: impl Into<String>,
        page_size: u32,
    ) -> Self {
        Self::Query {
            table: table.into(),
            kind,
            after: Some(after.into()),
            page_size,
        }
    }

    /// Host-facing operation name
    pub fn name(&self) -> String {
        match self {
            Operation::Query {
                table, kind, after, ..
            } => {
                let mut name = table.clone();
                if *kind == QueryKind::Stream {
                    name.push_str(" stream read");
                }
                if after.is_some() {
                    name.push_str(" by after");
                }
                name
            }
            Operation::AccessToken { .. } => "get access token".to_string(),
            Operation::RefreshToken { .. } => "refresh token".to_string(),
        }
    }

    /// Whether this operation reads records (and may be intercepted)
    pub fn is_query(&self) -> bool {
        matches!(self, Operation::Query { .. })
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Raw outcome of an invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    /// HTTP status code
    pub http_code: u16,
    /// Parsed response body (a JSON string when the body was not JSON)
    pub result: JsonValue,
}

impl ApiResponse {
    /// Create a response
    pub fn new(http_code: u16, result: JsonValue) -> Self {
        Self { http_code, result }
    }

    /// 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.http_code)
    }

    /// GraphQL `data` member, if any
    pub fn data(&self) -> Option<&JsonValue> {
        self.result.get("data")
    }

    /// Vendor error entries (`[{"errorCode": ..., "message": ...}]`)
    pub fn errors(&self) -> &[JsonValue] {
        match &self.result {
            JsonValue::Array(items) => items,
            JsonValue::Object(map) => map
                .get("errors")
                .and_then(JsonValue::as_array)
                .map_or(&[], Vec::as_slice),
            _ => &[],
        }
    }

    /// First error entry carrying the given `errorCode`
    pub fn find_error(&self, code: &str) -> Option<&JsonValue> {
        self.errors()
            .iter()
            .find(|e| e.get("errorCode").and_then(JsonValue::as_str) == Some(code))
    }

    /// Best-effort human-readable message
    pub fn message(&self) -> Option<String> {
        if let Some(msg) = self
            .errors()
            .first()
            .and_then(|e| e.get("message"))
            .and_then(JsonValue::as_str)
        {
            return Some(msg.to_string());
        }
        if let Some(desc) = self
            .result
            .get("error_description")
            .and_then(JsonValue::as_str)
        {
            return Some(desc.to_string());
        }
        match &self.result {
            JsonValue::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        }
    }
}

// ============================================================================
// Invoker Trait
// ============================================================================

/// Dispatches named operations on behalf of the connector
#[async_trait]
pub trait Invoker: Send + Sync {
    /// Dispatch with the host's standard interception (token refresh, replay)
    async fn invoke(&self, operation: &Operation, client: &ClientInfo) -> Result<ApiResponse>;

    /// Dispatch bypassing interception; used by token operations
    async fn invoke_without_intercept(
        &self,
        operation: &Operation,
        client: &ClientInfo,
    ) -> Result<ApiResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(Operation::first_page("Contact", QueryKind::Batch, 200), "Contact")]
    #[test_case(Operation::next_page("Contact", QueryKind::Batch, "c1", 200), "Contact by after")]
    #[test_case(Operation::first_page("Lead", QueryKind::Stream, 200), "Lead stream read")]
    #[test_case(Operation::next_page("Lead", QueryKind::Stream, "c1", 200), "Lead stream read by after")]
    #[test_case(Operation::RefreshToken { refresh_token: "r".into() }, "refresh token")]
    #[test_case(Operation::AccessToken { code: "c".into(), redirect_uri: "u".into() }, "get access token")]
    fn test_operation_names(operation: Operation, expected: &str) {
        assert_eq!(operation.name(), expected);
    }

    #[test]
    fn test_response_errors_from_array() {
        let response = ApiResponse::new(
            401,
            json!([{"message": "Session expired or invalid", "errorCode": "INVALID_SESSION_ID"}]),
        );
        assert!(!response.is_success());
        assert!(response.find_error("INVALID_SESSION_ID").is_some());
        assert!(response.find_error("REQUEST_LIMIT_EXCEEDED").is_none());
        assert_eq!(
            response.message().as_deref(),
            Some("Session expired or invalid")
        );
    }

    #[test]
    fn test_response_data_and_plain_text() {
        let response = ApiResponse::new(200, json!({"data": {"uiapi": {}}}));
        assert!(response.is_success());
        assert!(response.data().is_some());
        assert!(response.errors().is_empty());

        let response = ApiResponse::new(502, json!("Bad Gateway"));
        assert!(response.data().is_none());
        assert_eq!(response.message().as_deref(), Some("Bad Gateway"));
    }

    #[test]
    fn test_response_wire_names() {
        let response = ApiResponse::new(200, json!({}));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["httpCode"], 200);
    }
}
