//! reqwest-backed invoker
//!
//! Maps [`Operation`]s onto Salesforce endpoints:
//! - record queries go to the UI API GraphQL endpoint on the instance URL
//! - token operations go to the OAuth token endpoint on the login host
//!
//! Intercepted queries that come back with an auth failure are handed to
//! [`update_token`](crate::auth::update_token) and replayed once with the
//! refreshed token.

use super::graphql;
use super::rate_limit::RateLimiter;
use crate::auth::update_token;
use crate::config::{ClientInfo, ConnectionConfig, HttpConfig};
use crate::error::{Error, Result};
use crate::invoker::{ApiResponse, Invoker, Operation};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};
use url::Url;

/// Invoker that talks to Salesforce over HTTPS
pub struct HttpInvoker {
    client: Client,
    connection: Arc<RwLock<ConnectionConfig>>,
    rate_limiter: Option<RateLimiter>,
}

impl HttpInvoker {
    /// Create an invoker sharing the given connection config
    pub fn new(connection: Arc<RwLock<ConnectionConfig>>, config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(format!("salesforce-connector/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            client,
            connection,
            rate_limiter: Some(RateLimiter::from_config(config)),
        })
    }

    /// Disable client-side rate limiting
    #[must_use]
    pub fn without_rate_limit(mut self) -> Self {
        self.rate_limiter = None;
        self
    }

    /// Shared connection config
    pub fn connection(&self) -> Arc<RwLock<ConnectionConfig>> {
        Arc::clone(&self.connection)
    }

    /// Build the request for an operation
    async fn build_request(&self, operation: &Operation, client: &ClientInfo) -> Result<RequestBuilder> {
        match operation {
            Operation::Query {
                table,
                kind,
                after,
                page_size,
            } => {
                let (endpoint, token) = {
                    let connection = self.connection.read().await;
                    (
                        connection.endpoint()?.to_string(),
                        connection.access_token().ok().map(String::from),
                    )
                };
                let url = graphql_url(&endpoint, &client.api_version)?;
                let body = graphql::build_body(table, *kind, after.as_deref(), *page_size)?;

                let mut req = self.client.post(url).json(&body);
                if let Some(token) = token {
                    req = req.bearer_auth(token);
                }
                Ok(req)
            }

            Operation::AccessToken { code, redirect_uri } => {
                let form = [
                    ("grant_type", "authorization_code"),
                    ("code", code.as_str()),
                    ("client_id", client.client_id.as_str()),
                    ("client_secret", client.client_secret.as_str()),
                    ("redirect_uri", redirect_uri.as_str()),
                ];
                Ok(self.client.post(token_url(&client.auth_url)?).form(&form))
            }

            Operation::RefreshToken { refresh_token } => {
                let form = [
                    ("grant_type", "refresh_token"),
                    ("client_id", client.client_id.as_str()),
                    ("client_secret", client.client_secret.as_str()),
                    ("refresh_token", refresh_token.as_str()),
                ];
                Ok(self.client.post(token_url(&client.auth_url)?).form(&form))
            }
        }
    }

    /// Send one request and capture status plus body
    async fn dispatch(&self, operation: &Operation, client: &ClientInfo) -> Result<ApiResponse> {
        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }

        let req = self.build_request(operation, client).await?;
        let response = req.send().await.map_err(Error::Http)?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(Error::Http)?;
        let result = serde_json::from_str(&text).unwrap_or(Value::String(text));

        debug!("{} -> HTTP {}", operation, status);
        Ok(ApiResponse::new(status, result))
    }
}

#[async_trait]
impl Invoker for HttpInvoker {
    async fn invoke(&self, operation: &Operation, client: &ClientInfo) -> Result<ApiResponse> {
        let response = self.dispatch(operation, client).await?;
        if response.is_success() || !operation.is_query() {
            return Ok(response);
        }

        // Refresh on a snapshot so no lock is held across the token call.
        // Only the access token is written back; other fields may have
        // changed underneath.
        let mut snapshot = self.connection.read().await.clone();
        match update_token(&mut snapshot, client, self, &response).await? {
            Some(refreshed) => {
                self.connection.write().await.authorization = Some(refreshed.access_token);
                info!("Access token refreshed, replaying '{}'", operation);
                self.dispatch(operation, client).await
            }
            None => Ok(response),
        }
    }

    async fn invoke_without_intercept(
        &self,
        operation: &Operation,
        client: &ClientInfo,
    ) -> Result<ApiResponse> {
        self.dispatch(operation, client).await
    }
}

impl std::fmt::Debug for HttpInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpInvoker")
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// GraphQL endpoint on the instance host
pub fn graphql_url(endpoint: &str, api_version: &str) -> Result<Url> {
    let base = Url::parse(endpoint.trim_end_matches('/'))?;
    Ok(base.join(&format!("/services/data/v{api_version}/graphql"))?)
}

/// OAuth token endpoint on the login host
pub fn token_url(auth_url: &str) -> Result<Url> {
    let base = Url::parse(auth_url.trim_end_matches('/'))?;
    Ok(base.join("/services/oauth2/token")?)
}
