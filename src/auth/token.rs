//! Token manager
//!
//! Initial OAuth code exchange and reactive refresh. Neither function
//! retries: rate limits and refresh failures are returned to the host,
//! which owns backoff policy.

use super::types::{
    CommandInfo, TokenRefresh, TokenResponse, INVALID_SESSION_ID, OAUTH_COMMAND,
    REQUEST_LIMIT_EXCEEDED,
};
use crate::config::{ClientInfo, ConnectionConfig};
use crate::error::{Error, Result};
use crate::invoker::{ApiResponse, Invoker, Operation};
use crate::types::JsonValue;
use tracing::{debug, info, warn};

/// Handle a host command
///
/// `OAuth` exchanges the authorization code for tokens and stores the
/// refresh token, access token and instance URL on the connection config,
/// returning the updated config. Other commands are ignored.
pub async fn command_callback(
    connection: &mut ConnectionConfig,
    client: &ClientInfo,
    invoker: &dyn Invoker,
    command: &CommandInfo,
) -> Result<Option<ConnectionConfig>> {
    if command.command != OAUTH_COMMAND {
        debug!("Ignoring command '{}'", command.command);
        return Ok(None);
    }

    let operation = Operation::AccessToken {
        code: command.arg("code")?.to_string(),
        redirect_uri: command.arg("redirect_uri")?.to_string(),
    };
    let response = invoker.invoke_without_intercept(&operation, client).await?;
    if !response.is_success() {
        return Err(Error::oauth2(format!(
            "Token request failed with status {}: {}",
            response.http_code,
            response.message().unwrap_or_default()
        )));
    }

    let token: TokenResponse = serde_json::from_value(response.result)?;
    let access_token = token
        .access_token
        .ok_or_else(|| Error::oauth2("Token response has no access_token"))?;

    connection.authorization = Some(access_token);
    if token.refresh_token.is_some() {
        connection.refresh_token = token.refresh_token;
    }
    if token.instance_url.is_some() {
        connection.endpoint = token.instance_url;
    }
    info!("OAuth exchange complete");

    Ok(Some(connection.clone()))
}

/// React to a failed API response
///
/// - 503 or `REQUEST_LIMIT_EXCEEDED`: [`Error::RateLimit`]
/// - 401 or `INVALID_SESSION_ID`: refresh, store and return the new token
/// - anything else: `Ok(None)`, nothing this connector can fix
pub async fn update_token(
    connection: &mut ConnectionConfig,
    client: &ClientInfo,
    invoker: &dyn Invoker,
    response: &ApiResponse,
) -> Result<Option<TokenRefresh>> {
    if is_rate_limited(response) {
        let message = response
            .find_error(REQUEST_LIMIT_EXCEEDED)
            .and_then(|e| e.get("message"))
            .and_then(JsonValue::as_str)
            .map(String::from)
            .or_else(|| response.message())
            .unwrap_or_else(|| format!("HTTP {}", response.http_code));
        return Err(Error::rate_limit(message));
    }

    if !needs_refresh(response) {
        return Ok(None);
    }

    match refresh(connection, client, invoker).await {
        Ok(refreshed) => Ok(refreshed),
        Err(e) => {
            warn!("Token refresh failed: {}", e);
            Err(match e {
                Error::AuthRefresh { .. } => e,
                other => Error::auth_refresh(other.to_string()),
            })
        }
    }
}

async fn refresh(
    connection: &mut ConnectionConfig,
    client: &ClientInfo,
    invoker: &dyn Invoker,
) -> Result<Option<TokenRefresh>> {
    let refresh_token = connection
        .refresh_token
        .clone()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::auth_refresh("No refresh token on the connection"))?;

    let response = invoker
        .invoke_without_intercept(&Operation::RefreshToken { refresh_token }, client)
        .await?;
    if !response.is_success() {
        return Err(Error::auth_refresh(format!(
            "Refresh token request failed with status {}: {}",
            response.http_code,
            response.message().unwrap_or_default()
        )));
    }

    let token: TokenResponse = serde_json::from_value(response.result).unwrap_or_default();
    Ok(token.access_token.map(|access_token| {
        connection.authorization = Some(access_token.clone());
        debug!("Stored refreshed access token");
        TokenRefresh { access_token }
    }))
}

fn is_rate_limited(response: &ApiResponse) -> bool {
    response.http_code == 503 || response.find_error(REQUEST_LIMIT_EXCEEDED).is_some()
}

fn needs_refresh(response: &ApiResponse) -> bool {
    response.http_code == 401 || response.find_error(INVALID_SESSION_ID).is_some()
}
