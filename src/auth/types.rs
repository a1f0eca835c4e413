//! Token manager types

use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};

/// Host command that starts the OAuth code exchange
pub const OAUTH_COMMAND: &str = "OAuth";

/// Vendor error code for an expired or revoked session
pub const INVALID_SESSION_ID: &str = "INVALID_SESSION_ID";

/// Vendor error code for an exhausted API quota
pub const REQUEST_LIMIT_EXCEEDED: &str = "REQUEST_LIMIT_EXCEEDED";

/// Command sent by the host to the connector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandInfo {
    /// Command name, e.g. `OAuth`
    pub command: String,

    /// Command arguments
    #[serde(default, rename = "argMap")]
    pub args: JsonObject,
}

impl CommandInfo {
    /// Create a command without arguments
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: JsonObject::new(),
        }
    }

    /// Add a string argument
    #[must_use]
    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.args
            .insert(key.into(), JsonValue::String(value.into()));
        self
    }

    /// Required string argument
    pub fn arg(&self, key: &str) -> Result<&str> {
        self.args
            .get(key)
            .and_then(JsonValue::as_str)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::missing_field(key))
    }
}

/// New access token handed back to the host after a refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRefresh {
    /// The refreshed access token
    pub access_token: String,
}

/// OAuth token endpoint response
#[derive(Debug, Default, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub instance_url: Option<String>,
}
