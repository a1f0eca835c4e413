//! Configuration types for the connector
//!
//! Settings are read from a YAML (or JSON) file, optionally overridden by
//! environment variables, and split into the static client credentials and
//! the mutable connection state that token operations rewrite.

use crate::error::{Error, Result};
use crate::types::OptionStringExt;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest page the UI API GraphQL endpoint accepts
pub const MAX_PAGE_SIZE: u32 = 2000;

// ============================================================================
// Client Info
// ============================================================================

/// Static OAuth client credentials and API coordinates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    /// Connected app consumer key
    #[serde(default)]
    pub client_id: String,

    /// Connected app consumer secret
    #[serde(default)]
    pub client_secret: String,

    /// Login host used for token operations
    #[serde(default = "default_auth_url", alias = "url")]
    pub auth_url: String,

    /// REST API version, without the leading `v`
    #[serde(default = "default_api_version", alias = "version")]
    pub api_version: String,
}

impl ClientInfo {
    /// Create client info with default login host and API version
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            auth_url: default_auth_url(),
            api_version: default_api_version(),
        }
    }

    /// Override the login host
    #[must_use]
    pub fn with_auth_url(mut self, auth_url: impl Into<String>) -> Self {
        self.auth_url = auth_url.into();
        self
    }

    /// Ensure the credentials needed for token operations are present
    pub fn validate(&self) -> Result<()> {
        if self.client_id.is_empty() {
            return Err(Error::missing_field("client.client_id"));
        }
        if self.client_secret.is_empty() {
            return Err(Error::missing_field("client.client_secret"));
        }
        Ok(())
    }
}

impl Default for ClientInfo {
    fn default() -> Self {
        Self::new("", "")
    }
}

fn default_auth_url() -> String {
    "https://login.salesforce.com".to_string()
}

fn default_api_version() -> String {
    "57.0".to_string()
}

// ============================================================================
// Connection Config
// ============================================================================

/// Mutable per-connection state owned by the host
///
/// Token operations rewrite these fields in place; field names on the wire
/// match what the host persists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Current access token
    #[serde(rename = "Authorization", alias = "access_token", default)]
    pub authorization: Option<String>,

    /// Long-lived refresh token
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Instance URL, e.g. `https://example.my.salesforce.com`
    #[serde(rename = "_endpoint", alias = "instance_url", default)]
    pub endpoint: Option<String>,
}

impl ConnectionConfig {
    /// Create an empty connection config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the access token
    #[must_use]
    pub fn with_authorization(mut self, token: impl Into<String>) -> Self {
        self.authorization = Some(token.into());
        self
    }

    /// Set the refresh token
    #[must_use]
    pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
        self.refresh_token = Some(token.into());
        self
    }

    /// Set the instance URL
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Instance URL, or an error naming the missing field
    pub fn endpoint(&self) -> Result<&str> {
        self.endpoint
            .as_deref()
            .filter(|e| !e.is_empty())
            .ok_or_else(|| Error::missing_field("connection._endpoint"))
    }

    /// Access token, or an error naming the missing field
    pub fn access_token(&self) -> Result<&str> {
        self.authorization
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::missing_field("connection.Authorization"))
    }
}

// ============================================================================
// HTTP Config
// ============================================================================

/// HTTP invoker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Client-side request budget
    #[serde(default = "default_rps")]
    pub requests_per_second: u32,

    /// Token bucket burst size
    #[serde(default = "default_burst")]
    pub burst_size: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            requests_per_second: default_rps(),
            burst_size: default_burst(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_rps() -> u32 {
    20
}

fn default_burst() -> u32 {
    20
}

// ============================================================================
// Connector Settings
// ============================================================================

/// Complete settings file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorSettings {
    /// OAuth client credentials
    #[serde(default)]
    pub client: ClientInfo,

    /// Tokens and instance URL
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// HTTP invoker settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Records requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Seconds between incremental polls in follow mode
    #[serde(default = "default_stream_interval")]
    pub stream_read_interval_secs: u64,
}

impl Default for ConnectorSettings {
    fn default() -> Self {
        Self {
            client: ClientInfo::default(),
            connection: ConnectionConfig::default(),
            http: HttpConfig::default(),
            page_size: default_page_size(),
            stream_read_interval_secs: default_stream_interval(),
        }
    }
}

fn default_page_size() -> u32 {
    200
}

fn default_stream_interval() -> u64 {
    60
}

impl ConnectorSettings {
    /// Parse settings from YAML (JSON documents are accepted too)
    pub fn from_yaml(content: &str) -> Result<Self> {
        let settings: Self = serde_yaml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Write settings back, e.g. after a token exchange
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let content = if is_json {
            serde_json::to_string_pretty(self)?
        } else {
            serde_yaml::to_string(self)?
        };
        let temp_path = path.with_extension("tmp");
        std::fs::write(&temp_path, content)?;
        std::fs::rename(&temp_path, path)?;
        Ok(())
    }

    /// Apply `SALESFORCE_*` environment overrides
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (environment in production)
    #[must_use]
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).none_if_empty();
        if let Some(v) = get("SALESFORCE_CLIENT_ID") {
            self.client.client_id = v;
        }
        if let Some(v) = get("SALESFORCE_CLIENT_SECRET") {
            self.client.client_secret = v;
        }
        if let Some(v) = get("SALESFORCE_ACCESS_TOKEN") {
            self.connection.authorization = Some(v);
        }
        if let Some(v) = get("SALESFORCE_REFRESH_TOKEN") {
            self.connection.refresh_token = Some(v);
        }
        if let Some(v) = get("SALESFORCE_INSTANCE_URL") {
            self.connection.endpoint = Some(v);
        }
        self
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(Error::invalid_value(
                "page_size",
                format!("must be between 1 and {MAX_PAGE_SIZE}"),
            ));
        }
        if self.http.timeout_seconds == 0 {
            return Err(Error::invalid_value("http.timeout_seconds", "must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn test_parse_minimal_settings() {
        let yaml = r#"
client:
  client_id: "abc"
  client_secret: "shh"
"#;

        let settings = ConnectorSettings::from_yaml(yaml).unwrap();
        assert_eq!(settings.client.client_id, "abc");
        assert_eq!(settings.client.auth_url, "https://login.salesforce.com");
        assert_eq!(settings.client.api_version, "57.0");
        assert_eq!(settings.page_size, 200);
        assert_eq!(settings.stream_read_interval_secs, 60);
        assert_eq!(settings.http.timeout_seconds, 30);
        assert!(settings.connection.authorization.is_none());
    }

    #[test]
    fn test_parse_connection_wire_names() {
        let json = r#"{
            "connection": {
                "Authorization": "00Dxx!token",
                "refresh_token": "5Aep",
                "_endpoint": "https://acme.my.salesforce.com"
            }
        }"#;

        let settings = ConnectorSettings::from_yaml(json).unwrap();
        assert_eq!(
            settings.connection,
            ConnectionConfig::new()
                .with_authorization("00Dxx!token")
                .with_refresh_token("5Aep")
                .with_endpoint("https://acme.my.salesforce.com")
        );

        let out = serde_json::to_value(&settings.connection).unwrap();
        assert_eq!(out["Authorization"], "00Dxx!token");
        assert_eq!(out["_endpoint"], "https://acme.my.salesforce.com");
    }

    #[test]
    fn test_page_size_bounds() {
        let err = ConnectorSettings::from_yaml("page_size: 0").unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue { .. }));

        let err = ConnectorSettings::from_yaml("page_size: 5000").unwrap_err();
        assert!(err.to_string().contains("page_size"));
    }

    #[test]
    fn test_client_validate() {
        assert!(matches!(
            ClientInfo::default().validate(),
            Err(Error::MissingConfigField { .. })
        ));
        assert!(ClientInfo::new("id", "secret").validate().is_ok());
    }

    #[test]
    fn test_connection_accessors() {
        let config = ConnectionConfig::new().with_endpoint("");
        assert!(config.endpoint().is_err());
        assert!(config.access_token().is_err());

        let config = config.with_endpoint("https://x").with_authorization("t");
        assert_eq!(config.endpoint().unwrap(), "https://x");
        assert_eq!(config.access_token().unwrap(), "t");
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("SALESFORCE_CLIENT_ID", "env-id"),
            ("SALESFORCE_REFRESH_TOKEN", "env-refresh"),
            ("SALESFORCE_INSTANCE_URL", ""),
        ]
        .into_iter()
        .collect();

        let settings = ConnectorSettings::default()
            .with_overrides(|key| env.get(key).map(|v| (*v).to_string()));

        assert_eq!(settings.client.client_id, "env-id");
        assert_eq!(
            settings.connection.refresh_token.as_deref(),
            Some("env-refresh")
        );
        assert!(settings.connection.endpoint.is_none());
    }

    #[test]
    fn test_save_round_trips_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut settings = ConnectorSettings::from_yaml("page_size: 50").unwrap();
        settings.connection.authorization = Some("fresh".to_string());
        settings.save(&path).unwrap();

        let loaded = ConnectorSettings::from_file(&path).unwrap();
        assert_eq!(loaded.page_size, 50);
        assert_eq!(loaded.connection.authorization.as_deref(), Some("fresh"));
    }

    #[test]
    fn test_missing_file() {
        let err = ConnectorSettings::from_file("/nonexistent/settings.yaml").unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }
}
