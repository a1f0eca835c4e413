//! Error types for the Salesforce connector
//!
//! All fallible public APIs return `Result<T, Error>` where Error is defined here.
//! Malformed response envelopes are not errors: see
//! [`ValidationFailure`](crate::read::ValidationFailure).

use thiserror::Error;

/// The main error type for the connector
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Dispatch Errors
    // ============================================================================
    #[error("Failed to query the data. Please check the connection. Operation '{operation}': {message}{}", last_response_suffix(.last_response))]
    Connection {
        operation: String,
        message: String,
        last_response: Option<String>,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    #[error("Rate limited: {message}")]
    RateLimit { message: String },

    #[error("Token refresh failed: {message}")]
    AuthRefresh { message: String },

    #[error("OAuth2 error: {message}")]
    OAuth2 { message: String },

    // ============================================================================
    // State Errors
    // ============================================================================
    #[error("State error: {message}")]
    State { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a dispatch failure for a named operation
    pub fn connection(
        operation: impl Into<String>,
        message: impl Into<String>,
        last_response: Option<String>,
    ) -> Self {
        Self::Connection {
            operation: operation.into(),
            message: message.into(),
            last_response,
        }
    }

    /// Create a rate limit error carrying the vendor message
    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::RateLimit {
            message: message.into(),
        }
    }

    /// Create a token refresh error
    pub fn auth_refresh(message: impl Into<String>) -> Self {
        Self::AuthRefresh {
            message: message.into(),
        }
    }

    /// Create an OAuth2 error
    pub fn oauth2(message: impl Into<String>) -> Self {
        Self::OAuth2 {
            message: message.into(),
        }
    }

    /// Create a state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    /// Whether a poller should back off and try again later
    ///
    /// Quota exhaustion and transport failures are transient. Dispatch
    /// failures carry the transport message, so they count too.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::RateLimit { .. } | Error::Connection { .. }
        )
    }
}

fn last_response_suffix(last_response: &Option<String>) -> String {
    last_response
        .as_ref()
        .map(|r| format!(" (last response: {r})"))
        .unwrap_or_default()
}

/// Result type alias for the connector
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
