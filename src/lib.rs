// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Salesforce Connector
//!
//! Source connector for Salesforce CRM records over the UI API GraphQL
//! endpoint: Contact, Opportunity and Lead.
//!
//! ## Features
//!
//! - **Schema Catalog**: Fixed field lists per entity, `Id` as primary key
//! - **Batch Reads**: Cursor-paginated full extraction, one delivery per page
//! - **Incremental Reads**: Newest-first polling against a high-water mark
//! - **Token Handling**: OAuth code exchange, reactive refresh, quota errors
//! - **Connection Test**: Per-entity permission probes with a summary
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use salesforce_connector::{Connector, ConnectorSettings, MemorySink, ReadSession, SalesforceConnector};
//!
//! #[tokio::main]
//! async fn main() -> salesforce_connector::Result<()> {
//!     let settings = ConnectorSettings::from_file("salesforce.yaml")?.with_env_overrides();
//!     let connector = SalesforceConnector::from_settings(&settings)?;
//!
//!     let sink = MemorySink::new();
//!     let mut session = ReadSession::new();
//!     connector.batch_read(&mut session, "Contact", 200, &sink).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Connector Interface                         │
//! │  discover_schema   batch_read   stream_read   connection_test   │
//! │  command_callback  update_token                                 │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │  Schema  │   Read    │     Auth      │ Diagnostic│   Invoker   │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ Catalog  │ Session   │ OAuth code    │ Probes    │ GraphQL     │
//! │          │ Validator │ Refresh       │ Summary   │ Token calls │
//! │          │ Sinks     │ Rate limits   │           │ Rate limit  │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the connector
pub mod error;

/// Common types and type aliases
pub mod types;

/// Settings, client credentials and connection config
pub mod config;

/// Entity schema catalog
pub mod schema;

/// Operation dispatch seam
pub mod invoker;

/// HTTP invoker with interception and rate limiting
pub mod http;

/// OAuth exchange and token refresh
pub mod auth;

/// Batch and incremental readers
pub mod read;

/// Connectivity prober
pub mod diagnostics;

/// State management and checkpointing
pub mod state;

/// Connector trait and Salesforce implementation
pub mod connector;

/// Command-line interface
pub mod cli;

#[cfg(test)]
mod test_support;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::{ClientInfo, ConnectionConfig, ConnectorSettings};
pub use connector::{Connector, SalesforceConnector};
pub use invoker::{ApiResponse, Invoker, Operation, QueryKind};
pub use read::{ChangeEvent, JsonLinesSink, MemorySink, ReadSession};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
