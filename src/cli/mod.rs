//! CLI module
//!
//! Command-line interface for running the connector standalone.
//!
//! # Commands
//!
//! - `discover` - List readable tables and fields
//! - `check` - Probe read access per entity
//! - `read` - Full extraction of one table
//! - `stream` - Change polling, optionally in a loop
//! - `oauth` - Authorization-code exchange
//! - `refresh` - Refresh the access token

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
