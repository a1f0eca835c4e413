//! State management module
//!
//! Persists the incremental read offset between runs so that a restarted
//! `stream` command only reports rows changed since the previous poll.
//!
//! # Overview
//!
//! The state module provides:
//! - `SyncState` - high-water mark plus per-table batch bookkeeping
//! - `StateManager` - File-based state persistence with atomic writes

mod manager;
mod types;

pub use manager::StateManager;
pub use types::{SyncState, TableState};
