//! State types for tracking sync progress
//!
//! These types are serialized to JSON and persisted between runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete state for a connector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncState {
    /// Incremental read offset; rows modified at or before it are not reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_water_mark: Option<DateTime<Utc>>,

    /// Per-table batch read bookkeeping
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tables: BTreeMap<String, TableState>,
}

impl SyncState {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed batch read
    pub fn record_batch_read(&mut self, table: &str, rows: u64, finished_at: DateTime<Utc>) {
        let entry = self.tables.entry(table.to_string()).or_default();
        entry.last_batch_read = Some(finished_at);
        entry.rows_read = rows;
    }
}

/// State for a single table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableState {
    /// When the last full read of the table finished
    #[serde(default)]
    pub last_batch_read: Option<DateTime<Utc>>,

    /// Rows delivered by that read
    #[serde(default)]
    pub rows_read: u64,
}
