//! State manager implementation
//!
//! Provides file-based state persistence with atomic writes.

use super::types::SyncState;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// State manager for persisting and loading state
#[derive(Debug)]
pub struct StateManager {
    /// Path to the state file
    path: PathBuf,
    /// Current state (cached)
    state: Arc<RwLock<SyncState>>,
    /// Whether to auto-save on every update
    auto_save: bool,
}

impl StateManager {
    /// Create a new state manager with the given path
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            state: Arc::new(RwLock::new(SyncState::new())),
            auto_save: true,
        }
    }

    /// Create an in-memory state manager (no file persistence)
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::new(),
            state: Arc::new(RwLock::new(SyncState::new())),
            auto_save: false,
        }
    }

    /// Create a state manager from a file, loading existing state if present
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| Error::state(format!("Failed to read state file: {e}")))?;
            parse(&contents)?
        } else {
            SyncState::new()
        };

        Ok(Self {
            path,
            state: Arc::new(RwLock::new(state)),
            auto_save: true,
        })
    }

    /// Create a state manager from inline JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self {
            path: PathBuf::new(),
            state: Arc::new(RwLock::new(parse(json)?)),
            auto_save: false,
        })
    }

    /// Load state from file
    pub async fn load(&self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }

        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::state(format!("Failed to read state file: {e}")))?;
        let loaded = parse(&contents)?;

        *self.state.write().await = loaded;
        Ok(())
    }

    /// Save current state to file
    pub async fn save(&self) -> Result<()> {
        if self.is_in_memory() {
            return Ok(());
        }

        let contents = self.to_json_pretty().await?;

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::state(format!("Failed to write state file: {e}")))?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| Error::state(format!("Failed to rename state file: {e}")))?;

        debug!("Saved state to {}", self.path.display());
        Ok(())
    }

    /// Snapshot of the current state
    pub async fn snapshot(&self) -> SyncState {
        self.state.read().await.clone()
    }

    /// Export state as pretty-printed JSON string
    pub async fn to_json_pretty(&self) -> Result<String> {
        let state = self.state.read().await;
        serde_json::to_string_pretty(&*state)
            .map_err(|e| Error::state(format!("Failed to serialize state: {e}")))
    }

    /// Persisted incremental read offset
    pub async fn high_water_mark(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.high_water_mark
    }

    /// Store the incremental read offset
    pub async fn set_high_water_mark(&self, mark: DateTime<Utc>) -> Result<()> {
        self.state.write().await.high_water_mark = Some(mark);

        if self.auto_save {
            self.save().await?;
        }
        Ok(())
    }

    /// Record a completed batch read of a table
    pub async fn record_batch_read(
        &self,
        table: &str,
        rows: u64,
        finished_at: DateTime<Utc>,
    ) -> Result<()> {
        self.state
            .write()
            .await
            .record_batch_read(table, rows, finished_at);

        if self.auto_save {
            self.save().await?;
        }
        Ok(())
    }

    /// Clear all state
    pub async fn clear(&self) -> Result<()> {
        *self.state.write().await = SyncState::new();

        if self.auto_save {
            self.save().await?;
        }
        Ok(())
    }

    /// Get the state file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if using in-memory mode
    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str().is_empty()
    }
}

impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            state: Arc::clone(&self.state),
            auto_save: self.auto_save,
        }
    }
}

fn parse(contents: &str) -> Result<SyncState> {
    serde_json::from_str(contents)
        .map_err(|e| Error::state(format!("Failed to parse state file: {e}")))
}
