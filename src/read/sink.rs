//! Sinks
//!
//! Downstream consumers of decoded rows and change events. Hosts provide
//! their own; [`MemorySink`] and [`JsonLinesSink`] cover tests and the CLI.

use crate::error::Result;
use crate::types::{EventType, JsonObject, Row};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

// ============================================================================
// Change Events
// ============================================================================

/// One changed row reported by an incremental read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    /// Insert or update
    pub event_type: EventType,
    /// Entity the row belongs to
    pub table_name: String,
    /// Decoded row
    pub after_data: Row,
    /// Detection time, epoch milliseconds
    pub reference_time: i64,
}

// ============================================================================
// Sink Traits
// ============================================================================

/// Receives pages of rows from a batch read
#[async_trait]
pub trait BatchSink: Send + Sync {
    /// Deliver one page
    async fn send(&self, rows: Vec<Row>, table: &str, metadata: &JsonObject, is_last: bool)
        -> Result<()>;
}

/// Receives change events from an incremental read
#[async_trait]
pub trait StreamSink: Send + Sync {
    /// Deliver the events of one page
    async fn send(&self, events: Vec<ChangeEvent>, table: &str, metadata: &JsonObject)
        -> Result<()>;
}

// ============================================================================
// Memory Sink
// ============================================================================

/// A recorded batch delivery
#[derive(Debug, Clone, PartialEq)]
pub struct BatchDelivery {
    pub table: String,
    pub rows: Vec<Row>,
    pub is_last: bool,
}

/// A recorded stream delivery
#[derive(Debug, Clone, PartialEq)]
pub struct StreamDelivery {
    pub table: String,
    pub events: Vec<ChangeEvent>,
}

/// Sink that keeps every delivery in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    batches: Mutex<Vec<BatchDelivery>>,
    streams: Mutex<Vec<StreamDelivery>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Batch deliveries in arrival order
    pub fn batches(&self) -> Vec<BatchDelivery> {
        self.batches
            .lock()
            .map(|b| b.clone())
            .unwrap_or_default()
    }

    /// Stream deliveries in arrival order
    pub fn streams(&self) -> Vec<StreamDelivery> {
        self.streams
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// All rows across batch deliveries
    pub fn rows(&self) -> Vec<Row> {
        self.batches().into_iter().flat_map(|b| b.rows).collect()
    }

    /// All events across stream deliveries
    pub fn events(&self) -> Vec<ChangeEvent> {
        self.streams().into_iter().flat_map(|s| s.events).collect()
    }
}

#[async_trait]
impl BatchSink for MemorySink {
    async fn send(
        &self,
        rows: Vec<Row>,
        table: &str,
        _metadata: &JsonObject,
        is_last: bool,
    ) -> Result<()> {
        let mut batches = self
            .batches
            .lock()
            .map_err(|_| crate::error::Error::Other("memory sink poisoned".to_string()))?;
        batches.push(BatchDelivery {
            table: table.to_string(),
            rows,
            is_last,
        });
        Ok(())
    }
}

#[async_trait]
impl StreamSink for MemorySink {
    async fn send(
        &self,
        events: Vec<ChangeEvent>,
        table: &str,
        _metadata: &JsonObject,
    ) -> Result<()> {
        let mut streams = self
            .streams
            .lock()
            .map_err(|_| crate::error::Error::Other("memory sink poisoned".to_string()))?;
        streams.push(StreamDelivery {
            table: table.to_string(),
            events,
        });
        Ok(())
    }
}

// ============================================================================
// JSON Lines Sink
// ============================================================================

/// Sink writing one JSON document per row or event
pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
    count: AtomicU64,
}

impl<W: Write + Send> JsonLinesSink<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
            count: AtomicU64::new(0),
        }
    }

    /// Lines written so far
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_lines<T: Serialize>(&self, items: &[T]) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| crate::error::Error::Other("writer poisoned".to_string()))?;
        for item in items {
            serde_json::to_writer(&mut *writer, item)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;

        self.count.fetch_add(items.len() as u64, Ordering::Relaxed);
        Ok(())
    }
}

#[derive(Serialize)]
struct RowLine<'a> {
    table: &'a str,
    data: &'a Row,
}

#[async_trait]
impl<W: Write + Send> BatchSink for JsonLinesSink<W> {
    async fn send(
        &self,
        rows: Vec<Row>,
        table: &str,
        _metadata: &JsonObject,
        _is_last: bool,
    ) -> Result<()> {
        let lines: Vec<RowLine<'_>> = rows.iter().map(|data| RowLine { table, data }).collect();
        self.write_lines(&lines)
    }
}

#[async_trait]
impl<W: Write + Send> StreamSink for JsonLinesSink<W> {
    async fn send(
        &self,
        events: Vec<ChangeEvent>,
        _table: &str,
        _metadata: &JsonObject,
    ) -> Result<()> {
        self.write_lines(&events)
    }
}
