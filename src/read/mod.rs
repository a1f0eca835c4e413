//! Read module
//!
//! Batch and incremental readers over the UI API query endpoint.
//!
//! # Overview
//!
//! - [`ReadSession`] - cursor, high-water mark and cancellation for one run
//! - [`inspect`] / [`check_http_result`] - response shape validation
//! - [`batch_read`] - full table extraction, one sink delivery per page
//! - [`stream_read`] - change polling against the high-water mark
//! - [`BatchSink`] / [`StreamSink`] - delivery targets
//!
//! # Example
//!
//! ```ignore
//! let mut session = ReadSession::new();
//! let sink = MemorySink::new();
//! batch_read(&mut session, &invoker, &client, "Contact", 200, &sink).await?;
//! ```

mod batch;
mod decode;
mod session;
mod sink;
mod stream;
mod validate;

pub use batch::batch_read;
pub use decode::decode_node;
pub use session::{Clock, ReadSession};
pub use sink::{
    BatchDelivery, BatchSink, ChangeEvent, JsonLinesSink, MemorySink, StreamDelivery, StreamSink,
};
pub use stream::stream_read;
pub use validate::{check_http_result, inspect, Page, PageInfo, ValidationFailure};

use crate::config::ClientInfo;
use crate::error::{Error, Result};
use crate::invoker::{ApiResponse, Invoker, Operation};

/// Raw form of the most recent response, kept for dispatch diagnostics
#[derive(Debug, Default)]
struct LastResponse(Option<String>);

impl LastResponse {
    fn record(&mut self, response: &ApiResponse) {
        self.0 = serde_json::to_string(response).ok();
    }
}

/// Invoke a query, attaching the operation name and last response to failures
///
/// Rate-limit and refresh failures pass through unchanged so the host can
/// apply its backoff policy.
async fn dispatch(
    invoker: &dyn Invoker,
    operation: &Operation,
    client: &ClientInfo,
    last: &LastResponse,
) -> Result<ApiResponse> {
    invoker
        .invoke(operation, client)
        .await
        .map_err(|e| match e {
            Error::RateLimit { .. } | Error::AuthRefresh { .. } => e,
            other => Error::connection(operation.name(), other.to_string(), last.0.clone()),
        })
}
