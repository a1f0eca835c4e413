//! Batch reader
//!
//! Full extraction of one table, page by page in server order.

use super::decode::decode_node;
use super::session::ReadSession;
use super::sink::BatchSink;
use super::validate::{inspect, report};
use super::{dispatch, LastResponse};
use crate::config::ClientInfo;
use crate::error::Result;
use crate::invoker::{Invoker, Operation, QueryKind};
use crate::types::{JsonObject, JsonValue, Row};
use tracing::debug;

/// Read every row of `table` into `sink`, one delivery per page
///
/// The first page is always requested; later pages follow while the server
/// reports more and the session is alive. A malformed page ends the read
/// without an error.
pub async fn batch_read(
    session: &mut ReadSession,
    invoker: &dyn Invoker,
    client: &ClientInfo,
    table: &str,
    page_size: u32,
    sink: &dyn BatchSink,
) -> Result<()> {
    session.reset_cursor();
    let metadata = JsonObject::new();
    let mut last_response = LastResponse::default();
    let mut first = true;

    loop {
        let operation = match session.after() {
            Some(after) if !first => Operation::next_page(table, QueryKind::Batch, after, page_size),
            _ => Operation::first_page(table, QueryKind::Batch, page_size),
        };
        let response = dispatch(invoker, &operation, client, &last_response).await?;
        last_response.record(&response);

        let data = response.data().unwrap_or(&JsonValue::Null);
        let page = match inspect(data, table) {
            Ok(page) => page,
            Err(failure) => {
                report(&failure, data);
                return Ok(());
            }
        };

        session.set_after(page.page_info.end_cursor.clone());
        let rows: Vec<Row> = page.nodes().map(decode_node).collect();
        debug!("{}: delivering {} rows", operation, rows.len());
        sink.send(rows, table, &metadata, false).await?;
        session.touch();
        first = false;

        if !page.page_info.has_next_page || session.after().is_none() || !session.is_alive() {
            return Ok(());
        }
    }
}
