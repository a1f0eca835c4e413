//! Incremental reader
//!
//! Polls each table newest-first and reports rows modified after the
//! session's high-water mark. The first row at or before the mark ends the
//! table: everything after it in modification order has been seen.

use super::decode::{decode_node, field_str};
use super::session::ReadSession;
use super::sink::{ChangeEvent, StreamSink};
use super::validate::{empty_page_info, inspect, report, ValidationFailure};
use super::{dispatch, LastResponse};
use crate::config::ClientInfo;
use crate::error::Result;
use crate::invoker::{Invoker, Operation, QueryKind};
use crate::schema::{CREATED_FIELD, LAST_MODIFIED_FIELD};
use crate::types::{EventType, JsonObject, JsonValue};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Report changed rows of `tables` to `sink`
///
/// Each page's events are delivered together, and only when the page
/// produced at least one. A malformed page ends the whole read without an
/// error.
pub async fn stream_read(
    session: &mut ReadSession,
    invoker: &dyn Invoker,
    client: &ClientInfo,
    tables: &[String],
    page_size: u32,
    sink: &dyn StreamSink,
) -> Result<()> {
    if tables.is_empty() {
        return Ok(());
    }

    let metadata = JsonObject::new();
    let mut last_response = LastResponse::default();

    for table in tables {
        if !session.is_alive() {
            break;
        }
        session.reset_cursor();
        let mut first = true;

        loop {
            if !session.is_alive() {
                return Ok(());
            }

            let operation = match session.after() {
                Some(after) if !first => {
                    Operation::next_page(table.as_str(), QueryKind::Stream, after, page_size)
                }
                _ => Operation::first_page(table.as_str(), QueryKind::Stream, page_size),
            };
            let response = dispatch(invoker, &operation, client, &last_response).await?;
            last_response.record(&response);
            first = false;

            let data = response.data().unwrap_or(&JsonValue::Null);
            let (page_info, stale) = match inspect(data, table) {
                Ok(page) => {
                    session.set_after(page.page_info.end_cursor.clone());
                    let mut events = Vec::new();
                    let mut stale = false;

                    for node in page.nodes() {
                        if !session.is_alive() {
                            break;
                        }
                        match classify(node, session.high_water_mark()) {
                            Some(event_type) => {
                                events.push(ChangeEvent {
                                    event_type,
                                    table_name: table.clone(),
                                    after_data: decode_node(node),
                                    reference_time: session.now().timestamp_millis(),
                                });
                                session.touch();
                            }
                            None => {
                                session.touch();
                                stale = true;
                                break;
                            }
                        }
                    }

                    if !events.is_empty() {
                        debug!("{}: delivering {} change events", operation, events.len());
                        sink.send(events, table, &metadata).await?;
                    }
                    (page.page_info, stale)
                }
                Err(failure @ ValidationFailure::NoEdges { .. }) => {
                    match empty_page_info(data, table) {
                        Some(info) => {
                            debug!("{}: empty page", operation);
                            session.set_after(info.end_cursor.clone());
                            (info, false)
                        }
                        None => {
                            report(&failure, data);
                            return Ok(());
                        }
                    }
                }
                Err(failure) => {
                    report(&failure, data);
                    return Ok(());
                }
            };

            if stale || !page_info.has_next_page || session.after().is_none() {
                break;
            }
        }
    }

    Ok(())
}

/// Event type for a row newer than `mark`, `None` when already seen
///
/// Insert when the modification and creation stamps are identical, update
/// otherwise. A row whose modification stamp cannot be read counts as seen.
fn classify(node: &JsonValue, mark: DateTime<Utc>) -> Option<EventType> {
    let modified = field_str(node, LAST_MODIFIED_FIELD)?;
    if parse_timestamp(modified)? <= mark {
        return None;
    }

    if field_str(node, CREATED_FIELD) == Some(modified) {
        Some(EventType::Insert)
    } else {
        Some(EventType::Update)
    }
}

/// Parse a Salesforce datetime (`2024-03-01T12:00:00.000Z` or `...+0000`)
pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
