//! Result validator
//!
//! Checks that a UI API query response carries the nested structure the
//! readers walk: `uiapi.query.<table>.edges[0]` plus `pageInfo`. The first
//! missing piece is reported; later pieces are not inspected.

use crate::types::JsonValue;
use std::fmt;
use tracing::warn;

/// First missing piece of a query response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    /// No `uiapi` wrapper
    MissingUiApi,
    /// No `uiapi.query` map
    MissingQuery,
    /// No entry for the table under `uiapi.query`
    MissingTable { table: String },
    /// `edges` absent or not an array
    MissingEdges { table: String },
    /// `edges` is an empty array
    NoEdges { table: String },
    /// No `pageInfo` block
    MissingPageInfo { table: String },
}

impl ValidationFailure {
    /// Dotted path of the missing field
    pub fn path(&self) -> String {
        match self {
            Self::MissingUiApi => "uiapi".to_string(),
            Self::MissingQuery => "uiapi.query".to_string(),
            Self::MissingTable { table } => format!("uiapi.query.{table}"),
            Self::MissingEdges { table } => format!("uiapi.query.{table}.edges"),
            Self::NoEdges { table } => format!("uiapi.query.{table}.edges[0]"),
            Self::MissingPageInfo { table } => format!("uiapi.query.{table}.pageInfo"),
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Query result not contains param which name is '{}'", self.path())
    }
}

/// Pagination block of a page
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageInfo {
    /// More pages follow
    pub has_next_page: bool,
    /// Cursor for the next page
    pub end_cursor: Option<String>,
}

impl PageInfo {
    fn from_json(value: &JsonValue) -> Self {
        Self {
            has_next_page: value
                .get("hasNextPage")
                .and_then(JsonValue::as_bool)
                .unwrap_or(false),
            end_cursor: value
                .get("endCursor")
                .and_then(JsonValue::as_str)
                .map(String::from),
        }
    }
}

/// A validated page borrowed from the response body
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a> {
    /// Edge envelopes, each holding a `node`
    pub edges: &'a [JsonValue],
    /// Pagination block
    pub page_info: PageInfo,
}

impl<'a> Page<'a> {
    /// Record payloads of the page
    ///
    /// Edges without a `node` are skipped with a warning.
    pub fn nodes(&self) -> impl Iterator<Item = &'a JsonValue> + 'a {
        let edges = self.edges;
        edges.iter().filter_map(|edge| {
            let node = present(edge.get("node"));
            if node.is_none() {
                warn!("Skipping edge without a node: {}", edge);
            }
            node
        })
    }
}

/// Validate a response `data` member, returning the page or the first missing path
pub fn inspect<'a>(data: &'a JsonValue, table: &str) -> Result<Page<'a>, ValidationFailure> {
    let uiapi = present(data.get("uiapi")).ok_or(ValidationFailure::MissingUiApi)?;
    let query = present(uiapi.get("query")).ok_or(ValidationFailure::MissingQuery)?;
    let result = present(query.get(table)).ok_or_else(|| ValidationFailure::MissingTable {
        table: table.to_string(),
    })?;
    let edges = result
        .get("edges")
        .and_then(JsonValue::as_array)
        .ok_or_else(|| ValidationFailure::MissingEdges {
            table: table.to_string(),
        })?;
    if edges.first().map_or(true, JsonValue::is_null) {
        return Err(ValidationFailure::NoEdges {
            table: table.to_string(),
        });
    }
    let page_info =
        present(result.get("pageInfo")).ok_or_else(|| ValidationFailure::MissingPageInfo {
            table: table.to_string(),
        })?;

    Ok(Page {
        edges,
        page_info: PageInfo::from_json(page_info),
    })
}

/// Boolean gate over [`inspect`]; logs one warning on failure
pub fn check_http_result(data: &JsonValue, table: &str) -> bool {
    match inspect(data, table) {
        Ok(_) => true,
        Err(failure) => {
            report(&failure, data);
            false
        }
    }
}

/// Log a validation failure the way [`check_http_result`] does
pub(crate) fn report(failure: &ValidationFailure, data: &JsonValue) {
    warn!("{}, result: {}", failure, data);
}

/// Page-info block of a response whose edge list is empty
///
/// Incremental reads treat such a response as an empty page rather than a
/// malformed one.
pub(crate) fn empty_page_info(data: &JsonValue, table: &str) -> Option<PageInfo> {
    let result = data.get("uiapi")?.get("query")?.get(table)?;
    let edges = result.get("edges")?.as_array()?;
    if !edges.is_empty() {
        return None;
    }
    present(result.get("pageInfo")).map(PageInfo::from_json)
}

fn present(value: Option<&JsonValue>) -> Option<&JsonValue> {
    value.filter(|v| !v.is_null())
}
