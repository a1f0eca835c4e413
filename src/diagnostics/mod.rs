//! Connectivity prober
//!
//! Issues one first-page query per entity and reports, per entity, whether
//! the connected user can read it. Failures are recorded as items; nothing
//! here returns an error.

use crate::config::ClientInfo;
use crate::error::Error;
use crate::invoker::{ApiResponse, Invoker, Operation, QueryKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Entities probed, in order
pub const PROBE_TABLES: [&str; 3] = ["Opportunity", "Contact", "Lead"];

/// Records requested by each probe
const PROBE_PAGE_SIZE: u32 = 1;

/// Summary when every probe passed
pub const ALL_SUPPORTED: &str = "Pass with Opportunity, Contact and Lead";

/// Summary item name when no probe passed
pub const NONE_SUPPORTED_TEST: &str = "Not any table be supported";

/// Summary result when no probe passed
pub const NONE_SUPPORTED: &str = "Opportunity, Contact and Lead not be support";

/// Probe passed
pub const CODE_PASS: i32 = 1;
/// Access denied or entity missing
pub const CODE_DENIED: i32 = 0;
/// Unexpected status or dispatch failure
pub const CODE_ERROR: i32 = -1;

/// One line of a connection test report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestItem {
    /// What was checked
    pub test: String,
    /// 1 pass, 0 denied, -1 error
    pub code: i32,
    /// Human-readable outcome
    pub result: String,
}

impl TestItem {
    /// Create an item
    pub fn new(test: impl Into<String>, code: i32, result: impl Into<String>) -> Self {
        Self {
            test: test.into(),
            code,
            result: result.into(),
        }
    }

    /// Whether the check passed
    pub fn passed(&self) -> bool {
        self.code == CODE_PASS
    }
}

/// Classify an HTTP status into a probe code
pub fn status_code(http_code: u16) -> i32 {
    match http_code {
        200..=299 => CODE_PASS,
        401 | 403 | 404 => CODE_DENIED,
        _ => CODE_ERROR,
    }
}

/// Message recorded for a failed dispatch
pub fn error_message(error: &Error) -> String {
    error.to_string()
}

fn describe(response: &ApiResponse) -> String {
    if response.is_success() {
        return "Pass".to_string();
    }
    match response.message() {
        Some(message) => format!("HTTP {}: {}", response.http_code, message),
        None => format!("HTTP {}", response.http_code),
    }
}

/// Probe read access to every entity and summarize
///
/// Produces one item per entity, then `Read log` and `Read` items when at
/// least one entity is readable, or a single `Not any table be supported`
/// item otherwise.
#[instrument(skip_all)]
pub async fn connection_test(client: &ClientInfo, invoker: &dyn Invoker) -> Vec<TestItem> {
    let mut items = Vec::with_capacity(PROBE_TABLES.len() + 2);

    for table in PROBE_TABLES {
        let test = format!("Permission check: {table}");
        let operation = Operation::first_page(table, QueryKind::Batch, PROBE_PAGE_SIZE);
        let item = match invoker.invoke(&operation, client).await {
            Ok(response) => TestItem::new(test, status_code(response.http_code), describe(&response)),
            Err(e) => TestItem::new(test, CODE_ERROR, error_message(&e)),
        };
        debug!("{} -> {}", item.test, item.code);
        items.push(item);
    }

    let passed: Vec<&str> = PROBE_TABLES
        .iter()
        .zip(&items)
        .filter(|(_, item)| item.passed())
        .map(|(table, _)| *table)
        .collect();

    if passed.is_empty() {
        items.push(TestItem::new(NONE_SUPPORTED_TEST, CODE_DENIED, NONE_SUPPORTED));
    } else {
        let summary = summarize(&passed);
        items.push(TestItem::new("Read log", CODE_PASS, summary.clone()));
        items.push(TestItem::new("Read", CODE_PASS, summary));
    }

    items
}

fn summarize(passed: &[&str]) -> String {
    if passed.len() == PROBE_TABLES.len() {
        return ALL_SUPPORTED.to_string();
    }
    let failed: Vec<&str> = PROBE_TABLES
        .iter()
        .copied()
        .filter(|t| !passed.contains(t))
        .collect();
    format!(
        "Pass only: {} and {} not be support",
        passed.join(", "),
        failed.join(", ")
    )
}
