//! UI API GraphQL query construction
//!
//! One query document per (entity, read path); the cursor and page size
//! travel as variables so cursor values never need escaping.

use crate::error::{Error, Result};
use crate::invoker::QueryKind;
use crate::schema::{fields_of, LAST_MODIFIED_FIELD, PRIMARY_KEY_FIELD};
use serde_json::{json, Value};

/// Build the query document for a table
pub fn build_query(table: &str, kind: QueryKind) -> Result<String> {
    let fields = fields_of(table)
        .ok_or_else(|| Error::config(format!("Table '{table}' is not in the catalog")))?;

    let mut selection = String::from(PRIMARY_KEY_FIELD);
    for (name, _, _) in fields {
        selection.push_str(&format!(" {name} {{ value }}"));
    }

    let order = match kind {
        QueryKind::Batch => String::new(),
        QueryKind::Stream => format!(", orderBy: {{ {LAST_MODIFIED_FIELD}: {{ order: DESC }} }}"),
    };

    Ok(format!(
        "query read($first: Int, $after: String) {{ uiapi {{ query {{ \
         {table}(first: $first, after: $after{order}) {{ \
         edges {{ node {{ {selection} }} }} \
         pageInfo {{ hasNextPage endCursor }} }} }} }} }}"
    ))
}

/// Build the request body for a page
pub fn build_body(table: &str, kind: QueryKind, after: Option<&str>, page_size: u32) -> Result<Value> {
    Ok(json!({
        "query": build_query(table, kind)?,
        "variables": {
            "first": page_size,
            "after": after,
        }
    }))
}
