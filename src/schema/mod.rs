//! Schema catalog module
//!
//! Static description of the remote entities the connector can read.
//!
//! # Overview
//!
//! - `discover_schema` - every supported entity with its fields
//! - `TableSchema` / `FieldSpec` - per-entity and per-field descriptions
//! - `fields_of` - field list used when building queries

mod catalog;
mod types;

pub use catalog::{
    discover_schema, fields_of, is_known_table, table_schema, FieldRow, CREATED_FIELD,
    LAST_MODIFIED_FIELD, PRIMARY_KEY_FIELD, TABLES,
};
pub use types::{FieldSpec, TableSchema};
