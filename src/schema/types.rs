//! Schema types

use crate::types::FieldType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Description of one remote field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    /// Logical type
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Whether the remote value may be null
    pub nullable: bool,

    /// Whether this field is the table's primary key
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_primary_key: bool,

    /// Position within the primary key (1-based)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key_pos: Option<u32>,
}

impl FieldSpec {
    /// Create a non-key field
    pub fn new(field_type: FieldType, nullable: bool) -> Self {
        Self {
            field_type,
            nullable,
            is_primary_key: false,
            primary_key_pos: None,
        }
    }

    /// Create a primary key field at the given position
    pub fn primary_key(field_type: FieldType, position: u32) -> Self {
        Self {
            field_type,
            nullable: false,
            is_primary_key: true,
            primary_key_pos: Some(position),
        }
    }
}

/// Shape of one remote entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Entity API name, e.g. `Contact`
    pub name: String,

    /// Field name to field description
    pub fields: BTreeMap<String, FieldSpec>,
}

impl TableSchema {
    /// Create an empty table schema
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Add a field
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.fields.insert(name.into(), spec);
        self
    }

    /// Look up a field
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    /// Primary key fields ordered by position
    pub fn primary_keys(&self) -> Vec<&str> {
        let mut keys: Vec<(&str, u32)> = self
            .fields
            .iter()
            .filter(|(_, spec)| spec.is_primary_key)
            .map(|(name, spec)| (name.as_str(), spec.primary_key_pos.unwrap_or(0)))
            .collect();
        keys.sort_by_key(|(_, pos)| *pos);
        keys.into_iter().map(|(name, _)| name).collect()
    }
}
