//! Common types used throughout the connector
//!
//! Shared type aliases plus the small enums that cross module boundaries.

use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// A decoded record: field name to plain JSON value
pub type Row = JsonObject;

// ============================================================================
// Field Type
// ============================================================================

/// Logical type of a remote field, as reported to the host for column mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    String,
    Number,
    Boolean,
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::String => write!(f, "String"),
            FieldType::Number => write!(f, "Number"),
            FieldType::Boolean => write!(f, "Boolean"),
        }
    }
}

// ============================================================================
// Event Type
// ============================================================================

/// Classification of a changed row in incremental reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    /// Row was created after the high-water mark
    #[serde(rename = "i")]
    Insert,
    /// Row existed before and was modified after the high-water mark
    #[serde(rename = "u")]
    Update,
}

impl EventType {
    /// Single-letter code used on the wire
    pub fn code(self) -> &'static str {
        match self {
            EventType::Insert => "i",
            EventType::Update => "u",
        }
    }
}

// ============================================================================
// Utilities
// ============================================================================

/// Extension trait for Option<String> to handle empty strings
pub trait OptionStringExt {
    /// Returns None if the string is empty
    fn none_if_empty(self) -> Option<String>;
}

impl OptionStringExt for Option<String> {
    fn none_if_empty(self) -> Option<String> {
        self.filter(|s| !s.is_empty())
    }
}

impl OptionStringExt for String {
    fn none_if_empty(self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_serde() {
        let json = serde_json::to_string(&EventType::Insert).unwrap();
        assert_eq!(json, "\"i\"");

        let parsed: EventType = serde_json::from_str("\"u\"").unwrap();
        assert_eq!(parsed, EventType::Update);
        assert_eq!(parsed.code(), "u");
    }

    #[test]
    fn test_field_type_display() {
        assert_eq!(FieldType::Boolean.to_string(), "Boolean");
        let parsed: FieldType = serde_json::from_str("\"Number\"").unwrap();
        assert_eq!(parsed, FieldType::Number);
    }

    #[test]
    fn test_option_string_none_if_empty() {
        assert_eq!(
            Some("token".to_string()).none_if_empty(),
            Some("token".to_string())
        );
        assert_eq!(Some(String::new()).none_if_empty(), None);
        assert_eq!(None::<String>.none_if_empty(), None);
        assert_eq!(String::new().none_if_empty(), None);
    }
}
