//! Node decoding
//!
//! UI API nodes wrap every field but `Id` in `{ "value": X }`; rows handed
//! to sinks carry the bare values.

use crate::types::{JsonValue, Row};

/// Flatten a node into a row
pub fn decode_node(node: &JsonValue) -> Row {
    let Some(fields) = node.as_object() else {
        return Row::new();
    };

    fields
        .iter()
        .map(|(name, value)| (name.clone(), unwrap_value(value)))
        .collect()
}

fn unwrap_value(value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(map) if map.contains_key("value") => {
            map.get("value").cloned().unwrap_or(JsonValue::Null)
        }
        other => other.clone(),
    }
}

/// Raw string value of a wrapped node field
pub(crate) fn field_str<'a>(node: &'a JsonValue, field: &str) -> Option<&'a str> {
    node.get(field)?.get("value")?.as_str()
}
