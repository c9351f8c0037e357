// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Input-schema sanitization, grounded in `agent.py::_sanitize_schema`:
//! the Anthropic API rejects `oneOf`/`allOf`/`anyOf` at any depth, and
//! every top-level schema must be an object with a `properties` field.

use serde_json::{Map, Value};

pub fn sanitize_schema(schema: &Value) -> Value {
    sanitize(schema, true)
}

fn sanitize(schema: &Value, top: bool) -> Value {
    let Value::Object(obj) = schema else {
        return schema.clone();
    };

    let mut result = Map::new();
    for (k, v) in obj {
        if matches!(k.as_str(), "oneOf" | "allOf" | "anyOf") {
            continue;
        }
        let cleaned = match v {
            Value::Object(_) => sanitize(v, false),
            Value::Array(items) => {
                Value::Array(items.iter().map(|item| if item.is_object() { sanitize(item, false) } else { item.clone() }).collect())
            }
            other => other.clone(),
        };
        result.insert(k.clone(), cleaned);
    }

    if top {
        result.entry("type").or_insert_with(|| Value::String("object".to_string()));
        result.entry("properties").or_insert_with(|| Value::Object(Map::new()));
    }

    Value::Object(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strips_union_keys_at_every_depth() {
        let input = json!({
            "type": "object",
            "properties": {
                "a": {"oneOf": [{"type": "string"}, {"type": "number"}]},
            },
            "allOf": [{"type": "object"}],
        });
        let sanitized = sanitize_schema(&input);
        assert!(sanitized.get("allOf").is_none());
        assert!(sanitized["properties"]["a"].get("oneOf").is_none());
    }

    #[test]
    fn adds_missing_top_level_type_and_properties() {
        let sanitized = sanitize_schema(&json!({}));
        assert_eq!(sanitized["type"], "object");
        assert_eq!(sanitized["properties"], json!({}));
    }

    #[test]
    fn leaves_a_well_formed_schema_unchanged() {
        let input = json!({"type": "object", "properties": {"x": {"type": "integer"}}});
        assert_eq!(sanitize_schema(&input), input);
    }

    #[test]
    fn nested_schemas_are_not_forced_to_have_properties() {
        let input = json!({"type": "object", "properties": {"nested": {"anyOf": [{"type": "string"}]}}});
        let sanitized = sanitize_schema(&input);
        assert!(sanitized["properties"]["nested"].get("properties").is_none());
    }
}
