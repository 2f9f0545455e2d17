//! # Schema Normalization
//!
//! Rewrites OpenAPI 3.0 schema keywords into their JSON Schema 2020-12
//! equivalents before evaluation. Only known compatibility gaps are touched.

use crate::schema::subschemas_mut;
use serde_json::{json, Map, Value};

/// Applies every normalization to a schema tree.
pub fn normalize_schema(value: &mut Value) {
    normalize_exclusive_bounds(value);
    normalize_nullable_schemas(value);
}

/// Normalizes `nullable` / `x-nullable` schema flags into JSON Schema null unions.
///
/// OpenAPI 3.0 uses `nullable: true` (and Swagger 2.0 often uses `x-nullable: true`).
/// OpenAPI 3.1+ encodes nullability via `type: [T, "null"]`.
///
/// This helper rewrites `nullable` and `x-nullable` into a `type` union where possible,
/// or wraps the schema in `anyOf` when no explicit `type` is present.
pub fn normalize_nullable_schemas(value: &mut Value) {
    let Value::Object(map) = value else {
        return;
    };
    for child in subschemas_mut(map) {
        normalize_nullable_schemas(child);
    }
    if let Some(replacement) = apply_nullable_flag(map) {
        *value = replacement;
    }
}

/// Rewrites boolean `exclusiveMinimum` / `exclusiveMaximum` (OpenAPI 3.0) into
/// the numeric form used by JSON Schema 2020-12.
pub fn normalize_exclusive_bounds(value: &mut Value) {
    let Value::Object(map) = value else {
        return;
    };
    apply_exclusive_flag(map, "exclusiveMinimum", "minimum");
    apply_exclusive_flag(map, "exclusiveMaximum", "maximum");
    for child in subschemas_mut(map) {
        normalize_exclusive_bounds(child);
    }
}

fn apply_exclusive_flag(map: &mut Map<String, Value>, flag: &str, bound: &str) {
    let Some(exclusive) = map.get(flag).and_then(Value::as_bool) else {
        return;
    };

    map.remove(flag);
    if exclusive {
        if let Some(limit) = map.remove(bound) {
            map.insert(flag.to_string(), limit);
        }
    }
}

fn take_bool_flag(map: &mut Map<String, Value>, key: &str) -> bool {
    match map.get(key) {
        Some(Value::Bool(flag)) => {
            let flag = *flag;
            map.remove(key);
            flag
        }
        _ => false,
    }
}

fn apply_nullable_flag(map: &mut Map<String, Value>) -> Option<Value> {
    // Both flags are always consumed.
    let nullable = take_bool_flag(map, "nullable") | take_bool_flag(map, "x-nullable");
    if !nullable {
        return None;
    }

    if let Some(type_val) = map.get_mut("type") {
        match type_val {
            Value::String(s) => {
                if s != "null" {
                    *type_val = Value::Array(vec![
                        Value::String(s.clone()),
                        Value::String("null".to_string()),
                    ]);
                }
            }
            Value::Array(arr) => {
                let has_null = arr.iter().any(|v| v.as_str() == Some("null"));
                if !has_null {
                    arr.push(Value::String("null".to_string()));
                }
            }
            _ => {}
        }
        if let Some(Value::Array(variants)) = map.get_mut("enum") {
            if !variants.contains(&Value::Null) {
                variants.push(Value::Null);
            }
        }
        return None;
    }

    // `#/$defs/...` pointers are resolved from the root, so definitions stay there.
    let defs = map.remove("$defs");
    let original = Value::Object(map.clone());
    let mut wrapper = json!({ "anyOf": [original, { "type": "null" }] });
    if let Some(defs) = defs {
        wrapper["$defs"] = defs;
    }
    Some(wrapper)
}
