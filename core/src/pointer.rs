//! # JSON Pointer Utilities
//!
//! Shared helpers for resolving local `$ref` targets (`#/components/...`)
//! inside a single OpenAPI document. External documents are never fetched.

use percent_encoding::percent_decode_str;
use serde_json::Value;

/// Decodes a JSON Pointer segment (handles `~1`, `~0` and percent-encoding).
pub(crate) fn decode_pointer_segment(segment: &str) -> String {
    let decoded = segment.replace("~1", "/").replace("~0", "~");
    percent_decode_str(&decoded).decode_utf8_lossy().into_owned()
}

/// Returns the pointer part of a document-local reference (`#/a/b` -> `/a/b`).
///
/// Returns `None` for references into other documents.
pub(crate) fn local_pointer(ref_str: &str) -> Option<&str> {
    let pointer = ref_str.strip_prefix('#')?;
    if pointer.is_empty() || pointer.starts_with('/') {
        Some(pointer)
    } else {
        None
    }
}

/// Resolves a document-local `$ref` against `document`.
pub(crate) fn resolve_local_ref<'a>(document: &'a Value, ref_str: &str) -> Option<&'a Value> {
    let pointer = local_pointer(ref_str)?;
    if pointer.is_empty() {
        return Some(document);
    }

    let mut current = document;
    for raw in pointer.trim_start_matches('/').split('/') {
        let segment = decode_pointer_segment(raw);
        current = match current {
            Value::Object(map) => map.get(&segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}
