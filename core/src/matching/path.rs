//! # Path Template Matching
//!
//! A template such as `/pets/{id}/toys` matches a request path segment by
//! segment: `{name}` segments accept any non-empty value, literal segments
//! compare case-insensitively, and segment counts must be equal.

use crate::contract::PathItem;
use indexmap::IndexMap;
use tracing::trace;

/// Finds the first template, in declaration order, that matches `path`.
///
/// Parameter values are not checked against any schema here.
pub fn match_path<'a>(
    paths: &'a IndexMap<String, PathItem>,
    path: &str,
) -> Option<(&'a str, &'a PathItem)> {
    let request_segments = segments(path);

    paths.iter().find_map(|(template, item)| {
        if template_matches(&segments(template), &request_segments) {
            Some((template.as_str(), item))
        } else {
            trace!(template = %template, path = %path, "path template rejected");
            None
        }
    })
}

fn segments(path: &str) -> Vec<&str> {
    path.strip_prefix('/').unwrap_or(path).split('/').collect()
}

fn template_matches(template: &[&str], request: &[&str]) -> bool {
    if template.len() != request.len() {
        return false;
    }

    template
        .iter()
        .zip(request)
        .all(|(expected, actual)| segment_matches(expected, actual))
}

fn segment_matches(expected: &str, actual: &str) -> bool {
    if is_parameter(expected) {
        return !actual.is_empty();
    }
    expected == actual || expected.to_lowercase() == actual.to_lowercase()
}

fn is_parameter(segment: &str) -> bool {
    segment.len() >= 2 && segment.starts_with('{') && segment.ends_with('}')
}
