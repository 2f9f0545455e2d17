//! # Content Negotiation
//!
//! Resolves an observed `Content-Type` to a declared media type binding.
//!
//! Preference order:
//! 1. The declared key, verbatim.
//! 2. A declared key with the same essence (`type/subtype`, parameters and case ignored).
//! 3. A declared `type/*` range.
//! 4. A declared `*/*` range.

use crate::contract::{ContentMap, MediaType};

/// Strips parameters and lowercases a media type (`Application/JSON; charset=utf-8`
/// becomes `application/json`).
pub fn media_type_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Finds the binding for `content_type`, returning the matched declared key.
pub fn match_content_type<'a>(
    content: &'a ContentMap,
    content_type: &str,
) -> Option<(&'a str, &'a MediaType)> {
    if let Some((key, media)) = content.get_key_value(content_type) {
        return Some((key.as_str(), media));
    }

    let essence = media_type_essence(content_type);
    let find = move |wanted: &str| {
        content
            .iter()
            .find(|(key, _)| media_type_essence(key) == wanted)
            .map(|(key, media)| (key.as_str(), media))
    };

    if let Some(found) = find(&essence) {
        return Some(found);
    }

    if let Some((main_type, _)) = essence.split_once('/') {
        if let Some(found) = find(&format!("{main_type}/*")) {
            return Some(found);
        }
    }

    find("*/*")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(keys: &[&str]) -> ContentMap {
        keys.iter().map(|k| (k.to_string(), MediaType::new())).collect()
    }

    fn matched<'a>(content: &'a ContentMap, content_type: &str) -> Option<&'a str> {
        match_content_type(content, content_type).map(|(key, _)| key)
    }

    #[test]
    fn test_essence() {
        assert_eq!(
            media_type_essence("Application/JSON; charset=utf-8"),
            "application/json"
        );
        assert_eq!(media_type_essence("text/plain"), "text/plain");
    }

    #[test]
    fn test_exact_key() {
        let declared = content(&["application/json", "application/xml"]);
        assert_eq!(matched(&declared, "application/xml"), Some("application/xml"));
    }

    #[test]
    fn test_parameters_and_case_are_ignored() {
        let declared = content(&["application/json"]);
        assert_eq!(
            matched(&declared, "application/json; charset=utf-8"),
            Some("application/json")
        );
        assert_eq!(matched(&declared, "APPLICATION/JSON"), Some("application/json"));
    }

    #[test]
    fn test_ranges_are_fallbacks() {
        let declared = content(&["*/*", "image/*", "image/png"]);
        assert_eq!(matched(&declared, "image/png"), Some("image/png"));
        assert_eq!(matched(&declared, "image/jpeg"), Some("image/*"));
        assert_eq!(matched(&declared, "text/csv"), Some("*/*"));
    }

    #[test]
    fn test_undeclared_type() {
        let declared = content(&["application/json"]);
        assert_eq!(matched(&declared, "text/plain"), None);
    }
}
