//! # Status Code Matching
//!
//! An exact status key (`"404"`) always wins; otherwise the hundred-block
//! range key (`"4XX"`) is used as a catch-all.

use crate::contract::DeclaredResponse;
use indexmap::IndexMap;

/// The range token for a status code, or `None` outside 100..=599.
pub fn range_token(status: u16) -> Option<&'static str> {
    match status {
        100..=199 => Some("1XX"),
        200..=299 => Some("2XX"),
        300..=399 => Some("3XX"),
        400..=499 => Some("4XX"),
        500..=599 => Some("5XX"),
        _ => None,
    }
}

/// Finds the declared response for `status`, returning the matched key.
pub fn match_status(
    responses: &IndexMap<String, DeclaredResponse>,
    status: u16,
) -> Option<(&str, &DeclaredResponse)> {
    if let Some((key, response)) = responses.get_key_value(status.to_string().as_str()) {
        return Some((key.as_str(), response));
    }

    let token = range_token(status)?;
    responses
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(token))
        .map(|(key, response)| (key.as_str(), response))
}
