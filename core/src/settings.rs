//! # Validator Settings
//!
//! Per-validator configuration. Settings are owned by a [`Validator`](crate::Validator)
//! and checked once against the contract when the validator is built.
//!
//! Settings can be written by hand or loaded from YAML/JSON:
//!
//! ```yaml
//! serverAliases:
//!   https://api.example.com/v1: http://localhost:8080/v1
//! validateRequest: true
//! validateResponse: true
//! validateResponseContentTypeIfStatusCode: [200, 201]
//! ```

use crate::contract::Contract;
use crate::error::{AppError, AppResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a single validator instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidatorSettings {
    /// Contract server URL -> base URL observed in traffic.
    pub server_aliases: IndexMap<String, String>,
    /// Run request body validation.
    pub validate_request: bool,
    /// Run response validation.
    pub validate_response: bool,
    /// Status codes whose response content type and body are inspected.
    /// Empty means every code.
    pub validate_response_content_type_if_status_code: StatusCodeList,
}

impl Default for ValidatorSettings {
    fn default() -> Self {
        Self {
            server_aliases: IndexMap::new(),
            validate_request: true,
            validate_response: true,
            validate_response_content_type_if_status_code: StatusCodeList::all(),
        }
    }
}

impl ValidatorSettings {
    /// Default settings: no aliases, everything validated.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recognises traffic for contract server `server` at `alias`.
    pub fn with_server_alias(
        mut self,
        server: impl Into<String>,
        alias: impl Into<String>,
    ) -> Self {
        self.server_aliases.insert(server.into(), alias.into());
        self
    }

    /// Toggles request validation.
    pub fn with_validate_request(mut self, enabled: bool) -> Self {
        self.validate_request = enabled;
        self
    }

    /// Toggles response validation.
    pub fn with_validate_response(mut self, enabled: bool) -> Self {
        self.validate_response = enabled;
        self
    }

    /// Restricts response content checks to the given status codes.
    pub fn with_response_content_status_codes(mut self, codes: StatusCodeList) -> Self {
        self.validate_response_content_type_if_status_code = codes;
        self
    }

    /// Parses settings from YAML.
    pub fn from_yaml_str(yaml: &str) -> AppResult<Self> {
        serde_yaml::from_str(yaml).map_err(|e| {
            AppError::Configuration(format!("Failed to parse settings YAML: {}", e))
        })
    }

    /// Parses settings from JSON.
    pub fn from_json_str(json: &str) -> AppResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            AppError::Configuration(format!("Failed to parse settings JSON: {}", e))
        })
    }

    /// Reads settings from a `.json`, `.yaml` or `.yml` file.
    pub fn from_path(path: &Path) -> AppResult<Self> {
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_yaml_str(&text),
        }
    }

    /// Checks that every server alias key names a server declared by `contract`.
    pub(crate) fn check_against(&self, contract: &Contract) -> AppResult<()> {
        let Some(first) = self.server_aliases.keys().next() else {
            return Ok(());
        };

        if contract.servers().is_empty() {
            return Err(AppError::Configuration(format!(
                "Server '{}' not found",
                first
            )));
        }

        for alias in self.server_aliases.keys() {
            if !contract.servers().iter().any(|server| server == alias) {
                return Err(AppError::Configuration(format!(
                    "Server '{}' not found",
                    alias
                )));
            }
        }

        Ok(())
    }
}

/// A set of status codes where the empty set means "every code".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusCodeList {
    codes: Vec<u16>,
}

impl StatusCodeList {
    /// An empty list, which matches every status code.
    pub fn new() -> Self {
        Self::default()
    }

    /// Alias of [`StatusCodeList::new`] that reads better at call sites.
    pub fn all() -> Self {
        Self::default()
    }

    /// The success codes 200 through 298.
    pub fn success_only() -> Self {
        Self::from_codes(200..299)
    }

    /// A list holding exactly `codes`.
    pub fn from_codes(codes: impl IntoIterator<Item = u16>) -> Self {
        Self {
            codes: codes.into_iter().collect(),
        }
    }

    /// True when no codes are listed, i.e. every code matches.
    pub fn should_validate_all(&self) -> bool {
        self.codes.is_empty()
    }

    /// Membership test honouring the empty-means-all rule.
    pub fn contains_status_code(&self, status: u16) -> bool {
        self.should_validate_all() || self.codes.contains(&status)
    }

    /// Typed variant of [`StatusCodeList::contains_status_code`].
    pub fn contains_status(&self, status: http::StatusCode) -> bool {
        self.contains_status_code(status.as_u16())
    }

    /// Adds a code.
    pub fn add(&mut self, status: u16) {
        self.codes.push(status);
    }

    /// Typed variant of [`StatusCodeList::add`].
    pub fn add_status(&mut self, status: http::StatusCode) {
        self.add(status.as_u16());
    }

    /// Adds several codes.
    pub fn add_range(&mut self, codes: impl IntoIterator<Item = u16>) {
        self.codes.extend(codes);
    }

    /// Removes one occurrence of `status`; returns whether it was present.
    pub fn remove(&mut self, status: u16) -> bool {
        match self.codes.iter().position(|code| *code == status) {
            Some(idx) => {
                self.codes.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Typed variant of [`StatusCodeList::remove`].
    pub fn remove_status(&mut self, status: http::StatusCode) -> bool {
        self.remove(status.as_u16())
    }

    /// Removes every code, which makes the list match everything again.
    pub fn clear(&mut self) {
        self.codes.clear();
    }

    /// The listed codes.
    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.codes.iter().copied()
    }
}

impl FromIterator<u16> for StatusCodeList {
    fn from_iter<I: IntoIterator<Item = u16>>(iter: I) -> Self {
        Self::from_codes(iter)
    }
}
