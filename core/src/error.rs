//! # Error Handling
//!
//! Provides the crate-wide `AppError` enum and the `ValidationException`
//! raised by the throwing validation entry points.
//!
//! Contract mismatches are *findings*, not errors: they are collected into a
//! [`ValidationReport`](crate::report::ValidationReport). `AppError` covers the
//! cases that indicate bad input or bad configuration instead.

use crate::report::ValidationError;
use derive_more::{Display, From};
use std::fmt;

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// Settings that contradict the contract (e.g. an unknown server alias).
    #[from(ignore)]
    #[display("Configuration Error: {_0}")]
    Configuration(String),

    /// An HTTP method outside the supported set.
    #[from(ignore)]
    #[display("Unknown operation type: {_0}")]
    UnsupportedMethod(String),

    /// A request URI that is not an absolute URL.
    #[from(ignore)]
    #[display("Invalid request URI '{_0}'")]
    InvalidUri(String),

    /// The OpenAPI document could not be turned into a contract.
    #[from(ignore)]
    #[display("Document Error: {_0}")]
    Document(String),

    /// A request/response pair did not conform to the contract.
    #[display("{_0}")]
    Validation(ValidationException),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;

/// Raised by [`Validator::validate`](crate::Validator::validate) when the
/// exchange has at least one finding. Carries the complete, ordered list.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationException {
    errors: Vec<ValidationError>,
}

impl ValidationException {
    /// Wraps an ordered list of findings.
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }

    /// The findings, in pipeline order.
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Consumes the exception, returning the findings.
    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }
}

impl fmt::Display for ValidationException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return f.write_str("Validation failed");
        }
        for (idx, error) in self.errors.iter().enumerate() {
            if idx > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationException {}
