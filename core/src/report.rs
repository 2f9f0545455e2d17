//! # Validation Findings
//!
//! `ValidationError` is one finding about a request/response pair; a
//! `ValidationReport` is the ordered list produced by one validation run.
//! Findings are never deduplicated and follow pipeline order.

use crate::method::Method;
use crate::schema::SchemaViolationDetail;
use derive_more::Display;
use std::fmt;

/// Which half of the exchange a finding is about.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// The HTTP request.
    #[display("Request")]
    Request,
    /// The HTTP response.
    #[display("Response")]
    Response,
}

impl Target {
    fn lowercase(self) -> &'static str {
        match self {
            Target::Request => "request",
            Target::Response => "response",
        }
    }
}

/// A single contract finding.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// No declared server (after aliasing) is a prefix of the request URI.
    ServerNotFound {
        /// The request URI as observed.
        uri: String,
    },
    /// No path template matched the server-relative path.
    PathNotFound {
        /// The server-relative request path.
        path: String,
    },
    /// The matched path item has no operation for the method.
    OperationNotFound {
        /// The request method.
        method: Method,
        /// The matched path template.
        template: String,
    },
    /// Neither the exact status code nor its range token is declared.
    ResponseNotFound {
        /// The observed status code.
        status: u16,
    },
    /// The observed content type is not declared for the body.
    ContentTypeNotFound {
        /// Request or response.
        target: Target,
        /// The observed content type.
        content_type: String,
    },
    /// The operation requires a request body and none was sent.
    RequiredBodyMissing,
    /// The matched media type declares no schema to validate against.
    SchemaMissing {
        /// Request or response.
        target: Target,
        /// The matched content type.
        content_type: String,
    },
    /// The body did not satisfy its schema.
    SchemaViolation {
        /// Request or response.
        target: Target,
        /// One entry per failing (schema location, instance location) pair.
        details: Vec<SchemaViolationDetail>,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::ServerNotFound { uri } => {
                write!(f, "No server found that matched the request: '{uri}'")
            }
            ValidationError::PathNotFound { path } => {
                write!(f, "No path found that matched the request path: '{path}'")
            }
            ValidationError::OperationNotFound { method, template } => write!(
                f,
                "No operation found that matched the request method: '{method}' on '{template}'"
            ),
            ValidationError::ResponseNotFound { status } => write!(
                f,
                "No status code found that matched the response status code: {status}"
            ),
            ValidationError::ContentTypeNotFound {
                target,
                content_type,
            } => write!(
                f,
                "No content type found that matched the {} content type: '{content_type}'",
                target.lowercase()
            ),
            ValidationError::RequiredBodyMissing => f.write_str("Request body is required"),
            ValidationError::SchemaMissing {
                target,
                content_type,
            } => write!(
                f,
                "No schema declared for the {} content type: '{content_type}'",
                target.lowercase()
            ),
            ValidationError::SchemaViolation { target, details } => {
                writeln!(f, "{target} body failed schema validation: ")?;
                for detail in details {
                    write!(f, "\n{detail}")?;
                }
                Ok(())
            }
        }
    }
}

/// Outcome of validating one request/response pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub(crate) fn new(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }

    /// True when no findings were recorded.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The findings, in pipeline order.
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Consumes the report, returning the findings.
    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let err = ValidationError::OperationNotFound {
            method: Method::Delete,
            template: "/pets/{id}".into(),
        };
        assert_eq!(
            err.to_string(),
            "No operation found that matched the request method: 'DELETE' on '/pets/{id}'"
        );

        let err = ValidationError::ResponseNotFound { status: 404 };
        assert_eq!(
            err.to_string(),
            "No status code found that matched the response status code: 404"
        );
    }

    #[test]
    fn test_schema_violation_lists_every_detail() {
        let err = ValidationError::SchemaViolation {
            target: Target::Response,
            details: vec![
                SchemaViolationDetail::new(
                    "type",
                    "/items/type",
                    "/0",
                    "1 is not of type \"string\"",
                ),
                SchemaViolationDetail::new(
                    "required",
                    "/required",
                    "",
                    "\"id\" is a required property",
                ),
            ],
        };
        assert_eq!(
            err.to_string(),
            "Response body failed schema validation: \n\n\
             [type] /0: 1 is not of type \"string\"\n\
             [required] (root): \"id\" is a required property"
        );
    }

    #[test]
    fn test_empty_report_is_valid() {
        assert!(ValidationReport::default().is_valid());
        let report = ValidationReport::new(vec![ValidationError::RequiredBodyMissing]);
        assert!(!report.is_valid());
        assert_eq!(report.errors().len(), 1);
    }
}
