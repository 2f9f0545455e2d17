//! # Validation Orchestrator
//!
//! Runs one request/response pair through the matching pipeline:
//!
//! `server -> path -> operation -> request body -> response`
//!
//! A matching stage that fails records its finding and ends the run, since
//! nothing downstream can be checked without it. Request findings also end the
//! run, so a failing call reports request problems or response problems, never
//! both.
//!
//! A body is evaluated only when the exchange actually carries one. A content
//! type that resolves to a media type without a schema is reported as
//! `SchemaMissing` instead of being waved through.

use crate::contract::{ContentMap, Contract, Operation};
use crate::error::{AppResult, ValidationException};
use crate::matching::{match_content_type, match_path, match_status, resolve_server};
use crate::report::{Target, ValidationError, ValidationReport};
use crate::request::{Request, Response};
use crate::schema::{Evaluation, JsonSchemaEvaluator, SchemaEvaluator};
use crate::settings::ValidatorSettings;
use tracing::debug;

/// Validates exchanges against a borrowed contract.
///
/// Holds no mutable state, so one instance can be shared across threads.
pub struct Validator<'c, E = JsonSchemaEvaluator> {
    contract: &'c Contract,
    settings: ValidatorSettings,
    evaluator: E,
}

impl<'c> Validator<'c, JsonSchemaEvaluator> {
    /// A validator with default settings.
    pub fn new(contract: &'c Contract) -> AppResult<Self> {
        Self::with_settings(contract, ValidatorSettings::default())
    }

    /// A validator with explicit settings.
    ///
    /// Fails with a configuration error if a server alias names a server the
    /// contract does not declare.
    pub fn with_settings(contract: &'c Contract, settings: ValidatorSettings) -> AppResult<Self> {
        Self::with_evaluator(contract, settings, JsonSchemaEvaluator::new())
    }
}

impl<'c, E: SchemaEvaluator> Validator<'c, E> {
    /// A validator using a custom schema evaluator.
    pub fn with_evaluator(
        contract: &'c Contract,
        settings: ValidatorSettings,
        evaluator: E,
    ) -> AppResult<Self> {
        settings.check_against(contract)?;
        Ok(Self {
            contract,
            settings,
            evaluator,
        })
    }

    /// The contract being validated against.
    pub fn contract(&self) -> &'c Contract {
        self.contract
    }

    /// The settings in effect.
    pub fn settings(&self) -> &ValidatorSettings {
        &self.settings
    }

    /// Validates one exchange, returning every finding.
    pub fn try_validate(&self, request: &Request, response: &Response) -> ValidationReport {
        ValidationReport::new(self.run(request, response))
    }

    /// Validates one exchange, failing with all findings if there are any.
    pub fn validate(
        &self,
        request: &Request,
        response: &Response,
    ) -> Result<(), ValidationException> {
        let report = self.try_validate(request, response);
        if report.is_valid() {
            Ok(())
        } else {
            Err(ValidationException::new(report.into_errors()))
        }
    }

    fn run(&self, request: &Request, response: &Response) -> Vec<ValidationError> {
        let Some(server) = resolve_server(
            self.contract.servers(),
            &self.settings.server_aliases,
            request.uri(),
        ) else {
            debug!(uri = %request.uri(), "no server matched");
            return vec![ValidationError::ServerNotFound {
                uri: request.uri().to_string(),
            }];
        };
        debug!(server = ?server.server, path = %server.relative_path, "server resolved");

        let Some((template, path_item)) = match_path(self.contract.paths(), &server.relative_path)
        else {
            debug!(path = %server.relative_path, "no path template matched");
            return vec![ValidationError::PathNotFound {
                path: server.relative_path,
            }];
        };
        debug!(template = %template, "path matched");

        let method = request.method();
        let Some(operation) = path_item.operation(method) else {
            debug!(template = %template, method = %method, "no operation for method");
            return vec![ValidationError::OperationNotFound {
                method,
                template: template.to_string(),
            }];
        };

        if self.settings.validate_request {
            let findings = self.request_findings(request, operation);
            if !findings.is_empty() {
                debug!(count = findings.len(), "request rejected");
                return findings;
            }
        }

        if self.settings.validate_response {
            return self.response_findings(response, operation);
        }

        Vec::new()
    }

    fn request_findings(&self, request: &Request, operation: &Operation) -> Vec<ValidationError> {
        let Some(declared) = operation.request_body() else {
            return Vec::new();
        };

        let Some(body) = request.body() else {
            return if declared.required() {
                vec![ValidationError::RequiredBodyMissing]
            } else {
                Vec::new()
            };
        };

        let Some(content_type) = request.content_type() else {
            return Vec::new();
        };

        self.body_findings(Target::Request, declared.content(), content_type, Some(body))
    }

    fn response_findings(
        &self,
        response: &Response,
        operation: &Operation,
    ) -> Vec<ValidationError> {
        let status = response.status();
        let Some((key, declared)) = match_status(operation.responses(), status) else {
            debug!(status, "no response declared for status");
            return vec![ValidationError::ResponseNotFound { status }];
        };
        debug!(status, key = %key, "response matched");

        if !self
            .settings
            .validate_response_content_type_if_status_code
            .contains_status_code(status)
        {
            return Vec::new();
        }

        let Some(content_type) = response.content_type() else {
            return Vec::new();
        };

        self.body_findings(Target::Response, declared.content(), content_type, response.body())
    }

    fn body_findings(
        &self,
        target: Target,
        content: &ContentMap,
        content_type: &str,
        body: Option<&str>,
    ) -> Vec<ValidationError> {
        let Some((declared_type, media)) = match_content_type(content, content_type) else {
            return vec![ValidationError::ContentTypeNotFound {
                target,
                content_type: content_type.to_string(),
            }];
        };

        let Some(schema) = media.schema() else {
            return vec![ValidationError::SchemaMissing {
                target,
                content_type: declared_type.to_string(),
            }];
        };

        let Some(body) = body else {
            return Vec::new();
        };

        match self.evaluator.evaluate(schema, body) {
            Evaluation::Valid => Vec::new(),
            Evaluation::Invalid(details) => {
                debug!(target = %target, violations = details.len(), "body failed schema");
                vec![ValidationError::SchemaViolation { target, details }]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{DeclaredResponse, MediaType, PathItem, RequestBody, Schema};
    use crate::method::Method;
    use crate::schema::SchemaViolationDetail;
    use crate::settings::StatusCodeList;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn users_contract() -> Contract {
        Contract::new().with_server("http://api.example.com/v1").with_path(
            "/users",
            PathItem::new()
                .with_operation(
                    Method::Get,
                    Operation::new().with_response(
                        "200",
                        DeclaredResponse::new().with_content(
                            "application/json",
                            MediaType::with_schema(Schema::new(
                                json!({"type": "array", "items": {"type": "string"}}),
                            )),
                        ),
                    ),
                )
                .with_operation(
                    Method::Post,
                    Operation::new()
                        .with_request_body(RequestBody::new(true).with_content(
                            "application/json",
                            MediaType::with_schema(Schema::new(json!({
                                "type": "object",
                                "required": ["name"],
                                "properties": {"name": {"type": "string"}}
                            }))),
                        ))
                        .with_response("201", DeclaredResponse::new())
                        .with_response(
                            "4XX",
                            DeclaredResponse::new()
                                .with_content("application/problem+json", MediaType::new()),
                        ),
                ),
        )
    }

    fn get(uri: &str) -> Request {
        Request::new("GET", uri).unwrap()
    }

    #[test]
    fn test_valid_exchange() {
        let contract = users_contract();
        let validator = Validator::new(&contract).unwrap();
        let report = validator.try_validate(
            &get("http://api.example.com/v1/users"),
            &Response::new(200).with_body("application/json", r#"["user1"]"#),
        );
        assert!(report.is_valid(), "{:?}", report.errors());
    }

    #[test]
    fn test_unmatched_status() {
        let contract = users_contract();
        let validator = Validator::new(&contract).unwrap();
        let request = get("http://api.example.com/v1/users");
        let report = validator.try_validate(&request, &Response::new(404));
        assert_eq!(
            report.errors(),
            &[ValidationError::ResponseNotFound { status: 404 }]
        );
    }

    #[test]
    fn test_server_not_found_halts() {
        let contract = users_contract();
        let validator = Validator::new(&contract).unwrap();
        let request = get("http://wrong-host/v1/users");
        let report = validator.try_validate(&request, &Response::new(500));
        assert_eq!(
            report.errors(),
            &[ValidationError::ServerNotFound {
                uri: "http://wrong-host/v1/users".into()
            }]
        );
    }

    #[test]
    fn test_path_and_operation_not_found() {
        let contract = users_contract();
        let validator = Validator::new(&contract).unwrap();

        let request = get("http://api.example.com/v1/orders");

        let report = validator.try_validate(&request, &Response::new(200));
        assert_eq!(
            report.errors(),
            &[ValidationError::PathNotFound {
                path: "/orders".into()
            }]
        );

        let delete = Request::new("DELETE", "http://api.example.com/v1/users").unwrap();
        let report = validator.try_validate(&delete, &Response::new(200));
        assert_eq!(
            report.errors(),
            &[ValidationError::OperationNotFound {
                method: Method::Delete,
                template: "/users".into()
            }]
        );
    }

    #[test]
    fn test_required_body_missing_stops_before_response() {
        let contract = users_contract();
        let validator = Validator::new(&contract).unwrap();
        let post = Request::new("POST", "http://api.example.com/v1/users").unwrap();
        // 500 is not declared either, but request findings end the run.
        let report = validator.try_validate(&post, &Response::new(500));
        assert_eq!(report.errors(), &[ValidationError::RequiredBodyMissing]);
    }

    #[test]
    fn test_optional_body_may_be_omitted() {
        let operation = |required| {
            Operation::new()
                .with_request_body(RequestBody::new(required).with_content(
                    "application/json",
                    MediaType::with_schema(Schema::new(json!({"type": "object"}))),
                ))
                .with_response("204", DeclaredResponse::new())
        };
        let contract = |required| {
            Contract::new().with_path(
                "/settings",
                PathItem::new().with_operation(Method::Patch, operation(required)),
            )
        };
        let patch = Request::new("PATCH", "http://localhost/settings").unwrap();

        let optional = contract(false);
        let validator = Validator::new(&optional).unwrap();
        assert!(validator
            .try_validate(&patch, &Response::new(204))
            .is_valid());

        let required = contract(true);
        let validator = Validator::new(&required).unwrap();
        assert_eq!(
            validator.try_validate(&patch, &Response::new(204)).errors(),
            &[ValidationError::RequiredBodyMissing]
        );
    }

    #[test]
    fn test_bodiless_response_passes_declared_schema() {
        let contract = users_contract();
        let validator = Validator::new(&contract).unwrap();
        let request = get("http://api.example.com/v1/users");
        let report = validator.try_validate(&request, &Response::new(200));
        assert!(report.is_valid(), "{:?}", report.errors());
    }

    #[test]
    fn test_request_toggle_skips_request_checks() {
        let contract = users_contract();
        let settings = ValidatorSettings::new().with_validate_request(false);
        let validator = Validator::with_settings(&contract, settings).unwrap();
        let post = Request::new("POST", "http://api.example.com/v1/users").unwrap();
        assert!(validator.try_validate(&post, &Response::new(201)).is_valid());
    }

    #[test]
    fn test_response_toggle_skips_status_matching() {
        let contract = users_contract();
        let settings = ValidatorSettings::new().with_validate_response(false);
        let validator = Validator::with_settings(&contract, settings).unwrap();
        let request = get("http://api.example.com/v1/users");
        let report = validator.try_validate(&request, &Response::new(418));
        assert!(report.is_valid());
    }

    #[test]
    fn test_request_schema_violation() {
        let contract = users_contract();
        let validator = Validator::new(&contract).unwrap();
        let post = Request::new("POST", "http://api.example.com/v1/users")
            .unwrap()
            .with_body("application/json", r#"{"name": 7}"#);
        let report = validator.try_validate(&post, &Response::new(201));

        assert_eq!(report.errors().len(), 1);
        match &report.errors()[0] {
            ValidationError::SchemaViolation { target, details } => {
                assert_eq!(*target, Target::Request);
                assert_eq!(details[0].instance_path, "/name");
            }
            other => panic!("unexpected finding: {other:?}"),
        }
    }

    #[test]
    fn test_undeclared_content_type() {
        let contract = users_contract();
        let validator = Validator::new(&contract).unwrap();
        let report = validator.try_validate(
            &get("http://api.example.com/v1/users"),
            &Response::new(200).with_body("text/html", "<p>hi</p>"),
        );
        assert_eq!(
            report.errors(),
            &[ValidationError::ContentTypeNotFound {
                target: Target::Response,
                content_type: "text/html".into()
            }]
        );
    }

    #[test]
    fn test_missing_schema_is_a_finding() {
        let contract = users_contract();
        let validator = Validator::new(&contract).unwrap();
        let post = Request::new("POST", "http://api.example.com/v1/users")
            .unwrap()
            .with_body("application/json", r#"{"name": "ada"}"#);
        let report = validator.try_validate(
            &post,
            &Response::new(422).with_body("application/problem+json", r#"{"title": "bad"}"#),
        );
        assert_eq!(
            report.errors(),
            &[ValidationError::SchemaMissing {
                target: Target::Response,
                content_type: "application/problem+json".into()
            }]
        );
    }

    #[test]
    fn test_status_gate_skips_content_checks() {
        let contract = users_contract();
        let settings = ValidatorSettings::new()
            .with_response_content_status_codes(StatusCodeList::success_only());
        let validator = Validator::with_settings(&contract, settings).unwrap();
        let post = Request::new("POST", "http://api.example.com/v1/users")
            .unwrap()
            .with_body("application/json", r#"{"name": "ada"}"#);
        let report = validator.try_validate(
            &post,
            &Response::new(422).with_body("text/plain", "nope"),
        );
        assert!(report.is_valid());
    }

    #[test]
    fn test_validate_wraps_findings() {
        let contract = users_contract();
        let validator = Validator::new(&contract).unwrap();
        let err = validator
            .validate(&get("http://api.example.com/v1/users"), &Response::new(404))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "No status code found that matched the response status code: 404"
        );
    }

    struct RejectAll;

    impl SchemaEvaluator for RejectAll {
        fn evaluate(&self, _schema: &Schema, _body: &str) -> Evaluation {
            Evaluation::Invalid(vec![SchemaViolationDetail::new("x", "", "", "rejected")])
        }
    }

    #[test]
    fn test_custom_evaluator_is_used() {
        let contract = users_contract();
        let validator =
            Validator::with_evaluator(&contract, ValidatorSettings::default(), RejectAll).unwrap();
        let report = validator.try_validate(
            &get("http://api.example.com/v1/users"),
            &Response::new(200).with_body("application/json", r#"["user1"]"#),
        );
        assert!(matches!(
            report.errors(),
            [ValidationError::SchemaViolation { target: Target::Response, .. }]
        ));
    }

    #[test]
    fn test_unknown_alias_fails_construction() {
        let contract = users_contract();
        let settings =
            ValidatorSettings::new().with_server_alias("http://nope", "http://localhost");
        assert!(Validator::with_settings(&contract, settings).is_err());
    }

    #[test]
    fn test_validator_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Validator<'static>>();
    }
}
