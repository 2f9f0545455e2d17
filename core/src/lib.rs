#![deny(missing_docs)]

//! # OpenAPI Validate Core
//!
//! Checks observed HTTP traffic against an OpenAPI 3.x contract.
//!
//! ```no_run
//! use openapi_validate_core::{document, Request, Response, Validator};
//!
//! # fn main() -> openapi_validate_core::AppResult<()> {
//! let contract = document::load_contract_path("openapi.yaml".as_ref())?;
//! let validator = Validator::new(&contract)?;
//!
//! let request = Request::new("GET", "http://api.example.com/v1/users")?;
//! let response = Response::new(200).with_body("application/json", r#"["user1"]"#);
//!
//! let report = validator.try_validate(&request, &response);
//! for error in report.errors() {
//!     println!("{error}");
//! }
//! # Ok(())
//! # }
//! ```

/// Shared error types.
pub mod error;

/// HTTP method set.
pub mod method;

/// In-memory contract model.
pub mod contract;

/// OpenAPI document loading.
pub mod document;

/// JSON Pointer helpers.
mod pointer;

/// Server, path, status and content-type matching.
pub mod matching;

/// Schema evaluation.
pub mod schema;

/// Validator configuration.
pub mod settings;

/// Validation findings.
pub mod report;

/// Observed requests and responses.
pub mod request;

/// The validation pipeline.
pub mod validator;

/// Adapter for `http` crate types.
pub mod exchange;

pub use contract::{
    ContentMap, Contract, DeclaredResponse, MediaType, Operation, PathItem, RequestBody, Schema,
};
pub use document::{load_contract_json, load_contract_path, load_contract_value, load_contract_yaml};
pub use error::{AppError, AppResult, ValidationException};
pub use exchange::validate_exchange;
pub use method::Method;
pub use report::{Target, ValidationError, ValidationReport};
pub use request::{Request, Response};
pub use schema::{Evaluation, JsonSchemaEvaluator, SchemaEvaluator, SchemaViolationDetail};
pub use settings::{StatusCodeList, ValidatorSettings};
pub use validator::Validator;
