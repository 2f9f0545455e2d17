//! # JSON Schema Evaluator
//!
//! Default [`SchemaEvaluator`] backed by the `jsonschema` crate.

use crate::contract::Schema;
use crate::pointer::decode_pointer_segment;
use crate::schema::bundle::{bundle_schema, BundleError};
use crate::schema::normalization::normalize_schema;
use crate::schema::{Evaluation, SchemaEvaluator, SchemaViolationDetail};
use serde_json::Value;
use tracing::{trace, warn};

/// Evaluates bodies as JSON against JSON Schema 2020-12.
///
/// Stateless: the schema is prepared and compiled on each call.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaEvaluator;

impl JsonSchemaEvaluator {
    /// Creates the evaluator.
    pub fn new() -> Self {
        Self
    }

    /// Produces the self-contained, normalized JSON Schema for a contract schema.
    pub fn prepare(schema: &Schema) -> Result<Value, BundleError> {
        let mut prepared = bundle_schema(schema)?;
        normalize_schema(&mut prepared);
        Ok(prepared)
    }
}

impl SchemaEvaluator for JsonSchemaEvaluator {
    fn evaluate(&self, schema: &Schema, body: &str) -> Evaluation {
        let instance: Value = match serde_json::from_str(body) {
            Ok(instance) => instance,
            Err(e) => {
                return Evaluation::Invalid(vec![SchemaViolationDetail::new(
                    "json",
                    "",
                    "",
                    format!("body is not valid JSON: {e}"),
                )]);
            }
        };

        let prepared = match Self::prepare(schema) {
            Ok(prepared) => prepared,
            Err(e) => {
                warn!(error = %e, "schema references could not be inlined");
                return Evaluation::Invalid(vec![SchemaViolationDetail::new(
                    "$ref",
                    "",
                    "",
                    e.to_string(),
                )]);
            }
        };

        let validator = match jsonschema::validator_for(&prepared) {
            Ok(validator) => validator,
            Err(e) => {
                warn!(error = %e, "schema could not be compiled");
                return Evaluation::Invalid(vec![SchemaViolationDetail::new(
                    "schema",
                    e.schema_path.to_string(),
                    "",
                    format!("schema could not be compiled: {e}"),
                )]);
            }
        };

        let details: Vec<SchemaViolationDetail> = validator
            .iter_errors(&instance)
            .map(|error| {
                let schema_path = error.schema_path.to_string();
                let keyword = schema_path
                    .rsplit('/')
                    .next()
                    .map(decode_pointer_segment)
                    .unwrap_or_default();
                SchemaViolationDetail::new(
                    keyword,
                    schema_path,
                    error.instance_path.to_string(),
                    error.to_string(),
                )
            })
            .collect();

        if details.is_empty() {
            Evaluation::Valid
        } else {
            trace!(violations = details.len(), "body violates schema");
            Evaluation::Invalid(details)
        }
    }
}
