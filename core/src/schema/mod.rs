//! # Schema Evaluation
//!
//! The validator consumes schemas only through [`SchemaEvaluator`], so the JSON
//! Schema engine can be swapped without touching the matching pipeline.
//!
//! - **bundle**: inlines `$ref` targets into one self-contained schema.
//! - **normalization**: rewrites OpenAPI 3.0 keywords into JSON Schema 2020-12.
//! - **json**: the default evaluator, backed by the `jsonschema` crate.

pub mod bundle;
pub mod json;
pub mod normalization;

use crate::contract::Schema;
use serde_json::{Map, Value};
use std::fmt;

pub use json::JsonSchemaEvaluator;

/// Keywords whose values are instance data, not subschemas.
const VALUE_KEYWORDS: [&str; 5] = ["example", "examples", "default", "enum", "const"];

/// Keywords whose values map names to subschemas.
const SCHEMA_MAP_KEYWORDS: [&str; 5] = [
    "properties",
    "patternProperties",
    "dependentSchemas",
    "$defs",
    "definitions",
];

/// The direct subschemas of a schema object.
///
/// Entries of name maps such as `properties` are subschemas whatever their
/// name, so a property called `default` is still visited.
pub(crate) fn subschemas_mut(schema: &mut Map<String, Value>) -> Vec<&mut Value> {
    let mut children = Vec::new();
    for (keyword, child) in schema.iter_mut() {
        if VALUE_KEYWORDS.contains(&keyword.as_str()) {
            continue;
        }
        let is_map = SCHEMA_MAP_KEYWORDS.contains(&keyword.as_str());
        if is_map && child.is_object() {
            if let Value::Object(entries) = child {
                children.extend(entries.values_mut());
            }
            continue;
        }
        match child {
            Value::Array(items) => children.extend(items.iter_mut()),
            other => children.push(other),
        }
    }
    children
}

/// Evaluates a body against a contract schema.
pub trait SchemaEvaluator: Send + Sync {
    /// Parses `body` and checks it against `schema`.
    ///
    /// Unparseable bodies and unusable schemas are reported as violations,
    /// never as panics.
    fn evaluate(&self, schema: &Schema, body: &str) -> Evaluation;
}

/// Result of a schema evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// The body satisfies the schema.
    Valid,
    /// The body violates the schema at one or more locations.
    Invalid(Vec<SchemaViolationDetail>),
}

impl Evaluation {
    /// True for [`Evaluation::Valid`].
    pub fn is_valid(&self) -> bool {
        matches!(self, Evaluation::Valid)
    }
}

/// One schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolationDetail {
    /// The failing keyword (`type`, `required`, ...).
    pub keyword: String,
    /// JSON Pointer into the evaluated schema.
    pub schema_path: String,
    /// JSON Pointer into the body.
    pub instance_path: String,
    /// Human readable description.
    pub message: String,
}

impl SchemaViolationDetail {
    /// Creates a detail entry.
    pub fn new(
        keyword: impl Into<String>,
        schema_path: impl Into<String>,
        instance_path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            keyword: keyword.into(),
            schema_path: schema_path.into(),
            instance_path: instance_path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaViolationDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = if self.instance_path.is_empty() {
            "(root)"
        } else {
            self.instance_path.as_str()
        };
        write!(f, "[{}] {}: {}", self.keyword, location, self.message)
    }
}
