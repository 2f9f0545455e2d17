//! # Contract Loading
//!
//! Reads an OpenAPI 3.x document (YAML or JSON) into a [`Contract`].
//!
//! Parsing goes through loose shim structs that only know the parts matching
//! needs. Everything else in the document is ignored. Local `$ref`s on path
//! items, request bodies and responses are followed; schema references are left
//! in place and resolved at evaluation time against the shared document.
//!
//! Note: the shims do not derive `Debug` because `utoipa::openapi::RefOr`
//! only implements it behind a feature flag.

use crate::contract::{
    ContentMap, Contract, DeclaredResponse, MediaType, Operation, PathItem, RequestBody, Schema,
};
use crate::error::{AppError, AppResult};
use crate::method::Method;
use crate::pointer::resolve_local_ref;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use utoipa::openapi::RefOr;

/// Upper bound on `$ref -> $ref` chains before giving up.
const MAX_REF_HOPS: usize = 32;

/// Loads a contract from OpenAPI YAML text.
pub fn load_contract_yaml(yaml: &str) -> AppResult<Contract> {
    let value: Value = serde_yaml::from_str(yaml)
        .map_err(|e| AppError::Document(format!("Failed to parse OpenAPI YAML: {}", e)))?;
    load_contract_value(value)
}

/// Loads a contract from OpenAPI JSON text.
pub fn load_contract_json(json: &str) -> AppResult<Contract> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| AppError::Document(format!("Failed to parse OpenAPI JSON: {}", e)))?;
    load_contract_value(value)
}

/// Loads a contract from a `.json`, `.yaml` or `.yml` file.
pub fn load_contract_path(path: &Path) -> AppResult<Contract> {
    let text = std::fs::read_to_string(path)?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => load_contract_json(&text),
        _ => load_contract_yaml(&text),
    }
}

/// Loads a contract from an already parsed document.
pub fn load_contract_value(document: Value) -> AppResult<Contract> {
    let shim = ShimDocument::deserialize(&document)
        .map_err(|e| AppError::Document(format!("Invalid OpenAPI document: {}", e)))?;

    match shim.openapi.as_deref() {
        Some(version) if version.starts_with("3.") => {}
        Some(version) => {
            return Err(AppError::Document(format!(
                "Unsupported OpenAPI version '{}'",
                version
            )))
        }
        None => {
            return Err(AppError::Document(
                "OpenAPI document missing required 'openapi' field".into(),
            ))
        }
    }

    let document = Arc::new(document);
    let loader = Loader {
        document: &document,
    };

    let mut contract = Contract::new();
    for server in shim.servers {
        contract = contract.with_server(server.url);
    }

    for (template, raw) in shim.paths {
        if template.starts_with("x-") {
            continue;
        }
        let item = loader.path_item(&template, raw)?;
        contract = contract.with_path(template, item);
    }

    debug!(
        servers = contract.servers().len(),
        paths = contract.paths().len(),
        "contract loaded"
    );
    Ok(contract)
}

struct Loader<'d> {
    document: &'d Arc<Value>,
}

impl Loader<'_> {
    fn path_item(&self, template: &str, raw: Value) -> AppResult<PathItem> {
        let mut shim: ShimPathItem = parse(raw, || format!("path item '{}'", template))?;

        // Sibling operations win over the referenced item's.
        let mut hops = 0;
        while let Some(reference) = shim.reference.take() {
            hops += 1;
            if hops > MAX_REF_HOPS {
                return Err(AppError::Document(format!(
                    "Reference chain too deep at path '{}'",
                    template
                )));
            }
            let target: ShimPathItem = parse(self.lookup(&reference)?.clone(), || {
                format!("path item '{}'", reference)
            })?;
            shim.merge_missing(target);
        }

        let mut item = PathItem::new();
        for (method, operation) in shim.into_operations() {
            item = item.with_operation(method, self.operation(operation)?);
        }
        Ok(item)
    }

    fn operation(&self, shim: ShimOperation) -> AppResult<Operation> {
        let mut operation = Operation::new();

        if let Some(body) = shim.request_body {
            let body: ShimRequestBody = self.resolve(body, "request body")?;
            let content = self.content(body.content);
            operation = operation
                .with_request_body(RequestBody::new(body.required).with_content_map(content));
        }

        for (status, response) in shim.responses {
            let response: ShimResponse = self.resolve(response, "response")?;
            operation = operation.with_response(
                status,
                DeclaredResponse::new().with_content_map(self.content(response.content)),
            );
        }

        Ok(operation)
    }

    fn content(&self, content: IndexMap<String, ShimMediaType>) -> ContentMap {
        content
            .into_iter()
            .map(|(content_type, media)| {
                let media = match media.schema {
                    Some(node) => MediaType::with_schema(Schema::in_document(
                        node,
                        Arc::clone(self.document),
                    )),
                    None => MediaType::new(),
                };
                (content_type, media)
            })
            .collect()
    }

    fn resolve<T: DeserializeOwned>(&self, value: RefOr<T>, what: &str) -> AppResult<T> {
        let mut current = value;
        for _ in 0..MAX_REF_HOPS {
            match current {
                RefOr::T(inner) => return Ok(inner),
                RefOr::Ref(reference) => {
                    let target = self.lookup(&reference.ref_location)?.clone();
                    current = parse(target, || format!("{} '{}'", what, reference.ref_location))?;
                }
            }
        }
        Err(AppError::Document(format!(
            "Reference chain too deep while resolving {}",
            what
        )))
    }

    fn lookup(&self, reference: &str) -> AppResult<&Value> {
        if !reference.starts_with('#') {
            return Err(AppError::Document(format!(
                "External reference '{}' is not supported",
                reference
            )));
        }
        resolve_local_ref(self.document, reference)
            .ok_or_else(|| AppError::Document(format!("Unresolved reference '{}'", reference)))
    }
}

fn parse<T: DeserializeOwned>(value: Value, what: impl FnOnce() -> String) -> AppResult<T> {
    serde_json::from_value(value)
        .map_err(|e| AppError::Document(format!("Failed to parse {}: {}", what(), e)))
}

#[derive(Deserialize)]
struct ShimDocument {
    openapi: Option<String>,
    #[serde(default)]
    servers: Vec<ShimServer>,
    #[serde(default)]
    paths: IndexMap<String, Value>,
}

#[derive(Deserialize)]
struct ShimServer {
    url: String,
}

#[derive(Deserialize, Default)]
struct ShimPathItem {
    #[serde(rename = "$ref")]
    reference: Option<String>,
    get: Option<ShimOperation>,
    put: Option<ShimOperation>,
    post: Option<ShimOperation>,
    delete: Option<ShimOperation>,
    options: Option<ShimOperation>,
    head: Option<ShimOperation>,
    patch: Option<ShimOperation>,
    trace: Option<ShimOperation>,
}

impl ShimPathItem {
    fn merge_missing(&mut self, other: ShimPathItem) {
        self.reference = other.reference;
        self.get = self.get.take().or(other.get);
        self.put = self.put.take().or(other.put);
        self.post = self.post.take().or(other.post);
        self.delete = self.delete.take().or(other.delete);
        self.options = self.options.take().or(other.options);
        self.head = self.head.take().or(other.head);
        self.patch = self.patch.take().or(other.patch);
        self.trace = self.trace.take().or(other.trace);
    }

    fn into_operations(self) -> Vec<(Method, ShimOperation)> {
        [
            (Method::Get, self.get),
            (Method::Put, self.put),
            (Method::Post, self.post),
            (Method::Delete, self.delete),
            (Method::Options, self.options),
            (Method::Head, self.head),
            (Method::Patch, self.patch),
            (Method::Trace, self.trace),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.map(|op| (method, op)))
        .collect()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShimOperation {
    request_body: Option<RefOr<ShimRequestBody>>,
    #[serde(default)]
    responses: IndexMap<String, RefOr<ShimResponse>>,
}

#[derive(Deserialize)]
struct ShimRequestBody {
    #[serde(default)]
    required: bool,
    #[serde(default)]
    content: IndexMap<String, ShimMediaType>,
}

#[derive(Deserialize)]
struct ShimResponse {
    #[serde(default)]
    content: IndexMap<String, ShimMediaType>,
}

#[derive(Deserialize)]
struct ShimMediaType {
    schema: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const DOC: &str = r#"
openapi: 3.0.3
info:
  title: Pets
  version: "1"
servers:
  - url: https://api.example.com/v1
  - url: http://localhost:8080/v1
paths:
  /pets/{id}:
    $ref: '#/components/pathItems/PetById'
  /pets:
    post:
      requestBody:
        $ref: '#/components/requestBodies/NewPet'
      responses:
        201:
          description: created
        4XX:
          $ref: '#/components/responses/Problem'
  x-internal:
    note: ignored
components:
  schemas:
    Pet:
      type: object
      properties:
        name:
          type: string
  pathItems:
    PetById:
      get:
        responses:
          "200":
            description: ok
            content:
              application/json:
                schema:
                  $ref: '#/components/schemas/Pet'
  requestBodies:
    NewPet:
      required: true
      content:
        application/json:
          schema:
            $ref: '#/components/schemas/Pet'
  responses:
    Problem:
      description: problem
      content:
        application/problem+json: {}
"#;

    #[test]
    fn test_servers_and_paths_in_declaration_order() {
        let contract = load_contract_yaml(DOC).unwrap();
        assert_eq!(
            contract.servers(),
            &["https://api.example.com/v1", "http://localhost:8080/v1"]
        );
        let templates: Vec<&str> = contract.paths().keys().map(String::as_str).collect();
        assert_eq!(templates, vec!["/pets/{id}", "/pets"]);
    }

    #[test]
    fn test_path_item_reference_is_followed() {
        let contract = load_contract_yaml(DOC).unwrap();
        let get = contract.paths()["/pets/{id}"]
            .operation(Method::Get)
            .unwrap();
        let media = &get.responses()["200"].content()["application/json"];
        let schema = media.schema().unwrap();
        assert_eq!(schema.node(), &json!({"$ref": "#/components/schemas/Pet"}));
        assert_eq!(
            schema.document()["components"]["schemas"]["Pet"]["type"],
            "object"
        );
    }

    #[test]
    fn test_request_body_and_response_references() {
        let contract = load_contract_yaml(DOC).unwrap();
        let post = contract.paths()["/pets"].operation(Method::Post).unwrap();

        let body = post.request_body().unwrap();
        assert!(body.required());
        assert!(body.content()["application/json"].schema().is_some());

        let keys: Vec<&str> = post.responses().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["201", "4XX"]);
        assert!(post.responses()["4XX"].content()["application/problem+json"]
            .schema()
            .is_none());
    }

    #[test]
    fn test_no_servers() {
        let contract =
            load_contract_json(r#"{"openapi": "3.1.0", "paths": {"/a": {"get": {}}}}"#).unwrap();
        assert!(contract.servers().is_empty());
        assert!(contract.paths()["/a"].operation(Method::Get).is_some());
    }

    #[test]
    fn test_swagger_two_is_rejected() {
        let err = load_contract_json(r#"{"swagger": "2.0", "paths": {}}"#).unwrap_err();
        assert!(matches!(err, AppError::Document(_)));
    }

    #[test]
    fn test_unresolved_reference_is_an_error() {
        let err = load_contract_json(
            r##"{"openapi": "3.0.0", "paths": {"/a": {"$ref": "#/components/pathItems/Nope"}}}"##,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Document Error: Unresolved reference '#/components/pathItems/Nope'"
        );
    }

    #[test]
    fn test_external_reference_is_an_error() {
        let err = load_contract_json(
            r#"{"openapi": "3.0.0", "paths": {"/a": {"$ref": "other.yaml#/paths/~1a"}}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("External reference"));
    }
}
