//! # Contract Model
//!
//! Immutable in-memory view of an OpenAPI document, reduced to what request and
//! response matching needs: servers, path templates, operations, and the
//! content-type keyed schema bindings of request and response bodies.
//!
//! Instances are produced by [`crate::document`] or assembled by hand with the
//! builder-style `with_*` methods. The validator only ever borrows a contract.

use crate::method::Method;
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;

/// Content-type keyed media type bindings, in declaration order.
pub type ContentMap = IndexMap<String, MediaType>;

/// The root of the contract.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contract {
    servers: Vec<String>,
    paths: IndexMap<String, PathItem>,
}

impl Contract {
    /// Creates an empty contract (no servers, no paths).
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a server base URL.
    pub fn with_server(mut self, url: impl Into<String>) -> Self {
        self.servers.push(url.into());
        self
    }

    /// Adds (or replaces) the path item for a path template such as `/pets/{id}`.
    pub fn with_path(mut self, template: impl Into<String>, item: PathItem) -> Self {
        self.paths.insert(template.into(), item);
        self
    }

    /// Declared server URLs, in declaration order.
    pub fn servers(&self) -> &[String] {
        &self.servers
    }

    /// Path items keyed by template, in declaration order.
    pub fn paths(&self) -> &IndexMap<String, PathItem> {
        &self.paths
    }
}

/// The operations available on a single path template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathItem {
    operations: IndexMap<Method, Operation>,
}

impl PathItem {
    /// Creates a path item without operations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds an operation to a method.
    pub fn with_operation(mut self, method: Method, operation: Operation) -> Self {
        self.operations.insert(method, operation);
        self
    }

    /// Looks up the operation for a method.
    pub fn operation(&self, method: Method) -> Option<&Operation> {
        self.operations.get(&method)
    }

    /// All operations of this path item.
    pub fn operations(&self) -> &IndexMap<Method, Operation> {
        &self.operations
    }
}

/// A single HTTP operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Operation {
    request_body: Option<RequestBody>,
    responses: IndexMap<String, DeclaredResponse>,
}

impl Operation {
    /// Creates an operation without request body or responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request body declaration.
    pub fn with_request_body(mut self, body: RequestBody) -> Self {
        self.request_body = Some(body);
        self
    }

    /// Declares a response under a status key (`"200"`, `"4XX"`, ...).
    pub fn with_response(mut self, status: impl Into<String>, response: DeclaredResponse) -> Self {
        self.responses.insert(status.into(), response);
        self
    }

    /// The request body declaration, if any.
    pub fn request_body(&self) -> Option<&RequestBody> {
        self.request_body.as_ref()
    }

    /// Responses keyed by status code or range token.
    pub fn responses(&self) -> &IndexMap<String, DeclaredResponse> {
        &self.responses
    }
}

/// Request body declaration of an operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestBody {
    required: bool,
    content: ContentMap,
}

impl RequestBody {
    /// Creates a request body with the given `required` flag and no content.
    pub fn new(required: bool) -> Self {
        Self {
            required,
            content: ContentMap::new(),
        }
    }

    /// Binds a media type to a content type.
    pub fn with_content(mut self, content_type: impl Into<String>, media: MediaType) -> Self {
        self.content.insert(content_type.into(), media);
        self
    }

    /// Replaces all content bindings at once.
    pub fn with_content_map(mut self, content: ContentMap) -> Self {
        self.content = content;
        self
    }

    /// Whether a request must carry a body.
    pub fn required(&self) -> bool {
        self.required
    }

    /// Declared content types.
    pub fn content(&self) -> &ContentMap {
        &self.content
    }
}

/// A declared response (one status key).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeclaredResponse {
    content: ContentMap,
}

impl DeclaredResponse {
    /// Creates a response without content.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a media type to a content type.
    pub fn with_content(mut self, content_type: impl Into<String>, media: MediaType) -> Self {
        self.content.insert(content_type.into(), media);
        self
    }

    /// Replaces all content bindings at once.
    pub fn with_content_map(mut self, content: ContentMap) -> Self {
        self.content = content;
        self
    }

    /// Declared content types.
    pub fn content(&self) -> &ContentMap {
        &self.content
    }
}

/// A media type binding; the schema is optional in OpenAPI.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaType {
    schema: Option<Schema>,
}

impl MediaType {
    /// A binding without a schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// A binding with a schema.
    pub fn with_schema(schema: Schema) -> Self {
        Self {
            schema: Some(schema),
        }
    }

    /// The bound schema, if declared.
    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }
}

/// A schema node plus the document it lives in.
///
/// The document is shared so that `$ref` pointers such as
/// `#/components/schemas/Pet` can be resolved when the schema is evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    node: Value,
    document: Arc<Value>,
}

impl Schema {
    /// A standalone schema; local references in it cannot be resolved.
    pub fn new(node: Value) -> Self {
        Self {
            node,
            document: Arc::new(Value::Null),
        }
    }

    /// A schema that belongs to `document`.
    pub fn in_document(node: Value, document: Arc<Value>) -> Self {
        Self { node, document }
    }

    /// The raw schema node.
    pub fn node(&self) -> &Value {
        &self.node
    }

    /// The owning document (`Value::Null` for standalone schemas).
    pub fn document(&self) -> &Value {
        &self.document
    }
}
