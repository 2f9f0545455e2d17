//! # Observed Traffic
//!
//! The request and response halves of one HTTP exchange, as seen on the wire.
//! A missing content type is read as "no body".

use crate::error::{AppError, AppResult};
use crate::method::Method;
use url::Url;

/// An observed HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    uri: Url,
    content_type: Option<String>,
    body: Option<String>,
}

impl Request {
    /// Builds a request from a method name and an absolute URI.
    ///
    /// Fails with [`AppError::UnsupportedMethod`] for methods outside the
    /// OpenAPI operation set and [`AppError::InvalidUri`] for relative or
    /// malformed URIs.
    pub fn new(method: &str, uri: &str) -> AppResult<Self> {
        let method = method.parse()?;
        let uri = Url::parse(uri).map_err(|e| AppError::InvalidUri(format!("{uri}: {e}")))?;
        Ok(Self::from_parts(method, uri))
    }

    /// Builds a request from already parsed parts.
    pub fn from_parts(method: Method, uri: Url) -> Self {
        Self {
            method,
            uri,
            content_type: None,
            body: None,
        }
    }

    /// Sets the content type and body.
    pub fn with_body(mut self, content_type: impl Into<String>, body: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self.body = Some(body.into());
        self
    }

    /// Sets only the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Sets only the body.
    pub fn with_raw_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// The request method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// The absolute request URI.
    pub fn uri(&self) -> &Url {
        &self.uri
    }

    /// The `Content-Type`, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// The body text, if any.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }
}

/// An observed HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    content_type: Option<String>,
    body: Option<String>,
}

impl Response {
    /// A response with a status code and nothing else.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            content_type: None,
            body: None,
        }
    }

    /// Sets the content type and body.
    pub fn with_body(mut self, content_type: impl Into<String>, body: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self.body = Some(body.into());
        self
    }

    /// Sets only the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Sets only the body.
    pub fn with_raw_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// The status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// The `Content-Type`, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// The body text, if any.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }
}
