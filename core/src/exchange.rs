//! # HTTP Exchange Adapter
//!
//! Validates `http` crate request/response values directly, so that clients,
//! proxies and test harnesses built on `http` types can check traffic without
//! copying it into [`Request`]/[`Response`] by hand.

use crate::error::{AppError, AppResult};
use crate::matching::media_type_essence;
use crate::method::Method;
use crate::request::{Request, Response};
use crate::schema::SchemaEvaluator;
use crate::validator::Validator;
use http::header::CONTENT_TYPE;
use http::HeaderMap;
use url::Url;

/// Validates one `http` exchange.
///
/// The request URI must be absolute. An empty body counts as no body. Fails
/// with [`AppError::Validation`] when the exchange breaks the contract.
pub fn validate_exchange<E, Q, S>(
    validator: &Validator<'_, E>,
    request: &http::Request<Q>,
    response: &http::Response<S>,
) -> AppResult<()>
where
    E: SchemaEvaluator,
    Q: AsRef<[u8]>,
    S: AsRef<[u8]>,
{
    let observed_request = to_request(request)?;
    let observed_response = to_response(response)?;
    validator.validate(&observed_request, &observed_response)?;
    Ok(())
}

/// Converts an `http::Request` into an observed [`Request`].
pub fn to_request<B: AsRef<[u8]>>(request: &http::Request<B>) -> AppResult<Request> {
    let method = Method::try_from(request.method())?;
    let raw_uri = request.uri().to_string();
    let uri =
        Url::parse(&raw_uri).map_err(|e| AppError::InvalidUri(format!("{raw_uri}: {e}")))?;

    let mut observed = Request::from_parts(method, uri);
    if let Some(content_type) = content_type(request.headers())? {
        observed = observed.with_content_type(content_type);
    }
    if let Some(body) = body_text(request.body().as_ref())? {
        observed = observed.with_raw_body(body);
    }
    Ok(observed)
}

/// Converts an `http::Response` into an observed [`Response`].
pub fn to_response<B: AsRef<[u8]>>(response: &http::Response<B>) -> AppResult<Response> {
    let mut observed = Response::new(response.status().as_u16());
    if let Some(content_type) = content_type(response.headers())? {
        observed = observed.with_content_type(content_type);
    }
    if let Some(body) = body_text(response.body().as_ref())? {
        observed = observed.with_raw_body(body);
    }
    Ok(observed)
}

fn content_type(headers: &HeaderMap) -> AppResult<Option<String>> {
    let Some(value) = headers.get(CONTENT_TYPE) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|e| AppError::General(format!("Invalid Content-Type header: {}", e)))?;
    let essence = media_type_essence(value);
    Ok((!essence.is_empty()).then_some(essence))
}

fn body_text(bytes: &[u8]) -> AppResult<Option<String>> {
    if bytes.is_empty() {
        return Ok(None);
    }
    std::str::from_utf8(bytes)
        .map(|text| Some(text.to_string()))
        .map_err(|e| AppError::General(format!("Body is not valid UTF-8: {}", e)))
}
