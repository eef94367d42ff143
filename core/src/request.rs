//! Shared request pipeline: build a `PendingRequest`, execute it, classify
//! the outcome.
//!
//! # Design
//! `Requester` holds the pieces every call shares — base URI, debug flag,
//! header strategy, transport — and stays immutable across calls. `build`
//! produces a fresh `PendingRequest` value and `fetch` consumes it, so no
//! per-call state survives a round trip. The header strategy is an injected
//! function rather than an overridable method; tests substitute a spy.

use std::fmt;

use serde_json::Value;

use crate::error::ApiError;
use crate::http::{Body, Method, Params, PendingRequest, RawResponse, Transport};

/// Produces the headers attached to every outgoing request.
///
/// The default strategy returns none: the Meetup API authenticates through
/// the `key` parameter, not headers. Clients that want header auth or a
/// JSON content type on writes inject their own.
pub type HeaderStrategy = Box<dyn Fn() -> Vec<(String, String)> + Send + Sync>;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Request builder and executor shared by every endpoint method.
pub struct Requester {
    base_uri: String,
    debug: bool,
    headers: HeaderStrategy,
    transport: Box<dyn Transport>,
}

impl fmt::Debug for Requester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Requester")
            .field("base_uri", &self.base_uri)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

impl Requester {
    pub fn new(base_uri: &str, transport: Box<dyn Transport>) -> Self {
        Self {
            base_uri: base_uri.trim_end_matches('/').to_string(),
            debug: false,
            headers: Box::new(Vec::new),
            transport,
        }
    }

    /// Pass non-2xx bodies through decoded instead of wrapping them.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Replace the header strategy invoked before each build.
    pub fn header_strategy(mut self, strategy: HeaderStrategy) -> Self {
        self.headers = strategy;
        self
    }

    /// Assemble the pending request for one call.
    ///
    /// GET folds the non-falsy params into the route as a query string and
    /// carries no body. Any other method carries the params as the body:
    /// serialized JSON text when the pending headers declare
    /// `application/json`, the unserialized mapping otherwise (encoding is
    /// left to the transport).
    pub fn build(
        &self,
        route: &str,
        params: Params,
        method: Method,
    ) -> Result<PendingRequest, ApiError> {
        let headers = (self.headers)();

        if method == Method::Get {
            return Ok(PendingRequest {
                method,
                route: append_query(route, &params)?,
                headers,
                body: None,
            });
        }

        let body = if has_json_content_type(&headers) {
            let text = serde_json::to_string(&params)
                .map_err(|e| ApiError::SerializationError(e.to_string()))?;
            Body::Raw(text)
        } else {
            Body::Fields(params)
        };

        Ok(PendingRequest {
            method,
            route: route.to_string(),
            headers,
            body: Some(body),
        })
    }

    /// Execute one round trip and classify the result.
    ///
    /// Exactly one network attempt. A status outside [200, 300) becomes a
    /// `ResponseError` unless debug mode is on, in which case the decoded
    /// body is returned even for failure statuses.
    pub fn fetch(&self, request: PendingRequest) -> Result<Value, ApiError> {
        let url = format!(
            "{}/{}",
            self.base_uri,
            request.route.trim_start_matches('/')
        );
        tracing::debug!(method = request.method.as_str(), url = %url, "dispatching request");

        let RawResponse { status, body } = self.transport.execute(&url, &request)?;

        if !is_status_ok(status) && !self.debug {
            tracing::warn!(status, url = %url, "non-success response");
            // Detail stays permissive: an HTML error page must not mask the
            // status classification.
            let detail = serde_json::from_str(&body).unwrap_or(Value::Null);
            return Err(ApiError::ResponseError { status, detail });
        }

        decode_body(&body)
    }
}

/// Whether `code` is in [200, 300).
fn is_status_ok(code: u16) -> bool {
    (200..300).contains(&code)
}

/// Decode a response body. An empty body decodes to null; anything else
/// must be valid JSON.
fn decode_body(raw: &str) -> Result<Value, ApiError> {
    if raw.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(raw).map_err(|e| ApiError::DecodeError(e.to_string()))
}

/// Falsy values are dropped from GET query strings.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Query-string form of a param value. Strings pass through bare,
/// everything else uses its JSON text.
fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Fold the non-falsy params into `route` as a query string. A route that
/// already carries a query gets `&`-joined.
fn append_query(route: &str, params: &Params) -> Result<String, ApiError> {
    let pairs: Vec<(&str, String)> = params
        .iter()
        .filter(|(_, value)| !is_falsy(value))
        .map(|(name, value)| (name.as_str(), query_value(value)))
        .collect();

    if pairs.is_empty() {
        return Ok(route.to_string());
    }

    let encoded = serde_urlencoded::to_string(&pairs)
        .map_err(|e| ApiError::SerializationError(e.to_string()))?;
    let separator = if route.contains('?') { '&' } else { '?' };
    Ok(format!("{route}{separator}{encoded}"))
}

fn has_json_content_type(headers: &[(String, String)]) -> bool {
    headers
        .iter()
        .any(|(name, value)| name.eq_ignore_ascii_case("content-type") && value == JSON_CONTENT_TYPE)
}
