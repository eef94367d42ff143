//! HTTP transport types for the injected-transport pattern.
//!
//! # Design
//! These types describe a request and its response as plain data. The
//! pipeline builds one `PendingRequest` per call and hands it, together with
//! the fully composed URL, to the `Transport` implementation injected at
//! construction. Keeping the network behind a one-method trait keeps the
//! pipeline deterministic and easy to test — unit tests substitute a
//! recording transport, and the integration tests drive a real round-trip.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::error::ApiError;

/// Caller-supplied request parameters, keyed by field name.
///
/// Ordered, so encoded query strings come out deterministic.
pub type Params = BTreeMap<String, Value>;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a pending request.
///
/// `Fields` is an unserialized parameter mapping — encoding is delegated to
/// the transport (the reference transport form-encodes it). `Raw` carries a
/// pre-serialized payload, produced when the pending headers declare a JSON
/// content type.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Fields(Params),
    Raw(String),
}

/// A single-use request, built fresh per call and consumed by the fetch
/// step. Threading the value through build → fetch, instead of mutating
/// shared client state, means the next call starts clean by construction.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub method: Method,
    /// Relative path; query string included for GET requests.
    pub route: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Body>,
}

/// Status code and raw body text read back from the transport.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Boundary between the request pipeline and the network.
///
/// `url` is the base URI with the route (and any query string) already
/// folded in. Implementations report network-level failures as
/// `ApiError::TransportError`; non-2xx statuses are data, not errors —
/// status interpretation belongs to the pipeline.
pub trait Transport {
    fn execute(&self, url: &str, request: &PendingRequest) -> Result<RawResponse, ApiError>;
}
