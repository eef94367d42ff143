//! Synchronous client core for the Meetup REST API.
//!
//! # Overview
//! A thin wrapper over individual Meetup HTTP endpoints: each named method
//! composes a route, a static API key injected into every outgoing
//! parameter set authenticates the call, and the HTTP/JSON response
//! normalizes into either a decoded `serde_json::Value` or an `ApiError`.
//!
//! # Design
//! - `Requester` owns the shared pipeline: build a per-call
//!   `PendingRequest` value, execute it through the injected `Transport`,
//!   classify the status, decode the body. The request value is consumed by
//!   the fetch step, so no state leaks between calls.
//! - `MeetupClient` supplies the fixed base URI, injects the key, and
//!   defines one thin method per endpoint.
//! - No retries, no pagination handling, no caching; one blocking round
//!   trip per call. Debug mode only disables error-wrapping of non-2xx
//!   statuses.

pub mod client;
pub mod error;
pub mod http;
pub mod request;

pub use client::{MeetupClient, RsvpResponse, BASE_URI};
pub use error::ApiError;
pub use http::{Body, Method, Params, PendingRequest, RawResponse, Transport};
pub use request::{HeaderStrategy, Requester};
