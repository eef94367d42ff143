//! Error type for the Meetup API client.
//!
//! # Design
//! A non-2xx status lands in `ResponseError` with the code and the decoded
//! body as detail, mirroring what the API actually sent. A success status
//! with an undecodable body gets its own variant instead of degrading to
//! null — callers can tell "the API said null" apart from "the body was not
//! JSON".

use std::fmt;

use serde_json::Value;

/// Errors returned by the request pipeline.
#[derive(Debug)]
pub enum ApiError {
    /// The server answered outside [200, 300) and debug mode is off.
    /// `detail` is the decoded response body, null when the body was not
    /// valid JSON.
    ResponseError { status: u16, detail: Value },

    /// A success-status body was non-empty but not valid JSON.
    DecodeError(String),

    /// The request parameters could not be serialized.
    SerializationError(String),

    /// The transport failed before a status code was available.
    TransportError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::ResponseError { status, .. } => {
                write!(f, "response-error: status {status}")
            }
            ApiError::DecodeError(msg) => write!(f, "decode failed: {msg}"),
            ApiError::SerializationError(msg) => write!(f, "serialization failed: {msg}"),
            ApiError::TransportError(msg) => write!(f, "transport failed: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}
