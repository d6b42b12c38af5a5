//! Error types for the Web Distribution client.
//!
//! # Design
//! Repositories produce `NotFound` only on lookup paths, either for an empty
//! result set or by translating a bad HTTP response. Every other failure
//! propagates in its own variant.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by `WdClient` and the repositories.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A lookup yielded zero results, or the server answered a lookup with a
    /// non-success status.
    #[error("not found: {0}")]
    NotFound(String),

    /// The response decoded, but its shape cannot be used.
    #[error("unusable response: {0}")]
    Response(String),

    /// A required field was missing or had the wrong type during hydration.
    #[error("cannot hydrate {target}: {reason}")]
    Hydration { target: &'static str, reason: String },

    /// The server returned a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The request never produced a response.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body was not valid JSON.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A request object failed validation before anything was sent.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The client configuration is unusable.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// True for errors carrying an HTTP status, i.e. the server answered but
    /// not with success. Lookup paths translate these into `NotFound`.
    pub fn is_bad_response(&self) -> bool {
        matches!(self, ApiError::Http { .. })
    }

    /// Replace a bad-response error with `NotFound`, passing everything else
    /// through untouched.
    pub(crate) fn into_not_found(self, message: impl FnOnce() -> String) -> Self {
        if self.is_bad_response() {
            ApiError::NotFound(message())
        } else {
            self
        }
    }
}
