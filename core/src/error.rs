//! Error types for the GeoIP client.
//!
//! # Design
//! Only `ValidationError` is a hard failure in the service's calling
//! convention: it is raised before any network activity. A remote
//! `"status": "error"` answer is not an error here at all; it comes back as
//! an `Envelope` with `is_remote_error()` set. Transport and decode failures
//! get their own variants so callers never have to interpret a null body.

use thiserror::Error;

/// Caller input rejected before a request is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The IP address or country code was empty.
    #[error("the `{field}` parameter is required, got an empty value")]
    MissingSubject { field: &'static str },

    /// A module outside the operation's vocabulary.
    #[error("unknown module `{0}`")]
    InvalidModule(String),

    #[error("unknown language `{0}`")]
    InvalidLanguage(String),

    #[error("unknown mode `{0}`, expected `live` or `test`")]
    InvalidMode(String),
}

/// Errors returned by `GeoIpClient` build/parse methods and `GeoIp` calls.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    /// The HTTP round-trip itself failed (DNS, connect, TLS, read).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body was not valid JSON.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

impl ApiError {
    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::Validation(_))
    }
}
