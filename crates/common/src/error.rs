//! Common error types shared across crates.

use thiserror::Error;

/// Message returned for every not-found outcome.
///
/// Absent, expired, already-burned, and refused lookups all share this text so
/// callers cannot tell them apart.
pub const NOT_FOUND_MESSAGE: &str = "secret not found or expired";

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::BadRequest`] → 400
/// - [`ServiceError::NotFound`] → 404
/// - [`ServiceError::Unavailable`] → 503
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was malformed: missing fields, out-of-range TTL, or invalid JSON.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The secret does not exist, has expired, was already burned, or the caller
    /// was refused.
    #[error("not found")]
    NotFound,

    /// The secret store failed or timed out; the request may be retried.
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 400,
            ServiceError::NotFound => 404,
            ServiceError::Unavailable(_) => 503,
        }
    }

    /// Short machine-readable code for the error body.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::NotFound => "not_found",
            ServiceError::Unavailable(_) => "service_unavailable",
        }
    }

    /// Message that is safe to show to callers.
    ///
    /// Validation detail is passed through so the caller can fix the request.
    /// Server-side detail is replaced by a generic message.
    pub fn public_message(&self) -> String {
        match self {
            ServiceError::BadRequest(msg) => msg.clone(),
            ServiceError::NotFound => NOT_FOUND_MESSAGE.into(),
            ServiceError::Unavailable(_) => "secret store temporarily unavailable".into(),
        }
    }
}
