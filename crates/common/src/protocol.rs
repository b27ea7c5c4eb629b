//! Request and response types exchanged over the public HTTP API.
//!
//! Field names are camelCase on the wire. The server treats `encryptedText` and
//! `iv` as opaque strings and never re-encodes them.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Create endpoint
// ---------------------------------------------------------------------------

/// Request body for `POST /api/secret`.
///
/// Every field is optional at the serde level so that a missing field yields a
/// validation message naming it rather than a generic JSON rejection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSecretRequest {
    /// Client-side ciphertext in a text-safe encoding.
    pub encrypted_text: Option<String>,
    /// Initialization vector paired with `encrypted_text`.
    pub iv: Option<String>,
    /// Lifetime in seconds.
    pub ttl: Option<i64>,
    /// Delete the secret on its first successful read.
    pub burn_on_read: Option<bool>,
}

/// Successful response body for `POST /api/secret`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSecretResponse {
    /// Opaque identifier used to fetch the secret.
    pub id: String,
}

// ---------------------------------------------------------------------------
// Consume endpoint
// ---------------------------------------------------------------------------

/// Successful response body for `GET /api/secret/{id}`.
///
/// Carries exactly the strings supplied at creation. The decryption key is never
/// part of it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretEnvelope {
    /// Client-side ciphertext.
    pub encrypted_text: String,
    /// Initialization vector.
    pub iv: String,
}

impl std::fmt::Debug for SecretEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretEnvelope")
            .field("encrypted_text", &format_args!("<{} bytes>", self.encrypted_text.len()))
            .field("iv", &format_args!("<{} bytes>", self.iv.len()))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"not_found"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&crate::ServiceError> for ErrorResponse {
    fn from(err: &crate::ServiceError) -> Self {
        Self::new(err.code(), err.public_message())
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status: `"ok"` or `"degraded"`.
    pub status: String,
    /// Name of the configured secret store backend.
    pub store: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_request_uses_camel_case() {
        let req: CreateSecretRequest = serde_json::from_value(json!({
            "encryptedText": "c2VjcmV0",
            "iv": "aXY=",
            "ttl": 3600,
            "burnOnRead": true
        }))
        .unwrap();
        assert_eq!(req.encrypted_text.as_deref(), Some("c2VjcmV0"));
        assert_eq!(req.ttl, Some(3600));
        assert_eq!(req.burn_on_read, Some(true));
    }

    #[test]
    fn create_request_tolerates_missing_fields() {
        let req: CreateSecretRequest = serde_json::from_value(json!({"iv": "x"})).unwrap();
        assert!(req.encrypted_text.is_none());
        assert!(req.ttl.is_none());
        assert!(req.burn_on_read.is_none());
    }

    #[test]
    fn envelope_serialises_camel_case() {
        let env = SecretEnvelope {
            encrypted_text: "abc".into(),
            iv: "def".into(),
        };
        let v = serde_json::to_value(&env).unwrap();
        assert_eq!(v, json!({"encryptedText": "abc", "iv": "def"}));
    }

    #[test]
    fn envelope_debug_hides_contents() {
        let env = SecretEnvelope {
            encrypted_text: "very-opaque-ciphertext".into(),
            iv: "nonce".into(),
        };
        let dbg = format!("{env:?}");
        assert!(!dbg.contains("very-opaque-ciphertext"));
        assert!(dbg.contains("22 bytes"));
    }

    #[test]
    fn error_response_from_service_error() {
        let e = ErrorResponse::from(&crate::ServiceError::NotFound);
        assert_eq!(e.code, "not_found");
        assert_eq!(e.message, crate::error::NOT_FOUND_MESSAGE);
    }
}
