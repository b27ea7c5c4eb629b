//! [`SecretRecord`]: the persisted entity and its stored representation.

use common::protocol::SecretEnvelope;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::StoreError;

/// A stored secret.
///
/// The TTL is not a field; it lives in the backend entry's deadline.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretRecord {
    /// Client-side ciphertext, opaque to the server.
    pub encrypted_text: String,
    /// Initialization vector paired with the ciphertext.
    pub iv: String,
    /// Delete on first successful read.
    pub burn_on_read: bool,
}

impl SecretRecord {
    /// Encode the record for a backend: a JSON string holding the record object.
    pub fn to_stored(&self) -> Result<Value, StoreError> {
        serde_json::to_string(self)
            .map(Value::String)
            .map_err(|e| StoreError::Backend(format!("failed to encode record: {e}")))
    }

    /// Decode a value handed back by a backend.
    ///
    /// Accepts both the encoded string produced by [`SecretRecord::to_stored`]
    /// and an already-structured object. Anything else is
    /// [`StoreError::Corrupt`].
    pub fn from_stored(id: &str, raw: Value) -> Result<Self, StoreError> {
        let corrupt = |reason: String| StoreError::Corrupt {
            id: id.to_owned(),
            reason,
        };
        match raw {
            Value::String(s) => serde_json::from_str(&s).map_err(|e| corrupt(e.to_string())),
            obj @ Value::Object(_) => {
                serde_json::from_value(obj).map_err(|e| corrupt(e.to_string()))
            }
            other => Err(corrupt(format!("unexpected {} value", kind(&other)))),
        }
    }

    /// The ciphertext / IV pair handed to the reader.
    pub fn into_envelope(self) -> SecretEnvelope {
        SecretEnvelope {
            encrypted_text: self.encrypted_text,
            iv: self.iv,
        }
    }
}

impl std::fmt::Debug for SecretRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretRecord")
            .field("encrypted_text", &format_args!("<{} bytes>", self.encrypted_text.len()))
            .field("iv", &format_args!("<{} bytes>", self.iv.len()))
            .field("burn_on_read", &self.burn_on_read)
            .finish()
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> SecretRecord {
        SecretRecord {
            encrypted_text: "Y2lwaGVy".into(),
            iv: "aXZpdml2aXZpdml2".into(),
            burn_on_read: true,
        }
    }

    #[test]
    fn stored_form_is_a_json_string() {
        let stored = record().to_stored().unwrap();
        let s = stored.as_str().unwrap();
        assert!(s.contains("\"encryptedText\":\"Y2lwaGVy\""));
        assert!(s.contains("\"burnOnRead\":true"));
    }

    #[test]
    fn decodes_string_form() {
        let stored = record().to_stored().unwrap();
        assert_eq!(SecretRecord::from_stored("id", stored).unwrap(), record());
    }

    #[test]
    fn decodes_object_form() {
        let raw = json!({
            "encryptedText": "Y2lwaGVy",
            "iv": "aXZpdml2aXZpdml2",
            "burnOnRead": true,
        });
        assert_eq!(SecretRecord::from_stored("id", raw).unwrap(), record());
    }

    #[test]
    fn rejects_unparseable_string() {
        let err = SecretRecord::from_stored("abc", Value::String("not json".into())).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { ref id, .. } if id == "abc"));
    }

    #[test]
    fn rejects_object_missing_fields() {
        let err = SecretRecord::from_stored("abc", json!({"iv": "x"})).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn rejects_other_shapes() {
        for raw in [json!(null), json!(42), json!(["a"]), json!(true)] {
            let err = SecretRecord::from_stored("abc", raw).unwrap_err();
            assert!(matches!(err, StoreError::Corrupt { .. }));
        }
    }

    #[test]
    fn debug_redacts_payload() {
        let dbg = format!("{:?}", record());
        assert!(!dbg.contains("Y2lwaGVy"));
        assert!(dbg.contains("burn_on_read: true"));
    }

    #[test]
    fn envelope_carries_fields_verbatim() {
        let env = record().into_envelope();
        assert_eq!(env.encrypted_text, "Y2lwaGVy");
        assert_eq!(env.iv, "aXZpdml2aXZpdml2");
    }
}
