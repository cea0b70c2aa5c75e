//! Expiring message wrapper sealed inside envelopes and tokens
//!
//! Every encrypted or signed value is wrapped in a small JSON document so an
//! optional expiry travels under the same authentication as the payload.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{EncryptionError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealedMessage {
    /// Payload bytes (base64)
    pub message: String,
    /// Absolute expiry, epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
}

impl SealedMessage {
    pub fn new(payload: &[u8], expires_at: Option<u64>) -> Self {
        Self {
            message: STANDARD.encode(payload),
            expires_at,
        }
    }

    /// Serialize to JSON bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| EncryptionError::Encrypt(format!("message serialization: {e}")))
    }

    /// Deserialize from JSON bytes. Malformed input is `None`.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        serde_json::from_slice(data).ok()
    }

    /// Expired once `now_ms` is strictly past `expires_at`.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.expires_at.is_some_and(|at| now_ms > at)
    }

    /// The payload, unless the message has expired or is not valid base64.
    pub fn into_payload(self, now_ms: u64) -> Option<Vec<u8>> {
        if self.is_expired(now_ms) {
            tracing::debug!(expires_at = ?self.expires_at, now_ms, "rejecting expired message");
            return None;
        }
        STANDARD.decode(self.message).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_roundtrip() {
        let msg = SealedMessage::new(b"payload", Some(1_000));
        let restored = SealedMessage::from_bytes(&msg.to_bytes().unwrap()).unwrap();

        assert_eq!(restored, msg);
        assert_eq!(restored.into_payload(500).unwrap(), b"payload");
    }

    #[test]
    fn test_no_expiry_omitted_from_json() {
        let msg = SealedMessage::new(b"payload", None);
        let json = String::from_utf8(msg.to_bytes().unwrap()).unwrap();

        assert!(!json.contains("expiresAt"));
        assert!(!msg.is_expired(u64::MAX));
    }

    #[test]
    fn test_expiry_boundary() {
        let msg = SealedMessage::new(b"payload", Some(1_000));

        assert!(!msg.is_expired(999));
        assert!(!msg.is_expired(1_000));
        assert!(msg.is_expired(1_001));
        assert!(msg.into_payload(1_001).is_none());
    }

    #[test]
    fn test_from_bytes_garbage() {
        assert!(SealedMessage::from_bytes(b"not json").is_none());
        assert!(SealedMessage::from_bytes(b"{}").is_none());
    }
}
