//! XChaCha20-Poly1305 envelope sealing/opening
//!
//! Envelope format (URL-safe, no padding):
//! ```text
//! v1.<base64url(24-byte nonce)>.<base64url(ciphertext || 16-byte tag)>
//! AAD = "signet-v1:" || purpose label
//! ```
//!
//! The AAD binds the envelope to its purpose on top of the purpose-derived
//! key. Opening never panics: every malformed or forged envelope is `None`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    XChaCha20Poly1305, XNonce,
};
use rand::RngCore;

use crate::error::{EncryptionError, Result};
use crate::keys::DerivedKey;
use crate::purpose::Purpose;
use crate::{NONCE_SIZE, TAG_SIZE};

/// Version prefix of encrypted envelopes.
pub const ENVELOPE_VERSION: &str = "v1";

/// Encrypt `plaintext` under `key`, bound to `purpose`.
///
/// A fresh random nonce is drawn for every call.
pub fn seal(key: &DerivedKey, purpose: &Purpose, plaintext: &[u8]) -> Result<String> {
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let nonce = XNonce::from_slice(&nonce_bytes);

    let aad = build_aad(purpose);

    let ciphertext = cipher
        .encrypt(
            nonce,
            Payload {
                msg: plaintext,
                aad: &aad,
            },
        )
        .map_err(|e| EncryptionError::Encrypt(format!("envelope encryption failed: {e}")))?;

    Ok(format!(
        "{ENVELOPE_VERSION}.{}.{}",
        URL_SAFE_NO_PAD.encode(nonce_bytes),
        URL_SAFE_NO_PAD.encode(ciphertext)
    ))
}

/// Decrypt an envelope produced by [`seal`].
///
/// Returns `None` for anything that is not a well-formed envelope sealed
/// with the same key and purpose.
pub fn open(key: &DerivedKey, purpose: &Purpose, envelope: &str) -> Option<Vec<u8>> {
    let mut parts = envelope.split('.');
    let (version, nonce_b64, body_b64) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() || version != ENVELOPE_VERSION {
        tracing::debug!("rejecting envelope: unexpected layout");
        return None;
    }

    let nonce_bytes = URL_SAFE_NO_PAD.decode(nonce_b64).ok()?;
    let body = URL_SAFE_NO_PAD.decode(body_b64).ok()?;
    if nonce_bytes.len() != NONCE_SIZE || body.len() < TAG_SIZE {
        tracing::debug!(
            nonce_len = nonce_bytes.len(),
            body_len = body.len(),
            "rejecting envelope: truncated"
        );
        return None;
    }

    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
    let nonce = XNonce::from_slice(&nonce_bytes);
    let aad = build_aad(purpose);

    match cipher.decrypt(
        nonce,
        Payload {
            msg: &body,
            aad: &aad,
        },
    ) {
        Ok(plaintext) => Some(plaintext),
        Err(_) => {
            tracing::debug!(%purpose, "rejecting envelope: authentication failed");
            None
        }
    }
}

/// Build AAD: "signet-v1:" || purpose label
fn build_aad(purpose: &Purpose) -> Vec<u8> {
    let label = purpose.label();
    let mut aad = Vec::with_capacity(10 + label.len());
    aad.extend_from_slice(b"signet-v1:");
    aad.extend_from_slice(label.as_bytes());
    aad
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(byte: u8) -> DerivedKey {
        DerivedKey::from_bytes([byte; 32])
    }

    #[test]
    fn test_seal_open_roundtrip() {
        let k = key(0x42);
        let envelope = seal(&k, &Purpose::GenericPayload, b"hello, sealed world!").unwrap();
        let opened = open(&k, &Purpose::GenericPayload, &envelope).unwrap();

        assert_eq!(opened, b"hello, sealed world!");
    }

    #[test]
    fn test_seal_open_empty() {
        let k = key(0x42);
        let envelope = seal(&k, &Purpose::GenericPayload, b"").unwrap();

        assert_eq!(open(&k, &Purpose::GenericPayload, &envelope).unwrap(), b"");
    }

    #[test]
    fn test_envelope_is_url_safe() {
        let k = key(0x42);
        let envelope = seal(&k, &Purpose::GenericPayload, &[0xFFu8; 300]).unwrap();

        assert!(envelope.starts_with("v1."));
        assert!(envelope
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'));
    }

    #[test]
    fn test_nonce_is_fresh() {
        let k = key(0x42);
        let e1 = seal(&k, &Purpose::GenericPayload, b"same").unwrap();
        let e2 = seal(&k, &Purpose::GenericPayload, b"same").unwrap();

        assert_ne!(e1, e2, "each seal must use a fresh nonce");
    }

    #[test]
    fn test_open_wrong_key() {
        let envelope = seal(&key(1), &Purpose::GenericPayload, b"secret").unwrap();
        assert!(open(&key(2), &Purpose::GenericPayload, &envelope).is_none());
    }

    #[test]
    fn test_open_wrong_purpose() {
        let k = key(0x42);
        let envelope = seal(&k, &Purpose::RouteSignature, b"secret").unwrap();

        assert!(
            open(&k, &Purpose::GenericPayload, &envelope).is_none(),
            "wrong purpose must fail (AAD mismatch)"
        );
    }

    #[test]
    fn test_open_garbage() {
        let k = key(0x42);
        for input in ["", "garbage", "v1.", "v1..", "v1.a.b", "v2.AAAA.AAAA", "v1.!!!.???"] {
            assert!(open(&k, &Purpose::GenericPayload, input).is_none(), "{input}");
        }
    }

    #[test]
    fn test_open_extra_segment() {
        let k = key(0x42);
        let envelope = seal(&k, &Purpose::GenericPayload, b"secret").unwrap();

        assert!(open(&k, &Purpose::GenericPayload, &format!("{envelope}.extra")).is_none());
    }

    #[test]
    fn test_tampered_body() {
        let k = key(0x42);
        let envelope = seal(&k, &Purpose::GenericPayload, b"secret data").unwrap();
        let (head, body) = envelope.rsplit_once('.').unwrap();

        let mut raw = URL_SAFE_NO_PAD.decode(body).unwrap();
        raw[0] ^= 0x01;
        let tampered = format!("{head}.{}", URL_SAFE_NO_PAD.encode(raw));

        assert!(open(&k, &Purpose::GenericPayload, &tampered).is_none());
    }
}
