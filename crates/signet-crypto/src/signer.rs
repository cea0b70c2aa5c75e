//! HMAC-SHA256 signed tokens for verify-only instances
//!
//! Token format (URL-safe, no padding):
//! ```text
//! h1.<base64url(message)>.<base64url(HMAC-SHA256(key, len(aad) || aad || message))>
//! aad = "signet-h1:" || purpose label
//! ```

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{EncryptionError, Result};
use crate::keys::DerivedKey;
use crate::purpose::Purpose;

type HmacSha256 = Hmac<Sha256>;

/// Version prefix of signed tokens.
pub const TOKEN_VERSION: &str = "h1";

/// Sign `message` under `key`, bound to `purpose`.
pub fn sign(key: &DerivedKey, purpose: &Purpose, message: &[u8]) -> Result<String> {
    let mut mac = keyed_mac(key, purpose)
        .map_err(|e| EncryptionError::Encrypt(format!("HMAC init failed: {e}")))?;
    mac.update(message);
    let tag = mac.finalize().into_bytes();

    Ok(format!(
        "{TOKEN_VERSION}.{}.{}",
        URL_SAFE_NO_PAD.encode(message),
        URL_SAFE_NO_PAD.encode(tag)
    ))
}

/// Authenticate a token produced by [`sign`] and return its message.
///
/// The tag is compared in constant time.
pub fn unsign(key: &DerivedKey, purpose: &Purpose, token: &str) -> Option<Vec<u8>> {
    let mut parts = token.split('.');
    let (version, message_b64, tag_b64) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() || version != TOKEN_VERSION {
        tracing::debug!("rejecting token: unexpected layout");
        return None;
    }

    let message = URL_SAFE_NO_PAD.decode(message_b64).ok()?;
    let tag = URL_SAFE_NO_PAD.decode(tag_b64).ok()?;

    let mut mac = keyed_mac(key, purpose).ok()?;
    mac.update(&message);
    match mac.verify_slice(&tag) {
        Ok(()) => Some(message),
        Err(_) => {
            tracing::debug!(%purpose, "rejecting token: tag mismatch");
            None
        }
    }
}

/// Compare two messages in constant time by checking the tag of one
/// against the MAC of the other.
pub fn messages_match(key: &DerivedKey, purpose: &Purpose, a: &[u8], b: &[u8]) -> bool {
    let (Ok(mut mac_a), Ok(mut mac_b)) = (keyed_mac(key, purpose), keyed_mac(key, purpose)) else {
        return false;
    };
    mac_a.update(a);
    mac_b.update(b);
    mac_b.verify_slice(&mac_a.finalize().into_bytes()).is_ok()
}

/// MAC keyed with `key` and already fed the length-prefixed AAD.
fn keyed_mac(
    key: &DerivedKey,
    purpose: &Purpose,
) -> std::result::Result<HmacSha256, hmac::digest::InvalidLength> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key.as_bytes())?;
    let label = purpose.label();
    let aad_len = (10 + label.len()) as u64;
    mac.update(&aad_len.to_be_bytes());
    mac.update(b"signet-h1:");
    mac.update(label.as_bytes());
    Ok(mac)
}
