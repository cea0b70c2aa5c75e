//! Plain (unauthenticated) base64 helpers for non-sensitive opaque tokens.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

/// Encode bytes or a string as URL-safe base64 without padding.
pub fn base64_encode(value: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(value)
}

/// Decode base64 produced by [`base64_encode`].
///
/// Standard-alphabet and padded input are accepted too. Invalid input is
/// `None`.
pub fn base64_decode(value: &str) -> Option<Vec<u8>> {
    let normalized: String = value
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    URL_SAFE_NO_PAD.decode(normalized).ok()
}

/// Decode base64 into a UTF-8 string. Invalid base64 or UTF-8 is `None`.
pub fn base64_decode_string(value: &str) -> Option<String> {
    base64_decode(value).and_then(|bytes| String::from_utf8(bytes).ok())
}
