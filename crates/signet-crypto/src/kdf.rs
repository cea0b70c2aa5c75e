//! Master key handling: app key validation and generation

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroize;

use signet_core::MIN_APP_KEY_LEN;

use crate::error::{EncryptionError, Result};
use crate::KEY_SIZE;

/// The application master secret, as configured.
///
/// Zeroized on drop to prevent secrets lingering in memory.
pub struct MasterKey {
    bytes: Vec<u8>,
}

impl MasterKey {
    /// Validate an app key and take a private copy of its bytes.
    ///
    /// Fails with `E_MISSING_APP_KEY` when the key is absent or empty and
    /// with `E_INSECURE_APP_KEY` when it is shorter than the minimum.
    pub fn from_secret(secret: Option<&SecretString>) -> Result<Self> {
        let raw = secret
            .map(|s| s.expose_secret().as_bytes())
            .filter(|b| !b.is_empty())
            .ok_or(EncryptionError::MissingAppKey)?;

        if raw.len() < MIN_APP_KEY_LEN {
            return Err(EncryptionError::InsecureAppKey { actual: raw.len() });
        }

        Ok(Self {
            bytes: raw.to_vec(),
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Drop for MasterKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Generate a fresh random app key: 256 bits, base64url encoded.
pub fn generate_app_key() -> SecretString {
    let mut bytes = [0u8; KEY_SIZE];
    rand::thread_rng().fill_bytes(&mut bytes);
    let encoded = URL_SAFE_NO_PAD.encode(bytes);
    bytes.zeroize();
    SecretString::from(encoded)
}
