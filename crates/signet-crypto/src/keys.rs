//! Purpose-scoped key derivation: master key → per-purpose cipher/MAC keys

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::error::{EncryptionError, Result};
use crate::kdf::MasterKey;
use crate::purpose::Purpose;
use crate::KEY_SIZE;

/// Which primitive a derived key feeds. Each domain uses its own HKDF info
/// prefix, so cipher keys and MAC keys never coincide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyDomain {
    Encrypt,
    Hmac,
}

impl KeyDomain {
    fn info_prefix(self) -> &'static [u8] {
        match self {
            Self::Encrypt => b"signet-encrypt:",
            Self::Hmac => b"signet-hmac:",
        }
    }
}

/// A 256-bit key derived for one domain and purpose. Zeroized on drop.
#[derive(Clone)]
pub struct DerivedKey {
    bytes: [u8; KEY_SIZE],
}

impl DerivedKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Derive the key for `domain` and `purpose` from the master key via HKDF-SHA256.
///
/// Deterministic: the same master key, domain and purpose always give the
/// same key, so independent processes sharing an app key agree.
pub fn derive_key(master: &MasterKey, domain: KeyDomain, purpose: &Purpose) -> Result<DerivedKey> {
    let mut info = domain.info_prefix().to_vec();
    info.extend_from_slice(purpose.label().as_bytes());
    hkdf_derive(master.as_bytes(), &info).map(DerivedKey::from_bytes)
}

/// HKDF-SHA256 key derivation with a domain-specific info string.
fn hkdf_derive(ikm: &[u8], info: &[u8]) -> Result<[u8; KEY_SIZE]> {
    let hkdf = Hkdf::<Sha256>::new(None, ikm);
    let mut okm = [0u8; KEY_SIZE];
    hkdf.expand(info, &mut okm)
        .map_err(|e| EncryptionError::KeyDerivation(format!("HKDF expand failed: {e}")))?;
    Ok(okm)
}
