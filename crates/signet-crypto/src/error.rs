//! Error types for encryption setup and sealing.
//!
//! Only developer-controlled failures live here. Rejected envelopes and
//! signatures are reported as `None` / `false` by the callers.

use thiserror::Error;

use signet_core::MIN_APP_KEY_LEN;

pub type Result<T> = std::result::Result<T, EncryptionError>;

#[derive(Debug, Error)]
pub enum EncryptionError {
    /// No app key was configured.
    #[error("E_MISSING_APP_KEY: Missing APP_KEY environment variable or app.app_key config")]
    MissingAppKey,

    /// The app key is shorter than the minimum length.
    #[error(
        "E_INSECURE_APP_KEY: The app key must be at least {} bytes long, got {actual}",
        MIN_APP_KEY_LEN
    )]
    InsecureAppKey { actual: usize },

    /// HKDF expansion failed.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// The cipher or MAC refused the input.
    #[error("encryption failed: {0}")]
    Encrypt(String),
}

impl EncryptionError {
    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingAppKey => "E_MISSING_APP_KEY",
            Self::InsecureAppKey { .. } => "E_INSECURE_APP_KEY",
            Self::KeyDerivation(_) => "E_KEY_DERIVATION",
            Self::Encrypt(_) => "E_ENCRYPTION_FAILED",
        }
    }
}
