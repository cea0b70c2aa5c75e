//! Encryption facade
//!
//! Wraps the envelope cipher and the HMAC signer behind one handle bound to
//! the application master key. Cheap to clone and safe to share across
//! threads: the master key sits behind an `Arc` and is never mutated.

use std::sync::Arc;

use secrecy::SecretString;
use signet_core::config::AppConfig;
use signet_core::{Clock, SystemClock};

use crate::cipher;
use crate::encoding;
use crate::error::Result;
use crate::kdf::MasterKey;
use crate::keys::{derive_key, KeyDomain};
use crate::message::SealedMessage;
use crate::purpose::Purpose;
use crate::signer;

/// What an [`Encryption`] instance is able to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Encrypt and decrypt envelopes
    #[default]
    Full,
    /// Sign and verify only; `decrypt` never yields plaintext
    HmacOnly,
}

/// Options for [`Encryption::new`].
#[derive(Debug, Default)]
pub struct EncryptionOptions {
    /// Master secret. Required.
    pub key: Option<SecretString>,
    pub mode: Mode,
}

/// Options for [`Encryption::new_instance`].
#[derive(Debug, Default)]
pub struct NewInstanceOptions {
    /// Replacement master secret. Defaults to the parent's key.
    pub key: Option<SecretString>,
    /// Build an HMAC-only (verify-only) instance.
    pub hmac: bool,
}

#[derive(Clone)]
pub struct Encryption {
    master: Arc<MasterKey>,
    mode: Mode,
    clock: Arc<dyn Clock>,
}

impl Encryption {
    /// Build an instance from an explicit key.
    ///
    /// Fails with `E_MISSING_APP_KEY` when no key is given and with
    /// `E_INSECURE_APP_KEY` when it is too short.
    pub fn new(options: EncryptionOptions) -> Result<Self> {
        let master = MasterKey::from_secret(options.key.as_ref())?;
        Ok(Self {
            master: Arc::new(master),
            mode: options.mode,
            clock: Arc::new(SystemClock),
        })
    }

    /// Build a full-mode instance from the app config (key or env var).
    pub fn from_config(app: &AppConfig) -> Result<Self> {
        Self::new(EncryptionOptions {
            key: app.app_key(),
            mode: Mode::Full,
        })
    }

    /// Replace the time source used for expiry checks.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Current time in epoch milliseconds, per this instance's clock.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Encrypt (or, in HMAC-only mode, sign) a string or byte buffer.
    pub fn encrypt(&self, value: impl AsRef<[u8]>, purpose: &Purpose) -> Result<String> {
        self.seal_message(&SealedMessage::new(value.as_ref(), None), purpose)
    }

    /// Like [`Encryption::encrypt`], with an expiry relative to now.
    ///
    /// A non-positive `expires_in_ms` produces an envelope that is already
    /// expired.
    pub fn encrypt_with_expiry(
        &self,
        value: impl AsRef<[u8]>,
        expires_in_ms: i64,
        purpose: &Purpose,
    ) -> Result<String> {
        let now = self.now_ms();
        let expires_at = if expires_in_ms > 0 {
            now.saturating_add(expires_in_ms as u64)
        } else {
            now.saturating_sub(expires_in_ms.unsigned_abs().max(1))
        };
        self.seal_message(
            &SealedMessage::new(value.as_ref(), Some(expires_at)),
            purpose,
        )
    }

    fn seal_message(&self, message: &SealedMessage, purpose: &Purpose) -> Result<String> {
        let bytes = message.to_bytes()?;
        match self.mode {
            Mode::Full => {
                let key = derive_key(&self.master, KeyDomain::Encrypt, purpose)?;
                cipher::seal(&key, purpose, &bytes)
            }
            Mode::HmacOnly => {
                let key = derive_key(&self.master, KeyDomain::Hmac, purpose)?;
                signer::sign(&key, purpose, &bytes)
            }
        }
    }

    /// Decrypt an envelope back to its bytes.
    ///
    /// Returns `None` for tampered, foreign, expired or malformed input, and
    /// always in HMAC-only mode.
    pub fn decrypt(&self, envelope: &str, purpose: &Purpose) -> Option<Vec<u8>> {
        if self.mode == Mode::HmacOnly {
            tracing::debug!("decrypt called on an HMAC-only instance");
            return None;
        }
        self.open_message(envelope, purpose)?
            .into_payload(self.now_ms())
    }

    /// Decrypt an envelope holding UTF-8 text.
    pub fn decrypt_string(&self, envelope: &str, purpose: &Purpose) -> Option<String> {
        self.decrypt(envelope, purpose)
            .and_then(|bytes| String::from_utf8(bytes).ok())
    }

    /// Check that `envelope` authenticates `expected` for `purpose`.
    ///
    /// Works in both modes: full instances decrypt, HMAC-only instances
    /// check the token's tag. The recovered payload is then compared to
    /// `expected` in constant time.
    pub fn verify(&self, envelope: &str, expected: impl AsRef<[u8]>, purpose: &Purpose) -> bool {
        let Some(payload) = self
            .open_message(envelope, purpose)
            .and_then(|message| message.into_payload(self.now_ms()))
        else {
            return false;
        };

        match derive_key(&self.master, KeyDomain::Hmac, purpose) {
            Ok(key) => signer::messages_match(&key, purpose, &payload, expected.as_ref()),
            Err(_) => false,
        }
    }

    fn open_message(&self, envelope: &str, purpose: &Purpose) -> Option<SealedMessage> {
        let bytes = match self.mode {
            Mode::Full => {
                let key = derive_key(&self.master, KeyDomain::Encrypt, purpose).ok()?;
                cipher::open(&key, purpose, envelope)?
            }
            Mode::HmacOnly => {
                let key = derive_key(&self.master, KeyDomain::Hmac, purpose).ok()?;
                signer::unsign(&key, purpose, envelope)?
            }
        };
        SealedMessage::from_bytes(&bytes)
    }

    /// Plain base64url encoding, no authentication.
    pub fn base64_encode(&self, value: impl AsRef<[u8]>) -> String {
        encoding::base64_encode(value)
    }

    /// Plain base64 decoding, no authentication.
    pub fn base64_decode(&self, value: &str) -> Option<Vec<u8>> {
        encoding::base64_decode(value)
    }

    /// Plain base64 decoding into UTF-8 text.
    pub fn base64_decode_string(&self, value: &str) -> Option<String> {
        encoding::base64_decode_string(value)
    }

    /// Derive an independent instance with another key and/or mode.
    ///
    /// Without a `key` the parent's master key is reused. The clock is
    /// inherited.
    pub fn new_instance(&self, options: NewInstanceOptions) -> Result<Self> {
        let master = match options.key {
            Some(key) => Arc::new(MasterKey::from_secret(Some(&key))?),
            None => Arc::clone(&self.master),
        };
        let mode = if options.hmac { Mode::HmacOnly } else { Mode::Full };

        Ok(Self {
            master,
            mode,
            clock: Arc::clone(&self.clock),
        })
    }
}

impl std::fmt::Debug for Encryption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Encryption")
            .field("master", &"[REDACTED]")
            .field("mode", &self.mode)
            .field("clock", &self.clock)
            .finish()
    }
}
