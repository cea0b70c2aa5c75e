//! signet-crypto: authenticated encryption for signed URLs and opaque payloads
//!
//! Key hierarchy:
//! ```text
//! App Key (configured secret, >= 16 bytes)
//!   ├── Encrypt key per purpose (HKDF-SHA256, info="signet-encrypt:<purpose>")
//!   │   └── Envelope AEAD: XChaCha20-Poly1305 (nonce=random_192bit, AAD="signet-v1:<purpose>")
//!   └── HMAC key per purpose (HKDF-SHA256, info="signet-hmac:<purpose>")
//!       └── Signed token: HMAC-SHA256 (HMAC-only instances)
//! ```

pub mod cipher;
pub mod encoding;
pub mod encryption;
pub mod error;
pub mod kdf;
pub mod keys;
pub mod message;
pub mod purpose;
pub mod signer;

pub use encoding::{base64_decode, base64_decode_string, base64_encode};
pub use encryption::{Encryption, EncryptionOptions, Mode, NewInstanceOptions};
pub use error::{EncryptionError, Result};
pub use kdf::{generate_app_key, MasterKey};
pub use keys::{derive_key, DerivedKey, KeyDomain};
pub use message::SealedMessage;
pub use purpose::Purpose;

/// Size of a derived key in bytes (256-bit)
pub const KEY_SIZE: usize = 32;

/// Size of an XChaCha20-Poly1305 nonce (192-bit)
pub const NONCE_SIZE: usize = 24;

/// Size of a Poly1305 authentication tag
pub const TAG_SIZE: usize = 16;
