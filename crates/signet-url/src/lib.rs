//! signet-url: signed URL generation and verification
//!
//! A signed URL carries a `signature` query parameter holding an envelope
//! over the canonical payload: the path plus every other query pair sorted
//! by key and value. An optional `expires_at` (epoch milliseconds) is part
//! of that payload, so it cannot be changed without breaking the signature.
//!
//! ```text
//! GET /posts/1?expires_at=1700000000000&signature=v1.<nonce>.<ciphertext>
//! ```

pub mod builder;
pub mod duration;
pub mod error;
pub mod query;
pub mod request;
pub mod route;
pub mod verifier;

pub use builder::{make_url, SignedUrlOptions, UrlBuilder, UrlOptions};
pub use duration::{parse_duration, DurationError, ExpiresIn, ExpiryOffset};
pub use error::UrlError;
pub use query::{canonical_payload, QueryString};
pub use request::{ParsedRequest, RequestView};
pub use route::{ResolvedRoute, RouteDefinition, RouteParams, RouteResolver, RouteTable};
pub use verifier::{RequestSignatureExt, SignatureVerifier};

/// Query parameter carrying the signature envelope
pub const SIGNATURE_PARAM: &str = "signature";

/// Query parameter carrying the absolute expiry (epoch milliseconds)
pub const EXPIRES_AT_PARAM: &str = "expires_at";
