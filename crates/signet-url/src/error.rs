use thiserror::Error;

use signet_crypto::EncryptionError;

use crate::duration::DurationError;

/// Developer-facing errors raised while building URLs.
///
/// Verification never produces these: rejected signatures are `false`.
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("E_CANNOT_LOOKUP_ROUTE: Cannot lookup route \"{0}\"")]
    RouteNotFound(String),

    #[error("E_MISSING_ROUTE_PARAM: \"{param}\" param is required to make URL for \"{pattern}\" route")]
    MissingParam { param: String, pattern: String },

    #[error(transparent)]
    InvalidDuration(#[from] DurationError),

    #[error(transparent)]
    Encryption(#[from] EncryptionError),
}

impl UrlError {
    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::RouteNotFound(_) => "E_CANNOT_LOOKUP_ROUTE",
            Self::MissingParam { .. } => "E_MISSING_ROUTE_PARAM",
            Self::InvalidDuration(_) => "E_INVALID_DURATION",
            Self::Encryption(e) => e.code(),
        }
    }
}
