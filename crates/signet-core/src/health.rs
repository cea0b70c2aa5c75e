//! App key health check
//!
//! Reports whether the configured app key is usable for encryption. The
//! check runs against configuration only, it never constructs an encrypter.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

/// Minimum accepted app key length in bytes.
pub const MIN_APP_KEY_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub healthy: bool,
    pub message: String,
}

/// Check the configured app key against the minimum length policy.
pub fn check_app_key(app_key: Option<&SecretString>) -> HealthReport {
    let len = app_key.map(|k| k.expose_secret().len()).unwrap_or(0);

    if len == 0 {
        tracing::warn!("app key is missing");
        return HealthReport {
            healthy: false,
            message: "Missing APP_KEY environment variable or app.app_key config".into(),
        };
    }

    if len < MIN_APP_KEY_LEN {
        tracing::warn!(len, min = MIN_APP_KEY_LEN, "app key is insecure");
        return HealthReport {
            healthy: false,
            message: format!(
                "The app key is insecure: {len} bytes (minimum {MIN_APP_KEY_LEN})"
            ),
        };
    }

    HealthReport {
        healthy: true,
        message: "App key is secure".into(),
    }
}
