use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{SignetError, SignetResult};

/// Top-level configuration (loaded from signet.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SignetConfig {
    pub app: AppConfig,
    pub signing: SigningConfig,
    pub log: LogConfig,
    /// Route table used by `make_url` / `make_signed_url`
    pub routes: Vec<RouteConfig>,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Master secret. Prefer the environment variable named by `app_key_env`.
    #[serde(skip_serializing)]
    pub app_key: Option<String>,
    /// Environment variable consulted when `app_key` is unset (default: APP_KEY)
    pub app_key_env: String,
}

impl AppConfig {
    /// The configured app key, falling back to the environment variable.
    pub fn app_key(&self) -> Option<SecretString> {
        self.app_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(&self.app_key_env).ok())
            .filter(|k| !k.is_empty())
            .map(SecretString::from)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("app_key", &self.app_key.as_ref().map(|_| "[REDACTED]"))
            .field("app_key_env", &self.app_key_env)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_key: None,
            app_key_env: "APP_KEY".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SigningConfig {
    /// Expiry applied to signed URLs when the caller gives none (e.g. "30m")
    pub default_expires_in: Option<String>,
    /// Purpose signed URLs are created and verified for (default:
    /// "route-signature"). Built-ins: generic, route-signature, cookie.
    pub purpose: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (default: info)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

/// A single route entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Route pattern, e.g. "/posts/:id"
    pub pattern: String,
    /// Optional route name, e.g. "posts.show"
    pub name: Option<String>,
    /// Optional controller action identifier, e.g. "PostsController.show"
    pub handler: Option<String>,
    /// Optional domain the route is bound to
    pub domain: Option<String>,
}

/// Load configuration from a TOML file, using defaults when the file is absent.
pub fn load_config(path: &Path) -> SignetResult<SignetConfig> {
    if !path.exists() {
        tracing::warn!(
            "config file not found: {}  (using defaults)",
            path.display()
        );
        return Ok(SignetConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: SignetConfig = toml::from_str(&content)?;

    for route in &config.routes {
        if route.pattern.is_empty() {
            return Err(SignetError::Config(format!(
                "route {:?} in {} has an empty pattern",
                route.name.as_deref().unwrap_or("<unnamed>"),
                path.display()
            )));
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
[app]
app_key = "averylongrandom32characterssecret"
app_key_env = "MY_APP_KEY"

[signing]
default_expires_in = "30m"
purpose = "invites"

[log]
level = "debug"
format = "json"

[[routes]]
pattern = "/posts/:id"
name = "posts.show"
handler = "PostsController.show"

[[routes]]
pattern = "/dashboard"
domain = "blog.example.com"
"#;
        let config: SignetConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(
            config.app.app_key().unwrap().expose_secret(),
            "averylongrandom32characterssecret"
        );
        assert_eq!(config.app.app_key_env, "MY_APP_KEY");
        assert_eq!(config.signing.default_expires_in.as_deref(), Some("30m"));
        assert_eq!(config.signing.purpose.as_deref(), Some("invites"));
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log.format, "json");
        assert_eq!(config.routes.len(), 2);
        assert_eq!(config.routes[0].name.as_deref(), Some("posts.show"));
        assert_eq!(config.routes[1].domain.as_deref(), Some("blog.example.com"));
    }

    #[test]
    fn test_parse_defaults() {
        let config: SignetConfig = toml::from_str("").unwrap();

        assert!(config.app.app_key.is_none());
        assert_eq!(config.app.app_key_env, "APP_KEY");
        assert!(config.signing.default_expires_in.is_none());
        assert!(config.signing.purpose.is_none());
        assert_eq!(config.log.level, "info");
        assert_eq!(config.log.format, "text");
        assert!(config.routes.is_empty());
    }

    #[test]
    fn test_app_key_from_env() {
        let config: SignetConfig = toml::from_str(
            r#"
[app]
app_key_env = "SIGNET_TEST_APP_KEY_FROM_ENV"
"#,
        )
        .unwrap();

        std::env::set_var("SIGNET_TEST_APP_KEY_FROM_ENV", "env-provided-secret-value");
        let key = config.app.app_key().unwrap();
        assert_eq!(key.expose_secret(), "env-provided-secret-value");
        std::env::remove_var("SIGNET_TEST_APP_KEY_FROM_ENV");
    }

    #[test]
    fn test_debug_redacts_app_key() {
        let config: SignetConfig = toml::from_str(
            r#"
[app]
app_key = "super-secret-do-not-print"
"#,
        )
        .unwrap();

        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret-do-not-print"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_serialize_skips_app_key() {
        let mut config = SignetConfig::default();
        config.app.app_key = Some("super-secret-do-not-print".into());

        let toml_str = toml::to_string(&config).unwrap();
        assert!(!toml_str.contains("super-secret-do-not-print"));

        let parsed: SignetConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.app.app_key_env, config.app.app_key_env);
        assert_eq!(parsed.log.level, config.log.level);
    }

    #[test]
    fn test_load_config_missing_file_uses_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("missing.toml")).unwrap();
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_load_config_from_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("signet.toml");
        std::fs::write(
            &path,
            r#"
[[routes]]
pattern = "/posts/:id"
name = "posts.show"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.routes[0].pattern, "/posts/:id");
    }

    #[test]
    fn test_load_config_rejects_empty_pattern() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("signet.toml");
        std::fs::write(
            &path,
            r#"
[[routes]]
name = "broken"
"#,
        )
        .unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, SignetError::Config(_)));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("signet.toml");
        std::fs::write(&path, "[app\napp_key = ").unwrap();

        assert!(matches!(load_config(&path), Err(SignetError::Toml(_))));
    }

    #[test]
    fn test_load_config_unreadable_is_io_error() {
        let tmp = tempfile::TempDir::new().unwrap();

        let err = load_config(tmp.path()).unwrap_err();
        assert!(matches!(err, SignetError::Io(_)));
        assert!(err.to_string().starts_with("I/O error"));
    }
}
