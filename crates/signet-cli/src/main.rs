//! signet: app key, encryption and signed URL CLI
//!
//! Commands:
//!   key generate                 - print a fresh random app key
//!   encrypt <value>              - encrypt a value with the configured app key
//!   decrypt <envelope>           - decrypt an envelope
//!   sign-url <route>             - build a signed URL for a configured route
//!   verify-url <url>             - check a signed URL's signature and expiry
//!   health                       - check the configured app key
//!   config show                  - display current configuration

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use secrecy::ExposeSecret;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use signet_core::config::{load_config, SignetConfig};
use signet_crypto::{Encryption, NewInstanceOptions, Purpose};
use signet_url::{
    ExpiresIn, ParsedRequest, RequestSignatureExt, RouteParams, RouteTable, SignatureVerifier,
    SignedUrlOptions, UrlBuilder,
};

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "signet",
    version,
    about = "Signed URLs and authenticated encryption",
    long_about = "signet: generate app keys, encrypt payloads, and sign/verify URLs"
)]
struct Cli {
    /// Path to signet.toml configuration file
    #[arg(long, short = 'c', env = "SIGNET_CONFIG", default_value = "signet.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides config
    #[arg(long, env = "SIGNET_LOG")]
    log: Option<String>,

    /// Log format (json, text); overrides config
    #[arg(long, env = "SIGNET_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Debug, ValueEnum)]
enum LogFormat {
    Json,
    Text,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// App key management
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Encrypt a value with the configured app key
    Encrypt {
        /// Value to encrypt
        value: String,
        /// Purpose: generic, route-signature, cookie, or any custom name
        #[arg(long, short = 'p', default_value = "generic")]
        purpose: String,
        /// Expiry, e.g. "30m" or "-10" (milliseconds)
        #[arg(long, allow_hyphen_values = true)]
        expires_in: Option<String>,
        /// Produce an HMAC-signed token instead of an encrypted envelope
        #[arg(long)]
        hmac: bool,
    },

    /// Decrypt an envelope produced by `signet encrypt`
    Decrypt {
        /// Envelope to decrypt
        envelope: String,
        /// Purpose the envelope was created for
        #[arg(long, short = 'p', default_value = "generic")]
        purpose: String,
    },

    /// Build a signed URL for a configured route
    #[command(name = "sign-url")]
    SignUrl {
        /// Route pattern, name, or handler
        route: String,
        /// Named route param (repeatable), e.g. --param id=1
        #[arg(long = "param", value_parser = parse_pair)]
        params: Vec<(String, String)>,
        /// Positional route param (repeatable); ignored when --param is given
        #[arg(long = "arg")]
        args: Vec<String>,
        /// Query pair (repeatable), e.g. --query page=2
        #[arg(long = "query", short = 'q', value_parser = parse_pair)]
        query: Vec<(String, String)>,
        /// Expiry, e.g. "30m"; defaults to signing.default_expires_in
        #[arg(long, allow_hyphen_values = true)]
        expires_in: Option<String>,
        /// Domain override (protocol-relative output)
        #[arg(long)]
        domain: Option<String>,
        /// Absolute origin to prepend, e.g. https://example.com
        #[arg(long)]
        prefix_url: Option<String>,
        /// Purpose to sign for; defaults to signing.purpose, then route-signature
        #[arg(long, short = 'p')]
        purpose: Option<String>,
        /// Sign with an HMAC-only instance
        #[arg(long)]
        hmac: bool,
    },

    /// Verify a signed URL (exit status 1 when invalid)
    #[command(name = "verify-url")]
    VerifyUrl {
        /// URL to check (absolute, protocol-relative or path-only)
        url: String,
        /// Purpose the URL was signed for; defaults to signing.purpose
        #[arg(long, short = 'p')]
        purpose: Option<String>,
        /// Verify with an HMAC-only instance
        #[arg(long)]
        hmac: bool,
    },

    /// Check that the configured app key is present and long enough
    Health {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum KeyAction {
    /// Print a new random 256-bit app key (base64url)
    Generate,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the active configuration (merged defaults + config file)
    Show,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)
        .with_context(|| format!("loading config: {}", cli.config.display()))?;

    init_logging(&cli, &config);

    // load_config runs before any subscriber exists, so repeat its warning.
    if let Some(notice) = missing_config_notice(&cli.config) {
        warn!("{notice}");
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        routes = config.routes.len(),
        "signet starting"
    );

    match cli.command {
        Commands::Key {
            action: KeyAction::Generate,
        } => cmd_key_generate(),
        Commands::Encrypt {
            value,
            purpose,
            expires_in,
            hmac,
        } => cmd_encrypt(&config, &value, &purpose, expires_in.as_deref(), hmac),
        Commands::Decrypt { envelope, purpose } => cmd_decrypt(&config, &envelope, &purpose),
        Commands::SignUrl {
            route,
            params,
            args,
            query,
            expires_in,
            domain,
            prefix_url,
            purpose,
            hmac,
        } => {
            let params = if !params.is_empty() {
                RouteParams::named(params)
            } else if !args.is_empty() {
                RouteParams::Positional(args)
            } else {
                RouteParams::None
            };
            let options = SignedUrlOptions {
                params,
                qs: query.into_iter().collect(),
                expires_in: expires_in.map(ExpiresIn::from),
                domain,
                prefix_url,
                purpose: url_purpose(&config, purpose.as_deref()),
            };
            cmd_sign_url(&config, &route, options, hmac)
        }
        Commands::VerifyUrl { url, purpose, hmac } => {
            cmd_verify_url(&config, &url, purpose.as_deref(), hmac)
        }
        Commands::Health { json } => cmd_health(&config, json),
        Commands::Config {
            action: ConfigAction::Show,
        } => cmd_config_show(&config, &cli.config),
    }
}

fn init_logging(cli: &Cli, config: &SignetConfig) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = cli.log.as_deref().unwrap_or(&config.log.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let json = match &cli.log_format {
        Some(format) => matches!(format, LogFormat::Json),
        None => config.log.format.eq_ignore_ascii_case("json"),
    };

    // Logs go to stderr so command output stays pipeable.
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_pair(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got {raw:?}"))
}

/// Explicit `--purpose`, else `signing.purpose` from config. `None` leaves
/// the route-signature default in place.
fn url_purpose(config: &SignetConfig, flag: Option<&str>) -> Option<Purpose> {
    flag.or(config.signing.purpose.as_deref()).map(Purpose::from_name)
}

fn missing_config_notice(path: &Path) -> Option<String> {
    (!path.exists())
        .then(|| format!("config file not found: {}  (using defaults)", path.display()))
}

fn build_encryption(config: &SignetConfig, hmac: bool) -> Result<Encryption> {
    let encryption = Encryption::from_config(&config.app).with_context(|| {
        format!(
            "set app.app_key in the config or the {} environment variable\n\
             Generate one with: signet key generate",
            config.app.app_key_env
        )
    })?;

    if hmac {
        encryption
            .new_instance(NewInstanceOptions { key: None, hmac: true })
            .context("creating HMAC-only instance")
    } else {
        Ok(encryption)
    }
}

fn parse_expires_in(raw: &str) -> Result<i64> {
    ExpiresIn::from(raw)
        .offset()
        .map(|offset| offset.as_millis())
        .with_context(|| format!("invalid --expires-in {raw:?}"))
}

// ── `signet key generate` ─────────────────────────────────────────────────────

fn cmd_key_generate() -> Result<()> {
    let key = signet_crypto::generate_app_key();
    println!("{}", key.expose_secret());
    Ok(())
}

// ── `signet encrypt` / `signet decrypt` ──────────────────────────────────────

fn cmd_encrypt(
    config: &SignetConfig,
    value: &str,
    purpose: &str,
    expires_in: Option<&str>,
    hmac: bool,
) -> Result<()> {
    let encryption = build_encryption(config, hmac)?;
    let purpose = Purpose::from_name(purpose);

    let envelope = match expires_in {
        Some(raw) => encryption.encrypt_with_expiry(value, parse_expires_in(raw)?, &purpose)?,
        None => encryption.encrypt(value, &purpose)?,
    };

    println!("{envelope}");
    Ok(())
}

fn cmd_decrypt(config: &SignetConfig, envelope: &str, purpose: &str) -> Result<()> {
    let encryption = build_encryption(config, false)?;

    match encryption.decrypt_string(envelope, &Purpose::from_name(purpose)) {
        Some(value) => {
            println!("{value}");
            Ok(())
        }
        None => anyhow::bail!(
            "cannot decrypt: wrong key or purpose, tampered, expired, or not an envelope"
        ),
    }
}

// ── `signet sign-url` / `signet verify-url` ──────────────────────────────────

fn cmd_sign_url(
    config: &SignetConfig,
    route: &str,
    options: SignedUrlOptions,
    hmac: bool,
) -> Result<()> {
    let encryption = build_encryption(config, hmac)?;
    let routes = RouteTable::from_config(&config.routes);

    let mut builder = UrlBuilder::new(&routes, &encryption);
    if let Some(default) = &config.signing.default_expires_in {
        builder = builder.with_default_expiry(ExpiresIn::from(default.as_str()));
    }

    let url = builder
        .make_signed_url(route, options)
        .with_context(|| format!("signing URL for route {route:?}"))?;

    println!("{url}");
    Ok(())
}

fn cmd_verify_url(
    config: &SignetConfig,
    url: &str,
    purpose: Option<&str>,
    hmac: bool,
) -> Result<()> {
    let encryption = build_encryption(config, hmac)?;
    let mut verifier = SignatureVerifier::new(&encryption);
    if let Some(purpose) = url_purpose(config, purpose) {
        verifier = verifier.with_purpose(purpose);
    }
    let request = ParsedRequest::from_url(url);

    if request.has_valid_signature(&verifier) {
        println!("valid");
        Ok(())
    } else {
        println!("invalid");
        std::process::exit(1);
    }
}

// ── `signet health` ───────────────────────────────────────────────────────────

fn cmd_health(config: &SignetConfig, json: bool) -> Result<()> {
    let app_key = config.app.app_key();
    let report = signet_core::check_app_key(app_key.as_ref());

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("serializing health report")?
        );
    } else {
        let status = if report.healthy { "healthy" } else { "unhealthy" };
        println!("app key: {status} ({})", report.message);
    }

    if !report.healthy {
        std::process::exit(1);
    }
    Ok(())
}

// ── `signet config show` ──────────────────────────────────────────────────────

fn cmd_config_show(config: &SignetConfig, config_path: &Path) -> Result<()> {
    if config_path.exists() {
        println!("# Configuration from: {}", config_path.display());
    } else {
        println!(
            "# Configuration: defaults (no file at {})",
            config_path.display()
        );
    }
    println!();
    let rendered = toml::to_string_pretty(config).context("serializing config to TOML")?;
    print!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use signet_url::QueryString;

    #[test]
    fn test_parse_pair() {
        assert_eq!(parse_pair("id=1").unwrap(), ("id".into(), "1".into()));
        assert_eq!(parse_pair("q=a=b").unwrap(), ("q".into(), "a=b".into()));
        assert_eq!(parse_pair("empty=").unwrap(), ("empty".into(), "".into()));
        assert!(parse_pair("novalue").is_err());
        assert!(parse_pair("=1").is_err());
    }

    #[test]
    fn test_url_purpose_precedence() {
        let mut config = SignetConfig::default();
        assert_eq!(url_purpose(&config, None), None);
        assert_eq!(url_purpose(&config, Some("cookie")), Some(Purpose::Cookie));

        config.signing.purpose = Some("invites".into());
        assert_eq!(url_purpose(&config, None), Some(Purpose::named("invites")));
        assert_eq!(
            url_purpose(&config, Some("route-signature")),
            Some(Purpose::RouteSignature)
        );
    }

    #[test]
    fn test_missing_config_notice() {
        let tmp = tempfile::TempDir::new().unwrap();
        let missing = tmp.path().join("signet.toml");
        let notice = missing_config_notice(&missing).unwrap();
        assert!(notice.contains("config file not found"));

        std::fs::write(&missing, "").unwrap();
        assert!(missing_config_notice(&missing).is_none());
    }

    #[test]
    fn test_parse_expires_in() {
        assert_eq!(parse_expires_in("1m").unwrap(), 60_000);
        assert_eq!(parse_expires_in("-10").unwrap(), -10);
        assert!(parse_expires_in("later").is_err());
    }

    #[test]
    fn test_cli_parses_sign_url() {
        let cli = Cli::try_parse_from([
            "signet",
            "sign-url",
            "posts.show",
            "--param",
            "id=1",
            "-q",
            "page=2",
            "--expires-in",
            "-10",
        ])
        .unwrap();

        match cli.command {
            Commands::SignUrl {
                route,
                params,
                query,
                expires_in,
                ..
            } => {
                assert_eq!(route, "posts.show");
                assert_eq!(params, vec![("id".to_string(), "1".to_string())]);
                assert_eq!(query, vec![("page".to_string(), "2".to_string())]);
                assert_eq!(expires_in.as_deref(), Some("-10"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_build_encryption_requires_key() {
        let mut config = SignetConfig::default();
        config.app.app_key_env = "SIGNET_CLI_TEST_UNSET_KEY".into();
        assert!(build_encryption(&config, false).is_err());

        config.app.app_key = Some("averylongrandom32characterssecret".into());
        assert!(build_encryption(&config, false).is_ok());
        assert_eq!(
            build_encryption(&config, true).unwrap().mode(),
            signet_crypto::Mode::HmacOnly
        );
    }

    #[test]
    fn test_signing_purpose_from_config() {
        let config: SignetConfig = toml::from_str(
            r#"
[app]
app_key = "averylongrandom32characterssecret"

[signing]
purpose = "invites"

[[routes]]
pattern = "/invites/:token"
name = "invites.accept"
"#,
        )
        .unwrap();

        let encryption = build_encryption(&config, false).unwrap();
        let routes = RouteTable::from_config(&config.routes);
        let url = UrlBuilder::new(&routes, &encryption)
            .make_signed_url(
                "invites.accept",
                SignedUrlOptions {
                    params: RouteParams::named([("token", "abc")]),
                    purpose: url_purpose(&config, None),
                    ..Default::default()
                },
            )
            .unwrap();
        let request = ParsedRequest::from_url(&url);

        let invites = SignatureVerifier::new(&encryption)
            .with_purpose(url_purpose(&config, None).unwrap());
        assert!(request.has_valid_signature(&invites));
        assert!(!request.has_valid_signature(&SignatureVerifier::new(&encryption)));
    }

    #[test]
    fn test_sign_then_verify_from_config() {
        let config: SignetConfig = toml::from_str(
            r#"
[app]
app_key = "averylongrandom32characterssecret"

[[routes]]
pattern = "/posts/:id"
name = "posts.show"
"#,
        )
        .unwrap();

        let encryption = build_encryption(&config, false).unwrap();
        let routes = RouteTable::from_config(&config.routes);
        let url = UrlBuilder::new(&routes, &encryption)
            .make_signed_url(
                "posts.show",
                SignedUrlOptions {
                    params: RouteParams::named([("id", "1")]),
                    qs: QueryString::new().with("page", 2),
                    ..Default::default()
                },
            )
            .unwrap();

        let verifier = SignatureVerifier::new(&encryption);
        assert!(ParsedRequest::from_url(&url).has_valid_signature(&verifier));
    }
}
