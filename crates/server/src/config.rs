//! Application configuration loaded from environment variables.
//!
//! All configuration is read once at startup via [`Config::from_env`].
//! Secrets are wrapped in [`SecretString`] so they are redacted from
//! `Debug` output and never land in logs.

use std::net::{IpAddr, SocketAddr};

use rust_decimal::Decimal;
use secrecy::SecretString;

/// Minimum length for the session signing secret.
const MIN_SESSION_SECRET_LENGTH: usize = 32;

/// Minimum Shannon entropy (bits per character) for secrets.
/// Reject secrets like "aaaa..." that meet length but have no randomness.
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Common placeholder patterns that indicate an unconfigured secret.
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "change-me",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {0}: {1}")]
    InvalidEnvVar(String, String),

    #[error("insecure secret for environment variable {0}: {1}")]
    InsecureSecret(String, String),
}

/// Ceilings applied to the prepaid funds engine.
#[derive(Debug, Clone, Copy)]
pub struct FundsLimits {
    /// Largest balance an account may hold after a top-up.
    pub max_balance: Decimal,
    /// Largest amount a single top-up may add.
    pub max_topup: Decimal,
}

#[derive(Clone)]
pub struct Config {
    /// Postgres connection string.
    pub database_url: SecretString,
    /// Interface the HTTP server binds to.
    pub host: IpAddr,
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Public origin the API is served from. Used to decide whether
    /// session cookies are marked Secure and as the allowed CORS origin.
    pub base_url: String,
    /// Key material for signing session cookies.
    pub session_secret: SecretString,
    /// Sentry DSN. Error reporting is disabled when unset.
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag (e.g. "production", "staging").
    pub sentry_environment: Option<String>,
    /// Funds engine ceilings.
    pub funds: FundsLimits,
}

impl Config {
    /// Loads configuration from the environment, reading `.env` first if
    /// one is present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing, fails to
    /// parse, or a secret fails strength validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("BREADBOX_DATABASE_URL")?;

        let host = get_env_or_default("HOST", "0.0.0.0")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOST".to_owned(), e.to_string()))?;

        let port = get_env_or_default("PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORT".to_owned(), e.to_string()))?;

        let base_url = get_env_or_default("BASE_URL", "http://localhost:3000");

        let session_secret = get_validated_secret("SESSION_SECRET")?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        let max_balance = get_decimal_or_default("FUNDS_MAX_BALANCE", "10000.00")?;
        let max_topup = get_decimal_or_default("FUNDS_MAX_TOPUP", "1000.00")?;
        if max_topup > max_balance {
            return Err(ConfigError::InvalidEnvVar(
                "FUNDS_MAX_TOPUP".to_owned(),
                format!("must not exceed FUNDS_MAX_BALANCE ({max_balance})"),
            ));
        }

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session_secret,
            sentry_dsn,
            sentry_environment,
            funds: FundsLimits {
                max_balance,
                max_topup,
            },
        })
    }

    /// The socket address to bind the HTTP server to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

/// Reads a database URL, preferring the app-specific variable but falling
/// back to the conventional `DATABASE_URL`.
fn get_database_url(primary: &str) -> Result<SecretString, ConfigError> {
    std::env::var(primary)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| ConfigError::MissingEnvVar(format!("{primary} or DATABASE_URL")))
}

fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn get_decimal_or_default(key: &str, default: &str) -> Result<Decimal, ConfigError> {
    let raw = get_env_or_default(key, default);
    let value = parse_positive_decimal(&raw)
        .map_err(|reason| ConfigError::InvalidEnvVar(key.to_owned(), reason))?;
    Ok(value)
}

fn parse_positive_decimal(raw: &str) -> Result<Decimal, String> {
    let value = raw
        .trim()
        .parse::<Decimal>()
        .map_err(|e| format!("{raw:?} is not a decimal: {e}"))?;
    if value <= Decimal::ZERO {
        return Err(format!("must be positive, got {value}"));
    }
    Ok(value)
}

/// Reads a secret and validates it is strong enough for production use.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_session_secret(key, &value)?;
    Ok(SecretString::from(value))
}

/// Calculates the Shannon entropy of a string in bits per character.
#[allow(clippy::cast_precision_loss)]
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let len = s.chars().count() as f64;
    let mut counts = std::collections::HashMap::new();
    for c in s.chars() {
        *counts.entry(c).or_insert(0u32) += 1;
    }

    counts
        .values()
        .map(|&count| {
            let p = f64::from(count) / len;
            -p * p.log2()
        })
        .sum()
}

/// Checks a secret against placeholder patterns and an entropy floor.
fn validate_secret_strength(key: &str, value: &str) -> Result<(), ConfigError> {
    let lower = value.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                key.to_owned(),
                format!("contains placeholder pattern '{pattern}'"),
            ));
        }
    }

    let entropy = shannon_entropy(value);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            key.to_owned(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need {MIN_ENTROPY_BITS_PER_CHAR}); \
                 use a randomly generated value"
            ),
        ));
    }

    Ok(())
}

fn validate_session_secret(key: &str, value: &str) -> Result<(), ConfigError> {
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            key.to_owned(),
            format!(
                "must be at least {MIN_SESSION_SECRET_LENGTH} characters, got {}",
                value.len()
            ),
        ));
    }
    validate_secret_strength(key, value)
}
