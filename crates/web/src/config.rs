//! Configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `FERNWOOD_DATABASE_URL` - `PostgreSQL` connection string
//! - `FERNWOOD_BASE_URL` - Public URL for the storefront
//! - `PAYMENT_SECRET_KEY` - Payment provider secret API key
//! - `STORAGE_ENDPOINT` - Object storage endpoint URL
//! - `STORAGE_BUCKET` - Object storage bucket for product images
//! - `STORAGE_ACCESS_TOKEN` - Object storage access token
//! - `SMTP_HOST` - SMTP relay host
//! - `SMTP_USERNAME` - SMTP username
//! - `SMTP_PASSWORD` - SMTP password
//! - `EMAIL_FROM_ADDRESS` - From address for transactional mail
//!
//! ## Optional
//! - `FERNWOOD_HOST` - Bind address (default: 127.0.0.1)
//! - `FERNWOOD_PORT` - Listen port (default: 3000)
//! - `FERNWOOD_INVOICE_DIR` - Invoice PDF directory (default: data/invoices)
//! - `PAYMENT_API_BASE` - Payment API base URL (default: https://api.stripe.com)
//! - `PAYMENT_CURRENCY` - ISO currency code (default: usd)
//! - `SMTP_PORT` - SMTP port (default: 587)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use fernwood_core::CurrencyCode;

const MIN_SECRET_LENGTH: usize = 16;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Directory where generated invoice PDFs are kept
    pub invoice_dir: PathBuf,
    /// Payment provider configuration
    pub payment: PaymentConfig,
    /// Object storage configuration
    pub storage: StorageConfig,
    /// SMTP configuration
    pub email: EmailConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Payment provider configuration.
///
/// Implements `Debug` manually to redact the secret key.
#[derive(Clone)]
pub struct PaymentConfig {
    /// Secret API key for the payment provider
    pub secret_key: SecretString,
    /// API base URL (overridable for testing)
    pub api_base: String,
    /// Currency all checkout sessions are created in
    pub currency: CurrencyCode,
}

impl std::fmt::Debug for PaymentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentConfig")
            .field("secret_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("currency", &self.currency)
            .finish()
    }
}

/// Object storage configuration.
#[derive(Clone)]
pub struct StorageConfig {
    /// Storage endpoint URL
    pub endpoint: String,
    /// Bucket for product images
    pub bucket: String,
    /// Access token
    pub access_token: SecretString,
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("endpoint", &self.endpoint)
            .field("bucket", &self.bucket)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// SMTP email configuration.
#[derive(Clone)]
pub struct EmailConfig {
    /// SMTP relay host
    pub smtp_host: String,
    /// SMTP port
    pub smtp_port: u16,
    /// SMTP username
    pub smtp_username: String,
    /// SMTP password
    pub smtp_password: SecretString,
    /// From address for outgoing mail
    pub from_address: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .finish()
    }
}

impl WebConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail placeholder validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_validated_secret("FERNWOOD_DATABASE_URL")?;
        let host = get_env_or_default("FERNWOOD_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("FERNWOOD_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("FERNWOOD_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("FERNWOOD_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("FERNWOOD_BASE_URL")?;
        let invoice_dir = PathBuf::from(get_env_or_default("FERNWOOD_INVOICE_DIR", "data/invoices"));

        let payment = PaymentConfig::from_env()?;
        let storage = StorageConfig::from_env()?;
        let email = EmailConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            invoice_dir,
            payment,
            storage,
            email,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl PaymentConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let currency_raw = get_env_or_default("PAYMENT_CURRENCY", "usd");
        let currency = CurrencyCode::parse(&currency_raw).ok_or_else(|| {
            ConfigError::InvalidEnvVar("PAYMENT_CURRENCY".to_string(), currency_raw)
        })?;

        Ok(Self {
            secret_key: get_validated_secret("PAYMENT_SECRET_KEY")?,
            api_base: get_env_or_default("PAYMENT_API_BASE", "https://api.stripe.com"),
            currency,
        })
    }
}

impl StorageConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            endpoint: get_required_env("STORAGE_ENDPOINT")?,
            bucket: get_required_env("STORAGE_BUCKET")?,
            access_token: get_validated_secret("STORAGE_ACCESS_TOKEN")?,
        })
    }
}

impl EmailConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let smtp_port = get_env_or_default("SMTP_PORT", "587")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SMTP_PORT".to_string(), e.to_string()))?;

        Ok(Self {
            smtp_host: get_required_env("SMTP_HOST")?,
            smtp_port,
            smtp_username: get_required_env("SMTP_USERNAME")?,
            smtp_password: get_validated_secret("SMTP_PASSWORD")?,
            from_address: get_required_env("EMAIL_FROM_ADDRESS")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Get an optional environment variable, treating empty values as absent.
fn get_optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Get a required secret, rejecting placeholder and too-short values.
fn get_validated_secret(name: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(name)?;
    validate_secret(name, &value)?;
    Ok(SecretString::from(value))
}

/// Reject placeholder and too-short secret values.
fn validate_secret(name: &str, value: &str) -> Result<(), ConfigError> {
    if value.len() < MIN_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            name.to_string(),
            format!("must be at least {MIN_SECRET_LENGTH} characters"),
        ));
    }

    let lowered = value.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lowered.contains(**p)) {
        return Err(ConfigError::InsecureSecret(
            name.to_string(),
            format!("looks like a placeholder value (contains {pattern:?})"),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_secrets() {
        assert!(validate_secret("TEST_SECRET", "short").is_err());
    }

    #[test]
    fn rejects_placeholder_secrets() {
        for value in [
            "changeme-changeme-changeme",
            "your-api-key-goes-right-here",
            "xxx-real-value-eventually-xxx",
        ] {
            assert!(validate_secret("TEST_SECRET", value).is_err(), "{value}");
        }
    }

    #[test]
    fn accepts_plausible_secrets() {
        assert!(validate_secret("TEST_SECRET", "sk_live_4fj29dk3mf83jd02ldfj").is_ok());
    }
}
