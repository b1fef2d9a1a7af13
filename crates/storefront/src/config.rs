//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `SHOPFRONT_API_URL` - REST API base URL (default: `http://127.0.0.1:8000/api`)
//! - `SHOPFRONT_STATE_DIR` - Directory for the local store (default: `.shopfront`)
//! - `SHOPFRONT_HTTP_TIMEOUT_SECS` - Per-request timeout, 1-300 (default: 30)
//! - `SHOPFRONT_USER_AGENT` - User-Agent header (default: `shopfront/<version>`)
//! - `SHOPFRONT_CURRENCY` - ISO 4217 display currency (default: INR)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use shopfront_core::CurrencyCode;
use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";
const DEFAULT_STATE_DIR: &str = ".shopfront";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_TIMEOUT_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
///
/// Implements `Debug` manually to redact the Sentry DSN, which embeds a key.
#[derive(Clone)]
pub struct StorefrontConfig {
    /// REST API connection settings
    pub api: ApiConfig,
    /// Directory of the file-backed local store
    pub state_dir: PathBuf,
    /// Currency used when displaying totals
    pub currency: CurrencyCode,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl std::fmt::Debug for StorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontConfig")
            .field("api", &self.api)
            .field("state_dir", &self.state_dir)
            .field("currency", &self.currency)
            .field("sentry_dsn", &self.sentry_dsn.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// REST API connection settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL, always ending in `/` so relative paths join beneath it
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
    /// User-Agent header value
    pub user_agent: String,
}

impl ApiConfig {
    /// Settings for `base_url` with default timeout and user agent.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("SHOPFRONT_API_URL", base_url)?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: default_user_agent(),
        })
    }

    fn from_env() -> Result<Self, ConfigError> {
        let base_url = parse_base_url(
            "SHOPFRONT_API_URL",
            &get_env_or_default("SHOPFRONT_API_URL", DEFAULT_API_URL),
        )?;
        let timeout = match get_optional_env("SHOPFRONT_HTTP_TIMEOUT_SECS") {
            Some(raw) => parse_timeout("SHOPFRONT_HTTP_TIMEOUT_SECS", &raw)?,
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };
        let user_agent =
            get_optional_env("SHOPFRONT_USER_AGENT").unwrap_or_else(default_user_agent);

        Ok(Self {
            base_url,
            timeout,
            user_agent,
        })
    }
}

impl StorefrontConfig {
    /// Settings for `api` with INR display currency and no Sentry.
    #[must_use]
    pub fn new(api: ApiConfig, state_dir: impl Into<PathBuf>) -> Self {
        Self {
            api,
            state_dir: state_dir.into(),
            currency: CurrencyCode::default(),
            sentry_dsn: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api = ApiConfig::from_env()?;
        let state_dir = PathBuf::from(get_env_or_default("SHOPFRONT_STATE_DIR", DEFAULT_STATE_DIR));
        let currency = get_env_or_default("SHOPFRONT_CURRENCY", "INR")
            .parse::<CurrencyCode>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SHOPFRONT_CURRENCY".to_string(), e.to_string())
            })?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            api,
            state_dir,
            currency,
            sentry_dsn,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

fn default_user_agent() -> String {
    format!("shopfront/{}", env!("CARGO_PKG_VERSION"))
}

/// Parse an absolute http(s) base URL and make sure it ends in `/`.
fn parse_base_url(var_name: &str, raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar(var_name.to_string(), reason);

    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("must not have a query or fragment".to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn parse_timeout(var_name: &str, raw: &str) -> Result<Duration, ConfigError> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if !(1..=MAX_TIMEOUT_SECS).contains(&secs) {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("must be between 1 and {MAX_TIMEOUT_SECS} seconds (got {secs})"),
        ));
    }
    Ok(Duration::from_secs(secs))
}
