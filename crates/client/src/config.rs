//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BAZAAR_API_URL` - Base URL of the marketplace API (e.g., `https://api.example.com/api`)
//!
//! ## Optional
//! - `BAZAAR_API_TOKEN` - Bearer token for an already signed-in session
//! - `BAZAAR_TIMEOUT_SECS` - Per-request timeout in seconds (default: 15)
//! - `BAZAAR_CITY_PATTERN` - Regex overriding the city-name pattern
//! - `BAZAAR_PHONE_PATTERN` - Regex overriding the profile phone pattern
//! - `BAZAAR_PINCODE_PATTERN` - Regex overriding the postal code pattern

use std::time::Duration;

use bazaar_core::validation::LocalePatterns;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: &str = "15";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Marketplace client configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL every request path is appended to
    pub api_url: Url,
    /// Bearer token for an existing session, if any
    pub api_token: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Regional validation patterns
    pub patterns: LocalePatterns,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url.as_str())
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ClientConfig {
    /// Configuration with defaults for everything but the API URL.
    #[must_use]
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            api_token: None,
            timeout: Duration::from_secs(15),
            patterns: LocalePatterns::default(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or any value
    /// fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(lookup);

        let api_url = env.required("BAZAAR_API_URL")?;
        let api_url = Url::parse(&api_url)
            .map_err(|e| ConfigError::InvalidEnvVar("BAZAAR_API_URL".to_string(), e.to_string()))?;
        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                "BAZAAR_API_URL".to_string(),
                format!("unsupported scheme: {}", api_url.scheme()),
            ));
        }

        let api_token = env.optional("BAZAAR_API_TOKEN").map(SecretString::from);

        let timeout_secs = env
            .or_default("BAZAAR_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("BAZAAR_TIMEOUT_SECS".to_string(), e.to_string())
            })?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "BAZAAR_TIMEOUT_SECS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            api_url,
            api_token,
            timeout: Duration::from_secs(timeout_secs),
            patterns: env.patterns()?,
        })
    }
}

/// Validation patterns with any `BAZAAR_*_PATTERN` overrides applied.
///
/// Needs no API configuration, so offline tools can validate with the same
/// patterns the client uses.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` if an override is not a valid regex.
pub fn patterns_from_env() -> Result<LocalePatterns, ConfigError> {
    let _ = dotenvy::dotenv();
    Env(|name: &str| std::env::var(name).ok()).patterns()
}

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn optional(&self, name: &str) -> Option<String> {
        (self.0)(name).filter(|value| !value.trim().is_empty())
    }

    fn required(&self, name: &str) -> Result<String, ConfigError> {
        self.optional(name)
            .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
    }

    fn or_default(&self, name: &str, default: &str) -> String {
        self.optional(name).unwrap_or_else(|| default.to_string())
    }

    fn patterns(&self) -> Result<LocalePatterns, ConfigError> {
        let city = self.optional("BAZAAR_CITY_PATTERN");
        let phone = self.optional("BAZAAR_PHONE_PATTERN");
        let pincode = self.optional("BAZAAR_PINCODE_PATTERN");
        LocalePatterns::with_overrides(city.as_deref(), phone.as_deref(), pincode.as_deref())
            .map_err(|e| ConfigError::InvalidEnvVar("BAZAAR_*_PATTERN".to_string(), e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ClientConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ClientConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_missing_api_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(name) if name == "BAZAAR_API_URL"));
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("BAZAAR_API_URL", "http://localhost:5000/api")]).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert!(config.api_token.is_none());
        assert!(config.patterns.pincode.is_match("411001"));
    }

    #[test]
    fn test_invalid_values() {
        let err = load(&[("BAZAAR_API_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(..)));

        let err = load(&[("BAZAAR_API_URL", "ftp://files.example.com")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(..)));

        let err = load(&[
            ("BAZAAR_API_URL", "http://localhost:5000"),
            ("BAZAAR_TIMEOUT_SECS", "soon"),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnvVar(name, _) if name == "BAZAAR_TIMEOUT_SECS"
        ));

        let err = load(&[
            ("BAZAAR_API_URL", "http://localhost:5000"),
            ("BAZAAR_PINCODE_PATTERN", "(unclosed"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(..)));
    }

    #[test]
    fn test_pattern_override() {
        let config = load(&[
            ("BAZAAR_API_URL", "http://localhost:5000"),
            ("BAZAAR_PINCODE_PATTERN", r"^\d{5}$"),
        ])
        .unwrap();
        assert!(config.patterns.pincode.is_match("90210"));
        assert!(!config.patterns.pincode.is_match("411001"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = load(&[
            ("BAZAAR_API_URL", "http://localhost:5000"),
            ("BAZAAR_API_TOKEN", "eyJhbGciOiJIUzI1NiJ9.secret"),
        ])
        .unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("eyJhbGci"));
        assert!(debug.contains("[REDACTED]"));
    }
}
