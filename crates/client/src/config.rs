//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `EMPORIUM_API_ORIGIN` - Backend origin (e.g., `http://127.0.0.1:8000/api`)
//! - `EMPORIUM_SITE_HOST` - Front-end host used to pick an origin when
//!   `EMPORIUM_API_ORIGIN` is unset
//! - `EMPORIUM_STATE_DIR` - Session storage directory (default: .emporium)
//! - `EMPORIUM_API_TOKEN` - Bearer token overriding the stored session
//! - `EMPORIUM_LOG_JSON` - Emit JSON logs when set to a truthy value
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

use crate::endpoint::{ApiOrigin, EndpointError};

const DEFAULT_STATE_DIR: &str = ".emporium";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Invalid EMPORIUM_API_ORIGIN: {0}")]
    Origin(#[from] EndpointError),
}

/// Client configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct ClientConfig {
    /// Backend origin requests are sent to
    pub api_origin: ApiOrigin,
    /// Directory holding the persisted session
    pub state_dir: PathBuf,
    /// Token that takes precedence over the stored session
    pub api_token: Option<SecretString>,
    /// JSON log output
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_origin", &self.api_origin)
            .field("state_dir", &self.state_dir)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("log_json", &self.log_json)
            .field("sentry_dsn", &self.sentry_dsn.as_ref().map(|_| "[REDACTED]"))
            .field("sentry_environment", &self.sentry_environment)
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `EMPORIUM_API_ORIGIN` is not a valid http(s)
    /// URL or `EMPORIUM_LOG_JSON` is not a boolean.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`ClientConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_origin = match (get("EMPORIUM_API_ORIGIN"), get("EMPORIUM_SITE_HOST")) {
            (Some(origin), _) => ApiOrigin::parse(&origin)?,
            (None, Some(host)) => ApiOrigin::for_host(&host),
            (None, None) => ApiOrigin::local(),
        };
        let state_dir = PathBuf::from(
            get("EMPORIUM_STATE_DIR").unwrap_or_else(|| DEFAULT_STATE_DIR.to_string()),
        );
        let api_token = get("EMPORIUM_API_TOKEN").map(SecretString::from);
        let log_json = match get("EMPORIUM_LOG_JSON") {
            Some(value) => parse_bool("EMPORIUM_LOG_JSON", &value)?,
            None => false,
        };

        Ok(Self {
            api_origin,
            state_dir,
            api_token,
            log_json,
            sentry_dsn: get("SENTRY_DSN"),
            sentry_environment: get("SENTRY_ENVIRONMENT"),
        })
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got {other:?}"),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ClientConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ClientConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.api_origin, ApiOrigin::local());
        assert_eq!(config.state_dir, PathBuf::from(".emporium"));
        assert!(config.api_token.is_none());
        assert!(!config.log_json);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_explicit_origin_wins_over_site_host() {
        let config = load(&[
            ("EMPORIUM_API_ORIGIN", "https://api.example.com/api/"),
            ("EMPORIUM_SITE_HOST", "marzok16.github.io"),
        ])
        .unwrap();
        assert_eq!(config.api_origin.as_str(), "https://api.example.com/api");
        assert!(!config.api_origin.is_tunnel());
    }

    #[test]
    fn test_site_host_fallback() {
        let config = load(&[("EMPORIUM_SITE_HOST", "marzok16.github.io")]).unwrap();
        assert_eq!(config.api_origin, ApiOrigin::tunnel());
    }

    #[test]
    fn test_invalid_origin() {
        let err = load(&[("EMPORIUM_API_ORIGIN", "ftp://example.com")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Origin(EndpointError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn test_token_and_flags() {
        let config = load(&[
            ("EMPORIUM_API_TOKEN", "tok"),
            ("EMPORIUM_LOG_JSON", "true"),
            ("EMPORIUM_STATE_DIR", "/tmp/emporium"),
        ])
        .unwrap();
        assert_eq!(config.api_token.as_ref().unwrap().expose_secret(), "tok");
        assert!(config.log_json);
        assert_eq!(config.state_dir, PathBuf::from("/tmp/emporium"));
        assert!(!format!("{config:?}").contains("tok\""));
    }

    #[test]
    fn test_invalid_bool() {
        let err = load(&[("EMPORIUM_LOG_JSON", "maybe")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "EMPORIUM_LOG_JSON"));
    }
}
