//! Frontend configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DEVLOG_API_URL` - Base URL of the blog REST backend (e.g., http://localhost:8080/api)
//!
//! ## Optional
//! - `DEVLOG_HOST` - Bind address (default: 127.0.0.1)
//! - `DEVLOG_PORT` - Listen port (default: 3000)
//! - `DEVLOG_BASE_URL` - Public URL of this frontend (default: http://localhost:3000)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};

use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Frontend application configuration.
#[derive(Debug, Clone)]
pub struct DevlogConfig {
    /// Base URL of the blog REST backend, without a trailing slash.
    pub api_url: String,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for this frontend
    pub base_url: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl DevlogConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = get_required_env("DEVLOG_API_URL")?;
        let api_url = normalize_api_url(&api_url)?;

        let host = get_env_or_default("DEVLOG_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("DEVLOG_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("DEVLOG_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("DEVLOG_PORT".to_string(), e.to_string()))?;
        let base_url = get_env_or_default("DEVLOG_BASE_URL", "http://localhost:3000");
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            api_url,
            host,
            port,
            base_url,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Validate the backend URL and strip any trailing slash so request
/// paths can be appended verbatim.
fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let parsed = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar("DEVLOG_API_URL".to_string(), e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "DEVLOG_API_URL".to_string(),
            format!("unsupported scheme: {}", parsed.scheme()),
        ));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_api_url_strips_trailing_slash() {
        let url = normalize_api_url("http://localhost:8080/api/").unwrap();
        assert_eq!(url, "http://localhost:8080/api");
    }

    #[test]
    fn test_normalize_api_url_keeps_clean_url() {
        let url = normalize_api_url("https://blog.example.com/api").unwrap();
        assert_eq!(url, "https://blog.example.com/api");
    }

    #[test]
    fn test_normalize_api_url_rejects_garbage() {
        assert!(normalize_api_url("not a url").is_err());
    }

    #[test]
    fn test_normalize_api_url_rejects_non_http_scheme() {
        assert!(normalize_api_url("ftp://blog.example.com").is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = DevlogConfig {
            api_url: "http://localhost:8080/api".to_string(),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            sentry_dsn: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }
}
