//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout: Duration,
    /// Base URL of the command service, e.g. `http://command:80`.
    pub command_url: String,
    /// Base URL of the query service.
    pub query_url: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(80),
            request_timeout: Duration::from_secs(
                env::var("REQUEST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            command_url: env::var("URL_COMMAND_SVC")
                .unwrap_or_else(|_| "http://localhost:8081".to_string()),
            query_url: env::var("URL_QUERY_SVC")
                .unwrap_or_else(|_| "http://localhost:8082".to_string()),
        }
    }
}
