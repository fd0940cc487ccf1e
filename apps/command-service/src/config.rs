//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

#[cfg(feature = "amqp")]
use articles_infra::AmqpConfig;
#[cfg(feature = "postgres")]
use articles_infra::DatabaseConfig;
#[cfg(feature = "redis")]
use articles_infra::RedisConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout: Duration,
    #[cfg(feature = "postgres")]
    pub database: DatabaseConfig,
    #[cfg(feature = "amqp")]
    pub amqp: AmqpConfig,
    #[cfg(feature = "redis")]
    pub redis: RedisConfig,
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
            #[cfg(feature = "postgres")]
            database: DatabaseConfig::from_env(),
            #[cfg(feature = "amqp")]
            amqp: AmqpConfig::from_env(),
            #[cfg(feature = "redis")]
            redis: RedisConfig::from_env(),
        }
    }
}
