use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DbConn, DbErr};

use crate::retry::{RetryPolicy, connect_with_retry};

/// Configuration for the authoritative Postgres database.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub database: String,
    pub password: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            database: "articles".to_string(),
            password: String::new(),
            max_connections: 60,
            min_connections: 5,
            idle_timeout: Duration::from_secs(20),
            max_lifetime: Duration::from_secs(120),
        }
    }
}

impl DatabaseConfig {
    /// Load configuration from the `CMD_DB_*` variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("CMD_DB_HOST").unwrap_or(defaults.host),
            port: std::env::var("CMD_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            user: std::env::var("CMD_DB_USER").unwrap_or(defaults.user),
            database: std::env::var("CMD_DB_DATABASE").unwrap_or(defaults.database),
            password: std::env::var("CMD_DB_PASSWORD").unwrap_or(defaults.password),
            max_connections: std::env::var("CMD_DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_connections),
            ..defaults
        }
    }

    pub fn url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }
}

/// Open the connection pool, retrying with back-off until the database is up.
pub async fn connect(config: &DatabaseConfig, policy: RetryPolicy) -> Result<DbConn, DbErr> {
    let opts = ConnectOptions::new(config.url())
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .idle_timeout(config.idle_timeout)
        .max_lifetime(config.max_lifetime)
        .sqlx_logging(false)
        .to_owned();

    let conn = connect_with_retry("postgres", policy, || Database::connect(opts.clone())).await?;
    conn.ping().await?;

    tracing::info!(
        host = %config.host,
        database = %config.database,
        pool = config.max_connections,
        "Authoritative database connected"
    );
    Ok(conn)
}
