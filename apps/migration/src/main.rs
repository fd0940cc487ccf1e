//! Migration CLI tool.
//!
//! With `DATABASE_URL` set this is the regular sea-orm-migration CLI.
//! Without it, the `CMD_DB_*` variables the command service uses are read
//! and every pending migration is applied.

use articles_infra::{DatabaseConfig, RetryPolicy};
use migration::Migrator;
use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt().with_env_filter("info").init();

    if std::env::var("DATABASE_URL").is_ok() {
        cli::run_cli(Migrator).await;
        return Ok(());
    }

    let config = DatabaseConfig::from_env();
    let db = articles_infra::database::connect(&config, RetryPolicy::default()).await?;
    Migrator::up(&db, None).await?;
    tracing::info!(database = %config.database, "Migrations applied");
    Ok(())
}
